/// Get the current time in seconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Get the current time in seconds since the UNIX epoch
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| (perf.time_origin() + perf.now()) / 1000.0)
        .unwrap_or(0.0)
}

/// Milliseconds since the UNIX epoch, used to stamp history snapshots
pub fn timestamp_millis() -> u64 {
    (current_time_secs() * 1000.0) as u64
}

/// Formats a snapshot timestamp as `HH:MM:SS` (UTC)
pub fn format_clock(timestamp_millis: u64) -> String {
    let secs = timestamp_millis / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3_723_000), "01:02:03");
    }

    #[test]
    fn test_timestamp_is_after_2020() {
        assert!(timestamp_millis() > 1_577_836_800_000);
    }
}
