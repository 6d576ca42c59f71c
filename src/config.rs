use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::ExportOptions;
use crate::optimize::OptimizeOptions;
use crate::tools::MeasureUnit;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Zoom limits and steps for the canvas view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    /// Fraction of the container the document fills after "fit".
    pub fit_margin: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
            fit_margin: 0.9,
        }
    }
}

/// Editor settings. Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Snapshots kept per document before the oldest is evicted.
    pub history_limit: usize,
    pub view: ViewConfig,
    pub optimizer: OptimizeOptions,
    pub export: ExportOptions,
    pub measure_unit: MeasureUnit,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            view: ViewConfig::default(),
            optimizer: OptimizeOptions::default(),
            export: ExportOptions::default(),
            measure_unit: MeasureUnit::Px,
        }
    }
}

impl StudioConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".to_owned()));
        }
        let view = &self.view;
        if !(view.min_zoom > 0.0 && view.min_zoom <= view.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty",
                view.min_zoom, view.max_zoom
            )));
        }
        if !(view.fit_margin > 0.0 && view.fit_margin <= 1.0) {
            return Err(ConfigError::Invalid("fit_margin must be in (0, 1]".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = StudioConfig::from_json(r#"{ "history_limit": 10 }"#).unwrap();
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.view, ViewConfig::default());
    }

    #[test]
    fn test_rejects_zero_history() {
        assert!(matches!(
            StudioConfig::from_json(r#"{ "history_limit": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = StudioConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(StudioConfig::from_json(&json).unwrap(), config);
    }
}
