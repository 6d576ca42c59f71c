use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::event::{EventBus, EventHandler, Subscription, Topic};

/// Subscribes `component` to each of `topics`.
///
/// The bus only keeps a weak reference, so a dropped component silently
/// stops receiving events. A component that is already borrowed when an
/// event arrives misses that event and the miss is logged.
pub fn attach<H>(bus: &EventBus, topics: &[Topic], component: &Rc<RefCell<H>>) -> Vec<Subscription>
where
    H: EventHandler + 'static,
{
    topics
        .iter()
        .map(|&topic| {
            let weak: Weak<RefCell<H>> = Rc::downgrade(component);
            bus.subscribe(topic, move |event| {
                let Some(component) = weak.upgrade() else {
                    return;
                };
                match component.try_borrow_mut() {
                    Ok(mut component) => component.handle_event(event),
                    Err(_) => log::error!(
                        "Dropped {} for {}: component is busy",
                        topic,
                        std::any::type_name::<H>()
                    ),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EditorEvent;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Topic>,
    }

    impl EventHandler for Recorder {
        fn handle_event(&mut self, event: &EditorEvent) {
            self.seen.push(event.topic());
        }
    }

    #[test]
    fn test_attach_routes_selected_topics() {
        let bus = EventBus::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        attach(&bus, &[Topic::ViewReset, Topic::CropStarted], &recorder);
        bus.publish(EditorEvent::ViewReset);
        bus.publish(EditorEvent::ElementDeselected);
        bus.publish(EditorEvent::CropStarted);
        assert_eq!(recorder.borrow().seen, vec![Topic::ViewReset, Topic::CropStarted]);
    }

    #[test]
    fn test_dropped_component_is_skipped() {
        let bus = EventBus::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        attach(&bus, &[Topic::ViewReset], &recorder);
        drop(recorder);
        bus.publish(EditorEvent::ViewReset);
    }
}
