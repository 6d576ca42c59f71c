mod bus;
mod events;
mod handlers;

pub use bus::{EventBus, Handler, Subscription, SubscriptionId, WeakEventBus};
pub use events::{EditorEvent, Topic};
pub use handlers::attach;

/// A component that reacts to bus events.
pub trait EventHandler {
    fn handle_event(&mut self, event: &EditorEvent);
}
