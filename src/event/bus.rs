use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::event::{EditorEvent, Topic};

/// Callback invoked for every event published on its topic.
pub type Handler = Rc<dyn Fn(&EditorEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
    // Cleared on unsubscribe so an in-flight dispatch skips the handler.
    active: Rc<Cell<bool>>,
}

struct BusInner {
    handlers: RefCell<Vec<Entry>>,
    next_id: Cell<u64>,
}

/// Synchronous publish/subscribe channel shared by the editor components.
///
/// Cloning yields another handle to the same bus. Handlers run in
/// subscription order before `publish` returns and may publish themselves;
/// nested events are delivered before the outer dispatch continues.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

/// Non-owning handle, held by subscriptions and component callbacks.
#[derive(Clone)]
pub struct WeakEventBus {
    inner: Weak<BusInner>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.inner.handlers.borrow().len()))
            .finish()
    }
}

impl std::fmt::Debug for WeakEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WeakEventBus")
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            inner: Rc::new(BusInner {
                handlers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakEventBus {
        WeakEventBus {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Registers `handler` for `topic`. The returned subscription removes it again.
    pub fn subscribe(&self, topic: Topic, handler: impl Fn(&EditorEvent) + 'static) -> Subscription {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.handlers.borrow_mut().push(Entry {
            id,
            topic,
            handler: Rc::new(handler),
            active: Rc::new(Cell::new(true)),
        });
        log::debug!("Subscribed handler {} to {}", id.0, topic.as_str());
        Subscription {
            bus: self.downgrade(),
            topic,
            id,
        }
    }

    /// Removes a handler. Unknown or already removed ids are ignored.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) {
        let mut handlers = self.inner.handlers.borrow_mut();
        if let Some(position) = handlers.iter().position(|entry| entry.id == id && entry.topic == topic) {
            let entry = handlers.remove(position);
            entry.active.set(false);
            log::debug!("Unsubscribed handler {} from {}", id.0, topic.as_str());
        }
    }

    /// Delivers `event` to every handler of its topic.
    pub fn publish(&self, event: EditorEvent) {
        let topic = event.topic();
        let targets: Vec<(Handler, Rc<Cell<bool>>)> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .filter(|entry| entry.topic == topic)
            .map(|entry| (Rc::clone(&entry.handler), Rc::clone(&entry.active)))
            .collect();
        log::trace!("Publishing {} to {} handlers", topic.as_str(), targets.len());
        for (handler, active) in targets {
            if active.get() {
                handler(&event);
            }
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .handlers
            .borrow()
            .iter()
            .filter(|entry| entry.topic == topic)
            .count()
    }
}

impl WeakEventBus {
    pub fn upgrade(&self) -> Option<EventBus> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }

    /// Publishes if the bus is still alive.
    pub fn publish(&self, event: EditorEvent) {
        if let Some(bus) = self.upgrade() {
            bus.publish(event);
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping it keeps the handler registered; call [`Subscription::unsubscribe`]
/// to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    bus: WeakEventBus,
    topic: Topic,
    id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.topic, self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(EditorEvent::ElementDeselected);
        assert_eq!(bus.subscriber_count(Topic::ElementDeselected), 0);
    }

    #[test]
    fn test_only_matching_topic_is_called() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        bus.subscribe(Topic::ViewReset, move |_| counter.set(counter.get() + 1));
        bus.publish(EditorEvent::ElementDeselected);
        bus.publish(EditorEvent::ViewReset);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let bus = EventBus::new();
        let subscription = bus.subscribe(Topic::ViewReset, |_| {});
        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(bus.subscriber_count(Topic::ViewReset), 0);
    }
}
