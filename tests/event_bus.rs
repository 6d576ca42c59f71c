use std::cell::RefCell;
use std::rc::Rc;
use svg_studio::event::{EditorEvent, EventBus, Subscription, Topic};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn recorder(log: &Log, name: &'static str) -> impl Fn(&EditorEvent) + 'static {
    let log = Rc::clone(log);
    move |_| log.borrow_mut().push(name)
}

#[test]
fn test_handlers_run_in_subscription_order() {
    let bus = EventBus::new();
    let log: Log = Rc::default();
    bus.subscribe(Topic::ViewReset, recorder(&log, "first"));
    bus.subscribe(Topic::ViewReset, recorder(&log, "second"));
    bus.subscribe(Topic::ViewReset, recorder(&log, "third"));

    bus.publish(EditorEvent::ViewReset);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_handler_removed_mid_dispatch_is_skipped() {
    let bus = EventBus::new();
    let log: Log = Rc::default();
    let victim: Rc<RefCell<Option<Subscription>>> = Rc::default();

    let target = Rc::clone(&victim);
    let first_log = Rc::clone(&log);
    bus.subscribe(Topic::ViewReset, move |_| {
        first_log.borrow_mut().push("remover");
        if let Some(subscription) = target.borrow().as_ref() {
            subscription.unsubscribe();
        }
    });
    *victim.borrow_mut() = Some(bus.subscribe(Topic::ViewReset, recorder(&log, "removed")));

    bus.publish(EditorEvent::ViewReset);
    bus.publish(EditorEvent::ViewReset);
    assert_eq!(*log.borrow(), vec!["remover", "remover"]);
    assert_eq!(bus.subscriber_count(Topic::ViewReset), 1);
}

#[test]
fn test_nested_publish_completes_before_outer_continues() {
    let bus = EventBus::new();
    let log: Log = Rc::default();

    let inner_bus = bus.downgrade();
    let outer_log = Rc::clone(&log);
    bus.subscribe(Topic::CropStarted, move |_| {
        outer_log.borrow_mut().push("outer start");
        inner_bus.publish(EditorEvent::ViewReset);
        outer_log.borrow_mut().push("outer end");
    });
    bus.subscribe(Topic::ViewReset, recorder(&log, "nested"));
    bus.subscribe(Topic::CropStarted, recorder(&log, "second outer"));

    bus.publish(EditorEvent::CropStarted);
    assert_eq!(
        *log.borrow(),
        vec!["outer start", "nested", "outer end", "second outer"]
    );
}

#[test]
fn test_topics_have_stable_names() {
    assert_eq!(Topic::FileLoaded.as_str(), "file:loaded");
    assert_eq!(Topic::HistorySnapshot.to_string(), "history:snapshot");
    assert_eq!(EditorEvent::ElementDeselected.topic(), Topic::ElementDeselected);
}
