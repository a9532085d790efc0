//! Subscription lifecycle: `once`, unsubscribe tokens and their idempotence.

use std::{cell::Cell, rc::Rc};

use event_bus::{EventBus, Wildcard};

use common::*;

#[test]
fn test_once_fires_a_single_time() {
    let bus = EventBus::new();
    let calls = Rc::new(Cell::new(0));

    let counter = Rc::clone(&calls);
    bus.once(move |_: &Data| counter.set(counter.get() + 1));

    bus.emit(Data { foo: 1 });
    bus.emit(Data { foo: 1 });

    assert_eq!(calls.get(), 1);
    assert!(!bus.has_listeners::<Data>());
}

#[test]
fn test_unsubscribe_token_removes_listener() {
    let bus = EventBus::new();
    let journal = journal();

    let unsubscribe = on_data(&bus, &journal, "h");
    unsubscribe.unsubscribe();

    bus.emit(Data { foo: 123 });

    assert!(entries(&journal).is_empty());
}

#[test]
fn test_unsubscribe_once_before_it_fires() {
    let bus = EventBus::new();
    let called = Rc::new(Cell::new(false));

    let flag = Rc::clone(&called);
    let unsubscribe = bus.once(move |_: &Data| flag.set(true));
    unsubscribe.unsubscribe();

    bus.emit(Data { foo: 1 });

    assert!(!called.get());
}

#[test]
fn test_unsubscribe_once_after_it_fired() {
    let bus = EventBus::new();
    let calls = Rc::new(Cell::new(0));

    let counter = Rc::clone(&calls);
    let unsubscribe = bus.once(move |_: &Close| counter.set(counter.get() + 1));

    bus.emit(Close);
    unsubscribe.unsubscribe();
    bus.emit(Close);

    assert_eq!(calls.get(), 1);
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let bus = EventBus::new();
    let journal = journal();

    let first = on_data(&bus, &journal, "first");
    on_data(&bus, &journal, "second");

    first.unsubscribe();
    first.unsubscribe();
    first.clone().unsubscribe();

    bus.emit(Data { foo: 9 });

    assert_eq!(entries(&journal), ["second:9"]);
    assert_eq!(bus.listener_count::<Data>(), 1);
}

#[test]
fn test_unsubscribe_after_clear() {
    let bus = EventBus::new();
    let journal = journal();

    let token = on_data(&bus, &journal, "old");
    bus.clear_all();
    on_data(&bus, &journal, "new");

    token.unsubscribe();
    bus.emit(Data { foo: 2 });

    assert_eq!(entries(&journal), ["new:2"]);
}

#[test]
fn test_unsubscribe_wildcard() {
    let bus = EventBus::new();
    let journal = journal();

    let unsubscribe = on_any(&bus, &journal);
    bus.emit(Close);
    unsubscribe.unsubscribe();
    bus.emit(Close);

    assert_eq!(entries(&journal), ["*:close"]);
    assert_eq!(bus.listener_count::<Wildcard>(), 0);
}

#[test]
fn test_unsubscribe_as_closure() {
    let bus = EventBus::new();
    let journal = journal();

    let unsubscribers: Vec<Box<dyn Fn()>> = vec![
        Box::new(on_data(&bus, &journal, "a").into_fn()),
        Box::new(on_close(&bus, &journal, "b").into_fn()),
    ];
    unsubscribers.iter().for_each(|unsubscribe| unsubscribe());

    bus.emit(Data { foo: 1 });
    bus.emit(Close);

    assert!(entries(&journal).is_empty());
}
