//! Delivery of emitted events to the listeners of a bus.

use std::{cell::RefCell, rc::Rc};

use event_bus::{BusEvent, EventBus, Wildcard};

use common::*;

#[test]
fn test_emit_delivers_payload() {
    let bus = EventBus::new();
    let received = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&received);
    bus.on(move |data: &Data| log.borrow_mut().push(data.clone()));

    bus.emit(Data { foo: 42 });

    assert_eq!(*received.borrow(), [Data { foo: 42 }]);
}

#[test]
fn test_emit_preserves_payload_fields() {
    let bus = EventBus::new();
    let received = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&received);
    bus.on(move |err: &ErrorEvent| *slot.borrow_mut() = Some(err.0.clone()));

    bus.emit(ErrorEvent("connection reset".to_string()));

    assert_eq!(received.borrow().as_deref(), Some("connection reset"));
}

#[test]
fn test_listeners_called_in_registration_order() {
    let bus = EventBus::new();
    let journal = journal();

    on_data(&bus, &journal, "h1");
    on_data(&bus, &journal, "h2");
    on_data(&bus, &journal, "h3");

    bus.emit(Data { foo: 1 });

    assert_eq!(entries(&journal), ["h1:1", "h2:1", "h3:1"]);
}

#[test]
fn test_emit_without_listeners_is_noop() {
    let bus = EventBus::new();

    bus.emit(Data { foo: 1 });
    bus.emit(Close);

    assert!(bus.event_names().is_empty());
}

#[test]
fn test_wildcard_receives_name_and_payload() {
    let bus = EventBus::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    bus.on::<Wildcard>(move |event| log.borrow_mut().push(event.clone()));

    bus.emit(Data { foo: 1 });
    bus.emit(Close);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);

    assert_eq!(seen[0].event_name(), Data::NAME);
    assert_eq!(seen[0].downcast::<Data>(), Some(&Data { foo: 1 }));
    assert_eq!(seen[1].event_name(), "close");
    assert_eq!(seen[1].downcast::<Close>(), Some(&Close));
    assert!(seen[1].downcast::<Data>().is_none());
}

#[test]
fn test_wildcard_fires_before_event_listeners() {
    let bus = EventBus::new();
    let journal = journal();

    on_data(&bus, &journal, "data");
    on_any(&bus, &journal);
    on_close(&bus, &journal, "close");

    bus.emit(Data { foo: 3 });
    bus.emit(Close);

    assert_eq!(entries(&journal), ["*:data", "data:3", "*:close", "close"]);
}

#[test]
fn test_listener_can_emit_other_events() {
    let bus = EventBus::new();
    let journal = journal();

    let inner_bus = bus.clone();
    bus.on(move |data: &Data| {
        if data.foo == 0 {
            inner_bus.emit(Close);
        }
    });
    on_close(&bus, &journal, "closed");
    on_any(&bus, &journal);

    bus.emit(Data { foo: 0 });

    assert_eq!(entries(&journal), ["*:data", "*:close", "closed"]);
}

#[derive(event_bus::Event, Debug, PartialEq)]
#[event(name = "wrapped")]
struct Wrapped<T>(T);

#[test]
fn test_generic_events_are_routed_per_instantiation() {
    let bus = EventBus::new();
    let journal = journal();

    let log = Rc::clone(&journal);
    bus.on(move |wrapped: &Wrapped<u32>| log.borrow_mut().push(format!("u32:{}", wrapped.0)));
    let log = Rc::clone(&journal);
    bus.on(move |wrapped: &Wrapped<String>| log.borrow_mut().push(format!("string:{}", wrapped.0)));
    on_any(&bus, &journal);

    bus.emit(Wrapped(7_u32));
    bus.emit(Wrapped("seven".to_string()));

    assert_eq!(<Wrapped<u32>>::NAME, "wrapped");
    assert_eq!(
        entries(&journal),
        ["*:wrapped", "u32:7", "*:wrapped", "string:seven"]
    );
}
