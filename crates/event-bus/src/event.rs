use std::{
    any::Any,
    fmt::{Debug, Formatter},
    rc::Rc,
};

/// Identifier reserved for [`Wildcard`] listeners.
pub const WILDCARD: &str = "*";

/// Trait for events that can be emitted through the [`EventBus`](crate::EventBus). Use
/// [`event_bus_macros::Event`] derive macro to implement it.
///
/// The implementing type is both the event identifier and its payload: subscribing to `Data`
/// registers a handler receiving `&Data`. Payload-less events are unit structs.
///
/// Listeners are routed by the [`TypeId`](std::any::TypeId) of the event, so two distinct types
/// sharing a `NAME` are still distinct events. `NAME` is what wildcard listeners see in
/// [`Wildcard::event_name`].
pub trait BusEvent: 'static {
    const NAME: &'static str;
}

/// Record delivered to listeners registered for every emission.
///
/// Subscribe with `bus.on::<Wildcard>(..)`. Wildcard listeners run before the listeners of the
/// emitted event and receive its name together with the type-erased payload.
#[derive(Clone)]
pub struct Wildcard {
    /// [`BusEvent::NAME`] of the emitted event.
    pub event_name: &'static str,

    /// The emitted event itself.
    pub payload: Rc<dyn Any>,
}

impl BusEvent for Wildcard {
    const NAME: &'static str = WILDCARD;
}

impl Wildcard {
    pub(crate) fn new(event_name: &'static str, payload: Rc<dyn Any>) -> Self {
        Self {
            event_name,
            payload,
        }
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    /// Type-erased payload, the union over every event type of the bus.
    pub fn payload(&self) -> &dyn Any {
        &*self.payload
    }

    /// Returns the payload if the emitted event is of type `E`.
    pub fn downcast<E: BusEvent>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }

    /// Checks whether the emitted event is of type `E`.
    pub fn is<E: BusEvent>(&self) -> bool {
        self.payload.is::<E>()
    }
}

impl Debug for Wildcard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wildcard")
            .field("event_name", &self.event_name)
            .finish_non_exhaustive()
    }
}
