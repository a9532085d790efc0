#![doc = include_str!("../README.md")]
mod bus;

pub use crate::bus::{EventBus, EventBusResult};
use std::any::TypeId;

mod config;
mod errors;
mod event;
mod listener;

pub use crate::config::{BusConfig, FaultPolicy};
pub use crate::errors::{Error, HandlerFault};
pub use crate::event::{BusEvent, Wildcard, WILDCARD};
pub use crate::listener::{ListenerId, Unsubscribe};

pub use event_bus_macros::Event;

// Lets `#[derive(Event)]` expand to `event_bus::BusEvent` inside this crate too.
extern crate self as event_bus;

/// Wraps retrieving [`std::any::TypeId`] for type T.
///
/// The registry of [`EventBus`] is keyed by it.
pub fn tid<T: 'static>() -> TypeId {
    TypeId::of::<T>()
}
