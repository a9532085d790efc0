use std::any::Any;

use crate::ListenerId;

/// Errors that can occur during the event dispatching.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// One or more listeners panicked while the event was dispatched with
    /// [`EventBus::try_emit`](crate::EventBus::try_emit). Every other listener still ran.
    #[error("{} listener(s) panicked while handling `{event}`", .faults.len())]
    HandlerPanicked {
        /// Name of the emitted event.
        event: &'static str,
        /// Failed listeners in the order they were called.
        faults: Vec<HandlerFault>,
    },
}

/// A listener that panicked during an isolated dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFault {
    pub listener: ListenerId,
    pub message: String,
}

impl HandlerFault {
    pub(crate) fn new(listener: ListenerId, panic: Box<dyn Any + Send>) -> Self {
        Self {
            listener,
            message: panic_message(panic),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(message) => *message,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}
