use std::{
    any::{Any, TypeId},
    fmt::{Debug, Display, Formatter},
    rc::{Rc, Weak},
};

use crate::bus::Shared;

/// Type-erased listener callback. It receives the emitted event as `&dyn Any` and downcasts it
/// to the type it was registered for.
pub(crate) type Callback = Rc<dyn Fn(&dyn Any)>;

/// Identity of a single registration. Unique within one [`EventBus`](crate::EventBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ListenerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry entry: a callback together with the identity of the registration that added it.
#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback,
}

impl Listener {
    pub(crate) fn new(id: ListenerId, callback: Callback) -> Self {
        Self { id, callback }
    }

    pub(crate) fn call(&self, event: &dyn Any) {
        (self.callback)(event);
    }
}

impl Debug for Listener {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener ({})", self.id)
    }
}

/// Token returned by [`EventBus::on`](crate::EventBus::on) and
/// [`EventBus::once`](crate::EventBus::once).
///
/// [`Unsubscribe::unsubscribe`] removes exactly the registration the token was returned for.
/// Calling it again, after [`EventBus::clear`](crate::EventBus::clear), after a `once` listener
/// has fired or after the bus was dropped does nothing.
///
/// Dropping the token does not unsubscribe.
#[derive(Clone)]
pub struct Unsubscribe {
    shared: Weak<Shared>,
    key: TypeId,
    event_name: &'static str,
    id: ListenerId,
}

impl Unsubscribe {
    pub(crate) fn new(
        shared: Weak<Shared>,
        key: TypeId,
        event_name: &'static str,
        id: ListenerId,
    ) -> Self {
        Self {
            shared,
            key,
            event_name,
            id,
        }
    }

    pub fn unsubscribe(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };

        let removed = shared.registry.borrow_mut().remove(self.key, self.id);

        if removed.is_some() {
            tracing::trace!(event = self.event_name, listener = %self.id, "Listener removed");
        }
    }

    /// Checks whether the registration is still present in the bus.
    pub fn is_subscribed(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.registry.borrow().contains(self.key, self.id))
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }

    /// Turns the token into a plain niladic closure.
    pub fn into_fn(self) -> impl Fn() {
        move || self.unsubscribe()
    }
}

impl Debug for Unsubscribe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("event_name", &self.event_name)
            .field("id", &self.id)
            .finish()
    }
}
