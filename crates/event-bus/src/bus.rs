use crate::{
    listener::{Callback, Listener},
    tid, BusConfig, BusEvent, Error, FaultPolicy, HandlerFault, ListenerId, Unsubscribe, Wildcard,
};

use std::{
    any::{Any, TypeId},
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt::{Debug, Formatter},
    mem,
    panic::{self, AssertUnwindSafe},
    rc::Rc,
};

pub type EventBusResult<T> = Result<T, Error>;

/// Synchronous, in-process event bus with typed events.
///
/// Every [`EventBus::new`] call creates an isolated registry. Cloning the bus returns another
/// handle to the same registry, which is how a listener subscribes or emits from inside a
/// dispatch.
///
/// Listeners run inline, on the caller's stack, before [`EventBus::emit`] returns:
/// [`Wildcard`] listeners first, then the listeners of the emitted event, each group in
/// registration order. Every group is dispatched from a snapshot taken when the group starts, so
/// listeners added during a dispatch don't receive the in-flight event and listeners removed
/// during a dispatch still receive it.
///
/// # Examples
/// ```
/// use event_bus::{Event, EventBus, Wildcard};
/// use std::{cell::RefCell, rc::Rc};
///
/// #[derive(Event)]
/// #[event(name = "data")]
/// struct Data {
///     foo: u32,
/// }
///
/// let bus = EventBus::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let log = Rc::clone(&seen);
/// bus.on::<Wildcard>(move |event| log.borrow_mut().push(event.event_name().to_string()));
///
/// let log = Rc::clone(&seen);
/// let unsubscribe = bus.on(move |data: &Data| log.borrow_mut().push(data.foo.to_string()));
///
/// bus.emit(Data { foo: 42 });
/// unsubscribe.unsubscribe();
/// bus.emit(Data { foo: 43 });
///
/// assert_eq!(*seen.borrow(), ["data", "42", "data"]);
/// ```
#[derive(Clone, Default)]
pub struct EventBus {
    pub(crate) shared: Rc<Shared>,
}

/// State shared between the bus handles and the unsubscribe tokens.
#[derive(Default)]
pub(crate) struct Shared {
    config: BusConfig,
    pub(crate) registry: RefCell<Registry>,
}

/// Listeners of a single event.
struct Slot {
    name: &'static str,
    listeners: Vec<Listener>,
    /// Whether the `max_listeners` warning was already logged for this event.
    warned: bool,
}

impl Slot {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Vec::new(),
            warned: false,
        }
    }
}

/// Map of event type id to the listeners registered for it. The [`Wildcard`] slot is created
/// with the registry and never removed.
pub(crate) struct Registry {
    slots: HashMap<TypeId, Slot>,
    next_id: u64,
}

impl Default for Registry {
    fn default() -> Self {
        let mut slots = HashMap::new();
        slots.insert(tid::<Wildcard>(), Slot::new(Wildcard::NAME));

        Self { slots, next_id: 0 }
    }
}

impl Registry {
    fn next_id(&mut self) -> ListenerId {
        self.next_id += 1;

        ListenerId::new(self.next_id)
    }

    /// Appends listener to the slot, creating it if absent. Returns the number of listeners in
    /// the slot if it just went over `max_listeners` for the first time.
    pub(crate) fn push(
        &mut self,
        key: TypeId,
        name: &'static str,
        listener: Listener,
        max_listeners: usize,
    ) -> Option<usize> {
        let slot = self.slots.entry(key).or_insert_with(|| Slot::new(name));
        slot.listeners.push(listener);

        let count = slot.listeners.len();
        if max_listeners == 0 || count <= max_listeners || slot.warned {
            return None;
        }

        slot.warned = true;
        Some(count)
    }

    pub(crate) fn remove(&mut self, key: TypeId, id: ListenerId) -> Option<Listener> {
        let slot = self.slots.get_mut(&key)?;
        let index = slot.listeners.iter().position(|listener| listener.id == id)?;

        Some(slot.listeners.remove(index))
    }

    pub(crate) fn contains(&self, key: TypeId, id: ListenerId) -> bool {
        self.slots
            .get(&key)
            .is_some_and(|slot| slot.listeners.iter().any(|listener| listener.id == id))
    }

    fn snapshot(&self, key: TypeId) -> Vec<Listener> {
        self.slots
            .get(&key)
            .map(|slot| slot.listeners.clone())
            .unwrap_or_default()
    }

    fn take(&mut self, key: TypeId) -> Vec<Listener> {
        let Some(slot) = self.slots.get_mut(&key) else {
            return Vec::new();
        };

        slot.warned = false;
        mem::take(&mut slot.listeners)
    }

    fn take_all(&mut self) -> Vec<Listener> {
        self.slots
            .values_mut()
            .flat_map(|slot| {
                slot.warned = false;
                mem::take(&mut slot.listeners)
            })
            .collect()
    }

    fn count(&self, key: TypeId) -> usize {
        self.slots
            .get(&key)
            .map_or(0, |slot| slot.listeners.len())
    }
}

impl EventBus {
    /// Creates a bus with an empty registry and the default [`BusConfig`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                config,
                registry: RefCell::default(),
            }),
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.shared.config
    }

    /// Registers `handler` for every emission of `E`. Use [`Wildcard`] as `E` to receive every
    /// event emitted on the bus.
    ///
    /// Registering the same handler twice adds two independent listeners.
    pub fn on<E: BusEvent>(&self, handler: impl Fn(&E) + 'static) -> Unsubscribe {
        let id = self.shared.registry.borrow_mut().next_id();

        self.register::<E>(id, erase(handler))
    }

    /// Registers `handler` for the next emission of `E` only.
    ///
    /// The listener removes itself before `handler` is called, so a re-entrant emission of `E`
    /// from inside `handler` doesn't reach it again. The returned token cancels the listener if
    /// it hasn't fired yet.
    pub fn once<E: BusEvent>(&self, handler: impl Fn(&E) + 'static) -> Unsubscribe {
        let id = self.shared.registry.borrow_mut().next_id();
        let shared = Rc::downgrade(&self.shared);
        let fired = Cell::new(false);

        let wrapper = move |event: &E| {
            if fired.replace(true) {
                return;
            }

            if let Some(shared) = shared.upgrade() {
                let removed = shared.registry.borrow_mut().remove(tid::<E>(), id);
                drop(removed);
            }

            handler(event);
        };

        self.register::<E>(id, erase(wrapper))
    }

    fn register<E: BusEvent>(&self, id: ListenerId, callback: Callback) -> Unsubscribe {
        let key = tid::<E>();
        let max_listeners = self.shared.config.max_listeners;

        let overflow = self.shared.registry.borrow_mut().push(
            key,
            E::NAME,
            Listener::new(id, callback),
            max_listeners,
        );

        tracing::trace!(event = E::NAME, listener = %id, "Listener registered");

        if let Some(count) = overflow {
            tracing::warn!(
                event = E::NAME,
                "Possible listener leak: {} listeners registered, max is {}",
                count,
                max_listeners,
            );
        }

        Unsubscribe::new(Rc::downgrade(&self.shared), key, E::NAME, id)
    }

    /// Dispatches `event` to the [`Wildcard`] listeners and then to the listeners of `E`.
    ///
    /// With [`FaultPolicy::Propagate`] a panicking listener unwinds out of this method and the
    /// listeners after it are skipped. With [`FaultPolicy::Isolate`] the panic is logged and the
    /// remaining listeners still run.
    ///
    /// Emitting a [`Wildcard`] directly forwards it to the wildcard listeners as is.
    pub fn emit<E: BusEvent>(&self, event: E) {
        match self.shared.config.fault_policy {
            FaultPolicy::Propagate => {
                self.dispatch(event, false);
            }
            FaultPolicy::Isolate => {
                for fault in self.dispatch(event, true) {
                    tracing::error!(
                        event = E::NAME,
                        listener = %fault.listener,
                        "Listener panicked: {}",
                        fault.message
                    );
                }
            }
        }
    }

    /// Dispatches `event` like [`EventBus::emit`], but always isolates panicking listeners and
    /// reports them as [`Error::HandlerPanicked`] once every listener has run.
    pub fn try_emit<E: BusEvent>(&self, event: E) -> EventBusResult<()> {
        let faults = self.dispatch(event, true);

        if faults.is_empty() {
            return Ok(());
        }

        Err(Error::HandlerPanicked {
            event: E::NAME,
            faults,
        })
    }

    fn dispatch<E: BusEvent>(&self, event: E, isolate: bool) -> Vec<HandlerFault> {
        tracing::trace!(event = E::NAME, "Dispatching event");

        let payload: Rc<dyn Any> = Rc::new(event);
        let mut faults = Vec::new();

        let wildcard = match payload.downcast_ref::<Wildcard>() {
            Some(forwarded) => forwarded.clone(),
            None => Wildcard::new(E::NAME, Rc::clone(&payload)),
        };
        self.dispatch_slot(tid::<Wildcard>(), &wildcard, isolate, &mut faults);

        if tid::<E>() != tid::<Wildcard>() {
            self.dispatch_slot(tid::<E>(), &*payload, isolate, &mut faults);
        }

        faults
    }

    fn dispatch_slot(
        &self,
        key: TypeId,
        payload: &dyn Any,
        isolate: bool,
        faults: &mut Vec<HandlerFault>,
    ) {
        let snapshot = self.shared.registry.borrow().snapshot(key);

        tracing::trace!(listeners = snapshot.len(), "Calling listeners");

        for listener in snapshot {
            if !isolate {
                listener.call(payload);
                continue;
            }

            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| listener.call(payload))) {
                faults.push(HandlerFault::new(listener.id, panic));
            }
        }
    }

    /// Removes every listener of `E`. `bus.clear::<Wildcard>()` removes only the wildcard
    /// listeners.
    pub fn clear<E: BusEvent>(&self) {
        let removed = self.shared.registry.borrow_mut().take(tid::<E>());

        tracing::debug!(event = E::NAME, removed = removed.len(), "Listeners cleared");
    }

    /// Removes every listener of every event, including the wildcard listeners.
    pub fn clear_all(&self) {
        let removed = self.shared.registry.borrow_mut().take_all();

        tracing::debug!(removed = removed.len(), "All listeners cleared");
    }

    pub fn listener_count<E: BusEvent>(&self) -> usize {
        self.shared.registry.borrow().count(tid::<E>())
    }

    pub fn has_listeners<E: BusEvent>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    /// Names of the events with at least one listener, in no particular order. Wildcard
    /// listeners are reported as [`WILDCARD`](crate::WILDCARD).
    pub fn event_names(&self) -> Vec<&'static str> {
        self.shared
            .registry
            .borrow()
            .slots
            .values()
            .filter(|slot| !slot.listeners.is_empty())
            .map(|slot| slot.name)
            .collect()
    }
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let registry = self.shared.registry.borrow();
        let listeners: usize = registry.slots.values().map(|slot| slot.listeners.len()).sum();

        f.debug_struct("EventBus")
            .field("config", &self.shared.config)
            .field("listeners", &listeners)
            .finish()
    }
}

/// Wraps a typed handler into a [`Callback`] that downcasts the emitted event.
fn erase<E, F>(handler: F) -> Callback
where
    E: BusEvent,
    F: Fn(&E) + 'static,
{
    Rc::new(move |event: &dyn Any| {
        if let Some(event) = event.downcast_ref::<E>() {
            handler(event);
        }
    })
}
