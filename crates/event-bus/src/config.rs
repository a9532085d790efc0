use serde::Deserialize;

/// Default number of listeners per event after which a warning is logged.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// What happens when a listener panics during [`EventBus::emit`](crate::EventBus::emit).
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// The panic unwinds out of `emit`. Listeners after the failing one are not called for that
    /// emission.
    #[default]
    Propagate,

    /// Each listener runs under `catch_unwind`. A panic is logged and dispatch goes on with the
    /// next listener.
    ///
    /// The process panic hook still runs before the panic is caught, so with the default hook
    /// every isolated panic is also printed to stderr. Install a quieter hook with
    /// [`std::panic::set_hook`] if that output is unwanted.
    Isolate,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    #[serde(default)]
    pub fault_policy: FaultPolicy,

    /// Number of listeners per event after which a warning is logged. It is not a hard limit,
    /// registration always succeeds. `0` disables the check.
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
}

fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            fault_policy: FaultPolicy::default(),
            max_listeners: default_max_listeners(),
        }
    }
}

impl BusConfig {
    /// Sets the fault policy.
    pub fn set_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;

        self
    }

    /// Sets the listener count warning threshold.
    pub fn set_max_listeners(mut self, max_listeners: usize) -> Self {
        self.max_listeners = max_listeners;

        self
    }
}
