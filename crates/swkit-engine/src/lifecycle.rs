//! Worker lifecycle states and events.

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Install in progress (store opening, precache population).
    #[default]
    Installing,
    /// Installed, takeover requested.
    Installed,
    /// Activation in progress (claiming clients).
    Activating,
    /// Active and intercepting requests.
    Active,
    /// Install failed; this instance will never serve.
    Redundant,
}

impl WorkerState {
    /// Check if the worker is intercepting requests.
    pub fn is_active(&self) -> bool {
        matches!(self, WorkerState::Active)
    }

    /// Check if this instance is permanently out of service.
    pub fn is_redundant(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

/// Observable worker events, emitted on the engine's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Lifecycle state changed.
    StateChange { state: WorkerState },
    /// Precache population finished.
    PrecacheComplete { entries: usize },
    /// Install finished; this instance wants immediate takeover instead of
    /// waiting for prior instances to drain.
    TakeoverRequested,
    /// Activation claimed the given number of client contexts.
    ClientsClaimed { count: usize },
}
