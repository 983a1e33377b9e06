use crate::scheduler::lock;
use crowd_core::{RiskSnapshot, SafetyActionsSnapshot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Change notification delivered to subscribers.
#[derive(Clone, Debug)]
pub enum TelemetryUpdate {
    /// Both snapshots from one generator tick.
    Snapshot {
        sequence: u64,
        risk: Arc<RiskSnapshot>,
        actions: Arc<SafetyActionsSnapshot>,
    },
    Connectivity(bool),
}

/// Read-only view of the store at one instant.
#[derive(Clone, Debug, Default)]
pub struct TelemetryView {
    pub risk: Option<Arc<RiskSnapshot>>,
    pub actions: Option<Arc<SafetyActionsSnapshot>>,
    pub connected: bool,
    /// Number of snapshots published so far.
    pub sequence: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&TelemetryUpdate) + Send + Sync>;

#[derive(Default)]
struct StoreShared {
    state: RwLock<TelemetryView>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
}

/// Holder of the latest telemetry. Cloning yields another handle to the same
/// store. Only the generator in this crate can publish.
#[derive(Clone, Default)]
pub struct TelemetryStore {
    shared: Arc<StoreShared>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> TelemetryView {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn risk(&self) -> Option<Arc<RiskSnapshot>> {
        self.view().risk
    }

    pub fn actions(&self) -> Option<Arc<SafetyActionsSnapshot>> {
        self.view().actions
    }

    pub fn is_connected(&self) -> bool {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .connected
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&TelemetryUpdate) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.shared.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Returns false when the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.shared.listeners);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.listeners).len()
    }

    /// Replaces both snapshots and returns the update to deliver. The caller
    /// hands it to [`TelemetryStore::notify`] once it holds no locks of its own.
    pub(crate) fn publish(
        &self,
        risk: RiskSnapshot,
        actions: SafetyActionsSnapshot,
    ) -> TelemetryUpdate {
        let mut state = self
            .shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let risk = Arc::new(risk);
        let actions = Arc::new(actions);
        state.risk = Some(Arc::clone(&risk));
        state.actions = Some(Arc::clone(&actions));
        state.sequence += 1;
        TelemetryUpdate::Snapshot {
            sequence: state.sequence,
            risk,
            actions,
        }
    }

    /// `None` when the flag already had that value.
    pub(crate) fn set_connected(&self, connected: bool) -> Option<TelemetryUpdate> {
        let mut state = self
            .shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if state.connected == connected {
            return None;
        }
        state.connected = connected;
        Some(TelemetryUpdate::Connectivity(connected))
    }

    pub(crate) fn notify(&self, update: &TelemetryUpdate) {
        // Listeners run without any store lock held so they can read the store.
        let listeners: Vec<Listener> = lock(&self.shared.listeners)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(update);
        }
    }
}
