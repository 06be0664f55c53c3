// Change notification
//
// Fired once per new thread registration so a live view can re-fetch
// `Diagnostics::data`. Two observer styles are offered: a tokio broadcast
// channel (drop the receiver to unsubscribe) and synchronous callbacks.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Name of the only observable property
pub const DATA_PROPERTY: &str = "Data";

/// Change events emitted by the diagnostics facility
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticsChange {
    /// A new thread sink was registered; the `Data` snapshot is stale
    DataChanged { thread_id: u64, name: String },
}

impl DiagnosticsChange {
    /// Logical property name carried by the event
    pub fn property_name(&self) -> &'static str {
        match self {
            DiagnosticsChange::DataChanged { .. } => DATA_PROPERTY,
        }
    }
}

/// Handle returned by [`ChangeNotifier::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&DiagnosticsChange) + Send + Sync>;

pub struct ChangeNotifier {
    tx: broadcast::Sender<DiagnosticsChange>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Receive all future change events
    pub fn subscribe(&self) -> broadcast::Receiver<DiagnosticsChange> {
        self.tx.subscribe()
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&DiagnosticsChange) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);
        self.listeners.write().push((id, listener));
        id
    }

    /// Returns `false` if the listener was already removed
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver `change` to every observer.
    ///
    /// Callbacks run without any lock held, so they may log or add and remove
    /// listeners. Returns the number of broadcast receivers reached.
    pub fn notify(&self, change: DiagnosticsChange) -> usize {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(&change);
        }

        // No receivers is fine
        self.tx.send(change).unwrap_or(0)
    }
}
