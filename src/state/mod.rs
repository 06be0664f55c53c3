// Thread registry
//
// Maps process-unique thread identifiers to their diagnostics sinks. Sinks are
// created lazily on a thread's first log call; only the map mutation itself is
// done under the write lock, so the common "sink already exists" path only takes
// a shared read lock.

pub mod notifier;

pub use notifier::{ChangeNotifier, DiagnosticsChange, ListenerId};

use crate::models::DiagnosticsData;
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Display name of the first thread that logs
pub const FIRST_THREAD_NAME: &str = "Application";

/// Name used for threads spawned without a name
pub const UNNAMED_THREAD_NAME: &str = "Thread";

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Process-unique integer identifier of the calling thread.
///
/// Identifiers are assigned on first use and never reused within a process.
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}

/// Display name for a newly registered thread.
///
/// `registered` is the number of sinks registered before this one.
pub fn display_name(registered: usize, thread_name: Option<&str>) -> String {
    if registered == 0 {
        FIRST_THREAD_NAME.to_string()
    } else {
        format!("{} ({})", thread_name.unwrap_or(UNNAMED_THREAD_NAME), registered)
    }
}

/// Outcome of resolving the calling thread's sink
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The thread already had a sink
    Existing(Arc<DiagnosticsData>),

    /// A sink was created by this call and still needs initializing
    Registered(Arc<DiagnosticsData>),
}

impl Resolution {
    pub fn data(&self) -> &Arc<DiagnosticsData> {
        match self {
            Resolution::Existing(data) | Resolution::Registered(data) => data,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Resolution::Registered(_))
    }
}

struct RegistryInner {
    sinks: IndexMap<u64, Arc<DiagnosticsData>>,
    thread_count: usize,
}

/// Thread-safe registry of per-thread sinks.
///
/// Exactly one sink exists per thread identifier: lookups take the read lock and
/// misses re-check under the write lock before inserting, so concurrent first-time
/// loggers never produce duplicates or lose entries.
pub struct ThreadRegistry {
    main_thread_id: u64,
    folder: Utf8PathBuf,
    recent_capacity: usize,
    inner: RwLock<RegistryInner>,
}

impl ThreadRegistry {
    /// Create a registry for sinks in `folder` whose main thread is the calling thread
    pub fn new(folder: impl Into<Utf8PathBuf>, recent_capacity: usize) -> Self {
        Self::with_main_thread(current_thread_id(), folder, recent_capacity)
    }

    pub fn with_main_thread(
        main_thread_id: u64,
        folder: impl Into<Utf8PathBuf>,
        recent_capacity: usize,
    ) -> Self {
        Self {
            main_thread_id,
            folder: folder.into(),
            recent_capacity,
            inner: RwLock::new(RegistryInner {
                sinks: IndexMap::new(),
                thread_count: 0,
            }),
        }
    }

    pub fn main_thread_id(&self) -> u64 {
        self.main_thread_id
    }

    pub fn is_main_thread(&self, thread_id: u64) -> bool {
        thread_id == self.main_thread_id
    }

    /// Look up the sink for `thread_id`, registering a new one if absent.
    ///
    /// A new sink is inserted with its final file path, so concurrent snapshots
    /// never see a half-built entry. Its file is not open yet: the caller opens it
    /// after the lock has been released.
    pub fn resolve(&self, thread_id: u64, thread_name: Option<&str>) -> Resolution {
        if let Some(data) = self.inner.read().sinks.get(&thread_id) {
            return Resolution::Existing(Arc::clone(data));
        }

        let mut inner = self.inner.write();
        if let Some(data) = inner.sinks.get(&thread_id) {
            return Resolution::Existing(Arc::clone(data));
        }

        let name = display_name(inner.thread_count, thread_name);
        let data = Arc::new(DiagnosticsData::new(
            name,
            thread_id,
            &self.folder,
            self.recent_capacity,
        ));
        inner.sinks.insert(thread_id, Arc::clone(&data));
        inner.thread_count += 1;

        Resolution::Registered(data)
    }

    pub fn get(&self, thread_id: u64) -> Option<Arc<DiagnosticsData>> {
        self.inner.read().sinks.get(&thread_id).cloned()
    }

    /// All registered sinks in registration order
    pub fn snapshot(&self) -> Vec<Arc<DiagnosticsData>> {
        self.inner.read().sinks.values().cloned().collect()
    }

    /// Remove and return every sink, resetting the registration counter
    pub fn drain(&self) -> Vec<Arc<DiagnosticsData>> {
        let mut inner = self.inner.write();
        inner.thread_count = 0;
        inner.sinks.drain(..).map(|(_, data)| data).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sinks.is_empty()
    }

    /// Number of registrations since creation or the last drain
    pub fn thread_count(&self) -> usize {
        self.inner.read().thread_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_current_thread_id_is_stable_per_thread() {
        let here = current_thread_id();
        assert_eq!(here, current_thread_id());

        let other = thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, other);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name(0, Some("main")), "Application");
        assert_eq!(display_name(1, Some("worker")), "worker (1)");
        assert_eq!(display_name(3, None), "Thread (3)");
    }

    #[test]
    fn test_resolve_registers_once() {
        let registry = ThreadRegistry::with_main_thread(1, "diagnostics", 8);

        let first = registry.resolve(1, Some("main"));
        assert!(first.is_registered());
        assert_eq!(first.data().name(), "Application");

        let second = registry.resolve(1, Some("main"));
        assert!(!second.is_registered());
        assert!(Arc::ptr_eq(first.data(), second.data()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registered_sink_has_file_path_before_open() {
        let registry = ThreadRegistry::with_main_thread(1, "run-folder", 8);

        let expected = camino::Utf8Path::new("run-folder").join("Thread-4.log");

        let resolution = registry.resolve(4, None);

        assert!(resolution.is_registered());
        assert_eq!(resolution.data().file_path(), expected);
        assert_eq!(registry.snapshot()[0].summary().file_path, expected);
    }

    #[test]
    fn test_resolve_names_subsequent_threads() {
        let registry = ThreadRegistry::with_main_thread(1, "diagnostics", 8);

        registry.resolve(1, None);
        let worker = registry.resolve(2, Some("worker"));
        let io = registry.resolve(3, Some("io"));

        assert_eq!(worker.data().name(), "worker (1)");
        assert_eq!(io.data().name(), "io (2)");
        assert_eq!(registry.thread_count(), 3);
    }

    #[test]
    fn test_snapshot_preserves_registration_order() {
        let registry = ThreadRegistry::with_main_thread(10, "diagnostics", 8);
        registry.resolve(30, None);
        registry.resolve(10, None);
        registry.resolve(20, None);

        let ids: Vec<u64> = registry.snapshot().iter().map(|d| d.thread_id()).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = ThreadRegistry::with_main_thread(1, "diagnostics", 8);
        registry.resolve(1, None);
        registry.resolve(2, None);

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.thread_count(), 0);
    }

    #[test]
    fn test_concurrent_resolve_one_entry_per_thread() {
        let registry = Arc::new(ThreadRegistry::with_main_thread(0, "diagnostics", 8));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let id = current_thread_id();
                    let mut registered = 0;
                    for _ in 0..100 {
                        if registry.resolve(id, Some("worker")).is_registered() {
                            registered += 1;
                        }
                    }
                    registered
                })
            })
            .collect();

        let registrations: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(registrations, 16);
        assert_eq!(registry.len(), 16);
        assert_eq!(registry.thread_count(), 16);
    }
}
