use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::record::HistoryRecord;

/// Store state: the ordered collection (most-recently-saved first) plus a
/// flag that flips once startup rehydration has committed.
#[derive(Debug, Default)]
pub struct HistoryState {
    pub records: Vec<HistoryRecord>,
    pub catalog_synced: bool,
}

type Listener = Box<dyn FnMut(&HistoryState) + Send>;

struct ListenerSlot {
    id: u64,
    notify: Listener,
}

/// Single source of truth for the current session's watch history.
///
/// All mutations go through [`update`](Self::update) and are serialized by
/// the state lock; listeners run synchronously inside the commit, so they
/// observe commits in order and must not call back into the store.
#[derive(Default)]
pub struct HistoryStore {
    state: Mutex<HistoryState>,
    listeners: Mutex<Vec<ListenerSlot>>,
    next_listener_id: AtomicU64,
}

/// Handle returned by [`HistoryStore::subscribe`]; tears the listener down
/// on [`unsubscribe`](Self::unsubscribe). Dropping the handle without
/// unsubscribing leaves the listener registered for the store's lifetime.
pub struct Subscription {
    store: Arc<HistoryStore>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        lock(&self.store.listeners).retain(|slot| slot.id != self.id);
    }
}

impl HistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Apply one mutation and notify listeners, exactly once per call.
    pub fn update(&self, f: impl FnOnce(&mut HistoryState)) {
        let mut state = lock(&self.state);
        f(&mut state);
        for slot in lock(&self.listeners).iter_mut() {
            (slot.notify)(&state);
        }
    }

    /// Atomically swap the whole collection.
    pub fn replace_all(&self, records: Vec<HistoryRecord>, catalog_synced: bool) {
        self.update(|state| {
            state.records = records;
            state.catalog_synced = catalog_synced;
        });
    }

    /// Read the latest committed state.
    pub fn with_state<R>(&self, f: impl FnOnce(&HistoryState) -> R) -> R {
        f(&lock(&self.state))
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.with_state(|state| state.records.clone())
    }

    pub fn catalog_synced(&self) -> bool {
        self.with_state(|state| state.catalog_synced)
    }

    /// Register a listener on a selected slice of state.
    ///
    /// `on_change` fires after any commit whose selected value differs from
    /// the previous one; it does not fire at subscribe time.
    pub fn subscribe<T, S, F>(self: Arc<Self>, selector: S, mut on_change: F) -> Subscription
    where
        T: PartialEq + Send + 'static,
        S: Fn(&HistoryState) -> T + Send + 'static,
        F: FnMut(&T) + Send + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let mut last = self.with_state(&selector);
        let notify: Listener = Box::new(move |state| {
            let next = selector(state);
            if next != last {
                on_change(&next);
                last = next;
            }
        });
        lock(&self.listeners).push(ListenerSlot { id, notify });
        Subscription { store: self, id }
    }
}

// A poisoned lock only means a panic mid-commit elsewhere; the state itself
// is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
