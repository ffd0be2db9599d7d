use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::status::RequestStatus;

type SharedOutcome = Shared<BoxFuture<'static, RequestStatus>>;

/// Status, value and error of one key, read together
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot<V> {
    pub status: RequestStatus,
    pub value: Option<V>,
    pub error: Option<String>,
}

impl<V> EntrySnapshot<V> {
    fn idle() -> Self {
        Self {
            status: RequestStatus::Idle,
            value: None,
            error: None,
        }
    }
}

struct InFlight {
    id: u64,
    outcome: SharedOutcome,
}

struct Inner<K, V> {
    name: &'static str,
    // status and value live in the same entry so they always change together
    entries: RwLock<HashMap<K, EntrySnapshot<V>>>,
    in_flight: Mutex<HashMap<K, InFlight>>,
    epoch: AtomicU64,
    next_fetch_id: AtomicU64,
}

/// Keyed entity cache with a request lifecycle per key
///
/// Cloning is cheap and every clone sees the same state. Reads are plain
/// lookups; writes only happen through [`RequestStore::dispatch`] (and the
/// explicit seeding/reset helpers), and a key never has more than one fetch
/// outstanding: later dispatches attach to the running one.
pub struct RequestStore<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for RequestStore<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> RequestStore<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// `name` only shows up in logs
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                epoch: AtomicU64::new(0),
                next_fetch_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// `Idle` for keys that were never fetched
    pub fn status(&self, key: &K) -> RequestStatus {
        self.inner
            .entries
            .read()
            .get(key)
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    /// Last successfully fetched value, if any
    pub fn entity(&self, key: &K) -> Option<V> {
        self.inner
            .entries
            .read()
            .get(key)
            .and_then(|entry| entry.value.clone())
    }

    /// Message of the latest failure, cleared when the key is fetched again
    pub fn error(&self, key: &K) -> Option<String> {
        self.inner
            .entries
            .read()
            .get(key)
            .and_then(|entry| entry.error.clone())
    }

    pub fn snapshot(&self, key: &K) -> EntrySnapshot<V> {
        self.inner
            .entries
            .read()
            .get(key)
            .cloned()
            .unwrap_or_else(EntrySnapshot::idle)
    }

    /// Start fetching `key` unless a fetch for it is already running
    ///
    /// The status flips to `Pending` before this returns. `fetcher` is only
    /// called when a new request is needed; its future runs on a spawned
    /// Tokio task, so dropping the returned handle does not cancel it.
    ///
    /// Must be called from within a Tokio runtime. `fetcher` runs without
    /// any store lock held, so it may itself dispatch on this store.
    pub fn dispatch<F, Fut, E>(&self, key: K, fetcher: F) -> FetchHandle
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        if let Some(handle) = self.attach(&self.inner.in_flight.lock(), &key) {
            return handle;
        }

        // futures are lazy: if another dispatch wins the race below, this
        // request is dropped without ever being polled
        let request = fetcher();

        let mut in_flight = self.inner.in_flight.lock();
        if let Some(handle) = self.attach(&in_flight, &key) {
            return handle;
        }

        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_pending(&key);
        info!(store = self.inner.name, key = ?key, "Fetch started");

        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let status = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(Ok(value)) => inner.fulfill(&task_key, epoch, value),
                Ok(Err(err)) => inner.reject(&task_key, epoch, err.to_string()),
                Err(_) => inner.reject(&task_key, epoch, "fetch task panicked".to_string()),
            };
            inner.finish(&task_key, id);
            status
        });

        let name = self.inner.name;
        let outcome = async move {
            match task.await {
                Ok(status) => status,
                Err(e) => {
                    warn!(store = name, "Fetch task did not complete: {}", e);
                    RequestStatus::Rejected
                }
            }
        }
        .boxed()
        .shared();

        in_flight.insert(
            key,
            InFlight {
                id,
                outcome: outcome.clone(),
            },
        );

        FetchHandle {
            outcome,
            coalesced: false,
        }
    }

    fn attach(&self, in_flight: &HashMap<K, InFlight>, key: &K) -> Option<FetchHandle> {
        let running = in_flight.get(key)?;
        debug!(store = self.inner.name, key = ?key, "Attaching to in-flight fetch");
        Some(FetchHandle {
            outcome: running.outcome.clone(),
            coalesced: true,
        })
    }

    /// `dispatch` and wait for the result to be committed
    pub async fn fetch<F, Fut, E>(&self, key: K, fetcher: F) -> RequestStatus
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.dispatch(key, fetcher).await
    }

    /// Store a value obtained some other way (list responses, snapshots)
    pub fn insert_fulfilled(&self, key: K, value: V) {
        let mut entries = self.inner.entries.write();
        entries.insert(
            key,
            EntrySnapshot {
                status: RequestStatus::Fulfilled,
                value: Some(value),
                error: None,
            },
        );
    }

    /// Current reset generation; pair with [`RequestStore::insert_fulfilled_if_current`]
    pub fn generation(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Seed a value unless the store was reset after `generation` was read
    ///
    /// For values that arrive as a side effect of another store's fetch
    /// (catalog entries, the random quote). Returns whether it was stored.
    pub fn insert_fulfilled_if_current(&self, generation: u64, key: K, value: V) -> bool {
        let mut entries = self.inner.entries.write();
        if self.inner.is_stale(generation) {
            debug!(store = self.inner.name, key = ?key, "Discarding seed from before reset");
            return false;
        }
        entries.insert(
            key,
            EntrySnapshot {
                status: RequestStatus::Fulfilled,
                value: Some(value),
                error: None,
            },
        );
        true
    }

    /// Forget one key. A fetch already running for it still commits.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner
            .entries
            .write()
            .remove(key)
            .and_then(|entry| entry.value)
    }

    /// Drop everything; fetches started before the reset never write back
    pub fn reset(&self) {
        let mut in_flight = self.inner.in_flight.lock();
        let mut entries = self.inner.entries.write();
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let dropped = entries.len();
        entries.clear();
        in_flight.clear();
        debug!(store = self.inner.name, dropped, "Store reset");
    }

    pub fn keys_with_status(&self, status: RequestStatus) -> Vec<K> {
        self.scan(|key, entry| (entry.status == status).then(|| key.clone()))
    }

    /// Every key that currently holds a value
    pub fn fulfilled_entries(&self) -> Vec<(K, V)> {
        self.scan(|key, entry| entry.value.clone().map(|value| (key.clone(), value)))
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.lock().len()
    }

    pub(crate) fn scan<R>(&self, mut f: impl FnMut(&K, &EntrySnapshot<V>) -> Option<R>) -> Vec<R> {
        self.inner
            .entries
            .read()
            .iter()
            .filter_map(|(key, entry)| f(key, entry))
            .collect()
    }

    pub(crate) fn retain(&self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let mut entries = self.inner.entries.write();
        let before = entries.len();
        entries.retain(|key, _| keep(key));
        before - entries.len()
    }
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    fn mark_pending(&self, key: &K) {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(EntrySnapshot::idle);
        entry.status = RequestStatus::Pending;
        entry.error = None;
    }

    fn fulfill(&self, key: &K, epoch: u64, value: V) -> RequestStatus {
        let mut entries = self.entries.write();
        if self.is_stale(epoch) {
            debug!(store = self.name, key = ?key, "Discarding result from before reset");
            return RequestStatus::Idle;
        }
        entries.insert(
            key.clone(),
            EntrySnapshot {
                status: RequestStatus::Fulfilled,
                value: Some(value),
                error: None,
            },
        );
        info!(store = self.name, key = ?key, "Fetch fulfilled");
        RequestStatus::Fulfilled
    }

    fn reject(&self, key: &K, epoch: u64, message: String) -> RequestStatus {
        let mut entries = self.entries.write();
        if self.is_stale(epoch) {
            debug!(store = self.name, key = ?key, "Discarding failure from before reset");
            return RequestStatus::Idle;
        }
        warn!(store = self.name, key = ?key, "Fetch rejected: {}", message);
        // previous value stays; a failed refresh must not erase good data
        let entry = entries
            .entry(key.clone())
            .or_insert_with(EntrySnapshot::idle);
        entry.status = RequestStatus::Rejected;
        entry.error = Some(message);
        RequestStatus::Rejected
    }

    fn finish(&self, key: &K, id: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(key).is_some_and(|running| running.id == id) {
            in_flight.remove(key);
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) != epoch
    }
}

/// Resolves to the status a fetch settled on
///
/// Dropping it is fine: the request keeps running and still updates the
/// store.
pub struct FetchHandle {
    outcome: SharedOutcome,
    coalesced: bool,
}

impl FetchHandle {
    /// True when this dispatch attached to a fetch that was already running
    pub fn is_coalesced(&self) -> bool {
        self.coalesced
    }
}

impl Future for FetchHandle {
    type Output = RequestStatus;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.outcome.poll_unpin(cx)
    }
}
