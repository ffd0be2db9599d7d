use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;

use crate::status::RequestStatus;
use crate::store::{EntrySnapshot, FetchHandle, RequestStore};

/// Two-level variant of [`RequestStore`] (program -> day, user -> program)
///
/// Every `(outer, inner)` pair has its own status and value; fetching one
/// pair never touches its siblings.
pub struct NestedRequestStore<O, I, V> {
    store: RequestStore<(O, I), V>,
}

impl<O, I, V> Clone for NestedRequestStore<O, I, V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<O, I, V> NestedRequestStore<O, I, V>
where
    O: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    I: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            store: RequestStore::new(name),
        }
    }

    pub fn status(&self, outer: &O, inner: &I) -> RequestStatus {
        self.store.status(&key(outer, inner))
    }

    pub fn entity(&self, outer: &O, inner: &I) -> Option<V> {
        self.store.entity(&key(outer, inner))
    }

    pub fn error(&self, outer: &O, inner: &I) -> Option<String> {
        self.store.error(&key(outer, inner))
    }

    pub fn snapshot(&self, outer: &O, inner: &I) -> EntrySnapshot<V> {
        self.store.snapshot(&key(outer, inner))
    }

    pub fn dispatch<F, Fut, E>(&self, outer: O, inner: I, fetcher: F) -> FetchHandle
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.store.dispatch((outer, inner), fetcher)
    }

    pub async fn fetch<F, Fut, E>(&self, outer: O, inner: I, fetcher: F) -> RequestStatus
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.dispatch(outer, inner, fetcher).await
    }

    pub fn insert_fulfilled(&self, outer: O, inner: I, value: V) {
        self.store.insert_fulfilled((outer, inner), value);
    }

    /// Status of every inner key seen under `outer`
    pub fn statuses_for(&self, outer: &O) -> HashMap<I, RequestStatus> {
        self.store
            .scan(|(o, i), entry| (o == outer).then(|| (i.clone(), entry.status)))
            .into_iter()
            .collect()
    }

    /// Values cached under `outer`
    pub fn entities_for(&self, outer: &O) -> HashMap<I, V> {
        self.store
            .scan(|(o, i), entry| {
                if o != outer {
                    return None;
                }
                entry.value.clone().map(|value| (i.clone(), value))
            })
            .into_iter()
            .collect()
    }

    /// Drop every entry under `outer`, returns how many were removed
    pub fn remove_outer(&self, outer: &O) -> usize {
        self.store.retain(|(o, _)| o != outer)
    }

    pub fn fulfilled_entries(&self) -> Vec<((O, I), V)> {
        self.store.fulfilled_entries()
    }

    pub fn reset(&self) {
        self.store.reset();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.store.in_flight_count()
    }
}

fn key<O: Clone, I: Clone>(outer: &O, inner: &I) -> (O, I) {
    (outer.clone(), inner.clone())
}
