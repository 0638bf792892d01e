// ── Entity mirror ──
//
// Client-held copy of one server collection. Replaced wholesale on
// every successful fetch; `DashMap` gives id lookups, a `watch`
// snapshot carries the ordered collection to subscribers.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::warn;

use crate::model::Identified;

/// Ordered, id-indexed collection of records for one entity kind.
pub struct EntityMirror<T: Identified + Clone + Send + Sync + 'static> {
    by_id: DashMap<i64, Arc<T>>,

    /// Bumped on every replace or clear.
    version: watch::Sender<u64>,

    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Identified + Clone + Send + Sync + 'static> EntityMirror<T> {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the whole collection. Later duplicates of an id win.
    pub fn replace(&self, records: Vec<T>) {
        let mut ordered: Vec<Arc<T>> = Vec::with_capacity(records.len());
        self.by_id.clear();

        for record in records {
            let id = record.id();
            let record = Arc::new(record);
            if let Some(previous) = self.by_id.insert(id, Arc::clone(&record)) {
                warn!(id, "duplicate id in fetched collection, keeping the last");
                ordered.retain(|r| !Arc::ptr_eq(r, &previous));
            }
            ordered.push(record);
        }

        self.publish(ordered);
    }

    /// Remove every record.
    pub fn clear(&self) {
        if self.by_id.is_empty() && self.snapshot.borrow().is_empty() {
            return;
        }
        self.by_id.clear();
        self.publish(Vec::new());
    }

    pub fn get(&self, id: i64) -> Option<Arc<T>> {
        self.by_id.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, id: i64) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn publish(&self, records: Vec<Arc<T>>) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(records));
        self.version.send_modify(|v| *v += 1);
    }
}

impl<T: Identified + Clone + Send + Sync + 'static> Default for EntityMirror<T> {
    fn default() -> Self {
        Self::new()
    }
}
