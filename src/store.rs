//! Keyed, concurrent record storage.
//!
//! A [`ResourceStore`] is owned by exactly one service. Reads and writes lock a
//! single shard of the underlying [`DashMap`], so requests for different ids do
//! not contend on a store-wide lock. There are no cross-key transactions: the
//! last completed write for an id wins.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;

/// Concurrent `id -> record` map
#[derive(Debug)]
pub struct ResourceStore<R> {
    records: DashMap<String, R>,
}

impl<R: Clone> ResourceStore<R> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.records.get(id).map(|r| r.value().clone())
    }

    /// All records, in no particular order.
    pub fn values(&self) -> Vec<R> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }

    /// Store `record` under `id`, returning whatever was there before.
    pub fn insert(&self, id: String, record: R) -> Option<R> {
        self.records.insert(id, record)
    }

    /// Store `record` under `id` only if the slot is free.
    ///
    /// Returns `false` without touching the store when `id` is taken.
    pub fn insert_new(&self, id: String, record: R) -> bool {
        match self.records.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn remove(&self, id: &str) -> Option<R> {
        self.records.remove(id).map(|(_, r)| r)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> HashMap<String, R> {
        self.records
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// Replace the contents with `records`.
    ///
    /// Not atomic across keys: concurrent readers may observe a mix of old and
    /// new records while this runs.
    pub fn restore(&self, records: HashMap<String, R>) {
        self.records.retain(|id, _| records.contains_key(id));
        for (id, record) in records {
            self.records.insert(id, record);
        }
    }
}

impl<R: Clone> Default for ResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
