use crate::error::ApiError;
use crate::ids::new_record_id;
use crate::pending::Pending;
use crate::record::Record;
use crate::service::Service;
use crate::store::ResourceStore;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// In-memory service backed by a [`ResourceStore`]
///
/// Every operation settles immediately. Records without an id get a fresh
/// ULID on `post`; a record that brings its own id overwrites whatever is
/// stored under it.
pub struct MemoryService<R: Record> {
    store: ResourceStore<R>,
    snapshot: Mutex<Option<HashMap<String, R>>>,
}

impl<R: Record> MemoryService<R> {
    pub fn new() -> Self {
        Self {
            store: ResourceStore::new(),
            snapshot: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &ResourceStore<R> {
        &self.store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<R: Record> Default for MemoryService<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Service for MemoryService<R> {
    type Record = R;

    fn get(&self, id: &str) -> Pending<R> {
        Pending::from_option(self.store.get(id))
    }

    fn list(&self) -> Pending<Vec<R>> {
        Pending::value(self.store.values())
    }

    fn post(&self, candidate: Option<R>) -> Pending<R> {
        let Some(candidate) = candidate else {
            return Pending::absent();
        };
        if let Some(id) = candidate.explicit_id().map(str::to_owned) {
            let replaced = self.store.insert(id.clone(), candidate.clone()).is_some();
            debug!(record = R::data_class().name, id = %id, replaced, "Stored record");
            return Pending::value(candidate);
        }
        loop {
            let id = new_record_id();
            let record = candidate.clone().with_id(id.clone());
            if self.store.insert_new(id.clone(), record.clone()) {
                debug!(record = R::data_class().name, id = %id, "Created record");
                return Pending::value(record);
            }
        }
    }

    fn put(&self, id: &str, candidate: Option<R>) -> Pending<R> {
        let Some(candidate) = candidate else {
            return Pending::failed(ApiError::bad_request(format!(
                "Missing {} body for id [{id}]",
                R::data_class().name
            )));
        };
        if let Some(record_id) = candidate.explicit_id() {
            if record_id != id {
                return Pending::failed(ApiError::IdMismatch {
                    id: id.to_string(),
                    record_id: record_id.to_string(),
                });
            }
        }
        let record = candidate.with_id(id.to_string());
        self.store.insert(id.to_string(), record.clone());
        Pending::value(record)
    }

    fn delete(&self, id: &str) -> Pending<R> {
        Pending::from_option(self.store.remove(id))
    }

    fn take_snapshot(&self) {
        let snapshot = self.store.snapshot();
        let records = snapshot.len();
        match self.snapshot.lock() {
            Ok(mut slot) => {
                *slot = Some(snapshot);
                info!(record = R::data_class().name, records, "Snapshot taken");
            }
            Err(e) => warn!(error = %e, "Snapshot lock poisoned; snapshot not taken"),
        }
    }

    fn reset_to_snapshot(&self) {
        let snapshot = match self.snapshot.lock() {
            Ok(slot) => slot.clone(),
            Err(e) => {
                warn!(error = %e, "Snapshot lock poisoned; reset skipped");
                return;
            }
        };
        match snapshot {
            Some(records) => {
                let count = records.len();
                self.store.restore(records);
                info!(record = R::data_class().name, records = count, "Reset to snapshot");
            }
            None => debug!(record = R::data_class().name, "No snapshot to reset to"),
        }
    }
}
