//! # Trial-Data and Session-Storage Ports
//!
//! The trial-data store is owned by the experiment framework; session storage
//! is owned by the hosting platform. Both are accessed synchronously, the way
//! the framework exposes them.

use parking_lot::RwLock;
use serde_json::{Map, Value};

/// One trial record: a flat JSON object.
pub type TrialRecord = Map<String, Value>;

/// Field holding a record's position in the trial sequence.
pub const TRIAL_INDEX_FIELD: &str = "trial_index";

/// Access to collected trial records.
pub trait TrialDataStore: Send + Sync {
    /// Every record, in collection order.
    fn all_records(&self) -> Vec<TrialRecord>;

    /// The single record whose `trial_index` equals `index`.
    fn record_at_index(&self, index: u64) -> Option<TrialRecord>;

    /// Replace the record whose `trial_index` equals `index` with a value
    /// computed from it, under a single write.
    ///
    /// Returns `false` when no single record matches.
    fn update_record_at_index(
        &self,
        index: u64,
        update: &dyn Fn(&TrialRecord) -> TrialRecord,
    ) -> bool;

    /// Append a record at the end of the sequence.
    fn push_record(&self, record: TrialRecord);

    /// Interaction events (focus loss, fullscreen exit, ...), opaque here.
    fn interaction_events(&self) -> Vec<Value>;
}

/// Platform-provided, session-scoped key/value storage.
pub trait SessionStore: Send + Sync {
    fn get_var(&self, key: &str) -> Option<Value>;

    fn set_var(&self, key: &str, value: Value);
}

/// In-memory [`TrialDataStore`] for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryTrialStore {
    records: RwLock<Vec<TrialRecord>>,
    interactions: RwLock<Vec<Value>>,
}

impl InMemoryTrialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an interaction event.
    pub fn push_interaction(&self, event: Value) {
        self.interactions.write().push(event);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn positions_of(records: &[TrialRecord], index: u64) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.get(TRIAL_INDEX_FIELD).and_then(Value::as_u64) == Some(index))
            .map(|(pos, _)| pos)
            .collect()
    }
}

impl TrialDataStore for InMemoryTrialStore {
    fn all_records(&self) -> Vec<TrialRecord> {
        self.records.read().clone()
    }

    fn record_at_index(&self, index: u64) -> Option<TrialRecord> {
        let records = self.records.read();
        match Self::positions_of(&records, index).as_slice() {
            [pos] => Some(records[*pos].clone()),
            _ => None,
        }
    }

    fn update_record_at_index(
        &self,
        index: u64,
        update: &dyn Fn(&TrialRecord) -> TrialRecord,
    ) -> bool {
        let mut records = self.records.write();
        match Self::positions_of(&records, index).as_slice() {
            [pos] => {
                records[*pos] = update(&records[*pos]);
                true
            }
            _ => false,
        }
    }

    fn push_record(&self, record: TrialRecord) {
        self.records.write().push(record);
    }

    fn interaction_events(&self) -> Vec<Value> {
        self.interactions.read().clone()
    }
}
