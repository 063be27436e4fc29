//! Record store: the ordered collection of metadata records
//!
//! Lookup is a linear scan returning the first match; key uniqueness is
//! maintained by [`RecordStore::upsert`], not enforced on load.
//!
//! Persistence goes through [`CatalogPersistence`]. The flat-text file in
//! [`flat_file`] is the default backend.

pub mod flat_file;

use crate::error::Result;
use crate::record::MetadataRecord;
use serde::Serialize;
use tracing::debug;

pub use flat_file::FlatFileCatalog;

/// How a file is replaced on save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write in place. A failure mid-write can leave the file
    /// truncated or empty.
    #[default]
    Overwrite,
    /// Write `<name>.tmp` next to the target, then rename it over the target
    Atomic,
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum UpsertOutcome {
    /// An existing record at this index had its non-key fields replaced
    Updated(usize),
    /// The record was appended at this index
    Inserted(usize),
}

/// Ordered, in-memory catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<MetadataRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataRecord> {
        self.records.iter()
    }

    /// First record whose key equals `key` exactly (case-sensitive)
    pub fn find_by_key(&self, key: &str) -> Option<&MetadataRecord> {
        self.position(key).map(|i| &self.records[i])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|r| r.key() == key)
    }

    /// Update the matching record's non-key fields, or append `record`.
    ///
    /// The stored key is never changed by an update.
    pub fn upsert(&mut self, record: MetadataRecord) -> UpsertOutcome {
        match self.position(record.key()) {
            Some(index) => {
                let existing = &mut self.records[index];
                existing.overwrite_non_key(record);
                debug!(index, key = existing.key(), "Updated catalog record");
                UpsertOutcome::Updated(index)
            }
            None => {
                self.records.push(record);
                let index = self.records.len() - 1;
                debug!(index, key = self.records[index].key(), "Inserted catalog record");
                UpsertOutcome::Inserted(index)
            }
        }
    }

    /// Value-returning form of [`upsert`](Self::upsert)
    pub fn with_upserted(mut self, record: MetadataRecord) -> Self {
        self.upsert(record);
        self
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a MetadataRecord;
    type IntoIter = std::slice::Iter<'a, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Backing persistence for a record store
pub trait CatalogPersistence {
    /// Load the whole catalog. A catalog that does not exist yet is empty.
    fn load(&self) -> Result<RecordStore>;

    /// Replace the persisted catalog with `store`
    fn save(&self, store: &RecordStore) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::sample;

    #[test]
    fn test_lookup_on_empty_store() {
        let store = RecordStore::new();
        assert!(store.find_by_key("Matrix").is_none());
        assert!(store.find_by_key("").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive_and_first_match() {
        let mut first = sample("Matrix");
        first.set(1, "first").unwrap();
        let mut second = sample("Matrix");
        second.set(1, "second").unwrap();
        let store = RecordStore::from_records(vec![first, second]);

        assert_eq!(store.find_by_key("Matrix").unwrap().get(1), Some("first"));
        assert!(store.find_by_key("matrix").is_none());
    }

    #[test]
    fn test_upsert_updates_non_key_fields() {
        let mut original = sample("Matrix");
        original.set(1, "Wachowski").unwrap();
        let mut store = RecordStore::from_records(vec![original]);

        let mut edited = sample("Matrix");
        edited.set(1, "NewAuthor").unwrap();

        assert_eq!(store.upsert(edited), UpsertOutcome::Updated(0));
        assert_eq!(store.len(), 1);
        let record = store.find_by_key("Matrix").unwrap();
        assert_eq!(record.get(0), Some("Matrix"));
        assert_eq!(record.get(1), Some("NewAuthor"));
        assert_eq!(record.get(13), Some("Matrix-13"));
    }

    #[test]
    fn test_upsert_appends_unknown_key() {
        let mut store = RecordStore::from_records(vec![sample("Matrix")]);
        assert_eq!(store.upsert(sample("Alien")), UpsertOutcome::Inserted(1));
        assert_eq!(store.records()[1].key(), "Alien");
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = RecordStore::from_records(vec![sample("Matrix"), sample("Alien")]);
        let mut edited = sample("Alien");
        edited.set(4, "1979").unwrap();

        let once = store.clone().with_upserted(edited.clone());
        let twice = once.clone().with_upserted(edited);
        assert_eq!(once, twice);

        let fresh = sample("Heat");
        let once = store.clone().with_upserted(fresh.clone());
        let twice = once.clone().with_upserted(fresh);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 3);
    }
}
