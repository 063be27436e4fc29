//! Shared fixtures for vmc-catalog integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use vmc_catalog::fields::FIELD_COUNT;
use vmc_catalog::{CatalogError, CatalogPersistence, MetadataRecord, RecordStore};

/// Record with fields `<key>`, `<key>-1`, … `<key>-13`
pub fn record(key: &str) -> MetadataRecord {
    let values = (0..FIELD_COUNT)
        .map(|i| if i == 0 { key.to_string() } else { format!("{}-{}", key, i) })
        .collect();
    MetadataRecord::new(values).unwrap()
}

/// One catalog line with `n` fields
pub fn catalog_line(key: &str, n: usize) -> String {
    let mut fields = vec![key.to_string()];
    fields.extend((1..n).map(|i| format!("{}-{}", key, i)));
    format!("{};/\n", fields.join(";"))
}

/// In-memory persistence with switchable save failure
#[derive(Default)]
pub struct MemoryCatalog {
    pub stored: RefCell<RecordStore>,
    pub fail_save: Cell<bool>,
    pub saves: Cell<usize>,
}

impl MemoryCatalog {
    pub fn with(records: Vec<MetadataRecord>) -> Self {
        Self {
            stored: RefCell::new(RecordStore::from_records(records)),
            ..Self::default()
        }
    }
}

impl CatalogPersistence for MemoryCatalog {
    fn load(&self) -> vmc_catalog::Result<RecordStore> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, store: &RecordStore) -> vmc_catalog::Result<()> {
        if self.fail_save.get() {
            return Err(CatalogError::StoreIo {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.saves.set(self.saves.get() + 1);
        *self.stored.borrow_mut() = store.clone();
        Ok(())
    }
}
