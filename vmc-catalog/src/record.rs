//! One title's attribute values, aligned to the field catalog

use crate::error::{CatalogError, Result};
use crate::fields::{FieldCatalog, FIELD_COUNT, FIELD_NAMES, KEY_INDEX};
use serde::{Deserialize, Serialize};

/// Placeholder stored for metadata the live source could not supply
pub const NULL_SENTINEL: &str = "null";

/// Ordered field values; always exactly `FIELD_COUNT` long
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MetadataRecord {
    values: Vec<String>,
}

impl MetadataRecord {
    /// Build a record, rejecting the wrong number of values
    pub fn new(values: Vec<String>) -> Result<Self> {
        if values.len() != FIELD_COUNT {
            return Err(CatalogError::InvalidRecord {
                expected: FIELD_COUNT,
                found: values.len(),
            });
        }
        Ok(Self { values })
    }

    /// Build from values produced by walking the field catalog
    pub(crate) fn from_catalog_values(values: Vec<String>) -> Self {
        debug_assert_eq!(values.len(), FIELD_COUNT);
        Self { values }
    }

    /// A record with every field empty except the key
    pub fn with_key(key: impl Into<String>) -> Self {
        let mut values = vec![String::new(); FIELD_COUNT];
        values[KEY_INDEX] = key.into();
        Self { values }
    }

    pub fn key(&self) -> &str {
        &self.values[KEY_INDEX]
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Value of a field by catalog name
    pub fn field(&self, name: &str) -> Option<&str> {
        FieldCatalog.index_of(name).and_then(|i| self.get(i))
    }

    /// Replace the value at `index`
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or_else(|| CatalogError::UnknownField(format!("#{}", index)))?;
        *slot = value.into();
        Ok(())
    }

    /// Replace a field by name (ASCII case-insensitive)
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let index = FieldCatalog
            .index_of_ignore_case(name)
            .ok_or_else(|| CatalogError::UnknownField(name.to_string()))?;
        self.set(index, value)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// (name, value) pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        FIELD_NAMES
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    pub(crate) fn set_key(&mut self, key: impl Into<String>) {
        self.values[KEY_INDEX] = key.into();
    }

    /// Take fields 1.. from `other`, keeping this record's key
    pub(crate) fn overwrite_non_key(&mut self, other: MetadataRecord) {
        let mut values = other.values;
        values[KEY_INDEX] = std::mem::take(&mut self.values[KEY_INDEX]);
        self.values = values;
    }

    /// First field whose value cannot survive the flat-file grammar
    pub(crate) fn first_unstorable(&self) -> Option<(usize, &str)> {
        self.values
            .iter()
            .enumerate()
            .find(|(_, v)| v.contains([';', '/', '\n', '\r']))
            .map(|(i, v)| (i, v.as_str()))
    }
}

impl TryFrom<Vec<String>> for MetadataRecord {
    type Error = CatalogError;

    fn try_from(values: Vec<String>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<MetadataRecord> for Vec<String> {
    fn from(record: MetadataRecord) -> Self {
        record.values
    }
}
