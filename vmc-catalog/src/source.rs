//! Live metadata sources and the session record builder
//!
//! A source answers catalog field names for the media currently loaded.
//! [`build_from_live_source`] turns any source into a complete record,
//! substituting [`NULL_SENTINEL`] for fields the source cannot supply.

use crate::fields::FieldCatalog;
use crate::record::{MetadataRecord, NULL_SENTINEL};
use std::collections::HashMap;
use tracing::debug;

/// Provider of metadata for the currently loaded media
pub trait MetadataSource {
    /// Value for the tag named `name`, or `None` if absent
    fn get_field(&self, name: &str) -> Option<String>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for &T {
    fn get_field(&self, name: &str) -> Option<String> {
        (**self).get_field(name)
    }
}

impl<T: MetadataSource + ?Sized> MetadataSource for Box<T> {
    fn get_field(&self, name: &str) -> Option<String> {
        (**self).get_field(name)
    }
}

/// In-memory source keyed by field name
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl MetadataSource for MapSource {
    fn get_field(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Sources queried in order; the first non-empty answer wins
#[derive(Default)]
pub struct LayeredSource<'a> {
    layers: Vec<Box<dyn MetadataSource + 'a>>,
}

impl<'a> LayeredSource<'a> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn push(mut self, source: impl MetadataSource + 'a) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl MetadataSource for LayeredSource<'_> {
    fn get_field(&self, name: &str) -> Option<String> {
        self.layers
            .iter()
            .filter_map(|layer| layer.get_field(name))
            .find(|value| !value.is_empty())
    }
}

/// Build a complete record from a live source.
///
/// Missing or empty values become the literal `"null"`.
pub fn build_from_live_source(source: &dyn MetadataSource, catalog: FieldCatalog) -> MetadataRecord {
    let values: Vec<String> = catalog
        .names()
        .map(|name| match source.get_field(name) {
            Some(value) if !value.is_empty() => value,
            _ => {
                debug!(field = name, "No live value, using placeholder");
                NULL_SENTINEL.to_string()
            }
        })
        .collect();
    MetadataRecord::from_catalog_values(values)
}
