//! Flat-text catalog file
//!
//! ```text
//! file   := record*
//! record := field (';' field)* ';' '/' '\n'
//! ```
//!
//! Line breaks carry no meaning: the loader concatenates all physical lines
//! before splitting on `/` (records) and `;` (fields). Whatever follows the
//! last `/` is discarded.
//!
//! Saving rewrites the whole file. There is no locking; two writers can
//! interleave and corrupt the catalog.

use super::{CatalogPersistence, RecordStore, WriteMode};
use crate::error::{CatalogError, Result};
use crate::fields::{FIELD_COUNT, FIELD_NAMES};
use crate::record::MetadataRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use vmc_common::config::temp_path_for;

const RECORD_SEPARATOR: char = '/';
const FIELD_SEPARATOR: char = ';';

/// Records that could be parsed plus the errors for those that could not
#[derive(Debug, Default)]
pub struct LenientLoad {
    pub store: RecordStore,
    pub skipped: Vec<CatalogError>,
}

/// Split catalog text into raw record segments
fn segments(content: &str) -> Vec<String> {
    let stream: String = content.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let mut parts: Vec<String> = stream.split(RECORD_SEPARATOR).map(str::to_string).collect();
    // split() always yields at least one element: the remainder after the last '/'
    if let Some(rest) = parts.pop() {
        if !rest.trim().is_empty() {
            warn!(remainder = %rest, "Discarding unterminated data after last record");
        }
    }
    parts
}

fn parse_record(index: usize, segment: &str) -> Result<MetadataRecord> {
    let body = segment.strip_suffix(FIELD_SEPARATOR).unwrap_or(segment);
    let values: Vec<String> = body.split(FIELD_SEPARATOR).map(str::to_string).collect();
    if values.len() != FIELD_COUNT {
        return Err(CatalogError::RecordFormat {
            index,
            expected: FIELD_COUNT,
            found: values.len(),
        });
    }
    MetadataRecord::new(values)
}

/// Parse catalog text, failing on the first malformed record
pub fn parse_catalog(content: &str) -> Result<RecordStore> {
    let records = segments(content)
        .iter()
        .enumerate()
        .map(|(i, seg)| parse_record(i, seg))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordStore::from_records(records))
}

/// Parse catalog text, skipping malformed records
pub fn parse_catalog_lenient(content: &str) -> LenientLoad {
    let mut load = LenientLoad::default();
    let mut records = Vec::new();
    for (i, seg) in segments(content).iter().enumerate() {
        match parse_record(i, seg) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Skipping record: {}", e);
                load.skipped.push(e);
            }
        }
    }
    load.store = RecordStore::from_records(records);
    load
}

/// Render a store in the catalog file grammar
pub fn serialize_catalog(store: &RecordStore) -> Result<String> {
    let mut out = String::new();
    for (index, record) in store.iter().enumerate() {
        if let Some((field, value)) = record.first_unstorable() {
            return Err(CatalogError::UnstorableValue {
                index,
                field: FIELD_NAMES[field],
                value: value.to_string(),
            });
        }
        for value in record.values() {
            out.push_str(value);
            out.push(FIELD_SEPARATOR);
        }
        out.push(RECORD_SEPARATOR);
        out.push('\n');
    }
    Ok(out)
}

/// Read a catalog file; a missing file yields an empty store
fn read_catalog_text(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No catalog at {}, starting empty", path.display());
            Ok(None)
        }
        Err(source) => Err(CatalogError::StoreIo {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a catalog file, failing on the first malformed record
pub fn load(path: &Path) -> Result<RecordStore> {
    let Some(content) = read_catalog_text(path)? else {
        return Ok(RecordStore::new());
    };
    let store = parse_catalog(&content)?;
    info!("Loaded {} catalog records from {}", store.len(), path.display());
    Ok(store)
}

/// Load a catalog file, skipping malformed records
pub fn load_lenient(path: &Path) -> Result<LenientLoad> {
    let Some(content) = read_catalog_text(path)? else {
        return Ok(LenientLoad::default());
    };
    Ok(parse_catalog_lenient(&content))
}

/// Write `content` to `path` using the given mode
pub(crate) fn write_file(path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
    match mode {
        WriteMode::Overwrite => std::fs::write(path, content),
        WriteMode::Atomic => {
            let temp = temp_path_for(path);
            std::fs::write(&temp, content)?;
            std::fs::rename(&temp, path).inspect_err(|_| {
                let _ = std::fs::remove_file(&temp);
            })
        }
    }
}

/// Serialize `store` and replace the catalog file with it
pub fn save(path: &Path, store: &RecordStore, mode: WriteMode) -> Result<()> {
    let content = serialize_catalog(store)?;
    write_file(path, &content, mode).map_err(|source| CatalogError::StoreIo {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved {} catalog records to {}", store.len(), path.display());
    Ok(())
}

/// Flat-file persistence at a fixed path
#[derive(Debug, Clone)]
pub struct FlatFileCatalog {
    path: PathBuf,
    mode: WriteMode,
}

impl FlatFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::default(),
        }
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogPersistence for FlatFileCatalog {
    fn load(&self) -> Result<RecordStore> {
        load(&self.path)
    }

    fn save(&self, store: &RecordStore) -> Result<()> {
        save(&self.path, store, self.mode)
    }
}
