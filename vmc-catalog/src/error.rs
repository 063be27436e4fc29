//! Error types for vmc-catalog
//!
//! A missing catalog file is not an error: loading it yields an empty store.

use crate::session::SessionState;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A stored record does not have one value per catalog field
    #[error("Malformed record #{index}: expected {expected} fields, found {found}")]
    RecordFormat {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Reading or writing the catalog file failed
    #[error("Catalog I/O error on {}: {source}", .path.display())]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the derived report failed
    #[error("Report I/O error on {}: {source}", .path.display())]
    RenderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value contains a separator or line break and cannot be stored
    #[error("Record #{index} field {field} cannot be stored: {value:?} contains ';', '/' or a line break")]
    UnstorableValue {
        index: usize,
        field: &'static str,
        value: String,
    },

    /// A record was built with the wrong number of values
    #[error("Invalid record: expected {expected} values, got {found}")]
    InvalidRecord { expected: usize, found: usize },

    /// Unknown field name
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Session operation not allowed in the current state
    #[error("Cannot {action} while session is {from:?}")]
    InvalidState {
        from: SessionState,
        action: &'static str,
    },

    /// A review session is already open on this controller
    #[error("A review session is already open")]
    SessionActive,

    /// The live metadata source could not be read
    #[error("Metadata source error: {0}")]
    Source(String),

    /// vmc-common error
    #[error("Common error: {0}")]
    Common(#[from] vmc_common::Error),
}

/// Convenience Result type using CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;
