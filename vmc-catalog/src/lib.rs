//! vmc-catalog library - video metadata catalog
//!
//! Per-title metadata records kept in a flat-text catalog file, with key
//! lookup, upsert, and a static HTML report regenerated after every save.
//!
//! Components:
//! - [`fields`]: the fixed, ordered field catalog
//! - [`record`]: one title's values aligned to the field catalog
//! - [`store`]: the record store and its flat-file persistence
//! - [`render`]: the HTML report
//! - [`source`], [`media_file`]: live metadata sources and the record builder
//! - [`session`]: the review session state machine and controller

pub mod error;
pub mod fields;
pub mod media_file;
pub mod record;
pub mod render;
pub mod session;
pub mod source;
pub mod store;

pub use error::{CatalogError, Result};
pub use fields::FieldCatalog;
pub use record::{MetadataRecord, NULL_SENTINEL};
pub use render::CatalogRenderer;
pub use session::{ReviewSession, SessionController, SessionState};
pub use source::{build_from_live_source, MetadataSource};
pub use store::{CatalogPersistence, FlatFileCatalog, RecordStore, UpsertOutcome, WriteMode};
