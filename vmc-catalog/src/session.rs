//! Review session state machine
//!
//! `Closed → Loading → Editing → Saving → Closed`, with `Editing → Closed`
//! as the cancel path. Nothing is persisted before `Saving`, so cancelling
//! has no side effects to undo.
//!
//! A controller holds at most one open session. Opening a second one while
//! the first is in Loading/Editing/Saving is refused. Nothing stops another
//! process from writing the same catalog file.

use crate::error::{CatalogError, Result};
use crate::fields::FieldCatalog;
use crate::record::MetadataRecord;
use crate::render::CatalogRenderer;
use crate::source::{build_from_live_source, MetadataSource};
use crate::store::{CatalogPersistence, RecordStore, UpsertOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Review session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    Closed,
    /// Catalog load and key lookup in progress
    Loading,
    /// Record handed to the editing surface
    Editing,
    /// Upsert, save and render in progress
    Saving,
}

/// Where the session's starting record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOrigin {
    /// Matched an entry already in the catalog
    Stored,
    /// Built from the live metadata source
    Live,
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: SessionState,
    pub new_state: SessionState,
    pub transitioned_at: DateTime<Utc>,
}

/// One review of one title's metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSession {
    pub session_id: Uuid,
    pub state: SessionState,
    /// Title the session was opened for
    pub key: String,
    pub origin: RecordOrigin,
    /// Record shown to the editing surface
    pub record: MetadataRecord,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ReviewSession {
    fn new(key: &str) -> Self {
        let mut session = Self {
            session_id: Uuid::new_v4(),
            state: SessionState::Closed,
            key: key.to_string(),
            origin: RecordOrigin::Live,
            record: MetadataRecord::with_key(key),
            started_at: Utc::now(),
            ended_at: None,
        };
        session.transition_to(SessionState::Loading);
        session
    }

    /// Transition to new state
    pub fn transition_to(&mut self, new_state: SessionState) -> StateTransition {
        let transition = StateTransition {
            session_id: self.session_id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;
        if new_state == SessionState::Closed {
            self.ended_at = Some(transition.transitioned_at);
        }
        info!(
            session = %self.session_id,
            "Review session {:?} → {:?}",
            transition.old_state,
            transition.new_state
        );
        transition
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    fn require(&self, expected: SessionState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CatalogError::InvalidState {
                from: self.state,
                action,
            })
        }
    }
}

/// Result of a confirmed session
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    pub session_id: Uuid,
    pub key: String,
    pub upsert: UpsertOutcome,
    pub records: usize,
    pub report_path: PathBuf,
}

/// Drives review sessions against one catalog and its report
pub struct SessionController<P: CatalogPersistence> {
    persistence: P,
    renderer: CatalogRenderer,
    report_path: PathBuf,
    session: Option<ReviewSession>,
    /// Session-scoped copy of the catalog, loaded on open
    store: RecordStore,
}

impl<P: CatalogPersistence> SessionController<P> {
    pub fn new(persistence: P, renderer: CatalogRenderer, report_path: impl Into<PathBuf>) -> Self {
        Self {
            persistence,
            renderer,
            report_path: report_path.into(),
            session: None,
            store: RecordStore::new(),
        }
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// The open session, if any
    pub fn session(&self) -> Option<&ReviewSession> {
        self.session.as_ref()
    }

    /// Open a session for `title`: load the catalog, then seed from the
    /// stored entry or, failing that, from `source`.
    pub fn open(&mut self, title: &str, source: &dyn MetadataSource) -> Result<&ReviewSession> {
        if self.session.as_ref().is_some_and(ReviewSession::is_open) {
            return Err(CatalogError::SessionActive);
        }

        let mut session = ReviewSession::new(title);
        let store = match self.persistence.load() {
            Ok(store) => store,
            Err(e) => {
                warn!("Catalog load failed, closing session: {}", e);
                session.transition_to(SessionState::Closed);
                return Err(e);
            }
        };

        match store.find_by_key(title) {
            Some(record) => {
                session.record = record.clone();
                session.origin = RecordOrigin::Stored;
            }
            None => {
                let mut record = build_from_live_source(source, FieldCatalog);
                // Stored under the key it was looked up by
                record.set_key(title);
                session.record = record;
                session.origin = RecordOrigin::Live;
            }
        }
        session.transition_to(SessionState::Editing);

        self.store = store;
        let session = self.session.insert(session);
        Ok(&*session)
    }

    fn open_session(&mut self) -> Result<&mut ReviewSession> {
        self.session.as_mut().ok_or(CatalogError::InvalidState {
            from: SessionState::Closed,
            action: "continue",
        })
    }

    /// The session's record, editable in place while in Editing
    pub fn record_mut(&mut self) -> Result<&mut MetadataRecord> {
        let session = self.open_session()?;
        session.require(SessionState::Editing, "edit")?;
        Ok(&mut session.record)
    }

    /// Confirm the session's own record as edited through [`Self::record_mut`]
    pub fn commit(&mut self) -> Result<SaveOutcome> {
        let record = self.record_mut()?.clone();
        self.confirm(record)
    }

    /// Persist the edited record, then regenerate the report.
    ///
    /// A failed save leaves the catalog in memory and the session record
    /// as they were, with the session back in Editing. A failed render
    /// keeps the save, adopts `edited` as the session record and returns
    /// to Editing; confirming again is safe because upsert is idempotent.
    pub fn confirm(&mut self, edited: MetadataRecord) -> Result<SaveOutcome> {
        let session = self.open_session()?;
        session.require(SessionState::Editing, "confirm")?;
        session.transition_to(SessionState::Saving);

        let mut next = self.store.clone();
        let upsert = next.upsert(edited.clone());

        if let Err(e) = self.persistence.save(&next) {
            warn!("Catalog save failed: {}", e);
            self.open_session()?.transition_to(SessionState::Editing);
            return Err(e);
        }
        self.store = next;
        self.open_session()?.record = edited;

        if let Err(e) = self.renderer.write_report(&self.report_path, &self.store) {
            warn!("Report render failed after save: {}", e);
            self.open_session()?.transition_to(SessionState::Editing);
            return Err(e);
        }

        let records = self.store.len();
        let report_path = self.report_path.clone();
        let session = self.open_session()?;
        session.transition_to(SessionState::Closed);
        let outcome = SaveOutcome {
            session_id: session.session_id,
            key: session.record.key().to_string(),
            upsert,
            records,
            report_path,
        };
        self.close();
        Ok(outcome)
    }

    /// Abandon the open session without touching the catalog or report
    pub fn cancel(&mut self) -> Result<StateTransition> {
        let session = self.open_session()?;
        session.require(SessionState::Editing, "cancel")?;
        let transition = session.transition_to(SessionState::Closed);
        self.close();
        Ok(transition)
    }

    fn close(&mut self) {
        self.session = None;
        self.store = RecordStore::new();
    }
}
