//! Persistence contract for diagrams.
//!
//! A store keeps the validated document together with the SVG snapshot that
//! was rendered from it at save time. Writes are last-write-wins.

pub mod fs;
pub mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, SportType};
use crate::editor::Editor;
use crate::schema::ValidationError;
use crate::svg::{RenderOptions, render};

pub use fs::FsStore;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Diagram not found: {0}")]
    NotFound(String),
    #[error("Invalid diagram id: {0:?}")]
    InvalidId(String),
    #[error("Diagram {doc_id} cannot be saved under id {key}")]
    IdMismatch { key: String, doc_id: String },
    #[error("Stored diagram {id} is invalid: {source}")]
    Validation {
        id: String,
        source: ValidationError,
    },
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode diagram: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Who a diagram belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "tenant")]
pub enum Scope {
    Global,
    Tenant(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScopeFilter {
    #[default]
    All,
    Global,
    Tenant(String),
}

impl ScopeFilter {
    pub fn matches(&self, scope: &Scope) -> bool {
        match (self, scope) {
            (Self::All, _) => true,
            (Self::Global, Scope::Global) => true,
            (Self::Tenant(want), Scope::Tenant(have)) => want == have,
            _ => false,
        }
    }
}

/// Listing row for a stored diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSummary {
    pub id: String,
    pub title: String,
    pub sport_type: SportType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scope: Scope,
}

impl DiagramSummary {
    pub fn new(doc: &Document, scope: Scope) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            sport_type: doc.sport_type,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            scope,
        }
    }
}

pub trait DiagramStore {
    fn load(&self, id: &str) -> Result<Document, StoreError>;

    /// Persists the document and its rendered snapshot. Creates the entry
    /// in the global scope if it does not exist yet.
    fn save(&mut self, id: &str, doc: &Document, svg: &str) -> Result<(), StoreError>;

    /// Summaries matching `filter`, most recently updated first.
    fn list(&self, filter: &ScopeFilter) -> Result<Vec<DiagramSummary>, StoreError>;

    fn create(
        &mut self,
        title: &str,
        sport: SportType,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<Document, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;

    /// The SVG stored by the last successful save.
    fn snapshot(&self, id: &str) -> Result<String, StoreError>;
}

/// Runs the same checks a loaded payload goes through, and requires the
/// document to be stored under its own id.
pub(crate) fn check_document(id: &str, doc: &Document) -> Result<(), StoreError> {
    if doc.id != id {
        return Err(StoreError::IdMismatch {
            key: id.to_string(),
            doc_id: doc.id.clone(),
        });
    }
    let value = serde_json::to_value(doc)?;
    crate::schema::validate_value(value)
        .map(|_| ())
        .map_err(|source| StoreError::Validation {
            id: id.to_string(),
            source,
        })
}

pub(crate) fn sort_recent_first(rows: &mut [DiagramSummary]) {
    rows.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Saves the editor's document with a fresh `updatedAt` and canonical SVG.
///
/// The editor only adopts the stamped copy once the store accepts it, so a
/// failed save leaves the in-memory edits untouched.
pub fn save_session<S: DiagramStore + ?Sized>(
    store: &mut S,
    editor: &mut Editor,
    options: &RenderOptions,
) -> Result<(), StoreError> {
    let mut doc = editor.document().clone();
    doc.updated_at = editor.now();
    let svg = render(&doc, options);

    if let Err(err) = store.save(&doc.id, &doc, &svg) {
        tracing::warn!(id = %doc.id, error = %err, "save failed");
        return Err(err);
    }

    tracing::info!(id = %doc.id, objects = doc.objects.len(), "diagram saved");
    editor.commit_saved(doc);
    Ok(())
}
