use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    DiagramStore, DiagramSummary, Scope, ScopeFilter, StoreError, check_document,
    sort_recent_first,
};
use crate::document::{Document, SportType, new_id};
use crate::schema::{ValidationError, validate_value};
use crate::svg::{RenderOptions, render};

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    scope: &'a Scope,
    document: &'a Document,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnvelope {
    scope: Scope,
    document: Value,
}

/// Just the owner of an entry; the document is not looked at.
#[derive(Deserialize)]
struct ScopeOnly {
    scope: Scope,
}

/// Directory-backed store: `<id>.json` holds `{scope, document}`, `<id>.svg`
/// the snapshot.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn json_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        Ok(self.root.join(format!("{}.json", id)))
    }

    fn svg_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        Ok(self.root.join(format!("{}.svg", id)))
    }

    fn read_text(&self, id: &str) -> Result<String, StoreError> {
        match fs::read_to_string(self.json_path(id)?) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_entry(&self, id: &str) -> Result<(Scope, Document), StoreError> {
        let text = self.read_text(id)?;

        let invalid = |source: ValidationError| {
            tracing::warn!(id, error = %source, "rejected stored diagram");
            StoreError::Validation {
                id: id.to_string(),
                source,
            }
        };
        let raw: RawEnvelope =
            serde_json::from_str(&text).map_err(|e| invalid(ValidationError::Malformed(e)))?;
        let doc = validate_value(raw.document).map_err(invalid)?;
        Ok((raw.scope, doc))
    }

    /// Scope of an existing entry, even when its document no longer
    /// validates. `None` when there is no entry yet.
    fn read_scope(&self, id: &str) -> Result<Option<Scope>, StoreError> {
        let text = match self.read_text(id) {
            Ok(text) => text,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let envelope: ScopeOnly =
            serde_json::from_str(&text).map_err(|e| StoreError::Validation {
                id: id.to_string(),
                source: ValidationError::Malformed(e),
            })?;
        Ok(Some(envelope.scope))
    }

    /// Writes through a temp file in the store directory, then renames it
    /// over `path`, so readers never see a partial file.
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), StoreError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn write_entry(
        &self,
        id: &str,
        scope: &Scope,
        doc: &Document,
        svg: &str,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&EnvelopeRef {
            scope,
            document: doc,
        })?;
        // The envelope is the commit point: a failed snapshot write leaves
        // the previous document in place.
        self.write_atomic(&self.svg_path(id)?, svg)?;
        self.write_atomic(&self.json_path(id)?, &json)?;
        Ok(())
    }
}

/// Ids become file names, so anything that could escape the root is refused.
fn check_id(id: &str) -> Result<(), StoreError> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

impl DiagramStore for FsStore {
    fn load(&self, id: &str) -> Result<Document, StoreError> {
        self.read_entry(id).map(|(_, doc)| doc)
    }

    fn save(&mut self, id: &str, doc: &Document, svg: &str) -> Result<(), StoreError> {
        check_document(id, doc)?;
        let scope = self.read_scope(id)?.unwrap_or(Scope::Global);
        self.write_entry(id, &scope, doc, svg)?;
        tracing::debug!(id, path = %self.root.display(), "wrote diagram");
        Ok(())
    }

    fn list(&self, filter: &ScopeFilter) -> Result<Vec<DiagramSummary>, StoreError> {
        let mut rows = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Unreadable entries are skipped; read_entry already logged why
            let Ok((scope, doc)) = self.read_entry(id) else {
                continue;
            };
            if filter.matches(&scope) {
                rows.push(DiagramSummary::new(&doc, scope));
            }
        }
        sort_recent_first(&mut rows);
        Ok(rows)
    }

    fn create(
        &mut self,
        title: &str,
        sport: SportType,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<Document, StoreError> {
        let doc = Document::new(new_id(), title, sport, now);
        check_document(&doc.id, &doc)?;
        let svg = render(&doc, &RenderOptions::default());
        self.write_entry(&doc.id, &scope, &doc, &svg)?;
        tracing::info!(id = %doc.id, sport = sport.as_str(), "diagram created");
        Ok(doc)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.json_path(id)?) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        match fs::remove_file(self.svg_path(id)?) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(id, "diagram deleted");
        Ok(())
    }

    fn snapshot(&self, id: &str) -> Result<String, StoreError> {
        match fs::read_to_string(self.svg_path(id)?) {
            Ok(svg) => Ok(svg),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
