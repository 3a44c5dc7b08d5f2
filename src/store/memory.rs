use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{
    DiagramStore, DiagramSummary, Scope, ScopeFilter, StoreError, check_document,
    sort_recent_first,
};
use crate::document::{Document, SportType, new_id};
use crate::svg::{RenderOptions, render};

#[derive(Debug, Clone)]
struct Entry {
    scope: Scope,
    doc: Document,
    svg: String,
}

/// Keeps diagrams in process memory. Used by tests and the browser host.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagramStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Document, StoreError> {
        self.entries
            .get(id)
            .map(|e| e.doc.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&mut self, id: &str, doc: &Document, svg: &str) -> Result<(), StoreError> {
        check_document(id, doc)?;
        let scope = self
            .entries
            .get(id)
            .map(|e| e.scope.clone())
            .unwrap_or(Scope::Global);
        self.entries.insert(
            id.to_string(),
            Entry {
                scope,
                doc: doc.clone(),
                svg: svg.to_string(),
            },
        );
        Ok(())
    }

    fn list(&self, filter: &ScopeFilter) -> Result<Vec<DiagramSummary>, StoreError> {
        let mut rows: Vec<DiagramSummary> = self
            .entries
            .values()
            .filter(|e| filter.matches(&e.scope))
            .map(|e| DiagramSummary::new(&e.doc, e.scope.clone()))
            .collect();
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
        self.entries.insert(
            doc.id.clone(),
            Entry {
                scope,
                doc: doc.clone(),
                svg,
            },
        );
        Ok(doc)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn snapshot(&self, id: &str) -> Result<String, StoreError> {
        self.entries
            .get(id)
            .map(|e| e.svg.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
