//! Strict validation of untrusted diagram payloads.

use crate::document::{
    Document, MAX_ARROW_LABEL_CHARS, MAX_OBJECT_LABEL_CHARS, MAX_TITLE_CHARS, MAX_ZONE_OPACITY,
    MIN_ZONE_OPACITY, Point, SCHEMA_VERSION, ZoneShape,
};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Missing schemaVersion")]
    MissingVersion,
    #[error("Unsupported schema version: {0}")]
    UnsupportedVersion(Value),
    #[error("{path}: coordinate {value} is outside [0, 1]")]
    CoordinateOutOfRange { path: String, value: f64 },
    #[error("{path}: size {value} must be in (0, 1]")]
    InvalidExtent { path: String, value: f64 },
    #[error("{path}: fill opacity {value} is outside [0.05, 0.5]")]
    OpacityOutOfRange { path: String, value: f64 },
    #[error("{path}: exceeds {max} characters")]
    TooLong { path: String, max: usize },
    #[error("{path}: id must not be empty")]
    EmptyId { path: String },
    #[error("Duplicate id: {0}")]
    DuplicateId(String),
}

/// Parses and validates a JSON document.
pub fn validate(raw: &str) -> Result<Document, ValidationError> {
    let value: Value = serde_json::from_str(raw)?;
    validate_value(value)
}

pub fn validate_value(value: Value) -> Result<Document, ValidationError> {
    check_version(&value)?;
    let doc: Document = serde_json::from_value(value)?;
    check_document(&doc)?;
    Ok(doc)
}

/// Canonical JSON form of a document.
pub fn to_json(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

fn check_version(value: &Value) -> Result<(), ValidationError> {
    let version = value
        .get("schemaVersion")
        .ok_or(ValidationError::MissingVersion)?;
    if version.as_u64() != Some(u64::from(SCHEMA_VERSION)) {
        return Err(ValidationError::UnsupportedVersion(version.clone()));
    }
    Ok(())
}

fn check_document(doc: &Document) -> Result<(), ValidationError> {
    check_len("title", &doc.title, MAX_TITLE_CHARS)?;

    let mut ids = IdSet::default();
    ids.insert("id", &doc.id)?;

    for (i, obj) in doc.objects.iter().enumerate() {
        let path = format!("objects[{}]", i);
        ids.insert(&path, &obj.id)?;
        check_point(&format!("{}.position", path), obj.position)?;
        if let Some(label) = &obj.style.label {
            check_len(&format!("{}.style.label", path), label, MAX_OBJECT_LABEL_CHARS)?;
        }
    }

    for (i, arrow) in doc.arrows.iter().enumerate() {
        let path = format!("arrows[{}]", i);
        ids.insert(&path, &arrow.id)?;
        check_point(&format!("{}.from", path), arrow.from)?;
        check_point(&format!("{}.to", path), arrow.to)?;
        if let Some(label) = &arrow.label {
            check_len(&format!("{}.label", path), label, MAX_ARROW_LABEL_CHARS)?;
        }
    }

    for (i, zone) in doc.zones.iter().enumerate() {
        let path = format!("zones[{}]", i);
        ids.insert(&path, &zone.id)?;
        check_shape(&format!("{}.shape", path), &zone.shape)?;
        let opacity = zone.style.fill_opacity;
        if !(MIN_ZONE_OPACITY..=MAX_ZONE_OPACITY).contains(&opacity) {
            return Err(ValidationError::OpacityOutOfRange {
                path: format!("{}.style.fillOpacity", path),
                value: opacity,
            });
        }
    }

    Ok(())
}

fn check_shape(path: &str, shape: &ZoneShape) -> Result<(), ValidationError> {
    match shape {
        ZoneShape::Rect {
            x,
            y,
            width,
            height,
        } => {
            check_coord(&format!("{}.x", path), *x)?;
            check_coord(&format!("{}.y", path), *y)?;
            check_extent(&format!("{}.width", path), *width)?;
            check_extent(&format!("{}.height", path), *height)
        }
        ZoneShape::Circle { cx, cy, r } => {
            check_coord(&format!("{}.cx", path), *cx)?;
            check_coord(&format!("{}.cy", path), *cy)?;
            check_extent(&format!("{}.r", path), *r)
        }
        ZoneShape::Triangle { points } => {
            for (i, p) in points.iter().enumerate() {
                check_point(&format!("{}.points[{}]", path, i), *p)?;
            }
            Ok(())
        }
    }
}

fn check_point(path: &str, p: Point) -> Result<(), ValidationError> {
    check_coord(&format!("{}.x", path), p.x)?;
    check_coord(&format!("{}.y", path), p.y)
}

fn check_coord(path: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CoordinateOutOfRange {
            path: path.to_string(),
            value,
        })
    }
}

fn check_extent(path: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidExtent {
            path: path.to_string(),
            value,
        })
    }
}

fn check_len(path: &str, s: &str, max: usize) -> Result<(), ValidationError> {
    if s.chars().count() > max {
        return Err(ValidationError::TooLong {
            path: path.to_string(),
            max,
        });
    }
    Ok(())
}

#[derive(Default)]
struct IdSet<'a> {
    seen: HashSet<&'a str>,
}

impl<'a> IdSet<'a> {
    fn insert(&mut self, path: &str, id: &'a str) -> Result<(), ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::EmptyId {
                path: path.to_string(),
            });
        }
        if !self.seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.to_string()));
        }
        Ok(())
    }
}
