//! Diagram document model.
//!
//! All positions live in normalized space: `x` and `y` are fractions of the
//! canvas width and height, so a document renders identically at any output
//! resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_COLOR: &str = "currentColor";
pub const DEFAULT_FIELD_TEMPLATE: &str = "default";

pub const MAX_OBJECT_LABEL_CHARS: usize = 16;
pub const MAX_ARROW_LABEL_CHARS: usize = 32;
pub const MAX_TITLE_CHARS: usize = 200;

pub const MIN_ZONE_OPACITY: f64 = 0.05;
pub const MAX_ZONE_OPACITY: f64 = 0.5;

/// A point in normalized [0,1]² space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const CENTER: Point = Point { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportType {
    Football,
    Basketball,
    Handball,
    Hockey,
    Innebandy,
    Custom,
}

impl SportType {
    pub const ALL: [SportType; 6] = [
        Self::Football,
        Self::Basketball,
        Self::Handball,
        Self::Hockey,
        Self::Innebandy,
        Self::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Football => "football",
            Self::Basketball => "basketball",
            Self::Handball => "handball",
            Self::Hockey => "hockey",
            Self::Innebandy => "innebandy",
            Self::Custom => "custom",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sport| sport.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Player,
    Ball,
    Marker,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Ball => "ball",
            Self::Marker => "marker",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "player" => Some(Self::Player),
            "ball" => Some(Self::Ball),
            "marker" => Some(Self::Marker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectSize {
    Sm,
    #[default]
    Md,
    Lg,
}

impl ObjectSize {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sm" => Some(Self::Sm),
            "md" => Some(Self::Md),
            "lg" => Some(Self::Lg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectStyle {
    pub size: ObjectSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub color: String,
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            size: ObjectSize::Md,
            label: None,
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// A player, ball, or marker placed on the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub position: Point,
    pub style: ObjectStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinePattern {
    #[default]
    Solid,
    Dashed,
}

impl LinePattern {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "solid" => Some(Self::Solid),
            "dashed" => Some(Self::Dashed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArrowStyle {
    pub pattern: LinePattern,
    pub arrowhead: bool,
    pub color: String,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            pattern: LinePattern::Solid,
            arrowhead: true,
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Arrow {
    pub id: String,
    pub from: Point,
    pub to: Point,
    pub style: ArrowStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneColor {
    #[default]
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl ZoneColor {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#ef4444",
            Self::Orange => "#f97316",
            Self::Yellow => "#eab308",
            Self::Green => "#22c55e",
            Self::Blue => "#3b82f6",
            Self::Purple => "#8b5cf6",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "red" => Some(Self::Red),
            "orange" => Some(Self::Orange),
            "yellow" => Some(Self::Yellow),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            "purple" => Some(Self::Purple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ZoneStyle {
    pub fill: ZoneColor,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum ZoneShape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Triangle {
        points: [Point; 3],
    },
}

impl ZoneShape {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Circle { .. } => "circle",
            Self::Triangle { .. } => "triangle",
        }
    }

    /// Reference point moved by drags: rect top-left, circle center,
    /// triangle first vertex.
    pub fn anchor(&self) -> Point {
        match self {
            Self::Rect { x, y, .. } => Point::new(*x, *y),
            Self::Circle { cx, cy, .. } => Point::new(*cx, *cy),
            Self::Triangle { points } => points[0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Zone {
    pub id: String,
    pub shape: ZoneShape,
    pub style: ZoneStyle,
}

/// The complete, versioned representation of one diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub schema_version: u32,
    pub title: String,
    pub sport_type: SportType,
    pub field_template_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub objects: Vec<SceneObject>,
    pub arrows: Vec<Arrow>,
    pub zones: Vec<Zone>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        sport_type: SportType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            schema_version: SCHEMA_VERSION,
            title: title.into(),
            sport_type,
            field_template_id: DEFAULT_FIELD_TEMPLATE.to_string(),
            created_at: now,
            updated_at: now,
            objects: Vec::new(),
            arrows: Vec::new(),
            zones: Vec::new(),
        }
    }

    pub fn object(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn arrow(&self, id: &str) -> Option<&Arrow> {
        self.arrows.iter().find(|a| a.id == id)
    }

    pub fn arrow_mut(&mut self, id: &str) -> Option<&mut Arrow> {
        self.arrows.iter_mut().find(|a| a.id == id)
    }

    pub fn zone(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zone_mut(&mut self, id: &str) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    /// The singleton ball, if one has been placed.
    pub fn ball(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.kind == ObjectKind::Ball)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.arrows.is_empty() && self.zones.is_empty()
    }
}

/// Generates a fresh entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trims a user-entered label and caps it at `max_chars` characters.
/// Blank input clears the label.
pub fn normalize_label(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect())
}
