//! Interactive editing controller.
//!
//! Translates pointer events on the canvas into document mutations. The
//! controller owns the document for the length of an editing session and
//! reports what changed through [`Effect`] values so a host (the browser
//! bindings, or a test) can mirror pointer capture and redraws.

pub mod hit;

use crate::clock::{Clock, SystemClock};
use crate::config::EditorConfig;
use crate::document::{
    Arrow, ArrowStyle, Document, LinePattern, MAX_ARROW_LABEL_CHARS, MAX_OBJECT_LABEL_CHARS,
    MAX_TITLE_CHARS, MAX_ZONE_OPACITY, MIN_ZONE_OPACITY, ObjectKind, ObjectSize, ObjectStyle,
    Point, SceneObject, SportType, Zone, ZoneColor, ZoneShape, ZoneStyle, new_id,
    normalize_label,
};
use crate::geometry::{
    CANVAS_HEIGHT, CANVAS_WIDTH, CanvasPoint, clamp_point, clamp01, dist_sq, from_canvas,
    snap_point,
};
use crate::svg::{RenderOptions, render};
use hit::{Hit, hit_test};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Select,
    Arrow,
    ZoneRect,
    ZoneCircle,
}

impl EditorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Arrow => "arrow",
            Self::ZoneRect => "zone-rect",
            Self::ZoneCircle => "zone-circle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "select" => Some(Self::Select),
            "arrow" => Some(Self::Arrow),
            "zone-rect" => Some(Self::ZoneRect),
            "zone-circle" => Some(Self::ZoneCircle),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    From,
    To,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Object {
        id: String,
    },
    Arrow {
        id: String,
        handle: Option<Handle>,
    },
    Zone {
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    Object { id: String },
    ArrowEndpoint { id: String, handle: Handle },
    /// `grab` is the zone anchor minus the pointer position at grab time.
    Zone { id: String, grab: Point },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer_id: i32,
        target: DragTarget,
    },
}

/// Something the host must act on after an editor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    CapturePointer(i32),
    ReleasePointer(i32),
    DocumentChanged,
    SelectionChanged,
    ModeChanged,
    PendingChanged,
}

impl Effect {
    pub fn name(self) -> &'static str {
        match self {
            Self::CapturePointer(_) => "capture",
            Self::ReleasePointer(_) => "release",
            Self::DocumentChanged => "document",
            Self::SelectionChanged => "selection",
            Self::ModeChanged => "mode",
            Self::PendingChanged => "pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: i32,
    /// Position in canvas (viewBox) units.
    pub point: CanvasPoint,
}

impl PointerEvent {
    pub fn new(pointer_id: i32, point: CanvasPoint) -> Self {
        Self { pointer_id, point }
    }
}

pub struct Editor {
    doc: Document,
    mode: EditorMode,
    selection: Selection,
    drag: DragState,
    pending: Option<Point>,
    config: EditorConfig,
    clock: Box<dyn Clock>,
}

impl Editor {
    pub fn new(doc: Document, config: EditorConfig) -> Self {
        Self::with_clock(doc, config, Box::new(SystemClock))
    }

    pub fn with_clock(doc: Document, config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            doc,
            mode: EditorMode::Select,
            selection: Selection::None,
            drag: DragState::Idle,
            pending: None,
            config,
            clock,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// First point of a half-finished two-click gesture.
    pub fn pending_start(&self) -> Option<Point> {
        self.pending
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn preview_svg(&self, options: &RenderOptions) -> String {
        render(&self.doc, options)
    }

    /// Swaps in a document that was persisted from this session.
    pub(crate) fn commit_saved(&mut self, doc: Document) {
        self.doc = doc;
    }

    fn touch(&mut self) {
        self.doc.updated_at = self.clock.now();
    }

    fn set_selection(&mut self, selection: Selection, effects: &mut Vec<Effect>) {
        if self.selection != selection {
            self.selection = selection;
            effects.push(Effect::SelectionChanged);
        }
    }

    /// Switches tools. Any pending gesture start is discarded.
    pub fn set_mode(&mut self, mode: EditorMode) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.pending.take().is_some() {
            effects.push(Effect::PendingChanged);
        }
        if self.mode != mode {
            tracing::debug!(from = self.mode.as_str(), to = mode.as_str(), "mode changed");
            self.mode = mode;
            effects.push(Effect::ModeChanged);
        }
        effects
    }

    /// Selects an entity by id, e.g. from a list outside the canvas.
    /// Unknown ids clear the selection.
    pub fn select(&mut self, selection: Selection) -> Vec<Effect> {
        let exists = match &selection {
            Selection::None => true,
            Selection::Object { id } => self.doc.object(id).is_some(),
            Selection::Arrow { id, .. } => self.doc.arrow(id).is_some(),
            Selection::Zone { id } => self.doc.zone(id).is_some(),
        };
        let mut effects = Vec::new();
        self.set_selection(
            if exists { selection } else { Selection::None },
            &mut effects,
        );
        effects
    }

    // ---------------------------------------------------------------------
    // Pointer handling
    // ---------------------------------------------------------------------

    pub fn pointer_down(&mut self, ev: PointerEvent) -> Vec<Effect> {
        // A second pointer cannot interfere with an active drag
        if matches!(self.drag, DragState::Dragging { .. }) {
            return Vec::new();
        }

        match self.mode {
            EditorMode::Select => self.select_down(ev),
            EditorMode::Arrow | EditorMode::ZoneRect | EditorMode::ZoneCircle => {
                self.draw_click(ev)
            }
        }
    }

    fn select_down(&mut self, ev: PointerEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        let (selection, target) = match hit_test(&self.doc, ev.point, &self.config) {
            Hit::Object(id) => (
                Selection::Object { id: id.clone() },
                Some(DragTarget::Object { id }),
            ),
            Hit::ArrowHandle { id, handle } => (
                Selection::Arrow {
                    id: id.clone(),
                    handle: Some(handle),
                },
                Some(DragTarget::ArrowEndpoint { id, handle }),
            ),
            Hit::ArrowBody(id) => (Selection::Arrow { id, handle: None }, None),
            Hit::Zone(id) => {
                let pointer = from_canvas(ev.point);
                let anchor = self
                    .doc
                    .zone(&id)
                    .map(|z| z.shape.anchor())
                    .unwrap_or(pointer);
                let grab = Point::new(anchor.x - pointer.x, anchor.y - pointer.y);
                (
                    Selection::Zone { id: id.clone() },
                    Some(DragTarget::Zone { id, grab }),
                )
            }
            Hit::None => (Selection::None, None),
        };

        self.set_selection(selection, &mut effects);
        if let Some(target) = target {
            tracing::debug!(pointer = ev.pointer_id, target = ?target, "drag started");
            self.drag = DragState::Dragging {
                pointer_id: ev.pointer_id,
                target,
            };
            effects.push(Effect::CapturePointer(ev.pointer_id));
        }
        effects
    }

    fn draw_click(&mut self, ev: PointerEvent) -> Vec<Effect> {
        let point = snap_point(from_canvas(ev.point), self.config.snap_step);
        let Some(start) = self.pending.take() else {
            self.pending = Some(point);
            return vec![Effect::PendingChanged];
        };

        let selection = match self.mode {
            EditorMode::Arrow => Selection::Arrow {
                id: self.push_arrow(start, point),
                handle: None,
            },
            EditorMode::ZoneRect => Selection::Zone {
                id: self.push_zone(self.rect_shape(start, point)),
            },
            EditorMode::ZoneCircle => Selection::Zone {
                id: self.push_zone(self.circle_shape(start, point)),
            },
            EditorMode::Select => return Vec::new(),
        };

        let mut effects = vec![Effect::PendingChanged, Effect::DocumentChanged];
        self.set_selection(selection, &mut effects);
        self.mode = EditorMode::Select;
        effects.push(Effect::ModeChanged);
        effects
    }

    pub fn pointer_move(&mut self, ev: PointerEvent) -> Vec<Effect> {
        let DragState::Dragging { pointer_id, target } = &self.drag else {
            return Vec::new();
        };
        if *pointer_id != ev.pointer_id {
            return Vec::new();
        }
        let target = target.clone();
        // Live motion stays unsnapped for smooth feedback
        let pos = clamp_point(from_canvas(ev.point));
        if self.move_target(&target, pos) {
            self.touch();
            vec![Effect::DocumentChanged]
        } else {
            Vec::new()
        }
    }

    pub fn pointer_up(&mut self, ev: PointerEvent) -> Vec<Effect> {
        let DragState::Dragging { pointer_id, target } = &self.drag else {
            return Vec::new();
        };
        if *pointer_id != ev.pointer_id {
            return Vec::new();
        }
        let target = target.clone();
        self.drag = DragState::Idle;

        let mut effects = Vec::new();
        if self.config.snap_on_release && self.snap_target(&target) {
            self.touch();
            effects.push(Effect::DocumentChanged);
        }
        tracing::debug!(pointer = ev.pointer_id, "drag ended");
        effects.push(Effect::ReleasePointer(ev.pointer_id));
        effects
    }

    /// Pointer cancellation commits the last known position, like a release.
    pub fn pointer_cancel(&mut self, ev: PointerEvent) -> Vec<Effect> {
        self.pointer_up(ev)
    }

    fn move_target(&mut self, target: &DragTarget, pos: Point) -> bool {
        match target {
            DragTarget::Object { id } => match self.doc.object_mut(id) {
                Some(obj) => {
                    obj.position = pos;
                    true
                }
                None => false,
            },
            DragTarget::ArrowEndpoint { id, handle } => match self.doc.arrow_mut(id) {
                Some(arrow) => {
                    match handle {
                        Handle::From => arrow.from = pos,
                        Handle::To => arrow.to = pos,
                    }
                    true
                }
                None => false,
            },
            DragTarget::Zone { id, grab } => match self.doc.zone_mut(id) {
                Some(zone) => {
                    place_zone(&mut zone.shape, Point::new(pos.x + grab.x, pos.y + grab.y));
                    true
                }
                None => false,
            },
        }
    }

    /// Snaps the dragged entity's committed position. Returns whether anything moved.
    fn snap_target(&mut self, target: &DragTarget) -> bool {
        let step = self.config.snap_step;
        match target {
            DragTarget::Object { id } => self.doc.object_mut(id).is_some_and(|obj| {
                let snapped = snap_point(obj.position, step);
                let moved = snapped != obj.position;
                obj.position = snapped;
                moved
            }),
            DragTarget::ArrowEndpoint { id, handle } => {
                self.doc.arrow_mut(id).is_some_and(|arrow| {
                    let end = match handle {
                        Handle::From => &mut arrow.from,
                        Handle::To => &mut arrow.to,
                    };
                    let snapped = snap_point(*end, step);
                    let moved = snapped != *end;
                    *end = snapped;
                    moved
                })
            }
            DragTarget::Zone { id, .. } => self.doc.zone_mut(id).is_some_and(|zone| {
                let before = zone.shape.clone();
                place_zone(&mut zone.shape, snap_point(before.anchor(), step));
                zone.shape != before
            }),
        }
    }

    fn rect_shape(&self, start: Point, end: Point) -> ZoneShape {
        let min = self.config.min_zone_size;
        let width = (end.x - start.x).abs().max(min).min(1.0);
        let height = (end.y - start.y).abs().max(min).min(1.0);
        ZoneShape::Rect {
            x: start.x.min(end.x).min(1.0 - width),
            y: start.y.min(end.y).min(1.0 - height),
            width,
            height,
        }
    }

    fn circle_shape(&self, center: Point, edge: Point) -> ZoneShape {
        let r = dist_sq(center, edge)
            .sqrt()
            .min(self.config.max_circle_radius)
            .max(self.config.min_zone_size / 2.0);
        ZoneShape::Circle {
            cx: center.x,
            cy: center.y,
            r,
        }
    }

    fn push_arrow(&mut self, from: Point, to: Point) -> String {
        let id = new_id();
        self.doc.arrows.push(Arrow {
            id: id.clone(),
            from,
            to,
            style: ArrowStyle::default(),
            label: None,
        });
        self.touch();
        tracing::debug!(id = %id, "arrow added");
        id
    }

    fn push_zone(&mut self, shape: ZoneShape) -> String {
        let id = new_id();
        self.doc.zones.push(Zone {
            id: id.clone(),
            shape,
            style: ZoneStyle {
                fill: self.config.default_zone_color,
                fill_opacity: self
                    .config
                    .default_zone_opacity
                    .clamp(MIN_ZONE_OPACITY, MAX_ZONE_OPACITY),
            },
        });
        self.touch();
        tracing::debug!(id = %id, "zone added");
        id
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    /// Places a new object at the canvas center and selects it. A second
    /// ball is never created: the existing ball is selected instead.
    /// Returns the id of the selected object.
    pub fn add_object(&mut self, kind: ObjectKind) -> String {
        self.pending = None;
        self.mode = EditorMode::Select;

        if kind == ObjectKind::Ball {
            if let Some(ball) = self.doc.ball() {
                let id = ball.id.clone();
                tracing::debug!(id = %id, "ball already placed, selecting it");
                self.selection = Selection::Object { id: id.clone() };
                return id;
            }
        }

        let id = new_id();
        self.doc.objects.push(SceneObject {
            id: id.clone(),
            kind,
            position: Point::CENTER,
            style: ObjectStyle {
                label: (kind == ObjectKind::Player).then(|| "P".to_string()),
                ..ObjectStyle::default()
            },
        });
        self.selection = Selection::Object { id: id.clone() };
        self.touch();
        tracing::debug!(id = %id, kind = kind.as_str(), "object added");
        id
    }

    pub fn remove_selected(&mut self) -> bool {
        let removed = match &self.selection {
            Selection::None => return false,
            Selection::Object { id } => remove_by_id(&mut self.doc.objects, id, |o| &o.id),
            Selection::Arrow { id, .. } => remove_by_id(&mut self.doc.arrows, id, |a| &a.id),
            Selection::Zone { id } => remove_by_id(&mut self.doc.zones, id, |z| &z.id),
        };
        self.selection = Selection::None;
        if removed {
            self.touch();
            tracing::debug!("selection removed");
        }
        removed
    }

    /// Clones the selected object or arrow, offset diagonally, and selects
    /// the copy. Zones and the ball cannot be duplicated.
    pub fn duplicate_selected(&mut self) -> Option<String> {
        let offset = self.config.duplicate_offset;
        let shift = |p: Point| Point::new(clamp01(p.x + offset), clamp01(p.y + offset));
        let id = new_id();

        match self.selection.clone() {
            Selection::Object { id: src_id } => {
                let src = self.doc.object(&src_id)?;
                if src.kind == ObjectKind::Ball {
                    return None;
                }
                let copy = SceneObject {
                    id: id.clone(),
                    position: shift(src.position),
                    ..src.clone()
                };
                self.doc.objects.push(copy);
                self.selection = Selection::Object { id: id.clone() };
            }
            Selection::Arrow { id: src_id, .. } => {
                let src = self.doc.arrow(&src_id)?;
                let copy = Arrow {
                    id: id.clone(),
                    from: shift(src.from),
                    to: shift(src.to),
                    ..src.clone()
                };
                self.doc.arrows.push(copy);
                self.selection = Selection::Arrow {
                    id: id.clone(),
                    handle: None,
                };
            }
            Selection::Zone { .. } | Selection::None => return None,
        }

        self.touch();
        tracing::debug!(id = %id, "selection duplicated");
        Some(id)
    }

    fn selected_object_mut(&mut self) -> Option<&mut SceneObject> {
        match &self.selection {
            Selection::Object { id } => self.doc.objects.iter_mut().find(|o| &o.id == id),
            _ => None,
        }
    }

    fn selected_arrow_mut(&mut self) -> Option<&mut Arrow> {
        match &self.selection {
            Selection::Arrow { id, .. } => self.doc.arrows.iter_mut().find(|a| &a.id == id),
            _ => None,
        }
    }

    fn selected_zone_mut(&mut self) -> Option<&mut Zone> {
        match &self.selection {
            Selection::Zone { id } => self.doc.zones.iter_mut().find(|z| &z.id == id),
            _ => None,
        }
    }

    pub fn set_object_label(&mut self, label: &str) -> bool {
        let Some(obj) = self.selected_object_mut() else {
            return false;
        };
        obj.style.label = normalize_label(label, MAX_OBJECT_LABEL_CHARS);
        self.touch();
        true
    }

    pub fn set_object_size(&mut self, size: ObjectSize) -> bool {
        let Some(obj) = self.selected_object_mut() else {
            return false;
        };
        obj.style.size = size;
        self.touch();
        true
    }

    pub fn set_object_color(&mut self, color: &str) -> bool {
        let Some(obj) = self.selected_object_mut() else {
            return false;
        };
        obj.style.color = color.to_string();
        self.touch();
        true
    }

    pub fn set_arrow_pattern(&mut self, pattern: LinePattern) -> bool {
        let Some(arrow) = self.selected_arrow_mut() else {
            return false;
        };
        arrow.style.pattern = pattern;
        self.touch();
        true
    }

    pub fn set_arrow_head(&mut self, arrowhead: bool) -> bool {
        let Some(arrow) = self.selected_arrow_mut() else {
            return false;
        };
        arrow.style.arrowhead = arrowhead;
        self.touch();
        true
    }

    pub fn set_arrow_label(&mut self, label: &str) -> bool {
        let Some(arrow) = self.selected_arrow_mut() else {
            return false;
        };
        arrow.label = normalize_label(label, MAX_ARROW_LABEL_CHARS);
        self.touch();
        true
    }

    pub fn set_arrow_color(&mut self, color: &str) -> bool {
        let Some(arrow) = self.selected_arrow_mut() else {
            return false;
        };
        arrow.style.color = color.to_string();
        self.touch();
        true
    }

    pub fn set_zone_color(&mut self, color: ZoneColor) -> bool {
        let Some(zone) = self.selected_zone_mut() else {
            return false;
        };
        zone.style.fill = color;
        self.touch();
        true
    }

    /// Clamped to the [0.05, 0.5] opacity range. NaN is ignored.
    pub fn set_zone_opacity(&mut self, opacity: f64) -> bool {
        if opacity.is_nan() {
            return false;
        }
        let Some(zone) = self.selected_zone_mut() else {
            return false;
        };
        zone.style.fill_opacity = opacity.clamp(MIN_ZONE_OPACITY, MAX_ZONE_OPACITY);
        self.touch();
        true
    }

    pub fn set_title(&mut self, title: &str) {
        self.doc.title = title.chars().take(MAX_TITLE_CHARS).collect();
        self.touch();
    }

    pub fn set_sport_type(&mut self, sport: SportType) {
        self.doc.sport_type = sport;
        self.touch();
    }

    pub fn set_field_template_id(&mut self, template: &str) {
        self.doc.field_template_id = template.to_string();
        self.touch();
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &str, key: impl Fn(&T) -> &String) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}

/// Moves a zone so its anchor sits at `anchor`, keeping the shape on canvas.
fn place_zone(shape: &mut ZoneShape, anchor: Point) {
    match shape {
        ZoneShape::Rect {
            x,
            y,
            width,
            height,
        } => {
            *x = anchor.x.clamp(0.0, (1.0 - *width).max(0.0));
            *y = anchor.y.clamp(0.0, (1.0 - *height).max(0.0));
        }
        ZoneShape::Circle { cx, cy, r } => {
            // r is in canvas-width units; a radius past 0.5 pins the center.
            let rx = r.min(0.5);
            let ry = (*r * CANVAS_WIDTH / CANVAS_HEIGHT).min(0.5);
            *cx = anchor.x.clamp(rx, 1.0 - rx);
            *cy = anchor.y.clamp(ry, 1.0 - ry);
        }
        ZoneShape::Triangle { points } => {
            let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
            let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
            let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
            let dx = (anchor.x - points[0].x).clamp(-min_x, 1.0 - max_x);
            let dy = (anchor.y - points[0].y).clamp(-min_y, 1.0 - max_y);
            for p in points.iter_mut() {
                p.x += dx;
                p.y += dy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::geometry::{SNAP_STEP, to_canvas};
    use chrono::{DateTime, Utc};

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn t1() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_600, 0).unwrap()
    }

    fn editor(sport: SportType) -> Editor {
        Editor::with_clock(
            Document::new("diag", "Test", sport, t0()),
            EditorConfig::default(),
            Box::new(FixedClock(t1())),
        )
    }

    fn ev(x: f64, y: f64) -> PointerEvent {
        PointerEvent::new(1, to_canvas(Point::new(x, y)))
    }

    fn on_grid(v: f64) -> bool {
        let steps = v / SNAP_STEP;
        (steps - steps.round()).abs() < 1e-9
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_add_object_defaults() {
        let mut ed = editor(SportType::Football);
        let id = ed.add_object(ObjectKind::Player);
        let obj = ed.document().object(&id).unwrap();

        assert_eq!(obj.position, Point::CENTER);
        assert_eq!(obj.style.size, ObjectSize::Md);
        assert_eq!(obj.style.label.as_deref(), Some("P"));
        assert_eq!(obj.style.color, "currentColor");
        assert_eq!(ed.selection(), &Selection::Object { id });
        assert_eq!(ed.document().updated_at, t1());

        let marker = ed.add_object(ObjectKind::Marker);
        assert_eq!(ed.document().object(&marker).unwrap().style.label, None);
    }

    #[test]
    fn test_second_ball_selects_existing() {
        let mut ed = editor(SportType::Football);
        let first = ed.add_object(ObjectKind::Ball);
        ed.add_object(ObjectKind::Player);
        let count = ed.document().objects.len();

        let again = ed.add_object(ObjectKind::Ball);

        assert_eq!(again, first);
        assert_eq!(ed.document().objects.len(), count);
        assert_eq!(ed.selection(), &Selection::Object { id: first });
    }

    #[test]
    fn test_basketball_scenario() {
        let mut ed = editor(SportType::Basketball);
        ed.add_object(ObjectKind::Player);
        let ball = ed.add_object(ObjectKind::Ball);
        let again = ed.add_object(ObjectKind::Ball);
        assert_eq!(again, ball);
        assert_eq!(ed.selection(), &Selection::Object { id: ball });

        let svg = ed.preview_svg(&RenderOptions::default());
        assert!(svg.contains("/court/basket_v2.webp"));
        assert!(svg.contains(
            r#"data-object-type="player" transform="translate(300 500)""#
        ));
        assert!(svg.contains(r#"data-object-type="ball" transform="translate(300 500)""#));
        assert!(svg.contains("/coach-diagram/markers/basketball-player_v2.webp"));
        assert!(svg.contains("/coach-diagram/markers/basketball-ball_v2.webp"));
        assert_eq!(svg.matches(r#"data-object-type="ball""#).count(), 1);
    }

    #[test]
    fn test_draw_arrow_two_clicks() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::Arrow);

        let first = ed.pointer_down(ev(0.101, 0.099));
        assert_eq!(first, vec![Effect::PendingChanged]);
        assert_eq!(ed.pending_start(), Some(Point::new(0.1, 0.1)));
        assert!(ed.document().arrows.is_empty());

        let second = ed.pointer_down(ev(0.9, 0.9));
        assert!(second.contains(&Effect::DocumentChanged));
        assert_eq!(ed.mode(), EditorMode::Select);
        assert_eq!(ed.pending_start(), None);

        let arrow = &ed.document().arrows[0];
        assert_eq!(arrow.from, Point::new(0.1, 0.1));
        assert_eq!(arrow.to, Point::new(0.9, 0.9));
        assert!(arrow.style.arrowhead);
        assert_eq!(
            ed.selection(),
            &Selection::Arrow {
                id: arrow.id.clone(),
                handle: None
            }
        );
    }

    #[test]
    fn test_dashed_labeled_arrow_scenario() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::Arrow);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.9, 0.9));
        assert!(ed.set_arrow_pattern(LinePattern::Dashed));
        assert!(ed.set_arrow_label("Cut"));

        let svg = ed.preview_svg(&RenderOptions::default());
        let line = svg
            .lines()
            .find(|l| l.starts_with("<line") && l.contains(r#"x1="60""#))
            .unwrap();
        assert!(line.contains(r#"stroke-dasharray="8 6""#));
        assert_eq!(svg.matches(">Cut</text>").count(), 2);
    }

    #[test]
    fn test_switching_mode_discards_pending() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.2, 0.2));
        assert!(ed.pending_start().is_some());

        let effects = ed.set_mode(EditorMode::Arrow);
        assert!(effects.contains(&Effect::PendingChanged));
        assert_eq!(ed.pending_start(), None);

        // Re-selecting the same tool also resets the gesture
        ed.pointer_down(ev(0.3, 0.3));
        ed.set_mode(EditorMode::Arrow);
        assert_eq!(ed.pending_start(), None);
    }

    #[test]
    fn test_zone_rect_minimum_size() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.4, 0.4));
        ed.pointer_down(ev(0.4, 0.4));

        match &ed.document().zones[0].shape {
            ZoneShape::Rect { width, height, .. } => {
                assert_eq!(*width, 0.05);
                assert_eq!(*height, 0.05);
            }
            other => panic!("expected rect, got {:?}", other),
        }
        assert_eq!(ed.mode(), EditorMode::Select);
        assert!(matches!(ed.selection(), Selection::Zone { .. }));
    }

    #[test]
    fn test_zone_rect_normalizes_corners() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.6, 0.7));
        ed.pointer_down(ev(0.2, 0.3));

        match &ed.document().zones[0].shape {
            ZoneShape::Rect {
                x,
                y,
                width,
                height,
            } => {
                assert!(approx(*x, 0.2));
                assert!(approx(*y, 0.3));
                assert!(approx(*width, 0.4));
                assert!(approx(*height, 0.4));
            }
            other => panic!("expected rect, got {:?}", other),
        }
        let zone = &ed.document().zones[0];
        assert_eq!(zone.style.fill, ZoneColor::Red);
        assert_eq!(zone.style.fill_opacity, 0.18);
    }

    #[test]
    fn test_zone_circle_radius_capped() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneCircle);
        ed.pointer_down(ev(0.5, 0.5));
        ed.pointer_down(ev(0.9, 0.9));
        match &ed.document().zones[0].shape {
            ZoneShape::Circle { cx, cy, r } => {
                assert_eq!((*cx, *cy), (0.5, 0.5));
                assert!(approx(*r, 0.5));
            }
            other => panic!("expected circle, got {:?}", other),
        }

        ed.set_mode(EditorMode::ZoneCircle);
        ed.pointer_down(ev(0.5, 0.5));
        ed.pointer_down(ev(0.56, 0.58));
        match &ed.document().zones[1].shape {
            ZoneShape::Circle { r, .. } => assert!(approx(*r, 0.1)),
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_click_placed_points_on_grid() {
        let mut ed = editor(SportType::Football);
        for (a, b) in [((0.123, 0.457), (0.871, 0.333)), ((0.019, 0.999), (0.5, 0.011))] {
            ed.set_mode(EditorMode::Arrow);
            ed.pointer_down(ev(a.0, a.1));
            ed.pointer_down(ev(b.0, b.1));
        }
        for arrow in &ed.document().arrows {
            for p in [arrow.from, arrow.to] {
                assert!(on_grid(p.x) && on_grid(p.y), "{:?} not on grid", p);
            }
        }
    }

    #[test]
    fn test_drag_object_snaps_on_release() {
        let mut ed = editor(SportType::Football);
        let id = ed.add_object(ObjectKind::Player);
        ed.select(Selection::None);

        let down = ed.pointer_down(ev(0.5, 0.5));
        assert!(down.contains(&Effect::CapturePointer(1)));
        assert!(down.contains(&Effect::SelectionChanged));

        ed.pointer_move(ev(0.333, 0.611));
        let live = ed.document().object(&id).unwrap().position;
        assert!(approx(live.x, 0.333) && approx(live.y, 0.611));

        let up = ed.pointer_up(ev(0.333, 0.611));
        assert!(up.contains(&Effect::ReleasePointer(1)));
        assert_eq!(ed.drag(), &DragState::Idle);
        let committed = ed.document().object(&id).unwrap().position;
        assert!(approx(committed.x, 0.34) && approx(committed.y, 0.62));
    }

    #[test]
    fn test_drag_without_release_snap() {
        let config = EditorConfig {
            snap_on_release: false,
            ..EditorConfig::default()
        };
        let mut ed = Editor::with_clock(
            Document::new("d", "t", SportType::Football, t0()),
            config,
            Box::new(FixedClock(t1())),
        );
        let id = ed.add_object(ObjectKind::Marker);
        ed.pointer_down(ev(0.5, 0.5));
        ed.pointer_move(ev(0.333, 0.611));
        let up = ed.pointer_up(ev(0.333, 0.611));
        assert_eq!(up, vec![Effect::ReleasePointer(1)]);
        let pos = ed.document().object(&id).unwrap().position;
        assert!(approx(pos.x, 0.333));
    }

    #[test]
    fn test_other_pointer_ignored_while_dragging() {
        let mut ed = editor(SportType::Football);
        let id = ed.add_object(ObjectKind::Player);
        ed.pointer_down(ev(0.5, 0.5));

        let other = PointerEvent::new(2, to_canvas(Point::new(0.1, 0.1)));
        assert!(ed.pointer_down(other).is_empty());
        assert!(ed.pointer_move(other).is_empty());
        assert!(ed.pointer_up(other).is_empty());
        assert_eq!(ed.document().object(&id).unwrap().position, Point::CENTER);
        assert!(matches!(ed.drag(), DragState::Dragging { pointer_id: 1, .. }));
    }

    #[test]
    fn test_arrow_endpoint_drag() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::Arrow);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.1, 0.5));
        let id = ed.document().arrows[0].id.clone();

        let down = ed.pointer_down(ev(0.105, 0.505));
        assert!(down.contains(&Effect::CapturePointer(1)));
        assert_eq!(
            ed.selection(),
            &Selection::Arrow {
                id: id.clone(),
                handle: Some(Handle::To)
            }
        );

        ed.pointer_move(ev(0.7, 0.8));
        ed.pointer_up(ev(0.7, 0.8));
        let arrow = ed.document().arrow(&id).unwrap();
        assert_eq!(arrow.from, Point::new(0.1, 0.1));
        assert!(approx(arrow.to.x, 0.7) && approx(arrow.to.y, 0.8));
    }

    #[test]
    fn test_arrow_body_selects_without_drag() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::Arrow);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.1, 0.5));
        ed.select(Selection::None);

        let effects = ed.pointer_down(ev(0.1, 0.3));
        assert!(!effects.iter().any(|e| matches!(e, Effect::CapturePointer(_))));
        assert!(matches!(
            ed.selection(),
            Selection::Arrow { handle: None, .. }
        ));
        assert_eq!(ed.drag(), &DragState::Idle);
    }

    #[test]
    fn test_zone_drag_keeps_grab_offset() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.2, 0.2));
        ed.pointer_down(ev(0.4, 0.4));
        ed.select(Selection::None);

        ed.pointer_down(ev(0.3, 0.3));
        ed.pointer_move(ev(0.5, 0.6));
        ed.pointer_up(ev(0.5, 0.6));

        match &ed.document().zones[0].shape {
            ZoneShape::Rect { x, y, .. } => {
                assert!(approx(*x, 0.4));
                assert!(approx(*y, 0.5));
            }
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_zone_drag_stays_on_canvas() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.2, 0.2));
        ed.pointer_down(ev(0.4, 0.4));
        ed.select(Selection::None);

        ed.pointer_down(ev(0.3, 0.3));
        ed.pointer_move(ev(1.0, 1.0));
        ed.pointer_up(ev(1.0, 1.0));

        match &ed.document().zones[0].shape {
            ZoneShape::Rect { x, y, .. } => {
                assert!(approx(*x, 0.8));
                assert!(approx(*y, 0.8));
            }
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_circle_drag_stays_on_canvas() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneCircle);
        ed.pointer_down(ev(0.5, 0.5));
        ed.pointer_down(ev(0.6, 0.5));
        ed.select(Selection::None);

        ed.pointer_down(ev(0.5, 0.5));
        ed.pointer_move(ev(0.99, 0.01));
        ed.pointer_up(ev(0.99, 0.01));

        match &ed.document().zones[0].shape {
            ZoneShape::Circle { cx, cy, r } => {
                assert!(approx(*r, 0.1));
                assert!(approx(*cx, 0.9));
                assert!(approx(*cy, 0.06));
                let center = to_canvas(Point::new(*cx, *cy));
                let radius = r * CANVAS_WIDTH;
                assert!(center.x + radius <= CANVAS_WIDTH + 1e-6);
                assert!(center.y - radius >= -1e-6);
            }
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_click_clears_selection() {
        let mut ed = editor(SportType::Football);
        ed.add_object(ObjectKind::Player);
        let effects = ed.pointer_down(ev(0.05, 0.95));
        assert_eq!(effects, vec![Effect::SelectionChanged]);
        assert_eq!(ed.selection(), &Selection::None);
    }

    #[test]
    fn test_remove_selected_each_kind() {
        let mut ed = editor(SportType::Football);

        let obj = ed.add_object(ObjectKind::Marker);
        assert!(ed.remove_selected());
        assert_eq!(ed.selection(), &Selection::None);
        assert!(ed.document().object(&obj).is_none());

        ed.set_mode(EditorMode::Arrow);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.3, 0.3));
        assert!(ed.remove_selected());
        assert!(ed.document().arrows.is_empty());
        assert_eq!(ed.selection(), &Selection::None);

        ed.set_mode(EditorMode::ZoneCircle);
        ed.pointer_down(ev(0.5, 0.5));
        ed.pointer_down(ev(0.6, 0.5));
        assert!(ed.remove_selected());
        assert!(ed.document().zones.is_empty());
        assert_eq!(ed.selection(), &Selection::None);

        assert!(!ed.remove_selected());
    }

    #[test]
    fn test_duplicate_object_and_arrow() {
        let mut ed = editor(SportType::Football);
        let src = ed.add_object(ObjectKind::Player);
        ed.set_object_label("LB");
        let copy = ed.duplicate_selected().unwrap();
        assert_ne!(copy, src);
        let obj = ed.document().object(&copy).unwrap();
        assert!(approx(obj.position.x, 0.54) && approx(obj.position.y, 0.54));
        assert_eq!(obj.style.label.as_deref(), Some("LB"));
        assert_eq!(ed.selection(), &Selection::Object { id: copy });

        ed.set_mode(EditorMode::Arrow);
        ed.pointer_down(ev(0.9, 0.1));
        ed.pointer_down(ev(0.98, 0.98));
        let copy = ed.duplicate_selected().unwrap();
        let arrow = ed.document().arrow(&copy).unwrap();
        assert!(approx(arrow.from.x, 0.94) && approx(arrow.from.y, 0.14));
        assert_eq!(arrow.to, Point::new(1.0, 1.0));
    }

    #[test]
    fn test_duplicate_ball_and_zone_are_noops() {
        let mut ed = editor(SportType::Football);
        ed.add_object(ObjectKind::Ball);
        assert_eq!(ed.duplicate_selected(), None);
        assert_eq!(ed.document().objects.len(), 1);

        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.3, 0.3));
        assert_eq!(ed.duplicate_selected(), None);
        assert_eq!(ed.document().zones.len(), 1);
    }

    #[test]
    fn test_setters_require_matching_selection() {
        let mut ed = editor(SportType::Football);
        assert!(!ed.set_object_label("x"));
        assert!(!ed.set_arrow_pattern(LinePattern::Dashed));
        assert!(!ed.set_zone_color(ZoneColor::Blue));

        ed.add_object(ObjectKind::Player);
        assert!(!ed.set_arrow_head(false));
        assert!(!ed.set_zone_opacity(0.3));
        assert!(ed.set_object_size(ObjectSize::Lg));
        assert!(ed.set_object_label("   "));
        let Selection::Object { id } = ed.selection().clone() else {
            panic!("expected object selection");
        };
        assert_eq!(ed.document().object(&id).unwrap().style.label, None);
        assert_eq!(ed.document().object(&id).unwrap().style.size, ObjectSize::Lg);
    }

    #[test]
    fn test_zone_style_setters() {
        let mut ed = editor(SportType::Football);
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.3, 0.3));

        assert!(ed.set_zone_color(ZoneColor::Purple));
        assert!(ed.set_zone_opacity(0.9));
        assert!(!ed.set_zone_opacity(f64::NAN));
        let zone = &ed.document().zones[0];
        assert_eq!(zone.style.fill, ZoneColor::Purple);
        assert_eq!(zone.style.fill_opacity, 0.5);
    }

    #[test]
    fn test_labels_capped() {
        let mut ed = editor(SportType::Football);
        ed.add_object(ObjectKind::Player);
        ed.set_object_label(&"x".repeat(40));
        ed.set_mode(EditorMode::Arrow);
        ed.pointer_down(ev(0.1, 0.1));
        ed.pointer_down(ev(0.3, 0.3));
        ed.set_arrow_label(&"y".repeat(40));

        let doc = ed.document();
        assert_eq!(doc.objects[0].style.label.as_ref().unwrap().len(), 16);
        assert_eq!(doc.arrows[0].label.as_ref().unwrap().len(), 32);
    }

    #[test]
    fn test_document_setters_touch() {
        let mut ed = editor(SportType::Football);
        ed.set_title("Zone press");
        ed.set_sport_type(SportType::Custom);
        ed.set_field_template_id("full-pitch");
        let doc = ed.document();
        assert_eq!(doc.title, "Zone press");
        assert_eq!(doc.sport_type, SportType::Custom);
        assert_eq!(doc.field_template_id, "full-pitch");
        assert_eq!(doc.updated_at, t1());
        assert_eq!(doc.created_at, t0());
    }

    #[test]
    fn test_select_unknown_id_clears() {
        let mut ed = editor(SportType::Football);
        ed.add_object(ObjectKind::Player);
        ed.select(Selection::Zone { id: "nope".into() });
        assert_eq!(ed.selection(), &Selection::None);
    }

    #[test]
    fn test_edited_document_validates() {
        let mut ed = editor(SportType::Handball);
        ed.add_object(ObjectKind::Player);
        ed.add_object(ObjectKind::Ball);
        ed.set_mode(EditorMode::ZoneCircle);
        ed.pointer_down(ev(0.98, 0.98));
        ed.pointer_down(ev(0.98, 0.98));
        ed.set_mode(EditorMode::ZoneRect);
        ed.pointer_down(ev(0.99, 0.99));
        ed.pointer_down(ev(0.99, 0.99));

        let json = crate::schema::to_json(ed.document()).unwrap();
        let back = crate::schema::validate(&json).unwrap();
        assert_eq!(&back, ed.document());
    }

    #[test]
    fn test_mode_names() {
        for mode in [
            EditorMode::Select,
            EditorMode::Arrow,
            EditorMode::ZoneRect,
            EditorMode::ZoneCircle,
        ] {
            assert_eq!(EditorMode::from_str(mode.as_str()), Some(mode));
        }
    }
}
