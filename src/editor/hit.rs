//! Hit-testing against the rendered scene.
//!
//! Tests run topmost-first in the order the renderer stacks things:
//! objects, then arrows, then zones.

use crate::config::EditorConfig;
use crate::document::{Document, ObjectKind, Point, SceneObject, Zone, ZoneShape};
use crate::editor::Handle;
use crate::geometry::{
    CANVAS_WIDTH, CanvasPoint, canvas_dist, dist_sq, from_canvas, in_triangle, segment_dist,
    to_canvas,
};
use crate::svg::{image_size, marker_radius};

#[derive(Debug, Clone, PartialEq)]
pub enum Hit {
    None,
    Object(String),
    ArrowHandle { id: String, handle: Handle },
    ArrowBody(String),
    Zone(String),
}

pub fn hit_test(doc: &Document, pt: CanvasPoint, config: &EditorConfig) -> Hit {
    if let Some(obj) = doc
        .objects
        .iter()
        .rev()
        .find(|o| object_contains(o, pt, config))
    {
        return Hit::Object(obj.id.clone());
    }

    let p = from_canvas(pt);
    let threshold_sq = config.endpoint_threshold * config.endpoint_threshold;
    for arrow in doc.arrows.iter().rev() {
        if dist_sq(p, arrow.from) < threshold_sq {
            return Hit::ArrowHandle {
                id: arrow.id.clone(),
                handle: Handle::From,
            };
        }
        if dist_sq(p, arrow.to) < threshold_sq {
            return Hit::ArrowHandle {
                id: arrow.id.clone(),
                handle: Handle::To,
            };
        }
        if segment_dist(pt, to_canvas(arrow.from), to_canvas(arrow.to)) <= config.arrow_hit_px {
            return Hit::ArrowBody(arrow.id.clone());
        }
    }

    if let Some(zone) = doc.zones.iter().rev().find(|z| zone_contains(z, pt)) {
        return Hit::Zone(zone.id.clone());
    }

    Hit::None
}

fn object_contains(obj: &SceneObject, pt: CanvasPoint, config: &EditorConfig) -> bool {
    let extent = match obj.kind {
        ObjectKind::Player | ObjectKind::Ball => image_size(obj.style.size) / 2.0,
        ObjectKind::Marker => marker_radius(obj.style.size),
    };
    canvas_dist(pt, to_canvas(obj.position)) <= extent + config.object_hit_slop_px
}

fn zone_contains(zone: &Zone, pt: CanvasPoint) -> bool {
    match &zone.shape {
        ZoneShape::Rect {
            x,
            y,
            width,
            height,
        } => {
            let min = to_canvas(Point::new(*x, *y));
            let max = to_canvas(Point::new(x + width, y + height));
            pt.x >= min.x && pt.x <= max.x && pt.y >= min.y && pt.y <= max.y
        }
        ZoneShape::Circle { cx, cy, r } => {
            let center = to_canvas(Point::new(*cx, *cy));
            canvas_dist(pt, center) <= r * CANVAS_WIDTH
        }
        ZoneShape::Triangle { points } => in_triangle(pt, points.map(to_canvas)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Arrow, ArrowStyle, ObjectStyle, SportType, ZoneColor, ZoneStyle};
    use chrono::DateTime;

    fn scene() -> Document {
        let mut doc = Document::new(
            "d",
            "t",
            SportType::Football,
            DateTime::from_timestamp(0, 0).unwrap(),
        );
        doc.zones.push(Zone {
            id: "z".into(),
            shape: ZoneShape::Rect {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 0.5,
            },
            style: ZoneStyle {
                fill: ZoneColor::Red,
                fill_opacity: 0.2,
            },
        });
        doc.arrows.push(Arrow {
            id: "a".into(),
            from: Point::new(0.1, 0.1),
            to: Point::new(0.1, 0.4),
            style: ArrowStyle::default(),
            label: None,
        });
        doc.objects.push(SceneObject {
            id: "p".into(),
            kind: ObjectKind::Player,
            position: Point::new(0.5, 0.2),
            style: ObjectStyle::default(),
        });
        doc
    }

    fn at(x: f64, y: f64) -> CanvasPoint {
        to_canvas(Point::new(x, y))
    }

    #[test]
    fn test_object_beats_zone() {
        let doc = scene();
        let hit = hit_test(&doc, at(0.5, 0.2), &EditorConfig::default());
        assert_eq!(hit, Hit::Object("p".into()));
    }

    #[test]
    fn test_arrow_handles_and_body() {
        let doc = scene();
        let config = EditorConfig::default();
        assert_eq!(
            hit_test(&doc, at(0.105, 0.1), &config),
            Hit::ArrowHandle {
                id: "a".into(),
                handle: Handle::From
            }
        );
        assert_eq!(
            hit_test(&doc, at(0.1, 0.39), &config),
            Hit::ArrowHandle {
                id: "a".into(),
                handle: Handle::To
            }
        );
        assert_eq!(
            hit_test(&doc, at(0.1, 0.25), &config),
            Hit::ArrowBody("a".into())
        );
    }

    #[test]
    fn test_zone_and_empty() {
        let doc = scene();
        let config = EditorConfig::default();
        assert_eq!(hit_test(&doc, at(0.9, 0.45), &config), Hit::Zone("z".into()));
        assert_eq!(hit_test(&doc, at(0.9, 0.9), &config), Hit::None);
    }

    #[test]
    fn test_topmost_object_wins() {
        let mut doc = scene();
        let mut second = doc.objects[0].clone();
        second.id = "p2".into();
        doc.objects.push(second);
        let hit = hit_test(&doc, at(0.5, 0.2), &EditorConfig::default());
        assert_eq!(hit, Hit::Object("p2".into()));
    }

    #[test]
    fn test_circle_zone() {
        let mut doc = scene();
        doc.zones.clear();
        doc.zones.push(Zone {
            id: "c".into(),
            shape: ZoneShape::Circle {
                cx: 0.5,
                cy: 0.8,
                r: 0.1,
            },
            style: ZoneStyle {
                fill: ZoneColor::Blue,
                fill_opacity: 0.2,
            },
        });
        let config = EditorConfig::default();
        // 50 canvas units right of center, inside the 60-unit radius
        assert_eq!(
            hit_test(&doc, CanvasPoint::new(350.0, 800.0), &config),
            Hit::Zone("c".into())
        );
        assert_eq!(hit_test(&doc, CanvasPoint::new(370.0, 800.0), &config), Hit::None);
    }
}
