use crate::document::Point;

pub const CANVAS_WIDTH: f64 = 600.0;
pub const CANVAS_HEIGHT: f64 = 1000.0;
pub const SNAP_STEP: f64 = 0.02;

/// A point in canvas (viewBox) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub fn clamp01(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

pub fn clamp_point(p: Point) -> Point {
    Point::new(clamp01(p.x), clamp01(p.y))
}

/// Rounds to the nearest multiple of `step`, then clamps to [0,1].
pub fn snap(v: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return clamp01(v);
    }
    // Rounding through the step count keeps 0.14 as 0.14 instead of 0.14000000000000001.
    let steps = (v / step).round();
    let decimals = step_decimals(step);
    let snapped = round_to(steps * step, decimals);
    clamp01(snapped)
}

pub fn snap_point(p: Point, step: f64) -> Point {
    Point::new(snap(p.x, step), snap(p.y, step))
}

fn step_decimals(step: f64) -> i32 {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 10 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

pub fn to_canvas(p: Point) -> CanvasPoint {
    CanvasPoint::new(p.x * CANVAS_WIDTH, p.y * CANVAS_HEIGHT)
}

pub fn from_canvas(p: CanvasPoint) -> Point {
    Point::new(p.x / CANVAS_WIDTH, p.y / CANVAS_HEIGHT)
}

/// Squared distance in normalized space.
pub fn dist_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

pub fn canvas_dist(a: CanvasPoint, b: CanvasPoint) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Distance from `p` to the segment `a`-`b`, in canvas units.
pub fn segment_dist(p: CanvasPoint, a: CanvasPoint, b: CanvasPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return canvas_dist(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    canvas_dist(p, CanvasPoint::new(a.x + t * dx, a.y + t * dy))
}

/// Point-in-triangle test using edge sign agreement.
pub fn in_triangle(p: CanvasPoint, tri: [CanvasPoint; 3]) -> bool {
    fn sign(p: CanvasPoint, a: CanvasPoint, b: CanvasPoint) -> f64 {
        (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y)
    }
    let d1 = sign(p, tri[0], tri[1]);
    let d2 = sign(p, tri[1], tri[2]);
    let d3 = sign(p, tri[2], tri[0]);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Screen rectangle of the on-screen SVG element, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Maps a client coordinate to canvas units. Returns `None` while the
    /// element has no area (hidden or not laid out yet).
    pub fn to_canvas(&self, client_x: f64, client_y: f64) -> Option<CanvasPoint> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let nx = (client_x - self.left) / self.width;
        let ny = (client_y - self.top) / self.height;
        Some(CanvasPoint::new(nx * CANVAS_WIDTH, ny * CANVAS_HEIGHT))
    }
}
