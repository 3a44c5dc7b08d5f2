use crate::assets::{background_url, marker_set, resolve_href};
use crate::document::{
    Arrow, DEFAULT_COLOR, Document, LinePattern, ObjectKind, ObjectSize, SceneObject, Zone,
    ZoneShape,
};
use crate::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH, to_canvas};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const ARROW_STROKE_WIDTH: f64 = 4.0;
const ARROW_LABEL_LIFT: f64 = 10.0;
const LABEL_GAP: f64 = 10.0;
const MARKER_STROKE_WIDTH: f64 = 3.0;
const ZONE_STROKE_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Prefix for site-relative image references, e.g. `https://app.lekbanken.se`.
    pub base_url: Option<String>,
}

/// Side length of raster player/ball markers.
pub fn image_size(size: ObjectSize) -> f64 {
    match size {
        ObjectSize::Sm => 36.0,
        ObjectSize::Md => 48.0,
        ObjectSize::Lg => 64.0,
    }
}

/// Radius of vector marker crosses.
pub fn marker_radius(size: ObjectSize) -> f64 {
    match size {
        ObjectSize::Sm => 14.0,
        ObjectSize::Md => 20.0,
        ObjectSize::Lg => 26.0,
    }
}

/// Renders `doc` to its canonical SVG markup.
pub fn render(doc: &Document, options: &RenderOptions) -> String {
    SvgRenderer::new(options.clone()).render(doc)
}

#[derive(Default)]
pub struct SvgRenderer {
    options: RenderOptions,
}

impl SvgRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, doc: &Document) -> String {
        let mut svg = String::new();

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-diagram-id="{}" data-schema-version="{}" data-sport-type="{}">"#,
            escape_xml(&doc.id),
            doc.schema_version,
            doc.sport_type.as_str(),
            w = num(CANVAS_WIDTH),
            h = num(CANVAS_HEIGHT),
        )
        .unwrap();
        writeln!(&mut svg, "<title>{}</title>", escape_xml(&doc.title)).unwrap();

        let head_colors = arrowhead_colors(&doc.arrows);
        self.render_defs(&mut svg, &head_colors);

        // Court background
        if let Some(src) = background_url(doc.sport_type) {
            let href = resolve_href(self.options.base_url.as_deref(), src);
            writeln!(
                &mut svg,
                r#"<image data-layer="background" href="{}" x="0" y="0" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" />"#,
                escape_xml(&href),
                num(CANVAS_WIDTH),
                num(CANVAS_HEIGHT)
            )
            .unwrap();
        }

        writeln!(&mut svg, r#"<g data-layer="zones">"#).unwrap();
        for zone in &doc.zones {
            render_zone(&mut svg, zone);
        }
        writeln!(&mut svg, "</g>").unwrap();

        writeln!(&mut svg, r#"<g data-layer="arrows">"#).unwrap();
        for arrow in &doc.arrows {
            render_arrow(&mut svg, arrow, &head_colors);
        }
        writeln!(&mut svg, "</g>").unwrap();

        writeln!(&mut svg, r#"<g data-layer="objects">"#).unwrap();
        for obj in &doc.objects {
            self.render_object(&mut svg, obj, doc);
        }
        writeln!(&mut svg, "</g>").unwrap();

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_defs(&self, svg: &mut String, head_colors: &[&str]) {
        writeln!(svg, "<defs>").unwrap();
        write_arrowhead(svg, "arrowhead", DEFAULT_COLOR);
        for (i, color) in head_colors.iter().enumerate() {
            write_arrowhead(svg, &format!("arrowhead-{}", i + 1), color);
        }
        writeln!(svg, "</defs>").unwrap();
    }

    fn render_object(&self, svg: &mut String, obj: &SceneObject, doc: &Document) {
        let pos = to_canvas(obj.position);
        let color = escape_xml(&obj.style.color);
        writeln!(
            svg,
            r#"<g data-object-id="{}" data-object-type="{}" transform="translate({} {})" color="{}">"#,
            escape_xml(&obj.id),
            obj.kind.as_str(),
            num(pos.x),
            num(pos.y),
            color
        )
        .unwrap();

        let markers = marker_set(doc.sport_type);
        let half = match obj.kind {
            ObjectKind::Player | ObjectKind::Ball => {
                let src = if obj.kind == ObjectKind::Ball {
                    markers.ball
                } else {
                    markers.player
                };
                let href = resolve_href(self.options.base_url.as_deref(), src);
                let size = image_size(obj.style.size);
                writeln!(
                    svg,
                    r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" />"#,
                    escape_xml(&href),
                    num(-size / 2.0),
                    num(-size / 2.0),
                    num(size),
                    num(size)
                )
                .unwrap();
                size / 2.0
            }
            ObjectKind::Marker => {
                let r = marker_radius(obj.style.size);
                let arm = r * 0.9;
                writeln!(
                    svg,
                    r#"<circle cx="0" cy="0" r="{}" fill="{}" fill-opacity="0.12" />"#,
                    num(arm),
                    color
                )
                .unwrap();
                for (x1, y1, x2, y2) in [(-arm, -arm, arm, arm), (-arm, arm, arm, -arm)] {
                    writeln!(
                        svg,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round" />"#,
                        num(x1),
                        num(y1),
                        num(x2),
                        num(y2),
                        color,
                        num(MARKER_STROKE_WIDTH)
                    )
                    .unwrap();
                }
                r
            }
        };

        // Balls never carry labels
        if obj.kind != ObjectKind::Ball {
            if let Some(label) = visible_label(obj.style.label.as_deref()) {
                let short = label.chars().count() <= 2;
                let (y, font_size) = if short {
                    (5.0, 16.0)
                } else {
                    let size = if obj.style.size == ObjectSize::Lg { 16.0 } else { 14.0 };
                    (-half - LABEL_GAP, size)
                };
                write_outlined_text(svg, 0.0, y, font_size, label, &obj.style.color);
            }
        }

        writeln!(svg, "</g>").unwrap();
    }
}

fn render_zone(svg: &mut String, zone: &Zone) {
    writeln!(
        svg,
        r#"<g data-zone-id="{}" data-zone-shape="{}">"#,
        escape_xml(&zone.id),
        zone.shape.kind_str()
    )
    .unwrap();

    let hex = zone.style.fill.hex();
    let paint = format!(
        r#"fill="{hex}" fill-opacity="{}" stroke="{hex}" stroke-opacity="{}" stroke-width="2""#,
        num(zone.style.fill_opacity),
        num(ZONE_STROKE_OPACITY)
    );

    match &zone.shape {
        ZoneShape::Rect {
            x,
            y,
            width,
            height,
        } => {
            writeln!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" {} />"#,
                num(x * CANVAS_WIDTH),
                num(y * CANVAS_HEIGHT),
                num(width * CANVAS_WIDTH),
                num(height * CANVAS_HEIGHT),
                paint
            )
            .unwrap();
        }
        ZoneShape::Circle { cx, cy, r } => {
            // Radius is relative to canvas width
            writeln!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{}" {} />"#,
                num(cx * CANVAS_WIDTH),
                num(cy * CANVAS_HEIGHT),
                num(r * CANVAS_WIDTH),
                paint
            )
            .unwrap();
        }
        ZoneShape::Triangle { points } => {
            let pts: Vec<String> = points
                .iter()
                .map(|p| {
                    let c = to_canvas(*p);
                    format!("{},{}", num(c.x), num(c.y))
                })
                .collect();
            writeln!(
                svg,
                r#"<polygon points="{}" {} />"#,
                pts.join(" "),
                paint
            )
            .unwrap();
        }
    }

    writeln!(svg, "</g>").unwrap();
}

fn render_arrow(svg: &mut String, arrow: &Arrow, head_colors: &[&str]) {
    let from = to_canvas(arrow.from);
    let to = to_canvas(arrow.to);
    let color = escape_xml(&arrow.style.color);

    writeln!(
        svg,
        r#"<g data-arrow-id="{}" color="{}">"#,
        escape_xml(&arrow.id),
        color
    )
    .unwrap();

    let mut line = format!(
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round""#,
        num(from.x),
        num(from.y),
        num(to.x),
        num(to.y),
        color,
        num(ARROW_STROKE_WIDTH)
    );
    if arrow.style.pattern == LinePattern::Dashed {
        line.push_str(r#" stroke-dasharray="8 6""#);
    }
    if arrow.style.arrowhead {
        write!(
            &mut line,
            r#" marker-end="url(#{})""#,
            arrowhead_id(&arrow.style.color, head_colors)
        )
        .unwrap();
    }
    line.push_str(" />");
    writeln!(svg, "{}", line).unwrap();

    if let Some(label) = visible_label(arrow.label.as_deref()) {
        let x = (from.x + to.x) / 2.0;
        let y = (from.y + to.y) / 2.0 - ARROW_LABEL_LIFT;
        write_outlined_text(svg, x, y, 14.0, label, &arrow.style.color);
    }

    writeln!(svg, "</g>").unwrap();
}

/// Two-pass text: a white halo underneath, then the fill, so labels stay
/// legible over any court.
fn write_outlined_text(svg: &mut String, x: f64, y: f64, font_size: f64, text: &str, color: &str) {
    let text = escape_xml(text);
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="{}" text-anchor="middle" fill="none" stroke="white" stroke-width="4" stroke-linejoin="round" stroke-opacity="0.9">{}</text>"#,
        num(x),
        num(y),
        num(font_size),
        text
    )
    .unwrap();
    writeln!(
        svg,
        r#"<text x="{}" y="{}" font-size="{}" text-anchor="middle" fill="{}" fill-opacity="0.9">{}</text>"#,
        num(x),
        num(y),
        num(font_size),
        escape_xml(color),
        text
    )
    .unwrap();
}

fn write_arrowhead(svg: &mut String, id: &str, color: &str) {
    writeln!(
        svg,
        r#"<marker id="{}" markerWidth="10" markerHeight="10" refX="8" refY="3" orient="auto">"#,
        id
    )
    .unwrap();
    writeln!(
        svg,
        r#"<path d="M0,0 L0,6 L9,3 z" fill="{}" />"#,
        escape_xml(color)
    )
    .unwrap();
    writeln!(svg, "</marker>").unwrap();
}

/// Distinct non-default arrowhead colors in order of first use. Marker
/// contents inherit paint from the `<defs>`, not from the line, so each
/// color needs its own marker.
fn arrowhead_colors(arrows: &[Arrow]) -> Vec<&str> {
    let mut colors: Vec<&str> = Vec::new();
    for arrow in arrows.iter().filter(|a| a.style.arrowhead) {
        let color = arrow.style.color.as_str();
        if color != DEFAULT_COLOR && !colors.contains(&color) {
            colors.push(color);
        }
    }
    colors
}

fn arrowhead_id(color: &str, head_colors: &[&str]) -> String {
    match head_colors.iter().position(|c| *c == color) {
        Some(i) => format!("arrowhead-{}", i + 1),
        None => "arrowhead".to_string(),
    }
}

fn visible_label(label: Option<&str>) -> Option<&str> {
    label.map(str::trim).filter(|l| !l.is_empty())
}

/// Fixed-precision number: at most 4 decimals, no trailing zeros, no `-0`.
fn num(n: f64) -> String {
    let rounded = (n * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 || !rounded.is_finite() {
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// XML 1.0 valid char ranges:
/// - 0x09, 0x0A, 0x0D
/// - 0x20..=0xD7FF
/// - 0xE000..=0xFFFD
/// - 0x10000..=0x10FFFF
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
