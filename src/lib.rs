pub mod assets;
pub mod clock;
pub mod config;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod schema;
pub mod store;
pub mod svg;

use wasm_bindgen::prelude::*;

use clock::{Clock, SystemClock};
use config::EditorConfig;
use document::{Document, LinePattern, ObjectKind, ObjectSize, SportType, ZoneColor, new_id};
use editor::{Editor, EditorMode, Effect, Handle, PointerEvent, Selection};
use geometry::Viewport;
use svg::RenderOptions;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Validate a diagram JSON payload and render it to SVG
#[wasm_bindgen(js_name = "diagramToSvg")]
pub fn diagram_to_svg(json: &str, base_url: Option<String>) -> Result<String, String> {
    let doc = schema::validate(json).map_err(|e| e.to_string())?;
    Ok(svg::render(&doc, &RenderOptions { base_url }))
}

/// Validate a diagram JSON payload, returning its canonical JSON form
#[wasm_bindgen(js_name = "validateDiagram")]
pub fn validate_diagram(json: &str) -> Result<String, String> {
    let doc = schema::validate(json).map_err(|e| e.to_string())?;
    schema::to_json(&doc).map_err(|e| e.to_string())
}

/// Create an empty diagram for a sport
#[wasm_bindgen(js_name = "newDiagram")]
pub fn new_diagram(title: &str, sport_type: &str) -> Result<String, String> {
    let sport = parse_sport(sport_type)?;
    let title: String = title.chars().take(document::MAX_TITLE_CHARS).collect();
    let doc = Document::new(new_id(), title, sport, SystemClock.now());
    schema::to_json(&doc).map_err(|e| e.to_string())
}

fn parse_sport(s: &str) -> Result<SportType, String> {
    SportType::from_str(s).ok_or_else(|| format!("Unknown sport type: {}", s))
}

fn effect_names(effects: &[Effect]) -> Vec<&'static str> {
    effects.iter().map(|e| e.name()).collect()
}

fn effects_array(effects: &[Effect]) -> js_sys::Array {
    effect_names(effects)
        .into_iter()
        .map(JsValue::from_str)
        .collect()
}

fn selection_json(selection: &Selection) -> String {
    let value = match selection {
        Selection::None => serde_json::json!({ "kind": "none" }),
        Selection::Object { id } => serde_json::json!({ "kind": "object", "id": id }),
        Selection::Arrow { id, handle } => serde_json::json!({
            "kind": "arrow",
            "id": id,
            "handle": handle.map(|h| match h {
                Handle::From => "from",
                Handle::To => "to",
            }),
        }),
        Selection::Zone { id } => serde_json::json!({ "kind": "zone", "id": id }),
    };
    value.to_string()
}

/// Browser-facing editing session over one diagram
#[wasm_bindgen]
pub struct DiagramEditor {
    inner: Editor,
    options: RenderOptions,
}

impl DiagramEditor {
    fn event(
        pointer_id: i32,
        client_x: f64,
        client_y: f64,
        viewport: Viewport,
    ) -> Option<PointerEvent> {
        let point = viewport.to_canvas(client_x, client_y);
        if point.is_none() {
            tracing::debug!(pointer = pointer_id, "pointer event on collapsed viewport ignored");
        }
        point.map(|p| PointerEvent::new(pointer_id, p))
    }
}

#[wasm_bindgen]
impl DiagramEditor {
    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(json: &str, base_url: Option<String>) -> Result<DiagramEditor, String> {
        let doc = schema::validate(json).map_err(|e| e.to_string())?;
        Ok(Self {
            inner: Editor::new(doc, EditorConfig::default()),
            options: RenderOptions { base_url },
        })
    }

    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(
        &mut self,
        pointer_id: i32,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> js_sys::Array {
        let viewport = Viewport {
            left,
            top,
            width,
            height,
        };
        let effects = Self::event(pointer_id, client_x, client_y, viewport)
            .map(|ev| self.inner.pointer_down(ev))
            .unwrap_or_default();
        effects_array(&effects)
    }

    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(
        &mut self,
        pointer_id: i32,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> js_sys::Array {
        let viewport = Viewport {
            left,
            top,
            width,
            height,
        };
        let effects = Self::event(pointer_id, client_x, client_y, viewport)
            .map(|ev| self.inner.pointer_move(ev))
            .unwrap_or_default();
        effects_array(&effects)
    }

    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(
        &mut self,
        pointer_id: i32,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> js_sys::Array {
        let viewport = Viewport {
            left,
            top,
            width,
            height,
        };
        let effects = Self::event(pointer_id, client_x, client_y, viewport)
            .map(|ev| self.inner.pointer_up(ev))
            .unwrap_or_default();
        effects_array(&effects)
    }

    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = "pointerCancel")]
    pub fn pointer_cancel(
        &mut self,
        pointer_id: i32,
        client_x: f64,
        client_y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> js_sys::Array {
        let viewport = Viewport {
            left,
            top,
            width,
            height,
        };
        let effects = Self::event(pointer_id, client_x, client_y, viewport)
            .map(|ev| self.inner.pointer_cancel(ev))
            .unwrap_or_default();
        effects_array(&effects)
    }

    #[wasm_bindgen(js_name = "setMode")]
    pub fn set_mode(&mut self, mode: &str) -> Result<js_sys::Array, String> {
        let mode = EditorMode::from_str(mode).ok_or_else(|| format!("Unknown mode: {}", mode))?;
        Ok(effects_array(&self.inner.set_mode(mode)))
    }

    pub fn mode(&self) -> String {
        self.inner.mode().as_str().to_string()
    }

    /// Selection as JSON: `{"kind": "none" | "object" | "arrow" | "zone", "id"?, "handle"?}`
    pub fn selection(&self) -> String {
        selection_json(self.inner.selection())
    }

    #[wasm_bindgen(js_name = "pendingStart")]
    pub fn pending_start(&self) -> Option<Vec<f64>> {
        self.inner.pending_start().map(|p| vec![p.x, p.y])
    }

    #[wasm_bindgen(js_name = "addObject")]
    pub fn add_object(&mut self, kind: &str) -> Result<String, String> {
        let kind = ObjectKind::from_str(kind).ok_or_else(|| format!("Unknown object type: {}", kind))?;
        Ok(self.inner.add_object(kind))
    }

    #[wasm_bindgen(js_name = "removeSelected")]
    pub fn remove_selected(&mut self) -> bool {
        self.inner.remove_selected()
    }

    #[wasm_bindgen(js_name = "duplicateSelected")]
    pub fn duplicate_selected(&mut self) -> Option<String> {
        self.inner.duplicate_selected()
    }

    #[wasm_bindgen(js_name = "setObjectLabel")]
    pub fn set_object_label(&mut self, label: &str) -> bool {
        self.inner.set_object_label(label)
    }

    #[wasm_bindgen(js_name = "setObjectSize")]
    pub fn set_object_size(&mut self, size: &str) -> Result<bool, String> {
        let size = ObjectSize::from_str(size).ok_or_else(|| format!("Unknown size: {}", size))?;
        Ok(self.inner.set_object_size(size))
    }

    #[wasm_bindgen(js_name = "setObjectColor")]
    pub fn set_object_color(&mut self, color: &str) -> bool {
        self.inner.set_object_color(color)
    }

    #[wasm_bindgen(js_name = "setArrowPattern")]
    pub fn set_arrow_pattern(&mut self, pattern: &str) -> Result<bool, String> {
        let pattern =
            LinePattern::from_str(pattern).ok_or_else(|| format!("Unknown pattern: {}", pattern))?;
        Ok(self.inner.set_arrow_pattern(pattern))
    }

    #[wasm_bindgen(js_name = "setArrowHead")]
    pub fn set_arrow_head(&mut self, arrowhead: bool) -> bool {
        self.inner.set_arrow_head(arrowhead)
    }

    #[wasm_bindgen(js_name = "setArrowLabel")]
    pub fn set_arrow_label(&mut self, label: &str) -> bool {
        self.inner.set_arrow_label(label)
    }

    #[wasm_bindgen(js_name = "setArrowColor")]
    pub fn set_arrow_color(&mut self, color: &str) -> bool {
        self.inner.set_arrow_color(color)
    }

    #[wasm_bindgen(js_name = "setZoneColor")]
    pub fn set_zone_color(&mut self, color: &str) -> Result<bool, String> {
        let color =
            ZoneColor::from_str(color).ok_or_else(|| format!("Unknown zone color: {}", color))?;
        Ok(self.inner.set_zone_color(color))
    }

    #[wasm_bindgen(js_name = "setZoneOpacity")]
    pub fn set_zone_opacity(&mut self, opacity: f64) -> bool {
        self.inner.set_zone_opacity(opacity)
    }

    #[wasm_bindgen(js_name = "setTitle")]
    pub fn set_title(&mut self, title: &str) {
        self.inner.set_title(title);
    }

    #[wasm_bindgen(js_name = "setSportType")]
    pub fn set_sport_type(&mut self, sport_type: &str) -> Result<(), String> {
        self.inner.set_sport_type(parse_sport(sport_type)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = "setFieldTemplateId")]
    pub fn set_field_template_id(&mut self, template: &str) {
        self.inner.set_field_template_id(template);
    }

    pub fn svg(&self) -> String {
        self.inner.preview_svg(&self.options)
    }

    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, String> {
        schema::to_json(self.inner.document()).map_err(|e| e.to_string())
    }
}
