use ksb_core::{Rating, SceneEngine};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

const TOOLTIP_STYLE: &str = "position:fixed;left:0;top:0;pointer-events:none;z-index:9999;\
background:rgba(12,18,28,0.92);color:#e6f0ff;padding:8px 10px;border-radius:8px;\
font-size:13px;line-height:1.3;max-width:320px;box-shadow:0 6px 18px rgba(0,0,0,0.45);\
opacity:0;transition:opacity 120ms ease";

/// DOM mirror of the engine's tooltip. Text is written only when the marker
/// or its rating changes; the measured box size is fed back for placement.
pub struct TooltipElement {
    root: web::HtmlElement,
    header: web::HtmlElement,
    body: web::HtmlElement,
    shown: Option<(String, Option<Rating>)>,
    measured: (f32, f32),
}

fn create_html(document: &web::Document, tag: &str) -> Result<web::HtmlElement, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<web::HtmlElement>()
        .map_err(|_| JsValue::from_str("created element is not an HtmlElement"))
}

impl TooltipElement {
    pub fn create(document: &web::Document) -> Result<Self, JsValue> {
        let root = create_html(document, "div")?;
        root.set_class_name("ksb-tooltip hidden");
        root.set_attribute("style", TOOLTIP_STYLE)?;
        let header = create_html(document, "strong")?;
        let body = create_html(document, "div")?;
        body.set_attribute("style", "font-size:12px;color:#dbe9ff;margin-top:6px")?;
        root.append_child(&header)?;
        root.append_child(&body)?;
        document
            .body()
            .ok_or_else(|| JsValue::from_str("no document body"))?
            .append_child(&root)?;
        Ok(Self {
            root,
            header,
            body,
            shown: None,
            measured: (0.0, 0.0),
        })
    }

    /// Bring the element in line with the engine's tooltip state.
    pub fn sync(&mut self, engine: &mut SceneEngine) {
        let tip = engine.tooltip();
        if !tip.is_visible() {
            if self.shown.take().is_some() {
                let _ = self.root.class_list().add_1("hidden");
                let _ = self.root.style().set_property("opacity", "0");
            }
            return;
        }

        let key = (tip.marker_id().unwrap_or_default().to_string(), tip.rating());
        if self.shown.as_ref() != Some(&key) {
            self.header.set_text_content(Some(tip.header()));
            self.body.set_text_content(Some(tip.body()));
            let _ = self.root.class_list().remove_1("hidden");
            let _ = self.root.style().set_property("opacity", "1");
            self.shown = Some(key);
        }

        let size = (
            self.root.offset_width() as f32,
            self.root.offset_height() as f32,
        );
        if size != self.measured {
            self.measured = size;
            engine.set_tooltip_size(size.0, size.1);
        }
        let pos = engine.tooltip().position();
        let style = self.root.style();
        let _ = style.set_property("left", &format!("{}px", pos.x.round()));
        let _ = style.set_property("top", &format!("{}px", pos.y.round()));
    }
}
