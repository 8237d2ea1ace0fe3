#![cfg(target_arch = "wasm32")]
use ksb_core::SceneEngine;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod dom;
mod events;
mod frame;
mod loader;
mod options;
mod overlay;

/// Callback slot for marker selection. Invoked outside any engine borrow so
/// the page may call back into the scene from it.
pub(crate) type SelectSlot = Rc<RefCell<Option<js_sys::Function>>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("ksb-web starting");
    Ok(())
}

/// The 3D rating scene bound to one canvas.
///
/// Ratings flow in through `updateShape` / `updateAll` / `syncFrom`; clicks on
/// markers flow out through the callback given to `setOnSelect`.
#[wasm_bindgen]
pub struct KsbScene {
    engine: Rc<RefCell<SceneEngine>>,
    canvas: web::HtmlCanvasElement,
    on_select: SelectSlot,
}

#[wasm_bindgen]
impl KsbScene {
    /// `items` is an array of `{ id, type, title }`; `options` may carry
    /// `figureUrl`, `minRadius`, `maxRadius` and `seed`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, items: JsValue, options: JsValue) -> Result<KsbScene, JsValue> {
        let document =
            dom::window_document().ok_or_else(|| JsValue::from_str("no window document"))?;
        let canvas: web::HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{canvas_id}")))?
            .dyn_into::<web::HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;

        let items = options::read_items(&items);
        let config = options::read_config(&options);
        log::info!("[scene] {} items, figure {:?}", items.len(), config.figure_url);

        let engine = Rc::new(RefCell::new(SceneEngine::new(&items, config)));
        engine
            .borrow_mut()
            .set_asset_loader(Box::new(loader::FetchLoader));
        dom::sync_canvas_backing_size(&canvas);
        dom::sync_engine_surface(&canvas, &mut engine.borrow_mut());

        let tooltip = overlay::TooltipElement::create(&document)?;
        let on_select: SelectSlot = Rc::new(RefCell::new(None));
        events::wire_input(events::InputWiring {
            canvas: canvas.clone(),
            engine: engine.clone(),
            on_select: on_select.clone(),
        });
        events::wire_resize(canvas.clone(), engine.clone());
        frame::start_loop(frame::FrameContext::new(engine.clone(), tooltip));

        let engine_gpu = engine.clone();
        let canvas_gpu = canvas.clone();
        spawn_local(async move {
            match init_gpu(&canvas_gpu).await {
                Ok(renderer) => {
                    let mut eng = engine_gpu.borrow_mut();
                    eng.set_backend(Box::new(renderer));
                    dom::sync_engine_surface(&canvas_gpu, &mut eng);
                }
                Err(e) => log::warn!("[gpu] WebGPU unavailable, drawing disabled: {:?}", e),
            }
        });

        Ok(KsbScene {
            engine,
            canvas,
            on_select,
        })
    }

    /// Apply one rating; unknown ids are ignored. Returns whether the id was known.
    #[wasm_bindgen(js_name = updateShape)]
    pub fn update_shape(&self, id: &str, rating: JsValue) -> bool {
        self.engine
            .borrow_mut()
            .set_rating(id, options::scalar_rating(&rating))
    }

    /// Apply a map `id -> rating` or `id -> { rating, comment }`.
    #[wasm_bindgen(js_name = updateAll)]
    pub fn update_all(&self, ratings: JsValue) -> u32 {
        let entries = options::read_rating_map(&ratings);
        self.engine.borrow_mut().set_all_ratings(entries) as u32
    }

    /// Pull every rating from a store exposing `getAllRatings()` and
    /// `getRating(id)`.
    #[wasm_bindgen(js_name = syncFrom)]
    pub fn sync_from(&self, store: JsValue) -> u32 {
        let source = options::JsRatingStore::new(store);
        self.engine.borrow_mut().sync_from(&source) as u32
    }

    /// Replace the item set; the scene is rebuilt and pending figure loads
    /// are dropped.
    #[wasm_bindgen(js_name = setItems)]
    pub fn set_items(&self, items: JsValue) {
        let items = options::read_items(&items);
        self.engine.borrow_mut().rebuild(&items);
    }

    pub fn resize(&self) {
        dom::sync_canvas_backing_size(&self.canvas);
        dom::sync_engine_surface(&self.canvas, &mut self.engine.borrow_mut());
    }

    #[wasm_bindgen(js_name = setOnSelect)]
    pub fn set_on_select(&self, callback: Option<js_sys::Function>) {
        *self.on_select.borrow_mut() = callback;
    }

    #[wasm_bindgen(js_name = resetCamera)]
    pub fn reset_camera(&self) {
        self.engine.borrow_mut().reset_camera();
    }

    /// Id of the marker currently under the pointer, if any.
    #[wasm_bindgen(js_name = hoveredId)]
    pub fn hovered_id(&self) -> Option<String> {
        self.engine.borrow().hovered_id().map(str::to_string)
    }
}

async fn init_gpu(canvas: &web::HtmlCanvasElement) -> anyhow::Result<ksb_render::SceneRenderer> {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let gpu =
        ksb_render::GpuContext::new(&instance, surface, canvas.width(), canvas.height()).await?;
    Ok(ksb_render::SceneRenderer::new(gpu))
}
