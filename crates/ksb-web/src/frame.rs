use crate::overlay::TooltipElement;
use instant::Instant;
use ksb_core::SceneEngine;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    engine: Rc<RefCell<SceneEngine>>,
    tooltip: TooltipElement,
    started: Instant,
}

impl FrameContext {
    pub fn new(engine: Rc<RefCell<SceneEngine>>, tooltip: TooltipElement) -> Self {
        Self {
            engine,
            tooltip,
            started: Instant::now(),
        }
    }

    pub fn frame(&mut self) {
        let t = self.started.elapsed().as_secs_f32();
        let mut eng = self.engine.borrow_mut();
        // errors are logged and handled inside; the next frame retries
        let _ = eng.frame(t);
        self.tooltip.sync(&mut eng);
    }
}

fn request_frame(w: &web::Window, cb: &Closure<dyn FnMut()>) {
    if let Err(e) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
        log::error!("[frame] requestAnimationFrame failed: {:?}", e);
    }
}

/// Drive `ctx` from requestAnimationFrame for the lifetime of the page.
pub fn start_loop(mut ctx: FrameContext) {
    let Some(window) = web::window() else {
        log::error!("[frame] no window, render loop not started");
        return;
    };
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let w = window.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        ctx.frame();
        if let Some(cb) = tick_clone.borrow().as_ref() {
            request_frame(&w, cb);
        }
    }) as Box<dyn FnMut()>));
    if let Some(cb) = tick.borrow().as_ref() {
        request_frame(&window, cb);
    }
}
