use crate::dom;
use crate::SelectSlot;
use glam::Vec2;
use ksb_core::{PointerButton, PointerInput, SceneEngine};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub engine: Rc<RefCell<SceneEngine>>,
    pub on_select: SelectSlot,
}

#[inline]
fn client_pos(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

fn notify_select(slot: &SelectSlot, id: &str) {
    // clone out of the slot so the callback may replace it
    let callback = slot.borrow().clone();
    if let Some(f) = callback {
        if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(id)) {
            log::warn!("[pick] select callback threw: {:?}", e);
        }
    }
}

pub fn wire_input(w: InputWiring) {
    // pointerdown
    {
        let engine = w.engine.clone();
        let canvas = w.canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let pos = client_pos(&ev);
            let input = PointerInput::new(ev.pointer_id(), pos.x, pos.y)
                .with_button(PointerButton::from_dom(ev.button()))
                .with_shift(ev.shift_key());
            let mut eng = engine.borrow_mut();
            eng.set_surface_rect(dom::client_rect(&canvas));
            if eng.pointer_down(input) {
                let _ = canvas.set_pointer_capture(ev.pointer_id());
                ev.prevent_default();
            }
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // pointermove
    {
        let engine = w.engine.clone();
        let canvas = w.canvas.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let mut eng = engine.borrow_mut();
            eng.set_surface_rect(dom::client_rect(&canvas));
            eng.pointer_move(ev.pointer_id(), client_pos(&ev));
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // pointerup
    {
        let engine = w.engine.clone();
        let canvas = w.canvas.clone();
        let on_select = w.on_select.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let selected = engine
                .borrow_mut()
                .pointer_up(ev.pointer_id(), client_pos(&ev));
            let _ = canvas.release_pointer_capture(ev.pointer_id());
            if let Some(id) = selected {
                log::info!("[pick] selected {}", id);
                notify_select(&on_select, &id);
            }
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // pointercancel
    {
        let engine = w.engine.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            engine.borrow_mut().pointer_cancel(ev.pointer_id());
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // mouseleave
    {
        let engine = w.engine.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::MouseEvent| {
            engine.borrow_mut().pointer_leave();
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // wheel: non-passive so the page does not scroll under the scene
    {
        let engine = w.engine.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
            ev.prevent_default();
            engine.borrow_mut().wheel(ev.delta_y() as f32);
        }) as Box<dyn FnMut(_)>);
        let opts = web::AddEventListenerOptions::new();
        opts.set_passive(false);
        let _ = w.canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            closure.as_ref().unchecked_ref(),
            &opts,
        );
        closure.forget();
    }

    // contextmenu: right-drag pans
    {
        let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
            ev.prevent_default();
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub fn wire_resize(canvas: web::HtmlCanvasElement, engine: Rc<RefCell<SceneEngine>>) {
    let Some(window) = web::window() else {
        return;
    };
    let closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas);
        dom::sync_engine_surface(&canvas, &mut engine.borrow_mut());
    }) as Box<dyn FnMut()>);
    let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}
