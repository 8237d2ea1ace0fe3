// Ray picking, hover tooltip and click selection.

use glam::{Vec2, Vec3, Vec4};
use ksb_core::picking::{pick_marker, ray_sphere};
use ksb_core::{
    Category, EngineConfig, ItemSpec, PointerButton, PointerInput, Ray, SceneEngine, SurfaceRect,
};
use std::cell::RefCell;
use std::rc::Rc;

const W: f32 = 800.0;
const H: f32 = 600.0;

fn make_items(n: usize) -> Vec<ItemSpec> {
    (0..n)
        .map(|i| {
            let cat = match i % 3 {
                0 => Category::Knowledge,
                1 => Category::Skill,
                _ => Category::Behaviour,
            };
            ItemSpec::new(format!("I{i}"), cat, format!("Item number {i}"))
        })
        .collect()
}

fn make_engine(n: usize) -> SceneEngine {
    let mut engine = SceneEngine::new(&make_items(n), EngineConfig::default());
    engine.resize(W as u32, H as u32);
    engine.set_surface_rect(SurfaceRect::new(0.0, 0.0, W, H));
    engine.set_viewport(W, H);
    engine
}

/// Client coordinates of a world point under the engine's camera.
fn project(engine: &SceneEngine, p: Vec3) -> Vec2 {
    let clip = engine.camera().camera().view_proj() * Vec4::new(p.x, p.y, p.z, 1.0);
    let ndc = clip.truncate() / clip.w;
    Vec2::new((ndc.x + 1.0) * 0.5 * W, (1.0 - ndc.y) * 0.5 * H)
}

/// The marker closest to the eye; nothing can occlude its center.
fn nearest_marker(engine: &SceneEngine) -> (String, Vec3) {
    let eye = engine.camera().camera().eye;
    let m = engine
        .scene()
        .markers()
        .iter()
        .min_by(|a, b| {
            a.current
                .position
                .distance(eye)
                .total_cmp(&b.current.position.distance(eye))
        })
        .unwrap();
    (m.id.clone(), m.current.position)
}

#[test]
fn ray_sphere_hit_miss_and_behind() {
    let t = ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 5.0), 1.0).unwrap();
    assert!((t - 4.0).abs() < 1e-5);
    assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(3.0, 0.0, 5.0), 1.0).is_none());
    assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -5.0), 1.0).is_none());
}

#[test]
fn nearest_hit_wins() {
    let engine = make_engine(1);
    let mut near = engine.scene().markers()[0].clone();
    let mut far = near.clone();
    near.id = "near".into();
    near.current.position = Vec3::new(0.0, 0.0, 2.0);
    far.id = "far".into();
    far.current.position = Vec3::new(0.0, 0.0, 6.0);
    let ray = Ray {
        origin: Vec3::ZERO,
        direction: Vec3::Z,
    };
    let markers = vec![far, near];
    let (i, t) = pick_marker(&ray, &markers).unwrap();
    assert_eq!(markers[i].id, "near");
    assert!(t < 2.0);
}

#[test]
fn hover_shows_tooltip_for_marker_under_pointer() {
    let mut engine = make_engine(12);
    let (id, pos) = nearest_marker(&engine);
    let screen = project(&engine, pos);
    assert_eq!(engine.hover(screen), Some(id.as_str()));

    let tip = engine.tooltip();
    assert!(tip.is_visible());
    assert_eq!(tip.marker_id(), Some(id.as_str()));
    assert_eq!(tip.header(), format!("{id} — Item number {}", &id[1..]));
    assert_eq!(tip.body(), "Confidence: n/a");

    engine.set_rating(&id, 4_i32);
    assert_eq!(engine.tooltip().body(), "Confidence: 4");

    engine.pointer_leave();
    assert!(!engine.tooltip().is_visible());
}

#[test]
fn hover_miss_hides_tooltip() {
    // a single marker sits at +x; the left edge of the view looks away from it
    let mut engine = make_engine(1);
    let (_, pos) = nearest_marker(&engine);
    assert!(engine.hover(project(&engine, pos)).is_some());
    assert!(engine.hover(Vec2::new(1.0, H * 0.5)).is_none());
    assert!(!engine.tooltip().is_visible());
}

#[test]
fn click_selects_and_drag_does_not() {
    let mut engine = make_engine(12);
    let selected = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = selected.clone();
    engine.set_on_select(Box::new(move |id: &str| sink.borrow_mut().push(id.to_string())));

    let (id, pos) = nearest_marker(&engine);
    let screen = project(&engine, pos);

    assert!(engine.pointer_down(PointerInput::new(1, screen.x, screen.y)));
    engine.pointer_move(1, screen + Vec2::new(1.0, 1.0));
    assert_eq!(engine.pointer_up(1, screen), Some(id.clone()));
    assert_eq!(selected.borrow().as_slice(), &[id.clone()]);

    // a real drag rotates the camera and selects nothing
    engine.reset_camera();
    assert!(engine.pointer_down(PointerInput::new(2, screen.x, screen.y)));
    engine.pointer_move(2, screen + Vec2::new(60.0, 0.0));
    engine.pointer_move(2, screen);
    assert_eq!(engine.pointer_up(2, screen), None);
    assert_eq!(selected.borrow().len(), 1);
}

#[test]
fn pointer_down_hides_tooltip_and_suppresses_hover() {
    let mut engine = make_engine(12);
    let (_, pos) = nearest_marker(&engine);
    let screen = project(&engine, pos);
    engine.hover(screen);
    assert!(engine.tooltip().is_visible());

    let press = PointerInput::new(5, 10.0, 10.0).with_button(PointerButton::Secondary);
    assert!(engine.pointer_down(press));
    assert!(!engine.tooltip().is_visible());
    // moves during the session pan instead of picking
    engine.pointer_move(5, Vec2::new(12.0, 10.0));
    assert!(!engine.tooltip().is_visible());
    assert!(engine.camera().pan_velocity().length() > 0.0);

    // a second pointer cannot start its own session
    assert!(!engine.pointer_down(PointerInput::new(6, screen.x, screen.y)));
    engine.pointer_cancel(5);
    assert!(!engine.camera().is_dragging());
}

#[test]
fn tooltip_is_clamped_to_viewport() {
    let mut engine = make_engine(12);
    let (_, pos) = nearest_marker(&engine);
    let screen = project(&engine, pos);
    engine.hover(screen);
    engine.set_tooltip_size(2000.0, 40.0);
    let p = engine.tooltip().position();
    assert_eq!(p.x, 0.0);
    assert!(p.y >= 0.0 && p.y + 40.0 <= H);
}
