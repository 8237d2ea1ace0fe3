// Frame loop, resize and rating plumbing through the engine context.

use glam::{Vec2, Vec3};
use ksb_core::{
    Category, DragMode, EngineConfig, FrameView, ItemSpec, PointerInput, RatingSource, RawRating,
    RenderBackend, RenderError, SceneEngine,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Recording {
    draw_counts: Vec<usize>,
    resizes: Vec<(u32, u32)>,
    fail_next: Option<RenderError>,
}

/// Backend that records what it was asked to do.
struct RecordingBackend {
    log: Rc<RefCell<Recording>>,
    size: (u32, u32),
}

impl RenderBackend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.log.borrow_mut().resizes.push((width, height));
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let mut log = self.log.borrow_mut();
        if let Some(err) = log.fail_next.take() {
            return Err(err);
        }
        for d in frame.draws {
            assert!(frame.meshes.get(d.mesh).is_some(), "draw references unknown mesh");
        }
        log.draw_counts.push(frame.draws.len());
        Ok(())
    }
}

struct Store(Vec<(String, RawRating)>);

impl RatingSource for Store {
    fn rating(&self, id: &str) -> RawRating {
        self.0
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, r)| r.clone())
            .unwrap_or(RawRating::Missing)
    }

    fn all_ratings(&self) -> Vec<(String, RawRating)> {
        self.0.clone()
    }
}

fn make_items() -> Vec<ItemSpec> {
    vec![
        ItemSpec::new("K1", Category::Knowledge, "Coaching models"),
        ItemSpec::new("K2", Category::Knowledge, "Ethics"),
        ItemSpec::new("S1", Category::Skill, "Questioning"),
        ItemSpec::new("B1", Category::Behaviour, "Curiosity"),
    ]
}

fn make_engine() -> (SceneEngine, Rc<RefCell<Recording>>) {
    let log = Rc::new(RefCell::new(Recording::default()));
    let mut engine = SceneEngine::new(&make_items(), EngineConfig::default());
    engine.set_backend(Box::new(RecordingBackend {
        log: log.clone(),
        size: (800, 400),
    }));
    (engine, log)
}

#[test]
fn default_backend_is_a_stub() {
    let mut engine = SceneEngine::new(&make_items(), EngineConfig::default());
    assert!(engine.backend().is_stub());
    engine.resize(640, 480);
    assert_eq!(engine.backend().size(), (640, 480));
    assert!(engine.frame(0.0).is_ok());
}

#[test]
fn frame_draws_ground_figure_and_markers() {
    let (mut engine, log) = make_engine();
    engine.frame(0.0).unwrap();
    engine.frame(0.016).unwrap();
    let figure_parts = engine.scene().figure().unwrap().parts.len();
    let expected = 1 + figure_parts + make_items().len();
    assert_eq!(log.borrow().draw_counts, vec![expected, expected]);
    assert_eq!(engine.last_draws().len(), expected);
}

#[test]
fn resize_keeps_camera_pose() {
    let (mut engine, log) = make_engine();
    engine.resize(800, 400);
    engine.pointer_down(PointerInput::new(1, 100.0, 100.0));
    engine.pointer_move(1, Vec2::new(160.0, 120.0));
    engine.pointer_up(1, Vec2::new(160.0, 120.0));
    for i in 0..10 {
        engine.frame(i as f32 / 60.0).unwrap();
    }

    let cam = engine.camera();
    let (azimuth, polar, radius, target) = (cam.azimuth(), cam.polar(), cam.radius(), cam.target());
    engine.resize(1200, 600);
    let cam = engine.camera();
    assert_eq!(cam.camera().aspect, 2.0);
    assert_eq!(engine.backend().size(), (1200, 600));
    assert_eq!(log.borrow().resizes.last(), Some(&(1200, 600)));
    assert_eq!(cam.azimuth(), azimuth);
    assert_eq!(cam.polar(), polar);
    assert_eq!(cam.radius(), radius);
    assert_eq!(cam.target(), target);
}

#[test]
fn zero_height_resize_keeps_aspect() {
    let (mut engine, _) = make_engine();
    engine.resize(800, 400);
    engine.resize(800, 0);
    assert_eq!(engine.camera().camera().aspect, 2.0);
}

#[test]
fn bulk_update_applies_known_ids_and_defaults_missing() {
    let (mut engine, _) = make_engine();
    let store = Store(vec![
        ("K1".into(), RawRating::from(5_i32)),
        ("S1".into(), RawRating::Missing),
        ("B1".into(), RawRating::from("abc")),
        ("ghost".into(), RawRating::from(2_i32)),
    ]);
    assert_eq!(engine.sync_from(&store), 3);
    let rating = |id: &str| engine.scene().marker(id).unwrap().rating.map(|r| r.get());
    assert_eq!(rating("K1"), Some(5));
    assert_eq!(rating("S1"), Some(3));
    assert_eq!(rating("B1"), Some(3));
    assert_eq!(rating("K2"), None);
    assert_eq!(store.rating("K1"), RawRating::from(5_i32));
}

#[test]
fn rating_change_animates_over_frames() {
    let (mut engine, _) = make_engine();
    assert!(engine.set_rating("K2", 5_i32));
    assert!(!engine.set_rating("missing", 5_i32));
    let before = engine.scene().marker("K2").unwrap().current.scale;
    engine.frame(0.0).unwrap();
    let after = engine.scene().marker("K2").unwrap().current.scale;
    assert!(after > before && after < 2.0);
    for i in 1..400 {
        engine.frame(i as f32 / 60.0).unwrap();
    }
    let m = engine.scene().marker("K2").unwrap();
    assert!((m.current.scale - 2.0).abs() < 1e-3);
}

#[test]
fn wheel_zoom_is_clamped_and_has_no_momentum() {
    let (mut engine, _) = make_engine();
    engine.wheel(-10_000.0);
    assert_eq!(engine.camera().radius(), engine.config().camera.min_radius);
    engine.frame(0.0).unwrap();
    assert!(!engine.camera().is_moving());
}

#[test]
fn lost_surface_is_reconfigured() {
    let (mut engine, log) = make_engine();
    log.borrow_mut().fail_next = Some(RenderError::SurfaceLost);
    assert_eq!(engine.frame(0.0), Err(RenderError::SurfaceLost));
    assert_eq!(log.borrow().resizes.last(), Some(&(800, 400)));
    assert!(engine.frame(0.016).is_ok());
}

#[test]
fn reset_camera_clears_drag_and_momentum() {
    let (mut engine, _) = make_engine();
    let eye = engine.camera().camera().eye;
    let press = PointerInput::new(1, 0.0, 0.0).with_shift(true);
    assert_eq!(press.drag_mode(), DragMode::Pan);
    engine.pointer_down(press);
    engine.pointer_move(1, Vec2::new(40.0, 0.0));
    engine.reset_camera();
    assert!(!engine.camera().is_dragging());
    assert!((engine.camera().camera().eye - eye).length() < 1e-5);
    assert_eq!(engine.camera().pan_velocity(), Vec3::ZERO);
}

#[test]
fn rebuild_replaces_markers() {
    let (mut engine, _) = make_engine();
    engine.set_rating("K1", 4_i32);
    let items = vec![ItemSpec::new("X1", Category::Skill, "New item")];
    engine.rebuild(&items);
    assert_eq!(engine.scene().markers().len(), 1);
    assert!(engine.scene().marker("K1").is_none());
    assert_eq!(engine.items(), items.as_slice());
    assert_eq!(engine.scene().figure_count(), 1);
}
