// Figure composition: procedural build, asset fitting and the race-safe swap.

use glam::Vec3;
use ksb_core::asset::{decode_asset, AssetPrimitive};
use ksb_core::figure::{build_procedural_figure, fit_loaded_figure};
use ksb_core::geometry;
use ksb_core::{
    AssetError, AssetLoader, AssetSink, Category, EngineConfig, FigureKind, ItemSpec, LoadedAsset,
    MeshLibrary, SceneEngine,
};
use std::cell::RefCell;
use std::rc::Rc;

/// One triangle (0,0,0) (1,0,0) (0,1,0), indexed, under a node scaled by 2
/// and lifted by 2.
const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "mesh": 0, "translation": [0, 2, 0], "scale": [2, 2, 2] }],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
  ],
  "buffers": [{
    "byteLength": 44,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
  }]
}"#;

type Pending = Rc<RefCell<Vec<(String, AssetSink)>>>;

/// Loader that parks every request so the test decides when (and whether)
/// it completes.
struct ManualLoader {
    pending: Pending,
}

impl AssetLoader for ManualLoader {
    fn load(&self, url: &str, sink: AssetSink) {
        self.pending.borrow_mut().push((url.to_string(), sink));
    }
}

fn make_items() -> Vec<ItemSpec> {
    vec![
        ItemSpec::new("K1", Category::Knowledge, "Models"),
        ItemSpec::new("S1", Category::Skill, "Listening"),
    ]
}

fn make_engine(figure_url: Option<&str>) -> (SceneEngine, Pending) {
    let config = EngineConfig {
        figure_url: figure_url.map(str::to_string),
        ..Default::default()
    };
    let mut engine = SceneEngine::new(&make_items(), config);
    let pending: Pending = Rc::new(RefCell::new(Vec::new()));
    engine.set_asset_loader(Box::new(ManualLoader {
        pending: pending.clone(),
    }));
    (engine, pending)
}

fn box_asset(w: f32, h: f32, d: f32, lift: f32) -> LoadedAsset {
    let mut mesh = geometry::cuboid(w, h, d);
    for p in mesh.positions.iter_mut() {
        p[1] += lift;
    }
    LoadedAsset {
        primitives: vec![AssetPrimitive {
            mesh,
            color: Vec3::ONE,
        }],
    }
}

#[test]
fn procedural_figure_is_present_from_the_start() {
    let (engine, _) = make_engine(None);
    assert_eq!(engine.scene().figure_count(), 1);
    let fig = engine.scene().figure().unwrap();
    assert!(fig.is_procedural());
    assert_eq!(fig.parts.len(), 13);
    assert!(engine.scene().reference_bounds().height() > 2.0);
}

#[test]
fn decode_bakes_node_transform() {
    let asset = decode_asset(TRIANGLE_GLTF.as_bytes()).unwrap();
    assert_eq!(asset.primitives.len(), 1);
    let mesh = &asset.primitives[0].mesh;
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.normals.len(), 3);
    let b = asset.bounds();
    assert!((b.min.y - 2.0).abs() < 1e-6);
    assert!((b.max.y - 4.0).abs() < 1e-6);
    assert!((b.max.x - 2.0).abs() < 1e-6);
}

#[test]
fn fitted_asset_matches_reference_height_and_footprint() {
    let mut library = MeshLibrary::new(1);
    let reference = build_procedural_figure(&mut library, 0.0).world_bounds();
    let asset = box_asset(4.0, 10.0, 2.0, 30.0);
    let fig = fit_loaded_figure(asset, &reference, &mut library, "big.glb", 0.0).unwrap();
    let wb = fig.world_bounds();
    assert!((wb.height() - reference.height()).abs() < 1e-4);
    assert!((wb.bottom_center() - reference.bottom_center()).length() < 1e-4);
    assert_eq!(
        fig.kind,
        FigureKind::Loaded {
            source: "big.glb".into()
        }
    );
}

#[test]
fn flat_asset_is_rejected() {
    let mut library = MeshLibrary::new(1);
    let reference = build_procedural_figure(&mut library, 0.0).world_bounds();
    let err = fit_loaded_figure(LoadedAsset::default(), &reference, &mut library, "x", 0.0)
        .unwrap_err();
    assert_eq!(err, AssetError::Empty);
    let flat = box_asset(1.0, 0.0, 1.0, 0.0);
    assert!(fit_loaded_figure(flat, &reference, &mut library, "x", 0.0).is_err());
}

#[test]
fn failed_fetch_leaves_exactly_one_procedural_figure() {
    let (mut engine, pending) = make_engine(Some("coach.glb"));
    let (url, sink) = pending.borrow_mut().pop().unwrap();
    assert_eq!(url, "coach.glb");
    sink.deliver(Err(AssetError::Fetch("404".into())));
    engine.frame(0.0).unwrap();
    assert_eq!(engine.scene().figure_count(), 1);
    assert!(engine.scene().figure().unwrap().is_procedural());
    assert!(engine.pending_figure().is_none());
}

#[test]
fn undecodable_bytes_fall_back() {
    let (mut engine, pending) = make_engine(Some("coach.glb"));
    let (_, sink) = pending.borrow_mut().pop().unwrap();
    sink.deliver(Ok(b"<html>not found</html>".to_vec()));
    engine.frame(0.0).unwrap();
    assert_eq!(engine.scene().figure_count(), 1);
    assert!(engine.scene().figure().unwrap().is_procedural());
}

#[test]
fn loaded_asset_replaces_figure() {
    let (mut engine, pending) = make_engine(Some("coach.gltf"));
    let (_, sink) = pending.borrow_mut().pop().unwrap();
    sink.deliver(Ok(TRIANGLE_GLTF.as_bytes().to_vec()));
    engine.frame(0.0).unwrap();
    let fig = engine.scene().figure().unwrap();
    assert!(!fig.is_procedural());
    assert_eq!(engine.scene().figure_count(), 1);
    let reference = engine.scene().reference_bounds();
    assert!((fig.world_bounds().height() - reference.height()).abs() < 1e-4);
}

#[test]
fn replaced_figure_meshes_are_freed() {
    let (mut engine, pending) = make_engine(Some("coach.gltf"));
    let mut procedural_meshes: Vec<_> = engine
        .scene()
        .figure()
        .unwrap()
        .parts
        .iter()
        .map(|p| p.mesh)
        .collect();
    // eyes, arms and legs share meshes
    procedural_meshes.sort_unstable();
    procedural_meshes.dedup();
    let before = engine.scene().library().len();
    let (_, sink) = pending.borrow_mut().pop().unwrap();
    sink.deliver(Ok(TRIANGLE_GLTF.as_bytes().to_vec()));
    engine.frame(0.0).unwrap();

    let library = engine.scene().library();
    for id in &procedural_meshes {
        assert!(!library.contains(*id), "{id:?} still held after swap");
    }
    let loaded = engine.scene().figure().unwrap();
    assert!(loaded.parts.iter().all(|p| library.contains(p.mesh)));
    assert_eq!(
        library.len(),
        before - procedural_meshes.len() + loaded.parts.len()
    );
    assert!(engine
        .last_draws()
        .iter()
        .all(|d| library.contains(d.mesh)));
}

#[test]
fn result_after_rebuild_is_discarded() {
    let (mut engine, pending) = make_engine(Some("coach.glb"));
    let (_, stale) = pending.borrow_mut().remove(0);
    engine.rebuild(&make_items());
    assert_eq!(engine.generation(), 2);
    // rebuild issued a fresh request for the configured asset
    assert_eq!(pending.borrow().len(), 1);

    stale.deliver_decoded(Ok(box_asset(1.0, 1.0, 1.0, 0.0)));
    engine.frame(0.0).unwrap();
    assert!(engine.scene().figure().unwrap().is_procedural());
    assert!(engine.pending_figure().is_some());
}

#[test]
fn only_the_newest_request_is_applied() {
    let (mut engine, pending) = make_engine(None);
    let first = engine.request_figure("a.glb").unwrap();
    let second = engine.request_figure("b.glb").unwrap();
    assert_ne!(first, second);
    let mut sinks = pending.borrow_mut().drain(..).collect::<Vec<_>>();
    let (_, b) = sinks.pop().unwrap();
    let (_, a) = sinks.pop().unwrap();
    b.deliver_decoded(Ok(box_asset(1.0, 1.0, 1.0, 0.0)));
    a.deliver_decoded(Ok(box_asset(1.0, 2.0, 1.0, 0.0)));
    engine.frame(0.0).unwrap();
    engine.frame(0.016).unwrap();
    let fig = engine.scene().figure().unwrap();
    assert_eq!(
        fig.kind,
        FigureKind::Loaded {
            source: "b.glb".into()
        }
    );
}

#[test]
fn missing_loader_keeps_procedural_figure() {
    let mut engine = SceneEngine::new(&make_items(), EngineConfig::default());
    assert!(engine.request_figure("coach.glb").is_none());
    assert_eq!(engine.scene().figure_count(), 1);
}

#[test]
fn breathing_only_scales_vertically() {
    let (mut engine, _) = make_engine(None);
    let base = engine.scene().figure().unwrap().base_matrix();
    engine.frame(0.7).unwrap();
    let fig = engine.scene().figure().unwrap();
    assert!((fig.breathe - 1.0).abs() <= 0.01 + 1e-6);
    let m = fig.model_matrix();
    assert_eq!(m.x_axis, base.x_axis);
    assert_eq!(m.z_axis, base.z_axis);
    assert_eq!(m.w_axis, base.w_axis);
}
