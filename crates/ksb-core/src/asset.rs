//! Figure asset loading.
//!
//! Fetching is a host capability ([`AssetLoader`]); the engine hands the
//! loader an [`AssetSink`] stamped with the scene generation and request
//! number at request time. Whatever the loader eventually delivers is decoded
//! on the spot and queued in a shared inbox. The frame loop drains the inbox
//! and only attaches results whose ticket is still current.

use crate::geometry::{Aabb, MeshData};
use glam::{Mat3, Mat4, Vec3};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssetError {
    #[error("no asset loader available")]
    Unavailable,
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("asset has no drawable geometry")]
    Empty,
}

/// Identifies one figure request: the scene generation it was made in and
/// its sequence number within that generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FigureTicket {
    pub generation: u64,
    pub request: u64,
}

/// One triangle primitive of a loaded asset, already in asset space.
#[derive(Clone, Debug)]
pub struct AssetPrimitive {
    pub mesh: MeshData,
    pub color: Vec3,
}

/// Opaque decoded asset: only its meshes and bounds matter to the scene.
#[derive(Clone, Debug, Default)]
pub struct LoadedAsset {
    pub primitives: Vec<AssetPrimitive>,
}

impl LoadedAsset {
    pub fn bounds(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::EMPTY, |acc, p| acc.union(&p.mesh.bounds()))
    }
}

#[derive(Debug)]
pub struct AssetDelivery {
    pub ticket: FigureTicket,
    pub source: String,
    pub result: Result<LoadedAsset, AssetError>,
}

pub type AssetInbox = Rc<RefCell<VecDeque<AssetDelivery>>>;

/// Completion handle given to an [`AssetLoader`]. Consumed on delivery, so a
/// request can complete at most once.
pub struct AssetSink {
    ticket: FigureTicket,
    source: String,
    inbox: AssetInbox,
}

impl AssetSink {
    pub(crate) fn new(ticket: FigureTicket, source: &str, inbox: AssetInbox) -> Self {
        Self {
            ticket,
            source: source.to_string(),
            inbox,
        }
    }

    pub fn ticket(&self) -> FigureTicket {
        self.ticket
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Decode fetched bytes (or pass a fetch failure through) and queue the
    /// outcome for the next frame.
    pub fn deliver(self, fetched: Result<Vec<u8>, AssetError>) {
        let result = fetched.and_then(|bytes| decode_asset(&bytes));
        self.deliver_decoded(result);
    }

    pub fn deliver_decoded(self, result: Result<LoadedAsset, AssetError>) {
        self.inbox.borrow_mut().push_back(AssetDelivery {
            ticket: self.ticket,
            source: self.source,
            result,
        });
    }
}

/// Host capability that fetches an asset by URL or path.
pub trait AssetLoader {
    /// Start fetching `url`. The loader must call `sink.deliver` at most once,
    /// now or later; dropping the sink without delivering leaves the current
    /// figure in place.
    fn load(&self, url: &str, sink: AssetSink);
}

/// Decode a glTF (JSON with embedded buffers) or GLB blob into triangle
/// meshes in asset space. Node transforms are baked into the vertices.
pub fn decode_asset(bytes: &[u8]) -> Result<LoadedAsset, AssetError> {
    let (doc, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| AssetError::Decode(e.to_string()))?;
    let scene = doc
        .default_scene()
        .or_else(|| doc.scenes().next())
        .ok_or(AssetError::Empty)?;

    let mut asset = LoadedAsset::default();
    for node in scene.nodes() {
        collect_node(&node, Mat4::IDENTITY, &buffers, &mut asset);
    }
    if asset.primitives.is_empty() {
        return Err(AssetError::Empty);
    }
    Ok(asset)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut LoadedAsset,
) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
        for prim in mesh.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = prim.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions
                .map(|p| world.transform_point3(Vec3::from(p)).to_array())
                .collect();
            if positions.is_empty() {
                continue;
            }
            let indices: Vec<u32> = match reader.read_indices() {
                Some(idx) => idx.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let mut mesh = MeshData {
                positions,
                normals: Vec::new(),
                indices,
            };
            match reader.read_normals() {
                Some(normals) => {
                    mesh.normals = normals
                        .map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero().to_array())
                        .collect();
                }
                None => mesh.compute_normals(),
            }
            if mesh.normals.len() != mesh.positions.len() {
                mesh.compute_normals();
            }
            let [r, g, b, _a] = prim.material().pbr_metallic_roughness().base_color_factor();
            out.primitives.push(AssetPrimitive {
                mesh,
                color: Vec3::new(r, g, b),
            });
        }
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = decode_asset(b"definitely not gltf").unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }

    #[test]
    fn sink_queues_fetch_failure() {
        let inbox: AssetInbox = Rc::new(RefCell::new(VecDeque::new()));
        let ticket = FigureTicket {
            generation: 3,
            request: 1,
        };
        let sink = AssetSink::new(ticket, "coach.glb", inbox.clone());
        sink.deliver(Err(AssetError::Fetch("404".into())));
        let queued = inbox.borrow_mut().pop_front().unwrap();
        assert_eq!(queued.ticket, ticket);
        assert_eq!(queued.result.unwrap_err(), AssetError::Fetch("404".into()));
    }
}
