//! The central coach figure: a procedural primitive build, or a loaded asset
//! fitted to the same framing.

use crate::asset::{AssetError, LoadedAsset};
use crate::constants::*;
use crate::geometry::{self, Aabb, MeshData};
use crate::scene::{MeshId, MeshLibrary};
use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq)]
pub enum FigureKind {
    Procedural,
    Loaded { source: String },
}

/// One mesh of the figure, positioned in figure-local space.
#[derive(Clone, Copy, Debug)]
pub struct FigurePart {
    pub mesh: MeshId,
    pub local: Mat4,
    pub color: Vec3,
    /// Bounds of the referenced mesh in its own space.
    pub mesh_bounds: Aabb,
}

#[derive(Clone, Debug)]
pub struct Figure {
    pub kind: FigureKind,
    pub parts: SmallVec<[FigurePart; 16]>,
    pub position: Vec3,
    pub scale: Vec3,
    pub breathe_offset: f32,
    /// Current vertical breathing multiplier (1.0 at rest).
    pub breathe: f32,
}

impl Figure {
    pub fn is_procedural(&self) -> bool {
        self.kind == FigureKind::Procedural
    }

    /// Root transform without breathing.
    pub fn base_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }

    pub fn model_matrix(&self) -> Mat4 {
        let scale = self.scale * Vec3::new(1.0, self.breathe, 1.0);
        Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, self.position)
    }

    pub fn local_bounds(&self) -> Aabb {
        self.parts.iter().fold(Aabb::EMPTY, |acc, p| {
            acc.union(&p.mesh_bounds.transformed(&p.local))
        })
    }

    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds().transformed(&self.base_matrix())
    }

    /// Small periodic vertical scale so the figure never looks frozen.
    pub fn apply_breathing(&mut self, time_sec: f32) {
        self.breathe = 1.0 + BREATHE_AMPLITUDE * (time_sec * BREATHE_RATE + self.breathe_offset).sin();
    }
}

struct PartBuilder<'a> {
    library: &'a mut MeshLibrary,
    parts: SmallVec<[FigurePart; 16]>,
}

impl<'a> PartBuilder<'a> {
    fn mesh(&mut self, mesh: MeshData) -> (MeshId, Aabb) {
        let bounds = mesh.bounds();
        (self.library.add(mesh), bounds)
    }

    fn place(&mut self, mesh: (MeshId, Aabb), color: u32, pos: [f32; 3], rot_z: f32, scale: [f32; 3]) {
        self.parts.push(FigurePart {
            mesh: mesh.0,
            local: Mat4::from_scale_rotation_translation(
                Vec3::from(scale),
                Quat::from_rotation_z(rot_z),
                Vec3::from(pos),
            ),
            color: geometry::srgb_hex(color),
            mesh_bounds: mesh.1,
        });
    }
}

const TORSO_HEX: u32 = 0x284e63;
const NECK_HEX: u32 = 0xedd1b0;
const HEAD_HEX: u32 = 0xffe0c8;
const HAIR_HEX: u32 = 0x2b1f15;
const EYE_HEX: u32 = 0x111111;
const ARM_HEX: u32 = 0x3a6b84;
const LEG_HEX: u32 = 0x1f2a38;

/// Stylised coach built from boxes, spheres and cylinders.
pub fn build_procedural_figure(library: &mut MeshLibrary, breathe_offset: f32) -> Figure {
    let mut b = PartBuilder {
        library,
        parts: SmallVec::new(),
    };
    const ONE: [f32; 3] = [1.0, 1.0, 1.0];
    const CAP: [f32; 3] = [1.0, 0.6, 1.0];

    let torso = b.mesh(geometry::cuboid(0.7, 1.0, 0.38));
    b.place(torso, TORSO_HEX, [0.0, 0.05, 0.0], 0.0, ONE);
    let chest = b.mesh(geometry::uv_sphere(0.4, 16, 12));
    b.place(chest, TORSO_HEX, [0.0, 0.55, 0.0], 0.0, CAP);

    let neck = b.mesh(geometry::cylinder(0.12, 0.12, 0.18, 12));
    b.place(neck, NECK_HEX, [0.0, 0.65, 0.0], 0.0, ONE);
    let head = b.mesh(geometry::uv_sphere(0.26, 20, 16));
    b.place(head, HEAD_HEX, [0.0, 0.95, 0.0], 0.0, ONE);
    let hair = b.mesh(geometry::uv_sphere(0.28, 12, 10));
    b.place(hair, HAIR_HEX, [0.0, 1.05, 0.0], 0.0, CAP);
    let eye = b.mesh(geometry::uv_sphere(0.03, 8, 6));
    b.place(eye, EYE_HEX, [-0.07, 0.97, 0.23], 0.0, ONE);
    b.place(eye, EYE_HEX, [0.07, 0.97, 0.23], 0.0, ONE);

    let upper_arm = b.mesh(geometry::cylinder(0.08, 0.09, 0.45, 12));
    let lower_arm = b.mesh(geometry::cylinder(0.07, 0.07, 0.45, 10));
    for side in [-1.0_f32, 1.0] {
        b.place(upper_arm, ARM_HEX, [0.6 * side, 0.45, 0.0], -0.35 * side, ONE);
        b.place(lower_arm, ARM_HEX, [0.4 * side, 0.05, 0.0], -0.9 * side, ONE);
    }

    let leg = b.mesh(geometry::cylinder(0.11, 0.12, 0.9, 12));
    b.place(leg, LEG_HEX, [-0.18, -0.9, 0.0], 0.0, ONE);
    b.place(leg, LEG_HEX, [0.18, -0.9, 0.0], 0.0, ONE);

    Figure {
        kind: FigureKind::Procedural,
        parts: b.parts,
        position: Vec3::new(0.0, FIGURE_BASE_Y, 0.0),
        scale: Vec3::splat(FIGURE_SCALE),
        breathe_offset,
        breathe: 1.0,
    }
}

/// Turn a decoded asset into a figure whose world bounding box has the same
/// height and bottom-center as `reference`.
pub fn fit_loaded_figure(
    asset: LoadedAsset,
    reference: &Aabb,
    library: &mut MeshLibrary,
    source: &str,
    breathe_offset: f32,
) -> Result<Figure, AssetError> {
    let bounds = asset.bounds();
    let height = bounds.height();
    if asset.primitives.is_empty() || !(height.is_finite() && height > f32::EPSILON) {
        return Err(AssetError::Empty);
    }
    let scale = reference.height() / height;
    let position = reference.bottom_center() - bounds.bottom_center() * scale;

    let mut parts = SmallVec::new();
    for prim in asset.primitives {
        let mesh_bounds = prim.mesh.bounds();
        parts.push(FigurePart {
            mesh: library.add(prim.mesh),
            local: Mat4::IDENTITY,
            color: prim.color,
            mesh_bounds,
        });
    }
    log::info!(
        "[asset] fitted {:?}: source height {:.3} -> {:.3} (scale {:.4})",
        source,
        height,
        reference.height(),
        scale
    );
    Ok(Figure {
        kind: FigureKind::Loaded {
            source: source.to_string(),
        },
        parts,
        position,
        scale: Vec3::splat(scale),
        breathe_offset,
        breathe: 1.0,
    })
}
