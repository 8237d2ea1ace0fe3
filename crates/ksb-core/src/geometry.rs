//! CPU-side triangle meshes for the primitive shapes the scene is built from.
//!
//! All generators produce counter-clockwise front faces, unit-length normals
//! and `u32` indices. Shapes are centered on the origin unless noted.

use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn extend_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn height(&self) -> f32 {
        self.size().y
    }

    /// Center of the bottom face.
    pub fn bottom_center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) * 0.5,
            self.min.y,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Bounds of this box after an affine transform (all eight corners).
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let mut out = Aabb::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.extend_point(m.transform_point3(corner));
        }
        out
    }
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn bounds(&self) -> Aabb {
        let mut b = Aabb::EMPTY;
        for p in &self.positions {
            b.extend_point(Vec3::from(*p));
        }
        b
    }

    fn push_vertex(&mut self, p: Vec3, n: Vec3) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(p.to_array());
        self.normals.push(n.normalize_or_zero().to_array());
        idx
    }

    /// Area-weighted smooth normals, for assets that ship without them.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if a >= acc.len() || b >= acc.len() || c >= acc.len() {
                continue;
            }
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| {
                let n = n.normalize_or_zero();
                (if n == Vec3::ZERO { Vec3::Y } else { n }).to_array()
            })
            .collect();
    }
}

/// Box with per-face normals (24 vertices).
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let h = Vec3::new(width, height, depth) * 0.5;
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut mesh = MeshData::default();
    for (normal, u, v) in faces {
        let center = normal * h;
        let du = u * h;
        let dv = v * h;
        let a = mesh.push_vertex(center - du - dv, normal);
        let b = mesh.push_vertex(center + du - dv, normal);
        let c = mesh.push_vertex(center + du + dv, normal);
        let d = mesh.push_vertex(center - du + dv, normal);
        mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }
    mesh
}

/// Latitude/longitude sphere.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut mesh = MeshData::default();
    for y in 0..=hs {
        let v = y as f32 / hs as f32;
        let theta = v * PI;
        for x in 0..=ws {
            let u = x as f32 / ws as f32;
            let phi = u * TAU;
            let n = Vec3::new(-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin());
            mesh.push_vertex(n * radius, n);
        }
    }
    let row = ws + 1;
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

/// Capped (possibly tapered) cylinder along +Y, centered vertically.
pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> MeshData {
    let segs = radial_segments.max(3);
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);
    let mut mesh = MeshData::default();

    // side
    for i in 0..=segs {
        let a = i as f32 / segs as f32 * TAU;
        let (s, c) = a.sin_cos();
        let n = Vec3::new(s, slope, c);
        mesh.push_vertex(Vec3::new(radius_top * s, half, radius_top * c), n);
        mesh.push_vertex(Vec3::new(radius_bottom * s, -half, radius_bottom * c), n);
    }
    for i in 0..segs {
        let t0 = i * 2;
        let b0 = t0 + 1;
        let t1 = t0 + 2;
        let b1 = t0 + 3;
        mesh.indices.extend_from_slice(&[t0, b0, b1, t0, b1, t1]);
    }

    // caps
    for (y, r, n) in [(half, radius_top, Vec3::Y), (-half, radius_bottom, Vec3::NEG_Y)] {
        let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), n);
        let first = mesh.positions.len() as u32;
        for i in 0..=segs {
            let a = i as f32 / segs as f32 * TAU;
            let (s, c) = a.sin_cos();
            mesh.push_vertex(Vec3::new(r * s, y, r * c), n);
        }
        for i in 0..segs {
            let p0 = first + i;
            let p1 = first + i + 1;
            if n.y > 0.0 {
                mesh.indices.extend_from_slice(&[center, p0, p1]);
            } else {
                mesh.indices.extend_from_slice(&[center, p1, p0]);
            }
        }
    }
    mesh
}

/// Regular icosahedron with flat-shaded faces (60 vertices).
pub fn icosahedron(radius: f32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let verts = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    const FACES: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    let mut mesh = MeshData::default();
    for f in FACES {
        let a = verts[f[0]].normalize() * radius;
        let b = verts[f[1]].normalize() * radius;
        let c = verts[f[2]].normalize() * radius;
        let n = (b - a).cross(c - a).normalize_or_zero();
        let ia = mesh.push_vertex(a, n);
        let ib = mesh.push_vertex(b, n);
        let ic = mesh.push_vertex(c, n);
        mesh.indices.extend_from_slice(&[ia, ib, ic]);
    }
    mesh
}

/// Horizontal square in the XZ plane facing +Y.
pub fn ground_plane(size: f32) -> MeshData {
    let h = size * 0.5;
    let mut mesh = MeshData::default();
    let a = mesh.push_vertex(Vec3::new(-h, 0.0, h), Vec3::Y);
    let b = mesh.push_vertex(Vec3::new(h, 0.0, h), Vec3::Y);
    let c = mesh.push_vertex(Vec3::new(h, 0.0, -h), Vec3::Y);
    let d = mesh.push_vertex(Vec3::new(-h, 0.0, -h), Vec3::Y);
    mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    mesh
}

/// Convert an sRGB hex colour (0xRRGGBB) to linear RGB.
pub fn srgb_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(16), channel(8), channel(0))
}
