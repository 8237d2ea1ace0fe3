use crate::scene::Marker;
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Distance along the ray to the first intersection with a sphere, or `None`
/// when the ray misses or the sphere is behind the origin.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Nearest marker hit by `ray`, as (marker index, distance).
pub fn pick_marker(ray: &Ray, markers: &[Marker]) -> Option<(usize, f32)> {
    let mut best = None::<(usize, f32)>;
    for (i, m) in markers.iter().enumerate() {
        if let Some(t) = ray_sphere(ray.origin, ray.direction, m.current.position, m.pick_radius()) {
            match best {
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((i, t)),
            }
        }
    }
    best
}

/// Client-space rectangle of the render surface (CSS px).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Client coordinates → normalized device coordinates (y up).
    pub fn to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let x = (client.x - self.left) / self.width * 2.0 - 1.0;
        let y = -((client.y - self.top) / self.height) * 2.0 + 1.0;
        Some(Vec2::new(x, y))
    }
}
