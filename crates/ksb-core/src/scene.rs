//! Scene graph: lights, ground, rating markers and the single figure slot.

use crate::animator;
use crate::constants::*;
use crate::figure::{self, Figure};
use crate::geometry::{self, Aabb, MeshData};
use crate::rating::{Rating, RawRating};
use fnv::FnvHashMap;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::f32::consts::PI;

/// Item kind; each kind is bound to one fixed hue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Knowledge,
    Skill,
    Behaviour,
}

impl Category {
    /// Map the item-list label. Anything unrecognised is treated as a
    /// behaviour, matching how the form groups items.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Knowledge" | "knowledge" | "K" => Category::Knowledge,
            "Skill" | "skill" | "S" => Category::Skill,
            _ => Category::Behaviour,
        }
    }

    pub fn base_color(self) -> Vec3 {
        geometry::srgb_hex(match self {
            Category::Knowledge => KNOWLEDGE_HEX,
            Category::Skill => SKILL_HEX,
            Category::Behaviour => BEHAVIOUR_HEX,
        })
    }
}

/// One ratable item as supplied by the external item list.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSpec {
    pub id: String,
    pub category: Category,
    pub title: String,
}

impl ItemSpec {
    pub fn new(id: impl Into<String>, category: Category, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            title: title.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerTransform {
    pub position: Vec3,
    pub scale: f32,
    pub color: Vec3,
}

#[derive(Clone, Debug)]
pub struct Marker {
    pub id: String,
    pub title: String,
    pub category: Category,
    /// Position in the layout; drives the idle wobble phase.
    pub index: usize,
    pub base_position: Vec3,
    pub base_color: Vec3,
    pub current: MarkerTransform,
    pub target: MarkerTransform,
    /// `None` until a rating is supplied.
    pub rating: Option<Rating>,
    /// Idle wobble (x, y Euler angles).
    pub rotation: Vec2,
}

impl Marker {
    pub fn model_matrix(&self) -> Mat4 {
        let rot = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0);
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.current.scale),
            rot,
            self.current.position,
        )
    }

    /// Radius used for ray picking at the current scale.
    pub fn pick_radius(&self) -> f32 {
        MARKER_RADIUS * self.current.scale
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Store of CPU meshes referenced by [`MeshId`]. Removed slots are never
/// reused, so an id always names the same mesh or nothing.
///
/// `epoch` changes whenever the scene is rebuilt so renderers know to drop
/// any uploaded copies.
#[derive(Clone, Debug, Default)]
pub struct MeshLibrary {
    epoch: u64,
    meshes: Vec<Option<MeshData>>,
}

impl MeshLibrary {
    pub fn new(epoch: u64) -> Self {
        Self {
            epoch,
            meshes: Vec::new(),
        }
    }

    pub fn add(&mut self, mesh: MeshData) -> MeshId {
        self.meshes.push(Some(mesh));
        MeshId(self.meshes.len() as u32 - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.get(id).is_some()
    }

    /// Free the mesh in `id`'s slot.
    pub fn remove(&mut self, id: MeshId) -> Option<MeshData> {
        self.meshes.get_mut(id.0 as usize).and_then(Option::take)
    }

    /// Number of live meshes.
    pub fn len(&self) -> usize {
        self.meshes.iter().filter(|m| m.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub hemi_sky: Vec3,
    pub hemi_ground: Vec3,
    pub hemi_intensity: f32,
    /// Unit vector pointing from the scene toward the light.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            hemi_sky: geometry::srgb_hex(HEMI_SKY_HEX),
            hemi_ground: geometry::srgb_hex(HEMI_GROUND_HEX),
            hemi_intensity: HEMI_INTENSITY,
            sun_direction: Vec3::from(DIRECTIONAL_POSITION).normalize(),
            sun_color: geometry::srgb_hex(DIRECTIONAL_HEX),
            sun_intensity: DIRECTIONAL_INTENSITY,
        }
    }
}

/// Linear distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: geometry::srgb_hex(FOG_HEX),
            near: FOG_NEAR,
            far: FOG_FAR,
        }
    }
}

/// A static mesh instance (the ground).
#[derive(Clone, Copy, Debug)]
pub struct SceneObject {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: Vec3,
}

/// Golden-angle point `i` of `total` on a sphere of `radius`.
pub fn golden_sphere_point(i: usize, total: usize, radius: f32) -> Vec3 {
    let total = total.max(1) as f32;
    let phi = (1.0 - 2.0 * (i as f32 + 0.5) / total).clamp(-1.0, 1.0).acos();
    let theta = PI * (1.0 + 5.0_f32.sqrt()) * i as f32;
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

pub struct Scene {
    pub lighting: Lighting,
    pub fog: Fog,
    pub ground: SceneObject,
    marker_sphere_radius: f32,
    markers: Vec<Marker>,
    index: FnvHashMap<String, usize>,
    marker_mesh: MeshId,
    figure: Option<Figure>,
    /// World bounds of the procedural figure; loaded assets are fitted to it.
    reference_bounds: Aabb,
    breathe_offset: f32,
    library: MeshLibrary,
}

impl Scene {
    /// Build lights, ground, one marker per item and the procedural figure.
    pub fn build(items: &[ItemSpec], marker_sphere_radius: f32, epoch: u64, breathe_offset: f32) -> Self {
        let mut library = MeshLibrary::new(epoch);
        let ground = SceneObject {
            mesh: library.add(geometry::ground_plane(GROUND_SIZE)),
            model: Mat4::from_translation(Vec3::new(0.0, GROUND_Y, 0.0)),
            color: geometry::srgb_hex(GROUND_HEX),
        };
        let marker_mesh = library.add(geometry::icosahedron(MARKER_RADIUS));
        let procedural = figure::build_procedural_figure(&mut library, breathe_offset);
        let reference_bounds = procedural.world_bounds();

        let mut scene = Self {
            lighting: Lighting::default(),
            fog: Fog::default(),
            ground,
            marker_sphere_radius,
            markers: Vec::with_capacity(items.len()),
            index: FnvHashMap::default(),
            marker_mesh,
            figure: Some(procedural),
            reference_bounds,
            breathe_offset,
            library,
        };
        scene.add_markers(items);
        log::info!(
            "[scene] built epoch={} markers={} meshes={}",
            epoch,
            scene.markers.len(),
            scene.library.len()
        );
        scene
    }

    /// Add one marker per new item, then spread every marker over the
    /// layout sphere by its overall index. Returns the added markers keyed by
    /// id; ids already present are skipped.
    pub fn add_markers(&mut self, items: &[ItemSpec]) -> FnvHashMap<&str, &Marker> {
        let first = self.markers.len();
        for item in items {
            if self.index.contains_key(&item.id) {
                log::warn!("[scene] duplicate marker id {:?} ignored", item.id);
                continue;
            }
            let base_color = item.category.base_color();
            let current = MarkerTransform {
                position: Vec3::ZERO,
                scale: 1.0,
                color: base_color,
            };
            let marker = Marker {
                id: item.id.clone(),
                title: item.title.clone(),
                category: item.category,
                index: self.markers.len(),
                base_position: Vec3::ZERO,
                base_color,
                current,
                target: current,
                rating: None,
                rotation: Vec2::ZERO,
            };
            self.index.insert(item.id.clone(), self.markers.len());
            self.markers.push(marker);
        }
        if self.markers.len() > first {
            self.layout_markers(first);
        }
        self.markers[first..]
            .iter()
            .map(|m| (m.id.as_str(), m))
            .collect()
    }

    /// Re-seat every marker on the golden-angle sphere. Markers before
    /// `fresh` keep their animation offset from the base; the rest start
    /// on their new base.
    fn layout_markers(&mut self, fresh: usize) {
        let total = self.markers.len();
        let radius = self.marker_sphere_radius;
        for (i, marker) in self.markers.iter_mut().enumerate() {
            let base = golden_sphere_point(i, total, radius);
            if i < fresh {
                let lift = marker.current.position.y - marker.base_position.y;
                marker.current.position = Vec3::new(base.x, base.y + lift, base.z);
            } else {
                marker.current.position = base;
            }
            marker.base_position = base;
            marker.target = match marker.rating {
                Some(r) => animator::target_for(marker, r),
                None => animator::unrated_target(marker),
            };
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut [Marker] {
        &mut self.markers
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.index.get(id).map(|&i| &self.markers[i])
    }

    pub fn marker_mut(&mut self, id: &str) -> Option<&mut Marker> {
        match self.index.get(id) {
            Some(&i) => self.markers.get_mut(i),
            None => None,
        }
    }

    pub fn marker_mesh(&self) -> MeshId {
        self.marker_mesh
    }

    /// Store new animation targets for `id`. Unknown ids are ignored and
    /// reported as `false`.
    pub fn set_rating(&mut self, id: &str, raw: &RawRating) -> bool {
        match self.marker_mut(id) {
            Some(marker) => {
                animator::apply_rating(marker, Rating::resolve(raw));
                true
            }
            None => {
                log::debug!("[scene] rating for unknown id {:?} ignored", id);
                false
            }
        }
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    pub fn figure_mut(&mut self) -> Option<&mut Figure> {
        self.figure.as_mut()
    }

    pub fn figure_count(&self) -> usize {
        usize::from(self.figure.is_some())
    }

    /// Detach the current figure (if any), then attach `figure`. The
    /// detached figure's meshes are freed from the library unless the new
    /// figure shares them; the detached instance is returned.
    pub fn replace_figure(&mut self, figure: Figure) -> Option<Figure> {
        let old = self.figure.take();
        if let Some(old) = old.as_ref() {
            for part in old.parts.iter() {
                if !figure.parts.iter().any(|p| p.mesh == part.mesh) {
                    self.library.remove(part.mesh);
                }
            }
            log::debug!(
                "[scene] detached {:?} figure, {} meshes live",
                old.kind,
                self.library.len()
            );
        }
        self.figure = Some(figure);
        old
    }

    /// Attach a fresh procedural figure when the slot is empty.
    pub fn ensure_figure(&mut self) {
        if self.figure.is_none() {
            let procedural = figure::build_procedural_figure(&mut self.library, self.breathe_offset);
            self.figure = Some(procedural);
        }
    }

    pub fn reference_bounds(&self) -> Aabb {
        self.reference_bounds
    }

    pub fn breathe_offset(&self) -> f32 {
        self.breathe_offset
    }

    pub fn library(&self) -> &MeshLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut MeshLibrary {
        &mut self.library
    }
}
