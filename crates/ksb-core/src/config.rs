//! Engine configuration.
//!
//! Every field defaults to the matching value in [`crate::constants`]; hosts
//! override only what they need (e.g. the figure asset URL).

use crate::constants::*;

/// Camera limits and input sensitivities.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub start_eye: [f32; 3],
    pub start_target: [f32; 3],
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub polar_min: f32,
    pub polar_max: f32,
    pub angular_damping: f32,
    pub pan_damping: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fovy_deg: CAMERA_FOVY_DEG,
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
            start_eye: CAMERA_START_EYE,
            start_target: CAMERA_START_TARGET,
            rotate_speed: ROTATE_SPEED,
            pan_speed: PAN_SPEED,
            zoom_speed: ZOOM_SPEED,
            min_radius: MIN_RADIUS,
            max_radius: MAX_RADIUS,
            polar_min: POLAR_MIN,
            polar_max: POLAR_MAX,
            angular_damping: ANGULAR_DAMPING,
            pan_damping: PAN_DAMPING,
        }
    }
}

/// Per-frame interpolation factors for marker settling. Both must be in (0, 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorSettings {
    pub transform_lerp: f32,
    pub color_lerp: f32,
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            transform_lerp: TRANSFORM_LERP,
            color_lerp: COLOR_LERP,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub camera: CameraSettings,
    pub animator: AnimatorSettings,
    pub marker_sphere_radius: f32,
    pub tooltip_offset: f32,
    pub tooltip_edge_margin: f32,
    /// Optional external figure asset (glTF / GLB). `None` keeps the
    /// procedural figure.
    pub figure_url: Option<String>,
    /// Seed for the figure's breathing phase.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            animator: AnimatorSettings::default(),
            marker_sphere_radius: MARKER_SPHERE_RADIUS,
            tooltip_offset: TOOLTIP_OFFSET,
            tooltip_edge_margin: TOOLTIP_EDGE_MARGIN,
            figure_url: None,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Clamp settings that would break the engine's invariants: damping and
    /// lerp factors stay below 1, the radius and polar ranges are ordered.
    pub fn sanitized(mut self) -> Self {
        let unit = |v: f32, fallback: f32| {
            if v.is_finite() && v > 0.0 && v < 1.0 {
                v
            } else {
                fallback
            }
        };
        self.animator.transform_lerp = unit(self.animator.transform_lerp, TRANSFORM_LERP);
        self.animator.color_lerp = unit(self.animator.color_lerp, COLOR_LERP);
        self.camera.angular_damping = unit(self.camera.angular_damping, ANGULAR_DAMPING);
        self.camera.pan_damping = unit(self.camera.pan_damping, PAN_DAMPING);
        if !(self.camera.min_radius.is_finite() && self.camera.min_radius > 0.0) {
            self.camera.min_radius = MIN_RADIUS;
        }
        if !(self.camera.max_radius.is_finite() && self.camera.max_radius >= self.camera.min_radius)
        {
            self.camera.max_radius = self.camera.min_radius.max(MAX_RADIUS);
        }
        let (lo, hi) = (self.camera.polar_min, self.camera.polar_max);
        let polar_ok = lo.is_finite()
            && hi.is_finite()
            && lo > 0.0
            && hi < std::f32::consts::PI
            && hi - lo > 2.0 * POLAR_CLAMP_MARGIN;
        if !polar_ok {
            self.camera.polar_min = POLAR_MIN;
            self.camera.polar_max = POLAR_MAX;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_rejects_unstable_factors() {
        let mut cfg = EngineConfig::default();
        cfg.animator.transform_lerp = 1.5;
        cfg.camera.pan_damping = f32::NAN;
        cfg.camera.min_radius = 5.0;
        cfg.camera.max_radius = 2.0;
        let cfg = cfg.sanitized();
        assert_eq!(cfg.animator.transform_lerp, TRANSFORM_LERP);
        assert_eq!(cfg.camera.pan_damping, PAN_DAMPING);
        assert!(cfg.camera.max_radius >= cfg.camera.min_radius);
    }

    #[test]
    fn sanitized_restores_inverted_polar_range() {
        let mut cfg = EngineConfig::default();
        cfg.camera.polar_min = 2.0;
        cfg.camera.polar_max = 1.0;
        let cfg = cfg.sanitized();
        assert_eq!(cfg.camera.polar_min, POLAR_MIN);
        assert_eq!(cfg.camera.polar_max, POLAR_MAX);

        let mut cfg = EngineConfig::default();
        cfg.camera.polar_min = 0.3;
        cfg.camera.polar_max = 2.5;
        let cfg = cfg.sanitized();
        assert_eq!(cfg.camera.polar_min, 0.3);
        assert_eq!(cfg.camera.polar_max, 2.5);
    }
}
