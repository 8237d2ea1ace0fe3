//! Orbit / pan / zoom camera with inertial continuation.
//!
//! The controller is a two-state machine: `Idle`, or `Dragging` with a
//! [`PointerSession`] whose [`DragMode`] is fixed at pointer-down. Angular and
//! pan velocities are applied every frame, dragging or not, and decay
//! geometrically until they fall below a rest threshold.

use crate::config::CameraSettings;
use crate::constants::{
    ANGULAR_REST_THRESHOLD, ANGULAR_VELOCITY_BLEND, PAN_REST_THRESHOLD_SQ, PAN_VELOCITY_GAIN,
    POLAR_CLAMP_MARGIN,
};
use crate::picking::Ray;
use glam::{Mat4, Vec2, Vec3, Vec4};

/// Right-handed perspective camera.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }
    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// World-space ray through a point in normalized device coordinates
    /// (x right, y up, both in -1..1).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_proj().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray {
            origin: self.eye,
            direction: (far - self.eye).normalize_or_zero(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Orbit,
    Pan,
}

/// Live drag bound to one pointer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSession {
    pub mode: DragMode,
    pub pointer_id: i32,
    pub last: Vec2,
    /// Total pointer travel in px; small travel means the session was a click.
    pub travel: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerState {
    Idle,
    Dragging(PointerSession),
}

pub struct OrbitCamera {
    settings: CameraSettings,
    azimuth: f32,
    polar: f32,
    radius: f32,
    target: Vec3,
    angular_velocity: Vec2,
    pan_velocity: Vec3,
    state: ControllerState,
    camera: Camera,
}

impl OrbitCamera {
    pub fn new(settings: CameraSettings, aspect: f32) -> Self {
        let camera = Camera {
            eye: Vec3::from(settings.start_eye),
            target: Vec3::from(settings.start_target),
            up: Vec3::Y,
            aspect,
            fovy_radians: settings.fovy_deg.to_radians(),
            znear: settings.znear,
            zfar: settings.zfar,
        };
        let mut oc = Self {
            settings,
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            radius: 4.0,
            target: Vec3::ZERO,
            angular_velocity: Vec2::ZERO,
            pan_velocity: Vec3::ZERO,
            state: ControllerState::Idle,
            camera,
        };
        oc.reset();
        oc
    }

    /// Restore the starting eye/target, clear momentum and any drag.
    pub fn reset(&mut self) {
        let eye = Vec3::from(self.settings.start_eye);
        let target = Vec3::from(self.settings.start_target);
        let offset = eye - target;
        let radius = offset.length();
        self.radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            4.0
        }
        .clamp(self.settings.min_radius, self.settings.max_radius);
        self.target = target;
        self.azimuth = 0.0;
        self.polar = self.clamp_polar((offset.y / self.radius).clamp(-1.0, 1.0).acos());
        self.angular_velocity = Vec2::ZERO;
        self.pan_velocity = Vec3::ZERO;
        self.state = ControllerState::Idle;
        self.update_camera();
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn angular_velocity(&self) -> Vec2 {
        self.angular_velocity
    }

    pub fn pan_velocity(&self) -> Vec3 {
        self.pan_velocity
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ControllerState::Dragging(_))
    }

    pub fn is_moving(&self) -> bool {
        self.angular_velocity != Vec2::ZERO || self.pan_velocity != Vec3::ZERO
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    /// Idle → Dragging. Ignored (returns false) while another session owns
    /// the camera. Clears momentum so a fresh grab starts still.
    pub fn begin_drag(&mut self, pointer_id: i32, pos: Vec2, mode: DragMode) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.angular_velocity = Vec2::ZERO;
        self.pan_velocity = Vec3::ZERO;
        self.state = ControllerState::Dragging(PointerSession {
            mode,
            pointer_id,
            last: pos,
            travel: 0.0,
        });
        log::debug!("[camera] begin {:?} drag (pointer {})", mode, pointer_id);
        true
    }

    /// Apply a pointer move to the active session. Moves from any other
    /// pointer are ignored.
    pub fn drag_to(&mut self, pointer_id: i32, pos: Vec2) -> bool {
        let ControllerState::Dragging(mut session) = self.state else {
            return false;
        };
        if session.pointer_id != pointer_id {
            return false;
        }
        let delta = pos - session.last;
        session.last = pos;
        session.travel += delta.length();
        self.state = ControllerState::Dragging(session);
        match session.mode {
            DragMode::Orbit => self.orbit(delta),
            DragMode::Pan => self.pan(delta),
        }
        true
    }

    /// Dragging → Idle for the owning pointer; velocities are kept so the
    /// motion carries on. Returns the finished session.
    pub fn end_drag(&mut self, pointer_id: i32) -> Option<PointerSession> {
        match self.state {
            ControllerState::Dragging(session) if session.pointer_id == pointer_id => {
                self.state = ControllerState::Idle;
                log::debug!(
                    "[camera] end {:?} drag, travel {:.1}px",
                    session.mode,
                    session.travel
                );
                Some(session)
            }
            _ => None,
        }
    }

    fn orbit(&mut self, delta: Vec2) {
        let step = -delta * self.settings.rotate_speed;
        self.azimuth += step.x;
        self.polar = self.clamp_polar(self.polar + step.y);
        self.angular_velocity =
            step * ANGULAR_VELOCITY_BLEND + self.angular_velocity * (1.0 - ANGULAR_VELOCITY_BLEND);
        self.update_camera();
    }

    /// Keep the polar angle strictly inside (polar_min, polar_max).
    fn clamp_polar(&self, polar: f32) -> f32 {
        let lo = self.settings.polar_min + POLAR_CLAMP_MARGIN;
        let hi = (self.settings.polar_max - POLAR_CLAMP_MARGIN).max(lo);
        polar.max(lo).min(hi)
    }

    /// Camera right and up vectors from the current view direction.
    pub fn screen_basis(&self) -> (Vec3, Vec3) {
        let forward = self.camera.forward();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        (right, up)
    }

    fn pan(&mut self, delta: Vec2) {
        let speed = self.settings.pan_speed * self.radius;
        let (right, up) = self.screen_basis();
        let step = right * (-delta.x * speed) + up * (delta.y * speed);
        self.target += step;
        self.pan_velocity += step * PAN_VELOCITY_GAIN;
        self.update_camera();
    }

    /// Multiplicative zoom; never feeds inertia.
    pub fn zoom(&mut self, wheel_delta: f32) {
        if !wheel_delta.is_finite() {
            return;
        }
        let r = self.radius + wheel_delta * self.settings.zoom_speed * self.radius;
        self.radius = r.clamp(self.settings.min_radius, self.settings.max_radius);
        self.update_camera();
    }

    /// Per-frame inertia: apply remaining velocity, damp it, and snap it to
    /// zero once negligible so further ticks are no-ops.
    pub fn step(&mut self) {
        if self.angular_velocity.abs().max_element() > ANGULAR_REST_THRESHOLD {
            self.azimuth += self.angular_velocity.x;
            self.polar = self.clamp_polar(self.polar + self.angular_velocity.y);
            self.angular_velocity *= self.settings.angular_damping;
        } else {
            self.angular_velocity = Vec2::ZERO;
        }
        if self.pan_velocity.length_squared() > PAN_REST_THRESHOLD_SQ {
            self.target += self.pan_velocity;
            self.pan_velocity *= self.settings.pan_damping;
        } else {
            self.pan_velocity = Vec3::ZERO;
        }
        self.update_camera();
    }

    /// Spherical (azimuth, polar, radius) around the pan target → eye.
    pub fn update_camera(&mut self) {
        let sin_polar = self.polar.sin();
        let offset = Vec3::new(
            self.radius * sin_polar * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * sin_polar * self.azimuth.cos(),
        );
        self.camera.eye = self.target + offset;
        self.camera.target = self.target;
    }
}
