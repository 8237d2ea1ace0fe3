// Scene, camera and animation tuning constants shared by the web and native
// front-ends.

use std::f32::consts::PI;

// Camera projection
pub const CAMERA_FOVY_DEG: f32 = 45.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Initial framing: eye position and the orbit center it looks at
pub const CAMERA_START_EYE: [f32; 3] = [0.0, 1.2, 4.0];
pub const CAMERA_START_TARGET: [f32; 3] = [0.0, -0.1, 0.0];

// Orbit / pan / zoom
pub const ROTATE_SPEED: f32 = 0.005; // radians per pixel
pub const PAN_SPEED: f32 = 0.0025; // world units per pixel, multiplied by radius
pub const ZOOM_SPEED: f32 = 0.0015; // radius fraction per wheel delta unit
pub const MIN_RADIUS: f32 = 1.5;
pub const MAX_RADIUS: f32 = 12.0;
pub const POLAR_EPSILON: f32 = 0.05; // keeps the polar angle off the poles
pub const POLAR_MIN: f32 = POLAR_EPSILON;
pub const POLAR_MAX: f32 = PI - POLAR_EPSILON;
// Clamped angles stay this far inside the open interval (min, max)
pub const POLAR_CLAMP_MARGIN: f32 = 1e-4;

// Inertia
pub const ANGULAR_DAMPING: f32 = 0.92;
pub const PAN_DAMPING: f32 = 0.82;
pub const ANGULAR_VELOCITY_BLEND: f32 = 0.85; // weight of the newest drag delta
pub const PAN_VELOCITY_GAIN: f32 = 0.7; // share of each pan step kept as momentum
pub const ANGULAR_REST_THRESHOLD: f32 = 1e-5;
pub const PAN_REST_THRESHOLD_SQ: f32 = 1e-8;

// Pointer travel (px) below which a press/release pair counts as a click
pub const CLICK_SLOP_PX: f32 = 4.0;

// Markers
pub const MARKER_SPHERE_RADIUS: f32 = 2.0; // radius of the layout sphere
pub const MARKER_RADIUS: f32 = 0.18; // icosahedron circumradius at scale 1
pub const MARKER_SCALE_MIN: f32 = 0.6;
pub const MARKER_SCALE_MAX: f32 = 2.0;
pub const MARKER_HEIGHT_MIN: f32 = -0.4; // offset from base height at rating 1
pub const MARKER_HEIGHT_MAX: f32 = 1.0; // offset from base height at rating 5
pub const MARKER_WHITE_BLEND: f32 = 0.45; // max tint toward white at rating 5
pub const MARKER_WOBBLE_X: f32 = 0.2;
pub const MARKER_WOBBLE_Y: f32 = 0.3;

// Animator: fraction of the remaining distance covered per frame
pub const TRANSFORM_LERP: f32 = 0.12;
pub const COLOR_LERP: f32 = 0.08;

// Category palette (sRGB hex)
pub const KNOWLEDGE_HEX: u32 = 0xff8a65; // orange
pub const SKILL_HEX: u32 = 0x66bb6a; // green
pub const BEHAVIOUR_HEX: u32 = 0x42a5f5; // blue

// Figure
pub const FIGURE_SCALE: f32 = 1.1;
pub const FIGURE_BASE_Y: f32 = -0.2;
pub const BREATHE_RATE: f32 = 1.8; // radians per second
pub const BREATHE_AMPLITUDE: f32 = 0.01;
pub const BREATHE_OFFSET_MAX: f32 = 100.0;

// Ground
pub const GROUND_SIZE: f32 = 20.0;
pub const GROUND_Y: f32 = -1.1;
pub const GROUND_HEX: u32 = 0x071226;

// Lighting and fog
pub const HEMI_SKY_HEX: u32 = 0xffffff;
pub const HEMI_GROUND_HEX: u32 = 0x444444;
pub const HEMI_INTENSITY: f32 = 0.6;
pub const DIRECTIONAL_HEX: u32 = 0xffffff;
pub const DIRECTIONAL_INTENSITY: f32 = 0.8;
pub const DIRECTIONAL_POSITION: [f32; 3] = [5.0, 10.0, 7.0];
pub const FOG_HEX: u32 = 0x081020;
pub const FOG_NEAR: f32 = 5.0;
pub const FOG_FAR: f32 = 12.0;

// Tooltip placement (CSS px)
pub const TOOLTIP_OFFSET: f32 = 12.0;
pub const TOOLTIP_EDGE_MARGIN: f32 = 16.0;

// Default rating applied when input is missing or unparseable
pub const DEFAULT_RATING: u8 = 3;
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;
