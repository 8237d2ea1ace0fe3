//! Rating → marker target mapping and per-frame settling.
//!
//! Targets are affine in the normalized rating n = (r - 1) / 4:
//! scale 0.6 → 2.0, height offset -0.4 → +1.0 from the base position,
//! colour from the category hue toward white by up to 45%.

use crate::config::AnimatorSettings;
use crate::constants::*;
use crate::rating::Rating;
use crate::scene::{Marker, MarkerTransform};
use glam::{Vec2, Vec3};

#[inline]
fn affine(n: f32, lo: f32, hi: f32) -> f32 {
    lo + n * (hi - lo)
}

fn target_at(marker: &Marker, n: f32) -> MarkerTransform {
    let mut position = marker.base_position;
    position.y += affine(n, MARKER_HEIGHT_MIN, MARKER_HEIGHT_MAX);
    MarkerTransform {
        position,
        scale: affine(n, MARKER_SCALE_MIN, MARKER_SCALE_MAX),
        color: marker.base_color.lerp(Vec3::ONE, n * MARKER_WHITE_BLEND),
    }
}

/// Target for `rating` on this marker.
pub fn target_for(marker: &Marker, rating: Rating) -> MarkerTransform {
    target_at(marker, rating.normalized())
}

/// Target for a marker that has never been rated (bottom of the range).
pub fn unrated_target(marker: &Marker) -> MarkerTransform {
    target_at(marker, 0.0)
}

/// Record the rating and its target; the visible change happens over the
/// following frames.
pub fn apply_rating(marker: &mut Marker, rating: Rating) {
    marker.target = target_for(marker, rating);
    marker.rating = Some(rating);
}

/// Move each channel of the current transform a fixed fraction toward its
/// target. Only the height moves; x/z stay on the base position.
pub fn step_marker(marker: &mut Marker, settings: &AnimatorSettings) {
    let k = settings.transform_lerp;
    let cur = &mut marker.current;
    let tgt = &marker.target;
    cur.position.y += (tgt.position.y - cur.position.y) * k;
    cur.scale += (tgt.scale - cur.scale) * k;
    cur.color = cur.color.lerp(tgt.color, settings.color_lerp);
}

/// Idle wobble so markers read as live objects.
pub fn wobble(marker: &mut Marker, time_sec: f32) {
    let phase = time_sec + marker.index as f32;
    marker.rotation = Vec2::new(MARKER_WOBBLE_X * phase.sin(), MARKER_WOBBLE_Y * phase.cos());
}

/// One animator tick over every marker.
pub fn step_all(markers: &mut [Marker], settings: &AnimatorSettings, time_sec: f32) {
    for m in markers.iter_mut() {
        wobble(m, time_sec);
        step_marker(m, settings);
    }
}

/// True once every channel is within `eps` of its target.
pub fn is_settled(marker: &Marker, eps: f32) -> bool {
    let c = &marker.current;
    let t = &marker.target;
    (c.scale - t.scale).abs() <= eps
        && (c.position.y - t.position.y).abs() <= eps
        && (c.color - t.color).abs().max_element() <= eps
}
