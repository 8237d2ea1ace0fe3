//! Hover tooltip state and placement.
//!
//! The core owns what the tooltip says and where it goes; the host only
//! measures the rendered box (see [`Tooltip::set_size`]) and applies the
//! resulting position. All coordinates are viewport (client) pixels.

use crate::rating::Rating;
use crate::scene::Marker;
use glam::Vec2;

/// Header line: the title alone when it already starts with the id,
/// otherwise "id — title".
pub fn header_text(id: &str, title: &str) -> String {
    let title = title.trim();
    if title.to_lowercase().starts_with(&id.to_lowercase()) {
        title.to_string()
    } else {
        format!("{id} — {title}")
    }
}

pub fn body_text(rating: Option<Rating>) -> String {
    match rating {
        Some(r) => format!("Confidence: {r}"),
        None => "Confidence: n/a".to_string(),
    }
}

/// Top-left corner for a box of `size` next to `anchor`: offset right/below,
/// flipped per axis when it would run past the viewport edge, then clamped.
pub fn place(anchor: Vec2, size: Vec2, viewport: Vec2, offset: f32, edge_margin: f32) -> Vec2 {
    let axis = |a: f32, s: f32, v: f32| {
        let mut p = a + offset;
        if p + s + edge_margin > v {
            p = a - s - offset;
        }
        p.min(v - s).max(0.0)
    };
    Vec2::new(
        axis(anchor.x, size.x, viewport.x),
        axis(anchor.y, size.y, viewport.y),
    )
}

#[derive(Clone, Debug, Default)]
pub struct Tooltip {
    visible: bool,
    marker_id: Option<String>,
    rating: Option<Rating>,
    header: String,
    body: String,
    anchor: Vec2,
    size: Vec2,
    viewport: Vec2,
    position: Vec2,
    offset: f32,
    edge_margin: f32,
}

impl Tooltip {
    pub fn new(offset: f32, edge_margin: f32) -> Self {
        Self {
            offset,
            edge_margin,
            ..Default::default()
        }
    }

    pub fn show(&mut self, marker: &Marker, anchor: Vec2, viewport: Vec2) {
        if self.marker_id.as_deref() != Some(marker.id.as_str()) || self.rating != marker.rating {
            self.header = header_text(&marker.id, &marker.title);
            self.body = body_text(marker.rating);
            self.marker_id = Some(marker.id.clone());
            self.rating = marker.rating;
        }
        self.visible = true;
        self.anchor = anchor;
        self.viewport = viewport;
        self.relayout();
    }

    /// Update the text in place when `marker` is the one being shown.
    pub fn refresh(&mut self, marker: &Marker) {
        if self.visible && self.marker_id.as_deref() == Some(marker.id.as_str()) {
            self.rating = marker.rating;
            self.body = body_text(marker.rating);
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.marker_id = None;
        self.rating = None;
    }

    /// Record the measured box size and re-place it.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size.max(Vec2::ZERO);
        self.relayout();
    }

    fn relayout(&mut self) {
        self.position = place(
            self.anchor,
            self.size,
            self.viewport,
            self.offset,
            self.edge_margin,
        );
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn marker_id(&self) -> Option<&str> {
        self.marker_id.as_deref()
    }

    pub fn rating(&self) -> Option<Rating> {
        self.rating
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_avoids_repeating_id() {
        assert_eq!(header_text("K1", "k1: Coaching models"), "k1: Coaching models");
        assert_eq!(header_text("K1", "Coaching models"), "K1 — Coaching models");
    }

    #[test]
    fn body_shows_na_when_unrated() {
        assert_eq!(body_text(None), "Confidence: n/a");
        assert_eq!(body_text(Some(Rating::new(4))), "Confidence: 4");
    }

    #[test]
    fn place_offsets_flips_and_clamps() {
        let vp = Vec2::new(800.0, 600.0);
        let size = Vec2::new(200.0, 50.0);
        assert_eq!(place(Vec2::new(100.0, 100.0), size, vp, 12.0, 16.0), Vec2::new(112.0, 112.0));
        // near the right edge: flipped to the left of the pointer
        assert_eq!(place(Vec2::new(700.0, 100.0), size, vp, 12.0, 16.0), Vec2::new(488.0, 112.0));
        // larger than the space on both sides: clamped to the viewport
        let p = place(Vec2::new(50.0, 580.0), Vec2::new(900.0, 50.0), vp, 12.0, 16.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 518.0);
    }
}
