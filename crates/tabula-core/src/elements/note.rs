//! Sticky note element.

use super::{
    ElementGeometry, ElementId, default_scale, default_visible, rotated_rect_aabb,
    rotated_rect_contains,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sticky note: a fixed-size colored card with short text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteElement {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub position: Point,
    /// Card width.
    pub width: f64,
    /// Card height.
    pub height: f64,
    /// The note text.
    pub content: String,
    /// Rotation angle in radians (around the centroid).
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl NoteElement {
    /// Default side length of a fresh note.
    pub const DEFAULT_SIZE: f64 = 160.0;

    /// Create a new empty note at the default size.
    pub fn new(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: Self::DEFAULT_SIZE,
            height: Self::DEFAULT_SIZE,
            content: String::new(),
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index: 0,
            visible: true,
        }
    }

    /// Set the note text.
    pub fn with_content(mut self, content: String) -> Self {
        self.content = content;
        self
    }
}

impl ElementGeometry for NoteElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounding_box(&self) -> Rect {
        rotated_rect_aabb(
            self.position,
            self.width * self.scale_x,
            self.height * self.scale_y,
            self.rotation,
        )
    }

    fn contains_point(&self, point: Point, viewport_scale: f64) -> bool {
        rotated_rect_contains(
            self.position,
            self.width * self.scale_x,
            self.height * self.scale_y,
            self.rotation,
            point,
            viewport_scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = NoteElement::new(Point::new(10.0, 10.0)).with_content("todo".to_string());
        assert_eq!(note.content, "todo");
        assert!((note.width - NoteElement::DEFAULT_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let note = NoteElement::new(Point::new(0.0, 0.0));
        assert!(note.contains_point(Point::new(80.0, 80.0), 1.0));
        assert!(!note.contains_point(Point::new(300.0, 80.0), 1.0));
    }

    #[test]
    fn test_degenerate_size() {
        let mut note = NoteElement::new(Point::new(0.0, 0.0));
        note.width = 0.0;
        assert!(note.bounding_box().is_zero_area());
        assert!(!note.contains_point(Point::new(0.0, 0.0), 1.0));
    }
}
