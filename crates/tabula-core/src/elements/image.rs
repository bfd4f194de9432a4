//! Image element.

use super::{
    ElementGeometry, ElementId, default_scale, default_visible, rotated_rect_aabb,
    rotated_rect_contains,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An image placed on the board. Pixel data lives behind the opaque
/// `source` reference; this element only knows its placement and size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageElement {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub position: Point,
    /// Display width. Zero until the image has loaded.
    pub width: f64,
    /// Display height. Zero until the image has loaded.
    pub height: f64,
    /// Original image width in pixels.
    pub natural_width: u32,
    /// Original image height in pixels.
    pub natural_height: u32,
    /// Opaque reference to the image data (URL or store key).
    pub source: String,
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

impl ImageElement {
    /// Create a new image element displayed at its natural size.
    pub fn new(position: Point, source: String, natural_width: u32, natural_height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: natural_width as f64,
            height: natural_height as f64,
            natural_width,
            natural_height,
            source,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index: 0,
            visible: true,
        }
    }

    /// Create a placeholder for an image whose data has not arrived yet.
    /// It occupies no area and is never hit until a size is set.
    pub fn placeholder(position: Point, source: String) -> Self {
        Self::new(position, source, 0, 0)
    }

    /// Set specific display dimensions.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Scale to fit within max dimensions while preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if self.natural_width == 0 || self.natural_height == 0 {
            return self;
        }
        let aspect = self.natural_width as f64 / self.natural_height as f64;
        let target_aspect = max_width / max_height;

        if aspect > target_aspect {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
        self
    }

    /// Whether the image has usable dimensions.
    pub fn is_loaded(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl ElementGeometry for ImageElement {
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
