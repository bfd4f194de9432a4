//! Text element.

use super::{
    ElementGeometry, ElementId, default_scale, default_visible, rotated_rect_aabb,
    rotated_rect_contains,
};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-standing text element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextElement {
    pub(crate) id: ElementId,
    /// Top-left corner of the text bounding box.
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in canvas units.
    pub font_size: f64,
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

impl TextElement {
    /// Default font size.
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    /// Minimum width of the selectable box, so empty text stays clickable.
    const MIN_WIDTH: f64 = 20.0;

    /// Average glyph width as a fraction of the font size. Exact layout is
    /// the renderer's concern; this estimate only feeds hit-testing.
    const CHAR_WIDTH_FACTOR: f64 = 0.55;

    const LINE_HEIGHT_FACTOR: f64 = 1.2;

    /// Create a new text element.
    pub fn new(position: Point, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index: 0,
            visible: true,
        }
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Approximate width based on the widest line and font size.
    fn approximate_width(&self) -> f64 {
        let max_line_len = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        max_line_len as f64 * self.font_size * Self::CHAR_WIDTH_FACTOR
    }

    /// Approximate height based on font size and line count.
    fn approximate_height(&self) -> f64 {
        let line_count = self.content.lines().count().max(1);
        // lines() drops a trailing empty line
        let line_count = if self.content.ends_with('\n') {
            line_count + 1
        } else {
            line_count
        };
        line_count as f64 * self.font_size * Self::LINE_HEIGHT_FACTOR
    }

    /// Unscaled local size of the text box.
    pub(crate) fn local_size(&self) -> Size {
        Size::new(
            self.approximate_width().max(Self::MIN_WIDTH),
            self.approximate_height(),
        )
    }
}

impl ElementGeometry for TextElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounding_box(&self) -> Rect {
        let size = self.local_size();
        rotated_rect_aabb(
            self.position,
            size.width * self.scale_x,
            size.height * self.scale_y,
            self.rotation,
        )
    }

    fn contains_point(&self, point: Point, viewport_scale: f64) -> bool {
        let size = self.local_size();
        rotated_rect_contains(
            self.position,
            size.width * self.scale_x,
            size.height * self.scale_y,
            self.rotation,
            point,
            viewport_scale,
        )
    }
}
