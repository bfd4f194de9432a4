//! Element definitions for the board.

mod drawing;
mod image;
mod note;
mod text;

pub use drawing::DrawingElement;
pub use image::ImageElement;
pub use note::NoteElement;
pub use text::TextElement;

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Base hit tolerance in screen pixels.
pub const HIT_TOLERANCE_PX: f64 = 6.0;
/// Zoom level below which the pixel tolerance starts growing.
pub const LOW_ZOOM_THRESHOLD: f64 = 0.5;
/// Cap on the grown pixel tolerance, so hit regions of neighbouring
/// elements don't merge when zoomed far out.
pub const MAX_HIT_TOLERANCE_PX: f64 = 24.0;

/// Convert the screen-pixel hit tolerance into canvas units for a zoom
/// level. The pixel margin is constant above [`LOW_ZOOM_THRESHOLD`] and
/// grows linearly below it (tunable, not load-bearing).
pub fn hit_tolerance(viewport_scale: f64) -> f64 {
    let scale = viewport_scale.max(1e-6);
    let mut px = HIT_TOLERANCE_PX;
    if scale < LOW_ZOOM_THRESHOLD {
        px = (HIT_TOLERANCE_PX * LOW_ZOOM_THRESHOLD / scale).min(MAX_HIT_TOLERANCE_PX);
    }
    px / scale
}

pub(crate) fn default_scale() -> f64 {
    1.0
}

pub(crate) fn default_visible() -> bool {
    true
}

/// Rotate `point` around `center` by `angle` radians.
pub fn rotate_about(center: Point, point: Point, angle: f64) -> Point {
    let (sin_a, cos_a) = angle.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point::new(
        center.x + dx * cos_a - dy * sin_a,
        center.y + dx * sin_a + dy * cos_a,
    )
}

/// Axis-aligned bounding box of a scaled local rectangle rotated about its
/// centre. Rotation is applied to the four corners and the result swept,
/// not approximated by inflating the unrotated box.
pub(crate) fn rotated_rect_aabb(position: Point, width: f64, height: f64, rotation: f64) -> Rect {
    if width <= 0.0 || height <= 0.0 {
        return Rect::new(position.x, position.y, position.x, position.y);
    }
    let rect = Rect::new(position.x, position.y, position.x + width, position.y + height);
    if rotation == 0.0 {
        return rect;
    }
    let center = rect.center();
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for corner in corners {
        let rotated = rotate_about(center, corner, rotation);
        min_x = min_x.min(rotated.x);
        min_y = min_y.min(rotated.y);
        max_x = max_x.max(rotated.x);
        max_y = max_y.max(rotated.y);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Containment test for a scaled local rectangle rotated about its centre.
/// The point is mapped into the unrotated frame, then tested against the
/// rectangle inflated by the zoom-compensated hit tolerance.
pub(crate) fn rotated_rect_contains(
    position: Point,
    width: f64,
    height: f64,
    rotation: f64,
    point: Point,
    viewport_scale: f64,
) -> bool {
    if width <= 0.0 || height <= 0.0 {
        return false;
    }
    let rect = Rect::new(position.x, position.y, position.x + width, position.y + height);
    let local = if rotation == 0.0 {
        point
    } else {
        rotate_about(rect.center(), point, -rotation)
    };
    let tolerance = hit_tolerance(viewport_scale);
    rect.inflate(tolerance, tolerance).contains(local)
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

/// Minimum distance from a point to a polyline (connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Geometry capability every element kind implements. All other components
/// reason about an element's shape only through these two operations.
pub trait ElementGeometry {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Axis-aligned bounding box in canvas coordinates, tight enough to
    /// contain the rotated/scaled shape.
    fn bounding_box(&self) -> Rect;

    /// Hit test a canvas-space point. `viewport_scale` converts the
    /// screen-pixel hit tolerance into canvas units so the clickable
    /// margin stays visually constant across zoom levels.
    fn contains_point(&self, point: Point, viewport_scale: f64) -> bool;
}

/// Element kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Text,
    Image,
    Note,
    Drawing,
}

/// Enum wrapper for all element kinds (for serialization and dispatch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
    Note(NoteElement),
    Drawing(DrawingElement),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Text(e) => e.id(),
            Element::Image(e) => e.id(),
            Element::Note(e) => e.id(),
            Element::Drawing(e) => e.id(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Text(_) => ElementKind::Text,
            Element::Image(_) => ElementKind::Image,
            Element::Note(_) => ElementKind::Note,
            Element::Drawing(_) => ElementKind::Drawing,
        }
    }

    pub fn bounding_box(&self) -> Rect {
        match self {
            Element::Text(e) => e.bounding_box(),
            Element::Image(e) => e.bounding_box(),
            Element::Note(e) => e.bounding_box(),
            Element::Drawing(e) => e.bounding_box(),
        }
    }

    pub fn contains_point(&self, point: Point, viewport_scale: f64) -> bool {
        match self {
            Element::Text(e) => e.contains_point(point, viewport_scale),
            Element::Image(e) => e.contains_point(point, viewport_scale),
            Element::Note(e) => e.contains_point(point, viewport_scale),
            Element::Drawing(e) => e.contains_point(point, viewport_scale),
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Element::Text(e) => e.position,
            Element::Image(e) => e.position,
            Element::Note(e) => e.position,
            Element::Drawing(e) => e.position,
        }
    }

    pub fn set_position(&mut self, position: Point) {
        match self {
            Element::Text(e) => e.position = position,
            Element::Image(e) => e.position = position,
            Element::Note(e) => e.position = position,
            Element::Drawing(e) => e.position = position,
        }
    }

    /// Rotation angle in radians, applied about the element's centroid.
    pub fn rotation(&self) -> f64 {
        match self {
            Element::Text(e) => e.rotation,
            Element::Image(e) => e.rotation,
            Element::Note(e) => e.rotation,
            Element::Drawing(e) => e.rotation,
        }
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        match self {
            Element::Text(e) => e.rotation = rotation,
            Element::Image(e) => e.rotation = rotation,
            Element::Note(e) => e.rotation = rotation,
            Element::Drawing(e) => e.rotation = rotation,
        }
    }

    pub fn scale(&self) -> Vec2 {
        match self {
            Element::Text(e) => Vec2::new(e.scale_x, e.scale_y),
            Element::Image(e) => Vec2::new(e.scale_x, e.scale_y),
            Element::Note(e) => Vec2::new(e.scale_x, e.scale_y),
            Element::Drawing(e) => Vec2::new(e.scale_x, e.scale_y),
        }
    }

    pub fn set_scale(&mut self, scale_x: f64, scale_y: f64) {
        match self {
            Element::Text(e) => {
                e.scale_x = scale_x;
                e.scale_y = scale_y;
            }
            Element::Image(e) => {
                e.scale_x = scale_x;
                e.scale_y = scale_y;
            }
            Element::Note(e) => {
                e.scale_x = scale_x;
                e.scale_y = scale_y;
            }
            Element::Drawing(e) => {
                e.scale_x = scale_x;
                e.scale_y = scale_y;
            }
        }
    }

    pub fn z_index(&self) -> i64 {
        match self {
            Element::Text(e) => e.z_index,
            Element::Image(e) => e.z_index,
            Element::Note(e) => e.z_index,
            Element::Drawing(e) => e.z_index,
        }
    }

    pub fn set_z_index(&mut self, z_index: i64) {
        match self {
            Element::Text(e) => e.z_index = z_index,
            Element::Image(e) => e.z_index = z_index,
            Element::Note(e) => e.z_index = z_index,
            Element::Drawing(e) => e.z_index = z_index,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            Element::Text(e) => e.visible,
            Element::Image(e) => e.visible,
            Element::Note(e) => e.visible,
            Element::Drawing(e) => e.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            Element::Text(e) => e.visible = visible,
            Element::Image(e) => e.visible = visible,
            Element::Note(e) => e.visible = visible,
            Element::Drawing(e) => e.visible = visible,
        }
    }

    /// Intrinsic size for kinds with explicit width/height fields.
    pub fn size(&self) -> Option<Size> {
        match self {
            Element::Image(e) => Some(Size::new(e.width, e.height)),
            Element::Note(e) => Some(Size::new(e.width, e.height)),
            Element::Text(_) | Element::Drawing(_) => None,
        }
    }

    /// Set the intrinsic size. No-op for kinds without width/height fields.
    pub fn set_size(&mut self, width: f64, height: f64) {
        match self {
            Element::Image(e) => {
                e.width = width;
                e.height = height;
            }
            Element::Note(e) => {
                e.width = width;
                e.height = height;
            }
            Element::Text(_) | Element::Drawing(_) => {}
        }
    }

    /// Check if this element kind supports handle resize.
    pub fn supports_resize(&self) -> bool {
        matches!(self, Element::Image(_))
    }

    /// Set the text content. No-op for kinds without content.
    pub fn set_content(&mut self, content: String) {
        match self {
            Element::Text(e) => e.content = content,
            Element::Note(e) => e.content = content,
            Element::Image(_) | Element::Drawing(_) => {}
        }
    }
}
