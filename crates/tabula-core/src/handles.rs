//! Manipulation handles derived from an element's bounding box.

use crate::input::PointerKind;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Half-extent of a resize handle's hit box, in screen pixels.
pub const RESIZE_HANDLE_HIT_PX: f64 = 6.0;
/// Inner radius of the rotation ring around each corner, in screen pixels.
/// Chosen to clear the resize hit box so both stay reachable.
pub const ROTATE_RING_INNER_PX: f64 = 7.0;
/// Outer radius of the rotation ring, in screen pixels.
pub const ROTATE_RING_OUTER_PX: f64 = 18.0;
/// Distance of the rendered rotation handle outside the corner, in screen
/// pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 14.0;
/// Touch targets are probed at the rendered handle position with this
/// radius, larger than the mouse ring so fingers land reliably.
pub const TOUCH_ROTATE_RADIUS_PX: f64 = 22.0;

/// Corner identifier for a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners, in a fixed probing order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The corner's position on a bounding box.
    pub fn point(&self, bounds: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(bounds.x0, bounds.y0),
            Corner::TopRight => Point::new(bounds.x1, bounds.y0),
            Corner::BottomLeft => Point::new(bounds.x0, bounds.y1),
            Corner::BottomRight => Point::new(bounds.x1, bounds.y1),
        }
    }

    /// Unit vector pointing diagonally away from the box.
    pub fn outward(&self) -> Vec2 {
        let d = std::f64::consts::FRAC_1_SQRT_2;
        match self {
            Corner::TopLeft => Vec2::new(-d, -d),
            Corner::TopRight => Vec2::new(d, -d),
            Corner::BottomLeft => Vec2::new(-d, d),
            Corner::BottomRight => Vec2::new(d, d),
        }
    }
}

/// What dragging a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    Resize,
    Rotate,
}

/// A handle with its derived position. Handles are computed from a bounding
/// box on demand and never stored.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub corner: Corner,
    pub role: HandleRole,
    /// Position in canvas coordinates.
    pub position: Point,
}

/// Canvas-space position of the rendered rotation handle for a corner.
pub fn rotation_handle_position(bounds: Rect, corner: Corner, viewport_scale: f64) -> Point {
    let offset = ROTATE_HANDLE_OFFSET_PX / viewport_scale.max(1e-6);
    corner.point(bounds) + corner.outward() * offset
}

/// All handles for a selected element's bounding box: four resize squares
/// on the corners and four rotation handles floating outside them.
pub fn handles(bounds: Rect, viewport_scale: f64) -> Vec<Handle> {
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(8);
    for corner in Corner::ALL {
        result.push(Handle {
            corner,
            role: HandleRole::Resize,
            position: corner.point(bounds),
        });
    }
    for corner in Corner::ALL {
        result.push(Handle {
            corner,
            role: HandleRole::Rotate,
            position: rotation_handle_position(bounds, corner, viewport_scale),
        });
    }
    result
}

/// Find the resize handle under a canvas point, if any. Handles are small
/// squares centered exactly on the bounding-box corners; any matching
/// corner wins.
pub fn hit_resize_handle(bounds: Rect, point: Point, viewport_scale: f64) -> Option<Corner> {
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }
    let half = RESIZE_HANDLE_HIT_PX / viewport_scale.max(1e-6);
    for corner in Corner::ALL {
        let at = corner.point(bounds);
        if (point.x - at.x).abs() <= half && (point.y - at.y).abs() <= half {
            return Some(corner);
        }
    }
    None
}

/// Find the rotation handle under a canvas point, if any.
///
/// Mouse input probes an annular ring around each corner, so the resize
/// square in the ring's hole stays reachable. Touch input probes a disc at
/// the rendered handle position outside the box, giving a larger target
/// spatially separated from the resize handles.
pub fn hit_rotation_handle(
    bounds: Rect,
    point: Point,
    viewport_scale: f64,
    pointer: PointerKind,
) -> Option<Corner> {
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return None;
    }
    let scale = viewport_scale.max(1e-6);
    for corner in Corner::ALL {
        let hit = match pointer {
            PointerKind::Mouse => {
                let dist = (point - corner.point(bounds)).hypot();
                dist > ROTATE_RING_INNER_PX / scale && dist <= ROTATE_RING_OUTER_PX / scale
            }
            PointerKind::Touch => {
                let center = rotation_handle_position(bounds, corner, viewport_scale);
                (point - center).hypot() <= TOUCH_ROTATE_RADIUS_PX / scale
            }
        };
        if hit {
            return Some(corner);
        }
    }
    None
}
