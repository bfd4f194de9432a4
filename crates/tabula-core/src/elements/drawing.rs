//! Freehand drawing element.

use super::{
    ElementGeometry, ElementId, default_scale, default_visible, hit_tolerance,
    point_to_polyline_dist, rotate_about,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke. Points are stored relative to `position`, so moving
/// the element only touches `position`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingElement {
    pub(crate) id: ElementId,
    /// Canvas-space origin of the stroke.
    pub position: Point,
    /// Stroke points in local coordinates.
    pub points: Vec<Point>,
    /// Stroke width in canvas units.
    pub stroke_width: f64,
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

impl DrawingElement {
    /// Default stroke width.
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    /// Create a new empty drawing.
    pub fn new(position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            points: Vec::new(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index: 0,
            visible: true,
        }
    }

    /// Build a drawing from canvas-space points. The element origin becomes
    /// the top-left of the point sweep and the points are re-expressed
    /// relative to it.
    pub fn from_canvas_points(points: Vec<Point>, stroke_width: f64) -> Self {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        for point in &points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
        }
        if points.is_empty() {
            min_x = 0.0;
            min_y = 0.0;
        }
        let origin = Point::new(min_x, min_y);
        let local = points
            .into_iter()
            .map(|p| Point::new(p.x - origin.x, p.y - origin.y))
            .collect();
        Self {
            id: Uuid::new_v4(),
            position: origin,
            points: local,
            stroke_width,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            z_index: 0,
            visible: true,
        }
    }

    /// Append a local-space point.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Simplify the stroke with Ramer-Douglas-Peucker.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 {
            return;
        }
        self.points = rdp_simplify(&self.points, tolerance);
    }

    /// Points in canvas space before rotation is applied.
    fn scaled_points(&self) -> Vec<Point> {
        self.points
            .iter()
            .map(|p| {
                Point::new(
                    self.position.x + p.x * self.scale_x,
                    self.position.y + p.y * self.scale_y,
                )
            })
            .collect()
    }

    /// Bounding box of the scaled, unrotated stroke.
    fn unrotated_bounds(&self) -> Option<Rect> {
        let points = self.scaled_points();
        let first = *points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Rect::new(min_x, min_y, max_x, max_y))
    }
}

/// Ramer-Douglas-Peucker polyline simplification.
fn rdp_simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);
        // drop the duplicated junction point
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(point: Point, line_start: Point, line_end: Point) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let line_len_sq = dx * dx + dy * dy;
    if line_len_sq < f64::EPSILON {
        let px = point.x - line_start.x;
        let py = point.y - line_start.y;
        return (px * px + py * py).sqrt();
    }
    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / line_len_sq.sqrt()
}

impl ElementGeometry for DrawingElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn bounding_box(&self) -> Rect {
        let Some(bounds) = self.unrotated_bounds() else {
            return Rect::new(self.position.x, self.position.y, self.position.x, self.position.y);
        };
        if self.rotation == 0.0 {
            return bounds;
        }
        let center = bounds.center();
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for point in self.scaled_points() {
            let rotated = rotate_about(center, point, self.rotation);
            min_x = min_x.min(rotated.x);
            min_y = min_y.min(rotated.y);
            max_x = max_x.max(rotated.x);
            max_y = max_y.max(rotated.y);
        }
        Rect::new(min_x, min_y, max_x, max_y)
    }

    fn contains_point(&self, point: Point, viewport_scale: f64) -> bool {
        let Some(bounds) = self.unrotated_bounds() else {
            return false;
        };
        let tolerance = hit_tolerance(viewport_scale) + self.stroke_width / 2.0;
        // Map the probe into the unrotated frame instead of rotating every
        // stroke point.
        let local = if self.rotation == 0.0 {
            point
        } else {
            rotate_about(bounds.center(), point, -self.rotation)
        };

        let points = self.scaled_points();
        if points.len() < 2 {
            let only = points[0];
            let dx = local.x - only.x;
            let dy = local.y - only.y;
            return (dx * dx + dy * dy).sqrt() <= tolerance;
        }
        point_to_polyline_dist(local, &points) <= tolerance
    }
}
