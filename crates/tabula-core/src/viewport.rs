//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Identifier returned by [`Viewport::add_change_listener`].
pub type ListenerId = usize;

type ChangeListener = Box<dyn FnMut(&Viewport)>;

/// Viewport manages the view transform for the board.
///
/// It handles panning (translation) and zooming (scaling) operations,
/// converting between screen coordinates and canvas coordinates. The affine
/// transform is derived from `(offset, scale)` on every read; it is never
/// stored or updated independently.
#[derive(Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub scale: f64,
    /// Minimum allowed zoom level.
    pub min_scale: f64,
    /// Maximum allowed zoom level.
    pub max_scale: f64,
    #[serde(skip)]
    listeners: Vec<(ListenerId, ChangeListener)>,
    #[serde(skip)]
    next_listener_id: ListenerId,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("offset", &self.offset)
            .field("scale", &self.scale)
            .field("min_scale", &self.min_scale)
            .field("max_scale", &self.max_scale)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: 0.1,
            max_scale: 10.0,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts canvas coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to canvas coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to screen coordinates.
    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
        self.notify_listeners();
    }

    /// Zoom the viewport, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        // Convert screen point to canvas before the zoom
        let canvas_point = self.screen_to_canvas(screen_point);

        // Apply new scale
        self.scale = new_scale;

        // Adjust offset so canvas_point stays at screen_point
        let new_screen = self.canvas_to_screen(canvas_point);
        let correction = Vec2::new(
            screen_point.x - new_screen.x,
            screen_point.y - new_screen.y,
        );
        self.offset += correction;
        self.notify_listeners();
    }

    /// Reset viewport to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
        self.notify_listeners();
    }

    /// Fit the viewport to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport_size: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (viewport_size.width - padding * 2.0).max(1.0),
            (viewport_size.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.scale = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);

        // Center the bounds in the viewport
        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport_size.width / 2.0, viewport_size.height / 2.0);

        self.offset = Vec2::new(
            viewport_center.x - bounds_center.x * self.scale,
            viewport_center.y - bounds_center.y * self.scale,
        );
        self.notify_listeners();
    }

    /// Register a listener called synchronously after every state change.
    pub fn add_change_listener(&mut self, listener: impl FnMut(&Viewport) + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a previously registered change listener.
    pub fn remove_change_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// Invoke every listener once, after the mutation is fully applied.
    /// A panicking listener is isolated so the rest still run and the
    /// transform stays intact.
    fn notify_listeners(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        let state: &Viewport = self;
        for (id, listener) in listeners.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| listener(state))).is_err() {
                log::warn!("viewport change listener {id} panicked");
            }
        }
        self.listeners = listeners;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_identity() {
        let viewport = Viewport::new();
        let screen = Point::new(100.0, 200.0);
        let canvas = viewport.screen_to_canvas(screen);
        assert!((canvas.x - screen.x).abs() < f64::EPSILON);
        assert!((canvas.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_offset() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(50.0, 100.0);
        let canvas = viewport.screen_to_canvas(Point::new(100.0, 200.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_zoom() {
        let mut viewport = Viewport::new();
        viewport.scale = 2.0;
        let canvas = viewport.screen_to_canvas(Point::new(100.0, 200.0));
        assert!((canvas.x - 50.0).abs() < f64::EPSILON);
        assert!((canvas.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(30.0, -20.0);
        viewport.scale = 1.5;

        let original = Point::new(123.0, 456.0);
        let canvas = viewport.screen_to_canvas(original);
        let back = viewport.canvas_to_screen(canvas);

        assert!((back.x - original.x).abs() < 1e-6);
        assert!((back.y - original.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_anchoring() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(80.0, -40.0);
        viewport.scale = 1.25;

        let anchor = Point::new(320.0, 240.0);
        let canvas_before = viewport.screen_to_canvas(anchor);

        viewport.zoom_at(anchor, 1.7);

        let reprojected = viewport.canvas_to_screen(canvas_before);
        assert!((reprojected.x - anchor.x).abs() < 1e-6);
        assert!((reprojected.y - anchor.y).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_anchoring_while_clamped() {
        let mut viewport = Viewport::new();
        viewport.scale = 8.0;

        let anchor = Point::new(100.0, 100.0);
        let canvas_before = viewport.screen_to_canvas(anchor);

        // Factor pushes past max_scale; the clamped zoom must still anchor.
        viewport.zoom_at(anchor, 4.0);
        assert!((viewport.scale - viewport.max_scale).abs() < f64::EPSILON);

        let reprojected = viewport.canvas_to_screen(canvas_before);
        assert!((reprojected.x - anchor.x).abs() < 1e-6);
        assert!((reprojected.y - anchor.y).abs() < 1e-6);
    }

    #[test]
    fn test_scale_clamp() {
        let mut viewport = Viewport::new();
        for _ in 0..20 {
            viewport.zoom_at(Point::ZERO, 0.5);
        }
        assert!((viewport.scale - viewport.min_scale).abs() < f64::EPSILON);

        for _ in 0..40 {
            viewport.zoom_at(Point::ZERO, 2.0);
        }
        assert!((viewport.scale - viewport.max_scale).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new();
        viewport.pan(Vec2::new(10.0, 20.0));
        assert!((viewport.offset.x - 10.0).abs() < f64::EPSILON);
        assert!((viewport.offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_listener_notified_once_after_mutation() {
        let mut viewport = Viewport::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        viewport.add_change_listener(move |vp| {
            seen_clone.borrow_mut().push((vp.offset, vp.scale));
        });

        viewport.pan(Vec2::new(5.0, 0.0));
        viewport.zoom_at(Point::ZERO, 2.0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        // The listener observed fully-applied state each time.
        assert_eq!(seen[0], (Vec2::new(5.0, 0.0), 1.0));
        assert!((seen[1].1 - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_listener_removal() {
        let mut viewport = Viewport::new();
        let count = Rc::new(RefCell::new(0));
        let count_clone = Rc::clone(&count);
        let id = viewport.add_change_listener(move |_| {
            *count_clone.borrow_mut() += 1;
        });

        viewport.pan(Vec2::new(1.0, 0.0));
        viewport.remove_change_listener(id);
        viewport.pan(Vec2::new(1.0, 0.0));

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let mut viewport = Viewport::new();
        let count = Rc::new(RefCell::new(0));
        let count_clone = Rc::clone(&count);

        viewport.add_change_listener(|_| panic!("bad listener"));
        viewport.add_change_listener(move |_| {
            *count_clone.borrow_mut() += 1;
        });

        viewport.pan(Vec2::new(3.0, 4.0));

        // The second listener still ran and the transform is intact.
        assert_eq!(*count.borrow(), 1);
        assert!((viewport.offset.x - 3.0).abs() < f64::EPSILON);
        assert!((viewport.offset.y - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut viewport = Viewport::new();
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        viewport.fit_to_bounds(bounds, Size::new(800.0, 600.0), 50.0);

        // The bounds center lands on the viewport center.
        let center_on_screen = viewport.canvas_to_screen(bounds.center());
        assert!((center_on_screen.x - 400.0).abs() < 1e-6);
        assert!((center_on_screen.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_to_zero_area_resets() {
        let mut viewport = Viewport::new();
        viewport.pan(Vec2::new(100.0, 100.0));
        viewport.fit_to_bounds(Rect::ZERO, Size::new(800.0, 600.0), 50.0);
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
    }
}
