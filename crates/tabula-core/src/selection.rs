//! Selection set and the drag/resize/rotate state machine.

use crate::elements::{Element, ElementId};
use crate::handles::{self, Corner};
use crate::input::PointerKind;
use crate::store::{ElementPatch, ElementStore};
use kurbo::{Point, Vec2};
use std::collections::HashMap;

/// Minimum element size enforced during a resize, in canvas units.
pub const MIN_RESIZE_SIZE: f64 = 20.0;

/// Which manipulation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
    Resizing,
    Rotating,
}

#[derive(Debug, Clone)]
enum Gesture {
    Idle,
    Dragging {
        /// Last committed cursor position. Advanced on every update so the
        /// gesture accumulates per-step deltas instead of measuring from
        /// the original anchor.
        last_point: Point,
        /// Position of each selected element at the last committed step.
        origins: HashMap<ElementId, Point>,
    },
    Resizing {
        id: ElementId,
        corner: Corner,
        start_point: Point,
        start_position: Point,
        start_width: f64,
        start_height: f64,
    },
    Rotating {
        id: ElementId,
        /// Pivot: the element's bounding-box center at gesture start.
        centroid: Point,
        start_rotation: f64,
        /// Bearing of the gesture's own start vector, so the rotation is
        /// incremental and the element doesn't jump on the first update.
        start_angle: f64,
    },
}

/// Owns the selected-element set and the manipulation state machine.
/// Element state itself lives in the store; this type holds ids and
/// transient per-gesture snapshots only.
#[derive(Debug)]
pub struct SelectionManager {
    /// Insertion-ordered, unique.
    selected: Vec<ElementId>,
    gesture: Gesture,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionManager {
    /// Create a new selection manager with nothing selected.
    pub fn new() -> Self {
        Self {
            selected: Vec::new(),
            gesture: Gesture::Idle,
        }
    }

    /// The current gesture phase.
    pub fn phase(&self) -> GesturePhase {
        match self.gesture {
            Gesture::Idle => GesturePhase::Idle,
            Gesture::Dragging { .. } => GesturePhase::Dragging,
            Gesture::Resizing { .. } => GesturePhase::Resizing,
            Gesture::Rotating { .. } => GesturePhase::Rotating,
        }
    }

    /// Selected element ids in selection order.
    pub fn selected(&self) -> &[ElementId] {
        &self.selected
    }

    /// Resolve the selection against the store.
    pub fn selected_elements<'a>(&self, store: &'a dyn ElementStore) -> Vec<&'a Element> {
        self.selected
            .iter()
            .filter_map(|&id| store.element(id))
            .collect()
    }

    /// Check if an element is selected.
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    /// Select an element. `additive` appends to the selection instead of
    /// replacing it.
    pub fn select_element(&mut self, id: ElementId, additive: bool) {
        if !additive {
            self.selected.clear();
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
    }

    /// Remove an element from the selection.
    pub fn deselect(&mut self, id: ElementId) {
        self.selected.retain(|&selected| selected != id);
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Delete every selected element from the store and clear the
    /// selection.
    pub fn delete_selected(&mut self, store: &mut dyn ElementStore) {
        self.cancel();
        let count = self.selected.len();
        for id in std::mem::take(&mut self.selected) {
            store.remove_element(id);
        }
        if count > 0 {
            log::debug!("selection: deleted {count} elements");
        }
    }

    /// Begin a gesture at a canvas point. Resolution order: rotation handle,
    /// resize handle, element hit, empty space. First match wins, so
    /// overlapping hit regions resolve predictably.
    pub fn start_gesture(
        &mut self,
        store: &mut dyn ElementStore,
        point: Point,
        viewport_scale: f64,
        pointer: PointerKind,
        additive: bool,
    ) {
        // A new press supersedes a gesture that never saw its release.
        if !matches!(self.gesture, Gesture::Idle) {
            self.stop_gesture();
        }

        // Handles exist only for a single-element selection.
        if let [id] = self.selected[..] {
            if let Some(element) = store.element(id) {
                let bounds = element.bounding_box();

                if handles::hit_rotation_handle(bounds, point, viewport_scale, pointer).is_some() {
                    let centroid = bounds.center();
                    self.gesture = Gesture::Rotating {
                        id,
                        centroid,
                        start_rotation: element.rotation(),
                        start_angle: bearing(centroid, point),
                    };
                    log::debug!("selection: rotating {id}");
                    return;
                }

                if element.supports_resize() {
                    if let (Some(corner), Some(size)) = (
                        handles::hit_resize_handle(bounds, point, viewport_scale),
                        element.size(),
                    ) {
                        self.gesture = Gesture::Resizing {
                            id,
                            corner,
                            start_point: point,
                            start_position: element.position(),
                            start_width: size.width,
                            start_height: size.height,
                        };
                        log::debug!("selection: resizing {id} from {corner:?}");
                        return;
                    }
                }
            }
        }

        if let Some(hit) = store.element_at(point, viewport_scale, None) {
            // Pressing an already-selected element drags the whole
            // selection; pressing a new one selects it first.
            if !self.selected.contains(&hit) {
                self.select_element(hit, additive);
            }
            let origins = self
                .selected
                .iter()
                .filter_map(|&id| store.element(id).map(|e| (id, e.position())))
                .collect();
            self.gesture = Gesture::Dragging {
                last_point: point,
                origins,
            };
            log::debug!("selection: dragging {} elements", self.selected.len());
            return;
        }

        if !additive {
            self.clear_selection();
        }
    }

    /// Advance the active gesture to a new canvas point. No-op while idle.
    pub fn update_gesture(&mut self, store: &mut dyn ElementStore, point: Point) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Dragging { last_point, origins } => {
                let delta = point - *last_point;
                for (id, origin) in origins.iter_mut() {
                    let next = *origin + delta;
                    if store.update_element(*id, ElementPatch::position(next)).is_ok() {
                        // Re-anchor on the committed position so constrained
                        // or rounded store mutations can't accumulate drift.
                        *origin = next;
                    }
                }
                *last_point = point;
            }
            Gesture::Resizing {
                id,
                corner,
                start_point,
                start_position,
                start_width,
                start_height,
            } => {
                let delta = point - *start_point;
                let (position, width, height) =
                    resize_from_corner(*corner, *start_position, *start_width, *start_height, delta);
                let _ = store.update_element(
                    *id,
                    ElementPatch {
                        x: Some(position.x),
                        y: Some(position.y),
                        width: Some(width),
                        height: Some(height),
                        ..Default::default()
                    },
                );
            }
            Gesture::Rotating {
                id,
                centroid,
                start_rotation,
                start_angle,
            } => {
                let rotation = *start_rotation + (bearing(*centroid, point) - *start_angle);
                let _ = store.update_element(*id, ElementPatch::rotation(rotation));
            }
        }
    }

    /// End the active gesture, discarding all transient state. Mutations
    /// applied during the gesture are final; there is no rollback. No-op
    /// while idle.
    pub fn stop_gesture(&mut self) {
        if !matches!(self.gesture, Gesture::Idle) {
            log::trace!("selection: gesture ended");
            self.gesture = Gesture::Idle;
        }
    }

    /// Abort the active gesture mid-flight (tool switch, Escape). Same
    /// cleanup as [`Self::stop_gesture`]: snapshots are discarded and no
    /// further mutation is committed.
    pub fn cancel(&mut self) {
        self.stop_gesture();
    }
}

/// Bearing of `point` as seen from `origin`.
fn bearing(origin: Point, point: Point) -> f64 {
    (point.y - origin.y).atan2(point.x - origin.x)
}

/// Corner-anchored resize. The returned position is derived from the final
/// clamped size so the corner opposite the handle stays fixed even when
/// the minimum size floor kicks in.
fn resize_from_corner(
    corner: Corner,
    start_position: Point,
    start_width: f64,
    start_height: f64,
    delta: Vec2,
) -> (Point, f64, f64) {
    let (raw_width, raw_height) = match corner {
        Corner::TopLeft => (start_width - delta.x, start_height - delta.y),
        Corner::TopRight => (start_width + delta.x, start_height - delta.y),
        Corner::BottomLeft => (start_width - delta.x, start_height + delta.y),
        Corner::BottomRight => (start_width + delta.x, start_height + delta.y),
    };
    let width = raw_width.max(MIN_RESIZE_SIZE);
    let height = raw_height.max(MIN_RESIZE_SIZE);

    let x = match corner {
        Corner::TopLeft | Corner::BottomLeft => start_position.x + start_width - width,
        Corner::TopRight | Corner::BottomRight => start_position.x,
    };
    let y = match corner {
        Corner::TopLeft | Corner::TopRight => start_position.y + start_height - height,
        Corner::BottomLeft | Corner::BottomRight => start_position.y,
    };
    (Point::new(x, y), width, height)
}
