//! Element store abstraction and in-memory implementation.

use crate::elements::{Element, ElementId, ElementKind};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("element not found: {0}")]
    NotFound(ElementId),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification emitted after a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Added(ElementId),
    Updated(ElementId),
    Removed(ElementId),
}

/// Identifier returned by [`ElementStore::subscribe`].
pub type SubscriberId = usize;

/// Boxed store-change listener.
pub type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Partial update for an element. Unset fields are left untouched; fields
/// that don't apply to the element's kind are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub z_index: Option<i64>,
    pub visible: Option<bool>,
    pub content: Option<String>,
}

impl ElementPatch {
    /// Patch that moves an element.
    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Default::default()
        }
    }

    /// Patch that rotates an element.
    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }
}

/// The element store seam. The canonical element list is owned behind this
/// trait; interaction code holds ids and transient snapshots, never a
/// second copy of authoritative state. The remote mirror plugs in here.
pub trait ElementStore {
    /// All elements, back to front.
    fn elements(&self) -> Vec<&Element>;

    /// Look up a single element.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// Hit test the board at a canvas point, front to back. Invisible
    /// elements are skipped. When `preferred` is given and several
    /// elements overlap, the front-most element of that kind wins over
    /// nearer elements of other kinds, so repeated selection of a shape
    /// under others stays stable.
    fn element_at(
        &self,
        point: Point,
        viewport_scale: f64,
        preferred: Option<ElementKind>,
    ) -> Option<ElementId>;

    /// Add an element and return its id. The store assigns the stacking
    /// position (new elements land on top).
    fn add_element(&mut self, element: Element) -> ElementId;

    /// Remove an element, returning it if present.
    fn remove_element(&mut self, id: ElementId) -> Option<Element>;

    /// Apply a partial update to an element.
    fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> StoreResult<()>;

    /// Register a listener for store mutations.
    fn subscribe(&mut self, listener: Subscriber) -> SubscriberId;

    /// Remove a previously registered listener.
    fn unsubscribe(&mut self, id: SubscriberId);
}

/// Serialized board contents.
#[derive(Serialize, Deserialize)]
struct BoardDocument {
    elements: Vec<Element>,
}

/// In-memory element store. Serves as local state for a single board and
/// as the test double for the remote-backed store.
#[derive(Default)]
pub struct MemoryStore {
    elements: HashMap<ElementId, Element>,
    next_z: i64,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_subscriber_id: SubscriberId,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Raise an element above everything else.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let top = self.next_z;
        if let Some(element) = self.elements.get_mut(&id) {
            element.set_z_index(top);
            self.next_z += 1;
            self.notify(StoreEvent::Updated(id));
            true
        } else {
            false
        }
    }

    /// Push an element below everything else.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        let bottom = self
            .elements
            .values()
            .map(Element::z_index)
            .min()
            .unwrap_or(0)
            - 1;
        if let Some(element) = self.elements.get_mut(&id) {
            element.set_z_index(bottom);
            self.notify(StoreEvent::Updated(id));
            true
        } else {
            false
        }
    }

    /// Union of all element bounding boxes.
    pub fn content_bounds(&self) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        for element in self.elements.values() {
            let bounds = element.bounding_box();
            result = Some(match result {
                Some(r) => r.union(bounds),
                None => bounds,
            });
        }
        result
    }

    /// Serialize the board to JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        let document = BoardDocument {
            elements: self.ordered().into_iter().cloned().collect(),
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Rebuild a board from JSON.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let document: BoardDocument =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let next_z = document
            .elements
            .iter()
            .map(Element::z_index)
            .max()
            .map_or(0, |z| z + 1);
        let elements = document
            .elements
            .into_iter()
            .map(|e| (e.id(), e))
            .collect();
        Ok(Self {
            elements,
            next_z,
            subscribers: Vec::new(),
            next_subscriber_id: 0,
        })
    }

    /// Elements sorted back to front.
    fn ordered(&self) -> Vec<&Element> {
        let mut elements: Vec<&Element> = self.elements.values().collect();
        elements.sort_by_key(|e| (e.z_index(), e.id()));
        elements
    }

    fn notify(&mut self, event: StoreEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for (_, subscriber) in subscribers.iter_mut() {
            subscriber(&event);
        }
        self.subscribers = subscribers;
    }
}

impl ElementStore for MemoryStore {
    fn elements(&self) -> Vec<&Element> {
        self.ordered()
    }

    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn element_at(
        &self,
        point: Point,
        viewport_scale: f64,
        preferred: Option<ElementKind>,
    ) -> Option<ElementId> {
        let mut first_hit = None;
        for element in self.ordered().into_iter().rev() {
            if !element.visible() || !element.contains_point(point, viewport_scale) {
                continue;
            }
            if Some(element.kind()) == preferred {
                return Some(element.id());
            }
            first_hit.get_or_insert(element.id());
            if preferred.is_none() {
                break;
            }
        }
        first_hit
    }

    fn add_element(&mut self, mut element: Element) -> ElementId {
        element.set_z_index(self.next_z);
        self.next_z += 1;
        let id = element.id();
        self.elements.insert(id, element);
        log::debug!("store: added element {id}");
        self.notify(StoreEvent::Added(id));
        id
    }

    fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id);
        if removed.is_some() {
            log::debug!("store: removed element {id}");
            self.notify(StoreEvent::Removed(id));
        }
        removed
    }

    fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> StoreResult<()> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        if patch.x.is_some() || patch.y.is_some() {
            let mut position = element.position();
            if let Some(x) = patch.x {
                position.x = x;
            }
            if let Some(y) = patch.y {
                position.y = y;
            }
            element.set_position(position);
        }
        if patch.width.is_some() || patch.height.is_some() {
            if let Some(size) = element.size() {
                element.set_size(
                    patch.width.unwrap_or(size.width),
                    patch.height.unwrap_or(size.height),
                );
            }
        }
        if let Some(rotation) = patch.rotation {
            element.set_rotation(rotation);
        }
        if patch.scale_x.is_some() || patch.scale_y.is_some() {
            let scale = element.scale();
            element.set_scale(
                patch.scale_x.unwrap_or(scale.x),
                patch.scale_y.unwrap_or(scale.y),
            );
        }
        if let Some(z_index) = patch.z_index {
            element.set_z_index(z_index);
        }
        if let Some(visible) = patch.visible {
            element.set_visible(visible);
        }
        if let Some(content) = patch.content {
            element.set_content(content);
        }

        self.notify(StoreEvent::Updated(id));
        Ok(())
    }

    fn subscribe(&mut self, listener: Subscriber) -> SubscriberId {
        let id = self.next_subscriber_id;
        self.next_subscriber_id += 1;
        self.subscribers.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }
}
