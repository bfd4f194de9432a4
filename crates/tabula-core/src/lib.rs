//! Tabula Core Library
//!
//! Platform-agnostic geometry and interaction logic for the Tabula whiteboard:
//! the view transform, element hit-testing, and the selection/manipulation
//! state machine. Rendering, persistence and UI chrome live elsewhere and
//! talk to this crate through the [`store::ElementStore`] seam.

pub mod elements;
pub mod handles;
pub mod input;
pub mod selection;
pub mod store;
pub mod tools;
pub mod viewport;

pub use elements::{Element, ElementGeometry, ElementId, ElementKind};
pub use handles::{Corner, Handle, HandleRole};
pub use input::{KeyEvent, Modifiers, PointerEvent, PointerKind};
pub use selection::{GesturePhase, SelectionManager};
pub use store::{ElementPatch, ElementStore, MemoryStore, StoreError, StoreEvent};
pub use tools::{Tool, ToolCtx, ToolDispatcher, ToolKind};
pub use viewport::Viewport;
