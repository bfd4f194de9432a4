//! Normalized input events for mouse/touch/keyboard.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Which device produced a pointer event. Touch input gets larger handle
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer event, normalized from platform mouse/touch events. Positions
/// are in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    /// The event's common payload.
    pub fn parts(&self) -> (Point, PointerKind, Modifiers) {
        match *self {
            PointerEvent::Down {
                position,
                pointer,
                modifiers,
            }
            | PointerEvent::Move {
                position,
                pointer,
                modifiers,
            }
            | PointerEvent::Up {
                position,
                pointer,
                modifiers,
            } => (position, pointer, modifiers),
        }
    }

    /// Mouse press with no modifiers held.
    pub fn mouse_down(position: Point) -> Self {
        PointerEvent::Down {
            position,
            pointer: PointerKind::Mouse,
            modifiers: Modifiers::default(),
        }
    }

    pub fn mouse_move(position: Point) -> Self {
        PointerEvent::Move {
            position,
            pointer: PointerKind::Mouse,
            modifiers: Modifiers::default(),
        }
    }

    pub fn mouse_up(position: Point) -> Self {
        PointerEvent::Up {
            position,
            pointer: PointerKind::Mouse,
            modifiers: Modifiers::default(),
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}
