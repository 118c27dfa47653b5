//! Input abstraction layer.
//!
//! Normalizes pointer and keyboard events from the host into a unified
//! `InputEvent` enum consumed by the interaction handler. Pointer
//! positions are already in canvas coordinates.

use canvas_core::CanvasPoint;
use serde::{Deserialize, Serialize};

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    /// Command on macOS, the platform "primary" modifier elsewhere.
    pub cmd: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
        cmd: false,
        ctrl: false,
    };

    pub const fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub const fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub const fn cmd() -> Self {
        Self {
            cmd: true,
            ..Self::NONE
        }
    }
}

/// Keys the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Tab,
    Enter,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(
            self,
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown
        )
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed.
    PointerDown { x: f32, y: f32, modifiers: Modifiers },

    /// Pointer moved. Only meaningful while a drag session is open.
    PointerMove { x: f32, y: f32, modifiers: Modifiers },

    /// Pointer released.
    PointerUp { x: f32, y: f32, modifiers: Modifiers },

    KeyDown { key: Key, modifiers: Modifiers },

    KeyUp { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_down(name: &str) -> Self {
        Self::KeyDown {
            key: Key::from_name(name),
            modifiers: Modifiers::NONE,
        }
    }

    /// Replace the modifier state.
    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        match self {
            Self::PointerDown { x, y, .. } => Self::PointerDown { x, y, modifiers },
            Self::PointerMove { x, y, .. } => Self::PointerMove { x, y, modifiers },
            Self::PointerUp { x, y, .. } => Self::PointerUp { x, y, modifiers },
            Self::KeyDown { key, .. } => Self::KeyDown { key, modifiers },
            Self::KeyUp { key, .. } => Self::KeyUp { key, modifiers },
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<CanvasPoint> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some(CanvasPoint::new(*x, *y)),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. } => *modifiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_position_extraction() {
        let evt = InputEvent::pointer_move(10.0, 20.0);
        assert_eq!(evt.position(), Some(CanvasPoint::new(10.0, 20.0)));
        assert_eq!(InputEvent::key_down("Escape").position(), None);
    }

    #[test]
    fn key_names() {
        assert_eq!(Key::from_name("ArrowUp"), Key::ArrowUp);
        assert!(Key::from_name("ArrowUp").is_arrow());
        assert_eq!(Key::from_name("z"), Key::Other("z".into()));
    }

    #[test]
    fn modifiers_carry_through() {
        let evt = InputEvent::pointer_down(0.0, 0.0).with_modifiers(Modifiers::alt());
        assert!(evt.modifiers().alt);
        assert!(!evt.modifiers().shift);
    }
}
