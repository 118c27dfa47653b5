//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Only the keys
//! that drive canvas interactions live here:
//! - Escape cancels the running interaction (or clears the selection)
//! - Enter commits it
//! - Tab / Shift+Tab cycle through the competing strategies
//! - Arrow keys nudge absolutely positioned elements (Shift = 10px)

use crate::input::{Key, Modifiers};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    CancelInteraction,
    CommitInteraction,
    /// Prefer the next competing strategy for the running session.
    CycleStrategy,
    CycleStrategyBack,
    /// Arrow key press; the key decides the direction.
    Nudge(Key),
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key press to an action. `None` if the combo is unbound.
    pub fn resolve(key: &Key, modifiers: Modifiers) -> Option<ShortcutAction> {
        // Cmd/Ctrl combos belong to the host application.
        if modifiers.cmd || modifiers.ctrl {
            return None;
        }
        match key {
            Key::Escape => Some(ShortcutAction::CancelInteraction),
            Key::Enter => Some(ShortcutAction::CommitInteraction),
            Key::Tab if modifiers.shift => Some(ShortcutAction::CycleStrategyBack),
            Key::Tab => Some(ShortcutAction::CycleStrategy),
            k if k.is_arrow() => Some(ShortcutAction::Nudge(k.clone())),
            _ => None,
        }
    }
}
