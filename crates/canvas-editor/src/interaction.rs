//! Translates input events into editor actions.
//!
//! The tool tracks just enough pointer state to tell a drag from a marquee
//! and to measure drags from their start point. Everything else (which
//! strategy runs, what the document looks like) is the dispatcher's job.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Press on element | Drag | Marquee |
//! |----------|------------------|------|---------|
//! | **Shift** | Toggle in selection | Axis-constrain | Add to selection |
//! | **Alt** | - | Duplicate | - |
//! | **Cmd** | - | No snapping | - |

use crate::dispatch::EditorAction;
use crate::input::{InputEvent, Key, Modifiers};
use crate::session::ActiveControl;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use canvas_core::{CanvasPoint, CanvasRect, ElementPath};

/// What the pointer landed on when it was pressed.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerTarget {
    /// A canvas control (resize handle, flow slider).
    Control(ActiveControl),
    Element(ElementPath),
    Empty,
}

#[derive(Debug, Default)]
pub struct InteractionTool {
    drag_start: Option<CanvasPoint>,
    marquee_start: Option<CanvasPoint>,
    /// Current marquee rectangle, normalized. Updated during drag.
    pub marquee_rect: Option<CanvasRect>,
    keyboard_active: bool,
}

fn normalize_rect(a: CanvasPoint, b: CanvasPoint) -> CanvasRect {
    CanvasRect::new(a.x.min(b.x), a.y.min(b.y), (b.x - a.x).abs(), (b.y - a.y).abs())
}

impl InteractionTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a pointer drag or keyboard nudge is in progress.
    pub fn is_interacting(&self) -> bool {
        self.drag_start.is_some() || self.keyboard_active
    }

    /// Handle an input event. `target` only matters for presses.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        target: &PointerTarget,
        selected: &[ElementPath],
    ) -> Vec<EditorAction> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                if self.is_interacting() {
                    return Vec::new();
                }
                let point = CanvasPoint::new(*x, *y);
                self.marquee_start = None;
                self.marquee_rect = None;
                match target {
                    PointerTarget::Control(control) => {
                        self.drag_start = Some(point);
                        vec![EditorAction::CreateDragSession {
                            start: point,
                            modifiers: *modifiers,
                            control: *control,
                        }]
                    }
                    PointerTarget::Element(path) => {
                        let mut actions = Vec::new();
                        if modifiers.shift {
                            let mut next = selected.to_vec();
                            match next.iter().position(|p| p == path) {
                                Some(pos) => {
                                    next.remove(pos);
                                }
                                None => next.push(path.clone()),
                            }
                            actions.push(EditorAction::SelectComponents(next));
                        } else if !selected.contains(path) {
                            actions.push(EditorAction::SelectComponents(vec![path.clone()]));
                        }
                        self.drag_start = Some(point);
                        actions.push(EditorAction::CreateDragSession {
                            start: point,
                            modifiers: *modifiers,
                            control: ActiveControl::BoundingArea,
                        });
                        actions
                    }
                    PointerTarget::Empty => {
                        self.marquee_start = Some(point);
                        self.marquee_rect = Some(normalize_rect(point, point));
                        if modifiers.shift {
                            Vec::new()
                        } else {
                            vec![EditorAction::SelectComponents(Vec::new())]
                        }
                    }
                }
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                let point = CanvasPoint::new(*x, *y);
                if let Some(start) = self.marquee_start {
                    self.marquee_rect = Some(normalize_rect(start, point));
                    return Vec::new();
                }
                match self.drag_start {
                    Some(start) => vec![EditorAction::UpdateDragSession {
                        drag: point - start,
                        modifiers: *modifiers,
                    }],
                    None => Vec::new(),
                }
            }
            InputEvent::PointerUp { modifiers, .. } => {
                self.marquee_start = None;
                if let Some(rect) = self.marquee_rect.take() {
                    return vec![EditorAction::SelectInRect {
                        rect,
                        add: modifiers.shift,
                    }];
                }
                match self.drag_start.take() {
                    Some(_) => vec![EditorAction::ClearInteractionSession {
                        apply_changes: true,
                    }],
                    None => Vec::new(),
                }
            }
            InputEvent::KeyDown { key, modifiers } => {
                let Some(action) = ShortcutMap::resolve(key, *modifiers) else {
                    return Vec::new();
                };
                self.handle_shortcut(action, *modifiers)
            }
            InputEvent::KeyUp { key, .. } => {
                if key.is_arrow() && self.keyboard_active {
                    self.keyboard_active = false;
                    return vec![EditorAction::ClearInteractionSession {
                        apply_changes: true,
                    }];
                }
                Vec::new()
            }
        }
    }

    fn handle_shortcut(
        &mut self,
        action: ShortcutAction,
        modifiers: Modifiers,
    ) -> Vec<EditorAction> {
        match action {
            ShortcutAction::CancelInteraction => {
                if self.end_interaction() {
                    vec![EditorAction::ClearInteractionSession {
                        apply_changes: false,
                    }]
                } else {
                    vec![EditorAction::SelectComponents(Vec::new())]
                }
            }
            ShortcutAction::CommitInteraction => {
                if self.end_interaction() {
                    vec![EditorAction::ClearInteractionSession {
                        apply_changes: true,
                    }]
                } else {
                    Vec::new()
                }
            }
            ShortcutAction::CycleStrategy => vec![EditorAction::CycleStrategy { forward: true }],
            ShortcutAction::CycleStrategyBack => {
                vec![EditorAction::CycleStrategy { forward: false }]
            }
            ShortcutAction::Nudge(key) => self.nudge(key, modifiers),
        }
    }

    fn nudge(&mut self, key: Key, modifiers: Modifiers) -> Vec<EditorAction> {
        if self.drag_start.is_some() {
            return Vec::new();
        }
        if self.keyboard_active {
            return vec![EditorAction::UpdateKeyboardSession { key, modifiers }];
        }
        self.keyboard_active = true;
        vec![EditorAction::CreateKeyboardSession { key, modifiers }]
    }

    /// Drop all pointer and keyboard state, e.g. after the dispatcher
    /// committed the session on its own.
    pub fn reset(&mut self) {
        self.end_interaction();
        self.marquee_start = None;
        self.marquee_rect = None;
    }

    /// Forget the running interaction. Returns whether there was one.
    fn end_interaction(&mut self) -> bool {
        let was_interacting = self.is_interacting();
        self.drag_start = None;
        self.keyboard_active = false;
        was_interacting
    }
}
