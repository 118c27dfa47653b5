//! Interaction sessions.
//!
//! A session is the record of one ongoing gesture: where the drag started,
//! how far it has gone, which control was grabbed, and the metadata
//! snapshot that was current when it began. Sessions are values; every
//! update returns a new one and the starting snapshot never changes.

use crate::config::EngineConfig;
use crate::input::{Key, Modifiers};
use crate::strategies::StrategyId;
use canvas_core::{
    AllElementProps, CanvasPoint, CanvasVector, EdgePosition, ElementInstanceMetadataMap,
    ElementPath,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Which canvas control the gesture started on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveControl {
    BoundingArea,
    ResizeHandle(EdgePosition),
    FlowSlider,
    KeyboardCatcher,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragInteractionData {
    pub drag_start: CanvasPoint,
    /// Accumulated drag; `None` until the pointer first moves.
    pub drag: Option<CanvasVector>,
    pub prev_drag: Option<CanvasVector>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyState {
    pub key: Key,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyboardInteractionData {
    /// Every key press of the session, in order.
    pub key_states: Vec<KeyState>,
}

impl KeyboardInteractionData {
    /// Total movement requested by the arrow keys pressed so far.
    pub fn accumulated_movement(&self, config: &EngineConfig) -> CanvasVector {
        self.key_states
            .iter()
            .fold(CanvasVector::zero(), |acc, state| {
                let step = if state.modifiers.shift {
                    config.keyboard_nudge_shift
                } else {
                    config.keyboard_nudge
                };
                let delta = match state.key {
                    Key::ArrowLeft => CanvasVector::new(-step, 0.0),
                    Key::ArrowRight => CanvasVector::new(step, 0.0),
                    Key::ArrowUp => CanvasVector::new(0.0, -step),
                    Key::ArrowDown => CanvasVector::new(0.0, step),
                    _ => CanvasVector::zero(),
                };
                acc + delta
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    Drag(DragInteractionData),
    Keyboard(KeyboardInteractionData),
}

/// Where the reconciler is in the interaction lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// A session exists but no strategy has been applied yet.
    Active,
    StrategyActive,
}

#[derive(Debug, Clone)]
pub struct InteractionSession {
    pub interaction_data: InteractionData,
    pub active_control: ActiveControl,
    /// Old path → new path for elements whose path changed mid-gesture
    /// (reparent, duplicate).
    pub updated_target_paths: BTreeMap<ElementPath, ElementPath>,
    pub starting_metadata: Arc<ElementInstanceMetadataMap>,
    pub starting_all_element_props: Arc<AllElementProps>,
    pub latest_metadata: Arc<ElementInstanceMetadataMap>,
    pub latest_all_element_props: Arc<AllElementProps>,
    pub user_preferred_strategy: Option<StrategyId>,
}

impl InteractionSession {
    pub fn new_drag(
        start: CanvasPoint,
        modifiers: Modifiers,
        active_control: ActiveControl,
        metadata: Arc<ElementInstanceMetadataMap>,
        props: Arc<AllElementProps>,
    ) -> Self {
        Self {
            interaction_data: InteractionData::Drag(DragInteractionData {
                drag_start: start,
                drag: None,
                prev_drag: None,
                modifiers,
            }),
            active_control,
            updated_target_paths: BTreeMap::new(),
            starting_metadata: Arc::clone(&metadata),
            starting_all_element_props: Arc::clone(&props),
            latest_metadata: metadata,
            latest_all_element_props: props,
            user_preferred_strategy: None,
        }
    }

    pub fn new_keyboard(
        key: Key,
        modifiers: Modifiers,
        metadata: Arc<ElementInstanceMetadataMap>,
        props: Arc<AllElementProps>,
    ) -> Self {
        Self {
            interaction_data: InteractionData::Keyboard(KeyboardInteractionData {
                key_states: vec![KeyState { key, modifiers }],
            }),
            active_control: ActiveControl::KeyboardCatcher,
            updated_target_paths: BTreeMap::new(),
            starting_metadata: Arc::clone(&metadata),
            starting_all_element_props: Arc::clone(&props),
            latest_metadata: metadata,
            latest_all_element_props: props,
            user_preferred_strategy: None,
        }
    }

    pub fn drag_data(&self) -> Option<&DragInteractionData> {
        match &self.interaction_data {
            InteractionData::Drag(drag) => Some(drag),
            InteractionData::Keyboard(_) => None,
        }
    }

    pub fn keyboard_data(&self) -> Option<&KeyboardInteractionData> {
        match &self.interaction_data {
            InteractionData::Keyboard(keys) => Some(keys),
            InteractionData::Drag(_) => None,
        }
    }

    pub fn is_drag(&self) -> bool {
        self.drag_data().is_some()
    }

    /// Modifiers of the latest event.
    pub fn modifiers(&self) -> Modifiers {
        match &self.interaction_data {
            InteractionData::Drag(drag) => drag.modifiers,
            InteractionData::Keyboard(keys) => keys
                .key_states
                .last()
                .map(|s| s.modifiers)
                .unwrap_or_default(),
        }
    }

    /// New session with the drag set to `drag` (measured from the start).
    pub fn with_drag(&self, drag: CanvasVector, modifiers: Modifiers) -> Self {
        let mut next = self.clone();
        if let InteractionData::Drag(data) = &mut next.interaction_data {
            data.prev_drag = data.drag;
            data.drag = Some(drag);
            data.modifiers = modifiers;
        }
        next
    }

    /// New session with one more key press recorded.
    pub fn with_key(&self, key: Key, modifiers: Modifiers) -> Self {
        let mut next = self.clone();
        if let InteractionData::Keyboard(data) = &mut next.interaction_data {
            data.key_states.push(KeyState { key, modifiers });
        }
        next
    }

    /// New session seeing a fresh measurement. The starting snapshot stays.
    pub fn with_latest_metadata(
        &self,
        metadata: Arc<ElementInstanceMetadataMap>,
        props: Arc<AllElementProps>,
    ) -> Self {
        Self {
            latest_metadata: metadata,
            latest_all_element_props: props,
            ..self.clone()
        }
    }

    pub fn with_preferred_strategy(&self, strategy: Option<StrategyId>) -> Self {
        Self {
            user_preferred_strategy: strategy,
            ..self.clone()
        }
    }

    pub fn with_updated_target_paths(&self, paths: BTreeMap<ElementPath, ElementPath>) -> Self {
        Self {
            updated_target_paths: paths,
            ..self.clone()
        }
    }
}
