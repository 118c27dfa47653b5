//! Nudge absolutely positioned elements with the arrow keys.

use super::helpers::{all_absolute_and_movable, move_commands, selected_drag_targets};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::{CanvasCommand, InteractionLifecycle, WhenToRun};
use crate::session::InteractionSession;
use crate::state::ElementsToRerender;
use canvas_core::{AllElementProps, ElementInstanceMetadataMap};
use canvas_render::ControlWithProps;

pub struct KeyboardAbsoluteMoveStrategy;

impl CanvasStrategy for KeyboardAbsoluteMoveStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::KeyboardAbsoluteMove
    }

    fn name(&self) -> &'static str {
        "Keyboard Move (Abs)"
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        props: &AllElementProps,
    ) -> bool {
        if session.is_some_and(InteractionSession::is_drag) {
            return false;
        }
        all_absolute_and_movable(canvas, metadata, props, &selected_drag_targets(canvas))
    }

    fn controls_to_render(&self) -> Vec<ControlWithProps> {
        Vec::new()
    }

    fn fitness(
        &self,
        _canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
    ) -> u32 {
        u32::from(session.keyboard_data().is_some())
    }

    fn apply(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
        _lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult {
        let Some(keys) = session.keyboard_data() else {
            return StrategyApplicationResult::empty();
        };
        let movement = keys.accumulated_movement(canvas.config);
        if movement.is_zero() {
            return StrategyApplicationResult::empty();
        }
        let (mut commands, intended) = move_commands(canvas, session, movement);
        commands.extend([
            CanvasCommand::PushIntendedBounds {
                when: WhenToRun::MidInteraction,
                bounds: intended,
            },
            CanvasCommand::SetElementsToRerender {
                when: WhenToRun::Always,
                elements: ElementsToRerender::Paths(selected_drag_targets(canvas)),
            },
        ]);
        StrategyApplicationResult::success(commands)
    }
}
