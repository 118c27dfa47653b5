//! Move absolutely positioned elements by adjusting their pins.

use super::helpers::{
    all_absolute_and_movable, apply_move_common, move_commands, selected_drag_targets,
};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::InteractionLifecycle;
use crate::session::{ActiveControl, InteractionSession};
use canvas_core::{AllElementProps, ElementInstanceMetadataMap};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps};

pub struct AbsoluteMoveStrategy;

impl CanvasStrategy for AbsoluteMoveStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::AbsoluteMove
    }

    fn name(&self) -> &'static str {
        "Absolute Move"
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        props: &AllElementProps,
    ) -> bool {
        if session.is_some_and(|s| !s.is_drag()) {
            return false;
        }
        all_absolute_and_movable(canvas, metadata, props, &selected_drag_targets(canvas))
    }

    fn controls_to_render(&self) -> Vec<ControlWithProps> {
        vec![
            ControlWithProps::new(
                ControlKind::ParentOutlines,
                "parent-outlines-control",
                ControlVisibility::VisibleOnlyWhileActive,
            ),
            ControlWithProps::new(
                ControlKind::ParentBounds,
                "parent-bounds-control",
                ControlVisibility::VisibleOnlyWhileActive,
            ),
            ControlWithProps::new(
                ControlKind::SnappingGuidelines,
                "snapping-guidelines",
                ControlVisibility::VisibleOnlyWhileActive,
            ),
        ]
    }

    fn fitness(
        &self,
        _canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
    ) -> u32 {
        match (session.is_drag(), session.active_control) {
            (true, ActiveControl::BoundingArea) => 1,
            _ => 0,
        }
    }

    fn apply(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
        _lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult {
        apply_move_common(canvas, session, |drag| move_commands(canvas, session, drag))
    }
}
