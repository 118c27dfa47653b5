//! Reorder a flex child by dragging it along the main axis.

use super::helpers::{
    is_reorder_allowed, reorder_not_permitted, reorder_result, single_reorder_target,
};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::InteractionLifecycle;
use crate::session::{ActiveControl, InteractionSession};
use crate::state::CursorStyle;
use canvas_core::{
    AllElementProps, CanvasPoint, ElementInstanceMetadataMap, ElementPath, FlexDirection,
    LayoutSystem,
};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps};

pub struct FlexReorderStrategy;

/// Index the target takes when dropped at `pointer`: the number of other
/// siblings whose main-axis centre the pointer has passed.
pub fn flex_index_at(
    metadata: &ElementInstanceMetadataMap,
    target: &ElementPath,
    siblings: &[ElementPath],
    direction: FlexDirection,
    pointer: CanvasPoint,
) -> usize {
    let axis = direction.main_axis();
    let position = pointer.along(axis);
    siblings
        .iter()
        .filter(|s| *s != target)
        .filter_map(|s| metadata.global_frame(s))
        .filter(|frame| {
            let centre = frame.center().along(axis);
            if direction.is_reverse() {
                centre > position
            } else {
                centre < position
            }
        })
        .count()
}

impl CanvasStrategy for FlexReorderStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::FlexReorder
    }

    fn name(&self) -> &'static str {
        "Reorder (Flex)"
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        _props: &AllElementProps,
    ) -> bool {
        if session.is_some_and(|s| !s.is_drag()) {
            return false;
        }
        single_reorder_target(canvas, metadata, LayoutSystem::Flex).is_some()
    }

    fn controls_to_render(&self) -> Vec<ControlWithProps> {
        vec![ControlWithProps::new(
            ControlKind::ReorderIndicator,
            "flex-reorder-indicator",
            ControlVisibility::VisibleOnlyWhileActive,
        )]
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
        let Some(drag_data) = session.drag_data() else {
            return StrategyApplicationResult::empty();
        };
        let metadata = &session.starting_metadata;
        let Some((target, siblings)) = single_reorder_target(canvas, metadata, LayoutSystem::Flex)
        else {
            return StrategyApplicationResult::empty();
        };
        if !is_reorder_allowed(canvas, &siblings) {
            return reorder_not_permitted();
        }
        let Some(drag) = drag_data.drag else {
            return StrategyApplicationResult::empty();
        };

        let direction = metadata
            .get(&target)
            .and_then(|m| m.special_size_measurements.parent_flex_direction)
            .unwrap_or_default();
        let pointer = drag_data.drag_start + drag;
        let new_index = flex_index_at(metadata, &target, &siblings, direction, pointer);
        reorder_result(canvas, &target, &siblings, new_index, Vec::new(), CursorStyle::Move)
    }
}
