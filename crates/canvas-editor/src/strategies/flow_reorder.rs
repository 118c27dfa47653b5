//! Reorder an element among its flow siblings, either by dragging it onto
//! a sibling or with the flow slider control.

use super::helpers::{
    is_reorder_allowed, reorder_not_permitted, reorder_result, single_reorder_target,
};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::{CanvasCommand, InteractionLifecycle, WhenToRun};
use crate::config::SliderSnapping;
use crate::session::{ActiveControl, InteractionSession};
use crate::state::CursorStyle;
use canvas_core::{
    AllElementProps, CanvasVector, ElementInstanceMetadataMap, ElementPath, LayoutSystem,
    StyleProp,
};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps};

/// Slot the slider lands on after dragging `drag` from `start_index`.
pub fn find_new_index(
    start_index: usize,
    drag: CanvasVector,
    sibling_count: usize,
    step: f32,
    snapping: SliderSnapping,
) -> usize {
    let slots = drag.x / step;
    let offset = match snapping {
        SliderSnapping::RoundedValue => slots.round(),
        SliderSnapping::RawValue => slots.trunc(),
    };
    let last = sibling_count.saturating_sub(1) as f32;
    (start_index as f32 + offset).clamp(0.0, last) as usize
}

fn is_inline(display: &str) -> bool {
    display.starts_with("inline")
}

fn display_of<'a>(metadata: &'a ElementInstanceMetadataMap, path: &ElementPath) -> &'a str {
    metadata
        .get(path)
        .map(|m| m.special_size_measurements.display.as_str())
        .unwrap_or_default()
}

/// `display` changes keeping `target` in line with the sibling it is moved
/// next to: an inline element dropped among blocks becomes a block, a
/// block dropped among inline elements becomes `inline-block`.
fn display_fix_ups(
    metadata: &ElementInstanceMetadataMap,
    target: &ElementPath,
    siblings: &[ElementPath],
    start_index: usize,
    new_index: usize,
) -> Vec<CanvasCommand> {
    if new_index == start_index {
        return Vec::new();
    }
    let Some(neighbour) = siblings.get(new_index) else {
        return Vec::new();
    };
    let (own, theirs) = (display_of(metadata, target), display_of(metadata, neighbour));
    if own.is_empty() || theirs.is_empty() {
        return Vec::new();
    }
    let value = match (is_inline(own), is_inline(theirs)) {
        (true, false) => "block",
        (false, true) => "inline-block",
        _ => return Vec::new(),
    };
    vec![CanvasCommand::SetCssKeywordProperty {
        when: WhenToRun::Always,
        target: target.clone(),
        prop: StyleProp::Display,
        value: value.to_string(),
    }]
}

fn flow_applicable(
    canvas: &InteractionCanvasState<'_>,
    session: Option<&InteractionSession>,
    metadata: &ElementInstanceMetadataMap,
) -> bool {
    if session.is_some_and(|s| !s.is_drag()) {
        return false;
    }
    single_reorder_target(canvas, metadata, LayoutSystem::Flow).is_some()
}

// ─── Slider ──────────────────────────────────────────────────────────────

pub struct FlowReorderSliderStrategy;

impl CanvasStrategy for FlowReorderSliderStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::FlowReorderSlider
    }

    fn name(&self) -> &'static str {
        "Reorder (Slider)"
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        _props: &AllElementProps,
    ) -> bool {
        flow_applicable(canvas, session, metadata)
    }

    fn controls_to_render(&self) -> Vec<ControlWithProps> {
        vec![ControlWithProps::new(
            ControlKind::FlowSlider,
            "flow-slider-control",
            ControlVisibility::AlwaysVisible,
        )]
    }

    fn fitness(
        &self,
        _canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
    ) -> u32 {
        match (session.is_drag(), session.active_control) {
            (true, ActiveControl::FlowSlider) => 100,
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
        let Some((target, siblings)) = single_reorder_target(canvas, metadata, LayoutSystem::Flow)
        else {
            return StrategyApplicationResult::empty();
        };
        if !is_reorder_allowed(canvas, &siblings) {
            log::debug!("reorder of {target} blocked by its siblings");
            return reorder_not_permitted();
        }
        let Some(drag) = drag_data.drag else {
            return StrategyApplicationResult::success(vec![CanvasCommand::SetCursor {
                when: WhenToRun::MidInteraction,
                cursor: CursorStyle::ResizeEW,
            }]);
        };

        let start_index = siblings.iter().position(|s| s == &target).unwrap_or(0);
        let new_index = find_new_index(
            start_index,
            drag,
            siblings.len(),
            canvas.config.reorder_slider_step,
            canvas.config.slider_snapping,
        );
        let fix_ups = display_fix_ups(metadata, &target, &siblings, start_index, new_index);
        reorder_result(canvas, &target, &siblings, new_index, fix_ups, CursorStyle::ResizeEW)
    }
}

// ─── Drag onto a sibling ─────────────────────────────────────────────────

pub struct FlowReorderStrategy;

impl CanvasStrategy for FlowReorderStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::FlowReorder
    }

    fn name(&self) -> &'static str {
        "Reorder (Flow)"
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        _props: &AllElementProps,
    ) -> bool {
        flow_applicable(canvas, session, metadata)
    }

    fn controls_to_render(&self) -> Vec<ControlWithProps> {
        vec![ControlWithProps::new(
            ControlKind::ReorderIndicator,
            "flow-reorder-indicator",
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
        custom: &CustomStrategyState,
        _lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult {
        let Some(drag_data) = session.drag_data() else {
            return StrategyApplicationResult::empty();
        };
        let metadata = &session.starting_metadata;
        let Some((target, siblings)) = single_reorder_target(canvas, metadata, LayoutSystem::Flow)
        else {
            return StrategyApplicationResult::empty();
        };
        if !is_reorder_allowed(canvas, &siblings) {
            return reorder_not_permitted();
        }
        let Some(drag) = drag_data.drag else {
            return StrategyApplicationResult::empty();
        };

        let start_index = siblings.iter().position(|s| s == &target).unwrap_or(0);
        let pointer = drag_data.drag_start + drag;
        let hovered = siblings.iter().position(|sibling| {
            metadata
                .global_frame(sibling)
                .is_some_and(|frame| frame.contains(pointer))
        });
        let new_index = hovered
            .or(custom.last_reorder_idx)
            .unwrap_or(start_index);
        let fix_ups = display_fix_ups(metadata, &target, &siblings, start_index, new_index);
        reorder_result(canvas, &target, &siblings, new_index, fix_ups, CursorStyle::Move)
    }
}
