//! Resize a flex child from a handle by rewriting its size props.
//!
//! The new size comes from the measured frame, not the authored values, so
//! a child stretched by its container starts from what is on screen. A size
//! prop the element does not have is only added when the drag actually
//! changes that dimension.

use super::helpers::{cursor_for_edge, honours_position, selected_drag_targets};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::{CanvasCommand, InteractionLifecycle, WhenToRun};
use crate::session::{ActiveControl, InteractionSession};
use crate::state::{ElementsToRerender, IntendedBounds};
use canvas_core::geometry::resize_frame;
use canvas_core::{
    AllElementProps, Axis, CssValue, ElementInstanceMetadataMap, ElementPath,
    StyleProp,
};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps};

pub struct FlexResizeStrategy;

fn size_prop(axis: Axis) -> StyleProp {
    match axis {
        Axis::Horizontal => StyleProp::Width,
        Axis::Vertical => StyleProp::Height,
    }
}

/// The single selected element, if it is a non-absolute flex child.
fn flex_child_target(
    canvas: &InteractionCanvasState<'_>,
    metadata: &ElementInstanceMetadataMap,
    props: &AllElementProps,
) -> Option<ElementPath> {
    let [target] = selected_drag_targets(canvas).try_into().ok()?;
    let element = metadata.get(&target)?;
    (element.is_flex_child() && !element.is_absolute() && honours_position(canvas, props, &target))
        .then_some(target)
}

/// Value to write for `prop` when the measured extent `measured` becomes
/// `resized`, or `None` to leave it alone.
fn resized_value(
    current: Option<&CssValue>,
    measured: f32,
    resized: f32,
    parent_dimension: Option<f32>,
) -> Option<CssValue> {
    match current {
        None if resized == measured => None,
        Some(CssValue::Percent(_)) => match parent_dimension {
            Some(dim) if dim > 0.0 => Some(CssValue::Percent(resized / dim * 100.0)),
            _ => Some(CssValue::Px(resized)),
        },
        _ => Some(CssValue::Px(resized)),
    }
}

impl CanvasStrategy for FlexResizeStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::FlexResize
    }

    fn name(&self) -> &'static str {
        "Flex Resize"
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
        flex_child_target(canvas, metadata, props).is_some()
    }

    fn controls_to_render(&self) -> Vec<ControlWithProps> {
        vec![ControlWithProps::new(
            ControlKind::ResizeHandles,
            "flex-resize-control",
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
            (true, ActiveControl::ResizeHandle(_)) => 1,
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
        let ActiveControl::ResizeHandle(edge) = session.active_control else {
            return StrategyApplicationResult::empty();
        };
        let cursor = CanvasCommand::SetCursor {
            when: WhenToRun::MidInteraction,
            cursor: cursor_for_edge(edge),
        };
        let Some(drag) = session.drag_data().and_then(|d| d.drag) else {
            return StrategyApplicationResult::success(vec![cursor]);
        };
        let metadata = &session.starting_metadata;
        let Some(target) =
            flex_child_target(canvas, metadata, &session.starting_all_element_props)
        else {
            return StrategyApplicationResult::empty();
        };
        let Some(element) = metadata.get(&target) else {
            return StrategyApplicationResult::empty();
        };
        let Some(frame) = element.global_frame else {
            return StrategyApplicationResult::empty();
        };

        let measurements = &element.special_size_measurements;
        let main_axis = measurements
            .parent_flex_direction
            .unwrap_or_default()
            .main_axis();
        let resized = resize_frame(frame, edge, drag);
        log::trace!("flex resize {target}: {frame:?} -> {resized:?}");

        let mut commands = Vec::new();
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let basis = canvas.editor.style_value(&target, StyleProp::FlexBasis);
            let prop = if axis == main_axis && basis.is_some() {
                StyleProp::FlexBasis
            } else {
                size_prop(axis)
            };
            let current = canvas.editor.style_value(&target, prop);
            let parent_dimension = measurements.immediate_parent_bounds.map(|b| b.extent(axis));
            if let Some(value) =
                resized_value(current, frame.extent(axis), resized.extent(axis), parent_dimension)
            {
                commands.push(CanvasCommand::SetCssLengthProperty {
                    when: WhenToRun::Always,
                    target: target.clone(),
                    prop,
                    value,
                });
            }
        }

        commands.extend([
            CanvasCommand::PushIntendedBounds {
                when: WhenToRun::MidInteraction,
                bounds: vec![IntendedBounds {
                    target: target.clone(),
                    frame: resized,
                }],
            },
            CanvasCommand::SetElementsToRerender {
                when: WhenToRun::Always,
                elements: ElementsToRerender::Paths(vec![target.parent(), target]),
            },
            cursor,
        ]);
        StrategyApplicationResult::success(commands)
    }
}
