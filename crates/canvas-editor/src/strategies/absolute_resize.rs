//! Resize absolutely positioned elements from a handle.

use super::helpers::{
    all_absolute_and_movable, cursor_for_edge, has_length_pin, mapped_path,
    selected_drag_targets,
};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::{CanvasCommand, InteractionLifecycle, WhenToRun};
use crate::session::{ActiveControl, InteractionSession};
use crate::state::{ElementsToRerender, IntendedBounds};
use canvas_core::geometry::{local_rect_to_canvas, resize_frame};
use canvas_core::{
    AllElementProps, Axis, CssValue, EdgePosition, EdgeSide, ElementInstanceMetadataMap,
    ElementPath, LocalPoint, LocalRect, StyleProp,
};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps};

pub struct AbsoluteResizeStrategy;

/// `(start pin, end pin, size pin)` for one axis.
fn axis_pins(axis: Axis) -> (StyleProp, StyleProp, StyleProp) {
    match axis {
        Axis::Horizontal => (StyleProp::Left, StyleProp::Right, StyleProp::Width),
        Axis::Vertical => (StyleProp::Top, StyleProp::Bottom, StyleProp::Height),
    }
}

/// Pin commands for one axis of one element going from `old` to `new`.
fn resize_axis_commands(
    canvas: &InteractionCanvasState<'_>,
    target: &ElementPath,
    axis: Axis,
    old: LocalRect,
    new: LocalRect,
    parent_dimension: Option<f32>,
) -> Vec<CanvasCommand> {
    let (start_pin, end_pin, size_pin) = axis_pins(axis);
    let has = |prop| has_length_pin(canvas, target, prop);
    let (has_start, has_end, has_size) = (has(start_pin), has(end_pin), has(size_pin));

    let mut commands = Vec::new();
    let mut pin_count = [has_start, has_end, has_size].iter().filter(|p| **p).count();
    let set = |prop, value| CanvasCommand::SetCssLengthProperty {
        when: WhenToRun::Always,
        target: target.clone(),
        prop,
        value: CssValue::Px(value),
    };
    if !has_start && !has_end {
        commands.push(set(start_pin, new.start(axis)));
        pin_count += 1;
    }
    if !has_size && pin_count < 2 {
        commands.push(set(size_pin, new.extent(axis)));
    }

    let adjust = |prop, delta| CanvasCommand::AdjustCssLengthProperty {
        when: WhenToRun::Always,
        target: target.clone(),
        prop,
        delta,
        parent_dimension,
        create_if_missing: false,
    };
    let old_end = old.start(axis) + old.extent(axis);
    let new_end = new.start(axis) + new.extent(axis);
    if has_start {
        commands.push(adjust(start_pin, new.start(axis) - old.start(axis)));
    }
    if has_end {
        commands.push(adjust(end_pin, old_end - new_end));
    }
    if has_size {
        commands.push(adjust(size_pin, new.extent(axis) - old.extent(axis)));
    }
    commands
}

impl CanvasStrategy for AbsoluteResizeStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::AbsoluteResize
    }

    fn name(&self) -> &'static str {
        "Absolute Resize"
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
                ControlKind::ResizeHandles,
                "absolute-resize-control",
                ControlVisibility::AlwaysVisible,
            ),
            ControlWithProps::new(
                ControlKind::ZeroSizeResizeControl,
                "zero-size-resize-control",
                ControlVisibility::AlwaysVisible,
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
        let targets = selected_drag_targets(canvas);
        let mut commands = Vec::new();
        let mut intended = Vec::new();
        for target in &targets {
            let Some(element) = metadata.get(target) else {
                continue;
            };
            let Some(old) = element.local_frame else {
                continue;
            };
            let new = resize_frame(old, edge, LocalPoint::new(drag.x, drag.y));
            let cs = element.special_size_measurements.coordinate_system_bounds;
            for axis in [Axis::Horizontal, Axis::Vertical] {
                if edge_moves(edge, axis) {
                    commands.extend(resize_axis_commands(
                        canvas,
                        target,
                        axis,
                        old,
                        new,
                        cs.map(|b| b.extent(axis)),
                    ));
                }
            }
            if let Some(cs) = cs {
                intended.push(IntendedBounds {
                    target: mapped_path(session, target),
                    frame: local_rect_to_canvas(new, cs),
                });
            }
        }

        commands.extend([
            CanvasCommand::PushIntendedBounds {
                when: WhenToRun::MidInteraction,
                bounds: intended,
            },
            CanvasCommand::SetElementsToRerender {
                when: WhenToRun::Always,
                elements: ElementsToRerender::Paths(targets),
            },
            cursor,
        ]);
        StrategyApplicationResult::success(commands)
    }
}

fn edge_moves(edge: EdgePosition, axis: Axis) -> bool {
    edge.side(axis) != EdgeSide::Middle
}
