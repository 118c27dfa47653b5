//! Shared building blocks for the move-like strategies.

use super::{CustomStrategyState, InteractionCanvasState, StrategyApplicationResult};
use crate::commands::{CanvasCommand, WhenToRun};
use crate::session::InteractionSession;
use crate::snapping::{collect_parent_and_sibling_guidelines, snap_drag};
use crate::state::{CursorStyle, ElementsToRerender, IntendedBounds};
use canvas_core::geometry::{constrained_drag_axis, offset_rect};
use canvas_core::{
    AllElementProps, Axis, CanvasVector, CssValue, EdgePosition, EdgeSide,
    ElementInstanceMetadataMap, ElementPath, LayoutSystem, StyleProp, drag_targets,
};

/// Absolute position pins, horizontal first.
pub const HORIZONTAL_PINS: [StyleProp; 2] = [StyleProp::Left, StyleProp::Right];
pub const VERTICAL_PINS: [StyleProp; 2] = [StyleProp::Top, StyleProp::Bottom];

/// Selected elements minus those whose ancestor is also selected.
pub fn selected_drag_targets(canvas: &InteractionCanvasState<'_>) -> Vec<ElementPath> {
    drag_targets(canvas.selected_views())
}

/// The path `path` has now, after any reparent or duplicate this session.
pub fn mapped_path(session: &InteractionSession, path: &ElementPath) -> ElementPath {
    session
        .updated_target_paths
        .get(path)
        .cloned()
        .unwrap_or_else(|| path.clone())
}

/// Whether editing the element's style actually moves it: it must exist in
/// the document and either be a host element or pass its `style` prop on.
pub fn honours_position(
    canvas: &InteractionCanvasState<'_>,
    props: &AllElementProps,
    path: &ElementPath,
) -> bool {
    canvas
        .project()
        .element_at_path(path)
        .is_some_and(|element| element.is_intrinsic() || props.has_style(path))
}

/// True when every drag target is absolutely positioned and honours its
/// position props. `false` for an empty selection.
pub fn all_absolute_and_movable(
    canvas: &InteractionCanvasState<'_>,
    metadata: &ElementInstanceMetadataMap,
    props: &AllElementProps,
    targets: &[ElementPath],
) -> bool {
    !targets.is_empty()
        && targets
            .iter()
            .all(|t| metadata.is_absolute(t) && honours_position(canvas, props, t))
}

/// Rendered siblings of `path` (itself included), in document order.
/// Siblings the document does not know about sort last, by path.
pub fn ordered_siblings(
    canvas: &InteractionCanvasState<'_>,
    metadata: &ElementInstanceMetadataMap,
    path: &ElementPath,
) -> Vec<ElementPath> {
    let parent = path.parent();
    let mut siblings: Vec<ElementPath> = metadata
        .children_of(&parent)
        .into_iter()
        .map(|m| m.element_path.clone())
        .collect();
    if !siblings.contains(path) {
        siblings.push(path.clone());
    }
    let project = canvas.project();
    siblings.sort_by_cached_key(|sibling| {
        let index = sibling
            .uid()
            .filter(|_| !sibling.is_root_of_instance())
            .and_then(|uid| project.index_in_parent(uid));
        (index.unwrap_or(usize::MAX), sibling.to_string())
    });
    siblings
}

/// A reorder among `siblings` is allowed when none of them is the root of a
/// component instance and all of them exist in the document.
pub fn is_reorder_allowed(canvas: &InteractionCanvasState<'_>, siblings: &[ElementPath]) -> bool {
    let project = canvas.project();
    siblings.iter().all(|sibling| {
        !sibling.is_root_of_instance() && project.element_at_path(sibling).is_some()
    })
}

/// Whether `prop` holds a length that can be adjusted in place. Keywords
/// such as `auto` do not count.
pub fn has_length_pin(
    canvas: &InteractionCanvasState<'_>,
    path: &ElementPath,
    prop: StyleProp,
) -> bool {
    canvas
        .editor
        .style_value(path, prop)
        .is_some_and(CssValue::is_length)
}

/// Pins to write: every existing length pin, plus `left`/`top` for an axis
/// that has none.
pub fn ensure_one_pin_per_axis(
    canvas: &InteractionCanvasState<'_>,
    path: &ElementPath,
) -> (Vec<StyleProp>, Vec<StyleProp>) {
    let has_pin = |prop: &StyleProp| has_length_pin(canvas, path, *prop);
    let existing: Vec<StyleProp> = HORIZONTAL_PINS
        .iter()
        .chain(VERTICAL_PINS.iter())
        .filter(|p| has_pin(p))
        .copied()
        .collect();
    let mut extended = Vec::with_capacity(4);
    for (pins, fallback) in [
        (HORIZONTAL_PINS, StyleProp::Left),
        (VERTICAL_PINS, StyleProp::Top),
    ] {
        let present: Vec<StyleProp> = pins.iter().filter(|p| has_pin(p)).copied().collect();
        if present.is_empty() {
            extended.push(fallback);
        } else {
            extended.extend(present);
        }
    }
    (existing, extended)
}

pub fn pin_axis(pin: StyleProp) -> Axis {
    match pin {
        StyleProp::Left | StyleProp::Right | StyleProp::Width => Axis::Horizontal,
        _ => Axis::Vertical,
    }
}

/// `right` and `bottom` grow toward the origin.
pub fn is_far_pin(pin: StyleProp) -> bool {
    matches!(pin, StyleProp::Right | StyleProp::Bottom)
}

/// Pin adjustments moving `path` by `drag`, plus where it should land.
///
/// A synthesized `left`/`top` starts from the element's measured local
/// frame, so it does not jump when it first appears.
pub fn move_commands_for_element(
    canvas: &InteractionCanvasState<'_>,
    session: &InteractionSession,
    path: &ElementPath,
    drag: CanvasVector,
) -> (Vec<CanvasCommand>, Vec<IntendedBounds>) {
    if canvas.project().element_at_path(path).is_none() {
        return (Vec::new(), Vec::new());
    }
    let metadata = &session.starting_metadata;
    let element_metadata = metadata.get(path);
    let local_frame = metadata.local_frame(path);
    let parent_bounds =
        element_metadata.and_then(|m| m.special_size_measurements.coordinate_system_bounds);

    let (existing, extended) = ensure_one_pin_per_axis(canvas, path);
    let commands = extended
        .into_iter()
        .map(|pin| {
            let axis = pin_axis(pin);
            let is_new = !existing.contains(&pin);
            let offset = match (is_new, pin) {
                (true, StyleProp::Left) => local_frame.map_or(0.0, |f| f.x),
                (true, StyleProp::Top) => local_frame.map_or(0.0, |f| f.y),
                _ => 0.0,
            };
            let sign = if is_far_pin(pin) { -1.0 } else { 1.0 };
            CanvasCommand::AdjustCssLengthProperty {
                when: WhenToRun::Always,
                target: path.clone(),
                prop: pin,
                delta: (offset + drag.along(axis)) * sign,
                parent_dimension: parent_bounds.map(|b| b.extent(axis)),
                create_if_missing: true,
            }
        })
        .collect();

    let intended = metadata
        .global_frame(path)
        .map(|frame| IntendedBounds {
            target: mapped_path(session, path),
            frame: offset_rect(frame, drag),
        })
        .into_iter()
        .collect();
    (commands, intended)
}

/// Move commands for every drag target of the selection.
pub fn move_commands(
    canvas: &InteractionCanvasState<'_>,
    session: &InteractionSession,
    drag: CanvasVector,
) -> (Vec<CanvasCommand>, Vec<IntendedBounds>) {
    let mut commands = Vec::new();
    let mut intended = Vec::new();
    for target in selected_drag_targets(canvas) {
        let (c, i) = move_commands_for_element(canvas, session, &target, drag);
        commands.extend(c);
        intended.extend(i);
    }
    (commands, intended)
}

/// Snap the session's drag, then wrap `get_move_commands` with the usual
/// feedback commands. Cmd disables snapping; Shift locks the dominant axis.
pub fn apply_move_common(
    canvas: &InteractionCanvasState<'_>,
    session: &InteractionSession,
    get_move_commands: impl Fn(CanvasVector) -> (Vec<CanvasCommand>, Vec<IntendedBounds>),
) -> StrategyApplicationResult {
    let Some(drag_data) = session.drag_data() else {
        return StrategyApplicationResult::empty();
    };
    let Some(drag) = drag_data.drag else {
        return StrategyApplicationResult::empty();
    };
    let selected = canvas.selected_views().to_vec();

    if drag_data.modifiers.cmd {
        let (mut commands, intended) = get_move_commands(drag);
        commands.extend([
            CanvasCommand::PushIntendedBounds {
                when: WhenToRun::MidInteraction,
                bounds: intended,
            },
            CanvasCommand::UpdateHighlightedViews {
                when: WhenToRun::MidInteraction,
                views: Vec::new(),
            },
            CanvasCommand::SetElementsToRerender {
                when: WhenToRun::Always,
                elements: ElementsToRerender::Paths(selected),
            },
            CanvasCommand::SetCursor {
                when: WhenToRun::MidInteraction,
                cursor: CursorStyle::Move,
            },
        ]);
        return StrategyApplicationResult::success(commands);
    }

    let constrained = drag_data.modifiers.shift.then(|| constrained_drag_axis(drag));
    let snapping_targets: Vec<ElementPath> =
        selected.iter().map(|p| mapped_path(session, p)).collect();
    let guidelines =
        collect_parent_and_sibling_guidelines(&session.starting_metadata, &snapping_targets);
    let (snapped, active_guidelines) = snap_drag(
        drag,
        constrained,
        &session.starting_metadata,
        &selected,
        &guidelines,
        canvas.scale(),
        canvas.config.snap_threshold,
    );

    let (mut commands, intended) = get_move_commands(snapped);
    let mut rerender = selected.clone();
    for path in snapping_targets {
        if !rerender.contains(&path) {
            rerender.push(path);
        }
    }
    commands.extend([
        CanvasCommand::UpdateHighlightedViews {
            when: WhenToRun::MidInteraction,
            views: Vec::new(),
        },
        CanvasCommand::SetSnappingGuidelines {
            when: WhenToRun::MidInteraction,
            guidelines: active_guidelines,
        },
        CanvasCommand::PushIntendedBounds {
            when: WhenToRun::MidInteraction,
            bounds: intended,
        },
        CanvasCommand::SetElementsToRerender {
            when: WhenToRun::Always,
            elements: ElementsToRerender::Paths(rerender),
        },
        CanvasCommand::SetCursor {
            when: WhenToRun::MidInteraction,
            cursor: CursorStyle::Move,
        },
    ]);
    StrategyApplicationResult::success(commands)
}

/// Resize cursor for a handle.
pub fn cursor_for_edge(edge: EdgePosition) -> CursorStyle {
    match (edge.side(Axis::Horizontal), edge.side(Axis::Vertical)) {
        (EdgeSide::Middle, _) => CursorStyle::ResizeNS,
        (_, EdgeSide::Middle) => CursorStyle::ResizeEW,
        (EdgeSide::Start, EdgeSide::Start) | (EdgeSide::End, EdgeSide::End) => {
            CursorStyle::ResizeNWSE
        }
        _ => CursorStyle::ResizeNESW,
    }
}

// ─── Reordering ──────────────────────────────────────────────────────────

/// The single selected element when it is laid out by `layout` and has at
/// least one sibling, with its ordered siblings.
pub fn single_reorder_target(
    canvas: &InteractionCanvasState<'_>,
    metadata: &ElementInstanceMetadataMap,
    layout: LayoutSystem,
) -> Option<(ElementPath, Vec<ElementPath>)> {
    let [target] = selected_drag_targets(canvas).try_into().ok()?;
    let element = metadata.get(&target)?;
    if element.is_absolute() || element.parent_layout() != layout {
        return None;
    }
    let siblings = ordered_siblings(canvas, metadata, &target);
    (siblings.len() > 1).then_some((target, siblings))
}

/// Feedback for a reorder the structure does not allow.
pub fn reorder_not_permitted() -> StrategyApplicationResult {
    StrategyApplicationResult::failure(vec![CanvasCommand::SetCursor {
        when: WhenToRun::MidInteraction,
        cursor: CursorStyle::NotPermitted,
    }])
}

/// Commands moving `target` to slot `new_index` among the rendered
/// `siblings`, remembering the slot for the next tick.
///
/// The document may hold children that never rendered, so the slot is
/// turned into the document index of the sibling currently sitting there.
pub fn reorder_result(
    canvas: &InteractionCanvasState<'_>,
    target: &ElementPath,
    siblings: &[ElementPath],
    new_index: usize,
    extra: Vec<CanvasCommand>,
    cursor: CursorStyle,
) -> StrategyApplicationResult {
    let document_index = siblings
        .get(new_index)
        .and_then(ElementPath::uid)
        .and_then(|uid| canvas.project().index_in_parent(uid))
        .unwrap_or(new_index);
    let mut commands = vec![
        CanvasCommand::ReorderElement {
            when: WhenToRun::Always,
            target: target.clone(),
            index: document_index,
        },
        CanvasCommand::SetElementsToRerender {
            when: WhenToRun::Always,
            elements: ElementsToRerender::Paths(siblings.to_vec()),
        },
        CanvasCommand::UpdateHighlightedViews {
            when: WhenToRun::MidInteraction,
            views: Vec::new(),
        },
    ];
    commands.extend(extra);
    commands.push(CanvasCommand::SetCursor {
        when: WhenToRun::MidInteraction,
        cursor,
    });
    StrategyApplicationResult::success(commands).with_custom_state(CustomStrategyState {
        last_reorder_idx: Some(new_index),
        ..CustomStrategyState::default()
    })
}
