//! Move snapping against parent and sibling edges.
//!
//! Guidelines are the edges and centre lines of the dragged elements'
//! parents and siblings. The dragged selection's bounds snap per axis to the
//! closest guideline within the threshold, which is given in screen pixels
//! and scaled down by the canvas zoom.

use crate::state::Guideline;
use canvas_core::geometry::{bounding_rectangle_array, constrain_drag, offset_rect};
use canvas_core::{Axis, CanvasRect, CanvasVector, ElementInstanceMetadataMap, ElementPath};

fn rect_guidelines(frame: CanvasRect, out: &mut Vec<Guideline>) {
    for position in [frame.x, frame.center().x, frame.right()] {
        out.push(Guideline {
            axis: Axis::Horizontal,
            position,
        });
    }
    for position in [frame.y, frame.center().y, frame.bottom()] {
        out.push(Guideline {
            axis: Axis::Vertical,
            position,
        });
    }
}

/// Guidelines from the parents and siblings of `targets`, siblings in path
/// order. Targets and their descendants never contribute.
pub fn collect_parent_and_sibling_guidelines(
    metadata: &ElementInstanceMetadataMap,
    targets: &[ElementPath],
) -> Vec<Guideline> {
    let is_dragged =
        |path: &ElementPath| targets.iter().any(|t| path.is_descendant_of_or_equal(t));
    let mut out = Vec::new();
    for target in targets {
        let parent = target.parent();
        if let Some(frame) = metadata.global_frame(&parent) {
            rect_guidelines(frame, &mut out);
        }
        let mut siblings = metadata.siblings_of(target);
        siblings.sort_by(|a, b| a.element_path.cmp(&b.element_path));
        for sibling in siblings {
            if is_dragged(&sibling.element_path) {
                continue;
            }
            if let Some(frame) = sibling.global_frame {
                rect_guidelines(frame, &mut out);
            }
        }
    }
    out.dedup();
    out
}

/// Bounds enclosing all `targets` in `metadata`.
pub fn multiselect_bounds(
    metadata: &ElementInstanceMetadataMap,
    targets: &[ElementPath],
) -> Option<CanvasRect> {
    bounding_rectangle_array(targets.iter().filter_map(|t| metadata.global_frame(t)))
}

fn points_along(frame: CanvasRect, axis: Axis) -> [f32; 3] {
    match axis {
        Axis::Horizontal => [frame.x, frame.center().x, frame.right()],
        Axis::Vertical => [frame.y, frame.center().y, frame.bottom()],
    }
}

/// Closest `guideline − point` offset on `axis` within `threshold`.
fn closest_offset(
    frame: CanvasRect,
    axis: Axis,
    guidelines: &[Guideline],
    threshold: f32,
) -> Option<f32> {
    let mut best: Option<f32> = None;
    for point in points_along(frame, axis) {
        for g in guidelines.iter().filter(|g| g.axis == axis) {
            let offset = g.position - point;
            if offset.abs() <= threshold && best.is_none_or(|b| offset.abs() < b.abs()) {
                best = Some(offset);
            }
        }
    }
    best
}

/// Snap `drag` so the dragged bounds line up with nearby guidelines.
///
/// With `constrained_axis` set, the drag is first reduced to that axis and
/// only that axis snaps. Returns the snapped drag and the guidelines it
/// lines up with.
pub fn snap_drag(
    drag: CanvasVector,
    constrained_axis: Option<Axis>,
    metadata: &ElementInstanceMetadataMap,
    targets: &[ElementPath],
    guidelines: &[Guideline],
    scale: f32,
    snap_threshold: f32,
) -> (CanvasVector, Vec<Guideline>) {
    let drag = match constrained_axis {
        Some(axis) => constrain_drag(drag, axis),
        None => drag,
    };
    let Some(bounds) = multiselect_bounds(metadata, targets) else {
        return (drag, Vec::new());
    };
    let threshold = snap_threshold / scale.max(f32::EPSILON);
    let moved = offset_rect(bounds, drag);

    let snaps_on = |axis: Axis| constrained_axis.is_none_or(|c| c == axis);
    let mut snapped = drag;
    if snaps_on(Axis::Horizontal)
        && let Some(dx) = closest_offset(moved, Axis::Horizontal, guidelines, threshold)
    {
        snapped.x += dx;
    }
    if snaps_on(Axis::Vertical)
        && let Some(dy) = closest_offset(moved, Axis::Vertical, guidelines, threshold)
    {
        snapped.y += dy;
    }

    let final_bounds = offset_rect(bounds, snapped);
    let active: Vec<Guideline> = guidelines
        .iter()
        .filter(|g| {
            points_along(final_bounds, g.axis)
                .iter()
                .any(|p| (p - g.position).abs() < 0.01)
        })
        .copied()
        .collect();
    log::trace!("snapped drag ({}, {}) → ({}, {})", drag.x, drag.y, snapped.x, snapped.y);
    (snapped, active)
}
