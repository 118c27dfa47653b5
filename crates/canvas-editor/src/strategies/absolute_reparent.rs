//! Drag absolutely positioned elements into a different parent.
//!
//! The drop target is whatever element sits under the pointer in the
//! starting snapshot, skipping the dragged elements themselves and their
//! descendants. The strict variant only accepts parents that provide bounds
//! for absolute children; the forced variant accepts any parent that can
//! hold children, and only competes when the strict search comes up empty.

use super::absolute_move::AbsoluteMoveStrategy;
use super::helpers::{
    all_absolute_and_movable, ensure_one_pin_per_axis, is_far_pin, pin_axis,
    selected_drag_targets,
};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::{CanvasCommand, InteractionLifecycle, WhenToRun};
use crate::session::{ActiveControl, InteractionSession};
use crate::state::{CursorStyle, ElementsToRerender};
use canvas_core::{AllElementProps, Axis, ElementInstanceMetadataMap, ElementPath};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps, hit_test};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingBoundsHandling {
    UseStrictBounds,
    AllowMissingBounds,
}

pub struct AbsoluteReparentStrategy {
    missing_bounds: MissingBoundsHandling,
}

impl AbsoluteReparentStrategy {
    pub const STRICT: Self = Self {
        missing_bounds: MissingBoundsHandling::UseStrictBounds,
    };
    pub const FORCED: Self = Self {
        missing_bounds: MissingBoundsHandling::AllowMissingBounds,
    };
}

/// Element under the pointer that could become the new parent, if it is
/// not already the parent of every dragged element.
pub fn reparent_target(
    canvas: &InteractionCanvasState<'_>,
    session: &InteractionSession,
    targets: &[ElementPath],
    handling: MissingBoundsHandling,
) -> Option<ElementPath> {
    let drag_data = session.drag_data()?;
    let point = drag_data.drag_start + drag_data.drag?;
    let project = canvas.project();
    let found = hit_test(&session.starting_metadata, point, |candidate| {
        let path = &candidate.element_path;
        if targets.iter().any(|t| path.is_descendant_of_or_equal(t)) {
            return false;
        }
        let supports_children = project
            .element_at_path(path)
            .is_some_and(|e| e.supports_children());
        let has_bounds = match handling {
            MissingBoundsHandling::UseStrictBounds => {
                candidate
                    .special_size_measurements
                    .provides_bounds_for_absolute_children
            }
            MissingBoundsHandling::AllowMissingBounds => true,
        };
        supports_children && has_bounds
    })?;
    if targets.iter().all(|t| t.parent() == found) {
        return None;
    }
    Some(found)
}

/// Element may leave its parent: it is in the document and is not the root
/// of a component.
fn allowed_to_reparent(canvas: &InteractionCanvasState<'_>, path: &ElementPath) -> bool {
    let project = canvas.project();
    if path.is_root_of_instance() {
        return false;
    }
    let Some(uid) = path.uid() else {
        return false;
    };
    match project.locate(uid) {
        Some((file, idx)) => project
            .file(file)
            .is_some_and(|f| !f.is_component_root(idx)),
        None => false,
    }
}

/// Pin adjustments keeping `target` visually in place when its coordinate
/// system changes to `new_parent`'s.
fn reparent_offset_commands(
    canvas: &InteractionCanvasState<'_>,
    metadata: &ElementInstanceMetadataMap,
    target: &ElementPath,
    new_parent: &ElementPath,
) -> Vec<CanvasCommand> {
    let Some(old_cs) = metadata
        .get(target)
        .and_then(|m| m.special_size_measurements.coordinate_system_bounds)
    else {
        return Vec::new();
    };
    let Some(new_cs) = metadata.global_frame(new_parent) else {
        return Vec::new();
    };
    let (_, extended) = ensure_one_pin_per_axis(canvas, target);
    extended
        .into_iter()
        .map(|pin| {
            let axis = pin_axis(pin);
            let delta = match (axis, is_far_pin(pin)) {
                (Axis::Horizontal, false) => old_cs.x - new_cs.x,
                (Axis::Vertical, false) => old_cs.y - new_cs.y,
                (Axis::Horizontal, true) => new_cs.right() - old_cs.right(),
                (Axis::Vertical, true) => new_cs.bottom() - old_cs.bottom(),
            };
            CanvasCommand::AdjustCssLengthProperty {
                when: WhenToRun::Always,
                target: target.clone(),
                prop: pin,
                delta,
                parent_dimension: Some(new_cs.extent(axis)),
                create_if_missing: true,
            }
        })
        .collect()
}

/// Commands moving `target` under `new_parent`, or `None` when a cross-file
/// move would leave component references unresolved.
fn reparent_commands(
    canvas: &InteractionCanvasState<'_>,
    metadata: &ElementInstanceMetadataMap,
    target: &ElementPath,
    new_parent: &ElementPath,
) -> Option<(Vec<CanvasCommand>, ElementPath)> {
    let project = canvas.project();
    let uid = target.uid()?;
    let (from_file, _) = project.locate(uid)?;
    let (to_file, _) = project.locate(new_parent.uid()?)?;

    let mut commands = reparent_offset_commands(canvas, metadata, target, new_parent);
    if from_file != to_file {
        let imports = project.imports_for_transplant(uid, to_file)?;
        commands.push(CanvasCommand::AddImportsToFile {
            when: WhenToRun::Always,
            file: to_file.to_string(),
            imports,
        });
    }
    commands.push(CanvasCommand::ReparentElement {
        when: WhenToRun::Always,
        target: target.clone(),
        new_parent: new_parent.clone(),
        index: None,
    });
    Some((commands, new_parent.append(uid)))
}

impl CanvasStrategy for AbsoluteReparentStrategy {
    fn id(&self) -> StrategyId {
        match self.missing_bounds {
            MissingBoundsHandling::UseStrictBounds => StrategyId::AbsoluteReparent,
            MissingBoundsHandling::AllowMissingBounds => StrategyId::ForcedAbsoluteReparent,
        }
    }

    fn name(&self) -> &'static str {
        match self.missing_bounds {
            MissingBoundsHandling::UseStrictBounds => "Reparent (Abs)",
            MissingBoundsHandling::AllowMissingBounds => "Reparent (Abs, Force)",
        }
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        props: &AllElementProps,
    ) -> bool {
        if !session.is_some_and(InteractionSession::is_drag) {
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
                ControlKind::ReparentTargetOutline,
                "reparent-target-outline",
                ControlVisibility::VisibleOnlyWhileActive,
            ),
        ]
    }

    fn fitness(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
    ) -> u32 {
        if session.active_control != ActiveControl::BoundingArea {
            return 0;
        }
        let targets = selected_drag_targets(canvas);
        let strict = reparent_target(
            canvas,
            session,
            &targets,
            MissingBoundsHandling::UseStrictBounds,
        );
        match self.missing_bounds {
            MissingBoundsHandling::UseStrictBounds if strict.is_some() => 3,
            MissingBoundsHandling::AllowMissingBounds
                if strict.is_none()
                    && reparent_target(
                        canvas,
                        session,
                        &targets,
                        MissingBoundsHandling::AllowMissingBounds,
                    )
                    .is_some() =>
            {
                2
            }
            _ => 0,
        }
    }

    fn apply(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        custom: &CustomStrategyState,
        lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult {
        let targets = selected_drag_targets(canvas);
        let allowed = targets.iter().all(|t| allowed_to_reparent(canvas, t));
        let new_parent = reparent_target(canvas, session, &targets, self.missing_bounds);
        let Some(new_parent) = new_parent.filter(|_| allowed) else {
            return AbsoluteMoveStrategy.apply(canvas, session, custom, lifecycle);
        };

        let metadata = &session.starting_metadata;
        let mut updated_paths = BTreeMap::new();
        let mut reparent = Vec::new();
        for target in &targets {
            if target.parent() == new_parent {
                continue;
            }
            match reparent_commands(canvas, metadata, target, &new_parent) {
                Some((commands, new_path)) => {
                    updated_paths.insert(target.clone(), new_path);
                    reparent.extend(commands);
                }
                None => log::debug!("keeping {target} in place: imports cannot be resolved"),
            }
        }
        if updated_paths.is_empty() {
            return AbsoluteMoveStrategy.apply(canvas, session, custom, lifecycle);
        }

        let moved_session = session.with_updated_target_paths(updated_paths.clone());
        let moved = AbsoluteMoveStrategy.apply(canvas, &moved_session, custom, lifecycle);

        let new_paths: Vec<ElementPath> = updated_paths.values().cloned().collect();
        let mut rerender = new_paths.clone();
        rerender.extend(targets.iter().cloned());

        let mut commands = moved.commands;
        commands.extend(reparent);
        commands.extend([
            CanvasCommand::UpdateSelectedViews {
                when: WhenToRun::Always,
                views: new_paths,
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
        log::debug!("reparenting {} element(s) into {new_parent}", targets.len());
        StrategyApplicationResult::success(commands)
    }
}
