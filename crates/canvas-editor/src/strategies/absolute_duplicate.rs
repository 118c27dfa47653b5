//! Alt-drag: duplicate absolutely positioned elements and move the copies.

use super::helpers::{
    all_absolute_and_movable, apply_move_common, move_commands_for_element, selected_drag_targets,
};
use super::{
    CanvasStrategy, CustomStrategyState, InteractionCanvasState, StrategyApplicationResult,
    StrategyId,
};
use crate::commands::{CanvasCommand, InteractionLifecycle, WhenToRun};
use crate::session::{ActiveControl, InteractionSession};
use crate::state::{CursorStyle, ElementsToRerender};
use canvas_core::{AllElementProps, ElementInstanceMetadataMap, ElementPath, Uid};
use canvas_render::{ControlKind, ControlVisibility, ControlWithProps};
use std::collections::BTreeMap;

pub struct AbsoluteDuplicateStrategy;

fn alt_drag(session: &InteractionSession) -> bool {
    session.drag_data().is_some_and(|d| d.modifiers.alt)
}

/// Give every descendant of `uid` a copy UID, keeping the ones already
/// handed out earlier in the session.
fn assign_descendant_uids(
    canvas: &InteractionCanvasState<'_>,
    uid: Uid,
    renames: &mut BTreeMap<Uid, Uid>,
) {
    for child in canvas.project().child_uids(uid) {
        renames
            .entry(child)
            .or_insert_with(|| Uid::generate(child.as_str()));
        assign_descendant_uids(canvas, child, renames);
    }
}

fn retarget(command: CanvasCommand, to: &ElementPath) -> CanvasCommand {
    match command {
        CanvasCommand::AdjustCssLengthProperty {
            when,
            prop,
            delta,
            parent_dimension,
            create_if_missing,
            ..
        } => CanvasCommand::AdjustCssLengthProperty {
            when,
            target: to.clone(),
            prop,
            delta,
            parent_dimension,
            create_if_missing,
        },
        other => other,
    }
}

impl CanvasStrategy for AbsoluteDuplicateStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::AbsoluteDuplicate
    }

    fn name(&self) -> &'static str {
        "Duplicate"
    }

    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        props: &AllElementProps,
    ) -> bool {
        let Some(session) = session else {
            return false;
        };
        if !alt_drag(session) {
            return false;
        }
        let targets = selected_drag_targets(canvas);
        targets.iter().all(|t| !t.is_root_of_instance())
            && all_absolute_and_movable(canvas, metadata, props, &targets)
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
        ]
    }

    fn fitness(
        &self,
        _canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        _custom: &CustomStrategyState,
    ) -> u32 {
        match session.active_control {
            ActiveControl::BoundingArea if alt_drag(session) => 2,
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
        let targets = selected_drag_targets(canvas);
        let mut new_uids = custom.duplicated_element_new_uids.clone();
        let mut descendant_uids = custom.duplicated_descendant_uids.clone();
        let mut updated_paths = BTreeMap::new();
        let mut duplicate_commands = Vec::new();
        for target in &targets {
            let Some(uid) = target.uid() else {
                continue;
            };
            let new_uid = *new_uids
                .entry(target.clone())
                .or_insert_with(|| Uid::generate(uid.as_str()));
            assign_descendant_uids(canvas, uid, &mut descendant_uids);
            duplicate_commands.push(CanvasCommand::DuplicateElement {
                when: WhenToRun::Always,
                original: target.clone(),
                new_uid,
                descendant_uids: descendant_uids.clone(),
            });
            updated_paths.insert(target.clone(), target.with_leaf(new_uid));
        }
        let new_paths: Vec<ElementPath> = updated_paths.values().cloned().collect();

        let session = session.with_updated_target_paths(updated_paths.clone());
        let moved = apply_move_common(canvas, &session, |drag| {
            let mut commands = Vec::new();
            let mut intended = Vec::new();
            for target in &targets {
                let Some(duplicate) = updated_paths.get(target) else {
                    continue;
                };
                let (c, i) = move_commands_for_element(canvas, &session, target, drag);
                commands.extend(c.into_iter().map(|c| retarget(c, duplicate)));
                intended.extend(i);
            }
            (commands, intended)
        });

        let mut commands = duplicate_commands;
        commands.extend(moved.commands.into_iter().filter(|c| {
            !matches!(
                c,
                CanvasCommand::SetCursor { .. } | CanvasCommand::SetElementsToRerender { .. }
            )
        }));
        commands.extend([
            CanvasCommand::UpdateSelectedViews {
                when: WhenToRun::Always,
                views: new_paths,
            },
            CanvasCommand::SetElementsToRerender {
                when: WhenToRun::Always,
                elements: ElementsToRerender::All,
            },
            CanvasCommand::SetCursor {
                when: WhenToRun::MidInteraction,
                cursor: CursorStyle::Duplicate,
            },
        ]);

        StrategyApplicationResult::success(commands).with_custom_state(CustomStrategyState {
            duplicated_element_new_uids: new_uids,
            duplicated_descendant_uids: descendant_uids,
            ..custom.clone()
        })
    }
}
