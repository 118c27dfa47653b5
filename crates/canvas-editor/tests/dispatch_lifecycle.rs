//! Session lifecycle through the store: ticks, commit, cancel, and the
//! edge cases around presses and measurements.

mod common;

use canvas_core::{Axis, CanvasPoint, CanvasVector, CssValue, MeasurementError, StyleProp};
use canvas_editor::commands::count_runnable;
use canvas_editor::state::Guideline;
use canvas_editor::{
    ActiveControl, CanvasCommand, CommandError, EditorAction, EditorState, EditorStore,
    EngineConfig, InputEvent, InteractionLifecycle, Key, Modifiers, PressDuringSession,
    SessionPhase, StrategyId, WhenToRun, fold_and_apply_commands,
};
use common::{absolute_scene, path, px, style};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const AAA: &str = "sb/scene:root/aaa";

fn start_drag(store: &mut EditorStore, at: (f32, f32)) {
    store.dispatch(EditorAction::CreateDragSession {
        start: CanvasPoint::new(at.0, at.1),
        modifiers: Modifiers::cmd(),
        control: ActiveControl::BoundingArea,
    });
}

fn drag_to(store: &mut EditorStore, by: (f32, f32)) {
    store.dispatch(EditorAction::UpdateDragSession {
        drag: CanvasVector::new(by.0, by.1),
        modifiers: Modifiers::cmd(),
    });
}

fn commit(store: &mut EditorStore) {
    store.dispatch(EditorAction::ClearInteractionSession {
        apply_changes: true,
    });
}

fn left_top(editor: &EditorState) -> (Option<f32>, Option<f32>) {
    let value = |prop| match style(editor, AAA, prop) {
        Some(CssValue::Px(v)) => Some(v),
        _ => None,
    };
    (value(StyleProp::Left), value(StyleProp::Top))
}

// ─── Commit & cancel ─────────────────────────────────────────────────────

#[test]
fn ticks_patch_the_canvas_and_commit_applies_durable_commands() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    start_drag(&mut store, (20.0, 20.0));
    for step in [(10.0, 0.0), (20.0, 10.0), (30.0, 40.0)] {
        drag_to(&mut store, step);
        assert_eq!(left_top(store.unpatched()), (Some(10.0), Some(10.0)));
        assert_eq!(
            left_top(store.patched()),
            (Some(10.0 + step.0), Some(10.0 + step.1))
        );
    }

    let durable = count_runnable(
        &store.strategy_state().commands,
        InteractionLifecycle::EndInteraction,
    );
    assert_eq!(durable, 3);

    commit(&mut store);
    let summary = store.last_commit().expect("commit recorded");
    assert_eq!(summary.strategy, Some(StrategyId::AbsoluteMove));
    assert_eq!(summary.applied, durable);
    assert_eq!(summary.error, None);
    assert_eq!(left_top(store.unpatched()), (Some(40.0), Some(50.0)));
    assert_eq!(left_top(store.patched()), (Some(40.0), Some(50.0)));
    assert_eq!(store.phase(), SessionPhase::Idle);
}

#[test]
fn cancel_leaves_the_document_untouched() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    start_drag(&mut store, (20.0, 20.0));
    drag_to(&mut store, (75.0, 5.0));
    store.dispatch(EditorAction::ClearInteractionSession {
        apply_changes: false,
    });

    assert_eq!(left_top(store.unpatched()), (Some(10.0), Some(10.0)));
    assert_eq!(left_top(store.patched()), (Some(10.0), Some(10.0)));
    assert_eq!(store.patched().canvas.cursor, None);
    assert!(store.last_commit().is_none());
    assert!(store.session().is_none());
}

#[test]
fn committing_without_a_drag_changes_nothing() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    start_drag(&mut store, (20.0, 20.0));
    commit(&mut store);
    let summary = store.last_commit().expect("commit recorded");
    assert_eq!(summary.strategy, None);
    assert_eq!(summary.applied, 0);
    assert_eq!(left_top(store.unpatched()), (Some(10.0), Some(10.0)));
}

#[test]
fn phases_follow_the_session() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    assert_eq!(store.phase(), SessionPhase::Idle);
    start_drag(&mut store, (20.0, 20.0));
    assert_eq!(store.phase(), SessionPhase::Active);
    drag_to(&mut store, (5.0, 0.0));
    assert_eq!(store.phase(), SessionPhase::StrategyActive);
    commit(&mut store);
    assert_eq!(store.phase(), SessionPhase::Idle);
}

// ─── Presses during a session ────────────────────────────────────────────

#[test]
fn press_during_a_session_is_ignored_by_default() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    start_drag(&mut store, (20.0, 20.0));
    drag_to(&mut store, (10.0, 0.0));
    start_drag(&mut store, (300.0, 300.0));

    let session = store.session().expect("session still running");
    let start = session.drag_data().expect("drag session").drag_start;
    assert_eq!(start, CanvasPoint::new(20.0, 20.0));
    assert_eq!(left_top(store.patched()), (Some(20.0), Some(10.0)));
    assert!(store.last_commit().is_none());
}

#[test]
fn implicit_commit_policy_commits_the_running_session() {
    common::init_logging();
    let config = EngineConfig {
        press_during_session: PressDuringSession::ImplicitCommit,
        ..EngineConfig::default()
    };
    let mut store = absolute_scene().store_with_config(&[AAA], config);
    start_drag(&mut store, (20.0, 20.0));
    drag_to(&mut store, (10.0, 0.0));
    start_drag(&mut store, (300.0, 300.0));

    assert_eq!(left_top(store.unpatched()), (Some(20.0), Some(10.0)));
    assert_eq!(store.last_commit().map(|c| c.applied), Some(3));
    let session = store.session().expect("new session");
    let start = session.drag_data().expect("drag session").drag_start;
    assert_eq!(start, CanvasPoint::new(300.0, 300.0));
}

#[test]
fn second_press_during_a_pointer_drag_keeps_the_drag() {
    common::init_logging();
    let mut store = absolute_scene().store(&[]);
    store.handle_input(&InputEvent::pointer_down(30.0, 30.0));
    store.handle_input(&InputEvent::pointer_move(60.0, 30.0));
    // Lands on `plain`.
    store.handle_input(&InputEvent::pointer_down(250.0, 50.0));

    assert_eq!(store.unpatched().selected_views, vec![path(AAA)]);
    let session = store.session().expect("drag still running");
    let start = session.drag_data().expect("drag session").drag_start;
    assert_eq!(start, CanvasPoint::new(30.0, 30.0));

    store.handle_input(&InputEvent::pointer_move(70.0, 30.0));
    assert_eq!(left_top(store.patched()), (Some(50.0), Some(10.0)));
    store.handle_input(&InputEvent::pointer_up(70.0, 30.0));
    assert!(store.session().is_none());
    assert_eq!(left_top(store.unpatched()), (Some(50.0), Some(10.0)));
}

#[test]
fn second_press_with_implicit_commit_starts_over_from_the_new_press() {
    common::init_logging();
    let config = EngineConfig {
        press_during_session: PressDuringSession::ImplicitCommit,
        ..EngineConfig::default()
    };
    let mut store = absolute_scene().store_with_config(&[], config);
    store.handle_input(&InputEvent::pointer_down(30.0, 30.0));
    store.handle_input(&InputEvent::pointer_move(60.0, 30.0));
    store.handle_input(&InputEvent::pointer_down(250.0, 50.0));

    assert_eq!(left_top(store.unpatched()), (Some(40.0), Some(10.0)));
    assert_eq!(store.last_commit().map(|c| c.applied), Some(3));
    assert_eq!(
        store.unpatched().selected_views,
        vec![path("sb/scene:root/plain")]
    );
    let session = store.session().expect("new session");
    let start = session.drag_data().expect("drag session").drag_start;
    assert_eq!(start, CanvasPoint::new(250.0, 50.0));
}

// ─── Snapping ────────────────────────────────────────────────────────────

#[test]
fn drag_without_cmd_snaps_and_commits_the_snapped_position() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    store.dispatch(EditorAction::CreateDragSession {
        start: CanvasPoint::new(20.0, 20.0),
        modifiers: Modifiers::NONE,
        control: ActiveControl::BoundingArea,
    });
    // The top edge lands at 118, 2px above the bottom of `plain`.
    store.dispatch(EditorAction::UpdateDragSession {
        drag: CanvasVector::new(100.0, 108.0),
        modifiers: Modifiers::NONE,
    });

    assert_eq!(left_top(store.patched()), (Some(110.0), Some(120.0)));
    let bottom_of_plain = Guideline {
        axis: Axis::Vertical,
        position: 120.0,
    };
    assert!(store.strategy_state().commands.contains(&CanvasCommand::SetSnappingGuidelines {
        when: WhenToRun::MidInteraction,
        guidelines: vec![bottom_of_plain],
    }));
    assert_eq!(store.patched().canvas.snapping_guidelines, vec![bottom_of_plain]);

    commit(&mut store);
    assert_eq!(left_top(store.unpatched()), (Some(110.0), Some(120.0)));
    assert_eq!(store.last_commit().map(|c| c.applied), Some(3));
    assert!(store.patched().canvas.snapping_guidelines.is_empty());
}

// ─── Measurements ────────────────────────────────────────────────────────

#[test]
fn failed_measurement_is_a_no_op() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    let before = Arc::clone(store.metadata());
    store.dispatch(EditorAction::UpdateMetadata(Err(
        MeasurementError::NotRendered,
    )));
    assert!(Arc::ptr_eq(store.metadata(), &before));
}

#[test]
fn new_measurement_mid_session_keeps_the_starting_snapshot() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    let before = Arc::clone(store.metadata());
    start_drag(&mut store, (20.0, 20.0));
    drag_to(&mut store, (10.0, 0.0));

    let (_, metadata, props) = absolute_scene().build();
    store.dispatch(EditorAction::UpdateMetadata(Ok((metadata, props))));

    let session = store.session().expect("session survives");
    assert!(Arc::ptr_eq(&session.starting_metadata, &before));
    assert!(Arc::ptr_eq(&session.latest_metadata, store.metadata()));
    assert!(!Arc::ptr_eq(store.metadata(), &before));

    drag_to(&mut store, (20.0, 0.0));
    commit(&mut store);
    assert_eq!(left_top(store.unpatched()), (Some(30.0), Some(10.0)));
}

// ─── Failures ────────────────────────────────────────────────────────────

#[test]
fn a_failing_command_fails_the_whole_fold() {
    common::init_logging();
    let store = absolute_scene().store(&[AAA]);
    let ghost = path("sb/scene:root/ghost");
    let commands = vec![
        CanvasCommand::AdjustCssLengthProperty {
            when: WhenToRun::Always,
            target: path(AAA),
            prop: StyleProp::Left,
            delta: 5.0,
            parent_dimension: None,
            create_if_missing: true,
        },
        CanvasCommand::ReorderElement {
            when: WhenToRun::Always,
            target: ghost.clone(),
            index: 0,
        },
    ];
    let result = fold_and_apply_commands(
        store.unpatched(),
        &commands,
        InteractionLifecycle::EndInteraction,
    );
    assert_eq!(result.map(|_| ()), Err(CommandError::ElementNotFound(ghost)));
    assert_eq!(style(store.unpatched(), AAA, StyleProp::Left), Some(px(10.0)));
}

// ─── Input events ────────────────────────────────────────────────────────

#[test]
fn pointer_gesture_selects_drags_and_commits() {
    common::init_logging();
    let mut store = absolute_scene().store(&[]);
    store.handle_input(&InputEvent::pointer_down(30.0, 30.0));
    assert_eq!(store.unpatched().selected_views, vec![path(AAA)]);
    store.handle_input(&InputEvent::pointer_move(60.0, 30.0));
    assert_eq!(left_top(store.patched()), (Some(40.0), Some(10.0)));
    store.handle_input(&InputEvent::pointer_up(60.0, 30.0));

    assert!(store.session().is_none());
    assert_eq!(left_top(store.unpatched()), (Some(40.0), Some(10.0)));
}

#[test]
fn escape_cancels_a_pointer_drag() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    store.handle_input(&InputEvent::pointer_down(30.0, 30.0));
    store.handle_input(&InputEvent::pointer_move(60.0, 30.0));
    store.handle_input(&InputEvent::key_down("Escape"));

    assert!(store.session().is_none());
    assert_eq!(left_top(store.unpatched()), (Some(10.0), Some(10.0)));
    assert_eq!(store.unpatched().selected_views, vec![path(AAA)]);
}

#[test]
fn arrow_keys_nudge_until_released() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    store.handle_input(&InputEvent::key_down("ArrowRight"));
    store.handle_input(&InputEvent::key_down("ArrowRight"));
    store.handle_input(&InputEvent::key_down("ArrowDown").with_modifiers(Modifiers::shift()));
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::KeyboardAbsoluteMove)
    );
    assert_eq!(left_top(store.patched()), (Some(12.0), Some(20.0)));
    assert_eq!(left_top(store.unpatched()), (Some(10.0), Some(10.0)));

    store.handle_input(&InputEvent::KeyUp {
        key: Key::ArrowDown,
        modifiers: Modifiers::NONE,
    });
    assert!(store.session().is_none());
    assert_eq!(left_top(store.unpatched()), (Some(12.0), Some(20.0)));
}

#[test]
fn marquee_selects_what_it_touches() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    store.handle_input(&InputEvent::pointer_down(450.0, 5.0));
    assert_eq!(store.unpatched().selected_views, vec![]);
    store.handle_input(&InputEvent::pointer_move(250.0, 150.0));
    store.handle_input(&InputEvent::pointer_up(250.0, 150.0));
    assert_eq!(
        store.unpatched().selected_views,
        vec![path("sb/scene:root"), path("sb/scene:root/plain")]
    );
    assert!(store.session().is_none());
}
