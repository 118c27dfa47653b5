//! Which strategy wins a session, and how the user can override it.

mod common;

use canvas_core::{CanvasPoint, CanvasVector, CssValue, JsxElement, StyleProp};
use canvas_editor::strategies::{
    AbsoluteDuplicateStrategy, AbsoluteMoveStrategy, CanvasStrategy, registered_strategies,
};
use canvas_editor::{
    ActiveControl, EditorAction, EditorState, EditorStore, EngineConfig, InteractionCanvasState,
    InteractionSession, Key, Modifiers, StrategyId,
};
use common::{
    APP_FILE, CCC, SceneBuilder, absolute, absolute_scene, flow_scene, path, px, rect,
    sized_flex_scene,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const AAA: &str = "sb/scene:root/aaa";

fn drag(store: &mut EditorStore, by: (f32, f32), modifiers: Modifiers) {
    store.dispatch(EditorAction::CreateDragSession {
        start: CanvasPoint::new(20.0, 20.0),
        modifiers,
        control: ActiveControl::BoundingArea,
    });
    store.dispatch(EditorAction::UpdateDragSession {
        drag: CanvasVector::new(by.0, by.1),
        modifiers,
    });
}

fn competing(store: &EditorStore) -> Vec<(StrategyId, u32)> {
    store.strategy_state().sorted_strategies.clone()
}

// ─── Fitness ─────────────────────────────────────────────────────────────

#[test]
fn plain_drag_moves() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (5.0, 5.0), Modifiers::NONE);
    assert_eq!(competing(&store), vec![(StrategyId::AbsoluteMove, 1)]);
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::AbsoluteMove)
    );
}

#[test]
fn alt_drag_prefers_duplicate_over_move() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (5.0, 5.0), Modifiers::alt());
    assert_eq!(
        competing(&store),
        vec![
            (StrategyId::AbsoluteDuplicate, 2),
            (StrategyId::AbsoluteMove, 1),
        ]
    );
    assert_eq!(store.strategy_state().current_fitness, 2);
}

#[test]
fn dropping_into_a_bounded_container_reparents() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (230.0, 230.0), Modifiers::NONE);
    assert_eq!(
        competing(&store),
        vec![
            (StrategyId::AbsoluteReparent, 3),
            (StrategyId::AbsoluteMove, 1),
        ]
    );
}

#[test]
fn unbounded_container_only_offers_forced_reparent() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (230.0, 30.0), Modifiers::NONE);
    assert_eq!(
        competing(&store),
        vec![
            (StrategyId::ForcedAbsoluteReparent, 2),
            (StrategyId::AbsoluteMove, 1),
        ]
    );
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::ForcedAbsoluteReparent)
    );
}

#[test]
fn equal_fitness_goes_to_the_first_registered() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (230.0, 30.0), Modifiers::alt());
    assert_eq!(
        competing(&store),
        vec![
            (StrategyId::AbsoluteDuplicate, 2),
            (StrategyId::ForcedAbsoluteReparent, 2),
            (StrategyId::AbsoluteMove, 1),
        ]
    );
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::AbsoluteDuplicate)
    );
}

#[test]
fn selection_is_deterministic() {
    common::init_logging();
    let run = || {
        let mut store = absolute_scene().store(&[AAA]);
        drag(&mut store, (230.0, 230.0), Modifiers::NONE);
        store.strategy_state().clone()
    };
    let first = run();
    for _ in 0..5 {
        assert_eq!(run(), first);
    }
}

#[test]
fn repeating_a_drag_update_reproduces_the_tick() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (40.0, 0.0), Modifiers::NONE);
    let first = store.strategy_state().clone();
    let patched = store.patched().selected_views.clone();
    store.dispatch(EditorAction::UpdateDragSession {
        drag: CanvasVector::new(40.0, 0.0),
        modifiers: Modifiers::NONE,
    });
    assert_eq!(store.strategy_state(), &first);
    assert_eq!(store.patched().selected_views, patched);
}

// ─── Applicability ───────────────────────────────────────────────────────

fn keyboard_session(store: &EditorStore) -> InteractionSession {
    InteractionSession::new_keyboard(
        Key::ArrowRight,
        Modifiers::NONE,
        Arc::clone(store.metadata()),
        Arc::new(canvas_core::AllElementProps::new()),
    )
}

fn applicable_ids(store: &EditorStore, session: &InteractionSession) -> Vec<StrategyId> {
    let canvas = InteractionCanvasState::new(store.unpatched(), store.config());
    registered_strategies()
        .iter()
        .filter(|s| {
            s.is_applicable(
                &canvas,
                Some(session),
                &session.starting_metadata,
                &session.starting_all_element_props,
            )
        })
        .map(|s| s.id())
        .collect()
}

#[test]
fn keyboard_sessions_rule_out_drag_strategies() {
    common::init_logging();
    let absolute = absolute_scene().store(&[AAA]);
    assert_eq!(
        applicable_ids(&absolute, &keyboard_session(&absolute)),
        vec![StrategyId::KeyboardAbsoluteMove]
    );

    let flex = sized_flex_scene().store(&[CCC]);
    assert_eq!(applicable_ids(&flex, &keyboard_session(&flex)), vec![]);

    let flow = flow_scene().store(&["sb/scene:list/two"]);
    assert_eq!(applicable_ids(&flow, &keyboard_session(&flow)), vec![]);
}

#[test]
fn duplicate_rejects_the_root_of_an_instance() {
    common::init_logging();
    let root = JsxElement::new("aaa", "div")
        .with_style(StyleProp::Position, CssValue::keyword("absolute"))
        .with_style(StyleProp::Left, px(0.0));
    let instance_root = path("scene-aaa/app-entity:aaa");
    let (project, metadata, props) = SceneBuilder::empty()
        .component(APP_FILE, "App", true, root.clone())
        .rendered(
            &instance_root,
            Some(&root),
            rect(0.0, 0.0, 100.0, 100.0),
            absolute,
        )
        .build();
    let mut editor = EditorState::new(project);
    editor.selected_views = vec![instance_root];
    let config = EngineConfig::default();
    let canvas = InteractionCanvasState::new(&editor, &config);
    let metadata = Arc::new(metadata);
    let props = Arc::new(props);
    let session = InteractionSession::new_drag(
        CanvasPoint::new(10.0, 10.0),
        Modifiers::alt(),
        ActiveControl::BoundingArea,
        Arc::clone(&metadata),
        Arc::clone(&props),
    );

    assert!(!AbsoluteDuplicateStrategy.is_applicable(
        &canvas,
        Some(&session),
        &metadata,
        &props
    ));
    assert!(AbsoluteMoveStrategy.is_applicable(&canvas, Some(&session), &metadata, &props));
}

#[test]
fn flow_children_offer_the_slider_control() {
    common::init_logging();
    let store = flow_scene().store(&["sb/scene:list/two"]);
    let keys: Vec<String> = store
        .controls_to_render()
        .into_iter()
        .map(|c| c.key)
        .collect();
    assert_eq!(keys, vec!["flow-slider-control".to_string()]);
}

#[test]
fn nothing_selected_means_nothing_competes() {
    common::init_logging();
    let mut store = absolute_scene().store(&[]);
    drag(&mut store, (5.0, 5.0), Modifiers::NONE);
    assert_eq!(competing(&store), vec![]);
    assert_eq!(store.strategy_state().current_strategy, None);
    assert!(store.session().is_some());
}

// ─── User overrides ──────────────────────────────────────────────────────

#[test]
fn cycling_walks_the_competing_list() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (230.0, 30.0), Modifiers::NONE);
    let current = |store: &EditorStore| store.strategy_state().current_strategy;

    store.dispatch(EditorAction::CycleStrategy { forward: true });
    assert_eq!(current(&store), Some(StrategyId::AbsoluteMove));
    store.dispatch(EditorAction::CycleStrategy { forward: true });
    assert_eq!(current(&store), Some(StrategyId::ForcedAbsoluteReparent));
    store.dispatch(EditorAction::CycleStrategy { forward: false });
    assert_eq!(current(&store), Some(StrategyId::AbsoluteMove));
}

#[test]
fn preferred_strategy_survives_later_ticks() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (230.0, 30.0), Modifiers::NONE);
    store.dispatch(EditorAction::SetUserPreferredStrategy(Some(
        StrategyId::AbsoluteMove,
    )));
    store.dispatch(EditorAction::UpdateDragSession {
        drag: CanvasVector::new(231.0, 31.0),
        modifiers: Modifiers::NONE,
    });
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::AbsoluteMove)
    );
}

#[test]
fn preference_for_a_non_competing_strategy_is_ignored() {
    common::init_logging();
    let mut store = absolute_scene().store(&[AAA]);
    drag(&mut store, (230.0, 30.0), Modifiers::NONE);
    store.dispatch(EditorAction::SetUserPreferredStrategy(Some(
        StrategyId::FlexResize,
    )));
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::ForcedAbsoluteReparent)
    );
}
