//! Reordering flow and flex children.

mod common;

use canvas_core::{CanvasPoint, CanvasVector, CssValue, JsxElement, StyleProp};
use canvas_editor::{
    ActiveControl, CanvasCommand, CursorStyle, EditorAction, EditorStore, EngineConfig,
    Modifiers, SliderSnapping, StrategyId, StrategyStatus, WhenToRun,
};
use common::{
    LIST, SceneBuilder, block, child_order, flow_scene, inline, measured, path, rect,
    sized_flex_scene, style,
};
use pretty_assertions::assert_eq;

const TWO: &str = "sb/scene:list/two";

fn start(store: &mut EditorStore, at: (f32, f32), control: ActiveControl) {
    store.dispatch(EditorAction::CreateDragSession {
        start: CanvasPoint::new(at.0, at.1),
        modifiers: Modifiers::NONE,
        control,
    });
}

fn drag_to(store: &mut EditorStore, by: (f32, f32)) {
    store.dispatch(EditorAction::UpdateDragSession {
        drag: CanvasVector::new(by.0, by.1),
        modifiers: Modifiers::NONE,
    });
}

fn commit(store: &mut EditorStore) {
    store.dispatch(EditorAction::ClearInteractionSession {
        apply_changes: true,
    });
}

// ─── Slider ──────────────────────────────────────────────────────────────

#[test]
fn slider_moves_one_slot_per_step() {
    common::init_logging();
    let mut store = flow_scene().store(&[TWO]);
    start(&mut store, (200.0, 75.0), ActiveControl::FlowSlider);
    drag_to(&mut store, (40.0, 3.0));

    let state = store.strategy_state();
    assert_eq!(
        state.sorted_strategies,
        vec![(StrategyId::FlowReorderSlider, 100)]
    );
    assert_eq!(state.custom_state.last_reorder_idx, Some(2));
    assert_eq!(
        child_order(store.patched(), LIST),
        vec!["one", "three", "two", "four"]
    );
    assert_eq!(store.patched().canvas.cursor, Some(CursorStyle::ResizeEW));
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["one", "two", "three", "four"]
    );

    commit(&mut store);
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["one", "three", "two", "four"]
    );
    // the reorder and the re-render hint
    assert_eq!(store.last_commit().map(|c| c.applied), Some(2));
}

#[test]
fn slider_clamps_at_the_first_slot() {
    common::init_logging();
    let mut store = flow_scene().store(&[TWO]);
    start(&mut store, (200.0, 75.0), ActiveControl::FlowSlider);
    drag_to(&mut store, (-100.0, 0.0));
    commit(&mut store);
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["two", "one", "three", "four"]
    );
}

#[test]
fn raw_slider_values_only_move_on_full_steps() {
    common::init_logging();
    let config = EngineConfig {
        slider_snapping: SliderSnapping::RawValue,
        ..EngineConfig::default()
    };
    let mut store = flow_scene().store_with_config(&[TWO], config);
    start(&mut store, (200.0, 75.0), ActiveControl::FlowSlider);
    drag_to(&mut store, (50.0, 0.0));
    commit(&mut store);
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["one", "three", "two", "four"]
    );
}

#[test]
fn slider_slots_skip_children_that_did_not_render() {
    common::init_logging();
    let mut scene = SceneBuilder::new(
        JsxElement::new("list", "div"),
        rect(0.0, 0.0, 400.0, 150.0),
        measured,
    )
    .child(
        LIST,
        JsxElement::new("one", "div"),
        rect(0.0, 0.0, 400.0, 50.0),
        block,
    )
    .unrendered_child(LIST, JsxElement::new("hidden", "div"));
    for (i, uid) in ["two", "three"].into_iter().enumerate() {
        scene = scene.child(
            LIST,
            JsxElement::new(uid, "div"),
            rect(0.0, 50.0 * (i + 1) as f32, 400.0, 50.0),
            block,
        );
    }
    let mut store = scene.store(&["sb/scene:list/one"]);
    start(&mut store, (200.0, 25.0), ActiveControl::FlowSlider);
    drag_to(&mut store, (64.0, 0.0));

    assert_eq!(store.strategy_state().custom_state.last_reorder_idx, Some(2));
    assert_eq!(
        child_order(store.patched(), LIST),
        vec!["hidden", "two", "three", "one"]
    );

    drag_to(&mut store, (32.0, 0.0));
    assert_eq!(
        child_order(store.patched(), LIST),
        vec!["hidden", "two", "one", "three"]
    );
    commit(&mut store);
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["hidden", "two", "one", "three"]
    );
}

#[test]
fn inline_element_moved_among_blocks_becomes_a_block() {
    common::init_logging();
    let scene = SceneBuilder::new(
        JsxElement::new("list", "div"),
        rect(0.0, 0.0, 400.0, 100.0),
        measured,
    )
    .child(
        LIST,
        JsxElement::new("one", "div"),
        rect(0.0, 0.0, 400.0, 50.0),
        block,
    )
    .child(
        LIST,
        JsxElement::new("two", "span"),
        rect(0.0, 50.0, 40.0, 20.0),
        inline,
    );
    let mut store = scene.store(&[TWO]);
    start(&mut store, (20.0, 60.0), ActiveControl::FlowSlider);
    drag_to(&mut store, (-32.0, 0.0));
    commit(&mut store);

    let editor = store.unpatched();
    assert_eq!(child_order(editor, LIST), vec!["two", "one"]);
    assert_eq!(
        style(editor, TWO, StyleProp::Display),
        Some(CssValue::keyword("block"))
    );
}

#[test]
fn reorder_next_to_a_component_root_is_not_permitted() {
    common::init_logging();
    let scene = flow_scene().rendered(
        &path("sb/scene:list:widget"),
        None,
        rect(0.0, 200.0, 400.0, 50.0),
        block,
    );
    let mut store = scene.store(&[TWO]);
    start(&mut store, (200.0, 75.0), ActiveControl::FlowSlider);
    drag_to(&mut store, (40.0, 0.0));

    let state = store.strategy_state();
    assert_eq!(state.current_strategy, Some(StrategyId::FlowReorderSlider));
    assert_eq!(state.status, StrategyStatus::Failure);
    assert_eq!(
        state.commands,
        vec![CanvasCommand::SetCursor {
            when: WhenToRun::MidInteraction,
            cursor: CursorStyle::NotPermitted,
        }]
    );
    assert_eq!(
        store.patched().canvas.cursor,
        Some(CursorStyle::NotPermitted)
    );

    commit(&mut store);
    assert_eq!(store.last_commit().map(|c| c.applied), Some(0));
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["one", "two", "three", "four"]
    );
}

// ─── Dragging onto siblings ──────────────────────────────────────────────

#[test]
fn flow_drag_takes_the_hovered_sibling_slot() {
    common::init_logging();
    let mut store = flow_scene().store(&["sb/scene:list/one"]);
    start(&mut store, (200.0, 25.0), ActiveControl::BoundingArea);
    drag_to(&mut store, (0.0, 110.0));
    assert_eq!(
        store.strategy_state().current_strategy,
        Some(StrategyId::FlowReorder)
    );
    assert_eq!(
        child_order(store.patched(), LIST),
        vec!["two", "three", "one", "four"]
    );
    assert_eq!(store.patched().canvas.cursor, Some(CursorStyle::Move));

    // Off every sibling: the last slot sticks.
    drag_to(&mut store, (300.0, 400.0));
    assert_eq!(store.strategy_state().custom_state.last_reorder_idx, Some(2));
    commit(&mut store);
    assert_eq!(
        child_order(store.unpatched(), LIST),
        vec!["two", "three", "one", "four"]
    );
}

#[test]
fn flex_drag_counts_sibling_centres_along_the_main_axis() {
    common::init_logging();
    let mut store = sized_flex_scene().store(&["sb/scene:aaa/bbb"]);
    start(&mut store, (90.0, 90.0), ActiveControl::BoundingArea);
    drag_to(&mut store, (230.0, 0.0));
    assert_eq!(
        store.strategy_state().sorted_strategies,
        vec![(StrategyId::FlexReorder, 1)]
    );
    commit(&mut store);
    assert_eq!(
        child_order(store.unpatched(), "sb/scene:aaa"),
        vec!["ccc", "ddd", "bbb"]
    );
}

#[test]
fn flex_drag_back_to_the_start_restores_the_order() {
    common::init_logging();
    let mut store = sized_flex_scene().store(&["sb/scene:aaa/bbb"]);
    start(&mut store, (90.0, 90.0), ActiveControl::BoundingArea);
    drag_to(&mut store, (230.0, 0.0));
    drag_to(&mut store, (10.0, 0.0));
    assert_eq!(
        child_order(store.patched(), "sb/scene:aaa"),
        vec!["bbb", "ccc", "ddd"]
    );
}
