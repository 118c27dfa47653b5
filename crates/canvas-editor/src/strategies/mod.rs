//! Canvas strategies.
//!
//! A strategy is one way of turning a gesture into document edits: move an
//! absolute element by its pins, reorder a flow element, resize a flex
//! child. Every registered strategy is asked whether it applies to the
//! current selection and session, scores itself, and the highest scorer
//! produces the commands for the tick.
//!
//! Strategies are stateless unit values in a fixed registry. Anything they
//! need to remember between ticks goes into [`CustomStrategyState`], which
//! the dispatcher threads back in on the next call.
//!
//! ## Registry
//!
//! | Strategy | Competes when | Fitness |
//! |----------|---------------|---------|
//! | Absolute move | drag on bounding area | 1 |
//! | Absolute duplicate | drag on bounding area with Alt | 2 |
//! | Absolute reparent | strict-bounds target differs from the parent | 3 |
//! | Forced absolute reparent | only a missing-bounds target exists | 2 |
//! | Absolute resize | resize handle | 1 |
//! | Keyboard absolute move | arrow keys | 1 |
//! | Flex resize | resize handle on a flex child | 1 |
//! | Flex reorder | drag on a flex child | 1 |
//! | Flow reorder | drag on a flow child | 1 |
//! | Flow reorder slider | drag on the flow slider | 100 |
//!
//! Ties go to the strategy registered first.

pub mod absolute_duplicate;
pub mod absolute_move;
pub mod absolute_reparent;
pub mod absolute_resize;
pub mod flex_reorder;
pub mod flex_resize;
pub mod flow_reorder;
pub mod helpers;
pub mod keyboard_move;

use crate::commands::{CanvasCommand, InteractionLifecycle};
use crate::config::EngineConfig;
use crate::session::InteractionSession;
use crate::state::EditorState;
use canvas_core::{AllElementProps, ElementInstanceMetadataMap, ElementPath, ProjectContents, Uid};
use canvas_render::ControlWithProps;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use absolute_duplicate::AbsoluteDuplicateStrategy;
pub use absolute_move::AbsoluteMoveStrategy;
pub use absolute_reparent::{AbsoluteReparentStrategy, MissingBoundsHandling};
pub use absolute_resize::AbsoluteResizeStrategy;
pub use flex_reorder::FlexReorderStrategy;
pub use flex_resize::FlexResizeStrategy;
pub use flow_reorder::{FlowReorderSliderStrategy, FlowReorderStrategy};
pub use keyboard_move::KeyboardAbsoluteMoveStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyId {
    AbsoluteMove,
    AbsoluteDuplicate,
    AbsoluteReparent,
    ForcedAbsoluteReparent,
    AbsoluteResize,
    KeyboardAbsoluteMove,
    FlexResize,
    FlexReorder,
    FlowReorder,
    FlowReorderSlider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyStatus {
    Success,
    /// The gesture is understood but not allowed; the commands only carry
    /// feedback (e.g. a not-permitted cursor).
    Failure,
}

/// Strategy memory carried between ticks of one session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomStrategyState {
    pub last_reorder_idx: Option<usize>,
    /// Original path → UID of its duplicate, so every tick of a duplicate
    /// drag addresses the same copies.
    pub duplicated_element_new_uids: BTreeMap<ElementPath, Uid>,
    /// UID of every descendant of a duplicated element → UID of its copy.
    pub duplicated_descendant_uids: BTreeMap<Uid, Uid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyApplicationResult {
    pub commands: Vec<CanvasCommand>,
    /// `None` keeps the previous custom state.
    pub custom_state: Option<CustomStrategyState>,
    pub status: StrategyStatus,
}

impl StrategyApplicationResult {
    pub fn success(commands: Vec<CanvasCommand>) -> Self {
        Self {
            commands,
            custom_state: None,
            status: StrategyStatus::Success,
        }
    }

    pub fn empty() -> Self {
        Self::success(Vec::new())
    }

    pub fn failure(commands: Vec<CanvasCommand>) -> Self {
        Self {
            commands,
            custom_state: None,
            status: StrategyStatus::Failure,
        }
    }

    pub fn with_custom_state(mut self, state: CustomStrategyState) -> Self {
        self.custom_state = Some(state);
        self
    }
}

/// What a strategy can see of the editor while deciding.
#[derive(Debug, Clone, Copy)]
pub struct InteractionCanvasState<'a> {
    /// The committed (unpatched) editor state.
    pub editor: &'a EditorState,
    pub config: &'a EngineConfig,
}

impl<'a> InteractionCanvasState<'a> {
    pub fn new(editor: &'a EditorState, config: &'a EngineConfig) -> Self {
        Self { editor, config }
    }

    pub fn selected_views(&self) -> &'a [ElementPath] {
        &self.editor.selected_views
    }

    pub fn project(&self) -> &'a ProjectContents {
        &self.editor.project
    }

    pub fn scale(&self) -> f32 {
        self.editor.canvas.scale
    }
}

pub trait CanvasStrategy: Sync {
    fn id(&self) -> StrategyId;

    fn name(&self) -> &'static str;

    /// Whether the strategy could handle the current selection. Never
    /// panics; missing metadata means `false`.
    fn is_applicable(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: Option<&InteractionSession>,
        metadata: &ElementInstanceMetadataMap,
        props: &AllElementProps,
    ) -> bool;

    /// Overlay controls this strategy wants on the canvas.
    fn controls_to_render(&self) -> Vec<ControlWithProps>;

    /// How well the strategy fits the session. `0` means it does not compete.
    fn fitness(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        custom: &CustomStrategyState,
    ) -> u32;

    fn apply(
        &self,
        canvas: &InteractionCanvasState<'_>,
        session: &InteractionSession,
        custom: &CustomStrategyState,
        lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult;
}

// ─── Registry ────────────────────────────────────────────────────────────

static STRATEGIES: &[&dyn CanvasStrategy] = &[
    &AbsoluteMoveStrategy,
    &AbsoluteDuplicateStrategy,
    &AbsoluteReparentStrategy::STRICT,
    &AbsoluteReparentStrategy::FORCED,
    &AbsoluteResizeStrategy,
    &KeyboardAbsoluteMoveStrategy,
    &FlexResizeStrategy,
    &FlexReorderStrategy,
    &FlowReorderStrategy,
    &FlowReorderSliderStrategy,
];

/// Every strategy, in registration order.
pub fn registered_strategies() -> &'static [&'static dyn CanvasStrategy] {
    STRATEGIES
}

pub fn strategy_by_id(id: StrategyId) -> Option<&'static dyn CanvasStrategy> {
    STRATEGIES.iter().copied().find(|s| s.id() == id)
}

/// A competing strategy and its score.
#[derive(Clone, Copy)]
pub struct StrategyWithFitness {
    pub strategy: &'static dyn CanvasStrategy,
    pub fitness: u32,
}

impl fmt::Debug for StrategyWithFitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.strategy.id(), self.fitness)
    }
}

/// Strategies applicable to the selection, in registration order.
pub fn applicable_strategies(
    canvas: &InteractionCanvasState<'_>,
    session: Option<&InteractionSession>,
    metadata: &ElementInstanceMetadataMap,
    props: &AllElementProps,
) -> Vec<&'static dyn CanvasStrategy> {
    STRATEGIES
        .iter()
        .copied()
        .filter(|s| s.is_applicable(canvas, session, metadata, props))
        .collect()
}

/// Applicable strategies with non-zero fitness, best first. The sort is
/// stable, so equal scores keep registration order.
pub fn sorted_strategies(
    canvas: &InteractionCanvasState<'_>,
    session: &InteractionSession,
    custom: &CustomStrategyState,
) -> Vec<StrategyWithFitness> {
    let mut competing: Vec<StrategyWithFitness> = applicable_strategies(
        canvas,
        Some(session),
        &session.starting_metadata,
        &session.starting_all_element_props,
    )
    .into_iter()
    .map(|strategy| StrategyWithFitness {
        strategy,
        fitness: strategy.fitness(canvas, session, custom),
    })
    .filter(|s| s.fitness > 0)
    .collect();
    competing.sort_by(|a, b| b.fitness.cmp(&a.fitness));
    log::trace!("competing strategies: {competing:?}");
    competing
}

/// The user's preferred strategy if it competes, else the best scorer.
pub fn pick_strategy(
    sorted: &[StrategyWithFitness],
    preferred: Option<StrategyId>,
) -> Option<StrategyWithFitness> {
    preferred
        .and_then(|id| sorted.iter().find(|s| s.strategy.id() == id))
        .or_else(|| sorted.first())
        .copied()
}

/// Overlay controls of every applicable strategy, with the active one's
/// while-active controls included.
pub fn controls_for(
    applicable: &[&'static dyn CanvasStrategy],
    active: Option<StrategyId>,
) -> Vec<ControlWithProps> {
    let per_strategy: Vec<(Vec<ControlWithProps>, bool)> = applicable
        .iter()
        .map(|s| (s.controls_to_render(), Some(s.id()) == active))
        .collect();
    canvas_render::visible_controls(
        per_strategy
            .iter()
            .map(|(controls, is_active)| (controls.as_slice(), *is_active)),
    )
}
