//! Dispatch and patch reconciliation.
//!
//! The store holds two editor states:
//!
//! - **unpatched**: the durable document. Only ordinary actions and commits
//!   touch it.
//! - **patched**: what the canvas shows. Rebuilt from scratch on every tick
//!   by folding the winning strategy's mid-interaction commands over
//!   unpatched, so it can never drift.
//!
//! A tick picks the best competing strategy for the current session, runs
//! it, and folds its commands. Committing runs the winner one last time in
//! [`InteractionLifecycle::EndInteraction`] and folds only the `Always`
//! commands into unpatched, all or nothing. Cancelling just drops the
//! session.

use crate::commands::{CanvasCommand, InteractionLifecycle, fold_and_apply_commands};
use crate::config::{EngineConfig, PressDuringSession};
use crate::error::CommandError;
use crate::input::{InputEvent, Key, Modifiers};
use crate::interaction::{InteractionTool, PointerTarget};
use crate::session::{ActiveControl, InteractionSession, SessionPhase};
use crate::state::EditorState;
use crate::strategies::{
    CustomStrategyState, InteractionCanvasState, StrategyId, StrategyStatus, applicable_strategies,
    controls_for, pick_strategy, sorted_strategies, strategy_by_id,
};
use canvas_core::{
    AllElementProps, CanvasPoint, CanvasRect, CanvasVector, ElementInstanceMetadataMap,
    ElementPath, MeasurementError, clear_path_cache,
};
use canvas_render::{ControlWithProps, hit_test, hit_test_rect};
use std::sync::Arc;

/// Everything that can happen to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    SelectComponents(Vec<ElementPath>),
    /// Marquee selection; `add` keeps the current selection.
    SelectInRect { rect: CanvasRect, add: bool },
    CreateDragSession {
        start: CanvasPoint,
        modifiers: Modifiers,
        control: ActiveControl,
    },
    /// `drag` is measured from the session's start point.
    UpdateDragSession {
        drag: CanvasVector,
        modifiers: Modifiers,
    },
    CreateKeyboardSession { key: Key, modifiers: Modifiers },
    UpdateKeyboardSession { key: Key, modifiers: Modifiers },
    ClearInteractionSession { apply_changes: bool },
    SetUserPreferredStrategy(Option<StrategyId>),
    /// Move the preferred strategy along the competing list.
    CycleStrategy { forward: bool },
    /// A new measurement from the renderer, or why it failed.
    UpdateMetadata(Result<(ElementInstanceMetadataMap, AllElementProps), MeasurementError>),
}

/// What the winning strategy produced on the latest tick.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyState {
    pub current_strategy: Option<StrategyId>,
    pub current_fitness: u32,
    /// Full command list of the latest apply, both tags.
    pub commands: Vec<CanvasCommand>,
    pub custom_state: CustomStrategyState,
    pub status: StrategyStatus,
    /// Competing strategies of the latest tick, best first.
    pub sorted_strategies: Vec<(StrategyId, u32)>,
    /// Set when the latest fold failed; patched fell back to unpatched.
    pub error: Option<CommandError>,
}

impl Default for StrategyState {
    fn default() -> Self {
        Self {
            current_strategy: None,
            current_fitness: 0,
            commands: Vec::new(),
            custom_state: CustomStrategyState::default(),
            status: StrategyStatus::Success,
            sorted_strategies: Vec::new(),
            error: None,
        }
    }
}

/// Outcome of the most recent commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitSummary {
    pub strategy: Option<StrategyId>,
    /// Durable commands that changed unpatched. Skipped commands only
    /// show up in `descriptions`.
    pub applied: usize,
    pub descriptions: Vec<String>,
    pub error: Option<CommandError>,
}

pub struct EditorStore {
    unpatched: EditorState,
    patched: EditorState,
    strategy_state: StrategyState,
    session: Option<InteractionSession>,
    metadata: Arc<ElementInstanceMetadataMap>,
    all_element_props: Arc<AllElementProps>,
    config: EngineConfig,
    tool: InteractionTool,
    last_commit: Option<CommitSummary>,
}

impl EditorStore {
    pub fn new(editor: EditorState, config: EngineConfig) -> Self {
        Self {
            patched: editor.clone(),
            unpatched: editor,
            strategy_state: StrategyState::default(),
            session: None,
            metadata: Arc::new(ElementInstanceMetadataMap::new()),
            all_element_props: Arc::new(AllElementProps::new()),
            config,
            tool: InteractionTool::new(),
            last_commit: None,
        }
    }

    /// Start from an existing measurement.
    pub fn with_metadata(
        mut self,
        metadata: ElementInstanceMetadataMap,
        props: AllElementProps,
    ) -> Self {
        self.metadata = Arc::new(metadata);
        self.all_element_props = Arc::new(props);
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn unpatched(&self) -> &EditorState {
        &self.unpatched
    }

    pub fn patched(&self) -> &EditorState {
        &self.patched
    }

    pub fn strategy_state(&self) -> &StrategyState {
        &self.strategy_state
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    pub fn metadata(&self) -> &Arc<ElementInstanceMetadataMap> {
        &self.metadata
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn last_commit(&self) -> Option<&CommitSummary> {
        self.last_commit.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.session, self.strategy_state.current_strategy) {
            (None, _) => SessionPhase::Idle,
            (Some(_), None) => SessionPhase::Active,
            (Some(_), Some(_)) => SessionPhase::StrategyActive,
        }
    }

    /// Overlay controls for the current selection and session.
    pub fn controls_to_render(&self) -> Vec<ControlWithProps> {
        let canvas = InteractionCanvasState::new(&self.unpatched, &self.config);
        let (metadata, props) = match &self.session {
            Some(s) => (&s.starting_metadata, &s.starting_all_element_props),
            None => (&self.metadata, &self.all_element_props),
        };
        let applicable = applicable_strategies(&canvas, self.session.as_ref(), metadata, props);
        controls_for(&applicable, self.strategy_state.current_strategy)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// What a press at `point` lands on, from the latest measurement.
    pub fn pointer_target_at(&self, point: CanvasPoint) -> PointerTarget {
        match hit_test(&self.metadata, point, |_| true) {
            Some(path) => PointerTarget::Element(path),
            None => PointerTarget::Empty,
        }
    }

    /// Run an input event through the interaction tool and dispatch the
    /// resulting actions. Presses hit-test the latest measurement.
    pub fn handle_input(&mut self, event: &InputEvent) {
        let target = match (event, event.position()) {
            (InputEvent::PointerDown { .. }, Some(point)) => self.pointer_target_at(point),
            _ => PointerTarget::Empty,
        };
        self.handle_input_on(event, &target);
    }

    /// Like [`handle_input`](Self::handle_input) with an explicit press
    /// target, for presses on canvas controls.
    pub fn handle_input_on(&mut self, event: &InputEvent, target: &PointerTarget) {
        if matches!(event, InputEvent::PointerDown { .. }) {
            match (self.session.is_some(), self.config.press_during_session) {
                (true, PressDuringSession::Ignore) => {
                    log::debug!("ignoring press while an interaction is running");
                    return;
                }
                (true, PressDuringSession::ImplicitCommit) => {
                    self.tool.reset();
                    self.commit();
                }
                // The session ended behind the tool's back.
                (false, _) => self.tool.reset(),
            }
        }
        let actions = self
            .tool
            .handle(event, target, &self.unpatched.selected_views);
        for action in actions {
            self.dispatch(action);
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    pub fn dispatch(&mut self, action: EditorAction) {
        log::trace!("dispatch {action:?}");
        match action {
            EditorAction::SelectComponents(paths) => {
                self.unpatched.selected_views = paths;
                self.tick();
            }
            EditorAction::SelectInRect { rect, add } => {
                let hits = hit_test_rect(&self.metadata, rect);
                let mut selection = if add {
                    self.unpatched.selected_views.clone()
                } else {
                    Vec::new()
                };
                for path in hits {
                    if !selection.contains(&path) {
                        selection.push(path);
                    }
                }
                self.unpatched.selected_views = selection;
                self.tick();
            }
            EditorAction::CreateDragSession {
                start,
                modifiers,
                control,
            } => {
                if !self.make_room_for_session() {
                    return;
                }
                self.session = Some(InteractionSession::new_drag(
                    start,
                    modifiers,
                    control,
                    Arc::clone(&self.metadata),
                    Arc::clone(&self.all_element_props),
                ));
                self.strategy_state = StrategyState::default();
                self.patched = self.unpatched.clone();
            }
            EditorAction::UpdateDragSession { drag, modifiers } => {
                let Some(session) = &self.session else {
                    log::debug!("drag update without a session");
                    return;
                };
                self.session = Some(session.with_drag(drag, modifiers));
                self.tick();
            }
            EditorAction::CreateKeyboardSession { key, modifiers } => {
                if !self.make_room_for_session() {
                    return;
                }
                self.session = Some(InteractionSession::new_keyboard(
                    key,
                    modifiers,
                    Arc::clone(&self.metadata),
                    Arc::clone(&self.all_element_props),
                ));
                self.strategy_state = StrategyState::default();
                self.tick();
            }
            EditorAction::UpdateKeyboardSession { key, modifiers } => {
                let Some(session) = &self.session else {
                    log::debug!("key update without a session");
                    return;
                };
                self.session = Some(session.with_key(key, modifiers));
                self.tick();
            }
            EditorAction::ClearInteractionSession { apply_changes } => {
                if apply_changes {
                    self.commit();
                } else {
                    self.cancel();
                }
            }
            EditorAction::SetUserPreferredStrategy(strategy) => {
                let Some(session) = &self.session else {
                    return;
                };
                self.session = Some(session.with_preferred_strategy(strategy));
                self.tick();
            }
            EditorAction::CycleStrategy { forward } => self.cycle_strategy(forward),
            EditorAction::UpdateMetadata(Ok((metadata, props))) => {
                clear_path_cache();
                self.metadata = Arc::new(metadata);
                self.all_element_props = Arc::new(props);
                if let Some(session) = &self.session {
                    self.session = Some(session.with_latest_metadata(
                        Arc::clone(&self.metadata),
                        Arc::clone(&self.all_element_props),
                    ));
                }
            }
            EditorAction::UpdateMetadata(Err(err)) => {
                log::warn!("ignoring failed measurement: {err}");
            }
        }
    }

    /// Decide what to do with a running session when a new one starts.
    /// Returns whether the new session may be created.
    fn make_room_for_session(&mut self) -> bool {
        if self.session.is_none() {
            return true;
        }
        match self.config.press_during_session {
            PressDuringSession::Ignore => {
                log::debug!("ignoring press while an interaction is running");
                false
            }
            PressDuringSession::ImplicitCommit => {
                self.commit();
                true
            }
        }
    }

    fn cycle_strategy(&mut self, forward: bool) {
        let Some(session) = &self.session else {
            return;
        };
        let sorted = &self.strategy_state.sorted_strategies;
        if sorted.len() < 2 {
            return;
        }
        let current = self
            .strategy_state
            .current_strategy
            .and_then(|id| sorted.iter().position(|(s, _)| *s == id))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % sorted.len()
        } else {
            (current + sorted.len() - 1) % sorted.len()
        };
        let preferred = sorted[next].0;
        log::debug!("preferring strategy {preferred:?}");
        self.session = Some(session.with_preferred_strategy(Some(preferred)));
        self.tick();
    }

    // ─── Reconciliation ──────────────────────────────────────────────────

    /// Re-run strategy selection for the current session and rebuild
    /// patched from unpatched.
    fn tick(&mut self) {
        let Some(session) = &self.session else {
            self.patched = self.unpatched.clone();
            return;
        };
        let canvas = InteractionCanvasState::new(&self.unpatched, &self.config);
        let previous = &self.strategy_state;

        // Custom state only survives while the same strategy stays on top.
        let sorted = sorted_strategies(&canvas, session, &previous.custom_state);
        let sorted_ids: Vec<(StrategyId, u32)> = sorted
            .iter()
            .map(|s| (s.strategy.id(), s.fitness))
            .collect();
        let Some(winner) = pick_strategy(&sorted, session.user_preferred_strategy) else {
            self.strategy_state = StrategyState {
                sorted_strategies: sorted_ids,
                ..StrategyState::default()
            };
            self.patched = self.unpatched.clone();
            return;
        };
        let winner_id = winner.strategy.id();
        let custom = if previous.current_strategy == Some(winner_id) {
            previous.custom_state.clone()
        } else {
            CustomStrategyState::default()
        };

        let result = winner.strategy.apply(
            &canvas,
            session,
            &custom,
            InteractionLifecycle::MidInteraction,
        );
        log::trace!(
            "{} produced {} command(s)",
            winner.strategy.name(),
            result.commands.len()
        );

        let (patched, error) = match fold_and_apply_commands(
            &self.unpatched,
            &result.commands,
            InteractionLifecycle::MidInteraction,
        ) {
            Ok((patched, _)) => (patched, None),
            Err(err) => {
                log::warn!("{} failed this tick: {err}", winner.strategy.name());
                (self.unpatched.clone(), Some(err))
            }
        };
        self.patched = patched;
        self.strategy_state = StrategyState {
            current_strategy: Some(winner_id),
            current_fitness: winner.fitness,
            commands: result.commands,
            custom_state: result.custom_state.unwrap_or(custom),
            status: result.status,
            sorted_strategies: sorted_ids,
            error,
        };
    }

    /// Fold the winner's durable commands into unpatched and end the
    /// session.
    fn commit(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let strategy_state = std::mem::take(&mut self.strategy_state);
        let mut summary = CommitSummary {
            strategy: strategy_state.current_strategy,
            applied: 0,
            descriptions: Vec::new(),
            error: None,
        };

        if let Some(strategy) = strategy_state.current_strategy.and_then(strategy_by_id) {
            let canvas = InteractionCanvasState::new(&self.unpatched, &self.config);
            let result = strategy.apply(
                &canvas,
                &session,
                &strategy_state.custom_state,
                InteractionLifecycle::EndInteraction,
            );
            match fold_and_apply_commands(
                &self.unpatched,
                &result.commands,
                InteractionLifecycle::EndInteraction,
            ) {
                Ok((mut committed, report)) => {
                    committed.clear_transient_canvas_state();
                    self.unpatched = committed;
                    summary.applied = report.changed;
                    summary.descriptions = report.descriptions;
                }
                Err(err) => {
                    log::warn!("commit of {} failed: {err}", strategy.name());
                    summary.error = Some(err);
                }
            }
        }

        log::debug!(
            "committed {:?}: {} durable command(s)",
            summary.strategy,
            summary.applied
        );
        self.last_commit = Some(summary);
        self.patched = self.unpatched.clone();
    }

    /// Drop the session without touching unpatched.
    fn cancel(&mut self) {
        if self.session.take().is_some() {
            log::debug!("interaction cancelled");
        }
        self.strategy_state = StrategyState::default();
        self.patched = self.unpatched.clone();
    }
}
