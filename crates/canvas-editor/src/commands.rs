//! Canvas commands: the closed set of edits a strategy can ask for.
//!
//! Applying a command is pure: it reads an [`EditorState`] and returns the
//! patches that would realize it. [`fold_and_apply_commands`] threads a
//! list of commands through a cloned state, so each command sees the
//! effects of the ones before it.

use crate::error::CommandError;
use crate::state::{
    CursorStyle, EditorState, EditorStatePatch, ElementsToRerender, Guideline, IntendedBounds,
};
use canvas_core::{CssValue, ElementPath, Imports, StyleProp, Uid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a command survives the end of the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhenToRun {
    /// Part of the durable result: applied mid-interaction and on commit.
    Always,
    /// Transient feedback (cursor, guides, highlights): never committed.
    MidInteraction,
}

/// Where in the interaction a strategy is being applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionLifecycle {
    MidInteraction,
    EndInteraction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CanvasCommand {
    /// Add `delta` pixels to a length property. Percentages are adjusted
    /// relative to `parent_dimension`.
    AdjustCssLengthProperty {
        when: WhenToRun,
        target: ElementPath,
        prop: StyleProp,
        delta: f32,
        parent_dimension: Option<f32>,
        create_if_missing: bool,
    },
    /// Overwrite a length property.
    SetCssLengthProperty {
        when: WhenToRun,
        target: ElementPath,
        prop: StyleProp,
        value: CssValue,
    },
    SetCssKeywordProperty {
        when: WhenToRun,
        target: ElementPath,
        prop: StyleProp,
        value: String,
    },
    ReorderElement {
        when: WhenToRun,
        target: ElementPath,
        index: usize,
    },
    ReparentElement {
        when: WhenToRun,
        target: ElementPath,
        new_parent: ElementPath,
        index: Option<usize>,
    },
    /// Insert a copy of `original` right after it, with leaf UID `new_uid`.
    /// Descendants of the copy are renamed through `descendant_uids`.
    DuplicateElement {
        when: WhenToRun,
        original: ElementPath,
        new_uid: Uid,
        descendant_uids: BTreeMap<Uid, Uid>,
    },
    AddImportsToFile {
        when: WhenToRun,
        file: String,
        imports: Imports,
    },
    SetCursor {
        when: WhenToRun,
        cursor: CursorStyle,
    },
    SetElementsToRerender {
        when: WhenToRun,
        elements: ElementsToRerender,
    },
    UpdateSelectedViews {
        when: WhenToRun,
        views: Vec<ElementPath>,
    },
    UpdateHighlightedViews {
        when: WhenToRun,
        views: Vec<ElementPath>,
    },
    SetSnappingGuidelines {
        when: WhenToRun,
        guidelines: Vec<Guideline>,
    },
    PushIntendedBounds {
        when: WhenToRun,
        bounds: Vec<IntendedBounds>,
    },
}

/// Patches produced by one command, plus a human-readable summary.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub patches: Vec<EditorStatePatch>,
    pub description: String,
}

impl CommandResult {
    fn new(patches: Vec<EditorStatePatch>, description: String) -> Self {
        Self {
            patches,
            description,
        }
    }

    fn nothing(description: String) -> Self {
        Self::new(Vec::new(), description)
    }

    pub fn changes_state(&self) -> bool {
        !self.patches.is_empty()
    }
}

impl CanvasCommand {
    pub fn when(&self) -> WhenToRun {
        match self {
            CanvasCommand::AdjustCssLengthProperty { when, .. }
            | CanvasCommand::SetCssLengthProperty { when, .. }
            | CanvasCommand::SetCssKeywordProperty { when, .. }
            | CanvasCommand::ReorderElement { when, .. }
            | CanvasCommand::ReparentElement { when, .. }
            | CanvasCommand::DuplicateElement { when, .. }
            | CanvasCommand::AddImportsToFile { when, .. }
            | CanvasCommand::SetCursor { when, .. }
            | CanvasCommand::SetElementsToRerender { when, .. }
            | CanvasCommand::UpdateSelectedViews { when, .. }
            | CanvasCommand::UpdateHighlightedViews { when, .. }
            | CanvasCommand::SetSnappingGuidelines { when, .. }
            | CanvasCommand::PushIntendedBounds { when, .. } => *when,
        }
    }

    /// Mid-interaction ticks run everything; the commit runs `Always` only.
    pub fn runs_in(&self, lifecycle: InteractionLifecycle) -> bool {
        match (self.when(), lifecycle) {
            (WhenToRun::Always, _) => true,
            (WhenToRun::MidInteraction, InteractionLifecycle::MidInteraction) => true,
            (WhenToRun::MidInteraction, InteractionLifecycle::EndInteraction) => false,
        }
    }

    /// Compute the patches for this command against `state`.
    pub fn apply(&self, state: &EditorState) -> Result<CommandResult, CommandError> {
        match self {
            CanvasCommand::AdjustCssLengthProperty {
                target,
                prop,
                delta,
                parent_dimension,
                create_if_missing,
                ..
            } => adjust_css_length(
                state,
                target,
                *prop,
                *delta,
                *parent_dimension,
                *create_if_missing,
            ),
            CanvasCommand::SetCssLengthProperty {
                target,
                prop,
                value,
                ..
            } => {
                require_element(state, target)?;
                Ok(CommandResult::new(
                    vec![EditorStatePatch::SetStyle {
                        target: target.clone(),
                        prop: *prop,
                        value: value.clone(),
                    }],
                    format!("Set {prop} of {target} to {value}"),
                ))
            }
            CanvasCommand::SetCssKeywordProperty {
                target,
                prop,
                value,
                ..
            } => {
                require_element(state, target)?;
                Ok(CommandResult::new(
                    vec![EditorStatePatch::SetStyle {
                        target: target.clone(),
                        prop: *prop,
                        value: CssValue::keyword(value),
                    }],
                    format!("Set {prop} of {target} to {value}"),
                ))
            }
            CanvasCommand::ReorderElement { target, index, .. } => {
                require_element(state, target)?;
                Ok(CommandResult::new(
                    vec![EditorStatePatch::ReorderElement {
                        target: target.clone(),
                        index: *index,
                    }],
                    format!("Reorder {target} to index {index}"),
                ))
            }
            CanvasCommand::ReparentElement {
                target,
                new_parent,
                index,
                ..
            } => {
                require_element(state, target)?;
                require_element(state, new_parent)?;
                if new_parent.is_descendant_of_or_equal(target) {
                    return Err(CommandError::CyclicReparent {
                        moved: target.clone(),
                        target: new_parent.clone(),
                    });
                }
                Ok(CommandResult::new(
                    vec![EditorStatePatch::ReparentElement {
                        target: target.clone(),
                        new_parent: new_parent.clone(),
                        index: *index,
                    }],
                    format!("Reparent {target} into {new_parent}"),
                ))
            }
            CanvasCommand::DuplicateElement {
                original,
                new_uid,
                descendant_uids,
                ..
            } => {
                require_element(state, original)?;
                let duplicate = original.with_leaf(*new_uid);
                Ok(CommandResult::new(
                    vec![EditorStatePatch::DuplicateElement {
                        original: original.clone(),
                        duplicate: duplicate.clone(),
                        descendant_uids: descendant_uids.clone(),
                    }],
                    format!("Duplicate {original} as {duplicate}"),
                ))
            }
            CanvasCommand::AddImportsToFile { file, imports, .. } => {
                if imports.is_empty() {
                    return Ok(CommandResult::nothing(format!("No imports to add to {file}")));
                }
                Ok(CommandResult::new(
                    vec![EditorStatePatch::MergeImports {
                        file: file.clone(),
                        imports: imports.clone(),
                    }],
                    format!("Add {} import source(s) to {file}", imports.len()),
                ))
            }
            CanvasCommand::SetCursor { cursor, .. } => Ok(CommandResult::new(
                vec![EditorStatePatch::SetCursor(Some(*cursor))],
                format!("Set cursor to {cursor:?}"),
            )),
            CanvasCommand::SetElementsToRerender { elements, .. } => Ok(CommandResult::new(
                vec![EditorStatePatch::SetElementsToRerender(elements.clone())],
                "Set elements to re-render".to_string(),
            )),
            CanvasCommand::UpdateSelectedViews { views, .. } => Ok(CommandResult::new(
                vec![EditorStatePatch::SetSelectedViews(views.clone())],
                format!("Select {} view(s)", views.len()),
            )),
            CanvasCommand::UpdateHighlightedViews { views, .. } => Ok(CommandResult::new(
                vec![EditorStatePatch::SetHighlightedViews(views.clone())],
                format!("Highlight {} view(s)", views.len()),
            )),
            CanvasCommand::SetSnappingGuidelines { guidelines, .. } => Ok(CommandResult::new(
                vec![EditorStatePatch::SetSnappingGuidelines(guidelines.clone())],
                format!("Show {} snapping guideline(s)", guidelines.len()),
            )),
            CanvasCommand::PushIntendedBounds { bounds, .. } => Ok(CommandResult::new(
                vec![EditorStatePatch::PushIntendedBounds(bounds.clone())],
                format!("Push intended bounds for {} element(s)", bounds.len()),
            )),
        }
    }
}

fn require_element(state: &EditorState, path: &ElementPath) -> Result<(), CommandError> {
    match state.project.element_at_path(path) {
        Some(_) => Ok(()),
        None => Err(CommandError::ElementNotFound(path.clone())),
    }
}

fn adjust_css_length(
    state: &EditorState,
    target: &ElementPath,
    prop: StyleProp,
    delta: f32,
    parent_dimension: Option<f32>,
    create_if_missing: bool,
) -> Result<CommandResult, CommandError> {
    let element = state
        .project
        .element_at_path(target)
        .ok_or_else(|| CommandError::ElementNotFound(target.clone()))?;

    let new_value = match element.style_value(prop) {
        Some(CssValue::Px(current)) => Some(CssValue::Px(current + delta)),
        Some(CssValue::Percent(current)) => match parent_dimension {
            Some(dim) if dim != 0.0 => Some(CssValue::Percent(current + delta / dim * 100.0)),
            _ => {
                log::warn!("cannot adjust {prop} of {target}: percentage with no parent size");
                None
            }
        },
        Some(CssValue::Keyword(_)) | None if create_if_missing => Some(CssValue::Px(delta)),
        Some(CssValue::Keyword(k)) => {
            log::debug!("leaving {prop} of {target} at keyword {k}");
            None
        }
        None => None,
    };

    Ok(match new_value {
        Some(value) => CommandResult::new(
            vec![EditorStatePatch::SetStyle {
                target: target.clone(),
                prop,
                value,
            }],
            format!("Adjust {prop} of {target} by {delta}"),
        ),
        None => CommandResult::nothing(format!("Skip adjusting {prop} of {target}")),
    })
}

/// What a fold did, command by command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoldReport {
    /// One entry per command that ran, skipped ones included.
    pub descriptions: Vec<String>,
    /// Commands that produced at least one patch.
    pub changed: usize,
}

/// Apply `commands` that run in `lifecycle` to a copy of `state`.
///
/// Fails on the first command error; the input state is never touched.
pub fn fold_and_apply_commands(
    state: &EditorState,
    commands: &[CanvasCommand],
    lifecycle: InteractionLifecycle,
) -> Result<(EditorState, FoldReport), CommandError> {
    let mut working = state.clone();
    let mut report = FoldReport::default();
    for command in commands.iter().filter(|c| c.runs_in(lifecycle)) {
        let result = command.apply(&working)?;
        working.apply_patches(&result.patches)?;
        log::trace!("{}", result.description);
        if result.changes_state() {
            report.changed += 1;
        }
        report.descriptions.push(result.description);
    }
    Ok((working, report))
}

/// Count of commands in `commands` that run in `lifecycle`.
pub fn count_runnable(commands: &[CanvasCommand], lifecycle: InteractionLifecycle) -> usize {
    commands.iter().filter(|c| c.runs_in(lifecycle)).count()
}
