//! Editor state as the engine sees it, and the patches that change it.
//!
//! Commands never mutate state directly: they produce a list of
//! [`EditorStatePatch`] values, and [`EditorState::apply_patch`] is the
//! only place the state changes. The reconciler decides which state the
//! patches land on.

use crate::error::CommandError;
use canvas_core::geometry::Axis;
use canvas_core::{CanvasRect, CssValue, ElementPath, Imports, ProjectContents, StyleProp, Uid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorStyle {
    Default,
    Move,
    Duplicate,
    Reparent,
    ResizeEW,
    ResizeNS,
    ResizeNWSE,
    ResizeNESW,
    NotPermitted,
}

/// A snapping guide line, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    /// `Horizontal` guides constrain x (they are drawn vertically).
    pub axis: Axis,
    pub position: f32,
}

/// Elements the preview must re-render after this tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ElementsToRerender {
    #[default]
    All,
    Paths(Vec<ElementPath>),
}

/// Where an element is expected to end up, ahead of the next measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntendedBounds {
    pub target: ElementPath,
    pub frame: CanvasRect,
}

/// Transient canvas UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    pub cursor: Option<CursorStyle>,
    pub snapping_guidelines: Vec<Guideline>,
    pub elements_to_rerender: ElementsToRerender,
    pub intended_bounds: Vec<IntendedBounds>,
    /// Canvas zoom; screen-space thresholds are divided by it.
    pub scale: f32,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            cursor: None,
            snapping_guidelines: Vec::new(),
            elements_to_rerender: ElementsToRerender::All,
            intended_bounds: Vec::new(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub project: ProjectContents,
    pub open_file: Option<String>,
    pub selected_views: Vec<ElementPath>,
    pub highlighted_views: Vec<ElementPath>,
    pub canvas: CanvasState,
}

/// One concrete change to an [`EditorState`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorStatePatch {
    SetStyle {
        target: ElementPath,
        prop: StyleProp,
        value: CssValue,
    },
    RemoveStyle {
        target: ElementPath,
        prop: StyleProp,
    },
    ReorderElement {
        target: ElementPath,
        index: usize,
    },
    ReparentElement {
        target: ElementPath,
        new_parent: ElementPath,
        index: Option<usize>,
    },
    DuplicateElement {
        original: ElementPath,
        duplicate: ElementPath,
        descendant_uids: BTreeMap<Uid, Uid>,
    },
    MergeImports {
        file: String,
        imports: Imports,
    },
    SetCursor(Option<CursorStyle>),
    SetElementsToRerender(ElementsToRerender),
    SetSelectedViews(Vec<ElementPath>),
    SetHighlightedViews(Vec<ElementPath>),
    SetSnappingGuidelines(Vec<Guideline>),
    PushIntendedBounds(Vec<IntendedBounds>),
}

fn leaf(path: &ElementPath) -> Result<Uid, CommandError> {
    path.uid()
        .ok_or_else(|| CommandError::ElementNotFound(path.clone()))
}

impl EditorState {
    pub fn new(project: ProjectContents) -> Self {
        Self {
            project,
            ..Self::default()
        }
    }

    /// Apply one patch in place.
    pub fn apply_patch(&mut self, patch: &EditorStatePatch) -> Result<(), CommandError> {
        match patch {
            EditorStatePatch::SetStyle {
                target,
                prop,
                value,
            } => {
                let element = self.project.element_mut(leaf(target)?)?;
                element.set_style(*prop, value.clone());
            }
            EditorStatePatch::RemoveStyle { target, prop } => {
                let element = self.project.element_mut(leaf(target)?)?;
                element.remove_style(*prop);
            }
            EditorStatePatch::ReorderElement { target, index } => {
                self.project.reorder(leaf(target)?, *index)?;
            }
            EditorStatePatch::ReparentElement {
                target,
                new_parent,
                index,
            } => {
                if new_parent.is_descendant_of_or_equal(target) {
                    return Err(CommandError::CyclicReparent {
                        moved: target.clone(),
                        target: new_parent.clone(),
                    });
                }
                self.project
                    .reparent(leaf(target)?, leaf(new_parent)?, *index)?;
            }
            EditorStatePatch::DuplicateElement {
                original,
                duplicate,
                descendant_uids,
            } => {
                self.project
                    .duplicate(leaf(original)?, leaf(duplicate)?, descendant_uids)?;
            }
            EditorStatePatch::MergeImports { file, imports } => {
                let parsed = self.project.file_mut(file)?;
                canvas_core::merge_imports(&mut parsed.imports, imports);
            }
            EditorStatePatch::SetCursor(cursor) => self.canvas.cursor = *cursor,
            EditorStatePatch::SetElementsToRerender(elements) => {
                self.canvas.elements_to_rerender = elements.clone();
            }
            EditorStatePatch::SetSelectedViews(views) => self.selected_views = views.clone(),
            EditorStatePatch::SetHighlightedViews(views) => {
                self.highlighted_views = views.clone();
            }
            EditorStatePatch::SetSnappingGuidelines(guides) => {
                self.canvas.snapping_guidelines = guides.clone();
            }
            EditorStatePatch::PushIntendedBounds(bounds) => {
                self.canvas.intended_bounds.extend(bounds.iter().cloned());
            }
        }
        Ok(())
    }

    pub fn apply_patches(&mut self, patches: &[EditorStatePatch]) -> Result<(), CommandError> {
        patches.iter().try_for_each(|p| self.apply_patch(p))
    }

    /// Authored style value of the element at `path`.
    pub fn style_value(&self, path: &ElementPath, prop: StyleProp) -> Option<&CssValue> {
        self.project.element_at_path(path)?.style_value(prop)
    }

    /// Reset the per-tick canvas fields before a fresh fold.
    pub fn clear_transient_canvas_state(&mut self) {
        self.canvas.snapping_guidelines.clear();
        self.canvas.intended_bounds.clear();
        self.canvas.cursor = None;
    }
}
