//! Overlay control descriptors.
//!
//! Strategies do not draw anything. They describe which canvas controls the
//! overlay should show (outlines, handles, the reorder slider) and when, and
//! the overlay renders whatever survives [`visible_controls`].

use canvas_core::geometry::bounding_rectangle_array;
use canvas_core::{CanvasRect, ElementInstanceMetadataMap, ElementPath};
use serde::{Deserialize, Serialize};

/// Which overlay component to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// Outline around the parent of the dragged elements.
    ParentOutlines,
    /// Bounds of the parent's content box.
    ParentBounds,
    /// Outline following the dragged selection.
    DragOutline,
    /// Highlight on the element a reparent would drop into.
    ReparentTargetOutline,
    /// Guide lines the current drag snapped to.
    SnappingGuidelines,
    /// Eight resize handles around the selection.
    ResizeHandles,
    /// Handles for elements measured at zero width or height.
    ZeroSizeResizeControl,
    /// Slider that reorders a flow element among its siblings.
    FlowSlider,
    /// Insertion marker between flex or flow siblings.
    ReorderIndicator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlVisibility {
    /// Shown whenever the owning strategy is applicable.
    AlwaysVisible,
    /// Shown only while the owning strategy is the active one.
    VisibleOnlyWhileActive,
}

/// One control a strategy asks the overlay to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlWithProps {
    pub kind: ControlKind,
    /// Stable key; duplicates across strategies render once.
    pub key: String,
    pub visibility: ControlVisibility,
    /// Elements the control is attached to.
    pub targets: Vec<ElementPath>,
}

impl ControlWithProps {
    pub fn new(kind: ControlKind, key: &str, visibility: ControlVisibility) -> Self {
        Self {
            kind,
            key: key.to_string(),
            visibility,
            targets: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: &[ElementPath]) -> Self {
        self.targets = targets.to_vec();
        self
    }

    /// Canvas frame enclosing every target that has one.
    pub fn frame(&self, metadata: &ElementInstanceMetadataMap) -> Option<CanvasRect> {
        bounding_rectangle_array(self.targets.iter().filter_map(|t| metadata.global_frame(t)))
    }
}

/// Filter the controls of every applicable strategy down to what the
/// overlay shows: always-visible controls from all of them, plus the
/// while-active controls of the active one. Keys are rendered once, in
/// first-seen order.
pub fn visible_controls<'a>(
    strategies: impl IntoIterator<Item = (&'a [ControlWithProps], bool)>,
) -> Vec<ControlWithProps> {
    let mut out: Vec<ControlWithProps> = Vec::new();
    for (controls, is_active) in strategies {
        for control in controls {
            let shown = match control.visibility {
                ControlVisibility::AlwaysVisible => true,
                ControlVisibility::VisibleOnlyWhileActive => is_active,
            };
            if shown && !out.iter().any(|c| c.key == control.key) {
                out.push(control.clone());
            }
        }
    }
    out
}
