//! Measured snapshot of the rendered preview.
//!
//! The DOM walker (outside this workspace) reports one
//! [`ElementInstanceMetadata`] per rendered element. The engine only ever
//! reads snapshots; they are shared through `Arc` and replaced wholesale
//! when a new measurement lands.

use crate::geometry::{Axis, CanvasRect, LocalRect};
use crate::path::ElementPath;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ─── Layout vocabulary ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    Absolute,
    Relative,
    #[default]
    Static,
    Fixed,
    Sticky,
}

impl PositionMode {
    pub fn is_absolute(self) -> bool {
        matches!(self, PositionMode::Absolute | PositionMode::Fixed)
    }
}

/// How the parent lays out this element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSystem {
    #[default]
    Flow,
    Flex,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn main_axis(self) -> Axis {
        match self {
            FlexDirection::Row | FlexDirection::RowReverse => Axis::Horizontal,
            FlexDirection::Column | FlexDirection::ColumnReverse => Axis::Vertical,
        }
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

/// Layout facts the DOM walker measured for one element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialSizeMeasurements {
    pub position: PositionMode,
    /// Computed `display` (`block`, `inline-block`, `flex`, ...).
    pub display: String,
    pub parent_layout_system: LayoutSystem,
    pub parent_flex_direction: Option<FlexDirection>,
    pub parent_flex_gap: f32,
    pub immediate_parent_bounds: Option<CanvasRect>,
    /// Canvas bounds of the element's containing block for absolute
    /// positioning (what `left`/`top` are measured from).
    pub coordinate_system_bounds: Option<CanvasRect>,
    pub provides_bounds_for_absolute_children: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInstanceMetadata {
    pub element_path: ElementPath,
    pub global_frame: Option<CanvasRect>,
    pub local_frame: Option<LocalRect>,
    #[serde(default)]
    pub special_size_measurements: SpecialSizeMeasurements,
}

impl ElementInstanceMetadata {
    pub fn new(element_path: ElementPath) -> Self {
        Self {
            element_path,
            global_frame: None,
            local_frame: None,
            special_size_measurements: SpecialSizeMeasurements::default(),
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.special_size_measurements.position.is_absolute()
    }

    pub fn parent_layout(&self) -> LayoutSystem {
        self.special_size_measurements.parent_layout_system
    }

    pub fn is_flex_child(&self) -> bool {
        self.parent_layout() == LayoutSystem::Flex
    }

    pub fn is_flow_child(&self) -> bool {
        self.parent_layout() == LayoutSystem::Flow
    }
}

// ─── Snapshot map ────────────────────────────────────────────────────────

/// Metadata for every rendered element, keyed by stringified path.
///
/// Iteration order is unspecified; anything that needs document order must
/// ask the document model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInstanceMetadataMap {
    entries: HashMap<String, ElementInstanceMetadata>,
}

impl ElementInstanceMetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metadata: ElementInstanceMetadata) {
        self.entries
            .insert(metadata.element_path.to_string(), metadata);
    }

    pub fn get(&self, path: &ElementPath) -> Option<&ElementInstanceMetadata> {
        self.entries.get(&path.to_string())
    }

    pub fn contains(&self, path: &ElementPath) -> bool {
        self.entries.contains_key(&path.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementInstanceMetadata> {
        self.entries.values()
    }

    pub fn global_frame(&self, path: &ElementPath) -> Option<CanvasRect> {
        self.get(path).and_then(|m| m.global_frame)
    }

    pub fn local_frame(&self, path: &ElementPath) -> Option<LocalRect> {
        self.get(path).and_then(|m| m.local_frame)
    }

    pub fn is_absolute(&self, path: &ElementPath) -> bool {
        self.get(path).is_some_and(ElementInstanceMetadata::is_absolute)
    }

    /// Direct children present in the snapshot, in unspecified order.
    pub fn children_of(&self, parent: &ElementPath) -> Vec<&ElementInstanceMetadata> {
        self.entries
            .values()
            .filter(|m| m.element_path.is_child_of(parent))
            .collect()
    }

    /// Paths of the elements that share `path`'s parent, excluding `path`.
    pub fn siblings_of(&self, path: &ElementPath) -> Vec<&ElementInstanceMetadata> {
        let parent = path.parent();
        self.children_of(&parent)
            .into_iter()
            .filter(|m| &m.element_path != path)
            .collect()
    }
}

impl FromIterator<ElementInstanceMetadata> for ElementInstanceMetadataMap {
    fn from_iter<I: IntoIterator<Item = ElementInstanceMetadata>>(iter: I) -> Self {
        let mut map = Self::new();
        for m in iter {
            map.insert(m);
        }
        map
    }
}

// ─── Authored props ──────────────────────────────────────────────────────

/// Raw authored props of one element.
pub type ElementProps = BTreeMap<String, serde_json::Value>;

/// Authored props of every rendered element, keyed by stringified path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllElementProps {
    entries: HashMap<String, ElementProps>,
}

impl AllElementProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &ElementPath, props: ElementProps) {
        self.entries.insert(path.to_string(), props);
    }

    pub fn get(&self, path: &ElementPath) -> Option<&ElementProps> {
        self.entries.get(&path.to_string())
    }

    /// True when the element was authored with a `style` prop.
    pub fn has_style(&self, path: &ElementPath) -> bool {
        self.get(path).is_some_and(|props| props.contains_key("style"))
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

/// A failed or partial DOM measurement reported by the renderer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasurementError {
    #[error("measuring {path} failed: {reason}")]
    ElementFailed { path: String, reason: String },
    #[error("the preview has not rendered yet")]
    NotRendered,
    #[error("measurement was interrupted")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(path: &str, frame: CanvasRect) -> ElementInstanceMetadata {
        let mut m = ElementInstanceMetadata::new(ElementPath::from_string(path));
        m.global_frame = Some(frame);
        m
    }

    #[test]
    fn lookup_by_path_value() {
        let map: ElementInstanceMetadataMap = [meta("s/app:aaa", CanvasRect::new(0.0, 0.0, 10.0, 10.0))]
            .into_iter()
            .collect();
        assert_eq!(
            map.global_frame(&ElementPath::from_parts(&[&["s", "app"], &["aaa"]])),
            Some(CanvasRect::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(map.global_frame(&ElementPath::from_string("s/app:zzz")), None);
    }

    #[test]
    fn siblings_exclude_self_and_grandchildren() {
        let r = CanvasRect::new(0.0, 0.0, 1.0, 1.0);
        let map: ElementInstanceMetadataMap = [
            meta("s/app:root", r),
            meta("s/app:root/a", r),
            meta("s/app:root/b", r),
            meta("s/app:root/b/deep", r),
        ]
        .into_iter()
        .collect();
        let mut sibs: Vec<String> = map
            .siblings_of(&ElementPath::from_string("s/app:root/a"))
            .iter()
            .map(|m| m.element_path.to_string())
            .collect();
        sibs.sort();
        assert_eq!(sibs, vec!["s/app:root/b".to_string()]);
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "element_path": "s/app:aaa",
            "global_frame": { "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0 },
            "local_frame": null,
            "special_size_measurements": { "position": "absolute", "parent_layout_system": "flex" }
        }"#;
        let m: ElementInstanceMetadata = serde_json::from_str(json).expect("parse");
        assert!(m.is_absolute());
        assert!(m.is_flex_child());
        assert_eq!(m.global_frame, Some(CanvasRect::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn props_style_detection() {
        let path = ElementPath::from_string("s/app:aaa");
        let mut props = AllElementProps::new();
        let mut bag = ElementProps::new();
        bag.insert("style".into(), serde_json::json!({ "left": 10 }));
        props.insert(&path, bag);
        assert!(props.has_style(&path));
        assert!(!props.has_style(&ElementPath::from_string("s/app:bbb")));
    }
}
