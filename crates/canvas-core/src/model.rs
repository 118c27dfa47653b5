//! Document model: the parsed project the engine's commands mutate.
//!
//! Parsing and printing JSX is somebody else's job. This module only holds
//! the already-parsed shape of each file: its imports, its top-level
//! components, and the element tree every component renders. Each tree
//! lives in a `StableDiGraph` with parent→child edges and an explicit child
//! order per parent, so reorders never depend on petgraph's adjacency order.
//!
//! UIDs are unique across the whole project, so an `ElementPath` resolves to
//! an element through its leaf UID alone.

use crate::id::Uid;
use crate::path::ElementPath;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

// ─── Styles ──────────────────────────────────────────────────────────────

/// CSS properties the engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProp {
    Left,
    Top,
    Right,
    Bottom,
    Width,
    Height,
    FlexBasis,
    Display,
    Position,
}

impl StyleProp {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleProp::Left => "left",
            StyleProp::Top => "top",
            StyleProp::Right => "right",
            StyleProp::Bottom => "bottom",
            StyleProp::Width => "width",
            StyleProp::Height => "height",
            StyleProp::FlexBasis => "flexBasis",
            StyleProp::Display => "display",
            StyleProp::Position => "position",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "left" => StyleProp::Left,
            "top" => StyleProp::Top,
            "right" => StyleProp::Right,
            "bottom" => StyleProp::Bottom,
            "width" => StyleProp::Width,
            "height" => StyleProp::Height,
            "flexBasis" => StyleProp::FlexBasis,
            "display" => StyleProp::Display,
            "position" => StyleProp::Position,
            _ => return None,
        })
    }
}

impl fmt::Display for StyleProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authored CSS value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CssValue {
    Px(f32),
    Percent(f32),
    Keyword(String),
}

impl CssValue {
    pub fn keyword(s: &str) -> Self {
        CssValue::Keyword(s.to_string())
    }

    /// Parse authored text: `12`, `12px`, `50%`, anything else is a keyword.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(n) = s.strip_suffix('%').and_then(|n| n.trim().parse().ok()) {
            return CssValue::Percent(n);
        }
        let numeric = s.strip_suffix("px").unwrap_or(s).trim();
        match numeric.parse() {
            Ok(n) => CssValue::Px(n),
            Err(_) => CssValue::Keyword(s.to_string()),
        }
    }

    pub fn is_length(&self) -> bool {
        matches!(self, CssValue::Px(_) | CssValue::Percent(_))
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Px(n) => write!(f, "{n}px"),
            CssValue::Percent(n) => write!(f, "{n}%"),
            CssValue::Keyword(k) => f.write_str(k),
        }
    }
}

pub type Style = BTreeMap<StyleProp, CssValue>;

// ─── Elements ────────────────────────────────────────────────────────────

/// Intrinsic elements that cannot contain children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// One JSX element. Children live in the owning file's graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsxElement {
    pub uid: Uid,
    /// Tag or component name: `div`, `View`, `Card`.
    pub name: String,
    /// The element's inline `style` object.
    pub style: Style,
    /// True when the element carries a `style` prop at all, even empty.
    pub has_style_prop: bool,
}

impl JsxElement {
    pub fn new(uid: &str, name: &str) -> Self {
        Self {
            uid: Uid::intern(uid),
            name: name.to_string(),
            style: Style::new(),
            has_style_prop: false,
        }
    }

    /// Builder: set an authored style property.
    pub fn with_style(mut self, prop: StyleProp, value: CssValue) -> Self {
        self.style.insert(prop, value);
        self.has_style_prop = true;
        self
    }

    /// Lowercase names are host (DOM) elements.
    pub fn is_intrinsic(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
    }

    pub fn supports_children(&self) -> bool {
        self.is_intrinsic() && !VOID_ELEMENTS.contains(&self.name.as_str())
    }

    pub fn style_value(&self, prop: StyleProp) -> Option<&CssValue> {
        self.style.get(&prop)
    }

    pub fn set_style(&mut self, prop: StyleProp, value: CssValue) {
        self.style.insert(prop, value);
        self.has_style_prop = true;
    }

    pub fn remove_style(&mut self, prop: StyleProp) -> Option<CssValue> {
        self.style.remove(&prop)
    }
}

/// An element subtree lifted out of a file, ready to be re-inserted
/// somewhere else (possibly in another file).
#[derive(Debug, Clone, PartialEq)]
pub struct DetachedElement {
    pub element: JsxElement,
    pub children: Vec<DetachedElement>,
}

impl DetachedElement {
    /// Every non-intrinsic component name used in the subtree.
    pub fn component_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_component_names(&mut names);
        names
    }

    fn collect_component_names(&self, out: &mut BTreeSet<String>) {
        if !self.element.is_intrinsic() {
            out.insert(self.element.name.clone());
        }
        for child in &self.children {
            child.collect_component_names(out);
        }
    }
}

// ─── Imports & components ────────────────────────────────────────────────

/// Imports of one file: module source → imported binding names.
pub type Imports = BTreeMap<String, BTreeSet<String>>;

/// Union `extra` into `into`, keeping each binding once.
pub fn merge_imports(into: &mut Imports, extra: &Imports) {
    for (source, names) in extra {
        into.entry(source.clone())
            .or_default()
            .extend(names.iter().cloned());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelComponent {
    pub name: String,
    pub exported: bool,
    /// Root element rendered by the component.
    pub root: NodeIndex,
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("element {0} not found in the project")]
    ElementNotFound(Uid),
    #[error("file {0} not found in the project")]
    FileNotFound(String),
    #[error("cannot move {moved} into its own descendant {target}")]
    CyclicMove { moved: Uid, target: Uid },
    #[error("element {0} is the root of a component and cannot be moved")]
    ComponentRoot(Uid),
    #[error("node index no longer refers to an element")]
    StaleIndex,
}

// ─── Parsed file ─────────────────────────────────────────────────────────

/// One source file after parsing.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub imports: Imports,
    pub components: Vec<TopLevelComponent>,
    graph: StableDiGraph<JsxElement, ()>,
    uid_index: HashMap<Uid, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl ParsedFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level component rendering `root`. Returns the root's index.
    pub fn add_component(&mut self, name: &str, exported: bool, root: JsxElement) -> NodeIndex {
        let idx = self.add_detached_node(root);
        self.components.push(TopLevelComponent {
            name: name.to_string(),
            exported,
            root: idx,
        });
        idx
    }

    /// Append `element` as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, element: JsxElement) -> NodeIndex {
        let idx = self.add_detached_node(element);
        self.link(parent, idx, None);
        idx
    }

    fn add_detached_node(&mut self, element: JsxElement) -> NodeIndex {
        let uid = element.uid;
        let idx = self.graph.add_node(element);
        self.uid_index.insert(uid, idx);
        idx
    }

    fn link(&mut self, parent: NodeIndex, child: NodeIndex, index: Option<usize>) {
        self.graph.add_edge(parent, child, ());
        let order = self.child_order.entry(parent).or_default();
        let at = index.unwrap_or(order.len()).min(order.len());
        order.insert(at, child);
    }

    fn unlink(&mut self, child: NodeIndex) {
        if let Some(parent) = self.parent(child) {
            if let Some(edge) = self.graph.find_edge(parent, child) {
                self.graph.remove_edge(edge);
            }
            if let Some(order) = self.child_order.get_mut(&parent) {
                order.retain(|&c| c != child);
            }
        }
    }

    pub fn index_of(&self, uid: Uid) -> Option<NodeIndex> {
        self.uid_index.get(&uid).copied()
    }

    pub fn contains(&self, uid: Uid) -> bool {
        self.uid_index.contains_key(&uid)
    }

    pub fn element(&self, idx: NodeIndex) -> Option<&JsxElement> {
        self.graph.node_weight(idx)
    }

    pub fn element_mut(&mut self, idx: NodeIndex) -> Option<&mut JsxElement> {
        self.graph.node_weight_mut(idx)
    }

    pub fn element_by_uid(&self, uid: Uid) -> Option<&JsxElement> {
        self.index_of(uid).and_then(|idx| self.element(idx))
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in document order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True when `ancestor` is `idx` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeIndex, idx: NodeIndex) -> bool {
        let mut current = Some(idx);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    pub fn is_component_root(&self, idx: NodeIndex) -> bool {
        self.components.iter().any(|c| c.root == idx)
    }

    /// Position of `idx` among its siblings.
    pub fn index_in_parent(&self, idx: NodeIndex) -> Option<usize> {
        let parent = self.parent(idx)?;
        self.children(parent).iter().position(|&c| c == idx)
    }

    /// Insert a detached subtree under `parent` at `index` (appends when
    /// `None` or past the end).
    pub fn insert_subtree(
        &mut self,
        parent: NodeIndex,
        index: Option<usize>,
        subtree: DetachedElement,
    ) -> NodeIndex {
        let DetachedElement { element, children } = subtree;
        let idx = self.add_detached_node(element);
        self.link(parent, idx, index);
        for child in children {
            self.insert_subtree(idx, None, child);
        }
        idx
    }

    /// Lift the subtree rooted at `idx` out of the file.
    pub fn remove_subtree(&mut self, idx: NodeIndex) -> Option<DetachedElement> {
        self.unlink(idx);
        self.take_subtree(idx)
    }

    fn take_subtree(&mut self, idx: NodeIndex) -> Option<DetachedElement> {
        let child_indices = self.child_order.remove(&idx).unwrap_or_default();
        let children = child_indices
            .into_iter()
            .filter_map(|c| self.take_subtree(c))
            .collect();
        let element = self.graph.remove_node(idx)?;
        self.uid_index.remove(&element.uid);
        Some(DetachedElement { element, children })
    }

    /// Copy of the subtree rooted at `idx`, leaving the file untouched.
    pub fn clone_subtree(&self, idx: NodeIndex) -> Option<DetachedElement> {
        let element = self.element(idx)?.clone();
        let children = self
            .children(idx)
            .iter()
            .filter_map(|&c| self.clone_subtree(c))
            .collect();
        Some(DetachedElement { element, children })
    }

    /// Move `idx` under `new_parent` at `index`, within this file.
    pub fn move_element(
        &mut self,
        idx: NodeIndex,
        new_parent: NodeIndex,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let (Some(uid), Some(target)) = (
            self.element(idx).map(|e| e.uid),
            self.element(new_parent).map(|e| e.uid),
        ) else {
            return Err(ModelError::StaleIndex);
        };
        if self.is_ancestor_or_self(idx, new_parent) {
            return Err(ModelError::CyclicMove { moved: uid, target });
        }
        if self.is_component_root(idx) {
            return Err(ModelError::ComponentRoot(uid));
        }
        self.unlink(idx);
        self.link(new_parent, idx, index);
        Ok(())
    }

    /// Move `idx` to `index` among its current siblings (clamped).
    pub fn reorder(&mut self, idx: NodeIndex, index: usize) -> bool {
        let Some(parent) = self.parent(idx) else {
            return false;
        };
        let Some(order) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(from) = order.iter().position(|&c| c == idx) else {
            return false;
        };
        let to = index.min(order.len() - 1);
        if from == to {
            return false;
        }
        let moved = order.remove(from);
        order.insert(to, moved);
        true
    }

    /// Duplicate the subtree at `idx` right after it. The copy's root gets
    /// `new_uid`; each descendant takes its UID from `renames`, or a freshly
    /// generated one when it has no entry.
    pub fn duplicate(
        &mut self,
        idx: NodeIndex,
        new_uid: Uid,
        renames: &BTreeMap<Uid, Uid>,
    ) -> Option<NodeIndex> {
        let parent = self.parent(idx)?;
        let position = self.index_in_parent(idx)?;
        let mut copy = self.clone_subtree(idx)?;
        copy.element.uid = new_uid;
        for child in &mut copy.children {
            rename_uids(child, renames);
        }
        Some(self.insert_subtree(parent, Some(position + 1), copy))
    }

    /// Name of the top-level component whose tree contains `idx`.
    pub fn component_of(&self, idx: NodeIndex) -> Option<&TopLevelComponent> {
        let mut root = idx;
        while let Some(p) = self.parent(root) {
            root = p;
        }
        self.components.iter().find(|c| c.root == root)
    }
}

fn rename_uids(subtree: &mut DetachedElement, renames: &BTreeMap<Uid, Uid>) {
    let uid = subtree.element.uid;
    subtree.element.uid = match renames.get(&uid) {
        Some(renamed) => *renamed,
        None => Uid::generate(uid.as_str()),
    };
    for child in &mut subtree.children {
        rename_uids(child, renames);
    }
}

// ─── Project ─────────────────────────────────────────────────────────────

/// Every parsed file of the project, keyed by file path.
#[derive(Debug, Clone, Default)]
pub struct ProjectContents {
    pub files: BTreeMap<String, ParsedFile>,
}

impl ProjectContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: &str, file: ParsedFile) {
        self.files.insert(path.to_string(), file);
    }

    pub fn file(&self, path: &str) -> Option<&ParsedFile> {
        self.files.get(path)
    }

    pub fn file_mut(&mut self, path: &str) -> Result<&mut ParsedFile, ModelError> {
        self.files
            .get_mut(path)
            .ok_or_else(|| ModelError::FileNotFound(path.to_string()))
    }

    /// File path and node index of the element with `uid`.
    pub fn locate(&self, uid: Uid) -> Option<(&str, NodeIndex)> {
        self.files
            .iter()
            .find_map(|(path, file)| file.index_of(uid).map(|idx| (path.as_str(), idx)))
    }

    pub fn contains_uid(&self, uid: Uid) -> bool {
        self.locate(uid).is_some()
    }

    pub fn element(&self, uid: Uid) -> Option<&JsxElement> {
        let (path, idx) = self.locate(uid)?;
        self.files.get(path)?.element(idx)
    }

    pub fn element_at_path(&self, path: &ElementPath) -> Option<&JsxElement> {
        self.element(path.uid()?)
    }

    pub fn element_mut(&mut self, uid: Uid) -> Result<&mut JsxElement, ModelError> {
        let (path, idx) = self.locate(uid).ok_or(ModelError::ElementNotFound(uid))?;
        let path = path.to_string();
        self.file_mut(&path)?
            .element_mut(idx)
            .ok_or(ModelError::ElementNotFound(uid))
    }

    /// UIDs of the children of `uid`, in document order.
    pub fn child_uids(&self, uid: Uid) -> Vec<Uid> {
        let Some((path, idx)) = self.locate(uid) else {
            return Vec::new();
        };
        let Some(file) = self.files.get(path) else {
            return Vec::new();
        };
        file.children(idx)
            .iter()
            .filter_map(|&c| file.element(c).map(|e| e.uid))
            .collect()
    }

    /// Position of `uid` among its siblings in the document.
    pub fn index_in_parent(&self, uid: Uid) -> Option<usize> {
        let (path, idx) = self.locate(uid)?;
        self.files.get(path)?.index_in_parent(idx)
    }

    pub fn reorder(&mut self, uid: Uid, index: usize) -> Result<bool, ModelError> {
        let (path, idx) = self.locate(uid).ok_or(ModelError::ElementNotFound(uid))?;
        let path = path.to_string();
        Ok(self.file_mut(&path)?.reorder(idx, index))
    }

    pub fn duplicate(
        &mut self,
        uid: Uid,
        new_uid: Uid,
        renames: &BTreeMap<Uid, Uid>,
    ) -> Result<(), ModelError> {
        let (path, idx) = self.locate(uid).ok_or(ModelError::ElementNotFound(uid))?;
        let path = path.to_string();
        self.file_mut(&path)?
            .duplicate(idx, new_uid, renames)
            .map(|_| ())
            .ok_or(ModelError::ElementNotFound(uid))
    }

    /// Move `uid` under `new_parent`. Moves within one file keep node
    /// identity; moves across files transplant the subtree.
    pub fn reparent(
        &mut self,
        uid: Uid,
        new_parent: Uid,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let (from_path, idx) = self.locate(uid).ok_or(ModelError::ElementNotFound(uid))?;
        let (to_path, parent_idx) = self
            .locate(new_parent)
            .ok_or(ModelError::ElementNotFound(new_parent))?;
        let (from_path, to_path) = (from_path.to_string(), to_path.to_string());

        if from_path == to_path {
            return self.file_mut(&from_path)?.move_element(idx, parent_idx, index);
        }

        let from = self.file_mut(&from_path)?;
        if from.is_component_root(idx) {
            return Err(ModelError::ComponentRoot(uid));
        }
        let subtree = from
            .remove_subtree(idx)
            .ok_or(ModelError::ElementNotFound(uid))?;
        self.file_mut(&to_path)?
            .insert_subtree(parent_idx, index, subtree);
        log::debug!("transplanted {uid} from {from_path} to {to_path}");
        Ok(())
    }

    /// Imports the file at `to_path` needs so that the subtree rooted at
    /// `uid` (currently elsewhere) still resolves its component names.
    ///
    /// Returns `None` when some component cannot be resolved: it is neither
    /// imported by the source file nor exported from it.
    pub fn imports_for_transplant(&self, uid: Uid, to_path: &str) -> Option<Imports> {
        let (from_path, idx) = self.locate(uid)?;
        let from = self.files.get(from_path)?;
        let subtree = from.clone_subtree(idx)?;
        let mut needed = Imports::new();
        for name in subtree.component_names() {
            if let Some((source, _)) = from.imports.iter().find(|(_, n)| n.contains(&name)) {
                needed.entry(source.clone()).or_default().insert(name);
            } else if from.components.iter().any(|c| c.name == name && c.exported) {
                if from_path != to_path {
                    needed
                        .entry(from_path.to_string())
                        .or_default()
                        .insert(name);
                }
            } else {
                log::debug!("cannot resolve import for <{name}> in {from_path}");
                return None;
            }
        }
        Some(needed)
    }
}
