//! Element paths: hierarchical identifiers for rendered element instances.
//!
//! A path is an ordered list of *static path parts*. Each part is the chain
//! of UIDs inside one component scope, from the scope's root down to the
//! element. The next part starts inside the component instantiated by the
//! last UID of the previous part:
//!
//! ```text
//! storyboard/scene/app:aaa/bbb
//! └── part 0 ──────────┘ └ part 1 ┘
//! ```
//!
//! Paths are values: equality and ordering are structural. Ancestors
//! always sort before their descendants.

use crate::id::Uid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex};

/// UID separator inside one static path part.
pub const UID_SEPARATOR: char = '/';
/// Separator between static path parts.
pub const PART_SEPARATOR: char = ':';

/// One component scope's chain of UIDs.
pub type StaticPathPart = SmallVec<[Uid; 4]>;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementPath {
    parts: SmallVec<[StaticPathPart; 2]>,
}

// ─── Parse cache ─────────────────────────────────────────────────────────

/// Process-wide cache of parsed path strings.
static PATH_CACHE: LazyLock<Mutex<HashMap<String, ElementPath>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Drop every cached path. Called whenever a new metadata snapshot lands,
/// and between tests that want a clean slate.
pub fn clear_path_cache() {
    if let Ok(mut cache) = PATH_CACHE.lock() {
        log::trace!("clearing element path cache ({} entries)", cache.len());
        cache.clear();
    }
}

impl ElementPath {
    pub fn new(parts: impl IntoIterator<Item = StaticPathPart>) -> Self {
        Self {
            parts: parts.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    /// Build a path from string UIDs: `ElementPath::from_parts(&[&["scene", "app"], &["aaa"]])`.
    pub fn from_parts(parts: &[&[&str]]) -> Self {
        Self::new(
            parts
                .iter()
                .map(|part| part.iter().map(|uid| Uid::intern(uid)).collect()),
        )
    }

    /// Parse `scene/app:aaa/bbb`. Empty segments are skipped.
    pub fn from_string(s: &str) -> Self {
        if let Ok(cache) = PATH_CACHE.lock()
            && let Some(path) = cache.get(s)
        {
            return path.clone();
        }

        let path = Self::new(s.split(PART_SEPARATOR).map(|part| {
            part.split(UID_SEPARATOR)
                .filter(|uid| !uid.is_empty())
                .map(Uid::intern)
                .collect::<StaticPathPart>()
        }));

        if let Ok(mut cache) = PATH_CACHE.lock() {
            cache.insert(s.to_string(), path.clone());
        }
        path
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[StaticPathPart] {
        &self.parts
    }

    /// The leaf UID, i.e. the element this path points at.
    pub fn uid(&self) -> Option<Uid> {
        self.parts.last().and_then(|part| part.last()).copied()
    }

    /// Total number of UIDs across all parts.
    pub fn depth(&self) -> usize {
        self.parts.iter().map(|part| part.len()).sum()
    }

    /// The containing element's path. Leaving the root of a component scope
    /// steps out to the instance element in the enclosing scope.
    pub fn parent(&self) -> ElementPath {
        let mut parts = self.parts.clone();
        if let Some(last) = parts.last_mut() {
            if last.len() > 1 {
                last.pop();
            } else {
                parts.pop();
            }
        }
        Self { parts }
    }

    /// Append a UID inside the last scope.
    pub fn append(&self, uid: Uid) -> ElementPath {
        let mut parts = self.parts.clone();
        match parts.last_mut() {
            Some(last) => last.push(uid),
            None => parts.push(smallvec::smallvec![uid]),
        }
        Self { parts }
    }

    /// Open a new scope (component instance) containing `uid`.
    pub fn append_new_part(&self, uid: Uid) -> ElementPath {
        let mut parts = self.parts.clone();
        parts.push(smallvec::smallvec![uid]);
        Self { parts }
    }

    /// Replace the leaf UID, keeping the rest of the path.
    pub fn with_leaf(&self, uid: Uid) -> ElementPath {
        let mut parts = self.parts.clone();
        if let Some(last) = parts.last_mut()
            && let Some(leaf) = last.last_mut()
        {
            *leaf = uid;
        }
        Self { parts }
    }

    /// True for the root element rendered by a component instance.
    pub fn is_root_of_instance(&self) -> bool {
        self.parts.len() > 1 && self.parts.last().is_some_and(|p| p.len() == 1)
    }

    /// Strict descendant check: `self` lies somewhere below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &ElementPath) -> bool {
        self != ancestor && self.is_descendant_of_or_equal(ancestor)
    }

    pub fn is_descendant_of_or_equal(&self, ancestor: &ElementPath) -> bool {
        let Some((anc_last, anc_init)) = ancestor.parts.split_last() else {
            return false;
        };
        if self.parts.len() < ancestor.parts.len() {
            return false;
        }
        let init_matches = anc_init
            .iter()
            .zip(self.parts.iter())
            .all(|(a, b)| a == b);
        init_matches && self.parts[anc_init.len()].starts_with(anc_last)
    }

    pub fn is_child_of(&self, parent: &ElementPath) -> bool {
        !self.is_empty() && &self.parent() == parent
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "{PART_SEPARATOR}")?;
            }
            for (j, uid) in part.iter().enumerate() {
                if j > 0 {
                    write!(f, "{UID_SEPARATOR}")?;
                }
                f.write_str(uid.as_str())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementPath({self})")
    }
}

impl Serialize for ElementPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementPath::from_string(&s))
    }
}

/// Keep only the paths that have no selected ancestor. Dragging a parent
/// already moves its children, so descendants must not get their own pins.
pub fn drag_targets(selected: &[ElementPath]) -> Vec<ElementPath> {
    selected
        .iter()
        .filter(|path| !selected.iter().any(|other| path.is_descendant_of(other)))
        .cloned()
        .collect()
}
