//! Scene fixtures shared by the integration tests.
//!
//! A scene is one storyboard instance (`sb/scene`) rendering the `App`
//! component from `/src/app.js`. Every element added through
//! [`SceneBuilder::child`] lands both in the document and in the metadata
//! snapshot, measured relative to its parent's frame.

#![allow(dead_code)]

use canvas_core::geometry::canvas_rect_to_local;
use canvas_core::{
    AllElementProps, CanvasRect, CssValue, ElementInstanceMetadata, ElementInstanceMetadataMap,
    ElementPath, ElementProps, FlexDirection, JsxElement, LayoutSystem, NodeIndex, ParsedFile,
    PositionMode, ProjectContents, SpecialSizeMeasurements, StyleProp,
};
use canvas_editor::{EditorState, EditorStore, EngineConfig};
use std::collections::{BTreeMap, HashMap};

pub const SCENE: &str = "sb/scene";
pub const APP_FILE: &str = "/src/app.js";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn path(s: &str) -> ElementPath {
    ElementPath::from_string(s)
}

pub fn rect(x: f32, y: f32, width: f32, height: f32) -> CanvasRect {
    CanvasRect::new(x, y, width, height)
}

pub fn px(v: f32) -> CssValue {
    CssValue::Px(v)
}

// ─── Measurements ────────────────────────────────────────────────────────

pub fn measured(_: &mut SpecialSizeMeasurements) {}

pub fn absolute(m: &mut SpecialSizeMeasurements) {
    m.position = PositionMode::Absolute;
}

pub fn provides_bounds(m: &mut SpecialSizeMeasurements) {
    m.provides_bounds_for_absolute_children = true;
}

pub fn absolute_with_bounds(m: &mut SpecialSizeMeasurements) {
    absolute(m);
    provides_bounds(m);
}

pub fn flex_row_child(m: &mut SpecialSizeMeasurements) {
    m.position = PositionMode::Relative;
    m.parent_layout_system = LayoutSystem::Flex;
    m.parent_flex_direction = Some(FlexDirection::Row);
    m.parent_flex_gap = 10.0;
}

pub fn block(m: &mut SpecialSizeMeasurements) {
    m.display = "block".to_string();
}

pub fn inline(m: &mut SpecialSizeMeasurements) {
    m.display = "inline".to_string();
}

// ─── Builder ─────────────────────────────────────────────────────────────

pub struct SceneBuilder {
    files: BTreeMap<String, ParsedFile>,
    nodes: HashMap<String, (String, NodeIndex)>,
    metadata: ElementInstanceMetadataMap,
    props: AllElementProps,
}

impl SceneBuilder {
    /// No files and nothing rendered.
    pub fn empty() -> Self {
        Self {
            files: BTreeMap::new(),
            nodes: HashMap::new(),
            metadata: ElementInstanceMetadataMap::new(),
            props: AllElementProps::new(),
        }
    }

    /// A scene whose `App` root is `root`, rendered at `frame`.
    pub fn new(
        root: JsxElement,
        frame: CanvasRect,
        measure: impl FnOnce(&mut SpecialSizeMeasurements),
    ) -> Self {
        let root_path = path(SCENE).append_new_part(root.uid);
        Self::empty()
            .component(APP_FILE, "App", true, root.clone())
            .rendered(&root_path, Some(&root), frame, measure)
    }

    /// Add a top-level component to `file`. Nothing is rendered for it
    /// until [`rendered`](Self::rendered) is called with an instance path.
    pub fn component(mut self, file: &str, name: &str, exported: bool, root: JsxElement) -> Self {
        let uid = root.uid.as_str().to_string();
        let parsed = self.files.entry(file.to_string()).or_default();
        let idx = parsed.add_component(name, exported, root);
        self.nodes.insert(uid, (file.to_string(), idx));
        self
    }

    pub fn import(mut self, file: &str, source: &str, name: &str) -> Self {
        self.files
            .entry(file.to_string())
            .or_default()
            .imports
            .entry(source.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// Add `element` under the element at `parent` in both the document and
    /// the snapshot.
    pub fn child(
        mut self,
        parent: &str,
        element: JsxElement,
        frame: CanvasRect,
        measure: impl FnOnce(&mut SpecialSizeMeasurements),
    ) -> Self {
        let child_path = self.add_to_document(parent, element.clone());
        self.rendered(&child_path, Some(&element), frame, measure)
    }

    /// Add `element` under `parent` in the document only.
    pub fn unrendered_child(mut self, parent: &str, element: JsxElement) -> Self {
        self.add_to_document(parent, element);
        self
    }

    fn add_to_document(&mut self, parent: &str, element: JsxElement) -> ElementPath {
        let parent_path = path(parent);
        let parent_uid = parent_path
            .uid()
            .expect("parent path has a leaf")
            .as_str()
            .to_string();
        let (file, parent_idx) = self
            .nodes
            .get(&parent_uid)
            .cloned()
            .expect("parent is in the document");
        let uid = element.uid;
        let idx = self
            .files
            .get_mut(&file)
            .expect("file exists")
            .add_child(parent_idx, element);
        self.nodes.insert(uid.as_str().to_string(), (file, idx));
        parent_path.append(uid)
    }

    /// Add a snapshot entry at `element_path`, measured against its parent.
    pub fn rendered(
        mut self,
        element_path: &ElementPath,
        element: Option<&JsxElement>,
        frame: CanvasRect,
        measure: impl FnOnce(&mut SpecialSizeMeasurements),
    ) -> Self {
        let parent_frame = self.metadata.global_frame(&element_path.parent());
        let mut m = ElementInstanceMetadata::new(element_path.clone());
        m.global_frame = Some(frame);
        m.special_size_measurements.display = "block".to_string();
        m.special_size_measurements.immediate_parent_bounds = parent_frame;
        m.special_size_measurements.coordinate_system_bounds = parent_frame;
        measure(&mut m.special_size_measurements);
        m.local_frame = Some(match m.special_size_measurements.coordinate_system_bounds {
            Some(cs) => canvas_rect_to_local(frame, cs),
            None => canvas_rect_to_local(frame, rect(0.0, 0.0, 0.0, 0.0)),
        });
        self.metadata.insert(m);

        let mut bag = ElementProps::new();
        if let Some(element) = element.filter(|e| e.has_style_prop) {
            let style: serde_json::Map<String, serde_json::Value> = element
                .style
                .iter()
                .map(|(prop, value)| (prop.to_string(), value.to_string().into()))
                .collect();
            bag.insert("style".to_string(), style.into());
        }
        self.props.insert(element_path, bag);
        self
    }

    pub fn build(self) -> (ProjectContents, ElementInstanceMetadataMap, AllElementProps) {
        let mut project = ProjectContents::new();
        for (name, file) in self.files {
            project.add_file(&name, file);
        }
        (project, self.metadata, self.props)
    }

    /// A store with `selected` selected and the scene's snapshot loaded.
    pub fn store(self, selected: &[&str]) -> EditorStore {
        self.store_with_config(selected, EngineConfig::default())
    }

    pub fn store_with_config(self, selected: &[&str], config: EngineConfig) -> EditorStore {
        let (project, metadata, props) = self.build();
        let mut editor = EditorState::new(project);
        editor.open_file = Some(APP_FILE.to_string());
        editor.selected_views = selected.iter().map(|s| path(s)).collect();
        EditorStore::new(editor, config).with_metadata(metadata, props)
    }
}

// ─── Canned scenes ───────────────────────────────────────────────────────

pub const ROOT: &str = "sb/scene:root";

/// A 400×400 root providing bounds, with:
/// - `aaa`: absolute at (10, 10), 50×50, pinned `left`/`top`
/// - `bbb`: absolute container at (200, 200), 150×150, providing bounds
/// - `plain`: static box at (200, 20), 100×100, no bounds
pub fn absolute_scene() -> SceneBuilder {
    SceneBuilder::new(
        JsxElement::new("root", "div"),
        rect(0.0, 0.0, 400.0, 400.0),
        provides_bounds,
    )
    .child(
        ROOT,
        JsxElement::new("aaa", "div")
            .with_style(StyleProp::Position, CssValue::keyword("absolute"))
            .with_style(StyleProp::Left, px(10.0))
            .with_style(StyleProp::Top, px(10.0))
            .with_style(StyleProp::Width, px(50.0))
            .with_style(StyleProp::Height, px(50.0)),
        rect(10.0, 10.0, 50.0, 50.0),
        absolute,
    )
    .child(
        ROOT,
        JsxElement::new("bbb", "div")
            .with_style(StyleProp::Position, CssValue::keyword("absolute"))
            .with_style(StyleProp::Left, px(200.0))
            .with_style(StyleProp::Top, px(200.0)),
        rect(200.0, 200.0, 150.0, 150.0),
        absolute_with_bounds,
    )
    .child(ROOT, JsxElement::new("plain", "div"), rect(200.0, 20.0, 100.0, 100.0), measured)
}

pub const FLEX_ROOT: &str = "sb/scene:aaa";
pub const CCC: &str = "sb/scene:aaa/ccc";

/// A 400×400 row flexbox `aaa` with gap 10 holding `bbb` (180×180),
/// `ccc` (80×190) and `ddd` (50×110). `ccc` gets the style `ccc_style`
/// and the measured frame `ccc_frame`.
pub fn flex_scene(ccc_style: &[(StyleProp, CssValue)], ccc_frame: CanvasRect) -> SceneBuilder {
    let mut ccc = JsxElement::new("ccc", "div");
    for (prop, value) in ccc_style {
        ccc = ccc.with_style(*prop, value.clone());
    }
    SceneBuilder::new(
        JsxElement::new("aaa", "div")
            .with_style(StyleProp::Display, CssValue::keyword("flex"))
            .with_style(StyleProp::Width, px(400.0))
            .with_style(StyleProp::Height, px(400.0)),
        rect(0.0, 0.0, 400.0, 400.0),
        measured,
    )
    .child(
        FLEX_ROOT,
        JsxElement::new("bbb", "div")
            .with_style(StyleProp::Width, px(180.0))
            .with_style(StyleProp::Height, px(180.0)),
        rect(0.0, 0.0, 180.0, 180.0),
        flex_row_child,
    )
    .child(FLEX_ROOT, ccc, ccc_frame, flex_row_child)
    .child(
        FLEX_ROOT,
        JsxElement::new("ddd", "div")
            .with_style(StyleProp::Width, px(50.0))
            .with_style(StyleProp::Height, px(110.0)),
        rect(280.0, 0.0, 50.0, 110.0),
        flex_row_child,
    )
}

/// The flex scene with `ccc` sized 80×190 in its style.
pub fn sized_flex_scene() -> SceneBuilder {
    flex_scene(
        &[(StyleProp::Width, px(80.0)), (StyleProp::Height, px(190.0))],
        rect(190.0, 0.0, 80.0, 190.0),
    )
}

pub const LIST: &str = "sb/scene:list";

/// A 400-wide flow root `list` with four stacked 50-tall block children
/// `one`, `two`, `three`, `four`.
pub fn flow_scene() -> SceneBuilder {
    let mut builder = SceneBuilder::new(
        JsxElement::new("list", "div"),
        rect(0.0, 0.0, 400.0, 200.0),
        measured,
    );
    for (i, uid) in ["one", "two", "three", "four"].into_iter().enumerate() {
        builder = builder.child(
            LIST,
            JsxElement::new(uid, "div"),
            rect(0.0, 50.0 * i as f32, 400.0, 50.0),
            block,
        );
    }
    builder
}

/// Document-order child UIDs of the element at `parent`.
pub fn child_order(editor: &EditorState, parent: &str) -> Vec<String> {
    let uid = path(parent).uid().expect("parent path has a leaf");
    editor
        .project
        .child_uids(uid)
        .iter()
        .map(|u| u.as_str().to_string())
        .collect()
}

pub fn style(editor: &EditorState, element: &str, prop: StyleProp) -> Option<CssValue> {
    editor.style_value(&path(element), prop).cloned()
}
