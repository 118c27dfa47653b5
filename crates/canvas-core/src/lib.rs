pub mod geometry;
pub mod id;
pub mod metadata;
pub mod model;
pub mod path;

pub use geometry::{
    Axis, Canvas, CanvasPoint, CanvasRect, CanvasVector, EdgePosition, EdgeSide, Local,
    LocalPoint, LocalRect,
};
pub use id::Uid;
pub use metadata::{
    AllElementProps, ElementInstanceMetadata, ElementInstanceMetadataMap, ElementProps,
    FlexDirection, LayoutSystem, MeasurementError, PositionMode, SpecialSizeMeasurements,
};
pub use model::*;
pub use path::{ElementPath, clear_path_cache, drag_targets};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
