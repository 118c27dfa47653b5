//! Geometry kernel: points, vectors and rectangles tagged with the
//! coordinate space they live in.
//!
//! Two spaces matter to the engine:
//!
//! - **Canvas**: global canvas coordinates (what the pointer reports, and
//!   what `global_frame` in the metadata uses).
//! - **Local**: relative to the element's coordinate-system parent (what
//!   CSS `left`/`top` pins are expressed in).
//!
//! The space is a phantom type parameter, so mixing a canvas rect with a
//! local point is a compile error rather than an off-by-parent bug.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Add, Neg, Sub};

/// Global canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Canvas;

/// Coordinates relative to the element's coordinate-system parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Local;

// ─── Points ──────────────────────────────────────────────────────────────

/// A point (or vector) in space `S`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point<S> {
    pub x: f32,
    pub y: f32,
    #[serde(skip)]
    space: PhantomData<S>,
}

pub type CanvasPoint = Point<Canvas>;
/// Drag deltas are plain canvas points; the alias documents intent.
pub type CanvasVector = Point<Canvas>;
pub type LocalPoint = Point<Local>;

impl<S> Point<S> {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Component along `axis`.
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

impl<S> Add for Point<S> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<S> Sub for Point<S> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<S> Neg for Point<S> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

pub fn offset_point<S>(point: Point<S>, by: Point<S>) -> Point<S> {
    point + by
}

// ─── Rectangles ──────────────────────────────────────────────────────────

/// An axis-aligned rectangle in space `S` (origin + size).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect<S> {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip)]
    space: PhantomData<S>,
}

pub type CanvasRect = Rect<Canvas>;
pub type LocalRect = Rect<Local>;

impl<S> Rect<S> {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space: PhantomData,
        }
    }

    pub fn origin(&self) -> Point<S> {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point<S> {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment, matching how the DOM reports edge hits.
    pub fn contains(&self, p: Point<S>) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Size along `axis`.
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Start coordinate along `axis`.
    pub fn start(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Translate `rect` by `by`. Identity on the zero vector.
pub fn offset_rect<S>(rect: Rect<S>, by: Point<S>) -> Rect<S> {
    Rect::new(rect.x + by.x, rect.y + by.y, rect.width, rect.height)
}

/// Smallest rectangle containing both inputs.
pub fn bounding_rectangle<S>(a: Rect<S>, b: Rect<S>) -> Rect<S> {
    let x = a.x.min(b.x);
    let y = a.y.min(b.y);
    let right = a.right().max(b.right());
    let bottom = a.bottom().max(b.bottom());
    Rect::new(x, y, right - x, bottom - y)
}

/// Union of all rectangles, or `None` when there are none.
pub fn bounding_rectangle_array<S>(rects: impl IntoIterator<Item = Rect<S>>) -> Option<Rect<S>> {
    rects.into_iter().reduce(bounding_rectangle)
}

/// Express a canvas rect relative to a coordinate system's canvas bounds.
pub fn canvas_rect_to_local(rect: CanvasRect, coordinate_system: CanvasRect) -> LocalRect {
    LocalRect::new(
        rect.x - coordinate_system.x,
        rect.y - coordinate_system.y,
        rect.width,
        rect.height,
    )
}

pub fn local_rect_to_canvas(rect: LocalRect, coordinate_system: CanvasRect) -> CanvasRect {
    CanvasRect::new(
        rect.x + coordinate_system.x,
        rect.y + coordinate_system.y,
        rect.width,
        rect.height,
    )
}

// ─── Axis constraint ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// The dominant axis of a drag. On a tie the horizontal axis wins.
pub fn constrained_drag_axis(drag: CanvasVector) -> Axis {
    if drag.x.abs() >= drag.y.abs() {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Zero out the component that is not along `axis`.
pub fn constrain_drag(drag: CanvasVector, axis: Axis) -> CanvasVector {
    match axis {
        Axis::Horizontal => CanvasVector::new(drag.x, 0.0),
        Axis::Vertical => CanvasVector::new(0.0, drag.y),
    }
}

// ─── Resize handles ──────────────────────────────────────────────────────

/// Which handle of the selection box is being dragged.
///
/// Each coordinate is `0` (start edge), `0.5` (midpoint) or `1` (end edge);
/// `(0, 0)` is the top-left corner, `(1, 0.5)` the right edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgePosition {
    pub x: f32,
    pub y: f32,
}

/// How one axis of a frame reacts to a resize drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    /// The start edge follows the drag, the end edge stays put.
    Start,
    /// Midpoint handle: this axis does not resize.
    Middle,
    /// The end edge follows the drag, the start edge stays put.
    End,
}

impl EdgePosition {
    pub const TOP_LEFT: Self = Self::new(0.0, 0.0);
    pub const TOP_RIGHT: Self = Self::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Self = Self::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Self = Self::new(1.0, 1.0);
    pub const LEFT: Self = Self::new(0.0, 0.5);
    pub const RIGHT: Self = Self::new(1.0, 0.5);
    pub const TOP: Self = Self::new(0.5, 0.0);
    pub const BOTTOM: Self = Self::new(0.5, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn side(&self, axis: Axis) -> EdgeSide {
        let v = match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        };
        if v < 0.25 {
            EdgeSide::Start
        } else if v > 0.75 {
            EdgeSide::End
        } else {
            EdgeSide::Middle
        }
    }

    pub fn is_corner(&self) -> bool {
        self.side(Axis::Horizontal) != EdgeSide::Middle
            && self.side(Axis::Vertical) != EdgeSide::Middle
    }
}

fn resize_axis(start: f32, size: f32, side: EdgeSide, delta: f32) -> (f32, f32) {
    match side {
        EdgeSide::Start => {
            let new_start = start + delta;
            let end = start + size;
            (new_start.min(end), (end - new_start).abs())
        }
        EdgeSide::End => {
            let new_end = start + size + delta;
            (start.min(new_end), (new_end - start).abs())
        }
        EdgeSide::Middle => (start, size),
    }
}

/// Apply a resize drag to `start` from the handle at `edge`.
///
/// Dragging an edge past the opposite one flips the frame, so the resulting
/// size is always non-negative.
pub fn resize_frame<S>(start: Rect<S>, edge: EdgePosition, drag: Point<S>) -> Rect<S> {
    let (x, width) = resize_axis(start.x, start.width, edge.side(Axis::Horizontal), drag.x);
    let (y, height) = resize_axis(start.y, start.height, edge.side(Axis::Vertical), drag.y);
    Rect::new(x, y, width, height)
}
