//! Hit testing: canvas point → element lookup.
//!
//! The metadata snapshot is an unordered map, so "topmost" is decided by
//! depth: the deepest element whose global frame contains the point wins.
//! Overlapping elements at the same depth resolve by path order (the
//! greater path is treated as painted later).

use canvas_core::{
    CanvasPoint, CanvasRect, ElementInstanceMetadata, ElementInstanceMetadataMap, ElementPath,
};
use kurbo::{Point, Rect};

fn to_kurbo(r: CanvasRect) -> Rect {
    Rect::new(
        f64::from(r.x),
        f64::from(r.y),
        f64::from(r.right()),
        f64::from(r.bottom()),
    )
}

/// True when `frame` contains `p`. Edges count as inside.
pub fn frame_contains(frame: CanvasRect, p: CanvasPoint) -> bool {
    let rect = to_kurbo(frame);
    let point = Point::new(f64::from(p.x), f64::from(p.y));
    // kurbo's `contains` is half-open; the far edges are added back here.
    rect.contains(point)
        || (point.x == rect.x1 && (rect.y0..=rect.y1).contains(&point.y))
        || (point.y == rect.y1 && (rect.x0..=rect.x1).contains(&point.x))
}

/// Every element under `p` accepted by `accept`, topmost first.
pub fn hit_test_all(
    metadata: &ElementInstanceMetadataMap,
    p: CanvasPoint,
    accept: impl Fn(&ElementInstanceMetadata) -> bool,
) -> Vec<ElementPath> {
    let mut hits: Vec<&ElementInstanceMetadata> = metadata
        .iter()
        .filter(|m| m.global_frame.is_some_and(|f| frame_contains(f, p)))
        .filter(|m| accept(m))
        .collect();
    hits.sort_by(|a, b| {
        b.element_path
            .depth()
            .cmp(&a.element_path.depth())
            .then_with(|| b.element_path.cmp(&a.element_path))
    });
    log::trace!("hit test at ({}, {}): {} candidates", p.x, p.y, hits.len());
    hits.into_iter().map(|m| m.element_path.clone()).collect()
}

/// The topmost element under `p` accepted by `accept`, or `None` for
/// background.
pub fn hit_test(
    metadata: &ElementInstanceMetadataMap,
    p: CanvasPoint,
    accept: impl Fn(&ElementInstanceMetadata) -> bool,
) -> Option<ElementPath> {
    hit_test_all(metadata, p, accept).into_iter().next()
}

/// Elements whose global frame intersects `area`. Used for marquee selection.
pub fn hit_test_rect(metadata: &ElementInstanceMetadataMap, area: CanvasRect) -> Vec<ElementPath> {
    let area = to_kurbo(area);
    let mut out: Vec<ElementPath> = metadata
        .iter()
        .filter(|m| {
            m.global_frame.is_some_and(|f| {
                let i = to_kurbo(f).intersect(area);
                i.width() > 0.0 && i.height() > 0.0
            })
        })
        .map(|m| m.element_path.clone())
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(path: &str, x: f32, y: f32, w: f32, h: f32) -> ElementInstanceMetadata {
        let mut m = ElementInstanceMetadata::new(ElementPath::from_string(path));
        m.global_frame = Some(CanvasRect::new(x, y, w, h));
        m
    }

    fn snapshot() -> ElementInstanceMetadataMap {
        [
            meta("s/app:root", 0.0, 0.0, 400.0, 400.0),
            meta("s/app:root/a", 10.0, 10.0, 100.0, 100.0),
            meta("s/app:root/a/inner", 20.0, 20.0, 20.0, 20.0),
            meta("s/app:root/b", 200.0, 200.0, 50.0, 50.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn deepest_element_wins() {
        let hit = hit_test(&snapshot(), CanvasPoint::new(25.0, 25.0), |_| true);
        assert_eq!(hit, Some(ElementPath::from_string("s/app:root/a/inner")));
    }

    #[test]
    fn predicate_skips_candidates() {
        let inner = ElementPath::from_string("s/app:root/a/inner");
        let hit = hit_test(&snapshot(), CanvasPoint::new(25.0, 25.0), |m| {
            m.element_path != inner
        });
        assert_eq!(hit, Some(ElementPath::from_string("s/app:root/a")));
    }

    #[test]
    fn far_edge_counts_as_inside() {
        let hit = hit_test(&snapshot(), CanvasPoint::new(250.0, 250.0), |_| true);
        assert_eq!(hit, Some(ElementPath::from_string("s/app:root/b")));
    }

    #[test]
    fn background_misses() {
        assert_eq!(hit_test(&snapshot(), CanvasPoint::new(900.0, 5.0), |_| true), None);
    }

    #[test]
    fn marquee_collects_intersections() {
        let hits = hit_test_rect(&snapshot(), CanvasRect::new(190.0, 190.0, 20.0, 20.0));
        assert_eq!(
            hits,
            vec![
                ElementPath::from_string("s/app:root"),
                ElementPath::from_string("s/app:root/b"),
            ]
        );
    }
}
