//! Geometry helpers shared by the culler, ruler, camera and area fills.
//!
//! All positions are in source-image pixels with the origin at the bottom-left
//! corner of the campaign image and y pointing up.

use bevy::math::{Rect, Vec2};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};

/// Expand `rect` by `ratio` of its width and height on every side.
pub fn pad_rect(rect: Rect, ratio: f32) -> Rect {
    let pad = rect.size() * ratio;
    Rect {
        min: rect.min - pad,
        max: rect.max + pad,
    }
}

/// A rectangle that cannot contain anything (zero area or non-finite corners).
pub fn is_degenerate(rect: Rect) -> bool {
    !rect.min.is_finite() || !rect.max.is_finite() || rect.width() <= 0.0 || rect.height() <= 0.0
}

/// True when all four edges of `a` are within `epsilon` of the edges of `b`.
pub fn bounds_within(a: Rect, b: Rect, epsilon: f32) -> bool {
    (a.min - b.min).abs().max_element() < epsilon && (a.max - b.max).abs().max_element() < epsilon
}

/// Inclusive overlap test between two axis-aligned rectangles.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x <= b.max.x && a.max.x >= b.min.x && a.min.y <= b.max.y && a.max.y >= b.min.y
}

/// Bounding box of a polygon, `None` for an empty slice.
pub fn polygon_bounds(points: &[Vec2]) -> Option<Rect> {
    let first = *points.first()?;
    let (min, max) = points
        .iter()
        .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
    Some(Rect { min, max })
}

/// Sum of the Euclidean distances between consecutive points.
pub fn path_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Triangles covering a closed polygon, concave outlines included.
#[derive(Debug, Clone, Default)]
pub struct PolygonFill {
    pub vertices: Vec<Vec2>,
    /// Three indices into `vertices` per triangle
    pub indices: Vec<u32>,
}

struct PositionCtor;

impl FillVertexConstructor<Vec2> for PositionCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> Vec2 {
        let p = vertex.position();
        Vec2::new(p.x, p.y)
    }
}

/// Tessellate the closed outline through `points` with the even-odd rule.
pub fn fill_polygon(points: &[Vec2]) -> Result<PolygonFill, String> {
    let (first, rest) = points
        .split_first()
        .ok_or_else(|| "empty polygon".to_string())?;

    let mut builder = Path::builder();
    builder.begin(point(first.x, first.y));
    for p in rest {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::EvenOdd),
            &mut BuffersBuilder::new(&mut buffers, PositionCtor),
        )
        .map_err(|e| format!("polygon tessellation failed: {e:?}"))?;

    Ok(PolygonFill {
        vertices: buffers.vertices,
        indices: buffers.indices,
    })
}

/// Region the view must stay inside: the image padded by half the screen size
/// (counted in source pixels) on each side, so the image edges can reach the
/// screen center at zoom 0.
pub fn max_bounds(image_size: Vec2, screen_size: Vec2) -> Rect {
    let pad = (screen_size / 2.0).ceil();
    Rect {
        min: -pad,
        max: image_size + pad,
    }
}

/// Move `center` so a view of `half_extent` stays inside `limits`. A view larger
/// than the limits on an axis is centered on that axis.
pub fn clamp_view_center(center: Vec2, half_extent: Vec2, limits: Rect) -> Vec2 {
    let axis = |c: f32, half: f32, min: f32, max: f32| {
        if max - min <= half * 2.0 {
            (min + max) / 2.0
        } else {
            c.clamp(min + half, max - half)
        }
    };
    Vec2::new(
        axis(center.x, half_extent.x, limits.min.x, limits.max.x),
        axis(center.y, half_extent.y, limits.min.y, limits.max.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_rect_expands_each_side() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        let padded = pad_rect(rect, 0.2);
        assert_eq!(padded.min, Vec2::new(-20.0, -10.0));
        assert_eq!(padded.max, Vec2::new(120.0, 60.0));
    }

    #[test]
    fn test_degenerate_rects() {
        assert!(is_degenerate(Rect::new(5.0, 5.0, 5.0, 10.0)));
        assert!(is_degenerate(Rect {
            min: Vec2::new(f32::NAN, 0.0),
            max: Vec2::new(1.0, 1.0),
        }));
        assert!(!is_degenerate(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_bounds_within_epsilon() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.2, -0.1, 100.3, 99.8);
        assert!(bounds_within(a, b, 0.5));
        assert!(!bounds_within(a, Rect::new(0.0, 0.0, 101.0, 100.0), 0.5));
    }

    #[test]
    fn test_polygon_bounds() {
        let points = [Vec2::new(3.0, 1.0), Vec2::new(-2.0, 4.0), Vec2::new(1.0, -5.0)];
        let bounds = polygon_bounds(&points).unwrap();
        assert_eq!(bounds.min, Vec2::new(-2.0, -5.0));
        assert_eq!(bounds.max, Vec2::new(3.0, 4.0));
        assert!(polygon_bounds(&[]).is_none());
    }

    #[test]
    fn test_rects_overlap_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rects_overlap(a, Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!rects_overlap(a, Rect::new(10.5, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn test_path_length() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(3.0, 4.0)];
        assert_eq!(path_length(&points), 7.0);
        assert_eq!(path_length(&points[..1]), 0.0);
    }

    #[test]
    fn test_max_bounds_pads_by_half_screen() {
        let bounds = max_bounds(Vec2::new(2047.0, 2047.0), Vec2::new(801.0, 600.0));
        assert_eq!(bounds.min, Vec2::new(-401.0, -300.0));
        assert_eq!(bounds.max, Vec2::new(2448.0, 2347.0));
    }

    #[test]
    fn test_clamp_view_center() {
        let limits = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let half = Vec2::new(100.0, 100.0);
        assert_eq!(
            clamp_view_center(Vec2::new(500.0, 500.0), half, limits),
            Vec2::new(500.0, 500.0)
        );
        assert_eq!(
            clamp_view_center(Vec2::new(-50.0, 990.0), half, limits),
            Vec2::new(100.0, 900.0)
        );
        // Wider than the limits on x: centered.
        assert_eq!(
            clamp_view_center(Vec2::new(20.0, 300.0), Vec2::new(800.0, 100.0), limits),
            Vec2::new(500.0, 300.0)
        );
    }

    #[test]
    fn test_fill_polygon_keeps_concave_notch_empty() {
        // U shape: a 30 x 30 square with the 10 x 20 notch cut from the top.
        let outline = [
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(30.0, 30.0),
            Vec2::new(20.0, 30.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 30.0),
            Vec2::new(0.0, 30.0),
        ];
        let fill = fill_polygon(&outline).unwrap();
        assert_eq!(fill.indices.len() % 3, 0);

        let mut covered = 0.0;
        for tri in fill.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| fill.vertices[tri[i] as usize]);
            covered += ((b - a).perp_dot(c - a) / 2.0).abs();
            let centroid = (a + b + c) / 3.0;
            let in_notch = centroid.x > 10.0 && centroid.x < 20.0 && centroid.y > 10.0;
            assert!(!in_notch, "triangle {:?} fills the notch", [a, b, c]);
            assert!(centroid.cmpge(Vec2::ZERO).all() && centroid.cmple(Vec2::splat(30.0)).all());
        }
        assert!((covered - 700.0).abs() < 0.5);
    }

    #[test]
    fn test_fill_polygon_empty_is_error() {
        assert!(fill_polygon(&[]).is_err());
    }
}
