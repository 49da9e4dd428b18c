//! Curve sampling and fan triangulation
//!
//! All outputs are per-command scratch. Storage is reserved fallibly so an
//! allocation failure drops the one command instead of aborting the frame.

use std::f32::consts::TAU;

use easel_core::{Fp, Point};
use smallvec::SmallVec;

use crate::error::{RenderError, RenderResult};

/// Default number of segments for circle and ellipse outlines and fans
pub const CIRCLE_SEGMENTS: usize = 64;

/// Default number of segments for arcs
pub const ARC_SEGMENTS: usize = 32;

/// Sampled polyline; inline for the default circle resolution
pub type PointList = SmallVec<[Point; 128]>;

/// Triangle index list
pub type IndexList = SmallVec<[u32; 256]>;

fn reserve_points(count: usize) -> RenderResult<PointList> {
    let mut points = PointList::new();
    points
        .try_reserve_exact(count)
        .map_err(|_| RenderError::Allocation {
            what: "points",
            count,
        })?;
    Ok(points)
}

/// Point on an axis-aligned ellipse at `angle` radians
fn ellipse_point(center: Point, rx: Fp, ry: Fp, angle: f32) -> Point {
    Point::new(center.x + rx * angle.cos(), center.y + ry * angle.sin())
}

/// Closed outline of an axis-aligned ellipse
///
/// Samples `segments` steps uniformly over a full turn and returns
/// `segments + 1` points; the last point repeats the first exactly.
pub fn ellipse_outline(center: Point, rx: Fp, ry: Fp, segments: usize) -> RenderResult<PointList> {
    let segments = segments.max(1);
    let mut points = reserve_points(segments + 1)?;
    for i in 0..segments {
        let angle = TAU * i as f32 / segments as f32;
        points.push(ellipse_point(center, rx, ry, angle));
    }
    points.push(points[0]);
    Ok(points)
}

/// Closed outline of a circle, see [`ellipse_outline`]
pub fn circle_outline(center: Point, radius: Fp, segments: usize) -> RenderResult<PointList> {
    ellipse_outline(center, radius, radius, segments)
}

/// Open polyline along a circular arc
///
/// The angle is interpolated linearly from `start_deg` to `end_deg`
/// (degrees), giving `segments + 1` points.
pub fn arc_polyline(
    center: Point,
    radius: Fp,
    start_deg: Fp,
    end_deg: Fp,
    segments: usize,
) -> RenderResult<PointList> {
    let segments = segments.max(1);
    let mut points = reserve_points(segments + 1)?;
    let span = end_deg - start_deg;
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let angle = (start_deg + span * t).to_radians();
        points.push(ellipse_point(center, radius, radius, angle));
    }
    Ok(points)
}

/// Triangles `{center, p[i], p[i + 1]}` around an ellipse
pub fn ellipse_wedges(
    center: Point,
    rx: Fp,
    ry: Fp,
    segments: usize,
) -> RenderResult<SmallVec<[[Point; 3]; 64]>> {
    let ring = ellipse_outline(center, rx, ry, segments)?;
    let mut wedges = SmallVec::new();
    wedges
        .try_reserve_exact(ring.len() - 1)
        .map_err(|_| RenderError::Allocation {
            what: "wedges",
            count: ring.len() - 1,
        })?;
    for pair in ring.windows(2) {
        wedges.push([center, pair[0], pair[1]]);
    }
    Ok(wedges)
}

/// Fan triangulation anchored at vertex 0
///
/// Produces indices `{0, i + 1, i + 2}` for `i` in `0..vertex_count - 2`.
/// Fewer than three vertices yield no triangles.
pub fn fan_indices(vertex_count: usize) -> RenderResult<IndexList> {
    let triangles = vertex_count.saturating_sub(2);
    let mut indices = IndexList::new();
    indices
        .try_reserve_exact(triangles * 3)
        .map_err(|_| RenderError::Allocation {
            what: "indices",
            count: triangles * 3,
        })?;
    for i in 0..triangles as u32 {
        indices.extend_from_slice(&[0, i + 1, i + 2]);
    }
    Ok(indices)
}

/// `points` followed by its first point
pub fn closed_polyline(points: &[Point]) -> RenderResult<PointList> {
    let mut closed = reserve_points(points.len() + 1)?;
    closed.extend_from_slice(points);
    if let Some(first) = points.first() {
        closed.push(*first);
    }
    Ok(closed)
}
