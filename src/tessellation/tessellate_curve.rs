use std::f64::consts::TAU;

use crate::error::Result;
use crate::geometry::curve::Curve;
use crate::math::Point3;
use crate::topology::{EdgeCurve, EdgeData};

use super::TessellationParams;

/// Samples an edge in traversal order, both end points included.
///
/// Samples are uniform in the curve parameter, so traversing the edge the
/// other way yields the same points reversed.
///
/// # Errors
///
/// Returns an error if the curve cannot be evaluated.
pub fn edge_samples(edge: &EdgeData, forward: bool, params: &TessellationParams) -> Result<Vec<Point3>> {
    let n = segment_count(&edge.curve, edge.t_start, edge.t_end, params).max(1);
    let mut points = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let k = if forward { i } else { n - i };
        #[allow(clippy::cast_precision_loss)]
        let frac = k as f64 / n as f64;
        let t = edge.t_start + frac * (edge.t_end - edge.t_start);
        points.push(edge.curve.evaluate(t)?);
    }
    Ok(points)
}

/// Number of chords needed to follow a curve within the chord tolerance.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn segment_count(curve: &EdgeCurve, t0: f64, t1: f64, params: &TessellationParams) -> usize {
    let sweep = (t1 - t0).abs();
    match curve {
        EdgeCurve::Line(_) => 1,
        EdgeCurve::Arc(arc) => params.angular_segments(arc.radius(), sweep),
        EdgeCurve::Ellipse(e) => params.angular_segments(e.semi_major(), sweep),
        EdgeCurve::Helix(h) => {
            // Each turn needs as many chords as the projected circle.
            let per_turn = params.angular_segments(h.radius(), TAU);
            let turns = (sweep / TAU).max(1.0 / per_turn as f64);
            ((per_turn as f64 * turns).ceil() as usize).clamp(params.min_segments, params.max_segments * 4)
        }
        EdgeCurve::Nurbs(c) => {
            if c.degree() <= 1 {
                c.control_points().len().saturating_sub(1).max(1)
            } else {
                (c.control_points().len() * 4).clamp(params.min_segments, params.max_segments)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Arc, Line};
    use crate::math::Vector3;
    use crate::topology::{TopologyStore, VertexData};

    #[test]
    fn line_edge_has_two_samples() {
        let mut store = TopologyStore::new();
        let a = store.add_vertex(VertexData::new(Point3::origin()));
        let b = store.add_vertex(VertexData::new(Point3::new(3.0, 0.0, 0.0)));
        let line = Line::through(Point3::origin(), Point3::new(3.0, 0.0, 0.0)).unwrap();
        let edge = EdgeData {
            start: a,
            end: b,
            curve: EdgeCurve::Line(line),
            t_start: 0.0,
            t_end: 3.0,
        };
        let points = edge_samples(&edge, true, &TessellationParams::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[1] - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-12);
        let back = edge_samples(&edge, false, &TessellationParams::default()).unwrap();
        assert!((back[0] - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn reversed_samples_mirror_forward() {
        let mut store = TopologyStore::new();
        let v = store.add_vertex(VertexData::new(Point3::new(2.0, 0.0, 0.0)));
        let circle = Arc::circle(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let edge = EdgeData {
            start: v,
            end: v,
            curve: EdgeCurve::Arc(circle),
            t_start: 0.0,
            t_end: TAU,
        };
        let params = TessellationParams::default();
        let fwd = edge_samples(&edge, true, &params).unwrap();
        let mut rev = edge_samples(&edge, false, &params).unwrap();
        rev.reverse();
        assert!(fwd.len() > 8);
        for (a, b) in fwd.iter().zip(&rev) {
            assert!((a - b).norm() < 1e-12);
        }
    }
}
