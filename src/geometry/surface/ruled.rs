use crate::error::Result;
use crate::geometry::curve::{Curve, CurveKind, Line};
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// A surface ruled between two rail curves.
///
/// `P(u, v) = (1 - v) * C1(a0 + u * (a1 - a0)) + v * C2(b0 + u * (b1 - b0))`
/// with `u, v` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct RuledSurface {
    first: Box<CurveKind>,
    first_range: (f64, f64),
    second: Box<CurveKind>,
    second_range: (f64, f64),
}

impl RuledSurface {
    /// Creates a ruled surface between two bounded rails.
    #[must_use]
    pub fn new(
        first: CurveKind,
        first_range: (f64, f64),
        second: CurveKind,
        second_range: (f64, f64),
    ) -> Self {
        Self {
            first: Box::new(first),
            first_range,
            second: Box::new(second),
            second_range,
        }
    }

    /// Bilinear patch between two straight segments.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is degenerate.
    pub fn between_points(first: [Point3; 2], second: [Point3; 2]) -> Result<Self> {
        let a = Line::through(first[0], first[1])?;
        let b = Line::through(second[0], second[1])?;
        Ok(Self::new(
            CurveKind::Line(a),
            (0.0, (first[1] - first[0]).norm()),
            CurveKind::Line(b),
            (0.0, (second[1] - second[0]).norm()),
        ))
    }

    /// First rail and its parameter range.
    #[must_use]
    pub fn first(&self) -> (&CurveKind, (f64, f64)) {
        (&self.first, self.first_range)
    }

    /// Second rail and its parameter range.
    #[must_use]
    pub fn second(&self) -> (&CurveKind, (f64, f64)) {
        (&self.second, self.second_range)
    }

    fn rail_params(&self, u: f64) -> (f64, f64) {
        let (a0, a1) = self.first_range;
        let (b0, b1) = self.second_range;
        (a0 + u * (a1 - a0), b0 + u * (b1 - b0))
    }
}

impl Surface for RuledSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let (s, t) = self.rail_params(u);
        let p = self.first.evaluate(s)?;
        let q = self.second.evaluate(t)?;
        Ok(p + (q - p) * v)
    }

    fn partials(&self, u: f64, v: f64) -> Result<(Vector3, Vector3)> {
        let (s, t) = self.rail_params(u);
        let (a0, a1) = self.first_range;
        let (b0, b1) = self.second_range;
        let dp = self.first.derivative(s)? * (a1 - a0);
        let dq = self.second.derivative(t)? * (b1 - b0);
        let du = dp * (1.0 - v) + dq * v;
        let dv = self.second.evaluate(t)? - self.first.evaluate(s)?;
        Ok((du, dv))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, 1.0, 0.0, 1.0)
    }
}
