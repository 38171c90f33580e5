use crate::error::{GeometryError, Result};
use crate::geometry::nurbs::{basis_functions, check_knots, find_span, parameter_range};
use crate::math::{Point3, Vector3};

use super::{Curve, CurveDomain};

/// A (possibly rational) B-spline curve.
#[derive(Debug, Clone)]
pub struct NurbsCurve {
    degree: usize,
    control_points: Vec<Point3>,
    weights: Option<Vec<f64>>,
    knots: Vec<f64>,
}

impl NurbsCurve {
    /// Creates a B-spline curve from a full (expanded) knot vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the knot vector or weight count does not match
    /// the number of control points, or a weight is not positive.
    pub fn new(
        degree: usize,
        control_points: Vec<Point3>,
        weights: Option<Vec<f64>>,
        knots: Vec<f64>,
    ) -> Result<Self> {
        check_knots(&knots, degree, control_points.len())?;
        if let Some(w) = &weights {
            if w.len() != control_points.len() {
                return Err(GeometryError::Degenerate(format!(
                    "{} weights for {} control points",
                    w.len(),
                    control_points.len()
                ))
                .into());
            }
            if w.iter().any(|&x| x <= 0.0) {
                return Err(GeometryError::Degenerate("weights must be positive".into()).into());
            }
        }
        Ok(Self {
            degree,
            control_points,
            weights,
            knots,
        })
    }

    /// Polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Control points.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// Weights, or `None` for a non-rational curve.
    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Full knot vector.
    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Returns a copy with every control point moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: &Vector3) -> Self {
        Self {
            control_points: self.control_points.iter().map(|p| p + offset).collect(),
            ..self.clone()
        }
    }

    fn weight(&self, i: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[i])
    }
}

impl Curve for NurbsCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let span = find_span(&self.knots, self.degree, t);
        let (lo, hi) = parameter_range(&self.knots, self.degree);
        let basis = basis_functions(&self.knots, self.degree, span, t.clamp(lo, hi));
        let mut sum = Vector3::zeros();
        let mut wsum = 0.0;
        for (j, b) in basis.iter().enumerate() {
            let i = span - self.degree + j;
            let w = b * self.weight(i);
            sum += self.control_points[i].coords * w;
            wsum += w;
        }
        if wsum.abs() < f64::EPSILON {
            return Err(GeometryError::Degenerate("zero rational weight sum".into()).into());
        }
        Ok(Point3::from(sum / wsum))
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let (lo, hi) = parameter_range(&self.knots, self.degree);
        let h = (hi - lo) * 1e-6;
        let a = (t - h).max(lo);
        let b = (t + h).min(hi);
        Ok((self.evaluate(b)? - self.evaluate(a)?) / (b - a))
    }

    fn domain(&self) -> CurveDomain {
        let (lo, hi) = parameter_range(&self.knots, self.degree);
        CurveDomain::new(lo, hi)
    }

    fn is_closed(&self) -> bool {
        match (self.control_points.first(), self.control_points.last()) {
            (Some(a), Some(b)) => (a - b).norm() < crate::math::POINT_TOLERANCE,
            _ => false,
        }
    }
}
