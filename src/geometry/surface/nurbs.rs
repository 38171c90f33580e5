use crate::error::{GeometryError, Result};
use crate::geometry::nurbs::{basis_functions, check_knots, find_span, parameter_range};
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// A (possibly rational) tensor-product B-spline surface.
///
/// Control points are stored row-major: index `i * v_count + j` where `i`
/// runs along U. Fields are public so imported data can be carried as-is;
/// evaluation reports a mismatch between the grid and knot vectors.
#[derive(Debug, Clone)]
pub struct NurbsSurface {
    /// Degree in U.
    pub u_degree: usize,
    /// Degree in V.
    pub v_degree: usize,
    /// Number of control point rows along U.
    pub u_count: usize,
    /// Number of control points per row (along V).
    pub v_count: usize,
    /// Control net, row-major.
    pub control_points: Vec<Point3>,
    /// Weights, `None` for a non-rational surface.
    pub weights: Option<Vec<f64>>,
    /// Full knot vector in U.
    pub u_knots: Vec<f64>,
    /// Full knot vector in V.
    pub v_knots: Vec<f64>,
}

impl NurbsSurface {
    /// Checks that the control net, weights and knots agree.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        if self.control_points.len() != self.u_count * self.v_count {
            return Err(GeometryError::Degenerate(format!(
                "{} control points for a {}x{} grid",
                self.control_points.len(),
                self.u_count,
                self.v_count
            ))
            .into());
        }
        if let Some(w) = &self.weights {
            if w.len() != self.control_points.len() {
                return Err(GeometryError::Degenerate("weight count mismatch".into()).into());
            }
        }
        check_knots(&self.u_knots, self.u_degree, self.u_count)?;
        check_knots(&self.v_knots, self.v_degree, self.v_count)
    }

    /// Row `i` of the control net (constant U index).
    #[must_use]
    pub fn row(&self, i: usize) -> &[Point3] {
        &self.control_points[i * self.v_count..(i + 1) * self.v_count]
    }

    fn weight(&self, idx: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[idx])
    }
}

impl Surface for NurbsSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.validate()?;
        let (u0, u1) = parameter_range(&self.u_knots, self.u_degree);
        let (v0, v1) = parameter_range(&self.v_knots, self.v_degree);
        let u = u.clamp(u0, u1);
        let v = v.clamp(v0, v1);
        let su = find_span(&self.u_knots, self.u_degree, u);
        let sv = find_span(&self.v_knots, self.v_degree, v);
        let nu = basis_functions(&self.u_knots, self.u_degree, su, u);
        let nv = basis_functions(&self.v_knots, self.v_degree, sv, v);

        let mut sum = Vector3::zeros();
        let mut wsum = 0.0;
        for (a, bu) in nu.iter().enumerate() {
            let i = su - self.u_degree + a;
            for (b, bv) in nv.iter().enumerate() {
                let j = sv - self.v_degree + b;
                let idx = i * self.v_count + j;
                let w = bu * bv * self.weight(idx);
                sum += self.control_points[idx].coords * w;
                wsum += w;
            }
        }
        if wsum.abs() < f64::EPSILON {
            return Err(GeometryError::Degenerate("zero rational weight sum".into()).into());
        }
        Ok(Point3::from(sum / wsum))
    }

    fn domain(&self) -> SurfaceDomain {
        let (u0, u1) = parameter_range(&self.u_knots, self.u_degree);
        let (v0, v1) = parameter_range(&self.v_knots, self.v_degree);
        SurfaceDomain::new(u0, u1, v0, v1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bilinear() -> NurbsSurface {
        NurbsSurface {
            u_degree: 1,
            v_degree: 1,
            u_count: 2,
            v_count: 2,
            control_points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
            ],
            weights: None,
            u_knots: vec![0.0, 0.0, 1.0, 1.0],
            v_knots: vec![0.0, 0.0, 1.0, 1.0],
        }
    }

    #[test]
    fn bilinear_centre() {
        let s = bilinear();
        let p = s.evaluate(0.5, 0.5).unwrap();
        assert!((p - Point3::new(0.5, 0.5, 0.25)).norm() < 1e-12);
    }

    #[test]
    fn grid_mismatch_is_reported() {
        let mut s = bilinear();
        s.control_points.pop();
        assert!(s.evaluate(0.5, 0.5).is_err());
    }

    #[test]
    fn numeric_inverse() {
        let s = bilinear();
        let p = s.evaluate(0.25, 0.8).unwrap();
        let (u, v) = s.inverse(&p).unwrap();
        assert!((u - 0.25).abs() < 1e-7 && (v - 0.8).abs() < 1e-7);
    }
}
