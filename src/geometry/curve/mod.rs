mod arc;
mod ellipse;
mod helix;
mod line;
mod nurbs;

pub use arc::Arc;
pub use ellipse::Ellipse;
pub use helix::Helix;
pub use line::Line;
pub use nurbs::NurbsCurve;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// First derivative `dP/dt` (not normalized).
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn derivative(&self, t: f64) -> Result<Vector3>;

    /// Computes the unit tangent vector at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tangent is degenerate.
    fn tangent(&self, t: f64) -> Result<Vector3> {
        let d = self.derivative(t)?;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(d / len)
    }

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Finds the parameter of the curve point closest to `point`.
    ///
    /// The search is restricted to `[t0, t1]`. The default implementation
    /// samples the range and refines with Newton iterations.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn parameter_of(&self, point: &Point3, t0: f64, t1: f64) -> Result<f64> {
        closest_parameter(self, point, t0, t1)
    }
}

/// Closed set of curve kinds an edge can carry.
#[derive(Debug, Clone)]
pub enum CurveKind {
    /// A straight line.
    Line(Line),
    /// A circular arc or full circle.
    Arc(Arc),
    /// An ellipse.
    Ellipse(Ellipse),
    /// A (rational) B-spline curve.
    Nurbs(NurbsCurve),
    /// A circular helix.
    Helix(Helix),
}

impl CurveKind {
    fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Line(c) => c,
            Self::Arc(c) => c,
            Self::Ellipse(c) => c,
            Self::Nurbs(c) => c,
            Self::Helix(c) => c,
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Arc(_) => "arc",
            Self::Ellipse(_) => "ellipse",
            Self::Nurbs(_) => "nurbs",
            Self::Helix(_) => "helix",
        }
    }
}

impl Curve for CurveKind {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        self.as_curve().evaluate(t)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        self.as_curve().derivative(t)
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        self.as_curve().tangent(t)
    }

    fn domain(&self) -> CurveDomain {
        self.as_curve().domain()
    }

    fn is_closed(&self) -> bool {
        self.as_curve().is_closed()
    }

    fn parameter_of(&self, point: &Point3, t0: f64, t1: f64) -> Result<f64> {
        self.as_curve().parameter_of(point, t0, t1)
    }
}

/// Sampling + Newton closest-point search shared by curves without a closed form.
///
/// # Errors
///
/// Returns an error if the curve cannot be evaluated in the range.
pub fn closest_parameter<C: Curve + ?Sized>(
    curve: &C,
    point: &Point3,
    t0: f64,
    t1: f64,
) -> Result<f64> {
    const SAMPLES: usize = 32;
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

    let mut best_t = lo;
    let mut best_d = f64::INFINITY;
    for i in 0..=SAMPLES {
        #[allow(clippy::cast_precision_loss)]
        let t = lo + (hi - lo) * (i as f64 / SAMPLES as f64);
        let d = (curve.evaluate(t)? - point).norm_squared();
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }

    let mut t = best_t;
    for _ in 0..20 {
        let p = curve.evaluate(t)?;
        let d1 = curve.derivative(t)?;
        let denom = d1.norm_squared();
        if denom < TOLERANCE {
            break;
        }
        let step = (p - point).dot(&d1) / denom;
        let next = (t - step).clamp(lo, hi);
        if (next - t).abs() < 1e-14 {
            break;
        }
        t = next;
    }
    Ok(t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn closest_parameter_on_line() {
        let line = Line::new(Point3::origin(), Vector3::x()).unwrap();
        let t = closest_parameter(&line, &Point3::new(2.5, 1.0, 0.0), 0.0, 10.0).unwrap();
        assert!((t - 2.5).abs() < 1e-9);
    }
}
