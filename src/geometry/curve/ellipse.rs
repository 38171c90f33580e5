use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// An elliptical arc in 3D space.
///
/// `P(t) = center + a * cos(t) * major_dir + b * sin(t) * minor_dir`
/// where `minor_dir = normal x major_dir`.
#[derive(Debug, Clone)]
pub struct Ellipse {
    center: Point3,
    semi_major: f64,
    semi_minor: f64,
    normal: Vector3,
    major_dir: Vector3,
}

impl Ellipse {
    /// Creates a new ellipse.
    ///
    /// # Errors
    ///
    /// Returns an error if either axis length is non-positive, the normal is
    /// zero-length, or the major direction is not perpendicular to the normal.
    pub fn new(
        center: Point3,
        semi_major: f64,
        semi_minor: f64,
        normal: Vector3,
        major_dir: Vector3,
    ) -> Result<Self> {
        if semi_major < TOLERANCE || semi_minor < TOLERANCE {
            return Err(GeometryError::Degenerate("ellipse axes must be positive".into()).into());
        }
        let normal = crate::math::try_normalize(&normal).ok_or(GeometryError::ZeroVector)?;
        let major_dir = crate::math::try_normalize(&major_dir).ok_or(GeometryError::ZeroVector)?;
        if normal.dot(&major_dir).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "major direction must be perpendicular to normal".into(),
            )
            .into());
        }
        Ok(Self {
            center,
            semi_major,
            semi_minor,
            normal,
            major_dir,
        })
    }

    /// Returns the center of the ellipse.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the semi-major axis length.
    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    /// Returns the semi-minor axis length.
    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Returns the normal vector of the ellipse plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the major axis direction.
    #[must_use]
    pub fn major_dir(&self) -> &Vector3 {
        &self.major_dir
    }

    fn minor_dir(&self) -> Vector3 {
        self.normal.cross(&self.major_dir)
    }
}

impl Curve for Ellipse {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let x = self.semi_major * t.cos();
        let y = self.semi_minor * t.sin();
        Ok(self.center + self.major_dir * x + self.minor_dir() * y)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let dx = -self.semi_major * t.sin();
        let dy = self.semi_minor * t.cos();
        Ok(self.major_dir * dx + self.minor_dir() * dy)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, TAU)
    }

    fn is_closed(&self) -> bool {
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn axes_endpoints() {
        let e = Ellipse::new(Point3::origin(), 3.0, 2.0, Vector3::z(), Vector3::x()).unwrap();
        assert!((e.evaluate(0.0).unwrap() - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((e.evaluate(FRAC_PI_2).unwrap() - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn parameter_search_finds_quarter() {
        let e = Ellipse::new(Point3::origin(), 3.0, 2.0, Vector3::z(), Vector3::x()).unwrap();
        let p = e.evaluate(1.0).unwrap();
        let t = e.parameter_of(&p, 0.0, FRAC_PI_2).unwrap();
        assert!((t - 1.0).abs() < 1e-8);
    }

    #[test]
    fn zero_axis_is_rejected() {
        assert!(Ellipse::new(Point3::origin(), 1.0, 0.0, Vector3::z(), Vector3::x()).is_err());
    }
}
