use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{rotational_frame, Surface, SurfaceDomain};

/// A cylindrical surface in 3D space.
///
/// `P(u, v) = center + radius * cos(u) * ref_dir + radius * sin(u) * y_dir + v * axis`
///
/// `y_dir` defaults to `axis x ref_dir`. A frame given with the opposite
/// `y_dir` is left-handed and its natural normal points toward the axis.
#[derive(Debug, Clone)]
pub struct Cylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    ref_dir: Vector3,
    y_dir: Vector3,
}

impl Cylinder {
    /// Creates a new cylinder with a right-handed frame.
    ///
    /// # Arguments
    ///
    /// * `center` - A point on the cylinder axis
    /// * `radius` - Radius (must be positive)
    /// * `axis` - Axis direction (will be normalized)
    /// * `ref_dir` - Reference direction for u=0 (must be perpendicular to axis)
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        Self::build(center, radius, axis, ref_dir, None)
    }

    /// Creates a cylinder with an explicit `y_dir`, which may be left-handed.
    ///
    /// # Errors
    ///
    /// Same as [`Cylinder::new`], and `y_dir` must be `+-(axis x ref_dir)`.
    pub fn with_frame(
        center: Point3,
        radius: f64,
        axis: Vector3,
        ref_dir: Vector3,
        y_dir: Vector3,
    ) -> Result<Self> {
        Self::build(center, radius, axis, ref_dir, Some(y_dir))
    }

    fn build(
        center: Point3,
        radius: f64,
        axis: Vector3,
        ref_dir: Vector3,
        y_dir: Option<Vector3>,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        let (axis, ref_dir, y_dir) = rotational_frame(axis, ref_dir, y_dir)?;
        Ok(Self {
            center,
            radius,
            axis,
            ref_dir,
            y_dir,
        })
    }

    /// Returns the center point on the axis.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the reference direction (u=0).
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Returns the direction at u = pi/2.
    #[must_use]
    pub fn y_dir(&self) -> &Vector3 {
        &self.y_dir
    }

    /// Whether `(ref_dir, y_dir, axis)` is right-handed.
    #[must_use]
    pub fn is_right_handed(&self) -> bool {
        self.axis.cross(&self.ref_dir).dot(&self.y_dir) > 0.0
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let x = self.radius * u.cos();
        let y = self.radius * u.sin();
        Ok(self.center + self.ref_dir * x + self.y_dir * y + self.axis * v)
    }

    fn partials(&self, u: f64, _v: f64) -> Result<(Vector3, Vector3)> {
        let du = (self.y_dir * u.cos() - self.ref_dir * u.sin()) * self.radius;
        Ok((du, self.axis))
    }

    fn normal(&self, u: f64, _v: f64) -> Result<Vector3> {
        let radial = self.ref_dir * u.cos() + self.y_dir * u.sin();
        Ok(if self.is_right_handed() { radial } else { -radial })
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn u_period(&self) -> Option<f64> {
        Some(TAU)
    }

    /// `u` is in `(-pi, pi]`, `v` is the signed distance along the axis.
    fn inverse(&self, point: &Point3) -> Result<(f64, f64)> {
        let dp = point - self.center;
        let v = dp.dot(&self.axis);
        let u = dp.dot(&self.y_dir).atan2(dp.dot(&self.ref_dir));
        Ok((u, v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn z_cylinder(radius: f64) -> Cylinder {
        Cylinder::new(Point3::origin(), radius, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_at_pi_over_2() {
        let c = z_cylinder(2.0);
        let p = c.evaluate(FRAC_PI_2, 0.0).unwrap();
        assert!((p - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn normal_outward_at_zero() {
        let c = z_cylinder(1.0);
        let n = c.normal(0.0, 0.0).unwrap();
        assert!((n - Vector3::x()).norm() < TOLERANCE);
    }

    #[test]
    fn normal_matches_partials_cross() {
        let c = Cylinder::with_frame(Point3::origin(), 1.5, Vector3::z(), Vector3::x(), -Vector3::y()).unwrap();
        let (du, dv) = c.partials(0.7, 1.0).unwrap();
        let n = c.normal(0.7, 1.0).unwrap();
        assert!((du.cross(&dv).normalize() - n).norm() < 1e-12);
    }

    #[test]
    fn left_handed_normal_points_inward() {
        let c = Cylinder::with_frame(Point3::origin(), 1.0, Vector3::z(), Vector3::x(), -Vector3::y()).unwrap();
        assert!(!c.is_right_handed());
        let n = c.normal(0.0, 0.0).unwrap();
        assert!((n + Vector3::x()).norm() < TOLERANCE);
    }

    #[test]
    fn invalid_radius() {
        let r = Cylinder::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x());
        assert!(r.is_err());
    }

    #[test]
    fn inverse_roundtrip() {
        let c = Cylinder::with_frame(Point3::new(1.0, 0.0, 0.0), 2.0, Vector3::z(), Vector3::x(), -Vector3::y()).unwrap();
        for &(u, v) in &[(0.0, 0.0), (FRAC_PI_2, 3.0), (1.0, -2.5), (TAU * 0.75, 1.0)] {
            let p = c.evaluate(u, v).unwrap();
            let (u2, v2) = c.inverse(&p).unwrap();
            let p2 = c.evaluate(u2, v2).unwrap();
            assert!((p - p2).norm() < 1e-9, "roundtrip failed for u={u}, v={v}");
        }
    }
}
