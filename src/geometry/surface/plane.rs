use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDomain};

/// Unbounded plane `P(u, v) = origin + u * u_dir + v * v_dir`.
///
/// `u_dir`, `v_dir` and `normal` form a right-handed orthonormal frame.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Plane spanned by `u_dir` and `v_dir`; `v_dir` only picks the side
    /// and is re-derived as `normal x u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero `u_dir` or parallel directions.
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_dir = crate::math::try_normalize(&u_dir).ok_or(GeometryError::ZeroVector)?;
        let normal = crate::math::try_normalize(&u_dir.cross(&v_dir))
            .ok_or_else(|| GeometryError::Degenerate("plane directions are parallel".into()))?;
        Ok(Self::framed(origin, u_dir, normal))
    }

    /// Plane through `origin` facing `normal`, with an arbitrary in-plane frame.
    ///
    /// # Errors
    ///
    /// Returns an error if `normal` is zero.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let normal = crate::math::try_normalize(&normal).ok_or(GeometryError::ZeroVector)?;
        Ok(Self::framed(origin, crate::math::any_perpendicular(&normal), normal))
    }

    fn framed(origin: Point3, u_dir: Vector3, normal: Vector3) -> Self {
        Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
        }
    }

    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Unit normal, constant over the whole plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn partials(&self, _u: f64, _v: f64) -> Result<(Vector3, Vector3)> {
        Ok((self.u_dir, self.v_dir))
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn inverse(&self, point: &Point3) -> Result<(f64, f64)> {
        let d = point - self.origin;
        Ok((d.dot(&self.u_dir), d.dot(&self.v_dir)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    #[test]
    fn from_normal_builds_orthonormal_frame() {
        let plane = Plane::from_normal(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 3.0)).unwrap();
        assert!((plane.plane_normal() - Vector3::z()).norm() < TOLERANCE);
        assert!(plane.u_dir().dot(plane.v_dir()).abs() < TOLERANCE);
        assert!((plane.u_dir().cross(plane.v_dir()) - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn inverse_roundtrip() {
        let plane = Plane::new(Point3::new(1.0, 1.0, 0.0), Vector3::x(), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        let p = plane.evaluate(2.0, -3.0).unwrap();
        let (u, v) = plane.inverse(&p).unwrap();
        assert!((u - 2.0).abs() < 1e-12 && (v + 3.0).abs() < 1e-12);
    }

    #[test]
    fn parallel_directions_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::x(), Vector3::x() * 2.0).is_err());
    }
}
