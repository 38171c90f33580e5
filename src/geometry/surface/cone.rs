use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{rotational_frame, Surface, SurfaceDomain};

/// A conical surface in 3D space.
///
/// `P(u, v) = apex + v * (cos(alpha) * axis + sin(alpha) * (cos(u) * ref_dir + sin(u) * y_dir))`
/// where `alpha` is the half-angle and `v >= 0` is the distance along the
/// generator from the apex.
#[derive(Debug, Clone)]
pub struct Cone {
    apex: Point3,
    axis: Vector3,
    half_angle: f64,
    ref_dir: Vector3,
    y_dir: Vector3,
}

impl Cone {
    /// Creates a new cone with a right-handed frame.
    ///
    /// # Arguments
    ///
    /// * `apex` - The apex (tip) of the cone
    /// * `axis` - Axis direction from apex outward (will be normalized)
    /// * `half_angle` - Half-angle in radians (must be in `(0, pi/2)`)
    /// * `ref_dir` - Reference direction for u=0 (must be perpendicular to axis)
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is out of range, axis is zero-length,
    /// or the reference direction is not perpendicular to the axis.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64, ref_dir: Vector3) -> Result<Self> {
        Self::build(apex, axis, half_angle, ref_dir, None)
    }

    /// Creates a cone with an explicit `y_dir`, which may be left-handed.
    ///
    /// # Errors
    ///
    /// Same as [`Cone::new`], and `y_dir` must be `+-(axis x ref_dir)`.
    pub fn with_frame(
        apex: Point3,
        axis: Vector3,
        half_angle: f64,
        ref_dir: Vector3,
        y_dir: Vector3,
    ) -> Result<Self> {
        Self::build(apex, axis, half_angle, ref_dir, Some(y_dir))
    }

    /// Cone through a base circle of `radius` centred at `base_center`.
    ///
    /// The apex lies on the side opposite to `axis`, so the surface widens
    /// along `axis` when `half_angle` is positive.
    ///
    /// # Errors
    ///
    /// Same as [`Cone::new`].
    pub fn from_base(
        base_center: Point3,
        radius: f64,
        axis: Vector3,
        half_angle: f64,
        ref_dir: Vector3,
        y_dir: Option<Vector3>,
    ) -> Result<Self> {
        let unit = crate::math::try_normalize(&axis).ok_or(GeometryError::ZeroVector)?;
        let apex = base_center - unit * (radius / half_angle.tan());
        Self::build(apex, unit, half_angle, ref_dir, y_dir)
    }

    fn build(
        apex: Point3,
        axis: Vector3,
        half_angle: f64,
        ref_dir: Vector3,
        y_dir: Option<Vector3>,
    ) -> Result<Self> {
        if half_angle <= TOLERANCE || half_angle >= FRAC_PI_2 - TOLERANCE {
            return Err(GeometryError::Degenerate(
                "cone half-angle must be in (0, pi/2)".into(),
            )
            .into());
        }
        let (axis, ref_dir, y_dir) = rotational_frame(axis, ref_dir, y_dir)?;
        Ok(Self {
            apex,
            axis,
            half_angle,
            ref_dir,
            y_dir,
        })
    }

    /// Returns the apex point.
    #[must_use]
    pub fn apex(&self) -> &Point3 {
        &self.apex
    }

    /// Returns the axis direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Returns the half-angle in radians.
    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
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

    fn radial(&self, u: f64) -> Vector3 {
        self.ref_dir * u.cos() + self.y_dir * u.sin()
    }
}

impl Surface for Cone {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let dir = self.axis * self.half_angle.cos() + self.radial(u) * self.half_angle.sin();
        Ok(self.apex + dir * v)
    }

    fn partials(&self, u: f64, v: f64) -> Result<(Vector3, Vector3)> {
        let sa = self.half_angle.sin();
        let du = (self.y_dir * u.cos() - self.ref_dir * u.sin()) * (v * sa);
        let dv = self.axis * self.half_angle.cos() + self.radial(u) * sa;
        Ok((du, dv))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        if v.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("cone normal is degenerate at apex".into()).into());
        }
        let n = self.radial(u) * self.half_angle.cos() - self.axis * self.half_angle.sin();
        let n = if self.is_right_handed() { n } else { -n };
        // Past the apex the generator reverses.
        Ok(if v < 0.0 { -n } else { n })
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, 0.0, f64::INFINITY)
    }

    fn u_period(&self) -> Option<f64> {
        Some(TAU)
    }

    /// `u` is in `(-pi, pi]`, `v` is the distance from the apex.
    fn inverse(&self, point: &Point3) -> Result<(f64, f64)> {
        let dp = point - self.apex;
        let v = dp.norm();
        let u = dp.dot(&self.y_dir).atan2(dp.dot(&self.ref_dir));
        Ok((u, v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn z_cone_45() -> Cone {
        Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_4, Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_along_generator() {
        let c = z_cone_45();
        let p = c.evaluate(0.0, 1.0).unwrap();
        let s = FRAC_PI_4.sin();
        assert!((p - Point3::new(s, 0.0, FRAC_PI_4.cos())).norm() < 1e-9);
    }

    #[test]
    fn normal_degenerate_at_apex() {
        assert!(z_cone_45().normal(0.0, 0.0).is_err());
    }

    #[test]
    fn normal_matches_partials_cross() {
        for c in [
            z_cone_45(),
            Cone::with_frame(Point3::origin(), Vector3::z(), 0.3, Vector3::x(), -Vector3::y()).unwrap(),
        ] {
            let (du, dv) = c.partials(1.1, 2.0).unwrap();
            let n = c.normal(1.1, 2.0).unwrap();
            assert!((du.cross(&dv).normalize() - n).norm() < 1e-12);
        }
    }

    #[test]
    fn from_base_places_circle() {
        let c = Cone::from_base(Point3::new(0.0, 0.0, 1.0), 2.0, Vector3::z(), 0.4, Vector3::x(), None).unwrap();
        let (u, v) = c.inverse(&Point3::new(2.0, 0.0, 1.0)).unwrap();
        let p = c.evaluate(u, v).unwrap();
        assert!((p - Point3::new(2.0, 0.0, 1.0)).norm() < 1e-9);
    }

    #[test]
    fn invalid_half_angle_90() {
        let r = Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_2, Vector3::x());
        assert!(r.is_err());
    }

    #[test]
    fn inverse_roundtrip() {
        let c = z_cone_45();
        for &(u, v) in &[(0.0, 1.0), (FRAC_PI_2, 2.0), (1.0, 3.0), (TAU * 0.75, 0.5)] {
            let p = c.evaluate(u, v).unwrap();
            let (u2, v2) = c.inverse(&p).unwrap();
            let p2 = c.evaluate(u2, v2).unwrap();
            assert!((p - p2).norm() < 1e-9, "roundtrip failed for u={u}, v={v}");
        }
    }
}
