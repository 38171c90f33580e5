use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, CurveKind};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{cylindrical_coords, handedness, rotational_frame, Surface, SurfaceDomain};

/// A profile curve swept around an axis.
///
/// `v` is the profile parameter in `[t0, t1]` and `u` is the rotation angle,
/// measured from the profile's own meridian in the sense of `y_dir`.
#[derive(Debug, Clone)]
pub struct RevolutionSurface {
    axis_origin: Point3,
    axis: Vector3,
    ref_dir: Vector3,
    y_dir: Vector3,
    profile: Box<CurveKind>,
    profile_range: (f64, f64),
}

impl RevolutionSurface {
    /// Creates a surface of revolution.
    ///
    /// `ref_dir` orients the angular frame; pass `y_dir` to request a
    /// left-handed one.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is degenerate or the profile range is
    /// empty.
    pub fn new(
        axis_origin: Point3,
        axis: Vector3,
        ref_dir: Vector3,
        y_dir: Option<Vector3>,
        profile: CurveKind,
        profile_range: (f64, f64),
    ) -> Result<Self> {
        let (axis, ref_dir, y_dir) = rotational_frame(axis, ref_dir, y_dir)?;
        if (profile_range.1 - profile_range.0).abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("empty profile range".into()).into());
        }
        Ok(Self {
            axis_origin,
            axis,
            ref_dir,
            y_dir,
            profile: Box::new(profile),
            profile_range,
        })
    }

    /// Point on the axis.
    #[must_use]
    pub fn axis_origin(&self) -> &Point3 {
        &self.axis_origin
    }

    /// Unit axis direction.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    /// Direction at u = 0 for a profile in the `ref_dir` half-plane.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Rotated profile.
    #[must_use]
    pub fn profile(&self) -> &CurveKind {
        &self.profile
    }

    /// Profile parameter range.
    #[must_use]
    pub fn profile_range(&self) -> (f64, f64) {
        self.profile_range
    }

    /// Whether `(ref_dir, y_dir, axis)` is right-handed.
    #[must_use]
    pub fn is_right_handed(&self) -> bool {
        handedness(&self.axis, &self.ref_dir, &self.y_dir) > 0.0
    }

    fn sign(&self) -> f64 {
        handedness(&self.axis, &self.ref_dir, &self.y_dir)
    }

    /// Rotates `d` about the axis by `angle` in the right-handed sense.
    fn rotate(&self, d: &Vector3, angle: f64) -> Vector3 {
        let (x, b, z) = cylindrical_coords(d, &self.axis, &self.ref_dir);
        let bdir = self.axis.cross(&self.ref_dir);
        let (s, c) = angle.sin_cos();
        self.ref_dir * (x * c - b * s) + bdir * (x * s + b * c) + self.axis * z
    }

    fn meridian_angle(&self) -> Result<f64> {
        let mid = 0.5 * (self.profile_range.0 + self.profile_range.1);
        let d = self.profile.evaluate(mid)? - self.axis_origin;
        let (x, b, _) = cylindrical_coords(&d, &self.axis, &self.ref_dir);
        Ok(if x.hypot(b) < TOLERANCE { 0.0 } else { b.atan2(x) })
    }
}

impl Surface for RevolutionSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let d = self.profile.evaluate(v)? - self.axis_origin;
        Ok(self.axis_origin + self.rotate(&d, self.sign() * u))
    }

    fn partials(&self, u: f64, v: f64) -> Result<(Vector3, Vector3)> {
        let angle = self.sign() * u;
        let d = self.profile.evaluate(v)? - self.axis_origin;
        let rotated = self.rotate(&d, angle);
        let du = self.axis.cross(&rotated) * self.sign();
        let dv = self.rotate(&self.profile.derivative(v)?, angle);
        Ok((du, dv))
    }

    fn domain(&self) -> SurfaceDomain {
        let (a, b) = self.profile_range;
        SurfaceDomain::new(0.0, TAU, a.min(b), a.max(b))
    }

    fn u_period(&self) -> Option<f64> {
        Some(TAU)
    }

    fn inverse(&self, point: &Point3) -> Result<(f64, f64)> {
        let d = point - self.axis_origin;
        let (x, b, _) = cylindrical_coords(&d, &self.axis, &self.ref_dir);
        let phi = if x.hypot(b) < TOLERANCE { 0.0 } else { b.atan2(x) };
        let phi0 = self.meridian_angle()?;
        let delta = phi - phi0;
        let back = self.axis_origin + self.rotate(&d, -delta);
        let v = self.profile.parameter_of(&back, self.profile_range.0, self.profile_range.1)?;
        Ok(((self.sign() * delta).rem_euclid(TAU), v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::Line;

    fn slanted() -> RevolutionSurface {
        // A line from (1,0,0) to (2,0,1) spun about Z: a cone frustum.
        let line = Line::through(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 1.0)).unwrap();
        RevolutionSurface::new(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            None,
            CurveKind::Line(line),
            (0.0, 2.0_f64.sqrt()),
        )
        .unwrap()
    }

    #[test]
    fn quarter_turn_lands_on_y() {
        let s = slanted();
        let p = s.evaluate(std::f64::consts::FRAC_PI_2, 0.0).unwrap();
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn inverse_roundtrip() {
        let s = slanted();
        let p = s.evaluate(2.0, 0.7).unwrap();
        let (u, v) = s.inverse(&p).unwrap();
        assert!((u - 2.0).abs() < 1e-9 && (v - 0.7).abs() < 1e-9, "got ({u}, {v})");
    }

    #[test]
    fn left_handed_turns_the_other_way() {
        let line = Line::through(Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 1.0)).unwrap();
        let s = RevolutionSurface::new(
            Point3::origin(),
            Vector3::z(),
            Vector3::x(),
            Some(-Vector3::y()),
            CurveKind::Line(line),
            (0.0, 1.0),
        )
        .unwrap();
        assert!(!s.is_right_handed());
        let p = s.evaluate(std::f64::consts::FRAC_PI_2, 0.0).unwrap();
        assert!((p - Point3::new(0.0, -1.0, 0.0)).norm() < 1e-12);
        let (u, _) = s.inverse(&p).unwrap();
        assert!((u - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }
}
