use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A circular helix around an axis.
///
/// `P(t) = origin + r * cos(t) * ref_dir + r * sin(t) * (axis x ref_dir) + pitch * t / (2*pi) * axis`
#[derive(Debug, Clone)]
pub struct Helix {
    origin: Point3,
    axis: Vector3,
    ref_dir: Vector3,
    radius: f64,
    pitch: f64,
}

impl Helix {
    /// Creates a new helix.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the directions are
    /// zero-length or not perpendicular.
    pub fn new(
        origin: Point3,
        axis: Vector3,
        ref_dir: Vector3,
        radius: f64,
        pitch: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("helix radius must be positive".into()).into());
        }
        let axis = crate::math::try_normalize(&axis).ok_or(GeometryError::ZeroVector)?;
        let ref_dir = crate::math::try_normalize(&ref_dir).ok_or(GeometryError::ZeroVector)?;
        if axis.dot(&ref_dir).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "helix reference direction must be perpendicular to axis".into(),
            )
            .into());
        }
        Ok(Self {
            origin,
            axis,
            ref_dir,
            radius,
            pitch,
        })
    }

    /// Returns the helix radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Axial rise per full turn.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }
}

impl Curve for Helix {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let y = self.axis.cross(&self.ref_dir);
        Ok(self.origin
            + self.ref_dir * (self.radius * t.cos())
            + y * (self.radius * t.sin())
            + self.axis * (self.pitch * t / TAU))
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let y = self.axis.cross(&self.ref_dir);
        Ok(self.ref_dir * (-self.radius * t.sin())
            + y * (self.radius * t.cos())
            + self.axis * (self.pitch / TAU))
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    fn is_closed(&self) -> bool {
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn one_turn_rises_by_pitch() {
        let h = Helix::new(Point3::origin(), Vector3::z(), Vector3::x(), 1.0, 0.5).unwrap();
        let p = h.evaluate(TAU).unwrap();
        assert!((p - Point3::new(1.0, 0.0, 0.5)).norm() < 1e-12);
    }
}
