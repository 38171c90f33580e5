use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain, NurbsCurve};

/// A circular arc in 3D space.
///
/// Defined by a center, radius, normal axis, and a reference direction
/// for the zero-angle. The parametric form sweeps from `start_angle`
/// to `end_angle` (in radians) counter-clockwise around the normal.
#[derive(Debug, Clone)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Creates a new arc.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the arc circle
    /// * `radius` - Radius (must be positive)
    /// * `normal` - Normal vector defining the arc plane
    /// * `ref_dir` - Reference direction for angle = 0 (must be perpendicular to normal)
    /// * `start_angle` - Start angle in radians
    /// * `end_angle` - End angle in radians
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is zero-length,
    /// or the reference direction is not perpendicular to the normal.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(GeometryError::Degenerate("arc radius must be positive".into()).into());
        }

        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / normal_len;

        let ref_len = ref_dir.norm();
        if ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let ref_dir = ref_dir / ref_len;

        if normal.dot(&ref_dir).abs() > 1e-9 {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to normal".into(),
            )
            .into());
        }

        Ok(Self {
            center,
            radius,
            normal,
            ref_dir,
            start_angle,
            end_angle,
        })
    }

    /// Creates a full circle (`[0, 2*pi]`).
    ///
    /// # Errors
    ///
    /// Same conditions as [`Arc::new`].
    pub fn circle(center: Point3, radius: f64, normal: Vector3, ref_dir: Vector3) -> Result<Self> {
        Self::new(center, radius, normal, ref_dir, 0.0, TAU)
    }

    /// Returns the center of the arc.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the radius of the arc.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns the normal vector of the arc plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Returns the zero-angle reference direction.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    /// Computes the second axis direction (perpendicular to both normal and `ref_dir`).
    #[must_use]
    pub fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    /// Converts the angular range `[t0, t1]` into an exact rational quadratic B-spline.
    ///
    /// The sweep is split into segments of at most 90 degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty.
    pub fn to_nurbs(&self, t0: f64, t1: f64) -> Result<NurbsCurve> {
        let sweep = t1 - t0;
        if sweep.abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("arc sweep is empty".into()).into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let segments = ((sweep.abs() / FRAC_PI_2) - 1e-9).ceil().max(1.0) as usize;
        #[allow(clippy::cast_precision_loss)]
        let delta = sweep / segments as f64;
        let w_mid = (delta / 2.0).cos();

        let mut points = Vec::with_capacity(2 * segments + 1);
        let mut weights = Vec::with_capacity(2 * segments + 1);
        let mut knots = vec![0.0; 3];

        points.push(self.evaluate(t0)?);
        weights.push(1.0);
        for i in 0..segments {
            #[allow(clippy::cast_precision_loss)]
            let a0 = t0 + delta * i as f64;
            let a1 = a0 + delta;
            let p2 = self.evaluate(a1)?;
            // Control point at the intersection of the end tangents.
            let mid_dir = self.evaluate(a0 + delta / 2.0)? - self.center;
            let p1 = self.center + mid_dir / w_mid;
            points.push(p1);
            weights.push(w_mid);
            points.push(p2);
            weights.push(1.0);
            if i + 1 < segments {
                #[allow(clippy::cast_precision_loss)]
                let k = (i + 1) as f64 / segments as f64;
                knots.push(k);
                knots.push(k);
            }
        }
        knots.extend_from_slice(&[1.0, 1.0, 1.0]);

        NurbsCurve::new(2, points, Some(weights), knots)
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let binormal = self.binormal();
        let x = self.radius * t.cos();
        let y = self.radius * t.sin();
        Ok(self.center + self.ref_dir * x + binormal * y)
    }

    fn derivative(&self, t: f64) -> Result<Vector3> {
        let binormal = self.binormal();
        let dx = -self.radius * t.sin();
        let dy = self.radius * t.cos();
        Ok(self.ref_dir * dx + binormal * dy)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }

    fn is_closed(&self) -> bool {
        (self.end_angle - self.start_angle - TAU).abs() < TOLERANCE
    }

    fn parameter_of(&self, point: &Point3, t0: f64, t1: f64) -> Result<f64> {
        let d = point - self.center;
        let angle = d.dot(&self.binormal()).atan2(d.dot(&self.ref_dir));
        let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        // Shift by whole turns into the requested range when possible.
        let mut t = angle;
        while t < lo - 1e-9 {
            t += TAU;
        }
        while t > hi + 1e-9 && t - TAU >= lo - 1e-9 {
            t -= TAU;
        }
        Ok(t.clamp(lo, hi))
    }
}
