mod cone;
mod cylinder;
mod nurbs;
mod plane;
mod revolution;
mod ruled;

pub use cone::Cone;
pub use cylinder::Cylinder;
pub use nurbs::NurbsSurface;
pub use plane::Plane;
pub use revolution::RevolutionSurface;
pub use ruled::RuledSurface;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    fn is_bounded(&self) -> bool {
        self.u_min.is_finite() && self.u_max.is_finite() && self.v_min.is_finite() && self.v_max.is_finite()
    }
}

/// Trait for parametric surfaces in 3D space.
pub trait Surface {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Returns the partial derivatives `(dP/du, dP/dv)`.
    ///
    /// The default uses central differences.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    fn partials(&self, u: f64, v: f64) -> Result<(Vector3, Vector3)> {
        let d = self.domain();
        let step = |lo: f64, hi: f64| {
            if lo.is_finite() && hi.is_finite() {
                (hi - lo).abs().max(TOLERANCE) * 1e-6
            } else {
                1e-6
            }
        };
        let hu = step(d.u_min, d.u_max);
        let hv = step(d.v_min, d.v_max);
        let du = (self.evaluate(u + hu, v)? - self.evaluate(u - hu, v)?) / (2.0 * hu);
        let dv = (self.evaluate(u, v + hv)? - self.evaluate(u, v - hv)?) / (2.0 * hv);
        Ok((du, dv))
    }

    /// Natural (parametric) unit normal `dP/du x dP/dv`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is degenerate at `(u, v)`.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let (du, dv) = self.partials(u, v)?;
        let n = du.cross(&dv);
        let len = n.norm();
        if len < TOLERANCE {
            return Err(GeometryError::Degenerate("surface normal is degenerate".into()).into());
        }
        Ok(n / len)
    }

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    /// Returns the period of the U parameter, if it wraps.
    fn u_period(&self) -> Option<f64> {
        None
    }

    /// Computes the parameters of the surface point closest to `point`.
    ///
    /// The default runs a grid search over a bounded domain followed by
    /// Newton refinement.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is unbounded or evaluation fails.
    fn inverse(&self, point: &Point3) -> Result<(f64, f64)> {
        grid_newton_inverse(self, point)
    }
}

/// Closest-point search for surfaces without a closed-form inverse.
fn grid_newton_inverse<S: Surface + ?Sized>(surface: &S, point: &Point3) -> Result<(f64, f64)> {
    const GRID: usize = 16;
    let d = surface.domain();
    if !d.is_bounded() {
        return Err(GeometryError::Degenerate("cannot invert an unbounded surface numerically".into()).into());
    }

    let mut best = (d.u_min, d.v_min);
    let mut best_dist = f64::INFINITY;
    for i in 0..=GRID {
        for j in 0..=GRID {
            #[allow(clippy::cast_precision_loss)]
            let u = d.u_min + (d.u_max - d.u_min) * (i as f64 / GRID as f64);
            #[allow(clippy::cast_precision_loss)]
            let v = d.v_min + (d.v_max - d.v_min) * (j as f64 / GRID as f64);
            let dist = (surface.evaluate(u, v)? - point).norm_squared();
            if dist < best_dist {
                best_dist = dist;
                best = (u, v);
            }
        }
    }

    let (mut u, mut v) = best;
    for _ in 0..30 {
        let p = surface.evaluate(u, v)?;
        let (su, sv) = surface.partials(u, v)?;
        let r = p - point;
        // Gauss-Newton on |P(u,v) - point|^2.
        let a11 = su.dot(&su);
        let a12 = su.dot(&sv);
        let a22 = sv.dot(&sv);
        let b1 = -r.dot(&su);
        let b2 = -r.dot(&sv);
        let det = a11 * a22 - a12 * a12;
        if det.abs() < 1e-20 {
            break;
        }
        let du = (b1 * a22 - b2 * a12) / det;
        let dv = (a11 * b2 - a12 * b1) / det;
        let nu = (u + du).clamp(d.u_min, d.u_max);
        let nv = (v + dv).clamp(d.v_min, d.v_max);
        let moved = (nu - u).abs() + (nv - v).abs();
        u = nu;
        v = nv;
        if moved < 1e-14 {
            break;
        }
    }
    Ok((u, v))
}

/// Closed set of surface kinds a face can lie on.
#[derive(Debug, Clone)]
pub enum SurfaceKind {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface.
    Cylinder(Cylinder),
    /// A conical surface.
    Cone(Cone),
    /// A profile curve revolved about an axis.
    Revolution(RevolutionSurface),
    /// A surface ruled between two rail curves.
    Ruled(RuledSurface),
    /// A free-form (B-spline) surface.
    Nurbs(NurbsSurface),
}

impl SurfaceKind {
    fn as_surface(&self) -> &dyn Surface {
        match self {
            Self::Plane(s) => s,
            Self::Cylinder(s) => s,
            Self::Cone(s) => s,
            Self::Revolution(s) => s,
            Self::Ruled(s) => s,
            Self::Nurbs(s) => s,
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plane(_) => "plane",
            Self::Cylinder(_) => "cylinder",
            Self::Cone(_) => "cone",
            Self::Revolution(_) => "revolution",
            Self::Ruled(_) => "ruled",
            Self::Nurbs(_) => "nurbs",
        }
    }
}

impl Surface for SurfaceKind {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.as_surface().evaluate(u, v)
    }

    fn partials(&self, u: f64, v: f64) -> Result<(Vector3, Vector3)> {
        self.as_surface().partials(u, v)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        self.as_surface().normal(u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        self.as_surface().domain()
    }

    fn u_period(&self) -> Option<f64> {
        self.as_surface().u_period()
    }

    fn inverse(&self, point: &Point3) -> Result<(f64, f64)> {
        self.as_surface().inverse(point)
    }
}

/// Decomposes `d` in the right-handed basis `(x, axis x x, axis)`.
pub(crate) fn cylindrical_coords(d: &Vector3, axis: &Vector3, x: &Vector3) -> (f64, f64, f64) {
    let b = axis.cross(x);
    (d.dot(x), d.dot(&b), d.dot(axis))
}

/// Returns `+1.0` when `y_dir` completes `(x, y, axis)` as a right-handed frame.
pub(crate) fn handedness(axis: &Vector3, x: &Vector3, y: &Vector3) -> f64 {
    if axis.cross(x).dot(y) >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Validates and normalizes a rotational frame.
pub(crate) fn rotational_frame(
    axis: Vector3,
    ref_dir: Vector3,
    y_dir: Option<Vector3>,
) -> Result<(Vector3, Vector3, Vector3)> {
    let axis = crate::math::try_normalize(&axis).ok_or(GeometryError::ZeroVector)?;
    let ref_dir = crate::math::try_normalize(&ref_dir).ok_or(GeometryError::ZeroVector)?;
    if axis.dot(&ref_dir).abs() > 1e-9 {
        return Err(GeometryError::Degenerate(
            "reference direction must be perpendicular to axis".into(),
        )
        .into());
    }
    let right = axis.cross(&ref_dir);
    let y_dir = match y_dir {
        None => right,
        Some(y) => {
            let y = crate::math::try_normalize(&y).ok_or(GeometryError::ZeroVector)?;
            if (y.dot(&right).abs() - 1.0).abs() > 1e-9 {
                return Err(GeometryError::Degenerate(
                    "y direction must be perpendicular to axis and reference direction".into(),
                )
                .into());
            }
            y
        }
    };
    Ok((axis, ref_dir, y_dir))
}
