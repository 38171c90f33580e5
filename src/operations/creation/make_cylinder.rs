use std::f64::consts::TAU;

use crate::error::{OperationError, Result};
use crate::geometry::curve::Arc;
use crate::geometry::surface::{Cylinder, Plane};
use crate::math::{any_perpendicular, try_normalize, Point3, Vector3, TOLERANCE};
use crate::topology::{EdgeCurve, FaceSurface, OrientedEdge, SolidId, TopologyStore};

use super::shell_builder::ShellBuilder;

/// Creates a right circular cylinder from base center, radius, axis and
/// height.
///
/// The lateral face is a single periodic cylinder bounded by the two rim
/// circles and a straight seam edge used once in each direction.
pub struct MakeCylinder {
    center: Point3,
    radius: f64,
    axis: Vector3,
    height: f64,
}

impl MakeCylinder {
    /// Creates a new `MakeCylinder` operation.
    #[must_use]
    pub fn new(center: Point3, radius: f64, axis: Vector3, height: f64) -> Self {
        Self {
            center,
            radius,
            axis,
            height,
        }
    }

    /// Executes the operation, creating the cylinder in the topology store.
    ///
    /// A negative height extends the cylinder against `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius or height is near zero, or the axis
    /// direction is degenerate.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if self.radius < TOLERANCE {
            return Err(OperationError::InvalidInput("cylinder radius must be positive".into()).into());
        }
        if self.height.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput("cylinder height must be non-zero".into()).into());
        }
        let axis = try_normalize(&self.axis)
            .ok_or_else(|| OperationError::InvalidInput("cylinder axis must be non-zero".into()))?;
        let axis = if self.height < 0.0 { -axis } else { axis };
        let height = self.height.abs();
        let ref_dir = any_perpendicular(&axis);

        let bottom_center = self.center;
        let top_center = self.center + axis * height;

        let mut builder = ShellBuilder::new(store);
        let vb = builder.vertex(bottom_center + ref_dir * self.radius);
        let vt = builder.vertex(top_center + ref_dir * self.radius);

        let bottom_rim = Arc::circle(bottom_center, self.radius, axis, ref_dir)?;
        let top_rim = Arc::circle(top_center, self.radius, axis, ref_dir)?;
        let bottom = builder.closed_edge(vb, EdgeCurve::Arc(bottom_rim), 0.0, TAU);
        let top = builder.closed_edge(vt, EdgeCurve::Arc(top_rim), 0.0, TAU);
        let seam = builder.line(vb, vt)?;

        let lateral = Cylinder::new(bottom_center, self.radius, axis, ref_dir)?;
        builder.face(
            FaceSurface::Cylinder(lateral),
            true,
            vec![vec![
                OrientedEdge::new(bottom, true),
                seam,
                OrientedEdge::new(top, false),
                seam.reversed(),
            ]],
        )?;
        builder.face(
            FaceSurface::Plane(Plane::from_normal(bottom_center, -axis)?),
            true,
            vec![vec![OrientedEdge::new(bottom, false)]],
        )?;
        builder.face(
            FaceSurface::Plane(Plane::from_normal(top_center, axis)?),
            true,
            vec![vec![OrientedEdge::new(top, true)]],
        )?;
        builder.finish()
    }
}
