use crate::error::{OperationError, Result, TopologyError};
use crate::geometry::surface::Plane;
use crate::math::polygon_3d::newell_normal;
use crate::math::Point3;
use crate::tessellation::{edge_samples, TessellationParams};
use crate::topology::{FaceData, FaceId, FaceSurface, TopologyStore, WireId};

/// Creates a planar face bounded by an outer wire and optional hole wires.
///
/// The plane normal follows the winding of the outer wire, so the face
/// points towards the side from which the outer loop runs counter-clockwise.
pub struct MakeFace {
    outer_wire: WireId,
    inner_wires: Vec<WireId>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(outer_wire: WireId, inner_wires: Vec<WireId>) -> Self {
        Self {
            outer_wire,
            inner_wires,
        }
    }

    /// Executes the operation, creating the face in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if a wire is open or missing, or the outer wire does
    /// not span a plane.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId> {
        for &wire in std::iter::once(&self.outer_wire).chain(&self.inner_wires) {
            if !store.wire(wire)?.is_closed {
                return Err(TopologyError::WireNotClosed.into());
            }
        }

        let points = loop_points(store, self.outer_wire)?;
        let normal = newell_normal(&points)
            .ok_or_else(|| OperationError::InvalidInput("outer wire does not span a plane".into()))?;
        let plane = Plane::from_normal(points[0], normal)?;

        let mut face = FaceData::new(FaceSurface::Plane(plane), self.outer_wire, true);
        face.inner_wires.clone_from(&self.inner_wires);
        Ok(store.add_face(face))
    }
}

/// Points along a closed wire in traversal order, without the repeated end.
fn loop_points(store: &TopologyStore, wire: WireId) -> Result<Vec<Point3>> {
    let params = TessellationParams::default();
    let mut points = Vec::new();
    for oe in &store.wire(wire)?.edges {
        let samples = edge_samples(store.edge(oe.edge)?, oe.forward, &params)?;
        points.extend(samples.into_iter().skip(1));
    }
    Ok(points)
}
