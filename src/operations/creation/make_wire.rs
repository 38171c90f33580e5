use crate::error::{OperationError, Result};
use crate::geometry::curve::Line;
use crate::math::{Point3, POINT_TOLERANCE};
use crate::topology::{EdgeCurve, EdgeData, OrientedEdge, TopologyStore, VertexData, WireData, WireId};

/// Creates a polyline wire from a sequence of 3D points.
///
/// With `close` set, a final edge joins the last point back to the first.
pub struct MakeWire {
    points: Vec<Point3>,
    close: bool,
}

impl MakeWire {
    /// Creates a new `MakeWire` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, close: bool) -> Self {
        Self { points, close }
    }

    /// Executes the operation, creating the wire in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if there are too few points for the requested wire,
    /// or two consecutive points coincide.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<WireId> {
        let needed = if self.close { 3 } else { 2 };
        if self.points.len() < needed {
            return Err(OperationError::InvalidInput(format!(
                "wire needs at least {needed} points, got {}",
                self.points.len()
            ))
            .into());
        }

        let n = self.points.len();
        let segments = if self.close { n } else { n - 1 };
        for i in 0..segments {
            let (a, b) = (self.points[i], self.points[(i + 1) % n]);
            if (b - a).norm() < POINT_TOLERANCE {
                return Err(OperationError::InvalidInput(format!("wire points {i} and {} coincide", (i + 1) % n)).into());
            }
        }

        let vertices: Vec<_> = self
            .points
            .iter()
            .map(|p| store.add_vertex(VertexData::new(*p)))
            .collect();

        let mut edges = Vec::with_capacity(segments);
        for i in 0..segments {
            let j = (i + 1) % n;
            let (a, b) = (self.points[i], self.points[j]);
            let edge = store.add_edge(EdgeData {
                start: vertices[i],
                end: vertices[j],
                curve: EdgeCurve::Line(Line::through(a, b)?),
                t_start: 0.0,
                t_end: (b - a).norm(),
            });
            edges.push(OrientedEdge::new(edge, true));
        }

        Ok(store.add_wire(WireData {
            edges,
            is_closed: self.close,
        }))
    }
}
