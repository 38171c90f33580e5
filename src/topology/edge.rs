use crate::error::Result;
use crate::geometry::curve::Curve;
use crate::math::Point3;

pub use crate::geometry::curve::CurveKind as EdgeCurve;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the topology store.
    pub struct VertexId;
    /// Unique identifier for an edge in the topology store.
    pub struct EdgeId;
}

/// A model corner. Faces meeting at a corner share one vertex, which is
/// what lets exporters emit each output point once.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub point: Point3,
}

impl VertexData {
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point }
    }
}

/// Data associated with a topological edge.
///
/// An edge connects two vertices and carries a geometric curve
/// that defines the shape of the edge between them. The curve runs from
/// `start` at `t_start` to `end` at `t_end`.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
    /// The geometric curve defining this edge's shape.
    pub curve: EdgeCurve,
    /// Parameter on the curve corresponding to the start vertex.
    pub t_start: f64,
    /// Parameter on the curve corresponding to the end vertex.
    pub t_end: f64,
}

impl EdgeData {
    /// Point at the middle of the parameter range.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated.
    pub fn midpoint(&self) -> Result<Point3> {
        self.curve.evaluate(0.5 * (self.t_start + self.t_end))
    }

    /// Whether the edge starts and ends at the same vertex.
    #[must_use]
    pub fn is_closed_loop(&self) -> bool {
        self.start == self.end
    }
}
