use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::shaping::build_prism;
use crate::topology::{SolidId, TopologyStore};

/// Creates an axis-aligned box solid from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, creating the box in the topology store.
    ///
    /// The corners may be given in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the box is flat along any axis.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let lo = self.min_corner.inf(&self.max_corner);
        let hi = self.min_corner.sup(&self.max_corner);
        let size = hi - lo;
        if size.min() < TOLERANCE {
            return Err(OperationError::InvalidInput(format!(
                "box dimensions must be positive, got {} x {} x {}",
                size.x, size.y, size.z
            ))
            .into());
        }
        let base = [
            lo,
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
        ];
        build_prism(store, &base, &[], &Vector3::new(0.0, 0.0, size.z))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::surface::Surface;
    use crate::topology::FaceSurface;

    #[test]
    fn box_has_six_planar_faces() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        let faces = store.solid_faces(solid).unwrap();
        assert_eq!(faces.len(), 6);
        assert!(faces
            .iter()
            .all(|&f| matches!(store.face(f).unwrap().surface, FaceSurface::Plane(_))));
    }

    #[test]
    fn face_normals_point_away_from_center() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::new(2.0, 2.0, 2.0), Point3::new(-2.0, -2.0, -2.0))
            .execute(&mut store)
            .unwrap();
        for f in store.solid_faces(solid).unwrap() {
            let face = store.face(f).unwrap();
            let FaceSurface::Plane(plane) = &face.surface else {
                panic!("expected plane");
            };
            let n = face.surface.normal(0.0, 0.0).unwrap();
            assert!(n.dot(&plane.origin().coords) > 0.0);
        }
    }

    #[test]
    fn eight_vertices_and_twelve_edges_are_shared() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let counts = store.edge_use_counts(solid).unwrap();
        assert_eq!(counts.len(), 12);
        assert_eq!(store.vertex_count(), 8);
    }

    #[test]
    fn flat_box_fails() {
        let mut store = TopologyStore::new();
        assert!(MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0))
            .execute(&mut store)
            .is_err());
    }
}
