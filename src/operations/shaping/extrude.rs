use crate::error::{OperationError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::creation::shell_builder::ShellBuilder;
use crate::topology::{EdgeCurve, FaceId, SolidId, TopologyStore, WireId};

/// Extrudes a polygonal face along a direction vector to create a prism.
///
/// Holes in the face become through-holes of the prism.
pub struct Extrude {
    face: FaceId,
    direction: Vector3,
}

impl Extrude {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(face: FaceId, direction: Vector3) -> Self {
        Self { face, direction }
    }

    /// Executes the extrusion, creating the solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the direction is zero-length
    /// or parallel to the face, or a boundary edge is not straight.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        if self.direction.norm() < TOLERANCE {
            return Err(OperationError::InvalidInput("extrude direction must be non-zero".into()).into());
        }
        let face = store.face(self.face)?;
        let outer = polygon_points(store, face.outer_wire)?;
        let holes = face
            .inner_wires
            .iter()
            .map(|&w| polygon_points(store, w))
            .collect::<Result<Vec<_>>>()?;
        build_prism(store, &outer, &holes, &self.direction)
    }
}

/// Corner points of a wire made only of straight edges.
pub(super) fn polygon_points(store: &TopologyStore, wire: WireId) -> Result<Vec<Point3>> {
    for oe in &store.wire(wire)?.edges {
        if !matches!(store.edge(oe.edge)?.curve, EdgeCurve::Line(_)) {
            return Err(OperationError::InvalidInput("only polygonal faces can be extruded".into()).into());
        }
    }
    store
        .wire_vertices(wire)?
        .into_iter()
        .map(|v| Ok(store.point(v)?))
        .collect()
}

/// Sweeps a planar polygon with holes along `direction` into a closed prism.
///
/// Loop windings are normalized first: the outer loop runs counter-clockwise
/// about `direction`, holes clockwise.
pub(crate) fn build_prism(
    store: &mut TopologyStore,
    outer: &[Point3],
    holes: &[Vec<Point3>],
    direction: &Vector3,
) -> Result<SolidId> {
    let normal = newell_normal(outer)
        .ok_or_else(|| OperationError::InvalidInput("profile polygon is degenerate".into()))?;
    if normal.dot(direction).abs() < TOLERANCE * direction.norm().max(1.0) {
        return Err(OperationError::InvalidInput("extrude direction lies in the profile plane".into()).into());
    }

    let oriented = |ring: &[Point3], along: bool| -> Result<Vec<Point3>> {
        let n = newell_normal(ring)
            .ok_or_else(|| OperationError::InvalidInput("hole polygon is degenerate".into()))?;
        let mut ring = ring.to_vec();
        if (n.dot(direction) > 0.0) != along {
            ring.reverse();
        }
        Ok(ring)
    };
    let mut rings = vec![oriented(outer, true)?];
    for hole in holes {
        rings.push(oriented(hole, false)?);
    }

    let mut builder = ShellBuilder::new(store);
    let bottom: Vec<Vec<_>> = rings
        .iter()
        .map(|ring| ring.iter().map(|p| builder.vertex(*p)).collect())
        .collect();
    let top: Vec<Vec<_>> = rings
        .iter()
        .map(|ring| ring.iter().map(|p| builder.vertex(p + direction)).collect())
        .collect();

    let reversed: Vec<Vec<_>> = bottom.iter().map(|r| r.iter().rev().copied().collect()).collect();
    builder.polygon(&reversed[0], &reversed[1..])?;
    builder.polygon(&top[0], &top[1..])?;

    for (b, t) in bottom.iter().zip(&top) {
        let n = b.len();
        for i in 0..n {
            let j = (i + 1) % n;
            builder.polygon(&[b[i], b[j], t[j], t[i]], &[])?;
        }
    }
    builder.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeFace, MakeWire};
    use crate::tessellation::{TessellateSolid, TessellationParams};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square(store: &mut TopologyStore, size: f64, cw: bool) -> WireId {
        let mut pts = vec![p(0.0, 0.0, 0.0), p(size, 0.0, 0.0), p(size, size, 0.0), p(0.0, size, 0.0)];
        if cw {
            pts.reverse();
        }
        MakeWire::new(pts, true).execute(store).unwrap()
    }

    #[test]
    fn square_extrudes_to_six_faces() {
        let mut store = TopologyStore::new();
        let wire = square(&mut store, 2.0, false);
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 3.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.solid_faces(solid).unwrap().len(), 6);
        let mesh = TessellateSolid::new(solid, TessellationParams::default())
            .execute(&store)
            .unwrap();
        assert!((mesh.area() - (2.0 * 4.0 + 4.0 * 6.0)).abs() < 1e-9);
    }

    #[test]
    fn downward_direction_still_closes() {
        let mut store = TopologyStore::new();
        let wire = square(&mut store, 1.0, true);
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, -1.0))
            .execute(&mut store)
            .unwrap();
        let counts = store.edge_use_counts(solid).unwrap();
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn hole_becomes_through_hole() {
        let mut store = TopologyStore::new();
        let outer = square(&mut store, 4.0, false);
        let hole = MakeWire::new(
            vec![p(1.0, 1.0, 0.0), p(3.0, 1.0, 0.0), p(3.0, 3.0, 0.0), p(1.0, 3.0, 0.0)],
            true,
        )
        .execute(&mut store)
        .unwrap();
        let face = MakeFace::new(outer, vec![hole]).execute(&mut store).unwrap();
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 1.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.solid_faces(solid).unwrap().len(), 10);
        let counts = store.edge_use_counts(solid).unwrap();
        assert!(counts.values().all(|&c| c == 2));
        let mesh = TessellateSolid::new(solid, TessellationParams::default())
            .execute(&store)
            .unwrap();
        let expected = 2.0 * 12.0 + 16.0 + 8.0;
        assert!((mesh.area() - expected).abs() < 1e-9);
    }

    #[test]
    fn parallel_direction_fails() {
        let mut store = TopologyStore::new();
        let wire = square(&mut store, 1.0, false);
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        assert!(Extrude::new(face, Vector3::x()).execute(&mut store).is_err());
    }
}
