//! Exact B-rep output with classified surfaces and bounded edge curves.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::{RepresentationError, Result};
use crate::geometry::Curve;
use crate::math::fuzzy::PointCache;
use crate::math::POINT_TOLERANCE;
use crate::topology::{EdgeCurve, EdgeId, FaceData, OrientedEdge, SolidId, TopologyStore, VertexId, WireId};

use super::classify::SurfaceClassifier;
use super::mapper::CoordinateMapper;
use super::representation::{AdvancedBrep, AdvancedFace, EdgeCurveRecord, FaceBound, OrientedEdgeRecord};

/// Builds an [`AdvancedBrep`] from a solid, or fails without output.
pub struct AdvancedBRepBuilder {
    solid: SolidId,
    mapper: CoordinateMapper,
}

impl AdvancedBRepBuilder {
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            mapper: CoordinateMapper::identity(),
        }
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: CoordinateMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// # Errors
    ///
    /// Returns [`RepresentationError::Unsupported`] for helix edges,
    /// [`RepresentationError::OpenShell`] when an edge is not shared by
    /// exactly two face sides, [`RepresentationError::LoopCountMismatch`]
    /// when a face's loops cannot be sorted, and any classification error.
    pub fn execute(&self, store: &TopologyStore) -> Result<AdvancedBrep> {
        let counts = store.edge_use_counts(self.solid)?;
        for (&edge, &uses) in &counts {
            let data = store.edge(edge)?;
            if let EdgeCurve::Helix(_) = data.curve {
                return Err(RepresentationError::Unsupported("helix edge in advanced B-rep".into()).into());
            }
            if uses != 2 {
                return Err(RepresentationError::OpenShell(format!("edge used by {uses} face sides")).into());
            }
        }

        let mut brep = AdvancedBrep::default();
        let mut points: PointCache<usize> = PointCache::new();
        let mut edges: HashMap<EdgeId, usize> = HashMap::new();

        for face_id in store.solid_faces(self.solid)? {
            let face = store.face(face_id)?;
            let mut bounds = Vec::new();
            for (wire, outer) in sort_loops(store, face)? {
                let mut records = Vec::new();
                for &oe in &store.wire(wire)?.edges {
                    let edge = self.edge_record(store, oe.edge, &mut brep, &mut points, &mut edges)?;
                    records.push(OrientedEdgeRecord {
                        edge,
                        orientation: orientation(store, oe)?,
                    });
                }
                bounds.push(FaceBound { edges: records, outer });
            }
            let surface = SurfaceClassifier::new(face_id).with_mapper(self.mapper).execute(store)?;
            trace!(kind = surface.surface.name(), bounds = bounds.len(), "advanced face");
            brep.faces.push(AdvancedFace { bounds, surface });
        }

        debug!(
            faces = brep.faces.len(),
            edges = brep.edges.len(),
            points = brep.points.len(),
            "built advanced B-rep"
        );
        Ok(brep)
    }

    /// Index of the edge curve for `edge`, created on first use.
    fn edge_record(
        &self,
        store: &TopologyStore,
        edge: EdgeId,
        brep: &mut AdvancedBrep,
        points: &mut PointCache<usize>,
        edges: &mut HashMap<EdgeId, usize>,
    ) -> Result<usize> {
        if let Some(&index) = edges.get(&edge) {
            return Ok(index);
        }
        let data = store.edge(edge)?;
        let (first, last) = if curve_runs_forward(store, edge)? {
            (data.start, data.end)
        } else {
            (data.end, data.start)
        };
        let start = self.point_index(store, first, brep, points)?;
        let end = self.point_index(store, last, brep, points)?;
        let curve = self.mapper.trimmed_curve(&data.curve, data.t_start, data.t_end)?;
        let index = brep.edges.len();
        brep.edges.push(EdgeCurveRecord { start, end, curve });
        edges.insert(edge, index);
        Ok(index)
    }

    fn point_index(
        &self,
        store: &TopologyStore,
        vertex: VertexId,
        brep: &mut AdvancedBrep,
        points: &mut PointCache<usize>,
    ) -> Result<usize> {
        let p = store.point(vertex)?;
        let next = brep.points.len();
        let index = points.get_or_insert_with(&p, || next);
        if index == next {
            brep.points.push(self.mapper.point(&p));
        }
        Ok(index)
    }
}

/// Loops of a face, outer first, each tagged with whether it is outer.
///
/// Empty or repeated loops are dropped, which the count check reports.
fn sort_loops(store: &TopologyStore, face: &FaceData) -> Result<Vec<(WireId, bool)>> {
    let expected = 1 + face.inner_wires.len();
    let mut seen = HashSet::new();
    let mut sorted = Vec::with_capacity(expected);
    for wire in face.wires() {
        if store.wire(wire)?.edges.is_empty() || !seen.insert(wire) {
            continue;
        }
        sorted.push((wire, wire == face.outer_wire));
    }
    let outers = sorted.iter().filter(|(_, outer)| *outer).count();
    if sorted.len() != expected || outers != 1 {
        return Err(RepresentationError::LoopCountMismatch {
            expected,
            found: sorted.len(),
        }
        .into());
    }
    Ok(sorted)
}

/// Whether the edge curve, walked from `t_start`, leaves the edge's start
/// vertex. Closed edges count as forward.
fn curve_runs_forward(store: &TopologyStore, edge: EdgeId) -> Result<bool> {
    let data = store.edge(edge)?;
    if data.is_closed_loop() {
        return Ok(true);
    }
    let first = data.curve.evaluate(data.t_start)?;
    if (first - store.point(data.start)?).norm() < POINT_TOLERANCE {
        Ok(true)
    } else if (first - store.point(data.end)?).norm() < POINT_TOLERANCE {
        Ok(false)
    } else {
        Err(RepresentationError::Degenerate("edge curve does not meet its vertices".into()).into())
    }
}

/// Whether the face walks the edge in the direction of its exported curve.
///
/// The face-relative start vertex is compared with the vertex the curve
/// leaves at `t_start`, so an edge whose curve runs against its vertex
/// order is flipped here.
fn orientation(store: &TopologyStore, oe: OrientedEdge) -> Result<bool> {
    let edge = store.edge(oe.edge)?;
    if edge.is_closed_loop() {
        return Ok(oe.forward);
    }
    let curve_start = if curve_runs_forward(store, oe.edge)? {
        edge.start
    } else {
        edge.end
    };
    Ok(store.oriented_start(oe)? == curve_start)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ShapeRepError;
    use crate::export::classify::ClassifiedSurface;
    use crate::geometry::curve::{Helix, Line};
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeBox, MakeCylinder};

    fn unit_cube(store: &mut TopologyStore) -> SolidId {
        MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(store)
            .unwrap()
    }

    #[test]
    fn cube_has_six_planar_faces() {
        let mut store = TopologyStore::new();
        let solid = unit_cube(&mut store);
        let brep = AdvancedBRepBuilder::new(solid).execute(&store).unwrap();
        assert_eq!(brep.faces.len(), 6);
        assert_eq!(brep.edges.len(), 12);
        assert_eq!(brep.points.len(), 8);
        assert!(brep
            .faces
            .iter()
            .all(|f| matches!(f.surface.surface, ClassifiedSurface::Planar { .. }) && f.bounds.len() == 1));
    }

    #[test]
    fn each_edge_is_walked_once_each_way() {
        let mut store = TopologyStore::new();
        let solid = unit_cube(&mut store);
        let brep = AdvancedBRepBuilder::new(solid).execute(&store).unwrap();
        let mut uses: HashMap<(usize, bool), usize> = HashMap::new();
        for bound in brep.faces.iter().flat_map(|f| &f.bounds) {
            for r in &bound.edges {
                *uses.entry((r.edge, r.orientation)).or_default() += 1;
            }
        }
        for edge in 0..brep.edges.len() {
            assert_eq!(uses.get(&(edge, true)), Some(&1));
            assert_eq!(uses.get(&(edge, false)), Some(&1));
        }
    }

    #[test]
    fn cylinder_keeps_its_seam() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 1.0, Vector3::z(), 2.0)
            .execute(&mut store)
            .unwrap();
        let brep = AdvancedBRepBuilder::new(solid).execute(&store).unwrap();
        assert_eq!(brep.faces.len(), 3);
        assert_eq!(brep.edges.len(), 3);
        assert_eq!(brep.points.len(), 2);
    }

    #[test]
    fn helix_edge_is_rejected() {
        let mut store = TopologyStore::new();
        let solid = unit_cube(&mut store);
        let edge = *store.edge_use_counts(solid).unwrap().keys().next().unwrap();
        let helix = Helix::new(Point3::origin(), Vector3::z(), Vector3::x(), 1.0, 0.5).unwrap();
        store.edge_mut(edge).unwrap().curve = EdgeCurve::Helix(helix);
        let err = AdvancedBRepBuilder::new(solid).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            ShapeRepError::Representation(RepresentationError::Unsupported(_))
        ));
    }

    #[test]
    fn open_shell_is_rejected() {
        let mut store = TopologyStore::new();
        let solid = unit_cube(&mut store);
        let shell = store.solid(solid).unwrap().outer_shell;
        store.shell_mut(shell).unwrap().faces.pop();
        let err = AdvancedBRepBuilder::new(solid).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            ShapeRepError::Representation(RepresentationError::OpenShell(_))
        ));
    }

    #[test]
    fn reversed_edge_curve_flips_orientation() {
        let mut store = TopologyStore::new();
        let solid = unit_cube(&mut store);
        let edge = *store.edge_use_counts(solid).unwrap().keys().next().unwrap();
        let (a, b) = {
            let data = store.edge(edge).unwrap();
            (store.point(data.start).unwrap(), store.point(data.end).unwrap())
        };
        let data = store.edge_mut(edge).unwrap();
        data.curve = EdgeCurve::Line(Line::through(b, a).unwrap());
        data.t_start = 0.0;
        data.t_end = (b - a).norm();

        let brep = AdvancedBRepBuilder::new(solid).execute(&store).unwrap();
        let index = brep
            .edges
            .iter()
            .position(|r| (brep.points[r.start] - b).norm() < 1e-9 && (brep.points[r.end] - a).norm() < 1e-9)
            .unwrap();

        let mut walked = Vec::new();
        for face in store.solid_faces(solid).unwrap() {
            let wire = store.face(face).unwrap().outer_wire;
            for &oe in &store.wire(wire).unwrap().edges {
                if oe.edge == edge {
                    walked.push(oe.forward);
                }
            }
        }
        walked.sort_unstable();
        assert_eq!(walked, vec![false, true]);

        let mut exported: Vec<bool> = brep
            .faces
            .iter()
            .flat_map(|f| &f.bounds)
            .flat_map(|bnd| &bnd.edges)
            .filter(|r| r.edge == index)
            .map(|r| r.orientation)
            .collect();
        exported.sort_unstable();
        assert_eq!(exported, vec![false, true]);
        assert!(orientation(&store, OrientedEdge::new(edge, true)).is_ok_and(|o| !o));
        assert!(orientation(&store, OrientedEdge::new(edge, false)).unwrap());
    }
}
