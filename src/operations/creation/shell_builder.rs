use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::geometry::curve::{Arc, Line};
use crate::geometry::surface::{Plane, Surface};
use crate::math::fuzzy::PointCache;
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3};
use crate::topology::{
    EdgeCurve, EdgeData, EdgeId, FaceData, FaceId, FaceSurface, OrientedEdge, ShellData, SolidId,
    TopologyStore, VertexData, VertexId, WireData,
};

use super::MakeSolid;

/// Kind tag separating edges that join the same pair of vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeTag {
    Line,
    Arc,
}

/// Incrementally assembles a closed shell whose faces share vertices and
/// edges.
///
/// Vertices are merged through a [`PointCache`]; an edge requested a second
/// time between the same vertices is reused with the opposite orientation.
pub(crate) struct ShellBuilder<'a> {
    store: &'a mut TopologyStore,
    points: PointCache<VertexId>,
    edges: HashMap<(VertexId, VertexId, EdgeTag), EdgeId>,
    faces: Vec<FaceId>,
}

impl<'a> ShellBuilder<'a> {
    pub(crate) fn new(store: &'a mut TopologyStore) -> Self {
        Self {
            store,
            points: PointCache::new(),
            edges: HashMap::new(),
            faces: Vec::new(),
        }
    }

    pub(crate) fn vertex(&mut self, point: Point3) -> VertexId {
        let store = &mut *self.store;
        self.points
            .get_or_insert_with(&point, || store.add_vertex(VertexData::new(point)))
    }

    pub(crate) fn point(&self, v: VertexId) -> Result<Point3> {
        Ok(self.store.point(v)?)
    }

    fn shared_edge(
        &mut self,
        a: VertexId,
        b: VertexId,
        tag: EdgeTag,
        make: impl FnOnce() -> Result<(EdgeCurve, f64, f64)>,
    ) -> Result<OrientedEdge> {
        let key = if a <= b { (a, b, tag) } else { (b, a, tag) };
        if let Some(&edge) = self.edges.get(&key) {
            let forward = self.store.edge(edge)?.start == a;
            return Ok(OrientedEdge::new(edge, forward));
        }
        let (curve, t_start, t_end) = make()?;
        let edge = self.store.add_edge(EdgeData {
            start: a,
            end: b,
            curve,
            t_start,
            t_end,
        });
        self.edges.insert(key, edge);
        Ok(OrientedEdge::new(edge, true))
    }

    /// Straight edge from `a` to `b`.
    pub(crate) fn line(&mut self, a: VertexId, b: VertexId) -> Result<OrientedEdge> {
        let pa = self.point(a)?;
        let pb = self.point(b)?;
        self.shared_edge(a, b, EdgeTag::Line, || {
            let line = Line::through(pa, pb)?;
            Ok((EdgeCurve::Line(line), 0.0, (pb - pa).norm()))
        })
    }

    /// Circular edge from `a` to `b` running over `[t0, t1]` of `arc`.
    pub(crate) fn arc(&mut self, a: VertexId, b: VertexId, arc: Arc, t0: f64, t1: f64) -> Result<OrientedEdge> {
        self.shared_edge(a, b, EdgeTag::Arc, || Ok((EdgeCurve::Arc(arc), t0, t1)))
    }

    /// Edge that starts and ends at the same vertex; never shared by key.
    pub(crate) fn closed_edge(&mut self, v: VertexId, curve: EdgeCurve, t0: f64, t1: f64) -> EdgeId {
        self.store.add_edge(EdgeData {
            start: v,
            end: v,
            curve,
            t_start: t0,
            t_end: t1,
        })
    }

    /// Face bounded by oriented edge loops (outer first).
    pub(crate) fn face(
        &mut self,
        surface: FaceSurface,
        same_sense: bool,
        loops: Vec<Vec<OrientedEdge>>,
    ) -> Result<FaceId> {
        let mut wires = loops.into_iter().map(|edges| self.store.add_wire(WireData::closed(edges)));
        let outer = wires
            .next()
            .ok_or_else(|| OperationError::InvalidInput("face needs an outer loop".into()))?;
        let mut data = FaceData::new(surface, outer, same_sense);
        data.inner_wires = wires.collect();
        let id = self.store.add_face(data);
        self.faces.push(id);
        Ok(id)
    }

    /// Planar face through a polygon of vertices (outer) with optional holes.
    ///
    /// The outer loop's winding defines the outward normal.
    pub(crate) fn polygon(&mut self, outer: &[VertexId], holes: &[Vec<VertexId>]) -> Result<FaceId> {
        let pts = outer.iter().map(|&v| self.point(v)).collect::<Result<Vec<_>>>()?;
        let normal = newell_normal(&pts)
            .ok_or_else(|| OperationError::Failed("degenerate polygon: cannot compute normal".into()))?;
        let plane = Plane::from_normal(pts[0], normal)?;
        let mut loops = Vec::with_capacity(1 + holes.len());
        for ring in std::iter::once(outer).chain(holes.iter().map(Vec::as_slice)) {
            let n = ring.len();
            let edges = (0..n)
                .map(|i| self.line(ring[i], ring[(i + 1) % n]))
                .collect::<Result<Vec<_>>>()?;
            loops.push(edges);
        }
        self.face(FaceSurface::Plane(plane), true, loops)
    }

    /// Wraps the collected faces into a closed shell and a solid.
    pub(crate) fn finish(self) -> Result<SolidId> {
        let shell = self.store.add_shell(ShellData::closed(self.faces));
        MakeSolid::new(shell, vec![]).execute(self.store)
    }
}

/// Whether the outward direction at `point` agrees with the natural normal.
pub(crate) fn agrees_with_surface(surface: &FaceSurface, point: &Point3, outward: &Vector3) -> Result<bool> {
    let (u, v) = surface.inverse(point)?;
    Ok(surface.normal(u, v)?.dot(outward) > 0.0)
}
