use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::geometry::surface::Surface;
use crate::math::polygon_3d::{newell_normal, point_in_polygon_2d};
use crate::math::{Point2, Point3, Vector3};
use crate::topology::{FaceId, FaceSurface, TopologyStore, WireId};

use super::{edge_samples, TessellationParams, TriangleMesh};

/// Largest interior grid resolution per parameter direction.
const MAX_GRID: usize = 64;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Tessellates a face into a triangle mesh.
///
/// Boundary loops are mapped to the surface's parameter space (with the
/// periodic direction unwrapped), triangulated there with a constrained
/// Delaunay triangulation, and lifted back. Boundary vertices keep their
/// exact edge sample positions, so neighbouring faces share them.
pub struct TessellateFace {
    face: FaceId,
    params: TessellationParams,
}

impl TessellateFace {
    /// Creates a new `TessellateFace` operation.
    #[must_use]
    pub fn new(face: FaceId, params: TessellationParams) -> Self {
        Self { face, params }
    }

    /// Executes the tessellation, returning a triangle mesh wound so that
    /// triangle normals point out of the solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the face cannot be mapped to parameter space,
    /// for example a periodic face whose loops have no seam.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let face = store.face(self.face)?;
        let surface = &face.surface;

        let loops_3d = face
            .wires()
            .map(|w| wire_points(store, w, &self.params))
            .collect::<Result<Vec<_>>>()?;
        if loops_3d.first().is_none_or(|l| l.len() < 3) {
            return Err(TessellationError::Failed("face boundary has fewer than 3 points".into()).into());
        }

        let mut loops_uv = Vec::with_capacity(loops_3d.len());
        for pts in &loops_3d {
            loops_uv.push(loop_to_uv(surface, pts)?);
        }
        align_periodic_loops(surface, &mut loops_uv);

        let mut cdt = Cdt::new();
        let mut exact: HashMap<usize, Point3> = HashMap::new();
        for (pts3, pts2) in loops_3d.iter().zip(&loops_uv) {
            let handles = insert_constraint_loop(&mut cdt, pts2)?;
            for (h, p) in handles.iter().zip(pts3) {
                exact.entry(h.index()).or_insert(*p);
            }
        }

        if !matches!(surface, FaceSurface::Plane(_)) {
            insert_interior_samples(&mut cdt, surface, &loops_uv, &self.params)?;
        }

        let interior = classify_interior_faces(&cdt);
        let fallback_normal = newell_normal(&loops_3d[0]).unwrap_or_else(Vector3::z);
        let sign = if face.same_sense { 1.0 } else { -1.0 };

        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();
        for face_handle in cdt.inner_faces() {
            if !interior.contains(&face_handle.fix().index()) {
                continue;
            }
            let mut tri = [0u32; 3];
            for (slot, vh) in tri.iter_mut().zip(face_handle.vertices()) {
                let idx = vh.fix().index();
                *slot = if let Some(&existing) = vertex_map.get(&idx) {
                    existing
                } else {
                    let pos = vh.position();
                    let point = match exact.get(&idx) {
                        Some(p) => *p,
                        None => surface.evaluate(pos.x, pos.y)?,
                    };
                    let normal = surface
                        .normal(pos.x, pos.y)
                        .map_or(fallback_normal, |n| n * sign);
                    #[allow(clippy::cast_possible_truncation)]
                    let new_idx = mesh.vertices.len() as u32;
                    mesh.vertices.push(point);
                    mesh.normals.push(normal);
                    mesh.uvs.push(Point2::new(pos.x, pos.y));
                    vertex_map.insert(idx, new_idx);
                    new_idx
                };
            }
            // CDT faces are counter-clockwise in (u, v), i.e. along du x dv.
            if face.same_sense {
                mesh.indices.push(tri);
            } else {
                mesh.indices.push([tri[0], tri[2], tri[1]]);
            }
        }

        if mesh.indices.is_empty() {
            return Err(TessellationError::Failed("face produced no triangles".into()).into());
        }
        Ok(mesh)
    }
}

/// Collects boundary points of a wire in traversal order (no closing duplicate).
fn wire_points(store: &TopologyStore, wire_id: WireId, params: &TessellationParams) -> Result<Vec<Point3>> {
    let wire = store.wire(wire_id)?;
    let mut points = Vec::new();
    for oe in &wire.edges {
        let edge = store.edge(oe.edge)?;
        let samples = edge_samples(edge, oe.forward, params)?;
        points.extend_from_slice(&samples[..samples.len() - 1]);
    }
    Ok(points)
}

/// Maps a 3D loop into parameter space, unwrapping the periodic direction.
fn loop_to_uv(surface: &FaceSurface, points: &[Point3]) -> Result<Vec<Point2>> {
    let mut uv = points
        .iter()
        .map(|p| surface.inverse(p).map(|(u, v)| Point2::new(u, v)))
        .collect::<Result<Vec<_>>>()?;

    let Some(period) = surface.u_period() else {
        return Ok(uv);
    };

    // At a pole (cone apex, point on a revolution axis) u carries no information.
    let singular: Vec<bool> = uv.iter().map(|q| surface.normal(q.x, q.y).is_err()).collect();
    let regular: Vec<usize> = (0..uv.len()).filter(|&i| !singular[i]).collect();
    let Some(&first) = regular.first() else {
        return Err(TessellationError::Failed("loop lies entirely on a pole".into()).into());
    };

    let mut prev = uv[first].x;
    for &i in &regular[1..] {
        let u = prev + wrap(uv[i].x - prev, period);
        uv[i].x = u;
        prev = u;
    }
    let closing = prev + wrap(uv[first].x - prev, period);
    if (closing - uv[first].x).abs() > 0.5 * period {
        return Err(TessellationError::Failed("periodic face loop has no seam".into()).into());
    }

    let n = uv.len();
    for i in (0..n).filter(|&i| singular[i]) {
        let before = (1..n).map(|k| (i + n - k) % n).find(|&j| !singular[j]);
        let after = (1..n).map(|k| (i + k) % n).find(|&j| !singular[j]);
        if let (Some(a), Some(b)) = (before, after) {
            uv[i].x = 0.5 * (uv[a].x + uv[b].x);
        }
    }
    Ok(uv)
}

fn wrap(delta: f64, period: f64) -> f64 {
    let half = 0.5 * period;
    (delta + half).rem_euclid(period) - half
}

/// Shifts inner loops by whole periods so they sit inside the outer loop's u range.
fn align_periodic_loops(surface: &FaceSurface, loops: &mut [Vec<Point2>]) {
    let Some(period) = surface.u_period() else {
        return;
    };
    let Some((outer, inner)) = loops.split_first_mut() else {
        return;
    };
    let u_min = outer.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    for hole in inner {
        let Some(first) = hole.first().map(|p| p.x) else {
            continue;
        };
        let shift = ((first - u_min) / period).floor() * period;
        for p in hole.iter_mut() {
            p.x -= shift;
        }
    }
}

/// Inserts a closed polygon as constraint edges into the CDT.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<Vec<FixedVertexHandle>> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(
                TessellationError::Failed("boundary loop intersects itself in parameter space".into())
                    .into(),
            );
        }
        cdt.add_constraint(from, to);
    }

    Ok(handles)
}

/// Adds a grid of interior samples so curved faces follow the surface.
///
/// The grid density in each direction doubles until the midpoint of every
/// isoline chord is within the tolerance.
#[allow(clippy::cast_precision_loss)]
fn insert_interior_samples(
    cdt: &mut Cdt,
    surface: &FaceSurface,
    loops: &[Vec<Point2>],
    params: &TessellationParams,
) -> Result<()> {
    let outer = &loops[0];
    let (mut u0, mut u1, mut v0, mut v1) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for p in outer {
        u0 = u0.min(p.x);
        u1 = u1.max(p.x);
        v0 = v0.min(p.y);
        v1 = v1.max(p.y);
    }
    if !(u1 - u0 > 0.0 && v1 - v0 > 0.0) {
        return Ok(());
    }

    let vm = 0.5 * (v0 + v1);
    let um = 0.5 * (u0 + u1);
    let n_u = isoline_segments(|t| surface.evaluate(t, vm), u0, u1, params)?;
    let n_v = isoline_segments(|t| surface.evaluate(um, t), v0, v1, params)?;

    let eps = 1e-9 * ((u1 - u0) + (v1 - v0));
    for i in 1..n_u {
        let u = u0 + (u1 - u0) * (i as f64 / n_u as f64);
        for j in 1..n_v {
            let v = v0 + (v1 - v0) * (j as f64 / n_v as f64);
            let q = Point2::new(u, v);
            if !point_in_polygon_2d(&q, outer) || loops[1..].iter().any(|h| point_in_polygon_2d(&q, h)) {
                continue;
            }
            if loops.iter().flatten().any(|b| (b - q).norm() < eps) {
                continue;
            }
            cdt.insert(SpadePoint2::new(u, v))
                .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        }
    }
    Ok(())
}

fn isoline_segments(
    eval: impl Fn(f64) -> Result<Point3>,
    lo: f64,
    hi: f64,
    params: &TessellationParams,
) -> Result<usize> {
    let mut n = 1;
    while n < MAX_GRID {
        let mut worst: f64 = 0.0;
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let a = lo + (hi - lo) * (i as f64 / n as f64);
            #[allow(clippy::cast_precision_loss)]
            let b = lo + (hi - lo) * ((i + 1) as f64 / n as f64);
            let pa = eval(a)?;
            let pb = eval(b)?;
            let pm = eval(0.5 * (a + b))?;
            worst = worst.max((pm - Point3::from((pa.coords + pb.coords) * 0.5)).norm());
        }
        if worst <= params.tolerance {
            break;
        }
        n *= 2;
    }
    Ok(n)
}

/// Classifies which inner faces of the CDT are inside the polygon using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer_fix {
            continue;
        }
        if let Some(inner) = edge.rev().face().as_inner() {
            let idx = inner.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, depth);
            if depth % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((inner.fix(), depth));
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let n_idx = neighbor.fix().index();
            if depth_map.contains_key(&n_idx) {
                continue;
            }
            let new_depth = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(n_idx, new_depth);
            if new_depth % 2 == 1 {
                interior.insert(n_idx);
            }
            queue.push_back((neighbor.fix(), new_depth));
        }
    }

    interior
}
