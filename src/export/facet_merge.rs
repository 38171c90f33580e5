//! Merges coplanar triangles into polygonal facets.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::math::fuzzy::{plane_key, FuzzyMap};
use crate::math::{Point3, Vector3};

use super::closed_shell::FaceLoops;

/// Largest planar group searched for adjacency by default.
pub const DEFAULT_GROUP_LIMIT: usize = 150;

/// Tolerance on unit-normal components and plane offsets when grouping.
const PLANE_TOLERANCE: f64 = 1e-6;

/// Relative cross-product size below which a triangle is a sliver.
const SLIVER_RATIO: f64 = 1e-9;

/// Reduces a sewn triangle set to polygonal facets covering the same area.
///
/// Triangles are grouped by supporting plane. Each edge-connected component
/// of a group is grown greedily into one polygon; components that cannot be
/// grown cleanly fall back to their boundary loops (outer plus holes), and
/// components whose boundary touches itself are emitted as the original
/// triangles. Sliver triangles are emitted unchanged.
///
/// Triangles are expected to be consistently wound and to index a shared
/// point list. Output loops follow the [`FaceLoops`] winding convention.
pub struct PlanarFacetMerger<'a> {
    points: &'a [Point3],
    triangles: &'a [[usize; 3]],
    group_limit: usize,
}

impl<'a> PlanarFacetMerger<'a> {
    #[must_use]
    pub fn new(points: &'a [Point3], triangles: &'a [[usize; 3]]) -> Self {
        Self {
            points,
            triangles,
            group_limit: DEFAULT_GROUP_LIMIT,
        }
    }

    /// Planar groups larger than `limit` are emitted as raw triangles.
    #[must_use]
    pub fn with_group_limit(mut self, limit: usize) -> Self {
        self.group_limit = limit;
        self
    }

    #[must_use]
    pub fn execute(&self) -> Vec<FaceLoops> {
        let mut groups: FuzzyMap<4, (Vector3, Vec<usize>)> = FuzzyMap::new(PLANE_TOLERANCE);
        let mut slivers = Vec::new();
        for (index, tri) in self.triangles.iter().enumerate() {
            match self.unit_normal(tri) {
                Some(n) => {
                    let key = plane_key(&n, &self.points[tri[0]]);
                    groups.get_or_insert_with(key, || (n, Vec::new())).1.push(index);
                }
                None => slivers.push(index),
            }
        }

        let mut out = Vec::new();
        for (normal, members) in groups.into_values() {
            self.merge_group(&normal, &members, &mut out);
        }
        if !slivers.is_empty() {
            debug!(count = slivers.len(), "emitting sliver triangles unmerged");
        }
        out.extend(slivers.into_iter().map(|t| self.raw(t)));
        out
    }

    fn unit_normal(&self, tri: &[usize; 3]) -> Option<Vector3> {
        let [a, b, c] = tri.map(|i| self.points[i]);
        let cross = (b - a).cross(&(c - a));
        let longest = (b - a).norm().max((c - b).norm()).max((a - c).norm());
        (cross.norm() > SLIVER_RATIO * longest * longest).then(|| cross.normalize())
    }

    fn raw(&self, tri: usize) -> FaceLoops {
        FaceLoops::polygon(self.triangles[tri].to_vec())
    }

    fn merge_group(&self, normal: &Vector3, members: &[usize], out: &mut Vec<FaceLoops>) {
        if members.len() > self.group_limit {
            debug!(
                triangles = members.len(),
                limit = self.group_limit,
                "planar group over the limit, emitting triangles"
            );
            out.extend(members.iter().map(|&t| self.raw(t)));
            return;
        }
        for component in self.edge_components(members) {
            if component.len() == 1 {
                out.push(self.raw(component[0]));
                continue;
            }
            if let Some(ring) = self.grow(&component) {
                out.push(FaceLoops::polygon(ring));
            } else if let Some(loops) = self.boundary_loops(&component, normal) {
                trace!(triangles = component.len(), holes = loops.inner.len(), "merged from boundary loops");
                out.push(loops);
            } else {
                debug!(triangles = component.len(), "facet would self-touch, keeping triangles");
                out.extend(component.iter().map(|&t| self.raw(t)));
            }
        }
    }

    /// Splits a group into sets of triangles connected through shared edges.
    fn edge_components(&self, members: &[usize]) -> Vec<Vec<usize>> {
        let mut by_edge: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for &t in members {
            for (a, b) in edges(&self.triangles[t]) {
                by_edge.entry((a.min(b), a.max(b))).or_default().push(t);
            }
        }
        let mut seen = HashSet::new();
        let mut components = Vec::new();
        for &start in members {
            if !seen.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut stack = vec![start];
            while let Some(t) = stack.pop() {
                for (a, b) in edges(&self.triangles[t]) {
                    for &n in by_edge.get(&(a.min(b), a.max(b))).into_iter().flatten() {
                        if seen.insert(n) {
                            component.push(n);
                            stack.push(n);
                        }
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Greedy growth from the first triangle; `None` when growth stalls or
    /// the boundary revisits a vertex.
    fn grow(&self, component: &[usize]) -> Option<Vec<usize>> {
        let mut boundary = self.triangles[component[0]].to_vec();
        let mut pending: Vec<usize> = component[1..].to_vec();
        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|&t| !attach(&mut boundary, &self.triangles[t]));
            if pending.len() == before {
                trace!(left = pending.len(), "greedy growth stalled");
                return None;
            }
        }
        let distinct: HashSet<_> = boundary.iter().collect();
        (distinct.len() == boundary.len()).then_some(boundary)
    }

    /// Outer and hole loops of a component from its unmatched edges.
    ///
    /// Fails when an edge is repeated, a vertex has two outgoing boundary
    /// edges, a chain does not close, or there is not exactly one outer loop.
    fn boundary_loops(&self, component: &[usize], normal: &Vector3) -> Option<FaceLoops> {
        let mut directed = HashSet::new();
        for &t in component {
            for e in edges(&self.triangles[t]) {
                if !directed.insert(e) {
                    return None;
                }
            }
        }
        let mut next: HashMap<usize, usize> = HashMap::new();
        for &(a, b) in &directed {
            if !directed.contains(&(b, a)) && next.insert(a, b).is_some() {
                return None;
            }
        }

        let mut starts: Vec<usize> = next.keys().copied().collect();
        starts.sort_unstable();
        let mut used = HashSet::new();
        let mut outer = None;
        let mut holes = Vec::new();
        for start in starts {
            if used.contains(&start) {
                continue;
            }
            let mut ring = vec![start];
            used.insert(start);
            let mut current = *next.get(&start)?;
            while current != start {
                if !used.insert(current) {
                    return None;
                }
                ring.push(current);
                current = *next.get(&current)?;
            }
            if self.winding(&ring, normal) > 0.0 {
                if outer.replace(ring).is_some() {
                    return None;
                }
            } else {
                ring.reverse();
                holes.push(ring);
            }
        }
        Some(FaceLoops {
            outer: outer?,
            inner: holes,
        })
    }

    /// Twice the signed area of `ring` about `normal`.
    fn winding(&self, ring: &[usize], normal: &Vector3) -> f64 {
        let n = ring.len();
        (0..n)
            .map(|i| {
                let a = self.points[ring[i]].coords;
                let b = self.points[ring[(i + 1) % n]].coords;
                a.cross(&b).dot(normal)
            })
            .sum()
    }
}

fn edges(tri: &[usize; 3]) -> [(usize, usize); 3] {
    [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
}

/// Splices `tri` into `boundary` if it touches it along one edge or closes
/// an ear along two consecutive edges. Returns `false` to defer it.
fn attach(boundary: &mut Vec<usize>, tri: &[usize; 3]) -> bool {
    let n = boundary.len();
    let tri_edges = edges(tri);
    let shared: Vec<usize> = (0..n)
        .filter(|&k| {
            let (p, q) = (boundary[k], boundary[(k + 1) % n]);
            tri_edges.contains(&(q, p))
        })
        .collect();

    match shared.as_slice() {
        [k] => {
            let (p, q) = (boundary[*k], boundary[(k + 1) % n]);
            let Some(&r) = tri.iter().find(|&&v| v != p && v != q) else {
                return false;
            };
            if boundary.contains(&r) {
                return false;
            }
            boundary.insert(k + 1, r);
            true
        }
        [k0, k1] if n > 3 => {
            // consecutive edges p -> q -> s; drop q
            let middle = if (k0 + 1) % n == *k1 {
                k1
            } else if (k1 + 1) % n == *k0 {
                k0
            } else {
                return false;
            };
            boundary.remove(*middle);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Points of a `w x h` vertex grid in the z = 0 plane, index `y * w + x`.
    fn grid(w: usize, h: usize) -> Vec<Point3> {
        let mut pts = Vec::new();
        for y in 0..h {
            for x in 0..w {
                #[allow(clippy::cast_precision_loss)]
                pts.push(Point3::new(x as f64, y as f64, 0.0));
            }
        }
        pts
    }

    /// Two counter-clockwise triangles per listed unit cell.
    fn cells(w: usize, list: &[(usize, usize)]) -> Vec<[usize; 3]> {
        let mut tris = Vec::new();
        for &(x, y) in list {
            let v00 = y * w + x;
            let (v10, v01, v11) = (v00 + 1, v00 + w, v00 + w + 1);
            tris.push([v00, v10, v11]);
            tris.push([v00, v11, v01]);
        }
        tris
    }

    #[test]
    fn disk_merges_into_its_boundary() {
        let pts = grid(3, 3);
        let tris = cells(3, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let facets = PlanarFacetMerger::new(&pts, &tris).execute();
        assert_eq!(facets.len(), 1);
        let f = &facets[0];
        assert!(f.inner.is_empty());
        let mut got = f.outer.clone();
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn self_touching_group_keeps_triangles() {
        // 3x3 cells minus the centre and the top-right corner: the boundary
        // touches itself at (2, 2).
        let pts = grid(4, 4);
        let list = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2)];
        let tris = cells(4, &list);
        let facets = PlanarFacetMerger::new(&pts, &tris).execute();
        assert_eq!(facets.len(), tris.len());
        assert!(facets.iter().all(|f| f.outer.len() == 3 && f.inner.is_empty()));
    }

    #[test]
    fn ring_keeps_its_hole() {
        let pts = grid(4, 4);
        let list = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)];
        let tris = cells(4, &list);
        let facets = PlanarFacetMerger::new(&pts, &tris).execute();
        assert_eq!(facets.len(), 1);
        let f = &facets[0];
        assert_eq!(f.outer.len(), 12);
        assert_eq!(f.inner.len(), 1);
        let mut hole = f.inner[0].clone();
        hole.sort_unstable();
        assert_eq!(hole, vec![5, 6, 9, 10]);
    }

    #[test]
    fn group_limit_disables_merging() {
        let pts = grid(3, 3);
        let tris = cells(3, &[(0, 0), (1, 0), (0, 1), (1, 1)]);
        let facets = PlanarFacetMerger::new(&pts, &tris).with_group_limit(4).execute();
        assert_eq!(facets.len(), 8);
    }

    #[test]
    fn slivers_pass_through() {
        let pts = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let tris = vec![[0, 1, 2], [0, 1, 3]];
        let facets = PlanarFacetMerger::new(&pts, &tris).execute();
        assert_eq!(facets.len(), 2);
        assert!(facets.contains(&FaceLoops::polygon(vec![0, 1, 2])));
    }

    #[test]
    fn cube_triangles_become_six_quads() {
        let pts: Vec<Point3> = (0..8)
            .map(|i| Point3::new(f64::from(i & 1), f64::from((i >> 1) & 1), f64::from((i >> 2) & 1)))
            .collect();
        let quads = [
            [0, 2, 3, 1],
            [4, 5, 7, 6],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [1, 3, 7, 5],
        ];
        let tris: Vec<[usize; 3]> = quads
            .iter()
            .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
            .collect();
        let facets = PlanarFacetMerger::new(&pts, &tris).execute();
        assert_eq!(facets.len(), 6);
        assert!(facets.iter().all(|f| f.outer.len() == 4));
        assert!(super::super::closed_shell::validate_closed_shell(&facets));
    }
}
