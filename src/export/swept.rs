//! Recognition of solids that are a planar profile revolved about an axis.
//!
//! Only partial revolutions are recognised: the start and end caps are the
//! two planar faces whose planes meet in the axis.

use std::collections::HashSet;
use std::f64::consts::TAU;

use nalgebra::{Rotation3, Unit};
use tracing::{debug, trace};

use crate::error::{RepresentationError, Result};
use crate::math::fuzzy::PointCache;
use crate::math::polygon_3d::signed_area_2d;
use crate::math::{parallel, Point2, Point3, Vector3, ANGLE_TOLERANCE, POINT_TOLERANCE};
use crate::tessellation::{edge_samples, TessellationParams};
use crate::topology::{EdgeCurve, EdgeId, FaceData, FaceId, FaceSurface, SolidId, TopologyStore};

use super::closed_shell::FaceLoops;
use super::extrusion::{base_plane, face_profile, BasePlane};
use super::mapper::CoordinateMapper;
use super::representation::{FacetedShell, Frame, RevolvedAreaSolid};

/// A recognised partial revolution.
#[derive(Debug, Clone)]
pub struct SweptAnalysis {
    /// Output solid; its position is mapped, its profile scaled.
    pub solid: RevolvedAreaSolid,
    /// World-space frame with the axis along local Y.
    pub frame: Frame,
    pub angle: f64,
    start_cap: FaceId,
    mapper: CoordinateMapper,
}

/// Finds a pair of caps and an axis that reproduce a solid as a revolution.
pub struct SweptAnalyzer {
    solid: SolidId,
    mapper: CoordinateMapper,
    params: TessellationParams,
}

/// Axis line of a candidate cap pair.
#[derive(Debug, Clone, Copy)]
struct Axis {
    point: Point3,
    direction: Vector3,
}

impl Axis {
    fn radial(&self, p: &Point3) -> Vector3 {
        let d = p - self.point;
        d - self.direction * d.dot(&self.direction)
    }

    fn contains(&self, p: &Point3) -> bool {
        self.radial(p).norm() < POINT_TOLERANCE
    }

    fn rotate(&self, p: &Point3, angle: f64) -> Point3 {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(self.direction), angle);
        self.point + rotation * (p - self.point)
    }
}

impl SweptAnalyzer {
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            mapper: CoordinateMapper::identity(),
            params: TessellationParams::default(),
        }
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: CoordinateMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Sampling used for profile edges that are neither lines nor arcs.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// # Errors
    ///
    /// Returns the reason the last cap pair was rejected, or
    /// [`RepresentationError::Unsupported`] when no pair of non-parallel
    /// planar faces exists.
    pub fn execute(&self, store: &TopologyStore) -> Result<SweptAnalysis> {
        if !store.solid(self.solid)?.inner_shells.is_empty() {
            return Err(RepresentationError::Unsupported("solid has voids".into()).into());
        }
        if let Some(uses) = store.open_edge_uses(self.solid)? {
            return Err(RepresentationError::OpenShell(format!("edge used by {uses} face sides")).into());
        }
        let faces = store.solid_faces(self.solid)?;
        let planes = faces
            .iter()
            .map(|&f| Ok(base_plane(store.face(f)?).map(|p| (f, p))))
            .collect::<Result<Vec<_>>>()?;
        let planes: Vec<(FaceId, BasePlane)> = planes.into_iter().flatten().collect();

        let mut last_error = None;
        for &(start, a) in &planes {
            for &(end, b) in &planes {
                if start == end || parallel(&a.normal, &b.normal) {
                    continue;
                }
                match self.analyze(store, &faces, (start, &a), (end, &b)) {
                    Ok(analysis) => {
                        debug!(angle = analysis.angle, "recognised revolution");
                        return Ok(analysis);
                    }
                    Err(e) => {
                        trace!(error = %e, "rejected cap pair");
                        last_error = Some(e);
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| RepresentationError::Unsupported("no planar cap pair".into()).into()))
    }

    fn analyze(
        &self,
        store: &TopologyStore,
        faces: &[FaceId],
        (start, a): (FaceId, &BasePlane),
        (end, b): (FaceId, &BasePlane),
    ) -> Result<SweptAnalysis> {
        let line = intersection(a, b);
        let start_face = store.face(start)?;
        let end_face = store.face(end)?;
        let start_points = face_points(store, start_face)?;
        let end_points = face_points(store, end_face)?;

        let r_start = meridian(&line, &start_points)?;
        let r_end = meridian(&line, &end_points)?;
        let axis = Axis {
            point: line.point,
            direction: r_start.cross(&(-a.normal)),
        };
        let angle = r_start
            .cross(&r_end)
            .dot(&axis.direction)
            .atan2(r_start.dot(&r_end))
            .rem_euclid(TAU);
        if angle < ANGLE_TOLERANCE {
            return Err(RepresentationError::Degenerate("caps are coplanar".into()).into());
        }
        if (b.normal - axis.direction.cross(&r_end)).norm() > ANGLE_TOLERANCE {
            return Err(RepresentationError::Unsupported("end cap faces the wrong way".into()).into());
        }

        let mut end_cache = PointCache::new();
        for p in &end_points {
            end_cache.get_or_insert_with(p, || ());
        }
        let mut start_cache = PointCache::new();
        for p in &start_points {
            start_cache.get_or_insert_with(p, || ());
        }
        if start_cache.len() != end_cache.len()
            || start_points
                .iter()
                .any(|p| end_cache.get(&axis.rotate(p, angle)).is_none())
        {
            return Err(RepresentationError::Unsupported("end cap is not the rotated start cap".into()).into());
        }

        let cap_edges: HashSet<EdgeId> = [start_face, end_face]
            .into_iter()
            .map(|f| face_edges(store, f))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();
        for &f in faces {
            if f == start || f == end {
                continue;
            }
            let face = store.face(f)?;
            if !is_rotational(&face.surface, &axis) {
                return Err(RepresentationError::Unsupported(format!(
                    "{} face is not rotational about the axis",
                    face.surface.name()
                ))
                .into());
            }
            for edge_id in face_edges(store, face)? {
                if cap_edges.contains(&edge_id) {
                    continue;
                }
                let edge = store.edge(edge_id)?;
                let on_axis = axis.contains(&store.point(edge.start)?) && axis.contains(&store.point(edge.end)?);
                let rim = matches!(&edge.curve, EdgeCurve::Arc(arc)
                    if parallel(arc.normal(), &axis.direction) && axis.contains(arc.center()));
                if !((on_axis && matches!(edge.curve, EdgeCurve::Line(_))) || rim) {
                    return Err(RepresentationError::Unsupported("edge is not swept by a cap corner".into()).into());
                }
                for v in [edge.start, edge.end] {
                    let p = store.point(v)?;
                    if start_cache.get(&p).is_none() && end_cache.get(&p).is_none() {
                        return Err(RepresentationError::Unsupported("vertex lies off both caps".into()).into());
                    }
                }
            }
        }

        let frame = Frame {
            origin: axis.point + axis.direction * (a.origin - axis.point).dot(&axis.direction),
            x_axis: r_start,
            z_axis: a.normal,
        };
        let scale = self.mapper.scale();
        let profile = face_profile(store, start_face, &self.params, |p| {
            Point2::from(frame.to_local_2d(p).coords * scale)
        })?;
        let solid = RevolvedAreaSolid {
            position: Frame {
                origin: self.mapper.point(&frame.origin),
                ..frame
            },
            profile,
            angle,
        };
        Ok(SweptAnalysis {
            solid,
            frame,
            angle,
            start_cap: start,
            mapper: self.mapper,
        })
    }
}

impl SweptAnalysis {
    /// Faceted closed shell of the revolution with `params` angular steps.
    ///
    /// The cap loops are sampled once and rotated, so the result has far
    /// fewer facets than a face-by-face tessellation.
    ///
    /// # Errors
    ///
    /// Returns an error if a cap edge cannot be sampled, or
    /// [`RepresentationError::Degenerate`] when the cap has no area.
    pub fn faceted(&self, store: &TopologyStore, params: &TessellationParams) -> Result<FacetedShell> {
        let axis = Axis {
            point: self.frame.origin,
            direction: self.frame.y_axis(),
        };
        let cap = store.face(self.start_cap)?;
        let mut rings = Vec::with_capacity(1 + cap.inner_wires.len());
        for (index, wire) in cap.wires().into_iter().enumerate() {
            let mut ring = Vec::new();
            for oe in &store.wire(wire)?.edges {
                let samples = edge_samples(store.edge(oe.edge)?, oe.forward, params)?;
                let keep = samples.len().saturating_sub(1);
                ring.extend(samples.into_iter().take(keep));
            }
            let flat: Vec<Point2> = ring.iter().map(|p| self.frame.to_local_2d(p)).collect();
            let area = signed_area_2d(&flat);
            if area.abs() < POINT_TOLERANCE {
                return Err(RepresentationError::Degenerate("cap loop has no area".into()).into());
            }
            // Outer loop counter-clockwise in the meridian plane, holes clockwise.
            if (index == 0) != (area > 0.0) {
                ring.reverse();
            }
            rings.push(ring);
        }

        let reach = rings
            .iter()
            .flatten()
            .map(|p| axis.radial(p).norm())
            .fold(0.0, f64::max);
        let steps = params.angular_segments(reach, self.angle).max(1);

        let mut cache = PointCache::new();
        let mut points = Vec::new();
        let mut grid = Vec::with_capacity(steps + 1);
        for k in 0..=steps {
            #[allow(clippy::cast_precision_loss)]
            let theta = self.angle * k as f64 / steps as f64;
            let ids: Vec<Vec<usize>> = rings
                .iter()
                .map(|ring| {
                    ring.iter()
                        .map(|p| {
                            let q = axis.rotate(p, theta);
                            cache.get_or_insert_with(&q, || {
                                points.push(self.mapper.point(&q));
                                points.len() - 1
                            })
                        })
                        .collect()
                })
                .collect();
            grid.push(ids);
        }

        let mut faces = Vec::new();
        let first = &grid[0];
        let last = &grid[steps];
        faces.push(FaceLoops {
            outer: first[0].clone(),
            inner: first[1..].iter().map(|h| h.iter().rev().copied().collect()).collect(),
        });
        faces.push(FaceLoops {
            outer: last[0].iter().rev().copied().collect(),
            inner: last[1..].to_vec(),
        });
        for l in 0..rings.len() {
            let n = rings[l].len();
            for i in 0..n {
                let j = (i + 1) % n;
                for k in 0..steps {
                    let quad = collapse(vec![grid[k][l][i], grid[k + 1][l][i], grid[k + 1][l][j], grid[k][l][j]]);
                    if quad.len() >= 3 {
                        faces.push(FaceLoops::polygon(quad));
                    }
                }
            }
        }
        debug!(points = points.len(), faces = faces.len(), steps, "faceted revolution");
        Ok(FacetedShell { points, faces })
    }
}

/// Removes repeated neighbours, including across the wrap-around.
fn collapse(mut ring: Vec<usize>) -> Vec<usize> {
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Line shared by two non-parallel planes.
fn intersection(a: &BasePlane, b: &BasePlane) -> Axis {
    let u = a.normal.cross(&b.normal);
    let (da, db) = (a.normal.dot(&a.origin.coords), b.normal.dot(&b.origin.coords));
    let point = Point3::from((b.normal * da - a.normal * db).cross(&u) / u.norm_squared());
    Axis {
        point,
        direction: u.normalize(),
    }
}

/// Unit direction from the axis to a cap lying in a half-plane bounded by it.
fn meridian(line: &Axis, points: &[Point3]) -> Result<Vector3> {
    let far = points
        .iter()
        .map(|p| line.radial(p))
        .max_by(|x, y| x.norm().total_cmp(&y.norm()))
        .filter(|r| r.norm() > POINT_TOLERANCE)
        .ok_or_else(|| RepresentationError::Degenerate("cap lies on the axis".into()))?;
    let dir = far.normalize();
    if points.iter().any(|p| line.radial(p).dot(&dir) < -POINT_TOLERANCE) {
        return Err(RepresentationError::Unsupported("cap crosses the axis".into()).into());
    }
    Ok(dir)
}

fn is_rotational(surface: &FaceSurface, axis: &Axis) -> bool {
    let d = &axis.direction;
    match surface {
        FaceSurface::Plane(p) => parallel(&p.plane_normal(), d),
        FaceSurface::Cylinder(c) => parallel(c.axis(), d) && axis.contains(c.center()),
        FaceSurface::Cone(c) => parallel(c.axis(), d) && axis.contains(c.apex()),
        FaceSurface::Revolution(r) => parallel(r.axis(), d) && axis.contains(r.axis_origin()),
        FaceSurface::Ruled(_) | FaceSurface::Nurbs(_) => false,
    }
}

fn face_points(store: &TopologyStore, face: &FaceData) -> Result<Vec<Point3>> {
    let mut points = Vec::new();
    for wire in face.wires() {
        for v in store.wire_vertices(wire)? {
            points.push(store.point(v)?);
        }
    }
    Ok(points)
}

fn face_edges(store: &TopologyStore, face: &FaceData) -> Result<Vec<EdgeId>> {
    let mut edges = Vec::new();
    for wire in face.wires() {
        edges.extend(store.wire(wire)?.edges.iter().map(|oe| oe.edge));
    }
    Ok(edges)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::export::closed_shell::validate_closed_shell;
    use crate::export::representation::PolySegment;
    use crate::operations::creation::{MakeBox, MakeCylinder, MakeFace, MakeWire};
    use crate::operations::shaping::Revolve;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn cone_quarter(store: &mut TopologyStore) -> SolidId {
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 0.0, 2.0)], true)
            .execute(store)
            .unwrap();
        let face = MakeFace::new(wire, vec![]).execute(store).unwrap();
        Revolve::new(face, Point3::origin(), Vector3::z(), FRAC_PI_2)
            .execute(store)
            .unwrap()
    }

    #[test]
    fn cone_quarter_is_a_revolution_about_z() {
        let mut store = TopologyStore::new();
        let solid = cone_quarter(&mut store);
        let a = SweptAnalyzer::new(solid).execute(&store).unwrap();
        assert_relative_eq!(a.angle, FRAC_PI_2, epsilon = 1e-9);
        assert!(parallel(&a.frame.y_axis(), &Vector3::z()));
        assert!(a.frame.origin.x.abs() < 1e-9 && a.frame.origin.y.abs() < 1e-9);
        let profile = &a.solid.profile;
        assert_eq!(profile.outer.segments.len(), 3);
        assert!(profile.outer.segments.iter().all(|s| matches!(s, PolySegment::Line(_))));
        assert_relative_eq!(profile.outer.signed_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn revolution_maps_position_and_scales_profile() {
        let mut store = TopologyStore::new();
        let solid = cone_quarter(&mut store);
        let mapper = CoordinateMapper::new(10.0, Vector3::new(0.0, 0.0, -1.0));
        let a = SweptAnalyzer::new(solid).with_mapper(mapper).execute(&store).unwrap();
        assert_relative_eq!(a.solid.position.origin.z, 10.0, epsilon = 1e-9);
        assert_relative_eq!(a.solid.profile.outer.signed_area(), 200.0, epsilon = 1e-6);
        assert_relative_eq!(a.frame.origin.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn faceted_revolution_is_closed() {
        let mut store = TopologyStore::new();
        let solid = cone_quarter(&mut store);
        let a = SweptAnalyzer::new(solid).execute(&store).unwrap();
        let params = TessellationParams::default().with_tolerance(0.05).with_segments(4, 24);
        let shell = a.faceted(&store, &params).unwrap();
        assert!(validate_closed_shell(&shell.faces));
        // Two caps plus one strip per off-axis profile edge.
        let steps = params.angular_segments(2.0, FRAC_PI_2);
        assert_eq!(shell.faces.len(), 2 + 2 * steps);
        // Apex and origin are shared by every ring.
        assert_eq!(shell.points.len(), 2 + steps + 1);
    }

    #[test]
    fn box_is_not_a_revolution() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute(&mut store).unwrap();
        assert!(SweptAnalyzer::new(solid).execute(&store).is_err());
    }

    #[test]
    fn full_cylinder_has_no_caps() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 1.0, Vector3::z(), 2.0)
            .execute(&mut store)
            .unwrap();
        assert!(SweptAnalyzer::new(solid).execute(&store).is_err());
    }

    #[test]
    fn revolution_without_its_cone_is_rejected() {
        let mut store = TopologyStore::new();
        let solid = cone_quarter(&mut store);
        let shell = store.solid(solid).unwrap().outer_shell;
        let cone = store
            .shell(shell)
            .unwrap()
            .faces
            .iter()
            .copied()
            .find(|&f| matches!(store.face(f).unwrap().surface, FaceSurface::Cone(_)))
            .unwrap();
        store.shell_mut(shell).unwrap().faces.retain(|&f| f != cone);
        let err = SweptAnalyzer::new(solid).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ShapeRepError::Representation(RepresentationError::OpenShell(_))
        ));
    }
}
