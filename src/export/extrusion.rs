//! Recognition of solids that are a planar profile swept along a line.

use tracing::{debug, trace};

use crate::error::{RepresentationError, Result};
use crate::geometry::Curve;
use crate::math::{parallel, Point2, Point3, Vector3, ANGLE_TOLERANCE, POINT_TOLERANCE};
use crate::operations::query::FaceArea;
use crate::tessellation::{edge_samples, TessellationParams};
use crate::topology::{EdgeCurve, FaceData, FaceId, FaceSurface, SolidId, TopologyStore, WireId};

use super::classify::extrusion_offset;
use super::mapper::CoordinateMapper;
use super::representation::{
    ExtrudedAreaSolid, ExtrusionMetrics, Footprint, Frame, IndexedPolyCurve, PolySegment, ProfileDef,
};

/// Result of a successful extrusion analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionAnalysis {
    pub solid: ExtrudedAreaSolid,
    pub metrics: ExtrusionMetrics,
    /// Present when the sweep runs along world Z.
    pub footprint: Option<Footprint>,
}

/// Finds a base face and direction that reproduce a solid as an extrusion.
///
/// Every planar face is tried as the base unless a hint frame restricts the
/// search to faces whose outward normal opposes the hint's Z axis.
pub struct ExtrusionAnalyzer {
    solid: SolidId,
    hint: Option<Vector3>,
    mapper: CoordinateMapper,
}

/// Outward plane of a planar face.
#[derive(Debug, Clone, Copy)]
pub(super) struct BasePlane {
    pub(super) origin: Point3,
    pub(super) u_dir: Vector3,
    pub(super) normal: Vector3,
}

impl ExtrusionAnalyzer {
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            hint: None,
            mapper: CoordinateMapper::identity(),
        }
    }

    /// Only extrusions along `frame.z_axis` are considered.
    #[must_use]
    pub fn with_hint(mut self, frame: &Frame) -> Self {
        self.hint = Some(frame.z_axis.normalize());
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: CoordinateMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// # Errors
    ///
    /// Returns the reason the last candidate base face was rejected, or
    /// [`RepresentationError::Unsupported`] when there was no candidate.
    pub fn execute(&self, store: &TopologyStore) -> Result<ExtrusionAnalysis> {
        if !store.solid(self.solid)?.inner_shells.is_empty() {
            return Err(RepresentationError::Unsupported("solid has voids".into()).into());
        }
        if let Some(uses) = store.open_edge_uses(self.solid)? {
            return Err(RepresentationError::OpenShell(format!("edge used by {uses} face sides")).into());
        }
        let faces = store.solid_faces(self.solid)?;
        let mut last_error = None;
        for &base in &faces {
            let Some(plane) = base_plane(store.face(base)?) else {
                continue;
            };
            if self.hint.is_some_and(|h| plane.normal.dot(&h) > -(1.0 - ANGLE_TOLERANCE)) {
                continue;
            }
            match self.analyze(store, &faces, base, &plane) {
                Ok(analysis) => {
                    debug!(depth = analysis.solid.depth, "recognised extrusion");
                    return Ok(analysis);
                }
                Err(e) => {
                    trace!(error = %e, "base face rejected");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| RepresentationError::Unsupported("no planar base face".into()).into()))
    }

    fn analyze(
        &self,
        store: &TopologyStore,
        faces: &[FaceId],
        base: FaceId,
        plane: &BasePlane,
    ) -> Result<ExtrusionAnalysis> {
        let inward = -plane.normal;
        let direction = match self.hint {
            Some(h) => h,
            None => lateral_direction(store, faces, base, plane)?.unwrap_or(inward),
        };
        let cos = direction.dot(&inward);
        if cos < ANGLE_TOLERANCE {
            return Err(RepresentationError::Degenerate("sweep runs along the base plane".into()).into());
        }
        let along = |p: &Point3| (p - plane.origin).dot(&inward) / cos;

        let mut depth: f64 = 0.0;
        let mut heights = Vec::new();
        for &f in faces {
            for wire in store.face(f)?.wires() {
                for oe in &store.wire(wire)?.edges {
                    let edge = store.edge(oe.edge)?;
                    for v in [edge.start, edge.end] {
                        let h = along(&store.point(v)?);
                        depth = depth.max(h);
                        heights.push(h);
                    }
                }
            }
        }
        if depth < POINT_TOLERANCE {
            return Err(RepresentationError::Degenerate("solid is flat along the sweep".into()).into());
        }
        let at_cap = |h: f64| h.abs() < POINT_TOLERANCE || (h - depth).abs() < POINT_TOLERANCE;
        if !heights.iter().all(|&h| at_cap(h)) {
            return Err(RepresentationError::Unsupported("vertex between the caps".into()).into());
        }

        let params = TessellationParams::default();
        let mut top = None;
        let mut lateral = 0usize;
        for &f in faces {
            if f == base {
                continue;
            }
            let face = store.face(f)?;
            if let Some(p) = base_plane(face) {
                let opposite = p.normal.dot(&plane.normal) < -(1.0 - ANGLE_TOLERANCE);
                if opposite && (along(&p.origin) - depth).abs() < POINT_TOLERANCE {
                    if top.replace(f).is_some() {
                        return Err(RepresentationError::Unsupported("more than one top face".into()).into());
                    }
                    continue;
                }
            }
            if !contains_direction(&face.surface, &direction)? {
                return Err(RepresentationError::Unsupported(format!(
                    "{} face does not contain the sweep direction",
                    face.surface.name()
                ))
                .into());
            }
            lateral += 1;
            for wire in face.wires() {
                for oe in &store.wire(wire)?.edges {
                    let edge = store.edge(oe.edge)?;
                    let hs: Vec<f64> = edge_samples(edge, true, &params)?.iter().map(along).collect();
                    let on_cap = hs.iter().all(|h| h.abs() < POINT_TOLERANCE)
                        || hs.iter().all(|h| (h - depth).abs() < POINT_TOLERANCE);
                    let ruling = matches!(&edge.curve, EdgeCurve::Line(l) if parallel(l.direction(), &direction));
                    if !on_cap && !ruling {
                        return Err(RepresentationError::Unsupported("lateral edge leaves the sweep".into()).into());
                    }
                }
            }
        }
        if top.is_none() || lateral == 0 {
            return Err(RepresentationError::Unsupported("missing top or side faces".into()).into());
        }

        let base_face = store.face(base)?;
        let frame = Frame {
            origin: plane.origin,
            x_axis: plane.u_dir,
            z_axis: inward,
        };
        let scale = self.mapper.scale();
        let profile = face_profile(store, base_face, &params, |p| {
            Point2::from(frame.to_local_2d(p).coords * scale)
        })?;

        let profile_area = FaceArea::new(base).execute(store)? * scale * scale;
        let mapped_depth = self.mapper.length(depth);
        let metrics = ExtrusionMetrics {
            profile_area,
            direction,
            depth: mapped_depth,
            volume: profile_area * mapped_depth * cos,
        };

        let footprint = if parallel(&direction, &Vector3::z()) {
            let outer = loop_curve(store, base_face.outer_wire, &params, |p| {
                let m = self.mapper.point(p);
                Point2::new(m.x, m.y)
            })?;
            let outer = if outer.signed_area() < 0.0 { outer.reversed() } else { outer };
            let low = plane.origin.z.min(plane.origin.z + direction.z * depth);
            Some(Footprint {
                curve: outer,
                elevation: self.mapper.point(&Point3::new(0.0, 0.0, low)).z,
            })
        } else {
            None
        };

        Ok(ExtrusionAnalysis {
            solid: ExtrudedAreaSolid {
                position: Frame {
                    origin: self.mapper.point(&plane.origin),
                    ..frame
                },
                profile,
                direction,
                depth: mapped_depth,
            },
            metrics,
            footprint,
        })
    }
}

pub(super) fn base_plane(face: &FaceData) -> Option<BasePlane> {
    let FaceSurface::Plane(plane) = &face.surface else {
        return None;
    };
    let sign = if face.same_sense { 1.0 } else { -1.0 };
    Some(BasePlane {
        origin: *plane.origin(),
        u_dir: *plane.u_dir(),
        normal: plane.plane_normal() * sign,
    })
}

/// Direction of a straight edge leaving the base plane, pointing away from it.
fn lateral_direction(
    store: &TopologyStore,
    faces: &[FaceId],
    base: FaceId,
    plane: &BasePlane,
) -> Result<Option<Vector3>> {
    let inward = -plane.normal;
    for &f in faces {
        if f == base {
            continue;
        }
        for wire in store.face(f)?.wires() {
            for oe in &store.wire(wire)?.edges {
                let edge = store.edge(oe.edge)?;
                if !matches!(edge.curve, EdgeCurve::Line(_)) {
                    continue;
                }
                let a = store.point(edge.start)?;
                let b = store.point(edge.end)?;
                let (ha, hb) = ((a - plane.origin).dot(&inward), (b - plane.origin).dot(&inward));
                if ha.abs() < POINT_TOLERANCE && hb > POINT_TOLERANCE {
                    return Ok(Some((b - a).normalize()));
                }
                if hb.abs() < POINT_TOLERANCE && ha > POINT_TOLERANCE {
                    return Ok(Some((a - b).normalize()));
                }
            }
        }
    }
    Ok(None)
}

fn contains_direction(surface: &FaceSurface, direction: &Vector3) -> Result<bool> {
    Ok(match surface {
        FaceSurface::Plane(p) => p.plane_normal().dot(direction).abs() < ANGLE_TOLERANCE,
        FaceSurface::Cylinder(c) => parallel(c.axis(), direction),
        FaceSurface::Ruled(r) => extrusion_offset(r)?.is_some_and(|o| parallel(&o.normalize(), direction)),
        FaceSurface::Cone(_) | FaceSurface::Revolution(_) | FaceSurface::Nurbs(_) => false,
    })
}

/// Start of one profile segment in world space.
enum Piece {
    Line(Point3),
    /// Start point and a point halfway along the arc.
    Arc(Point3, Point3),
}

/// Profile of a planar face: counter-clockwise outer boundary, clockwise holes.
pub(super) fn face_profile(
    store: &TopologyStore,
    face: &FaceData,
    params: &TessellationParams,
    project: impl Fn(&Point3) -> Point2 + Copy,
) -> Result<ProfileDef> {
    let outer = loop_curve(store, face.outer_wire, params, project)?;
    let outer = if outer.signed_area() < 0.0 { outer.reversed() } else { outer };
    let inner = face
        .inner_wires
        .iter()
        .map(|&w| {
            let hole = loop_curve(store, w, params, project)?;
            Ok(if hole.signed_area() > 0.0 { hole.reversed() } else { hole })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ProfileDef { outer, inner })
}

/// Closed poly-curve through a wire; lines and arcs are kept, other curves
/// are sampled.
fn loop_curve(
    store: &TopologyStore,
    wire: WireId,
    params: &TessellationParams,
    project: impl Fn(&Point3) -> Point2,
) -> Result<IndexedPolyCurve> {
    let pieces = loop_pieces(store, wire, params)?;
    let mut curve = IndexedPolyCurve::default();
    let mut starts = Vec::with_capacity(pieces.len());
    let mut mids = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        let (start, mid) = match piece {
            Piece::Line(s) => (s, None),
            Piece::Arc(s, m) => (s, Some(m)),
        };
        starts.push(curve.points.len());
        curve.points.push(project(start));
        mids.push(mid.map(|m| {
            curve.points.push(project(m));
            curve.points.len() - 1
        }));
    }
    let n = starts.len();
    curve.segments = (0..n)
        .map(|i| {
            let (a, b) = (starts[i], starts[(i + 1) % n]);
            match mids[i] {
                Some(m) => PolySegment::Arc([a, m, b]),
                None => PolySegment::Line([a, b]),
            }
        })
        .collect();
    Ok(curve)
}

fn loop_pieces(store: &TopologyStore, wire: WireId, params: &TessellationParams) -> Result<Vec<Piece>> {
    let mut pieces = Vec::new();
    for oe in &store.wire(wire)?.edges {
        let edge = store.edge(oe.edge)?;
        let at = |frac: f64| {
            let span = edge.t_end - edge.t_start;
            let t = if oe.forward {
                edge.t_start + frac * span
            } else {
                edge.t_end - frac * span
            };
            edge.curve.evaluate(t)
        };
        match &edge.curve {
            EdgeCurve::Line(_) => pieces.push(Piece::Line(at(0.0)?)),
            EdgeCurve::Arc(_) if edge.is_closed_loop() => {
                pieces.push(Piece::Arc(at(0.0)?, at(0.25)?));
                pieces.push(Piece::Arc(at(0.5)?, at(0.75)?));
            }
            EdgeCurve::Arc(_) => pieces.push(Piece::Arc(at(0.0)?, at(0.5)?)),
            EdgeCurve::Ellipse(_) | EdgeCurve::Nurbs(_) | EdgeCurve::Helix(_) => {
                let samples = edge_samples(edge, oe.forward, params)?;
                let keep = samples.len().saturating_sub(1);
                pieces.extend(samples.into_iter().take(keep).map(Piece::Line));
            }
        }
    }
    if pieces.len() < 2 {
        return Err(RepresentationError::Degenerate("profile loop has fewer than two segments".into()).into());
    }
    Ok(pieces)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;

    use super::*;
    use crate::operations::creation::{MakeBox, MakeCylinder, MakeFace, MakeWire};
    use crate::operations::shaping::{Extrude, Revolve};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square_with_hole(store: &mut TopologyStore) -> FaceId {
        let outer = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 4.0, 0.0), p(0.0, 4.0, 0.0)], true)
            .execute(store)
            .unwrap();
        let hole = MakeWire::new(vec![p(1.0, 1.0, 0.0), p(1.0, 2.0, 0.0), p(2.0, 2.0, 0.0), p(2.0, 1.0, 0.0)], true)
            .execute(store)
            .unwrap();
        MakeFace::new(outer, vec![hole]).execute(store).unwrap()
    }

    #[test]
    fn box_extrudes_along_z() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 1.0), p(2.0, 3.0, 5.0)).execute(&mut store).unwrap();
        let a = ExtrusionAnalyzer::new(solid).execute(&store).unwrap();
        assert_relative_eq!(a.solid.direction, Vector3::z(), epsilon = 1e-9);
        assert_relative_eq!(a.solid.depth, 4.0, epsilon = 1e-9);
        assert_eq!(a.solid.profile.outer.segments.len(), 4);
        assert!(a.solid.profile.outer.signed_area() > 0.0);
        assert_relative_eq!(a.metrics.profile_area, 6.0, epsilon = 1e-9);
        assert_relative_eq!(a.metrics.volume, 24.0, epsilon = 1e-9);
        let footprint = a.footprint.unwrap();
        assert_relative_eq!(footprint.elevation, 1.0, epsilon = 1e-9);
        assert_relative_eq!(footprint.curve.signed_area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn cylinder_profile_keeps_arcs() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 1.0, Vector3::z(), 2.0)
            .execute(&mut store)
            .unwrap();
        let a = ExtrusionAnalyzer::new(solid).execute(&store).unwrap();
        let segments = &a.solid.profile.outer.segments;
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| matches!(s, PolySegment::Arc(_))));
        assert_relative_eq!(a.solid.depth, 2.0, epsilon = 1e-9);
        assert!((a.metrics.profile_area - PI).abs() / PI < 2e-2);
    }

    #[test]
    fn holes_are_clockwise() {
        let mut store = TopologyStore::new();
        let face = square_with_hole(&mut store);
        let solid = Extrude::new(face, Vector3::new(0.0, 0.0, 3.0)).execute(&mut store).unwrap();
        let a = ExtrusionAnalyzer::new(solid).execute(&store).unwrap();
        assert_eq!(a.solid.profile.inner.len(), 1);
        assert!(a.solid.profile.inner[0].signed_area() < 0.0);
        assert_relative_eq!(a.metrics.profile_area, 15.0, epsilon = 1e-9);
        assert_relative_eq!(a.metrics.volume, 45.0, epsilon = 1e-9);
    }

    #[test]
    fn oblique_sweep_has_no_footprint() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)], true)
            .execute(&mut store)
            .unwrap();
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        let solid = Extrude::new(face, Vector3::new(1.0, 0.0, 2.0)).execute(&mut store).unwrap();
        let a = ExtrusionAnalyzer::new(solid).execute(&store).unwrap();
        assert!(parallel(&a.solid.direction, &Vector3::new(1.0, 0.0, 2.0).normalize()));
        assert_relative_eq!(a.solid.depth, 5.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(a.metrics.volume, 2.0, epsilon = 1e-9);
        assert!(a.footprint.is_none());
    }

    #[test]
    fn hint_picks_the_sweep_direction() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(5.0, 1.0, 2.0)).execute(&mut store).unwrap();
        let hint = Frame {
            origin: Point3::origin(),
            x_axis: Vector3::y(),
            z_axis: Vector3::x(),
        };
        let a = ExtrusionAnalyzer::new(solid).with_hint(&hint).execute(&store).unwrap();
        assert_relative_eq!(a.solid.direction, Vector3::x(), epsilon = 1e-9);
        assert_relative_eq!(a.solid.depth, 5.0, epsilon = 1e-9);
        assert!(a.footprint.is_none());
    }

    #[test]
    fn scale_applies_to_lengths_and_areas() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute(&mut store).unwrap();
        let a = ExtrusionAnalyzer::new(solid)
            .with_mapper(CoordinateMapper::new(1000.0, Vector3::zeros()))
            .execute(&store)
            .unwrap();
        assert_relative_eq!(a.solid.depth, 1000.0, epsilon = 1e-6);
        assert_relative_eq!(a.solid.profile.outer.signed_area(), 1e6, epsilon = 1e-3);
        assert_relative_eq!(a.metrics.volume, 1e9, max_relative = 1e-9);
    }

    #[test]
    fn cone_revolution_is_not_an_extrusion() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 0.0, 2.0)], true)
            .execute(&mut store)
            .unwrap();
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        let solid = Revolve::new(face, Point3::origin(), Vector3::z(), FRAC_PI_2)
            .execute(&mut store)
            .unwrap();
        assert!(ExtrusionAnalyzer::new(solid).execute(&store).is_err());
    }

    #[test]
    fn box_missing_a_face_is_not_an_extrusion() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0)).execute(&mut store).unwrap();
        let shell = store.solid(solid).unwrap().outer_shell;
        store.shell_mut(shell).unwrap().faces.pop();
        let err = ExtrusionAnalyzer::new(solid).execute(&store).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ShapeRepError::Representation(RepresentationError::OpenShell(_))
        ));
    }
}
