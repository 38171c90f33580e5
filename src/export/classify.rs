//! Maps face surfaces onto the output surface kinds.
//!
//! Output surfaces always use right-handed frames. The same-sense flag of a
//! classification says whether the face's outward normal agrees with the
//! output surface's own parametric normal.

use tracing::trace;

use crate::error::{RepresentationError, Result};
use crate::geometry::curve::{Curve, CurveKind, NurbsCurve};
use crate::geometry::nurbs::compress_knots;
use crate::geometry::surface::{Cone, Cylinder, NurbsSurface, RevolutionSurface, RuledSurface, Surface};
use crate::math::{Point3, Vector3, POINT_TOLERANCE, TOLERANCE};
use crate::tessellation::{edge_samples, TessellationParams};
use crate::topology::{FaceData, FaceId, FaceSurface, TopologyStore};

use super::mapper::CoordinateMapper;
use super::representation::{Frame, TrimmedCurve};

/// Tensor-product B-spline with run-length encoded knots.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineSurfaceData {
    pub u_degree: usize,
    pub v_degree: usize,
    /// Control net, one row per U index.
    pub control_points: Vec<Vec<Point3>>,
    pub weights: Option<Vec<Vec<f64>>>,
    pub u_knots: Vec<f64>,
    pub u_multiplicities: Vec<usize>,
    pub v_knots: Vec<f64>,
    pub v_multiplicities: Vec<usize>,
}

/// Output surface of a face.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedSurface {
    Planar {
        origin: Point3,
        normal: Vector3,
        ref_dir: Vector3,
    },
    Cylindrical {
        origin: Point3,
        axis: Vector3,
        ref_dir: Vector3,
        radius: f64,
    },
    /// Cone positioned where the face starts; `radius` is measured there.
    Conical {
        origin: Point3,
        axis: Vector3,
        ref_dir: Vector3,
        radius: f64,
        half_angle: f64,
    },
    Revolution {
        origin: Point3,
        axis: Vector3,
        ref_dir: Vector3,
        profile: TrimmedCurve,
    },
    LinearExtrusion {
        position: Frame,
        profile: TrimmedCurve,
        direction: Vector3,
        depth: f64,
    },
    BSpline(BSplineSurfaceData),
}

impl ClassifiedSurface {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Planar { .. } => "planar",
            Self::Cylindrical { .. } => "cylindrical",
            Self::Conical { .. } => "conical",
            Self::Revolution { .. } => "revolution",
            Self::LinearExtrusion { .. } => "linear-extrusion",
            Self::BSpline(_) => "bspline",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceClassification {
    pub surface: ClassifiedSurface,
    pub same_sense: bool,
}

/// Classifies the surface of one face.
pub struct SurfaceClassifier {
    face: FaceId,
    mapper: CoordinateMapper,
}

/// Right-handed model surface parametrized like the output, used to read
/// the output's natural normal.
enum Reference {
    Fixed(Vector3),
    Cylinder(Cylinder),
    Cone(Cone),
    Revolution(RevolutionSurface),
    /// Profile rail over an ascending range, swept along `direction`.
    Extrusion {
        rail: CurveKind,
        range: (f64, f64),
        ruled: RuledSurface,
        direction: Vector3,
    },
    Same,
}

impl SurfaceClassifier {
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self {
            face,
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
    /// Returns an error when the surface has no output form, its data is
    /// inconsistent, or no boundary point gives a usable normal.
    pub fn execute(&self, store: &TopologyStore) -> Result<SurfaceClassification> {
        let face = store.face(self.face)?;
        let (surface, reference) = self.classify(store, face)?;
        let same_sense = same_sense(store, face, &reference)?;
        trace!(kind = surface.name(), same_sense, "classified face");
        Ok(SurfaceClassification { surface, same_sense })
    }

    fn classify(&self, store: &TopologyStore, face: &FaceData) -> Result<(ClassifiedSurface, Reference)> {
        let m = &self.mapper;
        match &face.surface {
            FaceSurface::Plane(plane) => Ok((
                ClassifiedSurface::Planar {
                    origin: m.point(plane.origin()),
                    normal: *plane.plane_normal(),
                    ref_dir: *plane.u_dir(),
                },
                Reference::Fixed(*plane.plane_normal()),
            )),
            FaceSurface::Cylinder(cyl) => {
                let equivalent = Cylinder::new(*cyl.center(), cyl.radius(), *cyl.axis(), *cyl.ref_dir())?;
                Ok((
                    ClassifiedSurface::Cylindrical {
                        origin: m.point(cyl.center()),
                        axis: *cyl.axis(),
                        ref_dir: *cyl.ref_dir(),
                        radius: m.length(cyl.radius()),
                    },
                    Reference::Cylinder(equivalent),
                ))
            }
            FaceSurface::Cone(cone) => {
                let (v_min, _) = v_range(store, face, cone)?;
                let (sin, cos) = cone.half_angle().sin_cos();
                let origin = cone.apex() + cone.axis() * (v_min * cos);
                let equivalent = Cone::new(*cone.apex(), *cone.axis(), cone.half_angle(), *cone.ref_dir())?;
                Ok((
                    ClassifiedSurface::Conical {
                        origin: m.point(&origin),
                        axis: *cone.axis(),
                        ref_dir: *cone.ref_dir(),
                        radius: m.length(v_min.abs() * sin),
                        half_angle: cone.half_angle(),
                    },
                    Reference::Cone(equivalent),
                ))
            }
            FaceSurface::Revolution(rev) => {
                let (v0, v1) = v_range(store, face, rev)?;
                let equivalent = RevolutionSurface::new(
                    *rev.axis_origin(),
                    *rev.axis(),
                    *rev.ref_dir(),
                    None,
                    rev.profile().clone(),
                    rev.profile_range(),
                )?;
                Ok((
                    ClassifiedSurface::Revolution {
                        origin: m.point(rev.axis_origin()),
                        axis: *rev.axis(),
                        ref_dir: *rev.ref_dir(),
                        profile: m.trimmed_curve(rev.profile(), v0, v1)?,
                    },
                    Reference::Revolution(equivalent),
                ))
            }
            FaceSurface::Ruled(ruled) => match extrusion_offset(ruled)? {
                Some(offset) => self.linear_extrusion(ruled, &offset),
                None => Ok((
                    ClassifiedSurface::BSpline(self.ruled_bspline(ruled)?),
                    Reference::Same,
                )),
            },
            FaceSurface::Nurbs(s) => Ok((ClassifiedSurface::BSpline(self.nurbs(s)?), Reference::Same)),
        }
    }

    fn linear_extrusion(&self, ruled: &RuledSurface, offset: &Vector3) -> Result<(ClassifiedSurface, Reference)> {
        let (rail, (a0, a1)) = ruled.first();
        let range = (a0.min(a1), a0.max(a1));
        let direction = offset.normalize();

        // Step along the rail until its tangent leaves the sweep direction.
        let mut x_axis = None;
        for k in 0..=8 {
            let t = range.0 + (range.1 - range.0) * f64::from(k) / 8.0;
            let tangent = rail.tangent(t)?;
            let lateral = tangent - direction * tangent.dot(&direction);
            if lateral.norm() > 1e-6 {
                x_axis = Some(lateral.normalize());
                break;
            }
        }
        let x_axis = x_axis.ok_or_else(|| {
            RepresentationError::Degenerate("extrusion profile runs along the sweep direction".into())
        })?;

        let start = rail.evaluate(range.0)?;
        let surface = ClassifiedSurface::LinearExtrusion {
            position: Frame {
                origin: self.mapper.point(&start),
                x_axis,
                z_axis: direction,
            },
            profile: self.mapper.trimmed_curve(rail, range.0, range.1)?,
            direction,
            depth: self.mapper.length(offset.norm()),
        };
        Ok((
            surface,
            Reference::Extrusion {
                rail: rail.clone(),
                range,
                ruled: ruled.clone(),
                direction,
            },
        ))
    }

    /// Degree-1-in-V B-spline through the two rails.
    fn ruled_bspline(&self, ruled: &RuledSurface) -> Result<BSplineSurfaceData> {
        let first = rail_nurbs(ruled.first())?;
        let second = rail_nurbs(ruled.second())?;
        let same_knots = first.knots().len() == second.knots().len()
            && first.knots().iter().zip(second.knots()).all(|(a, b)| (a - b).abs() < TOLERANCE);
        if first.degree() != second.degree() || !same_knots {
            return Err(RepresentationError::Unsupported("ruled rails have different knot vectors".into()).into());
        }
        let n = first.control_points().len();
        let w1 = first.weights().map_or_else(|| vec![1.0; n], <[f64]>::to_vec);
        let w2 = second.weights().map_or_else(|| vec![1.0; n], <[f64]>::to_vec);
        if w1.iter().zip(&w2).any(|(a, b)| (a - b).abs() > TOLERANCE) {
            return Err(RepresentationError::Unsupported("ruled rails have different weights".into()).into());
        }
        let rational = first.weights().is_some() || second.weights().is_some();

        let control_points = first
            .control_points()
            .iter()
            .zip(second.control_points())
            .map(|(p, q)| vec![self.mapper.point(p), self.mapper.point(q)])
            .collect();
        let (u_knots, u_multiplicities) = compress_knots(first.knots(), TOLERANCE);
        Ok(BSplineSurfaceData {
            u_degree: first.degree(),
            v_degree: 1,
            control_points,
            weights: rational.then(|| w1.iter().map(|&w| vec![w, w]).collect()),
            u_knots,
            u_multiplicities,
            v_knots: vec![0.0, 1.0],
            v_multiplicities: vec![2, 2],
        })
    }

    fn nurbs(&self, s: &NurbsSurface) -> Result<BSplineSurfaceData> {
        s.validate()?;
        let control_points = (0..s.u_count)
            .map(|i| s.row(i).iter().map(|p| self.mapper.point(p)).collect())
            .collect();
        let weights = s
            .weights
            .as_ref()
            .map(|w| w.chunks(s.v_count).map(<[f64]>::to_vec).collect());
        let (u_knots, u_multiplicities) = compress_knots(&s.u_knots, TOLERANCE);
        let (v_knots, v_multiplicities) = compress_knots(&s.v_knots, TOLERANCE);
        Ok(BSplineSurfaceData {
            u_degree: s.u_degree,
            v_degree: s.v_degree,
            control_points,
            weights,
            u_knots,
            u_multiplicities,
            v_knots,
            v_multiplicities,
        })
    }
}

/// Offset between the rails when the second is a translated copy of the
/// first.
pub(super) fn extrusion_offset(ruled: &RuledSurface) -> Result<Option<Vector3>> {
    let (first, (a0, a1)) = ruled.first();
    let (second, (b0, b1)) = ruled.second();
    let offset = second.evaluate(b0)? - first.evaluate(a0)?;
    if offset.norm() < POINT_TOLERANCE {
        return Ok(None);
    }
    for k in 1..=4 {
        let u = f64::from(k) / 4.0;
        let d = second.evaluate(b0 + u * (b1 - b0))? - first.evaluate(a0 + u * (a1 - a0))?;
        if (d - offset).norm() > POINT_TOLERANCE {
            return Ok(None);
        }
    }
    Ok(Some(offset))
}

/// Rail over `range` as a B-spline on `[0, 1]`.
fn rail_nurbs((curve, (t0, t1)): (&CurveKind, (f64, f64))) -> Result<NurbsCurve> {
    match curve {
        CurveKind::Line(line) => NurbsCurve::new(
            1,
            vec![line.evaluate(t0)?, line.evaluate(t1)?],
            None,
            vec![0.0, 0.0, 1.0, 1.0],
        ),
        CurveKind::Arc(arc) => arc.to_nurbs(t0, t1),
        CurveKind::Nurbs(c) => {
            let domain = c.domain();
            let (k0, k1) = (domain.t_min, domain.t_max);
            if (t0 - k0).abs() > TOLERANCE || (t1 - k1).abs() > TOLERANCE {
                return Err(RepresentationError::Unsupported("ruled rail is a partial B-spline".into()).into());
            }
            let knots = c.knots().iter().map(|k| (k - k0) / (k1 - k0)).collect();
            NurbsCurve::new(
                c.degree(),
                c.control_points().to_vec(),
                c.weights().map(<[f64]>::to_vec),
                knots,
            )
        }
        CurveKind::Ellipse(_) | CurveKind::Helix(_) => {
            Err(RepresentationError::Unsupported(format!("{} rail on a ruled surface", curve.name())).into())
        }
    }
}

/// Range of the V parameter over the face boundary.
fn v_range(store: &TopologyStore, face: &FaceData, surface: &impl Surface) -> Result<(f64, f64)> {
    let params = TessellationParams::default();
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for wire in face.wires() {
        for oe in &store.wire(wire)?.edges {
            for p in edge_samples(store.edge(oe.edge)?, true, &params)? {
                let (_, v) = surface.inverse(&p)?;
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if hi - lo > TOLERANCE {
        Ok((lo, hi))
    } else {
        Err(RepresentationError::Degenerate("face has an empty v-range".into()).into())
    }
}

/// Compares the outward normal with the output's natural normal at the
/// midpoint of the first boundary edge where both are defined.
fn same_sense(store: &TopologyStore, face: &FaceData, reference: &Reference) -> Result<bool> {
    let sign = if face.same_sense { 1.0 } else { -1.0 };
    let mut last_error = None;
    for wire in face.wires() {
        for oe in &store.wire(wire)?.edges {
            let edge = store.edge(oe.edge)?;
            let mid = edge.midpoint()?;
            if (mid - store.point(edge.start)?).norm() < POINT_TOLERANCE {
                continue;
            }
            let normals = normal_at(&face.surface, &mid)
                .and_then(|n| Ok((n * sign, reference_normal(reference, &face.surface, &mid)?)));
            match normals {
                Ok((outward, natural)) => return Ok(outward.dot(&natural) > 0.0),
                Err(e) => last_error = Some(e),
            }
        }
    }
    Err(last_error
        .unwrap_or_else(|| RepresentationError::Degenerate("face has no usable boundary edge".into()).into()))
}

fn reference_normal(reference: &Reference, surface: &FaceSurface, p: &Point3) -> Result<Vector3> {
    match reference {
        Reference::Fixed(n) => Ok(*n),
        Reference::Cylinder(s) => normal_at(s, p),
        Reference::Cone(s) => normal_at(s, p),
        Reference::Revolution(s) => normal_at(s, p),
        Reference::Extrusion {
            rail,
            range,
            ruled,
            direction,
        } => {
            let (u, _) = ruled.inverse(p)?;
            let (a0, a1) = ruled.first().1;
            let t = (a0 + u * (a1 - a0)).clamp(range.0, range.1);
            Ok(rail.derivative(t)?.cross(direction))
        }
        Reference::Same => normal_at(surface, p),
    }
}

fn normal_at(surface: &impl Surface, p: &Point3) -> Result<Vector3> {
    let (u, v) = surface.inverse(p)?;
    surface.normal(u, v)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::curve::{Arc, Line};
    use crate::geometry::surface::Plane;
    use crate::operations::creation::{MakeBox, MakeCylinder};
    use crate::topology::{EdgeCurve, EdgeData, OrientedEdge, VertexData, WireData};

    /// Face on `surface` bounded by one closed circle edge.
    fn circle_face(store: &mut TopologyStore, surface: FaceSurface, circle: Arc, same_sense: bool) -> FaceId {
        let start = circle.evaluate(0.0).unwrap();
        let v = store.add_vertex(VertexData::new(start));
        let e = store.add_edge(EdgeData {
            start: v,
            end: v,
            curve: EdgeCurve::Arc(circle),
            t_start: 0.0,
            t_end: TAU,
        });
        let w = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(e, true)],
            is_closed: true,
        });
        store.add_face(FaceData::new(surface, w, same_sense))
    }

    /// Face on `surface` bounded by a straight edge from `a` to `b`.
    fn segment_face(store: &mut TopologyStore, surface: FaceSurface, a: Point3, b: Point3) -> FaceId {
        let va = store.add_vertex(VertexData::new(a));
        let vb = store.add_vertex(VertexData::new(b));
        let e = store.add_edge(EdgeData {
            start: va,
            end: vb,
            curve: EdgeCurve::Line(Line::through(a, b).unwrap()),
            t_start: 0.0,
            t_end: (b - a).norm(),
        });
        let w = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(e, true)],
            is_closed: false,
        });
        store.add_face(FaceData::new(surface, w, true))
    }

    #[test]
    fn box_faces_are_outward_planes() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(2.0, 2.0, 2.0))
            .execute(&mut store)
            .unwrap();
        let center = Point3::new(1.0, 1.0, 1.0);
        for face in store.solid_faces(solid).unwrap() {
            let c = SurfaceClassifier::new(face).execute(&store).unwrap();
            let ClassifiedSurface::Planar { origin, normal, .. } = c.surface else {
                panic!("expected a plane");
            };
            let outward = if c.same_sense { normal } else { -normal };
            assert!(outward.dot(&(origin - center)) > 0.0);
        }
    }

    #[test]
    fn planar_origin_is_mapped() {
        let mut store = TopologyStore::new();
        let plane = Plane::from_normal(Point3::new(10.0, 0.0, 1.0), Vector3::z()).unwrap();
        let face = segment_face(
            &mut store,
            FaceSurface::Plane(plane),
            Point3::new(10.0, 0.0, 1.0),
            Point3::new(11.0, 0.0, 1.0),
        );
        let mapper = CoordinateMapper::new(1000.0, Vector3::new(10.0, 0.0, 0.0));
        let c = SurfaceClassifier::new(face).with_mapper(mapper).execute(&store).unwrap();
        let ClassifiedSurface::Planar { origin, normal, .. } = c.surface else {
            panic!("expected a plane");
        };
        assert_relative_eq!(origin, Point3::new(0.0, 0.0, 1000.0), epsilon = 1e-9);
        assert_relative_eq!(normal, Vector3::z(), epsilon = 1e-12);
        assert!(c.same_sense);
    }

    #[test]
    fn cylinder_lateral_face_is_cylindrical() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 2.0, Vector3::z(), 3.0)
            .execute(&mut store)
            .unwrap();
        let found: Vec<_> = store
            .solid_faces(solid)
            .unwrap()
            .into_iter()
            .map(|f| SurfaceClassifier::new(f).execute(&store).unwrap())
            .filter(|c| matches!(c.surface, ClassifiedSurface::Cylindrical { .. }))
            .collect();
        assert_eq!(found.len(), 1);
        let ClassifiedSurface::Cylindrical { radius, .. } = found[0].surface else {
            unreachable!()
        };
        assert_relative_eq!(radius, 2.0);
        assert!(found[0].same_sense);
    }

    #[test]
    fn left_handed_cylinder_flips_same_sense() {
        let mut store = TopologyStore::new();
        let cyl = Cylinder::with_frame(Point3::origin(), 1.0, Vector3::z(), Vector3::x(), -Vector3::y()).unwrap();
        let circle = Arc::circle(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        // Outward follows the left-handed natural normal, which points inward.
        let face = circle_face(&mut store, FaceSurface::Cylinder(cyl), circle, true);
        let c = SurfaceClassifier::new(face).execute(&store).unwrap();
        assert!(matches!(c.surface, ClassifiedSurface::Cylindrical { .. }));
        assert!(!c.same_sense);
    }

    #[test]
    fn cone_is_positioned_at_the_face_start() {
        let mut store = TopologyStore::new();
        let cone = Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_4, Vector3::x()).unwrap();
        let circle = Arc::circle(Point3::new(0.0, 0.0, 1.0), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let face = circle_face(&mut store, FaceSurface::Cone(cone), circle, true);
        let top = Arc::circle(Point3::new(0.0, 0.0, 2.0), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let start = top.evaluate(0.0).unwrap();
        let v = store.add_vertex(VertexData::new(start));
        let e = store.add_edge(EdgeData {
            start: v,
            end: v,
            curve: EdgeCurve::Arc(top),
            t_start: 0.0,
            t_end: TAU,
        });
        let w = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(e, false)],
            is_closed: true,
        });
        store.face_mut(face).unwrap().inner_wires.push(w);

        let c = SurfaceClassifier::new(face).execute(&store).unwrap();
        let ClassifiedSurface::Conical {
            origin,
            radius,
            half_angle,
            ..
        } = c.surface
        else {
            panic!("expected a cone");
        };
        assert_relative_eq!(origin, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
        assert_relative_eq!(radius, 1.0, epsilon = 1e-9);
        assert_relative_eq!(half_angle, FRAC_PI_4);
        assert!(c.same_sense);
    }

    #[test]
    fn translated_rails_give_linear_extrusion() {
        let mut store = TopologyStore::new();
        let arc = Arc::circle(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let lifted = Arc::circle(Point3::new(0.0, 0.0, 3.0), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let ruled = RuledSurface::new(
            CurveKind::Arc(arc),
            (0.0, FRAC_PI_2),
            CurveKind::Arc(lifted),
            (0.0, FRAC_PI_2),
        );
        let bottom = Arc::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x(), 0.0, FRAC_PI_2).unwrap();
        let a = bottom.evaluate(0.0).unwrap();
        let b = bottom.evaluate(FRAC_PI_2).unwrap();
        let va = store.add_vertex(VertexData::new(a));
        let vb = store.add_vertex(VertexData::new(b));
        let e = store.add_edge(EdgeData {
            start: va,
            end: vb,
            curve: EdgeCurve::Arc(bottom),
            t_start: 0.0,
            t_end: FRAC_PI_2,
        });
        let w = store.add_wire(WireData {
            edges: vec![OrientedEdge::new(e, true)],
            is_closed: false,
        });
        let face = store.add_face(FaceData::new(FaceSurface::Ruled(ruled), w, true));

        let c = SurfaceClassifier::new(face).execute(&store).unwrap();
        let ClassifiedSurface::LinearExtrusion { direction, depth, .. } = c.surface else {
            panic!("expected a linear extrusion");
        };
        assert_relative_eq!(direction, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(depth, 3.0, epsilon = 1e-12);
        assert!(c.same_sense);
    }

    #[test]
    fn twisted_ruled_surface_becomes_bilinear_bspline() {
        let mut store = TopologyStore::new();
        let ruled = RuledSurface::between_points(
            [Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            [Point3::new(0.0, 1.0, 0.0), Point3::new(1.0, 1.0, 1.0)],
        )
        .unwrap();
        let face = segment_face(
            &mut store,
            FaceSurface::Ruled(ruled),
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        );
        let c = SurfaceClassifier::new(face).execute(&store).unwrap();
        let ClassifiedSurface::BSpline(data) = c.surface else {
            panic!("expected a B-spline");
        };
        assert_eq!((data.u_degree, data.v_degree), (1, 1));
        assert_eq!(data.control_points.len(), 2);
        assert_eq!(data.u_multiplicities, vec![2, 2]);
        assert!(data.weights.is_none());
    }

    #[test]
    fn nurbs_grid_mismatch_fails() {
        let mut store = TopologyStore::new();
        let surface = NurbsSurface {
            u_degree: 1,
            v_degree: 1,
            u_count: 2,
            v_count: 2,
            control_points: vec![Point3::origin(); 3],
            weights: None,
            u_knots: vec![0.0, 0.0, 1.0, 1.0],
            v_knots: vec![0.0, 0.0, 1.0, 1.0],
        };
        let face = segment_face(
            &mut store,
            FaceSurface::Nurbs(surface),
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
        );
        assert!(SurfaceClassifier::new(face).execute(&store).is_err());
    }
}
