use std::f64::consts::TAU;

use crate::error::{OperationError, Result};
use crate::geometry::curve::Arc;
use crate::geometry::surface::{Cone, Cylinder, Plane};
use crate::math::polygon_3d::signed_area_2d;
use crate::math::{try_normalize, Point2, Point3, Vector3, POINT_TOLERANCE, TOLERANCE};
use crate::operations::creation::shell_builder::{agrees_with_surface, ShellBuilder};
use crate::topology::{FaceId, FaceSurface, OrientedEdge, SolidId, TopologyStore, VertexId};

use super::extrude::polygon_points;

/// Revolves a planar polygonal face about an axis through a partial angle.
///
/// The profile must lie in a half-plane bounded by the axis. Profile edges
/// become cylinder, cone or plane faces, and the profile itself closes both
/// ends of the sweep.
pub struct Revolve {
    face: FaceId,
    axis_origin: Point3,
    axis_dir: Vector3,
    angle: f64,
}

/// A profile corner in the meridian half-plane.
#[derive(Debug, Clone, Copy)]
struct ProfilePoint {
    radius: f64,
    height: f64,
}

impl ProfilePoint {
    fn on_axis(self) -> bool {
        self.radius < POINT_TOLERANCE
    }
}

impl Revolve {
    /// Creates a new `Revolve` operation sweeping `angle` radians
    /// counter-clockwise about `axis_dir`.
    #[must_use]
    pub fn new(face: FaceId, axis_origin: Point3, axis_dir: Vector3, angle: f64) -> Self {
        Self {
            face,
            axis_origin,
            axis_dir,
            angle,
        }
    }

    /// Executes the revolution, creating a solid in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if the axis is zero-length, the angle is outside
    /// `(0, 2*pi)`, the profile has holes or curved edges, or it crosses or
    /// leaves the half-plane bounded by the axis.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let axis = try_normalize(&self.axis_dir)
            .ok_or_else(|| OperationError::InvalidInput("revolve axis direction must be non-zero".into()))?;
        if self.angle <= TOLERANCE || self.angle >= TAU - TOLERANCE {
            return Err(OperationError::InvalidInput(format!(
                "revolve angle must be in (0, 2*pi), got {}",
                self.angle
            ))
            .into());
        }

        let face = store.face(self.face)?;
        if !face.inner_wires.is_empty() {
            return Err(OperationError::InvalidInput("revolved profiles cannot have holes".into()).into());
        }
        let mut points = polygon_points(store, face.outer_wire)?;

        let ref_dir = meridian_direction(&points, &self.axis_origin, &axis)?;
        let mut profile = points
            .iter()
            .map(|p| {
                let d = p - self.axis_origin;
                let height = d.dot(&axis);
                let radial = d - axis * height;
                let radius = radial.norm();
                if radius > POINT_TOLERANCE && (radial / radius - ref_dir).norm() > 1e-6 {
                    return Err(OperationError::InvalidInput(
                        "profile must lie in a half-plane bounded by the axis".into(),
                    ));
                }
                Ok(ProfilePoint { radius, height })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let flat: Vec<Point2> = profile.iter().map(|q| Point2::new(q.radius, q.height)).collect();
        if signed_area_2d(&flat) < 0.0 {
            points.reverse();
            profile.reverse();
        }

        let sweep = Sweep {
            origin: self.axis_origin,
            axis,
            ref_dir,
            angle: self.angle,
        };
        sweep.build(store, &points, &profile)
    }
}

/// Unit direction from the axis towards the off-axis profile corners.
fn meridian_direction(points: &[Point3], origin: &Point3, axis: &Vector3) -> Result<Vector3> {
    points
        .iter()
        .find_map(|p| {
            let d = p - origin;
            let radial = d - axis * d.dot(axis);
            (radial.norm() > POINT_TOLERANCE).then(|| radial.normalize())
        })
        .ok_or_else(|| OperationError::InvalidInput("profile lies entirely on the axis".into()).into())
}

struct Sweep {
    origin: Point3,
    axis: Vector3,
    ref_dir: Vector3,
    angle: f64,
}

impl Sweep {
    fn rotated(&self, q: ProfilePoint, theta: f64) -> Point3 {
        let tangent = self.axis.cross(&self.ref_dir);
        self.origin
            + self.axis * q.height
            + (self.ref_dir * theta.cos() + tangent * theta.sin()) * q.radius
    }

    fn build(&self, store: &mut TopologyStore, points: &[Point3], profile: &[ProfilePoint]) -> Result<SolidId> {
        let n = points.len();
        let mut builder = ShellBuilder::new(store);
        let start: Vec<VertexId> = points.iter().map(|p| builder.vertex(*p)).collect();
        let end: Vec<VertexId> = profile
            .iter()
            .map(|&q| builder.vertex(self.rotated(q, self.angle)))
            .collect();

        builder.polygon(&start, &[])?;
        let end_rev: Vec<VertexId> = end.iter().rev().copied().collect();
        builder.polygon(&end_rev, &[])?;

        for i in 0..n {
            let j = (i + 1) % n;
            let (qi, qj) = (profile[i], profile[j]);
            if qi.on_axis() && qj.on_axis() {
                continue;
            }

            let mut edges = Vec::with_capacity(4);
            if let Some(arc) = self.rim(&mut builder, start[i], end[i], qi)? {
                edges.push(arc);
            }
            edges.push(builder.line(end[i], end[j])?);
            if let Some(arc) = self.rim(&mut builder, start[j], end[j], qj)? {
                edges.push(arc.reversed());
            }
            edges.push(builder.line(start[j], start[i])?);

            let (surface, same_sense) = self.lateral_surface(qi, qj)?;
            builder.face(surface, same_sense, vec![edges])?;
        }
        builder.finish()
    }

    /// Circular edge swept by an off-axis profile corner.
    fn rim(
        &self,
        builder: &mut ShellBuilder<'_>,
        from: VertexId,
        to: VertexId,
        q: ProfilePoint,
    ) -> Result<Option<OrientedEdge>> {
        if q.on_axis() {
            return Ok(None);
        }
        let arc = Arc::new(
            self.origin + self.axis * q.height,
            q.radius,
            self.axis,
            self.ref_dir,
            0.0,
            self.angle,
        )?;
        builder.arc(from, to, arc, 0.0, self.angle).map(Some)
    }

    /// Surface traced by the profile edge `qi -> qj` and whether its
    /// natural normal points out of the solid.
    fn lateral_surface(&self, qi: ProfilePoint, qj: ProfilePoint) -> Result<(FaceSurface, bool)> {
        let dr = qj.radius - qi.radius;
        let dh = qj.height - qi.height;
        let mid = self.rotated(
            ProfilePoint {
                radius: 0.5 * (qi.radius + qj.radius),
                height: 0.5 * (qi.height + qj.height),
            },
            0.5 * self.angle,
        );
        let half = 0.5 * self.angle;
        let radial = self.ref_dir * half.cos() + self.axis.cross(&self.ref_dir) * half.sin();
        let outward = radial * dh - self.axis * dr;

        if dh.abs() < POINT_TOLERANCE {
            let plane = Plane::from_normal(mid, outward)?;
            return Ok((FaceSurface::Plane(plane), true));
        }
        let surface = if dr.abs() < POINT_TOLERANCE {
            FaceSurface::Cylinder(Cylinder::new(self.origin, qi.radius, self.axis, self.ref_dir)?)
        } else {
            let apex_height = qi.height - qi.radius * dh / dr;
            let apex = self.origin + self.axis * apex_height;
            let cone_axis = if dh * dr > 0.0 { self.axis } else { -self.axis };
            let half_angle = (dr.abs() / dh.abs()).atan();
            FaceSurface::Cone(Cone::new(apex, cone_axis, half_angle, self.ref_dir)?)
        };
        let same_sense = agrees_with_surface(&surface, &mid, &outward)?;
        Ok((surface, same_sense))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::operations::creation::{MakeFace, MakeWire};
    use crate::tessellation::{TessellateSolid, TessellationParams};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn profile_face(store: &mut TopologyStore, pts: Vec<Point3>) -> FaceId {
        let wire = MakeWire::new(pts, true).execute(store).unwrap();
        MakeFace::new(wire, vec![]).execute(store).unwrap()
    }

    #[test]
    fn quarter_ring_has_six_faces() {
        let mut store = TopologyStore::new();
        let face = profile_face(
            &mut store,
            vec![p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 1.0), p(1.0, 0.0, 1.0)],
        );
        let solid = Revolve::new(face, Point3::origin(), Vector3::z(), FRAC_PI_2)
            .execute(&mut store)
            .unwrap();
        let faces = store.solid_faces(solid).unwrap();
        assert_eq!(faces.len(), 6);
        let cylinders = faces
            .iter()
            .filter(|&&f| matches!(store.face(f).unwrap().surface, FaceSurface::Cylinder(_)))
            .count();
        assert_eq!(cylinders, 2);
        let counts = store.edge_use_counts(solid).unwrap();
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn inner_cylinder_faces_the_axis() {
        let mut store = TopologyStore::new();
        let face = profile_face(
            &mut store,
            vec![p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 1.0), p(1.0, 0.0, 1.0)],
        );
        let solid = Revolve::new(face, Point3::origin(), Vector3::z(), PI)
            .execute(&mut store)
            .unwrap();
        for f in store.solid_faces(solid).unwrap() {
            let data = store.face(f).unwrap();
            if let FaceSurface::Cylinder(c) = &data.surface {
                assert_eq!(data.same_sense, c.radius() > 1.5);
            }
        }
    }

    #[test]
    fn triangle_on_axis_gives_cone() {
        let mut store = TopologyStore::new();
        let face = profile_face(&mut store, vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 0.0, 2.0)]);
        let solid = Revolve::new(face, Point3::origin(), Vector3::z(), FRAC_PI_2)
            .execute(&mut store)
            .unwrap();
        let faces = store.solid_faces(solid).unwrap();
        // two caps, the cone and the bottom sector
        assert_eq!(faces.len(), 4);
        let cone = faces
            .iter()
            .map(|&f| store.face(f).unwrap())
            .find(|d| matches!(d.surface, FaceSurface::Cone(_)))
            .unwrap();
        assert!(cone.same_sense);
        let counts = store.edge_use_counts(solid).unwrap();
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn swept_area_matches_annulus_sector() {
        let mut store = TopologyStore::new();
        let face = profile_face(
            &mut store,
            vec![p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 1.0), p(1.0, 0.0, 1.0)],
        );
        let solid = Revolve::new(face, Point3::origin(), Vector3::z(), FRAC_PI_2)
            .execute(&mut store)
            .unwrap();
        let mesh = TessellateSolid::new(solid, TessellationParams::default().with_tolerance(1e-4))
            .execute(&store)
            .unwrap();
        // caps 2 x 1, sectors 2 x 3pi/4, lateral pi/2 * (1 + 2)
        let exact = 2.0 + 2.0 * (3.0 * PI / 4.0) + FRAC_PI_2 * 3.0;
        assert!((mesh.area() - exact).abs() / exact < 1e-2);
    }

    #[test]
    fn full_turn_is_rejected() {
        let mut store = TopologyStore::new();
        let face = profile_face(&mut store, vec![p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 1.0)]);
        assert!(Revolve::new(face, Point3::origin(), Vector3::z(), TAU)
            .execute(&mut store)
            .is_err());
    }

    #[test]
    fn profile_crossing_axis_is_rejected() {
        let mut store = TopologyStore::new();
        let face = profile_face(&mut store, vec![p(-1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 1.0)]);
        assert!(Revolve::new(face, Point3::origin(), Vector3::z(), PI)
            .execute(&mut store)
            .is_err());
    }
}
