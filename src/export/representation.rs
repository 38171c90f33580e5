//! Format-agnostic output model.
//!
//! Every coordinate stored here has already been scaled and offset by the
//! export's [`CoordinateMapper`](super::mapper::CoordinateMapper).

use crate::math::{Point2, Point3, Vector3};
use crate::topology::MaterialId;

use super::classify::SurfaceClassification;
use super::closed_shell::FaceLoops;

/// Opaque style handle handed out by a style registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleHandle(pub u64);

/// RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Opaque colour.
    #[must_use]
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Right-handed placement: origin plus local X and Z axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point3,
    pub x_axis: Vector3,
    pub z_axis: Vector3,
}

impl Frame {
    /// World-aligned frame at `origin`.
    #[must_use]
    pub fn world(origin: Point3) -> Self {
        Self {
            origin,
            x_axis: Vector3::x(),
            z_axis: Vector3::z(),
        }
    }

    /// Local Y axis.
    #[must_use]
    pub fn y_axis(&self) -> Vector3 {
        self.z_axis.cross(&self.x_axis)
    }

    /// Coordinates of `p` in the frame's XY plane.
    #[must_use]
    pub fn to_local_2d(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(&self.x_axis), d.dot(&self.y_axis()))
    }

    /// World point of local `(x, y, z)`.
    #[must_use]
    pub fn to_world(&self, x: f64, y: f64, z: f64) -> Point3 {
        self.origin + self.x_axis * x + self.y_axis() * y + self.z_axis * z
    }
}

/// Unbounded basis of an edge or profile curve.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveGeometry {
    /// Parameter is the distance from `origin` along the unit `direction`.
    Line { origin: Point3, direction: Vector3 },
    /// Parameter is the angle from `ref_dir`, counter-clockwise about `axis`.
    Circle {
        center: Point3,
        axis: Vector3,
        ref_dir: Vector3,
        radius: f64,
    },
    Ellipse {
        center: Point3,
        axis: Vector3,
        major_dir: Vector3,
        semi_major: f64,
        semi_minor: f64,
    },
    BSpline(BSplineCurveData),
}

/// B-spline curve with run-length encoded knots.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineCurveData {
    pub degree: usize,
    pub control_points: Vec<Point3>,
    pub weights: Option<Vec<f64>>,
    pub knots: Vec<f64>,
    pub multiplicities: Vec<usize>,
}

/// A curve restricted to a parameter range.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedCurve {
    pub basis: CurveGeometry,
    pub range: (f64, f64),
}

/// One segment of an [`IndexedPolyCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolySegment {
    /// Straight segment between two points.
    Line([usize; 2]),
    /// Circular arc through start, middle and end points.
    Arc([usize; 3]),
}

/// Closed 2D curve made of straight and circular segments over a point list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedPolyCurve {
    pub points: Vec<Point2>,
    pub segments: Vec<PolySegment>,
}

impl IndexedPolyCurve {
    /// Polygon through `points`.
    #[must_use]
    pub fn polygon(points: Vec<Point2>) -> Self {
        let n = points.len();
        let segments = (0..n).map(|i| PolySegment::Line([i, (i + 1) % n])).collect();
        Self { points, segments }
    }

    /// Signed area of the polygon through the segment end points and arc
    /// midpoints (positive when counter-clockwise).
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let mut ring = Vec::with_capacity(self.points.len());
        for segment in &self.segments {
            match *segment {
                PolySegment::Line([a, _]) => ring.push(self.points[a]),
                PolySegment::Arc([a, m, _]) => {
                    ring.push(self.points[a]);
                    ring.push(self.points[m]);
                }
            }
        }
        crate::math::polygon_3d::signed_area_2d(&ring)
    }

    /// Same curve traversed the other way.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let segments = self
            .segments
            .iter()
            .rev()
            .map(|s| match *s {
                PolySegment::Line([a, b]) => PolySegment::Line([b, a]),
                PolySegment::Arc([a, m, b]) => PolySegment::Arc([b, m, a]),
            })
            .collect();
        Self {
            points: self.points.clone(),
            segments,
        }
    }
}

/// Planar area with holes, in the XY plane of its owner's frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDef {
    /// Counter-clockwise outer boundary.
    pub outer: IndexedPolyCurve,
    /// Clockwise hole boundaries.
    pub inner: Vec<IndexedPolyCurve>,
}

/// Profile swept along a straight direction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudedAreaSolid {
    pub position: Frame,
    pub profile: ProfileDef,
    /// Unit sweep direction in world coordinates.
    pub direction: Vector3,
    pub depth: f64,
}

/// Profile rotated about an axis lying in the profile plane.
///
/// The axis passes through the position origin along the position's local
/// Y axis; rotation is counter-clockwise about it.
#[derive(Debug, Clone, PartialEq)]
pub struct RevolvedAreaSolid {
    pub position: Frame,
    pub profile: ProfileDef,
    pub angle: f64,
}

/// Edge of an advanced B-rep: bounded curve between two shared points.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCurveRecord {
    pub start: usize,
    pub end: usize,
    pub curve: TrimmedCurve,
}

/// Edge use inside a face bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdgeRecord {
    pub edge: usize,
    /// `true` when traversed from `start` to `end`.
    pub orientation: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceBound {
    pub edges: Vec<OrientedEdgeRecord>,
    pub outer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvancedFace {
    pub bounds: Vec<FaceBound>,
    pub surface: SurfaceClassification,
}

/// Closed shell of faces with analytic or spline surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedBrep {
    pub points: Vec<Point3>,
    pub edges: Vec<EdgeCurveRecord>,
    pub faces: Vec<AdvancedFace>,
}

/// Per-face colour assignment of a tessellated item.
#[derive(Debug, Clone, PartialEq)]
pub struct ColourMap {
    pub colours: Vec<Color>,
    /// Index into `colours` for each face.
    pub face_colours: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriangulatedFaceSet {
    pub coordinates: Vec<Point3>,
    pub triangles: Vec<[usize; 3]>,
    pub closed: bool,
    pub colour: ColourMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonalFaceSet {
    pub coordinates: Vec<Point3>,
    pub faces: Vec<FaceLoops>,
    pub closed: bool,
    pub colour: ColourMap,
}

/// Polygonal faces over shared points.
///
/// Used both for closed faceted B-reps and for open surface models.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetedShell {
    pub points: Vec<Point3>,
    pub faces: Vec<FaceLoops>,
}

/// One geometric item of a representation.
#[derive(Debug, Clone, PartialEq)]
pub enum RepresentationItem {
    Extrusion(ExtrudedAreaSolid),
    Revolution(RevolvedAreaSolid),
    AdvancedBrep(AdvancedBrep),
    TriangulatedFaceSet(TriangulatedFaceSet),
    PolygonalFaceSet(PolygonalFaceSet),
    FacetedBrep(FacetedShell),
    SurfaceModel(FacetedShell),
}

impl RepresentationItem {
    fn is_swept(&self) -> bool {
        matches!(self, Self::Extrusion(_) | Self::Revolution(_))
    }

    fn is_tessellated(&self) -> bool {
        matches!(self, Self::TriangulatedFaceSet(_) | Self::PolygonalFaceSet(_))
    }
}

/// Overall kind of a representation, derived from its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Extrusion,
    SweptSolid,
    AdvancedSweptSolid,
    AdvancedBRep,
    Tessellation,
    Brep,
    SolidModel,
    SurfaceModel,
}

impl ShapeKind {
    /// Kind describing a non-empty item list.
    ///
    /// Uniform lists map to their own kind. Swept items mixed with advanced
    /// B-reps give `AdvancedSweptSolid`; any surface model gives
    /// `SurfaceModel`; every other mix is a `SolidModel`.
    #[must_use]
    pub fn of(items: &[RepresentationItem]) -> Option<Self> {
        use RepresentationItem as I;
        if items.is_empty() {
            return None;
        }
        let all = |f: fn(&I) -> bool| items.iter().all(f);
        let kind = if all(|i| matches!(i, I::Extrusion(_))) {
            Self::Extrusion
        } else if all(I::is_swept) {
            Self::SweptSolid
        } else if all(|i| matches!(i, I::AdvancedBrep(_))) {
            Self::AdvancedBRep
        } else if all(|i| i.is_swept() || matches!(i, I::AdvancedBrep(_))) {
            Self::AdvancedSweptSolid
        } else if all(I::is_tessellated) {
            Self::Tessellation
        } else if all(|i| matches!(i, I::FacetedBrep(_))) {
            Self::Brep
        } else if items.iter().any(|i| matches!(i, I::SurfaceModel(_))) {
            Self::SurfaceModel
        } else {
            Self::SolidModel
        };
        Some(kind)
    }
}

/// Material attached to one item (by index into `items`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialAssociation {
    pub material: MaterialId,
    pub item: usize,
    pub style: Option<StyleHandle>,
}

/// Outline of an extrusion projected onto the world XY plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub curve: IndexedPolyCurve,
    /// World Z of the profile plane.
    pub elevation: f64,
}

/// Quantities of a recognised extrusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionMetrics {
    /// Net profile area (holes subtracted).
    pub profile_area: f64,
    pub direction: Vector3,
    pub depth: f64,
    pub volume: f64,
}

/// Result of converting one geometry collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentationResult {
    pub items: Vec<RepresentationItem>,
    pub shape_kind: ShapeKind,
    pub materials: Vec<MaterialAssociation>,
    pub footprint: Option<Footprint>,
    /// Translation subtracted from every coordinate before scaling.
    pub offset: Option<Vector3>,
    pub extrusion_metrics: Vec<ExtrusionMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> FacetedShell {
        FacetedShell::default()
    }

    #[test]
    fn uniform_lists_keep_their_kind() {
        assert_eq!(
            ShapeKind::of(&[RepresentationItem::FacetedBrep(shell())]),
            Some(ShapeKind::Brep)
        );
        assert_eq!(
            ShapeKind::of(&[RepresentationItem::SurfaceModel(shell())]),
            Some(ShapeKind::SurfaceModel)
        );
        assert_eq!(ShapeKind::of(&[]), None);
    }

    #[test]
    fn surface_model_dominates_mixes() {
        let items = [
            RepresentationItem::FacetedBrep(shell()),
            RepresentationItem::SurfaceModel(shell()),
        ];
        assert_eq!(ShapeKind::of(&items), Some(ShapeKind::SurfaceModel));
    }

    #[test]
    fn polycurve_reversal_flips_area() {
        let square = IndexedPolyCurve::polygon(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]);
        assert!((square.signed_area() - 1.0).abs() < 1e-12);
        assert!((square.reversed().signed_area() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn frame_round_trips_local_points() {
        let frame = Frame {
            origin: Point3::new(1.0, 2.0, 3.0),
            x_axis: Vector3::y(),
            z_axis: Vector3::x(),
        };
        let p = frame.to_world(2.0, -1.0, 0.0);
        let q = frame.to_local_2d(&p);
        assert!((q - Point2::new(2.0, -1.0)).norm() < 1e-12);
    }
}
