//! Triangulated and polygonal face sets.

use tracing::{debug, trace};

use crate::error::{RepresentationError, Result};
use crate::math::fuzzy::PointCache;
use crate::math::Point3;
use crate::mesh::Mesh;
use crate::tessellation::TessellateSolid;
use crate::topology::{SolidId, TopologyStore};

use super::closed_shell::{validate_closed_shell, FaceLoops};
use super::collaborators::ElementColor;
use super::facet_merge::PlanarFacetMerger;
use super::mapper::CoordinateMapper;
use super::options::{ExportOptions, TessellationLevel};
use super::representation::{ColourMap, PolygonalFaceSet, RepresentationItem, TriangulatedFaceSet};

/// Sews tessellated geometry into a shared point list and emits a face set.
pub struct TessellationBuilder {
    level: TessellationLevel,
    budget: usize,
    polygonal: bool,
    mapper: CoordinateMapper,
}

/// Triangles over a point list in world coordinates.
struct Sewn {
    points: Vec<Point3>,
    triangles: Vec<[usize; 3]>,
}

impl TessellationBuilder {
    #[must_use]
    pub fn new(options: &ExportOptions) -> Self {
        Self {
            level: options.tessellation_level,
            budget: options.triangle_budget(),
            polygonal: options.capabilities.polygonal_face_set,
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
    /// Returns [`RepresentationError::TooComplex`] when a single-shell solid
    /// needs more triangles than the budget, or any tessellation error.
    pub fn execute_solid(&self, store: &TopologyStore, solid: SolidId, color: &ElementColor) -> Result<RepresentationItem> {
        let mesh = TessellateSolid::new(solid, self.level.params()).execute(store)?;
        let single_shell = store.solid(solid)?.inner_shells.is_empty();
        if single_shell && mesh.indices.len() > self.budget {
            debug!(triangles = mesh.indices.len(), limit = self.budget, "solid over the triangle budget");
            return Err(RepresentationError::TooComplex {
                triangles: mesh.indices.len(),
                limit: self.budget,
            }
            .into());
        }
        self.face_set(sew(mesh.triangles()), color)
    }

    /// # Errors
    ///
    /// Returns [`RepresentationError::Empty`] when no triangle survives sewing.
    pub fn execute_mesh(&self, mesh: &Mesh, color: &ElementColor) -> Result<RepresentationItem> {
        self.face_set(sew(mesh.triangles.iter().copied()), color)
    }

    fn face_set(&self, sewn: Sewn, color: &ElementColor) -> Result<RepresentationItem> {
        if sewn.triangles.is_empty() {
            return Err(RepresentationError::Empty.into());
        }
        let coordinates = sewn.points.iter().map(|p| self.mapper.point(p)).collect();
        let colour = |faces: usize| ColourMap {
            colours: vec![color.resolve()],
            face_colours: vec![0; faces],
        };

        if self.polygonal {
            let faces = PlanarFacetMerger::new(&sewn.points, &sewn.triangles).execute();
            let closed = validate_closed_shell(&faces);
            trace!(triangles = sewn.triangles.len(), faces = faces.len(), closed, "polygonal face set");
            return Ok(RepresentationItem::PolygonalFaceSet(PolygonalFaceSet {
                coordinates,
                colour: colour(faces.len()),
                faces,
                closed,
            }));
        }

        let loops: Vec<FaceLoops> = sewn.triangles.iter().map(|t| FaceLoops::polygon(t.to_vec())).collect();
        let closed = validate_closed_shell(&loops);
        trace!(triangles = sewn.triangles.len(), closed, "triangulated face set");
        Ok(RepresentationItem::TriangulatedFaceSet(TriangulatedFaceSet {
            coordinates,
            colour: colour(sewn.triangles.len()),
            triangles: sewn.triangles,
            closed,
        }))
    }
}

/// Merges coincident corners and drops triangles that collapse.
fn sew(triangles: impl Iterator<Item = [Point3; 3]>) -> Sewn {
    let mut cache = PointCache::new();
    let mut sewn = Sewn {
        points: Vec::new(),
        triangles: Vec::new(),
    };
    for corners in triangles {
        let tri = corners.map(|p| {
            let next = sewn.points.len();
            let index = cache.get_or_insert_with(&p, || next);
            if index == next {
                sewn.points.push(p);
            }
            index
        });
        if tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0] {
            sewn.triangles.push(tri);
        }
    }
    sewn
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ShapeRepError;
    use crate::export::options::FormatCapabilities;
    use crate::export::representation::Color;
    use crate::operations::creation::MakeBox;

    fn cube(store: &mut TopologyStore) -> SolidId {
        MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(store)
            .unwrap()
    }

    fn triangles_only() -> ExportOptions {
        ExportOptions::default().with_capabilities(FormatCapabilities::triangulated())
    }

    #[test]
    fn cube_sews_into_a_closed_triangle_set() {
        let mut store = TopologyStore::new();
        let solid = cube(&mut store);
        let item = TessellationBuilder::new(&triangles_only())
            .execute_solid(&store, solid, &ElementColor::default())
            .unwrap();
        let RepresentationItem::TriangulatedFaceSet(set) = item else {
            panic!("expected triangles");
        };
        assert_eq!(set.coordinates.len(), 8);
        assert_eq!(set.triangles.len(), 12);
        assert!(set.closed);
        assert_eq!(set.colour.colours, vec![Color::WHITE]);
        assert_eq!(set.colour.face_colours, vec![0; 12]);
    }

    #[test]
    fn polygonal_sets_merge_coplanar_triangles() {
        let mut store = TopologyStore::new();
        let solid = cube(&mut store);
        let mut caps = FormatCapabilities::ifc4();
        caps.polygonal_face_set = true;
        let options = ExportOptions::default().with_capabilities(caps);
        let item = TessellationBuilder::new(&options)
            .execute_solid(&store, solid, &ElementColor::default())
            .unwrap();
        let RepresentationItem::PolygonalFaceSet(set) = item else {
            panic!("expected polygons");
        };
        assert_eq!(set.faces.len(), 6);
        assert!(set.closed);
    }

    #[test]
    fn budget_rejects_dense_solids() {
        let mut store = TopologyStore::new();
        let solid = cube(&mut store);
        let err = TessellationBuilder::new(&triangles_only().with_triangle_budget(4))
            .execute_solid(&store, solid, &ElementColor::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ShapeRepError::Representation(RepresentationError::TooComplex { triangles: 12, limit: 4 })
        ));
    }

    #[test]
    fn single_triangle_mesh_is_open_and_coloured() {
        let mesh = Mesh::new(vec![[
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]]);
        let red = Color::rgb(1.0, 0.0, 0.0);
        let color = ElementColor {
            material: Some(red),
            ..ElementColor::default()
        };
        let item = TessellationBuilder::new(&triangles_only())
            .with_mapper(CoordinateMapper::new(2.0, crate::math::Vector3::zeros()))
            .execute_mesh(&mesh, &color)
            .unwrap();
        let RepresentationItem::TriangulatedFaceSet(set) = item else {
            panic!("expected triangles");
        };
        assert!(!set.closed);
        assert_eq!(set.colour.colours, vec![red]);
        assert_eq!(set.coordinates[1], Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn collapsed_mesh_is_empty() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let mesh = Mesh::new(vec![[p, p, p]]);
        assert!(TessellationBuilder::new(&triangles_only())
            .execute_mesh(&mesh, &ElementColor::default())
            .is_err());
    }
}
