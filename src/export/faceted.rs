//! Faceted B-reps and surface models built by walking faces.

use tracing::{debug, trace, warn};

use crate::error::{RepresentationError, Result};
use crate::math::fuzzy::PointCache;
use crate::math::Point3;
use crate::mesh::Mesh;
use crate::tessellation::{TessellateFace, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

use super::closed_shell::{validate_closed_shell, FaceLoops};
use super::facet_merge::PlanarFacetMerger;
use super::mapper::CoordinateMapper;
use super::options::ExportOptions;
use super::representation::{FacetedShell, RepresentationItem};

/// Triangulates each face, merges its coplanar triangles back into
/// polygons and checks the result for closure.
///
/// Closed results become faceted B-reps. Anything else is kept as a surface
/// model so no geometry is dropped.
pub struct FacetedBuilder {
    params: TessellationParams,
    mapper: CoordinateMapper,
}

/// Shared point list being filled face by face.
#[derive(Default)]
struct Sewing {
    cache: PointCache<usize>,
    points: Vec<Point3>,
}

impl Sewing {
    fn index(&mut self, p: &Point3) -> usize {
        let next = self.points.len();
        let index = self.cache.get_or_insert_with(p, || next);
        if index == next {
            self.points.push(*p);
        }
        index
    }

    fn triangle(&mut self, corners: &[Point3; 3]) -> Option<[usize; 3]> {
        let tri = corners.map(|p| self.index(&p));
        (tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0]).then_some(tri)
    }
}

impl FacetedBuilder {
    #[must_use]
    pub fn new(options: &ExportOptions) -> Self {
        Self {
            params: options.tessellation_level.params(),
            mapper: CoordinateMapper::identity(),
        }
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: CoordinateMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Faces that cannot be triangulated are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RepresentationError::Empty`] when no face yields a facet.
    pub fn execute_solid(&self, store: &TopologyStore, solid: SolidId) -> Result<RepresentationItem> {
        let mut sewing = Sewing::default();
        let mut faces = Vec::new();
        for face in store.solid_faces(solid)? {
            let mesh = match TessellateFace::new(face, self.params).execute(store) {
                Ok(mesh) => mesh,
                Err(err) => {
                    warn!(%err, "skipping face that cannot be triangulated");
                    continue;
                }
            };
            let triangles: Vec<[usize; 3]> = mesh.triangles().filter_map(|t| sewing.triangle(&t)).collect();
            let merged = PlanarFacetMerger::new(&sewing.points, &triangles).execute();
            trace!(triangles = triangles.len(), facets = merged.len(), "faceted face");
            faces.extend(merged);
        }
        let item = self.finish(sewing.points, faces)?;
        if matches!(item, RepresentationItem::SurfaceModel(_)) {
            warn!("solid does not close after faceting; emitting a surface model");
        }
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns [`RepresentationError::Empty`] when every triangle collapses.
    pub fn execute_mesh(&self, mesh: &Mesh) -> Result<RepresentationItem> {
        let mut sewing = Sewing::default();
        let triangles: Vec<[usize; 3]> = mesh.triangles.iter().filter_map(|t| sewing.triangle(t)).collect();
        let faces = PlanarFacetMerger::new(&sewing.points, &triangles).execute();
        self.finish(sewing.points, faces)
    }

    /// Wraps an already faceted shell, such as an optimized revolution.
    #[must_use]
    pub fn classify(shell: FacetedShell) -> RepresentationItem {
        if validate_closed_shell(&shell.faces) {
            RepresentationItem::FacetedBrep(shell)
        } else {
            RepresentationItem::SurfaceModel(shell)
        }
    }

    fn finish(&self, points: Vec<Point3>, faces: Vec<FaceLoops>) -> Result<RepresentationItem> {
        if faces.is_empty() {
            return Err(RepresentationError::Empty.into());
        }
        let shell = FacetedShell {
            points: points.iter().map(|p| self.mapper.point(p)).collect(),
            faces,
        };
        let item = Self::classify(shell);
        debug!(closed = matches!(item, RepresentationItem::FacetedBrep(_)), "faceted item");
        Ok(item)
    }
}
