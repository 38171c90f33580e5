use crate::error::{RepresentationError, Result};
use crate::math::Point3;
use crate::tessellation::{TessellateSolid, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Smallest box containing all `points`, or `None` when there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self { min: first, max: first }, |b, p| Self {
            min: b.min.inf(p),
            max: b.max.sup(p),
        }))
    }
}

/// Computes the axis-aligned bounding box of a solid.
///
/// Curved faces are bounded through their tessellation, so the box may
/// undershoot a curved surface by up to the chord tolerance.
pub struct BoundingBox {
    solid: SolidId,
    params: TessellationParams,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    /// Sets the tessellation used to bound curved faces.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated or has no faces.
    pub fn execute(&self, store: &TopologyStore) -> Result<Aabb> {
        let mesh = TessellateSolid::new(self.solid, self.params).execute(store)?;
        Aabb::from_points(&mesh.vertices).ok_or_else(|| RepresentationError::Empty.into())
    }
}
