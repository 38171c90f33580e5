use crate::error::Result;
use crate::tessellation::{TessellateFace, TessellateSolid, TessellationParams};
use crate::topology::{FaceId, SolidId, TopologyStore};

/// Computes the total surface area of a solid.
///
/// Uses tessellation to approximate the area by summing the areas of all
/// triangles in the mesh. The accuracy depends on the tessellation parameters.
pub struct Area {
    solid: SolidId,
    params: TessellationParams,
}

impl Area {
    /// Creates a new `Area` query with default tessellation parameters.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    /// Sets custom tessellation parameters for higher accuracy.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query, returning the total surface area.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        Ok(TessellateSolid::new(self.solid, self.params).execute(store)?.area())
    }
}

/// Computes the area of a single face from its tessellation.
pub struct FaceArea {
    face: FaceId,
    params: TessellationParams,
}

impl FaceArea {
    /// Creates a new `FaceArea` query with default tessellation parameters.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self {
            face,
            params: TessellationParams::default(),
        }
    }

    /// Sets custom tessellation parameters.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query, returning the face area.
    ///
    /// # Errors
    ///
    /// Returns an error if the face cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        Ok(TessellateFace::new(self.face, self.params).execute(store)?.area())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::{MakeBox, MakeCylinder};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn box_area() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(2.0, 3.0, 4.0))
            .execute(&mut store)
            .unwrap();
        let area = Area::new(solid).execute(&store).unwrap();
        assert_relative_eq!(area, 52.0, epsilon = 1e-9);
    }

    #[test]
    fn cylinder_area() {
        let mut store = TopologyStore::new();
        let solid = MakeCylinder::new(Point3::origin(), 2.0, Vector3::z(), 5.0)
            .execute(&mut store)
            .unwrap();
        let area = Area::new(solid).execute(&store).unwrap();
        let expected = 28.0 * PI;
        assert!((area - expected).abs() < expected * 0.02, "expected ~{expected:.2}, got {area:.2}");
    }

    #[test]
    fn face_areas_sum_to_solid_area() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        let total: f64 = store
            .solid_faces(solid)
            .unwrap()
            .into_iter()
            .map(|f| FaceArea::new(f).execute(&store).unwrap())
            .sum();
        assert_relative_eq!(total, 22.0, epsilon = 1e-9);
    }
}
