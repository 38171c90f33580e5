//! Unconnected triangle meshes.

use crate::math::polygon_3d::triangle_area;
use crate::math::Point3;
use crate::topology::MaterialId;

/// A triangle soup with an optional material.
///
/// No adjacency is implied: neighbouring triangles may repeat their shared
/// corner positions, and nothing guarantees a closed surface.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Corner positions of each triangle, counter-clockwise seen from the
    /// front side.
    pub triangles: Vec<[Point3; 3]>,
    /// Material carried by every triangle.
    pub material: Option<MaterialId>,
}

impl Mesh {
    /// Creates a mesh without material.
    #[must_use]
    pub fn new(triangles: Vec<[Point3; 3]>) -> Self {
        Self {
            triangles,
            material: None,
        }
    }

    /// Sets the mesh material.
    #[must_use]
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Total triangle area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.triangles.iter().map(|[a, b, c]| triangle_area(a, b, c)).sum()
    }
}
