//! Interfaces to services owned by the surrounding exporter.
//!
//! Everything here outlives a single conversion; the core only borrows it
//! for the duration of one call.

use crate::operations::query::Aabb;
use crate::topology::MaterialId;

use super::representation::{Color, RepresentationResult, StyleHandle};

/// Fallback material of the owning element when geometry carries none.
pub trait StructuralMaterialLookup {
    fn structural_material(&self) -> Option<MaterialId>;
}

impl<F> StructuralMaterialLookup for F
where
    F: Fn() -> Option<MaterialId>,
{
    fn structural_material(&self) -> Option<MaterialId> {
        self()
    }
}

/// Lookup that never finds a material.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStructuralMaterial;

impl StructuralMaterialLookup for NoStructuralMaterial {
    fn structural_material(&self) -> Option<MaterialId> {
        None
    }
}

/// Visual styles keyed by material.
///
/// Implementations create a style on first request and return the same
/// handle for every later request with the same material.
pub trait StyleRegistry {
    fn style_for(&mut self, material: MaterialId) -> Option<StyleHandle>;
}

/// Placement information of the element being exported.
pub trait PlacementService {
    /// World-space bounds of the element, if known.
    fn bounding_box(&self) -> Option<Aabb>;
}

/// Identifies one member of a group of repeated instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub group_type: String,
    pub member_index: usize,
}

/// Cache of representations shared between repeated instances.
pub trait GroupedGeometryCache {
    fn lookup(&self, key: &GroupKey) -> Option<RepresentationResult>;
    fn store(&mut self, key: GroupKey, result: &RepresentationResult);
}

/// Colours available on the exported element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementColor {
    pub material: Option<Color>,
    pub surface_pattern: Option<Color>,
    pub cut_pattern: Option<Color>,
}

impl ElementColor {
    /// The dominant colour: material, then surface pattern, then cut
    /// pattern, else opaque white.
    #[must_use]
    pub fn resolve(&self) -> Color {
        self.material
            .or(self.surface_pattern)
            .or(self.cut_pattern)
            .unwrap_or(Color::WHITE)
    }
}
