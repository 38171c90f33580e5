//! Picks the single material representing a geometry collection.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::operations::query::FaceArea;
use crate::tessellation::TessellationParams;
use crate::topology::{MaterialId, TopologyStore};

use super::collaborators::StructuralMaterialLookup;
use super::GeometryItem;

/// Relative tolerance under which two material areas count as equal.
pub const AREA_TOLERANCE: f64 = 1e-6;

/// Resolves the material of a geometry collection.
///
/// An explicit override wins. Otherwise the geometry decides (see
/// [`best_material_from_geometry`]); when it yields nothing, the owning
/// element's structural material is used.
pub struct MaterialResolver<'a> {
    items: &'a [GeometryItem],
    override_material: Option<MaterialId>,
}

impl<'a> MaterialResolver<'a> {
    #[must_use]
    pub fn new(items: &'a [GeometryItem]) -> Self {
        Self {
            items,
            override_material: None,
        }
    }

    #[must_use]
    pub fn with_override(mut self, material: Option<MaterialId>) -> Self {
        self.override_material = material;
        self
    }

    pub fn execute(&self, store: &TopologyStore, lookup: &dyn StructuralMaterialLookup) -> Option<MaterialId> {
        if let Some(m) = self.override_material {
            return Some(m);
        }
        best_material_from_geometry(store, self.items).or_else(|| lookup.structural_material())
    }
}

/// Material carried by the geometry itself, or `None` when it is absent or
/// mixed.
///
/// A mesh material is the candidate when present; it survives only if no
/// other mesh or solid face disagrees. Without mesh materials, the solid
/// face material with the largest total area wins and ties go to the lower
/// id. Faces whose area cannot be computed are ignored.
#[must_use]
pub fn best_material_from_geometry(store: &TopologyStore, items: &[GeometryItem]) -> Option<MaterialId> {
    let mut candidate = None;
    for item in items {
        let GeometryItem::Mesh(mesh) = item else {
            continue;
        };
        match (candidate, mesh.material) {
            (None, Some(m)) => candidate = Some(m),
            (Some(c), Some(m)) if c != m => {
                debug!(first = c.0, second = m.0, "meshes carry different materials");
                return None;
            }
            _ => {}
        }
    }

    let areas = face_areas(store, items);
    match candidate {
        Some(c) => {
            if let Some((other, _)) = areas.iter().find(|&(&m, &a)| m != c && a > 0.0) {
                debug!(mesh = c.0, face = other.0, "mesh material conflicts with a face material");
                return None;
            }
            Some(c)
        }
        None => dominant(&areas),
    }
}

/// Total face area per material over every solid item.
fn face_areas(store: &TopologyStore, items: &[GeometryItem]) -> BTreeMap<MaterialId, f64> {
    let params = TessellationParams::default();
    let mut areas = BTreeMap::new();
    for item in items {
        let GeometryItem::Solid(solid) = item else {
            continue;
        };
        let faces = match store.solid_faces(*solid) {
            Ok(faces) => faces,
            Err(err) => {
                debug!(%err, "skipping solid without faces");
                continue;
            }
        };
        for face in faces {
            let Some(material) = store.face(face).ok().and_then(|f| f.material) else {
                continue;
            };
            match FaceArea::new(face).with_params(params).execute(store) {
                Ok(area) => {
                    trace!(material = material.0, area, "face area");
                    *areas.entry(material).or_insert(0.0) += area;
                }
                Err(err) => debug!(%err, "ignoring face whose area cannot be computed"),
            }
        }
    }
    areas
}

/// Largest area wins; iteration in ascending id order keeps the lower id on
/// ties.
fn dominant(areas: &BTreeMap<MaterialId, f64>) -> Option<MaterialId> {
    let mut best: Option<(MaterialId, f64)> = None;
    for (&material, &area) in areas {
        match best {
            Some((_, best_area)) if area <= best_area + AREA_TOLERANCE * best_area.max(area) => {}
            _ => best = Some((material, area)),
        }
    }
    best.map(|(m, _)| m)
}
