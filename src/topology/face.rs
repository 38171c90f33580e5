pub use crate::geometry::surface::SurfaceKind as FaceSurface;

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// Identifier of a material assigned by the host model.
///
/// Ordering follows the numeric id, which is what tie-breaks use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u64);

/// Data associated with a topological face.
///
/// A face is a bounded region on a surface, defined by an outer wire
/// and optionally inner wires (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The geometric surface on which this face lies.
    pub surface: FaceSurface,
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// If `true`, the outward face normal agrees with the surface normal.
    pub same_sense: bool,
    /// Material painted on this face, if any.
    pub material: Option<MaterialId>,
}

impl FaceData {
    /// Creates a face with no holes and no material.
    #[must_use]
    pub fn new(surface: FaceSurface, outer_wire: WireId, same_sense: bool) -> Self {
        Self {
            surface,
            outer_wire,
            inner_wires: Vec::new(),
            same_sense,
            material: None,
        }
    }

    /// Outer wire followed by the inner wires.
    pub fn wires(&self) -> impl Iterator<Item = WireId> + '_ {
        std::iter::once(self.outer_wire).chain(self.inner_wires.iter().copied())
    }
}
