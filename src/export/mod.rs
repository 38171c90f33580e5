//! Conversion of solids and meshes into exchange-format representations.
//!
//! [`RepresentationSelector`] drives the conversion: each geometry item is
//! offered to the extrusion, swept-solid, advanced B-rep, tessellation and
//! faceted strategies in that order, and the first one that succeeds wins.

pub mod advanced_brep;
pub mod classify;
pub mod closed_shell;
pub mod collaborators;
pub mod extrusion;
pub mod facet_merge;
pub mod faceted;
pub mod mapper;
pub mod material;
pub mod options;
pub mod representation;
pub mod selector;
pub mod swept;
pub mod tessellated;

pub use advanced_brep::AdvancedBRepBuilder;
pub use classify::{ClassifiedSurface, SurfaceClassification, SurfaceClassifier};
pub use closed_shell::{validate_closed_shell, FaceLoops};
pub use collaborators::{
    ElementColor, GroupKey, GroupedGeometryCache, PlacementService, StructuralMaterialLookup, StyleRegistry,
};
pub use extrusion::{ExtrusionAnalysis, ExtrusionAnalyzer};
pub use facet_merge::PlanarFacetMerger;
pub use faceted::FacetedBuilder;
pub use mapper::CoordinateMapper;
pub use material::MaterialResolver;
pub use options::{ExportOptions, FormatCapabilities, TessellationLevel};
pub use representation::{RepresentationItem, RepresentationResult, ShapeKind};
pub use selector::RepresentationSelector;
pub use swept::{SweptAnalysis, SweptAnalyzer};
pub use tessellated::TessellationBuilder;

use crate::mesh::Mesh;
use crate::topology::SolidId;

/// One piece of input geometry.
#[derive(Debug, Clone)]
pub enum GeometryItem {
    /// A B-rep solid in the topology store.
    Solid(SolidId),
    /// An unconnected triangle mesh.
    Mesh(Mesh),
}
