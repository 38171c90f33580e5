//! Strategy selection for one geometry collection.

use tracing::{debug, trace};

use crate::error::{RepresentationError, Result};
use crate::math::Vector3;
use crate::mesh::Mesh;
use crate::topology::{MaterialId, SolidId, TopologyStore};

use super::advanced_brep::AdvancedBRepBuilder;
use super::collaborators::{
    ElementColor, GroupKey, GroupedGeometryCache, NoStructuralMaterial, PlacementService, StructuralMaterialLookup,
    StyleRegistry,
};
use super::extrusion::ExtrusionAnalyzer;
use super::faceted::FacetedBuilder;
use super::mapper::CoordinateMapper;
use super::material::MaterialResolver;
use super::options::{ExportOptions, TessellationLevel};
use super::representation::{
    ExtrusionMetrics, Footprint, Frame, MaterialAssociation, RepresentationItem, RepresentationResult, ShapeKind,
};
use super::swept::SweptAnalyzer;
use super::tessellated::TessellationBuilder;
use super::GeometryItem;

/// Distance from the world origin beyond which placement bounds trigger an
/// offset transform.
pub const OFFSET_THRESHOLD: f64 = 1000.0;

/// Converts a geometry collection into the best representation the target
/// format and options allow.
///
/// Each item runs through the strategies in order and keeps the first
/// result. An item that no strategy accepts is dropped; the rest are kept
/// in input order.
pub struct RepresentationSelector<'a> {
    store: &'a TopologyStore,
    options: ExportOptions,
    hint: Option<Frame>,
    styles: Option<&'a mut dyn StyleRegistry>,
    placement: Option<&'a dyn PlacementService>,
    group: Option<(&'a mut dyn GroupedGeometryCache, GroupKey)>,
    color: ElementColor,
    material_override: Option<MaterialId>,
    structural: &'a dyn StructuralMaterialLookup,
}

/// Output of the strategy chain for one item.
struct Built {
    item: RepresentationItem,
    metrics: Option<ExtrusionMetrics>,
    footprint: Option<Footprint>,
}

impl Built {
    fn plain(item: RepresentationItem) -> Self {
        Self {
            item,
            metrics: None,
            footprint: None,
        }
    }
}

/// Fails with [`RepresentationError::Disabled`] unless `enabled`.
fn gate(enabled: bool, strategy: &'static str) -> Result<()> {
    if enabled {
        Ok(())
    } else {
        Err(RepresentationError::Disabled(strategy).into())
    }
}

/// Keeps a strategy's output, logging why it was not applicable otherwise.
fn attempt<T>(strategy: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => {
            trace!(strategy, "strategy succeeded");
            Some(value)
        }
        Err(err) => {
            debug!(strategy, %err, "strategy not applicable");
            None
        }
    }
}

impl<'a> RepresentationSelector<'a> {
    #[must_use]
    pub fn new(store: &'a TopologyStore, options: ExportOptions) -> Self {
        Self {
            store,
            options,
            hint: None,
            styles: None,
            placement: None,
            group: None,
            color: ElementColor::default(),
            material_override: None,
            structural: &NoStructuralMaterial,
        }
    }

    /// Frame whose Z axis is the preferred extrusion direction.
    #[must_use]
    pub fn with_extrusion_hint(mut self, frame: Frame) -> Self {
        self.hint = Some(frame);
        self
    }

    #[must_use]
    pub fn with_styles(mut self, styles: &'a mut dyn StyleRegistry) -> Self {
        self.styles = Some(styles);
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: &'a dyn PlacementService) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Consulted only when mapped geometry is allowed.
    #[must_use]
    pub fn with_group_cache(mut self, cache: &'a mut dyn GroupedGeometryCache, key: GroupKey) -> Self {
        self.group = Some((cache, key));
        self
    }

    #[must_use]
    pub fn with_element_color(mut self, color: ElementColor) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_material_override(mut self, material: Option<MaterialId>) -> Self {
        self.material_override = material;
        self
    }

    #[must_use]
    pub fn with_structural_lookup(mut self, lookup: &'a dyn StructuralMaterialLookup) -> Self {
        self.structural = lookup;
        self
    }

    /// # Errors
    ///
    /// Returns [`RepresentationError::Empty`] when `items` is empty or no
    /// item yields any geometry.
    pub fn build(&mut self, items: &[GeometryItem]) -> Result<RepresentationResult> {
        if items.is_empty() {
            return Err(RepresentationError::Empty.into());
        }
        if self.options.allow_mapped_geometry {
            if let Some((cache, key)) = &self.group {
                if let Some(cached) = cache.lookup(key) {
                    debug!(group = %key.group_type, member = key.member_index, "reusing grouped representation");
                    return Ok(cached);
                }
            }
        }

        let offset = self.offset();
        let mapper = CoordinateMapper::new(self.options.scale, offset.unwrap_or_else(Vector3::zeros));
        let mut built = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let result = match item {
                GeometryItem::Solid(solid) => self.solid(*solid, items.len(), mapper),
                GeometryItem::Mesh(mesh) => self.mesh_item(mesh, mapper),
            };
            match result {
                Some(b) => built.push(b),
                None => debug!(index, "no strategy accepted the item"),
            }
        }
        if built.is_empty() {
            return Err(RepresentationError::Empty.into());
        }

        // A surface model cannot sit next to closed shells; reopen them.
        if built.iter().any(|b| matches!(b.item, RepresentationItem::SurfaceModel(_))) {
            for b in &mut built {
                if let RepresentationItem::FacetedBrep(shell) = &b.item {
                    b.item = RepresentationItem::SurfaceModel(shell.clone());
                }
            }
        }

        let extrusion_metrics = built.iter().filter_map(|b| b.metrics).collect();
        let footprint = built.iter().find_map(|b| b.footprint.clone());
        let items_out: Vec<RepresentationItem> = built.into_iter().map(|b| b.item).collect();
        let shape_kind = ShapeKind::of(&items_out).ok_or(RepresentationError::Empty)?;
        let materials = self.materials(items, items_out.len());
        debug!(?shape_kind, items = items_out.len(), "built representation");

        let result = RepresentationResult {
            items: items_out,
            shape_kind,
            materials,
            footprint,
            offset,
            extrusion_metrics,
        };
        if self.options.allow_mapped_geometry {
            if let Some((cache, key)) = &mut self.group {
                cache.store(key.clone(), &result);
            }
        }
        Ok(result)
    }

    /// Translation applied before scaling, when placement bounds are far
    /// from the origin.
    fn offset(&self) -> Option<Vector3> {
        if !self.options.allow_offset_transform {
            return None;
        }
        let bounds = self.placement?.bounding_box()?;
        (bounds.min.coords.norm() > OFFSET_THRESHOLD).then_some(bounds.min.coords)
    }

    fn solid(&self, solid: SolidId, count: usize, mapper: CoordinateMapper) -> Option<Built> {
        let options = &self.options;
        let caps = &options.capabilities;
        let store = self.store;

        let extrusion = gate(options.allow_extrusion && !caps.reference_view, "extrusion").and_then(|()| {
            let mut analyzer = ExtrusionAnalyzer::new(solid).with_mapper(mapper);
            if let (Some(frame), 1) = (&self.hint, count) {
                analyzer = analyzer.with_hint(frame);
            }
            analyzer.execute(store)
        });
        if let Some(a) = attempt("extrusion", extrusion) {
            return Some(Built {
                item: RepresentationItem::Extrusion(a.solid),
                metrics: Some(a.metrics),
                footprint: a.footprint,
            });
        }

        let swept_output = options.allow_swept_solid && caps.swept_solid;
        let coarse = options.tessellation_level == TessellationLevel::Coarse;
        let params = options.tessellation_level.params();
        let swept = gate((swept_output || coarse) && !caps.reference_view, "swept solid").and_then(|()| {
            let analysis = SweptAnalyzer::new(solid)
                .with_mapper(mapper)
                .with_params(params)
                .execute(store)?;
            if swept_output {
                Ok(RepresentationItem::Revolution(analysis.solid))
            } else {
                Ok(FacetedBuilder::classify(analysis.faceted(store, &params)?))
            }
        });
        if let Some(item) = attempt("swept solid", swept) {
            return Some(Built::plain(item));
        }

        let advanced = gate(caps.advanced_brep && !caps.reference_view, "advanced brep")
            .and_then(|()| AdvancedBRepBuilder::new(solid).with_mapper(mapper).execute(store));
        if let Some(brep) = attempt("advanced brep", advanced) {
            return Some(Built::plain(RepresentationItem::AdvancedBrep(brep)));
        }

        let tessellated = gate(caps.prefers_tessellation(), "tessellation").and_then(|()| {
            TessellationBuilder::new(options)
                .with_mapper(mapper)
                .execute_solid(store, solid, &self.color)
        });
        if let Some(item) = attempt("tessellation", tessellated) {
            return Some(Built::plain(item));
        }

        let faceted = FacetedBuilder::new(options).with_mapper(mapper).execute_solid(store, solid);
        attempt("faceted", faceted).map(Built::plain)
    }

    fn mesh_item(&self, mesh: &Mesh, mapper: CoordinateMapper) -> Option<Built> {
        let tessellated = gate(self.options.capabilities.prefers_tessellation(), "tessellation").and_then(|()| {
            TessellationBuilder::new(&self.options)
                .with_mapper(mapper)
                .execute_mesh(mesh, &self.color)
        });
        if let Some(item) = attempt("tessellation", tessellated) {
            return Some(Built::plain(item));
        }
        let faceted = FacetedBuilder::new(&self.options).with_mapper(mapper).execute_mesh(mesh);
        attempt("faceted", faceted).map(Built::plain)
    }

    /// One association per output item, all carrying the collection's
    /// material. The style is requested once.
    fn materials(&mut self, items: &[GeometryItem], count: usize) -> Vec<MaterialAssociation> {
        let Some(material) = MaterialResolver::new(items)
            .with_override(self.material_override)
            .execute(self.store, self.structural)
        else {
            return Vec::new();
        };
        let style = self.styles.as_mut().and_then(|s| s.style_for(material));
        (0..count)
            .map(|item| MaterialAssociation { material, item, style })
            .collect()
    }
}
