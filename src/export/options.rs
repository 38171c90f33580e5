//! Export configuration.

use crate::tessellation::TessellationParams;

/// Detail level for every tessellated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TessellationLevel {
    /// Few triangles; favours compact output over fidelity.
    Coarse,
    #[default]
    Medium,
    Fine,
}

impl TessellationLevel {
    /// Curve and surface sampling for this level.
    #[must_use]
    pub fn params(self) -> TessellationParams {
        match self {
            Self::Coarse => TessellationParams::default().with_tolerance(0.05).with_segments(4, 24),
            Self::Medium => TessellationParams::default().with_tolerance(0.01).with_segments(6, 72),
            Self::Fine => TessellationParams::default().with_tolerance(0.002).with_segments(8, 256),
        }
    }

    /// Largest number of triangles a single-shell solid may be sewn from.
    #[must_use]
    pub fn triangle_budget(self) -> usize {
        match self {
            Self::Coarse => 5_000,
            Self::Medium => 20_000,
            Self::Fine => 50_000,
        }
    }
}

/// What the target exchange format can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FormatCapabilities {
    /// Faces with analytic or spline surfaces.
    pub advanced_brep: bool,
    /// Triangulated face sets.
    pub tessellation: bool,
    /// Polygonal face sets (merged coplanar triangles).
    pub polygonal_face_set: bool,
    /// Only reference-view geometry may be written; implies tessellation.
    pub reference_view: bool,
    /// Revolved area solids.
    pub swept_solid: bool,
}

impl FormatCapabilities {
    /// A format supporting every representation kind.
    #[must_use]
    pub fn ifc4() -> Self {
        Self {
            advanced_brep: true,
            tessellation: true,
            polygonal_face_set: true,
            reference_view: false,
            swept_solid: true,
        }
    }

    /// An older format limited to faceted geometry and simple sweeps.
    #[must_use]
    pub fn ifc2x3() -> Self {
        Self {
            advanced_brep: false,
            tessellation: false,
            polygonal_face_set: false,
            reference_view: false,
            swept_solid: true,
        }
    }

    /// A view restricted to tessellated geometry.
    #[must_use]
    pub fn reference_view() -> Self {
        Self {
            advanced_brep: false,
            tessellation: true,
            polygonal_face_set: true,
            reference_view: true,
            swept_solid: false,
        }
    }

    /// A format that carries geometry only as triangulated face sets.
    #[must_use]
    pub fn triangulated() -> Self {
        Self {
            advanced_brep: false,
            tessellation: true,
            polygonal_face_set: false,
            reference_view: false,
            swept_solid: false,
        }
    }

    /// Whether tessellation should be tried before the faceted fallback.
    #[must_use]
    pub fn prefers_tessellation(&self) -> bool {
        self.tessellation && (self.reference_view || !self.advanced_brep)
    }
}

impl Default for FormatCapabilities {
    fn default() -> Self {
        Self::ifc4()
    }
}

/// Options for one geometry-to-representation conversion.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportOptions {
    pub tessellation_level: TessellationLevel,
    pub allow_extrusion: bool,
    pub allow_swept_solid: bool,
    pub allow_offset_transform: bool,
    pub allow_mapped_geometry: bool,
    pub capabilities: FormatCapabilities,
    /// Factor applied to every output coordinate.
    pub scale: f64,
    /// Replaces the level's triangle budget when set.
    pub triangle_budget: Option<usize>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            tessellation_level: TessellationLevel::default(),
            allow_extrusion: true,
            allow_swept_solid: true,
            allow_offset_transform: true,
            allow_mapped_geometry: false,
            capabilities: FormatCapabilities::default(),
            scale: 1.0,
            triangle_budget: None,
        }
    }
}

impl ExportOptions {
    #[must_use]
    pub fn with_tessellation_level(mut self, level: TessellationLevel) -> Self {
        self.tessellation_level = level;
        self
    }

    #[must_use]
    pub fn with_extrusion(mut self, allow: bool) -> Self {
        self.allow_extrusion = allow;
        self
    }

    #[must_use]
    pub fn with_swept_solid(mut self, allow: bool) -> Self {
        self.allow_swept_solid = allow;
        self
    }

    #[must_use]
    pub fn with_offset_transform(mut self, allow: bool) -> Self {
        self.allow_offset_transform = allow;
        self
    }

    #[must_use]
    pub fn with_mapped_geometry(mut self, allow: bool) -> Self {
        self.allow_mapped_geometry = allow;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: FormatCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_triangle_budget(mut self, budget: usize) -> Self {
        self.triangle_budget = Some(budget);
        self
    }

    /// Triangle limit for a single-shell solid under these options.
    #[must_use]
    pub fn triangle_budget(&self) -> usize {
        self.triangle_budget
            .unwrap_or_else(|| self.tessellation_level.triangle_budget())
    }
}
