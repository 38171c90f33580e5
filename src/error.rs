use thiserror::Error;

/// Top-level error type for shape representation building.
#[derive(Debug, Error)]
pub enum ShapeRepError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Representation(#[from] RepresentationError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("wire is not closed")]
    WireNotClosed,

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to construction operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),

    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Reasons a representation strategy does not apply to a geometry item.
///
/// The selector treats every variant as "not applicable" and moves on to
/// the next strategy.
#[derive(Debug, Error)]
pub enum RepresentationError {
    #[error("unsupported geometry: {0}")]
    Unsupported(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("shell is open: {0}")]
    OpenShell(String),

    #[error("loop sort recovered {found} loops, expected {expected}")]
    LoopCountMismatch { expected: usize, found: usize },

    #[error("{triangles} triangles exceed the budget of {limit}")]
    TooComplex { triangles: usize, limit: usize },

    #[error("strategy disabled: {0}")]
    Disabled(&'static str),

    #[error("no representable geometry")]
    Empty,
}

/// Convenience type alias for results using [`ShapeRepError`].
pub type Result<T> = std::result::Result<T, ShapeRepError>;
