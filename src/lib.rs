pub mod error;
pub mod export;
pub mod geometry;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod tessellation;
pub mod topology;

pub use error::{Result, ShapeRepError};
