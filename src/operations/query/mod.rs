mod area;
mod bounding_box;

pub use area::{Area, FaceArea};
pub use bounding_box::{Aabb, BoundingBox};
