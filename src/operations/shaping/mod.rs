mod extrude;
mod revolve;

pub use extrude::Extrude;
pub(crate) use extrude::build_prism;
pub use revolve::Revolve;
