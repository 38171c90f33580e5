pub mod curve;
pub mod nurbs;
pub mod surface;

pub use curve::{Arc, Curve, CurveDomain, CurveKind, Ellipse, Helix, Line, NurbsCurve};
pub use surface::{Cone, Cylinder, NurbsSurface, Plane, RevolutionSurface, RuledSurface, Surface, SurfaceDomain, SurfaceKind};
