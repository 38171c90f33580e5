pub mod fuzzy;
pub mod polygon_3d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance below which two model points are treated as the same vertex.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Tolerance for comparing unit directions (component-wise).
pub const ANGLE_TOLERANCE: f64 = 1e-6;

/// Returns a unit vector perpendicular to `v`.
///
/// `v` does not need to be normalized, but must be non-zero.
#[must_use]
pub fn any_perpendicular(v: &Vector3) -> Vector3 {
    let reference = if v.x.abs() < 0.9 * v.norm() {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&reference).normalize()
}

/// Normalizes `v`, returning `None` when it is too short to carry a direction.
#[must_use]
pub fn try_normalize(v: &Vector3) -> Option<Vector3> {
    let len = v.norm();
    (len > TOLERANCE).then(|| v / len)
}

/// Returns `true` if two unit directions are parallel (either sense).
#[must_use]
pub fn parallel(a: &Vector3, b: &Vector3) -> bool {
    a.cross(b).norm() < ANGLE_TOLERANCE * 10.0
}
