//! World-to-output coordinate mapping.

use crate::error::{RepresentationError, Result};
use crate::geometry::nurbs::compress_knots;
use crate::geometry::CurveKind;
use crate::math::{Point3, Vector3, TOLERANCE};

use super::representation::{BSplineCurveData, CurveGeometry, TrimmedCurve};

/// Applies the export's offset and scale to coordinates.
///
/// `output = (world - offset) * scale`. Directions are unaffected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    scale: f64,
    offset: Vector3,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordinateMapper {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset: Vector3::zeros(),
        }
    }

    #[must_use]
    pub fn new(scale: f64, offset: Vector3) -> Self {
        Self { scale, offset }
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn offset(&self) -> &Vector3 {
        &self.offset
    }

    #[must_use]
    pub fn point(&self, p: &Point3) -> Point3 {
        Point3::from((p - self.offset).coords * self.scale)
    }

    #[must_use]
    pub fn length(&self, l: f64) -> f64 {
        l * self.scale
    }

    /// Output form of `curve` restricted to `[t0, t1]`.
    ///
    /// # Errors
    ///
    /// Returns [`RepresentationError::Unsupported`] for helices.
    pub fn trimmed_curve(&self, curve: &CurveKind, t0: f64, t1: f64) -> Result<TrimmedCurve> {
        let (basis, range) = match curve {
            CurveKind::Line(line) => (
                CurveGeometry::Line {
                    origin: self.point(line.origin()),
                    direction: *line.direction(),
                },
                (self.length(t0), self.length(t1)),
            ),
            CurveKind::Arc(arc) => (
                CurveGeometry::Circle {
                    center: self.point(arc.center()),
                    axis: *arc.normal(),
                    ref_dir: *arc.ref_dir(),
                    radius: self.length(arc.radius()),
                },
                (t0, t1),
            ),
            CurveKind::Ellipse(e) => (
                CurveGeometry::Ellipse {
                    center: self.point(e.center()),
                    axis: *e.normal(),
                    major_dir: *e.major_dir(),
                    semi_major: self.length(e.semi_major()),
                    semi_minor: self.length(e.semi_minor()),
                },
                (t0, t1),
            ),
            CurveKind::Nurbs(c) => {
                let (knots, multiplicities) = compress_knots(c.knots(), TOLERANCE);
                (
                    CurveGeometry::BSpline(BSplineCurveData {
                        degree: c.degree(),
                        control_points: c.control_points().iter().map(|p| self.point(p)).collect(),
                        weights: c.weights().map(<[f64]>::to_vec),
                        knots,
                        multiplicities,
                    }),
                    (t0, t1),
                )
            }
            CurveKind::Helix(_) => {
                return Err(RepresentationError::Unsupported("helix curves have no bounded form".into()).into())
            }
        };
        Ok(TrimmedCurve { basis, range })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Helix, Line};

    #[test]
    fn points_are_offset_then_scaled() {
        let m = CoordinateMapper::new(1000.0, Vector3::new(10.0, 0.0, 0.0));
        let p = m.point(&Point3::new(10.5, 1.0, 0.0));
        assert!((p - Point3::new(500.0, 1000.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn line_ranges_scale_with_lengths() {
        let m = CoordinateMapper::new(2.0, Vector3::zeros());
        let line = Line::through(Point3::origin(), Point3::new(3.0, 0.0, 0.0)).unwrap();
        let t = m.trimmed_curve(&CurveKind::Line(line), 0.0, 3.0).unwrap();
        assert_eq!(t.range, (0.0, 6.0));
    }

    #[test]
    fn helix_is_unsupported() {
        let helix = Helix::new(Point3::origin(), Vector3::z(), Vector3::x(), 1.0, 0.5).unwrap();
        let err = CoordinateMapper::identity()
            .trimmed_curve(&CurveKind::Helix(helix), 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ShapeRepError::Representation(RepresentationError::Unsupported(_))
        ));
    }
}
