//! B-spline basis evaluation and knot vector utilities.

use crate::error::{GeometryError, Result};

/// Number of control points implied by a knot vector and degree.
#[must_use]
pub fn control_point_count(knots: &[f64], degree: usize) -> usize {
    knots.len().saturating_sub(degree + 1)
}

/// Validates a clamped or unclamped knot vector for the given control point count.
///
/// # Errors
///
/// Returns an error if the knot vector length does not match
/// `control_points + degree + 1` or the knots decrease.
pub fn check_knots(knots: &[f64], degree: usize, control_points: usize) -> Result<()> {
    if degree == 0 {
        return Err(GeometryError::Degenerate("B-spline degree must be at least 1".into()).into());
    }
    if knots.len() != control_points + degree + 1 {
        return Err(GeometryError::Degenerate(format!(
            "knot vector has {} entries, expected {}",
            knots.len(),
            control_points + degree + 1
        ))
        .into());
    }
    if knots.windows(2).any(|w| w[1] < w[0]) {
        return Err(GeometryError::Degenerate("knot vector is not non-decreasing".into()).into());
    }
    Ok(())
}

/// Returns the valid parameter range `[knots[p], knots[n]]`.
#[must_use]
pub fn parameter_range(knots: &[f64], degree: usize) -> (f64, f64) {
    let n = control_point_count(knots, degree);
    (knots[degree], knots[n])
}

/// Finds the knot span index containing `t`.
///
/// `t` is clamped into the valid range first.
#[must_use]
pub fn find_span(knots: &[f64], degree: usize, t: f64) -> usize {
    let n = control_point_count(knots, degree);
    let (lo, hi) = parameter_range(knots, degree);
    let t = t.clamp(lo, hi);
    if t >= knots[n] {
        // Last non-empty span.
        let mut span = n - 1;
        while span > degree && knots[span] >= knots[span + 1] {
            span -= 1;
        }
        return span;
    }
    let mut low = degree;
    let mut high = n;
    let mut mid = (low + high) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Computes the `degree + 1` non-zero basis functions at `t` in `span`.
#[must_use]
pub fn basis_functions(knots: &[f64], degree: usize, span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;
    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < f64::EPSILON {
                0.0
            } else {
                n[r] / denom
            };
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}

/// Run-length encodes a knot vector into distinct values and multiplicities.
///
/// Knots closer than `tolerance` are treated as repeats of the first.
#[must_use]
pub fn compress_knots(knots: &[f64], tolerance: f64) -> (Vec<f64>, Vec<usize>) {
    let mut values: Vec<f64> = Vec::new();
    let mut multiplicities: Vec<usize> = Vec::new();
    for &k in knots {
        match values.last() {
            Some(&last) if (k - last).abs() <= tolerance => {
                if let Some(m) = multiplicities.last_mut() {
                    *m += 1;
                }
            }
            _ => {
                values.push(k);
                multiplicities.push(1);
            }
        }
    }
    (values, multiplicities)
}

/// Expands distinct knot values and multiplicities into a full knot vector.
#[must_use]
pub fn expand_knots(values: &[f64], multiplicities: &[usize]) -> Vec<f64> {
    values
        .iter()
        .zip(multiplicities)
        .flat_map(|(&k, &m)| std::iter::repeat_n(k, m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBIC_BEZIER: [f64; 8] = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

    #[test]
    fn basis_partition_of_unity() {
        let knots = [0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        for &t in &[0.0, 0.2, 0.5, 0.7, 1.0] {
            let span = find_span(&knots, 2, t);
            let sum: f64 = basis_functions(&knots, 2, span, t).iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at {t} = {sum}");
        }
    }

    #[test]
    fn span_at_end_is_last_non_empty() {
        assert_eq!(find_span(&CUBIC_BEZIER, 3, 1.0), 3);
        assert_eq!(find_span(&CUBIC_BEZIER, 3, 0.0), 3);
    }

    #[test]
    fn compress_and_expand() {
        let (values, mults) = compress_knots(&CUBIC_BEZIER, 1e-12);
        assert_eq!(values, vec![0.0, 1.0]);
        assert_eq!(mults, vec![4, 4]);
        assert_eq!(expand_knots(&values, &mults), CUBIC_BEZIER.to_vec());
    }

    #[test]
    fn knot_count_mismatch_is_rejected() {
        assert!(check_knots(&CUBIC_BEZIER, 3, 4).is_ok());
        assert!(check_knots(&CUBIC_BEZIER, 3, 5).is_err());
    }
}
