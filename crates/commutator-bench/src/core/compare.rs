//! Deviation between two batches.

use crate::error::{Error, Result};
use crate::types::{Real, SigmaBatch};

/// Largest elementwise complex magnitude of `actual − expected`.
///
/// Both batches must have the same extents and layout; the comparison walks
/// the raw storage pairwise, so any common layout works.
pub fn compare_batches(actual: &SigmaBatch, expected: &SigmaBatch) -> Result<Real> {
    actual.check_same_extents(expected)?;
    if actual.layout() != expected.layout() {
        return Err(Error::Shape(format!(
            "cannot compare {} against {} batch",
            actual.layout(),
            expected.layout()
        )));
    }

    let dim = actual.dim();
    let layout = actual.layout();
    let a = actual.as_slice();
    let e = expected.as_slice();

    let mut deviation: Real = 0.0;
    for p in 0..actual.num() {
        for i in 0..dim {
            for j in 0..dim {
                let re = layout.real(dim, p, i, j);
                let im = layout.imag(dim, p, i, j);
                let d = (a[re] - e[re]).hypot(a[im] - e[im]);
                // NaN must not vanish in the max
                if d.is_nan() {
                    return Ok(Real::NAN);
                }
                deviation = deviation.max(d);
            }
        }
    }
    Ok(deviation)
}

/// Relative deviation two correct kernels may show on `dim × dim` matrices
/// at the precision of [`Real`].
///
/// Each output entry sums `4·dim` products in a kernel-specific order, so
/// the rounding bound grows with `dim`. Multiply by the output magnitude
/// (at least one) to get an absolute bound.
pub fn relative_tolerance(dim: usize) -> Real {
    64.0 * dim.max(1) as Real * Real::EPSILON
}

/// Largest entry magnitude in a batch; useful to turn a deviation into a
/// relative figure.
pub fn max_magnitude(batch: &SigmaBatch) -> Real {
    batch
        .to_complex_aos()
        .iter()
        .map(|c| c.norm())
        .fold(0.0, Real::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Complex;

    #[test]
    fn test_identical_batches_have_zero_deviation() {
        let entries: Vec<Complex> = (0..8).map(|x| Complex::new(x as Real, 1.0)).collect();
        let a = SigmaBatch::from_complex(&entries, 2, 2).unwrap();
        assert_eq!(compare_batches(&a, &a.clone()).unwrap(), 0.0);
    }

    #[test]
    fn test_reports_largest_magnitude() {
        let a = SigmaBatch::zeros(2, 2);
        let mut b = SigmaBatch::zeros(2, 2);
        b.set(1, 0, 1, Complex::new(3.0, 4.0));
        b.set(0, 1, 1, Complex::new(1.0, 0.0));
        assert_eq!(compare_batches(&a, &b).unwrap(), 5.0);
    }

    #[test]
    fn test_layout_mismatch_is_an_error() {
        let a = SigmaBatch::zeros(2, 2);
        let mut b = SigmaBatch::zeros(2, 2);
        crate::transform::transform_aos_to_aosoa(&mut b, 2).unwrap();
        assert!(compare_batches(&a, &b).is_err());
    }

    #[test]
    fn test_nan_propagates() {
        let a = SigmaBatch::zeros(2, 1);
        let mut b = SigmaBatch::zeros(2, 1);
        b.set(0, 0, 0, Complex::new(Real::NAN, 0.0));
        assert!(compare_batches(&a, &b).unwrap().is_nan());
    }

    #[test]
    fn test_tolerance_follows_precision() {
        assert!(relative_tolerance(7) > relative_tolerance(2));
        assert_eq!(relative_tolerance(0), relative_tolerance(1));
        // tight enough to catch a dropped term even in f32
        assert!(relative_tolerance(8) < 1e-3);
        assert!(relative_tolerance(1) >= 64.0 * Real::EPSILON);
    }

    #[test]
    fn test_max_magnitude() {
        let mut b = SigmaBatch::zeros(2, 3);
        b.set(2, 1, 0, Complex::new(-6.0, 8.0));
        assert_eq!(max_magnitude(&b), 10.0);
    }
}
