//! Confusion-matrix count correction
//!
//! Gantree: L2_Mitigation → Corrector
//!
//! Inverts the measured confusion matrix and applies it to a raw outcome
//! count vector. Output may contain negative entries; pass it through
//! `repair::fix` before interpreting it as probabilities.

use crate::confusion::ConfusionMatrix;
use autocal_core::correction::{round_to, PIVOT_EPS, ROUND_DECIMALS};
use autocal_core::{AutocalError, AutocalResult, CountVector};
use ndarray::{Array1, Array2};

/// Correct a raw count vector against the measured confusion matrix
///
/// The row-normalized confusion is transposed so preparation probabilities
/// become columns, inverted, and applied to `counts`; the result is
/// rescaled to the input's total (offsetting numerical drift) and rounded
/// for reporting stability. Inversion failure is fatal for this count
/// vector only, not for the run.
/// Gantree: correct(counts, confusion) -> CountVector // 역행렬 보정
pub fn correct(counts: &CountVector, confusion: &ConfusionMatrix) -> AutocalResult<CountVector> {
    if counts.len() != confusion.num_labels() {
        return Err(AutocalError::LabelMismatch {
            expected: confusion.num_labels(),
            actual: counts.len(),
        });
    }

    // Per-preparation distributions as columns
    let response = confusion.row_normalized().reversed_axes().to_owned();
    let inverse = invert(response)?;

    let raw = Array1::from_vec(counts.as_slice().to_vec());
    let corrected = inverse.dot(&raw);

    // Rescale so the corrected vector keeps the original shot total
    let total_in = counts.total();
    let total_out = corrected.sum();
    if total_out.abs() < PIVOT_EPS {
        return Err(AutocalError::DegenerateCalibration {
            context: format!("corrected total collapsed to {total_out:.3e}"),
        });
    }
    let scale = total_in / total_out;

    Ok(CountVector::new(
        corrected
            .iter()
            .map(|&c| round_to(c * scale, ROUND_DECIMALS))
            .collect(),
    ))
}

/// Gauss-Jordan inversion with partial pivoting
///
/// A pivot below `PIVOT_EPS` signals a singular or ill-conditioned
/// confusion matrix.
fn invert(mut a: Array2<f64>) -> AutocalResult<Array2<f64>> {
    let n = a.nrows();
    let mut inv = Array2::eye(n);

    for col in 0..n {
        // Partial pivot: largest magnitude on or below the diagonal
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[(r1, col)]
                    .abs()
                    .partial_cmp(&a[(r2, col)].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        let pivot = a[(pivot_row, col)];
        if pivot.abs() < PIVOT_EPS {
            return Err(AutocalError::DegenerateCalibration {
                context: format!("pivot {:.3e} in column {}", pivot, col),
            });
        }
        if pivot_row != col {
            swap_rows(&mut a, col, pivot_row);
            swap_rows(&mut inv, col, pivot_row);
        }

        let pivot = a[(col, col)];
        for j in 0..n {
            a[(col, j)] /= pivot;
            inv[(col, j)] /= pivot;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[(row, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                let a_cj = a[(col, j)];
                let i_cj = inv[(col, j)];
                a[(row, j)] -= factor * a_cj;
                inv[(row, j)] -= factor * i_cj;
            }
        }
    }
    Ok(inv)
}

fn swap_rows(m: &mut Array2<f64>, r1: usize, r2: usize) {
    let n = m.ncols();
    for j in 0..n {
        m.swap((r1, j), (r2, j));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use autocal_core::correction::SUM_TOLERANCE;
    use autocal_core::CalibLabel;
    use approx::assert_abs_diff_eq;

    fn order2() -> Vec<CalibLabel> {
        ["gg", "ge", "eg", "ee"]
            .iter()
            .map(|s| CalibLabel::parse(s).unwrap())
            .collect()
    }

    fn noisy_confusion() -> ConfusionMatrix {
        let rows = vec![
            CountVector::new(vec![950.0, 20.0, 25.0, 5.0]),
            CountVector::new(vec![30.0, 940.0, 5.0, 25.0]),
            CountVector::new(vec![25.0, 5.0, 945.0, 25.0]),
            CountVector::new(vec![5.0, 25.0, 30.0, 940.0]),
        ];
        ConfusionMatrix::from_rows(&rows, &order2()).unwrap()
    }

    #[test]
    fn test_identity_confusion_is_noop() {
        let confusion = ConfusionMatrix::identity(&order2(), 1000.0);
        let counts = CountVector::new(vec![480.0, 20.0, 30.0, 470.0]);

        let corrected = correct(&counts, &confusion).unwrap();
        for (raw, fixed) in counts.as_slice().iter().zip(corrected.as_slice()) {
            assert_abs_diff_eq!(raw, fixed, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sum_preserved() {
        let confusion = noisy_confusion();
        let counts = CountVector::new(vec![400.0, 100.0, 250.0, 250.0]);

        let corrected = correct(&counts, &confusion).unwrap();
        assert_abs_diff_eq!(corrected.total(), counts.total(), epsilon = SUM_TOLERANCE);
    }

    #[test]
    fn test_undoes_known_confusion() {
        // Forward-apply the confusion to a known truth, then correct
        let confusion = noisy_confusion();
        let response = confusion.row_normalized();
        let truth = [500.0, 0.0, 0.0, 500.0];

        let mut observed = vec![0.0; 4];
        for (j, obs) in observed.iter_mut().enumerate() {
            for (i, &t) in truth.iter().enumerate() {
                *obs += response[(i, j)] * t;
            }
        }

        let corrected = correct(&CountVector::new(observed), &confusion).unwrap();
        for (est, exp) in corrected.as_slice().iter().zip(truth.iter()) {
            assert_abs_diff_eq!(est, exp, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_singular_confusion_degenerate() {
        // Two identical preparation responses: not invertible
        let rows = vec![
            CountVector::new(vec![500.0, 500.0, 0.0, 0.0]),
            CountVector::new(vec![500.0, 500.0, 0.0, 0.0]),
            CountVector::new(vec![0.0, 0.0, 1000.0, 0.0]),
            CountVector::new(vec![0.0, 0.0, 0.0, 1000.0]),
        ];
        let confusion = ConfusionMatrix::from_rows(&rows, &order2()).unwrap();
        let counts = CountVector::new(vec![250.0, 250.0, 250.0, 250.0]);

        assert!(matches!(
            correct(&counts, &confusion),
            Err(AutocalError::DegenerateCalibration { .. })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let confusion = noisy_confusion();
        let counts = CountVector::new(vec![500.0, 500.0]);

        assert!(matches!(
            correct(&counts, &confusion),
            Err(AutocalError::LabelMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_may_produce_negative_entries() {
        // Strong correction on a sharply peaked vector can overshoot
        let confusion = noisy_confusion();
        let counts = CountVector::new(vec![1000.0, 0.0, 0.0, 0.0]);

        let corrected = correct(&counts, &confusion).unwrap();
        assert!(corrected.min_entry() < 0.0);
        assert_abs_diff_eq!(corrected.total(), 1000.0, epsilon = SUM_TOLERANCE);
    }
}
