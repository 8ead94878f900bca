//! Negative-count repair
//!
//! Gantree: L2_Mitigation → Repair
//!
//! Confusion-matrix correction can leave unphysical negative bin counts.
//! Repair projects the vector back onto the nonnegative, sum-preserving
//! region by iterative redistribution (a heuristic, not a true simplex
//! projection).

use autocal_core::correction::REPAIR_MAX_ITERS;
use autocal_core::{AutocalError, AutocalResult, CountVector};

/// Repair negative entries while preserving the vector total
///
/// While any entry is negative: zero the most negative entry and spread
/// its deficit evenly over all other entries. A final rescale pins the
/// sum back to the input total exactly. Idempotent on already-nonnegative
/// input. The iteration cap turns pathological inputs (more negative mass
/// than the positive entries can absorb) into a defined error.
/// Gantree: fix(counts) -> CountVector // 음수 복구
pub fn fix(counts: &CountVector) -> AutocalResult<CountVector> {
    let total = counts.total();
    if total <= 0.0 {
        return Err(AutocalError::NonpositiveTotalCount(total));
    }

    let mut v = counts.as_slice().to_vec();
    let n = v.len();
    if n == 1 {
        // total > 0 with one bin implies the bin is already positive
        return Ok(CountVector::new(v));
    }

    let mut converged = false;
    for _ in 0..REPAIR_MAX_ITERS {
        let (worst, &min_val) = v
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .expect("non-empty vector");

        if min_val >= 0.0 {
            converged = true;
            break;
        }

        // Zero the worst bin, absorb its deficit into all others
        let share = min_val / (n - 1) as f64;
        for (k, entry) in v.iter_mut().enumerate() {
            if k == worst {
                *entry = 0.0;
            } else {
                *entry += share;
            }
        }
    }

    if !converged {
        return Err(AutocalError::RepairIterationLimit {
            iterations: REPAIR_MAX_ITERS,
        });
    }

    // Offset compounding rounding from repeated redistribution
    let sum: f64 = v.iter().sum();
    if sum > 0.0 {
        let scale = total / sum;
        for entry in &mut v {
            *entry *= scale;
        }
    }

    Ok(CountVector::new(v))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use autocal_core::correction::SUM_TOLERANCE;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_nonnegative_input_unchanged() {
        let counts = CountVector::new(vec![400.0, 100.0, 250.0, 250.0]);
        let fixed = fix(&counts).unwrap();
        assert_eq!(fixed, counts);
    }

    #[test]
    fn test_single_negative_entry() {
        let counts = CountVector::new(vec![520.0, -20.0, 250.0, 250.0]);
        let fixed = fix(&counts).unwrap();

        assert!(fixed.is_nonnegative());
        assert_abs_diff_eq!(fixed.total(), 1000.0, epsilon = SUM_TOLERANCE);
        assert_eq!(fixed.get(1), Some(0.0));
    }

    #[test]
    fn test_cascading_negatives() {
        // Redistribution drags a small positive entry negative
        let counts = CountVector::new(vec![990.0, -80.0, 10.0, 80.0]);
        let fixed = fix(&counts).unwrap();

        assert!(fixed.is_nonnegative());
        assert_abs_diff_eq!(fixed.total(), 1000.0, epsilon = SUM_TOLERANCE);
    }

    #[test]
    fn test_idempotent() {
        let counts = CountVector::new(vec![520.0, -20.0, 250.0, 250.0]);
        let once = fix(&counts).unwrap();
        let twice = fix(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nonpositive_total_rejected() {
        assert!(matches!(
            fix(&CountVector::zeros(4)),
            Err(AutocalError::NonpositiveTotalCount(_))
        ));
        assert!(matches!(
            fix(&CountVector::new(vec![5.0, -10.0])),
            Err(AutocalError::NonpositiveTotalCount(_))
        ));
    }

    #[test]
    fn test_single_bin_positive() {
        let counts = CountVector::new(vec![100.0]);
        assert_eq!(fix(&counts).unwrap(), counts);
    }

    #[test]
    fn test_sum_preserved_exactly_after_repair() {
        let counts = CountVector::new(vec![300.5, -0.5, 100.0, 100.0]);
        let fixed = fix(&counts).unwrap();
        assert_abs_diff_eq!(fixed.total(), 500.0, epsilon = 1e-9);
    }
}
