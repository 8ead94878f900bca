//! # AUTOCAL Mitigation
//!
//! Readout-error mitigation: confusion-matrix correction, negative-count
//! repair, and state-population inference.
//!
//! ## Gantree Architecture
//!
//! ```text
//! autocal_mitigation // L2: Mitigation (완료)
//!     ConfusionMatrix // 혼동 행렬 (완료)
//!         from_rows(), row_normalized(), diagonal_fidelity()
//!     Corrector // 역행렬 보정 (완료)
//!         correct() - 합 보존, 음수 허용
//!     Repair // 음수 복구 (완료)
//!         fix() - 재분배 휴리스틱, 반복 상한
//!     Inference // 점유율 추론 (완료)
//!         infer() - 2/3 레벨
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use autocal_mitigation::prelude::*;
//! use autocal_core::{CalibLabel, CountVector};
//!
//! let order: Vec<CalibLabel> = ["g", "e"]
//!     .iter()
//!     .map(|s| CalibLabel::parse(s).unwrap())
//!     .collect();
//!
//! let rows = vec![
//!     CountVector::new(vec![98.0, 2.0]),
//!     CountVector::new(vec![5.0, 95.0]),
//! ];
//! let confusion = ConfusionMatrix::from_rows(&rows, &order).unwrap();
//!
//! let raw = CountVector::new(vec![60.0, 40.0]);
//! let corrected = fix(&correct(&raw, &confusion).unwrap()).unwrap();
//! assert!((corrected.total() - 100.0).abs() < 1e-3);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Confusion matrix (Gantree: L2_Mitigation → ConfusionMatrix)
pub mod confusion;

/// Count correction (Gantree: L2_Mitigation → Corrector)
pub mod corrector;

/// Negative-count repair (Gantree: L2_Mitigation → Repair)
pub mod repair;

/// Population inference (Gantree: L2_Mitigation → Inference)
pub mod inference;

// ============================================================================
// Re-exports
// ============================================================================

pub use confusion::ConfusionMatrix;
pub use corrector::correct;
pub use inference::infer;
pub use repair::fix;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use autocal_mitigation::prelude::*;
    //! ```

    pub use crate::confusion::ConfusionMatrix;
    pub use crate::corrector::correct;
    pub use crate::inference::infer;
    pub use crate::repair::fix;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use autocal_core::correction::SUM_TOLERANCE;
    use autocal_core::{CalibLabel, CountVector};

    fn order2() -> Vec<CalibLabel> {
        ["gg", "ge", "eg", "ee"]
            .iter()
            .map(|s| CalibLabel::parse(s).unwrap())
            .collect()
    }

    fn noisy_confusion() -> ConfusionMatrix {
        let rows = vec![
            CountVector::new(vec![960.0, 15.0, 20.0, 5.0]),
            CountVector::new(vec![25.0, 945.0, 5.0, 25.0]),
            CountVector::new(vec![20.0, 5.0, 950.0, 25.0]),
            CountVector::new(vec![5.0, 20.0, 25.0, 950.0]),
        ];
        ConfusionMatrix::from_rows(&rows, &order2()).unwrap()
    }

    #[test]
    fn test_correct_then_fix_pipeline() {
        let confusion = noisy_confusion();
        let raw = CountVector::new(vec![970.0, 10.0, 15.0, 5.0]);

        let corrected = correct(&raw, &confusion).unwrap();
        let repaired = fix(&corrected).unwrap();

        assert!(repaired.is_nonnegative());
        assert_abs_diff_eq!(repaired.total(), raw.total(), epsilon = SUM_TOLERANCE);
    }

    #[test]
    fn test_self_consistency_near_one_hot() {
        // Correcting each calibration row against its own confusion matrix
        // should reproduce (after repair) a near one-hot distribution at
        // the diagonal.
        let confusion = noisy_confusion();

        for (i, row) in confusion.to_rows().into_iter().enumerate() {
            let raw = CountVector::new(row);
            let total = raw.total();
            let repaired = fix(&correct(&raw, &confusion).unwrap()).unwrap();

            let diagonal = repaired.get(i).unwrap();
            assert!(
                diagonal > 0.99 * total,
                "row {}: diagonal {} of {}",
                i,
                diagonal,
                total
            );
        }
    }

    #[test]
    fn test_corrected_pipeline_feeds_inference() {
        let confusion = noisy_confusion();
        let raw = CountVector::new(vec![480.0, 20.0, 30.0, 470.0]);

        let repaired = fix(&correct(&raw, &confusion).unwrap()).unwrap();
        let pops = infer(&repaired, &[0, 1], &order2(), None, &[]).unwrap();

        for q in [0, 1] {
            assert!(pops[&q].is_normalized(1e-9));
            assert!(pops[&q].g > 0.4 && pops[&q].g < 0.6);
        }
    }
}
