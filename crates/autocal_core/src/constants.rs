//! Constants for AUTOCAL
//!
//! Gantree: L0_Foundation → Constants
//!
//! Readout-discrimination and correction parameters. Values match the
//! behavior of the original qick/slab autocalibration stack.

// ============================================================================
// Readout Constants
// Gantree: readout // 판별 상수
// ============================================================================

pub mod readout {
    //! Single-shot discrimination parameters

    /// Histogram bin count for the threshold scan
    /// Gantree: HIST_BINS: usize = 200
    pub const HIST_BINS: usize = 200;

    /// Default discrimination-fidelity floor for the low-confidence flag
    /// Gantree: DEFAULT_FIDELITY_FLOOR: f64 = 0.5
    pub const DEFAULT_FIDELITY_FLOOR: f64 = 0.5;
}

// ============================================================================
// Correction Constants
// Gantree: correction // 보정 상수
// ============================================================================

pub mod correction {
    //! Confusion-matrix correction and repair parameters

    /// Decimal places kept when reporting corrected counts
    /// Gantree: ROUND_DECIMALS: u32 = 5
    pub const ROUND_DECIMALS: u32 = 5;

    /// Tolerance on sum preservation through correction and repair
    /// Gantree: SUM_TOLERANCE: f64 = 1e-3
    pub const SUM_TOLERANCE: f64 = 1e-3;

    /// Pivot magnitude below which the confusion matrix is degenerate
    pub const PIVOT_EPS: f64 = 1e-12;

    /// Iteration cap for the negative-count repair loop
    ///
    /// The redistribution heuristic has no convergence proof for inputs with
    /// more negative mass than the positive entries can absorb; the cap turns
    /// that case into a defined error instead of an unbounded loop.
    pub const REPAIR_MAX_ITERS: usize = 1000;

    /// Round a value to `decimals` places
    #[inline]
    pub fn round_to(value: f64, decimals: u32) -> f64 {
        let scale = 10f64.powi(decimals as i32);
        (value * scale).round() / scale
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(correction::round_to(1.234567, 5), 1.23457);
        assert_eq!(correction::round_to(-0.000004, 5), -0.0);
        assert_eq!(correction::round_to(100.0, 5), 100.0);
    }

    #[test]
    fn test_constants_sane() {
        assert!(readout::HIST_BINS > 1);
        assert!(readout::DEFAULT_FIDELITY_FLOOR > 0.0);
        assert!(correction::SUM_TOLERANCE < 1.0);
        assert!(correction::REPAIR_MAX_ITERS > 0);
    }
}
