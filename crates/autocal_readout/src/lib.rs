//! # AUTOCAL Readout
//!
//! Single-shot readout discrimination and outcome binning.
//!
//! ## Gantree Architecture
//!
//! ```text
//! autocal_readout // L1: Readout (완료)
//!     ReadoutCalibrator // 판별 보정기 (완료)
//!         calibrate() - (threshold, angle, fidelity)
//!     Classify // 분류/비닝 (완료)
//!         classify(), bin_shots()
//!     CalibrationParams // 파라미터 스냅샷 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use autocal_readout::prelude::*;
//! use autocal_core::Shot;
//!
//! let g: Vec<Shot> = (0..100).map(|k| Shot::new(k as f64 * 0.001, 0.0)).collect();
//! let e: Vec<Shot> = (0..100).map(|k| Shot::new(2.0 + k as f64 * 0.001, 0.0)).collect();
//!
//! let disc = ReadoutCalibrator::new().calibrate(&g, &e).unwrap();
//! assert!(disc.fidelity > 0.99);
//! assert!(classify(&Shot::new(3.0, 0.0), &disc));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Discrimination parameter estimation (Gantree: L1_Readout → ReadoutCalibrator)
pub mod discrimination;

/// Shot classification and binning (Gantree: L1_Readout → Classify)
pub mod classify;

/// Calibration parameter snapshot (Gantree: L1_Readout → CalibrationParams)
pub mod params;

// ============================================================================
// Re-exports
// ============================================================================

pub use classify::{bin_shots, classify};
pub use discrimination::{Discrimination, ReadoutCalibrator};
pub use params::CalibrationParams;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use autocal_readout::prelude::*;
    //! ```

    pub use crate::classify::{bin_shots, classify};
    pub use crate::discrimination::{Discrimination, ReadoutCalibrator};
    pub use crate::params::CalibrationParams;
}

// ============================================================================
// Integration Tests
// ============================================================================
