//! # AUTOCAL Core
//!
//! Foundation types, errors, and configuration expansion for the
//! automated readout-calibration and tomography stack.
//!
//! ## Gantree Architecture
//!
//! ```text
//! autocal_core // L0: Foundation (완료)
//!     CoreTypes // 핵심 타입 (완료)
//!         Shot, Level, CalibLabel, BasisLabel
//!         CountVector, PopulationEstimate
//!     Constants // 판별/보정 상수 (완료)
//!     Errors // 에러 타입 (완료)
//!     PerQubit // 설정 확장 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use autocal_core::prelude::*;
//!
//! // Calibration labels follow the fixed bin order convention
//! let order: Vec<CalibLabel> = ["gg", "ge", "eg", "ee"]
//!     .iter()
//!     .map(|s| CalibLabel::parse(s).unwrap())
//!     .collect();
//! assert_eq!(order[2].level_at(0), Some(Level::Excited));
//!
//! // Count vectors carry raw bin counts in that order
//! let counts = CountVector::new(vec![480.0, 10.0, 8.0, 2.0]);
//! assert_eq!(counts.total(), 500.0);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Per-qubit config expansion (Gantree: L0_Foundation → PerQubit)
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PerQubit;
pub use constants::{correction, readout};
pub use error::{AutocalError, AutocalResult};
pub use types::{
    Basis, BasisLabel, CalibLabel, CountVector, Level, PopulationEstimate, QubitId, Shot,
};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use autocal_core::prelude::*;
    //! ```

    pub use crate::config::PerQubit;
    pub use crate::constants::{correction, readout};
    pub use crate::error::{AutocalError, AutocalResult};
    pub use crate::types::{
        Basis, BasisLabel, CalibLabel, CountVector, Level, PopulationEstimate, QubitId, Shot,
    };
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
