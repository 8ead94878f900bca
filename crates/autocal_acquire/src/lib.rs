//! # AUTOCAL Acquire
//!
//! Acquisition backend abstraction: measurement program descriptions, the
//! backend trait, and a simulated backend for testing and demos.
//!
//! ## Gantree Architecture
//!
//! ```text
//! autocal_acquire // L3: Acquire (완료)
//!     Program // 측정 프로그램 (완료)
//!         PrepSpec, MeasurementProgram, ShotRecord
//!     BackendTrait // 백엔드 인터페이스 (완료)
//!         AcquisitionBackend - 순차, 블로킹
//!     Simulator // 시뮬레이터 (완료)
//!         SimulatedAcquisition, ReadoutModel
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use autocal_acquire::prelude::*;
//! use autocal_core::CalibLabel;
//!
//! let mut backend = SimulatedAcquisition::ideal(2).with_seed(42);
//! let program = MeasurementProgram::reference(&[0, 1], CalibLabel::ground(2));
//! let record = backend.acquire(&program, 100).unwrap();
//! assert_eq!(record.reps(), 100);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Measurement programs (Gantree: L3_Acquire → Program)
pub mod program;

/// Backend trait (Gantree: L3_Acquire → BackendTrait)
pub mod backend;

/// Simulated backend (Gantree: L3_Acquire → Simulator)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use backend::AcquisitionBackend;
pub use program::{MeasurementProgram, PrepSpec, ShotRecord};
pub use simulator::{ReadoutModel, SimulatedAcquisition};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use autocal_acquire::prelude::*;
    //! ```

    pub use crate::backend::AcquisitionBackend;
    pub use crate::program::{MeasurementProgram, PrepSpec, ShotRecord};
    pub use crate::simulator::{ReadoutModel, SimulatedAcquisition};
}

// ============================================================================
// Integration Tests
// ============================================================================
