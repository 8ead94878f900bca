//! Error types for AUTOCAL
//!
//! Gantree: L0_Foundation → Errors
//!
//! Comprehensive error handling for the AUTOCAL system.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for AUTOCAL
/// Gantree: AutocalError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutocalError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// State label contains characters outside {g, e, f}
    /// Gantree: InvalidStateLabel(String) // 상태 라벨
    #[error("Invalid state label '{0}': must contain only 'g', 'e', 'f'")]
    InvalidStateLabel(String),

    /// Basis label contains characters outside {I, X, Y, Z}
    /// Gantree: InvalidBasis(String) // 측정 기저
    #[error("Invalid basis '{0}': must contain only I, X, Y, Z")]
    InvalidBasis(String),

    /// Qubit index out of range
    /// Gantree: QubitOutOfRange{{q,max}} // 큐비트 범위
    #[error("Qubit {qubit} out of range: max is {max}")]
    QubitOutOfRange { qubit: usize, max: usize },

    /// Per-qubit list has wrong length for the device
    #[error("Per-qubit list of length {got} cannot be expanded to {expected} qubits")]
    PerQubitLengthMismatch { expected: usize, got: usize },

    /// Empty reference shot sample
    #[error("Empty shot sample for {0}")]
    EmptyShotSample(String),

    // ========================================================================
    // Correction Errors
    // ========================================================================
    /// Confusion matrix is singular or ill-conditioned
    /// Gantree: DegenerateCalibration{{context}} // 특이 행렬
    #[error("Degenerate calibration: confusion matrix not invertible ({context})")]
    DegenerateCalibration { context: String },

    /// Count vector sums to zero or less before repair
    /// Gantree: NonpositiveTotalCount(f64) // 총합 비양수
    #[error("Nonpositive total count {0}: nothing to renormalize against")]
    NonpositiveTotalCount(f64),

    /// Count vector length does not match the expected label order
    /// Gantree: LabelMismatch{{expected,actual}} // 길이 불일치
    #[error("Label mismatch: expected {expected} bins, got {actual}")]
    LabelMismatch { expected: usize, actual: usize },

    /// Negative-count repair did not converge within the iteration cap
    #[error("Negative-count repair did not converge after {iterations} iterations")]
    RepairIterationLimit { iterations: usize },

    /// Three-level inference requested without the swap-setting counts
    #[error("Second-pass counts required for f-level inference of qubits {0:?}")]
    MissingSecondPass(Vec<usize>),

    // ========================================================================
    // Orchestration Errors
    // ========================================================================
    /// Calibration order lacks a run required for threshold estimation
    #[error("Missing calibration run '{0}' required for threshold estimation")]
    MissingCalibrationRun(String),

    /// Phase method invoked out of order
    #[error("Stage violation: expected stage '{expected}', current stage is '{actual}'")]
    StageViolation { expected: String, actual: String },

    /// Discrimination fidelity below floor with abort policy enabled
    #[error("Readout fidelity {fidelity:.4} for qubit {qubit} below floor {floor:.4}")]
    FidelityBelowFloor {
        qubit: usize,
        fidelity: f64,
        floor: f64,
    },

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Acquisition backend failure
    /// Gantree: BackendError(String) // 백엔드
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Unknown preparation protocol
    #[error("Unknown preparation protocol '{0}'")]
    UnknownProtocol(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for AUTOCAL operations
/// Gantree: AutocalResult<T> // type alias
pub type AutocalResult<T> = Result<T, AutocalError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for AutocalError {
    fn from(err: serde_json::Error) -> Self {
        AutocalError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for AutocalError {
    fn from(err: std::io::Error) -> Self {
        AutocalError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl AutocalError {
    /// Check if error is fatal only to the count vector it concerns
    ///
    /// The orchestrator records these per basis and keeps processing the
    /// remaining bases; raw counts are never discarded.
    pub fn is_per_vector(&self) -> bool {
        matches!(
            self,
            AutocalError::DegenerateCalibration { .. }
                | AutocalError::NonpositiveTotalCount(_)
                | AutocalError::LabelMismatch { .. }
                | AutocalError::RepairIterationLimit { .. }
        )
    }

    /// Check if error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AutocalError::InvalidStateLabel(_)
                | AutocalError::InvalidBasis(_)
                | AutocalError::QubitOutOfRange { .. }
                | AutocalError::PerQubitLengthMismatch { .. }
                | AutocalError::EmptyShotSample(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
