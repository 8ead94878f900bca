//! Run configuration
//!
//! Gantree: L4_Orchestration → Config
//!
//! One `TomoConfig` describes one complete run: which qubits participate,
//! the calibration and measurement orders, repetition count, and the
//! policy knobs. Expanded and validated once at run setup; never mutated
//! mid-run.

use autocal_core::readout::DEFAULT_FIDELITY_FLOOR;
use autocal_core::{AutocalError, AutocalResult, BasisLabel, CalibLabel, QubitId};
use serde::{Deserialize, Serialize};

/// Configuration for a calibration-and-tomography run
/// Gantree: TomoConfig // 실행 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomoConfig {
    /// Participating qubits; the first is the most significant bit
    pub qubits: Vec<QubitId>,

    /// Repetitions per acquisition
    pub reps: usize,

    /// Reference preparations, in acquisition and bin order
    pub calib_order: Vec<CalibLabel>,

    /// Tomography basis settings, in acquisition order
    pub meas_order: Vec<BasisLabel>,

    /// Discrimination fidelity below this raises a warning
    pub fidelity_floor: f64,

    /// Abort the run instead of warning on low fidelity
    pub abort_on_low_fidelity: bool,

    /// Qubits given a three-level population estimate
    pub f_level_qubits: Vec<QubitId>,

    /// Name of the state under characterization, interpreted by the backend
    pub protocol: String,

    /// Seed for reproducible backends
    pub seed: Option<u64>,

    /// Verbose progress output
    pub verbose: bool,
}

impl TomoConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Full two-qubit tomography: 4 reference preps, 9 Pauli-pair bases
    pub fn two_qubit_default(qa: QubitId, qb: QubitId) -> Self {
        let calib_order = ["gg", "ge", "eg", "ee"]
            .iter()
            .map(|s| CalibLabel::parse(s))
            .collect::<AutocalResult<Vec<_>>>()
            .unwrap_or_default();
        let meas_order = ["ZZ", "ZX", "ZY", "XZ", "XX", "XY", "YZ", "YX", "YY"]
            .iter()
            .map(|s| BasisLabel::parse(s))
            .collect::<AutocalResult<Vec<_>>>()
            .unwrap_or_default();

        Self {
            qubits: vec![qa, qb],
            reps: 1000,
            calib_order,
            meas_order,
            fidelity_floor: DEFAULT_FIDELITY_FLOOR,
            abort_on_low_fidelity: false,
            f_level_qubits: Vec::new(),
            protocol: "bell".to_string(),
            seed: None,
            verbose: false,
        }
    }

    /// Single-qubit tomography: g/e preps, Z/X/Y bases
    pub fn single_qubit_default(q: QubitId) -> Self {
        let calib_order = ["g", "e"]
            .iter()
            .map(|s| CalibLabel::parse(s))
            .collect::<AutocalResult<Vec<_>>>()
            .unwrap_or_default();
        let meas_order = ["Z", "X", "Y"]
            .iter()
            .map(|s| BasisLabel::parse(s))
            .collect::<AutocalResult<Vec<_>>>()
            .unwrap_or_default();

        Self {
            qubits: vec![q],
            reps: 1000,
            calib_order,
            meas_order,
            fidelity_floor: DEFAULT_FIDELITY_FLOOR,
            abort_on_low_fidelity: false,
            f_level_qubits: Vec::new(),
            protocol: "plus".to_string(),
            seed: None,
            verbose: false,
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Set repetitions per acquisition
    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    /// Set protocol name
    pub fn with_protocol(mut self, protocol: &str) -> Self {
        self.protocol = protocol.to_string();
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set fidelity floor
    pub fn with_fidelity_floor(mut self, floor: f64) -> Self {
        self.fidelity_floor = floor;
        self
    }

    /// Abort instead of warn when discrimination fidelity is low
    pub fn with_abort_on_low_fidelity(mut self) -> Self {
        self.abort_on_low_fidelity = true;
        self
    }

    /// Request three-level estimates for the given qubits
    pub fn with_f_level_qubits(mut self, qubits: &[QubitId]) -> Self {
        self.f_level_qubits = qubits.to_vec();
        self
    }

    /// Enable verbose progress output
    pub fn with_verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check shape consistency before a run
    /// Gantree: validate() // 검증
    pub fn validate(&self) -> AutocalResult<()> {
        let n = self.qubits.len();
        if n == 0 {
            return Err(AutocalError::InternalError(
                "config lists no qubits".to_string(),
            ));
        }
        for (k, &q) in self.qubits.iter().enumerate() {
            if self.qubits[..k].contains(&q) {
                return Err(AutocalError::InternalError(format!(
                    "qubit {} listed twice",
                    q
                )));
            }
        }
        if self.reps == 0 {
            return Err(AutocalError::InternalError(
                "zero repetitions configured".to_string(),
            ));
        }
        if self.calib_order.is_empty() {
            return Err(AutocalError::MissingCalibrationRun(
                CalibLabel::ground(n).to_string(),
            ));
        }
        for label in &self.calib_order {
            if label.len() != n {
                return Err(AutocalError::LabelMismatch {
                    expected: n,
                    actual: label.len(),
                });
            }
        }
        for basis in &self.meas_order {
            if basis.len() != n {
                return Err(AutocalError::LabelMismatch {
                    expected: n,
                    actual: basis.len(),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.fidelity_floor) {
            return Err(AutocalError::InternalError(format!(
                "fidelity floor {} outside [0, 1]",
                self.fidelity_floor
            )));
        }
        for &q in &self.f_level_qubits {
            if !self.qubits.contains(&q) {
                return Err(AutocalError::QubitOutOfRange {
                    qubit: q,
                    max: self.qubits.iter().copied().max().unwrap_or(0),
                });
            }
        }
        Ok(())
    }

    /// Number of participating qubits
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
