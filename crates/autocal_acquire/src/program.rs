//! Measurement program description
//!
//! Gantree: L3_Acquire → Program
//!
//! A measurement program is a pure description of one acquisition: which
//! qubits participate, what state is prepared, which basis rotation is
//! applied before readout, and whether the g/e swap setting is active.
//! Backends interpret it; nothing here touches hardware.

use autocal_core::{AutocalError, AutocalResult, BasisLabel, CalibLabel, QubitId, Shot};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PrepSpec
// ============================================================================

/// State preparation for one acquisition
/// Gantree: PrepSpec // 상태 준비
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrepSpec {
    /// Prepare the given reference product state (calibration runs)
    Reference(CalibLabel),
    /// Prepare the state under characterization, named for the backend
    Protocol(String),
}

impl fmt::Display for PrepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepSpec::Reference(label) => write!(f, "ref:{}", label),
            PrepSpec::Protocol(name) => write!(f, "protocol:{}", name),
        }
    }
}

// ============================================================================
// MeasurementProgram
// ============================================================================

/// One acquisition request: prep, optional basis rotation, swap setting
/// Gantree: MeasurementProgram // 측정 프로그램
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementProgram {
    /// Participating qubits, in bin-index order (first qubit is the MSB)
    pub qubits: Vec<QubitId>,

    /// State preparation
    pub prep: PrepSpec,

    /// Pre-readout basis rotation; `None` means plain computational readout
    pub basis: Option<BasisLabel>,

    /// Swap g/e occupation right before detection (three-level second pass)
    pub ef_swap: bool,
}

impl MeasurementProgram {
    /// Reference-state program (calibration and confusion rows)
    pub fn reference(qubits: &[QubitId], label: CalibLabel) -> Self {
        Self {
            qubits: qubits.to_vec(),
            prep: PrepSpec::Reference(label),
            basis: None,
            ef_swap: false,
        }
    }

    /// Protocol program (the state under characterization)
    pub fn protocol(qubits: &[QubitId], name: &str) -> Self {
        Self {
            qubits: qubits.to_vec(),
            prep: PrepSpec::Protocol(name.to_string()),
            basis: None,
            ef_swap: false,
        }
    }

    /// Set the basis rotation
    pub fn with_basis(mut self, basis: BasisLabel) -> Self {
        self.basis = Some(basis);
        self
    }

    /// Enable the g/e swap setting
    pub fn with_ef_swap(mut self) -> Self {
        self.ef_swap = true;
        self
    }

    /// Number of participating qubits
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Check internal consistency (label and basis widths match `qubits`)
    /// Gantree: validate() // 검증
    pub fn validate(&self) -> AutocalResult<()> {
        if self.qubits.is_empty() {
            return Err(AutocalError::InternalError(
                "measurement program with no qubits".to_string(),
            ));
        }
        if let PrepSpec::Reference(label) = &self.prep {
            if label.len() != self.qubits.len() {
                return Err(AutocalError::LabelMismatch {
                    expected: self.qubits.len(),
                    actual: label.len(),
                });
            }
        }
        if let Some(basis) = &self.basis {
            if basis.len() != self.qubits.len() {
                return Err(AutocalError::LabelMismatch {
                    expected: self.qubits.len(),
                    actual: basis.len(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for MeasurementProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {:?}", self.prep, self.qubits)?;
        if let Some(basis) = &self.basis {
            write!(f, " basis {}", basis)?;
        }
        if self.ef_swap {
            write!(f, " [swap]")?;
        }
        Ok(())
    }
}

// ============================================================================
// ShotRecord
// ============================================================================

/// Raw IQ shots from one acquisition, one row per participating qubit
/// Gantree: ShotRecord // 샷 기록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    shots: Vec<Vec<Shot>>,
    reps: usize,
}

impl ShotRecord {
    /// Create from per-qubit shot rows; every row must have equal length
    pub fn new(shots: Vec<Vec<Shot>>) -> AutocalResult<Self> {
        let reps = shots.first().map(|row| row.len()).unwrap_or(0);
        if shots.iter().any(|row| row.len() != reps) {
            return Err(AutocalError::InternalError(
                "ragged shot record".to_string(),
            ));
        }
        Ok(Self { shots, reps })
    }

    /// Number of qubit rows
    pub fn num_qubits(&self) -> usize {
        self.shots.len()
    }

    /// Repetitions per row
    pub fn reps(&self) -> usize {
        self.reps
    }

    /// Shots for the k-th participating qubit (program order, not QubitId)
    pub fn row(&self, k: usize) -> AutocalResult<&[Shot]> {
        self.shots
            .get(k)
            .map(|row| row.as_slice())
            .ok_or(AutocalError::QubitOutOfRange {
                qubit: k,
                max: self.shots.len(),
            })
    }

    /// Borrow all rows
    pub fn rows(&self) -> &[Vec<Shot>] {
        &self.shots
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_program_validates() {
        let label = CalibLabel::parse("ge").unwrap();
        let program = MeasurementProgram::reference(&[0, 1], label);
        assert!(program.validate().is_ok());
        assert_eq!(program.num_qubits(), 2);
        assert!(!program.ef_swap);
    }

    #[test]
    fn test_label_width_must_match_qubits() {
        let label = CalibLabel::parse("g").unwrap();
        let program = MeasurementProgram::reference(&[0, 1], label);
        assert!(matches!(
            program.validate(),
            Err(AutocalError::LabelMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_basis_width_must_match_qubits() {
        let program = MeasurementProgram::protocol(&[0, 1], "bell")
            .with_basis(BasisLabel::parse("Z").unwrap());
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_builder_chain() {
        let program = MeasurementProgram::protocol(&[2, 3], "bell")
            .with_basis(BasisLabel::parse("XY").unwrap())
            .with_ef_swap();
        assert!(program.validate().is_ok());
        assert!(program.ef_swap);
        assert_eq!(program.to_string(), "protocol:bell on [2, 3] basis XY [swap]");
    }

    #[test]
    fn test_shot_record_rejects_ragged_rows() {
        let rows = vec![vec![Shot::new(0.0, 0.0); 3], vec![Shot::new(0.0, 0.0); 2]];
        assert!(ShotRecord::new(rows).is_err());
    }

    #[test]
    fn test_shot_record_row_access() {
        let rows = vec![vec![Shot::new(1.0, 0.0); 4], vec![Shot::new(2.0, 0.0); 4]];
        let record = ShotRecord::new(rows).unwrap();
        assert_eq!(record.num_qubits(), 2);
        assert_eq!(record.reps(), 4);
        assert_eq!(record.row(1).unwrap()[0].i, 2.0);
        assert!(record.row(2).is_err());
    }

    #[test]
    fn test_program_serde_roundtrip() {
        let program = MeasurementProgram::reference(&[0, 1], CalibLabel::parse("eg").unwrap())
            .with_basis(BasisLabel::parse("ZZ").unwrap());
        let json = serde_json::to_string(&program).unwrap();
        let back: MeasurementProgram = serde_json::from_str(&json).unwrap();
        assert_eq!(back, program);
    }
}
