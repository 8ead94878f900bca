//! Acquisition backend trait
//!
//! Gantree: L3_Acquire → BackendTrait
//!
//! One backend instance has exclusive use of the apparatus. Acquisition is
//! sequential and blocking; there is no retry and no cancellation. A failed
//! acquisition returns an error and leaves the backend usable for the next
//! program.

use crate::program::{MeasurementProgram, ShotRecord};
use autocal_core::{AutocalError, AutocalResult};

/// Shot acquisition interface
/// Gantree: AcquisitionBackend // 백엔드 트레이트
pub trait AcquisitionBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Number of addressable qubits
    fn num_qubits(&self) -> usize;

    /// Execute `program` for `reps` repetitions and return raw IQ shots
    ///
    /// The returned record has one row per program qubit, in program order.
    fn acquire(&mut self, program: &MeasurementProgram, reps: usize)
        -> AutocalResult<ShotRecord>;

    /// Validate a program against this backend's qubit range
    ///
    /// Implementations call this at the top of `acquire`.
    fn check_program(&self, program: &MeasurementProgram) -> AutocalResult<()> {
        program.validate()?;
        for &q in &program.qubits {
            if q >= self.num_qubits() {
                return Err(AutocalError::QubitOutOfRange {
                    qubit: q,
                    max: self.num_qubits(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use autocal_core::{CalibLabel, Shot};

    struct FixedBackend {
        n: usize,
    }

    impl AcquisitionBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        fn num_qubits(&self) -> usize {
            self.n
        }

        fn acquire(
            &mut self,
            program: &MeasurementProgram,
            reps: usize,
        ) -> AutocalResult<ShotRecord> {
            self.check_program(program)?;
            let rows = vec![vec![Shot::new(0.0, 0.0); reps]; program.num_qubits()];
            ShotRecord::new(rows)
        }
    }

    #[test]
    fn test_check_program_qubit_range() {
        let mut backend = FixedBackend { n: 2 };
        let ok = MeasurementProgram::reference(&[0, 1], CalibLabel::parse("gg").unwrap());
        assert!(backend.acquire(&ok, 10).is_ok());

        let out = MeasurementProgram::reference(&[0, 5], CalibLabel::parse("gg").unwrap());
        assert!(matches!(
            backend.acquire(&out, 10),
            Err(AutocalError::QubitOutOfRange { qubit: 5, max: 2 })
        ));
    }

    #[test]
    fn test_record_shape_matches_program() {
        let mut backend = FixedBackend { n: 4 };
        let program = MeasurementProgram::reference(&[1, 3], CalibLabel::parse("ge").unwrap());
        let record = backend.acquire(&program, 25).unwrap();
        assert_eq!(record.num_qubits(), 2);
        assert_eq!(record.reps(), 25);
    }
}
