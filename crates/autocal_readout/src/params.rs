//! Calibration parameter snapshot
//!
//! Gantree: L1_Readout → CalibrationParams
//!
//! Per-qubit discrimination parameters, computed once per run and held as
//! read-only context for every subsequent binning call. All basis
//! measurements in one run must use the identical snapshot or cross-basis
//! results become incomparable.

use crate::discrimination::Discrimination;
use autocal_core::{AutocalError, AutocalResult, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Immutable per-qubit calibration parameters
/// Gantree: CalibrationParams // 보정 파라미터
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    params: BTreeMap<QubitId, Discrimination>,
}

impl CalibrationParams {
    /// Build from per-qubit discrimination results
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (QubitId, Discrimination)>,
    {
        Self {
            params: iter.into_iter().collect(),
        }
    }

    /// Discrimination parameters for one qubit
    pub fn get(&self, qubit: QubitId) -> AutocalResult<&Discrimination> {
        self.params.get(&qubit).ok_or(AutocalError::QubitOutOfRange {
            qubit,
            max: self.params.keys().copied().max().unwrap_or(0),
        })
    }

    /// Qubits with calibration parameters, in ascending order
    pub fn qubits(&self) -> Vec<QubitId> {
        self.params.keys().copied().collect()
    }

    /// Number of calibrated qubits
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Qubits whose discrimination came back low-confidence
    pub fn low_confidence_qubits(&self) -> Vec<QubitId> {
        self.params
            .iter()
            .filter(|(_, d)| d.low_confidence)
            .map(|(&q, _)| q)
            .collect()
    }

    /// Iterate over (qubit, discrimination) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&QubitId, &Discrimination)> {
        self.params.iter()
    }
}

impl fmt::Display for CalibrationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CalibrationParams(")?;
        for (i, (q, d)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "q{}: t={:.3} a={:.3}", q, d.threshold, d.angle)?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Tests
// ============================================================================
