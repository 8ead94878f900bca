//! Run record
//!
//! Gantree: L4_Orchestration → Record
//!
//! Serializable summary of one completed run. Raw vectors are kept next
//! to their corrected counterparts so a failed correction never costs the
//! underlying data.

use autocal_core::{AutocalResult, PopulationEstimate, QubitId};
use autocal_readout::Discrimination;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Summary of one completed calibration-and-tomography run
/// Gantree: RunRecord // 실행 기록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Participating qubits, MSB first
    pub qubits: Vec<QubitId>,

    /// Repetitions per acquisition
    pub reps: usize,

    /// Protocol name of the state under characterization
    pub protocol: String,

    /// Seed, when the backend was seeded
    pub seed: Option<u64>,

    /// Reference preparations, bin order
    pub calib_order: Vec<String>,

    /// Tomography bases, acquisition order
    pub meas_order: Vec<String>,

    /// Per-qubit discrimination parameters
    pub discrimination: BTreeMap<QubitId, Discrimination>,

    /// Confusion matrix, one raw count row per reference prep
    pub confusion_rows: Vec<Vec<f64>>,

    /// Re-binned calibration vectors, aligned to `calib_order`
    pub raw_calib: Vec<Vec<f64>>,

    /// Self-consistency corrected calibration vectors (label, counts)
    pub corrected_calib: Vec<(String, Vec<f64>)>,

    /// Raw tomography vectors (basis label, counts)
    pub raw_tomo: Vec<(String, Vec<f64>)>,

    /// Corrected tomography vectors (basis label, counts)
    pub corrected_tomo: Vec<(String, Vec<f64>)>,

    /// Raw counts of the swap setting, when acquired
    pub raw_swap: Option<Vec<f64>>,

    /// Corrected counts of the swap setting
    pub corrected_swap: Option<Vec<f64>>,

    /// Per-qubit level populations, when the Z-basis vector was available
    pub populations: Option<BTreeMap<QubitId, PopulationEstimate>>,

    /// Non-fatal conditions observed during the run
    pub warnings: Vec<String>,

    /// Per-vector correction failures (context, error message)
    pub failures: Vec<(String, String)>,
}

impl RunRecord {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> AutocalResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> AutocalResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the record to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> AutocalResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load a record from a JSON file
    pub fn load(path: impl AsRef<Path>) -> AutocalResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Corrected tomography vector for a basis label, if it succeeded
    pub fn corrected_for(&self, basis: &str) -> Option<&[f64]> {
        self.corrected_tomo
            .iter()
            .find(|(label, _)| label == basis)
            .map(|(_, counts)| counts.as_slice())
    }

    /// Whether every configured basis corrected cleanly
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.corrected_tomo.len() == self.meas_order.len()
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run on qubits {:?}: {} calib preps, {} bases, protocol '{}'",
            self.qubits,
            self.calib_order.len(),
            self.meas_order.len(),
            self.protocol
        )?;
        for (q, disc) in &self.discrimination {
            writeln!(
                f,
                "  qubit {}: threshold {:.4}, angle {:.4}, fidelity {:.4}{}",
                q,
                disc.threshold,
                disc.angle,
                disc.fidelity,
                if disc.low_confidence { " (low)" } else { "" }
            )?;
        }
        writeln!(
            f,
            "  corrected {}/{} bases, {} warnings, {} failures",
            self.corrected_tomo.len(),
            self.meas_order.len(),
            self.warnings.len(),
            self.failures.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
