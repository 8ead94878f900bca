//! Shot classification and outcome binning
//!
//! Gantree: L1_Readout → Classify
//!
//! Sorts raw shots into ground/excited against the calibrated rotation
//! angle and threshold, and bins joint outcomes into a count vector
//! aligned to the fixed calibration-label order.

use crate::discrimination::Discrimination;
use crate::params::CalibrationParams;
use autocal_core::{AutocalError, AutocalResult, CountVector, QubitId, Shot};

/// Classify a single shot as excited
///
/// A shot exactly at the threshold counts as excited; this tie-break is
/// load-bearing and must not drift.
/// Gantree: classify(shot, disc) -> bool // 임계값 분류
#[inline]
pub fn classify(shot: &Shot, disc: &Discrimination) -> bool {
    shot.rotated(disc.angle).i >= disc.threshold
}

/// Bin per-qubit shot sequences into a joint count vector
///
/// `shots[k]` holds the shots of `qubits[k]`, one per repetition, all
/// sequences equally long. The first listed qubit is the most significant
/// bit of the bin index, matching the `gg, ge, eg, ee` label convention.
/// Gantree: bin_shots(shots, params, qubits) -> CountVector // 비닝
pub fn bin_shots(
    shots: &[Vec<Shot>],
    params: &CalibrationParams,
    qubits: &[QubitId],
) -> AutocalResult<CountVector> {
    if shots.len() != qubits.len() {
        return Err(AutocalError::InternalError(format!(
            "{} shot sequences for {} qubits",
            shots.len(),
            qubits.len()
        )));
    }
    let reps = shots.first().map(|s| s.len()).unwrap_or(0);
    if shots.iter().any(|s| s.len() != reps) {
        return Err(AutocalError::InternalError(
            "shot sequences of unequal length".into(),
        ));
    }

    let n = qubits.len();
    let discs: Vec<&Discrimination> = qubits
        .iter()
        .map(|&q| params.get(q))
        .collect::<AutocalResult<_>>()?;

    let mut counts = CountVector::zeros(1 << n);
    for rep in 0..reps {
        let mut idx = 0usize;
        for (k, disc) in discs.iter().enumerate() {
            if classify(&shots[k][rep], disc) {
                idx |= 1 << (n - 1 - k);
            }
        }
        counts.increment(idx);
    }
    Ok(counts)
}

// ============================================================================
// Tests
// ============================================================================
