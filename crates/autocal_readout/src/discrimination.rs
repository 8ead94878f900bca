//! Single-shot readout discrimination
//!
//! Gantree: L1_Readout → ReadoutCalibrator
//!
//! Derives a per-qubit IQ rotation angle and discrimination threshold from
//! labeled reference shots, along with the achieved readout fidelity.

use autocal_core::readout::{DEFAULT_FIDELITY_FLOOR, HIST_BINS};
use autocal_core::{AutocalError, AutocalResult, Shot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-qubit discrimination parameters
/// Gantree: Discrimination // (임계값, 회전각, 충실도)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discrimination {
    /// Threshold along the rotated I axis
    pub threshold: f64,

    /// IQ rotation angle in radians
    pub angle: f64,

    /// Discrimination fidelity (0.5 = no separation, 1.0 = perfect)
    pub fidelity: f64,

    /// Set when fidelity fell below the configured floor
    ///
    /// Informational only; downstream phases proceed with the computed
    /// values regardless.
    pub low_confidence: bool,
}

impl fmt::Display for Discrimination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Discrimination(threshold={:.3}, angle={:.4} rad, fidelity={:.4}{})",
            self.threshold,
            self.angle,
            self.fidelity,
            if self.low_confidence {
                ", LOW CONFIDENCE"
            } else {
                ""
            }
        )
    }
}

/// Derives discrimination parameters from reference shot samples
/// Gantree: ReadoutCalibrator // 판별 보정기
#[derive(Debug, Clone)]
pub struct ReadoutCalibrator {
    /// Histogram bins used for the threshold scan
    bins: usize,

    /// Fidelity below this floor raises the low-confidence flag
    fidelity_floor: f64,
}

impl Default for ReadoutCalibrator {
    fn default() -> Self {
        Self {
            bins: HIST_BINS,
            fidelity_floor: DEFAULT_FIDELITY_FLOOR,
        }
    }
}

impl ReadoutCalibrator {
    /// Create with default histogram resolution and fidelity floor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fidelity floor for the low-confidence flag
    pub fn with_fidelity_floor(mut self, floor: f64) -> Self {
        self.fidelity_floor = floor;
        self
    }

    /// Set the histogram bin count for the threshold scan
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins.max(2);
        self
    }

    /// Derive (threshold, angle, fidelity) from reference shots
    ///
    /// `g_shots` were taken with the qubit prepared in the ground state,
    /// `e_shots` with it prepared in the excited state. The rotation angle
    /// aligns the population centroids along the I axis; the threshold
    /// maximizes cumulative contrast between the two rotated histograms.
    /// Gantree: calibrate(g, e) -> Discrimination // 단발 판별
    pub fn calibrate(&self, g_shots: &[Shot], e_shots: &[Shot]) -> AutocalResult<Discrimination> {
        if g_shots.is_empty() {
            return Err(AutocalError::EmptyShotSample("ground reference".into()));
        }
        if e_shots.is_empty() {
            return Err(AutocalError::EmptyShotSample("excited reference".into()));
        }

        // Rotation angle from the centroid separation vector
        let (ig, qg) = centroid(g_shots);
        let (ie, qe) = centroid(e_shots);
        let angle = -(qe - qg).atan2(ie - ig);

        // Project both populations onto the rotated I axis
        let g_proj: Vec<f64> = g_shots.iter().map(|s| s.rotated(angle).i).collect();
        let e_proj: Vec<f64> = e_shots.iter().map(|s| s.rotated(angle).i).collect();

        // Shared histogram range over both samples
        let lo = min_of(&g_proj).min(min_of(&e_proj));
        let hi = max_of(&g_proj).max(max_of(&e_proj));
        let (lo, hi) = if hi > lo {
            (lo, hi)
        } else {
            // Fully degenerate sample: widen artificially so the scan
            // terminates with a well-defined (useless) threshold.
            (lo - 0.5, hi + 0.5)
        };

        let ng = histogram(&g_proj, lo, hi, self.bins);
        let ne = histogram(&e_proj, lo, hi, self.bins);

        // Threshold at max cumulative contrast; fidelity from the
        // misclassification minimum at that threshold.
        let width = (hi - lo) / self.bins as f64;
        let mut cum_g = 0.0;
        let mut cum_e = 0.0;
        let mut best_contrast = 0.0;
        let mut best_bin = 0;
        for k in 0..self.bins {
            cum_g += ng[k] as f64 / g_proj.len() as f64;
            cum_e += ne[k] as f64 / e_proj.len() as f64;
            let contrast = (cum_g - cum_e).abs();
            if contrast > best_contrast {
                best_contrast = contrast;
                best_bin = k;
            }
        }

        // Upper edge of the winning bin: shots at the threshold itself
        // classify as excited.
        let threshold = lo + width * (best_bin + 1) as f64;
        let fidelity = 0.5 * (1.0 + best_contrast);

        Ok(Discrimination {
            threshold,
            angle,
            fidelity,
            low_confidence: fidelity < self.fidelity_floor,
        })
    }
}

fn centroid(shots: &[Shot]) -> (f64, f64) {
    let n = shots.len() as f64;
    let i = shots.iter().map(|s| s.i).sum::<f64>() / n;
    let q = shots.iter().map(|s| s.q).sum::<f64>() / n;
    (i, q)
}

fn min_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(xs: &[f64]) -> f64 {
    xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn histogram(xs: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &x in xs {
        let k = (((x - lo) / width) as usize).min(bins - 1);
        counts[k] += 1;
    }
    counts
}

// ============================================================================
// Tests
// ============================================================================
