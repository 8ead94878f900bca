//! State-population inference
//!
//! Gantree: L2_Mitigation → Inference
//!
//! Converts corrected, repaired count vectors into per-qubit occupation
//! probabilities over two or three levels. The three-level path needs a
//! second count vector taken under the swap measurement setting, which
//! moves the excited state into the classification-ground bin before
//! detection.

use autocal_core::{
    AutocalError, AutocalResult, CalibLabel, CountVector, Level, PopulationEstimate, QubitId,
};
use std::collections::HashMap;

/// Infer per-qubit level populations from corrected count vectors
///
/// `counts1` is indexed by `calib_order`; each bin's normalized weight is
/// attributed to the g-population of every qubit whose label character is
/// `g`, and to the e-population otherwise. For qubits in `f_level_qubits`
/// the e-population is re-derived from `counts2` (g-labeled bins count as
/// true e because of the swap) and the f-population closes the
/// normalization.
/// Gantree: infer(...) -> HashMap<QubitId, PopulationEstimate> // 점유율 추론
pub fn infer(
    counts1: &CountVector,
    qubits: &[QubitId],
    calib_order: &[CalibLabel],
    counts2: Option<&CountVector>,
    f_level_qubits: &[QubitId],
) -> AutocalResult<HashMap<QubitId, PopulationEstimate>> {
    if counts1.len() != calib_order.len() {
        return Err(AutocalError::LabelMismatch {
            expected: calib_order.len(),
            actual: counts1.len(),
        });
    }
    for label in calib_order {
        if label.len() != qubits.len() {
            return Err(AutocalError::LabelMismatch {
                expected: qubits.len(),
                actual: label.len(),
            });
        }
    }
    for &q in f_level_qubits {
        if !qubits.contains(&q) {
            return Err(AutocalError::QubitOutOfRange {
                qubit: q,
                max: qubits.iter().copied().max().unwrap_or(0),
            });
        }
    }

    // First pass: binary g vs not-g split, indexed by qubit position
    let weights1 = counts1.normalized()?;
    let mut g_pop = vec![0.0; qubits.len()];
    let mut e_pop = vec![0.0; qubits.len()];

    for (bin, label) in calib_order.iter().enumerate() {
        let w = weights1[bin];
        for pos in 0..qubits.len() {
            match label.level_at(pos) {
                Some(Level::Ground) => g_pop[pos] += w,
                _ => e_pop[pos] += w,
            }
        }
    }

    // Second pass: true e-population from the swap setting
    let mut f_pop = vec![0.0; qubits.len()];
    if !f_level_qubits.is_empty() {
        let counts2 = counts2
            .ok_or_else(|| AutocalError::MissingSecondPass(f_level_qubits.to_vec()))?;
        if counts2.len() != calib_order.len() {
            return Err(AutocalError::LabelMismatch {
                expected: calib_order.len(),
                actual: counts2.len(),
            });
        }
        let weights2 = counts2.normalized()?;

        let flagged: Vec<usize> = qubits
            .iter()
            .enumerate()
            .filter(|(_, q)| f_level_qubits.contains(q))
            .map(|(pos, _)| pos)
            .collect();

        for &pos in &flagged {
            e_pop[pos] = 0.0;
        }
        for (bin, label) in calib_order.iter().enumerate() {
            let w = weights2[bin];
            for &pos in &flagged {
                if label.level_at(pos) == Some(Level::Ground) {
                    // The swap put e into the g bin before detection
                    e_pop[pos] += w;
                }
            }
        }
        for &pos in &flagged {
            f_pop[pos] = 1.0 - g_pop[pos] - e_pop[pos];
        }
    }

    Ok(qubits
        .iter()
        .enumerate()
        .map(|(pos, &q)| {
            (
                q,
                PopulationEstimate::three_level(g_pop[pos], e_pop[pos], f_pop[pos]),
            )
        })
        .collect())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn labels(names: &[&str]) -> Vec<CalibLabel> {
        names.iter().map(|s| CalibLabel::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_single_qubit_binary_split() {
        let counts = CountVector::new(vec![80.0, 20.0]);
        let pops = infer(&counts, &[0], &labels(&["g", "e"]), None, &[]).unwrap();

        let pop = pops[&0];
        assert_abs_diff_eq!(pop.g, 0.8);
        assert_abs_diff_eq!(pop.e, 0.2);
        assert_abs_diff_eq!(pop.f, 0.0);
        assert!(pop.is_normalized(1e-12));
    }

    #[test]
    fn test_joint_bins_split_independently() {
        let counts = CountVector::new(vec![50.0, 0.0, 0.0, 50.0]);
        let pops = infer(
            &counts,
            &[0, 1],
            &labels(&["gg", "ge", "eg", "ee"]),
            None,
            &[],
        )
        .unwrap();

        for q in [0, 1] {
            assert_abs_diff_eq!(pops[&q].g, 0.5);
            assert_abs_diff_eq!(pops[&q].e, 0.5);
            assert_abs_diff_eq!(pops[&q].f, 0.0);
        }
    }

    #[test]
    fn test_three_level_inference() {
        // First setting: 10% classified g, 90% not-g
        let counts1 = CountVector::new(vec![10.0, 90.0]);
        // Swap setting: 70% land in the g bin, i.e. true e = 0.7
        let counts2 = CountVector::new(vec![70.0, 30.0]);

        let pops = infer(
            &counts1,
            &[0],
            &labels(&["g", "e"]),
            Some(&counts2),
            &[0],
        )
        .unwrap();

        let pop = pops[&0];
        assert_abs_diff_eq!(pop.g, 0.1);
        assert_abs_diff_eq!(pop.e, 0.7);
        assert_abs_diff_eq!(pop.f, 0.2, epsilon = 1e-12);
        assert!(pop.is_normalized(1e-12));
    }

    #[test]
    fn test_three_level_only_for_flagged_qubits() {
        let counts1 = CountVector::new(vec![10.0, 40.0, 10.0, 40.0]);
        let counts2 = CountVector::new(vec![30.0, 20.0, 30.0, 20.0]);
        let order = labels(&["gg", "ge", "eg", "ee"]);

        let pops = infer(&counts1, &[0, 1], &order, Some(&counts2), &[1]).unwrap();

        // Qubit 0 keeps its two-level estimate
        assert_abs_diff_eq!(pops[&0].g, 0.5);
        assert_abs_diff_eq!(pops[&0].e, 0.5);
        assert_abs_diff_eq!(pops[&0].f, 0.0);

        // Qubit 1: g from counts1 (0.2), e from counts2 g-bins (0.6)
        assert_abs_diff_eq!(pops[&1].g, 0.2);
        assert_abs_diff_eq!(pops[&1].e, 0.6);
        assert_abs_diff_eq!(pops[&1].f, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_second_pass() {
        let counts = CountVector::new(vec![80.0, 20.0]);
        assert!(matches!(
            infer(&counts, &[0], &labels(&["g", "e"]), None, &[0]),
            Err(AutocalError::MissingSecondPass(_))
        ));
    }

    #[test]
    fn test_label_mismatch() {
        let counts = CountVector::new(vec![80.0, 20.0, 0.0]);
        assert!(matches!(
            infer(&counts, &[0], &labels(&["g", "e"]), None, &[]),
            Err(AutocalError::LabelMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_label_width_mismatch() {
        // Two-qubit labels with one listed qubit
        let counts = CountVector::new(vec![25.0, 25.0, 25.0, 25.0]);
        assert!(matches!(
            infer(&counts, &[0], &labels(&["gg", "ge", "eg", "ee"]), None, &[]),
            Err(AutocalError::LabelMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }
}
