//! Empirical confusion matrix
//!
//! Gantree: L2_Mitigation → ConfusionMatrix
//!
//! Maps prepared reference states to observed classification bins. Built
//! once per run from the re-binned calibration shots; entry (i, j) counts
//! how often preparation i landed in outcome bin j.

use autocal_core::{AutocalError, AutocalResult, CalibLabel, CountVector};
use ndarray::Array2;
use std::fmt;

/// Confusion (cross-talk) matrix with its attached label order
/// Gantree: ConfusionMatrix // 혼동 행렬
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    /// Rows = prepared label, columns = observed bin
    matrix: Array2<f64>,

    /// Label order shared by rows and columns
    order: Vec<CalibLabel>,
}

impl ConfusionMatrix {
    /// Build from one count vector per calibration label
    ///
    /// Rows follow `order`; each row must have one bin per label
    /// (square matrix) and a positive total.
    pub fn from_rows(rows: &[CountVector], order: &[CalibLabel]) -> AutocalResult<Self> {
        if rows.len() != order.len() {
            return Err(AutocalError::LabelMismatch {
                expected: order.len(),
                actual: rows.len(),
            });
        }
        let n = order.len();
        let mut matrix = Array2::zeros((n, n));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(AutocalError::LabelMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
            if row.total() <= 0.0 {
                return Err(AutocalError::NonpositiveTotalCount(row.total()));
            }
            for (j, &c) in row.as_slice().iter().enumerate() {
                matrix[(i, j)] = c;
            }
        }
        Ok(Self {
            matrix,
            order: order.to_vec(),
        })
    }

    /// Number of labels (matrix dimension)
    pub fn num_labels(&self) -> usize {
        self.order.len()
    }

    /// Attached label order
    pub fn order(&self) -> &[CalibLabel] {
        &self.order
    }

    /// Raw count matrix
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Total count of row `i` (repetitions used to build it)
    pub fn row_total(&self, i: usize) -> f64 {
        self.matrix.row(i).sum()
    }

    /// Per-preparation outcome distributions (each row sums to 1)
    /// Gantree: row_normalized() -> Array2 // 행 정규화
    pub fn row_normalized(&self) -> Array2<f64> {
        let mut normalized = self.matrix.clone();
        for mut row in normalized.rows_mut() {
            let total = row.sum();
            // from_rows guarantees total > 0
            row.mapv_inplace(|c| c / total);
        }
        normalized
    }

    /// Mean normalized diagonal entry
    ///
    /// 1.0 means every preparation was always observed in its own bin;
    /// useful as a quick readout-quality summary.
    pub fn diagonal_fidelity(&self) -> f64 {
        let normalized = self.row_normalized();
        let n = self.num_labels();
        (0..n).map(|i| normalized[(i, i)]).sum::<f64>() / n as f64
    }

    /// Rows as plain count vectors (for the serializable run record)
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.matrix.rows().into_iter().map(|r| r.to_vec()).collect()
    }

    /// Identity confusion for `order` with `reps` counts per row
    ///
    /// Models a perfect readout; `correct` against it is a no-op.
    pub fn identity(order: &[CalibLabel], reps: f64) -> Self {
        let n = order.len();
        let mut matrix = Array2::zeros((n, n));
        for i in 0..n {
            matrix[(i, i)] = reps;
        }
        Self {
            matrix,
            order: order.to_vec(),
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ConfusionMatrix ({} labels):", self.num_labels())?;
        for (i, label) in self.order.iter().enumerate() {
            write!(f, "  {} |", label)?;
            for j in 0..self.num_labels() {
                write!(f, " {:8.1}", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
