//! Per-qubit configuration expansion
//!
//! Gantree: L0_Foundation → PerQubit
//!
//! Device configs routinely give one scalar meant to apply to every qubit.
//! Expansion happens exactly once at run setup, producing an immutable
//! per-qubit snapshot; configuration is never mutated mid-run.

use crate::error::{AutocalError, AutocalResult};
use serde::{Deserialize, Serialize};

/// A config value given either once for all qubits or per qubit
/// Gantree: PerQubit<T> // 스칼라/리스트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerQubit<T> {
    /// One value broadcast to every qubit
    Scalar(T),
    /// Explicit per-qubit values
    List(Vec<T>),
}

impl<T: Clone> PerQubit<T> {
    /// Expand to exactly `n` per-qubit values
    ///
    /// A scalar broadcasts; a list must already have length `n`.
    /// Gantree: expand(n) -> Vec<T> // 확장
    pub fn expand(&self, n: usize) -> AutocalResult<Vec<T>> {
        match self {
            PerQubit::Scalar(v) => Ok(vec![v.clone(); n]),
            PerQubit::List(vs) => {
                if vs.len() != n {
                    return Err(AutocalError::PerQubitLengthMismatch {
                        expected: n,
                        got: vs.len(),
                    });
                }
                Ok(vs.clone())
            }
        }
    }
}

impl<T> From<T> for PerQubit<T> {
    fn from(v: T) -> Self {
        PerQubit::Scalar(v)
    }
}

impl<T> From<Vec<T>> for PerQubit<T> {
    fn from(vs: Vec<T>) -> Self {
        PerQubit::List(vs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_broadcast() {
        let p: PerQubit<f64> = 0.5.into();
        assert_eq!(p.expand(4).unwrap(), vec![0.5; 4]);
    }

    #[test]
    fn test_list_passthrough() {
        let p: PerQubit<f64> = vec![1.0, 2.0, 3.0].into();
        assert_eq!(p.expand(3).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_list_length_mismatch() {
        let p: PerQubit<f64> = vec![1.0, 2.0].into();
        assert!(matches!(
            p.expand(3),
            Err(AutocalError::PerQubitLengthMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn test_serde_untagged() {
        let scalar: PerQubit<f64> = serde_json::from_str("0.25").unwrap();
        assert_eq!(scalar, PerQubit::Scalar(0.25));

        let list: PerQubit<f64> = serde_json::from_str("[0.1, 0.2]").unwrap();
        assert_eq!(list, PerQubit::List(vec![0.1, 0.2]));
    }
}
