//! Simulated acquisition backend
//!
//! Gantree: L3_Acquire → Simulator
//!
//! Draws IQ shots from per-qubit Gaussian blobs whose centers depend on the
//! qubit level at detection time. Protocol states are sampled from joint
//! outcome distributions registered per basis label, standing in for the
//! apparatus that prepares the state under characterization.

use crate::backend::AcquisitionBackend;
use crate::program::{MeasurementProgram, PrepSpec, ShotRecord};
use autocal_core::{
    AutocalError, AutocalResult, BasisLabel, Level, PerQubit, Shot,
};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::f64::consts::PI;

// ============================================================================
// ReadoutModel
// ============================================================================

/// Per-qubit detection model: one IQ blob center per level, shared sigma
/// Gantree: ReadoutModel // 판독 모형
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadoutModel {
    /// Blob center when the qubit is detected in g
    pub g_center: Shot,
    /// Blob center when the qubit is detected in e
    pub e_center: Shot,
    /// Blob center when the qubit is detected in f
    pub f_center: Shot,
    /// Gaussian blob standard deviation (both quadratures)
    pub sigma: f64,
    /// Probability that a non-ground reference prep falls back to g
    pub prep_error: f64,
    /// Probability that e relaxes to g (and f to e) before detection
    pub relaxation: f64,
}

impl ReadoutModel {
    /// Well-separated blobs, no prep or relaxation errors
    pub fn ideal() -> Self {
        Self {
            g_center: Shot::new(-1.0, 0.0),
            e_center: Shot::new(1.0, 0.0),
            f_center: Shot::new(1.4, 1.2),
            sigma: 0.05,
            prep_error: 0.0,
            relaxation: 0.0,
        }
    }

    /// Overlapping blobs with realistic prep and relaxation errors
    pub fn typical() -> Self {
        Self {
            sigma: 0.35,
            prep_error: 0.01,
            relaxation: 0.03,
            ..Self::ideal()
        }
    }

    /// Blob center for a detected level
    fn center(&self, level: Level) -> Shot {
        match level {
            Level::Ground => self.g_center,
            Level::Excited => self.e_center,
            Level::SecondExcited => self.f_center,
        }
    }
}

impl Default for ReadoutModel {
    fn default() -> Self {
        Self::typical()
    }
}

// ============================================================================
// SimulatedAcquisition
// ============================================================================

/// Simulated backend with seeded randomness and a protocol registry
/// Gantree: SimulatedAcquisition // 시뮬레이터 구현
pub struct SimulatedAcquisition {
    /// Backend name
    name: String,

    /// Detection model per addressable qubit
    models: Vec<ReadoutModel>,

    /// Protocol name -> (basis label string -> joint outcome weights)
    ///
    /// Weights are indexed like count-vector bins: the first program qubit
    /// is the most significant bit.
    protocols: HashMap<String, HashMap<String, Vec<f64>>>,

    /// Shot-sampling randomness, persistent across acquisitions
    rng: StdRng,
}

impl SimulatedAcquisition {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with `num_qubits` typical detection models
    pub fn new(num_qubits: usize) -> Self {
        Self {
            name: "autocal_simulator".to_string(),
            models: vec![ReadoutModel::typical(); num_qubits],
            protocols: HashMap::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Create with noiseless, well-separated detection models
    pub fn ideal(num_qubits: usize) -> Self {
        Self {
            models: vec![ReadoutModel::ideal(); num_qubits],
            ..Self::new(num_qubits)
        }
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set detection models, one scalar broadcast or one per qubit
    pub fn with_readout(
        mut self,
        readout: impl Into<PerQubit<ReadoutModel>>,
    ) -> AutocalResult<Self> {
        let n = self.models.len();
        self.models = readout.into().expand(n)?;
        Ok(self)
    }

    /// Register a protocol's joint outcome weights per basis label
    pub fn with_protocol(mut self, name: &str, table: HashMap<String, Vec<f64>>) -> Self {
        self.protocols.insert(name.to_string(), table);
        self
    }

    /// Outcome table of the ideal two-qubit Bell state (|gg> + |ee>)
    ///
    /// Covers the nine two-qubit tomography bases.
    pub fn bell_table() -> HashMap<String, Vec<f64>> {
        let mut table = HashMap::new();
        let correlated = vec![0.5, 0.0, 0.0, 0.5];
        let anticorrelated = vec![0.0, 0.5, 0.5, 0.0];
        let uniform = vec![0.25; 4];

        table.insert("ZZ".to_string(), correlated.clone());
        table.insert("XX".to_string(), correlated);
        table.insert("YY".to_string(), anticorrelated);
        for basis in ["ZX", "ZY", "XZ", "XY", "YZ", "YX"] {
            table.insert(basis.to_string(), uniform.clone());
        }
        table
    }

    // ========================================================================
    // Shot sampling
    // ========================================================================

    /// Standard normal via Box-Muller
    fn gauss(rng: &mut StdRng) -> f64 {
        let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Draw one bin index from unnormalized weights
    fn sample_bin(rng: &mut StdRng, weights: &[f64], total: f64) -> usize {
        let draw = rng.gen::<f64>() * total;
        let mut acc = 0.0;
        for (bin, &w) in weights.iter().enumerate() {
            acc += w;
            if draw < acc {
                return bin;
            }
        }
        weights.len() - 1
    }
}

/// Prep resolved against the registry, hoisted out of the shot loop
enum ResolvedPrep<'a> {
    Reference(&'a autocal_core::CalibLabel),
    Distribution { weights: &'a [f64], total: f64 },
}

impl AcquisitionBackend for SimulatedAcquisition {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.models.len()
    }

    fn acquire(
        &mut self,
        program: &MeasurementProgram,
        reps: usize,
    ) -> AutocalResult<ShotRecord> {
        self.check_program(program)?;
        if reps == 0 {
            return Err(AutocalError::BackendError(
                "zero repetitions requested".to_string(),
            ));
        }

        let n = program.num_qubits();
        let prep = match &program.prep {
            PrepSpec::Reference(label) => ResolvedPrep::Reference(label),
            PrepSpec::Protocol(name) => {
                let table = self
                    .protocols
                    .get(name)
                    .ok_or_else(|| AutocalError::UnknownProtocol(name.clone()))?;
                let key = program
                    .basis
                    .clone()
                    .unwrap_or_else(|| BasisLabel::all_z(n))
                    .to_string();
                let weights = table.get(&key).ok_or_else(|| {
                    AutocalError::UnknownProtocol(format!("{}[{}]", name, key))
                })?;
                if weights.len() != 1 << n {
                    return Err(AutocalError::LabelMismatch {
                        expected: 1 << n,
                        actual: weights.len(),
                    });
                }
                let total: f64 = weights.iter().sum();
                if total <= 0.0 {
                    return Err(AutocalError::BackendError(format!(
                        "protocol {}[{}] has nonpositive total weight",
                        name, key
                    )));
                }
                ResolvedPrep::Distribution { weights, total }
            }
        };

        let rng = &mut self.rng;
        let mut rows: Vec<Vec<Shot>> = vec![Vec::with_capacity(reps); n];

        for _ in 0..reps {
            let mut levels: Vec<Level> = match &prep {
                ResolvedPrep::Reference(label) => (0..n)
                    .map(|k| {
                        let level = label.level_at(k).unwrap_or(Level::Ground);
                        // Imperfect preparation falls back to ground
                        let model = &self.models[program.qubits[k]];
                        if level != Level::Ground && rng.gen::<f64>() < model.prep_error {
                            Level::Ground
                        } else {
                            level
                        }
                    })
                    .collect(),
                ResolvedPrep::Distribution { weights, total } => {
                    let bin = Self::sample_bin(rng, weights, *total);
                    (0..n)
                        .map(|k| {
                            if (bin >> (n - 1 - k)) & 1 == 1 {
                                Level::Excited
                            } else {
                                Level::Ground
                            }
                        })
                        .collect()
                }
            };

            for (k, level) in levels.iter_mut().enumerate() {
                let model = &self.models[program.qubits[k]];

                // Decay one level down before detection
                if rng.gen::<f64>() < model.relaxation {
                    *level = match *level {
                        Level::Ground => Level::Ground,
                        Level::Excited => Level::Ground,
                        Level::SecondExcited => Level::Excited,
                    };
                }

                // Reference preps are Z eigenstates: a rotated readout of
                // g or e is an even coin. Protocol tables are already
                // keyed per basis and need no extra handling.
                if matches!(prep, ResolvedPrep::Reference(_)) {
                    if let Some(basis) = &program.basis {
                        let rotated = basis.get(k).map(|b| b.needs_rotation()).unwrap_or(false);
                        if rotated && *level != Level::SecondExcited {
                            *level = if rng.gen::<bool>() {
                                Level::Ground
                            } else {
                                Level::Excited
                            };
                        }
                    }
                }

                // Swap setting exchanges g/e occupation, f is untouched
                if program.ef_swap {
                    *level = match *level {
                        Level::Ground => Level::Excited,
                        Level::Excited => Level::Ground,
                        Level::SecondExcited => Level::SecondExcited,
                    };
                }

                let center = model.center(*level);
                rows[k].push(Shot::new(
                    center.i + model.sigma * Self::gauss(rng),
                    center.q + model.sigma * Self::gauss(rng),
                ));
            }
        }

        ShotRecord::new(rows)
    }
}

// ============================================================================
// Tests
// ============================================================================
