//! Staged run orchestration
//!
//! Gantree: L4_Orchestration → Orchestrator
//!
//! Drives one complete run against an acquisition backend through fixed
//! phases. Each phase method is guarded by the stage machine; `run()`
//! executes them all in order. Calibration shots are retained so the
//! confusion matrix is re-binned with the same discrimination parameters
//! used for the tomography data.

use crate::config::TomoConfig;
use crate::record::RunRecord;
use autocal_acquire::{AcquisitionBackend, MeasurementProgram, ShotRecord};
use autocal_core::{
    AutocalError, AutocalResult, BasisLabel, CalibLabel, CountVector, PopulationEstimate, QubitId,
};
use autocal_mitigation::{correct, fix, infer, ConfusionMatrix};
use autocal_readout::{bin_shots, CalibrationParams, ReadoutCalibrator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Stage
// ============================================================================

/// Run phase, advancing strictly in declaration order
/// Gantree: Stage // 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Nothing acquired yet
    Init,
    /// Calibration shots acquired
    Calibrating,
    /// Discrimination parameters frozen
    ThresholdEstimation,
    /// Confusion matrix built from re-binned calibration shots
    ConfusionBuild,
    /// Tomography vectors acquired and binned
    Tomography,
    /// Correction, repair, and inference applied
    Correction,
    /// Record produced
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::Calibrating => "CALIBRATING",
            Stage::ThresholdEstimation => "THRESHOLD_ESTIMATION",
            Stage::ConfusionBuild => "CONFUSION_BUILD",
            Stage::Tomography => "TOMOGRAPHY",
            Stage::Correction => "CORRECTION",
            Stage::Done => "DONE",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// TomographyOrchestrator
// ============================================================================

/// Staged orchestrator over one acquisition backend
/// Gantree: TomographyOrchestrator // 실행 오케스트레이터
pub struct TomographyOrchestrator<B: AcquisitionBackend> {
    /// Run configuration, immutable after construction
    config: TomoConfig,

    /// Acquisition backend, exclusively held for the run
    backend: B,

    /// Current stage
    stage: Stage,

    /// Calibration shots, aligned to `config.calib_order`
    calib_shots: Vec<ShotRecord>,

    /// Frozen discrimination parameters
    params: Option<CalibrationParams>,

    /// Confusion matrix
    confusion: Option<ConfusionMatrix>,

    /// Re-binned calibration vectors, aligned to `config.calib_order`
    raw_calib: Vec<CountVector>,

    /// Raw tomography vectors (basis label, counts)
    raw_tomo: Vec<(String, CountVector)>,

    /// Raw counts of the swap setting
    raw_swap: Option<CountVector>,

    /// Corrected calibration vectors (label, counts), successes only
    corrected_calib: Vec<(String, CountVector)>,

    /// Corrected tomography vectors (basis label, counts), successes only
    corrected_tomo: Vec<(String, CountVector)>,

    /// Corrected swap-setting counts
    corrected_swap: Option<CountVector>,

    /// Per-qubit populations from the computational-basis vector
    populations: Option<BTreeMap<QubitId, PopulationEstimate>>,

    /// Non-fatal conditions
    warnings: Vec<String>,

    /// Per-vector correction failures
    failures: Vec<(String, AutocalError)>,

    /// Verbose output
    verbose: bool,
}

impl<B: AcquisitionBackend> TomographyOrchestrator<B> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an orchestrator over `backend` with a validated config
    pub fn new(config: TomoConfig, backend: B) -> AutocalResult<Self> {
        config.validate()?;
        for &q in &config.qubits {
            if q >= backend.num_qubits() {
                return Err(AutocalError::QubitOutOfRange {
                    qubit: q,
                    max: backend.num_qubits(),
                });
            }
        }
        let verbose = config.verbose;
        Ok(Self {
            config,
            backend,
            stage: Stage::Init,
            calib_shots: Vec::new(),
            params: None,
            confusion: None,
            raw_calib: Vec::new(),
            raw_tomo: Vec::new(),
            raw_swap: None,
            corrected_calib: Vec::new(),
            corrected_tomo: Vec::new(),
            corrected_swap: None,
            populations: None,
            warnings: Vec::new(),
            failures: Vec::new(),
            verbose,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run configuration
    pub fn config(&self) -> &TomoConfig {
        &self.config
    }

    /// Frozen discrimination parameters, once estimated
    pub fn params(&self) -> Option<&CalibrationParams> {
        self.params.as_ref()
    }

    /// Confusion matrix, once built
    pub fn confusion(&self) -> Option<&ConfusionMatrix> {
        self.confusion.as_ref()
    }

    /// Warnings collected so far
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Correction failures collected so far
    pub fn failures(&self) -> &[(String, AutocalError)] {
        &self.failures
    }

    fn expect_stage(&self, expected: Stage) -> AutocalResult<()> {
        if self.stage != expected {
            return Err(AutocalError::StageViolation {
                expected: expected.to_string(),
                actual: self.stage.to_string(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // Phase 1: Calibration acquisition
    // ========================================================================

    /// Acquire one run per reference preparation, in bin order
    pub fn calibrate(&mut self) -> AutocalResult<()> {
        self.expect_stage(Stage::Init)?;

        for label in &self.config.calib_order {
            if self.verbose {
                println!("Orchestrator: acquiring calibration run '{}'...", label);
            }
            let program = MeasurementProgram::reference(&self.config.qubits, label.clone());
            let record = self.backend.acquire(&program, self.config.reps)?;
            self.calib_shots.push(record);
        }

        self.stage = Stage::Calibrating;
        Ok(())
    }

    // ========================================================================
    // Phase 2: Threshold estimation
    // ========================================================================

    /// Estimate discrimination parameters, one calibrator pass per qubit
    ///
    /// Uses the all-ground run and, for the qubit at position `k`, the run
    /// with `e` at `k` and `g` elsewhere. Parameters are frozen afterwards
    /// and shared by every later binning.
    pub fn estimate_thresholds(&mut self) -> AutocalResult<&CalibrationParams> {
        self.expect_stage(Stage::Calibrating)?;

        let n = self.config.num_qubits();
        let ground = self.run_index(&CalibLabel::ground(n))?;

        let calibrator = ReadoutCalibrator::new().with_fidelity_floor(self.config.fidelity_floor);
        let mut discs = Vec::with_capacity(n);
        let mut warnings = Vec::new();

        for (k, &q) in self.config.qubits.iter().enumerate() {
            let excited = self.run_index(&CalibLabel::excited_at(k, n)?)?;
            let disc = calibrator.calibrate(
                self.calib_shots[ground].row(k)?,
                self.calib_shots[excited].row(k)?,
            )?;

            if disc.low_confidence {
                if self.config.abort_on_low_fidelity {
                    return Err(AutocalError::FidelityBelowFloor {
                        qubit: q,
                        fidelity: disc.fidelity,
                        floor: self.config.fidelity_floor,
                    });
                }
                warnings.push(format!(
                    "qubit {}: discrimination fidelity {:.4} below floor {:.4}",
                    q, disc.fidelity, self.config.fidelity_floor
                ));
            }
            discs.push((q, disc));
        }

        for message in warnings {
            if self.verbose {
                println!("Orchestrator: WARNING {}", message);
            }
            self.warnings.push(message);
        }

        self.params = Some(CalibrationParams::from_iter(discs));
        self.stage = Stage::ThresholdEstimation;
        self.params
            .as_ref()
            .ok_or_else(|| AutocalError::InternalError("params vanished".to_string()))
    }

    /// Index of the calibration run prepared as `label`
    fn run_index(&self, label: &CalibLabel) -> AutocalResult<usize> {
        self.config
            .calib_order
            .iter()
            .position(|l| l == label)
            .filter(|&index| index < self.calib_shots.len())
            .ok_or_else(|| AutocalError::MissingCalibrationRun(label.to_string()))
    }

    // ========================================================================
    // Phase 3: Confusion build
    // ========================================================================

    /// Re-bin the retained calibration shots into the confusion matrix
    pub fn build_confusion(&mut self) -> AutocalResult<&ConfusionMatrix> {
        self.expect_stage(Stage::ThresholdEstimation)?;
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| AutocalError::InternalError("no params at confusion build".to_string()))?;

        for record in &self.calib_shots {
            let counts = bin_shots(record.rows(), params, &self.config.qubits)?;
            self.raw_calib.push(counts);
        }
        let confusion = ConfusionMatrix::from_rows(&self.raw_calib, &self.config.calib_order)?;

        if self.verbose {
            println!(
                "Orchestrator: confusion diagonal fidelity {:.4}",
                confusion.diagonal_fidelity()
            );
        }

        self.confusion = Some(confusion);
        self.stage = Stage::ConfusionBuild;
        self.confusion
            .as_ref()
            .ok_or_else(|| AutocalError::InternalError("confusion vanished".to_string()))
    }

    // ========================================================================
    // Phase 4: Tomography acquisition
    // ========================================================================

    /// Acquire and bin every configured basis with the frozen parameters
    ///
    /// When three-level estimates are requested, one extra run of the
    /// protocol under the swap setting is taken in the computational basis.
    pub fn run_tomography(&mut self) -> AutocalResult<()> {
        self.expect_stage(Stage::ConfusionBuild)?;
        let n = self.config.num_qubits();

        for basis in self.config.meas_order.clone() {
            if self.verbose {
                println!("Orchestrator: acquiring basis '{}'...", basis);
            }
            let program = MeasurementProgram::protocol(&self.config.qubits, &self.config.protocol)
                .with_basis(basis.clone());
            let counts = self.acquire_and_bin(&program)?;
            self.raw_tomo.push((basis.to_string(), counts));
        }

        if !self.config.f_level_qubits.is_empty() {
            if self.verbose {
                println!("Orchestrator: acquiring swap setting for f-level inference...");
            }
            let program = MeasurementProgram::protocol(&self.config.qubits, &self.config.protocol)
                .with_basis(BasisLabel::all_z(n))
                .with_ef_swap();
            self.raw_swap = Some(self.acquire_and_bin(&program)?);
        }

        self.stage = Stage::Tomography;
        Ok(())
    }

    fn acquire_and_bin(&mut self, program: &MeasurementProgram) -> AutocalResult<CountVector> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| AutocalError::InternalError("no params at tomography".to_string()))?;
        let record = self.backend.acquire(program, self.config.reps)?;
        bin_shots(record.rows(), params, &self.config.qubits)
    }

    // ========================================================================
    // Phase 5: Correction and inference
    // ========================================================================

    /// Correct and repair every vector, then infer populations
    ///
    /// A vector whose correction fails is recorded in `failures` and
    /// skipped; raw data and the other vectors are unaffected. The
    /// calibration vectors themselves are corrected as a self-consistency
    /// check. Populations come from the computational-basis vector when
    /// its correction succeeded.
    pub fn correct_counts(&mut self) -> AutocalResult<()> {
        self.expect_stage(Stage::Tomography)?;
        let confusion = self
            .confusion
            .as_ref()
            .ok_or_else(|| AutocalError::InternalError("no confusion at correction".to_string()))?;

        for (label, counts) in self.config.calib_order.iter().zip(&self.raw_calib) {
            match correct(counts, confusion).and_then(|c| fix(&c)) {
                Ok(fixed) => self.corrected_calib.push((label.to_string(), fixed)),
                Err(e) => self.failures.push((format!("calib:{}", label), e)),
            }
        }

        for (basis, counts) in &self.raw_tomo {
            match correct(counts, confusion).and_then(|c| fix(&c)) {
                Ok(fixed) => self.corrected_tomo.push((basis.clone(), fixed)),
                Err(e) => self.failures.push((basis.clone(), e)),
            }
        }

        if let Some(counts) = &self.raw_swap {
            match correct(counts, confusion).and_then(|c| fix(&c)) {
                Ok(fixed) => self.corrected_swap = Some(fixed),
                Err(e) => self.failures.push(("swap".to_string(), e)),
            }
        }

        self.infer_populations()?;
        self.stage = Stage::Correction;
        Ok(())
    }

    fn infer_populations(&mut self) -> AutocalResult<()> {
        let n = self.config.num_qubits();
        let z_label = BasisLabel::all_z(n).to_string();
        let z_counts = self
            .corrected_tomo
            .iter()
            .find(|(basis, _)| *basis == z_label)
            .map(|(_, counts)| counts);

        let Some(z_counts) = z_counts else {
            self.warnings.push(format!(
                "no corrected '{}' vector; populations not inferred",
                z_label
            ));
            return Ok(());
        };

        match infer(
            z_counts,
            &self.config.qubits,
            &self.config.calib_order,
            self.corrected_swap.as_ref(),
            &self.config.f_level_qubits,
        ) {
            Ok(populations) => {
                self.populations = Some(populations.into_iter().collect());
            }
            Err(e) => self.failures.push(("inference".to_string(), e)),
        }
        Ok(())
    }

    // ========================================================================
    // Phase 6: Record
    // ========================================================================

    /// Produce the run record and close the run
    pub fn finish(&mut self) -> AutocalResult<RunRecord> {
        self.expect_stage(Stage::Correction)?;

        let discrimination: BTreeMap<QubitId, _> = self
            .params
            .as_ref()
            .map(|p| p.iter().map(|(&q, &d)| (q, d)).collect())
            .unwrap_or_default();
        let confusion_rows = self
            .confusion
            .as_ref()
            .map(|c| c.to_rows())
            .unwrap_or_default();

        let record = RunRecord {
            qubits: self.config.qubits.clone(),
            reps: self.config.reps,
            protocol: self.config.protocol.clone(),
            seed: self.config.seed,
            calib_order: self
                .config
                .calib_order
                .iter()
                .map(|l| l.to_string())
                .collect(),
            meas_order: self
                .config
                .meas_order
                .iter()
                .map(|b| b.to_string())
                .collect(),
            discrimination,
            confusion_rows,
            raw_calib: self
                .raw_calib
                .iter()
                .map(|c| c.as_slice().to_vec())
                .collect(),
            corrected_calib: self
                .corrected_calib
                .iter()
                .map(|(l, c)| (l.clone(), c.as_slice().to_vec()))
                .collect(),
            raw_tomo: self
                .raw_tomo
                .iter()
                .map(|(b, c)| (b.clone(), c.as_slice().to_vec()))
                .collect(),
            corrected_tomo: self
                .corrected_tomo
                .iter()
                .map(|(b, c)| (b.clone(), c.as_slice().to_vec()))
                .collect(),
            raw_swap: self.raw_swap.as_ref().map(|c| c.as_slice().to_vec()),
            corrected_swap: self.corrected_swap.as_ref().map(|c| c.as_slice().to_vec()),
            populations: self.populations.clone(),
            warnings: self.warnings.clone(),
            failures: self
                .failures
                .iter()
                .map(|(context, e)| (context.clone(), e.to_string()))
                .collect(),
        };

        self.stage = Stage::Done;
        Ok(record)
    }

    // ========================================================================
    // Full run
    // ========================================================================

    /// Drive all phases in order
    pub fn run(&mut self) -> AutocalResult<RunRecord> {
        self.calibrate()?;
        self.estimate_thresholds()?;
        self.build_confusion()?;
        self.run_tomography()?;
        self.correct_counts()?;
        self.finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use autocal_acquire::SimulatedAcquisition;

    fn bell_backend(seed: u64) -> SimulatedAcquisition {
        SimulatedAcquisition::ideal(2)
            .with_seed(seed)
            .with_protocol("bell", SimulatedAcquisition::bell_table())
    }

    fn bell_config() -> TomoConfig {
        TomoConfig::two_qubit_default(0, 1).with_reps(400).with_seed(17)
    }

    #[test]
    fn test_stage_guards() {
        let mut orch = TomographyOrchestrator::new(bell_config(), bell_backend(17)).unwrap();
        assert_eq!(orch.stage(), Stage::Init);

        // Every later phase refuses to run from Init
        assert!(matches!(
            orch.estimate_thresholds(),
            Err(AutocalError::StageViolation { .. })
        ));
        assert!(matches!(
            orch.build_confusion(),
            Err(AutocalError::StageViolation { .. })
        ));
        assert!(matches!(
            orch.run_tomography(),
            Err(AutocalError::StageViolation { .. })
        ));
        assert!(matches!(
            orch.correct_counts(),
            Err(AutocalError::StageViolation { .. })
        ));
        assert!(matches!(
            orch.finish(),
            Err(AutocalError::StageViolation { .. })
        ));

        orch.calibrate().unwrap();
        assert_eq!(orch.stage(), Stage::Calibrating);
        // Calibrating twice is also a violation
        assert!(matches!(
            orch.calibrate(),
            Err(AutocalError::StageViolation { .. })
        ));
    }

    #[test]
    fn test_staged_execution_matches_run() {
        let mut staged = TomographyOrchestrator::new(bell_config(), bell_backend(17)).unwrap();
        staged.calibrate().unwrap();
        let params = staged.estimate_thresholds().unwrap().clone();
        staged.build_confusion().unwrap();
        staged.run_tomography().unwrap();
        staged.correct_counts().unwrap();
        let record_staged = staged.finish().unwrap();
        assert_eq!(staged.stage(), Stage::Done);

        let mut whole = TomographyOrchestrator::new(bell_config(), bell_backend(17)).unwrap();
        let record_whole = whole.run().unwrap();

        // Same seed, same phases: identical records and parameters
        assert_eq!(record_staged, record_whole);
        assert_eq!(Some(&params), whole.params());
    }

    #[test]
    fn test_full_run_produces_complete_record() {
        let mut orch = TomographyOrchestrator::new(bell_config(), bell_backend(23)).unwrap();
        let record = orch.run().unwrap();

        assert!(record.is_complete(), "failures: {:?}", record.failures);
        assert_eq!(record.raw_tomo.len(), 9);
        assert_eq!(record.corrected_tomo.len(), 9);
        assert_eq!(record.raw_calib.len(), 4);
        assert_eq!(record.corrected_calib.len(), 4);
        assert_eq!(record.confusion_rows.len(), 4);
        assert_eq!(record.discrimination.len(), 2);
        assert!(record.warnings.is_empty());

        // Ideal Bell state: ZZ correlations survive correction
        let zz = record.corrected_for("ZZ").unwrap();
        let total: f64 = zz.iter().sum();
        assert!((zz[0] + zz[3]) > 0.95 * total);
    }

    #[test]
    fn test_self_consistency_of_corrected_calibration() {
        let mut orch = TomographyOrchestrator::new(bell_config(), bell_backend(29)).unwrap();
        let record = orch.run().unwrap();

        for (i, (_, counts)) in record.corrected_calib.iter().enumerate() {
            let total: f64 = counts.iter().sum();
            assert!(
                counts[i] > 0.99 * total,
                "calib row {}: diagonal {} of {}",
                i,
                counts[i],
                total
            );
        }
    }

    #[test]
    fn test_missing_designated_run() {
        let mut config = bell_config();
        // Drop the all-ground run needed for threshold estimation
        config.calib_order.remove(0);
        let mut orch = TomographyOrchestrator::new(config, bell_backend(17)).unwrap();

        orch.calibrate().unwrap();
        assert!(matches!(
            orch.estimate_thresholds(),
            Err(AutocalError::MissingCalibrationRun(label)) if label == "gg"
        ));
    }

    #[test]
    fn test_unknown_protocol_fails_tomography_phase() {
        let config = bell_config().with_protocol("ghz");
        let mut orch = TomographyOrchestrator::new(config, bell_backend(17)).unwrap();

        orch.calibrate().unwrap();
        orch.estimate_thresholds().unwrap();
        orch.build_confusion().unwrap();
        assert!(matches!(
            orch.run_tomography(),
            Err(AutocalError::UnknownProtocol(_))
        ));
    }

    #[test]
    fn test_low_fidelity_warns_by_default() {
        use autocal_acquire::ReadoutModel;
        use autocal_core::PerQubit;

        // Overlapping blobs: discrimination barely better than chance
        let model = ReadoutModel {
            g_center: autocal_core::Shot::new(-0.02, 0.0),
            e_center: autocal_core::Shot::new(0.02, 0.0),
            sigma: 0.5,
            ..ReadoutModel::ideal()
        };
        let backend = SimulatedAcquisition::ideal(2)
            .with_readout(PerQubit::Scalar(model))
            .unwrap()
            .with_seed(31)
            .with_protocol("bell", SimulatedAcquisition::bell_table());

        let config = bell_config().with_fidelity_floor(0.9);
        let mut orch = TomographyOrchestrator::new(config, backend).unwrap();
        orch.calibrate().unwrap();
        orch.estimate_thresholds().unwrap();
        assert!(!orch.warnings().is_empty());
    }

    #[test]
    fn test_low_fidelity_aborts_when_configured() {
        use autocal_acquire::ReadoutModel;
        use autocal_core::PerQubit;

        let model = ReadoutModel {
            g_center: autocal_core::Shot::new(-0.02, 0.0),
            e_center: autocal_core::Shot::new(0.02, 0.0),
            sigma: 0.5,
            ..ReadoutModel::ideal()
        };
        let backend = SimulatedAcquisition::ideal(2)
            .with_readout(PerQubit::Scalar(model))
            .unwrap()
            .with_seed(31)
            .with_protocol("bell", SimulatedAcquisition::bell_table());

        let config = bell_config()
            .with_fidelity_floor(0.9)
            .with_abort_on_low_fidelity();
        let mut orch = TomographyOrchestrator::new(config, backend).unwrap();
        orch.calibrate().unwrap();
        assert!(matches!(
            orch.estimate_thresholds(),
            Err(AutocalError::FidelityBelowFloor { .. })
        ));
    }

    #[test]
    fn test_populations_from_z_basis() {
        let mut orch = TomographyOrchestrator::new(bell_config(), bell_backend(37)).unwrap();
        let record = orch.run().unwrap();

        let populations = record.populations.as_ref().unwrap();
        for q in [0, 1] {
            let pop = &populations[&q];
            // Bell state: each qubit is an even g/e mixture
            assert!(pop.g > 0.4 && pop.g < 0.6, "qubit {}: {}", q, pop);
            assert!(pop.is_normalized(1e-6));
        }
    }

    #[test]
    fn test_f_level_run_takes_swap_setting() {
        let config = bell_config().with_f_level_qubits(&[0]);
        let mut orch = TomographyOrchestrator::new(config, bell_backend(41)).unwrap();
        let record = orch.run().unwrap();

        assert!(record.raw_swap.is_some());
        assert!(record.corrected_swap.is_some());
        let populations = record.populations.as_ref().unwrap();
        // Ideal backend leaks no population to f
        assert!(populations[&0].f.abs() < 0.05);
        assert!(populations[&0].is_normalized(1e-6));
    }

    #[test]
    fn test_qubit_out_of_backend_range() {
        let config = TomoConfig::two_qubit_default(0, 5);
        assert!(matches!(
            TomographyOrchestrator::new(config, bell_backend(17)),
            Err(AutocalError::QubitOutOfRange { qubit: 5, .. })
        ));
    }

    #[test]
    fn test_record_json_roundtrip_after_run() {
        let mut orch = TomographyOrchestrator::new(bell_config(), bell_backend(43)).unwrap();
        let record = orch.run().unwrap();

        let json = record.to_json().unwrap();
        assert_eq!(RunRecord::from_json(&json).unwrap(), record);
    }
}
