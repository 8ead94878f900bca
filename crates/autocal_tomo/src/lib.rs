//! # AUTOCAL Tomo
//!
//! Staged orchestration of readout calibration and state tomography:
//! calibration acquisition, threshold estimation, confusion build,
//! tomography acquisition, correction, and the serialized run record.
//!
//! ## Gantree Architecture
//!
//! ```text
//! autocal_tomo // L4: Orchestration (완료)
//!     Config // 실행 설정 (완료)
//!         TomoConfig - 기본값, 검증
//!     Orchestrator // 단계 기계 (완료)
//!         TomographyOrchestrator<B>, Stage
//!     Record // 실행 기록 (완료)
//!         RunRecord - serde_json
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use autocal_tomo::prelude::*;
//! use autocal_acquire::SimulatedAcquisition;
//!
//! let backend = SimulatedAcquisition::ideal(2)
//!     .with_seed(42)
//!     .with_protocol("bell", SimulatedAcquisition::bell_table());
//! let config = TomoConfig::two_qubit_default(0, 1).with_reps(200).with_seed(42);
//!
//! let mut orchestrator = TomographyOrchestrator::new(config, backend).unwrap();
//! let record = orchestrator.run().unwrap();
//! assert!(record.is_complete());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Run configuration (Gantree: L4_Orchestration → Config)
pub mod config;

/// Staged orchestration (Gantree: L4_Orchestration → Orchestrator)
pub mod orchestrator;

/// Run record (Gantree: L4_Orchestration → Record)
pub mod record;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TomoConfig;
pub use orchestrator::{Stage, TomographyOrchestrator};
pub use record::RunRecord;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use autocal_tomo::prelude::*;
    //! ```

    pub use crate::config::TomoConfig;
    pub use crate::orchestrator::{Stage, TomographyOrchestrator};
    pub use crate::record::RunRecord;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use autocal_acquire::SimulatedAcquisition;
    use std::collections::HashMap;

    /// Outcome table of |+> over the three single-qubit bases
    fn plus_table() -> HashMap<String, Vec<f64>> {
        let mut table = HashMap::new();
        table.insert("Z".to_string(), vec![0.5, 0.5]);
        table.insert("X".to_string(), vec![1.0, 0.0]);
        table.insert("Y".to_string(), vec![0.5, 0.5]);
        table
    }

    fn plus_backend(seed: u64) -> SimulatedAcquisition {
        SimulatedAcquisition::ideal(1)
            .with_seed(seed)
            .with_protocol("plus", plus_table())
    }

    #[test]
    fn test_single_qubit_plus_state_run() {
        let config = TomoConfig::single_qubit_default(0).with_reps(500).with_seed(3);
        let mut orchestrator =
            TomographyOrchestrator::new(config, plus_backend(3)).unwrap();
        let record = orchestrator.run().unwrap();

        assert!(record.is_complete(), "failures: {:?}", record.failures);

        // X basis pins the |+> state to the first bin
        let x = record.corrected_for("X").unwrap();
        let x_total: f64 = x.iter().sum();
        assert!(x[0] > 0.97 * x_total);

        // Z basis is an even split
        let pop = &record.populations.as_ref().unwrap()[&0];
        assert!(pop.g > 0.4 && pop.g < 0.6);
    }

    #[test]
    fn test_same_params_for_every_binned_vector() {
        // Every corrected vector descends from one frozen parameter set;
        // the record's discrimination summary is that set verbatim.
        let config = TomoConfig::two_qubit_default(0, 1).with_reps(300).with_seed(5);
        let backend = SimulatedAcquisition::ideal(2)
            .with_seed(5)
            .with_protocol("bell", SimulatedAcquisition::bell_table());

        let mut orchestrator = TomographyOrchestrator::new(config, backend).unwrap();
        let record = orchestrator.run().unwrap();

        let params = orchestrator.params().unwrap();
        for (&q, disc) in record.discrimination.iter() {
            assert_eq!(params.get(q).unwrap(), disc);
        }
        assert_eq!(record.discrimination.len(), 2);
    }

    #[test]
    fn test_seeded_runs_reproduce_record() {
        let make = |seed| {
            let config = TomoConfig::single_qubit_default(0)
                .with_reps(200)
                .with_seed(seed);
            let mut orchestrator =
                TomographyOrchestrator::new(config, plus_backend(seed)).unwrap();
            orchestrator.run().unwrap()
        };

        assert_eq!(make(11), make(11));
        assert_ne!(make(11).raw_tomo, make(12).raw_tomo);
    }

    #[test]
    fn test_record_survives_file_roundtrip() {
        let config = TomoConfig::single_qubit_default(0).with_reps(100).with_seed(7);
        let mut orchestrator =
            TomographyOrchestrator::new(config, plus_backend(7)).unwrap();
        let record = orchestrator.run().unwrap();

        let dir = std::env::temp_dir().join("autocal_tomo_record_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("record.json");

        record.save(&path).unwrap();
        let loaded = RunRecord::load(&path).unwrap();
        assert_eq!(loaded, record);

        std::fs::remove_file(&path).ok();
    }
}
