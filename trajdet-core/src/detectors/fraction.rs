//! Backscattered / transmitted / absorbed fractions of beam electrons

use crate::detector::{artifact_path, Detector, Phase, RESULTS_EXTENSION};
use crate::error::DetectorError;
use crate::event::{ElectronState, StepKind};
use crate::properties::PropertyBag;
use crate::table::{Field, TableSink};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Classifies every primary trajectory by how it ended.
///
/// An electron that neither backscattered nor was transmitted is counted as
/// absorbed. Secondary electrons are ignored.
#[derive(Debug, Clone, Default)]
pub struct ElectronFractionDetector {
    trajectories: u64,
    backscattered: u64,
    transmitted: u64,
    phase: Phase,
}

impl ElectronFractionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary trajectories started since the last reset
    pub fn trajectories(&self) -> u64 {
        self.trajectories
    }

    pub fn backscattered(&self) -> u64 {
        self.backscattered
    }

    pub fn transmitted(&self) -> u64 {
        self.transmitted
    }

    pub fn absorbed(&self) -> u64 {
        self.trajectories
            .saturating_sub(self.backscattered)
            .saturating_sub(self.transmitted)
    }

    pub fn backscattered_fraction(&self) -> f64 {
        self.fraction(self.backscattered)
    }

    pub fn transmitted_fraction(&self) -> f64 {
        self.fraction(self.transmitted)
    }

    pub fn absorbed_fraction(&self) -> f64 {
        self.fraction(self.absorbed())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn fraction(&self, count: u64) -> f64 {
        if self.trajectories == 0 {
            0.0
        } else {
            count as f64 / self.trajectories as f64
        }
    }
}

impl Detector for ElectronFractionDetector {
    fn on_attached(&mut self) {
        self.phase = Phase::Armed;
    }

    fn on_first_trajectory(&mut self) {
        self.reset();
        self.phase = Phase::Accumulating;
    }

    fn on_trajectory_start(&mut self, state: &ElectronState) {
        if self.phase.is_accumulating() && state.is_primary() {
            self.trajectories += 1;
        }
    }

    fn on_step(&mut self, step: StepKind, state: &ElectronState) {
        if !self.phase.is_accumulating() || !state.is_primary() {
            return;
        }
        if step == StepKind::Backscatter {
            self.backscattered += 1;
        } else if state.is_transmitted_exit(step) {
            self.transmitted += 1;
        }
    }

    fn reset(&mut self) {
        debug!("resetting electron fractions");
        self.trajectories = 0;
        self.backscattered = 0;
        self.transmitted = 0;
    }

    fn save_results(&mut self, dir: &Path, base_name: &str) -> Result<PathBuf, DetectorError> {
        let path = artifact_path(dir, base_name, RESULTS_EXTENSION);
        let io_err = |e| DetectorError::io(&path, e);

        let rows = [
            ("backscattered", self.backscattered, self.backscattered_fraction()),
            ("transmitted", self.transmitted, self.transmitted_fraction()),
            ("absorbed", self.absorbed(), self.absorbed_fraction()),
        ];

        let mut sink = TableSink::create(&path).map_err(io_err)?;
        sink.write_header(&["Kind", "Count", "Fraction"]).map_err(io_err)?;
        for (kind, count, fraction) in rows {
            sink.write_row(&[Field::Text(kind), Field::Integer(count), Field::Real(fraction)])
                .map_err(io_err)?;
        }
        sink.close().map_err(io_err)?;

        info!(path = %path.display(), trajectories = self.trajectories, "wrote electron fractions");
        self.phase = Phase::Finalised;
        Ok(path)
    }

    fn write_properties(&self, props: &mut PropertyBag) {
        props.set_property("fraction.trajectories", self.trajectories.to_string());
    }

    fn log_comment(&self) -> String {
        "ElectronFraction".to_string()
    }
}
