//! Wiring of configured detectors to a replay engine

use crate::config::RunConfig;
use crate::detector::{attach, Detector};
use crate::engine::ReplayEngine;
use crate::error::DetectorError;
use crate::event::Event;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;

/// A detector together with the base name of its artifacts
pub struct NamedDetector {
    pub base_name: String,
    pub detector: Rc<RefCell<dyn Detector>>,
}

/// Paths written for one detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorArtifacts {
    pub base_name: String,
    pub results: PathBuf,
    pub log: PathBuf,
}

/// Detectors registered with a replay engine
pub struct Session {
    engine: ReplayEngine,
    detectors: Vec<NamedDetector>,
}

impl Session {
    /// Validate `config`, build every detector and register it
    pub fn from_config(config: &RunConfig) -> Result<Self, DetectorError> {
        config.validate()?;

        let mut engine = ReplayEngine::new();
        let mut detectors = Vec::with_capacity(config.detectors.len());
        for entry in &config.detectors {
            let detector = entry.build()?;
            attach(&detector, &mut engine)?;
            detectors.push(NamedDetector {
                base_name: entry.base_name.clone(),
                detector,
            });
        }

        Ok(Self { engine, detectors })
    }

    pub fn detectors(&self) -> &[NamedDetector] {
        &self.detectors
    }

    pub fn engine(&self) -> &ReplayEngine {
        &self.engine
    }

    /// Feed a recorded event sequence to all detectors
    pub fn replay<I>(&mut self, events: I) -> u64
    where
        I: IntoIterator<Item = Event>,
    {
        self.engine.replay(events)
    }

    /// Write both artifacts of every detector into `dir`, creating it if
    /// needed. Stops at the first failure.
    pub fn save_all(&self, dir: &Path) -> Result<Vec<DetectorArtifacts>, DetectorError> {
        fs::create_dir_all(dir).map_err(|e| DetectorError::io(dir, e))?;

        let mut written = Vec::with_capacity(self.detectors.len());
        for named in &self.detectors {
            let mut detector = named.detector.borrow_mut();
            let results = detector.save_results(dir, &named.base_name)?;
            let log = detector.save_log(dir, &named.base_name)?;
            written.push(DetectorArtifacts {
                base_name: named.base_name.clone(),
                results,
                log,
            });
        }

        info!(dir = %dir.display(), detectors = written.len(), "saved run artifacts");
        Ok(written)
    }
}

/// Build detectors from `config`, replay `events` and save into `dir`
pub fn run_trace(
    config: &RunConfig,
    events: Vec<Event>,
    dir: &Path,
) -> Result<Vec<DetectorArtifacts>, DetectorError> {
    let mut session = Session::from_config(config)?;
    let delivered = session.replay(events);
    info!(events = delivered, "trace replayed");
    session.save_all(dir)
}
