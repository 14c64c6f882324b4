//! Run configuration: which detectors to build and where their artifacts go
//!
//! ```json
//! {
//!   "results_dir": "results",
//!   "detectors": [
//!     { "base_name": "bse",
//!       "detector": { "type": "backscattered_electron_energy",
//!                     "min": 0.0, "max": 15000.0, "channels": 150 } }
//!   ]
//! }
//! ```

use crate::channel::ChannelDetector;
use crate::detector::Detector;
use crate::detectors::{
    BackscatteredAzimuthalAngle, BackscatteredEnergy, BackscatteredPolarAngle,
    BackscatteredRadialDistance, ElectronFractionDetector, TransmittedAzimuthalAngle,
    TransmittedEnergy, TransmittedPolarAngle,
};
use crate::error::DetectorError;
use crate::scattering::ScatterSampler;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

/// A set of detectors sharing one results directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    pub detectors: Vec<DetectorConfig>,
}

/// One detector and the base name of its artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub base_name: String,
    pub detector: DetectorKind,
}

/// Acceptance window of a channel detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub min: f64,
    pub max: f64,
    pub channels: usize,
    #[serde(default)]
    pub primary_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialConfig {
    pub min: f64,
    pub max: f64,
    pub channels: usize,
    #[serde(default)]
    pub primary_only: bool,
    /// Beam axis position in the sample plane (x, y)
    #[serde(default)]
    pub origin: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetectorKind {
    BackscatteredElectronEnergy(ChannelConfig),
    BackscatteredElectronPolarAngular(ChannelConfig),
    BackscatteredElectronAzimuthalAngular(ChannelConfig),
    BackscatteredElectronRadial(RadialConfig),
    TransmittedElectronEnergy(ChannelConfig),
    TransmittedElectronPolarAngular(ChannelConfig),
    TransmittedElectronAzimuthalAngular(ChannelConfig),
    ElectronFraction,
}

impl RunConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, DetectorError> {
        let file = File::open(path).map_err(|e| DetectorError::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| DetectorError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            message: e.to_string(),
        })
    }

    /// Reject configurations whose artifacts would collide or escape the
    /// results directory
    pub fn validate(&self) -> Result<(), DetectorError> {
        let mut seen = HashSet::new();
        for detector in &self.detectors {
            let name = detector.base_name.as_str();
            if name.is_empty() {
                return Err(DetectorError::invalid("detector base name must not be empty"));
            }
            if name.contains(|c: char| c == '/' || c == '\\') || name == "." || name == ".." {
                return Err(DetectorError::invalid(format!(
                    "detector base name '{}' must be a plain file name",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(DetectorError::invalid(format!(
                    "duplicate detector base name '{}'",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl DetectorConfig {
    /// Construct the configured detector
    pub fn build(&self) -> Result<Rc<RefCell<dyn Detector>>, DetectorError> {
        self.detector.build()
    }
}

impl DetectorKind {
    pub fn build(&self) -> Result<Rc<RefCell<dyn Detector>>, DetectorError> {
        let detector = match self {
            DetectorKind::BackscatteredElectronEnergy(c) => channel(BackscatteredEnergy, c)?,
            DetectorKind::BackscatteredElectronPolarAngular(c) => channel(BackscatteredPolarAngle, c)?,
            DetectorKind::BackscatteredElectronAzimuthalAngular(c) => {
                channel(BackscatteredAzimuthalAngle, c)?
            }
            DetectorKind::BackscatteredElectronRadial(r) => {
                let origin = DVec2::new(r.origin[0], r.origin[1]);
                let detector = ChannelDetector::new(
                    BackscatteredRadialDistance::with_origin(origin),
                    r.min,
                    r.max,
                    r.channels,
                )?;
                shared(detector.with_primary_only(r.primary_only))
            }
            DetectorKind::TransmittedElectronEnergy(c) => channel(TransmittedEnergy, c)?,
            DetectorKind::TransmittedElectronPolarAngular(c) => channel(TransmittedPolarAngle, c)?,
            DetectorKind::TransmittedElectronAzimuthalAngular(c) => {
                channel(TransmittedAzimuthalAngle, c)?
            }
            DetectorKind::ElectronFraction => shared(ElectronFractionDetector::new()),
        };
        Ok(detector)
    }
}

fn channel<S>(sampler: S, config: &ChannelConfig) -> Result<Rc<RefCell<dyn Detector>>, DetectorError>
where
    S: ScatterSampler + 'static,
{
    let detector = ChannelDetector::new(sampler, config.min, config.max, config.channels)?;
    Ok(shared(detector.with_primary_only(config.primary_only)))
}

fn shared<D: Detector + 'static>(detector: D) -> Rc<RefCell<dyn Detector>> {
    Rc::new(RefCell::new(detector))
}
