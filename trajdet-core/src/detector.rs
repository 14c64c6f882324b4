//! The detector contract
//!
//! A detector is a passive observer of the transport engine. The engine calls
//! [`Detector::on_event`] for every event it emits; the provided
//! implementation decodes the wire kind and fans it out to one hook per
//! lifecycle stage. Every hook has an empty default, so a detector only
//! implements the stages it cares about.
//!
//! Artifacts are written after the run: [`Detector::save_results`] produces
//! `{dir}/{base}.csv` and [`Detector::save_log`] produces `{dir}/{base}.log`.

use crate::engine::Engine;
use crate::error::DetectorError;
use crate::event::{ElectronState, Event, EventKind, StepKind};
use crate::properties::PropertyBag;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Extension of the results table artifact
pub const RESULTS_EXTENSION: &str = "csv";
/// Extension of the parameter log artifact
pub const LOG_EXTENSION: &str = "log";

/// Where a detector is in its run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Constructed, not yet registered with an engine
    #[default]
    Uninitialised,
    /// Registered, waiting for the first trajectory
    Armed,
    /// Between the first trajectory and the end of the run
    Accumulating,
    /// Results have been written
    Finalised,
}

impl Phase {
    pub fn is_accumulating(self) -> bool {
        self == Phase::Accumulating
    }
}

/// Observer of engine events that persists two artifacts per run
pub trait Detector {
    /// Called once the engine has accepted the registration
    fn on_attached(&mut self) {}

    /// Route a raw engine event to the matching hook. Unknown ids and kinds
    /// without a hook are ignored.
    fn on_event(&mut self, event: &Event) {
        let Some(kind) = event.kind() else {
            debug!(id = event.id, "ignoring unknown event kind");
            return;
        };

        match kind {
            EventKind::FirstTrajectory => self.on_first_trajectory(),
            EventKind::LastTrajectory => self.on_last_trajectory(),
            EventKind::TrajectoryStart | EventKind::TrajectoryEnd => {
                let Some(state) = event.state.as_ref() else {
                    warn!(?kind, "trajectory event without electron state");
                    return;
                };
                if kind == EventKind::TrajectoryStart {
                    self.on_trajectory_start(state);
                } else {
                    self.on_trajectory_end(state);
                }
            }
            _ => {
                let Some(step) = kind.step() else {
                    return;
                };
                match event.state.as_ref() {
                    Some(state) => self.on_step(step, state),
                    None => warn!(?kind, "step event without electron state"),
                }
            }
        }
    }

    /// Start of a run: counters go back to zero
    fn on_first_trajectory(&mut self) {
        self.reset();
    }

    fn on_trajectory_start(&mut self, _state: &ElectronState) {}

    fn on_step(&mut self, _step: StepKind, _state: &ElectronState) {}

    fn on_trajectory_end(&mut self, _state: &ElectronState) {}

    fn on_last_trajectory(&mut self) {}

    /// Clear accumulated data
    fn reset(&mut self) {}

    /// Write the results table to `{dir}/{base_name}.csv` and return its path
    fn save_results(&mut self, dir: &Path, base_name: &str) -> Result<PathBuf, DetectorError>;

    /// Add this detector's parameters to the log bag
    fn write_properties(&self, _props: &mut PropertyBag) {}

    /// Comment line written at the top of the log file
    fn log_comment(&self) -> String {
        String::new()
    }

    /// Write the parameter log to `{dir}/{base_name}.log` and return its path.
    /// Works in any phase and leaves it unchanged;
    /// [`Detector::save_results`] is what finalises a run.
    fn save_log(&self, dir: &Path, base_name: &str) -> Result<PathBuf, DetectorError> {
        let path = artifact_path(dir, base_name, LOG_EXTENSION);
        let mut props = PropertyBag::new();
        self.write_properties(&mut props);
        props.store_to_path(&path, &self.log_comment())?;
        info!(path = %path.display(), entries = props.len(), "wrote detector log");
        Ok(path)
    }

    /// Register with `engine`. The engine only keeps a weak reference.
    fn setup(this: &Rc<RefCell<Self>>, engine: &mut dyn Engine) -> Result<(), DetectorError>
    where
        Self: Sized + 'static,
    {
        let detector: Rc<RefCell<dyn Detector>> = this.clone();
        attach(&detector, engine)
    }
}

/// Register an already type-erased detector with `engine`
pub fn attach(detector: &Rc<RefCell<dyn Detector>>, engine: &mut dyn Engine) -> Result<(), DetectorError> {
    engine.add_listener(Rc::downgrade(detector))?;
    detector
        .try_borrow_mut()
        .map_err(|_| DetectorError::Setup("detector is borrowed during setup".to_string()))?
        .on_attached();
    debug!("detector registered");
    Ok(())
}

/// `{dir}/{base_name}.{extension}`
pub fn artifact_path(dir: &Path, base_name: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", base_name, extension))
}
