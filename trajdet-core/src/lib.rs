pub mod channel;
pub mod config;
pub mod detector;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod event;
pub mod format;
pub mod histogram;
pub mod properties;
pub mod runtime;
pub mod scattering;
pub mod table;
pub mod trace;

pub use channel::ChannelDetector;
pub use config::{ChannelConfig, DetectorConfig, DetectorKind, RadialConfig, RunConfig};
pub use detector::{artifact_path, attach, Detector, Phase};
pub use engine::{Engine, ReplayEngine};
pub use error::DetectorError;
pub use event::{ElectronState, Event, EventKind, Region, StepKind};
pub use histogram::{Bin, Histogram};
pub use properties::PropertyBag;
pub use runtime::{run_trace, DetectorArtifacts, NamedDetector, Session};
pub use scattering::ScatterSampler;
pub use table::{Field, Table, TableSink};

// Test helpers module (public for integration tests)
pub mod tests;
