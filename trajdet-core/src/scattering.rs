//! Scalar extraction from per-step electron state
//!
//! A [`ScatterSampler`] decides which step events a detector listens to and
//! which single number it pulls out of the electron state for each of them.
//! It carries configuration only; accumulation lives in the detector that
//! owns it.

use crate::event::{ElectronState, StepKind};
use crate::properties::PropertyBag;

/// Event-kind to scalar mapping for one physical quantity
pub trait ScatterSampler {
    /// Short identifier, used as the log comment
    fn name(&self) -> &'static str;

    /// Whether a step of this kind (with this state) is observed at all
    fn accepts(&self, step: StepKind, state: &ElectronState) -> bool;

    /// The quantity to histogram, or `None` if it is undefined for this state
    fn sample(&self, state: &ElectronState) -> Option<f64>;

    /// Description and unit of the x axis, e.g. `Energy (eV)`
    fn bins_header(&self) -> &'static str;

    fn counts_header(&self) -> &'static str {
        "Counts"
    }

    /// Sampler-specific log keys; use a dotted prefix
    fn write_properties(&self, _props: &mut PropertyBag) {}

    /// `accepts` followed by `sample`
    fn observe(&self, step: StepKind, state: &ElectronState) -> Option<f64> {
        if self.accepts(step, state) {
            self.sample(state)
        } else {
            None
        }
    }
}
