//! Detectors that histogram one sampled quantity over a bounded range

use crate::detector::{artifact_path, Detector, Phase, RESULTS_EXTENSION};
use crate::error::DetectorError;
use crate::event::{ElectronState, StepKind};
use crate::format::format_real;
use crate::histogram::Histogram;
use crate::properties::PropertyBag;
use crate::scattering::ScatterSampler;
use crate::table::{Field, TableSink};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// A detector owning a [`Histogram`] fed by a [`ScatterSampler`]
#[derive(Debug, Clone)]
pub struct ChannelDetector<S> {
    histogram: Histogram,
    sampler: S,
    primary_only: bool,
    phase: Phase,
}

impl<S: ScatterSampler> ChannelDetector<S> {
    /// Create a detector collecting `channels` bins between `min` and `max`.
    /// Reversed limits are swapped.
    pub fn new(sampler: S, min: f64, max: f64, channels: usize) -> Result<Self, DetectorError> {
        Ok(Self {
            histogram: Histogram::new(min, max, channels)?,
            sampler,
            primary_only: false,
            phase: Phase::Uninitialised,
        })
    }

    /// Only count electrons that came from the beam
    pub fn with_primary_only(mut self, primary_only: bool) -> Self {
        self.primary_only = primary_only;
        self
    }

    pub fn minimum_limit(&self) -> f64 {
        self.histogram.lower_bound()
    }

    pub fn maximum_limit(&self) -> f64 {
        self.histogram.upper_bound()
    }

    pub fn channel_width(&self) -> f64 {
        self.histogram.bin_width()
    }

    pub fn channels(&self) -> usize {
        self.histogram.bin_count()
    }

    pub fn bins_header(&self) -> &'static str {
        self.sampler.bins_header()
    }

    pub fn counts_header(&self) -> &'static str {
        self.sampler.counts_header()
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn primary_only(&self) -> bool {
        self.primary_only
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl<S: ScatterSampler> Detector for ChannelDetector<S> {
    fn on_attached(&mut self) {
        self.phase = Phase::Armed;
    }

    fn on_first_trajectory(&mut self) {
        self.reset();
        self.phase = Phase::Accumulating;
    }

    fn on_step(&mut self, step: StepKind, state: &ElectronState) {
        if !self.phase.is_accumulating() {
            trace!(phase = ?self.phase, "step outside of a run ignored");
            return;
        }
        if self.primary_only && !state.is_primary() {
            return;
        }
        if let Some(value) = self.sampler.observe(step, state) {
            if self.histogram.add(value).is_none() {
                trace!(detector = self.sampler.name(), value, "sample outside acceptance window");
            }
        }
    }

    fn reset(&mut self) {
        debug!(detector = self.sampler.name(), "resetting histogram");
        self.histogram.reset();
    }

    fn save_results(&mut self, dir: &Path, base_name: &str) -> Result<PathBuf, DetectorError> {
        let path = artifact_path(dir, base_name, RESULTS_EXTENSION);
        let io_err = |e| DetectorError::io(&path, e);

        let mut sink = TableSink::create(&path).map_err(io_err)?;
        sink.write_header(&[self.bins_header(), self.counts_header()])
            .map_err(io_err)?;
        for bin in self.histogram.bins() {
            sink.write_row(&[Field::Real(bin.center()), Field::Integer(bin.count)])
                .map_err(io_err)?;
        }
        sink.close().map_err(io_err)?;

        info!(
            path = %path.display(),
            channels = self.channels(),
            total = self.histogram.total(),
            "wrote channel results"
        );
        self.phase = Phase::Finalised;
        Ok(path)
    }

    fn write_properties(&self, props: &mut PropertyBag) {
        props.set_property("histogram.min", format_real(self.minimum_limit()));
        props.set_property("histogram.max", format_real(self.maximum_limit()));
        props.set_property("histogram.channels", self.channels().to_string());
        props.set_property("detector.primary_only", self.primary_only.to_string());
        self.sampler.write_properties(props);
    }

    fn log_comment(&self) -> String {
        self.sampler.name().to_string()
    }
}
