//! Fixed-range, equal-width bin accumulator
//!
//! The interval [min, max] is split into `N` channels. Channel `i` covers
//! `[edge(i), edge(i+1))` with `edge(i) = min + (max - min) * (i / N)`; the
//! last channel is closed on the right so `max` itself is counted. Edges are
//! always derived from `(min, max, N)` rather than accumulated, so they do not
//! drift, and `add` counts a sample in the channel whose edges contain it.

use crate::error::DetectorError;

/// Equal-width histogram over a closed real interval
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    counts: Vec<u64>,
}

/// Snapshot of a single channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub index: usize,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

impl Histogram {
    /// Create a histogram of `channels` bins over `[min, max]`.
    ///
    /// Reversed bounds are swapped. Zero channels, non-finite bounds and a
    /// zero-width interval are rejected.
    pub fn new(min: f64, max: f64, channels: usize) -> Result<Self, DetectorError> {
        if channels == 0 {
            return Err(DetectorError::invalid(
                "number of channels must be greater than 0",
            ));
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(DetectorError::invalid(format!(
                "histogram bounds must be finite, got [{}, {}]",
                min, max
            )));
        }
        if min == max {
            return Err(DetectorError::invalid(format!(
                "histogram bounds must differ, got {} twice",
                min
            )));
        }

        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if !(max - min).is_finite() {
            return Err(DetectorError::invalid(format!(
                "histogram span [{}, {}] is too wide to represent",
                min, max
            )));
        }

        Ok(Self {
            min,
            max,
            counts: vec![0; channels],
        })
    }

    /// Count `x` in its channel. Returns the channel index, or `None` when
    /// the sample lies outside `[min, max]` and was discarded.
    pub fn add(&mut self, x: f64) -> Option<usize> {
        // NaN fails both comparisons and is discarded here too
        if !(x >= self.min && x <= self.max) {
            return None;
        }

        let n = self.counts.len();
        let width = (self.max - self.min) / n as f64;
        let mut index = (((x - self.min) / width).floor() as usize).min(n - 1);

        // rounding in the division can land one channel off the edges
        while index > 0 && x < self.edge(index) {
            index -= 1;
        }
        while index + 1 < n && x >= self.edge(index + 1) {
            index += 1;
        }

        self.counts[index] += 1;
        Some(index)
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    /// Lower edge of channel `i`
    pub fn min_value(&self, i: usize) -> Result<f64, DetectorError> {
        self.check_index(i)?;
        Ok(self.edge(i))
    }

    /// Upper edge of channel `i`
    pub fn max_value(&self, i: usize) -> Result<f64, DetectorError> {
        self.check_index(i)?;
        Ok(self.edge(i + 1))
    }

    /// Number of samples counted in channel `i`
    pub fn counts(&self, i: usize) -> Result<u64, DetectorError> {
        self.check_index(i)?;
        Ok(self.counts[i])
    }

    /// Mid-point of channel `i`
    pub fn bin_center(&self, i: usize) -> Result<f64, DetectorError> {
        self.check_index(i)?;
        Ok((self.edge(i) + self.edge(i + 1)) / 2.0)
    }

    /// Lower bound of the acceptance window (equal to `min_value(0)`)
    pub fn lower_bound(&self) -> f64 {
        self.min
    }

    /// Upper bound of the acceptance window (equal to `max_value(N - 1)`)
    pub fn upper_bound(&self) -> f64 {
        self.max
    }

    /// Nominal width shared by every channel
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Sum of all channel counts
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate over all channels in ascending order
    pub fn bins(&self) -> impl Iterator<Item = Bin> + '_ {
        self.counts.iter().enumerate().map(move |(index, &count)| Bin {
            index,
            min: self.edge(index),
            max: self.edge(index + 1),
            count,
        })
    }

    /// Zero every channel, keeping the layout
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    fn edge(&self, i: usize) -> f64 {
        let n = self.counts.len();
        if i == 0 {
            self.min
        } else if i >= n {
            self.max
        } else {
            self.min + (self.max - self.min) * (i as f64 / n as f64)
        }
    }

    fn check_index(&self, i: usize) -> Result<(), DetectorError> {
        if i >= self.counts.len() {
            return Err(DetectorError::invalid(format!(
                "bin index {} out of range (histogram has {} bins)",
                i,
                self.counts.len()
            )));
        }
        Ok(())
    }
}
