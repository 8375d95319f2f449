//! Uniform 1D weighted histogram backing the run aggregator.

use dose_types::config::HistogramSpec;
use dose_types::error::{DoseError, DoseResult};
use ndarray::Array1;
use serde::Serialize;

/// Weighted histogram with uniform binning over [low_edge, high_edge).
///
/// Fills outside the range are dropped, matching analysis-toolkit
/// under/overflow behavior; callers that need clamping (the depth-dose
/// profile) clamp before filling.
#[derive(Debug, Clone)]
pub struct Histogram1D {
    spec: HistogramSpec,
    sums: Array1<f64>,
}

/// Read-only export of a finalized histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramSnapshot {
    pub low_edge: f64,
    pub high_edge: f64,
    pub bins: Vec<f64>,
}

impl Histogram1D {
    pub fn new(spec: HistogramSpec) -> DoseResult<Self> {
        if spec.bins == 0 {
            return Err(DoseError::ConfigError(
                "histogram must have at least one bin".to_string(),
            ));
        }
        if !(spec.high_edge > spec.low_edge) {
            return Err(DoseError::ConfigError(format!(
                "histogram edges must satisfy low < high, got [{}, {}]",
                spec.low_edge, spec.high_edge
            )));
        }
        Ok(Histogram1D {
            spec,
            sums: Array1::zeros(spec.bins),
        })
    }

    pub fn spec(&self) -> HistogramSpec {
        self.spec
    }

    pub fn bin_width(&self) -> f64 {
        (self.spec.high_edge - self.spec.low_edge) / self.spec.bins as f64
    }

    /// Add `weight` to the bin containing `value`. Returns false when the
    /// value lies outside [low_edge, high_edge) and was dropped.
    pub fn fill(&mut self, value: f64, weight: f64) -> bool {
        if !value.is_finite() || value < self.spec.low_edge || value >= self.spec.high_edge {
            return false;
        }
        let idx = ((value - self.spec.low_edge) / self.bin_width()) as usize;
        // Floating-point division can land exactly on the upper bin count.
        let idx = idx.min(self.spec.bins - 1);
        self.sums[idx] += weight;
        true
    }

    pub fn scale(&mut self, factor: f64) {
        self.sums.mapv_inplace(|v| v * factor);
    }

    pub fn reset(&mut self) {
        self.sums.fill(0.0);
    }

    /// Bin-wise sum with another histogram of identical binning.
    pub fn merge(&mut self, other: &Histogram1D) -> DoseResult<()> {
        if self.spec != other.spec {
            return Err(DoseError::HistogramMismatch(format!(
                "cannot merge [{}, {}]×{} with [{}, {}]×{}",
                self.spec.low_edge,
                self.spec.high_edge,
                self.spec.bins,
                other.spec.low_edge,
                other.spec.high_edge,
                other.spec.bins
            )));
        }
        self.sums += &other.sums;
        Ok(())
    }

    pub fn bin_sum(&self, idx: usize) -> f64 {
        self.sums[idx]
    }

    /// Total weight across all bins.
    pub fn integral(&self) -> f64 {
        self.sums.sum()
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            low_edge: self.spec.low_edge,
            high_edge: self.spec.high_edge,
            bins: self.sums.to_vec(),
        }
    }
}
