use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent passes kept by [`TimingWindow`].
pub const TIMING_WINDOW_LEN: usize = 10;

/// Rolling window over the durations of recent materialization passes.
#[derive(Debug, Clone, Default)]
pub struct TimingWindow {
    samples: VecDeque<Duration>,
}

impl TimingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed: Duration) {
        if self.samples.len() == TIMING_WINDOW_LEN {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);
    }

    /// Most recent sample
    pub fn current(&self) -> Option<Duration> {
        self.samples.back().copied()
    }

    /// Mean over the window
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Counters for the last materialization pass and running totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassStats {
    /// Features returned by the viewport query
    pub features: usize,
    /// Markers handed to the map
    pub markers: usize,
    /// Cluster markers among `markers`
    pub clusters: usize,
    /// Point features removed by the caps
    pub truncated: usize,
    /// Passes run since the manager was created
    pub passes: u64,
    /// Passes skipped because the map was unavailable
    pub skipped_passes: u64,
}

impl PassStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, features: usize, markers: usize, clusters: usize, truncated: usize) {
        self.features = features;
        self.markers = markers;
        self.clusters = clusters;
        self.truncated = truncated;
        self.passes += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_passes += 1;
    }
}
