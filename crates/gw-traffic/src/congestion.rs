//! The congestion model: junction index → vehicle count.

use gw_core::JunctionId;
use gw_spatial::CongestionSource;

/// Mutable per-junction vehicle counts.
///
/// Counts are bounded below at zero; [`max`](Self::max) is recomputed on
/// demand rather than cached, so it always reflects the current counts —
/// the solver captures it once per solve as its normalization snapshot.
pub struct CongestionModel {
    counts: Vec<u32>,
}

impl CongestionModel {
    /// All-zero counts for `junction_count` junctions.
    pub fn new(junction_count: usize) -> Self {
        Self { counts: vec![0; junction_count] }
    }

    /// Initialize from decoded congestion record words, padded with zeros or
    /// truncated to `junction_count` entries.
    pub fn from_words(words: &[u32], junction_count: usize) -> Self {
        let mut counts: Vec<u32> = words.iter().take(junction_count).copied().collect();
        counts.resize(junction_count, 0);
        Self { counts }
    }

    pub fn junction_count(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn count(&self, junction: JunctionId) -> u32 {
        self.counts[junction.index()]
    }

    /// One vehicle cleared the junction.  Clamped at zero — repeated
    /// decrements never underflow.
    #[inline]
    pub fn decrement_on_pass(&mut self, junction: JunctionId) {
        let c = &mut self.counts[junction.index()];
        *c = c.saturating_sub(1);
    }

    /// One vehicle arrived (background simulation only).
    #[inline]
    pub fn increment_on_arrival(&mut self, junction: JunctionId) {
        self.counts[junction.index()] += 1;
    }

    /// Maximum count over all junctions.  Recomputed lazily on every call.
    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Raw counts, indexed by junction.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }
}

impl CongestionSource for CongestionModel {
    fn count(&self, junction: JunctionId) -> u32 {
        CongestionModel::count(self, junction)
    }

    fn max(&self) -> u32 {
        CongestionModel::max(self)
    }
}
