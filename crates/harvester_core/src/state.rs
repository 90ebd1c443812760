use std::num::NonZeroUsize;

use crate::{ItemRecord, Offer, ResultSet, StopReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Scraping,
    Advancing,
    Finalizing,
}

/// Counters kept across the whole run, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestStats {
    pub batches: usize,
    pub offered: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub missing_key: usize,
    pub over_cap: usize,
    pub advances: usize,
    pub stop_reason: Option<StopReason>,
}

impl HarvestStats {
    fn record(&mut self, offer: Offer) {
        self.offered += 1;
        match offer {
            Offer::Accepted => self.accepted += 1,
            Offer::MissingKey => self.missing_key += 1,
            Offer::Duplicate => self.duplicates += 1,
            Offer::CapReached => self.over_cap += 1,
        }
    }
}

/// Owned state of one harvest run. Only [`crate::update`] moves it forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestState {
    phase: Phase,
    results: ResultSet,
    stats: HarvestStats,
}

impl HarvestState {
    pub fn new(cap: NonZeroUsize) -> Self {
        Self {
            phase: Phase::Idle,
            results: ResultSet::new(cap),
            stats: HarvestStats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn stats(&self) -> &HarvestStats {
        &self.stats
    }

    pub fn into_results(self) -> ResultSet {
        self.results
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn offer(&mut self, record: ItemRecord) -> Offer {
        let offer = self.results.offer(record);
        self.stats.record(offer);
        offer
    }

    pub(crate) fn count_batch(&mut self) {
        self.stats.batches += 1;
    }

    pub(crate) fn count_advance(&mut self) {
        self.stats.advances += 1;
    }

    pub(crate) fn stop(&mut self, reason: StopReason) {
        self.phase = Phase::Finalizing;
        self.stats.stop_reason = Some(reason);
    }
}
