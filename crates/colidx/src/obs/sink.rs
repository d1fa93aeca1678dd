use std::sync::atomic::{AtomicU64, Ordering};

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    /// Index columns scheduled by one write, across all its containers.
    IndexDelta {
        attribute: &'a str,
        inserts: u64,
        removes: u64,
    },

    /// Live history entries a write found and retired.
    HistoryRetired { attribute: &'a str, entries: u64 },

    /// One container search and the hits it returned.
    Search { attribute: &'a str, hits: u64 },

    /// A stored key that failed to decode and was left out of a result.
    DecodeSkipped { store: &'a str },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// NoopMetrics
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record(&self, _: MetricsEvent<'_>) {}
}

///
/// CountingMetrics
///
/// Process-local totals, one relaxed atomic per counter.
///

#[derive(Debug, Default)]
pub struct CountingMetrics {
    writes: AtomicU64,
    index_inserts: AtomicU64,
    index_removes: AtomicU64,
    history_retired: AtomicU64,
    searches: AtomicU64,
    search_hits: AtomicU64,
    decode_skipped: AtomicU64,
}

impl CountingMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            index_inserts: self.index_inserts.load(Ordering::Relaxed),
            index_removes: self.index_removes.load(Ordering::Relaxed),
            history_retired: self.history_retired.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            search_hits: self.search_hits.load(Ordering::Relaxed),
            decode_skipped: self.decode_skipped.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.writes,
            &self.index_inserts,
            &self.index_removes,
            &self.history_retired,
            &self.searches,
            &self.search_hits,
            &self.decode_skipped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl MetricsSink for CountingMetrics {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::IndexDelta {
                inserts, removes, ..
            } => {
                add(&self.writes, 1);
                add(&self.index_inserts, inserts);
                add(&self.index_removes, removes);
            }
            MetricsEvent::HistoryRetired { entries, .. } => {
                add(&self.history_retired, entries);
            }
            MetricsEvent::Search { hits, .. } => {
                add(&self.searches, 1);
                add(&self.search_hits, hits);
            }
            MetricsEvent::DecodeSkipped { .. } => add(&self.decode_skipped, 1),
        }
    }
}

fn add(counter: &AtomicU64, delta: u64) {
    // fetch_update never fails when the closure always returns Some
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
        Some(n.saturating_add(delta))
    });
}

///
/// MetricsSnapshot
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MetricsSnapshot {
    pub writes: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub history_retired: u64,
    pub searches: u64,
    pub search_hits: u64,
    pub decode_skipped: u64,
}

///
/// TESTS
///
