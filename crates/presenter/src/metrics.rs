//! Presenter counters
//!
//! Each [`PresenterHandle`](crate::PresenterHandle) owns one [`PresenterMetrics`], written
//! by the hub on the main-loop side (queue depth, drops) and by the worker task (presented,
//! failed). The run summary reads them through [`MetricsSnapshot`].

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct PresenterMetrics {
    queue_depth: AtomicUsize,
    peak_queue_depth: AtomicUsize,
    presented: AtomicU64,
    failed: AtomicU64,
    /// Frames rejected because the queue was full
    dropped: AtomicU64,
}

impl PresenterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame entered the queue, leaving `depth` frames waiting
    pub fn record_enqueued(&self, depth: usize) {
        self.queue_depth.store(depth, Ordering::Relaxed);
        self.peak_queue_depth.fetch_max(depth, Ordering::Relaxed);
    }

    /// The worker took a frame, leaving `depth` frames waiting
    pub fn record_dequeued(&self, depth: usize) {
        self.queue_depth.store(depth, Ordering::Relaxed);
    }

    pub fn record_presented(&self) {
        self.presented.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn drops(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_depth: self.queue_depth.load(Ordering::Relaxed),
            peak_queue_depth: self.peak_queue_depth.load(Ordering::Relaxed),
            presented: self.presented(),
            failed: self.failures(),
            dropped: self.drops(),
        }
    }
}

/// Point-in-time copy of a presenter's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_depth: usize,
    pub peak_queue_depth: usize,
    pub presented: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl MetricsSnapshot {
    /// Frames the hub handed to this presenter, whatever became of them
    pub fn offered(&self) -> u64 {
        self.presented + self.failed + self.dropped
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "presented={} failed={} dropped={} peak_queue={}",
            self.presented, self.failed, self.dropped, self.peak_queue_depth
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_depth_survives_draining() {
        let metrics = PresenterMetrics::new();
        metrics.record_enqueued(1);
        metrics.record_enqueued(3);
        metrics.record_dequeued(0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queue_depth, 0);
        assert_eq!(snapshot.peak_queue_depth, 3);
    }

    #[test]
    fn offered_counts_every_outcome() {
        let metrics = PresenterMetrics::new();
        metrics.record_presented();
        metrics.record_presented();
        metrics.record_failure();
        metrics.record_drop();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.offered(), 4);
        assert_eq!(
            snapshot.to_string(),
            "presented=2 failed=1 dropped=1 peak_queue=0"
        );
    }
}
