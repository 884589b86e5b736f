//! SensorSlot - latest-value holder for one sensor

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use contracts::{SensorKind, SensorName, SensorSample};

/// Latest sample of one sensor
///
/// Single writer (the sensor's delivery thread), any number of readers. Writes replace the
/// whole sample behind an `Arc`, so a reader sees either the previous or the new sample,
/// never a mix of both, and neither side ever blocks.
#[derive(Debug)]
pub struct SensorSlot {
    name: SensorName,
    kind: SensorKind,
    sample: ArcSwapOption<SensorSample>,

    /// Last frame a delivery was attempted for, plus one (0 = never)
    delivered: AtomicU64,

    written: AtomicU64,
    discarded: AtomicU64,
}

impl SensorSlot {
    pub fn new(name: SensorName, kind: SensorKind) -> Self {
        Self {
            name,
            kind,
            sample: ArcSwapOption::empty(),
            delivered: AtomicU64::new(0),
            written: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &SensorName {
        &self.name
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Replace the held sample
    pub fn write(&self, sample: SensorSample) {
        self.sample.store(Some(Arc::new(sample)));
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    /// Latest sample, `None` until the first write
    pub fn read_latest(&self) -> Option<Arc<SensorSample>> {
        self.sample.load_full()
    }

    pub fn has_sample(&self) -> bool {
        self.sample.load().is_some()
    }

    /// Record that a delivery for `frame` reached this slot, accepted or not
    pub fn mark_delivered(&self, frame: u64) {
        self.delivered
            .fetch_max(frame.saturating_add(1), Ordering::AcqRel);
    }

    /// Highest frame a delivery was attempted for
    pub fn delivered_frame(&self) -> Option<u64> {
        match self.delivered.load(Ordering::Acquire) {
            0 => None,
            n => Some(n - 1),
        }
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> SlotStats {
        SlotStats {
            written: self.written.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            delivered_frame: self.delivered_frame(),
        }
    }
}

/// Slot counters snapshot (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub written: u64,
    pub discarded: u64,
    pub delivered_frame: Option<u64>,
}
