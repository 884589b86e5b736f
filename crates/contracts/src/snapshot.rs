//! FrameSnapshot - one consistent read over every attached sensor

use std::collections::HashMap;
use std::sync::Arc;

use crate::{SensorName, SensorSample, TickId};

/// Latest sample of every sensor, read once
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    /// Sensors that have produced at least one sample
    pub samples: HashMap<SensorName, Arc<SensorSample>>,

    /// True iff every attached sensor has a sample
    pub complete: bool,

    /// Attached sensors without a sample yet, sorted by name
    pub missing: Vec<SensorName>,

    /// Tick this snapshot was taken after (synchronous mode only)
    pub tick: Option<TickId>,
}

impl FrameSnapshot {
    pub fn get(&self, name: &str) -> Option<&Arc<SensorSample>> {
        self.samples.get(name)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest frame across the held samples
    pub fn min_frame(&self) -> Option<u64> {
        self.samples.values().map(|s| s.frame).min()
    }
}
