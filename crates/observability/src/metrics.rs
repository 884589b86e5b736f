//! Pipeline metrics
//!
//! `record_*` functions feed the `metrics` facade (exported through Prometheus when enabled);
//! `CycleStatsAggregator` keeps an in-memory summary for the end-of-run report.

use std::collections::HashMap;
use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Record one synchronous tick
///
/// `tick_latency` is the time until `tick()` returned, `barrier` the time until every due
/// sensor had delivered.
pub fn record_tick(tick_latency: Duration, barrier: Duration, due_sensors: usize) {
    counter!("sensor_view_ticks_total").increment(1);
    histogram!("sensor_view_tick_latency_ms").record(tick_latency.as_secs_f64() * 1000.0);
    histogram!("sensor_view_tick_barrier_ms").record(barrier.as_secs_f64() * 1000.0);
    gauge!("sensor_view_sensors_due").set(due_sensors as f64);
}

/// Record a snapshot read
pub fn record_snapshot(present: usize, attached: usize) {
    counter!("sensor_view_snapshots_total").increment(1);
    gauge!("sensor_view_sensors_missing").set(attached.saturating_sub(present) as f64);
    if attached > 0 {
        histogram!("sensor_view_snapshot_completeness").record(present as f64 / attached as f64);
    }
    if present < attached {
        counter!("sensor_view_incomplete_snapshots_total").increment(1);
    }
}

/// Record a composed artifact
pub fn record_frame_composed(kind: &'static str, compose_time: Duration) {
    counter!("sensor_view_frames_composed_total", "kind" => kind).increment(1);
    histogram!("sensor_view_compose_ms").record(compose_time.as_secs_f64() * 1000.0);
}

/// Record a compositor error (the cycle is skipped)
pub fn record_compositor_error(reason: &'static str) {
    counter!("sensor_view_compositor_errors_total", "reason" => reason).increment(1);
}

/// Record a frame handed to a presenter
pub fn record_frame_presented(presenter: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "sensor_view_frames_presented_total",
        "presenter" => presenter.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a frame dropped because a presenter queue was full
pub fn record_frame_dropped(presenter: &str) {
    counter!(
        "sensor_view_frames_dropped_total",
        "presenter" => presenter.to_string()
    )
    .increment(1);
}

/// Record the presenter queue depth
pub fn record_presenter_queue_depth(presenter: &str, depth: usize) {
    gauge!(
        "sensor_view_presenter_queue_depth",
        "presenter" => presenter.to_string()
    )
    .set(depth as f64);
}

/// What happened in one main-loop cycle
#[derive(Debug, Clone, Default)]
pub struct CycleRecord {
    /// Tick latency in synchronous mode
    pub advance_time: Duration,
    pub snapshot_complete: bool,
    pub missing: Vec<String>,
    pub compose_time: Option<Duration>,
    pub compositor_error: bool,
}

/// In-memory cycle statistics
#[derive(Debug, Clone, Default)]
pub struct CycleStatsAggregator {
    pub total_cycles: u64,
    pub incomplete_cycles: u64,
    pub compositor_errors: u64,
    pub advance_stats: RunningStats,
    pub compose_stats: RunningStats,
    pub missing_counts: HashMap<String, u64>,
}

impl CycleStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, record: &CycleRecord) {
        self.total_cycles += 1;
        if !record.snapshot_complete {
            self.incomplete_cycles += 1;
            for name in &record.missing {
                *self.missing_counts.entry(name.clone()).or_insert(0) += 1;
            }
        }
        if record.compositor_error {
            self.compositor_errors += 1;
        }
        self.advance_stats
            .push(record.advance_time.as_secs_f64() * 1000.0);
        if let Some(compose) = record.compose_time {
            self.compose_stats.push(compose.as_secs_f64() * 1000.0);
        }
    }

    pub fn summary(&self) -> CycleSummary {
        let rate = |n: u64| {
            if self.total_cycles > 0 {
                n as f64 / self.total_cycles as f64 * 100.0
            } else {
                0.0
            }
        };
        CycleSummary {
            total_cycles: self.total_cycles,
            incomplete_cycles: self.incomplete_cycles,
            incomplete_rate: rate(self.incomplete_cycles),
            compositor_errors: self.compositor_errors,
            advance_ms: StatsSummary::from(&self.advance_stats),
            compose_ms: StatsSummary::from(&self.compose_stats),
            sensor_missing_counts: self.missing_counts.clone(),
        }
    }
}

/// Cycle summary
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub total_cycles: u64,
    pub incomplete_cycles: u64,
    pub incomplete_rate: f64,
    pub compositor_errors: u64,
    pub advance_ms: StatsSummary,
    pub compose_ms: StatsSummary,
    pub sensor_missing_counts: HashMap<String, u64>,
}

impl std::fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Cycle Summary ===")?;
        writeln!(f, "Total cycles: {}", self.total_cycles)?;
        writeln!(
            f,
            "Incomplete snapshots: {} ({:.2}%)",
            self.incomplete_cycles, self.incomplete_rate
        )?;
        writeln!(f, "Compositor errors: {}", self.compositor_errors)?;
        writeln!(f, "Advance (ms): {}", self.advance_ms)?;
        writeln!(f, "Compose (ms): {}", self.compose_ms)?;

        if !self.sensor_missing_counts.is_empty() {
            let mut counts: Vec<_> = self.sensor_missing_counts.iter().collect();
            counts.sort();
            writeln!(f, "Missing sensor counts:")?;
            for (sensor, count) in counts {
                writeln!(f, "  {}: {}", sensor, count)?;
            }
        }

        Ok(())
    }
}

/// Stats summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
