//! Pipeline statistics.

use std::time::Duration;

use contracts::{ActorId, ShutdownState};
use observability::CycleStatsAggregator;
use presenter::MetricsSnapshot;

/// Statistics from a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Wall-clock time from connect to teardown
    pub duration: Duration,

    pub vehicle: ActorId,

    /// Sensors attached to the vehicle
    pub sensors: usize,

    /// Composite view name
    pub view: &'static str,

    pub cycles: CycleStatsAggregator,

    /// Per-presenter counters at shutdown
    pub presenters: Vec<(String, MetricsSnapshot)>,

    pub shutdown_state: ShutdownState,

    /// Teardown steps that failed
    pub shutdown_failures: usize,
}

impl PipelineStats {
    /// Main-loop cycles per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.cycles.total_cycles as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Vehicle: {}", self.vehicle);
        println!("Sensors: {}", self.sensors);
        println!("View: {}", self.view);
        println!("Cycles/s: {:.2}", self.fps());

        println!("\n{}", self.cycles.summary());

        if !self.presenters.is_empty() {
            println!("Presenters:");
            for (name, metrics) in &self.presenters {
                println!("  {}: {}", name, metrics);
            }
        }

        println!(
            "\nShutdown: {} ({} failures)",
            self.shutdown_state, self.shutdown_failures
        );
        println!();
    }
}
