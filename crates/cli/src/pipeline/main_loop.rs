//! One cycle: advance, snapshot, compose, present.

use std::time::{Duration, Instant};

use actor_factory::RigFactory;
use anyhow::Error;
use compositor::CompositorError;
use contracts::{ActorId, SimulatorLink, SpectatorMode, ViewMode};
use observability::metrics::{record_compositor_error, record_frame_composed};
use observability::{CycleRecord, CycleStatsAggregator};
use presenter::{PresenterHub, QuitSignal};
use sync_engine::FrameSynchronizer;
use tracing::{debug, error, info, instrument, warn};

/// When the loop stops on its own
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunLimits {
    pub max_frames: Option<u64>,
    pub duration: Option<Duration>,
}

impl RunLimits {
    fn reached(&self, cycles: u64, elapsed: Duration) -> bool {
        self.max_frames.is_some_and(|max| cycles >= max)
            || self.duration.is_some_and(|limit| elapsed >= limit)
    }
}

pub(crate) struct MainLoop<L> {
    pub synchronizer: FrameSynchronizer<L>,
    pub factory: RigFactory<L>,
    pub hub: PresenterHub,
    pub view: ViewMode,
    pub spectator: SpectatorMode,
    pub vehicle: ActorId,
    pub quit: QuitSignal,
    pub limits: RunLimits,
}

pub(crate) struct LoopOutcome {
    pub hub: PresenterHub,
    pub cycles: CycleStatsAggregator,

    /// Set when the loop stopped on a fatal error
    pub error: Option<Error>,
}

impl<L: SimulatorLink> MainLoop<L> {
    /// Cycle until quit, a run limit, or a fatal synchronizer error
    #[instrument(name = "main_loop", skip(self), fields(vehicle = self.vehicle))]
    pub async fn run(mut self) -> LoopOutcome {
        let started = Instant::now();
        let mut cycles = CycleStatsAggregator::new();

        let error = loop {
            if self.quit.is_raised() {
                info!(cycles = cycles.total_cycles, "Quit requested");
                break None;
            }

            match self.cycle().await {
                Ok(record) => cycles.update(&record),
                Err(e) => {
                    error!(error = %e, cycles = cycles.total_cycles, "Main loop aborted");
                    break Some(e);
                }
            }

            if self.limits.reached(cycles.total_cycles, started.elapsed()) {
                info!(
                    cycles = cycles.total_cycles,
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Run limit reached"
                );
                break None;
            }
        };

        LoopOutcome {
            hub: self.hub,
            cycles,
            error,
        }
    }

    async fn cycle(&mut self) -> anyhow::Result<CycleRecord> {
        let advance_started = Instant::now();
        let tick = self.synchronizer.advance().await?;
        let advance_time = advance_started.elapsed();

        let snapshot = self.synchronizer.snapshot();
        let mut record = CycleRecord {
            advance_time,
            snapshot_complete: snapshot.complete,
            missing: snapshot.missing.iter().map(|name| name.to_string()).collect(),
            ..Default::default()
        };

        let compose_started = Instant::now();
        match compositor::compose(&self.view, &snapshot) {
            Ok(Some(frame)) => {
                let compose_time = compose_started.elapsed();
                record.compose_time = Some(compose_time);
                record_frame_composed(frame.kind_name(), compose_time);
                self.hub.present(frame);
            }
            Ok(None) => {}
            // Sensors that have not delivered yet are expected during warm-up
            Err(e @ CompositorError::MissingTile { .. }) if !snapshot.complete => {
                debug!(error = %e, ?tick, "Frame skipped, waiting for first samples");
            }
            Err(e) => {
                warn!(error = %e, ?tick, "Frame composition failed");
                record.compositor_error = true;
                record_compositor_error(e.reason());
            }
        }

        if self.spectator == SpectatorMode::Follow {
            if let Err(e) = self
                .factory
                .place_spectator(self.vehicle, SpectatorMode::Follow)
                .await
            {
                debug!(error = %e, "Spectator update failed");
            }
        }

        Ok(record)
    }
}
