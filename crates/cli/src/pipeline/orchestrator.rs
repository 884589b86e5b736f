//! Pipeline orchestrator - coordinates all components.
//!
//! Uses the in-process mock simulator unless the `real-carla` feature is enabled and
//! `--mock` is not set.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actor_factory::{MockSimulator, RigFactory, ShutdownCoordinator};
use anyhow::{anyhow, Context, Result};
use contracts::{RigBlueprint, SimulatorLink};
use observability::CycleStatsAggregator;
use presenter::{PresenterHub, QuitSignal};
use sync_engine::FrameSynchronizer;
use tracing::{error, info, warn};

use super::main_loop::{MainLoop, RunLimits};
use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated rig description
    pub blueprint: RigBlueprint,

    /// Force the mock simulator
    pub mock: bool,

    /// Maximum number of cycles (None = unlimited)
    pub max_frames: Option<u64>,

    /// Wall-clock limit (None = unlimited)
    pub duration: Option<Duration>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
    quit: QuitSignal,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            quit: QuitSignal::new(),
        }
    }

    /// Quit signal shared with the presenters and the signal watcher
    pub fn quit_signal(&self) -> QuitSignal {
        self.quit.clone()
    }

    /// Run the pipeline to completion
    ///
    /// Teardown has always run by the time this returns, including on error and when a
    /// quit signal arrives while the rig is being assembled.
    pub async fn run(self) -> Result<PipelineStats> {
        #[cfg(feature = "real-carla")]
        {
            if !self.config.mock {
                let port = self.config.blueprint.simulator.traffic_manager_port;
                info!("Running against a CARLA server");
                return self.run_with(actor_factory::CarlaLink::new(port)).await;
            }
        }

        #[cfg(not(feature = "real-carla"))]
        {
            if !self.config.mock {
                warn!("Built without the real-carla feature, falling back to the mock simulator");
            }
        }

        info!("Running in MOCK mode (no simulator required)");
        self.run_with(MockSimulator::new()).await
    }

    async fn run_with<L: SimulatorLink>(self, mut link: L) -> Result<PipelineStats> {
        let started = Instant::now();
        let blueprint = self.config.blueprint;
        let quit = self.quit;

        // Installed before anything touches the world
        let signal_task = tokio::spawn(watch_signals(quit.clone()));

        let hub = match PresenterHub::from_configs(&blueprint.presenters, &quit) {
            Ok(hub) => hub,
            Err(e) => {
                signal_task.abort();
                return Err(e).context("Failed to create presenters");
            }
        };
        if hub.is_empty() && blueprint.view.mode != contracts::ViewMode::Headless {
            warn!("No presenters configured - composed frames will be discarded");
        }

        let simulator = &blueprint.simulator;
        info!(
            host = %simulator.host,
            port = simulator.port,
            "Connecting to simulator..."
        );
        if let Err(e) = link
            .connect(&simulator.host, simulator.port, simulator.timeout())
            .await
        {
            signal_task.abort();
            hub.shutdown().await;
            return Err(e).with_context(|| {
                format!(
                    "Failed to connect to simulator at {}:{}",
                    simulator.host, simulator.port
                )
            });
        }
        info!("Connected to simulator");

        let link = Arc::new(link);
        let mut coordinator = ShutdownCoordinator::new(Arc::clone(&link));
        let factory = RigFactory::new(Arc::clone(&link));

        let rig = match factory.assemble(&blueprint, &mut coordinator).await {
            Ok(rig) => rig,
            Err(e) => {
                signal_task.abort();
                hub.shutdown().await;
                return Err(e).context("Failed to assemble rig");
            }
        };

        let (cycles, presenters, loop_error) = if quit.is_raised() {
            warn!("Quit requested during assembly, skipping the main loop");
            let presenters = hub.metrics();
            hub.shutdown().await;
            (CycleStatsAggregator::new(), presenters, None)
        } else {
            let synchronizer = FrameSynchronizer::from_config(
                Arc::clone(&link),
                coordinator.registry().slot_set(),
                &blueprint.sync,
            );

            info!(
                vehicle = rig.vehicle,
                sensors = rig.sensors,
                synchronous = blueprint.is_synchronous(),
                view = view_name(&blueprint.view.mode),
                max_frames = ?self.config.max_frames,
                "Pipeline running"
            );

            let main_loop = MainLoop {
                synchronizer,
                factory,
                hub,
                view: blueprint.view.mode.clone(),
                spectator: blueprint.spectator.mode,
                vehicle: rig.vehicle,
                quit,
                limits: RunLimits {
                    max_frames: self.config.max_frames,
                    duration: self.config.duration,
                },
            };

            // The loop owns the hub; a panic there loses it and the presenter tasks are
            // dropped with the runtime.
            match tokio::spawn(main_loop.run()).await {
                Ok(outcome) => {
                    let presenters = outcome.hub.metrics();
                    outcome.hub.shutdown().await;
                    (outcome.cycles, presenters, outcome.error)
                }
                Err(e) => {
                    error!(error = %e, "Main loop task failed");
                    (
                        CycleStatsAggregator::new(),
                        Vec::new(),
                        Some(anyhow!("main loop task failed: {e}")),
                    )
                }
            }
        };
        signal_task.abort();

        info!("Tearing down rig...");
        let shutdown_state = coordinator.run().await;
        let shutdown_failures = coordinator.failures();

        if let Some(e) = loop_error {
            return Err(e.context("Pipeline aborted"));
        }

        let stats = PipelineStats {
            duration: started.elapsed(),
            vehicle: rig.vehicle,
            sensors: rig.sensors,
            view: view_name(&blueprint.view.mode),
            cycles,
            presenters,
            shutdown_state,
            shutdown_failures,
        };

        info!(
            cycles = stats.cycles.total_cycles,
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            shutdown = %stats.shutdown_state,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

fn view_name(view: &contracts::ViewMode) -> &'static str {
    match view {
        contracts::ViewMode::Grid { .. } => "grid",
        contracts::ViewMode::Single { .. } => "single",
        contracts::ViewMode::Dashboard { .. } => "dashboard",
        contracts::ViewMode::Headless => "headless",
    }
}

/// Raise the quit signal on Ctrl+C or SIGTERM
async fn watch_signals(quit: QuitSignal) {
    shutdown_signal().await;
    if quit.raise() {
        warn!("Received shutdown signal, stopping after the current cycle");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ShutdownState;

    fn config(name: &str, max_frames: u64) -> PipelineConfig {
        let mut blueprint = config_loader::ConfigLoader::load_preset(name).unwrap();
        blueprint.presenters.clear();
        PipelineConfig {
            blueprint,
            mock: true,
            max_frames: Some(max_frames),
            duration: None,
        }
    }

    #[tokio::test]
    async fn test_surround_preset_runs_to_max_frames() {
        let stats = Pipeline::new(config("surround", 5)).run().await.unwrap();

        assert_eq!(stats.cycles.total_cycles, 5);
        assert_eq!(stats.sensors, 4);
        assert_eq!(stats.view, "grid");
        assert_eq!(stats.shutdown_state, ShutdownState::SettingsRestored);
        assert_eq!(stats.shutdown_failures, 0);
    }

    #[tokio::test]
    async fn test_quit_before_loop_still_tears_down() {
        let pipeline = Pipeline::new(config("surround", 5));
        pipeline.quit_signal().raise();

        let stats = pipeline.run().await.unwrap();

        assert_eq!(stats.cycles.total_cycles, 0);
        assert_eq!(stats.sensors, 4);
        assert_eq!(stats.shutdown_state, ShutdownState::SettingsRestored);
        assert_eq!(stats.shutdown_failures, 0);
    }

    #[tokio::test]
    async fn test_drive_preset_stops_on_duration() {
        let mut config = config("drive", 1_000_000);
        config.max_frames = None;
        config.duration = Some(Duration::from_millis(100));

        let stats = Pipeline::new(config).run().await.unwrap();

        assert!(stats.cycles.total_cycles > 0);
        assert_eq!(stats.sensors, 0);
        assert_eq!(stats.shutdown_state, ShutdownState::SettingsRestored);
    }
}
