//! ShutdownCoordinator - forward-only teardown
//!
//! RUNNING -> STOPPING -> DESTROYED -> SETTINGS_RESTORED.
//! Each step runs at most once; collaborator failures are logged and the machine still
//! advances, so one `run()` always leaves the world released.

use std::sync::Arc;

use contracts::{ActorId, ShutdownState, SimulatorLink, WorldSettings};
use ingestion::SensorRegistry;
use tracing::{error, info, instrument, warn};

/// Owns everything that has to be released at the end of a run
pub struct ShutdownCoordinator<L> {
    link: Arc<L>,
    registry: SensorRegistry,
    vehicle: Option<ActorId>,
    original_settings: Option<WorldSettings>,
    traffic_manager_sync: bool,
    state: ShutdownState,
    failures: usize,
}

impl<L: SimulatorLink> ShutdownCoordinator<L> {
    /// Create before touching any world state
    pub fn new(link: Arc<L>) -> Self {
        Self {
            link,
            registry: SensorRegistry::new(),
            vehicle: None,
            original_settings: None,
            traffic_manager_sync: false,
            state: ShutdownState::Running,
            failures: 0,
        }
    }

    pub fn link(&self) -> &Arc<L> {
        &self.link
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SensorRegistry {
        &mut self.registry
    }

    pub fn state(&self) -> ShutdownState {
        self.state
    }

    pub fn vehicle(&self) -> Option<ActorId> {
        self.vehicle
    }

    /// Collaborator failures seen during teardown
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Settings to reapply at the end. Only the first call is kept.
    pub fn record_original_settings(&mut self, settings: WorldSettings) {
        if self.original_settings.is_none() {
            self.original_settings = Some(settings);
        }
    }

    /// Traffic manager synchronous mode was switched on
    pub fn record_traffic_manager_sync(&mut self) {
        self.traffic_manager_sync = true;
    }

    pub fn record_vehicle(&mut self, vehicle: ActorId) {
        self.vehicle = Some(vehicle);
    }

    /// Drive the machine to SETTINGS_RESTORED
    ///
    /// Idempotent: calling again after completion does nothing.
    #[instrument(name = "shutdown_run", skip(self), fields(state = %self.state))]
    pub async fn run(&mut self) -> ShutdownState {
        if self.state.is_terminal() {
            return self.state;
        }
        info!("shutting down");

        while let Some(next) = self.state.next() {
            match next {
                ShutdownState::Stopping => self.stop_delivery(),
                ShutdownState::Destroyed => self.destroy_actors().await,
                ShutdownState::SettingsRestored => self.restore_settings().await,
                ShutdownState::Running => {}
            }
            info!(from = %self.state, to = %next, "shutdown state advanced");
            self.state = next;
        }

        if self.failures > 0 {
            warn!(failures = self.failures, "shutdown completed with failures");
        } else {
            info!("shutdown completed");
        }
        self.state
    }

    fn stop_delivery(&mut self) {
        self.registry.stop_all();
    }

    async fn destroy_actors(&mut self) {
        let failures = self.registry.detach_all(self.link.as_ref()).await;
        for e in &failures {
            error!(error = %e, "failed to destroy sensor");
        }
        self.failures += failures.len();

        if let Some(vehicle) = self.vehicle.take() {
            info!(actor_id = vehicle, "destroying vehicle");
            if let Err(e) = self.link.destroy_actor(vehicle).await {
                error!(actor_id = vehicle, error = %e, "failed to destroy vehicle");
                self.failures += 1;
            }
        }
    }

    async fn restore_settings(&mut self) {
        if self.traffic_manager_sync {
            if let Err(e) = self.link.set_traffic_manager_sync(false).await {
                error!(error = %e, "failed to disable traffic manager synchronous mode");
                self.failures += 1;
            }
        }

        if let Some(settings) = self.original_settings {
            if let Err(e) = self.link.apply_settings(settings).await {
                error!(error = %e, "failed to restore world settings");
                self.failures += 1;
            } else {
                info!(
                    synchronous = settings.synchronous_mode,
                    fixed_delta = ?settings.fixed_delta_seconds,
                    "world settings restored"
                );
            }
        }
    }
}
