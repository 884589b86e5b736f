//! RigFactory - builds the vehicle + sensor rig from a `RigBlueprint`

use std::sync::Arc;

use contracts::{ActorId, RigBlueprint, SimulatorLink, SpectatorMode, WorldSettings};
use tracing::{info, instrument, warn};

use crate::error::{ActorFactoryError, Result};
use crate::mounts::{resolve_mount, spectator_behind, spectator_follow};
use crate::shutdown::ShutdownCoordinator;

/// Assembled rig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rig {
    pub vehicle: ActorId,
    pub sensors: usize,
}

/// Rig Factory
///
/// Every world change is recorded on the `ShutdownCoordinator` before the next one is
/// attempted, so a failure at any step can be undone by `ShutdownCoordinator::run`.
pub struct RigFactory<L> {
    link: Arc<L>,
}

impl<L: SimulatorLink> RigFactory<L> {
    pub fn new(link: Arc<L>) -> Self {
        Self { link }
    }

    /// Configure the world, spawn the vehicle and attach every sensor
    ///
    /// # Errors
    /// `SettingsFailed`, `SpawnFailed` or `AttachFailed`. The coordinator has already been
    /// run when an error is returned.
    #[instrument(
        name = "rig_factory_assemble",
        skip(self, blueprint, coordinator),
        fields(sensors = blueprint.sensors.len(), synchronous = blueprint.is_synchronous())
    )]
    pub async fn assemble(
        &self,
        blueprint: &RigBlueprint,
        coordinator: &mut ShutdownCoordinator<L>,
    ) -> Result<Rig> {
        match self.try_assemble(blueprint, coordinator).await {
            Ok(rig) => {
                info!(vehicle = rig.vehicle, sensors = rig.sensors, "rig assembled");
                Ok(rig)
            }
            Err(e) => {
                warn!(error = %e, "rig assembly failed, tearing down");
                coordinator.run().await;
                Err(e)
            }
        }
    }

    async fn try_assemble(
        &self,
        blueprint: &RigBlueprint,
        coordinator: &mut ShutdownCoordinator<L>,
    ) -> Result<Rig> {
        self.configure_world(blueprint, coordinator).await?;

        let vehicle = self.spawn_vehicle(blueprint).await?;
        coordinator.record_vehicle(vehicle);

        if blueprint.vehicle.autopilot {
            self.link.set_autopilot(vehicle, true).await?;
            info!(vehicle, "autopilot enabled");
        }

        let extent = self.link.vehicle_extent(vehicle).await?;
        for spec in &blueprint.sensors {
            let mount = resolve_mount(&spec.mount, &extent);
            coordinator
                .registry_mut()
                .attach(self.link.as_ref(), vehicle, spec, mount)
                .await?;
        }

        if blueprint.spectator.mode != SpectatorMode::Off {
            self.place_spectator(vehicle, blueprint.spectator.mode).await?;
        }

        Ok(Rig {
            vehicle,
            sensors: coordinator.registry().len(),
        })
    }

    async fn configure_world(
        &self,
        blueprint: &RigBlueprint,
        coordinator: &mut ShutdownCoordinator<L>,
    ) -> Result<()> {
        let original = self.link.world_settings().await?;
        coordinator.record_original_settings(original);

        if !blueprint.is_synchronous() {
            return Ok(());
        }

        let settings: WorldSettings = original.synchronous(blueprint.sync.fixed_delta_seconds);
        self.link
            .apply_settings(settings)
            .await
            .map_err(|e| ActorFactoryError::SettingsFailed {
                message: e.to_string(),
            })?;
        self.link.set_traffic_manager_sync(true).await?;
        coordinator.record_traffic_manager_sync();
        info!(
            fixed_delta = blueprint.sync.fixed_delta_seconds,
            "synchronous mode enabled"
        );
        Ok(())
    }

    async fn spawn_vehicle(&self, blueprint: &RigBlueprint) -> Result<ActorId> {
        let filter = &blueprint.vehicle.blueprint;
        info!(pattern = %filter.pattern, wheels = ?filter.wheels, "spawning vehicle");
        self.link
            .spawn_vehicle(filter, blueprint.vehicle.spawn_point)
            .await?
            .ok_or_else(|| {
                ActorFactoryError::spawn_failed(
                    &filter.pattern,
                    "no matching blueprint or spawn point occupied",
                )
            })
    }

    /// Move the spectator relative to the vehicle
    pub async fn place_spectator(&self, vehicle: ActorId, mode: SpectatorMode) -> Result<()> {
        let transform = self.link.vehicle_transform(vehicle).await?;
        let spectator = match mode {
            SpectatorMode::Off => return Ok(()),
            SpectatorMode::Behind => spectator_behind(&transform),
            SpectatorMode::Follow => spectator_follow(&transform),
        };
        self.link.set_spectator(spectator).await?;
        Ok(())
    }
}
