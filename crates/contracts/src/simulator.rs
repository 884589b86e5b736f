//! SimulatorLink trait - the seam to the simulation server
//!
//! Implemented by the in-process mock simulator and, behind the `real-carla` feature, by
//! the CARLA client adapter.

use std::future::Future;
use std::time::Duration;

use crate::{
    ActorId, BlueprintFilter, ContractError, Extent, SensorSource, SensorSpec, SpawnPointPolicy,
    TickId, Transform, WorldSettings,
};

type Result<T> = std::result::Result<T, ContractError>;

/// Simulator connection
///
/// All operations except `connect` take `&self` so that a single link can be shared by the
/// registry, the frame synchronizer and the shutdown coordinator.
pub trait SimulatorLink: Send + Sync + 'static {
    /// Connect to the simulation server
    fn connect(
        &mut self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Current world settings
    fn world_settings(&self) -> impl Future<Output = Result<WorldSettings>> + Send;

    /// Apply world settings
    fn apply_settings(&self, settings: WorldSettings) -> impl Future<Output = Result<()>> + Send;

    /// Toggle synchronous mode on the traffic manager
    fn set_traffic_manager_sync(&self, enabled: bool)
        -> impl Future<Output = Result<()>> + Send;

    /// Spawn a vehicle
    ///
    /// # Returns
    /// `None` when no blueprint matches or the spawn point is occupied
    fn spawn_vehicle(
        &self,
        filter: &BlueprintFilter,
        spawn_point: SpawnPointPolicy,
    ) -> impl Future<Output = Result<Option<ActorId>>> + Send;

    fn set_autopilot(
        &self,
        vehicle: ActorId,
        enabled: bool,
    ) -> impl Future<Output = Result<()>> + Send;

    /// World transform of an actor
    fn vehicle_transform(&self, vehicle: ActorId)
        -> impl Future<Output = Result<Transform>> + Send;

    /// Bounding box half-extent of an actor
    fn vehicle_extent(&self, vehicle: ActorId) -> impl Future<Output = Result<Extent>> + Send;

    /// Move the spectator camera
    fn set_spectator(&self, transform: Transform) -> impl Future<Output = Result<()>> + Send;

    /// Spawn a sensor attached to `vehicle` at `mount` (relative to the vehicle)
    ///
    /// The returned source is not listening yet.
    fn spawn_sensor(
        &self,
        vehicle: ActorId,
        spec: &SensorSpec,
        mount: Transform,
    ) -> impl Future<Output = Result<Box<dyn SensorSource>>> + Send;

    /// Destroy an actor
    ///
    /// Idempotent: returns Ok if the actor no longer exists
    fn destroy_actor(&self, actor: ActorId) -> impl Future<Output = Result<()>> + Send;

    /// Advance the world by one step (synchronous mode)
    ///
    /// # Returns
    /// The new frame number
    fn tick(&self) -> impl Future<Output = Result<TickId>> + Send;
}
