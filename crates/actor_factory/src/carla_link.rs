//! Real CARLA link
//!
//! Connects to a CARLA server through the carla-rust crate.
//! Only compiled when the `real-carla` feature is enabled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use carla::client::{ActorBase, Client, Sensor, Vehicle, World};
use carla::geom::{Location, Rotation, Transform as CarlaTransform};
use carla::rpc::EpisodeSettings;
use contracts::{
    ActorId, BlueprintFilter, ContractError, Extent, SensorSource, SensorSpec, SimulatorLink,
    SpawnPointPolicy, TickId, Transform, WorldSettings,
};
use rand::seq::IndexedRandom;
use tracing::{debug, info, instrument, warn};

use crate::carla_sensor_source::CarlaSensorSource;

type Result<T> = std::result::Result<T, ContractError>;

#[derive(Clone)]
enum ActorType {
    Vehicle(Vehicle),
    Sensor(Sensor),
}

/// Real CARLA link
///
/// Uses Mutex for interior mutability, allowing `&self` methods to modify the World.
#[derive(Default, Clone)]
pub struct CarlaLink {
    client: Arc<Mutex<Option<Client>>>,
    world: Arc<Mutex<Option<World>>>,
    traffic_manager_port: u16,
    timeout: Duration,
    actors: Arc<Mutex<HashMap<ActorId, ActorType>>>,
}

impl CarlaLink {
    pub fn new(traffic_manager_port: u16) -> Self {
        Self {
            traffic_manager_port,
            timeout: Duration::from_secs(10),
            ..Default::default()
        }
    }

    fn poisoned(what: &str) -> ContractError {
        ContractError::simulator(what, "lock poisoned")
    }

    /// Access World with mutable reference, ensuring connected
    fn with_world<R>(&self, f: impl FnOnce(&mut World) -> Result<R>) -> Result<R> {
        let mut guard = self.world.lock().map_err(|_| Self::poisoned("world"))?;
        let world = guard
            .as_mut()
            .ok_or_else(|| ContractError::connection("not connected to CARLA server"))?;
        f(world)
    }

    fn with_client<R>(&self, f: impl FnOnce(&mut Client) -> Result<R>) -> Result<R> {
        let mut guard = self.client.lock().map_err(|_| Self::poisoned("client"))?;
        let client = guard
            .as_mut()
            .ok_or_else(|| ContractError::connection("not connected to CARLA server"))?;
        f(client)
    }

    fn vehicle(&self, id: ActorId) -> Result<Vehicle> {
        let actors = self.actors.lock().map_err(|_| Self::poisoned("actors"))?;
        match actors.get(&id) {
            Some(ActorType::Vehicle(v)) => Ok(v.clone()),
            _ => Err(ContractError::ActorNotFound { actor_id: id }),
        }
    }

    fn store_actor(&self, id: ActorId, actor: ActorType) -> Result<()> {
        self.actors
            .lock()
            .map_err(|_| Self::poisoned("actors"))?
            .insert(id, actor);
        Ok(())
    }

    fn to_carla_transform(transform: &Transform) -> CarlaTransform {
        CarlaTransform {
            location: Location {
                x: transform.location.x as f32,
                y: transform.location.y as f32,
                z: transform.location.z as f32,
            },
            rotation: Rotation {
                pitch: transform.rotation.pitch as f32,
                yaw: transform.rotation.yaw as f32,
                roll: transform.rotation.roll as f32,
            },
        }
    }

    fn from_carla_transform(transform: &CarlaTransform) -> Transform {
        let mut out = Transform::at(
            transform.location.x as f64,
            transform.location.y as f64,
            transform.location.z as f64,
        );
        out.rotation.pitch = transform.rotation.pitch as f64;
        out.rotation.yaw = transform.rotation.yaw as f64;
        out.rotation.roll = transform.rotation.roll as f64;
        out
    }
}

impl SimulatorLink for CarlaLink {
    #[instrument(name = "carla_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<()> {
        let mut client = Client::connect(host, port, None);
        client.set_timeout(timeout);
        let world = client.world();
        info!(map = %world.map().name(), "connected to CARLA server");

        self.timeout = timeout;
        *self.client.lock().map_err(|_| Self::poisoned("client"))? = Some(client);
        *self.world.lock().map_err(|_| Self::poisoned("world"))? = Some(world);
        Ok(())
    }

    async fn world_settings(&self) -> Result<WorldSettings> {
        self.with_world(|world| {
            let settings = world.settings();
            Ok(WorldSettings {
                synchronous_mode: settings.synchronous_mode,
                fixed_delta_seconds: settings.fixed_delta_seconds,
                no_rendering_mode: settings.no_rendering_mode,
            })
        })
    }

    #[instrument(name = "carla_apply_settings", skip(self))]
    async fn apply_settings(&self, settings: WorldSettings) -> Result<()> {
        let timeout = self.timeout;
        self.with_world(|world| {
            let mut episode: EpisodeSettings = world.settings();
            episode.synchronous_mode = settings.synchronous_mode;
            episode.fixed_delta_seconds = settings.fixed_delta_seconds;
            episode.no_rendering_mode = settings.no_rendering_mode;
            world.apply_settings(&episode, timeout);
            Ok(())
        })
    }

    async fn set_traffic_manager_sync(&self, enabled: bool) -> Result<()> {
        let port = self.traffic_manager_port;
        self.with_client(|client| {
            let mut tm = client.instance_tm(Some(port));
            tm.set_synchronous_mode(enabled);
            Ok(())
        })
    }

    #[instrument(
        name = "carla_spawn_vehicle",
        skip(self, filter),
        fields(pattern = %filter.pattern)
    )]
    async fn spawn_vehicle(
        &self,
        filter: &BlueprintFilter,
        spawn_point: SpawnPointPolicy,
    ) -> Result<Option<ActorId>> {
        let vehicle = self.with_world(|world| {
            let library = world.blueprint_library();
            let candidates: Vec<_> = library
                .filter(&filter.pattern)
                .iter()
                .filter(|bp| filter.matches_id(&bp.id()))
                .filter(|bp| {
                    filter.wheels.map_or(true, |wheels| {
                        bp.attribute("number_of_wheels")
                            .and_then(|attr| attr.value_string().parse::<u32>().ok())
                            == Some(wheels)
                    })
                })
                .collect();

            let mut rng = rand::rng();
            let Some(blueprint) = candidates.choose(&mut rng) else {
                warn!("no vehicle blueprint matches filter");
                return Ok(None);
            };

            let points = world.map().recommended_spawn_points();
            let point = match spawn_point {
                SpawnPointPolicy::Random => points.choose(&mut rng).cloned(),
                SpawnPointPolicy::Index(i) => points.get(i).cloned(),
            };
            let Some(point) = point else {
                warn!("no spawn point available");
                return Ok(None);
            };

            // Collisions at the spawn point are reported as None, like try_spawn_actor
            let Ok(actor) = world.spawn_actor(blueprint, &point) else {
                return Ok(None);
            };
            Ok(Vehicle::try_from(actor).ok())
        })?;

        let Some(vehicle) = vehicle else {
            return Ok(None);
        };
        let actor_id = vehicle.id();
        debug!(actor_id, "vehicle spawned");
        self.store_actor(actor_id, ActorType::Vehicle(vehicle))?;
        Ok(Some(actor_id))
    }

    async fn set_autopilot(&self, vehicle: ActorId, enabled: bool) -> Result<()> {
        self.vehicle(vehicle)?.set_autopilot(enabled);
        Ok(())
    }

    async fn vehicle_transform(&self, vehicle: ActorId) -> Result<Transform> {
        let vehicle = self.vehicle(vehicle)?;
        Ok(Self::from_carla_transform(&vehicle.transform()))
    }

    async fn vehicle_extent(&self, vehicle: ActorId) -> Result<Extent> {
        let extent = self.vehicle(vehicle)?.bounding_box().extent;
        Ok(Extent {
            x: extent.x as f64,
            y: extent.y as f64,
            z: extent.z as f64,
        })
    }

    async fn set_spectator(&self, transform: Transform) -> Result<()> {
        self.with_world(|world| {
            world
                .spectator()
                .set_transform(&Self::to_carla_transform(&transform));
            Ok(())
        })
    }

    #[instrument(
        name = "carla_spawn_sensor",
        skip(self, spec, mount),
        fields(sensor = %spec.name, kind = %spec.kind, vehicle)
    )]
    async fn spawn_sensor(
        &self,
        vehicle: ActorId,
        spec: &SensorSpec,
        mount: Transform,
    ) -> Result<Box<dyn SensorSource>> {
        let parent = self.vehicle(vehicle)?;
        let sensor = self.with_world(|world| {
            let library = world.blueprint_library();
            let blueprint_id = spec.kind.blueprint_id();
            let mut blueprint = library.find(blueprint_id).ok_or_else(|| {
                ContractError::simulator(
                    "spawn_sensor",
                    format!("blueprint '{blueprint_id}' not found"),
                )
            })?;

            for (key, value) in spec.attributes() {
                if !blueprint.set_attribute(&key, &value) {
                    warn!(key, value, "failed to set sensor attribute");
                }
            }

            let actor = world
                .spawn_actor_attached(
                    &blueprint,
                    &Self::to_carla_transform(&mount),
                    &parent,
                    None,
                )
                .map_err(|e| ContractError::simulator("spawn_sensor", e.to_string()))?;
            Sensor::try_from(actor).map_err(|_| {
                ContractError::simulator("spawn_sensor", "spawned actor is not a sensor")
            })
        })?;

        let actor_id = sensor.id();
        self.store_actor(actor_id, ActorType::Sensor(sensor.clone()))?;
        debug!(actor_id, "sensor spawned and attached");
        Ok(Box::new(CarlaSensorSource::new(
            spec.name.clone(),
            spec.kind,
            sensor,
        )))
    }

    #[instrument(name = "carla_destroy_actor", skip(self))]
    async fn destroy_actor(&self, actor: ActorId) -> Result<()> {
        let removed = self
            .actors
            .lock()
            .map_err(|_| Self::poisoned("actors"))?
            .remove(&actor);

        let destroyed = match removed {
            Some(ActorType::Vehicle(v)) => v.destroy(),
            Some(ActorType::Sensor(s)) => {
                if s.is_listening() {
                    s.stop();
                }
                s.destroy()
            }
            // Idempotent: return Ok even if not exists
            None => return Ok(()),
        };
        if !destroyed {
            return Err(ContractError::simulator(
                "destroy_actor",
                format!("server refused to destroy actor {actor}"),
            ));
        }
        debug!(actor, "actor destroyed");
        Ok(())
    }

    async fn tick(&self) -> Result<TickId> {
        // The world lock is released before the call; a hung tick must not wedge teardown
        let mut world = self.with_world(|world| Ok(world.clone()))?;
        tokio::task::spawn_blocking(move || world.tick())
            .await
            .map_err(|e| ContractError::simulator("tick", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    // Real client tests require CARLA server running
    use super::*;

    #[tokio::test]
    #[ignore = "requires CARLA server"]
    async fn test_real_link_connect() {
        let mut link = CarlaLink::new(8000);
        link.connect("localhost", 2000, Duration::from_secs(10))
            .await
            .unwrap();
        let settings = link.world_settings().await.unwrap();
        link.apply_settings(settings).await.unwrap();
    }
}
