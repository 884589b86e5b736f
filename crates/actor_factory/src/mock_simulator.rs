//! Mock simulator
//!
//! In-process `SimulatorLink` used by tests and by `--mock` runs, with failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use contracts::{
    schedule, ActorId, BlueprintFilter, ContractError, Extent, SensorKind, SensorSource,
    SensorSpec, SimulatorLink, SpawnPointPolicy, TickId, Transform, WorldSettings,
};
use rand::seq::IndexedRandom;
use tracing::{debug, info, instrument};

use crate::mock_sensor::{MockSensor, MockSensorConfig, SensorFeed};

type Result<T> = std::result::Result<T, ContractError>;

/// Vehicle blueprints known to the mock world: (id, wheels)
const BLUEPRINTS: &[(&str, u32)] = &[
    ("vehicle.tesla.model3", 4),
    ("vehicle.audi.tt", 4),
    ("vehicle.lincoln.mkz_2020", 4),
    ("vehicle.carlamotors.carlacola", 4),
    ("vehicle.kawasaki.ninja", 2),
    ("vehicle.bh.crossbike", 2),
];

/// Recommended spawn points in the mock map
const SPAWN_POINTS: usize = 8;

/// Mock simulator configuration
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// `spawn_vehicle` finds no free spawn point
    pub fail_vehicle_spawn: bool,
    /// Sensor kinds the world refuses to spawn
    pub fail_sensor_kinds: Vec<SensorKind>,
    /// Actor ids whose destroy fails
    pub fail_destroy: Vec<ActorId>,
    /// `apply_settings` fails
    pub fail_apply_settings: bool,
    /// `tick` never returns
    pub hang_tick: bool,
    /// Time `tick` blocks the calling thread before advancing
    pub tick_block: Duration,
    /// Sensor names that never deliver
    pub silent_sensors: Vec<String>,
    /// Camera names that deliver malformed buffers
    pub corrupt_sensors: Vec<String>,
    /// Delay between a tick returning and its deliveries
    pub delivery_delay: Duration,
    /// Settings the world starts with
    pub initial_settings: WorldSettings,
}

#[derive(Debug, Clone)]
struct MockVehicle {
    blueprint: String,
    transform: Transform,
    spawn_point: usize,
    autopilot: bool,
}

#[derive(Default)]
struct WorldState {
    settings: WorldSettings,
    settings_history: Vec<WorldSettings>,
    traffic_manager_sync: bool,
    spectator: Option<Transform>,
    vehicles: HashMap<ActorId, MockVehicle>,
    sensors: HashMap<ActorId, Arc<SensorFeed>>,
    destroyed: Vec<ActorId>,
}

struct Inner {
    config: MockConfig,
    connected: AtomicBool,
    next_actor_id: AtomicU32,
    frame: AtomicU64,
    synchronous: Arc<AtomicBool>,
    epoch: Instant,
    world: Mutex<WorldState>,
}

/// Mock simulator
///
/// Cheap to clone; clones share one world. Actor ids start at 1000.
#[derive(Clone)]
pub struct MockSimulator {
    inner: Arc<Inner>,
}

impl MockSimulator {
    /// Create default mock simulator
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create mock simulator with failure injection
    pub fn with_config(config: MockConfig) -> Self {
        let settings = config.initial_settings;
        Self {
            inner: Arc::new(Inner {
                connected: AtomicBool::new(false),
                next_actor_id: AtomicU32::new(1000),
                frame: AtomicU64::new(0),
                synchronous: Arc::new(AtomicBool::new(settings.synchronous_mode)),
                epoch: Instant::now(),
                world: Mutex::new(WorldState {
                    settings,
                    ..Default::default()
                }),
                config,
            }),
        }
    }

    fn world(&self) -> MutexGuard<'_, WorldState> {
        // A panicking test thread must not wedge the rest of the world
        self.inner
            .world
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.inner.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ContractError::connection("not connected"))
        }
    }

    fn allocate_actor_id(&self) -> ActorId {
        self.inner.next_actor_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Current world settings
    pub fn settings(&self) -> WorldSettings {
        self.world().settings
    }

    /// Every settings change applied, in order
    pub fn settings_history(&self) -> Vec<WorldSettings> {
        self.world().settings_history.clone()
    }

    pub fn traffic_manager_sync(&self) -> bool {
        self.world().traffic_manager_sync
    }

    pub fn spectator(&self) -> Option<Transform> {
        self.world().spectator
    }

    /// Current world frame
    pub fn frame(&self) -> u64 {
        self.inner.frame.load(Ordering::SeqCst)
    }

    pub fn vehicle_count(&self) -> usize {
        self.world().vehicles.len()
    }

    pub fn sensor_count(&self) -> usize {
        self.world().sensors.len()
    }

    /// Actors currently alive
    pub fn alive_actors(&self) -> Vec<ActorId> {
        let world = self.world();
        let mut ids: Vec<ActorId> = world
            .vehicles
            .keys()
            .chain(world.sensors.keys())
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Actors destroyed so far, in destruction order
    pub fn destroyed_actors(&self) -> Vec<ActorId> {
        self.world().destroyed.clone()
    }

    pub fn autopilot(&self, vehicle: ActorId) -> bool {
        self.world()
            .vehicles
            .get(&vehicle)
            .is_some_and(|v| v.autopilot)
    }

    pub fn vehicle_blueprint(&self, vehicle: ActorId) -> Option<String> {
        self.world()
            .vehicles
            .get(&vehicle)
            .map(|v| v.blueprint.clone())
    }

    fn spawn_point_transform(index: usize) -> Transform {
        Transform::at(index as f64 * 25.0, -10.0, 0.6).with_yaw(index as f64 * 45.0)
    }
}

impl Default for MockSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorLink for MockSimulator {
    #[instrument(name = "mock_sim_connect", skip(self, timeout), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16, timeout: Duration) -> Result<()> {
        let _ = timeout;
        self.inner.connected.store(true, Ordering::SeqCst);
        info!("connected to mock simulator");
        Ok(())
    }

    async fn world_settings(&self) -> Result<WorldSettings> {
        self.ensure_connected()?;
        Ok(self.world().settings)
    }

    #[instrument(name = "mock_sim_apply_settings", skip(self))]
    async fn apply_settings(&self, settings: WorldSettings) -> Result<()> {
        self.ensure_connected()?;
        if self.inner.config.fail_apply_settings {
            return Err(ContractError::simulator("apply_settings", "mock failure"));
        }
        let mut world = self.world();
        world.settings = settings;
        world.settings_history.push(settings);
        self.inner
            .synchronous
            .store(settings.synchronous_mode, Ordering::SeqCst);
        Ok(())
    }

    async fn set_traffic_manager_sync(&self, enabled: bool) -> Result<()> {
        self.ensure_connected()?;
        self.world().traffic_manager_sync = enabled;
        Ok(())
    }

    #[instrument(
        name = "mock_sim_spawn_vehicle",
        skip(self, filter),
        fields(pattern = %filter.pattern)
    )]
    async fn spawn_vehicle(
        &self,
        filter: &BlueprintFilter,
        spawn_point: SpawnPointPolicy,
    ) -> Result<Option<ActorId>> {
        self.ensure_connected()?;
        if self.inner.config.fail_vehicle_spawn {
            return Ok(None);
        }

        let candidates: Vec<&str> = BLUEPRINTS
            .iter()
            .filter(|(id, wheels)| {
                filter.matches_id(id) && filter.wheels.map_or(true, |w| w == *wheels)
            })
            .map(|(id, _)| *id)
            .collect();
        let mut rng = rand::rng();
        let Some(blueprint) = candidates.choose(&mut rng).copied() else {
            debug!("no blueprint matches filter");
            return Ok(None);
        };

        let mut world = self.world();
        let occupied: Vec<usize> = world.vehicles.values().map(|v| v.spawn_point).collect();
        let index = match spawn_point {
            SpawnPointPolicy::Index(i) => i,
            SpawnPointPolicy::Random => {
                let free: Vec<usize> = (0..SPAWN_POINTS)
                    .filter(|i| !occupied.contains(i))
                    .collect();
                match free.choose(&mut rng) {
                    Some(&i) => i,
                    None => return Ok(None),
                }
            }
        };
        if index >= SPAWN_POINTS || occupied.contains(&index) {
            debug!(index, "spawn point unavailable");
            return Ok(None);
        }

        let actor_id = self.allocate_actor_id();
        world.vehicles.insert(
            actor_id,
            MockVehicle {
                blueprint: blueprint.to_string(),
                transform: Self::spawn_point_transform(index),
                spawn_point: index,
                autopilot: false,
            },
        );
        debug!(actor_id, blueprint, index, "vehicle spawned");
        Ok(Some(actor_id))
    }

    async fn set_autopilot(&self, vehicle: ActorId, enabled: bool) -> Result<()> {
        self.ensure_connected()?;
        let mut world = self.world();
        let v = world
            .vehicles
            .get_mut(&vehicle)
            .ok_or(ContractError::ActorNotFound { actor_id: vehicle })?;
        v.autopilot = enabled;
        Ok(())
    }

    async fn vehicle_transform(&self, vehicle: ActorId) -> Result<Transform> {
        self.ensure_connected()?;
        let world = self.world();
        let v = world
            .vehicles
            .get(&vehicle)
            .ok_or(ContractError::ActorNotFound { actor_id: vehicle })?;
        let mut transform = v.transform;
        if v.autopilot {
            // Drive along the heading at 10 m/s of simulated time
            let travelled = self.inner.frame.load(Ordering::SeqCst) as f64
                * world.settings.fixed_delta_seconds.unwrap_or(0.05)
                * 10.0;
            transform.location = transform
                .location
                .offset(transform.forward_vector().scaled(travelled));
        }
        Ok(transform)
    }

    async fn vehicle_extent(&self, vehicle: ActorId) -> Result<Extent> {
        self.ensure_connected()?;
        if !self.world().vehicles.contains_key(&vehicle) {
            return Err(ContractError::ActorNotFound { actor_id: vehicle });
        }
        Ok(Extent::default())
    }

    async fn set_spectator(&self, transform: Transform) -> Result<()> {
        self.ensure_connected()?;
        self.world().spectator = Some(transform);
        Ok(())
    }

    #[instrument(
        name = "mock_sim_spawn_sensor",
        skip(self, spec, mount),
        fields(sensor = %spec.name, kind = %spec.kind, vehicle)
    )]
    async fn spawn_sensor(
        &self,
        vehicle: ActorId,
        spec: &SensorSpec,
        mount: Transform,
    ) -> Result<Box<dyn SensorSource>> {
        self.ensure_connected()?;
        let _ = mount;
        let config = &self.inner.config;
        if config.fail_sensor_kinds.contains(&spec.kind) {
            return Err(ContractError::simulator("spawn_sensor", "mock failure"));
        }

        let mut world = self.world();
        if !world.vehicles.contains_key(&vehicle) {
            return Err(ContractError::ActorNotFound { actor_id: vehicle });
        }

        let mut sensor_config = MockSensorConfig::new(spec.name.clone(), spec.kind);
        sensor_config.sample_interval = spec.sample_interval_sec;
        if let Some(camera) = &spec.camera {
            sensor_config.image_width = camera.width_px;
            sensor_config.image_height = camera.height_px;
        }
        sensor_config.silent = config.silent_sensors.contains(&spec.name);
        sensor_config.corrupt = config.corrupt_sensors.contains(&spec.name);

        let actor_id = self.allocate_actor_id();
        let feed = Arc::new(SensorFeed::new(sensor_config));
        world.sensors.insert(actor_id, feed.clone());
        debug!(actor_id, "sensor spawned");

        Ok(Box::new(MockSensor::new(
            actor_id,
            feed,
            self.inner.synchronous.clone(),
            self.inner.epoch,
        )))
    }

    #[instrument(name = "mock_sim_destroy_actor", skip(self))]
    async fn destroy_actor(&self, actor: ActorId) -> Result<()> {
        if self.inner.config.fail_destroy.contains(&actor) {
            return Err(ContractError::simulator("destroy_actor", "mock failure"));
        }

        let mut world = self.world();
        let existed = match world.sensors.remove(&actor) {
            Some(feed) => {
                feed.halt();
                true
            }
            None => world.vehicles.remove(&actor).is_some(),
        };
        if existed {
            world.destroyed.push(actor);
        }

        // Idempotent: return Ok even if not exists
        Ok(())
    }

    #[instrument(name = "mock_sim_tick", skip(self))]
    async fn tick(&self) -> Result<TickId> {
        self.ensure_connected()?;
        if self.inner.config.hang_tick {
            std::future::pending::<()>().await;
        }
        if !self.inner.config.tick_block.is_zero() {
            std::thread::sleep(self.inner.config.tick_block);
        }

        let (settings, feeds) = {
            let world = self.world();
            let feeds: Vec<Arc<SensorFeed>> = world
                .sensors
                .values()
                .filter(|feed| feed.is_listening())
                .cloned()
                .collect();
            (world.settings, feeds)
        };
        if !settings.synchronous_mode {
            return Err(ContractError::simulator(
                "tick",
                "world is not in synchronous mode",
            ));
        }

        let delta = settings.fixed_delta_seconds.unwrap_or(0.05);
        let frame = self.inner.frame.fetch_add(1, Ordering::SeqCst) + 1;
        let timestamp = frame as f64 * delta;
        let delay = self.inner.config.delivery_delay;

        for feed in feeds {
            let k = feed.count_tick();
            if !schedule::is_due(k, feed.config().sample_interval, delta) {
                continue;
            }
            // Deliveries arrive on their own threads, after the tick has returned
            std::thread::spawn(move || {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                feed.deliver(frame, timestamp);
            });
        }

        Ok(frame)
    }
}
