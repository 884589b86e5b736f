//! Minimal in-memory link for registry tests.
//!
//! Sensors never produce anything on their own; tests push deliveries through
//! [`TestLink::deliver`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{
    ActorId, BlueprintFilter, ContractError, DeliveryCallback, Extent, RawSample, SensorKind,
    SensorSource, SensorSpec, SimulatorLink, SpawnPointPolicy, TickId, Transform, WorldSettings,
};

type Callbacks = Arc<Mutex<HashMap<ActorId, DeliveryCallback>>>;

#[derive(Default)]
pub struct TestLink {
    next_id: AtomicU32,
    callbacks: Callbacks,
    alive: Mutex<Vec<ActorId>>,
    /// Every destroy call, in order
    destroyed: Mutex<Vec<ActorId>>,
    pub refuse_sensors: AtomicBool,
}

impl TestLink {
    pub fn deliver(&self, actor: ActorId, raw: RawSample) {
        let callback = self.callbacks.lock().unwrap().get(&actor).cloned();
        if let Some(callback) = callback {
            callback(raw);
        }
    }

    pub fn destroyed(&self) -> Vec<ActorId> {
        self.destroyed.lock().unwrap().clone()
    }
}

struct TestSource {
    actor_id: ActorId,
    kind: SensorKind,
    listening: AtomicBool,
    callbacks: Callbacks,
}

impl SensorSource for TestSource {
    fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn listen(&self, callback: DeliveryCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }
        self.callbacks
            .lock()
            .unwrap()
            .insert(self.actor_id, callback);
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
        self.callbacks.lock().unwrap().remove(&self.actor_id);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

type Result<T> = std::result::Result<T, ContractError>;

impl SimulatorLink for TestLink {
    async fn connect(&mut self, _host: &str, _port: u16, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn world_settings(&self) -> Result<WorldSettings> {
        Ok(WorldSettings::default())
    }

    async fn apply_settings(&self, _settings: WorldSettings) -> Result<()> {
        Ok(())
    }

    async fn set_traffic_manager_sync(&self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    async fn spawn_vehicle(
        &self,
        _filter: &BlueprintFilter,
        _spawn_point: SpawnPointPolicy,
    ) -> Result<Option<ActorId>> {
        Ok(Some(1))
    }

    async fn set_autopilot(&self, _vehicle: ActorId, _enabled: bool) -> Result<()> {
        Ok(())
    }

    async fn vehicle_transform(&self, _vehicle: ActorId) -> Result<Transform> {
        Ok(Transform::default())
    }

    async fn vehicle_extent(&self, _vehicle: ActorId) -> Result<Extent> {
        Ok(Extent::default())
    }

    async fn set_spectator(&self, _transform: Transform) -> Result<()> {
        Ok(())
    }

    async fn spawn_sensor(
        &self,
        _vehicle: ActorId,
        spec: &SensorSpec,
        _mount: Transform,
    ) -> Result<Box<dyn SensorSource>> {
        if self.refuse_sensors.load(Ordering::SeqCst) {
            return Err(ContractError::simulator("spawn_sensor", "blueprint not found"));
        }
        let actor_id = 100 + self.next_id.fetch_add(1, Ordering::SeqCst);
        self.alive.lock().unwrap().push(actor_id);
        Ok(Box::new(TestSource {
            actor_id,
            kind: spec.kind,
            listening: AtomicBool::new(false),
            callbacks: self.callbacks.clone(),
        }))
    }

    async fn destroy_actor(&self, actor: ActorId) -> Result<()> {
        self.alive.lock().unwrap().retain(|&id| id != actor);
        self.destroyed.lock().unwrap().push(actor);
        Ok(())
    }

    async fn tick(&self) -> Result<TickId> {
        Ok(0)
    }
}
