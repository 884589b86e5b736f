//! CARLA Sensor SensorSource wrapper
//!
//! Only compiled when the `real-carla` feature is enabled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use carla::client::{ActorBase, Sensor};
use contracts::{ActorId, DeliveryCallback, SensorKind, SensorSource};
use tracing::{debug, trace, warn};

use crate::sensor_data_converter::convert_sensor_data;

/// CARLA Sensor wrapper
pub struct CarlaSensorSource {
    name: String,
    kind: SensorKind,
    sensor: Sensor,
    listening: Arc<AtomicBool>,
}

impl CarlaSensorSource {
    pub fn new(name: String, kind: SensorKind, sensor: Sensor) -> Self {
        Self {
            name,
            kind,
            sensor,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SensorSource for CarlaSensorSource {
    fn actor_id(&self) -> ActorId {
        self.sensor.id()
    }

    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn listen(&self, callback: DeliveryCallback) {
        // Idempotent: if already listening, don't register again
        if self.listening.swap(true, Ordering::SeqCst) {
            warn!(sensor = %self.name, "sensor already listening");
            return;
        }

        let name = self.name.clone();
        let kind = self.kind;
        let listening = self.listening.clone();
        debug!(sensor = %name, kind = %kind, "starting CARLA sensor");

        self.sensor.listen(move |data| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }
            match convert_sensor_data(kind, &data) {
                Some(sample) => callback(sample),
                None => trace!(sensor = %name, "unexpected measurement type"),
            }
        });
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(sensor = %self.name, "stopping CARLA sensor");
            self.sensor.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
