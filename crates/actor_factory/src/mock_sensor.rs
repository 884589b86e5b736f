//! Mock sensor implementation
//!
//! Implements `SensorSource` for the mock simulator. In synchronous mode the simulator
//! pushes deliveries from `tick()`; otherwise each sensor free-runs on its own thread at
//! its sample interval, consistent with a real server that is not client-ticked.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    ActorId, DeliveryCallback, GnssData, ImuData, RawPayload, RawSample, SensorKind,
    SensorSource, Vector3,
};
use tracing::{debug, trace};

/// Free-running period for sensors without a sample interval
const DEFAULT_PERIOD: Duration = Duration::from_millis(50);

/// Mock sensor configuration
#[derive(Debug, Clone)]
pub struct MockSensorConfig {
    pub name: String,
    pub kind: SensorKind,

    /// Seconds between samples (0 = every tick / default period)
    pub sample_interval: f64,

    /// Image size (camera only)
    pub image_width: u32,
    pub image_height: u32,

    /// Spawned fine but never delivers
    pub silent: bool,

    /// Camera buffers one byte short
    pub corrupt: bool,
}

impl MockSensorConfig {
    pub fn new(name: impl Into<String>, kind: SensorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            sample_interval: 0.0,
            image_width: 800,
            image_height: 600,
            silent: false,
            corrupt: false,
        }
    }

    fn period(&self) -> Duration {
        if self.sample_interval > 0.0 {
            Duration::from_secs_f64(self.sample_interval)
        } else {
            DEFAULT_PERIOD
        }
    }
}

/// State shared between a mock sensor and the mock world
pub(crate) struct SensorFeed {
    config: MockSensorConfig,
    listening: AtomicBool,
    callback: Mutex<Option<DeliveryCallback>>,

    /// World ticks seen while listening
    ticks: AtomicU64,
}

impl SensorFeed {
    pub(crate) fn new(config: MockSensorConfig) -> Self {
        Self {
            config,
            listening: AtomicBool::new(false),
            callback: Mutex::new(None),
            ticks: AtomicU64::new(0),
        }
    }

    pub(crate) fn config(&self) -> &MockSensorConfig {
        &self.config
    }

    pub(crate) fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Count a world tick; returns the tick number since listen started
    pub(crate) fn count_tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invoke the callback for `frame` unless stopped or silent
    pub(crate) fn deliver(&self, frame: u64, timestamp: f64) {
        if self.config.silent || !self.is_listening() {
            return;
        }
        let callback = match self.callback.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if let Some(callback) = callback {
            callback(generate_sample(&self.config, frame, timestamp));
            trace!(sensor = %self.config.name, frame, "mock sample delivered");
        }
    }

    /// Stop delivering, as when the actor is destroyed
    pub(crate) fn halt(&self) {
        self.listening.store(false, Ordering::SeqCst);
        self.set_callback(None);
    }

    fn set_callback(&self, callback: Option<DeliveryCallback>) {
        if let Ok(mut guard) = self.callback.lock() {
            *guard = callback;
        }
    }
}

/// Green level of every pixel a mock camera named `name` produces
///
/// Red and blue carry the frame number (mod 256).
pub fn camera_tint(name: &str) -> u8 {
    name.bytes().fold(0u8, u8::wrapping_add)
}

/// Generate a simulated raw sample
fn generate_sample(config: &MockSensorConfig, frame: u64, timestamp: f64) -> RawSample {
    let payload = match config.kind {
        SensorKind::RgbCamera => {
            let shade = (frame % 256) as u8;
            let pixels = config.image_width as usize * config.image_height as usize;
            let mut data = [shade, camera_tint(&config.name), shade, 255].repeat(pixels);
            if config.corrupt {
                data.pop();
            }
            RawPayload::Bgra {
                width: config.image_width,
                height: config.image_height,
                data: Bytes::from(data),
            }
        }
        SensorKind::Gnss => RawPayload::Gnss(GnssData {
            latitude: 37.421999 + frame as f64 * 1e-6,
            longitude: -122.084 + frame as f64 * 1e-6,
            altitude: 15.3,
        }),
        SensorKind::Imu => RawPayload::Imu(ImuData {
            accelerometer: Vector3::new(0.0, 0.0, 9.81),
            gyroscope: Vector3::default(),
            compass: (frame as f64 * 0.01) % std::f64::consts::TAU,
        }),
    };

    RawSample {
        frame,
        timestamp,
        payload,
    }
}

/// Mock sensor
pub struct MockSensor {
    actor_id: ActorId,
    feed: Arc<SensorFeed>,

    /// World synchronous-mode flag, shared with the mock simulator
    synchronous: Arc<AtomicBool>,
    epoch: Instant,
}

impl MockSensor {
    pub(crate) fn new(
        actor_id: ActorId,
        feed: Arc<SensorFeed>,
        synchronous: Arc<AtomicBool>,
        epoch: Instant,
    ) -> Self {
        Self {
            actor_id,
            feed,
            synchronous,
            epoch,
        }
    }

    fn spawn_free_running(&self) {
        let feed = self.feed.clone();
        let synchronous = self.synchronous.clone();
        let epoch = self.epoch;
        let period = feed.config().period();

        thread::spawn(move || {
            debug!(sensor = %feed.config().name, period_ms = period.as_millis() as u64, "mock sensor started");
            while feed.is_listening() {
                thread::sleep(period);
                if synchronous.load(Ordering::SeqCst) {
                    continue;
                }
                let elapsed = epoch.elapsed();
                let frame = (elapsed.as_secs_f64() / DEFAULT_PERIOD.as_secs_f64()) as u64;
                feed.deliver(frame, elapsed.as_secs_f64());
            }
            debug!(sensor = %feed.config().name, "mock sensor stopped");
        });
    }
}

impl SensorSource for MockSensor {
    fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    fn kind(&self) -> SensorKind {
        self.feed.config().kind
    }

    fn listen(&self, callback: DeliveryCallback) {
        // Idempotent: if already listening, don't start again
        if self.feed.listening.swap(true, Ordering::SeqCst) {
            return;
        }
        self.feed.set_callback(Some(callback));
        if !self.synchronous.load(Ordering::SeqCst) {
            self.spawn_free_running();
        }
    }

    fn stop(&self) {
        self.feed.halt();
    }

    fn is_listening(&self) -> bool {
        self.feed.is_listening()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    fn sensor(config: MockSensorConfig, synchronous: bool) -> MockSensor {
        MockSensor::new(
            1001,
            Arc::new(SensorFeed::new(config)),
            Arc::new(AtomicBool::new(synchronous)),
            Instant::now(),
        )
    }

    #[test]
    fn free_running_sensor_delivers_until_stopped() {
        let mut config = MockSensorConfig::new("imu", SensorKind::Imu);
        config.sample_interval = 0.005;
        let sensor = sensor(config, false);

        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();
        sensor.listen(Arc::new(move |sample| {
            assert!(matches!(sample.payload, RawPayload::Imu(imu) if (imu.accelerometer.z - 9.81).abs() < 0.01));
            count_clone.fetch_add(1, Ordering::Relaxed);
        }));

        thread::sleep(Duration::from_millis(60));
        sensor.stop();
        assert!(count.load(Ordering::Relaxed) > 0);
        assert!(!sensor.is_listening());
    }

    #[test]
    fn synchronous_sensor_waits_for_ticks() {
        let sensor = sensor(MockSensorConfig::new("gnss", SensorKind::Gnss), true);
        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();
        sensor.listen(Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        }));

        thread::sleep(Duration::from_millis(80));
        assert_eq!(count.load(Ordering::Relaxed), 0);

        sensor.feed.deliver(3, 0.15);
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn corrupt_camera_is_one_byte_short() {
        let mut config = MockSensorConfig::new("front", SensorKind::RgbCamera);
        config.image_width = 4;
        config.image_height = 2;
        config.corrupt = true;
        let sample = generate_sample(&config, 1, 0.05);
        let RawPayload::Bgra { data, .. } = sample.payload else {
            panic!("expected camera payload");
        };
        assert_eq!(data.len(), 4 * 2 * 4 - 1);
    }

    #[test]
    fn stopped_sensor_ignores_deliveries() {
        let sensor = sensor(MockSensorConfig::new("gnss", SensorKind::Gnss), true);
        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();
        sensor.listen(Arc::new(move |_| {
            count_clone.fetch_add(1, Ordering::Relaxed);
        }));
        sensor.stop();
        sensor.feed.deliver(1, 0.05);
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }
}
