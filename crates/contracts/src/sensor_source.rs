//! SensorSource trait - a running simulator sensor
//!
//! Both the mock sensors and the real CARLA sensors implement this, so the registry never
//! knows which one it is driving.

use std::sync::Arc;

use crate::{ActorId, RawSample, SensorKind};

/// Delivery callback
///
/// Invoked on a thread owned by the sensor (the simulator's networking thread for real
/// sensors), once per produced sample.
pub type DeliveryCallback = Arc<dyn Fn(RawSample) + Send + Sync>;

/// Simulator sensor handle
///
/// ```ignore
/// let source = link.spawn_sensor(vehicle, &spec, mount).await?;
/// source.listen(Arc::new(|sample| println!("frame {}", sample.frame)));
/// // ...
/// source.stop();
/// link.destroy_actor(source.actor_id()).await?;
/// ```
pub trait SensorSource: Send + Sync {
    /// Simulator actor backing this sensor
    fn actor_id(&self) -> ActorId;

    fn kind(&self) -> SensorKind;

    /// Start delivery. Calling it again while listening is a no-op.
    fn listen(&self, callback: DeliveryCallback);

    /// Stop delivery. No callback is invoked after this returns.
    fn stop(&self);

    fn is_listening(&self) -> bool;
}
