//! SensorRegistry - owns attached sensors and their slots

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{
    ActorId, DeliveryCallback, RawSample, SensorKind, SensorName, SensorSource, SensorSpec,
    SimulatorLink, Transform,
};
use slab::Slab;
use tokio::sync::Notify;
use tracing::{debug, info, instrument, trace, warn};

use crate::decode::decode;
use crate::error::{IngestionError, Result};
use crate::metrics;
use crate::slot::SensorSlot;

/// Handle to an attached sensor
///
/// Stays valid after detach; detaching through a stale handle is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorHandle {
    key: usize,
    generation: u64,
    name: SensorName,
}

impl SensorHandle {
    pub fn name(&self) -> &SensorName {
        &self.name
    }
}

struct Entry {
    generation: u64,
    actor_id: ActorId,
    sample_interval: f64,
    slot: Arc<SensorSlot>,
    source: Box<dyn SensorSource>,
}

/// Attached sensors, keyed by name
///
/// Every sensor gets its own slot; its delivery callback decodes into that slot and wakes
/// whoever waits on [`SlotSet::notified`].
pub struct SensorRegistry {
    entries: Slab<Entry>,
    by_name: HashMap<SensorName, usize>,
    notify: Arc<Notify>,
    next_generation: u64,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self {
            entries: Slab::new(),
            by_name: HashMap::new(),
            notify: Arc::new(Notify::new()),
            next_generation: 0,
        }
    }

    /// Spawn a sensor on `vehicle` and start routing its deliveries into a fresh slot
    ///
    /// # Errors
    /// `DuplicateSensor` if the name is taken, `AttachFailed` if the simulator refuses the
    /// sensor. Nothing is left attached on error.
    #[instrument(
        name = "registry_attach",
        skip(self, link, spec, mount),
        fields(sensor = %spec.name, kind = %spec.kind)
    )]
    pub async fn attach<L: SimulatorLink>(
        &mut self,
        link: &L,
        vehicle: ActorId,
        spec: &SensorSpec,
        mount: Transform,
    ) -> Result<SensorHandle> {
        let name = SensorName::from(spec.name.as_str());
        if self.by_name.contains_key(&name) {
            return Err(IngestionError::DuplicateSensor {
                sensor: spec.name.clone(),
            });
        }

        let source = link
            .spawn_sensor(vehicle, spec, mount)
            .await
            .map_err(|e| IngestionError::attach_failed(spec.kind, &spec.name, e.to_string()))?;

        if source.kind() != spec.kind {
            let actor_id = source.actor_id();
            if let Err(e) = link.destroy_actor(actor_id).await {
                warn!(actor_id, error = %e, "failed to destroy mismatched sensor");
            }
            return Err(IngestionError::attach_failed(
                spec.kind,
                &spec.name,
                format!("simulator returned a {} sensor", source.kind()),
            ));
        }

        let slot = Arc::new(SensorSlot::new(name.clone(), spec.kind));
        source.listen(self.delivery_callback(slot.clone()));

        if !source.is_listening() {
            let actor_id = source.actor_id();
            if let Err(e) = link.destroy_actor(actor_id).await {
                warn!(actor_id, error = %e, "failed to destroy sensor that did not start");
            }
            return Err(IngestionError::attach_failed(
                spec.kind,
                &spec.name,
                "sensor did not start listening",
            ));
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let actor_id = source.actor_id();
        let key = self.entries.insert(Entry {
            generation,
            actor_id,
            sample_interval: spec.sample_interval_sec,
            slot,
            source,
        });
        self.by_name.insert(name.clone(), key);
        metrics::record_attached_sensors(self.entries.len());

        info!(actor_id, "sensor attached");
        Ok(SensorHandle {
            key,
            generation,
            name,
        })
    }

    fn delivery_callback(&self, slot: Arc<SensorSlot>) -> DeliveryCallback {
        let notify = self.notify.clone();
        Arc::new(move |raw: RawSample| {
            let frame = raw.frame;
            match decode(slot.kind(), raw) {
                Ok(sample) => {
                    trace!(sensor = %slot.name(), frame, "sample stored");
                    slot.write(sample);
                    metrics::record_sample_received(slot.name(), slot.kind());
                }
                Err(e) => {
                    warn!(sensor = %slot.name(), frame, error = %e, "discarding sample");
                    slot.record_discarded();
                    metrics::record_sample_discarded(slot.name(), slot.kind());
                }
            }
            slot.mark_delivered(frame);
            notify.notify_one();
        })
    }

    /// Stop delivery and destroy the sensor
    ///
    /// A second call with the same handle does nothing. The entry is removed even when the
    /// simulator fails to destroy the actor.
    #[instrument(name = "registry_detach", skip(self, link), fields(sensor = %handle.name))]
    pub async fn detach<L: SimulatorLink>(&mut self, link: &L, handle: &SensorHandle) -> Result<()> {
        let live = self
            .entries
            .get(handle.key)
            .is_some_and(|entry| entry.generation == handle.generation);
        if !live {
            debug!("sensor already detached");
            return Ok(());
        }

        let entry = self.entries.remove(handle.key);
        self.by_name.remove(&handle.name);
        metrics::record_attached_sensors(self.entries.len());

        Self::release(link, &handle.name, entry).await
    }

    async fn release<L: SimulatorLink>(link: &L, name: &SensorName, entry: Entry) -> Result<()> {
        if entry.source.is_listening() {
            entry.source.stop();
        }
        link.destroy_actor(entry.actor_id)
            .await
            .map_err(|e| IngestionError::DetachFailed {
                sensor: name.to_string(),
                message: e.to_string(),
            })?;
        debug!(sensor = %name, actor_id = entry.actor_id, "sensor destroyed");
        Ok(())
    }

    /// Stop delivery on every attached sensor without destroying anything
    #[instrument(name = "registry_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.entries.len(), "stopping sensor delivery");
        for (_, entry) in &self.entries {
            if entry.source.is_listening() {
                entry.source.stop();
            }
        }
    }

    /// Detach every sensor, continuing past failures
    ///
    /// # Returns
    /// One error per sensor whose actor could not be destroyed
    #[instrument(name = "registry_detach_all", skip(self, link))]
    pub async fn detach_all<L: SimulatorLink>(&mut self, link: &L) -> Vec<IngestionError> {
        let mut failures = Vec::new();
        let names: Vec<(SensorName, usize)> = self.by_name.drain().collect();
        for (name, key) in names {
            let entry = self.entries.remove(key);
            if let Err(e) = Self::release(link, &name, entry).await {
                warn!(sensor = %name, error = %e, "detach failed");
                failures.push(e);
            }
        }
        metrics::record_attached_sensors(0);
        failures
    }

    /// Shared read view over the current slots
    pub fn slot_set(&self) -> SlotSet {
        let mut slots: Vec<SlotEntry> = self
            .entries
            .iter()
            .map(|(_, entry)| SlotEntry {
                slot: entry.slot.clone(),
                sample_interval: entry.sample_interval,
            })
            .collect();
        slots.sort_by(|a, b| a.slot.name().cmp(b.slot.name()));
        SlotSet {
            slots: slots.into(),
            notify: self.notify.clone(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<Arc<SensorSlot>> {
        self.by_name
            .get(name)
            .map(|&key| self.entries[key].slot.clone())
    }

    pub fn kind_of(&self, name: &str) -> Option<SensorKind> {
        self.slot(name).map(|slot| slot.kind())
    }

    pub fn is_listening(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|&key| self.entries[key].source.is_listening())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attached sensor names, sorted
    pub fn names(&self) -> Vec<SensorName> {
        let mut names: Vec<SensorName> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SensorRegistry {
    fn drop(&mut self) {
        for (_, entry) in &self.entries {
            if entry.source.is_listening() {
                entry.source.stop();
            }
        }
    }
}

/// One slot with its sampling interval
#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub slot: Arc<SensorSlot>,

    /// Seconds between samples (0 = every tick)
    pub sample_interval: f64,
}

/// Read view handed to the frame synchronizer
///
/// Cloning is cheap. The set is fixed at the time it was taken.
#[derive(Debug, Clone)]
pub struct SlotSet {
    slots: Arc<[SlotEntry]>,
    notify: Arc<Notify>,
}

impl SlotSet {
    pub fn iter(&self) -> impl Iterator<Item = &SlotEntry> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Notifier fired after every delivery attempt on any slot
    pub fn notifier(&self) -> &Arc<Notify> {
        &self.notify
    }
}
