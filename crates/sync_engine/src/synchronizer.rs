//! FrameSynchronizer - paces the main loop and reads consistent snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use contracts::{schedule, ContractError, FrameSnapshot, SimulatorLink, SyncConfig, SyncMode, TickId};
use ingestion::SlotSet;
use tokio::time::{interval, timeout_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, instrument, trace, warn};

use crate::error::{Result, SyncError};

enum Pacing {
    /// Client-driven ticks with a delivery barrier
    Synchronous {
        fixed_delta: f64,
        timeout: Duration,
    },

    /// Fixed cadence over a free-running world
    Unsynchronized { interval: Interval },
}

/// Frame synchronizer
///
/// One `advance()` per cycle, followed by any number of `snapshot()` reads.
///
/// In synchronous mode `advance()` ticks the world and returns once every sensor due on
/// that tick has had its delivery attempted for a frame at least as new as the tick. In
/// unsynchronized mode it only waits for the next cycle.
pub struct FrameSynchronizer<L> {
    link: Arc<L>,
    slots: SlotSet,
    pacing: Pacing,
    /// Ticks issued by this synchronizer
    ticks: u64,
    last_tick: Option<TickId>,
}

impl<L: SimulatorLink> FrameSynchronizer<L> {
    /// Tick-barrier synchronizer
    pub fn synchronous(link: Arc<L>, slots: SlotSet, fixed_delta: f64, timeout: Duration) -> Self {
        Self {
            link,
            slots,
            pacing: Pacing::Synchronous {
                fixed_delta,
                timeout,
            },
            ticks: 0,
            last_tick: None,
        }
    }

    /// Fixed-cadence synchronizer. Must be created inside a tokio runtime.
    pub fn unsynchronized(link: Arc<L>, slots: SlotSet, cycle: Duration) -> Self {
        let mut interval = interval(cycle);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            link,
            slots,
            pacing: Pacing::Unsynchronized { interval },
            ticks: 0,
            last_tick: None,
        }
    }

    pub fn from_config(link: Arc<L>, slots: SlotSet, config: &SyncConfig) -> Self {
        match config.mode {
            SyncMode::Synchronous => Self::synchronous(
                link,
                slots,
                config.fixed_delta_seconds,
                config.tick_timeout(),
            ),
            SyncMode::Unsynchronized => {
                Self::unsynchronized(link, slots, config.cycle_interval())
            }
        }
    }

    pub fn is_synchronous(&self) -> bool {
        matches!(self.pacing, Pacing::Synchronous { .. })
    }

    /// Tick id of the last successful `advance()` in synchronous mode
    pub fn last_tick(&self) -> Option<TickId> {
        self.last_tick
    }

    /// Wait for the next cycle
    ///
    /// # Returns
    /// The new tick id in synchronous mode, `None` otherwise
    ///
    /// # Errors
    /// `TickTimeout` / `DeliveryTimeout` when the tick or its deliveries exceed the
    /// configured bound; `Tick` when the simulator rejects the tick.
    #[instrument(name = "sync_advance", skip(self), fields(ticks = self.ticks))]
    pub async fn advance(&mut self) -> Result<Option<TickId>> {
        match &mut self.pacing {
            Pacing::Unsynchronized { interval } => {
                interval.tick().await;
                Ok(None)
            }
            Pacing::Synchronous {
                fixed_delta,
                timeout,
            } => {
                let (fixed_delta, timeout) = (*fixed_delta, *timeout);
                let tick = self.tick_and_wait(fixed_delta, timeout).await?;
                Ok(Some(tick))
            }
        }
    }

    async fn tick_and_wait(&mut self, fixed_delta: f64, timeout: Duration) -> Result<TickId> {
        let started = Instant::now();
        let deadline = started + timeout;
        let waited_ms = || started.elapsed().as_millis() as u64;

        // Own task: a link may block its worker thread inside `tick`
        let link = Arc::clone(&self.link);
        let mut ticking = tokio::spawn(async move { link.tick().await });
        let tick = match timeout_at(deadline, &mut ticking).await {
            Ok(Ok(result)) => result.map_err(SyncError::Tick)?,
            Ok(Err(join)) => {
                return Err(SyncError::Tick(ContractError::simulator(
                    "tick",
                    join.to_string(),
                )));
            }
            Err(_) => {
                ticking.abort();
                warn!(timeout_ms = timeout.as_millis() as u64, "tick timed out");
                return Err(SyncError::TickTimeout {
                    waited_ms: waited_ms(),
                });
            }
        };
        self.ticks += 1;
        let tick_latency = started.elapsed();
        trace!(tick, latency_ms = tick_latency.as_secs_f64() * 1000.0, "tick returned");

        let due: Vec<_> = self
            .slots
            .iter()
            .filter(|entry| schedule::is_due(self.ticks, entry.sample_interval, fixed_delta))
            .collect();
        let notify = self.slots.notifier().clone();

        loop {
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let pending: Vec<_> = due
                .iter()
                .filter(|entry| entry.slot.delivered_frame().map_or(true, |f| f < tick))
                .collect();
            if pending.is_empty() {
                break;
            }

            if timeout_at(deadline, notified).await.is_err() {
                let missing: Vec<String> =
                    pending.iter().map(|e| e.slot.name().to_string()).collect();
                warn!(tick, ?missing, "deliveries timed out");
                return Err(SyncError::DeliveryTimeout {
                    tick,
                    waited_ms: waited_ms(),
                    missing,
                });
            }
        }

        observability::metrics::record_tick(tick_latency, started.elapsed(), due.len());
        debug!(tick, due = due.len(), "tick barrier passed");
        self.last_tick = Some(tick);
        Ok(tick)
    }

    /// Read every slot once
    ///
    /// Never blocks and never consumes anything; two snapshots without an `advance()` in
    /// between see the same or newer samples.
    pub fn snapshot(&self) -> FrameSnapshot {
        let mut samples = HashMap::with_capacity(self.slots.len());
        let mut missing = Vec::new();
        for entry in self.slots.iter() {
            match entry.slot.read_latest() {
                Some(sample) => {
                    samples.insert(entry.slot.name().clone(), sample);
                }
                None => missing.push(entry.slot.name().clone()),
            }
        }

        let complete = missing.is_empty();
        observability::metrics::record_snapshot(samples.len(), self.slots.len());
        FrameSnapshot {
            samples,
            complete,
            missing,
            tick: self.last_tick,
        }
    }
}
