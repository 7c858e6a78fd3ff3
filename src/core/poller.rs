//! Background sensor polling thread
//!
//! Reads the backend every [`POLL_INTERVAL`] and publishes the result into
//! the [`SharedTelemetryStore`]. Runs of read failures trigger a backend
//! close/reopen; a poller started without a backend reports OS aggregate
//! counters only and never tries to reinitialise.

use super::backend_slot::BackendSlot;
use super::constants::{MAX_CONSECUTIVE_FAILURES, POLL_INTERVAL};
use super::store::SharedTelemetryStore;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use deskmon_sources::{read_degraded, read_snapshot, AggregateCounters};
use deskmon_types::TelemetrySnapshot;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// What one poll iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Hardware readings were published
    Published,
    /// Aggregate-only readings were published
    Degraded,
    /// An error snapshot was published
    Failed { consecutive: u32 },
    /// The failure limit was reached and the backend was closed and reopened
    Reinitialized { reopened: bool },
}

pub struct SensorPoller {
    slot: Arc<BackendSlot>,
    store: Arc<SharedTelemetryStore>,
    counters: Box<dyn AggregateCounters>,
    interval: Duration,
    consecutive_failures: u32,
    degraded: bool,
}

impl SensorPoller {
    /// Degraded mode is fixed here: an empty slot at construction means no
    /// backend for the lifetime of the poller.
    pub fn new(
        slot: Arc<BackendSlot>,
        store: Arc<SharedTelemetryStore>,
        counters: Box<dyn AggregateCounters>,
    ) -> Self {
        let degraded = !slot.is_available();
        if degraded {
            log::warn!("Sensor poller running in degraded mode (CPU and memory only)");
        }
        Self {
            slot,
            store,
            counters,
            interval: POLL_INTERVAL,
            consecutive_failures: 0,
            degraded,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Run one read-and-publish iteration
    pub fn poll_once(&mut self) -> PollOutcome {
        if self.degraded {
            return self.publish_degraded();
        }

        let counters = self.counters.as_mut();
        let result = self
            .slot
            .with_backend(|backend| read_snapshot(backend, counters));

        match result {
            // Slot emptied by shutdown while the thread was still running
            None => self.publish_degraded(),
            Some(Ok(readings)) => {
                if self.consecutive_failures > 0 {
                    log::info!(
                        "Sensor read recovered after {} failure(s)",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
                self.store.publish(TelemetrySnapshot::Readings(readings));
                PollOutcome::Published
            }
            Some(Err(e)) => {
                self.consecutive_failures += 1;
                log::warn!(
                    "Sensor read failed ({} consecutive): {}",
                    self.consecutive_failures,
                    e
                );
                self.store.publish(TelemetrySnapshot::Error(e.to_string()));

                if self.consecutive_failures < MAX_CONSECUTIVE_FAILURES {
                    return PollOutcome::Failed {
                        consecutive: self.consecutive_failures,
                    };
                }

                log::warn!("Reinitialising sensor backend");
                let reopened = self.slot.reinitialize().is_ok();
                self.consecutive_failures = 0;
                PollOutcome::Reinitialized { reopened }
            }
        }
    }

    fn publish_degraded(&mut self) -> PollOutcome {
        let readings = read_degraded(self.counters.as_mut());
        self.store.publish(TelemetrySnapshot::Readings(readings));
        PollOutcome::Degraded
    }

    /// Poll until `stop` receives a message or its sender is dropped
    pub fn run(mut self, stop: Receiver<()>) {
        log::debug!(
            "Sensor poller started (interval {:?}, degraded: {})",
            self.interval,
            self.is_degraded()
        );
        loop {
            let outcome = self.poll_once();
            log::trace!("Poll outcome: {:?}", outcome);

            match stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("Sensor poller stopped");
    }

    /// Start polling on a dedicated `sensor-poller` thread
    pub fn spawn(self) -> std::io::Result<PollerHandle> {
        let (stop_tx, stop_rx) = channel::bounded(1);
        let thread = std::thread::Builder::new()
            .name("sensor-poller".to_string())
            .spawn(move || self.run(stop_rx))?;
        Ok(PollerHandle {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }
}

/// Owner of a running poller thread; stops and joins it on drop
pub struct PollerHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signal the poller and wait for the thread to exit
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // A full channel or a gone receiver both mean the thread is on its way out
            let _ = stop.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Sensor poller thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
