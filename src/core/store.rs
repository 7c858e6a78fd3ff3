//! Latest telemetry snapshot shared between the poller and the UI thread

use deskmon_types::TelemetrySnapshot;
use std::sync::{Mutex, MutexGuard};

/// Single-slot, last-writer-wins snapshot holder.
///
/// The poller thread publishes and the UI thread reads a private copy, so a
/// reader never observes a half-written snapshot. No history is kept.
#[derive(Debug, Default)]
pub struct SharedTelemetryStore {
    latest: Mutex<Option<TelemetrySnapshot>>,
}

impl SharedTelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<TelemetrySnapshot>> {
        // A panicking writer cannot leave a torn value: the slot is replaced whole
        self.latest.lock().unwrap_or_else(|poisoned| {
            log::warn!("Telemetry store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Replace the stored snapshot
    pub fn publish(&self, snapshot: TelemetrySnapshot) {
        log::trace!("Publishing snapshot (error: {})", snapshot.is_error());
        *self.lock() = Some(snapshot);
    }

    /// Copy of the latest snapshot; `None` until the first publish
    pub fn read(&self) -> Option<TelemetrySnapshot> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmon_types::{DiskReading, HardwareReadings};
    use std::sync::Arc;

    fn sample() -> TelemetrySnapshot {
        TelemetrySnapshot::Readings(HardwareReadings {
            cpu_temp: Some(52),
            cpu_load: Some(14),
            disks: vec![DiskReading {
                name: "990 PRO".to_string(),
                temp: Some(38),
                used_pct: Some(40),
            }],
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_until_first_publish() {
        let store = SharedTelemetryStore::new();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_read_returns_independent_copy() {
        let store = SharedTelemetryStore::new();
        store.publish(sample());

        let mut copy = store.read().unwrap();
        assert_eq!(copy, sample());

        if let TelemetrySnapshot::Readings(ref mut r) = copy {
            r.cpu_temp = Some(99);
            r.disks.clear();
        }
        // Mutating the copy leaves the stored value untouched
        assert_eq!(store.read().unwrap(), sample());
    }

    #[test]
    fn test_last_writer_wins() {
        let store = SharedTelemetryStore::new();
        store.publish(sample());
        store.publish(TelemetrySnapshot::Error("read failed".to_string()));
        assert_eq!(
            store.read(),
            Some(TelemetrySnapshot::Error("read failed".to_string()))
        );
    }

    #[test]
    fn test_recovers_from_poisoned_lock() {
        let store = Arc::new(SharedTelemetryStore::new());
        store.publish(sample());

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.latest.lock().unwrap();
            panic!("poison the store");
        })
        .join();

        assert_eq!(store.read(), Some(sample()));
        store.publish(TelemetrySnapshot::Error("after".to_string()));
        assert!(store.read().unwrap().is_error());
    }
}
