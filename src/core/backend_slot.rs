//! Mutex-guarded sensor backend handle
//!
//! The poller reads through the slot and reinitialises through it; shutdown
//! closes through it from the UI thread. One lock serialises all three so a
//! close can never interleave with an in-flight read.

use deskmon_sources::{SensorBackend, SensorError};
use std::sync::{Mutex, MutexGuard};

pub struct BackendSlot {
    inner: Mutex<Option<Box<dyn SensorBackend>>>,
}

impl BackendSlot {
    /// Open `backend`; an empty slot (degraded mode) when opening fails
    pub fn open(mut backend: Box<dyn SensorBackend>) -> Self {
        match backend.open() {
            Ok(()) => {
                log::info!("Sensor backend '{}' opened", backend.name());
                Self {
                    inner: Mutex::new(Some(backend)),
                }
            }
            Err(e) => {
                log::warn!(
                    "Sensor backend '{}' unavailable, using OS counters only: {}",
                    backend.name(),
                    e
                );
                Self::empty()
            }
        }
    }

    /// A slot with no backend
    pub fn empty() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn SensorBackend>>> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("Backend slot mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn is_available(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `f` against the backend while holding the slot lock
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut dyn SensorBackend) -> R) -> Option<R> {
        let mut guard = self.lock();
        guard.as_mut().map(|b| f(b.as_mut()))
    }

    /// Close and reopen the backend in place.
    ///
    /// A backend whose reopen fails stays in the slot, so later reads keep
    /// failing and the poller retries on its next failure run.
    pub fn reinitialize(&self) -> Result<(), SensorError> {
        let mut guard = self.lock();
        let backend = guard.as_mut().ok_or(SensorError::NotOpen)?;

        backend.close();
        match backend.open() {
            Ok(()) => {
                log::info!("Sensor backend '{}' reinitialised", backend.name());
                Ok(())
            }
            Err(e) => {
                log::warn!("Sensor backend '{}' reinitialisation failed: {}", backend.name(), e);
                Err(e)
            }
        }
    }

    /// Close the backend and empty the slot
    pub fn close(&self) {
        if let Some(mut backend) = self.lock().take() {
            backend.close();
            log::info!("Sensor backend '{}' closed", backend.name());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use deskmon_types::{DeviceType, SensorKind, SensorReading};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Counters shared with the test after the backend moves into a slot
    #[derive(Debug, Default)]
    pub(crate) struct BackendCalls {
        pub opens: AtomicU32,
        pub closes: AtomicU32,
        pub refreshes: AtomicU32,
    }

    /// Backend whose refresh fails while `fail_refreshes` is positive
    pub(crate) struct ScriptedBackend {
        pub calls: Arc<BackendCalls>,
        pub fail_open: bool,
        pub fail_refreshes: Arc<AtomicU32>,
    }

    impl ScriptedBackend {
        pub fn new(calls: Arc<BackendCalls>) -> Self {
            Self {
                calls,
                fail_open: false,
                fail_refreshes: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl SensorBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn open(&mut self) -> Result<(), SensorError> {
            self.calls.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail_open {
                Err(SensorError::BackendUnavailable("scripted".to_string()))
            } else {
                Ok(())
            }
        }

        fn close(&mut self) {
            self.calls.closes.fetch_add(1, Ordering::SeqCst);
        }

        fn refresh(&mut self) -> Result<(), SensorError> {
            self.calls.refreshes.fetch_add(1, Ordering::SeqCst);
            let remaining = self.fail_refreshes.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_refreshes.store(remaining - 1, Ordering::SeqCst);
                return Err(SensorError::ReadFailure("sensor timeout".to_string()));
            }
            Ok(())
        }

        fn readings(&self) -> Vec<SensorReading> {
            vec![
                SensorReading::new(DeviceType::Processor, "cpu", SensorKind::Temperature, "CPU Package", Some(47.0)),
                SensorReading::new(DeviceType::Processor, "cpu", SensorKind::Load, "CPU Total", Some(12.0)),
                SensorReading::new(DeviceType::Memory, "memory", SensorKind::Load, "Memory", Some(40.0)),
            ]
        }
    }

    #[test]
    fn test_failed_open_leaves_slot_empty() {
        let calls = Arc::new(BackendCalls::default());
        let mut backend = ScriptedBackend::new(Arc::clone(&calls));
        backend.fail_open = true;

        let slot = BackendSlot::open(Box::new(backend));
        assert!(!slot.is_available());
        assert!(slot.with_backend(|b| b.refresh()).is_none());
        assert!(matches!(slot.reinitialize(), Err(SensorError::NotOpen)));
    }

    #[test]
    fn test_reinitialize_closes_then_opens() {
        let calls = Arc::new(BackendCalls::default());
        let slot = BackendSlot::open(Box::new(ScriptedBackend::new(Arc::clone(&calls))));
        assert_eq!(calls.opens.load(Ordering::SeqCst), 1);

        assert!(slot.reinitialize().is_ok());
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert_eq!(calls.opens.load(Ordering::SeqCst), 2);
        assert!(slot.is_available());
    }

    #[test]
    fn test_close_empties_slot() {
        let calls = Arc::new(BackendCalls::default());
        let slot = BackendSlot::open(Box::new(ScriptedBackend::new(Arc::clone(&calls))));

        slot.close();
        slot.close();
        assert_eq!(calls.closes.load(Ordering::SeqCst), 1);
        assert!(!slot.is_available());
    }
}
