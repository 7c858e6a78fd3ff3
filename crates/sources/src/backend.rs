//! Abstract sensor backend trait

use crate::counters::AggregateCounters;
use crate::error::SensorError;
use crate::parse::readings_to_snapshot;
use deskmon_types::{HardwareReadings, SensorReading};

/// Hardware sensor backend
///
/// Mirrors the lifecycle of a hardware-monitoring library: open once,
/// refresh every cycle, enumerate the flattened sensor tree, close on
/// shutdown or before a reinitialisation.
pub trait SensorBackend: Send {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Open the connection to the hardware. Calling it again after
    /// `close()` must give a freshly initialised backend.
    fn open(&mut self) -> Result<(), SensorError>;

    /// Release sensor handles. Must be safe to call when not open.
    fn close(&mut self);

    /// Update every sensor value from hardware
    fn refresh(&mut self) -> Result<(), SensorError>;

    /// Current values of every sensor, in enumeration order
    fn readings(&self) -> Vec<SensorReading>;
}

/// Refresh the backend and reduce its readings to a widget snapshot.
///
/// CPU load and memory usage fall back to the aggregate counters when the
/// backend does not report them.
pub fn read_snapshot(
    backend: &mut dyn SensorBackend,
    counters: &mut dyn AggregateCounters,
) -> Result<HardwareReadings, SensorError> {
    backend.refresh()?;
    let readings = backend.readings();
    log::trace!("{}: {} sensor readings", backend.name(), readings.len());

    let mut data = readings_to_snapshot(&readings);
    if data.cpu_load.is_none() {
        data.cpu_load = counters.cpu_load().map(|v| v.round() as i32);
    }
    if data.ram_pct.is_none() {
        data.ram_pct = counters.memory_percent().map(|v| v.round() as i32);
    }
    Ok(data)
}

/// Snapshot used when no backend is available: OS aggregate counters only
pub fn read_degraded(counters: &mut dyn AggregateCounters) -> HardwareReadings {
    HardwareReadings {
        cpu_load: counters.cpu_load().map(|v| v.round() as i32),
        ram_pct: counters.memory_percent().map(|v| v.round() as i32),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmon_types::{DeviceType, SensorKind};

    struct FixedCounters;

    impl AggregateCounters for FixedCounters {
        fn cpu_load(&mut self) -> Option<f32> {
            Some(33.4)
        }
        fn memory_percent(&mut self) -> Option<f32> {
            Some(61.6)
        }
    }

    struct CpuOnlyBackend;

    impl SensorBackend for CpuOnlyBackend {
        fn name(&self) -> &str {
            "cpu-only"
        }
        fn open(&mut self) -> Result<(), SensorError> {
            Ok(())
        }
        fn close(&mut self) {}
        fn refresh(&mut self) -> Result<(), SensorError> {
            Ok(())
        }
        fn readings(&self) -> Vec<SensorReading> {
            vec![SensorReading::new(
                DeviceType::Processor,
                "Ryzen 7",
                SensorKind::Temperature,
                "Core (Tctl/Tdie)",
                Some(51.6),
            )]
        }
    }

    #[test]
    fn test_counters_fill_missing_aggregates() {
        let data = read_snapshot(&mut CpuOnlyBackend, &mut FixedCounters).unwrap();
        assert_eq!(data.cpu_temp, Some(52));
        assert_eq!(data.cpu_load, Some(33));
        assert_eq!(data.ram_pct, Some(62));
    }

    #[test]
    fn test_degraded_has_only_aggregates() {
        let data = read_degraded(&mut FixedCounters);
        assert_eq!(data.cpu_load, Some(33));
        assert_eq!(data.ram_pct, Some(62));
        assert!(data.has_only_aggregates());
    }
}
