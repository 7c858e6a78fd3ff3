//! Telemetry snapshot produced once per poll cycle

use serde::{Deserialize, Serialize};

/// One storage device as shown on the widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskReading {
    /// Short device name (vendor prefixes stripped)
    pub name: String,
    /// Drive temperature in Celsius
    pub temp: Option<i32>,
    /// Used space in percent
    pub used_pct: Option<i32>,
}

/// Every value the widget can show, rounded to whole units.
///
/// Fields are `None` when the backend did not report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareReadings {
    pub cpu_temp: Option<i32>,
    pub cpu_load: Option<i32>,
    pub gpu_temp: Option<i32>,
    pub gpu_load: Option<i32>,
    pub cpu_fan_rpm: Option<i32>,
    pub cpu_fan_pct: Option<i32>,
    pub gpu_fan_rpm: Option<i32>,
    pub gpu_fan_pct: Option<i32>,
    pub gpu_vram_pct: Option<i32>,
    pub ram_pct: Option<i32>,
    /// Storage devices in backend enumeration order
    #[serde(default)]
    pub disks: Vec<DiskReading>,
}

impl HardwareReadings {
    /// True when nothing beyond the OS aggregate counters (CPU load, RAM) is set
    pub fn has_only_aggregates(&self) -> bool {
        self.cpu_temp.is_none()
            && self.gpu_temp.is_none()
            && self.gpu_load.is_none()
            && self.cpu_fan_rpm.is_none()
            && self.cpu_fan_pct.is_none()
            && self.gpu_fan_rpm.is_none()
            && self.gpu_fan_pct.is_none()
            && self.gpu_vram_pct.is_none()
            && self.disks.is_empty()
    }
}

/// Result of one poll cycle: either data or an error marker in its place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TelemetrySnapshot {
    Readings(HardwareReadings),
    Error(String),
}

impl TelemetrySnapshot {
    pub fn is_error(&self) -> bool {
        matches!(self, TelemetrySnapshot::Error(_))
    }

    /// Borrow the readings, if this is not an error marker
    pub fn readings(&self) -> Option<&HardwareReadings> {
        match self {
            TelemetrySnapshot::Readings(r) => Some(r),
            TelemetrySnapshot::Error(_) => None,
        }
    }
}
