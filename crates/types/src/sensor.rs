//! Raw hierarchical sensor readings as enumerated by a backend

use serde::{Deserialize, Serialize};

/// Hardware device families a backend groups its sensors by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Processor,
    Graphics,
    Storage,
    Memory,
    Motherboard,
}

/// Sensor kinds within a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Celsius
    Temperature,
    /// Percent
    Load,
    /// RPM
    Fan,
    /// Fan duty in percent
    Control,
    /// Capacity figures such as "GPU Memory Used" (MB)
    Capacity,
}

/// A single sensor value at the time of the last refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub device_type: DeviceType,
    pub device_name: String,
    pub kind: SensorKind,
    pub name: String,
    pub value: Option<f32>,
}

impl SensorReading {
    pub fn new(
        device_type: DeviceType,
        device_name: impl Into<String>,
        kind: SensorKind,
        name: impl Into<String>,
        value: Option<f32>,
    ) -> Self {
        Self {
            device_type,
            device_name: device_name.into(),
            kind,
            name: name.into(),
            value,
        }
    }
}
