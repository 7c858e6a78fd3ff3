//! NVIDIA GPU readings using NVML

use crate::error::SensorError;
use deskmon_types::{DeviceType, SensorKind, SensorReading};
use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, Nvml};

const BYTES_PER_MB: f32 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default)]
struct GpuMetrics {
    temperature: Option<f32>,
    utilization: Option<f32>,
    memory_used_mb: Option<f32>,
    memory_total_mb: Option<f32>,
    fan_percent: Option<f32>,
}

/// First NVIDIA GPU, read through NVML
pub(crate) struct NvidiaReader {
    nvml: Nvml,
    name: String,
    metrics: GpuMetrics,
}

impl NvidiaReader {
    /// Initialise NVML; `None` when no driver or device is present
    pub(crate) fn open() -> Option<Self> {
        let nvml = match Nvml::init() {
            Ok(n) => n,
            Err(e) => {
                log::info!("NVML not available: {}", e);
                return None;
            }
        };
        let name = {
            let device = nvml.device_by_index(0).ok()?;
            device.name().unwrap_or_else(|_| "NVIDIA GPU".to_string())
        };
        log::info!("NVML opened for {}", name);
        Some(Self {
            nvml,
            name,
            metrics: GpuMetrics::default(),
        })
    }

    pub(crate) fn update(&mut self) -> Result<(), SensorError> {
        let device = self
            .nvml
            .device_by_index(0)
            .map_err(|e| SensorError::ReadFailure(format!("NVIDIA device lost: {}", e)))?;

        self.metrics.temperature = device
            .temperature(TemperatureSensor::Gpu)
            .ok()
            .map(|t| t as f32);
        self.metrics.utilization = device.utilization_rates().ok().map(|u| u.gpu as f32);
        if let Ok(mem) = device.memory_info() {
            self.metrics.memory_used_mb = Some(mem.used as f32 / BYTES_PER_MB);
            self.metrics.memory_total_mb = Some(mem.total as f32 / BYTES_PER_MB);
        }
        self.metrics.fan_percent = device.fan_speed(0).ok().map(|f| f as f32);
        Ok(())
    }

    pub(crate) fn readings(&self) -> Vec<SensorReading> {
        let g = DeviceType::Graphics;
        let n = self.name.as_str();
        vec![
            SensorReading::new(g, n, SensorKind::Temperature, "GPU Core", self.metrics.temperature),
            SensorReading::new(g, n, SensorKind::Load, "GPU Core", self.metrics.utilization),
            SensorReading::new(g, n, SensorKind::Control, "GPU Fan", self.metrics.fan_percent),
            SensorReading::new(g, n, SensorKind::Capacity, "GPU Memory Used", self.metrics.memory_used_mb),
            SensorReading::new(g, n, SensorKind::Capacity, "GPU Memory Total", self.metrics.memory_total_mb),
        ]
    }
}
