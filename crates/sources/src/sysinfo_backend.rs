//! Sensor backend built on `sysinfo` components and disks
//!
//! Temperature components are classified into device families from their
//! driver label (`coretemp`, `k10temp`, `amdgpu`, ...). On Linux, fan
//! tachometers and PWM duty cycles are read from `/sys/class/hwmon`, and
//! drive temperatures from the hwmon node of each block device.
//! NVIDIA GPUs are read through NVML when the `nvidia` feature is enabled.

use crate::backend::SensorBackend;
use crate::drives::{self, Drive, PartitionUsage};
use crate::error::SensorError;
use deskmon_types::{DeviceType, SensorKind, SensorReading};
use std::path::PathBuf;
use sysinfo::{Components, CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

/// File systems that never correspond to a physical drive
const PSEUDO_FILE_SYSTEMS: &[&str] = &["squashfs", "overlay", "tmpfs", "devtmpfs", "ramfs"];

/// A fan header discovered under hwmon
#[derive(Debug, Clone)]
struct FanHeader {
    device_type: DeviceType,
    chip: String,
    label: String,
    input: PathBuf,
    /// Matching `pwmN` file, if the chip exposes duty control
    pwm: Option<PathBuf>,
}

/// Open sensor handles; dropped on `close()`
struct OpenState {
    system: System,
    components: Components,
    disks: Disks,
    fans: Vec<FanHeader>,
    fan_values: Vec<(Option<f32>, Option<f32>)>,
    drives: Vec<Drive>,
    drive_temps: Vec<Option<f32>>,
    #[cfg(feature = "nvidia")]
    nvidia: Option<crate::nvidia::NvidiaReader>,
}

/// Hardware backend over sysinfo (plus hwmon fans and optional NVML)
pub struct SysinfoBackend {
    state: Option<OpenState>,
}

impl SysinfoBackend {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for SysinfoBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a sysinfo component label to the device family it belongs to
pub(crate) fn classify_component(label: &str) -> DeviceType {
    let l = label.to_lowercase();
    if ["coretemp", "k10temp", "zenpower", "cpu", "package", "tctl", "tdie"]
        .iter()
        .any(|k| l.contains(k))
    {
        DeviceType::Processor
    } else if ["amdgpu", "nouveau", "radeon", "i915", "gpu"]
        .iter()
        .any(|k| l.contains(k))
    {
        DeviceType::Graphics
    } else if ["nvme", "drivetemp", "ssd", "hdd", "sata"]
        .iter()
        .any(|k| l.contains(k))
    {
        DeviceType::Storage
    } else {
        DeviceType::Motherboard
    }
}

/// Device name used for grouping: the driver prefix of the label
fn component_device(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or(label)
}

fn read_number(path: &PathBuf) -> Option<f32> {
    std::fs::read_to_string(path).ok()?.trim().parse::<f32>().ok()
}

#[cfg(target_os = "linux")]
fn discover_fans() -> Vec<FanHeader> {
    let mut fans = Vec::new();
    let Ok(entries) = std::fs::read_dir("/sys/class/hwmon") else {
        return fans;
    };

    for entry in entries.flatten() {
        let dir = entry.path();
        let chip = std::fs::read_to_string(dir.join("name"))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| entry.file_name().to_string_lossy().to_string());
        let device_type = match classify_component(&chip) {
            DeviceType::Graphics => DeviceType::Graphics,
            _ => DeviceType::Motherboard,
        };

        let Ok(files) = std::fs::read_dir(&dir) else { continue };
        for file in files.flatten() {
            let file_name = file.file_name().to_string_lossy().to_string();
            let Some(index) = file_name
                .strip_prefix("fan")
                .and_then(|rest| rest.strip_suffix("_input"))
            else {
                continue;
            };

            let label = std::fs::read_to_string(dir.join(format!("fan{}_label", index)))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|_| format!("Fan #{}", index));
            let pwm = dir.join(format!("pwm{}", index));

            fans.push(FanHeader {
                device_type,
                chip: chip.clone(),
                label,
                input: file.path(),
                pwm: pwm.exists().then_some(pwm),
            });
        }
    }

    log::info!("Discovered {} hwmon fan headers", fans.len());
    fans
}

#[cfg(not(target_os = "linux"))]
fn discover_fans() -> Vec<FanHeader> {
    Vec::new()
}

impl SensorBackend for SysinfoBackend {
    fn name(&self) -> &str {
        "sysinfo"
    }

    fn open(&mut self) -> Result<(), SensorError> {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        let components = Components::new_with_refreshed_list();
        let disks = Disks::new_with_refreshed_list();
        let fans = discover_fans();
        let drives = drives::discover_drives();

        #[cfg(feature = "nvidia")]
        let nvidia = crate::nvidia::NvidiaReader::open();
        #[cfg(feature = "nvidia")]
        let has_gpu = nvidia.is_some();
        #[cfg(not(feature = "nvidia"))]
        let has_gpu = false;

        if components.is_empty() && fans.is_empty() && !has_gpu {
            return Err(SensorError::BackendUnavailable(
                "no temperature components or fan headers found".to_string(),
            ));
        }

        log::info!(
            "sysinfo backend opened: {} components, {} disks, {} drives, {} fans",
            components.len(),
            disks.list().len(),
            drives.len(),
            fans.len()
        );

        let fan_values = vec![(None, None); fans.len()];
        let drive_temps = vec![None; drives.len()];
        self.state = Some(OpenState {
            system,
            components,
            disks,
            fans,
            fan_values,
            drives,
            drive_temps,
            #[cfg(feature = "nvidia")]
            nvidia,
        });
        Ok(())
    }

    fn close(&mut self) {
        if self.state.take().is_some() {
            log::debug!("sysinfo backend closed");
        }
    }

    fn refresh(&mut self) -> Result<(), SensorError> {
        let state = self.state.as_mut().ok_or(SensorError::NotOpen)?;

        state.system.refresh_cpu_usage();
        state.system.refresh_memory();
        state.components.refresh();
        state.disks.refresh();

        for (fan, slot) in state.fans.iter().zip(state.fan_values.iter_mut()) {
            let rpm = read_number(&fan.input);
            if rpm.is_none() && !fan.input.exists() {
                return Err(SensorError::ReadFailure(format!(
                    "fan input vanished: {}",
                    fan.input.display()
                )));
            }
            // hwmon PWM is 0-255
            let duty = fan
                .pwm
                .as_ref()
                .and_then(read_number)
                .map(|raw| raw / 255.0 * 100.0);
            *slot = (rpm, duty);
        }

        for (drive, slot) in state.drives.iter().zip(state.drive_temps.iter_mut()) {
            // hwmon temperatures are millidegrees
            *slot = drive
                .temp_input
                .as_ref()
                .and_then(read_number)
                .map(|milli| milli / 1000.0);
        }

        #[cfg(feature = "nvidia")]
        if let Some(reader) = state.nvidia.as_mut() {
            reader.update()?;
        }

        Ok(())
    }

    fn readings(&self) -> Vec<SensorReading> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let mut out = Vec::new();

        if !state.system.cpus().is_empty() {
            out.push(SensorReading::new(
                DeviceType::Processor,
                "cpu",
                SensorKind::Load,
                "CPU Total",
                Some(state.system.global_cpu_usage()),
            ));
        }
        let total_mem = state.system.total_memory();
        if total_mem > 0 {
            out.push(SensorReading::new(
                DeviceType::Memory,
                "memory",
                SensorKind::Load,
                "Memory",
                Some(state.system.used_memory() as f32 / total_mem as f32 * 100.0),
            ));
        }

        for component in &state.components {
            let label = component.label();
            let device_type = classify_component(label);
            // Drive temperatures come from the block devices below
            if device_type == DeviceType::Storage {
                continue;
            }
            let temp = component.temperature();
            out.push(SensorReading::new(
                device_type,
                component_device(label),
                SensorKind::Temperature,
                label,
                temp.is_finite().then_some(temp),
            ));
        }

        let mut partitions: Vec<PartitionUsage> = Vec::new();
        let mut seen = Vec::new();
        for disk in state.disks.list() {
            let fs = disk.file_system().to_string_lossy().to_lowercase();
            let name = disk.name().to_string_lossy().to_string();
            // Bind mounts list the same partition more than once
            if disk.total_space() == 0
                || PSEUDO_FILE_SYSTEMS.contains(&fs.as_str())
                || seen.contains(&name)
            {
                continue;
            }
            partitions.push(PartitionUsage {
                block: drives::parent_block_device(&name),
                total: disk.total_space(),
                used: disk.total_space().saturating_sub(disk.available_space()),
            });
            seen.push(name);
        }
        out.extend(drives::disk_readings(&state.drives, &state.drive_temps, &partitions));

        for (fan, (rpm, duty)) in state.fans.iter().zip(state.fan_values.iter()) {
            out.push(SensorReading::new(
                fan.device_type,
                fan.chip.as_str(),
                SensorKind::Fan,
                fan.label.as_str(),
                *rpm,
            ));
            if duty.is_some() {
                out.push(SensorReading::new(
                    fan.device_type,
                    fan.chip.as_str(),
                    SensorKind::Control,
                    fan.label.as_str(),
                    *duty,
                ));
            }
        }

        #[cfg(feature = "nvidia")]
        if let Some(reader) = state.nvidia.as_ref() {
            out.extend(reader.readings());
        }

        out
    }
}
