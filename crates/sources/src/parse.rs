//! Name-based reduction of raw sensor readings into widget values
//!
//! Backends report many sensors per device (per-core temperatures, several
//! fan headers, hot-spot and edge GPU temperatures). These rules pick the
//! single value the widget shows for each field.

use deskmon_types::{DeviceType, DiskReading, HardwareReadings, SensorKind, SensorReading};
use std::collections::HashMap;

/// Vendor prefixes removed from storage device names, longest first
const DISK_NAME_PREFIXES: &[&str] = &["Samsung SSD ", "Samsung "];

fn rounded(value: Option<f32>) -> Option<i32> {
    value.filter(|v| v.is_finite()).map(|v| v.round() as i32)
}

/// Strip vendor noise from a storage device name
pub fn short_disk_name(name: &str) -> String {
    let mut out = name.to_string();
    for prefix in DISK_NAME_PREFIXES {
        out = out.replace(prefix, "");
    }
    out.trim().to_string()
}

/// Reduce a flat reading list to the values shown on the widget.
///
/// CPU load and memory usage stay `None` when the backend lacks them; the
/// caller fills them from OS counters.
pub fn readings_to_snapshot(readings: &[SensorReading]) -> HardwareReadings {
    let mut data = HardwareReadings::default();

    // Group by device so per-device rules (VRAM ratio, disk rows, fan
    // control matching) only see their own sensors; `order` keeps the
    // backend's enumeration order.
    let mut order: Vec<(DeviceType, &str)> = Vec::new();
    let mut devices: HashMap<(DeviceType, &str), Vec<&SensorReading>> = HashMap::new();
    for r in readings {
        let key = (r.device_type, r.device_name.as_str());
        if !devices.contains_key(&key) {
            order.push(key);
        }
        devices.entry(key).or_default().push(r);
    }

    for key in order {
        let sensors = &devices[&key];
        match key.0 {
            DeviceType::Processor => apply_processor(&mut data, sensors),
            DeviceType::Graphics => apply_graphics(&mut data, sensors),
            DeviceType::Storage => apply_storage(&mut data, key.1, sensors),
            DeviceType::Motherboard => apply_motherboard(&mut data, sensors),
            DeviceType::Memory => apply_memory(&mut data, sensors),
        }
    }

    data
}

fn apply_processor(data: &mut HardwareReadings, sensors: &[&SensorReading]) {
    for s in sensors {
        let name = s.name.to_lowercase();
        match s.kind {
            SensorKind::Temperature => {
                let Some(v) = rounded(s.value) else { continue };
                // Package-level sensors win over per-core ones
                if name.contains("tctl") || name.contains("tdie") || name.contains("package") {
                    data.cpu_temp = Some(v);
                } else if data.cpu_temp.is_none() {
                    data.cpu_temp = Some(v);
                }
            }
            SensorKind::Load if name.contains("total") => {
                if let Some(v) = rounded(s.value) {
                    data.cpu_load = Some(v);
                }
            }
            _ => {}
        }
    }
}

fn apply_graphics(data: &mut HardwareReadings, sensors: &[&SensorReading]) {
    let mut mem_used = None;
    let mut mem_total = None;

    for s in sensors {
        let name = s.name.to_lowercase();
        let value = s.value.filter(|v| v.is_finite());
        match s.kind {
            SensorKind::Temperature if name.contains("core") || name.contains("gpu") => {
                if let Some(v) = rounded(value) {
                    data.gpu_temp = Some(v);
                }
            }
            SensorKind::Load if name == "gpu core" => {
                if let Some(v) = rounded(value) {
                    data.gpu_load = Some(v);
                }
            }
            SensorKind::Fan => {
                if let Some(v) = rounded(value) {
                    data.gpu_fan_rpm = Some(v);
                }
            }
            SensorKind::Control => {
                if let Some(v) = rounded(value) {
                    data.gpu_fan_pct = Some(v);
                }
            }
            SensorKind::Capacity if name == "gpu memory used" => mem_used = value,
            SensorKind::Capacity if name == "gpu memory total" => mem_total = value,
            _ => {}
        }
    }

    if let (Some(used), Some(total)) = (mem_used, mem_total) {
        if total > 0.0 {
            data.gpu_vram_pct = Some((used / total * 100.0).round() as i32);
        }
    }
}

fn apply_storage(data: &mut HardwareReadings, device_name: &str, sensors: &[&SensorReading]) {
    let mut temp = None;
    let mut used_pct = None;

    for s in sensors {
        let name = s.name.to_lowercase();
        match s.kind {
            SensorKind::Temperature if name.contains("temperature") => {
                if temp.is_none() {
                    temp = rounded(s.value);
                }
            }
            SensorKind::Load if name.contains("used space") => {
                if let Some(v) = rounded(s.value) {
                    used_pct = Some(v);
                }
            }
            _ => {}
        }
    }

    if temp.is_some() || used_pct.is_some() {
        data.disks.push(DiskReading {
            name: short_disk_name(device_name),
            temp,
            used_pct,
        });
    }
}

fn apply_motherboard(data: &mut HardwareReadings, sensors: &[&SensorReading]) {
    let mut controls: Vec<(String, i32)> = Vec::new();

    for s in sensors {
        let name = s.name.to_lowercase();
        let Some(v) = rounded(s.value) else { continue };
        match s.kind {
            SensorKind::Fan if name.contains("cpu") && !name.contains("optional") => {
                data.cpu_fan_rpm = Some(v);
            }
            SensorKind::Control => controls.push((name, v)),
            _ => {}
        }
    }

    if data.cpu_fan_pct.is_some() {
        return;
    }
    // Prefer a header named after the CPU, then the first header, then any
    // control at all if a CPU fan was seen on this board.
    data.cpu_fan_pct = controls
        .iter()
        .find(|(n, _)| n.contains("cpu"))
        .or_else(|| controls.iter().find(|(n, _)| n.contains("#1")))
        .map(|(_, v)| *v)
        .or_else(|| {
            if data.cpu_fan_rpm.is_some() {
                controls.first().map(|(_, v)| *v)
            } else {
                None
            }
        });
}

fn apply_memory(data: &mut HardwareReadings, sensors: &[&SensorReading]) {
    for s in sensors {
        if s.kind == SensorKind::Load && s.name.eq_ignore_ascii_case("memory") {
            if let Some(v) = rounded(s.value) {
                data.ram_pct = Some(v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(dt: DeviceType, dev: &str, kind: SensorKind, name: &str, v: f32) -> SensorReading {
        SensorReading::new(dt, dev, kind, name, Some(v))
    }

    #[test]
    fn test_package_temperature_beats_core_temperature() {
        let readings = vec![
            r(DeviceType::Processor, "cpu", SensorKind::Temperature, "Core #1", 48.0),
            r(DeviceType::Processor, "cpu", SensorKind::Temperature, "CPU Package", 55.4),
            r(DeviceType::Processor, "cpu", SensorKind::Temperature, "Core #2", 60.0),
            r(DeviceType::Processor, "cpu", SensorKind::Load, "CPU Total", 17.6),
        ];
        let data = readings_to_snapshot(&readings);
        assert_eq!(data.cpu_temp, Some(55));
        assert_eq!(data.cpu_load, Some(18));
    }

    #[test]
    fn test_vram_percentage_from_capacity() {
        let readings = vec![
            r(DeviceType::Graphics, "RTX", SensorKind::Capacity, "GPU Memory Used", 2048.0),
            r(DeviceType::Graphics, "RTX", SensorKind::Capacity, "GPU Memory Total", 8192.0),
            r(DeviceType::Graphics, "RTX", SensorKind::Load, "GPU Core", 3.0),
            r(DeviceType::Graphics, "RTX", SensorKind::Temperature, "GPU Core", 41.0),
        ];
        let data = readings_to_snapshot(&readings);
        assert_eq!(data.gpu_vram_pct, Some(25));
        assert_eq!(data.gpu_load, Some(3));
        assert_eq!(data.gpu_temp, Some(41));
    }

    #[test]
    fn test_disk_rows_keep_order_and_strip_vendor() {
        let readings = vec![
            r(DeviceType::Storage, "Samsung SSD 990 PRO 2TB", SensorKind::Temperature, "Temperature", 39.0),
            r(DeviceType::Storage, "Samsung SSD 990 PRO 2TB", SensorKind::Load, "Used Space", 71.0),
            r(DeviceType::Storage, "WD Blue", SensorKind::Load, "Used Space", 12.0),
        ];
        let data = readings_to_snapshot(&readings);
        assert_eq!(data.disks.len(), 2);
        assert_eq!(data.disks[0].name, "990 PRO 2TB");
        assert_eq!(data.disks[0].temp, Some(39));
        assert_eq!(data.disks[0].used_pct, Some(71));
        assert_eq!(data.disks[1].name, "WD Blue");
        assert_eq!(data.disks[1].temp, None);
    }

    #[test]
    fn test_cpu_fan_control_matching() {
        let readings = vec![
            r(DeviceType::Motherboard, "NCT6798D", SensorKind::Fan, "CPU Optional", 900.0),
            r(DeviceType::Motherboard, "NCT6798D", SensorKind::Fan, "CPU Fan", 1210.0),
            r(DeviceType::Motherboard, "NCT6798D", SensorKind::Control, "Fan #2", 30.0),
            r(DeviceType::Motherboard, "NCT6798D", SensorKind::Control, "Fan #1", 44.0),
        ];
        let data = readings_to_snapshot(&readings);
        assert_eq!(data.cpu_fan_rpm, Some(1210));
        assert_eq!(data.cpu_fan_pct, Some(44));
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let readings = vec![
            SensorReading::new(DeviceType::Memory, "mem", SensorKind::Load, "Memory", None),
            SensorReading::new(DeviceType::Processor, "cpu", SensorKind::Temperature, "Package", Some(f32::NAN)),
        ];
        let data = readings_to_snapshot(&readings);
        assert_eq!(data.ram_pct, None);
        assert_eq!(data.cpu_temp, None);
    }
}
