//! Physical drives: partition usage and drive temperature under one name
//!
//! `sysinfo` reports usage per mounted partition, while drive temperatures
//! come from the hwmon node of the whole block device. Both are resolved to
//! the parent block device here so each drive yields a single record.

use deskmon_types::{DeviceType, SensorKind, SensorReading};
#[cfg(target_os = "linux")]
use std::path::Path;
use std::path::PathBuf;

/// A whole block device and where its temperature can be read
#[derive(Debug, Clone)]
pub(crate) struct Drive {
    /// Kernel block name, e.g. `nvme0n1` or `sda`
    pub block: String,
    /// Model string when the kernel exposes one, else the block name
    pub label: String,
    /// `tempN_input` in millidegrees
    pub temp_input: Option<PathBuf>,
}

/// Used and total bytes of one mounted partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartitionUsage {
    /// Parent block device of the partition
    pub block: String,
    pub total: u64,
    pub used: u64,
}

/// Strip a kernel partition suffix: `nvme0n1p2` -> `nvme0n1`, `sda3` -> `sda`
pub(crate) fn strip_partition_suffix(name: &str) -> &str {
    let trimmed = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.len() == name.len() {
        return name;
    }
    // nvme and mmc partitions are `p<N>` after a digit
    if let Some(base) = trimmed.strip_suffix('p') {
        if base.ends_with(|c: char| c.is_ascii_digit()) {
            return base;
        }
    }
    if ["sd", "hd", "vd", "xvd"].iter().any(|p| name.starts_with(p)) {
        return trimmed;
    }
    name
}

/// Parent block device of a partition path such as `/dev/nvme0n1p2`
pub(crate) fn parent_block_device(partition: &str) -> String {
    let name = partition.strip_prefix("/dev/").unwrap_or(partition);
    #[cfg(target_os = "linux")]
    if let Some(parent) = sysfs_parent(name) {
        return parent;
    }
    strip_partition_suffix(name).to_string()
}

#[cfg(target_os = "linux")]
fn sysfs_parent(name: &str) -> Option<String> {
    let node = Path::new("/sys/class/block").join(name);
    if !node.join("partition").exists() {
        return None;
    }
    let real = std::fs::canonicalize(&node).ok()?;
    Some(real.parent()?.file_name()?.to_string_lossy().to_string())
}

/// First `temp1_input` in any hwmon directory below `device`
#[cfg(target_os = "linux")]
fn hwmon_temp_input(device: &Path) -> Option<PathBuf> {
    // drivetemp: device/hwmon/hwmonN; nvme: device/hwmonN
    let mut dirs = Vec::new();
    for parent in [device.join("hwmon"), device.to_path_buf()] {
        let Ok(entries) = std::fs::read_dir(&parent) else { continue };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with("hwmon") && entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
    }
    dirs.into_iter()
        .map(|dir| dir.join("temp1_input"))
        .find(|input| input.exists())
}

#[cfg(target_os = "linux")]
pub(crate) fn discover_drives() -> Vec<Drive> {
    let mut drives = Vec::new();
    let Ok(entries) = std::fs::read_dir("/sys/class/block") else {
        return drives;
    };

    for entry in entries.flatten() {
        let node = entry.path();
        let block = entry.file_name().to_string_lossy().to_string();
        if node.join("partition").exists() || block.starts_with("loop") || block.starts_with("ram") {
            continue;
        }
        let device = node.join("device");
        if !device.exists() {
            continue;
        }
        let label = std::fs::read_to_string(device.join("model"))
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| block.clone());
        drives.push(Drive {
            temp_input: hwmon_temp_input(&device),
            block,
            label,
        });
    }

    drives.sort_by(|a, b| a.block.cmp(&b.block));
    log::info!(
        "Discovered {} drives ({} with temperature)",
        drives.len(),
        drives.iter().filter(|d| d.temp_input.is_some()).count()
    );
    drives
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn discover_drives() -> Vec<Drive> {
    Vec::new()
}

/// One temperature and one used-space reading per physical drive.
///
/// Partitions are summed per parent block device. Known drives come first
/// in discovery order, then devices only seen through their partitions.
pub(crate) fn disk_readings(
    drives: &[Drive],
    temps: &[Option<f32>],
    partitions: &[PartitionUsage],
) -> Vec<SensorReading> {
    let mut blocks: Vec<(String, String, Option<f32>, bool)> = drives
        .iter()
        .zip(temps.iter().chain(std::iter::repeat(&None)))
        .map(|(d, t)| (d.block.clone(), d.label.clone(), *t, d.temp_input.is_some()))
        .collect();
    for p in partitions {
        if !blocks.iter().any(|(block, ..)| *block == p.block) {
            blocks.push((p.block.clone(), p.block.clone(), None, false));
        }
    }

    let mut out = Vec::new();
    for (block, label, temp, has_sensor) in blocks {
        let (total, used) = partitions
            .iter()
            .filter(|p| p.block == block)
            .fold((0u64, 0u64), |(t, u), p| (t + p.total, u + p.used));
        if !has_sensor && total == 0 {
            continue;
        }
        if has_sensor {
            out.push(SensorReading::new(
                DeviceType::Storage,
                label.as_str(),
                SensorKind::Temperature,
                "Temperature",
                temp,
            ));
        }
        if total > 0 {
            out.push(SensorReading::new(
                DeviceType::Storage,
                label.as_str(),
                SensorKind::Load,
                "Used Space",
                Some(used as f32 / total as f32 * 100.0),
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::readings_to_snapshot;
    use deskmon_types::DiskReading;

    const GIB: u64 = 1 << 30;

    fn usage(partition: &str, total_gib: u64, used_gib: u64) -> PartitionUsage {
        PartitionUsage {
            block: strip_partition_suffix(partition).to_string(),
            total: total_gib * GIB,
            used: used_gib * GIB,
        }
    }

    #[test]
    fn test_partition_suffixes() {
        assert_eq!(strip_partition_suffix("nvme0n1p2"), "nvme0n1");
        assert_eq!(strip_partition_suffix("nvme0n1"), "nvme0n1");
        assert_eq!(strip_partition_suffix("sda3"), "sda");
        assert_eq!(strip_partition_suffix("sdb"), "sdb");
        assert_eq!(strip_partition_suffix("mmcblk0p1"), "mmcblk0");
        assert_eq!(strip_partition_suffix("mmcblk0"), "mmcblk0");
        assert_eq!(strip_partition_suffix("dm-0"), "dm-0");
    }

    #[test]
    fn test_one_record_per_physical_drive() {
        let drives = vec![Drive {
            block: "nvme0n1".to_string(),
            label: "Samsung SSD 990 PRO 2TB".to_string(),
            temp_input: Some(PathBuf::from("/sys/class/nvme/nvme0/hwmon1/temp1_input")),
        }];
        let partitions = vec![usage("nvme0n1p2", 100, 63), usage("nvme0n1p3", 100, 12)];

        let data = readings_to_snapshot(&disk_readings(&drives, &[Some(41.0)], &partitions));
        assert_eq!(
            data.disks,
            vec![DiskReading {
                name: "990 PRO 2TB".to_string(),
                temp: Some(41),
                used_pct: Some(38),
            }]
        );
    }

    #[test]
    fn test_unknown_and_sensorless_drives() {
        // sdb has no hwmon node; sdc is not mounted and has no sensor
        let drives = vec![
            Drive {
                block: "sdb".to_string(),
                label: "WD Blue".to_string(),
                temp_input: None,
            },
            Drive {
                block: "sdc".to_string(),
                label: "sdc".to_string(),
                temp_input: None,
            },
        ];
        let partitions = vec![usage("sdb1", 400, 100), usage("vda1", 20, 15)];

        let data = readings_to_snapshot(&disk_readings(&drives, &[None, None], &partitions));
        let names: Vec<&str> = data.disks.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["WD Blue", "vda"]);
        assert_eq!(data.disks[0].temp, None);
        assert_eq!(data.disks[0].used_pct, Some(25));
        assert_eq!(data.disks[1].used_pct, Some(75));
    }
}
