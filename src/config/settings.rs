//! Persisted widget settings

use anyhow::{Context, Result};
use deskmon_types::{HardwareReadings, Point};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::core::constants::DEFAULT_POSITION;
use crate::ui::FanCeilings;

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("org", "deskmon", "deskmon"));

const DEFAULT_GPU_FAN_MAX_RPM: u32 = 2200;
const DEFAULT_CPU_FAN_MAX_RPM: u32 = 1800;

/// Widget settings stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Docked position in virtual-screen pixels
    pub x: i32,
    pub y: i32,
    pub peek_enabled: bool,
    pub alerts_enabled: bool,
    /// Calibrated GPU fan maximum used for RPM-based estimates
    pub gpu_fan_max_rpm: u32,
    /// Calibrated CPU fan maximum used for RPM-based estimates
    pub cpu_fan_max_rpm: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            x: DEFAULT_POSITION.x,
            y: DEFAULT_POSITION.y,
            peek_enabled: true,
            alerts_enabled: true,
            gpu_fan_max_rpm: DEFAULT_GPU_FAN_MAX_RPM,
            cpu_fan_max_rpm: DEFAULT_CPU_FAN_MAX_RPM,
        }
    }
}

fn field<T>(
    obj: Option<&serde_json::Map<String, Value>>,
    key: &str,
    parse: impl Fn(&Value) -> Option<T>,
    default: T,
) -> T {
    match obj.and_then(|o| o.get(key)) {
        Some(v) => parse(v).unwrap_or_else(|| {
            log::warn!("Config field '{}' is invalid ({}), using default", key, v);
            default
        }),
        None => {
            log::warn!("Config field '{}' is missing, using default", key);
            default
        }
    }
}

fn as_i32(v: &Value) -> Option<i32> {
    v.as_i64().and_then(|n| i32::try_from(n).ok())
}

fn as_positive_u32(v: &Value) -> Option<u32> {
    v.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}

impl Config {
    /// Build from arbitrary JSON, validating each field on its own.
    ///
    /// A bad field falls back to its default without affecting the others.
    pub fn from_value(value: &Value) -> Self {
        let obj = value.as_object();
        if obj.is_none() {
            log::warn!("Config is not a JSON object, using defaults");
        }
        let d = Self::default();
        Self {
            x: field(obj, "x", as_i32, d.x),
            y: field(obj, "y", as_i32, d.y),
            peek_enabled: field(obj, "peek_enabled", Value::as_bool, d.peek_enabled),
            alerts_enabled: field(obj, "alerts_enabled", Value::as_bool, d.alerts_enabled),
            gpu_fan_max_rpm: field(obj, "gpu_fan_max_rpm", as_positive_u32, d.gpu_fan_max_rpm),
            cpu_fan_max_rpm: field(obj, "cpu_fan_max_rpm", as_positive_u32, d.cpu_fan_max_rpm),
        }
    }

    /// Default config file location
    pub fn config_path() -> Result<PathBuf> {
        let dirs = PROJECT_DIRS
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load from `path`, falling back to defaults when it is unreadable
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from_path(path).unwrap_or_else(|e| {
            log::warn!("Failed to load config from {}: {:#}", path.display(), e);
            Self::default()
        })
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self::from_value(&value))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns `true` if the stored position changed
    pub fn set_position(&mut self, position: Point) -> bool {
        if self.position() == position {
            return false;
        }
        self.x = position.x;
        self.y = position.y;
        true
    }

    pub fn fan_ceilings(&self) -> FanCeilings {
        FanCeilings {
            cpu_rpm: self.cpu_fan_max_rpm,
            gpu_rpm: self.gpu_fan_max_rpm,
        }
    }

    /// Raise fan ceilings to any higher RPM seen; `true` if one moved
    pub fn calibrate_fans(&mut self, data: &HardwareReadings) -> bool {
        let mut changed = false;
        for (rpm, ceiling, name) in [
            (data.cpu_fan_rpm, &mut self.cpu_fan_max_rpm, "CPU"),
            (data.gpu_fan_rpm, &mut self.gpu_fan_max_rpm, "GPU"),
        ] {
            let Some(rpm) = rpm.and_then(|r| u32::try_from(r).ok()) else {
                continue;
            };
            if rpm > *ceiling {
                log::info!("{} fan ceiling raised {} -> {} RPM", name, ceiling, rpm);
                *ceiling = rpm;
                changed = true;
            }
        }
        changed
    }
}
