//! Critical-threshold alerts

use deskmon_types::HardwareReadings;
use std::time::{Duration, Instant};

use crate::core::constants::ALERT_COOLDOWN;

/// Anything that can make the alert noise
pub trait AlertSound {
    fn play_alert(&mut self);
}

/// Values at or above which a reading is critical
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub cpu_temp: i32,
    pub gpu_temp: i32,
    pub disk_temp: i32,
    pub disk_used_pct: i32,
    pub ram_pct: i32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_temp: 85,
            gpu_temp: 90,
            disk_temp: 55,
            disk_used_pct: 90,
            ram_pct: 95,
        }
    }
}

impl AlertThresholds {
    /// Human-readable description of every critical value, in display order
    pub fn evaluate(&self, data: &HardwareReadings) -> Vec<String> {
        let mut hits = Vec::new();
        let at_least = |v: Option<i32>, limit: i32| v.filter(|v| *v >= limit);

        if let Some(t) = at_least(data.cpu_temp, self.cpu_temp) {
            hits.push(format!("CPU {}°C", t));
        }
        if let Some(t) = at_least(data.gpu_temp, self.gpu_temp) {
            hits.push(format!("GPU {}°C", t));
        }
        if let Some(p) = at_least(data.ram_pct, self.ram_pct) {
            hits.push(format!("RAM {}%", p));
        }
        for disk in &data.disks {
            if let Some(t) = at_least(disk.temp, self.disk_temp) {
                hits.push(format!("{} {}°C", disk.name, t));
            }
            if let Some(p) = at_least(disk.used_pct, self.disk_used_pct) {
                hits.push(format!("{} {}%", disk.name, p));
            }
        }
        hits
    }
}

/// Rate-limited alert check run on every refresh tick
#[derive(Debug)]
pub struct AlertMonitor {
    thresholds: AlertThresholds,
    cooldown: Duration,
    last_alert: Option<Instant>,
}

impl AlertMonitor {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            cooldown: ALERT_COOLDOWN,
            last_alert: None,
        }
    }

    /// Critical values to announce now, if any.
    ///
    /// Nothing is reported while disabled or inside the cooldown window.
    pub fn check(&mut self, data: &HardwareReadings, enabled: bool, now: Instant) -> Option<Vec<String>> {
        if !enabled {
            return None;
        }
        if self
            .last_alert
            .is_some_and(|at| now.saturating_duration_since(at) < self.cooldown)
        {
            return None;
        }

        let hits = self.thresholds.evaluate(data);
        if hits.is_empty() {
            return None;
        }
        log::warn!("Critical readings: {}", hits.join(", "));
        self.last_alert = Some(now);
        Some(hits)
    }

    /// True while an alert raised within `hold` should keep the status line
    pub fn is_recent(&self, now: Instant, hold: Duration) -> bool {
        self.last_alert
            .is_some_and(|at| now.saturating_duration_since(at) < hold)
    }
}

impl Default for AlertMonitor {
    fn default() -> Self {
        Self::new(AlertThresholds::default())
    }
}

/// Sound that only counts how often it was asked to play
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CountingSound {
    pub plays: u32,
}

#[cfg(test)]
impl AlertSound for CountingSound {
    fn play_alert(&mut self) {
        self.plays += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmon_types::DiskReading;

    fn hot() -> HardwareReadings {
        HardwareReadings {
            cpu_temp: Some(91),
            gpu_temp: Some(70),
            ram_pct: Some(96),
            disks: vec![DiskReading {
                name: "990 PRO".to_string(),
                temp: Some(58),
                used_pct: Some(40),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_lists_each_critical_value() {
        let hits = AlertThresholds::default().evaluate(&hot());
        assert_eq!(hits, vec!["CPU 91°C", "RAM 96%", "990 PRO 58°C"]);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let data = HardwareReadings {
            gpu_temp: Some(90),
            disks: vec![DiskReading {
                name: "WD".to_string(),
                temp: None,
                used_pct: Some(90),
            }],
            ..Default::default()
        };
        assert_eq!(AlertThresholds::default().evaluate(&data), vec!["GPU 90°C", "WD 90%"]);
    }

    #[test]
    fn test_cooldown_suppresses_repeat_alerts() {
        let mut monitor = AlertMonitor::default();
        let t0 = Instant::now();

        assert!(monitor.check(&hot(), true, t0).is_some());
        assert!(monitor.check(&hot(), true, t0 + Duration::from_secs(30)).is_none());
        assert!(monitor.check(&hot(), true, t0 + Duration::from_secs(60)).is_some());
    }

    #[test]
    fn test_disabled_alerts_never_fire() {
        let mut monitor = AlertMonitor::default();
        let t0 = Instant::now();
        assert!(monitor.check(&hot(), false, t0).is_none());
        assert!(!monitor.is_recent(t0, Duration::from_secs(10)));
    }

    #[test]
    fn test_recent_alert_window() {
        let mut monitor = AlertMonitor::default();
        let t0 = Instant::now();
        monitor.check(&hot(), true, t0);
        let hold = Duration::from_secs(10);
        assert!(monitor.is_recent(t0 + Duration::from_secs(9), hold));
        assert!(!monitor.is_recent(t0 + Duration::from_secs(10), hold));
    }
}
