//! OS-level aggregate CPU and memory counters (degraded mode)

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// Aggregate counters available without any hardware sensor backend
pub trait AggregateCounters: Send {
    /// Total CPU usage in percent
    fn cpu_load(&mut self) -> Option<f32>;

    /// Used physical memory in percent
    fn memory_percent(&mut self) -> Option<f32>;
}

/// Aggregate counters backed by `sysinfo::System`
///
/// CPU usage is computed between two refreshes, so the first reading after
/// construction is relative to construction time.
pub struct OsCounters {
    system: System,
}

impl OsCounters {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self { system }
    }
}

impl Default for OsCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateCounters for OsCounters {
    fn cpu_load(&mut self) -> Option<f32> {
        self.system.refresh_cpu_usage();
        if self.system.cpus().is_empty() {
            return None;
        }
        Some(self.system.global_cpu_usage())
    }

    fn memory_percent(&mut self) -> Option<f32> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return None;
        }
        Some(self.system.used_memory() as f32 / total as f32 * 100.0)
    }
}
