//! deskmon-sources: Hardware sensor backends for the deskmon widget.
//!
//! A backend exposes hierarchical sensors (device type -> sensor kind ->
//! named value). The widget only relies on the `SensorBackend` lifecycle
//! plus `parse::readings_to_snapshot`, which turns a flat reading list into
//! the values the widget shows.

mod backend;
mod counters;
mod drives;
mod error;
#[cfg(feature = "nvidia")]
mod nvidia;
pub mod parse;
mod sysinfo_backend;

pub use backend::{read_degraded, read_snapshot, SensorBackend};
pub use counters::{AggregateCounters, OsCounters};
pub use error::SensorError;
pub use sysinfo_backend::SysinfoBackend;
