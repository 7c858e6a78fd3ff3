//! deskmon-types: Shared data types for the deskmon desktop widget.
//!
//! This crate contains pure data types (telemetry snapshots, raw sensor
//! readings, screen geometry) shared by the sensor sources and the widget.
//! Nothing here touches the window system or the sensor hardware.

pub mod color;
pub mod geometry;
pub mod sensor;
pub mod snapshot;

pub use color::Color;
pub use geometry::{Point, Rect, ScreenGeometry};
pub use sensor::{DeviceType, SensorKind, SensorReading};
pub use snapshot::{DiskReading, HardwareReadings, TelemetrySnapshot};
