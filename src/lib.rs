//! deskmon: a hardware telemetry widget for the desktop layer
//!
//! The widget sits behind the desktop icons, shows CPU, GPU, memory and
//! disk readings, and slides in from the right screen edge on demand.
//!
//! - `core`: sensor polling, the shared snapshot store and UI scheduling
//! - `window`: embedding, peeking and screen-geometry tracking
//! - `ui`: formatting, alerts and the renderer seam
//! - `platform`: the window-system abstraction and its implementations
//! - `config`: persisted settings
//! - `audio`: alert beeps

pub mod app;
pub mod audio;
pub mod config;
pub mod core;
pub mod platform;
pub mod ui;
pub mod window;

// Re-export commonly used types
pub use app::WidgetApp;
pub use config::Config;
pub use crate::core::{SensorPoller, SharedTelemetryStore};
pub use platform::{PlatformEvent, WindowSystem};
pub use ui::Renderer;
