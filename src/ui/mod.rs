//! Widget contents: formatting, alerts and the renderer seam

pub mod alerts;
pub mod format;
mod renderer;

pub use alerts::{AlertMonitor, AlertSound, AlertThresholds};
pub use format::{FanCeilings, RenderModel, Row, StatusLine, ValueText};
pub use renderer::{LogRenderer, Renderer};

#[cfg(test)]
pub(crate) use alerts::CountingSound;
#[cfg(test)]
pub(crate) use renderer::RecordingRenderer;
