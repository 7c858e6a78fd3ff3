//! Rendering seam between the refresh loop and the window system

use super::format::{RenderModel, StatusLine};

/// Draws the widget contents
pub trait Renderer {
    /// Replace every value row
    fn render(&mut self, model: &RenderModel);

    /// Replace the status line only
    fn set_status(&mut self, status: &StatusLine);
}

/// Renderer for headless runs: writes rows to the log
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_status: Option<String>,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, model: &RenderModel) {
        let line = model
            .rows
            .iter()
            .map(|row| {
                let values: Vec<&str> = row
                    .values
                    .iter()
                    .map(|v| v.text.as_str())
                    .filter(|t| !t.is_empty())
                    .collect();
                format!("{} {}", row.label, values.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" | ");
        log::info!("{}", line);
    }

    fn set_status(&mut self, status: &StatusLine) {
        if self.last_status.as_deref() != Some(status.text.as_str()) {
            log::info!("Status: {}", status.text);
            self.last_status = Some(status.text.clone());
        }
    }
}

/// Renderer that keeps what it was given, for assertions
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub models: Vec<RenderModel>,
    pub statuses: Vec<StatusLine>,
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn render(&mut self, model: &RenderModel) {
        self.models.push(model.clone());
    }

    fn set_status(&mut self, status: &StatusLine) {
        self.statuses.push(status.clone());
    }
}
