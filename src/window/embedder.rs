//! Desktop-layer embedding

use crate::platform::WindowSystem;

/// Moves the widget between the desktop background layer and top level.
///
/// One attempt per call; callers decide when to try again.
#[derive(Debug, Default)]
pub struct WindowEmbedder {
    attempts: u32,
    successes: u32,
}

impl WindowEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reparent into the desktop surface.
    ///
    /// Without one the widget is sent to the bottom of the z-order instead
    /// and `false` is returned.
    pub fn embed(&mut self, ws: &mut dyn WindowSystem) -> bool {
        self.attempts += 1;
        ws.apply_tool_window_style();

        let embedded = match ws.find_desktop_surface() {
            Some(surface) => ws.reparent(Some(surface)),
            None => false,
        };

        if embedded {
            self.successes += 1;
            log::info!("Embedded into desktop layer (attempt {})", self.attempts);
        } else {
            ws.send_to_bottom();
            log::warn!("Desktop layer not available, floating at bottom of z-order");
        }
        embedded
    }

    /// Detach from the desktop surface and set the topmost flag
    pub fn unembed(&mut self, ws: &mut dyn WindowSystem, topmost: bool) {
        ws.reparent(None);
        ws.set_topmost(topmost);
        log::debug!("Unembedded (topmost: {})", topmost);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{SurfaceId, VirtualScreen};

    #[test]
    fn test_embed_reparents_into_desktop_surface() {
        let mut vs = VirtualScreen::single_monitor();
        vs.desktop_surface = Some(SurfaceId(42));
        let mut embedder = WindowEmbedder::new();

        assert!(embedder.embed(&mut vs));
        assert_eq!(vs.parent, Some(SurfaceId(42)));
        assert!(vs.tool_style);
        assert!(!vs.at_bottom);
    }

    #[test]
    fn test_missing_surface_falls_back_to_bottom() {
        let mut vs = VirtualScreen::single_monitor();
        vs.desktop_surface = None;
        let mut embedder = WindowEmbedder::new();

        assert!(!embedder.embed(&mut vs));
        assert_eq!(vs.parent, None);
        assert!(vs.at_bottom);
        assert_eq!(vs.reparent_calls, 0);
        assert_eq!(embedder.attempts(), 1);
        assert_eq!(embedder.successes(), 0);
    }

    #[test]
    fn test_unembed_detaches_and_raises() {
        let mut vs = VirtualScreen::single_monitor();
        let mut embedder = WindowEmbedder::new();
        embedder.embed(&mut vs);

        embedder.unembed(&mut vs, true);
        assert_eq!(vs.parent, None);
        assert!(vs.topmost);
    }
}
