//! Virtual-screen change detection

use crate::core::constants::{DEFAULT_POSITION, TRIGGER_WIDTH_PX};
use deskmon_types::{Point, Rect, ScreenGeometry};

/// Hover strip along the right edge, full virtual height
pub fn trigger_region(screen: ScreenGeometry) -> Rect {
    Rect::new(
        screen.right() - TRIGGER_WIDTH_PX,
        screen.y,
        TRIGGER_WIDTH_PX,
        screen.height,
    )
}

/// `position` when it is on screen, else the default position
pub fn revalidate_position(position: Point, screen: ScreenGeometry) -> Point {
    if screen.contains(position) {
        position
    } else {
        DEFAULT_POSITION
    }
}

/// Remembers the last observed geometry and reports changes
#[derive(Debug, Default)]
pub struct ScreenGeometryWatcher {
    current: Option<ScreenGeometry>,
}

impl ScreenGeometryWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `observed`; returns it when it differs from the last poll.
    ///
    /// The first poll always reports.
    pub fn poll(&mut self, observed: ScreenGeometry) -> Option<ScreenGeometry> {
        if self.current == Some(observed) {
            return None;
        }
        match self.current {
            Some(old) => log::info!(
                "Virtual screen changed: {}x{}+{}+{} -> {}x{}+{}+{}",
                old.width,
                old.height,
                old.x,
                old.y,
                observed.width,
                observed.height,
                observed.x,
                observed.y
            ),
            None => log::debug!(
                "Virtual screen: {}x{}+{}+{}",
                observed.width,
                observed.height,
                observed.x,
                observed.y
            ),
        }
        self.current = Some(observed);
        Some(observed)
    }

    pub fn current(&self) -> Option<ScreenGeometry> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_reports_then_only_changes() {
        let mut watcher = ScreenGeometryWatcher::new();
        let screen = ScreenGeometry::new(0, 0, 1920, 1080);

        assert_eq!(watcher.poll(screen), Some(screen));
        assert_eq!(watcher.poll(screen), None);

        let wider = ScreenGeometry::new(0, 0, 3840, 1080);
        assert_eq!(watcher.poll(wider), Some(wider));
        assert_eq!(watcher.current(), Some(wider));
    }

    #[test]
    fn test_trigger_region_hugs_right_edge() {
        let screen = ScreenGeometry::new(-1920, 0, 3840, 1200);
        let region = trigger_region(screen);
        assert_eq!(region, Rect::new(1918, 0, 2, 1200));
        assert_eq!(region.right(), screen.right());
    }

    #[test]
    fn test_offscreen_position_resets() {
        let small = ScreenGeometry::new(0, 0, 1280, 720);
        assert_eq!(revalidate_position(Point::new(1500, 40), small), DEFAULT_POSITION);
        assert_eq!(revalidate_position(Point::new(-5, 40), small), DEFAULT_POSITION);
        assert_eq!(revalidate_position(Point::new(900, 40), small), Point::new(900, 40));
    }
}
