//! UI-thread window bookkeeping

use deskmon_types::{Point, Rect};

/// Where the widget lives right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// On the desktop layer (or at the bottom of the z-order when embedding failed)
    Embedded,
    /// Top-level and always on top
    Floating,
    /// Undocked and sliding in from or out to the right edge
    Peeking,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub mode: WindowMode,
    pub topmost: bool,
    /// Whether the last embed attempt reached the desktop layer
    pub embedded: bool,
    pub position: Point,
    pub size: (i32, i32),
    /// Docked position saved while peeking
    pub remembered: Option<Point>,
    /// Cursor offset from the window origin while dragging
    pub drag_anchor: Option<Point>,
}

impl WindowState {
    pub fn new(position: Point, size: (i32, i32)) -> Self {
        Self {
            mode: WindowMode::Embedded,
            topmost: false,
            embedded: false,
            position,
            size,
            remembered: None,
            drag_anchor: None,
        }
    }

    pub fn is_peeking(&self) -> bool {
        self.mode == WindowMode::Peeking
    }

    /// Position the widget returns to after a peek
    pub fn docked_position(&self) -> Point {
        self.remembered.unwrap_or(self.position)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size.0, self.size.1)
    }
}
