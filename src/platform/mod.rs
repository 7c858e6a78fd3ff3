//! Window-system capabilities used by the widget
//!
//! The widget logic only talks to [`WindowSystem`]. Windows gets the real
//! desktop-layer implementation; everything else (and every test) runs on
//! [`VirtualScreen`].

pub mod virtual_screen;
#[cfg(windows)]
pub mod win32;

pub use virtual_screen::VirtualScreen;

use deskmon_types::{Point, Rect, ScreenGeometry};
use std::time::Duration;

/// Opaque handle of a foreign window (the desktop background surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub isize);

/// User input and context-menu actions, in arrival order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The pointer touched the right-edge trigger strip
    TriggerEntered,
    /// Left button pressed on the widget at this screen point
    DragStart(Point),
    DragMove(Point),
    DragEnd,
    ToggleTopmost,
    TogglePeek,
    ToggleAlerts,
    Quit,
}

/// Flags shown as checkmarks in the context menu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    pub topmost: bool,
    pub peek_enabled: bool,
    pub alerts_enabled: bool,
}

pub trait WindowSystem {
    /// Surface behind the desktop icons that accepts child windows
    fn find_desktop_surface(&mut self) -> Option<SurfaceId>;

    /// Make the widget a child of `parent`, or top-level for `None`
    fn reparent(&mut self, parent: Option<SurfaceId>) -> bool;

    /// Hide from the task switcher and never take focus
    fn apply_tool_window_style(&mut self);

    fn set_topmost(&mut self, topmost: bool);

    /// Push the widget to the bottom of the z-order
    fn send_to_bottom(&mut self);

    fn move_to(&mut self, position: Point);

    /// Current widget size in pixels
    fn widget_size(&self) -> (i32, i32);

    fn cursor_position(&self) -> Option<Point>;

    fn virtual_screen(&self) -> ScreenGeometry;

    /// Whether the desktop (not some application window) is under `point`
    fn desktop_visible_at(&self, point: Point) -> bool;

    /// Show the edge trigger strip over `region`, or hide it
    fn set_trigger_region(&mut self, region: Option<Rect>);

    fn update_menu(&mut self, menu: MenuState);

    /// Wait up to `timeout` for input and return what arrived
    fn pump_events(&mut self, timeout: Duration) -> Vec<PlatformEvent>;

    /// Tear down every native resource
    fn destroy(&mut self);
}
