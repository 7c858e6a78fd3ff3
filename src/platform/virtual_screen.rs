//! In-memory window system
//!
//! Holds the state real windows would have and records every call, so the
//! widget can run headless and tests can assert on what happened.

use super::{MenuState, PlatformEvent, SurfaceId, WindowSystem};
use deskmon_types::{Point, Rect, ScreenGeometry};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct VirtualScreen {
    pub screen: ScreenGeometry,
    pub size: (i32, i32),
    pub position: Point,
    pub cursor: Option<Point>,
    /// Surface returned by `find_desktop_surface`; `None` simulates a shell
    /// without the background layer
    pub desktop_surface: Option<SurfaceId>,
    pub desktop_visible: bool,
    pub parent: Option<SurfaceId>,
    pub topmost: bool,
    pub at_bottom: bool,
    pub tool_style: bool,
    pub trigger: Option<Rect>,
    pub menu: MenuState,
    pub destroyed: bool,
    /// Every `move_to` target, oldest first
    pub moves: Vec<Point>,
    pub reparent_calls: u32,
    /// Events handed out by the next `pump_events`
    pub queued: VecDeque<PlatformEvent>,
    /// Sleep for the pump timeout when nothing is queued
    pub blocking: bool,
}

impl VirtualScreen {
    pub fn new(screen: ScreenGeometry, size: (i32, i32)) -> Self {
        Self {
            screen,
            size,
            position: Point::default(),
            cursor: None,
            desktop_surface: Some(SurfaceId(1)),
            desktop_visible: true,
            parent: None,
            topmost: false,
            at_bottom: false,
            tool_style: false,
            trigger: None,
            menu: MenuState::default(),
            destroyed: false,
            moves: Vec::new(),
            reparent_calls: 0,
            queued: VecDeque::new(),
            blocking: false,
        }
    }

    /// A single 1920x1080 monitor and a 180x260 widget
    pub fn single_monitor() -> Self {
        Self::new(ScreenGeometry::new(0, 0, 1920, 1080), (180, 260))
    }

    /// Headless stand-in that idles in `pump_events` like a message loop
    pub fn headless() -> Self {
        let mut screen = Self::single_monitor();
        screen.blocking = true;
        screen
    }

    pub fn push_event(&mut self, event: PlatformEvent) {
        self.queued.push_back(event);
    }

    pub fn is_embedded(&self) -> bool {
        self.parent.is_some()
    }
}

impl WindowSystem for VirtualScreen {
    fn find_desktop_surface(&mut self) -> Option<SurfaceId> {
        self.desktop_surface
    }

    fn reparent(&mut self, parent: Option<SurfaceId>) -> bool {
        self.reparent_calls += 1;
        self.parent = parent;
        true
    }

    fn apply_tool_window_style(&mut self) {
        self.tool_style = true;
    }

    fn set_topmost(&mut self, topmost: bool) {
        self.topmost = topmost;
        if topmost {
            self.at_bottom = false;
        }
    }

    fn send_to_bottom(&mut self) {
        self.at_bottom = true;
        self.topmost = false;
    }

    fn move_to(&mut self, position: Point) {
        self.position = position;
        self.moves.push(position);
    }

    fn widget_size(&self) -> (i32, i32) {
        self.size
    }

    fn cursor_position(&self) -> Option<Point> {
        self.cursor
    }

    fn virtual_screen(&self) -> ScreenGeometry {
        self.screen
    }

    fn desktop_visible_at(&self, _point: Point) -> bool {
        self.desktop_visible
    }

    fn set_trigger_region(&mut self, region: Option<Rect>) {
        self.trigger = region;
    }

    fn update_menu(&mut self, menu: MenuState) {
        self.menu = menu;
    }

    fn pump_events(&mut self, timeout: Duration) -> Vec<PlatformEvent> {
        if self.queued.is_empty() && self.blocking {
            std::thread::sleep(timeout);
        }
        self.queued.drain(..).collect()
    }

    fn destroy(&mut self) {
        self.trigger = None;
        self.parent = None;
        self.destroyed = true;
    }
}
