//! The widget: owns all UI-thread state and dispatches tasks and events

use crate::config::Config;
use crate::core::constants::{EMBED_DELAY, GEOMETRY_POLL_INTERVAL, IDLE_PUMP_TIMEOUT};
use crate::core::{
    BackendSlot, PollerHandle, RefreshContext, RefreshLoop, RefreshOutcome, Scheduler,
    SharedTelemetryStore, UiTask,
};
use crate::platform::{MenuState, PlatformEvent, WindowSystem};
use crate::ui::{AlertSound, Renderer, StatusLine};
use crate::window::geometry::{revalidate_position, trigger_region};
use crate::window::{
    PeekContext, PeekController, PeekEffect, PeekState, PeekTransition, ScreenGeometryWatcher,
    WindowEmbedder, WindowMode, WindowState,
};
use deskmon_types::Point;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct WidgetApp<W: WindowSystem, R: Renderer> {
    ws: W,
    renderer: R,
    sound: Box<dyn AlertSound>,
    config: Config,
    /// Where the config is saved; `None` keeps it in memory only
    config_path: Option<PathBuf>,
    /// Unsaved changes that only need to reach disk at shutdown
    config_dirty: bool,
    state: WindowState,
    embedder: WindowEmbedder,
    peek: PeekController,
    geometry: ScreenGeometryWatcher,
    refresh: RefreshLoop,
    scheduler: Scheduler,
    store: Arc<SharedTelemetryStore>,
    sensors: Option<(PollerHandle, Arc<BackendSlot>)>,
    running: bool,
}

impl<W: WindowSystem, R: Renderer> WidgetApp<W, R> {
    pub fn new(
        mut ws: W,
        mut renderer: R,
        sound: Box<dyn AlertSound>,
        config: Config,
        config_path: Option<PathBuf>,
        store: Arc<SharedTelemetryStore>,
    ) -> Self {
        let state = WindowState::new(config.position(), ws.widget_size());
        ws.apply_tool_window_style();
        ws.move_to(state.position);
        renderer.set_status(&StatusLine::starting());

        let mut app = Self {
            ws,
            renderer,
            sound,
            config,
            config_path,
            config_dirty: false,
            state,
            embedder: WindowEmbedder::new(),
            peek: PeekController::new(),
            geometry: ScreenGeometryWatcher::new(),
            refresh: RefreshLoop::default(),
            scheduler: Scheduler::new(),
            store,
            sensors: None,
            running: true,
        };
        app.update_menu();
        app
    }

    /// Hand over the poller and backend so shutdown can stop and close them
    pub fn attach_sensors(&mut self, poller: PollerHandle, slot: Arc<BackendSlot>) {
        self.sensors = Some((poller, slot));
    }

    /// Queue the startup tasks
    pub fn start(&mut self, now: Instant) {
        self.scheduler.schedule(UiTask::Embed, now, EMBED_DELAY);
        self.scheduler.schedule(UiTask::Refresh, now, Duration::ZERO);
        self.scheduler.schedule(UiTask::GeometryPoll, now, Duration::ZERO);
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn peek_state(&self) -> PeekState {
        self.peek.state()
    }

    pub fn embedder(&self) -> &WindowEmbedder {
        &self.embedder
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn window_system(&self) -> &W {
        &self.ws
    }

    pub fn window_system_mut(&mut self) -> &mut W {
        &mut self.ws
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run every task due at `now`, one at a time
    pub fn run_due(&mut self, now: Instant) {
        while let Some(task) = self.scheduler.pop_due(now) {
            self.handle_task(task, now);
        }
    }

    /// Pump events and run tasks until quit, then shut down
    pub fn run(&mut self) {
        self.start(Instant::now());
        while self.running {
            self.run_due(Instant::now());

            let timeout = self
                .scheduler
                .next_deadline()
                .map(|d| d.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_PUMP_TIMEOUT);
            for event in self.ws.pump_events(timeout) {
                self.handle_event(event, Instant::now());
                if !self.running {
                    break;
                }
            }
        }
        self.shutdown();
    }

    pub fn handle_task(&mut self, task: UiTask, now: Instant) {
        log::trace!("UI task {:?}", task);
        match task {
            UiTask::Embed => self.embed_now(),
            UiTask::Refresh => self.refresh_now(now),
            UiTask::PeekTick => {
                let ctx = self.peek_context();
                let transition = self.peek.tick(&ctx);
                self.apply_peek(transition, now);
            }
            UiTask::GeometryPoll => {
                self.check_geometry();
                self.scheduler
                    .schedule(UiTask::GeometryPoll, now, GEOMETRY_POLL_INTERVAL);
            }
        }
    }

    pub fn handle_event(&mut self, event: PlatformEvent, now: Instant) {
        log::trace!("Event {:?}", event);
        match event {
            PlatformEvent::TriggerEntered => {
                let ctx = self.peek_context();
                let transition = self.peek.trigger_entered(&ctx);
                self.apply_peek(transition, now);
            }
            PlatformEvent::DragStart(cursor) => {
                self.state.drag_anchor = Some(Point::new(
                    cursor.x - self.state.position.x,
                    cursor.y - self.state.position.y,
                ));
            }
            PlatformEvent::DragMove(cursor) => {
                let Some(anchor) = self.state.drag_anchor else {
                    return;
                };
                let position = Point::new(cursor.x - anchor.x, cursor.y - anchor.y);
                self.ws.move_to(position);
                self.state.position = position;
                if self.state.is_peeking() {
                    // Becomes the docked position once the peek ends
                    self.state.remembered = Some(position);
                } else {
                    self.config.set_position(position);
                }
            }
            PlatformEvent::DragEnd => {
                if self.state.drag_anchor.take().is_some() && !self.state.is_peeking() {
                    self.save_config();
                }
            }
            PlatformEvent::ToggleTopmost => self.toggle_topmost(now),
            PlatformEvent::TogglePeek => self.toggle_peek(now),
            PlatformEvent::ToggleAlerts => {
                self.config.alerts_enabled = !self.config.alerts_enabled;
                log::info!("Alerts {}", on_off(self.config.alerts_enabled));
                self.save_config();
                self.update_menu();
            }
            PlatformEvent::Quit => {
                log::info!("Quit requested");
                self.running = false;
            }
        }
    }

    fn embed_now(&mut self) {
        // A toggle may have left embedded mode since this was scheduled
        if self.state.mode != WindowMode::Embedded || self.state.topmost {
            return;
        }
        self.state.embedded = self.embedder.embed(&mut self.ws);
        self.ws.move_to(self.state.position);
    }

    fn refresh_now(&mut self, now: Instant) {
        let ctx = RefreshContext {
            mode: self.state.mode,
            embedded: self.state.embedded,
            alerts_enabled: self.config.alerts_enabled,
            ceilings: self.config.fan_ceilings(),
        };
        let outcome = self.refresh.tick(
            &self.store,
            ctx,
            &mut self.renderer,
            self.sound.as_mut(),
            now,
        );
        if let RefreshOutcome::Rendered(ref data) = outcome {
            if self.config.calibrate_fans(data) {
                self.config_dirty = true;
            }
        }
        self.scheduler
            .schedule(UiTask::Refresh, now, outcome.next_delay());
    }

    fn peek_context(&mut self) -> PeekContext {
        // The renderer may have resized the window since the last frame
        self.state.size = self.ws.widget_size();
        let widget = self.state.rect();
        let docked = self.state.docked_position();
        PeekContext {
            screen: self.ws.virtual_screen(),
            widget_size: (widget.width, widget.height),
            widget_position: widget.origin(),
            dragging: self.state.drag_anchor.is_some(),
            docked_position: docked,
            cursor: self.ws.cursor_position(),
            topmost: self.state.topmost,
            peek_enabled: self.config.peek_enabled,
            desktop_visible: self.ws.desktop_visible_at(Point::new(
                docked.x + widget.width / 2,
                docked.y + widget.height / 2,
            )),
        }
    }

    fn apply_peek(&mut self, transition: PeekTransition, now: Instant) {
        for effect in transition.effects {
            match effect {
                PeekEffect::Undock => {
                    self.state.remembered = Some(self.state.position);
                    self.state.mode = WindowMode::Peeking;
                    self.state.embedded = false;
                    self.embedder.unembed(&mut self.ws, true);
                }
                PeekEffect::MoveTo(position) => {
                    self.ws.move_to(position);
                    self.state.position = position;
                }
                PeekEffect::Redock(position) => {
                    self.ws.set_topmost(false);
                    self.state.mode = WindowMode::Embedded;
                    self.state.remembered = None;
                    self.state.embedded = self.embedder.embed(&mut self.ws);
                    self.ws.move_to(position);
                    self.state.position = position;
                    if self.config.set_position(position) {
                        self.save_config();
                    }
                }
            }
        }

        match transition.next_tick {
            Some(delay) => self.scheduler.schedule(UiTask::PeekTick, now, delay),
            None => {
                self.scheduler.cancel(UiTask::PeekTick);
            }
        }
    }

    /// Drop any running peek and put the widget back where it was docked
    fn cancel_peek(&mut self) {
        self.scheduler.cancel(UiTask::PeekTick);
        if self.peek.cancel() {
            if let Some(position) = self.state.remembered.take() {
                self.ws.move_to(position);
                self.state.position = position;
            }
            log::debug!("Peek cancelled, restored to {:?}", self.state.position);
        }
    }

    fn toggle_topmost(&mut self, now: Instant) {
        self.state.topmost = !self.state.topmost;
        log::info!("Always on top {}", on_off(self.state.topmost));

        if self.state.topmost {
            self.scheduler.cancel(UiTask::Embed);
            self.embedder.unembed(&mut self.ws, true);
            self.cancel_peek();
            self.state.embedded = false;
            self.state.mode = WindowMode::Floating;
        } else {
            self.ws.set_topmost(false);
            self.state.mode = WindowMode::Embedded;
            self.scheduler.schedule(UiTask::Embed, now, EMBED_DELAY);
        }
        self.sync_trigger_region();
        self.update_menu();
    }

    fn toggle_peek(&mut self, now: Instant) {
        self.config.peek_enabled = !self.config.peek_enabled;
        log::info!("Peek {}", on_off(self.config.peek_enabled));
        self.save_config();

        if !self.config.peek_enabled {
            let transition = self.peek.force_slide_out();
            if transition.next_tick.is_some() {
                self.apply_peek(transition, now);
            }
        }
        self.sync_trigger_region();
        self.update_menu();
    }

    fn sync_trigger_region(&mut self) {
        let region = if self.config.peek_enabled && !self.state.topmost {
            self.geometry.current().map(trigger_region)
        } else {
            None
        };
        self.ws.set_trigger_region(region);
    }

    fn check_geometry(&mut self) {
        let Some(screen) = self.geometry.poll(self.ws.virtual_screen()) else {
            return;
        };
        self.sync_trigger_region();

        let stored = self.config.position();
        let valid = revalidate_position(stored, screen);
        if valid != stored {
            log::warn!("Saved position {:?} is off screen, resetting to {:?}", stored, valid);
            self.config.set_position(valid);
            self.save_config();
        }

        if self.state.is_peeking() {
            self.state.remembered = self
                .state
                .remembered
                .map(|p| revalidate_position(p, screen));
        } else {
            let current = revalidate_position(self.state.position, screen);
            if current != self.state.position {
                self.ws.move_to(current);
                self.state.position = current;
            }
        }
    }

    fn update_menu(&mut self) {
        self.ws.update_menu(MenuState {
            topmost: self.state.topmost,
            peek_enabled: self.config.peek_enabled,
            alerts_enabled: self.config.alerts_enabled,
        });
    }

    fn save_config(&mut self) {
        let Some(path) = self.config_path.as_ref() else {
            self.config_dirty = false;
            return;
        };
        match self.config.save_to_path(path) {
            Ok(()) => self.config_dirty = false,
            Err(e) => log::warn!("Failed to save config: {:#}", e),
        }
    }

    /// Stop everything in dependency order and release the window
    pub fn shutdown(&mut self) {
        self.running = false;
        self.scheduler.cancel_all();

        if let Some((mut poller, slot)) = self.sensors.take() {
            if !poller.is_running() {
                log::warn!("Sensor poller had already exited");
            }
            poller.stop();
            slot.close();
        }

        self.cancel_peek();
        let position = self.state.docked_position();
        if self.config.set_position(position) || self.config_dirty {
            log::debug!("Saving config on shutdown");
        }
        self.save_config();

        self.ws.set_trigger_region(None);
        self.ws.destroy();
        log::info!("Widget shut down");
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
