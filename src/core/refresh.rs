//! One UI refresh tick: store -> render model -> renderer

use super::constants::{ALERT_STATUS_HOLD, REFRESH_INTERVAL, REFRESH_WAITING_INTERVAL};
use super::store::SharedTelemetryStore;
use crate::ui::{AlertMonitor, AlertSound, FanCeilings, RenderModel, Renderer, StatusLine};
use crate::window::WindowMode;
use deskmon_types::{HardwareReadings, TelemetrySnapshot};
use std::time::{Duration, Instant};

/// UI state the tick needs but does not own
#[derive(Debug, Clone, Copy)]
pub struct RefreshContext {
    pub mode: WindowMode,
    pub embedded: bool,
    pub alerts_enabled: bool,
    pub ceilings: FanCeilings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No poll has completed yet
    Waiting,
    /// The latest poll failed; values were left as they were
    Error(String),
    /// Values were rendered from these readings
    Rendered(HardwareReadings),
}

impl RefreshOutcome {
    /// Delay before the next tick
    pub fn next_delay(&self) -> Duration {
        match self {
            RefreshOutcome::Waiting => REFRESH_WAITING_INTERVAL,
            _ => REFRESH_INTERVAL,
        }
    }
}

#[derive(Debug, Default)]
pub struct RefreshLoop {
    alerts: AlertMonitor,
}

impl RefreshLoop {
    pub fn new(alerts: AlertMonitor) -> Self {
        Self { alerts }
    }

    pub fn tick(
        &mut self,
        store: &SharedTelemetryStore,
        ctx: RefreshContext,
        renderer: &mut dyn Renderer,
        sound: &mut dyn AlertSound,
        now: Instant,
    ) -> RefreshOutcome {
        let data = match store.read() {
            None => return RefreshOutcome::Waiting,
            Some(TelemetrySnapshot::Error(message)) => {
                renderer.set_status(&StatusLine::error(&message));
                return RefreshOutcome::Error(message);
            }
            Some(TelemetrySnapshot::Readings(data)) => data,
        };

        renderer.render(&RenderModel::from_readings(&data, ctx.ceilings));

        if let Some(hits) = self.alerts.check(&data, ctx.alerts_enabled, now) {
            sound.play_alert();
            renderer.set_status(&StatusLine::alert(&hits));
        }
        if !self.alerts.is_recent(now, ALERT_STATUS_HOLD) {
            renderer.set_status(&StatusLine::for_mode(ctx.mode, ctx.embedded));
        }

        RefreshOutcome::Rendered(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{CountingSound, RecordingRenderer};

    fn ctx() -> RefreshContext {
        RefreshContext {
            mode: WindowMode::Embedded,
            embedded: true,
            alerts_enabled: true,
            ceilings: FanCeilings {
                cpu_rpm: 1800,
                gpu_rpm: 2200,
            },
        }
    }

    #[test]
    fn test_waiting_before_first_publish() {
        let store = SharedTelemetryStore::new();
        let mut renderer = RecordingRenderer::default();
        let mut sound = CountingSound::default();

        let outcome = RefreshLoop::default().tick(&store, ctx(), &mut renderer, &mut sound, Instant::now());
        assert_eq!(outcome, RefreshOutcome::Waiting);
        assert_eq!(outcome.next_delay(), Duration::from_millis(500));
        assert!(renderer.models.is_empty());
        assert!(renderer.statuses.is_empty());
    }

    #[test]
    fn test_error_updates_status_only() {
        let store = SharedTelemetryStore::new();
        store.publish(TelemetrySnapshot::Error("sensor timeout".to_string()));
        let mut renderer = RecordingRenderer::default();
        let mut sound = CountingSound::default();

        let outcome = RefreshLoop::default().tick(&store, ctx(), &mut renderer, &mut sound, Instant::now());
        assert_eq!(outcome.next_delay(), Duration::from_millis(2000));
        assert!(renderer.models.is_empty());
        assert_eq!(renderer.statuses, vec![StatusLine::error("sensor timeout")]);
    }

    #[test]
    fn test_readings_render_and_show_mode() {
        let store = SharedTelemetryStore::new();
        store.publish(TelemetrySnapshot::Readings(HardwareReadings {
            cpu_temp: Some(50),
            ..Default::default()
        }));
        let mut renderer = RecordingRenderer::default();
        let mut sound = CountingSound::default();

        let outcome = RefreshLoop::default().tick(&store, ctx(), &mut renderer, &mut sound, Instant::now());
        assert!(matches!(outcome, RefreshOutcome::Rendered(_)));
        assert_eq!(renderer.models.len(), 1);
        assert_eq!(renderer.statuses.last().unwrap().text, "Desktop");
        assert_eq!(sound.plays, 0);
    }

    #[test]
    fn test_alert_holds_status_line() {
        let store = SharedTelemetryStore::new();
        store.publish(TelemetrySnapshot::Readings(HardwareReadings {
            cpu_temp: Some(92),
            ..Default::default()
        }));
        let mut refresh = RefreshLoop::default();
        let mut renderer = RecordingRenderer::default();
        let mut sound = CountingSound::default();
        let t0 = Instant::now();

        refresh.tick(&store, ctx(), &mut renderer, &mut sound, t0);
        assert_eq!(sound.plays, 1);
        assert_eq!(renderer.statuses.last().unwrap().text, "⚠ CPU 92°C");

        // Still inside the hold window: no status overwrite, no second beep
        renderer.statuses.clear();
        refresh.tick(&store, ctx(), &mut renderer, &mut sound, t0 + Duration::from_secs(2));
        assert!(renderer.statuses.is_empty());
        assert_eq!(sound.plays, 1);

        refresh.tick(&store, ctx(), &mut renderer, &mut sound, t0 + Duration::from_secs(12));
        assert_eq!(renderer.statuses.last().unwrap().text, "Desktop");
        assert_eq!(sound.plays, 1);
    }
}
