//! Edge-peek state machine
//!
//! While docked on the desktop layer the widget is hidden behind windows.
//! Touching the right screen edge undocks it and slides it in; once the
//! cursor leaves both the widget and the edge strip it slides back out and
//! redocks at its remembered position.
//!
//! The controller is pure: each call takes a [`PeekContext`] and returns the
//! window effects to apply plus when to tick next. Applying effects and
//! scheduling the tick is the caller's job.

use super::geometry::trigger_region;
use crate::core::constants::{PEEK_REVEAL_POLL_INTERVAL, PEEK_STEP_PX, PEEK_TICK_INTERVAL};
use deskmon_types::{Point, Rect, ScreenGeometry};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekState {
    Docked,
    SlidingIn,
    Revealed,
    SlidingOut,
}

/// Window change requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekEffect {
    /// Leave the desktop layer and go on top
    Undock,
    MoveTo(Point),
    /// Back to the desktop layer at this position
    Redock(Point),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeekTransition {
    pub effects: Vec<PeekEffect>,
    /// `None` ends the tick chain
    pub next_tick: Option<Duration>,
}

impl PeekTransition {
    fn idle() -> Self {
        Self::default()
    }

    fn new(effects: Vec<PeekEffect>, next_tick: Duration) -> Self {
        Self {
            effects,
            next_tick: Some(next_tick),
        }
    }
}

/// Inputs sampled by the caller at each step
#[derive(Debug, Clone, Copy)]
pub struct PeekContext {
    pub screen: ScreenGeometry,
    pub widget_size: (i32, i32),
    /// Where the window is right now
    pub widget_position: Point,
    /// A drag of the widget is in progress
    pub dragging: bool,
    pub docked_position: Point,
    pub cursor: Option<Point>,
    pub topmost: bool,
    pub peek_enabled: bool,
    /// No foreground window covers the docked position
    pub desktop_visible: bool,
}

#[derive(Debug)]
pub struct PeekController {
    state: PeekState,
    x: i32,
    y: i32,
    step: i32,
    tick_interval: Duration,
    reveal_poll: Duration,
}

impl Default for PeekController {
    fn default() -> Self {
        Self::new()
    }
}

impl PeekController {
    pub fn new() -> Self {
        Self {
            state: PeekState::Docked,
            x: 0,
            y: 0,
            step: PEEK_STEP_PX,
            tick_interval: PEEK_TICK_INTERVAL,
            reveal_poll: PEEK_REVEAL_POLL_INTERVAL,
        }
    }

    pub fn state(&self) -> PeekState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != PeekState::Docked
    }

    /// Current animated position (meaningful while active)
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn set_state(&mut self, next: PeekState) {
        if self.state != next {
            log::debug!("Peek {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Pointer touched the edge strip
    pub fn trigger_entered(&mut self, ctx: &PeekContext) -> PeekTransition {
        if self.state != PeekState::Docked {
            return PeekTransition::idle();
        }
        if !ctx.peek_enabled || ctx.topmost {
            return PeekTransition::idle();
        }
        if !ctx.desktop_visible {
            log::trace!("Peek suppressed: desktop covered at docked position");
            return PeekTransition::idle();
        }

        self.x = ctx.screen.right();
        self.y = ctx.docked_position.y;
        self.set_state(PeekState::SlidingIn);
        PeekTransition::new(
            vec![PeekEffect::Undock, PeekEffect::MoveTo(self.position())],
            self.tick_interval,
        )
    }

    /// Advance the animation by one frame
    pub fn tick(&mut self, ctx: &PeekContext) -> PeekTransition {
        if self.is_active() {
            // The window may have been dragged since the last frame
            self.x = ctx.widget_position.x;
            self.y = ctx.widget_position.y;
            if ctx.dragging {
                let wait = match self.state {
                    PeekState::Revealed => self.reveal_poll,
                    _ => self.tick_interval,
                };
                return PeekTransition::new(Vec::new(), wait);
            }
        }
        match self.state {
            PeekState::Docked => PeekTransition::idle(),
            PeekState::SlidingIn => {
                let target = ctx.screen.right() - ctx.widget_size.0;
                self.x -= self.step;
                if self.x <= target {
                    self.x = target;
                    self.set_state(PeekState::Revealed);
                    PeekTransition::new(vec![PeekEffect::MoveTo(self.position())], self.reveal_poll)
                } else {
                    PeekTransition::new(vec![PeekEffect::MoveTo(self.position())], self.tick_interval)
                }
            }
            PeekState::Revealed => {
                if ctx.peek_enabled && self.cursor_holds(ctx) {
                    PeekTransition::new(Vec::new(), self.reveal_poll)
                } else {
                    self.set_state(PeekState::SlidingOut);
                    PeekTransition::new(Vec::new(), self.tick_interval)
                }
            }
            PeekState::SlidingOut => {
                let target = ctx.screen.right();
                self.x += self.step;
                if self.x >= target {
                    self.x = target;
                    self.set_state(PeekState::Docked);
                    PeekTransition {
                        effects: vec![
                            PeekEffect::MoveTo(self.position()),
                            PeekEffect::Redock(ctx.docked_position),
                        ],
                        next_tick: None,
                    }
                } else {
                    PeekTransition::new(vec![PeekEffect::MoveTo(self.position())], self.tick_interval)
                }
            }
        }
    }

    fn cursor_holds(&self, ctx: &PeekContext) -> bool {
        let Some(cursor) = ctx.cursor else {
            return false;
        };
        let widget = Rect::new(
            ctx.widget_position.x,
            ctx.widget_position.y,
            ctx.widget_size.0,
            ctx.widget_size.1,
        );
        widget.contains(cursor) || trigger_region(ctx.screen).contains(cursor)
    }

    /// Abandon the cycle without animating; `true` if one was running.
    ///
    /// The caller restores the remembered position.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.set_state(PeekState::Docked);
        was_active
    }

    /// Start sliding out right away (peek was switched off)
    pub fn force_slide_out(&mut self) -> PeekTransition {
        match self.state {
            PeekState::Revealed | PeekState::SlidingIn => {
                self.set_state(PeekState::SlidingOut);
                PeekTransition::new(Vec::new(), self.tick_interval)
            }
            _ => PeekTransition::idle(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PeekContext {
        PeekContext {
            screen: ScreenGeometry::new(0, 0, 1920, 1080),
            widget_size: (180, 260),
            widget_position: Point::new(300, 40),
            dragging: false,
            docked_position: Point::new(300, 40),
            cursor: Some(Point::new(1919, 500)),
            topmost: false,
            peek_enabled: true,
            desktop_visible: true,
        }
    }

    /// Apply window moves the way the app does
    fn follow(ctx: &mut PeekContext, t: &PeekTransition) {
        for effect in &t.effects {
            if let PeekEffect::MoveTo(p) = effect {
                ctx.widget_position = *p;
            }
        }
    }

    /// Tick until the chain ends or the state changes; returns tick count
    fn run_until_state_change(
        peek: &mut PeekController,
        ctx: &mut PeekContext,
    ) -> (usize, PeekTransition) {
        let start = peek.state();
        for n in 1..=1000 {
            let t = peek.tick(ctx);
            follow(ctx, &t);
            if peek.state() != start || t.next_tick.is_none() {
                return (n, t);
            }
        }
        panic!("animation never finished");
    }

    fn revealed(c: &mut PeekContext) -> PeekController {
        let mut peek = PeekController::new();
        let t = peek.trigger_entered(c);
        follow(c, &t);
        run_until_state_change(&mut peek, c);
        assert_eq!(peek.state(), PeekState::Revealed);
        peek
    }

    #[test]
    fn test_trigger_starts_slide_in_from_right_edge() {
        let mut peek = PeekController::new();
        let t = peek.trigger_entered(&ctx());
        assert_eq!(peek.state(), PeekState::SlidingIn);
        assert_eq!(
            t.effects,
            vec![PeekEffect::Undock, PeekEffect::MoveTo(Point::new(1920, 40))]
        );
        assert_eq!(t.next_tick, Some(PEEK_TICK_INTERVAL));
    }

    #[test]
    fn test_no_peek_when_topmost_disabled_or_covered() {
        let mut peek = PeekController::new();

        let topmost = PeekContext { topmost: true, ..ctx() };
        assert_eq!(peek.trigger_entered(&topmost), PeekTransition::default());

        let covered = PeekContext { desktop_visible: false, ..ctx() };
        assert_eq!(peek.trigger_entered(&covered), PeekTransition::default());

        let disabled = PeekContext { peek_enabled: false, ..ctx() };
        assert_eq!(peek.trigger_entered(&disabled), PeekTransition::default());

        assert_eq!(peek.state(), PeekState::Docked);
    }

    #[test]
    fn test_slide_in_is_bounded_and_exact() {
        for width in [180, 190, 7] {
            let mut c = PeekContext { widget_size: (width, 260), ..ctx() };
            let mut peek = PeekController::new();
            let t = peek.trigger_entered(&c);
            follow(&mut c, &t);

            let (ticks, last) = run_until_state_change(&mut peek, &mut c);
            let expected = (width + PEEK_STEP_PX - 1) / PEEK_STEP_PX;
            assert_eq!(ticks as i32, expected, "width {}", width);
            assert_eq!(peek.state(), PeekState::Revealed);
            assert_eq!(last.effects, vec![PeekEffect::MoveTo(Point::new(1920 - width, 40))]);
            assert_eq!(last.next_tick, Some(PEEK_REVEAL_POLL_INTERVAL));
        }
    }

    #[test]
    fn test_revealed_holds_while_cursor_on_widget_or_edge() {
        let mut c = ctx();
        let mut peek = revealed(&mut c);

        let on_widget = PeekContext { cursor: Some(Point::new(1800, 100)), ..c };
        let t = peek.tick(&on_widget);
        assert_eq!(peek.state(), PeekState::Revealed);
        assert!(t.effects.is_empty());

        // On the edge strip, below the widget
        let on_edge = PeekContext { cursor: Some(Point::new(1919, 900)), ..c };
        peek.tick(&on_edge);
        assert_eq!(peek.state(), PeekState::Revealed);
    }

    #[test]
    fn test_full_cycle_redocks_at_remembered_position() {
        let mut c = ctx();
        let mut peek = revealed(&mut c);

        let mut away = PeekContext { cursor: Some(Point::new(600, 600)), ..c };
        peek.tick(&away);
        assert_eq!(peek.state(), PeekState::SlidingOut);

        let (ticks, last) = run_until_state_change(&mut peek, &mut away);
        assert_eq!(ticks, 9);
        assert_eq!(peek.state(), PeekState::Docked);
        assert_eq!(
            last.effects,
            vec![
                PeekEffect::MoveTo(Point::new(1920, 40)),
                PeekEffect::Redock(Point::new(300, 40)),
            ]
        );
        assert_eq!(last.next_tick, None);
    }

    #[test]
    fn test_hold_follows_dragged_window() {
        let mut c = ctx();
        let mut peek = revealed(&mut c);

        // Mid-drag: no frames, just keep polling
        let dragging = PeekContext {
            widget_position: Point::new(1200, 450),
            cursor: Some(Point::new(1210, 460)),
            dragging: true,
            ..c
        };
        let t = peek.tick(&dragging);
        assert_eq!(peek.state(), PeekState::Revealed);
        assert_eq!(t, PeekTransition::new(Vec::new(), PEEK_REVEAL_POLL_INTERVAL));

        // Released, cursor still on the moved window
        let dropped = PeekContext { dragging: false, ..dragging };
        peek.tick(&dropped);
        assert_eq!(peek.state(), PeekState::Revealed);

        // Leaving slides out from where the window now is
        let away = PeekContext { cursor: Some(Point::new(10, 10)), ..dropped };
        peek.tick(&away);
        assert_eq!(peek.state(), PeekState::SlidingOut);
        let t = peek.tick(&away);
        assert_eq!(t.effects, vec![PeekEffect::MoveTo(Point::new(1220, 450))]);
    }

    #[test]
    fn test_drag_pauses_slide_in() {
        let mut c = ctx();
        let mut peek = PeekController::new();
        let t = peek.trigger_entered(&c);
        follow(&mut c, &t);

        let dragging = PeekContext { dragging: true, ..c };
        let t = peek.tick(&dragging);
        assert!(t.effects.is_empty());
        assert_eq!(t.next_tick, Some(PEEK_TICK_INTERVAL));
        assert_eq!(peek.state(), PeekState::SlidingIn);
    }

    #[test]
    fn test_cancel_returns_to_docked_without_effects() {
        let mut c = ctx();
        let mut peek = PeekController::new();
        let t = peek.trigger_entered(&c);
        follow(&mut c, &t);
        peek.tick(&c);

        assert!(peek.cancel());
        assert_eq!(peek.state(), PeekState::Docked);
        assert!(!peek.cancel());
        assert_eq!(peek.tick(&c), PeekTransition::default());
    }

    #[test]
    fn test_force_slide_out_from_revealed() {
        let mut peek = PeekController::new();
        assert_eq!(peek.force_slide_out(), PeekTransition::default());

        let mut c = ctx();
        let mut peek = revealed(&mut c);
        let t = peek.force_slide_out();
        assert_eq!(peek.state(), PeekState::SlidingOut);
        assert_eq!(t.next_tick, Some(PEEK_TICK_INTERVAL));
    }

    #[test]
    fn test_disabled_peek_does_not_hold_revealed() {
        let mut c = ctx();
        let mut peek = revealed(&mut c);

        let disabled = PeekContext { peek_enabled: false, ..c };
        peek.tick(&disabled);
        assert_eq!(peek.state(), PeekState::SlidingOut);
    }
}
