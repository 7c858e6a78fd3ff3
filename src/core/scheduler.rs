//! UI-thread timer queue
//!
//! Every periodic or delayed action on the UI thread goes through here. A
//! task kind has at most one pending deadline: scheduling it again replaces
//! the old one, which is what keeps refresh and animation ticks from
//! stacking up.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Deferred UI-thread actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiTask {
    Refresh,
    Embed,
    PeekTick,
    GeometryPoll,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: HashMap<UiTask, (Instant, u64)>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` at `now + delay`, replacing any pending run of it
    pub fn schedule(&mut self, task: UiTask, now: Instant, delay: Duration) {
        self.schedule_at(task, now + delay);
    }

    pub fn schedule_at(&mut self, task: UiTask, deadline: Instant) {
        self.seq += 1;
        if self.pending.insert(task, (deadline, self.seq)).is_some() {
            log::trace!("Rescheduled {:?}", task);
        }
    }

    /// Drop the pending run of `task`; `true` if there was one
    pub fn cancel(&mut self, task: UiTask) -> bool {
        self.pending.remove(&task).is_some()
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending UI task(s)", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_pending(&self, task: UiTask) -> bool {
        self.pending.contains_key(&task)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(deadline, _)| *deadline).min()
    }

    /// Remove and return the earliest task due at `now`.
    ///
    /// Equal deadlines come out in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<UiTask> {
        let task = self
            .pending
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .min_by_key(|(_, key)| **key)
            .map(|(task, _)| *task)?;
        self.pending.remove(&task);
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_pop_due_in_deadline_order() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(UiTask::GeometryPoll, t0, 30 * MS);
        s.schedule(UiTask::Refresh, t0, 10 * MS);
        s.schedule(UiTask::Embed, t0, 20 * MS);

        assert_eq!(s.pop_due(t0), None);
        assert_eq!(s.next_deadline(), Some(t0 + 10 * MS));

        let later = t0 + 50 * MS;
        assert_eq!(s.pop_due(later), Some(UiTask::Refresh));
        assert_eq!(s.pop_due(later), Some(UiTask::Embed));
        assert_eq!(s.pop_due(later), Some(UiTask::GeometryPoll));
        assert_eq!(s.pop_due(later), None);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_equal_deadlines_keep_schedule_order() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule_at(UiTask::PeekTick, t0);
        s.schedule_at(UiTask::Refresh, t0);
        assert_eq!(s.pop_due(t0), Some(UiTask::PeekTick));
        assert_eq!(s.pop_due(t0), Some(UiTask::Refresh));
    }

    #[test]
    fn test_reschedule_replaces_pending_entry() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(UiTask::Refresh, t0, 10 * MS);
        s.schedule(UiTask::Refresh, t0, 500 * MS);

        assert_eq!(s.pop_due(t0 + 100 * MS), None);
        assert_eq!(s.pop_due(t0 + 500 * MS), Some(UiTask::Refresh));
        assert_eq!(s.pop_due(t0 + 500 * MS), None);
    }

    #[test]
    fn test_cancel_and_cancel_all() {
        let t0 = Instant::now();
        let mut s = Scheduler::new();
        s.schedule(UiTask::PeekTick, t0, MS);
        s.schedule(UiTask::Refresh, t0, MS);

        assert!(s.cancel(UiTask::PeekTick));
        assert!(!s.cancel(UiTask::PeekTick));
        assert!(s.is_pending(UiTask::Refresh));

        s.cancel_all();
        assert!(!s.is_pending(UiTask::Refresh));
        assert_eq!(s.pop_due(t0 + 10 * MS), None);
    }
}
