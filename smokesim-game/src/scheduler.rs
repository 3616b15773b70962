//! Virtual-time timer queue.
//!
//! Holds at most one pending task per [`TaskKind`]. Scheduling a kind that is
//! already pending replaces it, so timers never stack. Tasks are released one
//! at a time by [`Scheduler::pop_due`] so the caller can cancel or reschedule
//! between firings.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Tick,
    CollapseRecovery,
    FeedbackExpiry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTask {
    due_ms: i64,
    period_ms: Option<i64>,
}

/// A task released by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTask {
    pub kind: TaskKind,
    pub due_ms: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: BTreeMap<TaskKind, PendingTask>,
    now_ms: i64,
}

impl Scheduler {
    #[must_use]
    pub fn new(now_ms: i64) -> Self {
        Self {
            pending: BTreeMap::new(),
            now_ms,
        }
    }

    /// Clock position of the last released task or `advance_clock` call.
    #[must_use]
    pub const fn now_ms(&self) -> i64 {
        self.now_ms
    }

    /// Fire `kind` every `period_ms`, first at `now + period_ms`.
    pub fn schedule_repeating(&mut self, kind: TaskKind, period_ms: i64) {
        let period_ms = period_ms.max(1);
        self.pending.insert(
            kind,
            PendingTask {
                due_ms: self.now_ms.saturating_add(period_ms),
                period_ms: Some(period_ms),
            },
        );
    }

    /// Fire `kind` once after `delay_ms`, replacing any pending instance.
    pub fn schedule_once(&mut self, kind: TaskKind, delay_ms: i64) {
        self.pending.insert(
            kind,
            PendingTask {
                due_ms: self.now_ms.saturating_add(delay_ms.max(0)),
                period_ms: None,
            },
        );
    }

    /// Returns whether a task was pending.
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        self.pending.remove(&kind).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.pending.contains_key(&kind)
    }

    #[must_use]
    pub fn due_at(&self, kind: TaskKind) -> Option<i64> {
        self.pending.get(&kind).map(|task| task.due_ms)
    }

    /// Earliest pending `(due, kind)`; ties go to the lower kind.
    #[must_use]
    pub fn peek_next(&self) -> Option<FiredTask> {
        self.pending
            .iter()
            .map(|(kind, task)| FiredTask {
                kind: *kind,
                due_ms: task.due_ms,
            })
            .min_by_key(|fired| (fired.due_ms, fired.kind))
    }

    /// Release the earliest task due at or before `until_ms`, moving the clock
    /// to its due time. Repeating tasks are re-armed one period later.
    pub fn pop_due(&mut self, until_ms: i64) -> Option<FiredTask> {
        let next = self.peek_next().filter(|fired| fired.due_ms <= until_ms)?;
        self.now_ms = self.now_ms.max(next.due_ms);
        if let Some(task) = self.pending.get_mut(&next.kind) {
            match task.period_ms {
                Some(period) => task.due_ms = task.due_ms.saturating_add(period),
                None => {
                    self.pending.remove(&next.kind);
                }
            }
        }
        Some(next)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock(&mut self, now_ms: i64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until_ms: i64) -> Vec<FiredTask> {
        let mut fired = Vec::new();
        while let Some(task) = scheduler.pop_due(until_ms) {
            fired.push(task);
        }
        scheduler.advance_clock(until_ms);
        fired
    }

    #[test]
    fn repeating_task_fires_each_period() {
        let mut scheduler = Scheduler::new(0);
        scheduler.schedule_repeating(TaskKind::Tick, 1_000);
        let fired = drain(&mut scheduler, 3_500);
        let dues: Vec<i64> = fired.iter().map(|task| task.due_ms).collect();
        assert_eq!(dues, vec![1_000, 2_000, 3_000]);
        assert_eq!(scheduler.due_at(TaskKind::Tick), Some(4_000));
        assert_eq!(scheduler.now_ms(), 3_500);
    }

    #[test]
    fn one_shot_replaces_instead_of_stacking() {
        let mut scheduler = Scheduler::new(0);
        scheduler.schedule_once(TaskKind::FeedbackExpiry, 4_000);
        scheduler.advance_clock(2_000);
        scheduler.schedule_once(TaskKind::FeedbackExpiry, 4_000);

        assert!(drain(&mut scheduler, 5_000).is_empty());
        let fired = drain(&mut scheduler, 6_000);
        assert_eq!(
            fired,
            vec![FiredTask {
                kind: TaskKind::FeedbackExpiry,
                due_ms: 6_000,
            }]
        );
        assert!(!scheduler.is_pending(TaskKind::FeedbackExpiry));
    }

    #[test]
    fn cancel_removes_pending_task() {
        let mut scheduler = Scheduler::new(0);
        scheduler.schedule_once(TaskKind::CollapseRecovery, 4_000);
        assert!(scheduler.cancel(TaskKind::CollapseRecovery));
        assert!(!scheduler.cancel(TaskKind::CollapseRecovery));
        assert!(drain(&mut scheduler, 10_000).is_empty());
    }

    #[test]
    fn ties_resolve_by_kind_order() {
        let mut scheduler = Scheduler::new(0);
        scheduler.schedule_once(TaskKind::FeedbackExpiry, 1_000);
        scheduler.schedule_once(TaskKind::CollapseRecovery, 1_000);
        scheduler.schedule_repeating(TaskKind::Tick, 1_000);
        let kinds: Vec<TaskKind> = drain(&mut scheduler, 1_000)
            .into_iter()
            .map(|task| task.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TaskKind::Tick,
                TaskKind::CollapseRecovery,
                TaskKind::FeedbackExpiry
            ]
        );
    }

    #[test]
    fn pop_due_moves_clock_to_task_time() {
        let mut scheduler = Scheduler::new(0);
        scheduler.schedule_repeating(TaskKind::Tick, 1_000);
        let task = scheduler.pop_due(10_000).unwrap();
        assert_eq!(task.due_ms, 1_000);
        assert_eq!(scheduler.now_ms(), 1_000);
        scheduler.schedule_once(TaskKind::CollapseRecovery, 500);
        assert_eq!(scheduler.due_at(TaskKind::CollapseRecovery), Some(1_500));
    }

    #[test]
    fn cancel_all_clears_everything() {
        let mut scheduler = Scheduler::new(0);
        scheduler.schedule_repeating(TaskKind::Tick, 1_000);
        scheduler.schedule_once(TaskKind::FeedbackExpiry, 10);
        scheduler.cancel_all();
        assert!(scheduler.peek_next().is_none());
    }
}
