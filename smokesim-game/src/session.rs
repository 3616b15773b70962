use log::debug;
use serde::{Deserialize, Serialize};

use crate::actions::SimRules;
use crate::events::{Feedback, SimEvent, Transition};
use crate::rng::RngBundle;
use crate::scheduler::{Scheduler, TaskKind};
use crate::state::SimState;

/// Zero-argument user commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Consume,
    HealEat,
    Exercise,
    Reset,
}

/// Owns one life: state, rules, random streams and timers.
///
/// Adapters feed wall-clock time through [`SimSession::advance_to`] and user
/// commands through [`SimSession::dispatch`]; both return the events to render.
#[derive(Debug)]
pub struct SimSession {
    rules: SimRules,
    state: SimState,
    rng: RngBundle,
    scheduler: Scheduler,
    active_feedback: Option<Feedback>,
}

impl SimSession {
    /// Fresh life at `now_ms` with seeded random streams.
    #[must_use]
    pub fn new(rules: SimRules, seed: u64, now_ms: i64) -> Self {
        let state = rules.fresh_state(now_ms);
        Self::from_state(state, rules, RngBundle::from_user_seed(seed), now_ms)
    }

    /// Resume a hydrated state. A pending collapse gets a fresh recovery timer.
    #[must_use]
    pub fn from_state(state: SimState, rules: SimRules, rng: RngBundle, now_ms: i64) -> Self {
        let mut session = Self {
            rules,
            state,
            rng,
            scheduler: Scheduler::new(now_ms),
            active_feedback: None,
        };
        if !session.state.is_terminal {
            session.start_ticking();
            if session.state.is_incapacitated {
                let delay = session.rules.config.timing.collapse_recovery_ms;
                session.scheduler.schedule_once(TaskKind::CollapseRecovery, delay);
            }
        }
        session
    }

    /// Apply a user command at the session clock.
    pub fn dispatch(&mut self, intent: Intent) -> Transition {
        let now_ms = self.scheduler.now_ms();
        let transition = match intent {
            Intent::Consume => self.rules.consume(&mut self.state, &mut self.rng, now_ms),
            Intent::HealEat => self.rules.heal(&mut self.state, &mut self.rng, now_ms),
            Intent::Exercise => self.rules.exercise(&mut self.state, &mut self.rng, now_ms),
            Intent::Reset => self.rules.reset(&mut self.state, now_ms),
        };
        debug!(
            "dispatch {intent:?} at {now_ms}: applied={} events={}",
            transition.applied,
            transition.events.len()
        );
        self.absorb(&transition);
        transition
    }

    /// Fire every timer due up to `now_ms`, in order.
    pub fn advance_to(&mut self, now_ms: i64) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while let Some(task) = self.scheduler.pop_due(now_ms) {
            let transition = match task.kind {
                TaskKind::Tick => self.rules.tick(&mut self.state, &mut self.rng, task.due_ms),
                TaskKind::CollapseRecovery => self.rules.recover_from_collapse(&mut self.state),
                TaskKind::FeedbackExpiry => self.expire_feedback(),
            };
            self.absorb(&transition);
            events.extend(transition.events);
        }
        self.scheduler.advance_clock(now_ms);
        events
    }

    /// Stop every timer. The state stays readable.
    pub fn shutdown(&mut self) {
        self.scheduler.cancel_all();
    }

    #[must_use]
    pub const fn state(&self) -> &SimState {
        &self.state
    }

    #[must_use]
    pub const fn rules(&self) -> &SimRules {
        &self.rules
    }

    #[must_use]
    pub const fn active_feedback(&self) -> Option<&Feedback> {
        self.active_feedback.as_ref()
    }

    #[must_use]
    pub const fn now_ms(&self) -> i64 {
        self.scheduler.now_ms()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_pending(TaskKind::Tick)
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn into_state(self) -> SimState {
        self.state
    }

    fn start_ticking(&mut self) {
        let period = self.rules.config.timing.tick_interval_ms;
        self.scheduler.schedule_repeating(TaskKind::Tick, period);
    }

    fn expire_feedback(&mut self) -> Transition {
        if self.active_feedback.take().is_none() {
            return Transition::ignored();
        }
        let mut out = Transition::applied();
        out.push(SimEvent::FeedbackCleared);
        out
    }

    /// Route timer side effects of a transition.
    fn absorb(&mut self, transition: &Transition) {
        let timing = &self.rules.config.timing;
        for event in &transition.events {
            match event {
                SimEvent::Collapsed { recover_after_ms } => {
                    self.scheduler
                        .schedule_once(TaskKind::CollapseRecovery, *recover_after_ms);
                }
                SimEvent::Died { .. } => {
                    self.scheduler.cancel(TaskKind::Tick);
                    self.scheduler.cancel(TaskKind::CollapseRecovery);
                }
                SimEvent::Reset => {
                    self.scheduler.cancel(TaskKind::CollapseRecovery);
                    self.scheduler
                        .schedule_repeating(TaskKind::Tick, timing.tick_interval_ms);
                }
                SimEvent::Feedback(_)
                | SimEvent::Effect(_)
                | SimEvent::Recovered
                | SimEvent::FeedbackCleared => {}
            }
        }
        if let Some(feedback) = transition.last_feedback() {
            self.active_feedback = Some(feedback.clone());
            self.scheduler
                .schedule_once(TaskKind::FeedbackExpiry, timing.message_duration_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Message, MessageCategory};
    use crate::rng::ScriptedSource;

    fn calm_session() -> SimSession {
        let rules = SimRules::default();
        let state = rules.fresh_state(0);
        let rng = RngBundle::with_sources(
            Box::new(ScriptedSource::constant(0.99)),
            Box::new(ScriptedSource::constant(0.99)),
        );
        SimSession::from_state(state, rules, rng, 0)
    }

    #[test]
    fn ticks_follow_the_clock() {
        let mut session = calm_session();
        assert!(session.is_ticking());
        session.advance_to(10_500);
        assert!((session.state().chronological_age_months - 226.0).abs() < 1e-9);
        assert_eq!(session.now_ms(), 10_500);
    }

    #[test]
    fn feedback_expires_after_message_duration() {
        let mut session = calm_session();
        session.dispatch(Intent::Consume);
        assert_eq!(
            session.active_feedback().unwrap().category,
            MessageCategory::HarmfulAction
        );
        let events = session.advance_to(3_999);
        assert!(!events.contains(&SimEvent::FeedbackCleared));
        assert!(session.active_feedback().is_some());
        let events = session.advance_to(4_000);
        assert!(events.contains(&SimEvent::FeedbackCleared));
        assert!(session.active_feedback().is_none());
    }

    #[test]
    fn newer_feedback_restarts_expiry() {
        let mut session = calm_session();
        session.dispatch(Intent::Consume);
        session.advance_to(3_000);
        session.dispatch(Intent::Exercise);
        session.advance_to(5_000);
        assert_eq!(
            session.active_feedback().unwrap().category,
            MessageCategory::Exercise
        );
        session.advance_to(7_000);
        assert!(session.active_feedback().is_none());
    }

    #[test]
    fn collapse_recovers_on_timer() {
        let mut session = calm_session();
        for _ in 0..4 {
            session.dispatch(Intent::Consume);
        }
        assert!((session.state().toxicity_level - 100.0).abs() < 1e-9);
        let collapse = session.dispatch(Intent::Consume);
        assert!(collapse.collapsed());
        assert!(session.state().is_incapacitated);
        assert!(!session.dispatch(Intent::Consume).applied);

        let events = session.advance_to(4_000);
        assert!(events.contains(&SimEvent::Recovered));
        assert!(!session.state().is_incapacitated);
        // the 4000 tick fires before recovery, which then pins toxicity at 50
        assert!((session.state().toxicity_level - 50.0).abs() < 1e-9);
    }

    #[test]
    fn collapse_replaces_stale_consume_feedback() {
        let mut session = calm_session();
        for _ in 0..4 {
            session.dispatch(Intent::Consume);
        }
        session.advance_to(500);
        assert!(session.dispatch(Intent::Consume).collapsed());
        let feedback = session.active_feedback().unwrap();
        assert_eq!(feedback.category, MessageCategory::AcuteToxicity);
        assert_eq!(feedback.message, Message::collapse());
        assert_eq!(
            session.scheduler().due_at(TaskKind::FeedbackExpiry),
            Some(4_500)
        );
    }

    #[test]
    fn death_stops_ticks_and_reset_restarts_them() {
        let rules = SimRules::default();
        let mut state = rules.fresh_state(0);
        state.hunger_level = 100.0;
        state.stamina = 3.0;
        let mut session = SimSession::from_state(state, rules, RngBundle::scripted([], 0.99), 0);

        let events = session.advance_to(1_000);
        assert!(matches!(events.as_slice(), [SimEvent::Died { .. }]));
        assert!(!session.is_ticking());
        let frozen = session.state().clone();
        session.advance_to(60_000);
        assert_eq!(session.state(), &frozen);

        let reset = session.dispatch(Intent::Reset);
        assert!(reset.events.contains(&SimEvent::Reset));
        assert!(session.is_ticking());
        assert_eq!(session.scheduler().due_at(TaskKind::Tick), Some(61_000));
        assert_eq!(
            session.active_feedback().unwrap().category,
            MessageCategory::Life
        );
    }

    #[test]
    fn hydrated_collapse_gets_a_recovery_timer() {
        let rules = SimRules::default();
        let mut state = rules.fresh_state(0);
        state.is_incapacitated = true;
        let session = SimSession::from_state(state, rules, RngBundle::scripted([], 0.99), 500);
        assert_eq!(
            session.scheduler().due_at(TaskKind::CollapseRecovery),
            Some(4_500)
        );
    }

    #[test]
    fn shutdown_cancels_timers() {
        let mut session = calm_session();
        session.shutdown();
        assert!(!session.is_ticking());
        let before = session.state().clone();
        session.advance_to(100_000);
        assert_eq!(session.state(), &before);
    }
}
