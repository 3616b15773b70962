use log::debug;
use serde::{Deserialize, Serialize};
use smokesim_game::{
    Intent, MessageCategory, RunSummary, SimEvent, SimRules, SimSession, SimState, Transition,
};

use super::policy::LifestylePolicy;

/// One accelerated life: which lifestyle, which seed, how long at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub policy: LifestylePolicy,
    pub seed: u64,
    /// Virtual time between two policy decisions.
    pub decision_interval_ms: i64,
    /// Virtual time after which a still-living session is abandoned.
    pub limit_ms: i64,
}

impl RunPlan {
    #[must_use]
    pub const fn new(policy: LifestylePolicy, seed: u64) -> Self {
        Self {
            policy,
            seed,
            decision_interval_ms: 500,
            limit_ms: 30 * 60 * 1_000,
        }
    }

    #[must_use]
    pub const fn with_limits(mut self, decision_interval_ms: i64, limit_ms: i64) -> Self {
        self.decision_interval_ms = decision_interval_ms;
        self.limit_ms = limit_ms;
        self
    }
}

/// Counters collected while a life plays out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTally {
    pub consumes: u32,
    pub meals: u32,
    pub workouts: u32,
    pub refusals: u32,
    pub ignored: u32,
    pub collapses: u32,
    pub feedback_lines: u32,
}

impl ActionTally {
    fn record_events(&mut self, events: &[SimEvent]) {
        for event in events {
            match event {
                SimEvent::Collapsed { .. } => self.collapses += 1,
                SimEvent::Feedback(feedback) => {
                    self.feedback_lines += 1;
                    if feedback.category == MessageCategory::Refusal {
                        self.refusals += 1;
                    }
                }
                _ => {}
            }
        }
    }

    fn record_intent(&mut self, intent: Intent, transition: &Transition) {
        if !transition.applied {
            self.ignored += 1;
            return;
        }
        match intent {
            Intent::Consume if !transition.collapsed() => self.consumes += 1,
            Intent::HealEat if !has_refusal(transition) => self.meals += 1,
            Intent::Exercise => self.workouts += 1,
            _ => {}
        }
    }
}

fn has_refusal(transition: &Transition) -> bool {
    transition
        .last_feedback()
        .is_some_and(|feedback| feedback.category == MessageCategory::Refusal)
}

/// Outcome of one [`RunPlan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeRecord {
    pub policy: LifestylePolicy,
    pub seed: u64,
    pub elapsed_ms: i64,
    pub summary: RunSummary,
    pub tally: ActionTally,
    pub final_state: SimState,
}

impl LifeRecord {
    #[must_use]
    pub const fn ended(&self) -> bool {
        self.final_state.is_terminal
    }
}

/// Play one life on a virtual clock.
#[must_use]
pub fn run_life(rules: &SimRules, plan: &RunPlan) -> LifeRecord {
    let mut session = SimSession::new(rules.clone(), plan.seed, 0);
    let mut policy = plan.policy.create_policy(plan.seed);
    let mut tally = ActionTally::default();
    let step = plan.decision_interval_ms.max(1);
    let mut now = 0_i64;

    while now < plan.limit_ms {
        now = now.saturating_add(step);
        let events = session.advance_to(now);
        tally.record_events(&events);
        if session.state().is_terminal {
            break;
        }
        if let Some(intent) = policy.decide(session.state(), now) {
            let transition = session.dispatch(intent);
            tally.record_intent(intent, &transition);
            tally.record_events(&transition.events);
            if session.state().is_terminal {
                break;
            }
        }
    }
    session.shutdown();

    debug!(
        "{} seed {} finished at {}ms (terminal={})",
        policy.name(),
        plan.seed,
        now,
        session.state().is_terminal
    );
    let final_state = session.into_state();
    LifeRecord {
        policy: plan.policy,
        seed: plan.seed,
        elapsed_ms: now,
        summary: RunSummary::from_state(&final_state),
        tally,
        final_state,
    }
}
