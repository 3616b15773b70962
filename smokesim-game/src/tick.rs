//! Periodic aging and lifestyle decay.
use log::debug;

use crate::actions::SimRules;
use crate::events::{Feedback, Transition};
use crate::messages::MessageCategory;
use crate::mortality;
use crate::rng::{RandomSource, RngBundle};
use crate::state::{SimState, TerminalCause};

impl SimRules {
    /// Advance one time quantum. `now_ms` is the clock the idle time is
    /// measured against.
    pub fn tick(&self, state: &mut SimState, rng: &mut RngBundle, now_ms: i64) -> Transition {
        if state.is_terminal {
            return Transition::ignored();
        }

        let aging = &self.config.aging;
        let decay = &self.config.decay;
        let mut out = Transition::applied();

        state.advance_ages(aging.months_per_tick, 0.0);
        let mut acceleration = aging.months_per_tick;

        state.adjust_hunger(decay.hunger_gain);
        state.adjust_sedentary(decay.sedentary_gain);

        let hunger = state.hunger_level;
        if hunger > decay.malnutrition_hunger && hunger <= decay.starvation_hunger {
            state.adjust_stamina(-decay.malnutrition_stamina_loss);
        }
        if hunger > decay.starvation_hunger {
            acceleration += aging.bio_penalty_hunger;
            state.adjust_stamina(-decay.starvation_stamina_loss);
        }
        if hunger >= decay.terminal_hunger {
            state.adjust_stamina(-decay.terminal_stamina_loss);
            if state.stamina <= 0.0 {
                mortality::kill(state, TerminalCause::starvation(), &mut out);
                return out;
            }
        }

        if state.sedentary_level > decay.sedentary_threshold {
            acceleration += aging.bio_penalty_inactivity;
        }
        state.advance_ages(0.0, acceleration);

        let idle_ms = now_ms.saturating_sub(state.last_interaction_ms);
        let recovered = self.passive_recovery(state, idle_ms);

        state.adjust_toxicity(-decay.toxicity_decay);

        self.evaluate_mortality(state, rng, &mut out);
        if state.is_terminal {
            return out;
        }

        self.nudges(state, rng, idle_ms, recovered, &mut out);
        debug!(
            "tick: chrono {:.0} bio {:.0} stamina {:.1} hunger {:.0}",
            state.chronological_age_months,
            state.biological_age_months,
            state.stamina,
            state.hunger_level
        );
        out
    }

    fn passive_recovery(&self, state: &mut SimState, idle_ms: i64) -> bool {
        let applies = idle_ms > self.config.timing.passive_recovery_delay_ms
            && state.stamina < crate::constants::STAT_MAX
            && state.hunger_level < self.config.thresholds.passive_recovery_max_hunger;
        if applies {
            state.adjust_stamina(self.config.wellness.passive_recovery_rate);
        }
        applies
    }

    /// Presentation-only lines drawn from the flavor stream.
    fn nudges(
        &self,
        state: &SimState,
        rng: &mut RngBundle,
        idle_ms: i64,
        recovered: bool,
        out: &mut Transition,
    ) {
        let timing = &self.config.timing;
        let thresholds = &self.config.thresholds;
        let crossed = |threshold: i64| {
            idle_ms > threshold && idle_ms.saturating_sub(timing.tick_interval_ms) <= threshold
        };

        if recovered && crossed(timing.passive_recovery_delay_ms) {
            let message = self.bank.pick(MessageCategory::PassiveRecovery, rng.flavor());
            out.feedback(Feedback::info(MessageCategory::PassiveRecovery, message));
        }
        if state.addiction_level > thresholds.craving_addiction
            && crossed(timing.craving_threshold_ms)
        {
            let message = self.bank.pick(MessageCategory::Craving, rng.flavor());
            out.feedback(Feedback::warning(MessageCategory::Craving, message));
        }
        if state.hunger_level > self.config.decay.starvation_hunger
            && rng.flavor().next_uniform() < thresholds.lifestyle_warning_chance
        {
            let message = self.bank.pick(MessageCategory::Hunger, rng.flavor());
            out.feedback(Feedback::warning(MessageCategory::Hunger, message));
        }
        if state.sedentary_level > self.config.decay.sedentary_threshold
            && rng.flavor().next_uniform() < thresholds.lifestyle_warning_chance
        {
            let message = self.bank.pick(MessageCategory::Inactivity, rng.flavor());
            out.feedback(Feedback::warning(MessageCategory::Inactivity, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SimEvent;
    use crate::rng::ScriptedSource;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    /// Outcome draws never kill; flavor draws never trigger lifestyle warnings.
    fn calm_rng() -> RngBundle {
        RngBundle::with_sources(
            Box::new(ScriptedSource::constant(0.99)),
            Box::new(ScriptedSource::constant(0.99)),
        )
    }

    #[test]
    fn plain_tick_ages_and_decays() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.toxicity_level = 12.0;
        let out = rules.tick(&mut state, &mut calm_rng(), 1_000);
        assert!(out.applied);
        assert!(approx(state.chronological_age_months, 217.0));
        assert!(approx(state.biological_age_months, 217.0));
        assert!(approx(state.hunger_level, 2.0));
        assert!(approx(state.sedentary_level, 1.0));
        assert!(approx(state.toxicity_level, 7.0));
        assert!(approx(state.stamina, 100.0));
        assert!(out.events.is_empty());
    }

    #[test]
    fn malnutrition_drains_slowly() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.hunger_level = 60.0;
        state.stamina = 50.0;
        rules.tick(&mut state, &mut calm_rng(), 0);
        assert!(approx(state.stamina, 49.8));
        assert!(approx(state.biological_age_months, 217.0));
    }

    #[test]
    fn severe_starvation_accelerates_aging() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.hunger_level = 85.0;
        state.stamina = 50.0;
        rules.tick(&mut state, &mut calm_rng(), 0);
        assert!(approx(state.stamina, 49.0));
        assert!(approx(state.biological_age_months, 218.0));
    }

    #[test]
    fn terminal_starvation_kills_before_bio_advances() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.hunger_level = 100.0;
        state.stamina = 3.0;
        let out = rules.tick(&mut state, &mut calm_rng(), 0);
        assert!(state.is_terminal);
        assert!(state.stamina.abs() < 1e-9);
        assert_eq!(out.died().unwrap().id, "starvation");
        assert!(approx(state.chronological_age_months, 217.0));
        assert!(approx(state.biological_age_months, 216.0));
    }

    #[test]
    fn terminal_starvation_survivable_with_stamina() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.hunger_level = 100.0;
        state.stamina = 40.0;
        state.sedentary_level = 90.0;
        rules.tick(&mut state, &mut calm_rng(), 0);
        assert!(!state.is_terminal);
        assert!(approx(state.stamina, 34.0));
        assert!(approx(state.biological_age_months, 218.5));
    }

    #[test]
    fn passive_recovery_needs_idle_and_food() {
        let rules = SimRules::default();
        let mut idle = SimState::new(216.0, 0);
        idle.stamina = 80.0;
        let out = rules.tick(&mut idle, &mut calm_rng(), 5_500);
        assert!(approx(idle.stamina, 82.0));
        assert_eq!(
            out.last_feedback().unwrap().category,
            MessageCategory::PassiveRecovery
        );

        // keeps recovering without repeating the line
        let out = rules.tick(&mut idle, &mut calm_rng(), 6_500);
        assert!(approx(idle.stamina, 84.0));
        assert!(out.last_feedback().is_none());

        let mut busy = SimState::new(216.0, 3_000);
        busy.stamina = 80.0;
        rules.tick(&mut busy, &mut calm_rng(), 5_500);
        assert!(approx(busy.stamina, 80.0));

        let mut hungry = SimState::new(216.0, 0);
        hungry.stamina = 80.0;
        hungry.hunger_level = 48.0;
        rules.tick(&mut hungry, &mut calm_rng(), 60_000);
        assert!(approx(hungry.stamina, 80.0));
    }

    #[test]
    fn craving_fires_once_when_idle_crosses_threshold() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.addiction_level = 60.0;
        let out = rules.tick(&mut state, &mut calm_rng(), 5_200);
        assert!(out.events.iter().any(|event| matches!(
            event,
            SimEvent::Feedback(feedback) if feedback.category == MessageCategory::Craving
        )));
        let out = rules.tick(&mut state, &mut calm_rng(), 6_200);
        assert!(out.events.is_empty());
    }

    #[test]
    fn lifestyle_warnings_roll_on_flavor_stream() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 10_000);
        state.hunger_level = 90.0;
        state.sedentary_level = 90.0;
        let mut rng = RngBundle::with_sources(
            Box::new(ScriptedSource::constant(0.99)),
            Box::new(ScriptedSource::constant(0.0)),
        );
        let out = rules.tick(&mut state, &mut rng, 10_000);
        let categories: Vec<MessageCategory> = out
            .events
            .iter()
            .filter_map(SimEvent::feedback)
            .map(|feedback| feedback.category)
            .collect();
        assert_eq!(
            categories,
            vec![MessageCategory::Hunger, MessageCategory::Inactivity]
        );
        assert_eq!(rng.outcome().draws(), 0);
    }

    #[test]
    fn ticks_run_while_incapacitated_but_not_when_terminal() {
        let rules = SimRules::default();
        let mut collapsed = SimState::new(216.0, 0);
        collapsed.is_incapacitated = true;
        assert!(rules.tick(&mut collapsed, &mut calm_rng(), 0).applied);
        assert!(approx(collapsed.chronological_age_months, 217.0));

        let mut dead = SimState::new(216.0, 0);
        dead.is_terminal = true;
        let snapshot = dead.clone();
        assert!(!rules.tick(&mut dead, &mut calm_rng(), 0).applied);
        assert_eq!(dead, snapshot);
    }

    #[test]
    fn lifespan_ceiling_reached_by_ticking() {
        let rules = SimRules::default();
        let mut state = SimState::new(216.0, 0);
        state.biological_age_months = 959.5;
        let out = rules.tick(&mut state, &mut calm_rng(), 0);
        assert_eq!(out.died().unwrap().id, "natural_causes");
    }
}
