//! User-triggered transitions: consume, eat, exercise, collapse and reset.
use log::{debug, info};

use crate::config::SimConfig;
use crate::constants::{STAT_MAX, VIBRATION_PATTERN_MS};
use crate::events::{EffectCue, Feedback, SimEvent, Transition};
use crate::messages::{Message, MessageBank, MessageCategory};
use crate::mortality::{self, MortalityTable};
use crate::rng::RngBundle;
use crate::state::SimState;

/// Everything a transition reads but never mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct SimRules {
    pub config: SimConfig,
    pub table: MortalityTable,
    pub bank: MessageBank,
}

impl Default for SimRules {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimRules {
    /// Rules with the embedded mortality table and message bank.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            table: MortalityTable::default_table().clone(),
            bank: MessageBank::default_bank().clone(),
        }
    }

    /// Fresh life at the configured start age.
    #[must_use]
    pub fn fresh_state(&self, now_ms: i64) -> SimState {
        SimState::new(self.config.aging.start_age_months, now_ms)
    }

    /// Multiplier on wellness gains: 1.0 when young, linear down to the floor.
    #[must_use]
    pub fn recovery_factor(&self, biological_age_months: f64) -> f64 {
        let aging = &self.config.aging;
        if biological_age_months <= aging.decay_start_months {
            return 1.0;
        }
        if biological_age_months >= aging.decay_end_months {
            return aging.min_recovery_factor;
        }
        let progress = (biological_age_months - aging.decay_start_months)
            / (aging.decay_end_months - aging.decay_start_months);
        1.0 - progress * (1.0 - aging.min_recovery_factor)
    }

    pub fn consume(&self, state: &mut SimState, rng: &mut RngBundle, now_ms: i64) -> Transition {
        if !state.accepts_actions() {
            return Transition::ignored();
        }
        if state.toxicity_level >= self.config.thresholds.toxicity_collapse {
            return self.collapse(state);
        }

        let dose = &self.config.dose;
        let aging = &self.config.aging;
        state.advance_ages(
            aging.real_age_per_action,
            aging.real_age_per_action + aging.bio_penalty_per_pack,
        );
        state.adjust_stamina(-dose.stamina_loss);
        state.adjust_addiction(dose.addiction_gain);
        state.adjust_toxicity(dose.toxicity_gain);
        state.units_consumed_total = state
            .units_consumed_total
            .saturating_add(dose.units_per_action);
        state.last_interaction_ms = now_ms;
        debug!(
            "consume: toxicity {:.0} addiction {:.0} bio {:.0}",
            state.toxicity_level, state.addiction_level, state.biological_age_months
        );

        let mut out = Transition::applied();
        out.cue(EffectCue::SmokePuff);

        mortality::active_risk_check(state, &self.config, &self.table, rng.outcome(), &mut out);
        if state.is_terminal {
            return out;
        }

        if state.toxicity_level > self.config.thresholds.toxicity_warning {
            let message = self.bank.pick(MessageCategory::AcuteToxicity, rng.flavor());
            out.feedback(Feedback::warning(MessageCategory::AcuteToxicity, message));
            out.cue(EffectCue::Shake);
        } else if state.age_gap_years() > self.config.thresholds.age_gap_message_years {
            out.feedback(Feedback::warning(
                MessageCategory::HarmfulAction,
                Message::age_gap(state.age_gap_years()),
            ));
        } else {
            let message = self.bank.pick(MessageCategory::HarmfulAction, rng.flavor());
            out.feedback(Feedback::info(MessageCategory::HarmfulAction, message));
        }
        out.cue(EffectCue::Vibrate {
            pattern_ms: VIBRATION_PATTERN_MS.to_vec(),
        });

        self.evaluate_mortality(state, rng, &mut out);
        out
    }

    /// Eat. Heavy addiction can refuse the meal outright.
    pub fn heal(&self, state: &mut SimState, rng: &mut RngBundle, now_ms: i64) -> Transition {
        if !state.accepts_wellness() {
            return Transition::ignored();
        }
        if self.refuses_wellness(state, rng) {
            debug!("heal refused at addiction {:.0}", state.addiction_level);
            return self.refusal(rng);
        }

        let factor = self.recovery_factor(state.biological_age_months);
        let wellness = &self.config.wellness;
        state.set_hunger(0.0);
        state.adjust_stamina(wellness.stamina_per_meal * factor);
        state.adjust_addiction(-wellness.addiction_loss_per_action);
        state.last_interaction_ms = now_ms;

        let mut out = Transition::applied();
        out.feedback(Feedback::info(
            MessageCategory::Recovery,
            Message::healthy_meal(),
        ));
        self.evaluate_mortality(state, rng, &mut out);
        out
    }

    pub fn exercise(&self, state: &mut SimState, rng: &mut RngBundle, now_ms: i64) -> Transition {
        if !state.accepts_wellness() {
            return Transition::ignored();
        }

        let factor = self.recovery_factor(state.biological_age_months);
        let wellness = &self.config.wellness;
        state.adjust_sedentary(-wellness.sedentary_loss_per_exercise);
        state.adjust_stamina(wellness.stamina_per_exercise * factor);
        state.adjust_toxicity(-wellness.toxicity_loss_per_exercise * factor);
        state.adjust_addiction(
            -wellness.exercise_addiction_multiplier * wellness.addiction_loss_per_action,
        );
        state.last_interaction_ms = now_ms;

        let mut out = Transition::applied();
        out.cue(EffectCue::Bounce);
        if factor < self.config.aging.lung_capacity_factor {
            out.feedback(Feedback::warning(
                MessageCategory::Exercise,
                Message::reduced_lung_capacity(),
            ));
        } else {
            let message = self.bank.pick(MessageCategory::Exercise, rng.flavor());
            out.feedback(Feedback::info(MessageCategory::Exercise, message));
        }
        self.evaluate_mortality(state, rng, &mut out);
        out
    }

    /// Acute toxicity saturation. The session owns the recovery timer.
    pub fn collapse(&self, state: &mut SimState) -> Transition {
        if state.is_terminal {
            return Transition::ignored();
        }
        info!("collapse at toxicity {:.0}", state.toxicity_level);
        state.is_incapacitated = true;
        let mut out = Transition::applied();
        out.push(SimEvent::Collapsed {
            recover_after_ms: self.config.timing.collapse_recovery_ms,
        });
        out.feedback(Feedback::warning(
            MessageCategory::AcuteToxicity,
            Message::collapse(),
        ));
        out
    }

    /// Fired by the collapse timer. A dead body stays down.
    pub fn recover_from_collapse(&self, state: &mut SimState) -> Transition {
        if state.is_terminal || !state.is_incapacitated {
            return Transition::ignored();
        }
        state.is_incapacitated = false;
        state.set_toxicity(self.config.thresholds.collapse_recovery_toxicity);
        let mut out = Transition::applied();
        out.push(SimEvent::Recovered);
        out
    }

    /// Start over at 18. Hunger and sedentary levels carry over.
    pub fn reset(&self, state: &mut SimState, now_ms: i64) -> Transition {
        let start = self.config.aging.start_age_months;
        state.chronological_age_months = start;
        state.biological_age_months = start;
        state.stamina = STAT_MAX;
        state.addiction_level = 0.0;
        state.toxicity_level = 0.0;
        state.units_consumed_total = 0;
        state.is_terminal = false;
        state.is_incapacitated = false;
        state.terminal_cause = None;
        state.last_interaction_ms = now_ms;
        info!("reset to {start} months");

        let mut out = Transition::applied();
        out.push(SimEvent::Reset);
        out.feedback(Feedback::info(MessageCategory::Life, Message::fresh_start()));
        out
    }

    /// Post-transition mortality check on the outcome stream.
    pub fn evaluate_mortality(&self, state: &mut SimState, rng: &mut RngBundle, out: &mut Transition) {
        mortality::evaluate(state, &self.config, &self.table, rng.outcome(), out);
    }

    fn refuses_wellness(&self, state: &SimState, rng: &mut RngBundle) -> bool {
        let thresholds = &self.config.thresholds;
        if state.addiction_level <= thresholds.min_rejection_addiction {
            return false;
        }
        let chance = state.addiction_level.min(thresholds.max_rejection_chance);
        rng.outcome().next_uniform() * 100.0 < chance
    }

    fn refusal(&self, rng: &mut RngBundle) -> Transition {
        let mut out = Transition::applied();
        let message = self.bank.pick(MessageCategory::Refusal, rng.flavor());
        out.feedback(Feedback::warning(MessageCategory::Refusal, message));
        out.cue(EffectCue::Shake);
        out
    }
}
