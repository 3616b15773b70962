//! Tunable simulation configuration.
//!
//! Every group deserializes with per-field defaults taken from
//! [`crate::constants`], so a partial JSON override only needs the fields it
//! changes.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ACTIVE_RISK_ONSET_MONTHS, ACTIVE_RISK_SCALE, ADDICTION_GAIN_PER_PACK,
    ADDICTION_LOSS_PER_ACTION, AGE_DECAY_END_MONTHS, AGE_GAP_MESSAGE_YEARS, AGE_DECAY_START_MONTHS,
    BIO_AGE_PENALTY_HUNGER, BIO_AGE_PENALTY_INACTIVITY, BIO_AGE_PENALTY_PER_PACK,
    COLLAPSE_RECOVERY_MS, COLLAPSE_RECOVERY_TOXICITY, CRAVING_ADDICTION, CRAVING_THRESHOLD_MS,
    DISEASE_TICK_PROBABILITY, EXERCISE_ADDICTION_MULTIPLIER, HUNGER_GAIN_PER_TICK, LIFESTYLE_WARNING_CHANCE,
    MALNUTRITION_HUNGER, MALNUTRITION_STAMINA_LOSS, MAX_LIFESPAN_MONTHS, MAX_REJECTION_CHANCE,
    LUNG_CAPACITY_FACTOR, MESSAGE_DURATION_MS, MIN_RECOVERY_FACTOR, MIN_REJECTION_ADDICTION, MONTHS_PER_TICK,
    PASSIVE_RECOVERY_DELAY_MS, PASSIVE_RECOVERY_MAX_HUNGER, PASSIVE_RECOVERY_RATE,
    REAL_AGE_PER_ACTION, SEDENTARY_GAIN_PER_TICK, SEDENTARY_LOSS_PER_EXERCISE, STAMINA_GAIN_PER_EXERCISE,
    STAMINA_GAIN_PER_MEAL, STAMINA_LOSS_PER_PACK, STARVATION_STAMINA_LOSS, START_AGE_MONTHS,
    STAT_MAX, STAT_MIN, TERMINAL_STARVATION_HUNGER, TERMINAL_STARVATION_STAMINA_LOSS,
    THRESHOLD_HUNGER, THRESHOLD_SEDENTARY, TICK_INTERVAL_MS, TOXICITY_COLLAPSE,
    TOXICITY_DECAY_PER_TICK, TOXICITY_GAIN_PER_PACK, TOXICITY_LOSS_PER_EXERCISE,
    TOXICITY_WARNING, UNITS_PER_ACTION,
};
use crate::numbers::i64_to_f64;

/// Aging clock and age-dependent recovery curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingCfg {
    pub start_age_months: f64,
    pub max_lifespan_months: f64,
    pub months_per_tick: f64,
    pub real_age_per_action: f64,
    pub bio_penalty_per_pack: f64,
    pub bio_penalty_hunger: f64,
    pub bio_penalty_inactivity: f64,
    /// Biological age at which recovery starts to degrade.
    pub decay_start_months: f64,
    /// Biological age at which recovery bottoms out at `min_recovery_factor`.
    pub decay_end_months: f64,
    pub min_recovery_factor: f64,
    /// Below this recovery factor exercise reports reduced lung capacity.
    pub lung_capacity_factor: f64,
}

impl Default for AgingCfg {
    fn default() -> Self {
        Self {
            start_age_months: START_AGE_MONTHS,
            max_lifespan_months: MAX_LIFESPAN_MONTHS,
            months_per_tick: MONTHS_PER_TICK,
            real_age_per_action: REAL_AGE_PER_ACTION,
            bio_penalty_per_pack: BIO_AGE_PENALTY_PER_PACK,
            bio_penalty_hunger: BIO_AGE_PENALTY_HUNGER,
            bio_penalty_inactivity: BIO_AGE_PENALTY_INACTIVITY,
            decay_start_months: AGE_DECAY_START_MONTHS,
            decay_end_months: AGE_DECAY_END_MONTHS,
            min_recovery_factor: MIN_RECOVERY_FACTOR,
            lung_capacity_factor: LUNG_CAPACITY_FACTOR,
        }
    }
}

/// Effects of a single consume action ("one pack").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoseCfg {
    pub units_per_action: u64,
    pub stamina_loss: f64,
    pub toxicity_gain: f64,
    pub addiction_gain: f64,
}

impl Default for DoseCfg {
    fn default() -> Self {
        Self {
            units_per_action: UNITS_PER_ACTION,
            stamina_loss: STAMINA_LOSS_PER_PACK,
            toxicity_gain: TOXICITY_GAIN_PER_PACK,
            addiction_gain: ADDICTION_GAIN_PER_PACK,
        }
    }
}

/// Base gains of the wellness actions before the recovery factor applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellnessCfg {
    pub stamina_per_meal: f64,
    pub stamina_per_exercise: f64,
    pub toxicity_loss_per_exercise: f64,
    pub addiction_loss_per_action: f64,
    pub sedentary_loss_per_exercise: f64,
    pub passive_recovery_rate: f64,
    /// Exercise sheds this many times `addiction_loss_per_action`.
    pub exercise_addiction_multiplier: f64,
}

impl Default for WellnessCfg {
    fn default() -> Self {
        Self {
            stamina_per_meal: STAMINA_GAIN_PER_MEAL,
            stamina_per_exercise: STAMINA_GAIN_PER_EXERCISE,
            toxicity_loss_per_exercise: TOXICITY_LOSS_PER_EXERCISE,
            addiction_loss_per_action: ADDICTION_LOSS_PER_ACTION,
            sedentary_loss_per_exercise: SEDENTARY_LOSS_PER_EXERCISE,
            passive_recovery_rate: PASSIVE_RECOVERY_RATE,
            exercise_addiction_multiplier: EXERCISE_ADDICTION_MULTIPLIER,
        }
    }
}

/// Per-tick lifestyle decay and starvation stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayCfg {
    pub hunger_gain: f64,
    pub sedentary_gain: f64,
    pub toxicity_decay: f64,
    pub malnutrition_hunger: f64,
    pub malnutrition_stamina_loss: f64,
    pub starvation_hunger: f64,
    pub starvation_stamina_loss: f64,
    pub terminal_hunger: f64,
    pub terminal_stamina_loss: f64,
    pub sedentary_threshold: f64,
}

impl Default for DecayCfg {
    fn default() -> Self {
        Self {
            hunger_gain: HUNGER_GAIN_PER_TICK,
            sedentary_gain: SEDENTARY_GAIN_PER_TICK,
            toxicity_decay: TOXICITY_DECAY_PER_TICK,
            malnutrition_hunger: MALNUTRITION_HUNGER,
            malnutrition_stamina_loss: MALNUTRITION_STAMINA_LOSS,
            starvation_hunger: THRESHOLD_HUNGER,
            starvation_stamina_loss: STARVATION_STAMINA_LOSS,
            terminal_hunger: TERMINAL_STARVATION_HUNGER,
            terminal_stamina_loss: TERMINAL_STARVATION_STAMINA_LOSS,
            sedentary_threshold: THRESHOLD_SEDENTARY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdCfg {
    pub toxicity_warning: f64,
    pub toxicity_collapse: f64,
    pub collapse_recovery_toxicity: f64,
    pub min_rejection_addiction: f64,
    /// Ceiling on the refusal chance, in percent.
    pub max_rejection_chance: f64,
    pub craving_addiction: f64,
    pub passive_recovery_max_hunger: f64,
    pub lifestyle_warning_chance: f64,
    /// Age gap, in whole years, beyond which a consume names the gap.
    pub age_gap_message_years: i64,
}

impl Default for ThresholdCfg {
    fn default() -> Self {
        Self {
            toxicity_warning: TOXICITY_WARNING,
            toxicity_collapse: TOXICITY_COLLAPSE,
            collapse_recovery_toxicity: COLLAPSE_RECOVERY_TOXICITY,
            min_rejection_addiction: MIN_REJECTION_ADDICTION,
            max_rejection_chance: MAX_REJECTION_CHANCE,
            craving_addiction: CRAVING_ADDICTION,
            passive_recovery_max_hunger: PASSIVE_RECOVERY_MAX_HUNGER,
            lifestyle_warning_chance: LIFESTYLE_WARNING_CHANCE,
            age_gap_message_years: AGE_GAP_MESSAGE_YEARS,
        }
    }
}

/// Wall-clock quanta, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingCfg {
    pub tick_interval_ms: i64,
    pub collapse_recovery_ms: i64,
    pub message_duration_ms: i64,
    pub passive_recovery_delay_ms: i64,
    pub craving_threshold_ms: i64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL_MS,
            collapse_recovery_ms: COLLAPSE_RECOVERY_MS,
            message_duration_ms: MESSAGE_DURATION_MS,
            passive_recovery_delay_ms: PASSIVE_RECOVERY_DELAY_MS,
            craving_threshold_ms: CRAVING_THRESHOLD_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortalityCfg {
    pub active_risk_onset_months: f64,
    pub active_risk_scale: f64,
    pub disease_tick_probability: f64,
}

impl Default for MortalityCfg {
    fn default() -> Self {
        Self {
            active_risk_onset_months: ACTIVE_RISK_ONSET_MONTHS,
            active_risk_scale: ACTIVE_RISK_SCALE,
            disease_tick_probability: DISEASE_TICK_PROBABILITY,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub aging: AgingCfg,
    pub dose: DoseCfg,
    pub wellness: WellnessCfg,
    pub decay: DecayCfg,
    pub thresholds: ThresholdCfg,
    pub timing: TimingCfg,
    pub mortality: MortalityCfg,
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least {min:.4} (got {value:.4})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.4} and {max:.4} (got {value:.4})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveDuration { field: &'static str, value: i64 },
    #[error("recovery decay window invalid (start {start:.1} >= end {end:.1})")]
    DecayWindow { start: f64, end: f64 },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PartialEq for ConfigError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

fn check_min(field: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || !(min..=max).contains(&value) {
        return Err(ConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn check_duration(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositiveDuration { field, value });
    }
    Ok(())
}

impl SimConfig {
    /// Parse and validate a (possibly partial) JSON override.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the resulting values fail validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aging.validate()?;
        self.dose.validate()?;
        self.wellness.validate()?;
        self.decay.validate()?;
        self.thresholds.validate()?;
        self.timing.validate()?;
        self.mortality.validate()
    }
}

impl AgingCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        check_min("aging.start_age_months", self.start_age_months, 0.0)?;
        check_min(
            "aging.max_lifespan_months",
            self.max_lifespan_months,
            self.start_age_months,
        )?;
        check_min("aging.months_per_tick", self.months_per_tick, 0.0)?;
        check_min("aging.real_age_per_action", self.real_age_per_action, 0.0)?;
        check_min("aging.bio_penalty_per_pack", self.bio_penalty_per_pack, 0.0)?;
        check_min("aging.bio_penalty_hunger", self.bio_penalty_hunger, 0.0)?;
        check_min(
            "aging.bio_penalty_inactivity",
            self.bio_penalty_inactivity,
            0.0,
        )?;
        check_range(
            "aging.min_recovery_factor",
            self.min_recovery_factor,
            0.0,
            1.0,
        )?;
        check_range(
            "aging.lung_capacity_factor",
            self.lung_capacity_factor,
            0.0,
            1.0,
        )?;
        if self.decay_start_months.is_nan()
            || self.decay_end_months.is_nan()
            || self.decay_start_months >= self.decay_end_months
        {
            return Err(ConfigError::DecayWindow {
                start: self.decay_start_months,
                end: self.decay_end_months,
            });
        }
        Ok(())
    }
}

impl DoseCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("dose.stamina_loss", self.stamina_loss, STAT_MIN, STAT_MAX)?;
        check_range("dose.toxicity_gain", self.toxicity_gain, STAT_MIN, STAT_MAX)?;
        check_range("dose.addiction_gain", self.addiction_gain, STAT_MIN, STAT_MAX)
    }
}

impl WellnessCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("wellness.stamina_per_meal", self.stamina_per_meal),
            ("wellness.stamina_per_exercise", self.stamina_per_exercise),
            (
                "wellness.toxicity_loss_per_exercise",
                self.toxicity_loss_per_exercise,
            ),
            (
                "wellness.addiction_loss_per_action",
                self.addiction_loss_per_action,
            ),
            (
                "wellness.sedentary_loss_per_exercise",
                self.sedentary_loss_per_exercise,
            ),
            ("wellness.passive_recovery_rate", self.passive_recovery_rate),
        ] {
            check_range(field, value, STAT_MIN, STAT_MAX)?;
        }
        check_min(
            "wellness.exercise_addiction_multiplier",
            self.exercise_addiction_multiplier,
            0.0,
        )
    }
}

impl DecayCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("decay.hunger_gain", self.hunger_gain, STAT_MIN, STAT_MAX)?;
        check_range(
            "decay.sedentary_gain",
            self.sedentary_gain,
            STAT_MIN,
            STAT_MAX,
        )?;
        check_range(
            "decay.toxicity_decay",
            self.toxicity_decay,
            STAT_MIN,
            STAT_MAX,
        )?;
        check_range(
            "decay.malnutrition_hunger",
            self.malnutrition_hunger,
            STAT_MIN,
            self.starvation_hunger,
        )?;
        check_range(
            "decay.starvation_hunger",
            self.starvation_hunger,
            self.malnutrition_hunger,
            self.terminal_hunger,
        )?;
        check_range(
            "decay.terminal_hunger",
            self.terminal_hunger,
            STAT_MIN,
            STAT_MAX,
        )?;
        check_range(
            "decay.sedentary_threshold",
            self.sedentary_threshold,
            STAT_MIN,
            STAT_MAX,
        )?;
        check_min(
            "decay.malnutrition_stamina_loss",
            self.malnutrition_stamina_loss,
            0.0,
        )?;
        check_min(
            "decay.starvation_stamina_loss",
            self.starvation_stamina_loss,
            0.0,
        )?;
        check_min(
            "decay.terminal_stamina_loss",
            self.terminal_stamina_loss,
            0.0,
        )
    }
}

impl ThresholdCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("thresholds.toxicity_warning", self.toxicity_warning),
            ("thresholds.toxicity_collapse", self.toxicity_collapse),
            (
                "thresholds.collapse_recovery_toxicity",
                self.collapse_recovery_toxicity,
            ),
            (
                "thresholds.min_rejection_addiction",
                self.min_rejection_addiction,
            ),
            ("thresholds.max_rejection_chance", self.max_rejection_chance),
            ("thresholds.craving_addiction", self.craving_addiction),
            (
                "thresholds.passive_recovery_max_hunger",
                self.passive_recovery_max_hunger,
            ),
        ] {
            check_range(field, value, STAT_MIN, STAT_MAX)?;
        }
        check_range(
            "thresholds.lifestyle_warning_chance",
            self.lifestyle_warning_chance,
            0.0,
            1.0,
        )?;
        check_min(
            "thresholds.age_gap_message_years",
            i64_to_f64(self.age_gap_message_years),
            0.0,
        )
    }
}

impl TimingCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        check_duration("timing.tick_interval_ms", self.tick_interval_ms)?;
        check_duration("timing.collapse_recovery_ms", self.collapse_recovery_ms)?;
        check_duration("timing.message_duration_ms", self.message_duration_ms)?;
        check_duration(
            "timing.passive_recovery_delay_ms",
            self.passive_recovery_delay_ms,
        )?;
        check_duration("timing.craving_threshold_ms", self.craving_threshold_ms)
    }
}

impl MortalityCfg {
    fn validate(&self) -> Result<(), ConfigError> {
        check_min(
            "mortality.active_risk_onset_months",
            self.active_risk_onset_months,
            1.0,
        )?;
        check_range(
            "mortality.active_risk_scale",
            self.active_risk_scale,
            0.0,
            1.0,
        )?;
        check_range(
            "mortality.disease_tick_probability",
            self.disease_tick_probability,
            0.0,
            1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = SimConfig::from_json(r#"{"dose": {"toxicity_gain": 40.0}}"#).unwrap();
        assert!((cfg.dose.toxicity_gain - 40.0).abs() < f64::EPSILON);
        assert_eq!(cfg.dose.units_per_action, UNITS_PER_ACTION);
        assert_eq!(cfg.timing, TimingCfg::default());
        assert_eq!(cfg.aging, AgingCfg::default());
    }

    #[test]
    fn rejects_inverted_decay_window() {
        let mut cfg = SimConfig::default();
        cfg.aging.decay_start_months = 900.0;
        cfg.aging.decay_end_months = 300.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::DecayWindow { .. })
        ));
    }

    #[test]
    fn rejects_probability_out_of_range() {
        let err = SimConfig::from_json(r#"{"mortality": {"disease_tick_probability": 1.5}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("mortality.disease_tick_probability"));
    }

    #[test]
    fn rejects_zero_tick_interval() {
        let mut cfg = SimConfig::default();
        cfg.timing.tick_interval_ms = 0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositiveDuration {
                field: "timing.tick_interval_ms",
                value: 0,
            })
        );
    }

    #[test]
    fn message_tunables_override_and_validate() {
        let cfg = SimConfig::from_json(
            r#"{"aging": {"lung_capacity_factor": 0.9},
                "thresholds": {"age_gap_message_years": 1},
                "wellness": {"exercise_addiction_multiplier": 3.0}}"#,
        )
        .unwrap();
        assert!((cfg.aging.lung_capacity_factor - 0.9).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds.age_gap_message_years, 1);
        assert!((cfg.wellness.exercise_addiction_multiplier - 3.0).abs() < f64::EPSILON);

        let err = SimConfig::from_json(r#"{"thresholds": {"age_gap_message_years": -1}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("thresholds.age_gap_message_years"));
        let err =
            SimConfig::from_json(r#"{"aging": {"lung_capacity_factor": 1.5}}"#).unwrap_err();
        assert!(err.to_string().contains("aging.lung_capacity_factor"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            SimConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
