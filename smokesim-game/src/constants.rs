//! Centralized balance and tuning constants for the Smokesim core.
//!
//! These values are the defaults behind [`crate::config::SimConfig`]. Runtime
//! overrides go through the config layer; everything else reads from here so
//! balance changes stay reviewable in one place.

// Persistence --------------------------------------------------------------
pub const STORAGE_NAMESPACE: &str = "smokingsim_v2";

// Time & aging -------------------------------------------------------------
pub const START_AGE_MONTHS: f64 = 216.0;
pub const MAX_LIFESPAN_MONTHS: f64 = 960.0;
pub const MONTHS_PER_TICK: f64 = 1.0;
pub const REAL_AGE_PER_ACTION: f64 = 1.0;

// Biological age penalties (months) ----------------------------------------
pub const BIO_AGE_PENALTY_PER_PACK: f64 = 2.0;
pub const BIO_AGE_PENALTY_HUNGER: f64 = 1.0;
pub const BIO_AGE_PENALTY_INACTIVITY: f64 = 0.5;

// Per-pack effects ---------------------------------------------------------
pub const UNITS_PER_ACTION: u64 = 20;
pub const STAMINA_LOSS_PER_PACK: f64 = 5.0;
pub const TOXICITY_GAIN_PER_PACK: f64 = 25.0;
pub const ADDICTION_GAIN_PER_PACK: f64 = 15.0;

// Recovery & lifestyle -----------------------------------------------------
pub const STAMINA_GAIN_PER_MEAL: f64 = 10.0;
pub const STAMINA_GAIN_PER_EXERCISE: f64 = 20.0;
pub const TOXICITY_LOSS_PER_EXERCISE: f64 = 20.0;
pub const TOXICITY_DECAY_PER_TICK: f64 = 5.0;
pub const ADDICTION_LOSS_PER_ACTION: f64 = 3.0;
pub const EXERCISE_ADDICTION_MULTIPLIER: f64 = 2.0;
pub const HUNGER_GAIN_PER_TICK: f64 = 2.0;
pub const SEDENTARY_GAIN_PER_TICK: f64 = 1.0;
pub const SEDENTARY_LOSS_PER_EXERCISE: f64 = 50.0;
pub const PASSIVE_RECOVERY_RATE: f64 = 2.0;
pub const COLLAPSE_RECOVERY_TOXICITY: f64 = 50.0;

// Starvation stages --------------------------------------------------------
pub const MALNUTRITION_HUNGER: f64 = 50.0;
pub const MALNUTRITION_STAMINA_LOSS: f64 = 0.2;
pub const STARVATION_STAMINA_LOSS: f64 = 1.0;
pub const TERMINAL_STARVATION_HUNGER: f64 = 100.0;
pub const TERMINAL_STARVATION_STAMINA_LOSS: f64 = 5.0;

// Timing (milliseconds) ----------------------------------------------------
pub const TICK_INTERVAL_MS: i64 = 1_000;
pub const COLLAPSE_RECOVERY_MS: i64 = 4_000;
pub const MESSAGE_DURATION_MS: i64 = 4_000;
pub const PASSIVE_RECOVERY_DELAY_MS: i64 = 5_000;
pub const CRAVING_THRESHOLD_MS: i64 = 5_000;

// Thresholds ---------------------------------------------------------------
pub const TOXICITY_WARNING: f64 = 60.0;
pub const TOXICITY_COLLAPSE: f64 = 100.0;
pub const THRESHOLD_HUNGER: f64 = 80.0;
pub const THRESHOLD_SEDENTARY: f64 = 80.0;
pub const MIN_REJECTION_ADDICTION: f64 = 40.0;
pub const MAX_REJECTION_CHANCE: f64 = 85.0;
pub const CRAVING_ADDICTION: f64 = 50.0;
pub const PASSIVE_RECOVERY_MAX_HUNGER: f64 = 50.0;
pub const AGE_GAP_MESSAGE_YEARS: i64 = 5;
pub const LIFESTYLE_WARNING_CHANCE: f64 = 0.05;

// Aging impact on recovery -------------------------------------------------
pub const AGE_DECAY_START_MONTHS: f64 = 216.0;
pub const AGE_DECAY_END_MONTHS: f64 = 960.0;
pub const MIN_RECOVERY_FACTOR: f64 = 0.2;
pub const LUNG_CAPACITY_FACTOR: f64 = 0.6;

// Mortality ----------------------------------------------------------------
pub const ACTIVE_RISK_ONSET_MONTHS: f64 = 480.0;
pub const ACTIVE_RISK_SCALE: f64 = 0.01;
pub const DISEASE_TICK_PROBABILITY: f64 = 0.000_5;

// Presentation -------------------------------------------------------------
pub const VIBRATION_PATTERN_MS: [u16; 3] = [50, 30, 50];
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Cigarettes in a pack. A unit of measure for reports, not a tuning knob:
/// `dose.units_per_action` changes how many units one consume adds, never
/// how many units make a pack.
pub const UNITS_PER_PACK: u64 = 20;
pub const LIFE_GAP_WARNING_YEARS: i64 = 2;
pub const LIFE_GAP_DANGER_YEARS: i64 = 10;
pub const BODY_CRITICAL_STAMINA: f64 = 30.0;
pub const BODY_WORN_MONTHS: f64 = 720.0;
pub const ADDICTION_WARNING: f64 = 50.0;

// Bounded stat range -------------------------------------------------------
pub const STAT_MIN: f64 = 0.0;
pub const STAT_MAX: f64 = 100.0;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-9;
