//! End-of-life summary and dashboard classifications.
use serde::{Deserialize, Serialize};

use crate::constants::{
    ADDICTION_WARNING, BODY_CRITICAL_STAMINA, BODY_WORN_MONTHS, LIFE_GAP_DANGER_YEARS,
    LIFE_GAP_WARNING_YEARS, UNITS_PER_PACK,
};
use crate::state::{SimState, TerminalCause};

const NATURAL_CAUSE_ID: &str = "natural_causes";

/// Color tier for the years-lost readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeGapTier {
    Normal,
    Warning,
    Danger,
}

impl LifeGapTier {
    #[must_use]
    pub const fn from_years_lost(years: i64) -> Self {
        if years > LIFE_GAP_DANGER_YEARS {
            Self::Danger
        } else if years > LIFE_GAP_WARNING_YEARS {
            Self::Warning
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyCondition {
    Healthy,
    Worn,
    Critical,
}

impl BodyCondition {
    /// Low stamina outranks an old body.
    #[must_use]
    pub fn of(state: &SimState) -> Self {
        if state.stamina < BODY_CRITICAL_STAMINA {
            Self::Critical
        } else if state.biological_age_months > BODY_WORN_MONTHS {
            Self::Worn
        } else {
            Self::Healthy
        }
    }
}

impl std::fmt::Display for BodyCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Worn => write!(f, "worn"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[must_use]
pub fn addiction_warning(state: &SimState) -> bool {
    state.addiction_level > ADDICTION_WARNING
}

/// Snapshot shown when a life ends (or on demand for a living one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub real_age_years: i64,
    pub bio_age_years: i64,
    pub years_lost: i64,
    pub units_consumed: u64,
    pub packs_consumed: u64,
    pub cause: Option<TerminalCause>,
    pub natural: bool,
    pub headline: String,
    pub gap_tier: LifeGapTier,
}

impl RunSummary {
    #[must_use]
    pub fn from_state(state: &SimState) -> Self {
        let years_lost = state.years_lost();
        let natural = state
            .terminal_cause
            .as_ref()
            .is_some_and(|cause| cause.id == NATURAL_CAUSE_ID);
        let headline = match (&state.terminal_cause, natural) {
            (Some(_), true) => "You lived a full life.",
            (Some(_), false) => "Your life ended too soon.",
            (None, _) => "Still breathing.",
        };
        Self {
            real_age_years: state.real_age_years(),
            bio_age_years: state.bio_age_years(),
            years_lost,
            units_consumed: state.units_consumed_total,
            packs_consumed: state.units_consumed_total / UNITS_PER_PACK,
            cause: state.terminal_cause.clone(),
            natural,
            headline: headline.to_string(),
            gap_tier: LifeGapTier::from_years_lost(years_lost),
        }
    }

    #[must_use]
    pub fn cause_name(&self) -> &str {
        self.cause.as_ref().map_or("alive", |cause| cause.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_tiers_use_strict_thresholds() {
        assert_eq!(LifeGapTier::from_years_lost(-1), LifeGapTier::Normal);
        assert_eq!(LifeGapTier::from_years_lost(2), LifeGapTier::Normal);
        assert_eq!(LifeGapTier::from_years_lost(3), LifeGapTier::Warning);
        assert_eq!(LifeGapTier::from_years_lost(10), LifeGapTier::Warning);
        assert_eq!(LifeGapTier::from_years_lost(11), LifeGapTier::Danger);
    }

    #[test]
    fn body_condition_prefers_critical() {
        let mut state = SimState::default();
        assert_eq!(BodyCondition::of(&state), BodyCondition::Healthy);
        state.biological_age_months = 800.0;
        assert_eq!(BodyCondition::of(&state), BodyCondition::Worn);
        state.stamina = 10.0;
        assert_eq!(BodyCondition::of(&state), BodyCondition::Critical);
    }

    #[test]
    fn summary_counts_packs_and_lost_years() {
        let mut state = SimState::default();
        state.chronological_age_months = 600.0;
        state.biological_age_months = 800.0;
        state.units_consumed_total = 1_250;
        state.addiction_level = 70.0;
        state.is_terminal = true;
        state.terminal_cause = Some(TerminalCause::new("copd", "COPD (emphysema)", ""));

        let summary = RunSummary::from_state(&state);
        assert_eq!(summary.real_age_years, 50);
        assert_eq!(summary.bio_age_years, 66);
        assert_eq!(summary.years_lost, 16);
        assert_eq!(summary.packs_consumed, 62);
        assert!(!summary.natural);
        assert_eq!(summary.headline, "Your life ended too soon.");
        assert_eq!(summary.gap_tier, LifeGapTier::Danger);
        assert_eq!(summary.cause_name(), "COPD (emphysema)");
        assert!(addiction_warning(&state));
    }

    #[test]
    fn natural_death_gets_full_life_headline() {
        let mut state = SimState::default();
        state.is_terminal = true;
        state.terminal_cause = Some(TerminalCause::new(
            "natural_causes",
            "Natural causes",
            "",
        ));
        let summary = RunSummary::from_state(&state);
        assert!(summary.natural);
        assert_eq!(summary.headline, "You lived a full life.");
    }
}
