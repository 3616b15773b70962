//! The simulation state aggregate and its hydration rules.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{START_AGE_MONTHS, STAT_MAX};
use crate::numbers::{clamp_stat, whole_years};

/// Recorded reason for the terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalCause {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl TerminalCause {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn starvation() -> Self {
        Self::new(
            "starvation",
            "Starvation",
            "Multi-organ failure from lack of nutrients.",
        )
    }
}

/// Single mutable aggregate describing one simulated life.
///
/// Bounded stats are written only through the `adjust_*`/`set_*` helpers,
/// which clamp into `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimState {
    pub chronological_age_months: f64,
    pub biological_age_months: f64,
    pub stamina: f64,
    pub toxicity_level: f64,
    pub addiction_level: f64,
    pub hunger_level: f64,
    pub sedentary_level: f64,
    pub units_consumed_total: u64,
    pub last_interaction_ms: i64,
    pub is_terminal: bool,
    pub is_incapacitated: bool,
    pub is_in_stasis: bool,
    #[serde(default)]
    pub terminal_cause: Option<TerminalCause>,
}

impl Default for SimState {
    fn default() -> Self {
        Self::new(START_AGE_MONTHS, 0)
    }
}

impl SimState {
    /// Fresh life starting at `start_age_months`, last touched at `now_ms`.
    #[must_use]
    pub fn new(start_age_months: f64, now_ms: i64) -> Self {
        Self {
            chronological_age_months: start_age_months,
            biological_age_months: start_age_months,
            stamina: STAT_MAX,
            toxicity_level: 0.0,
            addiction_level: 0.0,
            hunger_level: 0.0,
            sedentary_level: 0.0,
            units_consumed_total: 0,
            last_interaction_ms: now_ms,
            is_terminal: false,
            is_incapacitated: false,
            is_in_stasis: false,
            terminal_cause: None,
        }
    }

    pub fn adjust_stamina(&mut self, delta: f64) {
        self.stamina = clamp_stat(self.stamina + delta);
    }

    pub fn adjust_toxicity(&mut self, delta: f64) {
        self.toxicity_level = clamp_stat(self.toxicity_level + delta);
    }

    pub fn adjust_addiction(&mut self, delta: f64) {
        self.addiction_level = clamp_stat(self.addiction_level + delta);
    }

    pub fn adjust_hunger(&mut self, delta: f64) {
        self.hunger_level = clamp_stat(self.hunger_level + delta);
    }

    pub fn adjust_sedentary(&mut self, delta: f64) {
        self.sedentary_level = clamp_stat(self.sedentary_level + delta);
    }

    pub fn set_toxicity(&mut self, value: f64) {
        self.toxicity_level = clamp_stat(value);
    }

    pub fn set_hunger(&mut self, value: f64) {
        self.hunger_level = clamp_stat(value);
    }

    /// Advance both age clocks; negative inputs are ignored so ages never run backwards.
    pub fn advance_ages(&mut self, chronological: f64, biological: f64) {
        self.chronological_age_months += chronological.max(0.0);
        self.biological_age_months += biological.max(0.0);
    }

    #[must_use]
    pub fn real_age_years(&self) -> i64 {
        whole_years(self.chronological_age_months)
    }

    #[must_use]
    pub fn bio_age_years(&self) -> i64 {
        whole_years(self.biological_age_months)
    }

    /// Whole years by which biological age exceeds chronological age.
    #[must_use]
    pub fn age_gap_years(&self) -> i64 {
        whole_years(self.biological_age_months - self.chronological_age_months)
    }

    /// Years lost as shown on the dashboard: difference of the floored ages.
    #[must_use]
    pub fn years_lost(&self) -> i64 {
        self.bio_age_years() - self.real_age_years()
    }

    #[must_use]
    pub const fn accepts_actions(&self) -> bool {
        !self.is_terminal && !self.is_incapacitated
    }

    #[must_use]
    pub const fn accepts_wellness(&self) -> bool {
        self.accepts_actions() && !self.is_in_stasis
    }

    /// Hydrate a persisted payload, repairing field by field.
    ///
    /// Returns `None` when the payload is not a JSON object. Accepts both the
    /// current field names and the legacy web-save keys.
    #[must_use]
    pub fn from_json_lenient(json: &str, start_age_months: f64, now_ms: i64) -> Option<Self> {
        let value: Value = serde_json::from_str(json).ok()?;
        let Value::Object(obj) = value else {
            return None;
        };
        Some(Self::repair_from_map(&obj, start_age_months, now_ms))
    }

    fn repair_from_map(obj: &Map<String, Value>, start_age: f64, now_ms: i64) -> Self {
        let defaults = Self::new(start_age, now_ms);
        let chronological = age_field(obj, &["chronological_age_months", "ageInMonths"], start_age);
        let biological = age_field(
            obj,
            &["biological_age_months", "biologicalAgeInMonths"],
            start_age,
        );
        let units = number_field(obj, &["units_consumed_total", "cigarettesSmoked"])
            .filter(|n| *n >= 0.0)
            .map_or(0, |n| crate::numbers::floor_f64_to_i64(n).unsigned_abs());
        let last_interaction = number_field(obj, &["last_interaction_ms", "lastInteraction"])
            .map_or(defaults.last_interaction_ms, crate::numbers::floor_f64_to_i64);
        let is_terminal = bool_field(obj, &["is_terminal", "isDead"]).unwrap_or(false);
        let terminal_cause = if is_terminal {
            cause_field(obj)
        } else {
            None
        };

        Self {
            chronological_age_months: chronological,
            biological_age_months: biological,
            stamina: stat_field(obj, &["stamina", "health"], defaults.stamina),
            toxicity_level: stat_field(obj, &["toxicity_level", "toxicity"], defaults.toxicity_level),
            addiction_level: stat_field(
                obj,
                &["addiction_level", "addiction"],
                defaults.addiction_level,
            ),
            hunger_level: stat_field(obj, &["hunger_level", "hunger"], defaults.hunger_level),
            sedentary_level: stat_field(
                obj,
                &["sedentary_level", "inactivity"],
                defaults.sedentary_level,
            ),
            units_consumed_total: units,
            last_interaction_ms: last_interaction,
            is_terminal,
            is_incapacitated: bool_field(obj, &["is_incapacitated", "isCollapsed"])
                .unwrap_or(false),
            is_in_stasis: bool_field(obj, &["is_in_stasis", "isHospitalized"]).unwrap_or(false),
            terminal_cause,
        }
    }
}

fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

/// Ages must be present and positive; anything else restarts the clock.
fn age_field(obj: &Map<String, Value>, keys: &[&str], start_age: f64) -> f64 {
    match number_field(obj, keys) {
        Some(months) if months > 0.0 => months,
        _ => start_age,
    }
}

fn stat_field(obj: &Map<String, Value>, keys: &[&str], fallback: f64) -> f64 {
    number_field(obj, keys).map_or(fallback, clamp_stat)
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn bool_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .find_map(|key| obj.get(*key))
        .and_then(Value::as_bool)
}

fn cause_field(obj: &Map<String, Value>) -> Option<TerminalCause> {
    let raw = obj
        .get("terminal_cause")
        .or_else(|| obj.get("causeOfDeath"))?;
    let cause = raw.as_object()?;
    let name = text_field(cause, &["name"])?;
    let id = text_field(cause, &["id"]).unwrap_or_else(|| name.to_lowercase().replace(' ', "_"));
    let description = text_field(cause, &["description", "desc"]).unwrap_or_default();
    Some(TerminalCause {
        id,
        name,
        description,
    })
}
