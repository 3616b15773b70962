//! Mortality table and the post-transition mortality evaluator.
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::SimConfig;
use crate::events::{SimEvent, Transition};
use crate::rng::RandomSource;
use crate::state::{SimState, TerminalCause};

const DEFAULT_MORTALITY_DATA: &str = include_str!("../assets/mortality.json");

/// One age-gated cause of death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub min_age_months: f64,
    /// Nominal severity from the source data; the rolls use the config scales.
    #[serde(default)]
    pub base_probability: f64,
    /// The end-of-life cause, excluded from disease and risk rolls.
    #[serde(default)]
    pub universal: bool,
}

impl CauseDef {
    #[must_use]
    pub fn is_met_by(&self, biological_age_months: f64) -> bool {
        biological_age_months >= self.min_age_months
    }

    #[must_use]
    pub fn to_cause(&self) -> TerminalCause {
        TerminalCause::new(&self.id, &self.name, &self.description)
    }
}

/// Ordered list of causes; order decides which eligible cause wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MortalityTable {
    #[serde(default)]
    pub causes: Vec<CauseDef>,
}

impl MortalityTable {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_MORTALITY_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_table() -> &'static Self {
        static TABLE: OnceLock<MortalityTable> = OnceLock::new();
        TABLE.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a mortality table.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn universal(&self) -> Option<&CauseDef> {
        self.causes.iter().find(|cause| cause.universal)
    }

    /// Non-universal causes whose minimum age is met, in table order.
    pub fn eligible(&self, biological_age_months: f64) -> impl Iterator<Item = &CauseDef> {
        self.causes
            .iter()
            .filter(move |cause| !cause.universal && cause.is_met_by(biological_age_months))
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&CauseDef> {
        self.causes.iter().find(|cause| cause.id == id)
    }
}

/// One-way terminal transition. Repeated calls keep the first cause.
pub fn kill(state: &mut SimState, cause: TerminalCause, out: &mut Transition) {
    if state.is_terminal {
        return;
    }
    info!(
        "terminal: {} at real {}y / bio {}y",
        cause.id,
        state.real_age_years(),
        state.bio_age_years()
    );
    state.is_terminal = true;
    state.terminal_cause = Some(cause.clone());
    out.push(SimEvent::Died { cause });
}

/// Lifespan ceiling, then one independent roll per eligible disease.
pub fn evaluate(
    state: &mut SimState,
    cfg: &SimConfig,
    table: &MortalityTable,
    rng: &mut dyn RandomSource,
    out: &mut Transition,
) {
    if state.is_terminal {
        return;
    }

    if state.biological_age_months >= cfg.aging.max_lifespan_months {
        let cause = table.universal().map_or_else(natural_causes_fallback, CauseDef::to_cause);
        kill(state, cause, out);
        return;
    }

    let probability = cfg.mortality.disease_tick_probability;
    for cause in table.eligible(state.biological_age_months) {
        if rng.next_uniform() < probability {
            kill(state, cause.to_cause(), out);
            return;
        }
    }
}

/// Risk roll attached to each consume: grows linearly past the onset age.
pub fn active_risk_check(
    state: &mut SimState,
    cfg: &SimConfig,
    table: &MortalityTable,
    rng: &mut dyn RandomSource,
    out: &mut Transition,
) {
    let onset = cfg.mortality.active_risk_onset_months;
    let risk_factor = (state.biological_age_months - onset) / onset;
    if risk_factor <= 0.0 {
        return;
    }
    if rng.next_uniform() < cfg.mortality.active_risk_scale * risk_factor
        && let Some(cause) = table.eligible(state.biological_age_months).next()
    {
        kill(state, cause.to_cause(), out);
    }
}

fn natural_causes_fallback() -> TerminalCause {
    TerminalCause::new(
        "natural_causes",
        "Natural causes",
        "Your body simply shut down.",
    )
}
