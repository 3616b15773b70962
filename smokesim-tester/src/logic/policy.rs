use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use smokesim_game::{Intent, SimState};

const MEAL_HUNGER: f64 = 40.0;
const WORKOUT_SEDENTARY: f64 = 40.0;
const DESPERATE_HUNGER: f64 = 85.0;
const BALANCED_SMOKE_TOXICITY: f64 = 50.0;
const BALANCED_SMOKE_EVERY_MS: i64 = 20_000;

/// Policy interface for automated play.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Intent to dispatch at this decision point, if any.
    fn decide(&mut self, state: &SimState, now_ms: i64) -> Option<Intent>;
}

/// Built-in lifestyles for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifestylePolicy {
    Abstainer,
    ChainSmoker,
    Balanced,
    Random,
}

impl LifestylePolicy {
    pub const ALL: [Self; 4] = [
        Self::Abstainer,
        Self::ChainSmoker,
        Self::Balanced,
        Self::Random,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Abstainer => "abstainer",
            Self::ChainSmoker => "chain-smoker",
            Self::Balanced => "balanced",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Abstainer => "Abstainer",
            Self::ChainSmoker => "Chain Smoker",
            Self::Balanced => "Balanced",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Abstainer => "never smokes; eats and trains on need",
            Self::ChainSmoker => "smokes at every chance; eats only when starving",
            Self::Balanced => "eats and trains on need, smokes on cravings",
            Self::Random => "seeded random intents",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.key().eq_ignore_ascii_case(key.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Abstainer => Box::new(AbstainerPolicy),
            Self::ChainSmoker => Box::new(ChainSmokerPolicy),
            Self::Balanced => Box::new(BalancedPolicy::default()),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for LifestylePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct AbstainerPolicy;
struct ChainSmokerPolicy;

#[derive(Default)]
struct BalancedPolicy {
    last_smoke_ms: Option<i64>,
}

struct RandomPolicy {
    rng: ChaCha20Rng,
    idle_chance: f64,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            idle_chance: 0.4,
        }
    }
}

fn upkeep(state: &SimState) -> Option<Intent> {
    if state.hunger_level >= MEAL_HUNGER {
        Some(Intent::HealEat)
    } else if state.sedentary_level >= WORKOUT_SEDENTARY {
        Some(Intent::Exercise)
    } else {
        None
    }
}

impl PlayerPolicy for AbstainerPolicy {
    fn name(&self) -> &'static str {
        "Abstainer"
    }

    fn decide(&mut self, state: &SimState, _now_ms: i64) -> Option<Intent> {
        upkeep(state)
    }
}

impl PlayerPolicy for ChainSmokerPolicy {
    fn name(&self) -> &'static str {
        "Chain Smoker"
    }

    fn decide(&mut self, state: &SimState, _now_ms: i64) -> Option<Intent> {
        if state.hunger_level >= DESPERATE_HUNGER {
            Some(Intent::HealEat)
        } else {
            Some(Intent::Consume)
        }
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn decide(&mut self, state: &SimState, now_ms: i64) -> Option<Intent> {
        if let Some(intent) = upkeep(state) {
            return Some(intent);
        }
        let craving = state.addiction_level > smokesim_game::constants::CRAVING_ADDICTION;
        let due = self
            .last_smoke_ms
            .is_none_or(|last| now_ms - last >= BALANCED_SMOKE_EVERY_MS);
        if (craving || due) && state.toxicity_level < BALANCED_SMOKE_TOXICITY {
            self.last_smoke_ms = Some(now_ms);
            return Some(Intent::Consume);
        }
        None
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn decide(&mut self, _state: &SimState, _now_ms: i64) -> Option<Intent> {
        if self.rng.r#gen::<f64>() < self.idle_chance {
            return None;
        }
        let choices = [Intent::Consume, Intent::HealEat, Intent::Exercise];
        Some(choices[self.rng.gen_range(0..choices.len())])
    }
}
