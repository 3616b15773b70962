//! Categorized feedback text.
//!
//! The bank ships as an embedded JSON asset; adapters that localize can load
//! their own with [`MessageBank::from_json`].
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::rng::{RandomSource, pick_index};

const DEFAULT_MESSAGE_DATA: &str = include_str!("../assets/messages.json");

/// Bank category a feedback message is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    HarmfulAction,
    Craving,
    /// A meal that went down; always [`Message::healthy_meal`].
    Recovery,
    Refusal,
    AcuteToxicity,
    Exercise,
    PassiveRecovery,
    Hunger,
    Inactivity,
    /// Fixed lifecycle lines (reset); never drawn from the bank.
    Life,
}

impl MessageCategory {
    pub const BANKED: [Self; 8] = [
        Self::HarmfulAction,
        Self::Craving,
        Self::Refusal,
        Self::AcuteToxicity,
        Self::Exercise,
        Self::PassiveRecovery,
        Self::Hunger,
        Self::Inactivity,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::HarmfulAction => "harmful_action",
            Self::Craving => "craving",
            Self::Recovery => "recovery",
            Self::Refusal => "refusal",
            Self::AcuteToxicity => "acute_toxicity",
            Self::Exercise => "exercise",
            Self::PassiveRecovery => "passive_recovery",
            Self::Hunger => "hunger",
            Self::Inactivity => "inactivity",
            Self::Life => "life",
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A human-readable line plus its attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    #[serde(default)]
    pub source: String,
}

impl Message {
    #[must_use]
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn age_gap(years: i64) -> Self {
        Self::new(
            format!("Your body is {years} years older than you."),
            "Accelerated aging",
        )
    }

    #[must_use]
    pub fn reduced_lung_capacity() -> Self {
        Self::new(
            "Breathing is hard while you train.",
            "Reduced lung capacity",
        )
    }

    #[must_use]
    pub fn healthy_meal() -> Self {
        Self::new("Nutritious food for a whole month.", "Healthy diet")
    }

    #[must_use]
    pub fn collapse() -> Self {
        Self::new(
            "Too much nicotine at once. Waiting for recovery...",
            "Acute intoxication",
        )
    }

    #[must_use]
    pub fn fresh_start() -> Self {
        Self::new("You are 18 again. Choose wisely.", "Life")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MessageBank {
    #[serde(default)]
    pub harmful_action: Vec<Message>,
    #[serde(default)]
    pub craving: Vec<Message>,
    #[serde(default)]
    pub refusal: Vec<Message>,
    #[serde(default)]
    pub acute_toxicity: Vec<Message>,
    #[serde(default)]
    pub exercise: Vec<Message>,
    #[serde(default)]
    pub passive_recovery: Vec<Message>,
    #[serde(default)]
    pub hunger: Vec<Message>,
    #[serde(default)]
    pub inactivity: Vec<Message>,
}

impl MessageBank {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_MESSAGE_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_bank() -> &'static Self {
        static BANK: OnceLock<MessageBank> = OnceLock::new();
        BANK.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a message bank.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn entries(&self, category: MessageCategory) -> &[Message] {
        match category {
            MessageCategory::HarmfulAction => &self.harmful_action,
            MessageCategory::Craving => &self.craving,
            MessageCategory::Refusal => &self.refusal,
            MessageCategory::AcuteToxicity => &self.acute_toxicity,
            MessageCategory::Exercise => &self.exercise,
            MessageCategory::PassiveRecovery => &self.passive_recovery,
            MessageCategory::Hunger => &self.hunger,
            MessageCategory::Inactivity => &self.inactivity,
            MessageCategory::Recovery | MessageCategory::Life => &[],
        }
    }

    /// Pick a random entry; an empty category yields a bare placeholder
    /// carrying the category key so adapters still get a feedback event.
    #[must_use]
    pub fn pick(&self, category: MessageCategory, rng: &mut dyn RandomSource) -> Message {
        let entries = self.entries(category);
        if entries.is_empty() {
            return Message::new(category.key(), "");
        }
        entries[pick_index(rng, entries.len())].clone()
    }
}
