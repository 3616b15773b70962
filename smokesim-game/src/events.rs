//! Structured events emitted by state transitions.
//!
//! The core never renders. Each applied transition returns the events an
//! adapter needs to update its surface: feedback lines, presentation cues and
//! lifecycle changes.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::messages::{Message, MessageCategory};
use crate::state::TerminalCause;

/// Severity tier for a feedback line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// Hint for how the UI should surface an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurfaceHint {
    Toast,
    Modal,
}

/// Transient visual/haptic cue. Durations are the adapter's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectCue {
    SmokePuff,
    Shake,
    Bounce,
    Vibrate { pattern_ms: Vec<u16> },
}

/// One feedback line with its bank category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub category: MessageCategory,
    pub severity: Severity,
    pub message: Message,
}

impl Feedback {
    #[must_use]
    pub const fn new(category: MessageCategory, severity: Severity, message: Message) -> Self {
        Self {
            category,
            severity,
            message,
        }
    }

    #[must_use]
    pub const fn info(category: MessageCategory, message: Message) -> Self {
        Self::new(category, Severity::Info, message)
    }

    #[must_use]
    pub const fn warning(category: MessageCategory, message: Message) -> Self {
        Self::new(category, Severity::Warning, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Feedback(Feedback),
    Effect(EffectCue),
    /// Acute toxicity saturation; auto-recovers after `recover_after_ms`.
    Collapsed { recover_after_ms: i64 },
    Recovered,
    Died { cause: TerminalCause },
    Reset,
    /// The pending feedback line expired.
    FeedbackCleared,
}

impl SimEvent {
    #[must_use]
    pub const fn surface_hint(&self) -> Option<UiSurfaceHint> {
        match self {
            Self::Feedback(_) => Some(UiSurfaceHint::Toast),
            Self::Collapsed { .. } | Self::Died { .. } => Some(UiSurfaceHint::Modal),
            Self::Effect(_) | Self::Recovered | Self::Reset | Self::FeedbackCleared => None,
        }
    }

    #[must_use]
    pub const fn feedback(&self) -> Option<&Feedback> {
        match self {
            Self::Feedback(feedback) => Some(feedback),
            _ => None,
        }
    }
}

pub type EventList = SmallVec<[SimEvent; 4]>;

/// Result of a single transition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// Whether the guard let the transition through.
    pub applied: bool,
    pub events: EventList,
}

impl Transition {
    /// Guard rejected the attempt: nothing changed, nothing to render.
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn applied() -> Self {
        Self {
            applied: true,
            events: EventList::new(),
        }
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn feedback(&mut self, feedback: Feedback) {
        self.events.push(SimEvent::Feedback(feedback));
    }

    pub fn cue(&mut self, cue: EffectCue) {
        self.events.push(SimEvent::Effect(cue));
    }

    #[must_use]
    pub fn died(&self) -> Option<&TerminalCause> {
        self.events.iter().find_map(|event| match event {
            SimEvent::Died { cause } => Some(cause),
            _ => None,
        })
    }

    #[must_use]
    pub fn collapsed(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, SimEvent::Collapsed { .. }))
    }

    /// Last feedback line in emission order.
    #[must_use]
    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.events.iter().rev().find_map(SimEvent::feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_transition_is_empty() {
        let transition = Transition::ignored();
        assert!(!transition.applied);
        assert!(transition.events.is_empty());
        assert!(transition.last_feedback().is_none());
    }

    #[test]
    fn last_feedback_picks_latest_line() {
        let mut transition = Transition::applied();
        transition.feedback(Feedback::info(
            MessageCategory::HarmfulAction,
            Message::new("first", "a"),
        ));
        transition.cue(EffectCue::Shake);
        transition.feedback(Feedback::warning(
            MessageCategory::AcuteToxicity,
            Message::new("second", "b"),
        ));
        let last = transition.last_feedback().unwrap();
        assert_eq!(last.message.text, "second");
        assert_eq!(last.severity, Severity::Warning);
    }

    #[test]
    fn event_json_is_tagged() {
        let event = SimEvent::Died {
            cause: TerminalCause::starvation(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "died");
        assert_eq!(json["cause"]["id"], "starvation");
        assert_eq!(event.surface_hint(), Some(UiSurfaceHint::Modal));
    }
}
