//! Smokesim Game Engine
//!
//! Platform-agnostic core of the smoking lifespan idle simulation. The crate
//! owns the state model, the action and tick transitions, the mortality model
//! and the timer plumbing; rendering and storage live behind adapters.

pub mod actions;
pub mod config;
pub mod constants;
pub mod events;
pub mod messages;
pub mod mortality;
pub mod numbers;
pub mod result;
pub mod rng;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod tick;

use anyhow::Context;
use log::warn;

// Re-export commonly used types
pub use actions::SimRules;
pub use config::{ConfigError, SimConfig};
pub use events::{EffectCue, EventList, Feedback, Severity, SimEvent, Transition, UiSurfaceHint};
pub use messages::{Message, MessageBank, MessageCategory};
pub use mortality::{CauseDef, MortalityTable};
pub use result::{BodyCondition, LifeGapTier, RunSummary, addiction_warning};
pub use rng::{RandomSource, RngBundle, ScriptedSource, SeededSource};
pub use scheduler::{FiredTask, Scheduler, TaskKind};
pub use session::{Intent, SimSession};
pub use state::{SimState, TerminalCause};

/// Trait for abstracting persistence of the serialized state.
/// Platform-specific implementations should provide this
pub trait StateStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store the serialized state under `namespace`, replacing any previous payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be written.
    fn save_state(&self, namespace: &str, payload: &str) -> Result<(), Self::Error>;

    /// Raw payload previously stored under `namespace`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load_raw(&self, namespace: &str) -> Result<Option<String>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the payload exists but cannot be removed.
    fn delete(&self, namespace: &str) -> Result<(), Self::Error>;
}

/// Binds rules to a storage backend and hands out sessions.
pub struct SimEngine<S>
where
    S: StateStorage,
{
    storage: S,
    rules: SimRules,
    namespace: String,
}

impl<S> SimEngine<S>
where
    S: StateStorage,
{
    /// Engine with default rules under the standard namespace.
    pub fn new(storage: S) -> Self {
        Self::with_rules(storage, SimRules::default())
    }

    pub fn with_rules(storage: S, rules: SimRules) -> Self {
        Self {
            storage,
            rules,
            namespace: constants::STORAGE_NAMESPACE.to_string(),
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub const fn rules(&self) -> &SimRules {
        &self.rules
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Brand-new life, ignoring anything stored.
    pub fn create_session(&self, seed: u64, now_ms: i64) -> SimSession {
        SimSession::new(self.rules.clone(), seed, now_ms)
    }

    /// Resume the stored life, or start fresh when nothing usable is stored.
    pub fn resume_session(&self, seed: u64, now_ms: i64) -> SimSession {
        match self.load_state(now_ms) {
            Some(state) => SimSession::from_state(
                state,
                self.rules.clone(),
                RngBundle::from_user_seed(seed),
                now_ms,
            ),
            None => self.create_session(seed, now_ms),
        }
    }

    /// Load and repair the stored state. Never fails: unreadable storage and
    /// unparseable payloads both come back as `None`.
    pub fn load_state(&self, now_ms: i64) -> Option<SimState> {
        let raw = match self.storage.load_raw(&self.namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("discarding save {}: storage error: {err}", self.namespace);
                return None;
            }
        };
        let start_age = self.rules.config.aging.start_age_months;
        let state = SimState::from_json_lenient(&raw, start_age, now_ms);
        if state.is_none() {
            warn!("discarding save {}: payload is not a state object", self.namespace);
        }
        state
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or the storage write fails.
    pub fn save_state(&self, state: &SimState) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let payload = serde_json::to_string(state).context("serializing simulation state")?;
        if let Err(err) = self.storage.save_state(&self.namespace, &payload) {
            let err: anyhow::Error = err.into();
            return Err(err.context(format!("saving {}", self.namespace)));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the storage backend fails to delete the payload.
    pub fn delete_state(&self) -> Result<(), S::Error> {
        self.storage.delete(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, String>>>,
    }

    impl StateStorage for MemoryStorage {
        type Error = Infallible;

        fn save_state(&self, namespace: &str, payload: &str) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(namespace.to_string(), payload.to_string());
            Ok(())
        }

        fn load_raw(&self, namespace: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.saves.borrow().get(namespace).cloned())
        }

        fn delete(&self, namespace: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(namespace);
            Ok(())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct BrokenDisk;

    struct BrokenStorage;

    impl StateStorage for BrokenStorage {
        type Error = BrokenDisk;

        fn save_state(&self, _namespace: &str, _payload: &str) -> Result<(), Self::Error> {
            Err(BrokenDisk)
        }

        fn load_raw(&self, _namespace: &str) -> Result<Option<String>, Self::Error> {
            Err(BrokenDisk)
        }

        fn delete(&self, _namespace: &str) -> Result<(), Self::Error> {
            Err(BrokenDisk)
        }
    }

    #[test]
    fn engine_roundtrips_state() {
        let engine = SimEngine::new(MemoryStorage::default());
        let mut session = engine.create_session(0xABCD, 0);
        session.dispatch(Intent::Consume);
        let snapshot = session.into_state();
        engine.save_state(&snapshot).unwrap();

        let loaded = engine.load_state(99).expect("save exists");
        assert_eq!(loaded, snapshot);
        assert_eq!(engine.namespace(), "smokingsim_v2");

        engine.delete_state().unwrap();
        assert!(engine.load_state(0).is_none());
    }

    #[test]
    fn corrupted_payload_loads_as_none() {
        let storage = MemoryStorage::default();
        storage.save_state("smokingsim_v2", "{{not json").unwrap();
        let engine = SimEngine::new(storage);
        assert!(engine.load_state(0).is_none());
        let session = engine.resume_session(1, 0);
        assert!((session.state().biological_age_months - 216.0).abs() < 1e-9);
    }

    #[test]
    fn partial_payload_is_repaired() {
        let storage = MemoryStorage::default();
        storage
            .save_state("smokingsim_v2", r#"{"stamina": 40, "hunger_level": 20}"#)
            .unwrap();
        let engine = SimEngine::new(storage);
        let state = engine.load_state(1_234).unwrap();
        assert!((state.stamina - 40.0).abs() < 1e-9);
        assert!((state.chronological_age_months - 216.0).abs() < 1e-9);
        assert_eq!(state.last_interaction_ms, 1_234);
    }

    #[test]
    fn storage_failures_load_as_none_but_save_propagates() {
        let engine = SimEngine::new(BrokenStorage);
        assert!(engine.load_state(0).is_none());
        let err = engine.save_state(&SimState::default()).unwrap_err();
        assert!(format!("{err:#}").contains("disk on fire"));
    }

    #[test]
    fn custom_namespace_isolates_saves() {
        let storage = MemoryStorage::default();
        let engine = SimEngine::new(storage.clone()).with_namespace("slot-two");
        engine.save_state(&SimState::default()).unwrap();
        assert!(SimEngine::new(storage).load_state(0).is_none());
        assert!(engine.load_state(0).is_some());
    }
}
