//! WordQuest Game Engine
//!
//! Platform-agnostic core for the WordQuest trivia adventure: the question
//! catalog, reward math, persistent player profile, skin shop and the session
//! state machine. No UI, audio or timing lives here; adapters drive the engine
//! and render the [`presenter::EngineEvent`]s it queues.

pub mod bank;
pub mod clock;
pub mod config;
pub mod constants;
pub mod presenter;
pub mod profile;
pub mod rewards;
pub mod rng;
pub mod session;
pub mod skins;

// Re-export commonly used types
pub use bank::{Chapter, Difficulty, LoadError, Question, QuestionBank, QuestionRef, ThemeToken};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use presenter::{Cue, EngineEvent, NullPresenter, Presenter, RecordingPresenter};
pub use profile::{
    JsonFileStorage, MemoryStorage, PersistenceWarning, ProfileRecord, ProfileStorage,
    ProfileStore, ProfileSummary, StorageError,
};
pub use rewards::{Reward, adventure_correct_reward, daily_bonus, reward_for, xp_for};
pub use rng::RngBundle;
pub use session::{
    Achievement, Advance, AnswerOutcome, ChapterSummary, DailySummary, DisplayMap,
    InvalidTransition, Mode, Phase, QuestionView, RunSummary, SessionEngine, SessionState,
    StreakChange, Summary,
};
pub use skins::{ActivateOutcome, Skin, SkinCatalog, SkinListing, UnlockOutcome};

use crate::constants::LOG_TARGET_SESSION;

/// Name under which loaders provide the [`EngineConfig`].
pub const ENGINE_CONFIG_NAME: &str = "engine";

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the question catalog from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or fails validation.
    fn load_catalog(&self) -> Result<QuestionBank, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Loader backed by the assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDataLoader;

impl EmbeddedDataLoader {
    const ENGINE_CONFIG: &'static str = include_str!("../assets/engine.json");
}

impl DataLoader for EmbeddedDataLoader {
    type Error = LoadError;

    fn load_catalog(&self) -> Result<QuestionBank, Self::Error> {
        QuestionBank::embedded()
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        // unknown names get an empty document so serde defaults apply
        let json = match config_name {
            ENGINE_CONFIG_NAME => Self::ENGINE_CONFIG,
            _ => "{}",
        };
        Ok(serde_json::from_str(json)?)
    }
}

/// Main game engine for wiring a catalog source to a profile backend
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: ProfileStorage + Clone,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: ProfileStorage + Clone,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the engine config, falling back to defaults when the provided
    /// one has a zero size.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    pub fn engine_config(&self) -> Result<EngineConfig, L::Error> {
        let config: EngineConfig = self.data_loader.load_config(ENGINE_CONFIG_NAME)?;
        if let Err(err) = config.validate() {
            log::warn!(target: LOG_TARGET_SESSION, "{err}; using default engine config");
            return Ok(EngineConfig::default());
        }
        Ok(config)
    }

    /// Construct an idle session with the catalog, config and stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or config cannot be loaded. Profile
    /// problems never fail; they fall back to defaults.
    pub fn create_session(&self, seed: u64) -> Result<SessionEngine<S>, L::Error> {
        let bank = self.data_loader.load_catalog()?;
        let config = self.engine_config()?;
        let profile = ProfileStore::load(self.storage.clone());
        Ok(SessionEngine::new(bank, profile, seed).with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader {
        daily: usize,
    }

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<QuestionBank, Self::Error> {
            let chapter = Chapter {
                title: "Fixture".into(),
                theme: ThemeToken("fixture".into()),
                questions: (0..6)
                    .map(|i| Question {
                        prompt: format!("Q{i}"),
                        options: ["a".into(), "b".into(), "c".into(), "d".into()],
                        correct_index: 0,
                        difficulty: None,
                        xp: None,
                    })
                    .collect(),
            };
            Ok(QuestionBank::from_chapters(vec![chapter]).unwrap())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let json = format!(r#"{{"daily_question_count": {}}}"#, self.daily);
            Ok(serde_json::from_str(&json).unwrap())
        }
    }

    #[test]
    fn embedded_loader_provides_catalog_and_config() {
        let loader = EmbeddedDataLoader;
        let bank = loader.load_catalog().unwrap();
        assert_eq!(bank.chapter_count(), 8);
        let config: EngineConfig = loader.load_config(ENGINE_CONFIG_NAME).unwrap();
        assert_eq!(config, EngineConfig::default());
        let fallback: EngineConfig = loader.load_config("missing").unwrap();
        assert_eq!(fallback, EngineConfig::default());
    }

    #[test]
    fn create_session_wires_config_and_profile() {
        let storage = MemoryStorage::with_contents(r#"{"coin_balance": 40}"#);
        let engine = GameEngine::new(FixtureLoader { daily: 3 }, storage);
        let mut session = engine.create_session(9).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.config().daily_question_count, 3);
        assert_eq!(session.profile().record().coin_balance, 40);

        session.start_daily();
        assert_eq!(session.state().daily_questions.len(), 3);
    }

    #[test]
    fn zero_sized_config_falls_back_to_defaults() {
        let engine = GameEngine::new(FixtureLoader { daily: 0 }, MemoryStorage::default());
        assert_eq!(engine.engine_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn sessions_with_equal_seeds_sample_identically() {
        let engine = GameEngine::new(EmbeddedDataLoader, MemoryStorage::default());
        let mut a = engine.create_session(2024).unwrap();
        let mut b = engine.create_session(2024).unwrap();
        a.start_adventure("Ada");
        b.start_adventure("Ada");
        assert_eq!(
            a.state().chapter_question_sets,
            b.state().chapter_question_sets
        );
        assert_eq!(a.display_map(), b.display_map());
    }
}
