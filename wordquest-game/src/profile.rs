//! Persistent player profile: lifetime stats, coin balance, skins and streak.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::constants::{DEFAULT_HIGHEST_CHAPTER, DEFAULT_SKIN_ID, LOG_TARGET_PROFILE};

/// Cross-run player record. Missing keys in a stored record are backfilled
/// from [`ProfileRecord::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub best_score: u32,
    pub best_accuracy: f64,
    /// Lifetime coins earned; spending never lowers it.
    pub total_coins_earned: u32,
    /// Spendable coins.
    pub coin_balance: u32,
    pub highest_chapter_completed: u32,
    pub total_correct_all_time: u32,
    pub total_questions_all_time: u32,
    pub max_coins_single_run: u32,
    pub daily_streak: u32,
    /// ISO date (`YYYY-MM-DD`) of the last finished daily, or empty.
    pub last_daily_date: String,
    pub skins_unlocked: BTreeSet<String>,
    pub active_skin: String,
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self {
            best_score: 0,
            best_accuracy: 0.0,
            total_coins_earned: 0,
            coin_balance: 0,
            highest_chapter_completed: DEFAULT_HIGHEST_CHAPTER,
            total_correct_all_time: 0,
            total_questions_all_time: 0,
            max_coins_single_run: 0,
            daily_streak: 0,
            last_daily_date: String::new(),
            skins_unlocked: BTreeSet::from([DEFAULT_SKIN_ID.to_string()]),
            active_skin: DEFAULT_SKIN_ID.to_string(),
        }
    }
}

impl ProfileRecord {
    /// Parse a stored record, backfilling missing keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Restore the skin invariants: `default` is always owned and the active
    /// skin is always an owned one.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.skins_unlocked.insert(DEFAULT_SKIN_ID.to_string());
        if !self.skins_unlocked.contains(&self.active_skin) {
            self.active_skin = DEFAULT_SKIN_ID.to_string();
        }
        if !self.best_accuracy.is_finite() {
            self.best_accuracy = 0.0;
        }
        self.best_accuracy = self.best_accuracy.clamp(0.0, 100.0);
        self
    }

    /// Lifetime accuracy in percent, 0 before any question was answered.
    #[must_use]
    pub fn average_accuracy(&self) -> f64 {
        if self.total_questions_all_time == 0 {
            return 0.0;
        }
        f64::from(self.total_correct_all_time) / f64::from(self.total_questions_all_time) * 100.0
    }

    /// Credit a finished run's coins and answers to the lifetime totals.
    pub fn credit_run(&mut self, coins: u32, correct: u32, questions: u32) {
        self.total_coins_earned = self.total_coins_earned.saturating_add(coins);
        self.coin_balance = self.coin_balance.saturating_add(coins);
        self.total_correct_all_time = self.total_correct_all_time.saturating_add(correct);
        self.total_questions_all_time = self.total_questions_all_time.saturating_add(questions);
        self.max_coins_single_run = self.max_coins_single_run.max(coins);
    }

    #[must_use]
    pub fn owns_skin(&self, skin_id: &str) -> bool {
        self.skins_unlocked.contains(skin_id)
    }
}

/// Read-only digest for a profile screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub best_score: u32,
    pub best_accuracy: f64,
    pub total_correct: u32,
    pub total_questions: u32,
    pub average_accuracy: f64,
    pub total_coins_earned: u32,
    pub coin_balance: u32,
    pub daily_streak: u32,
    pub active_skin_name: String,
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("profile I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("profile serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Recovered profile failures. Never surfaced to the player.
#[derive(Debug, Error)]
pub enum PersistenceWarning {
    #[error("could not read profile, using defaults: {0}")]
    Read(String),
    #[error("stored profile is corrupt, using defaults: {0}")]
    Corrupt(String),
    #[error("could not save profile, keeping in-memory state: {0}")]
    Write(String),
}

/// Raw byte-level access to wherever the profile lives.
pub trait ProfileStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the stored document, `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the stored document wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&self, contents: &str) -> Result<(), Self::Error>;
}

/// JSON file on disk. Writes go to a sibling temp file which is then renamed
/// over the target so a crash never leaves a half-written profile.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ProfileStorage for JsonFileStorage {
    type Error = StorageError;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory backend. Clones share the same slot, so a test can keep a
/// handle and inspect what the engine wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
    fail_writes: Rc<RefCell<bool>>,
}

/// Error produced by [`MemoryStorage`] when writes are switched off.
#[derive(Debug, Error)]
#[error("memory storage rejected the write")]
pub struct MemoryStorageError;

impl MemoryStorage {
    /// Start with an existing stored document.
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.slot.borrow_mut() = Some(contents.into());
        storage
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }
}

impl ProfileStorage for MemoryStorage {
    type Error = MemoryStorageError;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&self, contents: &str) -> Result<(), Self::Error> {
        if *self.fail_writes.borrow() {
            return Err(MemoryStorageError);
        }
        *self.slot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// The authoritative in-memory profile plus its best-effort backing store.
#[derive(Debug)]
pub struct ProfileStore<S: ProfileStorage> {
    storage: S,
    record: ProfileRecord,
    last_warning: Option<PersistenceWarning>,
}

impl<S: ProfileStorage> ProfileStore<S> {
    /// Load the stored profile, falling back to defaults on any failure.
    pub fn load(storage: S) -> Self {
        let (record, last_warning) = match storage.read() {
            Ok(None) => (ProfileRecord::default(), None),
            Ok(Some(contents)) => match ProfileRecord::from_json(&contents) {
                Ok(record) => (record, None),
                Err(err) => (
                    ProfileRecord::default(),
                    Some(PersistenceWarning::Corrupt(err.to_string())),
                ),
            },
            Err(err) => (
                ProfileRecord::default(),
                Some(PersistenceWarning::Read(err.to_string())),
            ),
        };
        if let Some(warning) = &last_warning {
            log::warn!(target: LOG_TARGET_PROFILE, "{warning}");
        }
        Self {
            storage,
            record,
            last_warning,
        }
    }

    #[must_use]
    pub const fn record(&self) -> &ProfileRecord {
        &self.record
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Most recent recovered failure, if any.
    #[must_use]
    pub const fn last_warning(&self) -> Option<&PersistenceWarning> {
        self.last_warning.as_ref()
    }

    /// Mutate the record and persist it immediately.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut ProfileRecord) -> R) -> R {
        let result = f(&mut self.record);
        self.save();
        result
    }

    /// Write the current record. Failures are logged and swallowed; the
    /// in-memory record stays authoritative for this process.
    pub fn save(&mut self) {
        let outcome = serde_json::to_string_pretty(&self.record)
            .map_err(|err| err.to_string())
            .and_then(|json| self.storage.write(&json).map_err(|err| err.to_string()));
        match outcome {
            Ok(()) => {
                log::debug!(target: LOG_TARGET_PROFILE, "profile saved");
            }
            Err(err) => {
                let warning = PersistenceWarning::Write(err);
                log::warn!(target: LOG_TARGET_PROFILE, "{warning}");
                self.last_warning = Some(warning);
            }
        }
    }
}
