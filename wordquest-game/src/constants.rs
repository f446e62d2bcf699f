//! Centralized balance and tuning constants for WordQuest game logic.
//!
//! These values define the reward math and pacing for the session engine.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Run shape ----------------------------------------------------------------
pub const QUESTIONS_PER_CHAPTER: usize = 10;
pub const DAILY_QUESTION_COUNT: usize = 5;
pub const OPTION_COUNT: usize = 4;
pub const DEFAULT_PLAYER_NAME: &str = "Player";

// Rewards ------------------------------------------------------------------
pub const ADVENTURE_CORRECT_COINS: u32 = 25;
pub const FALLBACK_XP: u32 = 10;
pub const EASY_REWARD: (u32, u32) = (15, 10);
pub const MEDIUM_REWARD: (u32, u32) = (25, 15);
pub const HARD_REWARD: (u32, u32) = (50, 30);
pub const UNKNOWN_REWARD: (u32, u32) = (20, 10);
pub const DAILY_BONUS_PER_STREAK_DAY: u32 = 10;
pub const DAILY_BONUS_CAP: u32 = 100;

// Achievements -------------------------------------------------------------
pub const FIRST_FIVE_SCORE: u32 = 5;
pub const RISING_SCHOLAR_SCORE: u32 = 10;
pub const COIN_COLLECTOR_COINS: u32 = 100;

// Profile ------------------------------------------------------------------
pub const DEFAULT_SKIN_ID: &str = "default";
pub const DEFAULT_HIGHEST_CHAPTER: u32 = 1;
pub const PROFILE_FILE_NAME: &str = "scores.json";

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_TARGET_SESSION: &str = "wordquest::session";
pub(crate) const LOG_TARGET_PROFILE: &str = "wordquest::profile";
pub(crate) const LOG_TARGET_SKINS: &str = "wordquest::skins";
