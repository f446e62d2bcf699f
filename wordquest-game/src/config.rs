//! Run-shape configuration.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DAILY_QUESTION_COUNT, QUESTIONS_PER_CHAPTER};

/// Errors raised when engine configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1 (got {value})")]
    Zero { field: &'static str, value: usize },
    #[error("engine config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Sizes that shape a run. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cap on questions sampled per chapter; also the per-chapter unit of
    /// the adventure accuracy denominator.
    #[serde(default = "EngineConfig::default_questions_per_chapter")]
    pub questions_per_chapter: usize,
    #[serde(default = "EngineConfig::default_daily_question_count")]
    pub daily_question_count: usize,
}

impl EngineConfig {
    const fn default_questions_per_chapter() -> usize {
        QUESTIONS_PER_CHAPTER
    }

    const fn default_daily_question_count() -> usize {
        DAILY_QUESTION_COUNT
    }

    /// Parse and validate a config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a size is zero.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] if either size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.questions_per_chapter == 0 {
            return Err(ConfigError::Zero {
                field: "questions_per_chapter",
                value: self.questions_per_chapter,
            });
        }
        if self.daily_question_count == 0 {
            return Err(ConfigError::Zero {
                field: "daily_question_count",
                value: self.daily_question_count,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            questions_per_chapter: Self::default_questions_per_chapter(),
            daily_question_count: Self::default_daily_question_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = EngineConfig::from_json("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.questions_per_chapter, 10);
        assert_eq!(cfg.daily_question_count, 5);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let err = EngineConfig::from_json(r#"{"daily_question_count": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Zero {
                field: "daily_question_count",
                ..
            }
        ));
    }
}
