//! Coin and XP payouts.
use serde::{Deserialize, Serialize};

use crate::bank::{Difficulty, Question};
use crate::constants::{
    ADVENTURE_CORRECT_COINS, DAILY_BONUS_CAP, DAILY_BONUS_PER_STREAK_DAY, EASY_REWARD,
    FALLBACK_XP, HARD_REWARD, MEDIUM_REWARD, UNKNOWN_REWARD,
};

/// Coins and XP granted for a single correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub coins: u32,
    pub xp: u32,
}

impl From<(u32, u32)> for Reward {
    fn from((coins, xp): (u32, u32)) -> Self {
        Self { coins, xp }
    }
}

/// Difficulty-keyed reward table.
#[must_use]
pub fn reward_for(difficulty: Difficulty) -> Reward {
    match difficulty {
        Difficulty::Easy => EASY_REWARD,
        Difficulty::Medium => MEDIUM_REWARD,
        Difficulty::Hard => HARD_REWARD,
        Difficulty::Unknown => UNKNOWN_REWARD,
    }
    .into()
}

/// Flat coin payout for any correct answer in a scored run.
#[must_use]
pub const fn adventure_correct_reward() -> u32 {
    ADVENTURE_CORRECT_COINS
}

/// XP for a correct answer: the table value for tagged questions, the
/// question's own hint (or a flat fallback) for untagged ones.
#[must_use]
pub fn xp_for(question: &Question) -> u32 {
    question.difficulty.map_or_else(
        || question.xp.unwrap_or(FALLBACK_XP),
        |difficulty| reward_for(difficulty).xp,
    )
}

/// Completion bonus for a daily challenge at the given streak length.
#[must_use]
pub fn daily_bonus(streak: u32) -> u32 {
    streak
        .saturating_mul(DAILY_BONUS_PER_STREAK_DAY)
        .min(DAILY_BONUS_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(difficulty: Option<Difficulty>, xp: Option<u32>) -> Question {
        Question {
            prompt: "Q".into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 0,
            difficulty,
            xp,
        }
    }

    #[test]
    fn table_matches_tuning() {
        assert_eq!(reward_for(Difficulty::Easy), Reward { coins: 15, xp: 10 });
        assert_eq!(reward_for(Difficulty::Medium), Reward { coins: 25, xp: 15 });
        assert_eq!(reward_for(Difficulty::Hard), Reward { coins: 50, xp: 30 });
        assert_eq!(reward_for(Difficulty::Unknown), Reward { coins: 20, xp: 10 });
        assert_eq!(adventure_correct_reward(), 25);
    }

    #[test]
    fn xp_prefers_table_then_hint() {
        assert_eq!(xp_for(&question(Some(Difficulty::Hard), Some(99))), 30);
        assert_eq!(xp_for(&question(None, Some(7))), 7);
        assert_eq!(xp_for(&question(None, None)), 10);
    }

    #[test]
    fn daily_bonus_caps_at_one_hundred() {
        assert_eq!(daily_bonus(0), 0);
        assert_eq!(daily_bonus(1), 10);
        assert_eq!(daily_bonus(7), 70);
        assert_eq!(daily_bonus(10), 100);
        assert_eq!(daily_bonus(45), 100);
        assert_eq!(daily_bonus(u32::MAX), 100);
    }
}
