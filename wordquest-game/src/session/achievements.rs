//! One-shot milestone checks run after each correct answer.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{COIN_COLLECTOR_COINS, FIRST_FIVE_SCORE, RISING_SCHOLAR_SCORE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstFiveCorrect,
    RisingScholar,
    CoinCollector,
    ChapterMaster,
}

impl Achievement {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FirstFiveCorrect => "First 5 Correct",
            Self::RisingScholar => "Rising Scholar",
            Self::CoinCollector => "Coin Collector",
            Self::ChapterMaster => "Chapter Master",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Achievements unlocked by the post-answer tallies. Pure; the caller
/// decides how to announce them.
#[must_use]
pub fn check_achievements(
    score: u32,
    coins: u32,
    chapter_index: usize,
    last_chapter_index: usize,
) -> SmallVec<[Achievement; 4]> {
    let mut unlocked = SmallVec::new();
    if score == FIRST_FIVE_SCORE {
        unlocked.push(Achievement::FirstFiveCorrect);
    }
    if score == RISING_SCHOLAR_SCORE {
        unlocked.push(Achievement::RisingScholar);
    }
    if coins >= COIN_COLLECTOR_COINS {
        unlocked.push(Achievement::CoinCollector);
    }
    if chapter_index == last_chapter_index {
        unlocked.push(Achievement::ChapterMaster);
    }
    unlocked
}
