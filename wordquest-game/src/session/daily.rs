use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::bank::{QuestionBank, QuestionRef};
use crate::profile::ProfileRecord;

const ISO_DATE: &str = "%Y-%m-%d";

/// How a finished daily moved the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Already finished a daily today.
    Unchanged,
    /// Finished yesterday as well.
    Extended,
    /// First daily ever, a gap of two or more days, or a date in the future.
    Restarted,
}

/// Result screen data for a finished daily challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
    pub streak: u32,
    pub streak_change: StreakChange,
    pub bonus: u32,
    /// Run coins including the bonus.
    pub coins: u32,
    pub coin_balance: u32,
}

/// Apply today's completion to the streak fields of `record`.
pub fn update_streak(record: &mut ProfileRecord, today: NaiveDate) -> StreakChange {
    let today_iso = today.format(ISO_DATE).to_string();
    let change = if record.last_daily_date == today_iso {
        StreakChange::Unchanged
    } else {
        let previous = NaiveDate::parse_from_str(&record.last_daily_date, ISO_DATE).ok();
        match previous {
            Some(last) if today.signed_duration_since(last).num_days() == 1 => {
                record.daily_streak = record.daily_streak.saturating_add(1);
                StreakChange::Extended
            }
            _ => {
                record.daily_streak = 1;
                StreakChange::Restarted
            }
        }
    };
    record.last_daily_date = today_iso;
    change
}

/// Draw `count` distinct questions uniformly from the whole bank.
pub fn build_daily_pool<R: Rng + ?Sized>(
    bank: &QuestionBank,
    count: usize,
    rng: &mut R,
) -> Vec<QuestionRef> {
    let mut pool = bank.all_refs();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(streak: u32, last: &str) -> ProfileRecord {
        ProfileRecord {
            daily_streak: streak,
            last_daily_date: last.to_string(),
            ..ProfileRecord::default()
        }
    }

    #[test]
    fn first_daily_starts_streak() {
        let mut rec = record(0, "");
        assert_eq!(update_streak(&mut rec, date(2024, 3, 10)), StreakChange::Restarted);
        assert_eq!(rec.daily_streak, 1);
        assert_eq!(rec.last_daily_date, "2024-03-10");
    }

    #[test]
    fn consecutive_day_extends_streak() {
        let mut rec = record(4, "2024-02-29");
        assert_eq!(update_streak(&mut rec, date(2024, 3, 1)), StreakChange::Extended);
        assert_eq!(rec.daily_streak, 5);
    }

    #[test]
    fn same_day_is_idempotent() {
        let mut rec = record(3, "2024-03-10");
        assert_eq!(update_streak(&mut rec, date(2024, 3, 10)), StreakChange::Unchanged);
        assert_eq!(rec.daily_streak, 3);
        assert_eq!(rec.last_daily_date, "2024-03-10");
    }

    #[test]
    fn gaps_future_dates_and_garbage_restart() {
        let mut gap = record(9, "2024-03-07");
        update_streak(&mut gap, date(2024, 3, 10));
        assert_eq!(gap.daily_streak, 1);

        let mut future = record(9, "2024-03-11");
        update_streak(&mut future, date(2024, 3, 10));
        assert_eq!(future.daily_streak, 1);

        let mut garbage = record(9, "yesterday");
        update_streak(&mut garbage, date(2024, 3, 10));
        assert_eq!(garbage.daily_streak, 1);
        assert_eq!(garbage.last_daily_date, "2024-03-10");
    }

    #[test]
    fn daily_pool_is_distinct_and_capped() {
        let bank = QuestionBank::embedded().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let pool = build_daily_pool(&bank, 5, &mut rng);
        assert_eq!(pool.len(), 5);
        let unique: HashSet<_> = pool.iter().collect();
        assert_eq!(unique.len(), 5);

        let everything = build_daily_pool(&bank, usize::MAX, &mut rng);
        assert_eq!(everything.len(), bank.total_questions());
    }
}
