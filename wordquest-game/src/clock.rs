//! Calendar source for the daily streak.
use chrono::{Local, NaiveDate};

/// Supplies "today" to the engine.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Move the pinned date forward (or back) by whole days.
    pub fn advance_days(&mut self, days: i64) {
        self.0 += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        clock.advance_days(2);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
