use std::{cell::Cell, fmt, rc::Rc};

use chrono::{Days, Local, NaiveDate};

/// Source of the current calendar date
pub trait Clock: fmt::Debug {
    /// Today's date
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same date, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Shared current date
    today: Rc<Cell<NaiveDate>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Rc::new(Cell::new(today)),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        self.today.set(today);
    }

    /// Move the date forward by `days`
    pub fn advance(&self, days: u64) {
        let next = self
            .today
            .get()
            .checked_add_days(Days::new(days))
            .unwrap_or(NaiveDate::MAX);
        self.today.set(next);
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap_or(NaiveDate::MIN);
        let clock = ManualClock::new(start);
        let handle = clock.clone();
        handle.advance(3);
        let expected = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap_or(NaiveDate::MIN);
        assert_eq!(clock.today(), expected);
    }
}
