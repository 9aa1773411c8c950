use chrono::{Datelike, Local, NaiveDate};

/// Source of "today" for the ledger.
pub trait Clock {
    fn today(&self) -> NaiveDate;

    /// True when `date` falls in the same calendar month as today.
    fn in_current_month(&self, date: NaiveDate) -> bool {
        let today = self.today();
        date.year() == today.year() && date.month() == today.month()
    }
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
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
