use std::fmt::{Debug, Display, Formatter};

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Contiguous run of calendar days.
///
/// Periods are only created by the [`crate::core::catalog::PeriodCatalog`], which guarantees
/// that the end date stays within the planning horizon.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[must_use]
pub struct HolidayPeriod {
    start_date: NaiveDate,
    duration: u32,
}

impl HolidayPeriod {
    pub fn new(start_date: NaiveDate, duration: u32) -> Self {
        debug_assert!(duration >= 1, "a period lasts at least one day");
        Self { start_date, duration }
    }

    #[must_use]
    pub const fn start_date(self) -> NaiveDate {
        self.start_date
    }

    /// Duration in days.
    #[must_use]
    pub const fn duration(self) -> u32 {
        self.duration
    }

    /// Last day of the period, inclusive.
    #[must_use]
    pub fn end_date(self) -> NaiveDate {
        self.start_date + Days::new(u64::from(self.duration - 1))
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        (self.start_date <= date) && (date <= self.end_date())
    }

    /// Every day of the period in ascending order.
    pub fn all_days(self) -> impl Iterator<Item = NaiveDate> + Clone {
        self.start_date.iter_days().take(self.duration as usize)
    }
}

impl Debug for HolidayPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}d", self.start_date, self.duration)
    }
}

impl Display for HolidayPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} – {}", self.start_date, self.end_date())
    }
}
