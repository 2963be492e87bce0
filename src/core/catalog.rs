use std::ops::Index;

use chrono::{Days, NaiveDate};
use itertools::Itertools;

use crate::{
    core::{
        calendar::{DayMap, Horizon},
        period::HolidayPeriod,
    },
    prelude::*,
};

/// Position of a period in the [`PeriodCatalog`].
///
/// Decision variables, costs and utilities are all indexed by it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, derive_more::Display)]
#[display("#{_0}")]
pub struct PeriodId(pub usize);

/// Dense arena of every candidate holiday period.
#[must_use]
pub struct PeriodCatalog {
    periods: Vec<HolidayPeriod>,
}

impl PeriodCatalog {
    /// Enumerate every period starting on one of the dates and not ending after `horizon_end`.
    ///
    /// Start dates are visited in ascending order and, for each of them, durations grow from one
    /// day to `max_duration`.
    #[instrument(skip_all, fields(max_duration = max_duration, horizon_end = %horizon_end))]
    pub fn generate(
        start_dates: impl IntoIterator<Item = NaiveDate>,
        max_duration: u32,
        horizon_end: NaiveDate,
    ) -> Self {
        let mut periods = Vec::new();
        for start_date in start_dates.into_iter().sorted_unstable().dedup() {
            for duration in 1..=max_duration {
                let Some(end_date) = start_date.checked_add_days(Days::new(u64::from(duration - 1)))
                else {
                    break;
                };
                if end_date > horizon_end {
                    // Longer ones would end even later:
                    break;
                }
                periods.push(HolidayPeriod::new(start_date, duration));
            }
        }
        info!(n_periods = periods.len(), "generated the catalog");
        Self { periods }
    }

    /// Catalog of the periods starting on any day of the horizon.
    pub fn for_horizon(horizon: Horizon, max_duration: u32) -> Self {
        Self::generate(horizon.dates(), max_duration, horizon.end())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.periods.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    #[must_use]
    pub fn periods(&self) -> &[HolidayPeriod] {
        &self.periods
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeriodId, HolidayPeriod)> {
        self.periods.iter().copied().enumerate().map(|(index, period)| (PeriodId(index), period))
    }

    /// Build the inverted index: for each horizon day, the periods covering it.
    ///
    /// Days outside of the horizon are not indexed.
    pub fn covering_index(&self, horizon: Horizon) -> DayMap<Vec<PeriodId>> {
        let mut index = DayMap::from_fn(horizon, |_| Vec::new());
        for (period_id, period) in self.iter() {
            for date in period.all_days() {
                if let Ok(bucket) = index.get_mut(date) {
                    bucket.push(period_id);
                }
            }
        }
        index
    }
}

impl Index<PeriodId> for PeriodCatalog {
    type Output = HolidayPeriod;

    fn index(&self, id: PeriodId) -> &Self::Output {
        &self.periods[id.0]
    }
}
