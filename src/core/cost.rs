use chrono::NaiveDate;

use crate::{
    core::{
        calendar::{Calendar, DayMap, DayTrait},
        period::HolidayPeriod,
    },
    error::OutOfRangeError,
    quantity::Cost,
};

/// Budget cost of every horizon day.
#[must_use]
pub struct CostModel {
    costs: DayMap<Cost>,
}

impl CostModel {
    /// Weekend days and public holidays are free, any other day costs `unit_cost`.
    pub fn new(calendar: &Calendar, unit_cost: Cost) -> Self {
        let costs = calendar.map_days(|_, traits| {
            if DayTrait::is_free(traits) { Cost::ZERO } else { unit_cost }
        });
        Self { costs }
    }

    pub fn cost(&self, date: NaiveDate) -> Result<Cost, OutOfRangeError> {
        self.costs.get(date).copied()
    }

    pub fn period_cost(&self, period: HolidayPeriod) -> Result<Cost, OutOfRangeError> {
        period.all_days().map(|date| self.cost(date)).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use enumset::EnumSet;

    use super::*;
    use crate::core::calendar::Horizon;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Two weeks starting on Monday, 2025-01-06, with a public holiday on Wednesday.
    fn cost_model(unit_cost: Cost) -> CostModel {
        let calendar = Calendar::builder()
            .horizon(Horizon::try_new(date(2025, 1, 6), 14).unwrap())
            .public_holidays(&BTreeSet::from([date(2025, 1, 8)]))
            .preferred_weekdays(EnumSet::empty())
            .preferred_dates(&BTreeSet::new())
            .build();
        CostModel::new(&calendar, unit_cost)
    }

    #[test]
    fn single_day_cost() {
        let costs = cost_model(Cost(1));
        assert_eq!(costs.cost(date(2025, 1, 6)), Ok(Cost(1)));
        assert_eq!(costs.cost(date(2025, 1, 8)), Ok(Cost::ZERO));
        assert_eq!(costs.cost(date(2025, 1, 11)), Ok(Cost::ZERO));
        assert_eq!(costs.cost(date(2025, 1, 12)), Ok(Cost::ZERO));
    }

    #[test]
    fn unit_cost_is_configurable() {
        let costs = cost_model(Cost(8));
        assert_eq!(costs.cost(date(2025, 1, 7)), Ok(Cost(8)));
        assert_eq!(costs.cost(date(2025, 1, 11)), Ok(Cost::ZERO));
    }

    #[test]
    fn period_cost_ok() {
        let costs = cost_model(Cost(1));
        // Monday till Sunday, with the Wednesday holiday:
        assert_eq!(costs.period_cost(HolidayPeriod::new(date(2025, 1, 6), 7)), Ok(Cost(4)));
        assert_eq!(costs.period_cost(HolidayPeriod::new(date(2025, 1, 11), 2)), Ok(Cost::ZERO));
    }

    #[test]
    fn period_cost_grows_with_weekdays() {
        let costs = cost_model(Cost(1));
        let start = date(2025, 1, 13);
        for duration in 1..5 {
            let shorter = costs.period_cost(HolidayPeriod::new(start, duration)).unwrap();
            let longer = costs.period_cost(HolidayPeriod::new(start, duration + 1)).unwrap();
            assert!(longer > shorter, "duration={duration}");
        }
    }

    #[test]
    fn out_of_range() {
        let costs = cost_model(Cost(1));
        assert_eq!(
            costs.cost(date(2025, 1, 5)),
            Err(OutOfRangeError { date: date(2025, 1, 5), start: date(2025, 1, 6), end: date(2025, 1, 19) }),
        );
        assert!(costs.period_cost(HolidayPeriod::new(date(2025, 1, 18), 3)).is_err());
    }
}
