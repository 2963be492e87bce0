use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

use bon::bon;
use chrono::{Datelike, Days, NaiveDate};
use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigurationError, OutOfRangeError},
    prelude::*,
};

/// Day of the week, numbered the ISO way: Monday is 1 and Sunday is 7.
#[derive(Debug, Hash, EnumSetType, Serialize, Deserialize, clap::ValueEnum)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    #[must_use]
    pub const fn iso_number(self) -> u32 {
        self as u32 + 1
    }

    #[must_use]
    pub const fn is_weekend(self) -> bool {
        matches!(self, Self::Saturday | Self::Sunday)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        };
        write!(f, "{name}")
    }
}

/// Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    Weekday::of(date).is_weekend()
}

/// Ordered, inclusive range of planning days.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[must_use]
pub struct Horizon {
    start: NaiveDate,
    end: NaiveDate,
}

impl Horizon {
    pub fn try_new(start: NaiveDate, n_days: u32) -> Result<Self, ConfigurationError> {
        let last_offset = n_days.checked_sub(1).ok_or(ConfigurationError::EmptyHorizon)?;
        let end = start
            .checked_add_days(Days::new(u64::from(last_offset)))
            .ok_or(ConfigurationError::HorizonOverflow { start })?;
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    /// Last day of the horizon, inclusive.
    #[must_use]
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn n_days(self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// All the dates in ascending order.
    pub fn dates(self) -> impl Iterator<Item = NaiveDate> + Clone {
        self.start.iter_days().take(self.n_days())
    }

    pub fn weekend_days(self) -> impl Iterator<Item = NaiveDate> + Clone {
        self.dates().filter(|date| is_weekend(*date))
    }

    /// Position of the date within the horizon.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn index_of(self, date: NaiveDate) -> Result<usize, OutOfRangeError> {
        if self.contains(date) {
            Ok((date - self.start).num_days() as usize)
        } else {
            Err(OutOfRangeError { date, start: self.start, end: self.end })
        }
    }
}

/// Dense per-day lookup over a horizon, built once and read-only afterwards.
#[derive(Clone, Debug)]
#[must_use]
pub struct DayMap<T> {
    horizon: Horizon,
    values: Vec<T>,
}

impl<T> DayMap<T> {
    pub fn from_fn(horizon: Horizon, f: impl FnMut(NaiveDate) -> T) -> Self {
        Self { horizon, values: horizon.dates().map(f).collect() }
    }

    pub const fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn get(&self, date: NaiveDate) -> Result<&T, OutOfRangeError> {
        Ok(&self.values[self.horizon.index_of(date)?])
    }

    pub fn get_mut(&mut self, date: NaiveDate) -> Result<&mut T, OutOfRangeError> {
        let index = self.horizon.index_of(date)?;
        Ok(&mut self.values[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &T)> {
        self.horizon.dates().zip(&self.values)
    }

    /// Derive another lookup over the same horizon.
    pub fn map<U>(&self, mut f: impl FnMut(NaiveDate, &T) -> U) -> DayMap<U> {
        DayMap { horizon: self.horizon, values: self.iter().map(|(date, value)| f(date, value)).collect() }
    }
}

/// Facts known about a single calendar day.
#[derive(Debug, EnumSetType)]
pub enum DayTrait {
    Weekend,
    PublicHoliday,
    PreferredWeekday,
    PreferredDate,
}

impl DayTrait {
    #[must_use]
    pub fn is_free(traits: EnumSet<Self>) -> bool {
        !traits.is_disjoint(Self::Weekend | Self::PublicHoliday)
    }
}

/// Rendering class of a day, in the order of precedence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum DayType {
    Regular = 0,
    PublicHoliday = 1,
    Weekend = 2,
    DayOff = 3,
}

impl DayType {
    pub fn classify(traits: EnumSet<DayTrait>, is_day_off: bool) -> Self {
        if traits.contains(DayTrait::PublicHoliday) {
            Self::PublicHoliday
        } else if traits.contains(DayTrait::Weekend) {
            Self::Weekend
        } else if is_day_off {
            Self::DayOff
        } else {
            Self::Regular
        }
    }
}

/// Classified planning horizon.
#[must_use]
pub struct Calendar {
    traits: DayMap<EnumSet<DayTrait>>,
}

#[bon]
impl Calendar {
    /// Classify every day of the horizon.
    ///
    /// Public holidays and preferred dates outside of the horizon are ignored.
    #[builder]
    pub fn new(
        horizon: Horizon,
        public_holidays: &BTreeSet<NaiveDate>,
        preferred_weekdays: EnumSet<Weekday>,
        preferred_dates: &BTreeSet<NaiveDate>,
    ) -> Self {
        let n_ignored = public_holidays.iter().filter(|date| !horizon.contains(**date)).count();
        if n_ignored != 0 {
            debug!(n_ignored, "some public holidays are outside of the horizon");
        }
        let traits = DayMap::from_fn(horizon, |date| {
            let mut traits = EnumSet::empty();
            if is_weekend(date) {
                traits.insert(DayTrait::Weekend);
            }
            if public_holidays.contains(&date) {
                traits.insert(DayTrait::PublicHoliday);
            }
            if preferred_weekdays.contains(Weekday::of(date)) {
                traits.insert(DayTrait::PreferredWeekday);
            }
            if preferred_dates.contains(&date) {
                traits.insert(DayTrait::PreferredDate);
            }
            traits
        });
        Self { traits }
    }

    pub const fn horizon(&self) -> Horizon {
        self.traits.horizon()
    }

    pub fn traits(&self, date: NaiveDate) -> Result<EnumSet<DayTrait>, OutOfRangeError> {
        self.traits.get(date).copied()
    }

    /// Weekend days and public holidays do not cost anything.
    pub fn is_free(&self, date: NaiveDate) -> Result<bool, OutOfRangeError> {
        Ok(DayTrait::is_free(self.traits(date)?))
    }

    /// Build a per-day lookup from the day traits.
    pub fn map_days<T>(&self, mut f: impl FnMut(NaiveDate, EnumSet<DayTrait>) -> T) -> DayMap<T> {
        self.traits.map(|date, traits| f(date, *traits))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, EnumSet<DayTrait>)> {
        self.traits.iter().map(|(date, traits)| (date, *traits))
    }

    pub fn public_holidays(&self) -> impl Iterator<Item = NaiveDate> {
        self.iter()
            .filter(|(_, traits)| traits.contains(DayTrait::PublicHoliday))
            .map(|(date, _)| date)
    }
}
