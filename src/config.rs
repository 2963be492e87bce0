use std::{collections::BTreeSet, time::Duration};

use bon::Builder;
use chrono::NaiveDate;
use enumset::{EnumSet, enum_set};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};

use crate::{
    core::calendar::{Horizon, Weekday},
    error::ConfigurationError,
    quantity::{Cost, Utility},
};

const DEFAULT_HORIZON_START: NaiveDate = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
const DEFAULT_HORIZON_DAYS: u32 = 365;
const DEFAULT_MAX_PERIOD_LENGTH: u32 = 20;
const DEFAULT_BUDGET: u32 = 30;
const DEFAULT_MIN_VALUE_THRESHOLD: u32 = 3;
const DEFAULT_GAIN_START: u32 = 4;
const DEFAULT_GAIN_CUTOFF: u32 = 20;
const DEFAULT_UNIT_GAIN: f64 = 1.0;
const DEFAULT_BASELINE_VALUE: f64 = 1.0;
const DEFAULT_BONUS_VALUE: f64 = 0.5;
const DEFAULT_UNIT_COST: u32 = 1;
const DEFAULT_PREFERRED_WEEKDAYS: EnumSet<Weekday> = enum_set!(Weekday::Friday);
const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);

/// How the marginal bonus is applied to a day matching several preferences.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusPolicy {
    /// The first matching preference wins, the bonus is applied at most once.
    #[default]
    Once,

    /// Every matching preference adds its own bonus.
    Stack,
}

/// Immutable planner settings, constructed once and passed by reference.
#[serde_as]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// First day of the planning horizon.
    #[builder(default = DEFAULT_HORIZON_START)]
    pub horizon_start: NaiveDate,

    /// Number of days in the planning horizon.
    #[builder(default = DEFAULT_HORIZON_DAYS)]
    pub horizon_days: u32,

    /// Longest holiday period to consider, in days.
    #[builder(default = DEFAULT_MAX_PERIOD_LENGTH)]
    pub max_period_length: u32,

    /// Total number of paid days off available.
    #[builder(default = DEFAULT_BUDGET)]
    pub budget: u32,

    /// Periods shorter than this are considered too short to rest and get no utility.
    #[builder(default = DEFAULT_MIN_VALUE_THRESHOLD)]
    pub min_value_threshold: u32,

    /// Period length at which the duration bonus starts to accumulate.
    #[builder(default = DEFAULT_GAIN_START)]
    pub gain_start: u32,

    /// Period length after which the duration bonus stays flat.
    #[builder(default = DEFAULT_GAIN_CUTOFF)]
    pub gain_cutoff: u32,

    /// Duration bonus per day within the gain range.
    #[builder(default = DEFAULT_UNIT_GAIN)]
    pub unit_gain: f64,

    /// Marginal value of any day off.
    #[builder(default = DEFAULT_BASELINE_VALUE)]
    pub baseline_value: f64,

    /// Extra marginal value of a preferred day off.
    #[builder(default = DEFAULT_BONUS_VALUE)]
    pub bonus_value: f64,

    #[builder(default)]
    pub bonus_policy: BonusPolicy,

    #[builder(default = DEFAULT_PREFERRED_WEEKDAYS)]
    pub preferred_weekdays: EnumSet<Weekday>,

    #[builder(default)]
    pub preferred_dates: BTreeSet<NaiveDate>,

    /// Budget units charged for a day which is neither a weekend day nor a public holiday.
    #[builder(default = DEFAULT_UNIT_COST)]
    pub unit_cost: u32,

    /// When set, at least one selected period must be at least this long.
    pub min_period_duration: Option<u32>,

    /// Dates which must be covered by a selected period.
    #[builder(default)]
    pub mandatory_dates: BTreeSet<NaiveDate>,

    /// Wall-clock limit passed to the solver.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "time_limit_secs")]
    #[builder(default = DEFAULT_TIME_LIMIT)]
    pub time_limit: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::builder().preferred_dates(BTreeSet::from([june_nineteenth()])).build()
    }
}

const fn june_nineteenth() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 19).expect("valid date")
}

impl PlannerConfig {
    /// Reject invalid parameter combinations before anything gets built.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let horizon = self.horizon()?;

        if self.max_period_length == 0 {
            return Err(ConfigurationError::ZeroMaxPeriodLength);
        }
        if self.min_value_threshold == 0 {
            return Err(ConfigurationError::ZeroValueThreshold);
        }
        if self.gain_start == 0 {
            return Err(ConfigurationError::ZeroGainStart);
        }
        if self.gain_cutoff < self.gain_start {
            return Err(ConfigurationError::GainCutoffBeforeStart {
                gain_start: self.gain_start,
                gain_cutoff: self.gain_cutoff,
            });
        }
        if !self.baseline_value.is_finite() || self.baseline_value <= 0.0 {
            return Err(ConfigurationError::InvalidBaselineValue(self.baseline_value));
        }
        if !self.bonus_value.is_finite() || self.bonus_value < 0.0 {
            return Err(ConfigurationError::InvalidBonusValue(self.bonus_value));
        }
        if !self.unit_gain.is_finite() || self.unit_gain < 0.0 {
            return Err(ConfigurationError::InvalidUnitGain(self.unit_gain));
        }
        if self.unit_cost == 0 {
            return Err(ConfigurationError::ZeroUnitCost);
        }
        if self.unit_cost.checked_mul(self.max_period_length).is_none() {
            return Err(ConfigurationError::PeriodCostOverflow {
                unit_cost: self.unit_cost,
                max_period_length: self.max_period_length,
            });
        }
        if self.time_limit.is_zero() {
            return Err(ConfigurationError::ZeroTimeLimit);
        }
        if let Some(min_duration) = self.min_period_duration
            && !(1..=self.max_period_length).contains(&min_duration)
        {
            return Err(ConfigurationError::InvalidMinPeriodDuration {
                min_duration,
                max_period_length: self.max_period_length,
            });
        }
        if let Some(&date) = self.mandatory_dates.iter().find(|date| !horizon.contains(**date)) {
            return Err(ConfigurationError::MandatoryDateOutOfHorizon {
                date,
                start: horizon.start(),
                end: horizon.end(),
            });
        }
        Ok(())
    }

    pub fn horizon(&self) -> Result<Horizon, ConfigurationError> {
        Horizon::try_new(self.horizon_start, self.horizon_days)
    }

    pub const fn budget(&self) -> Cost {
        Cost(self.budget)
    }

    pub const fn unit_cost(&self) -> Cost {
        Cost(self.unit_cost)
    }

    pub const fn baseline_value(&self) -> Utility {
        Utility::new(self.baseline_value)
    }

    pub const fn bonus_value(&self) -> Utility {
        Utility::new(self.bonus_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = PlannerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.horizon().unwrap().end(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(config.preferred_weekdays, enum_set!(Weekday::Friday));
        assert!(config.preferred_dates.contains(&june_nineteenth()));
    }

    #[test]
    fn zero_max_period_length() {
        let config = PlannerConfig::builder().max_period_length(0).build();
        assert_eq!(config.validate(), Err(ConfigurationError::ZeroMaxPeriodLength));
    }

    #[test]
    fn empty_horizon() {
        let config = PlannerConfig::builder().horizon_days(0).build();
        assert_eq!(config.validate(), Err(ConfigurationError::EmptyHorizon));
    }

    #[test]
    fn gain_cutoff_before_start() {
        let config = PlannerConfig::builder().gain_start(5).gain_cutoff(4).build();
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::GainCutoffBeforeStart { gain_start: 5, gain_cutoff: 4 }),
        );
    }

    #[test]
    fn gain_cutoff_equal_to_start_is_fine() {
        let config = PlannerConfig::builder().gain_start(5).gain_cutoff(5).build();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn negative_bonus() {
        let config = PlannerConfig::builder().bonus_value(-0.5).build();
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidBonusValue(-0.5)));
    }

    #[test]
    fn min_period_duration_longer_than_max() {
        let config =
            PlannerConfig::builder().max_period_length(10).min_period_duration(11).build();
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvalidMinPeriodDuration {
                min_duration: 11,
                max_period_length: 10,
            }),
        );
    }

    #[test]
    fn mandatory_date_out_of_horizon() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let config = PlannerConfig::builder().mandatory_dates(BTreeSet::from([date])).build();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MandatoryDateOutOfHorizon { date: actual, .. }) if actual == date,
        ));
    }

    #[test]
    fn period_cost_overflow() {
        let config = PlannerConfig::builder().unit_cost(u32::MAX).budget(u32::MAX).build();
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::PeriodCostOverflow {
                unit_cost: u32::MAX,
                max_period_length: DEFAULT_MAX_PERIOD_LENGTH,
            }),
        );
        let config = PlannerConfig::builder().unit_cost(u32::MAX / 20).max_period_length(20).build();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_time_limit() {
        let config = PlannerConfig::builder().time_limit(Duration::ZERO).build();
        assert_eq!(config.validate(), Err(ConfigurationError::ZeroTimeLimit));
    }

    #[test]
    fn deserialize_ok() {
        let config: PlannerConfig = toml::from_str(
            r#"
                horizon_start = "2026-01-01"
                horizon_days = 31
                budget = 5
                preferred_weekdays = ["monday", "friday"]
                bonus_policy = "stack"
                mandatory_dates = ["2026-01-15"]
                time_limit_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.horizon_start, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(config.horizon_days, 31);
        assert_eq!(config.budget, 5);
        assert_eq!(config.preferred_weekdays, Weekday::Monday | Weekday::Friday);
        assert_eq!(config.bonus_policy, BonusPolicy::Stack);
        assert_eq!(config.time_limit, Duration::from_secs(5));
        assert_eq!(config.max_period_length, DEFAULT_MAX_PERIOD_LENGTH);
        assert_eq!(config.validate(), Ok(()));
    }
}
