use bon::Builder;
use chrono::NaiveDate;
use enumset::EnumSet;

use crate::{
    config::{BonusPolicy, PlannerConfig},
    core::{
        calendar::{Calendar, DayMap, DayTrait},
        period::HolidayPeriod,
    },
    error::OutOfRangeError,
    quantity::Utility,
};

/// Per-day preference weight, independent of the period length.
#[derive(Copy, Clone, Debug, Builder)]
pub struct MarginalValue {
    baseline: Utility,
    bonus: Utility,

    #[builder(default)]
    policy: BonusPolicy,
}

impl MarginalValue {
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            baseline: config.baseline_value(),
            bonus: config.bonus_value(),
            policy: config.bonus_policy,
        }
    }

    pub fn of(self, traits: EnumSet<DayTrait>) -> Utility {
        let n_matches = traits.intersection(DayTrait::PreferredWeekday | DayTrait::PreferredDate).len();
        let n_bonuses = match self.policy {
            BonusPolicy::Once => n_matches.min(1),
            BonusPolicy::Stack => n_matches,
        };
        #[expect(clippy::cast_precision_loss)]
        let bonus = self.bonus * n_bonuses as f64;
        self.baseline + bonus
    }
}

/// Bonus for longer consecutive periods, following a capped linear ramp.
#[derive(Copy, Clone, Debug, Builder)]
pub struct DurationValue {
    /// Shorter periods get no utility at all.
    min_value_threshold: u32,

    /// The first length getting a bonus.
    gain_start: u32,

    /// The bonus stays flat beyond this length.
    gain_cutoff: u32,

    unit_gain: f64,
}

impl DurationValue {
    pub const fn from_config(config: &PlannerConfig) -> Self {
        Self {
            min_value_threshold: config.min_value_threshold,
            gain_start: config.gain_start,
            gain_cutoff: config.gain_cutoff,
            unit_gain: config.unit_gain,
        }
    }

    /// Whether the period is long enough to be worth anything.
    #[must_use]
    pub const fn has_value(self, duration: u32) -> bool {
        duration >= self.min_value_threshold
    }

    /// Duration-dependent component of the period utility.
    pub fn component(self, duration: u32) -> Utility {
        if !self.has_value(duration) || duration < self.gain_start {
            return Utility::ZERO;
        }
        let n_gaining_days = duration.min(self.gain_cutoff) - self.gain_start + 1;
        Utility::new(f64::from(n_gaining_days) * self.unit_gain)
    }
}

/// Utility of every horizon day and period.
#[must_use]
pub struct UtilityModel {
    marginal_values: DayMap<Utility>,
    duration_value: DurationValue,
}

impl UtilityModel {
    pub fn new(
        calendar: &Calendar,
        marginal_value: MarginalValue,
        duration_value: DurationValue,
    ) -> Self {
        Self {
            marginal_values: calendar.map_days(|_, traits| marginal_value.of(traits)),
            duration_value,
        }
    }

    pub fn marginal_value(&self, date: NaiveDate) -> Result<Utility, OutOfRangeError> {
        self.marginal_values.get(date).copied()
    }

    /// Sum of the day marginal values plus the duration bonus.
    ///
    /// Periods shorter than the value threshold are worth nothing, regardless of their days.
    pub fn period_utility(&self, period: HolidayPeriod) -> Result<Utility, OutOfRangeError> {
        if !self.duration_value.has_value(period.duration()) {
            return Ok(Utility::ZERO);
        }
        let summed_marginal: Utility =
            period.all_days().map(|date| self.marginal_value(date)).sum::<Result<_, _>>()?;
        Ok(summed_marginal + self.duration_value.component(period.duration()))
    }
}
