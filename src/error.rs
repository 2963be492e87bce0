use chrono::NaiveDate;
use thiserror::Error;

/// Invalid parameter combination, caught before any model is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("the planning horizon must contain at least one day")]
    EmptyHorizon,

    #[error("the planning horizon starting on {start} does not fit into the calendar")]
    HorizonOverflow { start: NaiveDate },

    #[error("maximum period length must be positive")]
    ZeroMaxPeriodLength,

    #[error("minimal duration to get value must be positive")]
    ZeroValueThreshold,

    #[error("duration gain must start at a positive length")]
    ZeroGainStart,

    #[error("gain cutoff ({gain_cutoff}) must not be less than gain start ({gain_start})")]
    GainCutoffBeforeStart { gain_start: u32, gain_cutoff: u32 },

    #[error("baseline marginal value must be a positive finite number, got {0}")]
    InvalidBaselineValue(f64),

    #[error("bonus marginal value must be a non-negative finite number, got {0}")]
    InvalidBonusValue(f64),

    #[error("duration unit gain must be a non-negative finite number, got {0}")]
    InvalidUnitGain(f64),

    #[error("a working day must cost at least one budget unit")]
    ZeroUnitCost,

    #[error(
        "unit cost ({unit_cost}) times maximum period length ({max_period_length}) overflows the budget"
    )]
    PeriodCostOverflow { unit_cost: u32, max_period_length: u32 },

    #[error("solver time limit must be positive")]
    ZeroTimeLimit,

    #[error(
        "required minimal period duration ({min_duration}) must be within 1..={max_period_length}"
    )]
    InvalidMinPeriodDuration { min_duration: u32, max_period_length: u32 },

    #[error("mandatory date {date} is outside the planning horizon {start}..={end}")]
    MandatoryDateOutOfHorizon { date: NaiveDate, start: NaiveDate, end: NaiveDate },
}

/// A precomputed day lookup was queried outside of the domain it was built for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[error("{date} is outside of the lookup domain {start}..={end}")]
pub struct OutOfRangeError {
    pub date: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}
