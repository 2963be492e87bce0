#![allow(clippy::doc_markdown)]

//! Plan time off around public holidays.
//!
//! The planning horizon is turned into a catalog of every contiguous holiday period up to a maximum
//! length. Each period gets a budget cost and a utility score, and the whole catalog is formulated
//! as a binary integer linear program: pick non-overlapping periods maximising the total utility
//! without exceeding the day budget.

pub mod config;
pub mod core;
pub mod error;
mod prelude;
pub mod quantity;
pub mod tables;

pub use crate::{
    config::{BonusPolicy, PlannerConfig},
    core::{
        calendar::{Calendar, DayType, Horizon, Weekday},
        catalog::{PeriodCatalog, PeriodId},
        period::HolidayPeriod,
        planner::{CalendarView, Outcome, Plan, Planner, Problem, ScoredPeriod},
        solver::{Assignment, MicroLpSolver, SolveReport, SolveStatus, Solver},
    },
    error::{ConfigurationError, OutOfRangeError},
    quantity::{Cost, Utility},
};
