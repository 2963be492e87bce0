use std::{collections::BTreeSet, time::Instant};

use bon::Builder;
use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    config::PlannerConfig,
    core::{
        calendar::{Calendar, DayType},
        catalog::{PeriodCatalog, PeriodId},
        cost::CostModel,
        model::IlpModel,
        period::HolidayPeriod,
        solver::{Assignment, SolveReport, SolveStatus, Solver},
        utility::{DurationValue, MarginalValue, UtilityModel},
    },
    prelude::*,
    quantity::{Cost, Utility},
};

/// Single-shot planning run.
#[derive(Builder)]
pub struct Planner<'a> {
    config: &'a PlannerConfig,

    /// Public holidays as provided by the calendar data source.
    public_holidays: &'a BTreeSet<NaiveDate>,
}

impl Planner<'_> {
    /// Formulate the problem, solve it once, and decode the outcome.
    #[instrument(skip_all)]
    pub fn plan(&self, solver: &impl Solver) -> Result<Outcome> {
        let problem = self.formulate()?;
        let report = solver.solve(&problem.model, self.config.time_limit)?;
        problem.decode(report)
    }

    /// Build the calendar, the period catalog, the lookups, and the model.
    #[instrument(skip_all)]
    pub fn formulate(&self) -> Result<Problem> {
        let start_instant = Instant::now();
        self.config.validate()?;
        let horizon = self.config.horizon()?;

        let calendar = Calendar::builder()
            .horizon(horizon)
            .public_holidays(self.public_holidays)
            .preferred_weekdays(self.config.preferred_weekdays)
            .preferred_dates(&self.config.preferred_dates)
            .build();
        let catalog = PeriodCatalog::for_horizon(horizon, self.config.max_period_length);

        let cost_model = CostModel::new(&calendar, self.config.unit_cost());
        let costs: Vec<Cost> = catalog
            .periods()
            .iter()
            .map(|period| cost_model.period_cost(*period))
            .try_collect()?;

        let utility_model = UtilityModel::new(
            &calendar,
            MarginalValue::from_config(self.config),
            DurationValue::from_config(self.config),
        );
        let utilities: Vec<Utility> = catalog
            .periods()
            .iter()
            .map(|period| utility_model.period_utility(*period))
            .try_collect()?;

        let model = IlpModel::builder(&catalog)
            .objective(&utilities)
            .constraints()
            .costs(&costs)
            .budget(self.config.budget())
            .covering_index(&catalog.covering_index(horizon))
            .maybe_min_period_duration(self.config.min_period_duration)
            .mandatory_dates(&self.config.mandatory_dates)
            .build();

        info!(elapsed = ?start_instant.elapsed(), "formulated");
        Ok(Problem { calendar, catalog, costs, utilities, model })
    }
}

/// Formulated problem, with the per-period scores stored parallel to the catalog.
#[must_use]
pub struct Problem {
    pub calendar: Calendar,
    pub catalog: PeriodCatalog,
    pub costs: Vec<Cost>,
    pub utilities: Vec<Utility>,
    pub model: IlpModel,
}

impl Problem {
    /// Turn the solver report into an outcome.
    ///
    /// An optimum without an assignment is a broken solver, not an empty plan.
    pub fn decode(&self, report: SolveReport) -> Result<Outcome> {
        let outcome = match (report.status, report.assignment) {
            (SolveStatus::Optimal, Some(assignment)) => Outcome::Optimal(self.plan_from(&assignment)),
            (SolveStatus::Optimal, None) => {
                bail!("the solver reported an optimum without an assignment");
            }
            (SolveStatus::Infeasible, _) => Outcome::Infeasible,
            (SolveStatus::TimeLimit, incumbent) => {
                Outcome::TimeLimit { incumbent: incumbent.map(|assignment| self.plan_from(&assignment)) }
            }
            (SolveStatus::Unbounded, _) => Outcome::Unbounded,
        };
        Ok(outcome)
    }

    pub fn plan_from(&self, assignment: &Assignment) -> Plan {
        let periods = self
            .model
            .decode(assignment)
            .into_iter()
            .map(|period_id| self.scored(period_id))
            .collect_vec();
        let plan = Plan { periods };
        info!(
            n_periods = plan.periods.len(),
            total_cost = %plan.total_cost(),
            total_utility = %plan.total_utility(),
            "decoded",
        );
        plan
    }

    fn scored(&self, period_id: PeriodId) -> ScoredPeriod {
        ScoredPeriod {
            period: self.catalog[period_id],
            cost: self.costs[period_id.0],
            utility: self.utilities[period_id.0],
        }
    }
}

/// Outcome of a planning run.
///
/// Everything but [`Outcome::Optimal`] calls for a different remediation, hence the variants.
#[must_use]
pub enum Outcome {
    Optimal(Plan),

    /// The constraints cannot be satisfied together.
    Infeasible,

    /// The solver has run out of time, possibly with a feasible incumbent.
    TimeLimit { incumbent: Option<Plan> },

    /// The objective has no finite maximum, which indicates a modelling error.
    Unbounded,
}

impl Outcome {
    pub const fn status(&self) -> SolveStatus {
        match self {
            Self::Optimal(_) => SolveStatus::Optimal,
            Self::Infeasible => SolveStatus::Infeasible,
            Self::TimeLimit { .. } => SolveStatus::TimeLimit,
            Self::Unbounded => SolveStatus::Unbounded,
        }
    }

    /// Get the optimal plan, or explain what to do about its absence.
    pub fn into_optimal(self) -> Result<Plan> {
        match self {
            Self::Optimal(plan) => Ok(plan),
            Self::Infeasible => {
                bail!("the problem is infeasible, try a larger budget or fewer mandatory dates")
            }
            Self::TimeLimit { .. } => {
                bail!("no optimal plan found within the time limit, try raising it")
            }
            Self::Unbounded => bail!("the problem is unbounded, check the model configuration"),
        }
    }
}

/// Selected period together with its scores.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScoredPeriod {
    pub period: HolidayPeriod,
    pub cost: Cost,
    pub utility: Utility,
}

/// Selected non-overlapping periods, in chronological order.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Plan {
    pub periods: Vec<ScoredPeriod>,
}

impl Plan {
    pub fn total_cost(&self) -> Cost {
        self.periods.iter().map(|scored| scored.cost).sum()
    }

    pub fn total_utility(&self) -> Utility {
        self.periods.iter().map(|scored| scored.utility).sum()
    }

    /// All the days covered by the selected periods.
    pub fn days_off(&self) -> impl Iterator<Item = NaiveDate> {
        self.periods.iter().flat_map(|scored| scored.period.all_days())
    }

    /// Rendering class of every horizon day.
    pub fn day_types(&self, calendar: &Calendar) -> Vec<(NaiveDate, DayType)> {
        let days_off: BTreeSet<NaiveDate> = self.days_off().collect();
        calendar
            .iter()
            .map(|(date, traits)| (date, DayType::classify(traits, days_off.contains(&date))))
            .collect()
    }

    /// Date lists for an external calendar visualiser.
    pub fn calendar_view(&self, calendar: &Calendar) -> CalendarView {
        CalendarView {
            public_holidays: calendar.public_holidays().collect(),
            weekend_days: calendar.horizon().weekend_days().collect(),
            days_off: self.days_off().collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalendarView {
    pub public_holidays: Vec<NaiveDate>,
    pub weekend_days: Vec<NaiveDate>,
    pub days_off: Vec<NaiveDate>,
}
