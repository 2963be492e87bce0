use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

use bon::bon;
use chrono::NaiveDate;

use crate::{
    core::{
        calendar::DayMap,
        catalog::{PeriodCatalog, PeriodId},
        solver::Assignment,
    },
    prelude::*,
    quantity::{Cost, Utility},
};

/// Solved values above this are read as «selected».
///
/// Anything in `(0, 0.99]` is a relaxation artifact and does not get rounded up.
pub const SELECTION_THRESHOLD: f64 = 0.99;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Relation {
    LessOrEqual,
    GreaterOrEqual,
}

/// What a constraint is there for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConstraintKind {
    /// Total cost of the selected periods stays within the budget.
    Budget,

    /// No more than one selected period covers the date.
    Coverage(NaiveDate),

    /// At least one selected period is at least this long.
    MinDuration(u32),

    /// At least one selected period covers the date.
    Mandatory(NaiveDate),
}

impl Display for ConstraintKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Budget => write!(f, "budget"),
            Self::Coverage(date) => write!(f, "coverage_{date}"),
            Self::MinDuration(duration) => write!(f, "min_duration_{duration}"),
            Self::Mandatory(date) => write!(f, "mandatory_{date}"),
        }
    }
}

/// `Σ coefficient × variable <relation> rhs`.
#[derive(Clone, Debug)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub terms: Vec<(PeriodId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl LinearConstraint {
    fn unit_terms(period_ids: impl IntoIterator<Item = PeriodId>) -> Vec<(PeriodId, f64)> {
        period_ids.into_iter().map(|period_id| (period_id, 1.0)).collect()
    }

    #[must_use]
    pub fn lhs(&self, assignment: &Assignment) -> f64 {
        self.terms.iter().map(|(period_id, coefficient)| coefficient * assignment[*period_id]).sum()
    }

    #[must_use]
    pub fn is_satisfied_by(&self, assignment: &Assignment, tolerance: f64) -> bool {
        let lhs = self.lhs(assignment);
        match self.relation {
            Relation::LessOrEqual => lhs <= self.rhs + tolerance,
            Relation::GreaterOrEqual => lhs >= self.rhs - tolerance,
        }
    }
}

/// Binary integer linear program over the period catalog.
///
/// Variable `i` decides whether the period [`PeriodId`] `i` is selected. The objective is maximised.
#[derive(Clone, Debug)]
#[must_use]
pub struct IlpModel {
    variable_names: Vec<String>,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl IlpModel {
    pub fn builder(catalog: &PeriodCatalog) -> ModelBuilder<'_, WithVariables> {
        ModelBuilder::new(catalog)
    }

    #[must_use]
    pub const fn n_variables(&self) -> usize {
        self.variable_names.len()
    }

    #[must_use]
    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    /// Objective coefficient of each variable.
    #[must_use]
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    #[must_use]
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    #[must_use]
    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.objective
            .iter()
            .enumerate()
            .map(|(index, coefficient)| coefficient * assignment[PeriodId(index)])
            .sum()
    }

    /// Selected periods of the solution, in the catalog order.
    #[must_use]
    pub fn decode(&self, assignment: &Assignment) -> Vec<PeriodId> {
        (0..self.n_variables())
            .map(PeriodId)
            .filter(|period_id| assignment[*period_id] > SELECTION_THRESHOLD)
            .collect()
    }
}

/// First phase: one decision variable per catalog period.
pub struct WithVariables {
    variable_names: Vec<String>,
}

/// Second phase: the objective has been assembled.
pub struct WithObjective {
    variable_names: Vec<String>,
    objective: Vec<f64>,
}

/// Builds an [`IlpModel`] in strictly ordered phases: variables, objective, constraints.
#[must_use]
pub struct ModelBuilder<'a, P> {
    catalog: &'a PeriodCatalog,
    phase: P,
}

impl<'a> ModelBuilder<'a, WithVariables> {
    fn new(catalog: &'a PeriodCatalog) -> Self {
        let variable_names = catalog
            .iter()
            .map(|(_, period)| format!("period_{}_{}d", period.start_date(), period.duration()))
            .collect();
        Self { catalog, phase: WithVariables { variable_names } }
    }

    /// Maximise the total utility of the selected periods.
    pub fn objective(self, utilities: &[Utility]) -> ModelBuilder<'a, WithObjective> {
        assert_eq!(utilities.len(), self.catalog.len(), "one utility per period is expected");
        ModelBuilder {
            catalog: self.catalog,
            phase: WithObjective {
                variable_names: self.phase.variable_names,
                objective: utilities.iter().map(|utility| utility.get()).collect(),
            },
        }
    }
}

#[bon]
impl<'a> ModelBuilder<'a, WithObjective> {
    /// Assemble the constraints and finish the model.
    ///
    /// `costs` are indexed by [`PeriodId`], `covering_index` lists the periods covering each
    /// horizon day.
    #[builder(finish_fn = build)]
    pub fn constraints(
        self,
        costs: &[Cost],
        budget: Cost,
        covering_index: &DayMap<Vec<PeriodId>>,
        min_period_duration: Option<u32>,
        mandatory_dates: &BTreeSet<NaiveDate>,
    ) -> IlpModel {
        assert_eq!(costs.len(), self.catalog.len(), "one cost per period is expected");

        let mut constraints = Vec::with_capacity(covering_index.horizon().n_days() + 2);

        constraints.push(LinearConstraint {
            kind: ConstraintKind::Budget,
            terms: costs
                .iter()
                .enumerate()
                .filter(|(_, cost)| **cost != Cost::ZERO)
                .map(|(index, cost)| (PeriodId(index), f64::from(cost.0)))
                .collect(),
            relation: Relation::LessOrEqual,
            rhs: f64::from(budget.0),
        });

        let mut n_coverage_constraints = 0;
        for (date, period_ids) in covering_index.iter() {
            // A single covering period is bounded by its binary domain already.
            if period_ids.len() >= 2 {
                constraints.push(LinearConstraint {
                    kind: ConstraintKind::Coverage(date),
                    terms: LinearConstraint::unit_terms(period_ids.iter().copied()),
                    relation: Relation::LessOrEqual,
                    rhs: 1.0,
                });
                n_coverage_constraints += 1;
            }
        }

        if let Some(min_duration) = min_period_duration {
            constraints.push(LinearConstraint {
                kind: ConstraintKind::MinDuration(min_duration),
                terms: LinearConstraint::unit_terms(
                    self.catalog
                        .iter()
                        .filter(|(_, period)| period.duration() >= min_duration)
                        .map(|(period_id, _)| period_id),
                ),
                relation: Relation::GreaterOrEqual,
                rhs: 1.0,
            });
        }

        for date in mandatory_dates {
            let period_ids = covering_index.get(*date).map(Vec::as_slice).unwrap_or_default();
            if period_ids.is_empty() {
                warn!(%date, "no period covers the mandatory date, the model is infeasible");
            }
            constraints.push(LinearConstraint {
                kind: ConstraintKind::Mandatory(*date),
                terms: LinearConstraint::unit_terms(period_ids.iter().copied()),
                relation: Relation::GreaterOrEqual,
                rhs: 1.0,
            });
        }

        info!(
            n_variables = self.phase.variable_names.len(),
            n_coverage_constraints,
            has_min_duration = min_period_duration.is_some(),
            n_mandatory_dates = mandatory_dates.len(),
            "built the model",
        );
        IlpModel {
            variable_names: self.phase.variable_names,
            objective: self.phase.objective,
            constraints,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::core::calendar::Horizon;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Three days and periods up to two days long:
    ///
    /// - `#0`: Jan 6, 1 day
    /// - `#1`: Jan 6, 2 days
    /// - `#2`: Jan 7, 1 day
    /// - `#3`: Jan 7, 2 days
    /// - `#4`: Jan 8, 1 day
    fn build_model(min_period_duration: Option<u32>, mandatory_dates: &BTreeSet<NaiveDate>) -> IlpModel {
        let horizon = Horizon::try_new(date(2025, 1, 6), 3).unwrap();
        let catalog = PeriodCatalog::for_horizon(horizon, 2);
        IlpModel::builder(&catalog)
            .objective(&[Utility::new(1.0), Utility::new(2.0), Utility::new(3.0), Utility::new(4.0), Utility::new(5.0)])
            .constraints()
            .costs(&[Cost(1), Cost(2), Cost(1), Cost(2), Cost(0)])
            .budget(Cost(2))
            .covering_index(&catalog.covering_index(horizon))
            .maybe_min_period_duration(min_period_duration)
            .mandatory_dates(mandatory_dates)
            .build()
    }

    #[test]
    fn variables_and_objective() {
        let model = build_model(None, &BTreeSet::new());
        assert_eq!(model.n_variables(), 5);
        assert_eq!(model.variable_names()[3], "period_2025-01-07_2d");
        assert_eq!(model.objective(), [1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn budget_constraint() {
        let model = build_model(None, &BTreeSet::new());
        let budget = &model.constraints()[0];
        assert_eq!(budget.kind, ConstraintKind::Budget);
        assert_eq!(budget.relation, Relation::LessOrEqual);
        assert_relative_eq!(budget.rhs, 2.0);
        // The free period is left out:
        assert_eq!(
            budget.terms,
            [(PeriodId(0), 1.0), (PeriodId(1), 2.0), (PeriodId(2), 1.0), (PeriodId(3), 2.0)],
        );
    }

    #[test]
    fn coverage_constraints() {
        let model = build_model(None, &BTreeSet::new());
        let coverage: Vec<_> = model
            .constraints()
            .iter()
            .filter(|constraint| matches!(constraint.kind, ConstraintKind::Coverage(_)))
            .collect();
        assert_eq!(coverage.len(), 3);
        assert_eq!(coverage[1].kind, ConstraintKind::Coverage(date(2025, 1, 7)));
        assert_eq!(
            coverage[1].terms,
            [(PeriodId(1), 1.0), (PeriodId(2), 1.0), (PeriodId(3), 1.0)],
        );
        assert!(coverage.iter().all(|constraint| constraint.relation == Relation::LessOrEqual));
    }

    #[test]
    fn optional_constraints() {
        let model = build_model(Some(2), &BTreeSet::from([date(2025, 1, 8)]));
        let min_duration = model
            .constraints()
            .iter()
            .find(|constraint| constraint.kind == ConstraintKind::MinDuration(2))
            .unwrap();
        assert_eq!(min_duration.terms, [(PeriodId(1), 1.0), (PeriodId(3), 1.0)]);
        assert_eq!(min_duration.relation, Relation::GreaterOrEqual);

        let mandatory = model.constraints().last().unwrap();
        assert_eq!(mandatory.kind, ConstraintKind::Mandatory(date(2025, 1, 8)));
        assert_eq!(mandatory.terms, [(PeriodId(3), 1.0), (PeriodId(4), 1.0)]);
    }

    #[test]
    fn decode_threshold() {
        let model = build_model(None, &BTreeSet::new());
        let assignment = Assignment::from(vec![0.995, 0.5, 0.99, 1.0, 0.0]);
        assert_eq!(model.decode(&assignment), [PeriodId(0), PeriodId(3)]);
    }

    #[test]
    fn decode_tolerates_missing_values() {
        let model = build_model(None, &BTreeSet::new());
        assert!(model.decode(&Assignment::default()).is_empty());
        assert_eq!(model.decode(&Assignment::from(vec![1.0])), [PeriodId(0)]);
    }

    #[test]
    fn feasibility_check() {
        let model = build_model(None, &BTreeSet::new());
        // Overlapping on Jan 7:
        let overlapping = Assignment::from(vec![0.0, 1.0, 0.0, 1.0, 0.0]);
        assert!(!model.constraints().iter().all(|constraint| constraint.is_satisfied_by(&overlapping, 1e-6)));
        let disjoint = Assignment::from(vec![1.0, 0.0, 1.0, 0.0, 1.0]);
        assert!(model.constraints().iter().all(|constraint| constraint.is_satisfied_by(&disjoint, 1e-6)));
        assert_relative_eq!(model.objective_value(&disjoint), 9.0);
    }
}
