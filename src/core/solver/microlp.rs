use std::time::{Duration, Instant};

use good_lp::{
    Constraint,
    Expression,
    ProblemVariables,
    ResolutionError,
    Solution,
    SolutionStatus,
    SolverModel,
    Variable,
    WithTimeLimit,
    constraint,
    microlp,
    variable,
};

use crate::{
    core::{
        model::{IlpModel, LinearConstraint, Relation},
        solver::{Assignment, SolveReport, Solver},
    },
    prelude::*,
};

/// Reported by the backend when the time limit expires before any feasible solution is found.
const NO_INCUMBENT_MESSAGE: &str = "Time limit reached before finding a feasible solution";

/// Pure-Rust branch-and-bound solver, via [`good_lp`].
///
/// When the time limit expires, the best incumbent found so far is reported, if any.
#[derive(Copy, Clone, Debug, Default)]
pub struct MicroLpSolver;

impl Solver for MicroLpSolver {
    #[instrument(skip_all, fields(n_variables = model.n_variables(), n_constraints = model.constraints().len()))]
    fn solve(&self, model: &IlpModel, time_limit: Duration) -> Result<SolveReport> {
        info!(?time_limit, "solving…");
        let start_instant = Instant::now();

        let mut problem_variables = ProblemVariables::new();
        let variables: Vec<Variable> = model
            .variable_names()
            .iter()
            .map(|name| problem_variables.add(variable().binary().name(name)))
            .collect();
        let objective: Expression = model
            .objective()
            .iter()
            .zip(&variables)
            .map(|(coefficient, variable)| *coefficient * *variable)
            .sum();
        let problem = model.constraints().iter().fold(
            problem_variables
                .maximise(objective)
                .using(microlp)
                .with_time_limit(time_limit.as_secs_f64()),
            |problem, linear_constraint| {
                trace!(kind = %linear_constraint.kind, n_terms = linear_constraint.terms.len(), "adding constraint");
                problem.with(to_constraint(linear_constraint, &variables))
            },
        );

        let report = match problem.solve() {
            Ok(solution) => {
                let assignment: Assignment =
                    variables.iter().map(|variable| solution.value(*variable)).collect();
                match solution.status() {
                    // The relative gap is left at zero, so reaching it proves the optimum:
                    SolutionStatus::Optimal | SolutionStatus::GapLimit => {
                        SolveReport::optimal(assignment)
                    }
                    SolutionStatus::TimeLimit => {
                        warn!(?time_limit, "the time limit has been reached with an incumbent");
                        SolveReport::time_limit(Some(assignment))
                    }
                }
            }
            Err(ResolutionError::Infeasible) => SolveReport::infeasible(),
            Err(ResolutionError::Unbounded) => SolveReport::unbounded(),
            Err(ResolutionError::Other(message)) if message == NO_INCUMBENT_MESSAGE => {
                warn!(?time_limit, "the time limit has been reached without an incumbent");
                SolveReport::time_limit(None)
            }
            Err(error) => return Err(error).context("the solver has failed"),
        };
        info!(status = %report.status, elapsed = ?start_instant.elapsed(), "solved");
        Ok(report)
    }
}

fn to_constraint(linear_constraint: &LinearConstraint, variables: &[Variable]) -> Constraint {
    let lhs: Expression = linear_constraint
        .terms
        .iter()
        .map(|(period_id, coefficient)| *coefficient * variables[period_id.0])
        .sum();
    let rhs = linear_constraint.rhs;
    match linear_constraint.relation {
        Relation::LessOrEqual => constraint!(lhs <= rhs),
        Relation::GreaterOrEqual => constraint!(lhs >= rhs),
    }
}
