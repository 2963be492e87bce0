mod microlp;

use std::{ops::Index, time::Duration};

pub use self::microlp::MicroLpSolver;
use crate::{
    core::{catalog::PeriodId, model::IlpModel},
    prelude::*,
};

/// Solved value of each decision variable, indexed by [`PeriodId`].
///
/// Missing values read as zero.
#[derive(Clone, Debug, Default, PartialEq, derive_more::From)]
pub struct Assignment(Vec<f64>);

impl FromIterator<f64> for Assignment {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Index<PeriodId> for Assignment {
    type Output = f64;

    fn index(&self, period_id: PeriodId) -> &Self::Output {
        self.0.get(period_id.0).unwrap_or(&0.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum SolveStatus {
    /// Proven optimum found.
    #[display("optimal")]
    Optimal,

    /// No assignment satisfies all the constraints.
    #[display("infeasible")]
    Infeasible,

    /// The time limit has elapsed before the optimum was proven.
    #[display("time limit")]
    TimeLimit,

    /// The objective has no finite maximum.
    #[display("unbounded")]
    Unbounded,
}

#[must_use]
pub struct SolveReport {
    pub status: SolveStatus,

    /// Present for [`SolveStatus::Optimal`] and, if the solver has an incumbent, for
    /// [`SolveStatus::TimeLimit`].
    pub assignment: Option<Assignment>,
}

impl SolveReport {
    pub const fn optimal(assignment: Assignment) -> Self {
        Self { status: SolveStatus::Optimal, assignment: Some(assignment) }
    }

    pub const fn infeasible() -> Self {
        Self { status: SolveStatus::Infeasible, assignment: None }
    }

    pub const fn time_limit(incumbent: Option<Assignment>) -> Self {
        Self { status: SolveStatus::TimeLimit, assignment: incumbent }
    }

    pub const fn unbounded() -> Self {
        Self { status: SolveStatus::Unbounded, assignment: None }
    }
}

/// External MILP solver: maximise the objective subject to the linear constraints.
pub trait Solver {
    /// Solve the model, blocking for at most `time_limit`.
    ///
    /// Statuses other than optimal are regular outcomes, errors are reserved for solver failures.
    fn solve(&self, model: &IlpModel, time_limit: Duration) -> Result<SolveReport>;
}
