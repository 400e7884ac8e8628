//! Linear programming.
//!
//! [`simplex`] solves programs given as coefficient vectors; [`model`] builds
//! them from named variables and constraints and lowers them to a
//! [`simplex::LinearProgram`].

pub mod model;
pub mod simplex;

use num_traits::Float;
use std::fmt::{self, Debug};

pub use model::{ConstraintSpec, LinearExpr, LpProblem, LpSolution, NamedConstraint, Sense, Variable};
pub use simplex::{maximize as simplex_maximize, minimize as simplex_minimize, Constraint, LinearProgram, Relation};

/// Configuration options for the simplex solver.
#[derive(Debug, Clone)]
pub struct OptimizationConfig<T>
where
    T: Float + Debug,
{
    /// Maximum number of pivots across both phases
    pub max_iterations: usize,
    /// Phase I objective magnitude above which a program is declared infeasible
    pub tolerance: T,
}

impl<T> Default for OptimizationConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: T::from(1e-6).unwrap_or_else(T::epsilon),
        }
    }
}

/// Solver outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// An optimal vertex was found
    Optimal,
    /// No point satisfies every constraint
    Infeasible,
    /// The objective grows without bound over the feasible region
    Unbounded,
    /// The iteration limit was reached first
    NotSolved,
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LpStatus::Optimal => "Optimal",
            LpStatus::Infeasible => "Infeasible",
            LpStatus::Unbounded => "Unbounded",
            LpStatus::NotSolved => "Not Solved",
        };
        f.write_str(label)
    }
}

/// Result of a linear program solve.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T>
where
    T: Float + Debug,
{
    /// The point reached when the solver stopped
    pub optimal_point: Vec<T>,
    /// The value of the objective function at that point
    pub optimal_value: T,
    /// Number of pivots performed
    pub iterations: usize,
    /// How the solve ended
    pub status: LpStatus,
}

impl<T> OptimizationResult<T>
where
    T: Float + Debug,
{
    /// Whether an optimal vertex was found.
    pub fn converged(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}
