//! Named linear-programming models.
//!
//! ```
//! use numlab::math::optimization::{LpProblem, LpStatus, OptimizationConfig, Sense};
//!
//! let mut problem = LpProblem::new("example", Sense::Maximize);
//! let x = problem.add_variable("x");
//! let y = problem.add_variable("y");
//! problem.set_objective(x + y);
//! problem.add_constraint("budget", (2.0 * x + y).le(100.0)).unwrap();
//! problem.add_constraint("cap", x.le(30.0)).unwrap();
//!
//! let solution = problem.solve(&OptimizationConfig::default()).unwrap();
//! assert_eq!(solution.status, LpStatus::Optimal);
//! assert!((solution.value(y) - 100.0).abs() < 1e-9);
//! assert!((solution.objective_value - 100.0).abs() < 1e-9);
//! ```

use log::info;
use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::math::optimization::simplex::{self, Constraint, LinearProgram, Relation};
use crate::math::optimization::{LpStatus, OptimizationConfig};

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// Handle to a non-negative continuous variable of an [`LpProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(usize);

impl Variable {
    /// Column of this variable in the lowered program.
    pub fn index(self) -> usize {
        self.0
    }

    pub fn le(self, rhs: f64) -> ConstraintSpec {
        LinearExpr::from(self).le(rhs)
    }

    pub fn ge(self, rhs: f64) -> ConstraintSpec {
        LinearExpr::from(self).ge(rhs)
    }

    pub fn equals(self, rhs: f64) -> ConstraintSpec {
        LinearExpr::from(self).equals(rhs)
    }
}

/// Affine expression `sum(coefficient * variable) + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(Variable, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coefficient * variable`.
    pub fn term(mut self, variable: Variable, coefficient: f64) -> Self {
        self.terms.push((variable, coefficient));
        self
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Total coefficient of each variable, indexed by column.
    pub fn coefficients(&self, columns: usize) -> Vec<f64> {
        let mut dense = vec![0.0; columns];
        for &(variable, coefficient) in &self.terms {
            if variable.0 < columns {
                dense[variable.0] += coefficient;
            }
        }
        dense
    }

    /// Evaluates the expression at `values`, indexed by column.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().fold(self.constant, |acc, &(variable, coefficient)| {
            acc + coefficient * values.get(variable.0).copied().unwrap_or(0.0)
        })
    }

    fn max_index(&self) -> Option<usize> {
        self.terms.iter().map(|(variable, _)| variable.0).max()
    }

    pub fn le(self, rhs: f64) -> ConstraintSpec {
        ConstraintSpec::new(self, Relation::LessEq, rhs)
    }

    pub fn ge(self, rhs: f64) -> ConstraintSpec {
        ConstraintSpec::new(self, Relation::GreaterEq, rhs)
    }

    pub fn equals(self, rhs: f64) -> ConstraintSpec {
        ConstraintSpec::new(self, Relation::Equal, rhs)
    }
}

impl From<Variable> for LinearExpr {
    fn from(variable: Variable) -> Self {
        LinearExpr::new().term(variable, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(constant: f64) -> Self {
        LinearExpr {
            terms: Vec::new(),
            constant,
        }
    }
}

impl<R: Into<LinearExpr>> Add<R> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: R) -> LinearExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<R: Into<LinearExpr>> Sub<R> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        self + (-rhs.into())
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1.0
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, factor: f64) -> LinearExpr {
        for (_, coefficient) in &mut self.terms {
            *coefficient *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl Mul<LinearExpr> for f64 {
    type Output = LinearExpr;

    fn mul(self, expr: LinearExpr) -> LinearExpr {
        expr * self
    }
}

impl Mul<Variable> for f64 {
    type Output = LinearExpr;

    fn mul(self, variable: Variable) -> LinearExpr {
        LinearExpr::new().term(variable, self)
    }
}

impl Mul<f64> for Variable {
    type Output = LinearExpr;

    fn mul(self, factor: f64) -> LinearExpr {
        factor * self
    }
}

impl<R: Into<LinearExpr>> Add<R> for Variable {
    type Output = LinearExpr;

    fn add(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) + rhs
    }
}

impl<R: Into<LinearExpr>> Sub<R> for Variable {
    type Output = LinearExpr;

    fn sub(self, rhs: R) -> LinearExpr {
        LinearExpr::from(self) - rhs
    }
}

/// `expr <relation> rhs`, before it is named and added to a problem.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpec {
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl ConstraintSpec {
    pub fn new(expr: LinearExpr, relation: Relation, rhs: f64) -> Self {
        Self {
            expr,
            relation,
            rhs,
        }
    }
}

/// A constraint registered under a name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedConstraint {
    pub name: String,
    pub spec: ConstraintSpec,
}

/// A linear program built from named variables and constraints.
#[derive(Debug, Clone)]
pub struct LpProblem {
    name: String,
    sense: Sense,
    variables: Vec<String>,
    objective: LinearExpr,
    constraints: Vec<NamedConstraint>,
}

impl LpProblem {
    pub fn new(name: impl Into<String>, sense: Sense) -> Self {
        Self {
            name: name.into(),
            sense,
            variables: Vec::new(),
            objective: LinearExpr::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Adds a variable with lower bound 0 and no upper bound.
    pub fn add_variable(&mut self, name: impl Into<String>) -> Variable {
        self.variables.push(name.into());
        Variable(self.variables.len() - 1)
    }

    pub fn variable_name(&self, variable: Variable) -> Option<&str> {
        self.variables.get(variable.0).map(String::as_str)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn set_objective(&mut self, objective: impl Into<LinearExpr>) {
        self.objective = objective.into();
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Registers a constraint. Names must be unique within the problem.
    pub fn add_constraint(&mut self, name: impl Into<String>, spec: ConstraintSpec) -> Result<()> {
        let name = name.into();
        if self.constraints.iter().any(|c| c.name == name) {
            return Err(Error::InvalidInput(format!(
                "duplicate constraint name '{name}' in problem '{}'",
                self.name
            )));
        }
        self.constraints.push(NamedConstraint { name, spec });
        Ok(())
    }

    pub fn constraints(&self) -> &[NamedConstraint] {
        &self.constraints
    }

    /// Lowers the model to coefficient form. Expression constants move to
    /// the right-hand side; the objective constant is dropped.
    pub fn to_linear_program(&self) -> Result<LinearProgram<f64>> {
        let columns = self.variables.len();
        let foreign = std::iter::once(&self.objective)
            .chain(self.constraints.iter().map(|c| &c.spec.expr))
            .filter_map(LinearExpr::max_index)
            .find(|&index| index >= columns);
        if let Some(index) = foreign {
            return Err(Error::InvalidInput(format!(
                "variable #{index} does not belong to problem '{}' ({columns} variables)",
                self.name
            )));
        }

        Ok(LinearProgram {
            objective: self.objective.coefficients(columns),
            constraints: self
                .constraints
                .iter()
                .map(|c| {
                    Constraint::new(
                        c.spec.expr.coefficients(columns),
                        c.spec.relation,
                        c.spec.rhs - c.spec.expr.constant(),
                    )
                })
                .collect(),
        })
    }

    /// Solves the problem with the simplex method.
    pub fn solve(&self, config: &OptimizationConfig<f64>) -> Result<LpSolution> {
        let lp = self.to_linear_program()?;
        let result = match self.sense {
            Sense::Maximize => simplex::maximize(&lp, config)?,
            Sense::Minimize => simplex::minimize(&lp, config)?,
        };
        info!(
            "solved '{}' ({} variables, {} constraints): {} after {} pivots",
            self.name,
            self.variables.len(),
            self.constraints.len(),
            result.status,
            result.iterations
        );

        Ok(LpSolution {
            status: result.status,
            objective_value: result.optimal_value + self.objective.constant(),
            values: result.optimal_point,
            iterations: result.iterations,
        })
    }
}

/// Values found by [`LpProblem::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub status: LpStatus,
    /// Variable values indexed by column
    pub values: Vec<f64>,
    pub objective_value: f64,
    pub iterations: usize,
}

impl LpSolution {
    pub fn value(&self, variable: Variable) -> f64 {
        self.values.get(variable.0).copied().unwrap_or(0.0)
    }

    pub fn evaluate(&self, expr: &LinearExpr) -> f64 {
        expr.evaluate(&self.values)
    }
}
