use log::{debug, trace, warn};
use num_traits::Float;
use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::math::optimization::{LpStatus, OptimizationConfig, OptimizationResult};

const EPSILON: f64 = 1e-10;

fn eps<T: Float>() -> T {
    T::from(EPSILON).unwrap_or_else(T::epsilon)
}

/// Direction of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `a . x <= b`
    LessEq,
    /// `a . x >= b`
    GreaterEq,
    /// `a . x == b`
    Equal,
}

impl Relation {
    fn flipped(self) -> Self {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::GreaterEq => Relation::LessEq,
            Relation::Equal => Relation::Equal,
        }
    }
}

/// One row of a linear program.
#[derive(Debug, Clone)]
pub struct Constraint<T>
where
    T: Float + Debug,
{
    /// Coefficient of each decision variable
    pub coefficients: Vec<T>,
    /// Row direction
    pub relation: Relation,
    /// Right-hand side
    pub rhs: T,
}

impl<T> Constraint<T>
where
    T: Float + Debug,
{
    pub fn new(coefficients: Vec<T>, relation: Relation, rhs: T) -> Self {
        Self {
            coefficients,
            relation,
            rhs,
        }
    }

    pub fn less_eq(coefficients: Vec<T>, rhs: T) -> Self {
        Self::new(coefficients, Relation::LessEq, rhs)
    }

    pub fn greater_eq(coefficients: Vec<T>, rhs: T) -> Self {
        Self::new(coefficients, Relation::GreaterEq, rhs)
    }

    pub fn equal(coefficients: Vec<T>, rhs: T) -> Self {
        Self::new(coefficients, Relation::Equal, rhs)
    }
}

/// A linear program over non-negative variables:
/// optimize `c^T x` subject to the rows in `constraints` and `x >= 0`.
#[derive(Debug, Clone)]
pub struct LinearProgram<T>
where
    T: Float + Debug,
{
    /// The objective function coefficients (c in c^T x)
    pub objective: Vec<T>,
    /// Constraint rows
    pub constraints: Vec<Constraint<T>>,
}

impl<T> LinearProgram<T>
where
    T: Float + Debug,
{
    fn validate(&self) -> Result<()> {
        let n = self.objective.len();
        if n == 0 {
            return Err(Error::InvalidInput(
                "objective must have at least one coefficient".to_string(),
            ));
        }
        if let Some(c) = self.objective.iter().find(|c| !c.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "objective coefficient {c:?} is not finite"
            )));
        }
        for (i, row) in self.constraints.iter().enumerate() {
            if row.coefficients.len() != n {
                return Err(Error::InvalidInput(format!(
                    "constraint {i} has {} coefficients, expected {n}",
                    row.coefficients.len()
                )));
            }
            if !row.rhs.is_finite() || row.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(Error::InvalidInput(format!(
                    "constraint {i} has a non-finite coefficient or right-hand side"
                )));
            }
        }
        Ok(())
    }
}

/// Maximizes a linear program using the two-phase Simplex Method.
///
/// Rows with a negative right-hand side are multiplied by -1 first. `<=`
/// rows get a slack column, `>=` rows a surplus and an artificial column,
/// `=` rows an artificial column. When artificials are present, Phase I
/// minimizes their sum to find a feasible basis; Phase II then optimizes the
/// real objective. Entering and leaving variables follow Bland's rule, so
/// degenerate programs cannot cycle.
///
/// Infeasible and unbounded programs are reported through
/// [`OptimizationResult::status`], not as errors.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the objective is empty, a row has the
/// wrong number of coefficients, or any coefficient is not finite.
///
/// # Examples
///
/// ```
/// use numlab::math::optimization::{LpStatus, OptimizationConfig};
/// use numlab::math::optimization::simplex::{maximize, Constraint, LinearProgram};
///
/// // maximize x + y
/// // subject to:
/// //   2x + y <= 100
/// //   x <= 30
/// //   2y <= 40
/// let lp = LinearProgram {
///     objective: vec![1.0_f64, 1.0],
///     constraints: vec![
///         Constraint::less_eq(vec![2.0, 1.0], 100.0),
///         Constraint::less_eq(vec![1.0, 0.0], 30.0),
///         Constraint::less_eq(vec![0.0, 2.0], 40.0),
///     ],
/// };
///
/// let result = maximize(&lp, &OptimizationConfig::default()).unwrap();
/// assert_eq!(result.status, LpStatus::Optimal);
/// assert!((result.optimal_value - 50.0).abs() < 1e-9);
/// ```
pub fn maximize<T>(lp: &LinearProgram<T>, config: &OptimizationConfig<T>) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
{
    lp.validate()?;
    let n = lp.objective.len();
    let (mut tableau, art_start) = Tableau::build(lp);
    let cols = tableau.cols;
    let mut iterations = 0;

    // Phase I: drive the artificial variables to zero
    if art_start < cols {
        let cost: Vec<T> = (0..cols)
            .map(|j| if j >= art_start { -T::one() } else { T::zero() })
            .collect();
        if let Outcome::IterationLimit = tableau.optimize(&cost, cols, config, &mut iterations) {
            warn!("simplex hit the iteration limit ({}) in phase I", config.max_iterations);
            return Ok(tableau.result(&lp.objective, LpStatus::NotSolved, iterations));
        }

        let infeasibility = tableau
            .rows
            .iter()
            .zip(&tableau.basis)
            .filter(|&(_, &b)| b >= art_start)
            .fold(T::zero(), |acc, (row, _)| acc + row[cols]);
        if infeasibility > config.tolerance {
            debug!("phase I ended with artificial sum {infeasibility:?}: infeasible");
            return Ok(tableau.result(&lp.objective, LpStatus::Infeasible, iterations));
        }
        tableau.drive_out_artificials(art_start);
    }

    // Phase II: optimize the real objective, artificials may no longer enter
    let cost: Vec<T> = (0..cols)
        .map(|j| if j < n { lp.objective[j] } else { T::zero() })
        .collect();
    let status = match tableau.optimize(&cost, art_start, config, &mut iterations) {
        Outcome::Optimal => LpStatus::Optimal,
        Outcome::Unbounded => LpStatus::Unbounded,
        Outcome::IterationLimit => {
            warn!("simplex hit the iteration limit ({}) in phase II", config.max_iterations);
            LpStatus::NotSolved
        }
    };
    debug!("simplex finished with status {status} after {iterations} pivots");

    Ok(tableau.result(&lp.objective, status, iterations))
}

/// Minimizes a linear program by maximizing its negated objective.
pub fn minimize<T>(lp: &LinearProgram<T>, config: &OptimizationConfig<T>) -> Result<OptimizationResult<T>>
where
    T: Float + Debug,
{
    let max_lp = LinearProgram {
        objective: lp.objective.iter().map(|&c| -c).collect(),
        constraints: lp.constraints.clone(),
    };

    let result = maximize(&max_lp, config)?;

    Ok(OptimizationResult {
        optimal_value: -result.optimal_value,
        ..result
    })
}

enum Outcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Dense simplex tableau. Each row is `[A | b]`; `basis[i]` is the column
/// basic in row `i`.
struct Tableau<T> {
    rows: Vec<Vec<T>>,
    basis: Vec<usize>,
    cols: usize,
}

impl<T> Tableau<T>
where
    T: Float + Debug,
{
    /// Builds the initial tableau; returns it with the index of the first
    /// artificial column.
    fn build(lp: &LinearProgram<T>) -> (Self, usize) {
        let n = lp.objective.len();
        let rows: Vec<(Vec<T>, Relation, T)> = lp
            .constraints
            .iter()
            .map(|c| {
                if c.rhs < T::zero() {
                    let coefficients = c.coefficients.iter().map(|&a| -a).collect();
                    (coefficients, c.relation.flipped(), -c.rhs)
                } else {
                    (c.coefficients.clone(), c.relation, c.rhs)
                }
            })
            .collect();

        let slacks = rows
            .iter()
            .filter(|(_, rel, _)| *rel != Relation::Equal)
            .count();
        let artificials = rows
            .iter()
            .filter(|(_, rel, _)| *rel != Relation::LessEq)
            .count();
        let art_start = n + slacks;
        let cols = art_start + artificials;

        let mut tableau = Tableau {
            rows: Vec::with_capacity(rows.len()),
            basis: Vec::with_capacity(rows.len()),
            cols,
        };
        let mut slack = n;
        let mut art = art_start;
        for (coefficients, relation, rhs) in rows {
            let mut row = vec![T::zero(); cols + 1];
            row[..n].copy_from_slice(&coefficients);
            row[cols] = rhs;
            match relation {
                Relation::LessEq => {
                    row[slack] = T::one();
                    tableau.basis.push(slack);
                    slack += 1;
                }
                Relation::GreaterEq => {
                    row[slack] = -T::one();
                    slack += 1;
                    row[art] = T::one();
                    tableau.basis.push(art);
                    art += 1;
                }
                Relation::Equal => {
                    row[art] = T::one();
                    tableau.basis.push(art);
                    art += 1;
                }
            }
            tableau.rows.push(row);
        }

        (tableau, art_start)
    }

    /// Reduced costs `c_B B^-1 A - c`, with the objective value last.
    fn objective_row(&self, cost: &[T]) -> Vec<T> {
        let mut z = vec![T::zero(); self.cols + 1];
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            let cb = cost[b];
            if cb != T::zero() {
                for (zj, &a) in z.iter_mut().zip(row) {
                    *zj = *zj + cb * a;
                }
            }
        }
        for (zj, &c) in z.iter_mut().zip(cost) {
            *zj = *zj - c;
        }
        z
    }

    /// Maximizes `cost . x`, letting only columns below `allowed` enter.
    fn optimize(
        &mut self,
        cost: &[T],
        allowed: usize,
        config: &OptimizationConfig<T>,
        iterations: &mut usize,
    ) -> Outcome {
        let eps = eps::<T>();
        let mut z = self.objective_row(cost);

        loop {
            // Bland: lowest-index improving column
            let Some(col) = (0..allowed).find(|&j| z[j] < -eps) else {
                return Outcome::Optimal;
            };

            // Minimum ratio, ties to the lowest basic index
            let mut leaving: Option<(usize, T)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                let a = row[col];
                if a <= eps {
                    continue;
                }
                let ratio = row[self.cols] / a;
                leaving = match leaving {
                    Some((best, best_ratio))
                        if ratio > best_ratio + eps
                            || (ratio >= best_ratio - eps && self.basis[i] > self.basis[best]) =>
                    {
                        Some((best, best_ratio))
                    }
                    _ => Some((i, ratio)),
                };
            }
            let Some((row, _)) = leaving else {
                return Outcome::Unbounded;
            };

            if *iterations >= config.max_iterations {
                return Outcome::IterationLimit;
            }
            trace!("pivot {}: column {col} enters, row {row} leaves", *iterations);
            self.pivot(&mut z, row, col);
            *iterations += 1;
        }
    }

    // Perform pivot operation with numerical stability
    fn pivot(&mut self, z: &mut [T], row: usize, col: usize) {
        let eps = eps::<T>();

        let scale = T::one() / self.rows[row][col];
        for v in self.rows[row].iter_mut() {
            *v = *v * scale;
            if v.abs() < eps {
                *v = T::zero();
            }
        }
        self.rows[row][col] = T::one();

        let pivot_row = self.rows[row].clone();
        for (i, other) in self.rows.iter_mut().enumerate() {
            if i != row {
                eliminate(other, &pivot_row, col, eps);
            }
        }
        eliminate(z, &pivot_row, col, eps);

        self.basis[row] = col;
    }

    /// Replaces artificial variables left basic after Phase I. Their value is
    /// within tolerance of zero and is set to zero first, so a pivot of either
    /// sign leaves every right-hand side unchanged. Rows with no usable column
    /// are redundant and keep their artificial.
    fn drive_out_artificials(&mut self, art_start: usize) {
        let eps = eps::<T>();
        let cols = self.cols;
        let mut scratch = vec![T::zero(); cols + 1];
        for i in 0..self.rows.len() {
            if self.basis[i] < art_start {
                continue;
            }
            self.rows[i][cols] = T::zero();
            if let Some(col) = (0..art_start).find(|&j| self.rows[i][j].abs() > eps) {
                self.pivot(&mut scratch, i, col);
            }
        }
    }

    fn result(&self, objective: &[T], status: LpStatus, iterations: usize) -> OptimizationResult<T> {
        let n = objective.len();
        let mut point = vec![T::zero(); n];
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            if b < n {
                point[b] = row[self.cols].max(T::zero());
            }
        }
        let optimal_value = point
            .iter()
            .zip(objective)
            .fold(T::zero(), |acc, (&x, &c)| acc + c * x);

        OptimizationResult {
            optimal_point: point,
            optimal_value,
            iterations,
            status,
        }
    }
}

fn eliminate<T: Float>(target: &mut [T], pivot_row: &[T], col: usize, eps: T) {
    let factor = target[col];
    if factor == T::zero() {
        return;
    }
    for (t, &p) in target.iter_mut().zip(pivot_row) {
        *t = *t - factor * p;
        // Clean up small values
        if t.abs() < eps {
            *t = T::zero();
        }
    }
    target[col] = T::zero();
}
