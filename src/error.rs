//! Error types shared by the integration and optimization routines.

use thiserror::Error;

/// Errors reported by `numlab`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The integration interval is empty, reversed or not finite.
    #[error("invalid interval [{a}, {b}]: lower bound must be finite and strictly below the upper bound")]
    InvalidInterval { a: f64, b: f64 },

    /// No samples were requested.
    #[error("invalid sample count {0}: at least one sample is required")]
    InvalidSampleCount(usize),

    /// The integrand went below zero on the probe grid.
    #[error("integrand is negative at x = {x} (f(x) = {value}); hit-or-miss sampling needs f >= 0")]
    NegativeIntegrand { x: f64, value: f64 },

    /// The integrand produced NaN or an infinity on the probe grid.
    #[error("integrand is not finite at x = {x} (f(x) = {value})")]
    NonFiniteIntegrand { x: f64, value: f64 },

    /// Malformed configuration or problem data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
