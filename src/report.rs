//! Console reports.
//!
//! Integral values are printed with 6 decimals and percentages with 2.

use std::fmt;

use crate::production::ProductionPlan;

/// A Monte Carlo estimate next to its quadrature reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationComparison {
    pub monte_carlo: f64,
    pub reference: f64,
}

impl IntegrationComparison {
    pub fn new(monte_carlo: f64, reference: f64) -> Self {
        Self {
            monte_carlo,
            reference,
        }
    }

    /// `|mc - ref| / ref * 100`, or `None` for a zero reference.
    pub fn relative_error_percent(&self) -> Option<f64> {
        if self.reference == 0.0 {
            return None;
        }
        Some((self.monte_carlo - self.reference).abs() / self.reference.abs() * 100.0)
    }
}

impl fmt::Display for IntegrationComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Integral results:")?;
        writeln!(f, "Monte Carlo method: {:.6}", self.monte_carlo)?;
        writeln!(f, "Quadrature result: {:.6}", self.reference)?;
        match self.relative_error_percent() {
            Some(percent) => write!(f, "Relative error: {percent:.2}%"),
            None => write!(f, "Relative error: n/a"),
        }
    }
}

impl fmt::Display for ProductionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Production optimization results:")?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Lemonade: {:?}", self.lemonade)?;
        writeln!(f, "Fruit juice: {:?}", self.fruit_juice)?;
        writeln!(f, "Total beverages: {:?}", self.total)?;
        writeln!(f)?;
        write!(f, "Resource usage:")?;
        for resource in &self.resources {
            write!(f, "\n{}: {:?}/{}", resource.name, resource.used, resource.available)?;
        }
        Ok(())
    }
}
