pub mod error;
pub mod logging;
pub mod math;
pub mod production;
pub mod report;

pub use error::{Error, Result};
pub use math::{monte_carlo, optimization, quadrature};
