//! Derivative-free optimizer backends.
//!
//! Each backend minimizes a caller-supplied closure over `&[f64]` (or a
//! scalar for the univariate minimizer) and stops on its own convergence
//! test or when its iteration cap runs out. Budget errors raised by the
//! closure propagate out untouched, so an exhausted evaluation budget
//! unwinds any backend mid-run.

pub mod brent;
pub mod evolution;
pub mod powell;
pub mod simplex;
pub mod trust;

/// Best point found by a backend run.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub point: Vec<f64>,
    pub value: f64,
    /// Objective evaluations consumed by this run.
    pub evaluations: usize,
}
