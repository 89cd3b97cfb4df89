//! Error types for the optimization framework.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the geometry optimization framework.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector was consumed with the wrong length. Always fatal to the
    /// call; the geometry is left untouched.
    #[error("dimension mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The strict preserve-bore policy refused to move interior bore
    /// points. Carries the offending positions so a caller can present
    /// the corrective action.
    #[error(
        "bore profile violation: points at {positions:?} lie at or beyond \
         the requested bore length {requested}; delete the trailing bore \
         points or raise the lower bound on bore length"
    )]
    BoreProfileViolation {
        positions: Vec<f64>,
        requested: f64,
    },

    /// The shared evaluation budget ran out.
    #[error("evaluation budget of {budget} exhausted")]
    BudgetExhausted { budget: usize },

    /// A bound vector was rejected by a mapping's domain validation.
    #[error("invalid bound: {0}")]
    InvalidBound(String),

    /// The instrument geometry cannot support the requested operation.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A backend failed internally (non-convergence, degenerate setup).
    #[error("optimizer failed: {0}")]
    Solver(String),
}

impl Error {
    /// True for the failure kinds the dispatcher recovers from locally
    /// (absent result in multi-start, reported failure in single-start).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::BudgetExhausted { .. } | Error::Solver(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bore_profile_violation_names_offenders() {
        let err = Error::BoreProfileViolation {
            positions: vec![20.0, 30.0],
            requested: 15.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("20"));
        assert!(msg.contains("15"));
        assert!(msg.contains("delete the trailing bore points"));
    }

    #[test]
    fn recoverable_classification() {
        assert!(Error::BudgetExhausted { budget: 100 }.is_recoverable());
        assert!(Error::Solver("degenerate simplex".into()).is_recoverable());
        assert!(!Error::DimensionMismatch {
            expected: 3,
            actual: 2
        }
        .is_recoverable());
    }
}
