//! Geometry optimization framework.
//!
//! An [`Objective`] binds a [`GeometryMapping`] (which physical
//! quantities occupy which slots of a flat parameter vector) to one
//! instrument, a set of fingering targets, and a tuning evaluator.
//! [`optimize`] runs the mapping's preferred backend and leaves the
//! geometry at the best point found; [`multi_start`] repeats that from
//! a stream of start points under one shared evaluation budget.
//!
//! # Example
//!
//! ```
//! use windopt::bore::BoreLengthAdjuster;
//! use windopt::geometry::{BorePoint, Instrument, ToneHole};
//! use windopt::optimization::{optimize, BoreLengthMapping, Objective};
//! use windopt::tuning::{Fingering, HalfWaveEvaluator};
//!
//! let instrument = Instrument::new(
//!     "whistle",
//!     vec![BorePoint::new(0.0, 0.014), BorePoint::new(0.30, 0.014)],
//!     vec![ToneHole::new("h1", 0.22, 0.007, 0.003)],
//! );
//!
//! // Tune the all-closed note to 500 Hz by adjusting the bore length.
//! let targets = vec![Fingering::new("B4", 500.0, vec![false])];
//! let mapping = BoreLengthMapping::new(BoreLengthAdjuster::MoveBottom)
//!     .with_bounds(0.25, 0.40);
//!
//! let mut objective = Objective::new(
//!     Box::new(mapping),
//!     instrument,
//!     targets,
//!     HalfWaveEvaluator::default(),
//! );
//!
//! // `None` defers to the mapping's backend preference (Brent here).
//! let outcome = optimize(&mut objective, None).unwrap();
//! assert!(outcome.value < 1.0);
//! assert!((objective.instrument().bore_length() - 0.343).abs() < 1e-3);
//! ```

pub mod constraints;
pub mod dispatcher;
pub mod mappings;
pub mod merged;
pub mod objective;
pub mod range;
pub mod solvers;

// Re-export commonly used items
pub use constraints::{Constraint, ConstraintKind, ConstraintSet};
pub use dispatcher::{multi_start, optimize, OptimizerKind, Outcome};
pub use mappings::{BoreLengthMapping, HolePositionMapping, HoleSizeMapping};
pub use merged::MergedMapping;
pub use objective::{
    GeometryMapping, Objective, DEFAULT_MAX_EVALUATIONS, DEFAULT_STOPPING_FRACTION,
};
pub use range::{GridRange, LatinHypercubeRange, RandomRange, RangeProcessor, DEFAULT_STARTS};
pub use solvers::Solution;
