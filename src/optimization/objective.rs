//! The objective-function abstraction.
//!
//! A [`GeometryMapping`] defines which physical quantities occupy which
//! slots of a flat parameter vector. An [`Objective`] binds one mapping
//! to one instrument, a list of fingering targets, and a tuning
//! evaluator, and adds everything the optimizer backends need: bounds,
//! an evaluation budget, and the backend-preparation heuristics.
//!
//! The instrument is owned by the objective, so no two optimizations can
//! alias the same geometry by construction.

use crate::error::{Error, Result};
use crate::geometry::Instrument;
use crate::optimization::constraints::ConstraintSet;
use crate::optimization::dispatcher::OptimizerKind;
use crate::tuning::{Fingering, TuningEvaluator};

/// Default evaluation budget per optimization run.
pub const DEFAULT_MAX_EVALUATIONS: usize = 10_000;

/// Default stopping trust-region radius, as a fraction of the initial
/// radius.
pub const DEFAULT_STOPPING_FRACTION: f64 = 1.0e-8;

/// Projection between a flat parameter vector and the physical geometry.
///
/// Concrete mappings are mechanical: they declare a dimension count and
/// read/write those quantities. Everything else lives in [`Objective`].
pub trait GeometryMapping {
    /// Number of vector dimensions. Fixed for the life of the mapping.
    fn dimensions(&self) -> usize;

    /// Project the current geometry onto the parameter vector.
    /// Side-effect-free.
    fn read(&self, instrument: &Instrument) -> Vec<f64>;

    /// Write the parameter vector into the geometry. The caller
    /// recomputes derived state afterwards; `point` is already
    /// length-checked.
    fn write(&self, instrument: &mut Instrument, point: &[f64]) -> Result<()>;

    /// Constraint metadata, one entry per dimension, carrying default
    /// bounds where the mapping has natural ones.
    fn constraints(&self) -> ConstraintSet;

    /// Preferred optimizer backend for this mapping.
    fn optimizer_kind(&self) -> OptimizerKind {
        OptimizerKind::TrustRegion
    }

    /// Hook for domain-specific floors on externally-supplied lower
    /// bounds (e.g. a position mapping refusing a bore-length bound
    /// above the lowest tone hole).
    fn validate_lower_bounds(&self, _instrument: &Instrument, _bounds: &[f64]) -> Result<()> {
        Ok(())
    }
}

/// An objective function over one instrument geometry.
pub struct Objective<E: TuningEvaluator> {
    mapping: Box<dyn GeometryMapping>,
    instrument: Instrument,
    targets: Vec<Fingering>,
    evaluator: E,
    constraints: ConstraintSet,
    lower: Vec<f64>,
    upper: Vec<f64>,
    max_evaluations: usize,
    evaluations_done: usize,
    tunings_done: usize,
    stopping_fraction: f64,
}

impl<E: TuningEvaluator> Objective<E> {
    /// Bind a mapping to an instrument, fingering targets, and an
    /// evaluator. Initial bounds come from the mapping's constraint
    /// metadata (zero where unset).
    ///
    /// # Panics
    ///
    /// Panics if the mapping's constraint metadata does not cover every
    /// dimension; that is a mapping authoring error.
    pub fn new(
        mapping: Box<dyn GeometryMapping>,
        instrument: Instrument,
        targets: Vec<Fingering>,
        evaluator: E,
    ) -> Self {
        let constraints = mapping.constraints();
        assert_eq!(
            constraints.len(),
            mapping.dimensions(),
            "mapping must declare one constraint per dimension"
        );
        let lower = constraints.lower_bounds();
        let upper = constraints.upper_bounds();
        Self {
            mapping,
            instrument,
            targets,
            evaluator,
            constraints,
            lower,
            upper,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            evaluations_done: 0,
            tunings_done: 0,
            stopping_fraction: DEFAULT_STOPPING_FRACTION,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.mapping.dimensions()
    }

    pub fn optimizer_kind(&self) -> OptimizerKind {
        self.mapping.optimizer_kind()
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Give the geometry back to the caller once optimization is done.
    pub fn into_instrument(self) -> Instrument {
        self.instrument
    }

    pub fn targets(&self) -> &[Fingering] {
        &self.targets
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper
    }

    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    pub fn set_max_evaluations(&mut self, budget: usize) {
        self.max_evaluations = budget;
    }

    pub fn evaluations_done(&self) -> usize {
        self.evaluations_done
    }

    pub fn tunings_done(&self) -> usize {
        self.tunings_done
    }

    pub fn reset_counters(&mut self) {
        self.evaluations_done = 0;
        self.tunings_done = 0;
    }

    /// Evaluations left before the budget is exhausted.
    pub fn remaining_evaluations(&self) -> usize {
        self.max_evaluations.saturating_sub(self.evaluations_done)
    }

    /// Override the stopping trust-region radius fraction.
    pub fn set_stopping_fraction(&mut self, fraction: f64) {
        self.stopping_fraction = fraction;
    }

    pub fn stopping_fraction(&self) -> f64 {
        self.stopping_fraction
    }

    /// Read the current geometry as a parameter vector.
    pub fn geometry_point(&self) -> Vec<f64> {
        self.mapping.read(&self.instrument)
    }

    /// Write a parameter vector into the geometry and recompute derived
    /// state. The only mutating entry point.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the vector has the wrong length;
    /// the geometry is not touched in that case.
    pub fn set_geometry_point(&mut self, point: &[f64]) -> Result<()> {
        self.check_dimensions(point)?;
        self.mapping.write(&mut self.instrument, point)?;
        self.instrument.recompute();
        Ok(())
    }

    /// Per-target tuning errors at `point`. Consumes one unit of the
    /// evaluation budget and `targets.len()` tunings.
    pub fn error_vector(&mut self, point: &[f64]) -> Result<Vec<f64>> {
        if self.evaluations_done >= self.max_evaluations {
            return Err(Error::BudgetExhausted {
                budget: self.max_evaluations,
            });
        }
        self.set_geometry_point(point)?;
        let errors = self.evaluator.errors(&self.instrument, &self.targets);
        self.evaluations_done += 1;
        self.tunings_done += self.targets.len();
        Ok(errors)
    }

    /// Scalar objective: sum of squared per-target errors.
    pub fn value(&mut self, point: &[f64]) -> Result<f64> {
        let errors = self.error_vector(point)?;
        Ok(errors.iter().map(|e| e * e).sum())
    }

    /// Univariate convenience for the bracketing backend.
    pub fn value_at(&mut self, x: f64) -> Result<f64> {
        self.value(&[x])
    }

    /// Current geometry projected into bounds. Out-of-range components
    /// are clamped, never rejected.
    pub fn initial_point(&self) -> Vec<f64> {
        self.geometry_point()
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&v, (&lo, &hi))| v.max(lo).min(hi))
            .collect()
    }

    /// Set lower bounds (defensive copy), after length validation and
    /// the mapping's domain-floor hook.
    pub fn set_lower_bounds(&mut self, bounds: &[f64]) -> Result<()> {
        self.check_dimensions(bounds)?;
        self.mapping.validate_lower_bounds(&self.instrument, bounds)?;
        self.lower = bounds.to_vec();
        for (i, &b) in bounds.iter().enumerate() {
            self.constraints.set_lower(i, b);
        }
        Ok(())
    }

    /// Set upper bounds (defensive copy), after length validation.
    pub fn set_upper_bounds(&mut self, bounds: &[f64]) -> Result<()> {
        self.check_dimensions(bounds)?;
        self.upper = bounds.to_vec();
        for (i, &b) in bounds.iter().enumerate() {
            self.constraints.set_upper(i, b);
        }
        Ok(())
    }

    fn check_dimensions(&self, vector: &[f64]) -> Result<()> {
        if vector.len() != self.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                actual: vector.len(),
            });
        }
        Ok(())
    }

    // --- backend preparation heuristics ---

    /// Population-size suggestion for the evolutionary backend
    /// (4 + 3·ln n, the usual CMA-ES default).
    pub fn suggested_population_size(&self) -> usize {
        let n = self.dimensions().max(1) as f64;
        (4.0 + 3.0 * n.ln()).floor() as usize
    }

    /// Interpolation-point suggestion for the trust-region backend
    /// (2n + 1).
    pub fn suggested_interpolation_points(&self) -> usize {
        2 * self.dimensions() + 1
    }

    /// Per-dimension standard deviation for the population backend:
    /// 20% of the bound span, zero for degenerate zero-width bounds.
    pub fn standard_deviations(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| {
                let span = hi - lo;
                if span > 0.0 {
                    0.2 * span
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Initial trust-region radius for a given start point: the
    /// smallest, over all dimensions, of 10% of the bound span and the
    /// distance from the point to the nearer bound, never exceeding 1.0.
    /// Zero-span dimensions and points sitting exactly on a bound do
    /// not collapse the radius to zero.
    pub fn initial_trust_radius(&self, point: &[f64]) -> f64 {
        let mut radius = 1.0_f64;
        for ((&v, &lo), &hi) in point.iter().zip(self.lower.iter()).zip(self.upper.iter()) {
            let span = hi - lo;
            if span <= 0.0 {
                continue;
            }
            radius = radius.min(0.1 * span);
            let nearer = (v - lo).min(hi - v);
            if nearer > 0.0 {
                radius = radius.min(nearer);
            }
        }
        radius
    }

    /// Stopping radius for the trust-region backend.
    pub fn stopping_trust_radius(&self, initial_radius: f64) -> f64 {
        self.stopping_fraction * initial_radius
    }

    /// Per-dimension simplex step: 25% of the distance to the farther
    /// bound, signed toward that bound; 10% of the initial value when
    /// the span is zero.
    pub fn simplex_steps(&self, point: &[f64]) -> Vec<f64> {
        point
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&v, (&lo, &hi))| {
                let up = hi - v;
                let down = v - lo;
                if hi - lo <= 0.0 {
                    0.1 * v
                } else if up >= down {
                    0.25 * up
                } else {
                    -0.25 * down
                }
            })
            .collect()
    }
}
