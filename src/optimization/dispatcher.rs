//! Backend selection and the optimization entry points.
//!
//! [`optimize`] prepares backend configuration from the objective's
//! helpers, runs the chosen backend, and writes the winning point back
//! into the geometry. [`multi_start`] repeats that from a stream of
//! start points under one shared evaluation budget.
//!
//! On any failure the pre-optimization geometry is restored, so a
//! caller never observes a half-optimized instrument.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::optimization::objective::Objective;
use crate::optimization::range::{RandomRange, RangeProcessor, DEFAULT_STARTS};
use crate::optimization::solvers::{brent, evolution, powell, simplex, trust};
use crate::tuning::TuningEvaluator;

/// The available optimizer backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerKind {
    /// Univariate bracketing; one-dimensional objectives only.
    Brent,
    /// Direction-set method, bound-unaware.
    Powell,
    /// Nelder-Mead, bound-unaware.
    Simplex,
    /// Bound-aware population method.
    Evolution,
    /// Bound-aware trust-region pattern search.
    TrustRegion,
    /// Repeated trust-region runs from random starts.
    MultiStart,
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub point: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
}

/// Run the selected backend (the mapping's preference when `kind` is
/// `None`) and leave the objective's geometry at the best point found.
///
/// # Errors
///
/// Backend and budget errors propagate; the geometry is restored to its
/// pre-call state first.
pub fn optimize<E: TuningEvaluator>(
    objective: &mut Objective<E>,
    kind: Option<OptimizerKind>,
) -> Result<Outcome> {
    let kind = kind.unwrap_or_else(|| objective.optimizer_kind());

    if kind == OptimizerKind::MultiStart {
        let bounds: Vec<(f64, f64)> = objective
            .lower_bounds()
            .iter()
            .zip(objective.upper_bounds().iter())
            .map(|(&lo, &hi)| (lo, hi))
            .collect();
        let mut processor = RandomRange::new(bounds, DEFAULT_STARTS);
        let ranked = multi_start(objective, &mut processor, OptimizerKind::TrustRegion)?;
        return ranked
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| Error::Solver("no start produced a result".into()));
    }

    let before = objective.geometry_point();
    let start = objective.initial_point();
    match run_single(objective, kind, &start) {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            warn!("optimization failed, restoring geometry: {err}");
            restore(objective, &before);
            Err(err)
        }
    }
}

/// Run the backend once per start point under the objective's shared
/// evaluation budget. The objective's clamped initial point is always
/// tried first, ahead of the processor's starts, so whenever a start
/// succeeds the best result is no worse than the starting geometry.
/// Recoverable failures (budget, backend) yield `None` for that start;
/// any other error aborts the whole run. Results come back ranked
/// best-first with `None` entries trailing. The geometry ends at the
/// overall best point, or at its pre-call state if every start failed.
pub fn multi_start<E: TuningEvaluator>(
    objective: &mut Objective<E>,
    processor: &mut dyn RangeProcessor,
    kind: OptimizerKind,
) -> Result<Vec<Option<Outcome>>> {
    if kind == OptimizerKind::MultiStart {
        return Err(Error::Solver("multi-start cannot nest".into()));
    }
    let before = objective.geometry_point();
    let lower = objective.lower_bounds().to_vec();
    let upper = objective.upper_bounds().to_vec();

    let mut starts = vec![objective.initial_point()];
    while let Some(raw) = processor.next_start() {
        starts.push(raw);
    }

    let mut results: Vec<Option<Outcome>> = Vec::new();
    for (index, raw) in starts.into_iter().enumerate() {
        // Starts are clamped into bounds, never rejected.
        let start: Vec<f64> = raw
            .iter()
            .zip(lower.iter().zip(upper.iter()))
            .map(|(&v, (&lo, &hi))| v.max(lo).min(hi))
            .collect();
        match run_single(objective, kind, &start) {
            Ok(outcome) => {
                debug!(
                    "start {index}: value {:.6e} after {} evaluations",
                    outcome.value, outcome.evaluations
                );
                results.push(Some(outcome));
            }
            Err(err) if err.is_recoverable() => {
                debug!("start {index} failed: {err}");
                results.push(None);
            }
            Err(err) => {
                warn!("start {index} hit a fatal error: {err}");
                restore(objective, &before);
                return Err(err);
            }
        }
    }

    results.sort_by(|a, b| match (a, b) {
        (Some(x), Some(y)) => x.value.total_cmp(&y.value),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    match results.first() {
        Some(Some(best)) => {
            let point = best.point.clone();
            objective.set_geometry_point(&point)?;
        }
        _ => {
            warn!("every start failed, restoring geometry");
            restore(objective, &before);
        }
    }
    Ok(results)
}

fn restore<E: TuningEvaluator>(objective: &mut Objective<E>, before: &[f64]) {
    if let Err(err) = objective.set_geometry_point(before) {
        warn!("could not restore pre-optimization geometry: {err}");
    }
}

/// One backend run from one start point. Writes the solution back into
/// the geometry on success; the caller handles restoration on failure.
fn run_single<E: TuningEvaluator>(
    objective: &mut Objective<E>,
    kind: OptimizerKind,
    start: &[f64],
) -> Result<Outcome> {
    let solution = match kind {
        OptimizerKind::Brent => {
            if objective.dimensions() != 1 {
                return Err(Error::Solver(format!(
                    "univariate backend needs a one-dimensional objective, got {}",
                    objective.dimensions()
                )));
            }
            let lo = objective.lower_bounds()[0];
            let hi = objective.upper_bounds()[0];
            brent::minimize(|x| objective.value_at(x), lo, hi, start[0], 1.0e-8, 200)?
        }
        OptimizerKind::Simplex => {
            let steps = objective.simplex_steps(start);
            let config = simplex::SimplexConfig::default();
            simplex::minimize(|x| objective.value(x), start, &steps, &config)?
        }
        OptimizerKind::Powell => {
            let scales = objective.simplex_steps(start);
            let config = powell::PowellConfig::default();
            powell::minimize(|x| objective.value(x), start, &scales, &config)?
        }
        OptimizerKind::Evolution => {
            let lower = objective.lower_bounds().to_vec();
            let upper = objective.upper_bounds().to_vec();
            let sigma = objective.standard_deviations();
            let config = evolution::EvolutionConfig::default()
                .with_population_size(objective.suggested_population_size());
            evolution::minimize(
                |x| objective.value(x),
                start,
                &lower,
                &upper,
                &sigma,
                &config,
            )?
        }
        OptimizerKind::TrustRegion => {
            let lower = objective.lower_bounds().to_vec();
            let upper = objective.upper_bounds().to_vec();
            let radius = objective.initial_trust_radius(start);
            let stopping = objective.stopping_trust_radius(radius);
            let config = trust::TrustConfig::new(radius, stopping);
            trust::minimize(|x| objective.value(x), start, &lower, &upper, &config)?
        }
        OptimizerKind::MultiStart => {
            return Err(Error::Solver("multi-start is not a single backend".into()))
        }
    };

    objective.set_geometry_point(&solution.point)?;
    Ok(Outcome {
        point: solution.point,
        value: solution.value,
        evaluations: solution.evaluations,
    })
}
