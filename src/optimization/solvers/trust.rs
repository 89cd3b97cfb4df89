//! Bound-aware trust-region pattern search.
//!
//! Polls the 2n axial neighbours of the incumbent at the current radius,
//! clipped into the bound box. A successful poll moves the incumbent and
//! grows the radius; a failed sweep shrinks it. Terminates when the
//! radius falls below the stopping radius.

use crate::error::Result;
use crate::optimization::solvers::Solution;

const GROW: f64 = 2.0;
const SHRINK: f64 = 0.5;

pub struct TrustConfig {
    pub initial_radius: f64,
    pub stopping_radius: f64,
    pub max_iterations: usize,
}

impl TrustConfig {
    pub fn new(initial_radius: f64, stopping_radius: f64) -> Self {
        Self {
            initial_radius,
            stopping_radius,
            max_iterations: 10_000,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Minimize `f` from `start` inside `[lower, upper]`.
pub fn minimize<F>(
    mut f: F,
    start: &[f64],
    lower: &[f64],
    upper: &[f64],
    config: &TrustConfig,
) -> Result<Solution>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let n = start.len();
    let mut evaluations = 0;

    let mut point: Vec<f64> = start
        .iter()
        .zip(lower.iter().zip(upper.iter()))
        .map(|(&v, (&lo, &hi))| v.max(lo).min(hi))
        .collect();
    let mut value = f(&point)?;
    evaluations += 1;

    let mut radius = config.initial_radius;
    for _ in 0..config.max_iterations {
        if radius < config.stopping_radius {
            break;
        }

        let mut improved = false;
        for dim in 0..n {
            for sign in [1.0, -1.0] {
                let candidate = (point[dim] + sign * radius)
                    .max(lower[dim])
                    .min(upper[dim]);
                if candidate == point[dim] {
                    continue;
                }
                let mut probe = point.clone();
                probe[dim] = candidate;
                let probe_value = f(&probe)?;
                evaluations += 1;
                if probe_value < value {
                    point = probe;
                    value = probe_value;
                    improved = true;
                }
            }
        }

        radius = if improved {
            radius * GROW
        } else {
            radius * SHRINK
        };
    }

    Ok(Solution {
        point,
        value,
        evaluations,
    })
}
