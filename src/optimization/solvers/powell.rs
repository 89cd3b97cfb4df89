//! Powell's direction-set method.
//!
//! Cycles of univariate line minimizations (Brent) along an evolving
//! direction set: after each cycle the direction of largest decrease is
//! replaced by the cycle's net displacement. Derivative-free and
//! bound-unaware.

use crate::error::Result;
use crate::optimization::solvers::{brent, Solution};

pub struct PowellConfig {
    pub max_cycles: usize,
    /// Relative improvement below which a cycle counts as converged.
    pub tolerance: f64,
    /// Half-width of the line-search bracket, in multiples of each
    /// direction vector.
    pub bracket: f64,
}

impl Default for PowellConfig {
    fn default() -> Self {
        Self {
            max_cycles: 100,
            tolerance: 1.0e-10,
            bracket: 2.0,
        }
    }
}

impl PowellConfig {
    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Minimize `f` from `start`. `scales` sets the length of the initial
/// coordinate directions (a zero scale falls back to a small default so
/// the dimension is still searched).
pub fn minimize<F>(
    mut f: F,
    start: &[f64],
    scales: &[f64],
    config: &PowellConfig,
) -> Result<Solution>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let n = start.len();
    let mut evaluations = 0;

    let mut directions: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut direction = vec![0.0; n];
            direction[i] = if scales[i] != 0.0 { scales[i] } else { 0.25 };
            direction
        })
        .collect();

    let mut point = start.to_vec();
    let mut value = f(&point)?;
    evaluations += 1;

    for _ in 0..config.max_cycles {
        let cycle_start_point = point.clone();
        let cycle_start_value = value;
        let mut largest_decrease = 0.0;
        let mut largest_index = 0;

        for (index, direction) in directions.iter().enumerate() {
            let before = value;
            let line = brent::minimize(
                |t| {
                    let probe: Vec<f64> = point
                        .iter()
                        .zip(direction.iter())
                        .map(|(&p, &d)| p + t * d)
                        .collect();
                    f(&probe)
                },
                -config.bracket,
                config.bracket,
                0.0,
                1.0e-8,
                100,
            )?;
            evaluations += line.evaluations;
            if line.value < value {
                let t = line.point[0];
                for (p, &d) in point.iter_mut().zip(direction.iter()) {
                    *p += t * d;
                }
                value = line.value;
            }
            if before - value > largest_decrease {
                largest_decrease = before - value;
                largest_index = index;
            }
        }

        let improvement = cycle_start_value - value;
        if improvement <= config.tolerance * (value.abs() + config.tolerance) {
            break;
        }

        // Replace the most productive direction by the cycle's net move.
        let displacement: Vec<f64> = point
            .iter()
            .zip(cycle_start_point.iter())
            .map(|(&a, &b)| a - b)
            .collect();
        if displacement.iter().any(|&d| d != 0.0) {
            directions[largest_index] = displacement;
        }
    }

    Ok(Solution {
        point,
        value,
        evaluations,
    })
}
