//! Nelder-Mead simplex minimization.
//!
//! Bound-unaware: the simplex wanders freely, so callers pair it with
//! mappings whose geometry tolerates out-of-range probes. The initial
//! simplex is the start point plus one vertex per dimension, displaced
//! by the caller's per-dimension step.

use crate::error::Result;
use crate::optimization::solvers::Solution;

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

pub struct SimplexConfig {
    pub max_iterations: usize,
    /// Stop once the value spread across the simplex drops below this.
    pub tolerance: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1.0e-10,
        }
    }
}

impl SimplexConfig {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Minimize `f` from `start`, seeding the simplex with `steps`.
pub fn minimize<F>(
    mut f: F,
    start: &[f64],
    steps: &[f64],
    config: &SimplexConfig,
) -> Result<Solution>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let n = start.len();
    let mut evaluations = 0;

    let mut vertices: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    vertices.push(start.to_vec());
    for i in 0..n {
        let mut vertex = start.to_vec();
        // A zero step would collapse the simplex along this axis.
        vertex[i] += if steps[i] != 0.0 { steps[i] } else { 1.0e-4 };
        vertices.push(vertex);
    }
    let mut values = Vec::with_capacity(n + 1);
    for vertex in &vertices {
        values.push(f(vertex)?);
        evaluations += 1;
    }

    for _ in 0..config.max_iterations {
        // Order so vertex 0 is best and vertex n is worst.
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let reordered: Vec<Vec<f64>> = order.iter().map(|&i| vertices[i].clone()).collect();
        let reordered_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        vertices = reordered;
        values = reordered_values;

        if values[n] - values[0] < config.tolerance {
            break;
        }

        // Centroid of everything but the worst vertex.
        let mut centroid = vec![0.0; n];
        for vertex in vertices.iter().take(n) {
            for (c, &v) in centroid.iter_mut().zip(vertex.iter()) {
                *c += v;
            }
        }
        for c in &mut centroid {
            *c /= n as f64;
        }

        let blend = |towards: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(vertices[n].iter())
                .map(|(&c, &w)| c + towards * (c - w))
                .collect()
        };

        let reflected = blend(REFLECT);
        let reflected_value = f(&reflected)?;
        evaluations += 1;

        if reflected_value < values[0] {
            let expanded = blend(EXPAND);
            let expanded_value = f(&expanded)?;
            evaluations += 1;
            if expanded_value < reflected_value {
                vertices[n] = expanded;
                values[n] = expanded_value;
            } else {
                vertices[n] = reflected;
                values[n] = reflected_value;
            }
        } else if reflected_value < values[n - 1] {
            vertices[n] = reflected;
            values[n] = reflected_value;
        } else {
            let contracted = blend(-CONTRACT);
            let contracted_value = f(&contracted)?;
            evaluations += 1;
            if contracted_value < values[n] {
                vertices[n] = contracted;
                values[n] = contracted_value;
            } else {
                // Shrink everything toward the best vertex.
                let best = vertices[0].clone();
                for i in 1..=n {
                    for (v, &b) in vertices[i].iter_mut().zip(best.iter()) {
                        *v = b + SHRINK * (*v - b);
                    }
                    values[i] = f(&vertices[i])?;
                    evaluations += 1;
                }
            }
        }
    }

    let best = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    Ok(Solution {
        point: vertices[best].clone(),
        value: values[best],
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimizes_a_shifted_sphere() {
        let solution = minimize(
            |x| Ok((x[0] - 1.0).powi(2) + (x[1] + 2.0).powi(2)),
            &[0.0, 0.0],
            &[0.5, 0.5],
            &SimplexConfig::default(),
        )
        .unwrap();
        assert_relative_eq!(solution.point[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(solution.point[1], -2.0, epsilon = 1e-4);
    }

    #[test]
    fn survives_zero_steps() {
        let solution = minimize(
            |x| Ok(x[0] * x[0] + x[1] * x[1]),
            &[0.3, 0.3],
            &[0.0, 0.1],
            &SimplexConfig::default(),
        )
        .unwrap();
        assert!(solution.value < 1e-6);
    }

    #[test]
    fn makes_progress_on_rosenbrock() {
        let start = [-1.2, 1.0];
        let rosenbrock =
            |x: &[f64]| Ok(100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2));
        let solution = minimize(
            rosenbrock,
            &start,
            &[0.5, 0.5],
            &SimplexConfig::default().with_max_iterations(2000),
        )
        .unwrap();
        assert_relative_eq!(solution.point[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(solution.point[1], 1.0, epsilon = 1e-3);
    }
}
