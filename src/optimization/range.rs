//! Start-point generators for multi-start optimization.
//!
//! A [`RangeProcessor`] yields successive candidate start points inside
//! the bound box. Random, grid, and Latin-hypercube strategies are
//! provided; the dispatcher defaults to the random generator with 30
//! starts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of starts for multi-start optimization.
pub const DEFAULT_STARTS: usize = 30;

/// Produces successive candidate start points, `None` when exhausted.
pub trait RangeProcessor {
    fn next_start(&mut self) -> Option<Vec<f64>>;

    /// Total starts this processor will produce.
    fn start_count(&self) -> usize;
}

/// Uniform random starts within bounds.
pub struct RandomRange {
    bounds: Vec<(f64, f64)>,
    remaining: usize,
    total: usize,
    rng: StdRng,
}

impl RandomRange {
    pub fn new(bounds: Vec<(f64, f64)>, starts: usize) -> Self {
        Self {
            bounds,
            remaining: starts,
            total: starts,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for tests and reproducible runs.
    pub fn with_seed(bounds: Vec<(f64, f64)>, starts: usize, seed: u64) -> Self {
        Self {
            bounds,
            remaining: starts,
            total: starts,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RangeProcessor for RandomRange {
    fn next_start(&mut self) -> Option<Vec<f64>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(
            self.bounds
                .iter()
                .map(|&(lo, hi)| {
                    if hi > lo {
                        self.rng.gen_range(lo..hi)
                    } else {
                        lo
                    }
                })
                .collect(),
        )
    }

    fn start_count(&self) -> usize {
        self.total
    }
}

/// Grid starts over a selected subset of dimensions; unselected
/// dimensions stay pinned at the reference point.
pub struct GridRange {
    bounds: Vec<(f64, f64)>,
    reference: Vec<f64>,
    selected: Vec<usize>,
    points_per_dim: usize,
    indices: Vec<usize>,
    exhausted: bool,
}

impl GridRange {
    pub fn new(
        bounds: Vec<(f64, f64)>,
        reference: Vec<f64>,
        selected: Vec<usize>,
        points_per_dim: usize,
    ) -> Self {
        let exhausted = selected.is_empty() || points_per_dim == 0;
        Self {
            indices: vec![0; selected.len()],
            bounds,
            reference,
            selected,
            points_per_dim,
            exhausted,
        }
    }

    fn value_at(&self, dim: usize, index: usize) -> f64 {
        let (lo, hi) = self.bounds[dim];
        if self.points_per_dim == 1 {
            (lo + hi) / 2.0
        } else {
            lo + index as f64 * (hi - lo) / (self.points_per_dim - 1) as f64
        }
    }
}

impl RangeProcessor for GridRange {
    fn next_start(&mut self) -> Option<Vec<f64>> {
        if self.exhausted {
            return None;
        }
        let mut point = self.reference.clone();
        for (slot, &dim) in self.selected.iter().enumerate() {
            point[dim] = self.value_at(dim, self.indices[slot]);
        }

        // Advance like counting in base points_per_dim.
        let mut carry = true;
        for index in &mut self.indices {
            if carry {
                *index += 1;
                if *index >= self.points_per_dim {
                    *index = 0;
                } else {
                    carry = false;
                }
            }
        }
        if carry {
            self.exhausted = true;
        }
        Some(point)
    }

    fn start_count(&self) -> usize {
        if self.selected.is_empty() || self.points_per_dim == 0 {
            0
        } else {
            self.points_per_dim.pow(self.selected.len() as u32)
        }
    }
}

/// Latin-hypercube starts: each dimension is divided into `starts`
/// equal intervals and every interval receives exactly one sample.
pub struct LatinHypercubeRange {
    samples: Vec<Vec<f64>>,
    next: usize,
}

impl LatinHypercubeRange {
    pub fn new(bounds: Vec<(f64, f64)>, starts: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let dims = bounds.len();

        let mut permutations: Vec<Vec<usize>> = Vec::with_capacity(dims);
        for _ in 0..dims {
            let mut perm: Vec<usize> = (0..starts).collect();
            // Fisher-Yates shuffle.
            for i in (1..perm.len()).rev() {
                let j = rng.gen_range(0..=i);
                perm.swap(i, j);
            }
            permutations.push(perm);
        }

        let mut samples = Vec::with_capacity(starts);
        for i in 0..starts {
            let sample = (0..dims)
                .map(|dim| {
                    let (lo, hi) = bounds[dim];
                    let interval = (hi - lo) / starts as f64;
                    lo + (permutations[dim][i] as f64 + rng.gen_range(0.0..1.0)) * interval
                })
                .collect();
            samples.push(sample);
        }
        Self { samples, next: 0 }
    }
}

impl RangeProcessor for LatinHypercubeRange {
    fn next_start(&mut self) -> Option<Vec<f64>> {
        let sample = self.samples.get(self.next).cloned();
        self.next += 1;
        sample
    }

    fn start_count(&self) -> usize {
        self.samples.len()
    }
}
