//! Bound-aware evolutionary minimization.
//!
//! A plain generational EA: tournament selection, blend crossover,
//! Gaussian mutation with a per-dimension sigma vector, elitism.
//! Offspring are clamped into the bound box, so every evaluated point
//! is feasible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{Error, Result};
use crate::optimization::solvers::Solution;

pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub tournament_size: usize,
    pub elite_count: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 100,
            tournament_size: 3,
            elite_count: 2,
            crossover_rate: 0.9,
            mutation_rate: 0.3,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

struct Individual {
    genes: Vec<f64>,
    fitness: f64,
}

/// Minimize `f` inside `[lower, upper]`, seeding the population with
/// `start` plus uniform random points. `sigma` sets the per-dimension
/// mutation scale (a zero entry freezes that dimension's mutation).
pub fn minimize<F>(
    mut f: F,
    start: &[f64],
    lower: &[f64],
    upper: &[f64],
    sigma: &[f64],
    config: &EvolutionConfig,
) -> Result<Solution>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut evaluations = 0;

    let clamp = |genes: &mut [f64]| {
        for ((g, &lo), &hi) in genes.iter_mut().zip(lower.iter()).zip(upper.iter()) {
            *g = g.max(lo).min(hi);
        }
    };

    let mut population = Vec::with_capacity(config.population_size);
    let mut seed_genes = start.to_vec();
    clamp(&mut seed_genes);
    let fitness = f(&seed_genes)?;
    evaluations += 1;
    population.push(Individual {
        genes: seed_genes,
        fitness,
    });
    while population.len() < config.population_size {
        let mut genes: Vec<f64> = lower
            .iter()
            .zip(upper.iter())
            .map(|(&lo, &hi)| if hi > lo { rng.gen_range(lo..hi) } else { lo })
            .collect();
        clamp(&mut genes);
        let fitness = f(&genes)?;
        evaluations += 1;
        population.push(Individual { genes, fitness });
    }

    for _ in 0..config.generations {
        population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));

        let mut next: Vec<Individual> = population
            .iter()
            .take(config.elite_count.min(population.len()))
            .map(|ind| Individual {
                genes: ind.genes.clone(),
                fitness: ind.fitness,
            })
            .collect();

        while next.len() < config.population_size {
            let a = tournament(&population, config.tournament_size, &mut rng);
            let b = tournament(&population, config.tournament_size, &mut rng);

            let mut genes: Vec<f64> = if rng.gen::<f64>() < config.crossover_rate {
                // Blend crossover: per-gene interpolation between parents.
                population[a]
                    .genes
                    .iter()
                    .zip(population[b].genes.iter())
                    .map(|(&ga, &gb)| {
                        let alpha: f64 = rng.gen();
                        alpha * ga + (1.0 - alpha) * gb
                    })
                    .collect()
            } else {
                population[a].genes.clone()
            };

            for (i, g) in genes.iter_mut().enumerate() {
                if sigma[i] > 0.0 && rng.gen::<f64>() < config.mutation_rate {
                    let normal = Normal::new(0.0, sigma[i])
                        .map_err(|e| Error::Solver(format!("mutation sigma: {e}")))?;
                    *g += normal.sample(&mut rng);
                }
            }
            clamp(&mut genes);

            let fitness = f(&genes)?;
            evaluations += 1;
            next.push(Individual { genes, fitness });
        }
        population = next;
    }

    let best = population
        .into_iter()
        .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .ok_or_else(|| Error::Solver("empty population".into()))?;
    Ok(Solution {
        point: best.genes,
        value: best.fitness,
        evaluations,
    })
}

fn tournament(population: &[Individual], size: usize, rng: &mut StdRng) -> usize {
    let mut winner = rng.gen_range(0..population.len());
    for _ in 1..size.max(1) {
        let challenger = rng.gen_range(0..population.len());
        if population[challenger].fitness < population[winner].fitness {
            winner = challenger;
        }
    }
    winner
}
