//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! seeding → evaluation → selection → crossover → mutation → repeat, with
//! local search on the best chromosome, stagnation shocks and adaptive
//! reweighting between generations.

use super::config::GaConfig;
use super::controller::AdaptiveController;
use super::operators::{
    flip_rotation, order_crossover, rotation_crossover, sort_segment_by_height, swap_mutation,
};
use super::seeding::{initial_population, shock_seeds};
use super::types::Chromosome;
use crate::decoder::Decoded;
use crate::error::Result;
use crate::fitness::{FitnessEvaluator, FitnessWeights, ViolationCounts};
use crate::model::{ContainerProfile, Item};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Summary of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// Generation number; 0 is the initial population.
    pub generation: usize,
    /// Fitness of the best chromosome found so far.
    pub best_fitness: f64,
    /// Mean fitness of the current population.
    pub mean_fitness: f64,
    /// Pallet count of the best chromosome.
    pub best_pallet_count: usize,
    /// Mean fill ratio of the best chromosome.
    pub best_fill_ratio: f64,
    /// Weight snapshot the generation was scored under.
    pub weights_version: u64,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best chromosome found, `None` when there was nothing to pack.
    pub best: Option<Chromosome>,
    /// Decoded layout of `best`.
    pub decoded: Decoded,
    /// One entry per generation, starting with the initial population.
    pub history: Vec<GenerationStats>,
    /// Number of generations executed after the initial population.
    pub generations: usize,
    /// Number of stagnation shocks applied.
    pub stagnation_shocks: usize,
    /// Whether the run stopped before the generation budget.
    pub terminated_early: bool,
    /// Whether the stop was caused by the cancellation flag.
    pub cancelled: bool,
    /// Final weight snapshot; `best.fitness` is current under it.
    pub weights: FitnessWeights,
    /// Hard violations of `decoded` under the final weights.
    pub violations: ViolationCounts,
}

impl GaResult {
    /// Whether a layout was produced and it has no hard violations.
    pub fn is_feasible(&self) -> bool {
        self.best.is_some() && self.violations.total() == 0
    }

    fn empty(items: &[Item], weights: FitnessWeights) -> Self {
        Self {
            best: None,
            decoded: Decoded {
                pallets: Vec::new(),
                unplaced: (0..items.len()).collect(),
            },
            history: Vec::new(),
            generations: 0,
            stagnation_shocks: 0,
            terminated_early: false,
            cancelled: false,
            weights,
            violations: ViolationCounts {
                unplaced: items.len(),
                ..ViolationCounts::default()
            },
        }
    }
}

/// Executes the packing GA.
///
/// # Usage
///
/// ```
/// use u_palletize::fitness::FitnessWeights;
/// use u_palletize::ga::{GaConfig, GaRunner};
/// use u_palletize::model::{ContainerProfile, Item};
///
/// let items: Vec<Item> = (0..8)
///     .map(|i| Item::new(format!("box{i}"), 40.0, 50.0, 60.0).with_weight(10.0))
///     .collect();
/// let container = ContainerProfile::new(120.0, 100.0, 180.0, 1000.0);
/// let config = GaConfig::auto_select(items.len()).with_seed(42);
///
/// let result = GaRunner::run(&items, &container, &config, &FitnessWeights::default()).unwrap();
/// assert!(result.is_feasible());
/// assert_eq!(result.decoded.pallet_count(), 1);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA over `items` on `container`.
    ///
    /// Fails only on invalid configuration, weights or items. An empty item
    /// list or a degenerate container yields a result with `best = None`.
    pub fn run(
        items: &[Item],
        container: &ContainerProfile,
        config: &GaConfig,
        weights: &FitnessWeights,
    ) -> Result<GaResult> {
        Self::run_with_cancel(items, container, config, weights, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA will
    /// stop at the next generation boundary and return the best solution
    /// found so far.
    pub fn run_with_cancel(
        items: &[Item],
        container: &ContainerProfile,
        config: &GaConfig,
        weights: &FitnessWeights,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        config.validate()?;
        weights.validate()?;
        for item in items {
            item.validate()?;
        }

        if items.is_empty() || !container.is_valid() {
            log::warn!(
                "nothing to optimize: {} items, container valid = {}",
                items.len(),
                container.is_valid()
            );
            return Ok(GaResult::empty(items, weights.clone()));
        }

        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let evaluator = FitnessEvaluator::new(items, *container)
            .with_decoder(config.decoder)
            .with_stacking(config.stacking);
        let mut weights = weights.clone();
        let controller = AdaptiveController::new(
            &weights,
            evaluator.min_pallets(),
            config.pallet_margin,
            config.fill_target,
        );
        let started = Instant::now();
        let time_limit = config.time_limit_ms.map(Duration::from_millis);

        log::info!(
            "GA start: {} items, population {}, {} generations, min pallets {}, {:?} decoder",
            items.len(),
            config.population_size,
            config.max_generations,
            evaluator.min_pallets(),
            config.decoder
        );

        // 1. Initialize and evaluate
        let mut population = initial_population(
            items,
            config.population_size,
            config.seed_ratio,
            config.use_rotation_gene,
            &mut rng,
        );
        evaluate_population(&evaluator, &mut population, &weights, config.parallel);
        sort_best_first(&mut population);

        let mut best = population[0].clone();
        let mut history = Vec::with_capacity(config.max_generations + 1);
        history.push(generation_stats(0, &best, &population, &weights));

        let elite_count = config.elite_count;
        let mut stagnation = 0usize;
        let mut stagnation_shocks = 0usize;
        let mut generations = 0usize;
        let mut terminated_early = false;
        let mut cancelled = false;

        // 2. Evolutionary loop
        for gen in 1..=config.max_generations {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::info!("GA cancelled after {} generations", generations);
                cancelled = true;
                terminated_early = true;
                break;
            }
            if time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                log::info!("GA time limit reached after {} generations", generations);
                terminated_early = true;
                break;
            }

            // Elites survive unchanged, with their cached fitness.
            let mut next_gen: Vec<Chromosome> = population[..elite_count].to_vec();

            while next_gen.len() < config.population_size {
                let p1 = &population[config.selection.select(&population, &mut rng)];
                let p2 = &population[config.selection.select(&population, &mut rng)];

                let children = if rng.random_bool(config.crossover_rate) {
                    crossover(p1, p2, &mut rng)
                } else {
                    vec![p1.clone()]
                };

                for mut child in children {
                    if next_gen.len() >= config.population_size {
                        break;
                    }
                    mutate(&mut child, items, config, &mut rng);
                    next_gen.push(child);
                }
            }

            evaluate_population(&evaluator, &mut next_gen, &weights, config.parallel);
            sort_best_first(&mut next_gen);
            population = next_gen;
            generations = gen;

            if population[0].fitness > best.fitness {
                best = population[0].clone();
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            if config.local_search_interval > 0 && gen % config.local_search_interval == 0 {
                if let Some(improved) = local_search(
                    &evaluator,
                    &population[0],
                    &weights,
                    config.local_search_steps,
                    &mut rng,
                ) {
                    log::debug!(
                        "gen {gen}: local search {:.1} -> {:.1}",
                        population[0].fitness,
                        improved.fitness
                    );
                    population[0] = improved;
                    if population[0].fitness > best.fitness {
                        best = population[0].clone();
                        stagnation = 0;
                    }
                }
            }

            let remaining = config.max_generations - gen;
            if config.stagnation_limit > 0
                && stagnation > config.stagnation_limit
                && remaining >= config.shock_min_remaining
            {
                let replaced = stagnation_shock(
                    &evaluator,
                    &mut population,
                    elite_count,
                    &weights,
                    config,
                    &mut rng,
                );
                if replaced > 0 {
                    stagnation_shocks += 1;
                    log::debug!("gen {gen}: stagnation shock, replaced {replaced} chromosomes");
                }
                stagnation = 0;
            }

            history.push(generation_stats(gen, &best, &population, &weights));
            log::debug!(
                "gen {gen}: best {:.1} ({} pallets, fill {:.3}), mean {:.1}",
                best.fitness,
                best.pallet_count,
                best.mean_fill_ratio,
                history.last().map_or(0.0, |s| s.mean_fitness)
            );

            if config.adapt_interval > 0 && gen % config.adapt_interval == 0 {
                if let Some(next) = controller.adjust(&weights, best.pallet_count, best.mean_fill_ratio) {
                    log::debug!(
                        "gen {gen}: reweighting v{} -> v{}: pallet excess {:.1}, volume {:.1}",
                        weights.version,
                        next.version,
                        next.w_pallet_excess,
                        next.w_volume
                    );
                    weights = next;
                    evaluate_population(&evaluator, &mut population, &weights, config.parallel);
                    sort_best_first(&mut population);
                    evaluator.evaluate(&mut best, &weights);
                    if population[0].fitness > best.fitness {
                        best = population[0].clone();
                    }
                }
            }
        }

        let decoded = evaluator.decode(&best);
        let violations = evaluator.score(&decoded, &weights).violations;
        log::info!(
            "GA done: {} generations, best {:.1}, {} pallets, mean fill {:.3}, {} shocks{}",
            generations,
            best.fitness,
            best.pallet_count,
            best.mean_fill_ratio,
            stagnation_shocks,
            if terminated_early { ", terminated early" } else { "" }
        );
        if !decoded.unplaced.is_empty() {
            log::warn!("{} items fit no empty container", decoded.unplaced.len());
        }

        Ok(GaResult {
            best: Some(best),
            decoded,
            history,
            generations,
            stagnation_shocks,
            terminated_early,
            cancelled,
            weights,
            violations,
        })
    }
}

/// OX on the sequences, uniform crossover on the rotation genes.
fn crossover<R: Rng>(p1: &Chromosome, p2: &Chromosome, rng: &mut R) -> Vec<Chromosome> {
    let (s1, s2) = order_crossover(&p1.sequence, &p2.sequence, rng);
    let (r1, r2) = match (&p1.rotations, &p2.rotations) {
        (Some(a), Some(b)) => (
            Some(rotation_crossover(a, b, rng)),
            Some(rotation_crossover(b, a, rng)),
        ),
        _ => (p1.rotations.clone(), p2.rotations.clone()),
    };
    vec![Chromosome::new(s1, r1), Chromosome::new(s2, r2)]
}

/// Applies each mutation operator with its own probability.
fn mutate<R: Rng>(child: &mut Chromosome, items: &[Item], config: &GaConfig, rng: &mut R) {
    let mut changed = false;
    if rng.random_bool(config.mutation_rate) {
        swap_mutation(&mut child.sequence, rng);
        changed = true;
    }
    if let Some(rotations) = child.rotations.as_mut() {
        if rng.random_bool(config.rotation_mutation_rate) {
            changed |= flip_rotation(rotations, items, rng);
        }
    }
    if changed {
        child.invalidate();
    }
}

/// Hill-climbs from `start`; returns the result only on strict improvement.
fn local_search<R: Rng>(
    evaluator: &FitnessEvaluator<'_>,
    start: &Chromosome,
    weights: &FitnessWeights,
    steps: usize,
    rng: &mut R,
) -> Option<Chromosome> {
    let mut incumbent = start.clone();
    let mut improved = false;
    for _ in 0..steps {
        let mut candidate = incumbent.clone();
        if rng.random_bool(0.5) {
            sort_segment_by_height(&mut candidate.sequence, evaluator.items(), rng);
        } else {
            swap_mutation(&mut candidate.sequence, rng);
        }
        candidate.invalidate();
        evaluator.evaluate(&mut candidate, weights);
        if candidate.fitness > incumbent.fitness {
            incumbent = candidate;
            improved = true;
        }
    }
    improved.then_some(incumbent)
}

/// Replaces the worst half of the non-elite slots with perturbed heuristic
/// seeds. `population` must be sorted best first; it stays sorted and keeps
/// its length. Returns the number of chromosomes replaced.
fn stagnation_shock<R: Rng>(
    evaluator: &FitnessEvaluator<'_>,
    population: &mut Vec<Chromosome>,
    elite_count: usize,
    weights: &FitnessWeights,
    config: &GaConfig,
    rng: &mut R,
) -> usize {
    let size = population.len();
    let replaced = size.saturating_sub(elite_count) / 2;
    if replaced == 0 {
        return 0;
    }
    population.truncate(size - replaced);
    population.extend(shock_seeds(
        evaluator.items(),
        replaced,
        config.use_rotation_gene,
        rng,
    ));
    evaluate_population(evaluator, population, weights, config.parallel);
    sort_best_first(population);
    replaced
}

/// Evaluates every chromosome whose cache is stale for `weights`.
fn evaluate_population(
    evaluator: &FitnessEvaluator<'_>,
    population: &mut [Chromosome],
    weights: &FitnessWeights,
    parallel: bool,
) {
    let version = weights.version;
    if parallel {
        population
            .par_iter_mut()
            .filter(|c| !c.is_evaluated_under(version))
            .for_each(|c| {
                evaluator.evaluate(c, weights);
            });
    } else {
        for c in population.iter_mut().filter(|c| !c.is_evaluated_under(version)) {
            evaluator.evaluate(c, weights);
        }
    }
}

fn sort_best_first(population: &mut [Chromosome]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

fn generation_stats(
    generation: usize,
    best: &Chromosome,
    population: &[Chromosome],
    weights: &FitnessWeights,
) -> GenerationStats {
    let mean_fitness =
        population.iter().map(|c| c.fitness).sum::<f64>() / population.len().max(1) as f64;
    GenerationStats {
        generation,
        best_fitness: best.fitness,
        mean_fitness,
        best_pallet_count: best.pallet_count,
        best_fill_ratio: best.mean_fill_ratio,
        weights_version: weights.version,
    }
}

// ============================================================================
// Tests
// ============================================================================
