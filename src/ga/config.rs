//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::selection::Selection;
use crate::decoder::DecoderKind;
use crate::error::{Error, Result};
use crate::fitness::StackingModel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the packing GA.
///
/// Controls population size, operator rates, the adaptive weight
/// controller, stagnation shocks, local search, termination and
/// parallelism, plus which decoder and stacking model the evaluator uses.
///
/// # Defaults
///
/// ```
/// use u_palletize::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 60);
/// assert_eq!(config.max_generations, 200);
/// assert!(!config.use_rotation_gene);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_palletize::decoder::DecoderKind;
/// use u_palletize::ga::{GaConfig, Selection};
///
/// let config = GaConfig::default()
///     .with_population_size(80)
///     .with_selection(Selection::Tournament(4))
///     .with_elite_count(4)
///     .with_decoder(DecoderKind::MaxRects)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Number of chromosomes in the population.
    pub population_size: usize,

    /// Generation budget.
    pub max_generations: usize,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Chromosomes copied unchanged into the next generation.
    pub elite_count: usize,

    /// Probability of applying crossover to a pair of parents.
    ///
    /// When crossover is not applied, a clone of the first parent is used.
    pub crossover_rate: f64,

    /// Probability of a swap mutation on each offspring.
    pub mutation_rate: f64,

    /// Probability of an orientation flip on each offspring (rotation gene only).
    pub rotation_mutation_rate: f64,

    /// Share of the initial population built from heuristic orderings.
    pub seed_ratio: f64,

    /// Generations without improvement before a stagnation shock.
    ///
    /// Set to 0 to disable shocks.
    pub stagnation_limit: usize,

    /// A shock is skipped when fewer generations than this remain.
    pub shock_min_remaining: usize,

    /// Generations between adaptive reweighting steps (0 disables).
    pub adapt_interval: usize,

    /// Pallets above the volumetric minimum tolerated before the excess
    /// penalty is raised.
    pub pallet_margin: usize,

    /// Mean fill ratio below which the fill weight is raised.
    pub fill_target: f64,

    /// Generations between local-search passes on the best chromosome (0 disables).
    pub local_search_interval: usize,

    /// Perturbations tried per local-search pass.
    pub local_search_steps: usize,

    /// Whether to evaluate chromosomes in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at every generation boundary, so the run may overshoot by
    /// up to one generation. `None` disables time-based termination.
    pub time_limit_ms: Option<u64>,

    /// Decoder used by the fitness evaluator.
    pub decoder: DecoderKind,

    /// Whether chromosomes carry a per-item orientation gene.
    ///
    /// Without it the decoder resolves orientations on its own.
    pub use_rotation_gene: bool,

    /// Stacking rule charged by the fitness evaluator.
    pub stacking: StackingModel,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            max_generations: 200,
            selection: Selection::default(),
            elite_count: 2,
            crossover_rate: 0.8,
            mutation_rate: 0.15,
            rotation_mutation_rate: 0.15,
            seed_ratio: 0.2,
            stagnation_limit: 25,
            shock_min_remaining: 10,
            adapt_interval: 10,
            pallet_margin: 0,
            fill_target: 0.75,
            local_search_interval: 5,
            local_search_steps: 20,
            parallel: true,
            seed: None,
            time_limit_ms: None,
            decoder: DecoderKind::default(),
            use_rotation_gene: false,
            stacking: StackingModel::default(),
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for setting tournament size.
    ///
    /// Equivalent to `.with_selection(Selection::Tournament(k))`.
    pub fn with_tournament_size(self, k: usize) -> Self {
        self.with_selection(Selection::Tournament(k))
    }

    /// Sets the number of elites.
    pub fn with_elite_count(mut self, n: usize) -> Self {
        self.elite_count = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the swap mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the orientation flip rate.
    pub fn with_rotation_mutation_rate(mut self, rate: f64) -> Self {
        self.rotation_mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the heuristic seed share of the initial population.
    pub fn with_seed_ratio(mut self, ratio: f64) -> Self {
        self.seed_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sets the stagnation limit (0 disables shocks).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the reweighting interval (0 disables).
    pub fn with_adapt_interval(mut self, interval: usize) -> Self {
        self.adapt_interval = interval;
        self
    }

    /// Sets the local-search interval and step count (interval 0 disables).
    pub fn with_local_search(mut self, interval: usize, steps: usize) -> Self {
        self.local_search_interval = interval;
        self.local_search_steps = steps;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Sets the decoder.
    pub fn with_decoder(mut self, decoder: DecoderKind) -> Self {
        self.decoder = decoder;
        self
    }

    /// Enables or disables the per-item orientation gene.
    pub fn with_rotation_gene(mut self, enabled: bool) -> Self {
        self.use_rotation_gene = enabled;
        self
    }

    /// Sets the stacking model.
    pub fn with_stacking(mut self, stacking: StackingModel) -> Self {
        self.stacking = stacking;
        self
    }

    /// Population and generation budget scaled to the mixed-pool size.
    ///
    /// | items | population | generations |
    /// |-------|------------|-------------|
    /// | < 20  | 30         | 50          |
    /// | < 50  | 50         | 100         |
    /// | < 100 | 80         | 150         |
    /// | < 200 | 100        | 200         |
    /// | ≥ 200 | 120        | 250         |
    ///
    /// Every other parameter keeps its default.
    pub fn auto_select(item_count: usize) -> Self {
        let (population_size, max_generations) = match item_count {
            0..=19 => (30, 50),
            20..=49 => (50, 100),
            50..=99 => (80, 150),
            100..=199 => (100, 200),
            _ => (120, 250),
        };
        Self {
            population_size,
            max_generations,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::Config("population_size must be at least 2".into()));
        }
        if self.max_generations == 0 {
            return Err(Error::Config("max_generations must be at least 1".into()));
        }
        if self.elite_count >= self.population_size {
            return Err(Error::Config(
                "elite_count too high: elites fill entire population".into(),
            ));
        }
        if let Selection::Tournament(0) = self.selection {
            return Err(Error::Config("tournament size must be at least 1".into()));
        }
        let ratios = [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("rotation_mutation_rate", self.rotation_mutation_rate),
            ("seed_ratio", self.seed_ratio),
            ("fill_target", self.fill_target),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{name} must lie in [0, 1], got {value}")));
            }
        }
        if self.time_limit_ms == Some(0) {
            return Err(Error::Config("time_limit_ms must be positive or None".into()));
        }
        Ok(())
    }
}
