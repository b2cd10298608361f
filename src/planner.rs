//! End-to-end packing pipeline.
//!
//! [`Planner::plan`] partitions the items into dedicated family pallets and
//! a mixed pool, runs the GA once over the mixed pool, and maps the GA's
//! pool-local item indices back to the caller's indices.

use crate::error::Result;
use crate::fitness::FitnessWeights;
use crate::ga::{GaConfig, GaRunner, GenerationStats};
use crate::model::{ContainerProfile, Item, Pallet};
use crate::tiling::partition;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Planner settings.
///
/// # Examples
///
/// ```
/// use u_palletize::model::ContainerProfile;
/// use u_palletize::planner::PlannerConfig;
///
/// let config = PlannerConfig::new(ContainerProfile::default()).without_dedicated();
/// assert!(config.ga.is_none());
/// assert!(!config.dedicated_pallets);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannerConfig {
    /// The pallet every item is loaded onto.
    pub container: ContainerProfile,
    /// GA settings; `None` picks [`GaConfig::auto_select`] for the mixed pool size.
    pub ga: Option<GaConfig>,
    /// Initial fitness weights.
    pub weights: FitnessWeights,
    /// Whether homogeneous families get dedicated pallets before the GA runs.
    pub dedicated_pallets: bool,
}

impl PlannerConfig {
    /// Default settings for `container`.
    pub fn new(container: ContainerProfile) -> Self {
        Self {
            container,
            ga: None,
            weights: FitnessWeights::default(),
            dedicated_pallets: true,
        }
    }

    /// Uses fixed GA settings instead of the size-driven preset.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = Some(ga);
        self
    }

    /// Sets the initial fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sends every item through the GA.
    pub fn without_dedicated(mut self) -> Self {
        self.dedicated_pallets = false;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(ContainerProfile::default())
    }
}

/// A complete loading plan. Every placement refers to the caller's item
/// indices.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingPlan {
    /// Single-family pallets from the tiling solver.
    pub dedicated: Vec<Pallet>,
    /// Pallets decoded from the GA's best chromosome.
    pub mixed: Vec<Pallet>,
    /// Items that fit no empty container.
    pub unplaced: Vec<usize>,
    /// GA history; empty when the mixed pool was empty.
    pub history: Vec<GenerationStats>,
    /// Whether the GA stopped before its generation budget.
    pub terminated_early: bool,
}

impl PackingPlan {
    /// Dedicated pallets followed by mixed ones.
    pub fn pallets(&self) -> impl Iterator<Item = &Pallet> {
        self.dedicated.iter().chain(&self.mixed)
    }

    /// Total number of pallets.
    pub fn pallet_count(&self) -> usize {
        self.dedicated.len() + self.mixed.len()
    }

    /// Mean fill ratio over all pallets (0 when there are none).
    pub fn mean_fill_ratio(&self) -> f64 {
        let count = self.pallet_count();
        if count == 0 {
            return 0.0;
        }
        self.pallets().map(Pallet::fill_ratio).sum::<f64>() / count as f64
    }
}

/// Runs the full pipeline.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    /// A planner with the given settings.
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// The planner's settings.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans a load for `items`.
    ///
    /// Fails on an invalid item, GA configuration or weights. A degenerate
    /// container yields an empty plan with every item unplaced.
    pub fn plan(&self, items: &[Item]) -> Result<PackingPlan> {
        self.plan_with_cancel(items, None)
    }

    /// Plans a load, stopping the GA early when `cancel` is set.
    pub fn plan_with_cancel(&self, items: &[Item], cancel: Option<Arc<AtomicBool>>) -> Result<PackingPlan> {
        let container = &self.config.container;
        for item in items {
            item.validate()?;
        }
        if !container.is_valid() {
            log::warn!("degenerate container {container:?}: {} items left unplaced", items.len());
            return Ok(PackingPlan {
                dedicated: Vec::new(),
                mixed: Vec::new(),
                unplaced: (0..items.len()).collect(),
                history: Vec::new(),
                terminated_early: false,
            });
        }

        let (dedicated, pool) = if self.config.dedicated_pallets {
            let split = partition(items, container);
            (split.dedicated, split.mixed_pool)
        } else {
            (Vec::new(), (0..items.len()).collect())
        };
        log::info!(
            "planning {} items: {} dedicated pallets, {} items in the mixed pool",
            items.len(),
            dedicated.len(),
            pool.len()
        );

        let mut plan = PackingPlan {
            dedicated,
            mixed: Vec::new(),
            unplaced: Vec::new(),
            history: Vec::new(),
            terminated_early: false,
        };
        if pool.is_empty() {
            return Ok(plan);
        }

        let pool_items: Vec<Item> = pool.iter().map(|&i| items[i].clone()).collect();
        let ga = self
            .config
            .ga
            .clone()
            .unwrap_or_else(|| GaConfig::auto_select(pool_items.len()));
        let result = GaRunner::run_with_cancel(&pool_items, container, &ga, &self.config.weights, cancel)?;

        plan.mixed = result.decoded.pallets;
        for placement in plan.mixed.iter_mut().flat_map(|p| p.placements.iter_mut()) {
            placement.item = pool[placement.item];
        }
        plan.unplaced = result.decoded.unplaced.iter().map(|&i| pool[i]).collect();
        plan.unplaced.sort_unstable();
        plan.history = result.history;
        plan.terminated_early = result.terminated_early;

        log::info!(
            "plan done: {} pallets ({} dedicated, {} mixed), mean fill {:.3}, {} unplaced",
            plan.pallet_count(),
            plan.dedicated.len(),
            plan.mixed.len(),
            plan.mean_fill_ratio(),
            plan.unplaced.len()
        );
        Ok(plan)
    }
}
