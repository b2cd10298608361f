//! Decode-and-score fitness evaluation.

use super::stacking::StackingModel;
use super::weights::FitnessWeights;
use crate::decoder::{Decoded, DecoderKind, PlacementStrategy};
use crate::ga::Chromosome;
use crate::model::{theoretical_min_pallets, ContainerProfile, Item, GEOMETRY_EPS};

/// Violation counts found while scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViolationCounts {
    /// Pallets above the weight limit.
    pub overweight: usize,
    /// Placements outside the container.
    pub out_of_bounds: usize,
    /// Stacking violations under the configured model.
    pub stacking: usize,
    /// Items the decoder could not place.
    pub unplaced: usize,
}

impl ViolationCounts {
    /// Sum of all hard violations.
    pub fn total(&self) -> usize {
        self.overweight + self.out_of_bounds + self.stacking + self.unplaced
    }
}

/// Per-term contributions to one fitness value.
///
/// Rewards are positive, penalties are stored as positive magnitudes and
/// subtracted by [`total`](Self::total).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreBreakdown {
    /// Bonus for hitting (or beating) the volumetric minimum, negative when above it.
    pub pallet_term: f64,
    /// `Σ w_volume · fill²`.
    pub fill_term: f64,
    /// `Σ w_cluster · purity`.
    pub cluster_term: f64,
    /// Sum of all hard-violation penalties.
    pub hard_penalty: f64,
    /// Centre-of-gravity penalty.
    pub cog_penalty: f64,
    /// What the hard penalty was charged for.
    pub violations: ViolationCounts,
}

impl ScoreBreakdown {
    /// The fitness value: rewards minus penalties.
    pub fn total(&self) -> f64 {
        self.pallet_term + self.fill_term + self.cluster_term - self.hard_penalty - self.cog_penalty
    }
}

/// Result of evaluating one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Fitness (higher is better).
    pub fitness: f64,
    /// Pallets in the decoded layout.
    pub pallet_count: usize,
    /// Mean fill ratio of the decoded layout.
    pub mean_fill_ratio: f64,
    /// Term-by-term score.
    pub breakdown: ScoreBreakdown,
}

/// Scores chromosomes over one item set and container.
///
/// Holds no mutable state and is shared by reference across rayon workers.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'a> {
    items: &'a [Item],
    container: ContainerProfile,
    decoder: DecoderKind,
    stacking: StackingModel,
    min_pallets: usize,
}

impl<'a> FitnessEvaluator<'a> {
    /// Evaluator for `items` on `container` with the default decoder and stacking model.
    pub fn new(items: &'a [Item], container: ContainerProfile) -> Self {
        Self {
            items,
            container,
            decoder: DecoderKind::default(),
            stacking: StackingModel::default(),
            min_pallets: theoretical_min_pallets(items, &container),
        }
    }

    /// Sets the decoder.
    pub fn with_decoder(mut self, decoder: DecoderKind) -> Self {
        self.decoder = decoder;
        self
    }

    /// Sets the stacking model.
    pub fn with_stacking(mut self, stacking: StackingModel) -> Self {
        self.stacking = stacking;
        self
    }

    /// The items chromosomes index into.
    pub fn items(&self) -> &'a [Item] {
        self.items
    }

    /// The container profile.
    pub fn container(&self) -> &ContainerProfile {
        &self.container
    }

    /// Volumetric lower bound on the pallet count.
    pub fn min_pallets(&self) -> usize {
        self.min_pallets
    }

    /// Decodes a chromosome without scoring it.
    pub fn decode(&self, chromosome: &Chromosome) -> Decoded {
        self.decoder.decode(
            self.items,
            &chromosome.sequence,
            chromosome.rotations.as_deref(),
            &self.container,
        )
    }

    /// Decodes, scores, and writes fitness, pallet count, mean fill and
    /// `weights.version` back onto `chromosome`.
    pub fn evaluate(&self, chromosome: &mut Chromosome, weights: &FitnessWeights) -> Evaluation {
        let decoded = self.decode(chromosome);
        let breakdown = self.score(&decoded, weights);
        let evaluation = Evaluation {
            fitness: breakdown.total(),
            pallet_count: decoded.pallet_count(),
            mean_fill_ratio: decoded.mean_fill_ratio(),
            breakdown,
        };
        chromosome.fitness = evaluation.fitness;
        chromosome.pallet_count = evaluation.pallet_count;
        chromosome.mean_fill_ratio = evaluation.mean_fill_ratio;
        chromosome.weights_version = Some(weights.version);
        evaluation
    }

    /// Scores an already decoded layout.
    pub fn score(&self, decoded: &Decoded, weights: &FitnessWeights) -> ScoreBreakdown {
        let mut b = ScoreBreakdown::default();

        let count = decoded.pallet_count();
        if count > 0 {
            b.pallet_term = if count == self.min_pallets {
                weights.w_min_pallet_bonus
            } else if count < self.min_pallets {
                weights.w_below_min_bonus
            } else {
                -weights.w_pallet_excess * (count - self.min_pallets) as f64
            };
        }

        let mut v = ViolationCounts {
            unplaced: decoded.unplaced.len(),
            ..ViolationCounts::default()
        };

        for pallet in &decoded.pallets {
            let fill = pallet.fill_ratio();
            b.fill_term += weights.w_volume * fill * fill;
            if weights.w_cluster > 0.0 {
                b.cluster_term += weights.w_cluster * pallet.purity(self.items);
            }

            if pallet.total_weight() > pallet.container.max_weight + GEOMETRY_EPS {
                v.overweight += 1;
            }
            v.out_of_bounds += pallet
                .placements
                .iter()
                .filter(|p| !p.is_within(&pallet.container))
                .count();
            v.stacking += self.stacking.count_violations(pallet, self.items);

            let offset = pallet.cog_offset();
            if offset > weights.cog_dead_zone {
                b.cog_penalty += weights.w_cog_offset * (offset - weights.cog_dead_zone) / weights.cog_scale;
            }
        }

        b.hard_penalty = weights.w_weight_over * v.overweight as f64
            + weights.w_out_of_bounds * v.out_of_bounds as f64
            + weights.w_stack_violation * v.stacking as f64
            + weights.w_unplaced * v.unplaced as f64;
        b.violations = v;
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Orientation, Pallet, Placement};
    use approx::assert_relative_eq;

    fn cubes(n: usize, side: f64, weight: f64) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("c{i}"), side, side, side).with_weight(weight))
            .collect()
    }

    fn no_cog() -> FitnessWeights {
        FitnessWeights::default().with_cog(0.0, 10.0, 5.0)
    }

    #[test]
    fn test_evaluate_writes_back() {
        let container = ContainerProfile::new(20.0, 20.0, 20.0, 1000.0);
        let items = cubes(8, 10.0, 1.0);
        let eval = FitnessEvaluator::new(&items, container);
        let mut c = Chromosome::identity(8);
        let weights = no_cog().next_version();
        let e = eval.evaluate(&mut c, &weights);

        assert_eq!(e.pallet_count, 1);
        assert_relative_eq!(e.mean_fill_ratio, 1.0);
        // Exactly the minimum, perfectly full, nothing violated.
        assert_relative_eq!(e.fitness, 2_000.0 + 10_000.0);
        assert_eq!(c.fitness, e.fitness);
        assert_eq!(c.pallet_count, 1);
        assert_eq!(c.weights_version, Some(1));
    }

    #[test]
    fn test_excess_pallets_penalized() {
        // 4 items of half a pallet each: minimum 2, weight limit forces 4.
        let container = ContainerProfile::new(20.0, 20.0, 20.0, 10.0);
        let items: Vec<Item> = (0..4)
            .map(|i| Item::new(format!("h{i}"), 20.0, 20.0, 10.0).with_weight(6.0))
            .collect();
        let eval = FitnessEvaluator::new(&items, container);
        assert_eq!(eval.min_pallets(), 2);
        let mut c = Chromosome::identity(4);
        let e = eval.evaluate(&mut c, &no_cog());
        assert_eq!(e.pallet_count, 4);
        assert_relative_eq!(e.breakdown.pallet_term, -2_000.0);
        assert_relative_eq!(e.breakdown.fill_term, 4.0 * 10_000.0 * 0.25);
    }

    #[test]
    fn test_fewer_pallets_score_higher() {
        let container = ContainerProfile::new(20.0, 20.0, 20.0, 1000.0);
        let items = cubes(8, 10.0, 1.0);
        let eval = FitnessEvaluator::new(&items, container);
        let w = no_cog();

        let mut full = Chromosome::identity(8);
        eval.evaluate(&mut full, &w);

        let split = Decoded {
            pallets: vec![half_pallet(&items, &container, 0), half_pallet(&items, &container, 4)],
            unplaced: vec![],
        };
        assert!(eval.score(&split, &w).total() < full.fitness);
    }

    fn half_pallet(items: &[Item], container: &ContainerProfile, start: usize) -> Pallet {
        let mut p = Pallet::new(*container);
        for k in 0..4 {
            let i = start + k;
            let o = Orientation::new(10.0, 10.0, 10.0);
            p.push(Placement::new(i, &items[i], o, (k % 2) as f64 * 10.0, (k / 2) as f64 * 10.0, 0.0));
        }
        p
    }

    #[test]
    fn test_unplaced_is_hard_penalty() {
        let container = ContainerProfile::new(20.0, 20.0, 20.0, 1000.0);
        let mut items = cubes(2, 10.0, 1.0);
        items.push(Item::new("big", 30.0, 30.0, 30.0));
        let eval = FitnessEvaluator::new(&items, container);
        let mut c = Chromosome::identity(3);
        let e = eval.evaluate(&mut c, &no_cog());
        assert_eq!(e.breakdown.violations.unplaced, 1);
        assert!(e.fitness < -900_000.0);
    }

    #[test]
    fn test_overweight_and_out_of_bounds_are_counted() {
        let container = ContainerProfile::new(20.0, 20.0, 20.0, 5.0);
        let items = cubes(2, 10.0, 4.0);
        let eval = FitnessEvaluator::new(&items, container);
        let mut p = Pallet::new(container);
        let o = Orientation::new(10.0, 10.0, 10.0);
        p.push(Placement::new(0, &items[0], o, 0.0, 0.0, 0.0));
        p.push(Placement::new(1, &items[1], o, 15.0, 0.0, 0.0));
        let decoded = Decoded {
            pallets: vec![p],
            unplaced: vec![],
        };
        let b = eval.score(&decoded, &no_cog());
        assert_eq!(b.violations.overweight, 1);
        assert_eq!(b.violations.out_of_bounds, 1);
        assert_relative_eq!(b.hard_penalty, 2_000_000.0);
    }

    #[test]
    fn test_stacking_model_changes_score() {
        // Heavy box on a light one with a floating neighbour.
        let container = ContainerProfile::new(30.0, 10.0, 30.0, 1000.0);
        let items = vec![
            Item::new("light", 10.0, 10.0, 10.0).with_weight(1.0),
            Item::new("heavy", 10.0, 10.0, 10.0).with_weight(10.0),
            Item::new("float", 10.0, 10.0, 10.0).with_weight(1.0),
        ];
        let o = Orientation::new(10.0, 10.0, 10.0);
        let mut p = Pallet::new(container);
        p.push(Placement::new(0, &items[0], o, 0.0, 0.0, 0.0));
        p.push(Placement::new(1, &items[1], o, 0.0, 0.0, 10.0));
        p.push(Placement::new(2, &items[2], o, 20.0, 0.0, 10.0));
        let decoded = Decoded {
            pallets: vec![p],
            unplaced: vec![],
        };
        let contact = FitnessEvaluator::new(&items, container).with_stacking(StackingModel::ContactWeight);
        let strict = FitnessEvaluator::new(&items, container);
        assert_eq!(contact.score(&decoded, &no_cog()).violations.stacking, 1);
        assert_eq!(strict.score(&decoded, &no_cog()).violations.stacking, 2);
    }

    #[test]
    fn test_cog_dead_zone() {
        let container = ContainerProfile::new(100.0, 100.0, 100.0, 1000.0);
        let items = cubes(1, 10.0, 5.0);
        let eval = FitnessEvaluator::new(&items, container);
        let o = Orientation::new(10.0, 10.0, 10.0);
        let at = |x: f64| {
            let mut p = Pallet::new(container);
            p.push(Placement::new(0, &items[0], o, x, 45.0, 0.0));
            Decoded {
                pallets: vec![p],
                unplaced: vec![],
            }
        };
        let w = FitnessWeights::default();
        // Centre at x=50: offset 0.
        assert_eq!(eval.score(&at(45.0), &w).cog_penalty, 0.0);
        // Centre at x=55: offset 5, inside the dead zone.
        assert_eq!(eval.score(&at(50.0), &w).cog_penalty, 0.0);
        // Centre at x=75: offset 25, 15 past the dead zone.
        assert_relative_eq!(eval.score(&at(70.0), &w).cog_penalty, 500.0 * 15.0 / 5.0);
    }

    #[test]
    fn test_cluster_term_rewards_purity() {
        let container = ContainerProfile::new(20.0, 10.0, 10.0, 1000.0);
        let items = vec![
            Item::new("a", 10.0, 10.0, 10.0).with_product_code("X"),
            Item::new("b", 10.0, 10.0, 10.0).with_product_code("X"),
            Item::new("c", 10.0, 10.0, 10.0).with_product_code("Y"),
            Item::new("d", 10.0, 10.0, 10.0).with_product_code("Y"),
        ];
        let eval = FitnessEvaluator::new(&items, container);
        let w = no_cog().with_cluster(1_000.0);
        let mut pure = Chromosome::new(vec![0, 1, 2, 3], None);
        let mut mixed = Chromosome::new(vec![0, 2, 1, 3], None);
        eval.evaluate(&mut pure, &w);
        eval.evaluate(&mut mixed, &w);
        assert!(pure.fitness > mixed.fitness);
    }

    #[test]
    fn test_decoder_choice_is_respected() {
        let container = ContainerProfile::default();
        let items = cubes(10, 30.0, 1.0);
        let c = Chromosome::identity(10);
        let shelf = FitnessEvaluator::new(&items, container).decode(&c);
        let maxrects = FitnessEvaluator::new(&items, container)
            .with_decoder(DecoderKind::MaxRects)
            .decode(&c);
        assert_eq!(shelf.placed_count(), 10);
        assert_eq!(maxrects.placed_count(), 10);
        assert_ne!(shelf, maxrects);
    }
}
