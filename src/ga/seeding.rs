//! Heuristic seeding of the initial population.
//!
//! Decoders fill pallets in sequence order, so a good sequence places
//! large, heavy or equally tall items together. Each heuristic produces one
//! such ordering; copies of it are perturbed with a few random swaps to keep
//! the seeded part of the population diverse.

use super::operators::swap_mutation;
use super::types::{random_rotations, Chromosome};
use crate::model::Item;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ordering heuristics used to seed the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeedHeuristic {
    /// Tallest first, footprint area descending within equal heights.
    ///
    /// Items of the same height end up adjacent, which lets the shelf
    /// decoder build level layers.
    HeightGroups,
    /// Largest volume first.
    Volume,
    /// Heaviest first.
    Weight,
}

impl SeedHeuristic {
    /// The cycle used by [`initial_population`].
    pub const CYCLE: [SeedHeuristic; 3] = [
        SeedHeuristic::HeightGroups,
        SeedHeuristic::Volume,
        SeedHeuristic::Weight,
    ];

    /// Item indices ordered by this heuristic.
    ///
    /// The sort is stable: ties keep input order.
    pub fn ordering(&self, items: &[Item]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        match self {
            SeedHeuristic::HeightGroups => order.sort_by(|&a, &b| {
                let (ia, ib) = (&items[a], &items[b]);
                ib.height
                    .total_cmp(&ia.height)
                    .then_with(|| (ib.length * ib.width).total_cmp(&(ia.length * ia.width)))
            }),
            SeedHeuristic::Volume => {
                order.sort_by(|&a, &b| items[b].volume().total_cmp(&items[a].volume()))
            }
            SeedHeuristic::Weight => {
                order.sort_by(|&a, &b| items[b].weight.total_cmp(&items[a].weight))
            }
        }
        order
    }
}

/// Number of random swaps applied to a perturbed seed.
fn perturbation_swaps(n: usize) -> usize {
    (n / 10).max(1)
}

/// A chromosome built from `heuristic`.
///
/// With `perturb`, a few random swaps are applied on top of the ordering.
/// The rotation gene, when requested, is random.
pub fn seeded_chromosome<R: Rng>(
    heuristic: SeedHeuristic,
    items: &[Item],
    perturb: bool,
    rotation_gene: bool,
    rng: &mut R,
) -> Chromosome {
    let mut sequence = heuristic.ordering(items);
    if perturb {
        for _ in 0..perturbation_swaps(sequence.len()) {
            swap_mutation(&mut sequence, rng);
        }
    }
    let rotations = rotation_gene.then(|| random_rotations(&orientation_counts(items), rng));
    Chromosome::new(sequence, rotations)
}

/// Builds the initial population.
///
/// `round(population_size × seed_ratio)` chromosomes come from the
/// heuristics, cycling through [`SeedHeuristic::CYCLE`]. The first seed of
/// each heuristic is exact, later ones are perturbed. The rest are random
/// permutations.
pub fn initial_population<R: Rng>(
    items: &[Item],
    population_size: usize,
    seed_ratio: f64,
    rotation_gene: bool,
    rng: &mut R,
) -> Vec<Chromosome> {
    let seeded = ((population_size as f64 * seed_ratio).round() as usize).min(population_size);
    let counts = orientation_counts(items);
    let cycle = SeedHeuristic::CYCLE;

    let mut population = Vec::with_capacity(population_size);
    for i in 0..seeded {
        let heuristic = cycle[i % cycle.len()];
        let perturb = i >= cycle.len();
        population.push(seeded_chromosome(heuristic, items, perturb, rotation_gene, rng));
    }
    while population.len() < population_size {
        population.push(Chromosome::random(&counts, rotation_gene, rng));
    }
    population
}

/// Perturbed seeds used to refill the population after a stagnation shock:
/// the first half by volume, the rest by weight.
pub fn shock_seeds<R: Rng>(
    items: &[Item],
    count: usize,
    rotation_gene: bool,
    rng: &mut R,
) -> Vec<Chromosome> {
    (0..count)
        .map(|i| {
            let heuristic = if i < count / 2 {
                SeedHeuristic::Volume
            } else {
                SeedHeuristic::Weight
            };
            seeded_chromosome(heuristic, items, true, rotation_gene, rng)
        })
        .collect()
}

pub(crate) fn orientation_counts(items: &[Item]) -> Vec<usize> {
    items.iter().map(Item::orientation_count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn items() -> Vec<Item> {
        vec![
            Item::new("a", 10.0, 10.0, 20.0).with_weight(5.0),
            Item::new("b", 30.0, 30.0, 10.0).with_weight(1.0),
            Item::new("c", 20.0, 10.0, 20.0).with_weight(9.0),
            Item::new("d", 10.0, 10.0, 10.0).with_weight(3.0),
        ]
    }

    #[test]
    fn test_orderings() {
        let items = items();
        assert_eq!(SeedHeuristic::HeightGroups.ordering(&items), vec![2, 0, 1, 3]);
        assert_eq!(SeedHeuristic::Volume.ordering(&items), vec![1, 2, 0, 3]);
        assert_eq!(SeedHeuristic::Weight.ordering(&items), vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_initial_population_shape() {
        let items = items();
        let mut rng = StdRng::seed_from_u64(1);
        let pop = initial_population(&items, 20, 0.2, false, &mut rng);
        assert_eq!(pop.len(), 20);
        assert!(pop.iter().all(|c| c.is_permutation() && c.len() == 4));
        assert!(pop.iter().all(|c| c.rotations.is_none() && !c.is_evaluated()));
        // Four seeds: the three exact orderings come first.
        assert_eq!(pop[0].sequence, SeedHeuristic::HeightGroups.ordering(&items));
        assert_eq!(pop[1].sequence, SeedHeuristic::Volume.ordering(&items));
        assert_eq!(pop[2].sequence, SeedHeuristic::Weight.ordering(&items));
    }

    #[test]
    fn test_rotation_gene_seeded() {
        let items = vec![
            Item::new("r", 10.0, 20.0, 5.0),
            Item::new("f", 10.0, 20.0, 5.0).with_rotation(false),
        ];
        let mut rng = StdRng::seed_from_u64(2);
        let pop = initial_population(&items, 10, 0.5, true, &mut rng);
        for c in &pop {
            let rot = c.rotations.as_ref().unwrap();
            assert_eq!(rot.len(), 2);
            assert_eq!(rot[1], 0);
        }
    }

    #[test]
    fn test_no_seeds_and_all_seeds() {
        let items = items();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(initial_population(&items, 5, 0.0, false, &mut rng).len(), 5);
        assert_eq!(initial_population(&items, 5, 1.0, false, &mut rng).len(), 5);
        assert!(initial_population(&[], 5, 0.2, false, &mut rng)
            .iter()
            .all(Chromosome::is_empty));
    }

    #[test]
    fn test_shock_seeds_are_permutations() {
        let items: Vec<Item> = (0..30)
            .map(|i| Item::new(format!("i{i}"), 10.0, 10.0, (i % 7 + 1) as f64).with_weight(i as f64))
            .collect();
        let mut rng = StdRng::seed_from_u64(4);
        let seeds = shock_seeds(&items, 6, false, &mut rng);
        assert_eq!(seeds.len(), 6);
        assert!(seeds.iter().all(Chromosome::is_permutation));
    }
}
