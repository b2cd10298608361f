//! Chromosome representation and the individual contract.
//!
//! A [`Chromosome`] is a permutation of item indices (the decode order) plus
//! an optional per-item orientation gene. Fitness is cached on the
//! chromosome together with the weight snapshot version it was computed
//! under, so the runner never re-decodes an unchanged elite.

use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A candidate solution carrying its own fitness.
///
/// Higher fitness is better.
pub trait Individual: Clone + Send + Sync {
    /// Current fitness; `f64::NEG_INFINITY` when not yet evaluated.
    fn fitness(&self) -> f64;
}

/// Decode order plus optional orientation choices.
///
/// Cloning deep-copies both genes; offspring never share storage with
/// their parents.
///
/// # Examples
///
/// ```
/// use u_palletize::ga::Chromosome;
///
/// let c = Chromosome::identity(4);
/// assert_eq!(c.sequence, vec![0, 1, 2, 3]);
/// assert!(c.rotations.is_none());
/// assert!(!c.is_evaluated());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chromosome {
    /// Permutation of item indices.
    pub sequence: Vec<usize>,
    /// Orientation index per item, indexed by item index.
    pub rotations: Option<Vec<usize>>,
    /// Cached fitness.
    pub fitness: f64,
    /// Cached pallet count of the decoded layout.
    pub pallet_count: usize,
    /// Cached mean fill ratio of the decoded layout.
    pub mean_fill_ratio: f64,
    /// Weight snapshot version the cache was computed under.
    pub weights_version: Option<u64>,
}

impl Chromosome {
    /// An unevaluated chromosome.
    pub fn new(sequence: Vec<usize>, rotations: Option<Vec<usize>>) -> Self {
        Self {
            sequence,
            rotations,
            fitness: f64::NEG_INFINITY,
            pallet_count: 0,
            mean_fill_ratio: 0.0,
            weights_version: None,
        }
    }

    /// Items in input order, no rotation gene.
    pub fn identity(n: usize) -> Self {
        Self::new((0..n).collect(), None)
    }

    /// A uniformly random order; with `rotation_gene`, random orientations
    /// drawn from `orientation_counts`.
    pub fn random<R: Rng>(orientation_counts: &[usize], rotation_gene: bool, rng: &mut R) -> Self {
        let mut sequence: Vec<usize> = (0..orientation_counts.len()).collect();
        sequence.shuffle(rng);
        let rotations = rotation_gene.then(|| random_rotations(orientation_counts, rng));
        Self::new(sequence, rotations)
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Whether a fitness has been computed under any snapshot.
    pub fn is_evaluated(&self) -> bool {
        self.weights_version.is_some()
    }

    /// Whether the cached fitness is current for snapshot `version`.
    pub fn is_evaluated_under(&self, version: u64) -> bool {
        self.weights_version == Some(version)
    }

    /// Drops the cached evaluation after the genes changed.
    pub fn invalidate(&mut self) {
        self.fitness = f64::NEG_INFINITY;
        self.pallet_count = 0;
        self.mean_fill_ratio = 0.0;
        self.weights_version = None;
    }

    /// Whether `sequence` is a permutation of `0..len`.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.sequence.len()];
        for &g in &self.sequence {
            match seen.get_mut(g) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}

impl Individual for Chromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }
}

/// A random orientation index per item.
pub(crate) fn random_rotations<R: Rng>(orientation_counts: &[usize], rng: &mut R) -> Vec<usize> {
    orientation_counts
        .iter()
        .map(|&n| if n > 1 { rng.random_range(0..n) } else { 0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let counts = vec![2, 1, 2, 2, 1, 2];
        for _ in 0..20 {
            let c = Chromosome::random(&counts, true, &mut rng);
            assert!(c.is_permutation());
            let rot = c.rotations.as_ref().unwrap();
            assert_eq!(rot.len(), counts.len());
            assert_eq!(rot[1], 0);
            assert_eq!(rot[4], 0);
        }
        let plain = Chromosome::random(&counts, false, &mut rng);
        assert!(plain.rotations.is_none());
    }

    #[test]
    fn test_is_permutation_rejects_duplicates() {
        assert!(!Chromosome::new(vec![0, 1, 1], None).is_permutation());
        assert!(!Chromosome::new(vec![0, 3], None).is_permutation());
        assert!(Chromosome::new(vec![], None).is_permutation());
    }

    #[test]
    fn test_invalidate_clears_cache() {
        let mut c = Chromosome::identity(3);
        c.fitness = 10.0;
        c.pallet_count = 1;
        c.weights_version = Some(2);
        assert!(c.is_evaluated_under(2));
        assert!(!c.is_evaluated_under(3));
        c.invalidate();
        assert!(!c.is_evaluated());
        assert_eq!(c.fitness(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_clone_is_deep() {
        let a = Chromosome::new(vec![0, 1, 2], Some(vec![0, 1, 0]));
        let mut b = a.clone();
        b.sequence.swap(0, 2);
        b.rotations.as_mut().unwrap()[1] = 0;
        assert_eq!(a.sequence, vec![0, 1, 2]);
        assert_eq!(a.rotations, Some(vec![0, 1, 0]));
    }
}
