//! Genetic operators for packing chromosomes.
//!
//! Sequence operators work on `&[usize]` permutations of item indices; the
//! orientation operators work on the per-item rotation gene.
//!
//! # Crossover
//!
//! - [`order_crossover`] (OX): keeps a slice of one parent in place and the
//!   relative order of the other parent everywhere else
//! - [`rotation_crossover`]: uniform per-item choice between the parents
//!
//! # Mutation and local moves
//!
//! - [`swap_mutation`]: exchange two random positions
//! - [`flip_rotation`]: switch one item to another allowed orientation
//! - [`sort_segment_by_height`]: order a random segment tallest first
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

use crate::model::Item;
use rand::Rng;

/// Order Crossover (OX).
///
/// 1. Select a random segment `[start, end]`
/// 2. Copy that segment from `parent1` into the child at the same positions
/// 3. Fill the remaining positions left to right with the genes of
///    `parent2` that are not in the segment, in `parent2`'s order
///
/// Returns two children, the second built with the parents' roles swapped.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");

    if n < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);
    (
        ox_build_child(parent1, parent2, start, end),
        ox_build_child(parent2, parent1, start, end),
    )
}

/// Build one OX child: segment from `template`, everything else from `donor`.
fn ox_build_child(template: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = template.len();
    let mut child = vec![usize::MAX; n];
    let mut in_segment = vec![false; n];

    for i in start..=end {
        child[i] = template[i];
        in_segment[template[i]] = true;
    }

    let mut fill = donor.iter().copied().filter(|&g| !in_segment[g]);
    for (i, slot) in child.iter_mut().enumerate() {
        if (start..=end).contains(&i) {
            continue;
        }
        if let Some(g) = fill.next() {
            *slot = g;
        }
    }
    child
}

/// Uniform crossover of rotation genes: each item's orientation comes from
/// either parent with equal probability.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn rotation_crossover<R: Rng>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    parent1
        .iter()
        .zip(parent2)
        .map(|(&a, &b)| if rng.random_bool(0.5) { a } else { b })
        .collect()
}

/// Swap mutation: exchange two random positions.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    perm.swap(i, j);
}

/// Switches one random rotatable item to a different orientation.
///
/// Returns `false` when no item has more than one orientation.
pub fn flip_rotation<R: Rng>(rotations: &mut [usize], items: &[Item], rng: &mut R) -> bool {
    let rotatable: Vec<usize> = (0..rotations.len())
        .filter(|&i| items.get(i).is_some_and(|it| it.orientation_count() > 1))
        .collect();
    if rotatable.is_empty() {
        return false;
    }
    let i = rotatable[rng.random_range(0..rotatable.len())];
    let count = items[i].orientation_count();
    rotations[i] = (rotations[i] + 1) % count;
    true
}

/// Sorts a random segment of `perm` by descending item height.
///
/// The sort is stable, so equal-height items keep their relative order.
pub fn sort_segment_by_height<R: Rng>(perm: &mut [usize], items: &[Item], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (start, end) = random_segment(n, rng);
    sort_by_height(&mut perm[start..=end], items);
}

fn sort_by_height(segment: &mut [usize], items: &[Item]) {
    let height = |i: usize| items.get(i).map_or(0.0, |it| it.height);
    segment.sort_by(|&a, &b| height(b).total_cmp(&height(a)));
}

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
fn random_segment<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
