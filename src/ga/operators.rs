//! Permutation-based variation operators.
//!
//! Crossover and mutation operators for route chromosomes. All of them
//! operate on `&[usize]` index vectors and keep the permutation property:
//! every city index appears exactly once in every child.
//!
//! # Crossover Operators
//!
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//! - [`cycle_crossover`] (CX): Oliver et al. (1987), preserves absolute position
//! - [`single_point_crossover`]: parent1 prefix, parent2 order for the rest
//!
//! # Mutation Operators
//!
//! - [`swap_mutation`]: exchange two distinct positions, O(1)
//! - [`inversion_mutation`]: reverse an inclusive segment (2-opt move), O(n)
//!
//! [`Crossover`] and [`Mutation`] are the closed sets of methods the
//! engine dispatches on; [`reproduce`] composes one of each.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Oliver, Smith & Holland (1987), "A Study of Permutation Crossover
//!   Operators on the Traveling Salesman Problem"

use std::fmt;
use std::str::FromStr;

use rand::seq::index::sample;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::types::Individual;
use crate::error::{EngineError, Result};

// ============================================================================
// Method enums
// ============================================================================

/// Crossover method used during reproduction.
///
/// Names accepted by [`Crossover::from_name`]: `ox`/`order`, `cycle`/`cx`,
/// `sp`/`single_point`/`single-point`. Unknown names fall back to
/// [`Crossover::Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "String", into = "String")
)]
pub enum Crossover {
    /// Order crossover (OX).
    #[default]
    Order,
    /// Cycle crossover (CX).
    Cycle,
    /// Single-point prefix crossover.
    SinglePoint,
}

impl Crossover {
    /// Looks up a crossover by name, falling back to order crossover.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(name, "unknown crossover method, using order crossover");
            Crossover::Order
        })
    }

    /// Short name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Crossover::Order => "ox",
            Crossover::Cycle => "cycle",
            Crossover::SinglePoint => "sp",
        }
    }

    /// Produces one child from two parents.
    ///
    /// Only cycle crossover can fail, and only on corrupted parents.
    pub fn apply<R: Rng>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> Result<Individual> {
        match self {
            Crossover::Order => Ok(order_crossover(parent1, parent2, rng)),
            Crossover::Cycle => cycle_crossover(parent1, parent2),
            Crossover::SinglePoint => Ok(single_point_crossover(parent1, parent2, rng)),
        }
    }
}

impl FromStr for Crossover {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ox" | "order" => Ok(Crossover::Order),
            "cycle" | "cx" => Ok(Crossover::Cycle),
            "sp" | "single_point" | "single-point" => Ok(Crossover::SinglePoint),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown crossover method '{other}'"
            ))),
        }
    }
}

impl From<String> for Crossover {
    fn from(name: String) -> Self {
        Crossover::from_name(&name)
    }
}

impl From<Crossover> for String {
    fn from(method: Crossover) -> Self {
        method.name().to_string()
    }
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutation method used during reproduction.
///
/// Unlike [`Crossover`], an unknown name is rejected with
/// [`EngineError::InvalidConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Mutation {
    /// Exchange two distinct positions.
    #[default]
    Swap,
    /// Reverse the segment between two distinct positions.
    Inversion,
}

impl Mutation {
    /// Short name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Swap => "swap",
            Mutation::Inversion => "inversion",
        }
    }

    /// Mutates `perm` in place with probability `rate`.
    pub fn apply<R: Rng>(&self, perm: &mut [usize], rate: f64, rng: &mut R) {
        if rng.random_range(0.0..1.0) >= rate {
            return;
        }
        match self {
            Mutation::Swap => swap_mutation(perm, rng),
            Mutation::Inversion => inversion_mutation(perm, rng),
        }
    }
}

impl FromStr for Mutation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swap" => Ok(Mutation::Swap),
            "inversion" | "invert" => Ok(Mutation::Inversion),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown mutation method '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Mutation {
    type Error = EngineError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<Mutation> for String {
    fn from(method: Mutation) -> Self {
        method.name().to_string()
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds one offspring: `mutate(crossover(parent1, parent2))`.
pub fn reproduce<R: Rng>(
    crossover: Crossover,
    mutation: Mutation,
    mutation_rate: f64,
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Result<Individual> {
    let mut child = crossover.apply(parent1, parent2, rng)?;
    mutation.apply(&mut child, mutation_rate, rng);
    Ok(child)
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Order Crossover (OX) for permutations.
///
/// # Algorithm (Davis, 1985)
///
/// 1. Pick two distinct cut points `start < end`
/// 2. Copy parent1's `[start, end)` slice into the child at the same positions
/// 3. Fill the remaining positions, scanning from `end` and wrapping around,
///    with parent2's genes in parent2's order, skipping those already present
///
/// Permutations shorter than 2 are returned unchanged.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn order_crossover<R: Rng>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Individual {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return parent1.to_vec();
    }

    let (start, end) = distinct_cut_points(n, rng);
    order_crossover_with_cuts(parent1, parent2, start, end)
}

/// Order crossover with explicit cut points, copying `parent1[start..end]`.
///
/// # Panics
/// Panics if parents have different lengths or `start > end` or
/// `end > parent1.len()`.
pub fn order_crossover_with_cuts(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Individual {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(start <= end && end <= n, "invalid cut points {start}..{end}");

    let sentinel = usize::MAX;
    let mut child = vec![sentinel; n];
    let mut present = vec![false; n];

    for i in start..end {
        child[i] = parent1[i];
        present[parent1[i]] = true;
    }

    let mut donor = parent2.iter().copied().filter(|&gene| !present[gene]);
    for pos in (end..n).chain(0..start) {
        if let Some(gene) = donor.next() {
            child[pos] = gene;
        }
    }

    child
}

/// Cycle Crossover (CX) for permutations.
///
/// Positions are partitioned into cycles by following
/// `pos → parent2[pos] → position of that value in parent1 → …` until the
/// chain closes. Odd-numbered cycles (1st, 3rd, …) take parent1's values,
/// even-numbered cycles take parent2's.
///
/// # Errors
/// [`EngineError::CorruptedPermutation`] if a value of parent2 cannot be
/// located in parent1.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn cycle_crossover(parent1: &[usize], parent2: &[usize]) -> Result<Individual> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");

    let mut position_in_p1: Vec<Option<usize>> = vec![None; n];
    for (pos, &value) in parent1.iter().enumerate() {
        if let Some(slot) = position_in_p1.get_mut(value) {
            *slot = Some(pos);
        }
    }

    // 0 = unassigned, cycles are numbered from 1
    let mut cycle_of = vec![0usize; n];
    let mut cycle = 1;
    for first in 0..n {
        if cycle_of[first] != 0 {
            continue;
        }
        let mut pos = first;
        loop {
            cycle_of[pos] = cycle;
            let value = parent2[pos];
            pos = position_in_p1
                .get(value)
                .copied()
                .flatten()
                .ok_or(EngineError::CorruptedPermutation { value })?;
            if cycle_of[pos] != 0 {
                break;
            }
        }
        cycle += 1;
    }

    Ok(cycle_of
        .iter()
        .enumerate()
        .map(|(pos, &c)| if c % 2 == 1 { parent1[pos] } else { parent2[pos] })
        .collect())
}

/// Single-point crossover for permutations.
///
/// Copies parent1's prefix up to a random cut point in `1..n`, then appends
/// parent2's genes left to right, skipping those already in the prefix.
///
/// Permutations shorter than 2 are returned unchanged.
///
/// # Panics
/// Panics if parents have different lengths.
pub fn single_point_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Individual {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    if n < 2 {
        return parent1.to_vec();
    }

    let cut = rng.random_range(1..n);
    single_point_crossover_at(parent1, parent2, cut)
}

/// Single-point crossover with an explicit cut point.
///
/// # Panics
/// Panics if parents have different lengths or `cut > parent1.len()`.
pub fn single_point_crossover_at(parent1: &[usize], parent2: &[usize], cut: usize) -> Individual {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(cut <= n, "cut point {cut} out of range");

    let mut in_prefix = vec![false; n];
    let mut child = Vec::with_capacity(n);
    for &gene in &parent1[..cut] {
        in_prefix[gene] = true;
        child.push(gene);
    }
    child.extend(parent2.iter().copied().filter(|&gene| !in_prefix[gene]));
    child
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Swap mutation: exchange two distinct random positions.
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let picked = sample(rng, n, 2);
    perm.swap(picked.index(0), picked.index(1));
}

/// Inversion mutation: reverse the inclusive segment between two distinct
/// random positions.
pub fn inversion_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (start, end) = distinct_cut_points(n, rng);
    perm[start..=end].reverse();
}

// ============================================================================
// Helpers
// ============================================================================

/// Two distinct positions in `0..n`, ordered low to high. Requires `n >= 2`.
fn distinct_cut_points<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let picked = sample(rng, n, 2);
    let (a, b) = (picked.index(0), picked.index(1));
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
