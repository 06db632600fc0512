//! Parent selection strategies.
//!
//! Both strategies assume **minimization**: fitness is route length, so a
//! lower value is better. Each draw produces `count` parents, with
//! repetition allowed across draws.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes
//!   Used in Genetic Algorithms"

use std::fmt;
use std::str::FromStr;

use rand::seq::index::sample;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::Individual;
use crate::error::{EngineError, Result};

/// Offset added to distances before inversion in roulette selection.
pub const ROULETTE_EPSILON: f64 = 1e-8;

/// Default number of contestants per tournament.
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

/// Selection strategy for choosing parents.
///
/// # Examples
///
/// ```
/// use u_routega::ga::Selection;
///
/// let sel: Selection = "roulette".parse().unwrap();
/// assert_eq!(sel, Selection::Roulette);
/// assert_eq!(Selection::default(), Selection::Tournament);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Selection {
    /// Tournament selection: sample `k` distinct individuals, keep the best.
    ///
    /// # Complexity
    /// O(k) per draw
    #[default]
    Tournament,

    /// Fitness-proportionate (roulette wheel) selection on inverse distance.
    ///
    /// # Complexity
    /// O(n) per draw (linear scan)
    Roulette,
}

impl Selection {
    /// Short name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Selection::Tournament => "tournament",
            Selection::Roulette => "roulette",
        }
    }

    /// Draws `count` parent indices into `fitness`.
    ///
    /// `tournament_size` is ignored by roulette selection.
    ///
    /// # Panics
    /// Panics if `fitness` is empty.
    pub fn select_indices<R: Rng>(
        &self,
        fitness: &[f64],
        count: usize,
        tournament_size: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        match self {
            Selection::Tournament => tournament_indices(fitness, count, tournament_size, rng),
            Selection::Roulette => roulette_indices(fitness, count, rng),
        }
    }

    /// Draws `count` parents from `population`, scored by `fitness`.
    ///
    /// # Panics
    /// Panics if `population` is empty or its length differs from `fitness`.
    pub fn select_parents<R: Rng>(
        &self,
        population: &[Individual],
        fitness: &[f64],
        count: usize,
        tournament_size: usize,
        rng: &mut R,
    ) -> Vec<Individual> {
        assert_eq!(
            population.len(),
            fitness.len(),
            "fitness must be aligned with population"
        );
        self.select_indices(fitness, count, tournament_size, rng)
            .into_iter()
            .map(|i| population[i].clone())
            .collect()
    }
}

impl FromStr for Selection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tournament" => Ok(Selection::Tournament),
            "roulette" => Ok(Selection::Roulette),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown selection method '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for Selection {
    type Error = EngineError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<Selection> for String {
    fn from(method: Selection) -> Self {
        method.name().to_string()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tournament selection: for each draw, sample `k` distinct individuals
/// without replacement and return the one with the lowest fitness.
///
/// `k` is clamped to `1..=fitness.len()`.
///
/// # Panics
/// Panics if `fitness` is empty.
pub fn tournament_indices<R: Rng>(
    fitness: &[f64],
    count: usize,
    k: usize,
    rng: &mut R,
) -> Vec<usize> {
    let n = fitness.len();
    assert!(n > 0, "cannot select from empty population");
    let k = k.clamp(1, n);

    (0..count)
        .map(|_| {
            let contestants = sample(rng, n, k);
            let mut best = contestants.index(0);
            for idx in contestants.iter().skip(1) {
                if fitness[idx] < fitness[best] {
                    best = idx;
                }
            }
            best
        })
        .collect()
}

/// Roulette wheel selection: weight `1 / (distance + ε)`, sampled with
/// replacement. Shorter routes are more likely to be drawn.
///
/// Falls back to uniform draws if the weights do not sum to a positive
/// finite total.
///
/// # Panics
/// Panics if `fitness` is empty.
pub fn roulette_indices<R: Rng>(fitness: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
    let n = fitness.len();
    assert!(n > 0, "cannot select from empty population");

    let weights: Vec<f64> = fitness
        .iter()
        .map(|&d| 1.0 / (d + ROULETTE_EPSILON))
        .collect();
    let total: f64 = weights.iter().sum();

    if !(total.is_finite() && total > 0.0) {
        return (0..count).map(|_| rng.random_range(0..n)).collect();
    }

    (0..count)
        .map(|_| {
            let threshold = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            for (i, &w) in weights.iter().enumerate() {
                cumulative += w;
                if cumulative > threshold {
                    return i;
                }
            }
            n - 1 // floating-point fallback
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_tournament_full_size_always_picks_best() {
        let fitness = [10.0, 5.0, 1.0, 8.0];
        let mut rng = StdRng::seed_from_u64(42);

        // Without replacement, a tournament of the whole population is exact
        let picked = tournament_indices(&fitness, 1000, 4, &mut rng);
        assert!(picked.iter().all(|&i| i == 2));
    }

    #[test]
    fn test_tournament_size_1_is_random() {
        let fitness = [10.0, 5.0, 1.0, 8.0];
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = [0u32; 4];
        for i in tournament_indices(&fitness, 10000, 1, &mut rng) {
            counts[i] += 1;
        }
        for &c in &counts {
            assert!(c > 1500, "expected uniform, got counts: {counts:?}");
        }
    }

    #[test]
    fn test_tournament_never_picks_worst_with_k3() {
        let fitness = [10.0, 5.0, 1.0, 8.0];
        let mut rng = StdRng::seed_from_u64(7);

        // The worst of four can only win a 3-way tournament against itself
        let picked = tournament_indices(&fitness, 2000, 3, &mut rng);
        assert!(picked.iter().all(|&i| i != 0));
    }

    #[test]
    fn test_tournament_oversized_k_is_clamped() {
        let fitness = [3.0, 2.0];
        let mut rng = StdRng::seed_from_u64(1);
        let picked = tournament_indices(&fitness, 10, 50, &mut rng);
        assert_eq!(picked, vec![1; 10]);
    }

    #[test]
    fn test_roulette_favors_best() {
        let fitness = [100.0, 50.0, 1.0, 80.0];
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = [0u32; 4];
        for i in roulette_indices(&fitness, 10000, &mut rng) {
            counts[i] += 1;
        }
        // weight of index 2 is ~100x the weight of index 0
        assert!(
            counts[2] > 8000,
            "best should dominate: counts={counts:?}"
        );
        assert!(counts[2] > counts[0]);
    }

    #[test]
    fn test_roulette_zero_distance_dominates() {
        let fitness = [0.0, 1.0, 1.0];
        let mut rng = StdRng::seed_from_u64(3);
        let picked = roulette_indices(&fitness, 1000, &mut rng);
        let zeros = picked.iter().filter(|&&i| i == 0).count();
        assert!(zeros > 990, "zero-distance route should dominate, got {zeros}");
    }

    #[test]
    fn test_roulette_nan_falls_back_to_uniform() {
        let fitness = [f64::NAN, 1.0];
        let mut rng = StdRng::seed_from_u64(3);
        let picked = roulette_indices(&fitness, 100, &mut rng);
        assert_eq!(picked.len(), 100);
        assert!(picked.iter().all(|&i| i < 2));
    }

    #[test]
    fn test_select_parents_returns_count_clones() {
        let population = vec![vec![0, 1, 2], vec![2, 1, 0], vec![1, 0, 2]];
        let fitness = [3.0, 1.0, 2.0];
        let mut rng = StdRng::seed_from_u64(42);

        for method in [Selection::Tournament, Selection::Roulette] {
            let parents = method.select_parents(&population, &fitness, 7, 3, &mut rng);
            assert_eq!(parents.len(), 7);
            assert!(parents.iter().all(|p| population.contains(p)));
        }
        // k = population size always returns the best
        let parents = Selection::Tournament.select_parents(&population, &fitness, 5, 3, &mut rng);
        assert!(parents.iter().all(|p| p == &vec![2, 1, 0]));
    }

    #[test]
    fn test_names() {
        assert_eq!("Tournament".parse::<Selection>().unwrap(), Selection::Tournament);
        assert_eq!("roulette".parse::<Selection>().unwrap(), Selection::Roulette);
        assert!("rank".parse::<Selection>().is_err());
        assert_eq!(Selection::Roulette.to_string(), "roulette");
    }

    #[test]
    #[should_panic(expected = "cannot select from empty population")]
    fn test_empty_population_panics() {
        let mut rng = StdRng::seed_from_u64(42);
        Selection::Tournament.select_indices(&[], 1, 3, &mut rng);
    }
}
