//! Engine configuration.
//!
//! [`EngineConfig`] holds every parameter that controls the evolutionary
//! loop. [`ConfigUpdate`] is the partial form accepted by
//! [`Engine::configure`](super::Engine::configure): fields left as `None`
//! keep their current value.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::operators::{Crossover, Mutation};
use super::selection::{Selection, DEFAULT_TOURNAMENT_SIZE};
use crate::error::{EngineError, Result};

/// Configuration for the route optimizer.
///
/// # Defaults
///
/// ```
/// use u_routega::ga::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.num_cities, 25);
/// assert_eq!(config.pop_size, 100);
/// assert!(config.final_index.is_none());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_routega::ga::{Crossover, EngineConfig, Mutation};
///
/// let config = EngineConfig::default()
///     .with_pop_size(200)
///     .with_crossover(Crossover::Cycle)
///     .with_mutation(Mutation::Inversion)
///     .with_elite_percentage(20.0)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct EngineConfig {
    /// Number of random cities generated by a reset.
    ///
    /// Overwritten by the length of an explicitly installed city list.
    pub num_cities: usize,

    /// Number of individuals in the population.
    pub pop_size: usize,

    /// Probability of mutating each offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Configured selection strategy.
    ///
    /// Recorded and overridable per generation, but reproduction draws
    /// parents uniformly from the elite pool.
    pub selection_method: Selection,

    /// Contestants per tournament when `selection_method` is tournament.
    pub tournament_size: usize,

    /// Crossover used during reproduction.
    pub crossover_method: Crossover,

    /// Mutation used during reproduction.
    pub mutation_method: Mutation,

    /// Share of the population kept as the elite parent pool (0–100).
    ///
    /// At least one elite is always kept.
    pub elite_percentage: f64,

    /// Copy the elite pool unchanged into the next population before
    /// breeding. Without it the next population is offspring only.
    pub elitism: bool,

    /// Fixed destination city. `None` or a value equal to the depot means a
    /// closed tour.
    pub final_index: Option<usize>,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_cities: 25,
            pop_size: 100,
            mutation_rate: 0.02,
            selection_method: Selection::default(),
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            crossover_method: Crossover::default(),
            mutation_method: Mutation::default(),
            elite_percentage: 10.0,
            elitism: true,
            final_index: None,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Sets the number of random cities.
    pub fn with_num_cities(mut self, n: usize) -> Self {
        self.num_cities = n;
        self
    }

    /// Sets the population size.
    pub fn with_pop_size(mut self, n: usize) -> Self {
        self.pop_size = n;
        self
    }

    /// Sets the mutation rate.
    ///
    /// The value is stored as given; [`validate`](Self::validate) rejects
    /// rates outside `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection_method = sel;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the crossover method.
    pub fn with_crossover(mut self, method: Crossover) -> Self {
        self.crossover_method = method;
        self
    }

    /// Sets the mutation method.
    pub fn with_mutation(mut self, method: Mutation) -> Self {
        self.mutation_method = method;
        self
    }

    /// Sets the elite percentage. Checked by [`validate`](Self::validate).
    pub fn with_elite_percentage(mut self, pct: f64) -> Self {
        self.elite_percentage = pct;
        self
    }

    /// Sets the elitism flag.
    pub fn with_elitism(mut self, elitism: bool) -> Self {
        self.elitism = elitism;
        self
    }

    /// Sets the fixed destination city.
    pub fn with_final_index(mut self, index: usize) -> Self {
        self.final_index = Some(index);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites kept each generation:
    /// `max(1, floor(pop_size * elite_percentage / 100))`, capped at `pop_size`.
    pub fn elite_count(&self) -> usize {
        let count = (self.pop_size as f64 * self.elite_percentage / 100.0).floor() as usize;
        count.max(1).min(self.pop_size.max(1))
    }

    /// Validates the configuration.
    ///
    /// Returns [`EngineError::InvalidConfig`] describing the first invalid
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        if self.pop_size == 0 {
            return Err(invalid("pop_size must be at least 1"));
        }
        if self.num_cities == 0 {
            return Err(invalid("num_cities must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(invalid("mutation_rate must be within [0, 1]"));
        }
        if !(0.0..=100.0).contains(&self.elite_percentage) {
            return Err(invalid("elite_percentage must be within [0, 100]"));
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournament_size must be at least 1"));
        }
        if let Some(f) = self.final_index {
            if f >= self.num_cities {
                return Err(EngineError::InvalidConfig(format!(
                    "final_index {f} out of range for {} cities",
                    self.num_cities
                )));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> EngineError {
    EngineError::InvalidConfig(msg.to_string())
}

/// Partial configuration: present fields replace the current values.
///
/// `final_index` is not merged like the other fields: an update without it
/// resets the destination so the next reset builds a closed tour.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ConfigUpdate {
    pub num_cities: Option<usize>,
    pub pop_size: Option<usize>,
    pub mutation_rate: Option<f64>,
    pub selection_method: Option<Selection>,
    pub tournament_size: Option<usize>,
    pub crossover_method: Option<Crossover>,
    pub mutation_method: Option<Mutation>,
    pub elite_percentage: Option<f64>,
    pub elitism: Option<bool>,
    #[cfg_attr(feature = "serde", serde(rename = "final"))]
    pub final_index: Option<usize>,
    pub seed: Option<u64>,
}

impl ConfigUpdate {
    /// Returns `base` with this update merged in.
    ///
    /// The result is not validated.
    pub fn merged_into(&self, base: &EngineConfig) -> EngineConfig {
        EngineConfig {
            num_cities: self.num_cities.unwrap_or(base.num_cities),
            pop_size: self.pop_size.unwrap_or(base.pop_size),
            mutation_rate: self.mutation_rate.unwrap_or(base.mutation_rate),
            selection_method: self.selection_method.unwrap_or(base.selection_method),
            tournament_size: self.tournament_size.unwrap_or(base.tournament_size),
            crossover_method: self.crossover_method.unwrap_or(base.crossover_method),
            mutation_method: self.mutation_method.unwrap_or(base.mutation_method),
            elite_percentage: self.elite_percentage.unwrap_or(base.elite_percentage),
            elitism: self.elitism.unwrap_or(base.elitism),
            final_index: self.final_index,
            seed: self.seed.or(base.seed),
        }
    }
}
