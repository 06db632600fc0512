//! The route optimizer engine.
//!
//! [`Engine`] owns the configuration, the cities, the population and the
//! generation counter. Lifecycle operations ([`reset`](Engine::reset),
//! [`set_cities`](Engine::set_cities), [`configure`](Engine::configure))
//! rebuild the population from scratch; [`evolve`](Engine::evolve)
//! advances it by one generation:
//!
//! evaluate → rank → elite pool → (elites +) offspring from elites → replace.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use super::config::{ConfigUpdate, EngineConfig};
use super::fitness::RouteEvaluator;
use super::operators::reproduce;
use super::selection::Selection;
use super::types::{CitiesSnapshot, City, GenerationResult, Individual, StateSnapshot};
use crate::error::{EngineError, Result};

/// Genetic route optimizer state.
///
/// The engine is a plain single-writer context object: every mutator takes
/// `&mut self`. Use [`SharedEngine`](super::SharedEngine) to share one
/// instance between threads.
///
/// # Usage
///
/// ```
/// use u_routega::ga::{City, Engine, EngineConfig};
///
/// let mut engine = Engine::new(EngineConfig::default().with_pop_size(20).with_seed(1)).unwrap();
/// let square = vec![
///     City::new(0.0, 0.0),
///     City::new(1.0, 0.0),
///     City::new(1.0, 1.0),
///     City::new(0.0, 1.0),
/// ];
/// engine.set_cities(square, 0, None).unwrap();
///
/// let result = engine.evolve(None, None).unwrap();
/// assert_eq!(result.generation, 1);
/// assert_eq!(result.route[0], 0);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    cities: Vec<City>,
    start_index: usize,
    population: Vec<Individual>,
    generation: usize,
    rng: StdRng,
}

impl Engine {
    /// Creates an engine with random cities and a fresh population.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let rng = seeded_rng(config.seed);
        let mut engine = Self {
            config,
            cities: Vec::new(),
            start_index: 0,
            population: Vec::new(),
            generation: 0,
            rng,
        };
        engine.reset()?;
        Ok(engine)
    }

    /// Generates `num_cities` random cities in the unit square, moves the
    /// depot to city 0 and rebuilds the population.
    ///
    /// The previous population is discarded and the generation counter is
    /// reset to 0.
    #[instrument(level = "debug", skip(self), fields(num_cities = self.config.num_cities))]
    pub fn reset(&mut self) -> Result<()> {
        self.config.validate()?;

        let rng = &mut self.rng;
        self.cities = (0..self.config.num_cities)
            .map(|_| City::new(rng.random(), rng.random()))
            .collect();
        self.start_index = 0;
        if self.config.final_index.is_none() {
            self.config.final_index = Some(self.start_index);
        }
        self.reinitialize();

        info!(
            num_cities = self.cities.len(),
            pop_size = self.config.pop_size,
            "engine reset with random cities"
        );
        Ok(())
    }

    /// Installs an explicit city list with `depot` as the start city and
    /// `final_index` (or the depot, for a closed tour) as the destination.
    ///
    /// # Errors
    /// [`EngineError::InvalidCity`] if `cities` is empty or either index is
    /// out of range. State is left untouched on error.
    #[instrument(level = "debug", skip(self, cities), fields(num_cities = cities.len()))]
    pub fn set_cities(
        &mut self,
        cities: Vec<City>,
        depot: usize,
        final_index: Option<usize>,
    ) -> Result<()> {
        if cities.is_empty() {
            return Err(EngineError::InvalidCity("city list is empty".into()));
        }
        let destination = final_index.unwrap_or(depot);
        for (name, index) in [("depot", depot), ("final", destination)] {
            if index >= cities.len() {
                return Err(EngineError::InvalidCity(format!(
                    "{name} index {index} out of range for {} cities",
                    cities.len()
                )));
            }
        }

        self.config.num_cities = cities.len();
        self.config.final_index = Some(destination);
        self.cities = cities;
        self.start_index = depot;
        self.reinitialize();

        info!(
            num_cities = self.cities.len(),
            depot,
            final_index = destination,
            "engine reset with supplied cities"
        );
        Ok(())
    }

    /// Applies a partial configuration and resets with random cities.
    ///
    /// Without a `final_index` in `update` the route becomes a closed tour
    /// at the new depot (city 0). The destination is not pinned to the
    /// depot index in use before the reset, so configuring after
    /// `set_cities(.., depot, None)` with `depot != 0` does not turn the
    /// fresh instance into an open path ending at the old depot index.
    /// A new `seed` reseeds the random number generator.
    ///
    /// # Errors
    /// [`EngineError::InvalidConfig`] if the merged configuration is invalid;
    /// the current configuration is kept in that case.
    pub fn configure(&mut self, update: ConfigUpdate) -> Result<()> {
        let next = update.merged_into(&self.config);
        next.validate()?;
        if let Some(seed) = update.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.config = next;
        self.reset()
    }

    /// Advances the population by one generation and returns its best route.
    ///
    /// `mutation_rate` and `selection_method` overwrite the stored
    /// configuration before the generation runs. Parents are drawn uniformly
    /// from the elite pool; the configured selection strategy is not
    /// consulted. With `elitism` on, the elite pool is copied unchanged into
    /// the next population and offspring fill the remaining slots, so the
    /// best distance never gets worse from one generation to the next.
    ///
    /// # Errors
    /// Propagates operator failures. On error the previous population and
    /// generation counter are kept.
    #[instrument(level = "debug", skip(self), fields(generation = self.generation))]
    pub fn evolve(
        &mut self,
        mutation_rate: Option<f64>,
        selection_method: Option<Selection>,
    ) -> Result<GenerationResult> {
        if let Some(rate) = mutation_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(EngineError::InvalidConfig(format!(
                    "mutation_rate {rate} must be within [0, 1]"
                )));
            }
            self.config.mutation_rate = rate;
        }
        if let Some(sel) = selection_method {
            self.config.selection_method = sel;
        }

        let fitness = self.fitness()?;
        let elite_count = self.config.elite_count();
        let elites: Vec<&Individual> = rank_by_fitness(&fitness)
            .into_iter()
            .take(elite_count)
            .map(|i| &self.population[i])
            .collect();
        if elites.is_empty() {
            return Err(EngineError::EmptyPopulation);
        }

        let pop_size = self.config.pop_size;
        let mut next: Vec<Individual> = Vec::with_capacity(pop_size);
        if self.config.elitism {
            next.extend(elites.iter().map(|&elite| elite.clone()));
        }
        while next.len() < pop_size {
            let p1 = elites[self.rng.random_range(0..elites.len())];
            let p2 = elites[self.rng.random_range(0..elites.len())];
            next.push(reproduce(
                self.config.crossover_method,
                self.config.mutation_method,
                self.config.mutation_rate,
                p1,
                p2,
                &mut self.rng,
            )?);
        }
        next.truncate(pop_size);

        self.population = next;
        self.generation += 1;

        let fitness = self.fitness()?;
        let result = self.best_route(&fitness)?;
        debug!(
            generation = result.generation,
            best_distance = result.distance,
            elite_count,
            "generation complete"
        );
        Ok(result)
    }

    /// Scores every individual of the live population, in order.
    pub fn fitness(&self) -> Result<Vec<f64>> {
        self.evaluator().evaluate_all(&self.population)
    }

    /// Best individual according to `fitness`, in canonical form.
    ///
    /// # Errors
    /// [`EngineError::EmptyPopulation`] if `fitness` is empty.
    pub fn best_route(&self, fitness: &[f64]) -> Result<GenerationResult> {
        let best = rank_by_fitness(fitness)
            .into_iter()
            .next()
            .ok_or(EngineError::EmptyPopulation)?;
        let individual = self
            .population
            .get(best)
            .ok_or(EngineError::EmptyPopulation)?;

        Ok(GenerationResult {
            route: self.evaluator().canonical_route(individual)?,
            distance: fitness[best],
            generation: self.generation,
        })
    }

    /// Evaluates the live population and returns its best route.
    pub fn current_best(&self) -> Result<GenerationResult> {
        let fitness = self.fitness()?;
        self.best_route(&fitness)
    }

    /// The `elite_count` best individuals of the live population, best first.
    pub fn elite_pool(&self) -> Result<Vec<Individual>> {
        let fitness = self.fitness()?;
        Ok(rank_by_fitness(&fitness)
            .into_iter()
            .take(self.config.elite_count())
            .map(|i| self.population[i].clone())
            .collect())
    }

    /// Evaluator bound to the current cities, depot and destination.
    pub fn evaluator(&self) -> RouteEvaluator<'_> {
        RouteEvaluator::new(&self.cities, self.start_index, self.final_index())
    }

    /// Snapshot of the cities and depot.
    pub fn cities_snapshot(&self) -> CitiesSnapshot {
        CitiesSnapshot {
            cities: self.cities.clone(),
            start_index: self.start_index,
        }
    }

    /// Snapshot of cities, depot, generation and the live best distance.
    pub fn state_snapshot(&self) -> Result<StateSnapshot> {
        let best = self.current_best()?;
        Ok(StateSnapshot {
            cities: self.cities.clone(),
            start_index: self.start_index,
            generation: self.generation,
            best_distance: best.distance,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Depot city every route starts at.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Destination city; equal to the depot for a closed tour.
    pub fn final_index(&self) -> usize {
        self.config.final_index.unwrap_or(self.start_index)
    }

    /// Replaces the population with `pop_size` random permutations and
    /// resets the generation counter.
    fn reinitialize(&mut self) {
        let n = self.cities.len();
        let rng = &mut self.rng;
        self.population = (0..self.config.pop_size)
            .map(|_| {
                let mut perm: Individual = (0..n).collect();
                perm.shuffle(rng);
                perm
            })
            .collect();
        self.generation = 0;
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::seed_from_u64(rand::random()),
    }
}

/// Indices of `fitness` sorted ascending (best first). Stable for ties.
pub fn rank_by_fitness(fitness: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| {
        fitness[a]
            .partial_cmp(&fitness[b])
            .unwrap_or(Ordering::Equal)
    });
    order
}

// ============================================================================
// Tests
// ============================================================================
