//! Multi-generation driver.
//!
//! [`EvolutionRunner`] repeatedly advances an engine until a generation
//! cap, stagnation, or an external stop. It keeps the best route seen over
//! the whole run, which matters when `elitism` is off and a generation can
//! lose its best individual.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::engine::Engine;
use super::shared::SharedEngine;
use super::types::GenerationResult;
use crate::error::Result;

/// Termination settings for a run.
///
/// # Builder Pattern
///
/// ```
/// use u_routega::ga::RunConfig;
///
/// let config = RunConfig::default()
///     .with_max_generations(200)
///     .with_stagnation_limit(25);
/// assert_eq!(config.max_generations, 200);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Maximum number of generations to advance.
    pub max_generations: usize,

    /// Number of generations with no significant improvement before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Minimum relative improvement to reset the stagnation counter.
    ///
    /// A new best counts as progress only if `|old - new| / |old|` is at
    /// least this value. 0.0 counts any improvement.
    pub convergence_threshold: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_generations: 500,
            stagnation_limit: 0,
            convergence_threshold: 0.0,
        }
    }
}

impl RunConfig {
    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the convergence threshold.
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold.max(0.0);
        self
    }
}

/// Outcome of a multi-generation run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Best route seen at any generation of the run.
    pub best: GenerationResult,

    /// Generations advanced by this run.
    pub generations: usize,

    /// Whether the run stopped on stagnation.
    pub stagnated: bool,

    /// Whether the run was stopped externally.
    pub cancelled: bool,

    /// Best distance so far, recorded before the first generation and after
    /// each one.
    pub fitness_history: Vec<f64>,
}

/// Drives an engine through many generations.
///
/// # Usage
///
/// ```
/// use u_routega::ga::{Engine, EngineConfig, EvolutionRunner, RunConfig};
///
/// let mut engine = Engine::new(EngineConfig::default().with_seed(42)).unwrap();
/// let result = EvolutionRunner::run(&mut engine, &RunConfig::default().with_max_generations(20)).unwrap();
/// assert_eq!(result.generations, 20);
/// assert_eq!(result.fitness_history.len(), 21);
/// ```
pub struct EvolutionRunner;

impl EvolutionRunner {
    /// Advances `engine` until the generation cap or stagnation.
    pub fn run(engine: &mut Engine, config: &RunConfig) -> Result<RunResult> {
        Self::run_with_cancel(engine, config, None)
    }

    /// Like [`run`](Self::run), but stops before the next generation once
    /// `cancel` is set to `true`.
    pub fn run_with_cancel(
        engine: &mut Engine,
        config: &RunConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<RunResult> {
        let initial = engine.current_best()?;
        drive(
            config,
            initial,
            || {
                cancel
                    .as_ref()
                    .is_some_and(|flag| flag.load(Ordering::Relaxed))
            },
            || engine.evolve(None, None),
        )
    }

    /// Advances a shared engine while its run flag is set.
    ///
    /// Sets the flag on entry and clears it on exit. The lock is released
    /// between generations so snapshots and [`SharedEngine::stop`] can get
    /// through.
    pub fn run_shared(shared: &SharedEngine, config: &RunConfig) -> Result<RunResult> {
        let initial = shared.with_engine(|e| e.current_best())??;
        shared.start();
        let result = drive(
            config,
            initial,
            || !shared.is_running(),
            || shared.advance(None, None),
        );
        shared.stop();
        result
    }
}

fn drive(
    config: &RunConfig,
    initial: GenerationResult,
    mut cancelled: impl FnMut() -> bool,
    mut step: impl FnMut() -> Result<GenerationResult>,
) -> Result<RunResult> {
    let mut best = initial;
    let mut fitness_history = vec![best.distance];

    let mut stagnation_counter = 0usize;
    let mut generations = 0usize;

    while generations < config.max_generations {
        if cancelled() {
            info!(generations, "run cancelled");
            return Ok(RunResult {
                best,
                generations,
                stagnated: false,
                cancelled: true,
                fitness_history,
            });
        }

        let result = step()?;
        generations += 1;

        if result.distance < best.distance {
            let improvement = if best.distance.abs() > 0.0 {
                (best.distance - result.distance) / best.distance.abs()
            } else {
                f64::INFINITY
            };
            if improvement >= config.convergence_threshold {
                stagnation_counter = 0;
            } else {
                stagnation_counter += 1;
            }
            debug!(
                generation = result.generation,
                distance = result.distance,
                "new best route"
            );
            best = result;
        } else {
            stagnation_counter += 1;
        }
        fitness_history.push(best.distance);

        if config.stagnation_limit > 0 && stagnation_counter >= config.stagnation_limit {
            info!(generations, best_distance = best.distance, "run stagnated");
            return Ok(RunResult {
                best,
                generations,
                stagnated: true,
                cancelled: false,
                fitness_history,
            });
        }
    }

    info!(generations, best_distance = best.distance, "run finished");
    Ok(RunResult {
        best,
        generations,
        stagnated: false,
        cancelled: false,
        fitness_history,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{City, EngineConfig, Mutation};

    fn engine() -> Engine {
        Engine::new(
            EngineConfig::default()
                .with_num_cities(15)
                .with_pop_size(40)
                .with_mutation_rate(0.2)
                .with_mutation(Mutation::Inversion)
                .with_seed(42),
        )
        .unwrap()
    }

    #[test]
    fn test_history_is_monotone() {
        let mut engine = engine();
        let config = RunConfig::default().with_max_generations(30);
        let result = EvolutionRunner::run(&mut engine, &config).unwrap();

        assert_eq!(result.generations, 30);
        assert_eq!(result.fitness_history.len(), 31);
        assert_eq!(engine.generation(), 30);
        for window in result.fitness_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best-so-far must not get worse: {} > {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(
            result.best.distance,
            *result.fitness_history.last().unwrap()
        );
    }

    #[test]
    fn test_improves_on_random_start() {
        let mut engine = engine();
        let config = RunConfig::default().with_max_generations(200);
        let result = EvolutionRunner::run(&mut engine, &config).unwrap();
        assert!(result.best.distance < result.fitness_history[0]);
    }

    #[test]
    fn test_stagnation_termination() {
        let mut engine = Engine::new(EngineConfig::default().with_seed(1)).unwrap();
        engine
            .set_cities(vec![City::new(0.0, 0.0), City::new(1.0, 0.0)], 0, None)
            .unwrap();
        // Every two-city tour has the same length, nothing can improve
        let config = RunConfig::default()
            .with_max_generations(1000)
            .with_stagnation_limit(5);
        let result = EvolutionRunner::run(&mut engine, &config).unwrap();
        assert!(result.stagnated);
        assert_eq!(result.generations, 5);
    }

    #[test]
    fn test_pre_cancelled_run_does_nothing() {
        let mut engine = engine();
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            EvolutionRunner::run_with_cancel(&mut engine, &RunConfig::default(), Some(cancel))
                .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(engine.generation(), 0);
        assert_eq!(result.fitness_history.len(), 1);
    }

    #[test]
    fn test_unbounded_generation_cap_with_cancel() {
        let mut engine = engine();
        let cancel = Arc::new(AtomicBool::new(true));
        let config = RunConfig::default().with_max_generations(usize::MAX);
        let result = EvolutionRunner::run_with_cancel(&mut engine, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.fitness_history.len(), 1);

        let config = RunConfig::default().with_max_generations(1 << 60);
        let cancel = Arc::new(AtomicBool::new(true));
        let result = EvolutionRunner::run_with_cancel(&mut engine, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
    }

    #[test]
    fn test_elitism_keeps_generation_best_monotone() {
        let mut engine = engine();
        let config = RunConfig::default().with_max_generations(25);
        let mut previous = engine.current_best().unwrap().distance;
        for _ in 0..config.max_generations {
            let result = engine.evolve(None, None).unwrap();
            assert!(result.distance <= previous + 1e-12);
            previous = result.distance;
        }
        let result = EvolutionRunner::run(&mut engine, &config).unwrap();
        assert!(result.best.distance <= previous + 1e-12);
        assert!((engine.current_best().unwrap().distance - result.best.distance).abs() < 1e-12);
    }

    #[test]
    fn test_shared_run_clears_flag() {
        let shared = SharedEngine::from_engine(engine());
        let config = RunConfig::default().with_max_generations(10);
        let result = EvolutionRunner::run_shared(&shared, &config).unwrap();
        assert_eq!(result.generations, 10);
        assert!(!result.cancelled);
        assert!(!shared.is_running());
    }

    #[test]
    fn test_shared_run_stops_on_flag() {
        let shared = SharedEngine::from_engine(engine());
        let stopper = shared.clone();
        let handle = std::thread::spawn(move || {
            while !stopper.is_running() {
                std::thread::yield_now();
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
            stopper.stop();
        });

        let config = RunConfig::default().with_max_generations(usize::MAX);
        let result = EvolutionRunner::run_shared(&shared, &config).unwrap();
        handle.join().unwrap();

        assert!(result.cancelled);
        assert!(result.generations > 0);
        assert_eq!(
            shared.with_engine(|e| e.generation()).unwrap(),
            result.generations
        );
    }
}
