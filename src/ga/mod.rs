//! Genetic route optimizer.
//!
//! Evolves a population of city permutations toward the shortest route that
//! starts at a depot and either returns to it (closed tour) or ends at a
//! fixed destination (open path).
//!
//! # Key Types
//!
//! - [`EngineConfig`] / [`ConfigUpdate`]: Algorithm parameters and partial updates
//! - [`Engine`]: Cities, population and the generational step
//! - [`SharedEngine`]: Mutex-serialised handle with a run flag
//! - [`EvolutionRunner`]: Multi-generation loop with stagnation and cancellation
//! - [`RouteEvaluator`]: Route length and canonical form
//!
//! # Submodules
//!
//! - [`operators`]: Permutation crossover (OX, CX, SP) and mutation (swap, inversion)
//! - [`selection`]: Tournament and roulette parent selection
//! - [`fitness`]: Route evaluation
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Potvin (1996), "Genetic algorithms for the traveling salesman problem"

mod config;
mod engine;
pub mod fitness;
pub mod operators;
mod runner;
pub mod selection;
mod shared;
mod types;

pub use config::{ConfigUpdate, EngineConfig};
pub use engine::{rank_by_fitness, Engine};
pub use fitness::RouteEvaluator;
pub use operators::{reproduce, Crossover, Mutation};
pub use runner::{EvolutionRunner, RunConfig, RunResult};
pub use selection::Selection;
pub use shared::SharedEngine;
pub use types::{CitiesSnapshot, City, GenerationResult, Individual, StateSnapshot};
