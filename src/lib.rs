//! Genetic-algorithm route optimization.
//!
//! Finds short routes through a set of 2-D cities:
//!
//! - **Closed tours**: start at a depot, visit every city once, return.
//! - **Open paths**: start at a depot, visit every city once, stop at a
//!   fixed destination.
//!
//! The [`ga`] module holds the engine, its operators and the run loop.
//! Failures are reported through [`EngineError`].
//!
//! # Example
//!
//! ```
//! use u_routega::ga::{Engine, EngineConfig, EvolutionRunner, RunConfig};
//!
//! let config = EngineConfig::default().with_num_cities(10).with_seed(7);
//! let mut engine = Engine::new(config).unwrap();
//! let result = EvolutionRunner::run(&mut engine, &RunConfig::default().with_max_generations(50)).unwrap();
//! assert_eq!(result.best.route[0], engine.start_index());
//! ```

pub mod error;
pub mod ga;

pub use error::{EngineError, Result};
