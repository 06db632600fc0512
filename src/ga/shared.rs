//! Thread-safe handle around one [`Engine`].
//!
//! [`SharedEngine`] is the boundary a request/response layer talks to. All
//! engine access goes through one mutex, so reconfiguration and generational
//! steps never interleave. The run flag lives outside the lock and is only
//! observed by driving loops such as
//! [`EvolutionRunner::run_shared`](super::EvolutionRunner::run_shared).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use super::config::{ConfigUpdate, EngineConfig};
use super::engine::Engine;
use super::selection::Selection;
use super::types::{CitiesSnapshot, City, GenerationResult, StateSnapshot};
use crate::error::{EngineError, Result};

/// Cloneable, mutex-serialised engine handle with a run flag.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
    running: Arc<AtomicBool>,
}

impl SharedEngine {
    /// Builds a new engine from `config` and wraps it.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self::from_engine(Engine::new(config)?))
    }

    /// Wraps an existing engine. The run flag starts cleared.
    pub fn from_engine(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Engine>> {
        self.inner.lock().map_err(|_| EngineError::LockPoisoned)
    }

    /// Applies a partial configuration and resets the engine.
    pub fn configure(&self, update: ConfigUpdate) -> Result<()> {
        self.lock()?.configure(update)
    }

    /// Installs explicit cities and resets the population.
    pub fn set_cities(
        &self,
        cities: Vec<City>,
        depot: usize,
        final_index: Option<usize>,
    ) -> Result<()> {
        self.lock()?.set_cities(cities, depot, final_index)
    }

    /// Snapshot of the cities and depot.
    pub fn cities(&self) -> Result<CitiesSnapshot> {
        Ok(self.lock()?.cities_snapshot())
    }

    /// Snapshot of cities, depot, generation and live best distance.
    pub fn current_state(&self) -> Result<StateSnapshot> {
        self.lock()?.state_snapshot()
    }

    /// Runs one generation with optional per-call overrides.
    pub fn advance(
        &self,
        mutation_rate: Option<f64>,
        selection_method: Option<Selection>,
    ) -> Result<GenerationResult> {
        self.lock()?.evolve(mutation_rate, selection_method)
    }

    /// Runs `f` with shared access to the engine.
    pub fn with_engine<T>(&self, f: impl FnOnce(&Engine) -> T) -> Result<T> {
        let engine = self.lock()?;
        Ok(f(&*engine))
    }

    /// Sets the run flag.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// Clears the run flag. A driving loop stops after its current generation.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("evolution stop requested");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
