//! Rate-driven spawner
//!
//! Produces instances on a fixed cadence (optionally jittered) from any
//! `SpawnSource`: a plain factory closure or an `ObjectPool`.
//!
//! # Example
//!
//! ```ignore
//! let config = SpawnerConfig::new(2.0).with_jitter(0.1);
//! let mut spawner = Spawner::new(config, enemy_pool)?
//!     .on_spawn(|enemy| arena.push(enemy));
//!
//! // Every frame
//! spawner.tick(delta);
//!
//! // When an enemy dies
//! spawner.source_mut().release(enemy);
//! ```
//!
//! # Backlog
//!
//! A tick that spans several intervals (a frame hitch, a long pause) spawns
//! once per elapsed interval, so no time is lost. `max_per_tick` bounds the
//! burst; when it kicks in, the excess backlog is dropped and at most one
//! pending spawn carries over to the next tick.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::ConfigError;
use crate::pool::ObjectPool;

/// Fraction of an interval that counts as already elapsed, so rounding at a
/// boundary can't delay a spawn by a whole tick.
const INTERVAL_SLACK: f64 = 1e-4;

// ============================================================================
// Spawn Source
// ============================================================================

/// Something that can produce a fresh instance on demand.
pub trait SpawnSource<T> {
    /// Produce one instance.
    fn make(&mut self) -> T;
}

impl<T, F> SpawnSource<T> for F
where
    F: FnMut() -> T,
{
    fn make(&mut self) -> T {
        self()
    }
}

impl<T> SpawnSource<T> for ObjectPool<T> {
    fn make(&mut self) -> T {
        self.acquire()
    }
}

// ============================================================================
// Spawner Config
// ============================================================================

/// Spawner tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Spawns per second
    pub rate: f32,
    /// Fractional randomness on each interval (0.05 = +/-5%)
    pub jitter: f32,
    /// Upper bound on spawns in a single tick (`None` = drain the backlog)
    pub max_per_tick: Option<usize>,
    /// RNG seed for reproducible jitter (`None` = seeded from entropy)
    pub seed: Option<u64>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            jitter: 0.0,
            max_per_tick: None,
            seed: None,
        }
    }
}

impl SpawnerConfig {
    /// Config with the given rate and no jitter.
    #[must_use]
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    /// Set the jitter fraction.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    /// Cap the number of spawns per tick.
    #[must_use]
    pub fn with_max_per_tick(mut self, max: usize) -> Self {
        self.max_per_tick = Some(max);
        self
    }

    /// Use a fixed RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check rate and jitter ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRate` for a non-positive or non-finite
    /// rate, `ConfigError::InvalidJitter` for jitter outside `[0, 1)`,
    /// `ConfigError::InvalidSpawnCap` for a cap of zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(ConfigError::InvalidRate(self.rate));
        }
        if !(0.0..1.0).contains(&self.jitter) {
            return Err(ConfigError::InvalidJitter(self.jitter));
        }
        if self.max_per_tick == Some(0) {
            return Err(ConfigError::InvalidSpawnCap);
        }
        Ok(())
    }

    /// Nominal seconds between spawns.
    #[must_use]
    pub fn interval(&self) -> f32 {
        1.0 / self.rate
    }
}

// ============================================================================
// Spawner
// ============================================================================

type SpawnCallback<T> = Box<dyn FnMut(T)>;

/// Generates instances at `rate` per second.
pub struct Spawner<T, S> {
    config: SpawnerConfig,
    source: S,
    /// Time accumulated toward the next spawn (f64 so long backlogs stay exact)
    accumulator: f64,
    /// Jittered length of the pending interval
    next_interval: f64,
    rng: StdRng,
    on_spawn: Option<SpawnCallback<T>>,
    total_spawned: u64,
}

impl<T, S: SpawnSource<T>> Spawner<T, S> {
    /// Create a spawner.
    ///
    /// # Errors
    ///
    /// Returns the validation error for an invalid `config`.
    pub fn new(config: SpawnerConfig, source: S) -> Result<Self, ConfigError> {
        config
            .validate()
            .inspect_err(|e| log::warn!("Rejected spawner config: {e}"))?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut spawner = Self {
            config,
            source,
            accumulator: 0.0,
            next_interval: 0.0,
            rng,
            on_spawn: None,
            total_spawned: 0,
        };
        spawner.next_interval = spawner.roll_interval();
        Ok(spawner)
    }

    /// Set the callback that receives every spawned instance from `tick()`.
    #[must_use]
    pub fn on_spawn(mut self, callback: impl FnMut(T) + 'static) -> Self {
        self.on_spawn = Some(Box::new(callback));
        self
    }

    /// Advance by `delta` seconds, handing spawns to the `on_spawn` callback.
    ///
    /// Without a callback, spawned instances are dropped.
    /// Returns the number of spawns.
    pub fn tick(&mut self, delta: f32) -> usize {
        let mut callback = self.on_spawn.take();
        let count = self.tick_with(delta, |obj| {
            if let Some(callback) = callback.as_mut() {
                callback(obj);
            }
        });
        self.on_spawn = callback;
        count
    }

    /// Advance by `delta` seconds, handing spawns to `sink`.
    ///
    /// Returns the number of spawns.
    pub fn tick_with(&mut self, delta: f32, mut sink: impl FnMut(T)) -> usize {
        self.accumulator += f64::from(delta.max(0.0));
        let cap = self.config.max_per_tick.unwrap_or(usize::MAX);

        let mut spawned = 0;
        loop {
            let slack = self.next_interval * INTERVAL_SLACK;
            if self.accumulator + slack < self.next_interval {
                break;
            }

            if spawned >= cap {
                log::debug!(
                    "Spawn cap of {spawned} reached, dropping {:.3}s of backlog",
                    (self.accumulator - self.next_interval).max(0.0)
                );
                self.accumulator = self.accumulator.min(self.next_interval);
                break;
            }

            // Without jitter every pending interval has the same length, so
            // the whole run is counted and subtracted in one step.
            let due = if self.config.jitter > 0.0 {
                1
            } else {
                (((self.accumulator + slack) / self.next_interval) as usize).clamp(1, cap - spawned)
            };

            self.accumulator = (self.accumulator - due as f64 * self.next_interval).max(0.0);
            self.next_interval = self.roll_interval();

            for _ in 0..due {
                sink(self.source.make());
            }
            spawned += due;
        }

        if spawned > 0 {
            self.total_spawned += spawned as u64;
            log::trace!("Spawned {spawned} (total {})", self.total_spawned);
        }
        spawned
    }

    /// Make the next `tick()` spawn immediately.
    pub fn reset(&mut self) {
        self.accumulator = self.next_interval;
    }

    /// Change the spawn rate. Takes effect from the next interval.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRate` and keeps the old rate if `rate`
    /// is invalid.
    pub fn set_rate(&mut self, rate: f32) -> Result<(), ConfigError> {
        let candidate = SpawnerConfig {
            rate,
            ..self.config.clone()
        };
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    fn roll_interval(&mut self) -> f64 {
        let base = 1.0 / f64::from(self.config.rate);
        let jitter = f64::from(self.config.jitter);
        if jitter > 0.0 {
            base * (1.0 + self.rng.gen_range(-jitter..=jitter))
        } else {
            base
        }
    }

    /// The spawn source (e.g. to release pooled objects back).
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Seconds accumulated toward the pending spawn.
    #[must_use]
    pub fn accumulated(&self) -> f32 {
        self.accumulator as f32
    }

    /// Length of the pending (jittered) interval.
    #[must_use]
    pub fn next_interval(&self) -> f32 {
        self.next_interval as f32
    }

    /// Spawns produced over the spawner's lifetime.
    #[must_use]
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }
}

impl<T, S> fmt::Debug for Spawner<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("config", &self.config)
            .field("accumulator", &self.accumulator)
            .field("next_interval", &self.next_interval)
            .field("total_spawned", &self.total_spawned)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
