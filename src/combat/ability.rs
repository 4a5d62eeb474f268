//! Phase-timed ability runner
//!
//! Drives one ability at a time through `Startup -> Active -> Recovery` and
//! back to `Idle`, purely from the elapsed time fed in through `tick()`.
//!
//! # Example
//!
//! ```ignore
//! let slash = AbilitySpec::new("slash", 0.1, 0.15, 0.2, Vec2::new(24.0, 0.0))?;
//!
//! let mut runner = AbilityRunner::new()
//!     .on_active(|spec| enable_hitbox(spec.payload))
//!     .on_ended(|_| disable_hitbox());
//!
//! if input.is_just_pressed(InputAction::Attack) {
//!     runner.begin(&slash);
//! }
//! runner.tick(delta);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::ConfigError;

/// Slack used when comparing accumulated time against phase boundaries.
const TIME_EPSILON: f32 = 1e-5;

// ============================================================================
// Ability Spec
// ============================================================================

/// Immutable description of a timed ability.
///
/// The payload is opaque to the runner and forwarded to every callback;
/// by default it's a 2D offset (hitbox position relative to the caster).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySpec<P = Vec2> {
    /// Ability name for lookups and logging
    pub name: String,
    /// Wind-up duration in seconds
    pub startup: f32,
    /// Duration of the window in which the ability has its effect
    pub active: f32,
    /// Cool-down duration after the active window
    pub recovery: f32,
    /// Data forwarded to phase callbacks
    #[serde(default)]
    pub payload: P,
}

impl<P> AbilitySpec<P> {
    /// Create a validated ability spec.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDuration` if any duration is negative
    /// or not finite.
    pub fn new(
        name: impl Into<String>,
        startup: f32,
        active: f32,
        recovery: f32,
        payload: P,
    ) -> Result<Self, ConfigError> {
        let spec = Self {
            name: name.into(),
            startup,
            active,
            recovery,
            payload,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check that every phase duration is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns the first offending phase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (phase, value) in [
            ("startup", self.startup),
            ("active", self.active),
            ("recovery", self.recovery),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration {
                    ability: self.name.clone(),
                    phase,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Sum of all three phase durations.
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        self.startup + self.active + self.recovery
    }

    /// Duration of the given phase. `Idle` has no duration.
    #[must_use]
    pub fn duration_of(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Idle => 0.0,
            Phase::Startup => self.startup,
            Phase::Active => self.active,
            Phase::Recovery => self.recovery,
        }
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Attack-timing window of an `AbilityRunner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Nothing running
    #[default]
    Idle,
    /// Wind-up before the effect
    Startup,
    /// The effect window (hit detection enabled)
    Active,
    /// Wind-down after the effect
    Recovery,
}

impl Phase {
    /// The phase that follows this one in a run.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Startup => Self::Active,
            Self::Active => Self::Recovery,
            Self::Recovery => Self::Idle,
        }
    }

    /// Phase name for logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Startup => "Startup",
            Self::Active => "Active",
            Self::Recovery => "Recovery",
        }
    }
}

// ============================================================================
// Ability Runner
// ============================================================================

type SpecCallback<P> = Box<dyn FnMut(&AbilitySpec<P>)>;

/// Runs at most one ability at a time.
///
/// Phase changes only ever happen inside `begin()` and `tick()`, and every
/// callback fires synchronously before those calls return. There is no
/// cancellation: a run ends when its recovery has elapsed.
pub struct AbilityRunner<P = Vec2> {
    /// Spec of the ability in flight
    current: Option<AbilitySpec<P>>,
    /// Current phase
    phase: Phase,
    /// Time since `begin()`
    elapsed: f32,
    /// Time spent in the current phase (carries over across boundaries)
    phase_elapsed: f32,
    on_began: Option<SpecCallback<P>>,
    on_active: Option<SpecCallback<P>>,
    on_ended: Option<SpecCallback<P>>,
}

impl<P: Clone> AbilityRunner<P> {
    /// Create an idle runner with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: None,
            phase: Phase::Idle,
            elapsed: 0.0,
            phase_elapsed: 0.0,
            on_began: None,
            on_active: None,
            on_ended: None,
        }
    }

    /// Called when a run is accepted by `begin()`.
    #[must_use]
    pub fn on_began(mut self, callback: impl FnMut(&AbilitySpec<P>) + 'static) -> Self {
        self.on_began = Some(Box::new(callback));
        self
    }

    /// Called on entering the `Active` phase.
    #[must_use]
    pub fn on_active(mut self, callback: impl FnMut(&AbilitySpec<P>) + 'static) -> Self {
        self.on_active = Some(Box::new(callback));
        self
    }

    /// Called once recovery has elapsed and the runner is idle again.
    #[must_use]
    pub fn on_ended(mut self, callback: impl FnMut(&AbilitySpec<P>) + 'static) -> Self {
        self.on_ended = Some(Box::new(callback));
        self
    }

    /// Start running `spec`.
    ///
    /// Rejected while another run is in flight: returns `false` and leaves
    /// phase, elapsed time and callbacks untouched.
    pub fn begin(&mut self, spec: &AbilitySpec<P>) -> bool {
        if self.busy() {
            log::trace!(
                "Ability '{}' rejected: '{}' still in {}",
                spec.name,
                self.current.as_ref().map_or("", |s| s.name.as_str()),
                self.phase.name()
            );
            return false;
        }

        log::debug!("Ability '{}' began", spec.name);

        self.current = Some(spec.clone());
        self.phase = Phase::Startup;
        self.elapsed = 0.0;
        self.phase_elapsed = 0.0;

        if let (Some(callback), Some(spec)) = (self.on_began.as_mut(), self.current.as_ref()) {
            callback(spec);
        }
        true
    }

    /// Advance the run by `delta` seconds.
    ///
    /// Every phase boundary crossed by the accumulated time is resolved
    /// before returning, so zero-length phases are passed through within
    /// the same call.
    pub fn tick(&mut self, delta: f32) {
        if self.current.is_none() {
            return;
        }

        let delta = delta.max(0.0);
        self.elapsed += delta;
        self.phase_elapsed += delta;

        while let Some(spec) = self.current.as_ref() {
            let duration = spec.duration_of(self.phase);
            if self.phase_elapsed + TIME_EPSILON < duration {
                break;
            }

            self.phase_elapsed = (self.phase_elapsed - duration).max(0.0);
            let next = self.phase.next();
            log::trace!(
                "Ability '{}': {} -> {}",
                spec.name,
                self.phase.name(),
                next.name()
            );
            self.phase = next;

            match next {
                Phase::Active => {
                    if let Some(callback) = self.on_active.as_mut() {
                        callback(spec);
                    }
                }
                Phase::Idle => {
                    self.finish();
                    break;
                }
                Phase::Startup | Phase::Recovery => {}
            }
        }
    }

    fn finish(&mut self) {
        let Some(spec) = self.current.take() else {
            return;
        };

        log::debug!("Ability '{}' ended after {:.3}s", spec.name, self.elapsed);

        self.elapsed = 0.0;
        self.phase_elapsed = 0.0;

        if let Some(callback) = self.on_ended.as_mut() {
            callback(&spec);
        }
    }

    /// True while a run is in flight (`Startup`, `Active` or `Recovery`).
    #[must_use]
    #[inline]
    pub fn busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// True only during the `Active` phase.
    #[must_use]
    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Current phase.
    #[must_use]
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds since the current run began (zero when idle).
    #[must_use]
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds spent in the current phase.
    #[must_use]
    #[inline]
    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    /// Spec of the run in flight.
    #[must_use]
    pub fn current(&self) -> Option<&AbilitySpec<P>> {
        self.current.as_ref()
    }
}

impl<P: Clone> Default for AbilityRunner<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for AbilityRunner<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbilityRunner")
            .field("current", &self.current.as_ref().map(|s| s.name.as_str()))
            .field("phase", &self.phase)
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
