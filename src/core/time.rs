//! Frame time tracking
//!
//! Produces the `delta` every `tick()` in the kernel is driven with.

use std::time::Instant;

/// Frame clock.
///
/// Deltas are clamped to `max_delta` so a long stall (debugger break,
/// window drag) doesn't feed one enormous step into gameplay.
#[derive(Debug, Clone)]
pub struct Time {
    /// Wall-clock instant of the previous `update()`
    last_instant: Option<Instant>,
    /// Seconds since the previous frame
    delta: f32,
    /// Seconds since the clock started
    elapsed: f64,
    /// Frames counted so far
    frame_count: u64,
    /// Upper bound applied to every delta
    max_delta: f32,
    /// Scale applied to every delta (slow motion, pause)
    time_scale: f32,
}

impl Time {
    /// Default delta clamp: a quarter second.
    pub const DEFAULT_MAX_DELTA: f32 = 0.25;

    #[must_use]
    pub fn new() -> Self {
        Self {
            last_instant: None,
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            max_delta: Self::DEFAULT_MAX_DELTA,
            time_scale: 1.0,
        }
    }

    /// Set the delta clamp.
    #[must_use]
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Set the time scale (1.0 = real time, 0.0 = paused).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Advance from the wall clock. Call once per frame.
    ///
    /// The first call yields a zero delta.
    pub fn update(&mut self) {
        let now = Instant::now();
        let raw = self
            .last_instant
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_instant = Some(now);
        self.advance(raw);
    }

    /// Advance by an explicit number of seconds (fixed-step loops, tests).
    pub fn advance(&mut self, seconds: f32) {
        let clamped = seconds.clamp(0.0, self.max_delta);
        if clamped < seconds {
            log::trace!("Frame delta {seconds:.3}s clamped to {clamped:.3}s");
        }
        self.delta = clamped * self.time_scale;
        self.elapsed += f64::from(self.delta);
        self.frame_count += 1;
    }

    /// Seconds for this frame, scaled and clamped.
    #[must_use]
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Scaled seconds since the clock started.
    #[must_use]
    #[inline]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    #[must_use]
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut time = Time::new();
        time.advance(0.1);
        time.advance(0.1);

        assert!((time.delta_seconds() - 0.1).abs() < f32::EPSILON);
        assert!((time.elapsed_seconds() - 0.2).abs() < 1e-6);
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn test_hitch_is_clamped() {
        let mut time = Time::new().with_max_delta(0.1);
        time.advance(3.0);
        assert!((time.delta_seconds() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_negative_delta_becomes_zero() {
        let mut time = Time::new();
        time.advance(-1.0);
        assert_eq!(time.delta_seconds(), 0.0);
    }

    #[test]
    fn test_time_scale() {
        let mut time = Time::new();
        time.set_time_scale(0.5);
        time.advance(0.2);
        assert!((time.delta_seconds() - 0.1).abs() < f32::EPSILON);

        time.set_time_scale(0.0);
        time.advance(0.2);
        assert_eq!(time.delta_seconds(), 0.0);
    }

    #[test]
    fn test_first_update_has_zero_delta() {
        let mut time = Time::new();
        time.update();
        assert_eq!(time.delta_seconds(), 0.0);
        assert_eq!(time.frame_count(), 1);
    }
}
