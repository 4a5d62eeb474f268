//! Single-resource rate limiter

/// Tracks time remaining until an action may be used again.
///
/// `remaining` always stays within `[0, duration]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    duration: f32,
    remaining: f32,
}

impl Cooldown {
    /// Create a ready cooldown. Negative durations are treated as zero.
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            remaining: 0.0,
        }
    }

    /// Consume the cooldown if it's ready.
    ///
    /// Returns `true` and restarts the timer, or `false` without changing
    /// anything.
    pub fn try_use(&mut self) -> bool {
        if self.remaining > 0.0 {
            return false;
        }
        self.remaining = self.duration;
        true
    }

    /// Count down by `delta` seconds.
    pub fn tick(&mut self, delta: f32) {
        self.remaining = (self.remaining - delta.max(0.0)).max(0.0);
    }

    /// Make the cooldown ready immediately.
    pub fn reset(&mut self) {
        self.remaining = 0.0;
    }

    /// Whether `try_use` would succeed.
    #[must_use]
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds until ready.
    #[must_use]
    #[inline]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Full cooldown length in seconds.
    #[must_use]
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Recharge progress from 0.0 (just used) to 1.0 (ready).
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            1.0 - self.remaining / self.duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_use_and_recharge() {
        let mut cooldown = Cooldown::new(0.25);

        assert!(cooldown.try_use());
        assert!(!cooldown.try_use());

        cooldown.tick(0.25);
        assert!(cooldown.try_use());
    }

    #[test]
    fn test_failed_use_does_not_restart_timer() {
        let mut cooldown = Cooldown::new(1.0);
        cooldown.try_use();
        cooldown.tick(0.6);

        assert!(!cooldown.try_use());
        assert!((cooldown.remaining() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_remaining_clamped_at_zero() {
        let mut cooldown = Cooldown::new(0.5);
        cooldown.try_use();
        cooldown.tick(10.0);

        assert!(cooldown.remaining().abs() < f32::EPSILON);
        assert!(cooldown.is_ready());
        assert!((cooldown.progress() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_duration_always_ready() {
        let mut cooldown = Cooldown::new(0.0);
        assert!(cooldown.try_use());
        assert!(cooldown.try_use());
    }

    #[test]
    fn test_reset_makes_ready() {
        let mut cooldown = Cooldown::new(3.0);
        cooldown.try_use();
        assert!(!cooldown.is_ready());

        cooldown.reset();
        assert!(cooldown.try_use());
    }
}
