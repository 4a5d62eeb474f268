//! Hit-point model with invulnerability and death notification

use std::fmt;

type ChangedCallback = Box<dyn FnMut(f32, f32)>;
type DiedCallback = Box<dyn FnMut()>;

/// Hit points clamped to `[0, max]`.
///
/// `on_changed(old, new)` fires on every accepted `damage()`, even when the
/// value is already at zero, and on every `heal()` that changes the value.
/// `on_died()` fires once per drop from above zero to zero.
pub struct Health {
    current: f32,
    max: f32,
    invulnerable: bool,
    on_changed: Option<ChangedCallback>,
    on_died: Option<DiedCallback>,
}

impl Health {
    /// Create a full-health model. Negative maximums are treated as zero.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            invulnerable: false,
            on_changed: None,
            on_died: None,
        }
    }

    /// Set the change observer.
    #[must_use]
    pub fn on_changed(mut self, callback: impl FnMut(f32, f32) + 'static) -> Self {
        self.on_changed = Some(Box::new(callback));
        self
    }

    /// Set the death observer.
    #[must_use]
    pub fn on_died(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_died = Some(Box::new(callback));
        self
    }

    /// Apply damage. Ignored while invulnerable or for non-positive amounts.
    pub fn damage(&mut self, amount: f32) {
        if self.invulnerable || amount.is_nan() || amount <= 0.0 {
            return;
        }

        let old = self.current;
        let new = (old - amount).max(0.0);
        self.current = new;

        log::trace!("Health {old} -> {new}");

        if let Some(callback) = self.on_changed.as_mut() {
            callback(old, new);
        }
        if old > 0.0 && new <= 0.0 {
            log::debug!("Health depleted");
            if let Some(callback) = self.on_died.as_mut() {
                callback();
            }
        }
    }

    /// Restore hit points, capped at `max`.
    pub fn heal(&mut self, amount: f32) {
        if amount.is_nan() || amount <= 0.0 {
            return;
        }

        let old = self.current;
        let new = (old + amount).min(self.max);
        if new == old {
            return;
        }
        self.current = new;

        if let Some(callback) = self.on_changed.as_mut() {
            callback(old, new);
        }
    }

    /// Toggle damage immunity.
    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.invulnerable = invulnerable;
    }

    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Current health as a fraction of max (0.0 when max is zero).
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

impl fmt::Debug for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Health")
            .field("current", &self.current)
            .field("max", &self.max)
            .field("invulnerable", &self.invulnerable)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Note {
        Changed(f32, f32),
        Died,
    }

    fn observed(max: f32) -> (Health, Rc<RefCell<Vec<Note>>>) {
        let notes = Rc::new(RefCell::new(Vec::new()));
        let changed = Rc::clone(&notes);
        let died = Rc::clone(&notes);
        let health = Health::new(max)
            .on_changed(move |old, new| changed.borrow_mut().push(Note::Changed(old, new)))
            .on_died(move || died.borrow_mut().push(Note::Died));
        (health, notes)
    }

    #[test]
    fn test_health_damage_heal_invulnerable_death() {
        let (mut health, notes) = observed(100.0);

        health.damage(30.0);
        assert_eq!(health.current(), 70.0);
        assert_eq!(notes.borrow().last(), Some(&Note::Changed(100.0, 70.0)));

        health.heal(10.0);
        assert_eq!(health.current(), 80.0);

        health.set_invulnerable(true);
        let before = notes.borrow().len();
        health.damage(999.0);
        assert_eq!(health.current(), 80.0);
        assert_eq!(notes.borrow().len(), before);

        health.set_invulnerable(false);
        health.damage(200.0);
        assert_eq!(health.current(), 0.0);
        assert_eq!(
            notes.borrow()[before..],
            [Note::Changed(80.0, 0.0), Note::Died]
        );
    }

    #[test]
    fn test_died_fires_once() {
        let (mut health, notes) = observed(10.0);

        health.damage(20.0);
        health.damage(5.0);

        let deaths = notes.borrow().iter().filter(|n| **n == Note::Died).count();
        assert_eq!(deaths, 1);
        assert!(health.is_dead());
    }

    #[test]
    fn test_damage_at_zero_still_notifies() {
        let (mut health, notes) = observed(10.0);

        health.damage(10.0);
        health.damage(3.0);

        assert_eq!(
            *notes.borrow(),
            vec![
                Note::Changed(10.0, 0.0),
                Note::Died,
                Note::Changed(0.0, 0.0)
            ]
        );
    }

    #[test]
    fn test_heal_caps_at_max_and_skips_noop() {
        let (mut health, notes) = observed(50.0);

        health.heal(25.0);
        assert_eq!(health.current(), 50.0);
        assert!(notes.borrow().is_empty());

        health.damage(10.0);
        health.heal(100.0);
        assert_eq!(health.current(), 50.0);
        assert_eq!(notes.borrow().last(), Some(&Note::Changed(40.0, 50.0)));
    }

    #[test]
    fn test_non_positive_amounts_ignored() {
        let (mut health, notes) = observed(10.0);

        health.damage(-5.0);
        health.damage(f32::NAN);
        health.heal(0.0);

        assert_eq!(health.current(), 10.0);
        assert!(notes.borrow().is_empty());
    }

    #[test]
    fn test_fraction() {
        let mut health = Health::new(200.0);
        health.damage(50.0);
        assert!((health.fraction() - 0.75).abs() < f32::EPSILON);
        assert_eq!(Health::new(0.0).fraction(), 0.0);
    }
}
