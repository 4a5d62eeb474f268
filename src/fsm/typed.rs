//! Enum-keyed wrapper over `StateMachine`
//!
//! Keeps the string-keyed core (and its runtime registration) while letting
//! call sites use a closed set of enum keys.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Mode { Idle, Attack }
//!
//! impl StateKey for Mode {
//!     fn name(self) -> &'static str {
//!         match self { Mode::Idle => "idle", Mode::Attack => "attack" }
//!     }
//!     fn all() -> &'static [Self] { &[Mode::Idle, Mode::Attack] }
//! }
//!
//! let mut fsm: TypedStateMachine<Mode, Enemy> = TypedStateMachine::new();
//! fsm.add(Mode::Idle, State::new().on_update(|e, _| {
//!     if e.target_in_range { Mode::Attack.transition() } else { Transition::None }
//! }));
//! ```

use std::fmt;
use std::marker::PhantomData;

use super::machine::{State, StateMachine, Transition};

/// A closed set of state identifiers.
pub trait StateKey: Copy + Eq + fmt::Debug + 'static {
    /// The string key this variant is registered under.
    fn name(self) -> &'static str;

    /// Every variant, used for reverse lookup.
    fn all() -> &'static [Self];

    /// Reverse lookup from a registered name.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|key| key.name() == name)
    }

    /// A `Transition` to this state, for returning from update hooks.
    fn transition(self) -> Transition {
        Transition::to(self.name())
    }
}

/// `StateMachine` addressed by `K` instead of raw strings.
pub struct TypedStateMachine<K: StateKey, Ctx = ()> {
    inner: StateMachine<Ctx>,
    _key: PhantomData<K>,
}

impl<K: StateKey, Ctx> TypedStateMachine<K, Ctx> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: StateMachine::new(),
            _key: PhantomData,
        }
    }

    /// Register (or replace) the state for `key`.
    pub fn add(&mut self, key: K, state: State<Ctx>) {
        self.inner.add(key.name(), state);
    }

    /// Set the transition observer; `old` is `None` before the first state.
    pub fn set_on_change(&mut self, mut hook: impl FnMut(&mut Ctx, Option<K>, K) + 'static) {
        self.inner.set_on_change(move |ctx, old, new| {
            if let Some(new) = K::from_name(new) {
                hook(ctx, K::from_name(old), new);
            }
        });
    }

    pub fn start(&mut self, key: K, ctx: &mut Ctx) {
        self.inner.start(key.name(), ctx);
    }

    pub fn transition(&mut self, key: K, ctx: &mut Ctx) {
        self.inner.transition(key.name(), ctx);
    }

    pub fn update(&mut self, delta: f32, ctx: &mut Ctx) {
        self.inner.update(delta, ctx);
    }

    /// Current state, `None` before `start()`.
    #[must_use]
    pub fn current(&self) -> Option<K> {
        self.inner.current().and_then(K::from_name)
    }

    #[must_use]
    pub fn in_state(&self, key: K) -> bool {
        self.inner.in_state(key.name())
    }

    /// The underlying string-keyed machine.
    #[must_use]
    pub fn inner(&self) -> &StateMachine<Ctx> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut StateMachine<Ctx> {
        &mut self.inner
    }
}

impl<K: StateKey, Ctx> Default for TypedStateMachine<K, Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey, Ctx> fmt::Debug for TypedStateMachine<K, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedStateMachine")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Idle,
        Windup,
        Attack,
    }

    impl StateKey for Mode {
        fn name(self) -> &'static str {
            match self {
                Mode::Idle => "idle",
                Mode::Windup => "windup",
                Mode::Attack => "attack",
            }
        }

        fn all() -> &'static [Self] {
            &[Mode::Idle, Mode::Windup, Mode::Attack]
        }
    }

    #[derive(Debug, Default)]
    struct Enemy {
        in_range: bool,
        changes: Vec<(Option<Mode>, Mode)>,
    }

    fn enemy_machine() -> TypedStateMachine<Mode, Enemy> {
        let mut fsm = TypedStateMachine::new();
        fsm.add(
            Mode::Idle,
            State::new().on_update(|e: &mut Enemy, _| {
                if e.in_range {
                    Mode::Windup.transition()
                } else {
                    Transition::None
                }
            }),
        );
        fsm.add(Mode::Windup, State::new());
        fsm.set_on_change(|e, old, new| e.changes.push((old, new)));
        fsm
    }

    #[test]
    fn test_typed_current() {
        let mut fsm = enemy_machine();
        let mut enemy = Enemy::default();

        assert_eq!(fsm.current(), None);
        fsm.start(Mode::Idle, &mut enemy);
        assert_eq!(fsm.current(), Some(Mode::Idle));
        assert!(fsm.in_state(Mode::Idle));
    }

    #[test]
    fn test_typed_transition_from_update() {
        let mut fsm = enemy_machine();
        let mut enemy = Enemy::default();
        fsm.start(Mode::Idle, &mut enemy);

        fsm.update(0.016, &mut enemy);
        assert_eq!(fsm.current(), Some(Mode::Idle));

        enemy.in_range = true;
        fsm.update(0.016, &mut enemy);
        assert_eq!(fsm.current(), Some(Mode::Windup));
        assert_eq!(enemy.changes, vec![(Some(Mode::Idle), Mode::Windup)]);
    }

    #[test]
    fn test_unregistered_key_is_ignored() {
        let mut fsm = enemy_machine();
        let mut enemy = Enemy::default();
        fsm.start(Mode::Idle, &mut enemy);

        fsm.transition(Mode::Attack, &mut enemy);
        assert_eq!(fsm.current(), Some(Mode::Idle));
        assert!(enemy.changes.is_empty());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Mode::from_name("attack"), Some(Mode::Attack));
        assert_eq!(Mode::from_name("flee"), None);
    }
}
