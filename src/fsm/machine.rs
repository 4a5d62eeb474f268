//! String-keyed Finite State Machine
//!
//! States are registered by name as bundles of optional lifecycle hooks and
//! can be added at any time, including after the machine has started. Any
//! state may transition to any other; legality is decided by whoever calls
//! `transition()` (typically a state's own update hook).
//!
//! # Lifecycle
//!
//! 1. `start(name)` - enters the first state (`on_enter` only)
//! 2. `update(delta)` - runs the current state's `on_update` each frame
//! 3. `transition(name)` - `on_exit` (old) -> `current` updated ->
//!    machine `on_change(old, new)` -> `on_enter` (new)
//!
//! Unknown names and redundant transitions are silently ignored.
//!
//! # Example
//!
//! ```ignore
//! let mut fsm: StateMachine<Player> = StateMachine::new();
//!
//! fsm.add("idle", State::new().on_update(|player, _| {
//!     if player.input.is_pressed(InputAction::MoveRight) {
//!         Transition::to("run")
//!     } else {
//!         Transition::None
//!     }
//! }));
//! fsm.add("run", State::new().on_enter(|player| player.play("run")));
//!
//! fsm.start("idle", &mut player);
//! fsm.update(delta, &mut player);  // may move to "run"
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

// ============================================================================
// Transition
// ============================================================================

/// Decision returned from a state's update hook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Transition {
    /// Stay in the current state.
    #[default]
    None,
    /// Move to the named state.
    To(String),
}

impl Transition {
    /// Create a transition to the named state.
    pub fn to(name: impl Into<String>) -> Self {
        Transition::To(name.into())
    }
}

// ============================================================================
// State
// ============================================================================

type EnterHook<Ctx> = Box<dyn FnMut(&mut Ctx)>;
type ExitHook<Ctx> = Box<dyn FnMut(&mut Ctx)>;
type UpdateHook<Ctx> = Box<dyn FnMut(&mut Ctx, f32) -> Transition>;
type ChangeHook<Ctx> = Box<dyn FnMut(&mut Ctx, &str, &str)>;

/// A named entry in a `StateMachine`: a bundle of optional hooks.
///
/// All hooks receive the context the machine is driven with.
pub struct State<Ctx = ()> {
    on_enter: Option<EnterHook<Ctx>>,
    on_exit: Option<ExitHook<Ctx>>,
    on_update: Option<UpdateHook<Ctx>>,
}

impl<Ctx> State<Ctx> {
    /// A state with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_enter: None,
            on_exit: None,
            on_update: None,
        }
    }

    /// Called when this state becomes current.
    #[must_use]
    pub fn on_enter(mut self, hook: impl FnMut(&mut Ctx) + 'static) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    /// Called when the machine leaves this state.
    #[must_use]
    pub fn on_exit(mut self, hook: impl FnMut(&mut Ctx) + 'static) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Called every `update()` while current.
    ///
    /// The returned `Transition` is applied once the hook returns.
    #[must_use]
    pub fn on_update(mut self, hook: impl FnMut(&mut Ctx, f32) -> Transition + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }
}

impl<Ctx> Default for State<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> fmt::Debug for State<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// A string-keyed finite state machine.
///
/// # Type Parameters
///
/// - `Ctx`: Context passed to every hook (the object the machine drives)
pub struct StateMachine<Ctx = ()> {
    /// Registered states by name
    states: FxHashMap<String, State<Ctx>>,
    /// Current state name; `None` until started
    current: Option<String>,
    /// Machine-level transition observer
    on_change: Option<ChangeHook<Ctx>>,
}

impl<Ctx> StateMachine<Ctx> {
    /// Create an empty, unstarted machine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: FxHashMap::default(),
            current: None,
            on_change: None,
        }
    }

    /// Register a state, replacing any existing state with the same name.
    pub fn add(&mut self, name: impl Into<String>, state: State<Ctx>) {
        self.states.insert(name.into(), state);
    }

    /// Builder-style `add`.
    #[must_use]
    pub fn with_state(mut self, name: impl Into<String>, state: State<Ctx>) -> Self {
        self.add(name, state);
        self
    }

    /// Unregister a state.
    ///
    /// Removing the current state does not change `current`; the machine
    /// simply has no hooks to run until it transitions elsewhere.
    pub fn remove(&mut self, name: &str) -> Option<State<Ctx>> {
        self.states.remove(name)
    }

    /// Set the observer called with `(old, new)` on every transition.
    pub fn set_on_change(&mut self, hook: impl FnMut(&mut Ctx, &str, &str) + 'static) {
        self.on_change = Some(Box::new(hook));
    }

    /// Builder-style `set_on_change`.
    #[must_use]
    pub fn on_change(mut self, hook: impl FnMut(&mut Ctx, &str, &str) + 'static) -> Self {
        self.set_on_change(hook);
        self
    }

    /// Enter `name` as the first state.
    ///
    /// Runs only the new state's `on_enter`. Ignored if `name` is unknown.
    pub fn start(&mut self, name: &str, ctx: &mut Ctx) {
        if !self.states.contains_key(name) {
            log::trace!("Ignoring start in unknown state '{name}'");
            return;
        }

        log::debug!("State machine started in '{name}'");
        self.current = Some(name.to_owned());
        self.enter(name, ctx);
    }

    /// Move to `name`.
    ///
    /// Ignored if `name` is unknown or already current. Otherwise, in order:
    /// old `on_exit`, `current` updated, machine `on_change(old, new)`,
    /// new `on_enter`.
    pub fn transition(&mut self, name: &str, ctx: &mut Ctx) {
        if self.current.as_deref() == Some(name) || !self.states.contains_key(name) {
            return;
        }

        let old = self.current.take();

        if let Some(old_name) = old.as_deref()
            && let Some(hook) = self
                .states
                .get_mut(old_name)
                .and_then(|s| s.on_exit.as_mut())
        {
            hook(ctx);
        }

        self.current = Some(name.to_owned());

        let old_name = old.as_deref().unwrap_or("");
        log::debug!("State transition: '{old_name}' -> '{name}'");

        if let Some(hook) = self.on_change.as_mut() {
            hook(ctx, old_name, name);
        }

        self.enter(name, ctx);
    }

    /// Run the current state's update hook, then apply its transition.
    ///
    /// No-op until started.
    pub fn update(&mut self, delta: f32, ctx: &mut Ctx) {
        let Some(current) = self.current.as_deref() else {
            return;
        };

        let transition = match self
            .states
            .get_mut(current)
            .and_then(|s| s.on_update.as_mut())
        {
            Some(hook) => hook(ctx, delta),
            None => Transition::None,
        };

        if let Transition::To(next) = transition {
            self.transition(&next, ctx);
        }
    }

    fn enter(&mut self, name: &str, ctx: &mut Ctx) {
        if let Some(hook) = self.states.get_mut(name).and_then(|s| s.on_enter.as_mut()) {
            hook(ctx);
        }
    }

    /// Name of the current state, `None` before `start()`.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Check if the machine is in the named state.
    #[must_use]
    pub fn in_state(&self, name: &str) -> bool {
        self.current.as_deref() == Some(name)
    }

    /// Whether `start()` has succeeded.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// Whether a state with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Number of registered states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate over registered state names (unordered).
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }
}

impl<Ctx> Default for StateMachine<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> fmt::Debug for StateMachine<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("states", &self.states.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
