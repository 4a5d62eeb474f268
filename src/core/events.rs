//! Event Hub for Decoupled Communication
//!
//! An explicit publish/subscribe registry. Components never reach for a
//! global hub: whoever owns the game loop owns the `EventHub` and passes it
//! (or events for it) around.
//!
//! Two delivery modes:
//!
//! - `emit()` dispatches immediately to every subscriber, in subscription order
//! - `queue()` defers the event until the next `flush()`, which is how
//!   events produced inside component callbacks reach the hub
//!
//! # Example
//!
//! ```ignore
//! let mut hub = EventHub::new();
//! let id = hub.subscribe(|event: &GameEvent| {
//!     if let GameEvent::Died { entity } = event {
//!         log::info!("{entity:?} died");
//!     }
//! });
//!
//! hub.queue(GameEvent::Died { entity });
//! hub.flush();   // subscriber runs here
//! hub.unsubscribe(id);
//! ```

use std::collections::VecDeque;
use std::fmt;

use hecs::Entity;
use smallvec::SmallVec;

use crate::combat::Phase;

// ============================================================================
// Event Types
// ============================================================================

/// Gameplay notifications produced by the kernel's components.
///
/// The `#[non_exhaustive]` attribute allows adding new variants without
/// breaking downstream code that uses wildcard patterns.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Health Events
    // -------------------------------------------------------------------------
    /// An entity lost hit points.
    Damaged {
        /// The damaged entity
        entity: Entity,
        /// Hit points before
        old: f32,
        /// Hit points after
        new: f32,
    },

    /// An entity regained hit points.
    Healed {
        /// The healed entity
        entity: Entity,
        /// Hit points before
        old: f32,
        /// Hit points after
        new: f32,
    },

    /// An entity's health reached zero.
    Died {
        /// The dead entity
        entity: Entity,
    },

    // -------------------------------------------------------------------------
    // Lifecycle Events
    // -------------------------------------------------------------------------
    /// A spawner produced a new entity.
    Spawned {
        /// The new entity
        entity: Entity,
    },

    // -------------------------------------------------------------------------
    // Behavior Events
    // -------------------------------------------------------------------------
    /// A state machine changed state.
    StateChanged {
        /// Entity whose machine transitioned
        entity: Entity,
        /// Previous state name (empty if the machine was unstarted)
        from: String,
        /// New state name
        to: String,
    },

    /// An ability entered a new phase.
    AbilityPhase {
        /// Entity running the ability
        entity: Entity,
        /// Ability name
        ability: String,
        /// Phase entered
        phase: Phase,
    },
}

// ============================================================================
// Event Hub
// ============================================================================

/// Handle returned by `subscribe()`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// Observer registry with immediate and deferred delivery.
///
/// # Performance
///
/// - Subscribe: O(1) amortized
/// - Unsubscribe: O(n) in subscribers
/// - Emit: O(n) in subscribers
pub struct EventHub<E = GameEvent> {
    /// Subscribers in registration order
    subscribers: SmallVec<[(SubscriptionId, Handler<E>); 4]>,
    /// Events waiting for the next flush
    pending: VecDeque<E>,
    /// Events being delivered by the current flush
    processing: VecDeque<E>,
    next_id: u64,
}

impl<E> EventHub<E> {
    /// Default initial capacity for the event queues.
    const DEFAULT_CAPACITY: usize = 64;

    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: SmallVec::new(),
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            next_id: 0,
        }
    }

    /// Register a handler for every event.
    pub fn subscribe(&mut self, handler: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if `id` wasn't subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to every subscriber now.
    pub fn emit(&mut self, event: &E) {
        for (_, handler) in &mut self.subscribers {
            handler(event);
        }
    }

    /// Defer `event` until the next `flush()`.
    #[inline]
    pub fn queue(&mut self, event: E) {
        self.pending.push_back(event);
    }

    /// Queue several events at once.
    pub fn queue_all(&mut self, events: impl IntoIterator<Item = E>) {
        self.pending.extend(events);
    }

    /// Deliver every queued event in FIFO order.
    ///
    /// Returns the number of events delivered.
    pub fn flush(&mut self) -> usize {
        std::mem::swap(&mut self.pending, &mut self.processing);

        let count = self.processing.len();
        while let Some(event) = self.processing.pop_front() {
            for (_, handler) in &mut self.subscribers {
                handler(&event);
            }
        }

        if count > 0 {
            log::trace!("Flushed {count} events to {} subscribers", self.subscribers.len());
        }
        count
    }

    /// Number of events waiting for `flush()`.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop queued events without delivering them.
    ///
    /// Useful for scene transitions or resetting game state.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.subscribers.len())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Helper to create a test entity
    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    fn recorder(hub: &mut EventHub<u32>, tag: &'static str) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        hub.subscribe(move |n| sink.borrow_mut().push(format!("{tag}:{n}")));
        seen
    }

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let mut hub = EventHub::new();
        let a = recorder(&mut hub, "a");
        let b = recorder(&mut hub, "b");

        hub.emit(&7);

        assert_eq!(*a.borrow(), vec!["a:7"]);
        assert_eq!(*b.borrow(), vec!["b:7"]);
    }

    #[test]
    fn test_subscription_order() {
        let mut hub: EventHub<u32> = EventHub::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = Rc::clone(&seen);
            hub.subscribe(move |_| sink.borrow_mut().push(tag));
        }

        hub.emit(&0);
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_queue_defers_until_flush() {
        let mut hub = EventHub::new();
        let seen = recorder(&mut hub, "q");

        hub.queue(1);
        hub.queue(2);
        assert!(seen.borrow().is_empty());
        assert_eq!(hub.pending_count(), 2);

        assert_eq!(hub.flush(), 2);
        assert_eq!(*seen.borrow(), vec!["q:1", "q:2"]);
        assert_eq!(hub.pending_count(), 0);
        assert_eq!(hub.flush(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let mut hub: EventHub<u32> = EventHub::new();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let id = hub.subscribe(move |_| *sink.borrow_mut() += 1);

        hub.emit(&1);
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.emit(&2);

        assert_eq!(*seen.borrow(), 1);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_clear_pending() {
        let mut hub = EventHub::new();
        let seen = recorder(&mut hub, "c");

        hub.queue_all([1, 2, 3]);
        hub.clear_pending();

        assert_eq!(hub.flush(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_game_event_dispatch() {
        let entity = test_entity();
        let mut hub = EventHub::new();
        let deaths = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deaths);
        hub.subscribe(move |event: &GameEvent| {
            if let GameEvent::Died { entity } = event {
                sink.borrow_mut().push(*entity);
            }
        });

        hub.queue(GameEvent::Damaged {
            entity,
            old: 10.0,
            new: 0.0,
        });
        hub.queue(GameEvent::Died { entity });
        hub.flush();

        assert_eq!(*deaths.borrow(), vec![entity]);
    }
}
