//! Object Pool for Expensive-to-Construct Objects
//!
//! Recycles instances through a free list instead of rebuilding them.
//! Objects are handed out by value: while acquired, the caller owns them
//! outright and the pool keeps no reference until `release` returns them.
//!
//! # Example
//!
//! ```ignore
//! let mut pool = ObjectPool::new(Bullet::default).with_reset(Bullet::reset);
//! pool.preload(32);
//!
//! let bullet = pool.acquire();   // reuses a preloaded instance
//! // ... bullet flies, hits something ...
//! pool.release(bullet);          // reset, then back on the free list
//! ```
//!
//! # Ordering
//!
//! The free list is LIFO: the most recently released object is the next
//! one handed out.

use std::fmt;

type Factory<T> = Box<dyn FnMut() -> T>;
type ResetHook<T> = Box<dyn FnMut(&mut T)>;

/// A free-list backed recycler.
///
/// # Performance Characteristics
///
/// | Operation | Time Complexity           |
/// |-----------|---------------------------|
/// | `acquire` | O(1) + factory on a miss  |
/// | `release` | O(1) + reset hook         |
/// | `preload` | O(n) factory calls        |
pub struct ObjectPool<T> {
    /// Constructed instances not currently on loan
    free: Vec<T>,
    /// Builds new instances when the free list is empty
    factory: Factory<T>,
    /// Run on every released object before it goes back on the free list
    reset: Option<ResetHook<T>>,
    /// Optional cap on the free list; releases beyond it drop the object
    max_free: Option<usize>,
    /// Objects currently on loan
    in_use: usize,
    /// Total factory invocations
    created: usize,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool around a factory.
    #[must_use]
    pub fn new(factory: impl FnMut() -> T + 'static) -> Self {
        Self {
            free: Vec::new(),
            factory: Box::new(factory),
            reset: None,
            max_free: None,
            in_use: 0,
            created: 0,
        }
    }

    /// Set the hook that scrubs an object on release.
    #[must_use]
    pub fn with_reset(mut self, reset: impl FnMut(&mut T) + 'static) -> Self {
        self.reset = Some(Box::new(reset));
        self
    }

    /// Cap the number of idle objects kept around.
    #[must_use]
    pub fn with_max_free(mut self, max_free: usize) -> Self {
        self.max_free = Some(max_free);
        self.free.truncate(max_free);
        self
    }

    /// Construct `count` objects up front and put them on the free list.
    ///
    /// Respects `max_free` if set.
    pub fn preload(&mut self, count: usize) {
        let count = match self.max_free {
            Some(max) => count.min(max.saturating_sub(self.free.len())),
            None => count,
        };

        self.free.reserve(count);
        for _ in 0..count {
            let obj = self.construct();
            self.free.push(obj);
        }

        log::debug!(
            "Pool preloaded {count} objects ({} free)",
            self.free.len()
        );
    }

    /// Take an object, reusing a free one when possible.
    pub fn acquire(&mut self) -> T {
        self.in_use += 1;
        match self.free.pop() {
            Some(obj) => obj,
            None => {
                log::trace!("Pool miss, constructing (created so far: {})", self.created);
                self.construct()
            }
        }
    }

    /// Return an object to the pool.
    ///
    /// The object must have come from `acquire` on this pool and must not be
    /// released twice. The pool can't check provenance; in debug builds,
    /// releasing more objects than were acquired panics.
    pub fn release(&mut self, mut obj: T) {
        debug_assert!(
            self.in_use > 0,
            "ObjectPool::release called with no objects on loan"
        );
        self.in_use = self.in_use.saturating_sub(1);

        if let Some(reset) = self.reset.as_mut() {
            reset(&mut obj);
        }

        if self.max_free.is_some_and(|max| self.free.len() >= max) {
            return;
        }
        self.free.push(obj);
    }

    /// Drop every idle object. Loans are unaffected.
    pub fn clear(&mut self) {
        self.free.clear();
    }

    fn construct(&mut self) -> T {
        self.created += 1;
        (self.factory)()
    }

    /// Number of idle objects ready to hand out.
    #[must_use]
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of objects currently on loan.
    #[must_use]
    #[inline]
    pub const fn in_use(&self) -> usize {
        self.in_use
    }

    /// Total objects the factory has built.
    #[must_use]
    #[inline]
    pub const fn created(&self) -> usize {
        self.created
    }

    /// Free-list cap, if any.
    #[must_use]
    #[inline]
    pub const fn max_free(&self) -> Option<usize> {
        self.max_free
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPool")
            .field("free", &self.free.len())
            .field("in_use", &self.in_use)
            .field("created", &self.created)
            .field("max_free", &self.max_free)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct TestObject {
        id: u32,
        hits: u32,
    }

    /// Pool whose factory hands out sequential ids and counts its calls.
    fn counting_pool() -> (ObjectPool<TestObject>, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let pool = ObjectPool::new(move || {
            counter.set(counter.get() + 1);
            TestObject {
                id: counter.get(),
                hits: 0,
            }
        });
        (pool, calls)
    }

    #[test]
    fn test_preload_then_acquire_uses_no_factory_calls() {
        let (mut pool, calls) = counting_pool();

        pool.preload(5);
        assert_eq!(calls.get(), 5);

        let objects: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        assert_eq!(calls.get(), 5);

        let mut ids: Vec<u32> = objects.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5, "All acquired objects should be distinct");

        pool.acquire();
        assert_eq!(calls.get(), 6);
        assert_eq!(pool.created(), 6);
    }

    #[test]
    fn test_release_then_acquire_returns_same_object() {
        let (mut pool, _) = counting_pool();

        let a = pool.acquire();
        let b = pool.acquire();
        let b_id = b.id;

        pool.release(a);
        pool.release(b);

        // LIFO: last released comes back first
        assert_eq!(pool.acquire().id, b_id);
    }

    #[test]
    fn test_free_list_order() {
        let (mut pool, _) = counting_pool();
        pool.preload(3);

        let first = pool.acquire();
        let second = pool.acquire();
        let third = pool.acquire();
        let order = [second.id, first.id, third.id];

        pool.release(second);
        pool.release(first);
        pool.release(third);

        let reacquired: Vec<u32> = (0..3).map(|_| pool.acquire().id).collect();
        assert_eq!(reacquired, vec![order[2], order[1], order[0]]);
    }

    #[test]
    fn test_reset_hook_runs_on_release() {
        let (pool, _) = counting_pool();
        let mut pool = pool.with_reset(|obj| obj.hits = 0);

        let mut obj = pool.acquire();
        obj.hits = 7;
        pool.release(obj);

        assert_eq!(pool.acquire().hits, 0);
    }

    #[test]
    fn test_loan_accounting() {
        let (mut pool, _) = counting_pool();
        pool.preload(2);

        let a = pool.acquire();
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.free_count(), 1);

        pool.release(a);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_max_free_drops_excess() {
        let (pool, _) = counting_pool();
        let mut pool = pool.with_max_free(1);

        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);

        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_preload_respects_cap() {
        let (pool, calls) = counting_pool();
        let mut pool = pool.with_max_free(3);

        pool.preload(10);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_clear_keeps_loans() {
        let (mut pool, _) = counting_pool();
        pool.preload(4);
        let _held = pool.acquire();

        pool.clear();
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.in_use(), 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "no objects on loan")]
    fn test_over_release_asserts_in_debug() {
        let (mut pool, _) = counting_pool();
        pool.release(TestObject { id: 99, hits: 0 });
    }
}
