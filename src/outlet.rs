//! Outlets: typed, non-owning handles into a host world
//!
//! Spawned objects usually end up owned by the host's `hecs::World`, while
//! gameplay code wants to keep pointing at them. An `Outlet<T>` is that
//! pointer: an entity id plus the component type it refers to. hecs entity
//! ids are generation-checked, so once the entity is despawned (even if its
//! slot is reused) the outlet resolves to `None` instead of dangling.

use std::fmt;
use std::marker::PhantomData;

use hecs::{Component, Entity, World};

/// Non-owning handle to a `T` component on some entity.
pub struct Outlet<T> {
    entity: Entity,
    _component: PhantomData<fn() -> T>,
}

impl<T: Component> Outlet<T> {
    /// Point at `entity`'s `T` component.
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            _component: PhantomData,
        }
    }

    /// The referenced entity.
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Borrow the component, if the entity is alive and still has one.
    #[must_use]
    pub fn get<'w>(&self, world: &'w World) -> Option<hecs::Ref<'w, T>> {
        world.get::<&T>(self.entity).ok()
    }

    /// Mutably borrow the component, if the entity is alive and still has one.
    #[must_use]
    pub fn get_mut<'w>(&self, world: &'w World) -> Option<hecs::RefMut<'w, T>> {
        world.get::<&mut T>(self.entity).ok()
    }

    /// Whether the outlet still resolves.
    #[must_use]
    pub fn is_alive(&self, world: &World) -> bool {
        world
            .entity(self.entity)
            .is_ok_and(|entity| entity.has::<T>())
    }
}

impl<T> Clone for Outlet<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Outlet<T> {}

impl<T> PartialEq for Outlet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<T> Eq for Outlet<T> {}

impl<T> std::hash::Hash for Outlet<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.entity.hash(state);
    }
}

impl<T> fmt::Debug for Outlet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Outlet<{}>({:?})", std::any::type_name::<T>(), self.entity)
    }
}

/// A collection of outlets that can shed the dead ones.
#[derive(Debug)]
pub struct OutletSet<T> {
    outlets: Vec<Outlet<T>>,
}

impl<T: Component> OutletSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            outlets: Vec::new(),
        }
    }

    pub fn insert(&mut self, outlet: Outlet<T>) {
        if !self.outlets.contains(&outlet) {
            self.outlets.push(outlet);
        }
    }

    pub fn remove(&mut self, outlet: Outlet<T>) -> bool {
        let before = self.outlets.len();
        self.outlets.retain(|o| *o != outlet);
        self.outlets.len() != before
    }

    /// Drop outlets whose target is gone. Returns how many were pruned.
    pub fn retain_alive(&mut self, world: &World) -> usize {
        let before = self.outlets.len();
        self.outlets.retain(|o| o.is_alive(world));
        before - self.outlets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Outlet<T>> + '_ {
        self.outlets.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outlets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outlets.is_empty()
    }
}

impl<T: Component> Default for OutletSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Bullet {
        speed: f32,
    }

    #[test]
    fn test_outlet_resolves_while_alive() {
        let mut world = World::new();
        let entity = world.spawn((Bullet { speed: 3.0 },));
        let outlet: Outlet<Bullet> = Outlet::new(entity);

        assert!(outlet.is_alive(&world));
        assert_eq!(outlet.get(&world).unwrap().speed, 3.0);

        outlet.get_mut(&world).unwrap().speed = 5.0;
        assert_eq!(outlet.get(&world).unwrap().speed, 5.0);
    }

    #[test]
    fn test_outlet_nulls_after_despawn() {
        let mut world = World::new();
        let entity = world.spawn((Bullet { speed: 1.0 },));
        let outlet: Outlet<Bullet> = Outlet::new(entity);

        world.despawn(entity).unwrap();
        assert!(!outlet.is_alive(&world));
        assert!(outlet.get(&world).is_none());

        // Slot reuse must not resurrect the old handle
        let _reused = world.spawn((Bullet { speed: 9.0 },));
        assert!(outlet.get(&world).is_none());
    }

    #[test]
    fn test_outlet_requires_component() {
        let mut world = World::new();
        let entity = world.spawn((42_u32,));
        let outlet: Outlet<Bullet> = Outlet::new(entity);

        assert!(!outlet.is_alive(&world));
    }

    #[test]
    fn test_outlet_set_prunes_dead() {
        let mut world = World::new();
        let a = world.spawn((Bullet { speed: 1.0 },));
        let b = world.spawn((Bullet { speed: 2.0 },));

        let mut set = OutletSet::new();
        set.insert(Outlet::<Bullet>::new(a));
        set.insert(Outlet::new(b));
        set.insert(Outlet::new(b));
        assert_eq!(set.len(), 2);

        world.despawn(a).unwrap();
        assert_eq!(set.retain_alive(&world), 1);
        assert_eq!(set.iter().next().map(|o| o.entity()), Some(b));
    }
}
