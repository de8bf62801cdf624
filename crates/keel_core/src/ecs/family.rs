// family.rs - Cached, live entity query results
//
// A family is the set of entities whose attached component types are a
// superset of a fixed key. The world owns the member set and replaces it
// wholesale whenever a relevant component changes; `Family` values are
// cheap handles onto that set, so a handle obtained once keeps observing
// later updates.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::ecs::{ComponentKey, Entity};

/// Normalized family key: the required component types, sorted and
/// deduplicated so that argument order and repeats never matter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FamilyKey(Vec<ComponentKey>);

impl FamilyKey {
    /// Build a key from the required types.
    pub fn new(keys: &[ComponentKey]) -> Self {
        let mut keys = keys.to_vec();
        keys.sort_unstable();
        keys.dedup();
        Self(keys)
    }

    /// Whether this key requires `key`.
    pub fn contains(&self, key: ComponentKey) -> bool {
        self.0.binary_search(&key).is_ok()
    }

    /// The required component types, sorted.
    pub fn keys(&self) -> &[ComponentKey] {
        &self.0
    }

    /// True for the empty requirement, which every entity satisfies.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Live handle onto one cached query result.
///
/// Cloning a `Family` clones the handle, not the membership: every handle
/// for a key shares the one set that the owning
/// [`World`](crate::ecs::World) maintains. Handles must not outlive the
/// world that produced them in any meaningful sense - once the world is
/// gone the membership is never updated again.
#[derive(Clone)]
pub struct Family {
    key: FamilyKey,
    members: Rc<RefCell<HashSet<Entity>>>,
}

impl Family {
    pub(crate) fn new(key: FamilyKey, members: HashSet<Entity>) -> Self {
        Self {
            key,
            members: Rc::new(RefCell::new(members)),
        }
    }

    /// The normalized key this family is cached under.
    pub fn key(&self) -> &FamilyKey {
        &self.key
    }

    /// Whether `entity` is currently a member.
    pub fn contains(&self, entity: Entity) -> bool {
        self.members.borrow().contains(&entity)
    }

    /// Current member count.
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    /// Whether the family currently has no members.
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// Iterate the membership as observed at the moment of the call.
    ///
    /// The iterator owns a snapshot, so it stays valid while the world is
    /// mutated mid-iteration; the next `iter()` on the same handle sees
    /// the updated membership.
    pub fn iter(&self) -> FamilyIter {
        let snapshot: Vec<Entity> = self.members.borrow().iter().copied().collect();
        FamilyIter {
            entities: snapshot.into_iter(),
        }
    }

    /// Whether two handles share the same cached member set.
    pub fn ptr_eq(a: &Family, b: &Family) -> bool {
        Rc::ptr_eq(&a.members, &b.members)
    }

    /// Replace the membership wholesale.
    pub(crate) fn replace(&self, members: HashSet<Entity>) {
        *self.members.borrow_mut() = members;
    }

    pub(crate) fn insert(&self, entity: Entity) {
        self.members.borrow_mut().insert(entity);
    }

    pub(crate) fn remove(&self, entity: Entity) {
        self.members.borrow_mut().remove(&entity);
    }
}

impl fmt::Debug for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Family")
            .field("key", &self.key)
            .field("members", &self.members.borrow().len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a Family {
    type Item = Entity;
    type IntoIter = FamilyIter;

    fn into_iter(self) -> FamilyIter {
        self.iter()
    }
}

/// Snapshot iterator over a family's members.
pub struct FamilyIter {
    entities: std::vec::IntoIter<Entity>,
}

impl Iterator for FamilyIter {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        self.entities.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug)]
    struct Position;

    #[derive(Debug)]
    struct Velocity;

    crate::define_component!(Position, Velocity);

    fn key_of<C: crate::ecs::Component>() -> ComponentKey {
        ComponentKey::of::<C>()
    }

    #[test]
    fn test_key_is_order_independent() {
        let ab = FamilyKey::new(&[key_of::<Position>(), key_of::<Velocity>()]);
        let ba = FamilyKey::new(&[key_of::<Velocity>(), key_of::<Position>()]);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_key_collapses_duplicates() {
        let single = FamilyKey::new(&[key_of::<Position>()]);
        let repeated = FamilyKey::new(&[key_of::<Position>(), key_of::<Position>()]);
        assert_eq!(single, repeated);
        assert_eq!(repeated.keys().len(), 1);
    }

    #[test]
    fn test_clones_share_membership() {
        let entity = Entity::new();
        let family = Family::new(FamilyKey::new(&[key_of::<Position>()]), HashSet::new());
        let handle = family.clone();
        assert!(Family::ptr_eq(&family, &handle));

        family.insert(entity);
        assert!(handle.contains(entity));
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn test_replace_is_visible_through_old_handles() {
        let before = Entity::new();
        let after = Entity::new();
        let family = Family::new(
            FamilyKey::new(&[key_of::<Position>()]),
            HashSet::from([before]),
        );
        let handle = family.clone();

        family.replace(HashSet::from([after]));
        assert!(!handle.contains(before));
        assert!(handle.contains(after));
    }

    #[test]
    fn test_iter_is_a_snapshot() {
        let a = Entity::new();
        let b = Entity::new();
        let family = Family::new(FamilyKey::new(&[key_of::<Position>()]), HashSet::from([a]));

        let snapshot = family.iter();
        family.insert(b);

        let seen: HashSet<Entity> = snapshot.collect();
        assert_eq!(seen, HashSet::from([a]));

        let seen: HashSet<Entity> = family.iter().collect();
        assert_eq!(seen, HashSet::from([a, b]));
    }
}
