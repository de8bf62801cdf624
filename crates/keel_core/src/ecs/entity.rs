//! Entity identity values
//!
//! An entity is an opaque id token with no data of its own. Ids come from
//! a process-wide monotonic counter, so they stay unique across every
//! [`World`](crate::ecs::World) in the program and a pre-built entity can
//! be admitted into any world later.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque entity identity.
///
/// Equality and hashing are by id value. An `Entity` is only a token:
/// until it is admitted into a world it carries no components and matches
/// no family.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u64);

impl Entity {
    /// Allocate a fresh, process-unique entity id.
    pub fn new() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let a = Entity::new();
        let b = Entity::new();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_identity_equality() {
        let a = Entity::new();
        let copy = a;
        assert_eq!(a, copy);
        assert_eq!(a.id(), copy.id());
    }
}
