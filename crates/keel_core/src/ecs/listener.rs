// listener.rs - Entity lifecycle notifications

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::{Component, Entity, World};

/// Shared, dynamically typed listener handle as stored by the world.
///
/// Callers keep a clone to deregister later; removal matches by handle
/// identity.
pub type SharedListener = Rc<RefCell<dyn EntityListener>>;

/// Capability notified synchronously on entity admission and removal.
///
/// Callbacks run in registration order, inside the mutating call, after
/// every index and cached family is consistent again. The `world` borrow
/// is read-only: callbacks can query freely but cannot mutate.
pub trait EntityListener {
    /// An entity was admitted via `spawn` or `add_entity`.
    fn entity_added(&mut self, world: &World, entity: Entity);

    /// An entity was despawned. `components` holds everything that was
    /// attached at the moment of removal, empty when it had none.
    fn entity_removed(&mut self, world: &World, entity: Entity, components: &[Box<dyn Component>]);
}
