// system.rs - Per-tick behaviors

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::{Entity, Family, World};

/// Shared, dynamically typed system handle as stored by the world.
///
/// Callers keep a clone to deregister later; removal matches by handle
/// identity.
pub type SharedSystem = Rc<RefCell<dyn System>>;

/// One behavior invoked once per tick.
///
/// Systems run in ascending [`priority`](System::priority) order; ties
/// run in registration order. The priority is read once at registration
/// and must not change afterwards.
pub trait System {
    /// Execution order; lower runs earlier. The default is the maximum
    /// value, i.e. last.
    fn priority(&self) -> i32 {
        i32::MAX
    }

    /// Advance this behavior by `dt` (non-negative, caller-defined units).
    fn update(&mut self, world: &mut World, dt: f32);
}

/// Convenience shape for systems that process every member of one family.
///
/// Implementors hold a [`Family`] handle, usually obtained once at setup,
/// and get a [`System`] implementation that iterates a membership snapshot
/// each tick and delegates to [`process`](IteratorSystem::process).
/// Because the snapshot is taken at tick start, `process` may freely
/// mutate the world; members added or removed mid-tick are picked up on
/// the next tick.
pub trait IteratorSystem {
    /// Execution order; see [`System::priority`].
    fn priority(&self) -> i32 {
        i32::MAX
    }

    /// The family whose members this system processes.
    fn family(&self) -> &Family;

    /// Process one member entity.
    fn process(&mut self, world: &mut World, dt: f32, entity: Entity);
}

impl<T: IteratorSystem> System for T {
    fn priority(&self) -> i32 {
        IteratorSystem::priority(self)
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        let members = self.family().iter();
        for entity in members {
            self.process(world, dt, entity);
        }
    }
}
