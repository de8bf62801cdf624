use std::rc::Rc;

use crate::ecs::SharedSystem;

/// Priority-ordered system list.
///
/// Kept sorted by ascending priority with ties in registration order.
/// The per-tick pass iterates a snapshot, so structural changes made by a
/// running system never affect the tick in flight.
pub(crate) struct SystemRegistry {
    systems: Vec<RegisteredSystem>,
}

struct RegisteredSystem {
    /// Priority captured when the system was registered.
    priority: i32,
    system: SharedSystem,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
        }
    }

    /// Insert keeping ascending priority order, after any existing entries
    /// of equal priority. Never re-sorts the whole list.
    pub fn insert(&mut self, system: SharedSystem) {
        let priority = system.borrow().priority();
        let at = self.systems.partition_point(|s| s.priority <= priority);
        self.systems.insert(at, RegisteredSystem { priority, system });
    }

    /// Remove the first entry holding this exact system, if any.
    pub fn remove(&mut self, system: &SharedSystem) -> bool {
        match self
            .systems
            .iter()
            .position(|s| Rc::ptr_eq(&s.system, system))
        {
            Some(at) => {
                self.systems.remove(at);
                true
            }
            None => false,
        }
    }

    /// Handles for one tick, in execution order.
    pub fn snapshot(&self) -> Vec<SharedSystem> {
        self.systems.iter().map(|s| s.system.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{System, World};
    use std::cell::RefCell;

    struct Fixed(i32);

    impl System for Fixed {
        fn priority(&self) -> i32 {
            self.0
        }

        fn update(&mut self, _world: &mut World, _dt: f32) {}
    }

    fn fixed(priority: i32) -> SharedSystem {
        Rc::new(RefCell::new(Fixed(priority)))
    }

    #[test]
    fn test_insert_sorts_by_priority_with_stable_ties() {
        let first_zero = fixed(0);
        let second_zero = fixed(0);
        let early = fixed(-5);
        let late = fixed(10);

        let mut registry = SystemRegistry::new();
        registry.insert(first_zero.clone());
        registry.insert(second_zero.clone());
        registry.insert(early.clone());
        registry.insert(late.clone());

        let order = registry.snapshot();
        assert_eq!(order.len(), 4);
        assert!(Rc::ptr_eq(&order[0], &early));
        assert!(Rc::ptr_eq(&order[1], &first_zero));
        assert!(Rc::ptr_eq(&order[2], &second_zero));
        assert!(Rc::ptr_eq(&order[3], &late));
    }

    #[test]
    fn test_default_priority_runs_last() {
        struct Defaulted;

        impl System for Defaulted {
            fn update(&mut self, _world: &mut World, _dt: f32) {}
        }

        let defaulted: SharedSystem = Rc::new(RefCell::new(Defaulted));
        let late = fixed(i32::MAX - 1);

        let mut registry = SystemRegistry::new();
        registry.insert(defaulted.clone());
        registry.insert(late.clone());

        let order = registry.snapshot();
        assert!(Rc::ptr_eq(&order[0], &late));
        assert!(Rc::ptr_eq(&order[1], &defaulted));
    }

    #[test]
    fn test_remove_matches_by_handle() {
        let kept = fixed(1);
        let dropped = fixed(1);

        let mut registry = SystemRegistry::new();
        registry.insert(kept.clone());
        registry.insert(dropped.clone());

        assert!(registry.remove(&dropped));
        assert!(!registry.remove(&dropped));
        assert_eq!(registry.len(), 1);
        assert!(Rc::ptr_eq(&registry.snapshot()[0], &kept));
    }
}
