// world.rs - Central ECS coordinator
//
// Owns every entity, all component storage, the family cache and the
// system/listener lists. All consistency propagation happens inline in the
// mutating call: by the time any public method returns - and before any
// listener runs - the per-entity index, the per-type reverse index and
// every cached family agree with each other.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ecs::{
    Component, ComponentKey, Entity, Family, FamilyKey, SharedListener, SharedSystem,
    SystemRegistry,
};

/// Errors surfaced by world bookkeeping operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The entity was never admitted into this world, or was already
    /// despawned. Applies uniformly to `despawn` and to component
    /// mutation; the world never admits defensively.
    #[error("entity {0:?} is not present in this world")]
    NoSuchEntity(Entity),
}

/// Per-type reverse index: every entity currently carrying one component
/// type, together with the owned value.
pub type ComponentTable = HashMap<Entity, Box<dyn Component>>;

/// The central coordinator owning all ECS state.
///
/// Several independent worlds can coexist; nothing is shared between
/// instances except the process-wide entity id counter.
pub struct World {
    /// Admitted entities and the component types attached to each.
    entities: HashMap<Entity, HashSet<ComponentKey>>,
    /// Per-type reverse index owning the component values.
    components: HashMap<ComponentKey, ComponentTable>,
    /// Materialized queries, keyed by normalized required-type set.
    families: HashMap<FamilyKey, Family>,
    systems: SystemRegistry,
    listeners: Vec<SharedListener>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            components: HashMap::new(),
            families: HashMap::new(),
            systems: SystemRegistry::new(),
            listeners: Vec::new(),
        }
    }

    // --- entity lifecycle ---

    /// Create a fresh entity, admit it and notify listeners.
    pub fn spawn(&mut self) -> Entity {
        self.add_entity(Entity::new())
    }

    /// Admit a pre-built entity with an empty component set.
    ///
    /// Idempotent: admitting an entity that is already present neither
    /// duplicates state nor re-fires `entity_added`.
    pub fn add_entity(&mut self, entity: Entity) -> Entity {
        if self.entities.contains_key(&entity) {
            return entity;
        }
        self.entities.insert(entity, HashSet::new());
        // The empty requirement is satisfied by every admitted entity.
        if let Some(family) = self.families.get(&FamilyKey::new(&[])) {
            family.insert(entity);
        }
        trace!(?entity, "admitted entity");
        self.notify_added(entity);
        entity
    }

    /// Remove an entity together with everything attached to it.
    ///
    /// Detaches every component, re-evaluates the families keyed on the
    /// detached types, drops the entity from the admitted set, fires
    /// `entity_removed` exactly once and yields the detached values.
    pub fn despawn(&mut self, entity: Entity) -> Result<Vec<Box<dyn Component>>, WorldError> {
        let attached = self
            .entities
            .remove(&entity)
            .ok_or(WorldError::NoSuchEntity(entity))?;

        let mut removed = Vec::with_capacity(attached.len());
        for key in &attached {
            if let Some(table) = self.components.get_mut(key) {
                if let Some(value) = table.remove(&entity) {
                    removed.push(value);
                }
            }
        }
        for key in &attached {
            self.refresh_families_with(*key);
        }
        if let Some(family) = self.families.get(&FamilyKey::new(&[])) {
            family.remove(entity);
        }
        debug!(?entity, components = removed.len(), "despawned entity");
        self.notify_removed(entity, &removed);
        Ok(removed)
    }

    /// Whether `entity` is currently admitted.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of admitted entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // --- components ---

    /// Attach `component` to `entity`, replacing any prior value of the
    /// same type, and re-evaluate the families that depend on that type.
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> Result<(), WorldError> {
        self.insert_boxed(entity, Box::new(component))
    }

    /// Type-erased variant of [`insert`](World::insert).
    pub fn insert_boxed(
        &mut self,
        entity: Entity,
        component: Box<dyn Component>,
    ) -> Result<(), WorldError> {
        let key = component.key();
        let attached = self
            .entities
            .get_mut(&entity)
            .ok_or(WorldError::NoSuchEntity(entity))?;
        attached.insert(key);
        self.components.entry(key).or_default().insert(entity, component);
        trace!(?entity, component = key.name(), "attached component");
        self.refresh_families_with(key);
        Ok(())
    }

    /// Detach the `C` component from `entity`, yielding its value.
    ///
    /// `Ok(None)` when no such component was attached; only a missing
    /// entity is an error.
    pub fn remove<C: Component>(
        &mut self,
        entity: Entity,
    ) -> Result<Option<Box<dyn Component>>, WorldError> {
        self.remove_by_key(entity, ComponentKey::of::<C>())
    }

    /// Key-driven variant of [`remove`](World::remove).
    pub fn remove_by_key(
        &mut self,
        entity: Entity,
        key: ComponentKey,
    ) -> Result<Option<Box<dyn Component>>, WorldError> {
        let attached = self
            .entities
            .get_mut(&entity)
            .ok_or(WorldError::NoSuchEntity(entity))?;
        attached.remove(&key);
        let removed = self
            .components
            .get_mut(&key)
            .and_then(|table| table.remove(&entity));
        if removed.is_some() {
            trace!(?entity, component = key.name(), "detached component");
            self.refresh_families_with(key);
        }
        Ok(removed)
    }

    /// Borrow the `C` component attached to `entity`.
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.components
            .get(&ComponentKey::of::<C>())?
            .get(&entity)?
            .downcast_ref::<C>()
    }

    /// Mutably borrow the `C` component attached to `entity`.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.components
            .get_mut(&ComponentKey::of::<C>())?
            .get_mut(&entity)?
            .downcast_mut::<C>()
    }

    /// Snapshot of every component value currently attached to `entity`.
    pub fn components_of(&self, entity: Entity) -> Vec<&dyn Component> {
        let Some(attached) = self.entities.get(&entity) else {
            return Vec::new();
        };
        attached
            .iter()
            .filter_map(|key| {
                self.components
                    .get(key)
                    .and_then(|table| table.get(&entity))
                    .map(|boxed| &**boxed)
            })
            .collect()
    }

    /// Direct read access to one type's reverse index.
    pub fn component_table(&self, key: ComponentKey) -> Option<&ComponentTable> {
        self.components.get(&key)
    }

    /// Iterate every `(entity, component)` pair for component type `C`.
    ///
    /// This reads the per-type reverse index directly - no family join.
    pub fn components_of_type<C: Component>(&self) -> impl Iterator<Item = (Entity, &C)> + '_ {
        self.components
            .get(&ComponentKey::of::<C>())
            .into_iter()
            .flat_map(|table| {
                table
                    .iter()
                    .filter_map(|(entity, boxed)| Some((*entity, boxed.downcast_ref::<C>()?)))
            })
    }

    /// Mutable variant of [`components_of_type`](World::components_of_type).
    pub fn components_of_type_mut<C: Component>(
        &mut self,
    ) -> impl Iterator<Item = (Entity, &mut C)> + '_ {
        self.components
            .get_mut(&ComponentKey::of::<C>())
            .into_iter()
            .flat_map(|table| {
                table
                    .iter_mut()
                    .filter_map(|(entity, boxed)| Some((*entity, boxed.downcast_mut::<C>()?)))
            })
    }

    // --- families ---

    /// Cached family for the given required component types.
    ///
    /// The key is order-independent and duplicate-free: `family(&[a, b])`
    /// and `family(&[b, a])` return handles onto the same live set. A type
    /// never attached to anything contributes an empty index, so the
    /// family is empty - never an error. The returned handle stays current
    /// without re-querying.
    pub fn family(&mut self, keys: &[ComponentKey]) -> Family {
        let key = FamilyKey::new(keys);
        if let Some(family) = self.families.get(&key) {
            return family.clone();
        }
        let members = self.collect_members(&key);
        debug!(family = ?key, members = members.len(), "materialized family");
        let family = Family::new(key.clone(), members);
        self.families.insert(key, family.clone());
        family
    }

    /// Exact member set for `key` under the current indices.
    fn collect_members(&self, key: &FamilyKey) -> HashSet<Entity> {
        if key.is_empty() {
            return self.entities.keys().copied().collect();
        }
        let mut tables = Vec::with_capacity(key.keys().len());
        for component in key.keys() {
            match self.components.get(component) {
                Some(table) => tables.push(table),
                // A type with no attachments intersects to nothing.
                None => return HashSet::new(),
            }
        }
        // Seed from the smallest index and intersect the rest.
        tables.sort_by_key(|table| table.len());
        let Some((first, rest)) = tables.split_first() else {
            return HashSet::new();
        };
        first
            .keys()
            .copied()
            .filter(|entity| rest.iter().all(|table| table.contains_key(entity)))
            .collect()
    }

    /// Recompute and wholesale-replace every cached family whose key
    /// includes `component`.
    fn refresh_families_with(&self, component: ComponentKey) {
        for (key, family) in &self.families {
            if key.contains(component) {
                family.replace(self.collect_members(key));
            }
        }
    }

    // --- systems ---

    /// Register a system, keeping the list sorted by ascending priority
    /// with ties in registration order.
    pub fn add_system(&mut self, system: SharedSystem) {
        self.systems.insert(system);
    }

    /// Deregister the first occurrence of `system`; returns whether an
    /// entry was removed.
    pub fn remove_system(&mut self, system: &SharedSystem) -> bool {
        self.systems.remove(system)
    }

    /// Run one tick: every system in priority order, over a snapshot of
    /// the list taken at tick start.
    ///
    /// Systems that add or remove systems mid-tick affect the next tick
    /// only; the pass in flight neither skips nor duplicates an
    /// invocation. Re-entrant `update` from inside a system is not
    /// supported.
    pub fn update(&mut self, dt: f32) {
        trace!(systems = self.systems.len(), dt, "tick");
        let pass = self.systems.snapshot();
        for system in pass {
            system.borrow_mut().update(self, dt);
        }
    }

    // --- listeners ---

    /// Register a listener; notification order is registration order.
    pub fn add_listener(&mut self, listener: SharedListener) {
        self.listeners.push(listener);
    }

    /// Deregister the first occurrence of `listener`; returns whether an
    /// entry was removed.
    pub fn remove_listener(&mut self, listener: &SharedListener) -> bool {
        match self
            .listeners
            .iter()
            .position(|registered| Rc::ptr_eq(registered, listener))
        {
            Some(at) => {
                self.listeners.remove(at);
                true
            }
            None => false,
        }
    }

    fn notify_added(&self, entity: Entity) {
        let listeners = self.listeners.clone();
        for listener in listeners {
            listener.borrow_mut().entity_added(self, entity);
        }
    }

    fn notify_removed(&self, entity: Entity, components: &[Box<dyn Component>]) {
        let listeners = self.listeners.clone();
        for listener in listeners {
            listener.borrow_mut().entity_removed(self, entity, components);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch a cached [`Family`] for a list of component types.
///
/// # Example
/// ```ignore
/// let movers = family!(world, Position, Velocity);
/// ```
#[macro_export]
macro_rules! family {
    ($world:expr $(, $ty:ty)+ $(,)?) => {
        $world.family(&[$($crate::ecs::ComponentKey::of::<$ty>()),+])
    };
}
