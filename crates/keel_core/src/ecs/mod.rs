//! Entity Component System bookkeeping core.
//!
//! Everything revolves around one [`World`]: it owns the entities, the
//! component storage, the cached [`Family`] queries and the registered
//! [`System`]s and [`EntityListener`]s. Component mutations keep every
//! cached family current inline, so callers never refresh a query by
//! hand. The whole module is single-threaded by construction - handles
//! are `Rc`-based and do not cross threads.

mod component;
mod entity;
mod family;
mod listener;
mod system;
mod system_registry;
mod world;

pub use component::{Component, ComponentKey};
pub use entity::Entity;
pub use family::{Family, FamilyIter, FamilyKey};
pub use listener::{EntityListener, SharedListener};
pub use system::{IteratorSystem, SharedSystem, System};
pub(crate) use system_registry::SystemRegistry;
pub use world::{ComponentTable, World, WorldError};
