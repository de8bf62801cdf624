//! Keel Engine Runtime
//!
//! Minimal binary that links the core and drives a demo simulation loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use glam::Vec2;

use keel_core::ecs::{Component, Entity, EntityListener, Family, IteratorSystem, World};
use keel_core::time::FixedTimestep;
use keel_core::{define_component, family};

#[derive(Debug, Clone, Copy)]
struct Position(Vec2);

#[derive(Debug, Clone, Copy)]
struct Velocity(Vec2);

define_component!(Position, Velocity);

/// Logs entity lifecycle events as they happen.
struct LifecycleLog;

impl EntityListener for LifecycleLog {
    fn entity_added(&mut self, _world: &World, entity: Entity) {
        tracing::info!(?entity, "entity joined the simulation");
    }

    fn entity_removed(&mut self, _world: &World, entity: Entity, components: &[Box<dyn Component>]) {
        tracing::info!(?entity, components = components.len(), "entity left the simulation");
    }
}

/// Integrates positions from velocities each tick.
struct Movement {
    family: Family,
}

impl IteratorSystem for Movement {
    fn priority(&self) -> i32 {
        0
    }

    fn family(&self) -> &Family {
        &self.family
    }

    fn process(&mut self, world: &mut World, dt: f32, entity: Entity) {
        let Some(velocity) = world.get::<Velocity>(entity).map(|v| v.0) else {
            return;
        };
        if let Some(position) = world.get_mut::<Position>(entity) {
            position.0 += velocity * dt;
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Keel Engine v{}", keel_core::VERSION);

    let mut world = World::new();
    world.add_listener(Rc::new(RefCell::new(LifecycleLog)));

    let movement = Movement {
        family: family!(world, Position, Velocity),
    };
    world.add_system(Rc::new(RefCell::new(movement)));

    for lane in 0..3 {
        let entity = world.spawn();
        world.insert(entity, Position(Vec2::new(0.0, lane as f32)))?;
        world.insert(entity, Velocity(Vec2::new(1.0 + lane as f32, 0.5)))?;
    }

    // Drive two simulated seconds of fixed ticks.
    let mut clock = FixedTimestep::at_tick_rate();
    clock.advance(Duration::from_secs(2));
    while let Some(dt) = clock.drain() {
        world.update(dt);
    }

    for (entity, position) in world.components_of_type::<Position>() {
        tracing::info!(?entity, x = position.0.x, y = position.0.y, "final position");
    }
    tracing::info!(ticks = clock.tick_count(), "simulation complete");

    Ok(())
}
