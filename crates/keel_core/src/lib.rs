//! Keel Engine Core
//!
//! Contains the fundamental simulation systems:
//! - Entity Component System (ECS) with live family queries
//! - Priority-ordered system scheduling
//! - Entity lifecycle notifications
//! - Fixed-timestep helpers

pub mod ecs;
pub mod time;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
