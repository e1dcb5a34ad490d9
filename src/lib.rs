//! Mingle Cats - Simulation Core
//!
//! A fixed-timestep ECS simulation for a small social/physics game: cats
//! skate around a 2D arena, the player steers one of them, and single cats
//! pair off into couples when they meet. Uses `bevy_ecs` for the
//! entity-component-system architecture and `rapier2d` for rigid-body
//! physics.

pub mod api;
pub mod bridge;
pub mod components;
pub mod physics;
pub mod placement;
pub mod spatial;
pub mod systems;
pub mod world;

pub use api::{SimConfig, SimWorld};
pub use components::*;
pub use physics::{BodyInfo, PhysicsWorld};
pub use placement::PlacementParams;
pub use spatial::{SpatialEntry, SpatialGrid};
pub use systems::*;
pub use world::Snapshot;
