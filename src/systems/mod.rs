//! ECS Systems for the Mingle Cats simulation.
//!
//! Systems contain the game logic that operates on components. They run
//! in a fixed, chained order each tick so every system reads a consistent
//! world:
//!
//! 1. `wander_system` - AI wish directions for mingling cats (player input
//!    arrives from the host between ticks)
//! 2. `movement_system` - wish directions become body velocities
//! 3. `physics_step_system` - rapier integrates positions and collisions
//! 4. `sync_transform_system` - body state mirrored into `Position`/`Velocity`
//! 5. `spatial_grid_update_system` - proximity grid rebuilt
//! 6. `pairing_system` - singles in range become couples
//! 7. `trail_system` - cosmetic emission timers
//! 8. `lifetime_system` - expired actors destroyed, bodies released

pub mod ai;
pub mod lifetime;
pub mod movement;
pub mod pairing;

pub use ai::*;
pub use lifetime::*;
pub use movement::*;
pub use pairing::*;
