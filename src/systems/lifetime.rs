//! Lifetime system - the per-tick maintenance/destruction pass.
//!
//! Actors carrying a `Lifetime` tick down and are destroyed on expiry.
//! Destruction releases the actor's physical body back to the adapter, so
//! a transient actor never leaves an orphaned collider behind.

use crate::components::{BodyRef, Lifetime};
use crate::physics::PhysicsWorld;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;

/// System that expires `Lifetime` actors. Runs last in the tick so every
/// other system saw a consistent world this tick.
pub fn lifetime_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    mut physics: ResMut<PhysicsWorld>,
    mut query: Query<(Entity, &mut Lifetime, Option<&BodyRef>)>,
) {
    let delta = dt.0;
    for (entity, mut lifetime, body) in query.iter_mut() {
        lifetime.0 -= delta;
        if lifetime.0 <= 0.0 {
            if let Some(body) = body {
                physics.remove_body(body.0);
            }
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lifetime_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(PhysicsWorld::new());

        let mut schedule = Schedule::default();
        schedule.add_systems(lifetime_system);
        (world, schedule)
    }

    #[test]
    fn test_expired_actor_is_destroyed() {
        let (mut world, mut schedule) = lifetime_world();
        let entity = world.spawn(Lifetime(2.0)).id();

        schedule.run(&mut world);
        assert!(world.entities().contains(entity), "still one second left");

        schedule.run(&mut world);
        assert!(!world.entities().contains(entity), "expired actor removed");
    }

    #[test]
    fn test_expiry_releases_the_body() {
        let (mut world, mut schedule) = lifetime_world();
        let handle = world
            .resource_mut::<PhysicsWorld>()
            .create_character_body(0.0, 0.0, 0.5, 1.0);
        world.spawn((Lifetime(0.5), BodyRef(handle)));

        schedule.run(&mut world);

        let physics = world.resource::<PhysicsWorld>();
        assert!(!physics.contains(handle));
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_actors_without_lifetime_are_untouched() {
        let (mut world, mut schedule) = lifetime_world();
        let keeper = world.spawn_empty().id();

        for _ in 0..10 {
            schedule.run(&mut world);
        }
        assert!(world.entities().contains(keeper));
    }
}
