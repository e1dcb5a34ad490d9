//! Movement controller - converts wish directions into body velocities.
//!
//! Characters do not set positions directly: the controller shapes the
//! body's velocity (acceleration toward the wish, friction when coasting)
//! and the physics step integrates position, so collisions with other
//! bodies still affect motion.

use crate::components::*;
use crate::physics::PhysicsWorld;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Resource containing elapsed simulation time in seconds.
#[derive(Resource, Default)]
pub struct SimTime(pub f32);

/// Instantaneous speed multiplier applied by a charged boost.
const BOOST_SPEED_MULTIPLIER: f32 = 2.5;

/// Minimum speed at which a trail puff is worth emitting.
const TRAIL_MIN_SPEED: f32 = 1.0;

/// Seconds between trail puffs.
const TRAIL_INTERVAL: f32 = 0.15;

/// Accelerate the velocity toward `speed` along the wish direction.
///
/// The gain per tick is bounded by `acceleration * speed * dt` and by the
/// remaining speed deficit along the wish, so sustained input converges on
/// `speed` and never oscillates past it.
fn accelerate(
    vx: f32,
    vy: f32,
    wish_x: f32,
    wish_y: f32,
    speed: f32,
    acceleration: f32,
    dt: f32,
) -> (f32, f32) {
    let current = vx * wish_x + vy * wish_y;
    let add = speed - current;
    if add <= 0.0 {
        return (vx, vy);
    }

    let gain = (acceleration * speed * dt).min(add);
    let (nvx, nvy) = (vx + wish_x * gain, vy + wish_y * gain);

    // Input never pushes past `speed`; externally imparted velocity
    // (collisions, boosts) is preserved by capping at the larger of the two.
    let pre = (vx * vx + vy * vy).sqrt();
    let post = (nvx * nvx + nvy * nvy).sqrt();
    let cap = speed.max(pre);
    if post > cap {
        let scale = cap / post;
        (nvx * scale, nvy * scale)
    } else {
        (nvx, nvy)
    }
}

/// Apply friction deceleration without ever reversing direction.
///
/// The control floor `stop_speed` keeps the per-tick drop from shrinking
/// with the velocity, so slow motion arrests completely instead of
/// decaying asymptotically.
fn apply_friction(vx: f32, vy: f32, stop_speed: f32, surface_friction: f32, dt: f32) -> (f32, f32) {
    let speed = (vx * vx + vy * vy).sqrt();
    if speed <= 0.0 {
        return (0.0, 0.0);
    }

    let control = speed.max(stop_speed);
    let drop = control * surface_friction * dt;
    if speed <= drop {
        return (0.0, 0.0);
    }

    let scale = (speed - drop) / speed;
    (vx * scale, vy * scale)
}

/// System driving every character's body velocity from its input.
///
/// An active dizzy effect zeroes the wish (friction only) and counts down;
/// the effect component is removed exactly when the countdown expires.
pub fn movement_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    time: Res<SimTime>,
    mut physics: ResMut<PhysicsWorld>,
    mut query: Query<
        (
            Entity,
            &mut CharacterInput,
            &mut Movement,
            Option<&mut MovementStatusEffect>,
            &BodyRef,
        ),
        With<Character>,
    >,
) {
    let delta = dt.0;
    let now = time.0;

    for (entity, mut input, mut movement, effect, body) in query.iter_mut() {
        let (mut vx, mut vy) = physics.linvel(body.0);

        let wants_boost = input.wants_boost;
        input.wants_boost = false;

        let mut dizzy = false;
        if let Some(mut effect) = effect {
            dizzy = true;
            let MovementStatusEffect::Dizzy { countdown } = &mut *effect;
            *countdown -= delta;
            if *countdown <= 0.0 {
                commands.entity(entity).remove::<MovementStatusEffect>();
            }
        }

        let (wish_x, wish_y) = if dizzy {
            (0.0, 0.0)
        } else {
            (input.wish_x, input.wish_y)
        };
        let has_wish = wish_x != 0.0 || wish_y != 0.0;

        if !dizzy && wants_boost && movement.boost_ready(now) {
            let (dir_x, dir_y) = if has_wish {
                (wish_x, wish_y)
            } else {
                let speed = (vx * vx + vy * vy).sqrt();
                if speed > 0.0 {
                    (vx / speed, vy / speed)
                } else {
                    (0.0, 0.0)
                }
            };
            if dir_x != 0.0 || dir_y != 0.0 {
                let burst = movement.speed * BOOST_SPEED_MULTIPLIER;
                vx = dir_x * burst;
                vy = dir_y * burst;
                movement.last_boost_time = now;
            }
        }

        if has_wish {
            (vx, vy) = accelerate(
                vx,
                vy,
                wish_x,
                wish_y,
                movement.speed,
                movement.acceleration,
                delta,
            );
        } else {
            (vx, vy) = apply_friction(
                vx,
                vy,
                movement.stop_speed,
                movement.surface_friction,
                delta,
            );
        }

        physics.set_linvel(body.0, vx, vy);
    }
}

/// System updating cosmetic trail timers from synced velocities.
pub fn trail_system(time: Res<SimTime>, mut query: Query<(&Velocity, &mut Trail)>) {
    let now = time.0;
    for (vel, mut trail) in query.iter_mut() {
        if vel.magnitude() >= TRAIL_MIN_SPEED && now - trail.last_spawn_time >= TRAIL_INTERVAL {
            trail.last_spawn_time = now;
            trail.emit_pending = true;
        }
    }
}

/// Apply a dizzy effect to an actor. This is the entry point external
/// interaction triggers (shoves) call into; re-applying refreshes the
/// countdown.
pub fn apply_dizzy(world: &mut World, entity: Entity, countdown: f32) {
    if let Ok(mut e) = world.get_entity_mut(entity) {
        e.insert(MovementStatusEffect::dizzy(countdown));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_world() -> (World, Schedule, Entity) {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 60.0));
        world.insert_resource(SimTime(0.0));

        let mut physics = PhysicsWorld::new();
        let handle = physics.create_character_body(0.0, 0.0, 0.75, 1.0);
        world.insert_resource(physics);

        let entity = world
            .spawn((
                Character,
                CharacterInput::default(),
                Movement::player(),
                BodyRef(handle),
            ))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        (world, schedule, entity)
    }

    fn body_speed(world: &mut World, entity: Entity) -> f32 {
        let body = *world.get::<BodyRef>(entity).unwrap();
        let (vx, vy) = world.resource::<PhysicsWorld>().linvel(body.0);
        (vx * vx + vy * vy).sqrt()
    }

    #[test]
    fn test_sustained_input_converges_on_speed() {
        let (mut world, mut schedule, entity) = test_world();
        world
            .get_mut::<CharacterInput>(entity)
            .unwrap()
            .set_wish(1.0, 0.0);

        let mut last_speed = 0.0;
        for _ in 0..60 {
            // Re-assert the wish each tick, like a held key.
            world
                .get_mut::<CharacterInput>(entity)
                .unwrap()
                .set_wish(1.0, 0.0);
            schedule.run(&mut world);

            let speed = body_speed(&mut world, entity);
            assert!(
                speed >= last_speed - 1e-4,
                "ramp-up must be monotonic: {} -> {}",
                last_speed,
                speed
            );
            assert!(speed <= 10.0 + 1e-3, "speed must never exceed the max");
            last_speed = speed;
        }

        assert_relative_eq!(last_speed, 10.0, max_relative = 0.01);
    }

    #[test]
    fn test_friction_never_reverses_direction() {
        for &(vx, vy) in &[(5.0, 0.0), (-3.0, 4.0), (0.2, -0.1), (0.0, 8.0)] {
            let mut cx = vx;
            let mut cy = vy;
            for _ in 0..200 {
                let (nx, ny) = apply_friction(cx, cy, 3.0, 3.0, 1.0 / 60.0);
                assert!(
                    nx * vx + ny * vy >= 0.0,
                    "friction flipped direction for ({}, {})",
                    vx,
                    vy
                );
                cx = nx;
                cy = ny;
            }
            assert_eq!((cx, cy), (0.0, 0.0), "friction must fully arrest motion");
        }
    }

    #[test]
    fn test_friction_arrests_below_stop_speed() {
        // At 1.0 units/s with stop_speed 3.0, the drop per tick is
        // constant, so the velocity hits exactly zero instead of crawling.
        let (mut vx, mut vy) = (1.0, 0.0);
        let mut ticks = 0;
        while (vx, vy) != (0.0, 0.0) {
            (vx, vy) = apply_friction(vx, vy, 3.0, 3.0, 1.0 / 60.0);
            ticks += 1;
            assert!(ticks < 100, "low-speed friction must terminate");
        }
    }

    #[test]
    fn test_accelerate_is_bounded_per_tick() {
        let (vx, vy) = accelerate(0.0, 0.0, 1.0, 0.0, 10.0, 2.0, 1.0 / 60.0);
        // Gain capped at acceleration * speed * dt.
        assert_relative_eq!(vx, 2.0 * 10.0 / 60.0, epsilon = 1e-5);
        assert_eq!(vy, 0.0);
    }

    #[test]
    fn test_accelerate_preserves_external_speed() {
        // A body shoved past its max speed keeps that speed; input cannot
        // add more on top.
        let (vx, vy) = accelerate(20.0, 0.0, 1.0, 0.0, 10.0, 2.0, 1.0 / 60.0);
        let speed = (vx * vx + vy * vy).sqrt();
        assert!(speed <= 20.0 + 1e-4);
    }

    #[test]
    fn test_dizzy_suppresses_input_then_expires() {
        let (mut world, mut schedule, entity) = test_world();
        world.insert_resource(DeltaTime(1.0));
        world
            .entity_mut(entity)
            .insert(MovementStatusEffect::dizzy(3.0));

        for tick in 1..=3 {
            world
                .get_mut::<CharacterInput>(entity)
                .unwrap()
                .set_wish(1.0, 0.0);
            schedule.run(&mut world);

            assert_eq!(
                body_speed(&mut world, entity),
                0.0,
                "input must not move a dizzy cat (tick {})",
                tick
            );
        }

        // Countdown reached zero on the third tick; the effect is gone and
        // the fourth tick responds to input again.
        assert!(world.get::<MovementStatusEffect>(entity).is_none());

        world
            .get_mut::<CharacterInput>(entity)
            .unwrap()
            .set_wish(1.0, 0.0);
        schedule.run(&mut world);
        assert!(body_speed(&mut world, entity) > 0.0);
    }

    #[test]
    fn test_dizzy_countdown_is_monotonic() {
        let (mut world, mut schedule, entity) = test_world();
        world
            .entity_mut(entity)
            .insert(MovementStatusEffect::dizzy(0.5));

        let mut last = 0.5;
        for _ in 0..60 {
            schedule.run(&mut world);
            match world.get::<MovementStatusEffect>(entity) {
                Some(effect) => {
                    let remaining = effect.remaining();
                    assert!(remaining < last, "countdown must decrease every tick");
                    last = remaining;
                }
                None => return, // expired, done
            }
        }
        panic!("dizzy effect never expired");
    }

    #[test]
    fn test_boost_requires_charge() {
        let (mut world, mut schedule, entity) = test_world();

        // last_boost_time = 0 and charge = 2.0, so at t=0 the boost is
        // considered charged only after the charge window has elapsed.
        world.insert_resource(SimTime(0.5));
        {
            let mut input = world.get_mut::<CharacterInput>(entity).unwrap();
            input.set_wish(1.0, 0.0);
            input.wants_boost = true;
        }
        schedule.run(&mut world);
        assert!(
            body_speed(&mut world, entity) < 1.0,
            "uncharged boost must not fire"
        );

        world.insert_resource(SimTime(2.5));
        {
            let mut input = world.get_mut::<CharacterInput>(entity).unwrap();
            input.set_wish(1.0, 0.0);
            input.wants_boost = true;
        }
        schedule.run(&mut world);
        let speed = body_speed(&mut world, entity);
        assert!(speed > 10.0, "charged boost must exceed max ground speed");

        let movement = world.get::<Movement>(entity).unwrap();
        assert_relative_eq!(movement.last_boost_time, 2.5);
    }

    #[test]
    fn test_trail_emits_on_interval() {
        let mut world = World::new();
        world.insert_resource(SimTime(1.0));

        let entity = world
            .spawn((Velocity::new(5.0, 0.0), Trail::default()))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(trail_system);
        schedule.run(&mut world);

        let trail = world.get::<Trail>(entity).unwrap();
        assert!(trail.emit_pending);
        assert_eq!(trail.last_spawn_time, 1.0);

        // Within the interval nothing new is due.
        world.get_mut::<Trail>(entity).unwrap().emit_pending = false;
        world.insert_resource(SimTime(1.05));
        schedule.run(&mut world);
        assert!(!world.get::<Trail>(entity).unwrap().emit_pending);
    }
}
