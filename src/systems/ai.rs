//! Wander AI - input for non-player cats.
//!
//! Mingling singles drift around the rink looking for company: every so
//! often each one draws a fresh wish direction (or decides to loaf) from
//! the simulation RNG. Matched cats stop wandering and let friction bring
//! the couple to rest.

use crate::api::SimRng;
use crate::components::*;
use crate::components::Single;
use crate::systems::movement::SimTime;
use bevy_ecs::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Chance a wander decision is "sit still" instead of a new direction.
const WANDER_REST_CHANCE: f32 = 0.35;

/// Bounds on seconds between wander decisions.
const WANDER_INTERVAL_MIN: f32 = 1.0;
const WANDER_INTERVAL_MAX: f32 = 3.0;

/// System driving mingling-cat input.
pub fn wander_system(
    time: Res<SimTime>,
    mut rng: ResMut<SimRng>,
    mut query: Query<
        (&mut CharacterInput, &mut Wander, Option<&Single>),
        (With<MinglingCat>, Without<Player>),
    >,
) {
    let now = time.0;

    for (mut input, mut wander, single) in query.iter_mut() {
        if single.is_none() {
            // Matched: coast to a stop beside the partner.
            input.set_wish(0.0, 0.0);
            continue;
        }

        if now < wander.next_decision {
            continue;
        }

        if rng.0.random::<f32>() < WANDER_REST_CHANCE {
            input.set_wish(0.0, 0.0);
        } else {
            let angle = rng.0.random_range(0.0..TAU);
            input.set_wish(angle.cos(), angle.sin());
        }
        wander.next_decision = now + rng.0.random_range(WANDER_INTERVAL_MIN..WANDER_INTERVAL_MAX);
    }
}
