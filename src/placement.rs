//! Population placement - scatters mingling cats into the arena ring.
//!
//! Rejection sampling with a bounded retry budget: sample a random spot in
//! the ring, reject it if it crowds any existing non-environment body, give
//! up on a cat after `max_attempts` tries. Placement is best-effort, not a
//! packing; the arena is sized generously relative to the population, so
//! exhaustion is rare and non-fatal.
//!
//! The random source is injected so placement is deterministic under a
//! seeded generator.

use crate::components::{BodyRef, MinglingCatBundle, MINGLING_CAT_TYPES};
use crate::physics::PhysicsWorld;
use bevy_ecs::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

/// Parameters for a scatter pass. Defaults match the shipped arena.
#[derive(Debug, Clone, Copy)]
pub struct PlacementParams {
    /// Number of cats to place.
    pub count: usize,
    /// Inner radius of the spawn ring.
    pub inner_radius: f32,
    /// Outer radius of the spawn ring.
    pub outer_radius: f32,
    /// Required clearance beyond an existing body's bounding radius.
    pub body_padding: f32,
    /// Retry budget per cat before it is skipped.
    pub max_attempts: u32,
    /// Collider radius of a placed cat.
    pub cat_radius: f32,
    /// Body mass of a placed cat.
    pub cat_mass: f32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            count: 20,
            inner_radius: 5.0,
            outer_radius: 22.0,
            body_padding: 1.5,
            max_attempts: 10,
            cat_radius: 0.5,
            cat_mass: 1.0,
        }
    }
}

/// Sample a candidate position in the spawn ring: uniform angle, radius
/// linearly mapped from a uniform draw into `[inner, outer]`.
fn sample_candidate<R: Rng>(rng: &mut R, inner: f32, outer: f32) -> (f32, f32) {
    let angle = rng.random_range(0.0..TAU);
    let distance = inner + rng.random::<f32>() * (outer - inner);
    (angle.cos() * distance, angle.sin() * distance)
}

/// Whether a candidate position crowds any existing non-environment body.
fn too_close(physics: &PhysicsWorld, x: f32, y: f32, padding: f32) -> bool {
    physics.bodies().any(|body| {
        if body.environment {
            return false;
        }
        let dx = x - body.x;
        let dy = y - body.y;
        let clearance = body.bounding_radius + padding;
        dx * dx + dy * dy < clearance * clearance
    })
}

/// Scatter up to `params.count` mingling cats into the arena.
///
/// Cats receive sequential ids starting at `*next_id`, which is advanced
/// past the last id handed out. Returns the number actually placed; cats
/// whose retry budget ran out are skipped and counted, never an error.
pub fn scatter<R: Rng>(
    world: &mut World,
    rng: &mut R,
    params: &PlacementParams,
    next_id: &mut u32,
) -> usize {
    let mut placed = 0;
    let mut skipped = 0;

    world.resource_scope(|world, mut physics: Mut<PhysicsWorld>| {
        for _ in 0..params.count {
            let mut spot = None;

            for _ in 0..params.max_attempts {
                let (x, y) = sample_candidate(rng, params.inner_radius, params.outer_radius);
                if !too_close(&physics, x, y, params.body_padding) {
                    spot = Some((x, y));
                    break;
                }
            }

            match spot {
                Some((x, y)) => {
                    let handle =
                        physics.create_character_body(x, y, params.cat_radius, params.cat_mass);
                    let cat_type =
                        MINGLING_CAT_TYPES[rng.random_range(0..MINGLING_CAT_TYPES.len())];
                    world.spawn(MinglingCatBundle::new(*next_id, cat_type, BodyRef(handle), x, y));
                    *next_id += 1;
                    placed += 1;
                }
                None => {
                    skipped += 1;
                    log::warn!(
                        "cat placement exhausted after {} attempts, skipping",
                        params.max_attempts
                    );
                }
            }
        }
    });

    if skipped > 0 {
        log::debug!("placed {} cats, skipped {}", placed, skipped);
    }
    placed
}
