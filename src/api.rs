//! Public API for the simulation.
//!
//! This module provides the main interface for a host (renderer, audio
//! layer, input translation) to interact with the simulation.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 60 Hz). When
//! `step(dt)` is called, the simulation accumulates time and runs fixed
//! updates as needed, so behavior does not depend on the host frame rate.
//!
//! ## Ownership
//!
//! `SimWorld` owns the ECS world, the schedule, and (through resources)
//! the physics adapter and the seeded RNG. Nothing lives in globals; every
//! system receives what it needs from the constructed context.

use crate::components::*;
use crate::physics::{physics_step_system, sync_transform_system, PhysicsWorld};
use crate::placement::{scatter, PlacementParams};
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::systems::*;
use crate::world::{ReactionSnapshot, Snapshot};
use bevy_ecs::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Configuration for simulation tuning.
#[derive(Resource, Debug, Clone)]
pub struct SimConfig {
    /// Fixed timestep in seconds (1/60 = 60 Hz).
    pub fixed_timestep: f32,
    /// Center distance at which two singles pair up.
    pub pairing_distance: f32,
    /// Inner radius of the cat spawn ring.
    pub arena_inner_radius: f32,
    /// Outer radius of the cat spawn ring.
    pub arena_outer_radius: f32,
    /// Clearance required around existing bodies when placing cats.
    pub cat_body_padding: f32,
    /// Placement retry budget per cat.
    pub placement_max_attempts: u32,
    /// Mingling cat population for the default arena.
    pub mingling_cat_count: usize,
    /// Collider radius of the player cat.
    pub player_radius: f32,
    /// Collider radius of a mingling cat.
    pub cat_radius: f32,
    /// Seconds a shoved cat stays dizzy.
    pub dizzy_duration: f32,
    /// Seed for the simulation RNG (placement, wander).
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            pairing_distance: 1.25,
            arena_inner_radius: 5.0,
            arena_outer_radius: 22.0,
            cat_body_padding: 1.5,
            placement_max_attempts: 10,
            mingling_cat_count: 20,
            player_radius: 0.75,
            cat_radius: 0.5,
            dizzy_duration: 3.0,
            seed: 0xCA7,
        }
    }
}

/// The simulation RNG, seeded from [`SimConfig::seed`]. All randomness
/// (placement, wander) draws from here, so a seed reproduces a run.
#[derive(Resource)]
pub struct SimRng(pub Pcg32);

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Setting up the arena (player, mingling cats, environment bodies)
/// - Stepping the simulation forward
/// - Extracting state snapshots for the render/audio bridge
/// - Feeding in external interactions (input, boosts, shoves)
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
    /// Next external cat id to hand out.
    next_cat_id: u32,
    /// Reaction events drained from the world, cleared after snapshot.
    pending_reactions: Vec<ReactionSnapshot>,
}

impl SimWorld {
    /// Create a new empty simulation world.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SimTime(0.0));
        world.insert_resource(SpatialGrid::default());
        world.insert_resource(PhysicsWorld::new());
        world.insert_resource(SimRng(Pcg32::seed_from_u64(config.seed)));
        world.insert_resource(config);

        // One chained schedule: every system sees the previous one's
        // writes, matching the per-tick order in the systems module doc.
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                wander_system,
                movement_system,
                physics_step_system,
                sync_transform_system,
                spatial_grid_update_system,
                pairing_system,
                trail_system,
                lifetime_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            time_accumulator: 0.0,
            next_cat_id: 1,
            pending_reactions: Vec::new(),
        }
    }

    /// Create the default arena: a central environment prop, the player,
    /// and a scattered mingling population.
    pub fn new_default_arena() -> Self {
        let mut sim = Self::new();
        let (count, player_start) = {
            let config = sim.world.resource::<SimConfig>();
            (config.mingling_cat_count, (0.0, -4.5))
        };

        sim.spawn_environment_circle(0.0, 0.0, 3.0);
        sim.spawn_player(player_start.0, player_start.1);
        sim.spawn_mingling_cats(count);
        sim
    }

    /// Step the simulation forward by `dt` seconds.
    ///
    /// Uses a fixed timestep internally - accumulates time and runs fixed
    /// updates as needed.
    pub fn step(&mut self, dt: f32) {
        let fixed_dt = self.world.resource::<SimConfig>().fixed_timestep;

        self.time_accumulator += dt;
        while self.time_accumulator >= fixed_dt {
            self.fixed_update(fixed_dt);
            self.time_accumulator -= fixed_dt;
        }
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self, dt: f32) {
        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.world.resource_mut::<SimTime>().0 = self.time;

        self.schedule.run(&mut self.world);

        self.drain_reaction_events();

        self.tick += 1;
        self.time += dt;
    }

    /// Move reaction-event entities into the pending queue so no event is
    /// lost when several fixed updates run within one host frame.
    fn drain_reaction_events(&mut self) {
        let mut query = self.world.query::<(Entity, &ReactionEvent)>();
        let drained: Vec<(Entity, ReactionSnapshot)> = query
            .iter(&self.world)
            .map(|(entity, event)| {
                (
                    entity,
                    ReactionSnapshot {
                        kind: event.kind.as_str().to_string(),
                        actors: event.actors.clone(),
                    },
                )
            })
            .collect();

        for (entity, snapshot) in drained {
            self.world.despawn(entity);
            self.pending_reactions.push(snapshot);
        }
    }

    /// Get a snapshot of the current simulation state, draining pending
    /// reaction events and trail emission flags.
    pub fn snapshot(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::from_world(&mut self.world, self.tick, self.time);
        snapshot.reactions = std::mem::take(&mut self.pending_reactions);

        let mut trails = self.world.query::<&mut Trail>();
        for mut trail in trails.iter_mut(&mut self.world) {
            trail.emit_pending = false;
        }

        snapshot
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Number of live cats.
    pub fn cat_count(&mut self) -> usize {
        let mut query = self.world.query_filtered::<(), With<Cat>>();
        query.iter(&self.world).count()
    }

    // ------------------------------------------------------------------
    // Arena setup
    // ------------------------------------------------------------------

    /// Spawn the player cat at the given position. Returns its id.
    pub fn spawn_player(&mut self, x: f32, y: f32) -> u32 {
        let (radius, id) = {
            let config = self.world.resource::<SimConfig>();
            (config.player_radius, self.next_cat_id)
        };
        self.next_cat_id += 1;

        let handle = self
            .world
            .resource_mut::<PhysicsWorld>()
            .create_character_body(x, y, radius, 1.0);
        self.world.spawn(PlayerBundle::new(id, BodyRef(handle), x, y));
        id
    }

    /// Spawn a single mingling cat at an exact position (tests, scripted
    /// setups). Scattered populations go through [`spawn_mingling_cats`].
    ///
    /// [`spawn_mingling_cats`]: SimWorld::spawn_mingling_cats
    pub fn spawn_mingling_cat_at(&mut self, x: f32, y: f32, cat_type: CatType) -> u32 {
        let (radius, id) = {
            let config = self.world.resource::<SimConfig>();
            (config.cat_radius, self.next_cat_id)
        };
        self.next_cat_id += 1;

        let handle = self
            .world
            .resource_mut::<PhysicsWorld>()
            .create_character_body(x, y, radius, 1.0);
        self.world
            .spawn(MinglingCatBundle::new(id, cat_type, BodyRef(handle), x, y));
        id
    }

    /// Scatter up to `count` mingling cats into the arena ring without
    /// overlapping existing bodies. Returns the number actually placed.
    pub fn spawn_mingling_cats(&mut self, count: usize) -> usize {
        let params = {
            let config = self.world.resource::<SimConfig>();
            PlacementParams {
                count,
                inner_radius: config.arena_inner_radius,
                outer_radius: config.arena_outer_radius,
                body_padding: config.cat_body_padding,
                max_attempts: config.placement_max_attempts,
                cat_radius: config.cat_radius,
                cat_mass: 1.0,
            }
        };

        let mut next_id = self.next_cat_id;
        let placed = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            scatter(world, &mut rng.0, &params, &mut next_id)
        });
        self.next_cat_id = next_id;
        placed
    }

    /// Create a static environment body (rink furniture). Environment
    /// bodies collide normally but are ignored by placement clearance.
    pub fn spawn_environment_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.world
            .resource_mut::<PhysicsWorld>()
            .create_environment_body(x, y, radius);
    }

    /// Destroy a cat and release its body. No-op if the id is unknown or
    /// the cat is already gone, so repeated destruction is safe.
    pub fn despawn_cat(&mut self, cat_id: u32) {
        let Some(entity) = self.find_cat(cat_id) else {
            return;
        };
        if let Some(body) = self.world.get::<BodyRef>(entity).copied() {
            self.world.resource_mut::<PhysicsWorld>().remove_body(body.0);
        }
        self.world.despawn(entity);
    }

    // ------------------------------------------------------------------
    // External interactions
    // ------------------------------------------------------------------

    /// Set the player's wish direction for the next ticks. Vectors above
    /// unit length are normalized.
    pub fn set_player_wish(&mut self, x: f32, y: f32) {
        let mut query = self
            .world
            .query_filtered::<&mut CharacterInput, With<Player>>();
        for mut input in query.iter_mut(&mut self.world) {
            input.set_wish(x, y);
        }
    }

    /// Request a speed burst for the player; fires on the next tick if the
    /// boost is charged.
    pub fn request_player_boost(&mut self) {
        let mut query = self
            .world
            .query_filtered::<&mut CharacterInput, With<Player>>();
        for mut input in query.iter_mut(&mut self.world) {
            input.wants_boost = true;
        }
    }

    /// External shove trigger: the shoved cat goes dizzy and the matching
    /// reaction clips fire. The condition that causes a shove lives in the
    /// host, not here.
    pub fn apply_shove(&mut self, cat_id: u32, hard: bool) {
        let Some(entity) = self.find_cat(cat_id) else {
            return;
        };
        let duration = self.world.resource::<SimConfig>().dizzy_duration;
        apply_dizzy(&mut self.world, entity, duration);

        let kind = if hard {
            ReactionKind::ShoveHard
        } else {
            ReactionKind::Shove
        };
        self.emit_reaction(kind, vec![cat_id]);
        self.emit_reaction(ReactionKind::Sad, vec![cat_id]);
    }

    /// Queue a reaction event for the audio/render bridge. Host-triggered
    /// reactions enter the same queue the pairing system feeds.
    pub fn emit_reaction(&mut self, kind: ReactionKind, actors: Vec<u32>) {
        self.pending_reactions.push(ReactionSnapshot {
            kind: kind.as_str().to_string(),
            actors,
        });
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// Find a cat entity by external id.
    fn find_cat(&mut self, cat_id: u32) -> Option<Entity> {
        let mut query = self.world.query::<(Entity, &CatId)>();
        query
            .iter(&self.world)
            .find(|(_, id)| id.0 == cat_id)
            .map(|(entity, _)| entity)
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
