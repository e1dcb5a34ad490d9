//! Physics adapter - ownership boundary around the rapier2d rigid-body
//! simulation.
//!
//! The adapter owns all rapier state (body/collider sets, pipeline,
//! broad/narrow phase) and exposes only what the simulation core needs:
//! circle-body creation, velocity read/write, a fixed-dt step, and a
//! read-only listing of live bodies for placement overlap tests.
//!
//! Stepping mutates body positions in place; `sync_transform_system` copies
//! them into `Position`/`Velocity` components once per tick, after the step
//! and before pairing or bridge reads.

use crate::components::{BodyRef, Position, Velocity};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use rapier2d::prelude::*;
use std::collections::HashMap;

/// `user_data` value marking environment bodies (rink furniture, walls).
/// Set at creation, never mutated, never applied to character bodies.
const ENVIRONMENT_FLAG: u128 = 1;

/// Read-only view of a live body, for placement overlap testing.
#[derive(Debug, Clone, Copy)]
pub struct BodyInfo {
    pub handle: RigidBodyHandle,
    pub x: f32,
    pub y: f32,
    pub bounding_radius: f32,
    pub environment: bool,
}

/// The rigid-body simulation, wrapped as an ECS resource.
///
/// rapier owns its own body and collider storage; actors reference their
/// body through a [`BodyRef`] component and everything else stays behind
/// this boundary.
#[derive(Resource)]
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Bounding radius per body, recorded at creation (all colliders here
    /// are circles, so the shape radius is the bounding radius).
    bounding_radii: HashMap<RigidBodyHandle, f32>,
}

impl PhysicsWorld {
    /// Create a zero-gravity physics world (top-down arena).
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bounding_radii: HashMap::new(),
        }
    }

    /// Create a dynamic, rotation-locked circle body for a character.
    pub fn create_character_body(&mut self, x: f32, y: f32, radius: f32, mass: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![x, y])
            .lock_rotations()
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius).mass(mass).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.bounding_radii.insert(handle, radius);
        handle
    }

    /// Create a fixed circle body flagged as environment. Environment
    /// bodies are excluded from placement overlap tests.
    pub fn create_environment_body(&mut self, x: f32, y: f32, radius: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![x, y])
            .user_data(ENVIRONMENT_FLAG)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.bounding_radii.insert(handle, radius);
        handle
    }

    /// Remove a body and its colliders. No-op on an already-removed handle.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        if !self.bodies.contains(handle) {
            return;
        }
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.bounding_radii.remove(&handle);
    }

    /// Whether the handle refers to a live body.
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Current linear velocity of a body.
    pub fn linvel(&self, handle: RigidBodyHandle) -> (f32, f32) {
        match self.bodies.get(handle) {
            Some(body) => {
                let v = body.linvel();
                (v.x, v.y)
            }
            None => (0.0, 0.0),
        }
    }

    /// Overwrite a body's linear velocity, waking it.
    pub fn set_linvel(&mut self, handle: RigidBodyHandle, vx: f32, vy: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vector![vx, vy], true);
        }
    }

    /// Current translation of a body.
    pub fn translation(&self, handle: RigidBodyHandle) -> (f32, f32) {
        match self.bodies.get(handle) {
            Some(body) => {
                let t = body.translation();
                (t.x, t.y)
            }
            None => (0.0, 0.0),
        }
    }

    /// List all live bodies with position, bounding radius, and the
    /// environment flag. Used by the placement overlap test.
    pub fn bodies(&self) -> impl Iterator<Item = BodyInfo> + '_ {
        self.bodies.iter().map(|(handle, body)| {
            let t = body.translation();
            BodyInfo {
                handle,
                x: t.x,
                y: t.y,
                bounding_radius: self.bounding_radii.get(&handle).copied().unwrap_or(0.0),
                environment: body.user_data == ENVIRONMENT_FLAG,
            }
        })
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// System that advances the physics simulation by the fixed timestep.
pub fn physics_step_system(mut physics: ResMut<PhysicsWorld>, dt: Res<DeltaTime>) {
    physics.step(dt.0);
}

/// System that mirrors body translation and velocity into the `Position`
/// and `Velocity` components. Runs after the physics step so pairing and
/// the render bridge read post-step state.
pub fn sync_transform_system(
    physics: Res<PhysicsWorld>,
    mut query: Query<(&BodyRef, &mut Position, &mut Velocity)>,
) {
    for (body, mut pos, mut vel) in query.iter_mut() {
        let (x, y) = physics.translation(body.0);
        let (vx, vy) = physics.linvel(body.0);
        pos.x = x;
        pos.y = y;
        vel.vx = vx;
        vel.vy = vy;
    }
}
