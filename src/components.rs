//! ECS Components for the Mingle Cats simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components; which
//! systems apply to an actor is determined by the capability markers and
//! optional components it carries, not by a class hierarchy.

use bevy_ecs::prelude::*;
use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in the arena, mirrored from the physical body each tick
/// after the physics step. Read by the render bridge, never written by it.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 2D velocity vector, mirrored from the physical body each tick.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// Handle of the rigid body owned by this actor. Exactly one per character;
/// the body is released back to the physics adapter when the actor dies.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRef(pub RigidBodyHandle);

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Stable external identifier for a cat, used by host commands and the
/// render/audio bridge. Entity handles stay internal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatId(pub u32);

/// Visual/animation variant of a cat. Irrelevant to simulation logic; the
/// numeric ids match the sprite-atlas table used by the presentation layer.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatType {
    CupidCat,
    BlackCat,
    ChristmasCat,
    ClassicCat,
    GrayCat,
    TriCat,
}

/// The variants mingling cats are drawn from (the player is always cupid).
pub const MINGLING_CAT_TYPES: [CatType; 5] = [
    CatType::BlackCat,
    CatType::ChristmasCat,
    CatType::ClassicCat,
    CatType::GrayCat,
    CatType::TriCat,
];

impl CatType {
    /// Numeric id for the FFI bridge.
    pub fn id(&self) -> u32 {
        match self {
            CatType::CupidCat => 0,
            CatType::BlackCat => 1,
            CatType::ChristmasCat => 2,
            CatType::ClassicCat => 3,
            CatType::GrayCat => 4,
            CatType::TriCat => 5,
        }
    }
}

// ============================================================================
// ROLE MARKERS
// ============================================================================

/// Marker for the player-controlled actor.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Marker for actors driven by the movement controller. Every character
/// has exactly one body, position, velocity, input, and movement block.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Character;

/// Marker for cat actors (player and mingling cats alike).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Cat;

/// Marker for non-player cats that participate in pairing.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MinglingCat;

// ============================================================================
// INPUT & MOVEMENT COMPONENTS
// ============================================================================

/// Desired movement for a character this tick.
///
/// The wish direction is a unit-or-zero vector; zero means "stop".
/// `wants_boost` is a one-tick trigger consumed by the movement controller.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct CharacterInput {
    pub wish_x: f32,
    pub wish_y: f32,
    pub wants_boost: bool,
}

impl CharacterInput {
    /// Set the wish direction, clamping anything above unit length.
    pub fn set_wish(&mut self, x: f32, y: f32) {
        let mag = (x * x + y * y).sqrt();
        if mag > 1.0 {
            self.wish_x = x / mag;
            self.wish_y = y / mag;
        } else {
            self.wish_x = x;
            self.wish_y = y;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.wish_x == 0.0 && self.wish_y == 0.0
    }
}

/// Kinematic tuning for a character.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Movement {
    /// Max ground speed (units per second).
    pub speed: f32,
    /// Speed floor used by friction so low-speed motion arrests fully
    /// instead of decaying asymptotically.
    pub stop_speed: f32,
    /// Friction deceleration coefficient.
    pub surface_friction: f32,
    /// Rate of velocity change toward the wish direction.
    pub acceleration: f32,
    /// Charge time for the speed burst; `None` disables boosting.
    pub boost_charge_time: Option<f32>,
    /// Sim time of the last boost.
    pub last_boost_time: f32,
}

impl Movement {
    /// Player tuning: fast, grippy skates.
    pub fn player() -> Self {
        Self {
            speed: 10.0,
            stop_speed: 3.0,
            surface_friction: 3.0,
            acceleration: 2.0,
            boost_charge_time: Some(2.0),
            last_boost_time: 0.0,
        }
    }

    /// Mingling-cat tuning: slower amble, slippery ice.
    pub fn mingling_cat() -> Self {
        Self {
            speed: 3.0,
            stop_speed: 3.0,
            surface_friction: 1.0,
            acceleration: 3.0,
            boost_charge_time: None,
            last_boost_time: 0.0,
        }
    }

    /// Whether the boost is charged at the given sim time.
    pub fn boost_ready(&self, now: f32) -> bool {
        match self.boost_charge_time {
            Some(charge) => now - self.last_boost_time >= charge,
            None => false,
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::mingling_cat()
    }
}

/// Transient movement debuff. While active, the wish direction is ignored
/// and only friction applies; the countdown decreases by `dt` each tick and
/// the component is removed exactly when it reaches zero or below.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementStatusEffect {
    Dizzy { countdown: f32 },
}

impl MovementStatusEffect {
    pub fn dizzy(countdown: f32) -> Self {
        Self::Dizzy { countdown }
    }

    pub fn remaining(&self) -> f32 {
        match self {
            Self::Dizzy { countdown } => *countdown,
        }
    }
}

/// Cosmetic trail emission timer. Decoupled from simulation correctness;
/// the render bridge reads and clears the emit flag via the snapshot.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Trail {
    /// Sim time the last trail puff was spawned.
    pub last_spawn_time: f32,
    /// Set when an emission is due, cleared when the snapshot drains it.
    pub emit_pending: bool,
}

// ============================================================================
// SOCIAL STATE COMPONENTS
// ============================================================================

/// Presence marks an actor as eligible for pairing.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Single;

/// Non-owning back-reference to the matched partner. Always written
/// symmetrically on both sides by the pairing system's `pair` operation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partner(pub Entity);

/// The two matched actors, carried by the synthetic celebration actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPair(pub Entity, pub Entity);

/// Countdown after which the actor is destroyed by the maintenance pass.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime(pub f32);

/// Wander decision timer for mingling cats.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Wander {
    /// Sim time of the next direction change.
    pub next_decision: f32,
}

// ============================================================================
// REACTION EVENTS
// ============================================================================

/// One-shot audiovisual reaction kinds, matching the audio clip pools of
/// the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionKind {
    Love,
    Sad,
    Shove,
    ShoveHard,
    Fireworks,
    PartyHorn,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Love => "love",
            ReactionKind::Sad => "sad",
            ReactionKind::Shove => "shove",
            ReactionKind::ShoveHard => "shoveHard",
            ReactionKind::Fireworks => "fireworks",
            ReactionKind::PartyHorn => "partyHorn",
        }
    }
}

/// Reaction event, spawned as a short-lived entity and drained into the
/// snapshot by the simulation container each tick.
#[derive(Component, Debug, Clone)]
pub struct ReactionEvent {
    pub kind: ReactionKind,
    /// External ids of the actors involved.
    pub actors: Vec<u32>,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning the player cat. The body is created separately by
/// the physics adapter and handed in as `BodyRef`.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub id: CatId,
    pub player: Player,
    pub character: Character,
    pub cat: Cat,
    pub cat_type: CatType,
    pub body: BodyRef,
    pub position: Position,
    pub velocity: Velocity,
    pub input: CharacterInput,
    pub movement: Movement,
    pub trail: Trail,
}

impl PlayerBundle {
    pub fn new(id: u32, body: BodyRef, x: f32, y: f32) -> Self {
        Self {
            id: CatId(id),
            player: Player,
            character: Character,
            cat: Cat,
            cat_type: CatType::CupidCat,
            body,
            position: Position::new(x, y),
            velocity: Velocity::default(),
            input: CharacterInput::default(),
            movement: Movement::player(),
            trail: Trail::default(),
        }
    }
}

/// Bundle for spawning a mingling cat, single and ready to mingle.
#[derive(Bundle)]
pub struct MinglingCatBundle {
    pub id: CatId,
    pub character: Character,
    pub cat: Cat,
    pub mingling: MinglingCat,
    pub single: Single,
    pub cat_type: CatType,
    pub body: BodyRef,
    pub position: Position,
    pub velocity: Velocity,
    pub input: CharacterInput,
    pub movement: Movement,
    pub trail: Trail,
    pub wander: Wander,
}

impl MinglingCatBundle {
    pub fn new(id: u32, cat_type: CatType, body: BodyRef, x: f32, y: f32) -> Self {
        Self {
            id: CatId(id),
            character: Character,
            cat: Cat,
            mingling: MinglingCat,
            single: Single,
            cat_type,
            body,
            position: Position::new(x, y),
            velocity: Velocity::default(),
            input: CharacterInput::default(),
            movement: Movement::mingling_cat(),
            trail: Trail::default(),
            wander: Wander::default(),
        }
    }
}

/// Bundle for the short-lived celebration actor spawned on a match.
#[derive(Bundle)]
pub struct CelebrationBundle {
    pub pair: MatchPair,
    pub position: Position,
    pub lifetime: Lifetime,
}

impl CelebrationBundle {
    pub fn new(a: Entity, b: Entity, x: f32, y: f32, lifetime: f32) -> Self {
        Self {
            pair: MatchPair(a, b),
            position: Position::new(x, y),
            lifetime: Lifetime(lifetime),
        }
    }
}
