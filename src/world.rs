//! Simulation snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation
//! state for the presentation layer: per-cat transforms plus the one-shot
//! reaction events drained this frame. The snapshot is a frozen copy; a
//! renderer on another thread only ever reads it, never the live world.

use crate::components::*;
use crate::components::Single;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of a single cat's state for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatSnapshot {
    pub id: u32,
    pub cat_type: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub is_player: bool,
    pub is_single: bool,
    /// External id of the matched partner, if any.
    pub partner: Option<u32>,
    /// Remaining dizzy time, zero when the cat is clear-headed.
    pub dizzy_remaining: f32,
    /// Whether a trail puff is due since the last snapshot.
    pub trail_emit: bool,
}

/// Snapshot of a one-shot reaction event for the audio/render layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionSnapshot {
    pub kind: String,
    pub actors: Vec<u32>,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// All cat states, ordered by id.
    pub cats: Vec<CatSnapshot>,
    /// Reaction events drained this frame.
    pub reactions: Vec<ReactionSnapshot>,
}

impl Snapshot {
    /// Create a snapshot of all cats from the ECS world. Reaction events
    /// are drained separately by the simulation container.
    pub fn from_world(world: &mut World, tick: u64, time: f32) -> Self {
        let mut query = world.query_filtered::<(
            Entity,
            &CatId,
            &CatType,
            &Position,
            &Velocity,
            Option<&Player>,
            Option<&Single>,
            Option<&Partner>,
            Option<&MovementStatusEffect>,
            Option<&Trail>,
        ), With<Cat>>();

        // First pass records rows and the entity -> id mapping so partner
        // references resolve to external ids.
        let mut ids_by_entity: HashMap<Entity, u32> = HashMap::new();
        let mut rows = Vec::new();
        for (entity, id, cat_type, pos, vel, player, single, partner, effect, trail) in
            query.iter(world)
        {
            ids_by_entity.insert(entity, id.0);

            let cat_type_str = match cat_type {
                CatType::CupidCat => "cupidCat",
                CatType::BlackCat => "blackCat",
                CatType::ChristmasCat => "christmasCat",
                CatType::ClassicCat => "classicCat",
                CatType::GrayCat => "grayCat",
                CatType::TriCat => "triCat",
            };

            rows.push((
                CatSnapshot {
                    id: id.0,
                    cat_type: cat_type_str.to_string(),
                    x: pos.x,
                    y: pos.y,
                    vx: vel.vx,
                    vy: vel.vy,
                    is_player: player.is_some(),
                    is_single: single.is_some(),
                    partner: None,
                    dizzy_remaining: effect.map(|e| e.remaining()).unwrap_or(0.0),
                    trail_emit: trail.map(|t| t.emit_pending).unwrap_or(false),
                },
                partner.map(|p| p.0),
            ));
        }

        let mut cats: Vec<CatSnapshot> = rows
            .into_iter()
            .map(|(mut snapshot, partner_entity)| {
                snapshot.partner =
                    partner_entity.and_then(|e| ids_by_entity.get(&e).copied());
                snapshot
            })
            .collect();

        // Ordered by id so the output is deterministic regardless of
        // archetype iteration order.
        cats.sort_by_key(|c| c.id);

        Self {
            tick,
            time,
            cats,
            reactions: Vec::new(),
        }
    }

    /// Serialize snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to a pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
