//! Render/Audio Bridge
//!
//! This module defines the boundary the presentation layer consumes: a
//! stable flat-buffer encoding of the per-frame snapshot, plus the
//! reaction-event vocabulary and audio clip-pool metadata the audio layer
//! uses to pick a random clip per event.
//!
//! # Stable Buffer Layout (Version 1.0)
//!
//! The flat buffer is a `Vec<f32>`:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (2 elements)                                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ [0] cat_count   (as f32)                                        │
//! │ [1] event_count (as f32)                                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ CAT DATA (cat_count × CAT_STRIDE elements)                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ For each cat i (offset = 2 + i * CAT_STRIDE):                   │
//! │   [+0]  id             - Cat id (u32 as f32)                    │
//! │   [+1]  cat_type       - Visual variant id (0-5)                │
//! │   [+2]  x              - X position (world units)               │
//! │   [+3]  y              - Y position (world units)               │
//! │   [+4]  vx             - X velocity (units/sec)                 │
//! │   [+5]  vy             - Y velocity (units/sec)                 │
//! │   [+6]  is_player      - 1.0 = player, 0.0 = not                │
//! │   [+7]  is_single      - 1.0 = single, 0.0 = not                │
//! │   [+8]  partner_id     - Partner cat id, -1.0 = none            │
//! │   [+9]  dizzy          - Remaining dizzy seconds, 0.0 = none    │
//! │   [+10] trail_emit     - 1.0 = spawn a trail puff this frame    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ EVENT DATA (event_count × EVENT_STRIDE elements)                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ For each event j                                                │
//! │ (offset = 2 + cat_count * CAT_STRIDE + j * EVENT_STRIDE):       │
//! │   [+0] kind            - Reaction kind code (see REACTION_*)    │
//! │   [+1] actor_a         - First actor id, -1.0 = none            │
//! │   [+2] actor_b         - Second actor id, -1.0 = none           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Determinism
//!
//! Given the same `Snapshot`, the output buffer is identical. Cats arrive
//! already ordered by id; events keep their emission order.

use crate::world::Snapshot;

// ============================================================================
// CONSTANTS - STABLE CONTRACT
// ============================================================================

/// Number of f32 values per cat in the flat buffer.
///
/// Fields (in order): 0. id, 1. cat_type, 2. x, 3. y, 4. vx, 5. vy,
/// 6. is_player, 7. is_single, 8. partner_id, 9. dizzy, 10. trail_emit
pub const CAT_STRIDE: usize = 11;

/// Number of f32 values per reaction event.
pub const EVENT_STRIDE: usize = 3;

/// Number of f32 values in the buffer header (cat_count, event_count).
pub const HEADER_SIZE: usize = 2;

/// Sentinel for "no id" slots (partner, spare actor).
pub const NO_ID: f32 = -1.0;

// Reaction kind codes
/// Reaction kind: a couple just matched.
pub const REACTION_LOVE: f32 = 0.0;
/// Reaction kind: a cat is sad.
pub const REACTION_SAD: f32 = 1.0;
/// Reaction kind: a cat got shoved.
pub const REACTION_SHOVE: f32 = 2.0;
/// Reaction kind: a cat got shoved hard.
pub const REACTION_SHOVE_HARD: f32 = 3.0;
/// Reaction kind: celebration fireworks.
pub const REACTION_FIREWORKS: f32 = 4.0;
/// Reaction kind: celebration party horn.
pub const REACTION_PARTY_HORN: f32 = 5.0;

// Cat field offsets
pub const FIELD_ID: usize = 0;
pub const FIELD_CAT_TYPE: usize = 1;
pub const FIELD_X: usize = 2;
pub const FIELD_Y: usize = 3;
pub const FIELD_VX: usize = 4;
pub const FIELD_VY: usize = 5;
pub const FIELD_IS_PLAYER: usize = 6;
pub const FIELD_IS_SINGLE: usize = 7;
pub const FIELD_PARTNER: usize = 8;
pub const FIELD_DIZZY: usize = 9;
pub const FIELD_TRAIL_EMIT: usize = 10;

// Event field offsets
pub const EVENT_FIELD_KIND: usize = 0;
pub const EVENT_FIELD_ACTOR_A: usize = 1;
pub const EVENT_FIELD_ACTOR_B: usize = 2;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Convert a snapshot cat-type name to its numeric id.
#[inline]
pub fn cat_type_to_id(cat_type: &str) -> f32 {
    match cat_type {
        "cupidCat" => 0.0,
        "blackCat" => 1.0,
        "christmasCat" => 2.0,
        "classicCat" => 3.0,
        "grayCat" => 4.0,
        "triCat" => 5.0,
        _ => 0.0,
    }
}

/// Convert a snapshot reaction kind to its numeric code.
#[inline]
pub fn reaction_kind_to_code(kind: &str) -> f32 {
    match kind {
        "love" => REACTION_LOVE,
        "sad" => REACTION_SAD,
        "shove" => REACTION_SHOVE,
        "shoveHard" => REACTION_SHOVE_HARD,
        "fireworks" => REACTION_FIREWORKS,
        "partyHorn" => REACTION_PARTY_HORN,
        _ => REACTION_LOVE,
    }
}

/// Number of audio clips in the pool for a reaction kind code. The audio
/// layer picks a random index below this when the event fires.
#[inline]
pub fn clip_pool_size(kind_code: f32) -> usize {
    if kind_code == REACTION_LOVE {
        3
    } else if kind_code == REACTION_SAD {
        3
    } else if kind_code == REACTION_SHOVE {
        2
    } else if kind_code == REACTION_SHOVE_HARD {
        2
    } else if kind_code == REACTION_FIREWORKS {
        4
    } else if kind_code == REACTION_PARTY_HORN {
        1
    } else {
        0
    }
}

/// Buffer offset of a cat record.
#[inline]
pub const fn cat_offset(cat_index: usize) -> usize {
    HEADER_SIZE + cat_index * CAT_STRIDE
}

/// Buffer offset of an event record.
#[inline]
pub const fn event_offset(event_index: usize, cat_count: usize) -> usize {
    HEADER_SIZE + cat_count * CAT_STRIDE + event_index * EVENT_STRIDE
}

/// Required buffer size for the given counts.
#[inline]
pub const fn calculate_buffer_size(cat_count: usize, event_count: usize) -> usize {
    HEADER_SIZE + cat_count * CAT_STRIDE + event_count * EVENT_STRIDE
}

// ============================================================================
// MAIN SERIALIZATION FUNCTION
// ============================================================================

/// Convert a simulation snapshot to a flat buffer for the presentation
/// layer. See the module documentation for the layout.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let cat_count = snapshot.cats.len();
    let event_count = snapshot.reactions.len();
    let buffer_size = calculate_buffer_size(cat_count, event_count);

    let mut buffer = Vec::with_capacity(buffer_size);

    buffer.push(cat_count as f32);
    buffer.push(event_count as f32);

    for cat in &snapshot.cats {
        buffer.push(cat.id as f32);
        buffer.push(cat_type_to_id(&cat.cat_type));
        buffer.push(cat.x);
        buffer.push(cat.y);
        buffer.push(cat.vx);
        buffer.push(cat.vy);
        buffer.push(if cat.is_player { 1.0 } else { 0.0 });
        buffer.push(if cat.is_single { 1.0 } else { 0.0 });
        buffer.push(cat.partner.map(|id| id as f32).unwrap_or(NO_ID));
        buffer.push(cat.dizzy_remaining);
        buffer.push(if cat.trail_emit { 1.0 } else { 0.0 });
    }

    for event in &snapshot.reactions {
        buffer.push(reaction_kind_to_code(&event.kind));
        buffer.push(event.actors.first().map(|&id| id as f32).unwrap_or(NO_ID));
        buffer.push(event.actors.get(1).map(|&id| id as f32).unwrap_or(NO_ID));
    }

    debug_assert_eq!(buffer.len(), buffer_size, "Buffer size mismatch");
    buffer
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SimWorld;
    use crate::components::CatType;
    use crate::world::{CatSnapshot, ReactionSnapshot};

    #[test]
    fn test_flatbuffer_empty() {
        let mut sim = SimWorld::new();
        let buffer = snapshot_to_flatbuffer(&sim.snapshot());

        assert_eq!(buffer.len(), HEADER_SIZE);
        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[1], 0.0);
    }

    #[test]
    fn test_flatbuffer_with_cats() {
        let mut sim = SimWorld::new();
        let player = sim.spawn_player(2.0, 3.0);
        let cat = sim.spawn_mingling_cat_at(10.0, -4.0, CatType::GrayCat);

        let buffer = snapshot_to_flatbuffer(&sim.snapshot());

        let cat_count = buffer[0] as usize;
        assert_eq!(cat_count, 2);
        assert_eq!(buffer.len(), calculate_buffer_size(2, 0));

        // Cats are ordered by id, player was spawned first.
        let offset = cat_offset(0);
        assert_eq!(buffer[offset + FIELD_ID], player as f32);
        assert_eq!(buffer[offset + FIELD_CAT_TYPE], 0.0); // cupidCat
        assert_eq!(buffer[offset + FIELD_X], 2.0);
        assert_eq!(buffer[offset + FIELD_Y], 3.0);
        assert_eq!(buffer[offset + FIELD_IS_PLAYER], 1.0);
        assert_eq!(buffer[offset + FIELD_PARTNER], NO_ID);

        let offset = cat_offset(1);
        assert_eq!(buffer[offset + FIELD_ID], cat as f32);
        assert_eq!(buffer[offset + FIELD_CAT_TYPE], 4.0); // grayCat
        assert_eq!(buffer[offset + FIELD_IS_SINGLE], 1.0);
    }

    #[test]
    fn test_flatbuffer_encodes_events() {
        let snapshot = Snapshot {
            tick: 1,
            time: 0.0,
            cats: vec![],
            reactions: vec![
                ReactionSnapshot {
                    kind: "love".to_string(),
                    actors: vec![4, 7],
                },
                ReactionSnapshot {
                    kind: "partyHorn".to_string(),
                    actors: vec![4],
                },
            ],
        };

        let buffer = snapshot_to_flatbuffer(&snapshot);
        assert_eq!(buffer[1], 2.0);

        let offset = event_offset(0, 0);
        assert_eq!(buffer[offset + EVENT_FIELD_KIND], REACTION_LOVE);
        assert_eq!(buffer[offset + EVENT_FIELD_ACTOR_A], 4.0);
        assert_eq!(buffer[offset + EVENT_FIELD_ACTOR_B], 7.0);

        let offset = event_offset(1, 0);
        assert_eq!(buffer[offset + EVENT_FIELD_KIND], REACTION_PARTY_HORN);
        assert_eq!(buffer[offset + EVENT_FIELD_ACTOR_A], 4.0);
        assert_eq!(buffer[offset + EVENT_FIELD_ACTOR_B], NO_ID);
    }

    #[test]
    fn test_flatbuffer_determinism() {
        let build = || {
            let mut sim = SimWorld::new();
            sim.spawn_player(0.0, 0.0);
            sim.spawn_mingling_cat_at(5.0, 5.0, CatType::TriCat);
            for _ in 0..10 {
                sim.step(1.0 / 60.0);
            }
            snapshot_to_flatbuffer(&sim.snapshot())
        };

        assert_eq!(build(), build(), "identical runs must serialize identically");
    }

    #[test]
    fn test_partner_field_roundtrip() {
        let snapshot = Snapshot {
            tick: 0,
            time: 0.0,
            cats: vec![CatSnapshot {
                id: 3,
                cat_type: "blackCat".to_string(),
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
                is_player: false,
                is_single: false,
                partner: Some(9),
                dizzy_remaining: 1.5,
                trail_emit: false,
            }],
            reactions: vec![],
        };

        let buffer = snapshot_to_flatbuffer(&snapshot);
        let offset = cat_offset(0);
        assert_eq!(buffer[offset + FIELD_PARTNER], 9.0);
        assert_eq!(buffer[offset + FIELD_DIZZY], 1.5);
        assert_eq!(buffer[offset + FIELD_IS_SINGLE], 0.0);
    }

    #[test]
    fn test_clip_pools_match_asset_table() {
        assert_eq!(clip_pool_size(REACTION_LOVE), 3);
        assert_eq!(clip_pool_size(REACTION_SAD), 3);
        assert_eq!(clip_pool_size(REACTION_SHOVE), 2);
        assert_eq!(clip_pool_size(REACTION_SHOVE_HARD), 2);
        assert_eq!(clip_pool_size(REACTION_FIREWORKS), 4);
        assert_eq!(clip_pool_size(REACTION_PARTY_HORN), 1);
    }

    #[test]
    fn test_field_offsets_are_valid() {
        assert!(FIELD_ID < CAT_STRIDE);
        assert!(FIELD_CAT_TYPE < CAT_STRIDE);
        assert!(FIELD_X < CAT_STRIDE);
        assert!(FIELD_Y < CAT_STRIDE);
        assert!(FIELD_VX < CAT_STRIDE);
        assert!(FIELD_VY < CAT_STRIDE);
        assert!(FIELD_IS_PLAYER < CAT_STRIDE);
        assert!(FIELD_IS_SINGLE < CAT_STRIDE);
        assert!(FIELD_PARTNER < CAT_STRIDE);
        assert!(FIELD_DIZZY < CAT_STRIDE);
        assert!(FIELD_TRAIL_EMIT < CAT_STRIDE);
        assert_eq!(CAT_STRIDE, FIELD_TRAIL_EMIT + 1);

        assert_eq!(EVENT_STRIDE, EVENT_FIELD_ACTOR_B + 1);
    }
}
