//! Pairing system - the social state machine promoting singles to couples.
//!
//! The only transition is `Single -> Matched`; couples never separate.
//! Each tick the scan walks every single mingling cat, looks for another
//! single within pairing distance, and performs the transition through the
//! single `pair` operation so partner references are always symmetric.
//! Shoves and dizziness are transient movement effects, not states here.

use crate::api::SimConfig;
use crate::components::*;
use crate::components::Single;
use crate::spatial::SpatialGrid;
use bevy_ecs::prelude::*;
use std::collections::HashSet;

/// Seconds a match celebration actor lives.
const CELEBRATION_LIFETIME: f32 = 2.5;

/// Match two singles: clear `Single` on both, set `Partner` on both.
///
/// This is the only place partner references are written, which keeps the
/// symmetry invariant local to one operation.
pub fn pair(commands: &mut Commands, a: Entity, b: Entity) {
    commands.entity(a).remove::<Single>().insert(Partner(b));
    commands.entity(b).remove::<Single>().insert(Partner(a));
}

/// System scanning single mingling cats for partners in range.
///
/// Each cat matches at most once per tick. On a match the couple's
/// reaction events are spawned along with a short-lived celebration actor
/// between the two.
pub fn pairing_system(
    mut commands: Commands,
    config: Res<SimConfig>,
    grid: Res<SpatialGrid>,
    query: Query<(Entity, &Position, &CatId), (With<MinglingCat>, With<Single>)>,
) {
    let mut matched: HashSet<Entity> = HashSet::new();

    for (entity, pos, id) in query.iter() {
        if matched.contains(&entity) {
            continue;
        }

        let candidate = grid
            .query_eligible(entity, pos.x, pos.y, config.pairing_distance)
            .into_iter()
            .find(|c| !matched.contains(&c.entity));

        let Some(candidate) = candidate else {
            continue;
        };
        // The grid snapshot can lag one tick behind despawns; take the
        // partner's live components or skip.
        let Ok((partner_entity, partner_pos, partner_id)) = query.get(candidate.entity) else {
            continue;
        };

        matched.insert(entity);
        matched.insert(partner_entity);
        pair(&mut commands, entity, partner_entity);

        let actors = vec![id.0, partner_id.0];
        commands.spawn(ReactionEvent {
            kind: ReactionKind::Love,
            actors: actors.clone(),
        });
        commands.spawn(ReactionEvent {
            kind: ReactionKind::Fireworks,
            actors: actors.clone(),
        });
        commands.spawn(ReactionEvent {
            kind: ReactionKind::PartyHorn,
            actors,
        });

        let cx = (pos.x + partner_pos.x) * 0.5;
        let cy = (pos.y + partner_pos.y) * 0.5;
        commands.spawn(CelebrationBundle::new(
            entity,
            partner_entity,
            cx,
            cy,
            CELEBRATION_LIFETIME,
        ));

        log::debug!("cats {} and {} matched", id.0, partner_id.0);
    }
}
