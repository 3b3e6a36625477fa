//! Seeded encounter fixtures.

use std::time::Duration;

use voices::{Encounter, EncounterSource, EnemyId, HitResult, SpriteRef};

/// A regular encounter with `count` enemies and no beaten bosses.
#[must_use]
pub fn normal_encounter(count: u32, seed: u64) -> Encounter {
    let sprites = (1..=count).map(SpriteRef::face).collect();
    Encounter::with_seed(EncounterSource::Normal { sprites }, 0, seed)
}

/// A first-rung boss encounter.
#[must_use]
pub fn boss_encounter(seed: u64) -> Encounter {
    Encounter::with_seed(
        EncounterSource::Boss {
            sprite: SpriteRef::boss(1),
            boss_index: 0,
        },
        0,
        seed,
    )
}

/// Hits `id` until it is removed or the encounter stops accepting hits.
pub fn hit_until_removed(encounter: &mut Encounter, id: EnemyId) -> Vec<HitResult> {
    let mut hits = Vec::new();
    while let Some(hit) = encounter.apply_hit(id, Duration::ZERO) {
        let removed = hit.lives_left == 0;
        hits.push(hit);
        if removed {
            break;
        }
    }
    hits
}
