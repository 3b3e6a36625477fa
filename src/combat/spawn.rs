//! Enemy placement for encounter start and respawns.
//!
//! All positions are relative to the player, who stands at the centre of
//! every ring.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::enemy::{Enemy, EnemyId};
use crate::events::NavigationEvent;
use crate::location::SpriteRef;
use crate::numeric::count_to_f32;
use crate::vector_math::ring_point;
use crate::{
    BOSS_HEIGHT_MAX, BOSS_HEIGHT_MIN, BOSS_LIVES, BOSS_RING_MAX, BOSS_RING_MIN, BOSS_SPEED,
    FACE_SPRITE_COUNT, MINION_LIVES, MINION_RING_MAX, MINION_RING_MIN, MINION_SPEED,
    NORMAL_ENEMY_LIVES, NORMAL_ENEMY_SPEED, NORMAL_HEIGHT_MAX, NORMAL_HEIGHT_MIN,
    NORMAL_RING_JITTER, NORMAL_RING_RADIUS, RESPAWN_RING_MAX, RESPAWN_RING_MIN,
};

/// What an encounter is fought against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncounterSource {
    /// Regular enemies, one per sprite.
    Normal {
        /// Faces of the opening enemies.
        sprites: Vec<SpriteRef>,
    },
    /// A single boss.
    Boss {
        /// Boss face.
        sprite: SpriteRef,
        /// Ladder rung being fought.
        boss_index: u32,
    },
}

impl EncounterSource {
    /// Source for an entry event; `None` for outcome events.
    #[must_use]
    pub fn from_event(event: &NavigationEvent) -> Option<Self> {
        match event {
            NavigationEvent::EnterNormalEncounter { sprite, .. } => Some(Self::Normal {
                sprites: vec![sprite.clone()],
            }),
            NavigationEvent::EnterBossEncounter {
                sprite, boss_index, ..
            } => Some(Self::Boss {
                sprite: sprite.clone(),
                boss_index: *boss_index,
            }),
            NavigationEvent::Victory { .. } | NavigationEvent::Defeat => None,
        }
    }

    /// Whether this source opens a boss fight.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        matches!(self, Self::Boss { .. })
    }
}

/// Hands out enemy ids unique within one encounter.
#[derive(Debug, Default, Clone)]
pub struct EnemyIds {
    next: u32,
}

impl EnemyIds {
    /// The next unused id.
    pub const fn allocate(&mut self) -> EnemyId {
        let id = EnemyId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

fn random_face<R: Rng + ?Sized>(rng: &mut R) -> SpriteRef {
    SpriteRef::face(rng.gen_range(1..=FACE_SPRITE_COUNT))
}

fn random_ring_point<R: Rng + ?Sized>(
    rng: &mut R,
    centre: Vec3,
    radius: (f32, f32),
    height: (f32, f32),
) -> Vec3 {
    let distance = rng.gen_range(radius.0..=radius.1);
    let angle = rng.gen_range(0.0..TAU);
    let y = rng.gen_range(height.0..=height.1);
    ring_point(centre, distance, angle, y)
}

/// Random point 10–15 units out and 1–5 units up.
pub fn boss_position<R: Rng + ?Sized>(rng: &mut R, centre: Vec3) -> Vec3 {
    random_ring_point(
        rng,
        centre,
        (BOSS_RING_MIN, BOSS_RING_MAX),
        (BOSS_HEIGHT_MIN, BOSS_HEIGHT_MAX),
    )
}

/// Random knock-back point for a hit enemy.
pub fn respawn_position<R: Rng + ?Sized>(rng: &mut R, centre: Vec3, is_boss: bool) -> Vec3 {
    let height = if is_boss {
        (BOSS_HEIGHT_MIN, BOSS_HEIGHT_MAX)
    } else {
        (NORMAL_HEIGHT_MIN, NORMAL_HEIGHT_MAX)
    };
    random_ring_point(rng, centre, (RESPAWN_RING_MIN, RESPAWN_RING_MAX), height)
}

/// Random far point 15–25 units out for an enemy dropped by a boss.
pub fn minion_position<R: Rng + ?Sized>(rng: &mut R, centre: Vec3) -> Vec3 {
    random_ring_point(
        rng,
        centre,
        (MINION_RING_MIN, MINION_RING_MAX),
        (NORMAL_HEIGHT_MIN, NORMAL_HEIGHT_MAX),
    )
}

/// `count` points evenly spaced around the fixed ring, each nudged by a
/// random angular jitter.
pub fn normal_ring_positions<R: Rng + ?Sized>(rng: &mut R, centre: Vec3, count: usize) -> Vec<Vec3> {
    let step = TAU / count_to_f32(count.max(1));
    (0..count)
        .map(|slot| {
            let jitter = rng.gen_range(-NORMAL_RING_JITTER..=NORMAL_RING_JITTER);
            let height = rng.gen_range(NORMAL_HEIGHT_MIN..=NORMAL_HEIGHT_MAX);
            ring_point(
                centre,
                NORMAL_RING_RADIUS,
                step * count_to_f32(slot) + jitter,
                height,
            )
        })
        .collect()
}

/// A one-life enemy dropped by a boss.
pub fn spawn_minion<R: Rng + ?Sized>(rng: &mut R, ids: &mut EnemyIds, centre: Vec3) -> Enemy {
    Enemy::new(
        ids.allocate(),
        random_face(rng),
        minion_position(rng, centre),
        MINION_LIVES,
        MINION_SPEED,
        false,
    )
}

/// Creates the opening enemy set.
///
/// A boss source yields one four-life boss. A normal source yields one
/// two-life enemy per sprite plus one extra random-faced enemy per boss
/// already beaten (`defeated_bosses`).
pub fn spawn_encounter<R: Rng + ?Sized>(
    source: &EncounterSource,
    defeated_bosses: u32,
    rng: &mut R,
    ids: &mut EnemyIds,
) -> Vec<Enemy> {
    match source {
        EncounterSource::Boss { sprite, .. } => vec![Enemy::new(
            ids.allocate(),
            sprite.clone(),
            boss_position(rng, Vec3::ZERO),
            BOSS_LIVES,
            BOSS_SPEED,
            true,
        )],
        EncounterSource::Normal { sprites } => {
            let mut faces = sprites.clone();
            faces.extend((0..defeated_bosses).map(|_| random_face(rng)));
            let positions = normal_ring_positions(rng, Vec3::ZERO, faces.len());
            faces
                .into_iter()
                .zip(positions)
                .map(|(sprite, position)| {
                    Enemy::new(
                        ids.allocate(),
                        sprite,
                        position,
                        NORMAL_ENEMY_LIVES,
                        NORMAL_ENEMY_SPEED,
                        false,
                    )
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::{fixture, rstest};

    #[fixture]
    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn flat_distance(p: Vec3) -> f32 {
        Vec3::new(p.x, 0.0, p.z).length()
    }

    #[rstest]
    fn boss_spawns_alone_on_its_ring(mut rng: StdRng) {
        let source = EncounterSource::Boss {
            sprite: SpriteRef::boss(1),
            boss_index: 0,
        };
        let enemies = spawn_encounter(&source, 3, &mut rng, &mut EnemyIds::default());
        let [boss] = enemies.as_slice() else {
            panic!("expected a single boss, got {enemies:?}");
        };
        assert!(boss.is_boss);
        assert_eq!(boss.lives, 4);
        let d = flat_distance(boss.position);
        assert!((BOSS_RING_MIN - 1e-3..=BOSS_RING_MAX + 1e-3).contains(&d), "distance {d}");
        assert!((BOSS_HEIGHT_MIN..=BOSS_HEIGHT_MAX).contains(&boss.position.y));
    }

    #[rstest]
    #[case::fresh_ladder(0, 1)]
    #[case::two_bosses_down(2, 3)]
    fn normal_count_grows_with_defeated_bosses(
        mut rng: StdRng,
        #[case] defeated_bosses: u32,
        #[case] expected: usize,
    ) {
        let source = EncounterSource::Normal {
            sprites: vec![SpriteRef::face(2)],
        };
        let enemies = spawn_encounter(&source, defeated_bosses, &mut rng, &mut EnemyIds::default());
        assert_eq!(enemies.len(), expected);
        assert!(enemies.iter().all(|e| e.lives == 2 && !e.is_boss));
        assert_eq!(enemies.first().map(|e| &e.sprite), Some(&SpriteRef::face(2)));
    }

    #[rstest]
    fn ring_positions_are_spread_out(mut rng: StdRng) {
        let positions = normal_ring_positions(&mut rng, Vec3::ZERO, 4);
        for p in &positions {
            let d = flat_distance(*p);
            assert!((d - NORMAL_RING_RADIUS).abs() < 1e-3, "distance {d}");
        }
        // Neighbouring slots sit a quarter turn apart, so even with jitter
        // they never collapse onto each other.
        for pair in positions.windows(2) {
            if let [a, b] = pair {
                assert!(a.distance(*b) > 5.0);
            }
        }
    }

    #[rstest]
    fn minions_land_far_out(mut rng: StdRng) {
        let minion = spawn_minion(&mut rng, &mut EnemyIds::default(), Vec3::ZERO);
        let d = flat_distance(minion.position);
        assert!((MINION_RING_MIN - 1e-3..=MINION_RING_MAX + 1e-3).contains(&d));
        assert_eq!(minion.lives, 1);
    }

    #[rstest]
    fn ids_are_unique() {
        let mut ids = EnemyIds::default();
        assert_ne!(ids.allocate(), ids.allocate());
    }
}
