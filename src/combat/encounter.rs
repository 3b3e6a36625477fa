//! The per-frame combat simulation.

use std::time::Duration;

use glam::Vec3;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use super::enemy::{Enemy, EnemyId, SeekStep, SpinState};
use super::projectile::{Projectile, ProjectileId, ThrowProfile};
use super::spawn::{respawn_position, spawn_encounter, spawn_minion, EncounterSource, EnemyIds};
use super::PresentationMode;
use crate::{BOSS_RING_MIN, HIT_RADIUS, SPIN_DURATION, SPIN_ROTATION_RAD, THROW_DEBOUNCE};

/// Boss life total at which a hit triggers a plain respawn and drops a
/// minion instead of starting a spin.
const BOSS_SPLIT_LIVES: u32 = 2;

/// Lifecycle of an encounter. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterState {
    /// Enemies remain and none has reached the player.
    Active,
    /// Every enemy was removed.
    Victory,
    /// An enemy reached the player, or the encounter was abandoned.
    Defeat,
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    /// The player cleared the encounter.
    Victory {
        /// Whether it was a boss fight.
        was_boss: bool,
    },
    /// The player lost or left.
    Defeat,
}

/// What a hit did to the enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitReaction {
    /// Knocked back to a random point.
    Respawned,
    /// A boss started orbiting the player.
    Spinning,
    /// Out of lives and removed.
    Removed,
}

/// Resolution of one projectile striking one enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitResult {
    /// The enemy struck.
    pub enemy: EnemyId,
    /// Its lives after the hit.
    pub lives_left: u32,
    /// What the enemy did in response.
    pub reaction: HitReaction,
    /// Enemy dropped by a boss as a side effect of this hit.
    pub spawned: Option<EnemyId>,
    /// Set when this hit ended the encounter.
    pub outcome: Option<EncounterOutcome>,
}

/// Rejected throw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ThrowError {
    /// Inside the debounce window of the previous throw.
    #[error("throw ignored: previous throw was less than {}ms ago", THROW_DEBOUNCE.as_millis())]
    Debounced,
    /// The encounter already has an outcome.
    #[error("throw ignored: the encounter is over")]
    EncounterOver,
    /// The forward vector is zero or not finite.
    #[error("throw ignored: aim direction is not usable")]
    MalformedAim,
}

/// Host-supplied state for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Encounter clock, monotonic and independent of frame rate.
    pub now: Duration,
    /// Seconds elapsed since the previous frame.
    pub delta_seconds: f32,
    /// Player (camera) position in scene units.
    pub player: Vec3,
}

/// Everything that happened during one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Hits resolved this frame, in order.
    pub hits: Vec<HitResult>,
    /// Projectiles that fell below the floor.
    pub lost_projectiles: usize,
    /// Set when the encounter ended this frame.
    pub outcome: Option<EncounterOutcome>,
}

/// One combat session. `Active` until it reaches `Victory` or `Defeat`;
/// terminal encounters ignore further input.
#[derive(Debug, Clone)]
pub struct Encounter {
    source: EncounterSource,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    enemy_ids: EnemyIds,
    next_projectile: u32,
    rng: StdRng,
    mode: PresentationMode,
    state: EncounterState,
    player: Vec3,
    last_throw: Option<Duration>,
}

impl Encounter {
    /// Starts an encounter. `defeated_bosses` adds extra regular enemies.
    #[must_use]
    pub fn new(source: EncounterSource, defeated_bosses: u32, mut rng: StdRng) -> Self {
        let mut enemy_ids = EnemyIds::default();
        let enemies = spawn_encounter(&source, defeated_bosses, &mut rng, &mut enemy_ids);
        info!(
            "{} encounter started with {} enemies",
            if source.is_boss() { "boss" } else { "normal" },
            enemies.len()
        );
        Self {
            source,
            enemies,
            projectiles: Vec::new(),
            enemy_ids,
            next_projectile: 0,
            rng,
            mode: PresentationMode::default(),
            state: EncounterState::Active,
            player: Vec3::ZERO,
            last_throw: None,
        }
    }

    /// Like [`Self::new`] with a seeded generator.
    #[must_use]
    pub fn with_seed(source: EncounterSource, defeated_bosses: u32, seed: u64) -> Self {
        Self::new(source, defeated_bosses, StdRng::seed_from_u64(seed))
    }

    /// What the encounter was opened for.
    #[must_use]
    pub const fn source(&self) -> &EncounterSource {
        &self.source
    }

    /// Whether this is a boss fight.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        self.source.is_boss()
    }

    /// Enemies still in play.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Looks up a live enemy.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EncounterState {
        self.state
    }

    /// Active presentation mode.
    #[must_use]
    pub const fn mode(&self) -> PresentationMode {
        self.mode
    }

    /// Mode change pushed by the host when the view enters or leaves an
    /// immersive session.
    pub fn set_mode(&mut self, mode: PresentationMode) {
        if self.mode != mode {
            debug!("presentation mode {:?} -> {mode:?}", self.mode);
            self.mode = mode;
        }
    }

    /// The outcome once the encounter has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<EncounterOutcome> {
        match self.state {
            EncounterState::Active => None,
            EncounterState::Victory => Some(EncounterOutcome::Victory {
                was_boss: self.source.is_boss(),
            }),
            EncounterState::Defeat => Some(EncounterOutcome::Defeat),
        }
    }

    /// True once every enemy has been removed.
    #[must_use]
    pub const fn check_victory(&self) -> bool {
        self.enemies.is_empty()
    }

    fn finish(&mut self, state: EncounterState) -> Option<EncounterOutcome> {
        self.state = state;
        let outcome = self.outcome();
        info!("encounter finished: {outcome:?}");
        outcome
    }

    fn settle_victory(&mut self) -> Option<EncounterOutcome> {
        if self.state == EncounterState::Active && self.check_victory() {
            return self.finish(EncounterState::Victory);
        }
        None
    }

    /// Leaving the view mid-fight counts as a defeat.
    pub fn abandon(&mut self) -> Option<EncounterOutcome> {
        if self.state != EncounterState::Active {
            return None;
        }
        self.projectiles.clear();
        self.finish(EncounterState::Defeat)
    }

    /// Resolves a hit on `id` and then checks for victory.
    ///
    /// Returns `None` when the encounter is over or the enemy is unknown.
    pub fn apply_hit(&mut self, id: EnemyId, now: Duration) -> Option<HitResult> {
        if self.state != EncounterState::Active {
            return None;
        }
        let mut hit = self.resolve_hit(id, now)?;
        hit.outcome = self.settle_victory();
        Some(hit)
    }

    fn resolve_hit(&mut self, id: EnemyId, now: Duration) -> Option<HitResult> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        let player = self.player;
        let enemy = self.enemies.get_mut(index)?;
        enemy.lives = enemy.lives.saturating_sub(1);
        let lives_left = enemy.lives;
        let is_boss = enemy.is_boss;

        let reaction = if lives_left == 0 {
            HitReaction::Removed
        } else if is_boss && lives_left != BOSS_SPLIT_LIVES {
            let offset = Vec3::new(enemy.position.x - player.x, 0.0, enemy.position.z - player.z);
            let distance = offset.length();
            enemy.spin = Some(SpinState {
                distance: if distance > 0.0 { distance } else { BOSS_RING_MIN },
                started_at: now,
                duration: SPIN_DURATION,
                total_rotation_rad: SPIN_ROTATION_RAD,
                start_angle: offset.z.atan2(offset.x),
            });
            enemy.spawn_count += 1;
            HitReaction::Spinning
        } else {
            enemy.spin = None;
            enemy.position = respawn_position(&mut self.rng, player, is_boss);
            enemy.spawn_count += 1;
            HitReaction::Respawned
        };

        let drops_minion = is_boss && (lives_left == 0 || lives_left == BOSS_SPLIT_LIVES);
        let spawned = drops_minion.then(|| {
            let minion = spawn_minion(&mut self.rng, &mut self.enemy_ids, player);
            let minion_id = minion.id;
            self.enemies.push(minion);
            minion_id
        });

        if reaction == HitReaction::Removed {
            self.enemies.retain(|e| e.id != id);
        }
        debug!("{id} hit: {reaction:?}, {lives_left} lives left, spawned {spawned:?}");
        Some(HitResult {
            enemy: id,
            lives_left,
            reaction,
            spawned,
            outcome: None,
        })
    }

    /// Creates a projectile at `origin` flying along `forward`.
    ///
    /// # Errors
    /// Rejects throws after the encounter ended, throws within the debounce
    /// window of the previous one, and aims that are zero or not finite.
    pub fn throw(&mut self, now: Duration, origin: Vec3, forward: Vec3) -> Result<ProjectileId, ThrowError> {
        if self.state != EncounterState::Active {
            return Err(ThrowError::EncounterOver);
        }
        if !origin.is_finite() || !forward.is_finite() || forward.length_squared() == 0.0 {
            return Err(ThrowError::MalformedAim);
        }
        if self
            .last_throw
            .is_some_and(|last| now.saturating_sub(last) < THROW_DEBOUNCE)
        {
            debug!("throw rejected by debounce");
            return Err(ThrowError::Debounced);
        }
        self.last_throw = Some(now);

        let id = ProjectileId(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        let velocity = ThrowProfile::for_mode(self.mode).launch_velocity(forward);
        self.projectiles.push(Projectile {
            id,
            position: origin,
            velocity,
            created_at: now,
        });
        debug!("projectile {} thrown with velocity {velocity}", id.0);
        Ok(id)
    }

    /// Advances the simulation by one frame.
    ///
    /// Enemies move first; one reaching the player ends the encounter in
    /// defeat straight away. Projectiles then fly and resolve hits, and the
    /// victory check runs once all hits of the frame are applied.
    pub fn tick(&mut self, input: FrameInput) -> FrameReport {
        let mut report = FrameReport::default();
        if self.state != EncounterState::Active {
            return report;
        }
        let delta = if input.delta_seconds.is_finite() {
            input.delta_seconds.max(0.0)
        } else {
            0.0
        };
        if input.player.is_finite() {
            self.player = input.player;
        }

        if self.advance_enemies(input.now, delta) {
            report.outcome = self.finish(EncounterState::Defeat);
            return report;
        }

        let gravity = ThrowProfile::for_mode(self.mode).gravity;
        let in_flight = std::mem::take(&mut self.projectiles);
        for mut projectile in in_flight {
            projectile.integrate(gravity, delta);
            let target = self
                .enemies
                .iter()
                .find(|e| e.position.distance(projectile.position) < HIT_RADIUS)
                .map(|e| e.id);
            if let Some(enemy) = target {
                report.hits.extend(self.resolve_hit(enemy, input.now));
            } else if projectile.is_lost() {
                debug!("projectile {} lost", projectile.id.0);
                report.lost_projectiles += 1;
            } else {
                self.projectiles.push(projectile);
            }
        }

        report.outcome = self.settle_victory();
        report
    }

    /// Moves every enemy. Returns `true` when one reached the player.
    fn advance_enemies(&mut self, now: Duration, delta: f32) -> bool {
        let player = self.player;
        for enemy in &mut self.enemies {
            if enemy.is_spinning() {
                if enemy.spin_step(player, now) {
                    debug!("{} finished spinning", enemy.id);
                }
                continue;
            }
            if enemy.seek_step(player, delta) == SeekStep::ReachedPlayer {
                info!("{} reached the player", enemy.id);
                return true;
            }
        }
        false
    }
}
