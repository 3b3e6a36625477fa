//! Enemy entities and their per-frame movement.

use std::fmt;
use std::time::Duration;

use glam::Vec3;

use crate::location::SpriteRef;
use crate::numeric::duration_fraction;
use crate::vector_math::{ring_point, seek};
use crate::{REACH_PLAYER_DISTANCE, SEEK_MOVE_THRESHOLD};

/// Identifier unique within one encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Timed orbit a boss performs around the player after some hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinState {
    /// Horizontal orbit radius.
    pub distance: f32,
    /// Encounter clock reading when the spin began.
    pub started_at: Duration,
    /// Wall-clock length of the orbit.
    pub duration: Duration,
    /// Angle swept over the whole orbit.
    pub total_rotation_rad: f32,
    /// Bearing of the boss around the player when the spin began.
    pub start_angle: f32,
}

impl SpinState {
    /// Whether the orbit is over at `now`.
    #[must_use]
    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.started_at) >= self.duration
    }

    /// Orbit position at `now`, keeping the boss at `height`.
    #[must_use]
    pub fn position_at(&self, centre: Vec3, now: Duration, height: f32) -> Vec3 {
        let progress = duration_fraction(now.saturating_sub(self.started_at), self.duration);
        let angle = self.start_angle + self.total_rotation_rad * progress;
        ring_point(centre, self.distance, angle, height)
    }
}

/// Result of one seeking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekStep {
    /// The enemy advanced towards the player.
    Moved,
    /// The enemy is close enough that it holds position.
    Holding,
    /// The enemy touched the player.
    ReachedPlayer,
}

/// A combat-session entity. Lives only as long as its encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    /// Identity within the encounter.
    pub id: EnemyId,
    /// Scene position.
    pub position: Vec3,
    /// Approach speed in units per second.
    pub speed: f32,
    /// Face drawn for the enemy.
    pub sprite: SpriteRef,
    /// Hits left before removal.
    pub lives: u32,
    /// Whether this is the encounter's boss.
    pub is_boss: bool,
    /// How many times the enemy has been knocked back and respawned.
    pub spawn_count: u32,
    /// Orbit in progress, if any.
    pub spin: Option<SpinState>,
}

impl Enemy {
    /// A fresh enemy that has never been hit.
    #[must_use]
    pub const fn new(
        id: EnemyId,
        sprite: SpriteRef,
        position: Vec3,
        lives: u32,
        speed: f32,
        is_boss: bool,
    ) -> Self {
        Self {
            id,
            position,
            speed,
            sprite,
            lives,
            is_boss,
            spawn_count: 0,
            spin: None,
        }
    }

    /// Whether a spin currently overrides seeking.
    #[must_use]
    pub const fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    /// Moves the enemy towards `player` for `delta_seconds`.
    ///
    /// Reaching the player is judged on the distance before moving.
    pub fn seek_step(&mut self, player: Vec3, delta_seconds: f32) -> SeekStep {
        let towards = seek(self.position, player);
        if check_defeat(self, player) {
            return SeekStep::ReachedPlayer;
        }
        if towards.distance > SEEK_MOVE_THRESHOLD {
            self.position += towards.direction * self.speed * delta_seconds;
            SeekStep::Moved
        } else {
            SeekStep::Holding
        }
    }

    /// Advances an active spin. Returns `true` on the frame it completes.
    pub fn spin_step(&mut self, player: Vec3, now: Duration) -> bool {
        let Some(spin) = self.spin else {
            return false;
        };
        self.position = spin.position_at(player, now, self.position.y);
        if spin.is_finished(now) {
            self.spin = None;
            return true;
        }
        false
    }
}

/// Whether `enemy` is close enough to `player` to end the encounter.
///
/// Enemies with no lives left never count.
#[must_use]
pub fn check_defeat(enemy: &Enemy, player: Vec3) -> bool {
    enemy.lives > 0 && seek(enemy.position, player).distance < REACH_PLAYER_DISTANCE
}
