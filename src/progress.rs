//! Durable progress counters gating the boss ladder.
//!
//! [`Progress`] is plain data. Mutations are synchronous and
//! last-write-wins; callers persist the whole ledger after each change
//! (see [`crate::session::GameSession`]).

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_BOSS_NUMBER, DEFAULT_MAX_DEFEATED_ENEMIES};

/// Process-wide progress ledger.
///
/// Invariants: `current_boss_number <= max_boss_number`, and
/// `defeated_enemies` drops back to zero whenever the boss number advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Regular wins since the last boss victory.
    pub defeated_enemies: u32,
    /// Regular wins that open the boss gate.
    pub max_defeated_enemies: u32,
    /// Index of the next boss on the ladder.
    pub current_boss_number: u32,
    /// Highest reachable ladder index.
    pub max_boss_number: u32,
    /// Whether the intro story has been shown.
    #[serde(default, alias = "playedStory")]
    pub played_intro: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_DEFEATED_ENEMIES, DEFAULT_MAX_BOSS_NUMBER)
    }
}

impl Progress {
    /// Fresh ledger with custom thresholds.
    #[must_use]
    pub const fn with_limits(max_defeated_enemies: u32, max_boss_number: u32) -> Self {
        Self {
            defeated_enemies: 0,
            max_defeated_enemies,
            current_boss_number: 0,
            max_boss_number,
            played_intro: false,
        }
    }

    /// Whether the next encounter offered on the map is a boss fight.
    #[must_use]
    pub const fn can_face_boss(&self) -> bool {
        self.defeated_enemies >= self.max_defeated_enemies
    }

    /// Applies the result of a won encounter.
    ///
    /// A boss victory climbs one rung (clamped) and clears the defeated
    /// count; any other victory adds one defeated enemy.
    ///
    /// # Examples
    /// ```
    /// use voices::Progress;
    /// let mut progress = Progress::default();
    /// progress.record_victory(false);
    /// assert_eq!(progress.defeated_enemies, 1);
    /// progress.record_victory(true);
    /// assert_eq!((progress.current_boss_number, progress.defeated_enemies), (1, 0));
    /// ```
    pub fn record_victory(&mut self, was_boss_encounter: bool) {
        if was_boss_encounter {
            self.increment_boss_number(1);
        } else {
            self.increment_defeated_enemies(1);
        }
    }

    /// Defeat leaves the counters untouched; the host restarts its
    /// presentation state instead.
    pub fn record_defeat(&self) {
        info!(
            "encounter lost; progress stays at boss {} with {} defeated",
            self.current_boss_number, self.defeated_enemies
        );
    }

    /// Adds `count` regular wins.
    pub fn increment_defeated_enemies(&mut self, count: u32) {
        self.defeated_enemies = self.defeated_enemies.saturating_add(count);
        info!(
            "defeated enemies now {}/{}",
            self.defeated_enemies, self.max_defeated_enemies
        );
    }

    /// Advances the boss ladder by `count` rungs, clamped to
    /// `max_boss_number`, and resets the defeated count.
    pub fn increment_boss_number(&mut self, count: u32) {
        self.current_boss_number = self
            .current_boss_number
            .saturating_add(count)
            .min(self.max_boss_number);
        self.defeated_enemies = 0;
        info!(
            "boss ladder now at {}/{}",
            self.current_boss_number, self.max_boss_number
        );
    }

    /// Jumps to a specific rung.
    ///
    /// Returns `false` and leaves the ledger unchanged when `number` is
    /// outside `0..=max_boss_number`.
    pub fn set_current_boss_number(&mut self, number: i64) -> bool {
        match u32::try_from(number) {
            Ok(rung) if rung <= self.max_boss_number => {
                self.current_boss_number = rung;
                true
            }
            _ => {
                warn!(
                    "invalid boss number {number}; must be between 0 and {}",
                    self.max_boss_number
                );
                false
            }
        }
    }

    /// Records that the intro story has been shown.
    pub const fn mark_intro_played(&mut self) {
        self.played_intro = true;
    }

    /// Restores defaults while keeping the configured thresholds.
    pub const fn reset(&mut self) {
        *self = Self::with_limits(self.max_defeated_enemies, self.max_boss_number);
    }
}
