//! Navigation events handed to the presentation layer.
//!
//! These are the only contract surface between the engine and whatever
//! draws the map and the encounter view.

use serde::Serialize;

use crate::location::{LocationId, SpriteRef};

/// What the presentation layer should show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavigationEvent {
    /// The player entered a regular location.
    EnterNormalEncounter {
        /// The consumed site.
        location: LocationId,
        /// Face drawn for the site's enemy.
        sprite: SpriteRef,
    },
    /// The player entered the active boss location.
    EnterBossEncounter {
        /// The ladder site entered.
        location: LocationId,
        /// Boss face for this rung.
        sprite: SpriteRef,
        /// Zero-based rung of the boss ladder being fought.
        boss_index: u32,
    },
    /// Every enemy in the encounter was removed.
    Victory {
        /// Whether the encounter was a boss fight.
        was_boss: bool,
    },
    /// An enemy reached the player, or the encounter was abandoned.
    Defeat,
}

impl NavigationEvent {
    /// Whether this event opens a boss fight.
    #[must_use]
    pub const fn is_boss_encounter(&self) -> bool {
        matches!(self, Self::EnterBossEncounter { .. })
    }
}
