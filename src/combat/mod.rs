//! Encounter combat: enemies seek the player, the player throws
//! projectiles, and the encounter ends in victory or defeat.
//!
//! The simulation is single-threaded and frame-driven. The host calls
//! [`Encounter::tick`] once per rendered frame and pushes throw input and
//! presentation-mode changes between frames. Randomness comes from a
//! seeded generator owned by the encounter, so a given seed replays the
//! same fight.

mod encounter;
pub mod enemy;
pub mod projectile;
pub mod spawn;

pub use encounter::{
    Encounter, EncounterOutcome, EncounterState, FrameInput, FrameReport, HitReaction, HitResult,
    ThrowError,
};
pub use enemy::{check_defeat, Enemy, EnemyId, SeekStep, SpinState};
pub use projectile::{Projectile, ProjectileId, ThrowProfile};
pub use spawn::{spawn_encounter, EncounterSource, EnemyIds};

/// How the host is presenting the encounter.
///
/// Switching mode changes the ballistics of subsequent frames and throws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresentationMode {
    /// Camera passthrough AR session.
    Immersive,
    /// On-screen 3D scene used when AR is unavailable.
    #[default]
    Screen,
}
