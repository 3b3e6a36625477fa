//! Utility helpers for tests.
//!
//! Builders place map features at a bearing and distance from an origin,
//! so scenarios read in metres rather than raw coordinates.

pub mod encounters;
pub mod locations;

pub use encounters::{boss_encounter, hit_until_removed, normal_encounter};
pub use locations::{boss_at, boss_ladder, feature_at, location_at, ORIGIN};
