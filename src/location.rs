//! Encounter sites sourced from the point-of-interest service.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Source feature identifier of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub i64);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset path of a sprite drawn for an enemy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteRef(String);

impl SpriteRef {
    /// Wraps an arbitrary asset path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Face sprite `index` (1-based) used by regular enemies.
    #[must_use]
    pub fn face(index: u32) -> Self {
        Self(format!("/faces/face{index}.png"))
    }

    /// Boss sprite for ladder rung `number` (1-based).
    #[must_use]
    pub fn boss(number: u32) -> Self {
        Self(format!("/bosses/boss{number}.png"))
    }

    /// The asset path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpriteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form tags attached to a feature by the map data service.
pub type Tags = std::collections::BTreeMap<String, String>;

/// A regular encounter site.
///
/// Immutable once fetched. It is removed from the cache when the player
/// enters it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Source feature id.
    pub id: LocationId,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Display name.
    pub name: String,
    /// Amenity category.
    pub category: String,
    /// Source tags.
    #[serde(default)]
    pub tags: Tags,
    /// Face drawn for the enemy met here.
    pub sprite_ref: SpriteRef,
}

impl Location {
    /// The site as a map coordinate.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// A rung on the boss ladder.
///
/// Boss locations are never consumed; the same site can host several boss
/// fights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossLocation {
    /// Source feature id.
    pub id: LocationId,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Display name.
    pub name: String,
    /// Amenity category.
    pub category: String,
    /// Source tags.
    #[serde(default)]
    pub tags: Tags,
    /// Boss face assigned to this rung when the ladder was ranked.
    pub boss_sprite_ref: SpriteRef,
    /// Distance in kilometres from the player when the ladder was ranked.
    pub distance_from_origin: f64,
}

impl BossLocation {
    /// The site as a map coordinate.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Orders boss locations by their distance from `origin`, nearest first.
///
/// `distance_from_origin` is recomputed for every entry so the ladder
/// satisfies `ladder[i].distance_from_origin <= ladder[i + 1].distance_from_origin`.
/// Ties keep their input order.
#[must_use]
pub fn rank_boss_locations(origin: GeoPoint, mut bosses: Vec<BossLocation>) -> Vec<BossLocation> {
    for boss in &mut bosses {
        boss.distance_from_origin = origin.distance_km(boss.point());
    }
    bosses.sort_by_key(|boss| OrderedFloat(boss.distance_from_origin));
    bosses
}
