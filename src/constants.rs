//! Game tuning constants used across the engine.
//!
//! Distances on the map are in kilometres or metres as the name says.
//! Distances inside an encounter are scene units centred on the player.
use std::time::Duration;

/// Great-circle radius of the Earth used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance at which a candidate location counts as entered.
pub const TRIGGER_DISTANCE_KM: f64 = 0.025;
/// Radius around the player searched for regular encounter sites.
pub const SEARCH_RADIUS_KM: f64 = 1.0;

/// Features closer than this to the query origin are discarded.
pub const POI_INNER_RADIUS_M: f64 = 100.0;
/// Features farther than this from the query origin are discarded.
pub const POI_OUTER_RADIUS_M: f64 = 2000.0;
/// Amenity categories requested from the point-of-interest service.
pub const POI_CATEGORIES: [&str; 6] = [
    "pub",
    "restaurant",
    "cafe",
    "supermarket",
    "hotel",
    "place_of_worship",
];
/// Categories whose features are promoted to boss locations.
pub const BOSS_CATEGORIES: [&str; 1] = ["place_of_worship"];
/// Number of face sprites available for regular enemies.
pub const FACE_SPRITE_COUNT: u32 = 6;

/// Regular wins needed before the boss gate opens.
pub const DEFAULT_MAX_DEFEATED_ENEMIES: u32 = 2;
/// Number of rungs on the boss ladder.
pub const DEFAULT_MAX_BOSS_NUMBER: u32 = 4;

/// Lives of a regular enemy.
pub const NORMAL_ENEMY_LIVES: u32 = 2;
/// Lives of a boss.
pub const BOSS_LIVES: u32 = 4;
/// Lives of the enemy a boss drops when it is hurt badly or defeated.
pub const MINION_LIVES: u32 = 1;

/// Approach speeds in scene units per second.
pub const NORMAL_ENEMY_SPEED: f32 = 0.8;
/// Approach speed of a boss.
pub const BOSS_SPEED: f32 = 0.6;
/// Approach speed of a boss's minion.
pub const MINION_SPEED: f32 = 1.1;

/// Radius of the ring regular enemies are placed on at encounter start.
pub const NORMAL_RING_RADIUS: f32 = 12.0;
/// Maximum angular offset, in radians, applied to evenly spaced enemies.
pub const NORMAL_RING_JITTER: f32 = 0.3;
/// Lowest spawn height of a regular enemy.
pub const NORMAL_HEIGHT_MIN: f32 = 1.0;
/// Highest spawn height of a regular enemy.
pub const NORMAL_HEIGHT_MAX: f32 = 3.0;

/// Inner radius of the ring a boss spawns on.
pub const BOSS_RING_MIN: f32 = 10.0;
/// Outer radius of the ring a boss spawns on.
pub const BOSS_RING_MAX: f32 = 15.0;
/// Lowest spawn height of a boss.
pub const BOSS_HEIGHT_MIN: f32 = 1.0;
/// Highest spawn height of a boss.
pub const BOSS_HEIGHT_MAX: f32 = 5.0;

/// Inner radius of the ring a hit enemy respawns on.
pub const RESPAWN_RING_MIN: f32 = 8.0;
/// Outer radius of the ring a hit enemy respawns on.
pub const RESPAWN_RING_MAX: f32 = 15.0;

/// Inner radius of the far ring minions spawn on.
pub const MINION_RING_MIN: f32 = 15.0;
/// Outer radius of the far ring minions spawn on.
pub const MINION_RING_MAX: f32 = 25.0;

/// Enemies closer than this to their target stop moving.
pub const SEEK_MOVE_THRESHOLD: f32 = 0.1;
/// Enemies closer than this to the player end the encounter in defeat.
pub const REACH_PLAYER_DISTANCE: f32 = 0.5;

/// Projectiles closer than this to an enemy hit it.
pub const HIT_RADIUS: f32 = 1.2;
/// Projectiles below this height are discarded as lost.
pub const PROJECTILE_FLOOR: f32 = -100.0;
/// Launch speed along the player's forward direction.
pub const THROW_FORCE: f32 = 10.0;
/// Throws closer together than this are rejected.
pub const THROW_DEBOUNCE: Duration = Duration::from_millis(300);

/// Downward acceleration in immersive mode.
pub const IMMERSIVE_GRAVITY: f32 = -9.8;
/// Upward launch speed added to throws in immersive mode.
pub const IMMERSIVE_THROW_BOOST: f32 = 2.0;
/// Downward acceleration in screen mode.
pub const SCREEN_GRAVITY: f32 = -15.0;
/// Upward launch speed added to throws in screen mode.
pub const SCREEN_THROW_BOOST: f32 = 7.0;

/// Wall-clock length of a boss spin maneuver.
pub const SPIN_DURATION: Duration = Duration::from_millis(3000);
/// Total angle swept by a boss during one spin.
pub const SPIN_ROTATION_RAD: f32 = 2.0 * std::f32::consts::TAU;
