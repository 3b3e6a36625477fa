//! Geofencing: decides when the player has entered an encounter site.
//!
//! Evaluation runs once per position update. The candidate set depends on
//! the progress ledger: while the boss gate is open it holds only the
//! active boss location, otherwise every regular location within the
//! search radius. A candidate fires when the player is within the trigger
//! distance, at most once per map session.

use hashbrown::HashSet;
use log::{debug, info};

use crate::cache::LocationCache;
use crate::config::ProximityConfig;
use crate::events::NavigationEvent;
use crate::geo::GeoPoint;
use crate::location::{BossLocation, Location, LocationId, SpriteRef};
use crate::progress::Progress;
use crate::store::{KeyValueStore, Persistence};

/// Identity of a site in the visited set.
///
/// Regular and boss ids live in separate namespaces so a feature that
/// appears in both lists cannot shadow the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitKey {
    /// A regular site.
    Location(LocationId),
    /// A rung of the boss ladder.
    Boss(LocationId),
}

/// A site the player may enter on this update.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    /// A regular site within the search radius.
    Location(&'a Location),
    /// The active rung of the boss ladder.
    Boss {
        /// Where the fight takes place.
        site: &'a BossLocation,
        /// Ladder rung the fight belongs to.
        boss_index: u32,
    },
}

impl Candidate<'_> {
    /// Key under which the candidate is remembered once entered.
    #[must_use]
    pub const fn key(&self) -> VisitKey {
        match self {
            Self::Location(l) => VisitKey::Location(l.id),
            Self::Boss { site, .. } => VisitKey::Boss(site.id),
        }
    }

    /// Where the candidate stands.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        match self {
            Self::Location(l) => l.point(),
            Self::Boss { site, .. } => site.point(),
        }
    }
}

/// Selects the boss location for `boss_index`, falling back to the
/// farthest ranked site when the ladder is shorter than the index.
#[must_use]
pub fn active_boss(ladder: &[BossLocation], boss_index: u32) -> Option<&BossLocation> {
    usize::try_from(boss_index)
        .ok()
        .and_then(|i| ladder.get(i))
        .or_else(|| ladder.last())
}

/// Trigger thresholds plus the sites entered during the current map
/// session.
#[derive(Debug, Default, Clone)]
pub struct ProximityEngine {
    config: ProximityConfig,
    visited: HashSet<VisitKey>,
}

impl ProximityEngine {
    /// An engine with nothing visited yet.
    #[must_use]
    pub fn new(config: ProximityConfig) -> Self {
        Self {
            config,
            visited: HashSet::new(),
        }
    }

    /// Active thresholds.
    #[must_use]
    pub const fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Whether `key` already fired this session.
    #[must_use]
    pub fn has_visited(&self, key: VisitKey) -> bool {
        self.visited.contains(&key)
    }

    /// Forgets visited sites, as happens when the player returns to the map.
    pub fn reset_session(&mut self) {
        debug!("proximity session reset ({} visited)", self.visited.len());
        self.visited.clear();
    }

    /// The candidate set for `player` under the current ledger.
    #[must_use]
    pub fn candidates<'a>(
        &self,
        player: GeoPoint,
        cache: &'a LocationCache,
        progress: &Progress,
    ) -> Vec<Candidate<'a>> {
        if progress.can_face_boss() {
            return active_boss(cache.boss_locations(), progress.current_boss_number)
                .map(|site| Candidate::Boss {
                    site,
                    boss_index: progress.current_boss_number,
                })
                .into_iter()
                .collect();
        }
        cache
            .locations_near(player, self.config.search_radius_km)
            .map(Candidate::Location)
            .collect()
    }

    /// Evaluates one position update.
    ///
    /// Returns the navigation event of the first unvisited candidate, in
    /// list order, that lies within the trigger distance. An entered
    /// regular location is consumed from the cache; boss locations stay.
    pub fn evaluate<S: KeyValueStore>(
        &mut self,
        player: GeoPoint,
        cache: &mut LocationCache,
        progress: &Progress,
        persistence: &mut Persistence<S>,
    ) -> Option<NavigationEvent> {
        let (key, event) = {
            let candidate = self
                .candidates(player, cache, progress)
                .into_iter()
                .filter(|c| !self.visited.contains(&c.key()))
                .find(|c| player.distance_km(c.point()) <= self.config.trigger_distance_km)?;
            let event = match candidate {
                Candidate::Location(l) => NavigationEvent::EnterNormalEncounter {
                    location: l.id,
                    sprite: l.sprite_ref.clone(),
                },
                Candidate::Boss { site, boss_index } => NavigationEvent::EnterBossEncounter {
                    location: site.id,
                    sprite: SpriteRef::boss(boss_index.saturating_add(1)),
                    boss_index,
                },
            };
            (candidate.key(), event)
        };

        self.visited.insert(key);
        match key {
            VisitKey::Location(id) => {
                cache.consume(id, persistence);
                info!("entered location {id}");
            }
            VisitKey::Boss(id) => info!("entered boss location {id}"),
        }
        Some(event)
    }
}
