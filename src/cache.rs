//! Cached encounter sites.
//!
//! The cache is filled once per process, either from the persisted blobs
//! or from a point-of-interest fetch. Failures never abort the session:
//! the error text is retained for the presentation layer and the cache
//! stays empty.

use hashbrown::HashSet;
use log::{error, info, warn};
use rand::Rng;

use crate::config::PoiConfig;
use crate::geo::GeoPoint;
use crate::location::{rank_boss_locations, BossLocation, Location, LocationId, SpriteRef};
use crate::overpass::{filter_band, PoiFeature, PoiSource};
use crate::store::{KeyValueStore, Persistence, StoreError};
use crate::FACE_SPRITE_COUNT;

/// Regular encounter sites and the boss ladder for the current area.
///
/// Entered regular sites are remembered so a later refetch never offers
/// them again.
#[derive(Debug, Default, Clone)]
pub struct LocationCache {
    locations: Vec<Location>,
    bosses: Vec<BossLocation>,
    consumed: HashSet<LocationId>,
    initialized: bool,
    last_error: Option<String>,
}

/// Non-empty lists recovered from storage.
struct Restored {
    locations: Option<Vec<Location>>,
    bosses: Option<Vec<BossLocation>>,
}

fn usable<T>(loaded: Result<Option<Vec<T>>, StoreError>, what: &str) -> Option<Vec<T>> {
    match loaded {
        Ok(stored) => stored.filter(|items| !items.is_empty()),
        Err(e) => {
            error!("discarding cached {what}: {e}");
            None
        }
    }
}

/// Ranks boss features around `origin` and numbers the rungs from one.
fn ladder(origin: GeoPoint, features: Vec<PoiFeature>) -> Vec<BossLocation> {
    let bosses = features
        .into_iter()
        .map(|f| BossLocation {
            id: f.id,
            lat: f.point.lat,
            lng: f.point.lng,
            name: f.name,
            category: f.category,
            tags: f.tags,
            boss_sprite_ref: SpriteRef::boss(1),
            distance_from_origin: 0.0,
        })
        .collect();
    let mut ranked = rank_boss_locations(origin, bosses);
    for (rung, boss) in (1_u32..).zip(ranked.iter_mut()) {
        boss.boss_sprite_ref = SpriteRef::boss(rung);
    }
    ranked
}

impl LocationCache {
    /// An empty, uninitialised cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pre-populated cache, ranking `bosses` around `origin`.
    #[must_use]
    pub fn from_parts(origin: GeoPoint, locations: Vec<Location>, bosses: Vec<BossLocation>) -> Self {
        Self {
            locations,
            bosses: rank_boss_locations(origin, bosses),
            consumed: HashSet::new(),
            initialized: true,
            last_error: None,
        }
    }

    /// Regular sites not yet entered.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// The boss ladder, nearest first.
    #[must_use]
    pub fn boss_locations(&self) -> &[BossLocation] {
        &self.bosses
    }

    /// Whether [`Self::initialize`] has run since the last [`Self::clear`].
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Text of the most recent fetch or persistence failure.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Loads persisted locations, fetching whatever storage cannot supply.
    ///
    /// Does nothing once the cache is initialised. A stored boss ladder is
    /// authoritative: it is only ranked, around `origin`, when storage has
    /// none, and is never reordered afterwards. An exhausted regular list
    /// is refilled from `source` without the sites already entered.
    pub fn initialize<S, P, R>(
        &mut self,
        origin: GeoPoint,
        source: &P,
        persistence: &mut Persistence<S>,
        config: &PoiConfig,
        rng: &mut R,
    ) where
        S: KeyValueStore,
        P: PoiSource + ?Sized,
        R: Rng + ?Sized,
    {
        if self.initialized {
            return;
        }
        self.last_error = None;
        self.consumed = match persistence.load_consumed_locations() {
            Ok(ids) => ids.unwrap_or_default().into_iter().collect(),
            Err(e) => {
                error!("discarding consumed location ids: {e}");
                HashSet::new()
            }
        };
        let restored = Restored {
            locations: usable(persistence.load_locations(), "locations"),
            bosses: usable(persistence.load_boss_locations(), "boss locations"),
        };

        match restored {
            Restored {
                locations: Some(locations),
                bosses: Some(bosses),
            } => {
                info!(
                    "restored {} locations and {} boss locations from storage",
                    locations.len(),
                    bosses.len()
                );
                self.locations = locations;
                self.bosses = bosses;
            }
            partial => match source.fetch(origin) {
                Ok(features) => {
                    let banded = filter_band(
                        origin,
                        features,
                        config.inner_radius_m,
                        config.outer_radius_m,
                    );
                    self.populate(origin, banded, partial, config, rng);
                    self.persist_all(persistence);
                }
                Err(e) => {
                    warn!("failed to fetch locations: {e}");
                    self.last_error = Some(e.to_string());
                    self.locations = partial.locations.unwrap_or_default();
                    self.bosses = partial.bosses.unwrap_or_default();
                }
            },
        }
        self.initialized = true;
    }

    fn populate<R: Rng + ?Sized>(
        &mut self,
        origin: GeoPoint,
        features: Vec<PoiFeature>,
        restored: Restored,
        config: &PoiConfig,
        rng: &mut R,
    ) {
        let (boss_features, regular): (Vec<_>, Vec<_>) = features
            .into_iter()
            .partition(|f| config.boss_categories.iter().any(|c| *c == f.category));

        let consumed = &self.consumed;
        self.locations = restored.locations.unwrap_or_else(|| {
            regular
                .into_iter()
                .filter(|f| !consumed.contains(&f.id))
                .map(|f| Location {
                    id: f.id,
                    lat: f.point.lat,
                    lng: f.point.lng,
                    name: f.name,
                    category: f.category,
                    tags: f.tags,
                    sprite_ref: SpriteRef::face(rng.gen_range(1..=FACE_SPRITE_COUNT)),
                })
                .collect()
        });
        self.bosses = restored
            .bosses
            .unwrap_or_else(|| ladder(origin, boss_features));
        info!(
            "cache holds {} locations and {} boss locations after fetching",
            self.locations.len(),
            self.bosses.len()
        );
    }

    fn persist_all<S: KeyValueStore>(&mut self, persistence: &mut Persistence<S>) {
        let result = persistence
            .save_locations(&self.locations)
            .and_then(|()| persistence.save_boss_locations(&self.bosses));
        if let Err(e) = result {
            warn!("failed to persist locations: {e}");
            self.last_error = Some(e.to_string());
        }
    }

    /// Regular locations within `radius_km` of `point`, in cache order.
    pub fn locations_near(&self, point: GeoPoint, radius_km: f64) -> impl Iterator<Item = &Location> {
        self.locations
            .iter()
            .filter(move |l| point.distance_km(l.point()) <= radius_km)
    }

    /// Removes an entered location and persists the shortened list.
    pub fn consume<S: KeyValueStore>(
        &mut self,
        id: LocationId,
        persistence: &mut Persistence<S>,
    ) -> Option<Location> {
        let index = self.locations.iter().position(|l| l.id == id)?;
        let removed = self.locations.remove(index);
        self.consumed.insert(id);
        let mut entered: Vec<_> = self.consumed.iter().copied().collect();
        entered.sort_unstable();
        let result = persistence
            .save_locations(&self.locations)
            .and_then(|()| persistence.save_consumed_locations(&entered));
        if let Err(e) = result {
            warn!("failed to persist consumed location {id}: {e}");
            self.last_error = Some(e.to_string());
        }
        Some(removed)
    }

    /// Forgets all cached data, including entered sites, so the next
    /// [`Self::initialize`] refetches.
    pub fn clear<S: KeyValueStore>(&mut self, persistence: &mut Persistence<S>) {
        if let Err(e) = persistence.clear_locations() {
            warn!("failed to clear cached locations: {e}");
            self.last_error = Some(e.to_string());
        }
        *self = Self {
            last_error: self.last_error.take(),
            ..Self::default()
        };
    }
}
