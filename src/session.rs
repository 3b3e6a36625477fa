//! Explicit game session state.
//!
//! [`GameSession`] owns everything that used to be ambient: the store, the
//! progress ledger, the location cache, the proximity engine, the position
//! tracker and the encounter in progress. All mutation goes through it so
//! every ledger change is persisted straight away.

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cache::LocationCache;
use crate::combat::{Encounter, EncounterOutcome, EncounterSource};
use crate::config::GameConfig;
use crate::events::NavigationEvent;
use crate::geo::GeoPoint;
use crate::geolocation::{GeolocationError, PositionFix, PositionTracker};
use crate::overpass::PoiSource;
use crate::progress::Progress;
use crate::proximity::ProximityEngine;
use crate::store::{KeyValueStore, Persistence};

/// One player's game, from the map to the encounter and back.
#[derive(Debug)]
pub struct GameSession<S> {
    config: GameConfig,
    persistence: Persistence<S>,
    progress: Progress,
    cache: LocationCache,
    proximity: ProximityEngine,
    tracker: PositionTracker,
    encounter: Option<Encounter>,
    rng: StdRng,
}

impl<S: KeyValueStore> GameSession<S> {
    /// Opens a session on `store`, restoring the stored ledger.
    ///
    /// A missing or unreadable ledger starts fresh with the configured
    /// thresholds.
    #[must_use]
    pub fn open(store: S, config: GameConfig) -> Self {
        Self::with_rng(store, config, StdRng::from_entropy())
    }

    /// Like [`Self::open`] with a caller-supplied generator for sprite
    /// assignment.
    #[must_use]
    pub fn with_rng(store: S, config: GameConfig, rng: StdRng) -> Self {
        let persistence = Persistence::new(store);
        let fresh = || {
            Progress::with_limits(
                config.progress.max_defeated_enemies,
                config.progress.max_boss_number,
            )
        };
        let progress = match persistence.load_progress() {
            Ok(Some(progress)) => progress,
            Ok(None) => fresh(),
            Err(e) => {
                error!("discarding stored progress: {e}");
                fresh()
            }
        };
        info!(
            "session opened at boss {}/{} with {} defeated",
            progress.current_boss_number, progress.max_boss_number, progress.defeated_enemies
        );
        Self {
            proximity: ProximityEngine::new(config.proximity),
            config,
            persistence,
            progress,
            cache: LocationCache::new(),
            tracker: PositionTracker::new(),
            encounter: None,
            rng,
        }
    }

    /// Settings the session was opened with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The progress ledger.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Cached encounter sites.
    #[must_use]
    pub const fn cache(&self) -> &LocationCache {
        &self.cache
    }

    /// The trigger engine and its visited set.
    #[must_use]
    pub const fn proximity(&self) -> &ProximityEngine {
        &self.proximity
    }

    /// The position tracking switch.
    #[must_use]
    pub const fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// Typed access to the backing store.
    #[must_use]
    pub const fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Closes the session and returns the backing store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.persistence.into_inner()
    }

    /// Fills the location cache from storage or `source`.
    pub fn initialize_locations<P: PoiSource + ?Sized>(&mut self, origin: GeoPoint, source: &P) {
        self.cache.initialize(
            origin,
            source,
            &mut self.persistence,
            &self.config.poi,
            &mut self.rng,
        );
    }

    /// Drops cached locations so the next initialisation fetches again.
    pub fn clear_locations(&mut self) {
        self.cache.clear(&mut self.persistence);
    }

    /// Starts accepting position updates.
    pub fn start_tracking(&mut self) {
        self.tracker.start();
    }

    /// Stops accepting position updates.
    pub fn stop_tracking(&mut self) {
        self.tracker.stop();
    }

    /// Feeds one device position update through the proximity engine.
    ///
    /// Nothing triggers while tracking is stopped, while the update is an
    /// error, or while an encounter is running.
    pub fn on_position(
        &mut self,
        update: Result<PositionFix, GeolocationError>,
    ) -> Option<NavigationEvent> {
        let fix = self.tracker.push(update)?;
        if self.encounter.is_some() {
            return None;
        }
        let event = self.proximity.evaluate(
            fix.point(),
            &mut self.cache,
            &self.progress,
            &mut self.persistence,
        );
        if let Some(entered) = &event {
            info!("navigation: {entered:?}");
        }
        event
    }

    /// Starts the encounter announced by an entry event.
    ///
    /// Returns `None` for events that do not open an encounter.
    pub fn begin_encounter(&mut self, event: &NavigationEvent, seed: u64) -> Option<&mut Encounter> {
        let source = EncounterSource::from_event(event)?;
        if self.encounter.is_some() {
            warn!("replacing an encounter that never concluded");
        }
        let encounter = Encounter::with_seed(source, self.progress.current_boss_number, seed);
        Some(self.encounter.insert(encounter))
    }

    /// The encounter in progress, if any.
    #[must_use]
    pub const fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    /// Mutable access for feeding hits, throws and frames.
    pub const fn encounter_mut(&mut self) -> Option<&mut Encounter> {
        self.encounter.as_mut()
    }

    /// Concludes the running encounter if it has reached an outcome.
    ///
    /// The outcome is applied to the ledger and persisted. Returning to the
    /// map starts a new proximity session, so sites visited before the
    /// encounter may trigger again. Returns `None` while no encounter has
    /// finished.
    pub fn settle_encounter(&mut self) -> Option<NavigationEvent> {
        let outcome = self.encounter.as_ref()?.outcome()?;
        Some(self.conclude_encounter(outcome))
    }

    fn conclude_encounter(&mut self, outcome: EncounterOutcome) -> NavigationEvent {
        self.encounter = None;
        let event = match outcome {
            EncounterOutcome::Victory { was_boss } => {
                self.progress.record_victory(was_boss);
                self.save_progress();
                NavigationEvent::Victory { was_boss }
            }
            EncounterOutcome::Defeat => {
                self.progress.record_defeat();
                NavigationEvent::Defeat
            }
        };
        self.proximity.reset_session();
        event
    }

    /// Leaving the encounter view counts as a defeat.
    pub fn abandon_encounter(&mut self) -> Option<NavigationEvent> {
        let outcome = self.encounter.as_mut()?.abandon()?;
        Some(self.conclude_encounter(outcome))
    }

    /// Records that the intro story has been shown.
    pub fn mark_intro_played(&mut self) {
        self.progress.mark_intro_played();
        self.save_progress();
    }

    /// Jumps the boss ladder to `number`. Returns `false` when out of range.
    pub fn set_current_boss_number(&mut self, number: i64) -> bool {
        let changed = self.progress.set_current_boss_number(number);
        if changed {
            self.save_progress();
        }
        changed
    }

    /// Starts the ladder over and forgets the stored ledger.
    pub fn reset_progress(&mut self) {
        self.progress.reset();
        if let Err(e) = self.persistence.clear_progress() {
            warn!("failed to clear stored progress: {e}");
        }
        self.proximity.reset_session();
        info!("progress reset");
    }

    fn save_progress(&mut self) {
        if let Err(e) = self.persistence.save_progress(&self.progress) {
            warn!("failed to persist progress: {e}");
        }
    }
}
