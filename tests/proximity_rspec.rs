//! Behavioural tests for walking the map into encounter sites.
//!
//! Each scenario opens a session over an in-memory store that already
//! holds cached locations, then feeds position fixes through it.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rspec_runner::run_serial;
use test_utils::{boss_ladder, location_at, ORIGIN};
use voices::{
    BossLocation, GameConfig, GameSession, GeoPoint, GeolocationError, Location, LocationId,
    MemoryStore, NavigationEvent, Persistence, PositionFix, Progress, SpriteRef,
};

#[derive(Clone, Debug, Default)]
struct World {
    session: Arc<Mutex<Option<GameSession<MemoryStore>>>>,
    events: Arc<Mutex<Vec<NavigationEvent>>>,
}

impl World {
    fn open(&self, locations: &[Location], bosses: &[BossLocation], progress: &Progress) {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save_locations(locations).expect("seed locations");
        persistence.save_boss_locations(bosses).expect("seed bosses");
        persistence.save_progress(progress).expect("seed progress");
        let mut session = GameSession::with_rng(
            persistence.into_inner(),
            GameConfig::default(),
            StdRng::seed_from_u64(1),
        );
        session.initialize_locations(ORIGIN, &test_support::Quiet);
        session.start_tracking();
        *self.session.lock().expect("session lock") = Some(session);
        self.events.lock().expect("events lock").clear();
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut GameSession<MemoryStore>) -> R) -> R {
        let mut guard = self.session.lock().expect("session lock");
        f(guard.as_mut().expect("session opened"))
    }

    fn stand_at(&self, point: GeoPoint) {
        let update = Ok(PositionFix::new(point.lat, point.lng));
        if let Some(event) = self.with_session(|s| s.on_position(update)) {
            self.events.lock().expect("events lock").push(event);
        }
    }

    fn lose_signal(&self) {
        let update = Err(GeolocationError::Timeout);
        assert!(self.with_session(|s| s.on_position(update)).is_none());
    }

    fn events(&self) -> Vec<NavigationEvent> {
        self.events.lock().expect("events lock").clone()
    }

    fn stored_location_ids(&self) -> Vec<LocationId> {
        self.with_session(|s| {
            s.persistence()
                .load_locations()
                .expect("stored locations decode")
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.id)
                .collect()
        })
    }
}

mod test_support {
    use voices::overpass::{PoiError, PoiFeature, PoiSource};
    use voices::GeoPoint;

    /// Map service for an area with nothing new to offer.
    pub struct Quiet;

    impl PoiSource for Quiet {
        fn fetch(&self, _origin: GeoPoint) -> Result<Vec<PoiFeature>, PoiError> {
            Ok(Vec::new())
        }
    }
}

#[test]
fn entering_a_location_fires_once() {
    run_serial(&rspec::given(
        "a cached location 20 m east of the player",
        World::default(),
        |ctx| {
            ctx.before_each(|world| {
                world.open(&[location_at(42, ORIGIN, 90.0, 20.0)], &[], &Progress::default());
            });

            ctx.when("the player stands at the origin twice", |ctx| {
                ctx.before_each(|world| {
                    world.stand_at(ORIGIN);
                    world.stand_at(ORIGIN);
                });

                ctx.then("exactly one normal encounter starts", |world| {
                    assert_eq!(
                        world.events(),
                        vec![NavigationEvent::EnterNormalEncounter {
                            location: LocationId(42),
                            sprite: SpriteRef::face(1),
                        }]
                    );
                });

                ctx.then("the location is dropped from storage", |world| {
                    assert!(world.stored_location_ids().is_empty());
                });
            });

            ctx.when("the player stays 30 m away", |ctx| {
                ctx.before_each(|world| world.stand_at(ORIGIN.destination(270.0, 10.0)));

                ctx.then("nothing fires and the location stays cached", |world| {
                    assert!(world.events().is_empty());
                    assert_eq!(world.stored_location_ids(), vec![LocationId(42)]);
                });
            });

            ctx.when("tracking is stopped before the player arrives", |ctx| {
                ctx.before_each(|world| {
                    world.with_session(GameSession::stop_tracking);
                    world.stand_at(ORIGIN);
                });

                ctx.then("no encounter starts", |world| {
                    assert!(world.events().is_empty());
                });
            });

            ctx.when("the device loses its position", |ctx| {
                ctx.before_each(|world| world.lose_signal());

                ctx.then("the error is kept for display", |world| {
                    let error = world.with_session(|s| s.tracker().last_error());
                    assert_eq!(error, Some(GeolocationError::Timeout));
                    assert!(world.events().is_empty());
                });
            });
        },
    ));
}

#[test]
fn boss_gate_replaces_regular_sites() {
    let bosses = boss_ladder(ORIGIN, &[15.0, 400.0]);
    run_serial(&rspec::given(
        "two defeated enemies and a boss chapel 15 m north",
        World::default(),
        move |ctx| {
            ctx.before_each(move |world| {
                let mut progress = Progress::default();
                progress.increment_defeated_enemies(2);
                world.open(
                    &[location_at(7, ORIGIN, 180.0, 10.0)],
                    &bosses,
                    &progress,
                );
            });

            ctx.when("the player stands at the origin", |ctx| {
                ctx.before_each(|world| world.stand_at(ORIGIN));

                ctx.then("the first boss fight starts", |world| {
                    assert_eq!(
                        world.events(),
                        vec![NavigationEvent::EnterBossEncounter {
                            location: LocationId(100),
                            sprite: SpriteRef::boss(1),
                            boss_index: 0,
                        }]
                    );
                });

                ctx.then("the nearby regular location is left alone", |world| {
                    assert_eq!(world.stored_location_ids(), vec![LocationId(7)]);
                });
            });
        },
    ));
}
