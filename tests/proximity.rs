//! Candidate selection and trigger rules of the proximity engine.

use rstest::{fixture, rstest};
use test_utils::{boss_ladder, location_at, ORIGIN};
use voices::config::ProximityConfig;
use voices::proximity::active_boss;
use voices::{
    LocationCache, LocationId, MemoryStore, NavigationEvent, Persistence, Progress,
    ProximityEngine, SpriteRef, VisitKey,
};

#[fixture]
fn engine() -> ProximityEngine {
    ProximityEngine::new(ProximityConfig::default())
}

#[fixture]
fn persistence() -> Persistence<MemoryStore> {
    Persistence::new(MemoryStore::new())
}

fn entered(event: Option<NavigationEvent>) -> Option<LocationId> {
    match event? {
        NavigationEvent::EnterNormalEncounter { location, .. }
        | NavigationEvent::EnterBossEncounter { location, .. } => Some(location),
        NavigationEvent::Victory { .. } | NavigationEvent::Defeat => None,
    }
}

#[rstest]
fn first_qualifying_location_in_list_order_wins(
    mut engine: ProximityEngine,
    mut persistence: Persistence<MemoryStore>,
) {
    let mut cache = LocationCache::from_parts(
        ORIGIN,
        vec![
            location_at(1, ORIGIN, 0.0, 24.0),
            location_at(2, ORIGIN, 90.0, 5.0),
        ],
        Vec::new(),
    );
    let progress = Progress::default();

    let first = engine.evaluate(ORIGIN, &mut cache, &progress, &mut persistence);
    assert_eq!(entered(first), Some(LocationId(1)));
    let second = engine.evaluate(ORIGIN, &mut cache, &progress, &mut persistence);
    assert_eq!(entered(second), Some(LocationId(2)));
    assert!(engine
        .evaluate(ORIGIN, &mut cache, &progress, &mut persistence)
        .is_none());
    assert!(cache.locations().is_empty());
}

#[rstest]
#[case::inside(24.9, true)]
#[case::outside(25.5, false)]
fn trigger_distance_is_inclusive_of_25_metres(
    mut engine: ProximityEngine,
    mut persistence: Persistence<MemoryStore>,
    #[case] metres: f64,
    #[case] fires: bool,
) {
    let mut cache = LocationCache::from_parts(
        ORIGIN,
        vec![location_at(9, ORIGIN, 45.0, metres)],
        Vec::new(),
    );
    let event = engine.evaluate(ORIGIN, &mut cache, &Progress::default(), &mut persistence);
    assert_eq!(event.is_some(), fires);
}

#[rstest]
fn search_radius_limits_regular_candidates(engine: ProximityEngine) {
    let cache = LocationCache::from_parts(
        ORIGIN,
        vec![
            location_at(1, ORIGIN, 0.0, 900.0),
            location_at(2, ORIGIN, 0.0, 1100.0),
        ],
        Vec::new(),
    );
    let keys: Vec<_> = engine
        .candidates(ORIGIN, &cache, &Progress::default())
        .iter()
        .map(voices::proximity::Candidate::key)
        .collect();
    assert_eq!(keys, vec![VisitKey::Location(LocationId(1))]);
}

#[rstest]
fn boss_gate_offers_only_the_active_rung(engine: ProximityEngine) {
    let cache = LocationCache::from_parts(
        ORIGIN,
        vec![location_at(1, ORIGIN, 0.0, 5.0)],
        boss_ladder(ORIGIN, &[300.0, 50.0]),
    );
    let mut progress = Progress::default();
    progress.increment_defeated_enemies(2);
    progress.set_current_boss_number(1);

    let keys: Vec<_> = engine
        .candidates(ORIGIN, &cache, &progress)
        .iter()
        .map(voices::proximity::Candidate::key)
        .collect();
    // Ranked nearest first, so rung 1 is the chapel 300 m out.
    assert_eq!(keys, vec![VisitKey::Boss(LocationId(100))]);
}

#[rstest]
fn boss_sites_are_not_consumed(mut engine: ProximityEngine, mut persistence: Persistence<MemoryStore>) {
    let mut cache = LocationCache::from_parts(ORIGIN, Vec::new(), boss_ladder(ORIGIN, &[10.0]));
    let mut progress = Progress::default();
    progress.increment_defeated_enemies(2);

    let event = engine.evaluate(ORIGIN, &mut cache, &progress, &mut persistence);
    assert_eq!(
        event,
        Some(NavigationEvent::EnterBossEncounter {
            location: LocationId(100),
            sprite: SpriteRef::boss(1),
            boss_index: 0,
        })
    );
    assert!(engine.has_visited(VisitKey::Boss(LocationId(100))));
    assert_eq!(cache.boss_locations().len(), 1);

    assert!(engine
        .evaluate(ORIGIN, &mut cache, &progress, &mut persistence)
        .is_none());
    engine.reset_session();
    assert!(engine
        .evaluate(ORIGIN, &mut cache, &progress, &mut persistence)
        .is_some());
}

#[rstest]
fn visits_are_namespaced_by_kind(mut engine: ProximityEngine, mut persistence: Persistence<MemoryStore>) {
    // The same source id appears as a regular site and as a boss site.
    let mut regular = location_at(100, ORIGIN, 0.0, 5.0);
    regular.sprite_ref = SpriteRef::face(3);
    let mut cache = LocationCache::from_parts(ORIGIN, vec![regular], boss_ladder(ORIGIN, &[5.0]));
    let mut progress = Progress::default();

    assert!(engine
        .evaluate(ORIGIN, &mut cache, &progress, &mut persistence)
        .is_some_and(|e| !e.is_boss_encounter()));
    progress.increment_defeated_enemies(2);
    assert!(engine
        .evaluate(ORIGIN, &mut cache, &progress, &mut persistence)
        .is_some_and(|e| e.is_boss_encounter()));
}

#[rstest]
#[case::in_range(1, Some(101))]
#[case::past_the_end(7, Some(102))]
fn active_boss_falls_back_to_the_farthest(#[case] index: u32, #[case] expected: Option<i64>) {
    let ladder = boss_ladder(ORIGIN, &[10.0, 20.0, 30.0]);
    assert_eq!(
        active_boss(&ladder, index).map(|b| b.id),
        expected.map(LocationId)
    );
}

#[rstest]
fn empty_ladder_has_no_active_boss() {
    assert!(active_boss(&[], 0).is_none());
}

#[rstest]
fn consumed_location_is_persisted(mut engine: ProximityEngine, mut persistence: Persistence<MemoryStore>) {
    let mut cache = LocationCache::from_parts(
        ORIGIN,
        vec![
            location_at(1, ORIGIN, 0.0, 10.0),
            location_at(2, ORIGIN, 0.0, 500.0),
        ],
        Vec::new(),
    );
    engine.evaluate(ORIGIN, &mut cache, &Progress::default(), &mut persistence);
    let stored = persistence
        .load_locations()
        .expect("decodes")
        .expect("saved after consuming");
    assert_eq!(stored.iter().map(|l| l.id).collect::<Vec<_>>(), vec![LocationId(2)]);
}
