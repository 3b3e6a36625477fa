//! End-to-end runs through the game session: map, encounters and ledger.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::{fixture, rstest};
use test_utils::{boss_ladder, hit_until_removed, location_at, ORIGIN};
use voices::overpass::{PoiError, PoiFeature, PoiSource};
use voices::store::PROGRESS_KEY;
use voices::{
    GameConfig, GameSession, GeoPoint, KeyValueStore, LocationId, MemoryStore,
    NavigationEvent, Persistence, PositionFix, Progress, SpriteRef,
};

struct Offline;

impl PoiSource for Offline {
    fn fetch(&self, _origin: GeoPoint) -> Result<Vec<PoiFeature>, PoiError> {
        Ok(Vec::new())
    }
}

fn seeded_store(progress: Option<&Progress>) -> MemoryStore {
    let mut persistence = Persistence::new(MemoryStore::new());
    persistence
        .save_locations(&[
            location_at(1, ORIGIN, 0.0, 10.0),
            location_at(2, ORIGIN, 90.0, 12.0),
            location_at(3, ORIGIN, 180.0, 600.0),
        ])
        .expect("seed locations");
    persistence
        .save_boss_locations(&boss_ladder(ORIGIN, &[15.0, 700.0]))
        .expect("seed bosses");
    if let Some(progress) = progress {
        persistence.save_progress(progress).expect("seed progress");
    }
    persistence.into_inner()
}

fn open(store: MemoryStore) -> GameSession<MemoryStore> {
    let mut session =
        GameSession::with_rng(store, GameConfig::default(), StdRng::seed_from_u64(5));
    session.initialize_locations(ORIGIN, &Offline);
    session.start_tracking();
    session
}

#[fixture]
fn session() -> GameSession<MemoryStore> {
    open(seeded_store(None))
}

fn arrive(session: &mut GameSession<MemoryStore>) -> Option<NavigationEvent> {
    session.on_position(Ok(PositionFix::new(ORIGIN.lat, ORIGIN.lng)))
}

fn win(session: &mut GameSession<MemoryStore>) -> Result<NavigationEvent> {
    let encounter = session.encounter_mut().context("no encounter running")?;
    while let Some(id) = encounter.enemies().first().map(|e| e.id) {
        hit_until_removed(encounter, id);
    }
    session.settle_encounter().context("encounter did not finish")
}

#[rstest]
fn two_wins_open_the_boss_gate_and_the_boss_climbs_the_ladder(
    mut session: GameSession<MemoryStore>,
) -> Result<()> {
    for expected in [1, 2] {
        let event = arrive(&mut session).context("a regular site should fire")?;
        assert!(
            matches!(event, NavigationEvent::EnterNormalEncounter { location, .. } if location == LocationId(expected))
        );
        session.begin_encounter(&event, 3).context("entry opens an encounter")?;
        assert_eq!(win(&mut session)?, NavigationEvent::Victory { was_boss: false });
    }
    assert!(session.progress().can_face_boss());

    let event = arrive(&mut session).context("the boss site should fire")?;
    assert_eq!(
        event,
        NavigationEvent::EnterBossEncounter {
            location: LocationId(100),
            sprite: SpriteRef::boss(1),
            boss_index: 0,
        }
    );
    let encounter = session.begin_encounter(&event, 4).context("boss encounter")?;
    assert!(encounter.is_boss());
    assert_eq!(win(&mut session)?, NavigationEvent::Victory { was_boss: true });

    let progress = session.progress().clone();
    assert_eq!((progress.current_boss_number, progress.defeated_enemies), (1, 0));

    let reopened = open(session.into_store());
    assert_eq!(reopened.progress(), &progress);
    assert_eq!(reopened.cache().locations().len(), 1);
    Ok(())
}

#[rstest]
fn nothing_triggers_while_an_encounter_runs(mut session: GameSession<MemoryStore>) -> Result<()> {
    let event = arrive(&mut session).context("first site fires")?;
    session.begin_encounter(&event, 1).context("encounter")?;
    assert!(arrive(&mut session).is_none());
    Ok(())
}

#[rstest]
fn abandoning_is_a_defeat_that_keeps_progress(
    mut session: GameSession<MemoryStore>,
) -> Result<()> {
    let before = session.progress().clone();
    let event = arrive(&mut session).context("first site fires")?;
    session.begin_encounter(&event, 1).context("encounter")?;
    assert_eq!(session.abandon_encounter(), Some(NavigationEvent::Defeat));
    assert!(session.encounter().is_none());
    assert_eq!(session.progress(), &before);

    // Back on the map: the next site may fire again.
    assert!(arrive(&mut session).is_some());
    Ok(())
}

#[rstest]
fn no_outcome_is_credited_without_an_encounter(mut session: GameSession<MemoryStore>) {
    assert!(session.settle_encounter().is_none());
    assert!(session.abandon_encounter().is_none());
    assert_eq!(session.progress(), &Progress::default());
}

#[rstest]
fn unfinished_encounter_does_not_settle(mut session: GameSession<MemoryStore>) -> Result<()> {
    let event = arrive(&mut session).context("first site fires")?;
    session.begin_encounter(&event, 1).context("encounter")?;
    assert!(session.settle_encounter().is_none());
    assert!(session.encounter().is_some());
    assert_eq!(session.progress(), &Progress::default());
    Ok(())
}

#[rstest]
fn outcome_events_do_not_open_encounters(mut session: GameSession<MemoryStore>) {
    assert!(session.begin_encounter(&NavigationEvent::Defeat, 0).is_none());
    assert!(session
        .begin_encounter(&NavigationEvent::Victory { was_boss: true }, 0)
        .is_none());
}

#[rstest]
fn beaten_bosses_bring_extra_enemies() -> Result<()> {
    let mut progress = Progress::default();
    progress.increment_boss_number(2);
    let mut session = open(seeded_store(Some(&progress)));
    let event = arrive(&mut session).context("first site fires")?;
    let encounter = session.begin_encounter(&event, 9).context("encounter")?;
    assert_eq!(encounter.enemies().len(), 3);
    Ok(())
}

#[rstest]
fn corrupt_ledger_starts_fresh() {
    let mut store = seeded_store(None);
    store.set(PROGRESS_KEY, "[1, 2").expect("memory store");
    let session = open(store);
    assert_eq!(session.progress(), &Progress::default());
}

#[rstest]
fn ledger_changes_are_persisted(mut session: GameSession<MemoryStore>) -> Result<()> {
    session.mark_intro_played();
    assert!(session.set_current_boss_number(3));
    assert!(!session.set_current_boss_number(9));
    let stored = session
        .persistence()
        .load_progress()?
        .context("progress saved")?;
    assert!(stored.played_intro);
    assert_eq!(stored.current_boss_number, 3);

    session.reset_progress();
    assert_eq!(session.progress(), &Progress::default());
    assert!(session.persistence().load_progress()?.is_none());
    Ok(())
}
