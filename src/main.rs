//! Command-line driver for the voices engine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use log::{debug, info, warn};
use voices::overpass::{OverpassClient, PoiError, PoiFeature, PoiSource};
use voices::{
    init_logging, Encounter, EncounterOutcome, EncounterSource, FileStore, FrameInput, GameConfig,
    GameSession, GeoPoint, PositionFix, SpriteRef, ThrowProfile,
};

/// Location-driven encounter game engine
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// JSON game configuration overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the persisted game state
    #[arg(long, default_value = ".voices")]
    state_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON array of position fixes through the proximity engine
    Walk {
        #[arg(long)]
        fixes: PathBuf,
        /// Use only cached locations instead of querying the map service
        #[arg(long)]
        offline: bool,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Run a simulated auto-aiming encounter
    Fight {
        #[arg(long)]
        boss: bool,
        /// Extra regular enemies, as if this many bosses were beaten
        #[arg(long, default_value_t = 0)]
        enemies: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Query points of interest and cache them in the state directory
    Fetch {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Show or reset the stored progress ledger
    Progress {
        #[arg(long)]
        reset: bool,
    },
}

/// Frame rate of simulated encounters.
const FRAME: Duration = Duration::from_micros(16_667);
/// Simulated encounters give up after five minutes.
const MAX_FRAMES: u32 = 60 * 300;
/// Camera height above the ground in scene units.
const EYE_HEIGHT: f32 = 1.6;

/// Point-of-interest source for offline runs.
struct CachedOnly;

impl PoiSource for CachedOnly {
    fn fetch(&self, _origin: GeoPoint) -> Result<Vec<PoiFeature>, PoiError> {
        Ok(Vec::new())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let store = FileStore::open(&args.state_dir)
        .with_context(|| format!("opening state directory {}", args.state_dir.display()))?;

    match args.command {
        Command::Walk {
            fixes,
            offline,
            seed,
        } => walk(GameSession::open(store, config), &fixes, offline, seed),
        Command::Fight {
            boss,
            enemies,
            seed,
        } => {
            let source = if boss {
                EncounterSource::Boss {
                    sprite: SpriteRef::boss(1),
                    boss_index: 0,
                }
            } else {
                EncounterSource::Normal {
                    sprites: vec![SpriteRef::face(1)],
                }
            };
            let mut encounter = Encounter::with_seed(source, enemies, seed);
            let outcome = simulate(&mut encounter);
            info!("fight finished: {outcome:?}");
            Ok(())
        }
        Command::Fetch { lat, lng } => {
            let mut session = GameSession::open(store, config);
            let client = OverpassClient::new(session.config().poi.outer_radius_m)?
                .with_categories(session.config().poi.categories.clone());
            session.clear_locations();
            session.initialize_locations(GeoPoint::new(lat, lng), &client);
            if let Some(error) = session.cache().last_error() {
                bail!("fetch failed: {error}");
            }
            info!(
                "cached {} locations and {} boss locations",
                session.cache().locations().len(),
                session.cache().boss_locations().len()
            );
            Ok(())
        }
        Command::Progress { reset } => {
            let mut session = GameSession::open(store, config);
            if reset {
                session.reset_progress();
            }
            info!("{}", serde_json::to_string_pretty(session.progress())?);
            Ok(())
        }
    }
}

fn walk(
    mut session: GameSession<FileStore>,
    fixes: &Path,
    offline: bool,
    seed: u64,
) -> Result<()> {
    let text = fs::read_to_string(fixes)
        .with_context(|| format!("reading fixes from {}", fixes.display()))?;
    let fixes: Vec<PositionFix> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", fixes.display()))?;
    let Some(origin) = fixes.first().map(PositionFix::point) else {
        warn!("no position fixes to replay");
        return Ok(());
    };

    if offline {
        session.initialize_locations(origin, &CachedOnly);
    } else {
        let client = OverpassClient::new(session.config().poi.outer_radius_m)?
            .with_categories(session.config().poi.categories.clone());
        session.initialize_locations(origin, &client);
    }
    if let Some(error) = session.cache().last_error() {
        warn!("continuing without fresh locations: {error}");
    }

    session.start_tracking();
    for (n, fix) in (0_u64..).zip(fixes) {
        let Some(event) = session.on_position(Ok(fix)) else {
            continue;
        };
        let Some(encounter) = session.begin_encounter(&event, seed.wrapping_add(n)) else {
            continue;
        };
        let outcome = simulate(encounter);
        debug!("simulation ended in {outcome:?}");
        if let Some(result) = session.settle_encounter() {
            info!("back on the map after {result:?}");
        }
    }
    session.stop_tracking();
    info!("{}", serde_json::to_string(session.progress())?);
    Ok(())
}

/// Plays an encounter to its end, throwing at the nearest enemy whenever
/// the debounce allows.
fn simulate(encounter: &mut Encounter) -> EncounterOutcome {
    let player = Vec3::new(0.0, EYE_HEIGHT, 0.0);
    let mut now = Duration::ZERO;
    for _ in 0..MAX_FRAMES {
        if let Some(outcome) = encounter.outcome() {
            return outcome;
        }
        now += FRAME;
        let nearest = encounter
            .enemies()
            .iter()
            .min_by(|a, b| a.position.distance(player).total_cmp(&b.position.distance(player)))
            .map(|e| e.position);
        if let Some(target) = nearest {
            let aim = ThrowProfile::for_mode(encounter.mode()).aim(player, target);
            // Most frames fall inside the debounce window.
            if let Ok(id) = encounter.throw(now, player, aim) {
                debug!("threw projectile {}", id.0);
            }
        }
        let report = encounter.tick(FrameInput {
            now,
            delta_seconds: FRAME.as_secs_f32(),
            player,
        });
        for hit in &report.hits {
            info!("{} hit, {} lives left", hit.enemy, hit.lives_left);
        }
    }
    warn!("encounter did not finish; abandoning");
    encounter.abandon().unwrap_or(EncounterOutcome::Defeat)
}
