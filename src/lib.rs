#![cfg_attr(docsrs, feature(doc_cfg))]
//! Engine for a location-driven encounter game.
//!
//! Players walk around the real world. When they come within a few metres
//! of a cached point of interest the [`ProximityEngine`] emits a
//! [`NavigationEvent`], the host opens an [`Encounter`], and the outcome
//! feeds the [`Progress`] ledger that gates the boss ladder. The
//! [`GameSession`] ties those pieces to a [`KeyValueStore`].
pub mod cache;
pub mod chat;
pub mod combat;
pub mod config;
pub mod constants;
pub mod events;
pub mod geo;
pub mod geolocation;
pub mod location;
pub mod logging;
pub mod numeric;
pub mod overpass;
pub mod progress;
pub mod proximity;
pub mod session;
pub mod store;
pub mod vector_math;
pub use constants::*;

pub use cache::LocationCache;
pub use chat::{ChatBackend, ChatError, ChatReply, ChatSession, ChatTurn, ScriptedPet};
pub use combat::{
    Encounter, EncounterOutcome, EncounterSource, EncounterState, Enemy, EnemyId, FrameInput,
    FrameReport, HitReaction, HitResult, PresentationMode, Projectile, ThrowError, ThrowProfile,
};
pub use config::{ConfigError, GameConfig};
pub use events::NavigationEvent;
pub use geo::{haversine_distance_km, GeoPoint};
pub use geolocation::{GeolocationError, PositionFix, PositionTracker};
pub use location::{BossLocation, Location, LocationId, SpriteRef};
pub use logging::init as init_logging;
pub use overpass::{OverpassClient, PoiError, PoiFeature, PoiSource};
pub use progress::Progress;
pub use proximity::{ProximityEngine, VisitKey};
pub use session::GameSession;
pub use store::{FileStore, KeyValueStore, MemoryStore, Persistence, StoreError};
pub use vector_math::{vec_mag, vec_normalize};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust
    //! use voices::prelude::*;
    //!
    //! let mut session = GameSession::open(MemoryStore::new(), GameConfig::default());
    //! session.start_tracking();
    //! assert!(session.on_position(Ok(PositionFix::new(51.5, -0.12))).is_none());
    //! ```

    pub use crate::{
        Encounter, EncounterOutcome, FrameInput, GameConfig, GameSession, GeoPoint, MemoryStore,
        NavigationEvent, PositionFix, Progress,
    };
    pub use glam::Vec3;
}
