//! Compile-time guards on the public types.
use static_assertions::{assert_impl_all, assert_not_impl_any};
use voices::{
    Encounter, FileStore, GameSession, LocationCache, MemoryStore, NavigationEvent, Progress,
    ProximityEngine,
};

assert_impl_all!(GameSession<MemoryStore>: Send, Sync);
assert_impl_all!(GameSession<FileStore>: Send, Sync);
assert_impl_all!(Encounter: Send, Clone);
assert_impl_all!(LocationCache: Send, Clone, Default);
assert_impl_all!(ProximityEngine: Send, Clone, Default);

// Ledger and events are moved, never copied.
assert_not_impl_any!(Progress: Copy);
assert_not_impl_any!(NavigationEvent: Copy);
