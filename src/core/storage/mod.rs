//! Storage module for the combat session.
//!
//! The session lives in one JSON snapshot under a fixed key. The engine never
//! talks to the filesystem directly: front-ends hand snapshots to a
//! [`SessionStore`] after every mutation.
//!
//! # Modules
//!
//! - `error` - Error types for snapshot I/O and decoding
//! - `snapshot` - Serialisation, normalisation on load, import/export
//! - `store` - File-backed and in-memory stores

pub mod error;
pub mod snapshot;
pub mod store;

pub use error::SnapshotError;
pub use store::{FileStore, MemoryStore};

use crate::core::session::CombatSession;

/// Somewhere to keep the serialised session between runs.
pub trait SessionStore {
    /// The last saved snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<String>, SnapshotError>;

    fn save(&self, snapshot: &str) -> Result<(), SnapshotError>;
}

/// Read the stored session once. `None` when nothing usable was stored:
/// no snapshot yet, an unreadable store, or a snapshot that is not a JSON
/// object.
pub fn load_stored(store: &dyn SessionStore) -> Option<CombatSession> {
    let text = match store.load() {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read stored session");
            return None;
        }
    };
    match snapshot::try_restore(&text) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "stored session unreadable, starting fresh");
            None
        }
    }
}

/// Read the stored session, falling back to a fresh one on any failure.
pub fn load_session(store: &dyn SessionStore) -> CombatSession {
    load_stored(store).unwrap_or_default()
}

/// Write the session through `store`. Failures are logged and otherwise
/// ignored; the in-memory session stays authoritative.
pub fn persist(store: &dyn SessionStore, session: &CombatSession) -> bool {
    let result = snapshot::to_json(session).and_then(|text| store.save(&text));
    if let Err(e) = &result {
        tracing::warn!(error = %e, "failed to persist session");
    }
    result.is_ok()
}
