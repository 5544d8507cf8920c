//! Persisted `AppState` document on top of a key-value slot.
//!
//! # Responsibility
//! - Load the document once at startup with default fallback.
//! - Overwrite the whole document after every mutation.
//! - Erase the document on reset.
//!
//! # Invariants
//! - Absent or malformed documents load as `AppState::default()`.
//! - Storage transport errors are propagated, never masked.

use crate::model::app_state::AppState;
use crate::repo::kv_repo::{KvStore, RepoResult};
use log::{debug, warn};

/// Key of the single slot holding the application document.
pub const STATE_KEY: &str = "placemark.state";

/// Reads and writes the application document through a [`KvStore`].
pub struct StateRepository<S: KvStore> {
    store: S,
}

impl<S: KvStore> StateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the persisted document.
    ///
    /// A missing key or an undecodable value yields the default state.
    pub fn load(&self) -> RepoResult<AppState> {
        let Some(raw) = self.store.read(STATE_KEY)? else {
            debug!("event=state_load module=repo status=ok source=default reason=absent");
            return Ok(AppState::default());
        };

        match serde_json::from_str::<AppState>(&raw) {
            Ok(state) => {
                debug!(
                    "event=state_load module=repo status=ok source=store locations={}",
                    state.locations.len()
                );
                Ok(state)
            }
            Err(err) => {
                warn!(
                    "event=state_load module=repo status=fallback source=default reason=malformed error={}",
                    err
                );
                Ok(AppState::default())
            }
        }
    }

    /// Serializes and overwrites the persisted document.
    pub fn save(&self, state: &AppState) -> RepoResult<()> {
        let raw = serde_json::to_string(state)?;
        self.store.write(STATE_KEY, &raw)?;
        debug!(
            "event=state_save module=repo status=ok locations={} bytes={}",
            state.locations.len(),
            raw.len()
        );
        Ok(())
    }

    /// Erases the persisted document.
    pub fn clear(&self) -> RepoResult<()> {
        self.store.erase(STATE_KEY)
    }

    /// Returns the raw persisted value, if any.
    pub fn raw(&self) -> RepoResult<Option<String>> {
        self.store.read(STATE_KEY)
    }
}
