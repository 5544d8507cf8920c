//! Core domain logic for Placemark.
//! This crate is the single source of truth for place list invariants.

pub mod app;
pub mod config;
pub mod db;
pub mod editor;
pub mod geocode;
pub mod logging;
pub mod map;
pub mod model;
pub mod repo;
pub mod service;

pub use app::{Action, App, AppError, AppResult, Outcome};
pub use config::Settings;
pub use editor::{Commit, Draft, DraftMode, DraftToken, Editor, EditorError, EditorPhase};
pub use geocode::{
    DisabledGeocoder, LookupRequest, LookupResult, LookupWorker, NominatimClient,
    ReverseGeocoder,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use map::{Marker, Popup, TileSource};
pub use model::app_state::AppState;
pub use model::place::{Coordinates, Place, PlaceId, PlaceMeta, PlaceValidationError};
pub use repo::kv_repo::{KvStore, RepoError, RepoResult, SqliteKvStore};
pub use repo::state_repo::{StateRepository, STATE_KEY};
pub use service::places_service::{
    NewPlace, PlacePatch, PlacesService, PlacesServiceError, ServiceResult,
};
pub use service::transfer::{TransferError, EXPORT_FILE_NAME};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
