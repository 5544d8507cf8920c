//! Place list use-case service.
//!
//! # Responsibility
//! - Own the in-memory `AppState` loaded at startup.
//! - Provide create/update/remove/replace/reset over the place list.
//! - Persist the whole document after every effective mutation.
//!
//! # Invariants
//! - `locations` never contains two places with the same id.
//! - Loaded places that fail validation are dropped, never kept in memory.
//! - New places are prepended (newest first).
//! - Update/remove on an unknown id is a no-op and writes nothing.

use crate::model::app_state::{dedup_by_id, drop_invalid, AppState};
use crate::model::place::{resolve_title, Coordinates, Place, PlaceMeta, PlaceValidationError};
use crate::repo::kv_repo::{KvStore, RepoError};
use crate::repo::state_repo::StateRepository;
use crate::service::transfer::{export_places, parse_import, TransferError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for place list use-cases.
#[derive(Debug)]
pub enum PlacesServiceError {
    Validation(PlaceValidationError),
    Transfer(TransferError),
    Repo(RepoError),
}

impl Display for PlacesServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Transfer(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlacesServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Transfer(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<PlaceValidationError> for PlacesServiceError {
    fn from(value: PlaceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TransferError> for PlacesServiceError {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

impl From<RepoError> for PlacesServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type ServiceResult<T> = Result<T, PlacesServiceError>;

/// Input for creating one place.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    pub coordinates: Coordinates,
    /// Blank titles resolve to the geocoded city or "Untitled place".
    pub title: String,
    pub notes: String,
    pub meta: Option<PlaceMeta>,
}

/// Partial overwrite of a place's mutable fields. `None` keeps the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacePatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub meta: Option<PlaceMeta>,
}

/// Place list facade over a key-value slot.
pub struct PlacesService<S: KvStore> {
    repo: StateRepository<S>,
    state: AppState,
}

impl<S: KvStore> PlacesService<S> {
    /// Loads the persisted document (or defaults) from `store`.
    pub fn load(store: S) -> ServiceResult<Self> {
        let repo = StateRepository::new(store);
        let mut state = repo.load()?;
        drop_invalid(&mut state.locations);
        dedup_by_id(&mut state.locations);
        info!(
            "event=state_ready module=service status=ok locations={} collecting={} show_list={}",
            state.locations.len(),
            state.is_collecting,
            state.show_list
        );
        Ok(Self { repo, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn locations(&self) -> &[Place] {
        &self.state.locations
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.state.find(id)
    }

    /// Creates, prepends and persists one place.
    pub fn add(&mut self, draft: NewPlace) -> ServiceResult<Place> {
        let place = Place::new(draft.coordinates, &draft.title, draft.notes, draft.meta);
        place.validate()?;

        self.state.locations.insert(0, place.clone());
        self.persist()?;
        info!(
            "event=place_add module=service status=ok id={} total={}",
            place.id,
            self.state.locations.len()
        );
        Ok(place)
    }

    /// Overwrites supplied fields of the place with `id`.
    ///
    /// Returns `Ok(None)` when no such place exists.
    pub fn update(&mut self, id: &str, patch: PlacePatch) -> ServiceResult<Option<Place>> {
        let Some(index) = self.state.position(id) else {
            info!("event=place_update module=service status=noop reason=unknown_id");
            return Ok(None);
        };

        let place = &mut self.state.locations[index];
        if let Some(meta) = patch.meta {
            place.meta = Some(meta).filter(|value| !value.is_empty());
        }
        if let Some(notes) = patch.notes {
            place.notes = notes;
        }
        if let Some(title) = patch.title {
            place.title = resolve_title(&title, place.meta.as_ref());
        }
        let updated = place.clone();

        self.persist()?;
        info!("event=place_update module=service status=ok id={}", updated.id);
        Ok(Some(updated))
    }

    /// Removes the place with `id`, returning it when it existed.
    pub fn remove(&mut self, id: &str) -> ServiceResult<Option<Place>> {
        let Some(index) = self.state.position(id) else {
            info!("event=place_remove module=service status=noop reason=unknown_id");
            return Ok(None);
        };

        let removed = self.state.locations.remove(index);
        self.persist()?;
        info!(
            "event=place_remove module=service status=ok id={} total={}",
            removed.id,
            self.state.locations.len()
        );
        Ok(Some(removed))
    }

    /// Replaces the whole list. Duplicate ids keep their first occurrence.
    pub fn replace_all(&mut self, places: Vec<Place>) -> ServiceResult<()> {
        self.state.locations = places;
        dedup_by_id(&mut self.state.locations);
        self.persist()
    }

    /// Parses an import document and applies it.
    ///
    /// On success the list is replaced and the app leaves collecting mode
    /// with the list hidden. On failure nothing changes.
    pub fn import_json(&mut self, text: &str) -> ServiceResult<usize> {
        let mut places = parse_import(text)?;
        dedup_by_id(&mut places);
        let count = places.len();

        self.state.locations = places;
        self.state.is_collecting = false;
        self.state.show_list = false;
        self.persist()?;
        info!("event=import module=service status=ok count={}", count);
        Ok(count)
    }

    /// Renders the export document for the current list.
    pub fn export_json(&self) -> ServiceResult<String> {
        Ok(export_places(&self.state.locations)?)
    }

    /// Clears the list, restores default flags and erases the document.
    pub fn clear(&mut self) -> ServiceResult<()> {
        self.state = AppState::default();
        self.repo.clear()?;
        info!("event=reset module=service status=ok");
        Ok(())
    }

    pub fn set_collecting(&mut self, collecting: bool) -> ServiceResult<()> {
        if self.state.is_collecting == collecting {
            return Ok(());
        }
        self.state.is_collecting = collecting;
        self.persist()
    }

    pub fn set_show_list(&mut self, show: bool) -> ServiceResult<()> {
        if self.state.show_list == show {
            return Ok(());
        }
        self.state.show_list = show;
        self.persist()
    }

    /// Reads back the raw persisted document.
    pub fn persisted_document(&self) -> ServiceResult<Option<String>> {
        Ok(self.repo.raw()?)
    }

    fn persist(&self) -> ServiceResult<()> {
        self.repo.save(&self.state)?;
        Ok(())
    }
}
