//! Application state and its single update dispatcher.
//!
//! # Responsibility
//! - Own the place service, the editor and the tile source.
//! - Apply every UI event through `App::dispatch`.
//!
//! # Invariants
//! - Lookups are never run here; `SubmitDraft` returns the request and the
//!   caller feeds the result back as `LookupFinished`.
//! - Reset changes nothing unless confirmed.
//! - A successful import or reset closes any open draft.

use crate::editor::{Commit, DraftMode, DraftToken, Editor, EditorError};
use crate::geocode::{LookupRequest, LookupResult};
use crate::map::{self, ClickOutcome, Marker, TileSource};
use crate::model::app_state::AppState;
use crate::model::place::{Coordinates, Place, PlaceId, PlaceValidationError};
use crate::repo::kv_repo::KvStore;
use crate::service::places_service::{PlacesService, PlacesServiceError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// UI events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MapClicked { lat: f64, lng: f64 },
    EditPlace(PlaceId),
    SetDraftTitle(String),
    SetDraftNotes(String),
    SubmitDraft,
    CancelDraft,
    LookupFinished(LookupResult),
    RemovePlace(PlaceId),
    SetCollecting(bool),
    ToggleCollecting,
    ToggleList,
    Import(String),
    Reset { confirmed: bool },
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Unchanged,
    DraftOpened(DraftToken),
    DraftUpdated,
    DraftCancelled,
    LookupRequested(LookupRequest),
    Committed(Place),
    StaleLookup,
    Removed(Place),
    ModeChanged { collecting: bool, show_list: bool },
    Imported(usize),
    NeedsConfirmation,
    Reset,
}

#[derive(Debug)]
pub enum AppError {
    InvalidCoordinates(PlaceValidationError),
    UnknownPlace(PlaceId),
    Editor(EditorError),
    Service(PlacesServiceError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCoordinates(err) => write!(f, "{err}"),
            Self::UnknownPlace(id) => write!(f, "no place with id `{id}`"),
            Self::Editor(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCoordinates(err) => Some(err),
            Self::UnknownPlace(_) => None,
            Self::Editor(err) => Some(err),
            Self::Service(err) => Some(err),
        }
    }
}

impl From<EditorError> for AppError {
    fn from(value: EditorError) -> Self {
        Self::Editor(value)
    }
}

impl From<PlacesServiceError> for AppError {
    fn from(value: PlacesServiceError) -> Self {
        Self::Service(value)
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub struct App<S: KvStore> {
    places: PlacesService<S>,
    editor: Editor,
    tiles: TileSource,
}

impl<S: KvStore> App<S> {
    /// Loads persisted state from `store`.
    pub fn load(store: S, tiles: TileSource) -> AppResult<Self> {
        Ok(Self {
            places: PlacesService::load(store)?,
            editor: Editor::new(),
            tiles,
        })
    }

    pub fn state(&self) -> &AppState {
        self.places.state()
    }

    pub fn places(&self) -> &PlacesService<S> {
        &self.places
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn tiles(&self) -> &TileSource {
        &self.tiles
    }

    pub fn markers(&self) -> Vec<Marker> {
        map::markers(self.places.state())
    }

    pub fn export_json(&self) -> AppResult<String> {
        Ok(self.places.export_json()?)
    }

    /// Applies one UI event.
    pub fn dispatch(&mut self, action: Action) -> AppResult<Outcome> {
        match action {
            Action::MapClicked { lat, lng } => {
                let coordinates =
                    Coordinates::new(lat, lng).map_err(AppError::InvalidCoordinates)?;
                let collecting = self.places.state().is_collecting;
                Ok(match map::handle_click(collecting, &mut self.editor, coordinates) {
                    ClickOutcome::DraftOpened(token) => Outcome::DraftOpened(token),
                    ClickOutcome::Ignored => Outcome::Unchanged,
                })
            }
            Action::EditPlace(id) => {
                let place = self
                    .places
                    .get(&id)
                    .ok_or_else(|| AppError::UnknownPlace(id.clone()))?;
                Ok(Outcome::DraftOpened(self.editor.begin_edit(place)))
            }
            Action::SetDraftTitle(title) => {
                self.editor.set_title(title)?;
                Ok(Outcome::DraftUpdated)
            }
            Action::SetDraftNotes(notes) => {
                self.editor.set_notes(notes)?;
                Ok(Outcome::DraftUpdated)
            }
            Action::SubmitDraft => Ok(Outcome::LookupRequested(self.editor.submit()?)),
            Action::CancelDraft => Ok(match self.editor.cancel() {
                Some(_) => Outcome::DraftCancelled,
                None => Outcome::Unchanged,
            }),
            Action::LookupFinished(result) => self.apply_lookup(result),
            Action::RemovePlace(id) => self.remove(&id),
            Action::SetCollecting(collecting) => {
                self.places.set_collecting(collecting)?;
                Ok(self.mode_changed())
            }
            Action::ToggleCollecting => {
                let next = !self.places.state().is_collecting;
                self.places.set_collecting(next)?;
                Ok(self.mode_changed())
            }
            Action::ToggleList => {
                let next = !self.places.state().show_list;
                self.places.set_show_list(next)?;
                Ok(self.mode_changed())
            }
            Action::Import(text) => {
                let count = self.places.import_json(&text)?;
                if self.editor.cancel().is_some() {
                    info!("event=draft_cancel module=app status=ok reason=list_replaced");
                }
                Ok(Outcome::Imported(count))
            }
            Action::Reset { confirmed } => {
                if !confirmed {
                    return Ok(Outcome::NeedsConfirmation);
                }
                self.editor.cancel();
                self.places.clear()?;
                Ok(Outcome::Reset)
            }
        }
    }

    fn apply_lookup(&mut self, result: LookupResult) -> AppResult<Outcome> {
        let Some(commit) = self.editor.resolve(result) else {
            return Ok(Outcome::StaleLookup);
        };

        let committed = match commit {
            Commit::Create(new_place) => Some(self.places.add(new_place)?),
            Commit::Update { place_id, patch } => self.places.update(&place_id, patch)?,
        };
        Ok(committed.map_or(Outcome::Unchanged, Outcome::Committed))
    }

    fn remove(&mut self, id: &str) -> AppResult<Outcome> {
        let Some(removed) = self.places.remove(id)? else {
            return Ok(Outcome::Unchanged);
        };

        let editing_removed = self.editor.draft().is_some_and(|draft| {
            matches!(draft.mode(), DraftMode::Editing { place_id } if place_id == id)
        });
        if editing_removed {
            info!("event=draft_cancel module=app status=ok reason=place_removed");
            self.editor.cancel();
        }
        Ok(Outcome::Removed(removed))
    }

    fn mode_changed(&self) -> Outcome {
        let state = self.places.state();
        Outcome::ModeChanged {
            collecting: state.is_collecting,
            show_list: state.show_list,
        }
    }
}
