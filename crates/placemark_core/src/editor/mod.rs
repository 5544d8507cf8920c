//! Draft/editor panel state machine.
//!
//! # Responsibility
//! - Hold the transient create/edit form for at most one place.
//! - Turn a submitted draft plus its lookup result into a commit.
//!
//! # Invariants
//! - Transitions: `Closed -> Creating|Editing -> Closed`.
//! - Every opened draft gets a fresh `DraftToken`.
//! - A lookup result is applied only to the draft that requested it;
//!   results for cancelled or replaced drafts are dropped.
//! - Drafts are never persisted.

use crate::geocode::{LookupRequest, LookupResult};
use crate::model::place::{Coordinates, Place, PlaceId, PlaceMeta};
use crate::service::places_service::{NewPlace, PlacePatch};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of one opened draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DraftToken(u64);

impl DraftToken {
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

impl Display for DraftToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the open draft will produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftMode {
    Creating,
    Editing { place_id: PlaceId },
}

/// Coarse editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Closed,
    Creating,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorError {
    /// The operation needs an open draft.
    NoDraft,
    /// The draft was already submitted and waits for its lookup.
    LookupPending,
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDraft => write!(f, "no place is being edited"),
            Self::LookupPending => write!(f, "draft already submitted; waiting for lookup"),
        }
    }
}

impl Error for EditorError {}

/// In-progress create/edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    token: DraftToken,
    mode: DraftMode,
    coordinates: Coordinates,
    pub title: String,
    pub notes: String,
    /// Meta of the place being edited, shown until a lookup refreshes it.
    pub meta: Option<PlaceMeta>,
    loading: bool,
}

impl Draft {
    pub fn token(&self) -> DraftToken {
        self.token
    }

    pub fn mode(&self) -> &DraftMode {
        &self.mode
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Result of resolving a submitted draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    Create(NewPlace),
    Update { place_id: PlaceId, patch: PlacePatch },
}

#[derive(Debug, Default)]
pub struct Editor {
    draft: Option<Draft>,
    last_token: u64,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn phase(&self) -> EditorPhase {
        match self.draft.as_ref().map(|draft| &draft.mode) {
            None => EditorPhase::Closed,
            Some(DraftMode::Creating) => EditorPhase::Creating,
            Some(DraftMode::Editing { .. }) => EditorPhase::Editing,
        }
    }

    /// Whether the open draft waits for its lookup.
    pub fn is_loading(&self) -> bool {
        self.draft.as_ref().is_some_and(|draft| draft.loading)
    }

    /// Opens a blank create draft at `coordinates`, replacing any open draft.
    pub fn begin_create(&mut self, coordinates: Coordinates) -> DraftToken {
        self.open(DraftMode::Creating, coordinates, String::new(), String::new(), None)
    }

    /// Opens an edit draft pre-filled from `place`, replacing any open draft.
    pub fn begin_edit(&mut self, place: &Place) -> DraftToken {
        self.open(
            DraftMode::Editing {
                place_id: place.id.clone(),
            },
            place.coordinates(),
            place.title.clone(),
            place.notes.clone(),
            place.meta.clone(),
        )
    }

    /// Updates the draft title. Allowed while a lookup is in flight.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), EditorError> {
        let draft = self.draft.as_mut().ok_or(EditorError::NoDraft)?;
        draft.title = title.into();
        Ok(())
    }

    /// Updates the draft notes. Allowed while a lookup is in flight.
    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), EditorError> {
        let draft = self.draft.as_mut().ok_or(EditorError::NoDraft)?;
        draft.notes = notes.into();
        Ok(())
    }

    /// Discards the open draft.
    pub fn cancel(&mut self) -> Option<Draft> {
        let draft = self.draft.take();
        if let Some(draft) = draft.as_ref() {
            debug!(
                "event=draft_cancel module=editor status=ok token={} loading={}",
                draft.token, draft.loading
            );
        }
        draft
    }

    /// Marks the draft as submitted and returns the lookup to run.
    pub fn submit(&mut self) -> Result<LookupRequest, EditorError> {
        let draft = self.draft.as_mut().ok_or(EditorError::NoDraft)?;
        if draft.loading {
            return Err(EditorError::LookupPending);
        }
        draft.loading = true;
        Ok(LookupRequest {
            token: draft.token,
            coordinates: draft.coordinates,
        })
    }

    /// Applies a finished lookup.
    ///
    /// Returns the commit and closes the editor when `result` belongs to the
    /// submitted draft; otherwise the result is stale and dropped.
    pub fn resolve(&mut self, result: LookupResult) -> Option<Commit> {
        let matches = self
            .draft
            .as_ref()
            .is_some_and(|draft| draft.loading && draft.token == result.token);
        if !matches {
            debug!(
                "event=lookup_resolve module=editor status=stale token={}",
                result.token
            );
            return None;
        }

        let draft = self.draft.take()?;
        let meta = Some(result.meta).filter(|meta| !meta.is_empty());
        let commit = match draft.mode {
            DraftMode::Creating => Commit::Create(NewPlace {
                coordinates: draft.coordinates,
                title: draft.title,
                notes: draft.notes,
                meta,
            }),
            DraftMode::Editing { place_id } => Commit::Update {
                place_id,
                patch: PlacePatch {
                    title: Some(draft.title),
                    notes: Some(draft.notes),
                    meta: Some(meta.unwrap_or_default()),
                },
            },
        };
        Some(commit)
    }

    fn open(
        &mut self,
        mode: DraftMode,
        coordinates: Coordinates,
        title: String,
        notes: String,
        meta: Option<PlaceMeta>,
    ) -> DraftToken {
        self.last_token += 1;
        let token = DraftToken(self.last_token);
        if let Some(previous) = self.draft.as_ref() {
            debug!(
                "event=draft_replace module=editor status=ok previous={} next={}",
                previous.token, token
            );
        }
        self.draft = Some(Draft {
            token,
            mode,
            coordinates,
            title,
            notes,
            meta,
            loading: false,
        });
        token
    }
}

#[cfg(test)]
mod tests {
    use super::{Commit, Editor, EditorError, EditorPhase};
    use crate::geocode::LookupResult;
    use crate::model::place::{Coordinates, PlaceMeta};

    fn coords() -> Coordinates {
        Coordinates::new(40.0, -74.0).unwrap()
    }

    #[test]
    fn submit_requires_open_draft_and_is_single_shot() {
        let mut editor = Editor::new();
        assert_eq!(editor.submit().unwrap_err(), EditorError::NoDraft);

        editor.begin_create(coords());
        let request = editor.submit().unwrap();
        assert_eq!(request.coordinates, coords());
        assert!(editor.is_loading());
        assert_eq!(editor.submit().unwrap_err(), EditorError::LookupPending);
    }

    #[test]
    fn resolve_uses_latest_draft_fields() {
        let mut editor = Editor::new();
        editor.begin_create(coords());
        let request = editor.submit().unwrap();
        editor.set_title("typed while loading").unwrap();

        let commit = editor
            .resolve(LookupResult {
                token: request.token,
                meta: PlaceMeta::default(),
            })
            .unwrap();
        match commit {
            Commit::Create(new_place) => {
                assert_eq!(new_place.title, "typed while loading");
                assert_eq!(new_place.meta, None);
            }
            other => panic!("unexpected commit: {other:?}"),
        }
        assert_eq!(editor.phase(), EditorPhase::Closed);
    }

    #[test]
    fn result_for_replaced_draft_is_dropped() {
        let mut editor = Editor::new();
        editor.begin_create(coords());
        let stale = editor.submit().unwrap();
        let fresh = editor.begin_create(Coordinates::new(1.0, 1.0).unwrap());

        assert!(editor
            .resolve(LookupResult {
                token: stale.token,
                meta: PlaceMeta::default(),
            })
            .is_none());
        assert_eq!(editor.draft().unwrap().token(), fresh);
        assert!(!editor.is_loading());
    }
}
