//! Headless map interaction surface.
//!
//! # Responsibility
//! - Project the place list into markers with popups.
//! - Route map clicks to the editor while collecting.
//! - Describe the raster tile source the front end draws.
//!
//! # Invariants
//! - Markers follow `locations` order, one per place.
//! - Clicks outside collecting mode never open a draft.

use crate::editor::{DraftToken, Editor};
use crate::model::app_state::AppState;
use crate::model::place::{Coordinates, Place, PlaceId};
use log::debug;

pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Raster tile URL template plus the attribution it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
        }
    }
}

impl TileSource {
    /// Expands `{z}`, `{x}` and `{y}` in the template.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Text shown when a marker is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: String,
    pub notes: Option<String>,
    /// `city, country` when enrichment is known.
    pub locality: Option<String>,
    /// Coordinates with five decimals, e.g. `40.00000, -74.00000`.
    pub position: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub place_id: PlaceId,
    pub coordinates: Coordinates,
    pub popup: Popup,
}

/// Axis-aligned box around a set of markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }
}

/// What a map click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    DraftOpened(DraftToken),
    Ignored,
}

/// Builds one marker per place, in list order.
pub fn markers(state: &AppState) -> Vec<Marker> {
    state.locations.iter().map(marker_for).collect()
}

pub fn marker_for(place: &Place) -> Marker {
    let notes = Some(place.notes.trim())
        .filter(|notes| !notes.is_empty())
        .map(str::to_string);
    Marker {
        place_id: place.id.clone(),
        coordinates: place.coordinates(),
        popup: Popup {
            title: place.title.clone(),
            notes,
            locality: place.meta.as_ref().and_then(|meta| meta.locality()),
            position: format_position(place.coordinates()),
        },
    }
}

/// Opens a create draft at `coordinates` when collecting.
pub fn handle_click(collecting: bool, editor: &mut Editor, coordinates: Coordinates) -> ClickOutcome {
    if !collecting {
        debug!("event=map_click module=map status=ignored reason=not_collecting");
        return ClickOutcome::Ignored;
    }
    ClickOutcome::DraftOpened(editor.begin_create(coordinates))
}

/// Smallest box containing every place, or `None` for an empty list.
pub fn bounds(places: &[Place]) -> Option<Bounds> {
    let first = places.first()?;
    let seed = Bounds {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    Some(places.iter().skip(1).fold(seed, |acc, place| Bounds {
        south: acc.south.min(place.lat),
        west: acc.west.min(place.lng),
        north: acc.north.max(place.lat),
        east: acc.east.max(place.lng),
    }))
}

pub fn format_position(coordinates: Coordinates) -> String {
    format!("{:.5}, {:.5}", coordinates.lat, coordinates.lng)
}
