//! Place domain model.
//!
//! # Responsibility
//! - Define the saved-location record and its optional enrichment.
//! - Resolve title defaults from user input and geocoded metadata.
//!
//! # Invariants
//! - `id` is stable and never reused for another place.
//! - `lat` is in `[-90, 90]`, `lng` is in `[-180, 180]`, both finite.
//! - JSON field names are camelCase; absent meta fields are omitted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Title used when neither the user nor the geocoder supplied one.
pub const UNTITLED_PLACE: &str = "Untitled place";

/// Opaque place identifier. Generated ids are UUID v4 text, imported ids
/// are kept verbatim.
pub type PlaceId = String;

/// Validation failures for place coordinates and identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaceValidationError {
    EmptyId,
    NonFiniteCoordinate,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl Display for PlaceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "place id must not be empty"),
            Self::NonFiniteCoordinate => write!(f, "coordinates must be finite numbers"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
        }
    }
}

impl Error for PlaceValidationError {}

/// A validated WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, PlaceValidationError> {
        validate_coordinates(lat, lng)?;
        Ok(Self { lat, lng })
    }
}

/// Reverse-geocoded enrichment. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PlaceMeta {
    /// Returns whether no enrichment field is set.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.city.is_none() && self.country.is_none()
    }

    /// Human-readable `city, country` line, or whichever part is known.
    pub fn locality(&self) -> Option<String> {
        match (self.city.as_deref(), self.country.as_deref()) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (Some(city), None) => Some(city.to_string()),
            (None, Some(country)) => Some(country.to_string()),
            (None, None) => None,
        }
    }
}

/// One saved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default = "new_place_id")]
    pub id: PlaceId,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    /// Unix epoch milliseconds.
    #[serde(default = "now_epoch_ms")]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PlaceMeta>,
}

impl Place {
    /// Creates a place with a generated id and the current timestamp.
    ///
    /// `title` goes through [`resolve_title`], so blank input falls back to
    /// the geocoded city or [`UNTITLED_PLACE`].
    pub fn new(
        coordinates: Coordinates,
        title: &str,
        notes: impl Into<String>,
        meta: Option<PlaceMeta>,
    ) -> Self {
        let meta = meta.filter(|value| !value.is_empty());
        Self {
            id: new_place_id(),
            lat: coordinates.lat,
            lng: coordinates.lng,
            title: resolve_title(title, meta.as_ref()),
            notes: notes.into(),
            created_at: now_epoch_ms(),
            meta,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Validates identity and coordinate invariants.
    pub fn validate(&self) -> Result<(), PlaceValidationError> {
        if self.id.trim().is_empty() {
            return Err(PlaceValidationError::EmptyId);
        }
        validate_coordinates(self.lat, self.lng)
    }
}

/// Picks the effective title: trimmed user input, else the looked-up city,
/// else [`UNTITLED_PLACE`].
pub fn resolve_title(input: &str, meta: Option<&PlaceMeta>) -> String {
    let trimmed = input.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    meta.and_then(|value| value.city.as_deref())
        .map(str::trim)
        .filter(|city| !city.is_empty())
        .unwrap_or(UNTITLED_PLACE)
        .to_string()
}

fn validate_coordinates(lat: f64, lng: f64) -> Result<(), PlaceValidationError> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(PlaceValidationError::NonFiniteCoordinate);
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(PlaceValidationError::LatitudeOutOfRange(lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(PlaceValidationError::LongitudeOutOfRange(lng));
    }
    Ok(())
}

fn new_place_id() -> PlaceId {
    Uuid::new_v4().to_string()
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{resolve_title, Coordinates, PlaceMeta, PlaceValidationError, UNTITLED_PLACE};

    fn meta_with_city(city: &str) -> PlaceMeta {
        PlaceMeta {
            city: Some(city.to_string()),
            ..PlaceMeta::default()
        }
    }

    #[test]
    fn resolve_title_prefers_trimmed_input() {
        let meta = meta_with_city("Lyon");
        assert_eq!(resolve_title("  Cafe  ", Some(&meta)), "Cafe");
    }

    #[test]
    fn resolve_title_falls_back_to_city_then_placeholder() {
        let meta = meta_with_city("Lyon");
        assert_eq!(resolve_title("   ", Some(&meta)), "Lyon");
        assert_eq!(resolve_title("", Some(&meta_with_city(" "))), UNTITLED_PLACE);
        assert_eq!(resolve_title("", None), UNTITLED_PLACE);
    }

    #[test]
    fn coordinates_reject_out_of_range_values() {
        assert_eq!(
            Coordinates::new(91.0, 0.0).unwrap_err(),
            PlaceValidationError::LatitudeOutOfRange(91.0)
        );
        assert_eq!(
            Coordinates::new(0.0, -180.5).unwrap_err(),
            PlaceValidationError::LongitudeOutOfRange(-180.5)
        );
        assert_eq!(
            Coordinates::new(f64::NAN, 0.0).unwrap_err(),
            PlaceValidationError::NonFiniteCoordinate
        );
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn locality_joins_known_parts() {
        let meta = PlaceMeta {
            display_name: None,
            city: Some("Jersey City".to_string()),
            country: Some("USA".to_string()),
        };
        assert_eq!(meta.locality().as_deref(), Some("Jersey City, USA"));
        assert_eq!(PlaceMeta::default().locality(), None);
    }
}
