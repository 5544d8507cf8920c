//! JSON export/import of the place list.
//!
//! # Responsibility
//! - Render `locations` as a pretty-printed JSON array.
//! - Parse user-supplied JSON back into validated places.
//!
//! # Invariants
//! - Export contains only the place sequence, never the mode flags.
//! - Import either yields every entry or fails as a whole.

use crate::model::place::{Place, PlaceValidationError};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Suggested file name for exported documents.
pub const EXPORT_FILE_NAME: &str = "places.json";

/// Import/export failure.
#[derive(Debug)]
pub enum TransferError {
    /// Input is not valid JSON, or export serialization failed.
    Json(serde_json::Error),
    /// Top-level JSON value is not an array.
    NotASequence { found: &'static str },
    /// One array element is not an object.
    EntryNotObject { index: usize, found: &'static str },
    /// One object could not be decoded as a place.
    InvalidEntry {
        index: usize,
        reason: serde_json::Error,
    },
    /// One place violates coordinate/identity invariants.
    InvalidPlace {
        index: usize,
        reason: PlaceValidationError,
    },
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::NotASequence { found } => {
                write!(f, "expected a JSON array of places, found {found}")
            }
            Self::EntryNotObject { index, found } => {
                write!(f, "entry {index} must be an object, found {found}")
            }
            Self::InvalidEntry { index, reason } => write!(f, "entry {index}: {reason}"),
            Self::InvalidPlace { index, reason } => write!(f, "entry {index}: {reason}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidEntry { reason, .. } => Some(reason),
            Self::InvalidPlace { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Renders places as a pretty-printed JSON array.
pub fn export_places(places: &[Place]) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(places)?)
}

/// Parses an import document.
///
/// Objects missing `id` or `createdAt` get fresh values; missing `title`
/// and `notes` default to empty.
pub fn parse_import(text: &str) -> Result<Vec<Place>, TransferError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(TransferError::NotASequence {
            found: json_kind(&value),
        });
    };

    let mut places = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(TransferError::EntryNotObject {
                index,
                found: json_kind(&item),
            });
        }
        let place: Place = serde_json::from_value(item)
            .map_err(|reason| TransferError::InvalidEntry { index, reason })?;
        place
            .validate()
            .map_err(|reason| TransferError::InvalidPlace { index, reason })?;
        places.push(place);
    }
    Ok(places)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{export_places, parse_import, TransferError};
    use crate::model::place::{Coordinates, Place, PlaceMeta};

    #[test]
    fn export_is_pretty_printed_array() {
        let place = Place::new(Coordinates::new(1.5, 2.5).unwrap(), "Dock", "", None);
        let text = export_places(&[place]).unwrap();
        assert!(text.starts_with("[\n"));
        assert!(text.contains("\"createdAt\""));
        assert!(!text.contains("isCollecting"));
    }

    #[test]
    fn import_fills_missing_identity_fields() {
        let places = parse_import(r#"[{"lat": 10.0, "lng": 20.0}]"#).unwrap();
        assert_eq!(places.len(), 1);
        assert!(!places[0].id.is_empty());
        assert!(places[0].created_at > 0);
        assert_eq!(places[0].title, "");
        assert_eq!(places[0].meta, None);
    }

    #[test]
    fn import_keeps_meta_fields() {
        let text = r#"[{"id": "a", "lat": 1, "lng": 2, "title": "t", "notes": "n",
            "createdAt": 5, "meta": {"city": "Oslo"}}]"#;
        let places = parse_import(text).unwrap();
        assert_eq!(
            places[0].meta,
            Some(PlaceMeta {
                city: Some("Oslo".to_string()),
                ..PlaceMeta::default()
            })
        );
        assert_eq!(places[0].created_at, 5);
    }

    #[test]
    fn import_rejects_non_array_and_non_object_entries() {
        assert!(matches!(
            parse_import(r#"{"locations": []}"#),
            Err(TransferError::NotASequence { found: "an object" })
        ));
        assert!(matches!(
            parse_import("[1]"),
            Err(TransferError::EntryNotObject { index: 0, .. })
        ));
        assert!(matches!(parse_import("not json"), Err(TransferError::Json(_))));
    }

    #[test]
    fn import_rejects_entries_without_coordinates() {
        assert!(matches!(
            parse_import(r#"[{"lat": 1.0, "lng": 1.0}, {"title": "no coords"}]"#),
            Err(TransferError::InvalidEntry { index: 1, .. })
        ));
        assert!(matches!(
            parse_import(r#"[{"lat": 100.0, "lng": 1.0}]"#),
            Err(TransferError::InvalidPlace { index: 0, .. })
        ));
    }
}
