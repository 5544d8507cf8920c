//! Persisted application document.
//!
//! # Responsibility
//! - Hold the place list plus the two UI mode flags.
//! - Define the exact JSON shape stored in the key-value slot.
//!
//! # Invariants
//! - `locations` is newest-first and holds unique ids.
//! - Every stored place passes `Place::validate`.
//! - Missing flags deserialize to their defaults (`true`).

use crate::model::place::Place;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Process-wide state persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub locations: Vec<Place>,
    #[serde(default = "default_true")]
    pub is_collecting: bool,
    #[serde(default = "default_true")]
    pub show_list: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            is_collecting: true,
            show_list: true,
        }
    }
}

impl AppState {
    pub fn find(&self, id: &str) -> Option<&Place> {
        self.locations.iter().find(|place| place.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.locations.iter().position(|place| place.id == id)
    }
}

/// Drops places whose id was already seen, keeping the first occurrence.
///
/// Returns the number of dropped entries.
pub fn dedup_by_id(places: &mut Vec<Place>) -> usize {
    let before = places.len();
    let mut seen = HashSet::with_capacity(before);
    places.retain(|place| seen.insert(place.id.clone()));
    let dropped = before - places.len();
    if dropped > 0 {
        warn!(
            "event=dedup_places module=model status=ok dropped={} kept={}",
            dropped,
            places.len()
        );
    }
    dropped
}

/// Drops places that fail [`Place::validate`].
///
/// Returns the number of dropped entries.
pub fn drop_invalid(places: &mut Vec<Place>) -> usize {
    let before = places.len();
    places.retain(|place| match place.validate() {
        Ok(()) => true,
        Err(err) => {
            warn!(
                "event=drop_invalid_place module=model status=ok id={:?} error={}",
                place.id, err
            );
            false
        }
    });
    before - places.len()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{dedup_by_id, drop_invalid, AppState};
    use crate::model::place::{Coordinates, Place};

    #[test]
    fn missing_flags_default_to_true() {
        let state: AppState = serde_json::from_str(r#"{"locations": []}"#).unwrap();
        assert!(state.is_collecting);
        assert!(state.show_list);
    }

    #[test]
    fn state_serializes_with_camel_case_fields() {
        let state = AppState {
            is_collecting: false,
            ..AppState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["isCollecting"], false);
        assert_eq!(json["showList"], true);
        assert!(json["locations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let coords = Coordinates::new(1.0, 2.0).unwrap();
        let first = Place::new(coords, "first", "", None);
        let mut second = Place::new(coords, "second", "", None);
        second.id = first.id.clone();
        let third = Place::new(coords, "third", "", None);

        let mut places = vec![first.clone(), second, third.clone()];
        assert_eq!(dedup_by_id(&mut places), 1);
        assert_eq!(places, vec![first, third]);
    }

    #[test]
    fn drop_invalid_removes_bad_coordinates_and_empty_ids() {
        let good = Place::new(Coordinates::new(1.0, 2.0).unwrap(), "good", "", None);
        let mut far_north = good.clone();
        far_north.id = "north".to_string();
        far_north.lat = 500.0;
        let mut anonymous = good.clone();
        anonymous.id = "  ".to_string();

        let mut places = vec![far_north, good.clone(), anonymous];
        assert_eq!(drop_invalid(&mut places), 2);
        assert_eq!(places, vec![good]);
    }
}
