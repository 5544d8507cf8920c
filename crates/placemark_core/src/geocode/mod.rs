//! Reverse-geocoding enrichment.
//!
//! # Responsibility
//! - Define the geocoder contract used when a draft is submitted.
//! - Run lookups off the event loop and report tagged results.
//!
//! # Invariants
//! - `ReverseGeocoder::lookup` never fails; failures yield empty meta.
//! - Every result carries the token of the draft that requested it.

use crate::model::place::{Coordinates, PlaceMeta};

mod nominatim;
mod worker;

pub use nominatim::{parse_reverse_response, GeocodeError, NominatimClient, NominatimSettings};
pub use worker::{LookupRequest, LookupResult, LookupWorker};

/// Coordinates-to-address lookup.
pub trait ReverseGeocoder: Send + Sync {
    /// Resolves enrichment for `coordinates`. Returns empty meta on failure.
    fn lookup(&self, coordinates: Coordinates) -> PlaceMeta;
}

/// Geocoder used in offline mode; always returns empty meta.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGeocoder;

impl ReverseGeocoder for DisabledGeocoder {
    fn lookup(&self, _coordinates: Coordinates) -> PlaceMeta {
        PlaceMeta::default()
    }
}
