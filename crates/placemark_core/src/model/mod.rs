//! Domain model for saved places and the persisted application document.
//!
//! # Responsibility
//! - Define canonical data structures shared by services, map and editor.
//! - Own the wire shape of the persisted/exported JSON documents.
//!
//! # Invariants
//! - Every place is identified by a non-empty, immutable `PlaceId`.
//! - Coordinates are finite and inside WGS84 ranges.
//! - Draft state never appears in these types.

pub mod app_state;
pub mod place;
