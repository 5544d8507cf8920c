//! Storage adapter: key-value slot contract and the persisted state document.
//!
//! # Responsibility
//! - Define the key-value slot contract used by higher layers.
//! - Isolate SQLite query details from service orchestration.
//! - Serialize/deserialize the single `AppState` document.
//!
//! # Invariants
//! - Exactly one key holds the application document.
//! - A malformed document never fails startup; it reads as default state.

pub mod kv_repo;
pub mod state_repo;
