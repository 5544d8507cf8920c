//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the state repository into place list use-cases.
//! - Keep UI layers decoupled from storage details.

pub mod places_service;
pub mod transfer;
