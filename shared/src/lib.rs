//! Shared types and models for the Fingerling Distribution Tracking System
//!
//! This crate contains the domain types shared between the backend, the
//! admin dashboard (via WASM), and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
