//! WebAssembly module for the Fingerling Distribution dashboard
//!
//! Provides client-side helpers for:
//! - Batch id checks and remaining stock
//! - Report status labels
//! - Distribution form validation

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("fingerling-distribution wasm loaded"));
}

/// Check a manually entered batch id (`BF-YYYYMMDD-NNN`)
#[wasm_bindgen]
pub fn validate_batch_id(id: &str) -> bool {
    is_valid_batch_id(id.trim())
}

/// Fingerlings left in a batch
#[wasm_bindgen]
pub fn calculate_remaining(total_count: f64, distributed: f64) -> f64 {
    remaining_fingerlings(total_count as i64, distributed as i64) as f64
}

/// Status label for a batch with stock left
#[wasm_bindgen]
pub fn batch_status_label(remaining: f64, days_since_creation: f64, overdue_after_days: f64) -> String {
    if remaining <= 0.0 {
        return BatchStatus::Completed.to_string();
    }
    BatchStatus::from_age(days_since_creation as i64, overdue_after_days as i64).to_string()
}

/// Display string for a distribution location
#[wasm_bindgen]
pub fn format_location(barangay: Option<String>, municipality: &str, province: &str) -> String {
    compose_location(barangay.as_deref(), municipality, province)
}

/// Canonical species name, or an error naming the accepted values
#[wasm_bindgen]
pub fn normalize_species(species: &str) -> Result<String, JsValue> {
    species
        .parse::<Species>()
        .map(|s| s.as_str().to_string())
        .map_err(|e| JsValue::from_str(&e.message))
}

/// Validate a distribution form payload; returns an error message or nothing
#[wasm_bindgen]
pub fn validate_distribution_json(input_json: &str) -> Result<(), JsValue> {
    let input: NewDistribution = serde_json::from_str(input_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid distribution JSON: {}", e)))?;

    validate_new_distribution(&input).map_err(|e| JsValue::from_str(&e.to_string()))
}
