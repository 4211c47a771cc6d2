//! Validation utilities for the Fingerling Distribution Tracking System
//!
//! Rules that cannot be expressed with `validator` attributes live here, next
//! to the conversion of `validator` errors into a single field/message pair.

use rust_decimal::Decimal;
use thiserror::Error;
use validator::Validate;

use crate::models::{
    is_valid_batch_id, BatchUpdate, DistributionUpdate, NewBatch, NewDistribution, NewSession,
    NewUser, Remarks, SessionCounts, SessionUpdate,
};

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().copied().collect();
        fields.sort_unstable();

        let Some(field) = fields.first().copied() else {
            return ValidationError::new("input", "Invalid input");
        };

        let message = field_errors
            .get(field)
            .and_then(|errs| errs.first())
            .map(|err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {}", field),
            })
            .unwrap_or_else(|| format!("Invalid value for {}", field));

        ValidationError::new(field, message)
    }
}

// ============================================================================
// Distribution Validations
// ============================================================================

/// Survival rate is a fraction between 0 and 1
pub fn validate_survival_rate(rate: Decimal) -> Result<(), ValidationError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::new(
            "survival_rate",
            "Survival rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Option<Decimal>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(ValidationError::new(
            field,
            format!("{} cannot be negative", field),
        )),
        _ => Ok(()),
    }
}

/// `Other` must carry custom remarks; custom remarks need `Other`
pub fn validate_remarks(
    remarks: Option<Remarks>,
    custom_remarks: Option<&str>,
) -> Result<(), ValidationError> {
    let has_custom = custom_remarks.map_or(false, |c| !c.trim().is_empty());
    match remarks {
        Some(Remarks::Other) if !has_custom => Err(ValidationError::new(
            "custom_remarks",
            "Custom remarks are required when remarks is 'Other'",
        )),
        Some(Remarks::Other) => Ok(()),
        _ if has_custom => Err(ValidationError::new(
            "custom_remarks",
            "Custom remarks are only allowed when remarks is 'Other'",
        )),
        _ => Ok(()),
    }
}

pub fn validate_new_distribution(input: &NewDistribution) -> Result<(), ValidationError> {
    input.validate()?;
    if input.beneficiary_name.trim().is_empty() {
        return Err(ValidationError::new(
            "beneficiary_name",
            "Beneficiary name is required",
        ));
    }
    if let Some(rate) = input.survival_rate {
        validate_survival_rate(rate)?;
    }
    validate_non_negative("avg_weight", input.avg_weight)?;
    validate_non_negative("forecasted_harvest_kilos", input.forecasted_harvest_kilos)?;
    validate_non_negative("actual_harvest_kilos", input.actual_harvest_kilos)?;
    validate_remarks(input.remarks, input.custom_remarks.as_deref())
}

/// Field-level checks for an update; the remarks pairing is checked against
/// the merged record by the caller
pub fn validate_distribution_update(input: &DistributionUpdate) -> Result<(), ValidationError> {
    input.validate()?;
    if let Some(rate) = input.survival_rate {
        validate_survival_rate(rate)?;
    }
    validate_non_negative("avg_weight", input.avg_weight)?;
    validate_non_negative("forecasted_harvest_kilos", input.forecasted_harvest_kilos)?;
    validate_non_negative("actual_harvest_kilos", input.actual_harvest_kilos)
}

// ============================================================================
// Batch Validations
// ============================================================================

pub fn validate_new_batch(input: &NewBatch) -> Result<(), ValidationError> {
    input.validate()?;
    if input.name.trim().is_empty() {
        return Err(ValidationError::new("name", "Batch name is required"));
    }
    if let Some(id) = &input.id {
        if !is_valid_batch_id(id) {
            return Err(ValidationError::new(
                "id",
                "Batch id must match the format BF-YYYYMMDD-NNN",
            ));
        }
    }
    Ok(())
}

pub fn validate_batch_update(input: &BatchUpdate) -> Result<(), ValidationError> {
    input.validate()?;
    Ok(())
}

// ============================================================================
// Session Validations
// ============================================================================

pub fn validate_session_counts(counts: &SessionCounts) -> Result<(), ValidationError> {
    let negative = match counts {
        SessionCounts::Stocking { stocked } => *stocked < 0,
        SessionCounts::FieldCount {
            alive,
            dead,
            sampled,
        } => *alive < 0 || *dead < 0 || sampled.map_or(false, |s| s < 0),
    };
    if negative {
        return Err(ValidationError::new("counts", "Counts cannot be negative"));
    }
    Ok(())
}

pub fn validate_new_session(input: &NewSession) -> Result<(), ValidationError> {
    if input.batch_id.trim().is_empty() {
        return Err(ValidationError::new("batch_id", "Batch id is required"));
    }
    validate_session_counts(&input.counts)
}

pub fn validate_session_update(input: &SessionUpdate) -> Result<(), ValidationError> {
    if let Some(batch_id) = &input.batch_id {
        if batch_id.trim().is_empty() {
            return Err(ValidationError::new("batch_id", "Batch id cannot be empty"));
        }
    }
    match &input.counts {
        Some(counts) => validate_session_counts(counts),
        None => Ok(()),
    }
}

// ============================================================================
// Account Validations
// ============================================================================

pub fn validate_new_user(input: &NewUser) -> Result<(), ValidationError> {
    input.validate()?;
    Ok(())
}

// ============================================================================
// Prediction and Upload Validations
// ============================================================================

/// Species keys understood by the prediction service
pub const PREDICTION_SPECIES: &[&str] = &["tilapia", "bangus"];

/// Map a user-supplied species to the prediction service's key
pub fn normalize_prediction_species(species: &str) -> Result<&'static str, ValidationError> {
    match species.trim().to_lowercase().as_str() {
        "tilapia" | "red tilapia" => Ok("tilapia"),
        "bangus" | "milkfish" => Ok("bangus"),
        _ => Err(ValidationError::new(
            "species",
            format!(
                "Invalid species: {}. Must be one of: {}",
                species,
                PREDICTION_SPECIES.join(", ")
            ),
        )),
    }
}

/// Image types accepted by the upload endpoint
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Upload size limit (2 MB)
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

pub fn validate_image_upload(
    content_type: &str,
    size: usize,
    max_bytes: usize,
) -> Result<(), ValidationError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ValidationError::new(
            "file",
            "Only image files are allowed (jpeg, png, gif, webp)",
        ));
    }
    if size == 0 {
        return Err(ValidationError::new("file", "Uploaded file is empty"));
    }
    if size > max_bytes {
        return Err(ValidationError::new(
            "file",
            format!("File exceeds the {} byte limit", max_bytes),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Species;
    use chrono::NaiveDate;

    fn distribution_input() -> NewDistribution {
        NewDistribution {
            date_distributed: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            beneficiary_name: "Juan Dela Cruz".to_string(),
            barangay: Some("Bonuan".to_string()),
            municipality: "Dagupan".to_string(),
            province: "Pangasinan".to_string(),
            fingerlings: 400,
            species: Species::Tilapia,
            survival_rate: Some(Decimal::new(85, 2)),
            avg_weight: None,
            forecasted_harvest_date: None,
            forecasted_harvest_kilos: None,
            actual_harvest_date: None,
            actual_harvest_kilos: None,
            remarks: None,
            custom_remarks: None,
            batch_id: None,
            user_id: Some(1),
        }
    }

    // ========================================================================
    // Distribution Validation Tests
    // ========================================================================

    #[test]
    fn test_valid_distribution() {
        assert!(validate_new_distribution(&distribution_input()).is_ok());
    }

    #[test]
    fn test_distribution_rejects_non_positive_fingerlings() {
        let mut input = distribution_input();
        input.fingerlings = 0;
        let err = validate_new_distribution(&input).unwrap_err();
        assert_eq!(err.field, "fingerlings");
        assert_eq!(err.message, "Fingerlings must be a positive number");

        input.fingerlings = -5;
        assert!(validate_new_distribution(&input).is_err());
    }

    #[test]
    fn test_distribution_update_rejects_non_positive_fingerlings() {
        let update = DistributionUpdate {
            fingerlings: Some(0),
            ..Default::default()
        };
        assert_eq!(
            validate_distribution_update(&update).unwrap_err().field,
            "fingerlings"
        );
        assert!(validate_distribution_update(&DistributionUpdate::default()).is_ok());
    }

    #[test]
    fn test_survival_rate_bounds() {
        assert!(validate_survival_rate(Decimal::ZERO).is_ok());
        assert!(validate_survival_rate(Decimal::ONE).is_ok());
        assert!(validate_survival_rate(Decimal::new(101, 2)).is_err());
        assert!(validate_survival_rate(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_remarks_pairing() {
        assert!(validate_remarks(None, None).is_ok());
        assert!(validate_remarks(Some(Remarks::Harvested), None).is_ok());
        assert!(validate_remarks(Some(Remarks::Other), Some("Flooded pond")).is_ok());
        assert!(validate_remarks(Some(Remarks::Other), None).is_err());
        assert!(validate_remarks(Some(Remarks::Other), Some("  ")).is_err());
        assert!(validate_remarks(Some(Remarks::Mortality), Some("extra")).is_err());
    }

    #[test]
    fn test_blank_beneficiary_rejected() {
        let mut input = distribution_input();
        input.beneficiary_name = "   ".to_string();
        assert_eq!(
            validate_new_distribution(&input).unwrap_err().field,
            "beneficiary_name"
        );
    }

    // ========================================================================
    // Batch and Session Validation Tests
    // ========================================================================

    #[test]
    fn test_batch_validation() {
        let input = NewBatch {
            id: None,
            name: "Tilapia Batch".to_string(),
            description: None,
            user_id: 1,
            total_count: Some(1000),
            is_active: None,
        };
        assert!(validate_new_batch(&input).is_ok());

        let bad_count = NewBatch {
            total_count: Some(-1),
            ..input.clone()
        };
        assert_eq!(validate_new_batch(&bad_count).unwrap_err().field, "total_count");

        let bad_id = NewBatch {
            id: Some("BATCH-1".to_string()),
            ..input
        };
        assert_eq!(validate_new_batch(&bad_id).unwrap_err().field, "id");
    }

    #[test]
    fn test_session_counts_validation() {
        assert!(validate_session_counts(&SessionCounts::Stocking { stocked: 10 }).is_ok());
        assert!(validate_session_counts(&SessionCounts::FieldCount {
            alive: 5,
            dead: -1,
            sampled: None
        })
        .is_err());
    }

    // ========================================================================
    // Prediction and Upload Validation Tests
    // ========================================================================

    #[test]
    fn test_prediction_species() {
        assert_eq!(normalize_prediction_species("Tilapia").unwrap(), "tilapia");
        assert_eq!(normalize_prediction_species("Red Tilapia").unwrap(), "tilapia");
        assert_eq!(normalize_prediction_species("BANGUS").unwrap(), "bangus");
        let err = normalize_prediction_species("Salmon").unwrap_err();
        assert!(err.message.contains("Salmon"));
    }

    #[test]
    fn test_image_upload_rules() {
        assert!(validate_image_upload("image/png", 1024, MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_image_upload("application/pdf", 1024, MAX_UPLOAD_BYTES).is_err());
        assert!(validate_image_upload("image/png", 0, MAX_UPLOAD_BYTES).is_err());
        assert!(validate_image_upload("image/png", MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES).is_err());
    }
}
