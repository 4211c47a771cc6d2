//! Input validation tests
//!
//! - Distribution fingerlings must be positive
//! - Survival rate and remarks rules
//! - Prediction species normalisation

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    normalize_prediction_species, validate_distribution_update, validate_new_distribution,
    validate_remarks, validate_survival_rate, DistributionUpdate, NewDistribution, Remarks,
    Species,
};

fn distribution(fingerlings: i32) -> NewDistribution {
    NewDistribution {
        date_distributed: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        beneficiary_name: "Maria Santos".to_string(),
        barangay: Some("Bucal".to_string()),
        municipality: "Calamba".to_string(),
        province: "Laguna".to_string(),
        fingerlings,
        species: Species::Tilapia,
        survival_rate: None,
        avg_weight: None,
        forecasted_harvest_date: None,
        forecasted_harvest_kilos: None,
        actual_harvest_date: None,
        actual_harvest_kilos: None,
        remarks: None,
        custom_remarks: None,
        batch_id: None,
        user_id: None,
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #[test]
    fn test_positive_fingerlings_accepted(n in 1i32..i32::MAX) {
        prop_assert!(validate_new_distribution(&distribution(n)).is_ok());
    }

    #[test]
    fn test_non_positive_fingerlings_rejected(n in i32::MIN..=0) {
        let err = validate_new_distribution(&distribution(n)).unwrap_err();
        prop_assert_eq!(err.field, "fingerlings");

        let update = DistributionUpdate { fingerlings: Some(n), ..Default::default() };
        prop_assert!(validate_distribution_update(&update).is_err());
    }

    #[test]
    fn test_survival_rate_bounds(basis_points in -20_000i64..20_000) {
        let rate = Decimal::new(basis_points, 4);
        let in_range = (0..=10_000).contains(&basis_points);
        prop_assert_eq!(validate_survival_rate(rate).is_ok(), in_range);
    }

    #[test]
    fn test_unknown_prediction_species_named_in_error(species in "[A-Z][a-z]{3,10}") {
        prop_assume!(!["Tilapia", "Bangus", "Milkfish"].contains(&species.as_str()));
        let err = normalize_prediction_species(&species).unwrap_err();
        prop_assert!(err.message.contains(&species));
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod remarks_tests {
    use super::*;

    #[test]
    fn test_other_requires_custom_text() {
        assert!(validate_remarks(Some(Remarks::Other), None).is_err());
        assert!(validate_remarks(Some(Remarks::Other), Some("  ")).is_err());
        assert!(validate_remarks(Some(Remarks::Other), Some("Flooded pond")).is_ok());
    }

    #[test]
    fn test_custom_text_requires_other() {
        assert!(validate_remarks(Some(Remarks::Harvested), Some("note")).is_err());
        assert!(validate_remarks(None, Some("note")).is_err());
        assert!(validate_remarks(Some(Remarks::Mortality), None).is_ok());
    }

    #[test]
    fn test_species_parsing_is_case_insensitive() {
        assert_eq!("red tilapia".parse::<Species>().unwrap(), Species::RedTilapia);
        assert_eq!(" BANGUS ".parse::<Species>().unwrap(), Species::Bangus);
        assert!("Salmon".parse::<Species>().is_err());
    }
}

#[cfg(test)]
mod prediction_tests {
    use super::*;

    #[test]
    fn test_prediction_species_mapping() {
        assert_eq!(normalize_prediction_species("Tilapia").unwrap(), "tilapia");
        assert_eq!(normalize_prediction_species("Red Tilapia").unwrap(), "tilapia");
        assert_eq!(normalize_prediction_species("bangus").unwrap(), "bangus");
        assert_eq!(normalize_prediction_species("Milkfish").unwrap(), "bangus");
    }

    #[test]
    fn test_salmon_is_rejected() {
        let err = normalize_prediction_species("Salmon").unwrap_err();
        assert_eq!(err.field, "species");
        assert!(err.message.contains("Salmon"));
    }
}
