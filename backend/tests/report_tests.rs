//! Report aggregation property tests
//!
//! - Beneficiary summary totals equal the sum of the rows
//! - Per-species statistics add up to the grand totals
//! - Distributed batch groups account for every distribution

use std::collections::HashMap;

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    group_distributed_batches, BatchDistribution, BeneficiaryRecord, BeneficiarySummary,
    DistributedSummary, LocationGrouping, ReportFilters, SpeciesTotals, StatsTotals,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn species_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Tilapia".to_string()),
        Just("Bangus".to_string()),
        Just("Red Tilapia".to_string()),
    ]
}

fn beneficiary_strategy() -> impl Strategy<Value = BeneficiaryRecord> {
    ("[A-Z][a-z]{2,8} [A-Z][a-z]{2,8}", species_strategy(), 1i64..50_000, 0u32..365).prop_map(
        |(name, species, total, offset)| BeneficiaryRecord {
            beneficiary_name: name,
            species,
            date_distributed: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Duration::days(i64::from(offset)),
            user_id: 1,
            province: "Laguna".to_string(),
            municipality: "Bay".to_string(),
            barangay: "N/A".to_string(),
            total_fingerlings: total,
        },
    )
}

fn species_totals_strategy() -> impl Strategy<Value = SpeciesTotals> {
    (species_strategy(), 1i64..500, 0i64..1_000_000, 0i64..100_000).prop_map(
        |(species, count, fingerlings, kilos_cents)| SpeciesTotals {
            species,
            total_distributions: count,
            total_fingerlings: fingerlings,
            total_harvest_kilos: Decimal::new(kilos_cents, 2),
            avg_survival_rate: None,
            avg_weight: None,
        },
    )
}

fn batch_distribution_strategy() -> impl Strategy<Value = BatchDistribution> {
    (1i32..10_000, 0usize..5, 1i32..5_000, prop::option::of("[A-Z][a-z]{3,8}")).prop_map(
        |(id, batch, fingerlings, barangay)| BatchDistribution {
            id,
            batch_id: format!("BF-20240301-00{}", batch),
            beneficiary_name: format!("Beneficiary {}", id),
            fingerlings,
            date_distributed: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            species: "Bangus".to_string(),
            barangay,
            municipality: "Dagupan".to_string(),
            province: "Pangasinan".to_string(),
        },
    )
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #[test]
    fn test_beneficiary_summary_matches_rows(records in prop::collection::vec(beneficiary_strategy(), 0..40)) {
        let summary = BeneficiarySummary::from_records(&records);
        prop_assert_eq!(summary.total_beneficiaries, records.len() as u64);
        prop_assert_eq!(
            summary.total_fingerlings,
            records.iter().map(|r| r.total_fingerlings).sum::<i64>()
        );
    }

    #[test]
    fn test_species_totals_add_up_to_grand_total(rows in prop::collection::vec(species_totals_strategy(), 0..6)) {
        let totals = StatsTotals::from_species(&rows);
        prop_assert_eq!(totals.total_fingerlings, rows.iter().map(|r| r.total_fingerlings).sum::<i64>());
        prop_assert_eq!(totals.total_distributions, rows.iter().map(|r| r.total_distributions).sum::<i64>());
        prop_assert_eq!(
            totals.total_harvest_kilos,
            rows.iter().map(|r| r.total_harvest_kilos).sum::<Decimal>()
        );
    }

    #[test]
    fn test_distributed_groups_cover_every_row(rows in prop::collection::vec(batch_distribution_strategy(), 0..40)) {
        let expected_total: i64 = rows.iter().map(|r| i64::from(r.fingerlings)).sum();
        let row_count = rows.len();
        let grouped = group_distributed_batches(rows, &HashMap::new());

        let mut ids: Vec<&str> = grouped.iter().map(|b| b.batch_id.as_str()).collect();
        let group_count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), group_count);

        prop_assert_eq!(grouped.iter().map(|b| b.distributions.len()).sum::<usize>(), row_count);
        for batch in &grouped {
            let sum: i64 = batch.distributions.iter().map(|d| i64::from(d.fingerlings)).sum();
            prop_assert_eq!(batch.distributed_quantity, sum);
        }

        let summary = DistributedSummary::from_batches(&grouped);
        prop_assert_eq!(summary.total_fingerlings, expected_total);
        prop_assert_eq!(summary.total_batches, group_count as u64);
    }
}

// ============================================================================
// Unit Tests: Location Filters
// ============================================================================

#[cfg(test)]
mod location_filter_tests {
    use super::*;

    fn filters(province: &str, city: &str) -> ReportFilters {
        ReportFilters {
            province: Some(province.to_string()),
            city: Some(city.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_grouping_levels() {
        assert_eq!(
            LocationGrouping::for_filters(&filters("All Provinces", "All Cities")),
            LocationGrouping::Province
        );
        assert_eq!(
            LocationGrouping::for_filters(&filters("Laguna", "All Cities")),
            LocationGrouping::Municipality
        );
        assert_eq!(
            LocationGrouping::for_filters(&filters("all provinces", "Bay")),
            LocationGrouping::Municipality
        );
        assert_eq!(
            LocationGrouping::for_filters(&filters("Laguna", "Bay")),
            LocationGrouping::Barangay
        );
    }

    #[test]
    fn test_empty_report_summaries_are_zero() {
        assert_eq!(BeneficiarySummary::from_records(&[]).total_fingerlings, 0);
        assert_eq!(StatsTotals::from_species(&[]), StatsTotals::default());
        assert_eq!(DistributedSummary::from_batches(&[]).total_batches, 0);
    }
}
