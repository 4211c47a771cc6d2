//! Report models and the post-processing applied to aggregated rows
//!
//! The SQL side of each report returns flat rows; the functions here turn
//! them into the grouped shapes the dashboard renders. They are pure so the
//! server and the property tests share one definition.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{compose_location, BatchStatus, Species};
use crate::types::{empty_string_as_none, DateRange};

pub const ALL_PROVINCES: &str = "All Provinces";
pub const ALL_CITIES: &str = "All Cities";
pub const ALL_MUNICIPALITIES: &str = "All Municipalities";
pub const ALL_BARANGAYS: &str = "All Barangays";
pub const ALL_SPECIES: &str = "All Species";

/// Placeholder for a missing barangay in beneficiary rows
pub const NO_BARANGAY: &str = "N/A";

// ============================================================================
// Filters
// ============================================================================

/// Filters accepted by the report endpoints, as query string or JSON body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Older clients send the city as `municipality`; `city` wins when both are set
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
    /// `csv` switches GET responses to a file download
    #[serde(default)]
    pub format: Option<String>,
}

fn specific<'a>(value: Option<&'a str>, sentinels: &[&str]) -> Option<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter(|v| !sentinels.iter().any(|s| s.eq_ignore_ascii_case(v)))
}

impl ReportFilters {
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.date_from, self.date_to)
    }

    /// Species text for substring matching
    pub fn species_pattern(&self) -> Option<&str> {
        specific(self.species.as_deref(), &[ALL_SPECIES, "All"])
    }

    /// Species for exact matching: the canonical name when known, else the
    /// trimmed text as sent, which matches no stored row
    pub fn species_exact(&self) -> Option<String> {
        self.species_pattern().map(|raw| {
            raw.parse::<Species>()
                .map(|species| species.as_str().to_string())
                .unwrap_or_else(|_| raw.to_string())
        })
    }

    pub fn province_filter(&self) -> Option<&str> {
        specific(self.province.as_deref(), &[ALL_PROVINCES])
    }

    pub fn city_filter(&self) -> Option<&str> {
        let city = self
            .city
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.municipality.as_deref());
        specific(city, &[ALL_CITIES, ALL_MUNICIPALITIES])
    }

    pub fn barangay_filter(&self) -> Option<&str> {
        specific(self.barangay.as_deref(), &[ALL_BARANGAYS])
    }

    pub fn location_scope(&self) -> LocationScope {
        LocationScope {
            all_provinces: self.province_filter().is_none(),
            all_cities: self.city_filter().is_none(),
            all_barangays: self.barangay_filter().is_none(),
        }
    }

    pub fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .map_or(false, |f| f.eq_ignore_ascii_case("csv"))
    }
}

/// Which location filters were left at "all", echoed back as `filters`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationScope {
    pub all_provinces: bool,
    pub all_cities: bool,
    pub all_barangays: bool,
}

/// How deep the beneficiaries report groups by location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocationGrouping {
    Province,
    Municipality,
    Barangay,
}

impl LocationGrouping {
    /// One level below the most specific location filter
    pub fn for_filters(filters: &ReportFilters) -> Self {
        match (filters.province_filter(), filters.city_filter()) {
            (Some(_), Some(_)) => LocationGrouping::Barangay,
            (Some(_), None) | (None, Some(_)) => LocationGrouping::Municipality,
            (None, None) => LocationGrouping::Province,
        }
    }

    pub fn groups_municipality(&self) -> bool {
        *self >= LocationGrouping::Municipality
    }

    pub fn groups_barangay(&self) -> bool {
        *self == LocationGrouping::Barangay
    }
}

// ============================================================================
// Statistics (dashboard)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesTotals {
    pub species: String,
    pub total_distributions: i64,
    pub total_fingerlings: i64,
    pub total_harvest_kilos: Decimal,
    pub avg_survival_rate: Option<Decimal>,
    pub avg_weight: Option<Decimal>,
}

/// A municipality or province leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTotals {
    pub name: String,
    pub total_distributions: i64,
    pub total_fingerlings: i64,
    pub total_harvest_kilos: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub species: String,
    pub total_distributions: i64,
    pub total_fingerlings: i64,
    pub total_harvest_kilos: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsTotals {
    pub total_distributions: i64,
    pub total_fingerlings: i64,
    pub total_harvest_kilos: Decimal,
}

impl StatsTotals {
    /// Grand totals from the per-species breakdown of the same filter
    pub fn from_species(rows: &[SpeciesTotals]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            total_distributions: acc.total_distributions + row.total_distributions,
            total_fingerlings: acc.total_fingerlings + row.total_fingerlings,
            total_harvest_kilos: acc.total_harvest_kilos + row.total_harvest_kilos,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionStats {
    pub by_species: Vec<SpeciesTotals>,
    pub top_municipalities: Vec<LocationTotals>,
    pub top_provinces: Vec<LocationTotals>,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub totals: StatsTotals,
}

// ============================================================================
// Beneficiaries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryRecord {
    pub beneficiary_name: String,
    pub species: String,
    pub date_distributed: NaiveDate,
    pub user_id: i32,
    pub province: String,
    pub municipality: String,
    pub barangay: String,
    pub total_fingerlings: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiarySummary {
    pub total_beneficiaries: u64,
    pub total_fingerlings: i64,
}

impl BeneficiarySummary {
    pub fn from_records(records: &[BeneficiaryRecord]) -> Self {
        Self {
            total_beneficiaries: records.len() as u64,
            total_fingerlings: records.iter().map(|r| r.total_fingerlings).sum(),
        }
    }
}

// ============================================================================
// Distributed batches
// ============================================================================

/// A distribution carrying a batch reference, as loaded for the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDistribution {
    pub id: i32,
    pub batch_id: String,
    pub beneficiary_name: String,
    pub fingerlings: i32,
    pub date_distributed: NaiveDate,
    pub species: String,
    pub barangay: Option<String>,
    pub municipality: String,
    pub province: String,
}

/// Batch columns joined onto the distributed report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMeta {
    pub name: String,
    pub description: Option<String>,
    pub total_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedEntry {
    pub id: i32,
    pub beneficiary_name: String,
    pub fingerlings: i32,
    pub date_distributed: NaiveDate,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedBatch {
    pub batch_id: String,
    pub batch_name: String,
    pub description: Option<String>,
    pub total_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub species: String,
    pub distributed_quantity: i64,
    pub distributions: Vec<DistributedEntry>,
    pub status: BatchStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedSummary {
    pub total_batches: u64,
    pub total_fingerlings: i64,
}

impl DistributedSummary {
    pub fn from_batches(batches: &[DistributedBatch]) -> Self {
        Self {
            total_batches: batches.len() as u64,
            total_fingerlings: batches.iter().map(|b| b.distributed_quantity).sum(),
        }
    }
}

/// Group distributions by batch, keeping the order batches are first seen.
///
/// Species comes from the first distribution of each group. A batch id with no
/// row in `batches` is reported under its own id.
pub fn group_distributed_batches(
    rows: Vec<BatchDistribution>,
    batches: &HashMap<String, BatchMeta>,
) -> Vec<DistributedBatch> {
    let mut order: Vec<DistributedBatch> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let entry = DistributedEntry {
            id: row.id,
            beneficiary_name: row.beneficiary_name,
            fingerlings: row.fingerlings,
            date_distributed: row.date_distributed,
            location: compose_location(row.barangay.as_deref(), &row.municipality, &row.province),
        };

        let slot = match index.get(&row.batch_id) {
            Some(&slot) => slot,
            None => {
                let meta = batches.get(&row.batch_id);
                order.push(DistributedBatch {
                    batch_id: row.batch_id.clone(),
                    batch_name: meta
                        .map(|m| m.name.clone())
                        .unwrap_or_else(|| row.batch_id.clone()),
                    description: meta.and_then(|m| m.description.clone()),
                    total_count: meta.map_or(0, |m| m.total_count),
                    created_at: meta.map(|m| m.created_at),
                    species: row.species.clone(),
                    distributed_quantity: 0,
                    distributions: Vec::new(),
                    status: BatchStatus::Completed,
                });
                index.insert(row.batch_id, order.len() - 1);
                order.len() - 1
            }
        };

        let group = &mut order[slot];
        group.distributed_quantity += i64::from(entry.fingerlings);
        group.distributions.push(entry);
    }

    order
}

// ============================================================================
// Undistributed batches
// ============================================================================

/// An active batch with its distributed total, before the remaining filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStock {
    pub batch_id: String,
    pub name: String,
    pub description: Option<String>,
    pub total_count: i64,
    pub distributed: i64,
    pub created_at: DateTime<Utc>,
    pub staff_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndistributedBatch {
    pub batch_id: String,
    pub batch_name: String,
    pub description: Option<String>,
    pub total_count: i64,
    pub distributed: i64,
    pub remaining: i64,
    pub created_at: DateTime<Utc>,
    pub days_since_creation: i64,
    pub status: BatchStatus,
    pub staff_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndistributedSummary {
    pub total_batches: u64,
    pub total_remaining: i64,
    pub overdue_count: u64,
}

impl UndistributedSummary {
    pub fn from_batches(batches: &[UndistributedBatch]) -> Self {
        Self {
            total_batches: batches.len() as u64,
            total_remaining: batches.iter().map(|b| b.remaining).sum(),
            overdue_count: batches
                .iter()
                .filter(|b| b.status == BatchStatus::Overdue)
                .count() as u64,
        }
    }
}

/// Case-insensitive substring match over `name + " " + description`
pub fn batch_matches_species(name: &str, description: Option<&str>, pattern: &str) -> bool {
    let haystack = format!("{} {}", name, description.unwrap_or_default()).to_lowercase();
    haystack.contains(&pattern.trim().to_lowercase())
}

/// Keep batches with stock left, label them by age, newest first
pub fn build_undistributed(
    stock: Vec<BatchStock>,
    now: DateTime<Utc>,
    overdue_after_days: i64,
    species_pattern: Option<&str>,
) -> Vec<UndistributedBatch> {
    let mut batches: Vec<UndistributedBatch> = stock
        .into_iter()
        .filter(|b| {
            species_pattern.map_or(true, |p| {
                batch_matches_species(&b.name, b.description.as_deref(), p)
            })
        })
        .filter_map(|b| {
            let remaining = b.total_count - b.distributed;
            if remaining <= 0 {
                return None;
            }
            let days_since_creation = (now - b.created_at).num_days();
            Some(UndistributedBatch {
                batch_id: b.batch_id,
                batch_name: b.name,
                description: b.description,
                total_count: b.total_count,
                distributed: b.distributed,
                remaining,
                created_at: b.created_at,
                days_since_creation,
                status: BatchStatus::from_age(days_since_creation, overdue_after_days),
                staff_name: b.staff_name,
            })
        })
        .collect();

    batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    batches
}

// ============================================================================
// Fingerling count by date
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerlingCount {
    pub date: NaiveDate,
    pub species: String,
    pub total_fingerlings: i64,
    pub distribution_count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerlingCountSummary {
    pub grand_total: i64,
    pub total_distributions: i64,
}

/// Report body: `{ success, data, summary, filters? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse<T, S> {
    pub success: bool,
    pub data: Vec<T>,
    pub summary: S,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<LocationScope>,
}

impl<T, S> ReportResponse<T, S> {
    pub fn new(data: Vec<T>, summary: S) -> Self {
        Self {
            success: true,
            data,
            summary,
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: LocationScope) -> Self {
        self.filters = Some(filters);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dist(id: i32, batch: &str, fingerlings: i32, barangay: Option<&str>) -> BatchDistribution {
        BatchDistribution {
            id,
            batch_id: batch.to_string(),
            beneficiary_name: format!("Beneficiary {}", id),
            fingerlings,
            date_distributed: day("2024-05-01"),
            species: "Tilapia".to_string(),
            barangay: barangay.map(str::to_string),
            municipality: "Sta. Cruz".to_string(),
            province: "Laguna".to_string(),
        }
    }

    fn stock(id: &str, total: i64, distributed: i64, age_days: i64, now: DateTime<Utc>) -> BatchStock {
        BatchStock {
            batch_id: id.to_string(),
            name: format!("Tilapia batch {}", id),
            description: None,
            total_count: total,
            distributed,
            created_at: now - Duration::days(age_days),
            staff_name: "Unknown Staff".to_string(),
        }
    }

    #[test]
    fn test_sentinels_mean_no_filter() {
        let filters = ReportFilters {
            province: Some("All Provinces".to_string()),
            city: Some("all municipalities".to_string()),
            barangay: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(filters.province_filter().is_none());
        assert!(filters.city_filter().is_none());
        assert!(filters.barangay_filter().is_none());
        assert_eq!(
            filters.location_scope(),
            LocationScope { all_provinces: true, all_cities: true, all_barangays: true }
        );
        assert_eq!(LocationGrouping::for_filters(&filters), LocationGrouping::Province);
    }

    #[test]
    fn test_grouping_deepens_with_location_filters() {
        let mut filters = ReportFilters {
            province: Some("Laguna".to_string()),
            ..Default::default()
        };
        let grouping = LocationGrouping::for_filters(&filters);
        assert_eq!(grouping, LocationGrouping::Municipality);
        assert!(grouping.groups_municipality());
        assert!(!grouping.groups_barangay());

        filters.city = Some("Sta. Cruz".to_string());
        let grouping = LocationGrouping::for_filters(&filters);
        assert_eq!(grouping, LocationGrouping::Barangay);
        assert!(grouping.groups_barangay());
    }

    #[test]
    fn test_city_takes_precedence_over_municipality() {
        let filters: ReportFilters =
            serde_json::from_str(r#"{"city": "Calamba", "municipality": "Bay"}"#).unwrap();
        assert_eq!(filters.city_filter(), Some("Calamba"));

        let filters: ReportFilters =
            serde_json::from_str(r#"{"city": "", "municipality": "Bay"}"#).unwrap();
        assert_eq!(filters.city_filter(), Some("Bay"));

        let filters: ReportFilters =
            serde_json::from_str(r#"{"city": "All Cities", "municipality": "Bay"}"#).unwrap();
        assert_eq!(filters.city_filter(), None);
    }

    #[test]
    fn test_filters_accept_municipality_alias_and_blank_dates() {
        let filters: ReportFilters = serde_json::from_str(
            r#"{"dateFrom": "", "dateTo": "2024-12-31", "municipality": "Bay", "format": "CSV"}"#,
        )
        .unwrap();
        assert!(filters.date_from.is_none());
        assert_eq!(filters.date_to, Some(day("2024-12-31")));
        assert_eq!(filters.city_filter(), Some("Bay"));
        assert!(filters.wants_csv());
    }

    #[test]
    fn test_species_exact_keeps_unknown_names() {
        let filters = ReportFilters {
            species: Some(" Salmon ".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.species_exact().as_deref(), Some("Salmon"));

        let filters = ReportFilters {
            species: Some("red tilapia".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.species_exact().as_deref(), Some("Red Tilapia"));

        let filters = ReportFilters {
            species: Some("All Species".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.species_exact(), None);
    }

    #[test]
    fn test_group_distributed_batches_keeps_first_seen_order() {
        let created = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let mut batches = HashMap::new();
        batches.insert(
            "BF-20240401-001".to_string(),
            BatchMeta {
                name: "April tilapia".to_string(),
                description: Some("Pond 3".to_string()),
                total_count: 5000,
                created_at: created,
            },
        );

        let rows = vec![
            dist(3, "BF-20240402-002", 100, None),
            dist(2, "BF-20240401-001", 250, Some("Poblacion")),
            dist(1, "BF-20240402-002", 50, None),
        ];
        let grouped = group_distributed_batches(rows, &batches);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].batch_id, "BF-20240402-002");
        assert_eq!(grouped[0].batch_name, "BF-20240402-002");
        assert_eq!(grouped[0].distributed_quantity, 150);
        assert_eq!(grouped[0].distributions.len(), 2);
        assert_eq!(grouped[0].distributions[0].location, "Sta. Cruz, Laguna");
        assert_eq!(grouped[1].batch_name, "April tilapia");
        assert_eq!(grouped[1].total_count, 5000);
        assert_eq!(grouped[1].created_at, Some(created));
        assert_eq!(grouped[1].distributions[0].location, "Poblacion, Sta. Cruz, Laguna");
        assert!(grouped.iter().all(|b| b.status == BatchStatus::Completed));

        let summary = DistributedSummary::from_batches(&grouped);
        assert_eq!(summary.total_batches, 2);
        assert_eq!(summary.total_fingerlings, 400);
    }

    #[test]
    fn test_partially_distributed_batch_stays_pending_until_empty() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let report = build_undistributed(vec![stock("BF-20240601-001", 1000, 400, 0, now)], now, 30, None);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].remaining, 600);
        assert_eq!(report[0].status, BatchStatus::Pending);

        let report = build_undistributed(vec![stock("BF-20240601-001", 1000, 1000, 0, now)], now, 30, None);
        assert!(report.is_empty());
    }

    #[test]
    fn test_undistributed_overdue_and_sorting() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let report = build_undistributed(
            vec![
                stock("BF-20240401-001", 500, 0, 61, now),
                stock("BF-20240520-001", 500, 100, 12, now),
                stock("BF-20240501-001", 500, 100, 30, now),
            ],
            now,
            30,
            None,
        );

        let ids: Vec<&str> = report.iter().map(|b| b.batch_id.as_str()).collect();
        assert_eq!(ids, ["BF-20240520-001", "BF-20240501-001", "BF-20240401-001"]);
        assert_eq!(report[1].status, BatchStatus::Pending);
        assert_eq!(report[2].status, BatchStatus::Overdue);

        let summary = UndistributedSummary::from_batches(&report);
        assert_eq!(summary.total_batches, 3);
        assert_eq!(summary.total_remaining, 1300);
        assert_eq!(summary.overdue_count, 1);
    }

    #[test]
    fn test_undistributed_species_matches_description() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut bangus = stock("BF-20240601-002", 300, 0, 1, now);
        bangus.name = "June stock".to_string();
        bangus.description = Some("Bangus from Dagupan".to_string());

        let report = build_undistributed(
            vec![stock("BF-20240601-001", 300, 0, 1, now), bangus],
            now,
            30,
            Some("bangus"),
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].batch_id, "BF-20240601-002");
    }

    #[test]
    fn test_report_response_shape() {
        let response = ReportResponse::new(Vec::<FingerlingCount>::new(), FingerlingCountSummary::default());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([]));
        assert_eq!(json["summary"]["grandTotal"], 0);
        assert_eq!(json["summary"]["totalDistributions"], 0);
        assert!(json.get("filters").is_none());
    }
}
