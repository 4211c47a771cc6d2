//! Reporting service for distribution analytics and data export
//!
//! Aggregation happens in SQL; grouping and status labelling of the returned
//! rows is done by the pure functions in `shared::models::report`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::config::ReportsConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    build_undistributed, group_distributed_batches, staff_display_name, BatchDistribution,
    BatchMeta, BatchStock, BeneficiaryRecord, BeneficiarySummary, DistributedBatch,
    DistributedSummary, DistributionStats, FingerlingCount, FingerlingCountSummary,
    LocationGrouping, LocationTotals, MonthlyTrend, Profile, ReportFilters,
    SpeciesTotals, StatsTotals, UndistributedBatch, UndistributedSummary, NO_BARANGAY,
};
use shared::types::DateRange;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
    settings: ReportsConfig,
}

/// WHERE clause over `distributions`, shared by the report queries
#[derive(Debug, Default, Clone)]
pub struct DistributionFilter {
    pub dates: DateRange,
    pub species_exact: Option<String>,
    pub species_like: Option<String>,
    pub province_like: Option<String>,
    pub province_eq: Option<String>,
    pub city_eq: Option<String>,
    pub barangay_eq: Option<String>,
    pub with_batch_only: bool,
}

impl DistributionFilter {
    /// Dashboard statistics: exact species, province substring
    pub fn for_stats(filters: &ReportFilters) -> Self {
        Self {
            dates: filters.date_range(),
            species_exact: filters.species_exact(),
            province_like: filters.province_filter().map(str::to_string),
            ..Default::default()
        }
    }

    pub fn for_beneficiaries(filters: &ReportFilters) -> Self {
        Self {
            dates: filters.date_range(),
            species_like: filters.species_pattern().map(str::to_string),
            province_eq: filters.province_filter().map(str::to_string),
            city_eq: filters.city_filter().map(str::to_string),
            barangay_eq: filters.barangay_filter().map(str::to_string),
            ..Default::default()
        }
    }

    pub fn for_distributed_batches(filters: &ReportFilters) -> Self {
        Self {
            dates: filters.date_range(),
            species_like: filters.species_pattern().map(str::to_string),
            with_batch_only: true,
            ..Default::default()
        }
    }

    pub fn for_fingerling_count(filters: &ReportFilters) -> Self {
        Self {
            dates: filters.date_range(),
            species_exact: filters.species_exact(),
            ..Default::default()
        }
    }

    /// Append ` WHERE ...` for this filter
    pub fn append_to(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE 1=1");

        if self.with_batch_only {
            qb.push(" AND batch_id IS NOT NULL AND batch_id <> ''");
        }
        if let Some(from) = self.dates.date_from {
            qb.push(" AND date_distributed >= ");
            qb.push_bind(from);
        }
        if let Some(to) = self.dates.date_to {
            qb.push(" AND date_distributed <= ");
            qb.push_bind(to);
        }
        if let Some(species) = &self.species_exact {
            qb.push(" AND species = ");
            qb.push_bind(species.clone());
        }
        if let Some(species) = &self.species_like {
            qb.push(" AND species ILIKE ");
            qb.push_bind(format!("%{}%", species));
        }
        if let Some(province) = &self.province_like {
            qb.push(" AND province ILIKE ");
            qb.push_bind(format!("%{}%", province));
        }
        for (column, value) in [
            ("province", &self.province_eq),
            ("municipality", &self.city_eq),
            ("barangay", &self.barangay_eq),
        ] {
            if let Some(value) = value {
                qb.push(format!(" AND LOWER({}) = LOWER(", column));
                qb.push_bind(value.clone());
                qb.push(")");
            }
        }
    }
}

/// SELECT list and GROUP BY for the beneficiaries report at a grouping depth
fn beneficiary_query_parts(grouping: LocationGrouping) -> (String, String) {
    let barangay = format!("COALESCE(NULLIF(TRIM(barangay), ''), '{}')", NO_BARANGAY);

    let location = |grouped: bool, expr: &str, alias: &str| {
        if grouped {
            format!("{} AS {}", expr, alias)
        } else {
            format!("STRING_AGG(DISTINCT {}, ', ') AS {}", expr, alias)
        }
    };

    let select = format!(
        "SELECT beneficiary_name, species, date_distributed, user_id, {}, {}, {}, \
         SUM(fingerlings)::BIGINT AS total_fingerlings FROM distributions",
        location(true, "province", "province"),
        location(grouping.groups_municipality(), "municipality", "municipality"),
        location(grouping.groups_barangay(), &barangay, "barangay"),
    );

    let mut group_by = vec!["beneficiary_name", "species", "date_distributed", "user_id", "province"];
    if grouping.groups_municipality() {
        group_by.push("municipality");
    }
    if grouping.groups_barangay() {
        group_by.push(&barangay);
    }

    (select, format!(" GROUP BY {}", group_by.join(", ")))
}

type SpeciesTotalsRow = (String, i64, i64, Decimal, Option<Decimal>, Option<Decimal>);
type LocationTotalsRow = (String, i64, i64, Decimal);
type MonthlyTrendRow = (String, String, i64, i64, Decimal);
type BeneficiaryRow = (String, String, NaiveDate, i32, String, String, String, i64);

#[derive(Debug, sqlx::FromRow)]
struct BatchDistributionRow {
    id: i32,
    batch_id: String,
    beneficiary_name: String,
    fingerlings: i32,
    date_distributed: NaiveDate,
    species: String,
    barangay: Option<String>,
    municipality: String,
    province: String,
}

#[derive(Debug, sqlx::FromRow)]
struct BatchMetaRow {
    id: String,
    name: String,
    description: Option<String>,
    total_count: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct BatchStockRow {
    id: String,
    name: String,
    description: Option<String>,
    total_count: i64,
    created_at: DateTime<Utc>,
    distributed: i64,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Flat CSV line for the distributed-batches report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributedCsvRow {
    pub batch_id: String,
    pub batch_name: String,
    pub species: String,
    pub distribution_id: i32,
    pub beneficiary_name: String,
    pub fingerlings: i32,
    pub date_distributed: NaiveDate,
    pub location: String,
}

impl DistributedCsvRow {
    pub fn flatten(batches: &[DistributedBatch]) -> Vec<Self> {
        batches
            .iter()
            .flat_map(|b| {
                b.distributions.iter().map(move |d| DistributedCsvRow {
                    batch_id: b.batch_id.clone(),
                    batch_name: b.batch_name.clone(),
                    species: b.species.clone(),
                    distribution_id: d.id,
                    beneficiary_name: d.beneficiary_name.clone(),
                    fingerlings: d.fingerlings,
                    date_distributed: d.date_distributed,
                    location: d.location.clone(),
                })
            })
            .collect()
    }
}

impl ReportingService {
    pub fn new(db: PgPool, settings: &ReportsConfig) -> Self {
        Self {
            db,
            settings: settings.clone(),
        }
    }

    /// Dashboard statistics: per-species totals, leaderboards, monthly trend
    pub async fn get_stats(&self, filters: &ReportFilters) -> AppResult<DistributionStats> {
        let filter = DistributionFilter::for_stats(filters);

        let mut qb = QueryBuilder::new(
            "SELECT species, COUNT(*) AS total_distributions, \
             COALESCE(SUM(fingerlings), 0)::BIGINT AS total_fingerlings, \
             COALESCE(SUM(actual_harvest_kilos), 0) AS total_harvest_kilos, \
             AVG(survival_rate) AS avg_survival_rate, AVG(avg_weight) AS avg_weight \
             FROM distributions",
        );
        filter.append_to(&mut qb);
        qb.push(" GROUP BY species ORDER BY total_fingerlings DESC, species");
        let by_species: Vec<SpeciesTotals> = qb
            .build_query_as::<SpeciesTotalsRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|r| SpeciesTotals {
                species: r.0,
                total_distributions: r.1,
                total_fingerlings: r.2,
                total_harvest_kilos: r.3,
                avg_survival_rate: r.4,
                avg_weight: r.5,
            })
            .collect();

        let top_municipalities = self.location_leaders("municipality", &filter).await?;
        let top_provinces = self.location_leaders("province", &filter).await?;

        let mut qb = QueryBuilder::new(
            "SELECT TO_CHAR(DATE_TRUNC('month', date_distributed), 'YYYY-MM') AS month, species, \
             COUNT(*) AS total_distributions, \
             COALESCE(SUM(fingerlings), 0)::BIGINT AS total_fingerlings, \
             COALESCE(SUM(actual_harvest_kilos), 0) AS total_harvest_kilos \
             FROM distributions",
        );
        filter.append_to(&mut qb);
        qb.push(" GROUP BY 1, 2 ORDER BY month DESC, species LIMIT ");
        qb.push_bind(self.settings.monthly_buckets);
        let monthly_trend = qb
            .build_query_as::<MonthlyTrendRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|r| MonthlyTrend {
                month: r.0,
                species: r.1,
                total_distributions: r.2,
                total_fingerlings: r.3,
                total_harvest_kilos: r.4,
            })
            .collect();

        let totals = StatsTotals::from_species(&by_species);

        Ok(DistributionStats {
            by_species,
            top_municipalities,
            top_provinces,
            monthly_trend,
            totals,
        })
    }

    async fn location_leaders(
        &self,
        column: &'static str,
        filter: &DistributionFilter,
    ) -> AppResult<Vec<LocationTotals>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} AS name, COUNT(*) AS total_distributions, \
             COALESCE(SUM(fingerlings), 0)::BIGINT AS total_fingerlings, \
             COALESCE(SUM(actual_harvest_kilos), 0) AS total_harvest_kilos \
             FROM distributions",
            column
        ));
        filter.append_to(&mut qb);
        qb.push(format!(
            " GROUP BY {} ORDER BY total_distributions DESC, name LIMIT ",
            column
        ));
        qb.push_bind(self.settings.top_n);

        let rows = qb
            .build_query_as::<LocationTotalsRow>()
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| LocationTotals {
                name: r.0,
                total_distributions: r.1,
                total_fingerlings: r.2,
                total_harvest_kilos: r.3,
            })
            .collect())
    }

    /// Fingerlings per beneficiary, grouped one level below the location filter
    pub async fn get_beneficiaries(
        &self,
        filters: &ReportFilters,
    ) -> AppResult<(Vec<BeneficiaryRecord>, BeneficiarySummary)> {
        let filter = DistributionFilter::for_beneficiaries(filters);
        let (select, group_by) = beneficiary_query_parts(LocationGrouping::for_filters(filters));

        let mut qb = QueryBuilder::new(select);
        filter.append_to(&mut qb);
        qb.push(group_by);
        qb.push(" ORDER BY date_distributed DESC, beneficiary_name");

        let records: Vec<BeneficiaryRecord> = qb
            .build_query_as::<BeneficiaryRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|r| BeneficiaryRecord {
                beneficiary_name: r.0,
                species: r.1,
                date_distributed: r.2,
                user_id: r.3,
                province: r.4,
                municipality: r.5,
                barangay: r.6,
                total_fingerlings: r.7,
            })
            .collect();

        let summary = BeneficiarySummary::from_records(&records);
        Ok((records, summary))
    }

    /// Batches that have distributions in range, with their distributions
    pub async fn get_distributed_batches(
        &self,
        filters: &ReportFilters,
    ) -> AppResult<(Vec<DistributedBatch>, DistributedSummary)> {
        let filter = DistributionFilter::for_distributed_batches(filters);

        let mut qb = QueryBuilder::new(
            "SELECT id, batch_id, beneficiary_name, fingerlings, date_distributed, species, \
             barangay, municipality, province FROM distributions",
        );
        filter.append_to(&mut qb);
        qb.push(" ORDER BY date_distributed DESC, id DESC");

        let rows: Vec<BatchDistribution> = qb
            .build_query_as::<BatchDistributionRow>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|r| BatchDistribution {
                id: r.id,
                batch_id: r.batch_id,
                beneficiary_name: r.beneficiary_name,
                fingerlings: r.fingerlings,
                date_distributed: r.date_distributed,
                species: r.species,
                barangay: r.barangay,
                municipality: r.municipality,
                province: r.province,
            })
            .collect();

        let mut batch_ids: Vec<String> = rows.iter().map(|r| r.batch_id.clone()).collect();
        batch_ids.sort();
        batch_ids.dedup();

        let batches: HashMap<String, BatchMeta> = if batch_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, BatchMetaRow>(
                "SELECT id, name, description, total_count, created_at FROM batches WHERE id = ANY($1)",
            )
            .bind(&batch_ids)
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|b| {
                (
                    b.id,
                    BatchMeta {
                        name: b.name,
                        description: b.description,
                        total_count: b.total_count,
                        created_at: b.created_at,
                    },
                )
            })
            .collect()
        };

        let grouped = group_distributed_batches(rows, &batches);
        let summary = DistributedSummary::from_batches(&grouped);
        Ok((grouped, summary))
    }

    /// Active batches created in range that still hold stock
    pub async fn get_undistributed_batches(
        &self,
        filters: &ReportFilters,
    ) -> AppResult<(Vec<UndistributedBatch>, UndistributedSummary)> {
        let dates = filters.date_range();

        let rows = sqlx::query_as::<_, BatchStockRow>(
            r#"
            SELECT b.id, b.name, b.description, b.total_count::BIGINT AS total_count, b.created_at,
                   COALESCE(d.distributed, 0)::BIGINT AS distributed,
                   sp.first_name, sp.last_name
            FROM batches b
            LEFT JOIN (
                SELECT batch_id, SUM(fingerlings)::BIGINT AS distributed
                FROM distributions
                WHERE batch_id IS NOT NULL
                GROUP BY batch_id
            ) d ON d.batch_id = b.id
            LEFT JOIN LATERAL (
                SELECT first_name, last_name FROM staff_profiles
                WHERE user_id = b.user_id ORDER BY id LIMIT 1
            ) sp ON TRUE
            WHERE b.is_active = TRUE
              AND ($1::DATE IS NULL OR b.created_at::DATE >= $1)
              AND ($2::DATE IS NULL OR b.created_at::DATE <= $2)
            "#,
        )
        .bind(dates.date_from)
        .bind(dates.date_to)
        .fetch_all(&self.db)
        .await?;

        let stock = rows
            .into_iter()
            .map(|r| {
                let profile = match (r.first_name, r.last_name) {
                    (Some(first_name), Some(last_name)) => Some(Profile {
                        first_name,
                        last_name,
                        contact_number: None,
                    }),
                    _ => None,
                };
                BatchStock {
                    batch_id: r.id,
                    name: r.name,
                    description: r.description,
                    total_count: r.total_count,
                    distributed: r.distributed,
                    created_at: r.created_at,
                    staff_name: staff_display_name(profile.as_ref()),
                }
            })
            .collect();

        let batches = build_undistributed(
            stock,
            Utc::now(),
            self.settings.overdue_after_days,
            filters.species_pattern(),
        );
        let summary = UndistributedSummary::from_batches(&batches);
        Ok((batches, summary))
    }

    /// Fingerlings per (date, species), newest first
    pub async fn get_fingerling_count(
        &self,
        filters: &ReportFilters,
    ) -> AppResult<(Vec<FingerlingCount>, FingerlingCountSummary)> {
        let filter = DistributionFilter::for_fingerling_count(filters);

        let mut qb = QueryBuilder::new(
            "SELECT date_distributed, species, SUM(fingerlings)::BIGINT AS total_fingerlings, \
             COUNT(*) AS distribution_count FROM distributions",
        );
        filter.append_to(&mut qb);
        qb.push(" GROUP BY date_distributed, species ORDER BY date_distributed DESC, species");

        let data = qb
            .build_query_as::<(NaiveDate, String, i64, i64)>()
            .fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|r| FingerlingCount {
                date: r.0,
                species: r.1,
                total_fingerlings: r.2,
                distribution_count: r.3,
            })
            .collect();

        let mut qb = QueryBuilder::new(
            "SELECT COALESCE(SUM(fingerlings), 0)::BIGINT, COUNT(*) FROM distributions",
        );
        filter.append_to(&mut qb);
        let (grand_total, total_distributions) = qb
            .build_query_as::<(i64, i64)>()
            .fetch_one(&self.db)
            .await?;

        Ok((
            data,
            FingerlingCountSummary {
                grand_total,
                total_distributions,
            },
        ))
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
