//! Distribution records service

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};
use crate::models::{
    Distribution, DistributionRow, DistributionUpdate, NewDistribution, Remarks,
    DISTRIBUTION_COLUMNS,
};
use crate::services::BatchService;
use shared::types::{empty_string_as_none, Pagination, PaginationMeta};

/// Maximum number of autocomplete suggestions
pub const SUGGESTION_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct DistributionService {
    db: PgPool,
}

/// Query parameters for listing distributions
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionQuery {
    pub species: Option<String>,
    pub province: Option<String>,
    pub municipality: Option<String>,
    /// Matches beneficiary name or barangay
    pub search: Option<String>,
    pub batch_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_from: Option<chrono::NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date_to: Option<chrono::NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
}

/// Autocomplete source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionField {
    Firstname,
    Lastname,
    Species,
    Province,
    City,
    Barangay,
}

impl SuggestionField {
    /// SQL expression producing the suggested value
    fn expression(&self) -> &'static str {
        match self {
            SuggestionField::Firstname => "split_part(TRIM(beneficiary_name), ' ', 1)",
            SuggestionField::Lastname => "regexp_replace(TRIM(beneficiary_name), '^.* ', '')",
            SuggestionField::Species => "species",
            SuggestionField::Province => "province",
            SuggestionField::City => "municipality",
            SuggestionField::Barangay => "barangay",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub field: SuggestionField,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Suggestions {
    pub field: SuggestionField,
    pub suggestions: Vec<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn append_distribution_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &DistributionQuery) {
    qb.push(" WHERE 1=1");

    for (column, value) in [
        ("species", non_blank(&query.species)),
        ("province", non_blank(&query.province)),
        ("municipality", non_blank(&query.municipality)),
    ] {
        if let Some(value) = value {
            qb.push(format!(" AND {} ILIKE ", column));
            qb.push_bind(format!("%{}%", value));
        }
    }

    if let Some(search) = non_blank(&query.search) {
        let pattern = format!("%{}%", search);
        qb.push(" AND (beneficiary_name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR barangay ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(batch_id) = non_blank(&query.batch_id) {
        qb.push(" AND batch_id = ");
        qb.push_bind(batch_id.to_string());
    }

    if let Some(from) = query.date_from {
        qb.push(" AND date_distributed >= ");
        qb.push_bind(from);
    }

    if let Some(to) = query.date_to {
        qb.push(" AND date_distributed <= ");
        qb.push_bind(to);
    }
}

/// Apply an update to a stored record.
///
/// Moving remarks away from `Other` drops the custom text unless the update
/// supplies new custom text, which the pairing check then rejects.
pub fn apply_update(mut current: Distribution, update: DistributionUpdate) -> Distribution {
    if let Some(v) = update.date_distributed {
        current.date_distributed = v;
    }
    if let Some(v) = update.beneficiary_name {
        current.beneficiary_name = v.trim().to_string();
    }
    if let Some(v) = update.barangay {
        current.barangay = Some(v).filter(|b| !b.trim().is_empty());
    }
    if let Some(v) = update.municipality {
        current.municipality = v.trim().to_string();
    }
    if let Some(v) = update.province {
        current.province = v.trim().to_string();
    }
    if let Some(v) = update.fingerlings {
        current.fingerlings = v;
    }
    if let Some(v) = update.species {
        current.species = v;
    }
    if update.survival_rate.is_some() {
        current.survival_rate = update.survival_rate;
    }
    if update.avg_weight.is_some() {
        current.avg_weight = update.avg_weight;
    }
    if update.forecasted_harvest_date.is_some() {
        current.forecasted_harvest_date = update.forecasted_harvest_date;
    }
    if update.forecasted_harvest_kilos.is_some() {
        current.forecasted_harvest_kilos = update.forecasted_harvest_kilos;
    }
    if update.actual_harvest_date.is_some() {
        current.actual_harvest_date = update.actual_harvest_date;
    }
    if update.actual_harvest_kilos.is_some() {
        current.actual_harvest_kilos = update.actual_harvest_kilos;
    }
    if let Some(remarks) = update.remarks {
        current.remarks = Some(remarks);
        if remarks != Remarks::Other && update.custom_remarks.is_none() {
            current.custom_remarks = None;
        }
    }
    if update.custom_remarks.is_some() {
        current.custom_remarks = update.custom_remarks;
    }
    if let Some(v) = update.batch_id {
        current.batch_id = Some(v).filter(|b| !b.trim().is_empty());
    }
    current
}

impl DistributionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List distributions, most recent first
    pub async fn list_distributions(
        &self,
        query: &DistributionQuery,
    ) -> AppResult<(Vec<Distribution>, PaginationMeta)> {
        let pagination = Pagination::from_query(query.page, query.limit);

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM distributions");
        append_distribution_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await?;

        let mut data_qb = QueryBuilder::new(format!("SELECT {} FROM distributions", DISTRIBUTION_COLUMNS));
        append_distribution_filters(&mut data_qb, query);
        data_qb.push(" ORDER BY date_distributed DESC, id DESC LIMIT ");
        data_qb.push_bind(i64::from(pagination.limit));
        data_qb.push(" OFFSET ");
        data_qb.push_bind(pagination.offset());

        let rows = data_qb
            .build_query_as::<DistributionRow>()
            .fetch_all(&self.db)
            .await?;

        let distributions = rows
            .into_iter()
            .map(Distribution::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((distributions, PaginationMeta::new(pagination, total.max(0) as u64)))
    }

    pub async fn get_distribution(&self, id: i32) -> AppResult<Distribution> {
        let row = sqlx::query_as::<_, DistributionRow>(&format!(
            "SELECT {} FROM distributions WHERE id = $1",
            DISTRIBUTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Distribution"))?;

        row.try_into()
    }

    /// API writes may only point at batches that exist
    async fn check_batch_reference(&self, batch_id: Option<&str>) -> AppResult<()> {
        let Some(batch_id) = batch_id else {
            return Ok(());
        };
        if !BatchService::new(self.db.clone()).batch_exists(batch_id).await? {
            return Err(AppError::Validation {
                field: "batch_id".to_string(),
                message: format!("Batch {} does not exist", batch_id),
            });
        }
        Ok(())
    }

    /// Record a distribution owned by `owner_id` unless the input names a user
    pub async fn create_distribution(
        &self,
        owner_id: i32,
        input: NewDistribution,
    ) -> AppResult<Distribution> {
        shared::validate_new_distribution(&input)?;

        let batch_id = input
            .batch_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());
        self.check_batch_reference(batch_id).await?;

        let row = sqlx::query_as::<_, DistributionRow>(&format!(
            r#"
            INSERT INTO distributions (
                date_distributed, beneficiary_name, barangay, municipality, province,
                fingerlings, species, survival_rate, avg_weight,
                forecasted_harvest_date, forecasted_harvest_kilos,
                actual_harvest_date, actual_harvest_kilos,
                remarks, custom_remarks, batch_id, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {}
            "#,
            DISTRIBUTION_COLUMNS
        ))
        .bind(input.date_distributed)
        .bind(input.beneficiary_name.trim())
        .bind(input.barangay.as_deref().map(str::trim).filter(|b| !b.is_empty()))
        .bind(input.municipality.trim())
        .bind(input.province.trim())
        .bind(input.fingerlings)
        .bind(input.species.as_str())
        .bind(input.survival_rate)
        .bind(input.avg_weight)
        .bind(input.forecasted_harvest_date)
        .bind(input.forecasted_harvest_kilos)
        .bind(input.actual_harvest_date)
        .bind(input.actual_harvest_kilos)
        .bind(input.remarks.map(|r| r.as_str()))
        .bind(&input.custom_remarks)
        .bind(batch_id)
        .bind(input.user_id.unwrap_or(owner_id))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            distribution_id = row.id,
            fingerlings = row.fingerlings,
            batch_id = ?row.batch_id,
            "Distribution recorded"
        );
        row.try_into()
    }

    pub async fn update_distribution(
        &self,
        id: i32,
        update: DistributionUpdate,
    ) -> AppResult<Distribution> {
        shared::validate_distribution_update(&update)?;

        let batch_changed = update.batch_id.is_some();
        let current = self.get_distribution(id).await?;
        let merged = apply_update(current, update);

        if merged.fingerlings <= 0 {
            return Err(AppError::Validation {
                field: "fingerlings".to_string(),
                message: "Fingerlings must be a positive number".to_string(),
            });
        }
        shared::validate_remarks(merged.remarks, merged.custom_remarks.as_deref())?;
        if batch_changed {
            self.check_batch_reference(merged.batch_id.as_deref()).await?;
        }

        let row = sqlx::query_as::<_, DistributionRow>(&format!(
            r#"
            UPDATE distributions SET
                date_distributed = $2, beneficiary_name = $3, barangay = $4,
                municipality = $5, province = $6, fingerlings = $7, species = $8,
                survival_rate = $9, avg_weight = $10,
                forecasted_harvest_date = $11, forecasted_harvest_kilos = $12,
                actual_harvest_date = $13, actual_harvest_kilos = $14,
                remarks = $15, custom_remarks = $16, batch_id = $17,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DISTRIBUTION_COLUMNS
        ))
        .bind(id)
        .bind(merged.date_distributed)
        .bind(&merged.beneficiary_name)
        .bind(&merged.barangay)
        .bind(&merged.municipality)
        .bind(&merged.province)
        .bind(merged.fingerlings)
        .bind(merged.species.as_str())
        .bind(merged.survival_rate)
        .bind(merged.avg_weight)
        .bind(merged.forecasted_harvest_date)
        .bind(merged.forecasted_harvest_kilos)
        .bind(merged.actual_harvest_date)
        .bind(merged.actual_harvest_kilos)
        .bind(merged.remarks.map(|r| r.as_str()))
        .bind(&merged.custom_remarks)
        .bind(&merged.batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Distribution"))?;

        row.try_into()
    }

    pub async fn delete_distribution(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM distributions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Distribution"));
        }

        tracing::info!(distribution_id = id, "Distribution deleted");
        Ok(())
    }

    /// Distinct values of a column for form autocomplete
    pub async fn suggestions(&self, query: &SuggestionQuery) -> AppResult<Suggestions> {
        let expr = query.field.expression();
        let pattern = format!("%{}%", query.query.as_deref().unwrap_or("").trim());

        let sql = format!(
            r#"
            SELECT DISTINCT {expr} AS value
            FROM distributions
            WHERE {expr} IS NOT NULL AND {expr} <> '' AND {expr} ILIKE $1
            ORDER BY value
            LIMIT $2
            "#,
            expr = expr
        );

        let suggestions = sqlx::query_scalar::<_, String>(&sql)
            .bind(pattern)
            .bind(SUGGESTION_LIMIT)
            .fetch_all(&self.db)
            .await?;

        Ok(Suggestions {
            field: query.field,
            suggestions,
        })
    }
}
