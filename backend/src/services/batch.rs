//! Batch management service

use chrono::Utc;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};
use crate::models::{
    generate_batch_id, Batch, BatchRow, BatchUpdate, BatchWithProgress, NewBatch, BATCH_COLUMNS,
};
use shared::types::{empty_string_as_none, Pagination, PaginationMeta};

/// Batch service for managing fingerling stock batches
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// Query parameters for listing batches
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    /// Fuzzy match on name and description
    pub species: Option<String>,
    /// Fuzzy match on name and description
    pub location: Option<String>,
    /// Matches id, name or description
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, sqlx::FromRow)]
struct BatchProgressRow {
    #[sqlx(flatten)]
    batch: BatchRow,
    distributed: i64,
}

fn like_pattern(value: &str) -> String {
    format!("%{}%", value.trim())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Append the WHERE clause shared by the page query and its count
fn append_batch_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &BatchQuery) {
    qb.push(" WHERE 1=1");

    for fuzzy in [non_blank(&query.species), non_blank(&query.location)]
        .into_iter()
        .flatten()
    {
        qb.push(" AND (b.name || ' ' || COALESCE(b.description, '')) ILIKE ");
        qb.push_bind(like_pattern(fuzzy));
    }

    if let Some(search) = non_blank(&query.search) {
        let pattern = like_pattern(search);
        qb.push(" AND (b.id ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR b.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR b.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(is_active) = query.is_active {
        qb.push(" AND b.is_active = ");
        qb.push_bind(is_active);
    }
}

const DISTRIBUTED_JOIN: &str = r#"
    LEFT JOIN (
        SELECT batch_id, SUM(fingerlings)::BIGINT AS distributed
        FROM distributions
        WHERE batch_id IS NOT NULL
        GROUP BY batch_id
    ) d ON d.batch_id = b.id
"#;

impl BatchService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List batches with their distributed totals, newest first
    pub async fn list_batches(
        &self,
        query: &BatchQuery,
    ) -> AppResult<(Vec<BatchWithProgress>, PaginationMeta)> {
        let pagination = Pagination::from_query(query.page, query.limit);

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM batches b");
        append_batch_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await?;

        let mut data_qb = QueryBuilder::new(
            "SELECT b.id, b.name, b.description, b.user_id, b.total_count, b.is_active, \
             b.created_at, b.updated_at, COALESCE(d.distributed, 0) AS distributed FROM batches b",
        );
        data_qb.push(DISTRIBUTED_JOIN);
        append_batch_filters(&mut data_qb, query);
        data_qb.push(" ORDER BY b.created_at DESC LIMIT ");
        data_qb.push_bind(i64::from(pagination.limit));
        data_qb.push(" OFFSET ");
        data_qb.push_bind(pagination.offset());

        let rows = data_qb
            .build_query_as::<BatchProgressRow>()
            .fetch_all(&self.db)
            .await?;

        let batches = rows
            .into_iter()
            .map(|r| BatchWithProgress::new(r.batch.into(), r.distributed))
            .collect();

        Ok((batches, PaginationMeta::new(pagination, total.max(0) as u64)))
    }

    /// Create a batch, generating its id when none is supplied
    pub async fn create_batch(&self, input: NewBatch) -> AppResult<Batch> {
        shared::validate_new_batch(&input)?;

        let id = input
            .id
            .clone()
            .unwrap_or_else(|| generate_batch_id(Utc::now()));

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO batches (id, name, description, user_id, total_count, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(&id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.user_id)
        .bind(input.total_count.unwrap_or(0))
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEntry(format!("Batch {}", id))
            }
            other => AppError::DatabaseError(other),
        })?;

        tracing::info!(batch_id = %row.id, total_count = row.total_count, "Batch created");
        Ok(row.into())
    }

    /// Get a batch with how much of it has been distributed
    pub async fn get_batch(&self, id: &str) -> AppResult<BatchWithProgress> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {} FROM batches WHERE id = $1",
            BATCH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Batch"))?;

        let distributed = self.distributed_total(id).await?;
        Ok(BatchWithProgress::new(row.into(), distributed))
    }

    pub async fn batch_exists(&self, id: &str) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM batches WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    /// Sum of fingerlings handed out from a batch
    pub async fn distributed_total(&self, id: &str) -> AppResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(fingerlings), 0)::BIGINT FROM distributions WHERE batch_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(total)
    }

    pub async fn update_batch(&self, id: &str, input: BatchUpdate) -> AppResult<Batch> {
        shared::validate_batch_update(&input)?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE batches SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                total_count = COALESCE($4, total_count),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BATCH_COLUMNS
        ))
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(input.total_count)
        .bind(input.is_active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Batch"))?;

        Ok(row.into())
    }

    /// Hard delete; distributions and sessions keep their batch reference
    pub async fn delete_batch(&self, id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM batches WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Batch"));
        }

        tracing::info!(batch_id = %id, "Batch deleted");
        Ok(())
    }
}
