//! Stocking and field-count session service

use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{NewSession, Session, SessionRow, SessionUpdate, SESSION_COLUMNS};

#[derive(Clone)]
pub struct SessionService {
    db: PgPool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub batch_id: Option<String>,
}

impl SessionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Sessions newest first, optionally for one batch
    pub async fn list_sessions(&self, query: &SessionQuery) -> AppResult<Vec<Session>> {
        let batch_id = query
            .batch_id
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty());

        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {}
            FROM sessions
            WHERE ($1::VARCHAR IS NULL OR batch_id = $1)
            ORDER BY timestamp DESC, id DESC
            "#,
            SESSION_COLUMNS
        ))
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Session::try_from).collect()
    }

    pub async fn get_session(&self, id: i32) -> AppResult<Session> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {} FROM sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Session"))?;

        row.try_into()
    }

    pub async fn create_session(&self, user_id: i32, input: NewSession) -> AppResult<Session> {
        shared::validate_new_session(&input)?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            INSERT INTO sessions (batch_id, species, location, notes, counts, timestamp, image_url, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(input.batch_id.trim())
        .bind(input.species.as_str())
        .bind(&input.location)
        .bind(&input.notes)
        .bind(Json(&input.counts))
        .bind(input.timestamp.unwrap_or_else(Utc::now))
        .bind(&input.image_url)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(session_id = row.id, batch_id = %row.batch_id, "Session recorded");
        row.try_into()
    }

    pub async fn update_session(&self, id: i32, input: SessionUpdate) -> AppResult<Session> {
        shared::validate_session_update(&input)?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            UPDATE sessions SET
                batch_id = COALESCE($2, batch_id),
                species = COALESCE($3, species),
                location = COALESCE($4, location),
                notes = COALESCE($5, notes),
                counts = COALESCE($6, counts),
                timestamp = COALESCE($7, timestamp),
                image_url = COALESCE($8, image_url)
            WHERE id = $1
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(id)
        .bind(input.batch_id.as_deref().map(str::trim))
        .bind(input.species.map(|s| s.as_str()))
        .bind(&input.location)
        .bind(&input.notes)
        .bind(input.counts.as_ref().map(Json))
        .bind(input.timestamp)
        .bind(&input.image_url)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Session"))?;

        row.try_into()
    }

    pub async fn delete_session(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Session"));
        }

        tracing::info!(session_id = id, "Session deleted");
        Ok(())
    }
}
