//! Fingerling batch models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Prefix of every generated batch identifier
pub const BATCH_ID_PREFIX: &str = "BF";

/// Batches older than this many days with stock left are reported overdue
pub const DEFAULT_OVERDUE_AFTER_DAYS: i64 = 30;

/// A named lot of fingerlings tracked for distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Identifier in the form `BF-YYYYMMDD-NNN`
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub total_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Batch together with its distribution progress
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchWithProgress {
    #[serde(flatten)]
    pub batch: Batch,
    pub distributed: i64,
    pub remaining: i64,
}

impl BatchWithProgress {
    pub fn new(batch: Batch, distributed: i64) -> Self {
        let remaining = remaining_fingerlings(i64::from(batch.total_count), distributed);
        Self {
            batch,
            distributed,
            remaining,
        }
    }
}

/// Input for creating a batch
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    /// Generated when omitted
    pub id: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Batch name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    #[validate(range(min = 0, message = "Total count cannot be negative"))]
    pub total_count: Option<i32>,
    pub is_active: Option<bool>,
}

/// Partial update for a batch
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdate {
    #[validate(length(min = 1, max = 255, message = "Batch name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Total count cannot be negative"))]
    pub total_count: Option<i32>,
    pub is_active: Option<bool>,
}

/// Distribution status of a batch as shown in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Pending,
    Overdue,
    Completed,
}

impl BatchStatus {
    /// Status of a batch that still has stock, from its age in days
    pub fn from_age(days_since_creation: i64, overdue_after_days: i64) -> Self {
        if days_since_creation > overdue_after_days {
            BatchStatus::Overdue
        } else {
            BatchStatus::Pending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "Pending",
            BatchStatus::Overdue => "Overdue",
            BatchStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a batch id: `BF-<YYYYMMDD>-<millisecond suffix>`
pub fn generate_batch_id(now: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{:03}",
        BATCH_ID_PREFIX,
        now.format("%Y%m%d"),
        now.timestamp_subsec_millis() % 1000
    )
}

/// Check that `id` has the `BF-\d{8}-\d{3}` shape
pub fn is_valid_batch_id(id: &str) -> bool {
    let parts: Vec<&str> = id.split('-').collect();
    parts.len() == 3
        && parts[0] == BATCH_ID_PREFIX
        && parts[1].len() == 8
        && parts[1].chars().all(|c| c.is_ascii_digit())
        && parts[2].len() == 3
        && parts[2].chars().all(|c| c.is_ascii_digit())
}

/// Fingerlings left in a batch after its distributions
pub fn remaining_fingerlings(total_count: i64, distributed: i64) -> i64 {
    total_count - distributed
}
