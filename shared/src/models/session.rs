//! Field count / stocking session models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Species;

/// What was counted during a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionCounts {
    /// Fingerlings released into a pond or cage
    Stocking { stocked: i64 },
    /// Sample count taken in the field
    FieldCount {
        alive: i64,
        dead: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sampled: Option<i64>,
    },
}

impl SessionCounts {
    /// Total number of fish observed
    pub fn total(&self) -> i64 {
        match self {
            SessionCounts::Stocking { stocked } => *stocked,
            SessionCounts::FieldCount { alive, dead, .. } => alive + dead,
        }
    }

    /// Share of observed fish found alive, when anything was counted
    pub fn survival_rate(&self) -> Option<f64> {
        match self {
            SessionCounts::Stocking { .. } => None,
            SessionCounts::FieldCount { alive, dead, .. } => {
                let total = alive + dead;
                (total > 0).then(|| *alive as f64 / total as f64)
            }
        }
    }
}

/// A recorded session tied to a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i32,
    pub batch_id: String,
    pub species: Species,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub counts: SessionCounts,
    pub timestamp: DateTime<Utc>,
    pub image_url: Option<String>,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub batch_id: String,
    pub species: Species,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub counts: SessionCounts,
    /// Defaults to the time of the request
    pub timestamp: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

/// Partial update for a session
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdate {
    pub batch_id: Option<String>,
    pub species: Option<Species>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub counts: Option<SessionCounts>,
    pub timestamp: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_tagged_representation() {
        let counts: SessionCounts =
            serde_json::from_str(r#"{"kind":"fieldCount","alive":90,"dead":10}"#).unwrap();
        assert_eq!(
            counts,
            SessionCounts::FieldCount {
                alive: 90,
                dead: 10,
                sampled: None
            }
        );
        assert_eq!(counts.total(), 100);
        assert_eq!(counts.survival_rate(), Some(0.9));

        let json = serde_json::to_value(SessionCounts::Stocking { stocked: 500 }).unwrap();
        assert_eq!(json["kind"], "stocking");
        assert_eq!(json["stocked"], 500);
    }

    #[test]
    fn test_counts_reject_unknown_kind() {
        assert!(serde_json::from_str::<SessionCounts>(r#"{"kind":"harvest","kilos":3}"#).is_err());
    }

    #[test]
    fn test_empty_field_count_has_no_survival_rate() {
        let counts = SessionCounts::FieldCount {
            alive: 0,
            dead: 0,
            sampled: Some(0),
        };
        assert_eq!(counts.survival_rate(), None);
    }
}
