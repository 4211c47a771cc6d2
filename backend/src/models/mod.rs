//! Database models for the Fingerling Distribution Tracking System
//!
//! Re-exports models from the shared crate and adds the row types sqlx maps
//! query results into.

pub use shared::models::*;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::AppError;

/// Columns selected for a full distribution row
pub const DISTRIBUTION_COLUMNS: &str = "id, date_distributed, beneficiary_name, barangay, \
     municipality, province, fingerlings, species, survival_rate, avg_weight, \
     forecasted_harvest_date, forecasted_harvest_kilos, actual_harvest_date, \
     actual_harvest_kilos, remarks, custom_remarks, batch_id, user_id, created_at, updated_at";

pub const BATCH_COLUMNS: &str =
    "id, name, description, user_id, total_count, is_active, created_at, updated_at";

pub const SESSION_COLUMNS: &str =
    "id, batch_id, species, location, notes, counts, timestamp, image_url, user_id, created_at";

#[derive(Debug, sqlx::FromRow)]
pub struct DistributionRow {
    pub id: i32,
    pub date_distributed: NaiveDate,
    pub beneficiary_name: String,
    pub barangay: Option<String>,
    pub municipality: String,
    pub province: String,
    pub fingerlings: i32,
    pub species: String,
    pub survival_rate: Option<Decimal>,
    pub avg_weight: Option<Decimal>,
    pub forecasted_harvest_date: Option<NaiveDate>,
    pub forecasted_harvest_kilos: Option<Decimal>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub actual_harvest_kilos: Option<Decimal>,
    pub remarks: Option<String>,
    pub custom_remarks: Option<String>,
    pub batch_id: Option<String>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DistributionRow> for Distribution {
    type Error = AppError;

    fn try_from(r: DistributionRow) -> Result<Self, Self::Error> {
        let species = r
            .species
            .parse::<Species>()
            .map_err(|e| AppError::Internal(format!("distribution {}: {}", r.id, e)))?;
        let remarks = r
            .remarks
            .as_deref()
            .map(str::parse::<Remarks>)
            .transpose()
            .map_err(|e| AppError::Internal(format!("distribution {}: {}", r.id, e)))?;

        Ok(Distribution {
            id: r.id,
            date_distributed: r.date_distributed,
            beneficiary_name: r.beneficiary_name,
            barangay: r.barangay,
            municipality: r.municipality,
            province: r.province,
            fingerlings: r.fingerlings,
            species,
            survival_rate: r.survival_rate,
            avg_weight: r.avg_weight,
            forecasted_harvest_date: r.forecasted_harvest_date,
            forecasted_harvest_kilos: r.forecasted_harvest_kilos,
            actual_harvest_date: r.actual_harvest_date,
            actual_harvest_kilos: r.actual_harvest_kilos,
            remarks,
            custom_remarks: r.custom_remarks,
            batch_id: r.batch_id,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct BatchRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub total_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BatchRow> for Batch {
    fn from(r: BatchRow) -> Self {
        Batch {
            id: r.id,
            name: r.name,
            description: r.description,
            user_id: r.user_id,
            total_count: r.total_count,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SessionRow {
    pub id: i32,
    pub batch_id: String,
    pub species: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub counts: sqlx::types::Json<SessionCounts>,
    pub timestamp: DateTime<Utc>,
    pub image_url: Option<String>,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(r: SessionRow) -> Result<Self, Self::Error> {
        let species = r
            .species
            .parse::<Species>()
            .map_err(|e| AppError::Internal(format!("session {}: {}", r.id, e)))?;

        Ok(Session {
            id: r.id,
            batch_id: r.batch_id,
            species,
            location: r.location,
            notes: r.notes,
            counts: r.counts.0,
            timestamp: r.timestamp,
            image_url: r.image_url,
            user_id: r.user_id,
            created_at: r.created_at,
        })
    }
}

/// User joined with whichever profile table matches its type
#[derive(Debug, sqlx::FromRow)]
pub struct UserProfileRow {
    pub id: i32,
    pub email: String,
    pub user_type: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_number: Option<String>,
}

/// Select list and joins producing a `UserProfileRow`
pub const USER_PROFILE_SELECT: &str = r#"
    SELECT u.id, u.email, u.user_type, u.is_active, u.last_login_at, u.created_at,
           COALESCE(sp.first_name, ap.first_name) AS first_name,
           COALESCE(sp.last_name, ap.last_name) AS last_name,
           COALESCE(sp.contact_number, ap.contact_number) AS contact_number
    FROM users u
    LEFT JOIN LATERAL (
        SELECT first_name, last_name, contact_number FROM staff_profiles
        WHERE user_id = u.id ORDER BY id LIMIT 1
    ) sp ON u.user_type = 'staff'
    LEFT JOIN LATERAL (
        SELECT first_name, last_name, contact_number FROM admin_profiles
        WHERE user_id = u.id ORDER BY id LIMIT 1
    ) ap ON u.user_type = 'admin'
"#;

impl TryFrom<UserProfileRow> for UserWithProfile {
    type Error = AppError;

    fn try_from(r: UserProfileRow) -> Result<Self, Self::Error> {
        let user_type = UserType::from_str(&r.user_type).ok_or_else(|| {
            AppError::Internal(format!("user {} has unknown type {}", r.id, r.user_type))
        })?;

        let profile = match (r.first_name, r.last_name) {
            (Some(first_name), Some(last_name)) => Some(Profile {
                first_name,
                last_name,
                contact_number: r.contact_number,
            }),
            _ => None,
        };

        Ok(UserWithProfile {
            user: User {
                id: r.id,
                email: r.email,
                user_type,
                is_active: r.is_active,
                last_login_at: r.last_login_at,
                created_at: r.created_at,
            },
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DistributionRow {
        let now = Utc::now();
        DistributionRow {
            id: 7,
            date_distributed: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            beneficiary_name: "Juan Dela Cruz".to_string(),
            barangay: None,
            municipality: "Calamba".to_string(),
            province: "Laguna".to_string(),
            fingerlings: 500,
            species: "Red Tilapia".to_string(),
            survival_rate: None,
            avg_weight: None,
            forecasted_harvest_date: None,
            forecasted_harvest_kilos: None,
            actual_harvest_date: None,
            actual_harvest_kilos: None,
            remarks: Some("Not Yet Harvested".to_string()),
            custom_remarks: None,
            batch_id: Some("BF-20240301-123".to_string()),
            user_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_distribution_row_conversion() {
        let d = Distribution::try_from(row()).unwrap();
        assert_eq!(d.species, Species::RedTilapia);
        assert_eq!(d.remarks, Some(Remarks::NotYetHarvested));
        assert_eq!(d.location(), "Calamba, Laguna");
    }

    #[test]
    fn test_distribution_row_with_bad_species_is_internal_error() {
        let mut r = row();
        r.species = "Salmon".to_string();
        assert!(matches!(Distribution::try_from(r), Err(AppError::Internal(_))));
    }
}
