//! Fingerling distribution models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::ValidationError;

/// Fish species handled by the distribution program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Species {
    Tilapia,
    Bangus,
    #[serde(rename = "Red Tilapia")]
    RedTilapia,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Tilapia, Species::Bangus, Species::RedTilapia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Tilapia => "Tilapia",
            Species::Bangus => "Bangus",
            Species::RedTilapia => "Red Tilapia",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "tilapia" => Ok(Species::Tilapia),
            "bangus" => Ok(Species::Bangus),
            "red tilapia" | "red_tilapia" => Ok(Species::RedTilapia),
            _ => Err(ValidationError::new(
                "species",
                format!(
                    "Invalid species '{}'. Must be one of: Tilapia, Bangus, Red Tilapia",
                    s
                ),
            )),
        }
    }
}

impl TryFrom<String> for Species {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Harvest status recorded against a distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Remarks {
    Harvested,
    #[serde(rename = "Not Yet Harvested")]
    NotYetHarvested,
    #[serde(rename = "Partially Harvested")]
    PartiallyHarvested,
    Mortality,
    Other,
}

impl Remarks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Remarks::Harvested => "Harvested",
            Remarks::NotYetHarvested => "Not Yet Harvested",
            Remarks::PartiallyHarvested => "Partially Harvested",
            Remarks::Mortality => "Mortality",
            Remarks::Other => "Other",
        }
    }
}

impl fmt::Display for Remarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Remarks {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "harvested" => Ok(Remarks::Harvested),
            "not yet harvested" => Ok(Remarks::NotYetHarvested),
            "partially harvested" => Ok(Remarks::PartiallyHarvested),
            "mortality" => Ok(Remarks::Mortality),
            "other" => Ok(Remarks::Other),
            _ => Err(ValidationError::new(
                "remarks",
                format!("Invalid remarks '{}'", s),
            )),
        }
    }
}

impl TryFrom<String> for Remarks {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single fingerling distribution to a beneficiary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub id: i32,
    pub date_distributed: NaiveDate,
    pub beneficiary_name: String,
    pub barangay: Option<String>,
    pub municipality: String,
    pub province: String,
    pub fingerlings: i32,
    pub species: Species,
    pub survival_rate: Option<Decimal>,
    pub avg_weight: Option<Decimal>,
    pub forecasted_harvest_date: Option<NaiveDate>,
    pub forecasted_harvest_kilos: Option<Decimal>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub actual_harvest_kilos: Option<Decimal>,
    pub remarks: Option<Remarks>,
    pub custom_remarks: Option<String>,
    /// Loose reference to a batch id; not enforced by the database
    pub batch_id: Option<String>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Distribution {
    /// "barangay, municipality, province" with barangay omitted when absent
    pub fn location(&self) -> String {
        compose_location(
            self.barangay.as_deref(),
            &self.municipality,
            &self.province,
        )
    }
}

/// Join a location hierarchy for display, skipping a missing or blank barangay
pub fn compose_location(barangay: Option<&str>, municipality: &str, province: &str) -> String {
    match barangay.map(str::trim).filter(|b| !b.is_empty()) {
        Some(barangay) => format!("{}, {}, {}", barangay, municipality, province),
        None => format!("{}, {}", municipality, province),
    }
}

/// Input for recording a distribution
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDistribution {
    pub date_distributed: NaiveDate,
    #[validate(length(min = 1, message = "Beneficiary name is required"))]
    pub beneficiary_name: String,
    pub barangay: Option<String>,
    #[validate(length(min = 1, message = "Municipality is required"))]
    pub municipality: String,
    #[validate(length(min = 1, message = "Province is required"))]
    pub province: String,
    #[validate(range(min = 1, message = "Fingerlings must be a positive number"))]
    pub fingerlings: i32,
    pub species: Species,
    pub survival_rate: Option<Decimal>,
    pub avg_weight: Option<Decimal>,
    pub forecasted_harvest_date: Option<NaiveDate>,
    pub forecasted_harvest_kilos: Option<Decimal>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub actual_harvest_kilos: Option<Decimal>,
    pub remarks: Option<Remarks>,
    pub custom_remarks: Option<String>,
    pub batch_id: Option<String>,
    /// Defaults to the authenticated user when omitted
    pub user_id: Option<i32>,
}

/// Partial update for a distribution; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DistributionUpdate {
    pub date_distributed: Option<NaiveDate>,
    #[validate(length(min = 1, message = "Beneficiary name cannot be empty"))]
    pub beneficiary_name: Option<String>,
    pub barangay: Option<String>,
    #[validate(length(min = 1, message = "Municipality cannot be empty"))]
    pub municipality: Option<String>,
    #[validate(length(min = 1, message = "Province cannot be empty"))]
    pub province: Option<String>,
    #[validate(range(min = 1, message = "Fingerlings must be a positive number"))]
    pub fingerlings: Option<i32>,
    pub species: Option<Species>,
    pub survival_rate: Option<Decimal>,
    pub avg_weight: Option<Decimal>,
    pub forecasted_harvest_date: Option<NaiveDate>,
    pub forecasted_harvest_kilos: Option<Decimal>,
    pub actual_harvest_date: Option<NaiveDate>,
    pub actual_harvest_kilos: Option<Decimal>,
    pub remarks: Option<Remarks>,
    pub custom_remarks: Option<String>,
    pub batch_id: Option<String>,
}
