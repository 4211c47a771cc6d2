//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination parameters as sent by the dashboard (`?page=&limit=`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Build pagination from optional query values, clamping to sane bounds
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Row offset for SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: Pagination, total_items: u64) -> Self {
        let limit = u64::from(pagination.limit.max(1));
        let total_pages = total_items.div_ceil(limit);
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total_items,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }
}

/// JSON envelope returned by every endpoint: `{ success, data?, message?, pagination? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: PaginationMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Success envelope without a payload (used by DELETE)
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}

/// Optional inclusive date range used by list and report filters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>) -> Self {
        Self { date_from, date_to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.date_from.is_none() && self.date_to.is_none()
    }

    /// Whether `date` falls inside the range (open ends match everything)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }
}

/// Deserialize an optional value, treating an empty or blank string as absent.
///
/// Dashboard forms submit `?dateFrom=&species=` for untouched inputs.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let p = Pagination::from_query(None, None);
        assert_eq!(p, Pagination { page: 1, limit: 10 });

        let p = Pagination::from_query(Some(0), Some(1000));
        assert_eq!(p, Pagination { page: 1, limit: 100 });
        assert_eq!(p.offset(), 0);

        let p = Pagination::from_query(Some(3), Some(20));
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_pagination_meta_total_pages() {
        let meta = PaginationMeta::new(Pagination { page: 1, limit: 10 }, 0);
        assert_eq!(meta.total_pages, 0);

        let meta = PaginationMeta::new(Pagination { page: 2, limit: 10 }, 21);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.total_items, 21);
    }

    #[test]
    fn test_date_range_contains() {
        let d = |s: &str| s.parse::<NaiveDate>().unwrap();
        let range = DateRange::new(Some(d("2024-01-01")), Some(d("2024-01-31")));
        assert!(range.contains(d("2024-01-01")));
        assert!(range.contains(d("2024-01-31")));
        assert!(!range.contains(d("2024-02-01")));
        assert!(DateRange::default().contains(d("1999-12-31")));
        assert!(DateRange::default().is_unbounded());
    }

    #[test]
    fn test_api_response_skips_empty_fields() {
        let json = serde_json::to_value(ApiResponse::message("Batch deleted")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
        assert!(json.get("pagination").is_none());
    }

    #[derive(Debug, Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        date_from: Option<NaiveDate>,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        limit: Option<u32>,
    }

    #[test]
    fn test_empty_string_as_none() {
        let f: Filter = serde_json::from_str(r#"{"date_from": "", "limit": "5"}"#).unwrap();
        assert!(f.date_from.is_none());
        assert_eq!(f.limit, Some(5));

        let f: Filter = serde_json::from_str(r#"{"date_from": "2024-03-01"}"#).unwrap();
        assert_eq!(f.date_from, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(f.limit.is_none());

        assert!(serde_json::from_str::<Filter>(r#"{"date_from": "yesterday"}"#).is_err());
    }
}
