//! Batch property tests
//!
//! - Generated batch ids always have the `BF-YYYYMMDD-NNN` shape
//! - Remaining stock and report status of active batches

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use shared::{
    build_undistributed, generate_batch_id, is_valid_batch_id, remaining_fingerlings, BatchStatus,
    BatchStock, UndistributedSummary, DEFAULT_OVERDUE_AFTER_DAYS,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Timestamps between 1970 and roughly 2096
fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000_000i64).prop_map(|ms| Utc.timestamp_millis_opt(ms).unwrap())
}

/// (total_count, distributed, age in days)
fn stock_strategy() -> impl Strategy<Value = (i64, i64, i64)> {
    (0i64..10_000, 0i64..12_000, 0i64..400)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn to_stock(rows: &[(i64, i64, i64)]) -> Vec<BatchStock> {
    rows.iter()
        .enumerate()
        .map(|(i, &(total, distributed, age))| BatchStock {
            batch_id: format!("BF-20240101-{:03}", i % 1000),
            name: format!("Tilapia lot {}", i),
            description: None,
            total_count: total,
            distributed,
            created_at: now() - Duration::days(age),
            staff_name: "Juan Dela Cruz".to_string(),
        })
        .collect()
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Generated ids match BF-\d{8}-\d{3}
    #[test]
    fn test_generated_batch_id_format(ts in timestamp_strategy()) {
        let id = generate_batch_id(ts);
        prop_assert!(is_valid_batch_id(&id), "bad id {}", id);
        prop_assert_eq!(id.len(), 15);
        prop_assert!(id.starts_with("BF-"));
        prop_assert_eq!(&id[3..11], ts.format("%Y%m%d").to_string());
    }

    /// Every reported batch still has stock; empty ones are absent
    #[test]
    fn test_undistributed_only_lists_remaining_stock(rows in prop::collection::vec(stock_strategy(), 0..30)) {
        let expected = rows.iter().filter(|(total, distributed, _)| total > distributed).count();
        let report = build_undistributed(to_stock(&rows), now(), DEFAULT_OVERDUE_AFTER_DAYS, None);

        prop_assert_eq!(report.len(), expected);
        for batch in &report {
            prop_assert!(batch.remaining > 0);
            prop_assert_eq!(batch.remaining, remaining_fingerlings(batch.total_count, batch.distributed));
            prop_assert_ne!(batch.status, BatchStatus::Completed);
            let overdue = batch.days_since_creation > DEFAULT_OVERDUE_AFTER_DAYS;
            prop_assert_eq!(batch.status == BatchStatus::Overdue, overdue);
        }
    }

    /// Newest batches first, summary consistent with the rows
    #[test]
    fn test_undistributed_sorted_and_summarised(rows in prop::collection::vec(stock_strategy(), 0..30)) {
        let report = build_undistributed(to_stock(&rows), now(), DEFAULT_OVERDUE_AFTER_DAYS, None);

        for pair in report.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }

        let summary = UndistributedSummary::from_batches(&report);
        prop_assert_eq!(summary.total_batches, report.len() as u64);
        prop_assert_eq!(summary.total_remaining, report.iter().map(|b| b.remaining).sum::<i64>());
        prop_assert!(summary.overdue_count <= summary.total_batches);
    }
}

// ============================================================================
// Unit Tests: Distribution Lifecycle
// ============================================================================

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn test_batch_moves_from_pending_to_absent() {
        // 1000 stocked, 400 handed out
        let report = build_undistributed(to_stock(&[(1000, 400, 2)]), now(), 30, None);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].remaining, 600);
        assert_eq!(report[0].status, BatchStatus::Pending);
        assert_eq!(report[0].staff_name, "Juan Dela Cruz");

        // another 600 handed out
        let report = build_undistributed(to_stock(&[(1000, 1000, 2)]), now(), 30, None);
        assert!(report.is_empty());
    }

    #[test]
    fn test_overdue_threshold_is_exclusive() {
        let report = build_undistributed(to_stock(&[(100, 0, 30), (100, 0, 31)]), now(), 30, None);
        let statuses: Vec<BatchStatus> = report.iter().map(|b| b.status).collect();
        assert_eq!(statuses, [BatchStatus::Pending, BatchStatus::Overdue]);
    }

    #[test]
    fn test_manual_batch_ids() {
        assert!(is_valid_batch_id("BF-20240115-007"));
        assert!(!is_valid_batch_id("BF-2024011-007"));
        assert!(!is_valid_batch_id("XX-20240115-007"));
        assert!(!is_valid_batch_id("BF-20240115-7"));
    }
}
