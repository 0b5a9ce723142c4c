use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::config::{Config, DbKind};
use crate::models::{Bill, BillInput, BillItem, BillItemInput, BillSummary};

mod mysql;
mod sqlite;

pub use mysql::MySqlStore;
pub use sqlite::SqliteStore;

/// Errors surfaced by the storage layer. `NotFound` is distinguished so the
/// handler layer can map it to a 404 instead of a generic failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("invalid due date {0:?}: expected YYYY-MM-DD")]
    InvalidDueDate(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Storage contract shared by both backends. Operation semantics are
/// identical regardless of dialect; the backend is chosen once at startup
/// and all dialect-specific SQL stays inside its implementation.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// All bills as summaries (item count, no item bodies), ordered by due
    /// date ascending with undated bills first.
    async fn list_bills(&self) -> Result<Vec<BillSummary>, StoreError>;

    /// A single bill with its items attached.
    async fn get_bill(&self, id: i64) -> Result<Bill, StoreError>;

    /// Persist a new bill and its items in one transaction, computing the
    /// total from the submitted item set. Returns the new bill id.
    async fn create_bill(&self, input: &BillInput) -> Result<i64, StoreError>;

    /// Rewrite a bill and replace its entire item set in one transaction.
    /// An absent id affects zero rows; existence checking is the caller's.
    async fn update_bill(&self, id: i64, input: &BillInput) -> Result<(), StoreError>;

    /// Delete a bill; its items go with it via the cascade constraint.
    async fn delete_bill(&self, id: i64) -> Result<(), StoreError>;

    /// All items belonging to one bill; empty when the bill has none or
    /// does not exist.
    async fn list_bill_items(&self, bill_id: i64) -> Result<Vec<BillItem>, StoreError>;

    async fn get_bill_item(&self, id: i64) -> Result<BillItem, StoreError>;

    /// Insert one item and recompute the parent bill's total from persisted
    /// state, both inside one transaction. Returns the new item id.
    async fn create_bill_item(
        &self,
        bill_id: i64,
        input: &BillItemInput,
    ) -> Result<i64, StoreError>;

    /// Update one item and recompute the owning bill's total, atomically.
    async fn update_bill_item(&self, id: i64, input: &BillItemInput) -> Result<(), StoreError>;

    /// Delete one item and recompute the owning bill's total, atomically.
    async fn delete_bill_item(&self, id: i64) -> Result<(), StoreError>;

    /// Idempotent schema creation.
    async fn create_tables(&self) -> Result<(), StoreError>;

    /// Release the underlying connection pool.
    async fn close(&self);
}

/// Open the store selected by the configuration.
pub async fn connect(config: &Config) -> Result<Arc<dyn BillStore>, StoreError> {
    match config.db_type {
        DbKind::Mysql => Ok(Arc::new(MySqlStore::connect(config).await?)),
        DbKind::Sqlite => Ok(Arc::new(SqliteStore::connect(config).await?)),
    }
}

/// Parse a submitted due date. Empty or absent means the bill has none;
/// anything else must be an ISO calendar date. Runs before any transaction
/// is opened.
fn parse_due_date(raw: Option<&str>) -> Result<Option<NaiveDate>, StoreError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| StoreError::InvalidDueDate(s.to_string())),
    }
}

/// Total of a submitted item set, used by the whole-bill write paths. The
/// item-level paths recompute from persisted rows instead.
fn items_total(items: &[BillItemInput]) -> f64 {
    items
        .iter()
        .map(|item| item.amount * f64::from(item.quantity))
        .sum()
}

/// Flat bill row for the detail read, before items are attached.
#[derive(sqlx::FromRow)]
struct BillRow {
    id: i64,
    title: String,
    description: Option<String>,
    total: f64,
    due_date: Option<NaiveDate>,
    paid: bool,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl BillRow {
    fn into_bill(self, items: Vec<BillItem>) -> Bill {
        Bill {
            id: self.id,
            title: self.title,
            description: self.description,
            total: self.total,
            due_date: self.due_date,
            paid: self.paid,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(amount: f64, quantity: i32) -> BillItemInput {
        BillItemInput {
            name: "item".to_string(),
            description: None,
            amount,
            quantity,
        }
    }

    #[test]
    fn due_date_absent_or_empty_is_none() {
        assert_eq!(parse_due_date(None).unwrap(), None);
        assert_eq!(parse_due_date(Some("")).unwrap(), None);
    }

    #[test]
    fn due_date_parses_iso_dates() {
        let parsed = parse_due_date(Some("2024-03-01")).unwrap();
        assert_eq!(parsed, Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn due_date_rejects_malformed_dates() {
        for bad in ["2024-13-40", "march 1st", "2024/03/01"] {
            assert!(matches!(
                parse_due_date(Some(bad)),
                Err(StoreError::InvalidDueDate(_))
            ));
        }
    }

    #[test]
    fn total_sums_amount_times_quantity() {
        let items = [item(1200.0, 1), item(25.0, 2)];
        assert!((items_total(&items) - 1250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_of_empty_item_set_is_zero() {
        assert_eq!(items_total(&[]), 0.0);
    }

    #[test]
    fn total_accepts_negative_quantities() {
        // Quantity and amount are deliberately unvalidated; a negative line
        // drives the total below zero.
        let items = [item(10.0, -2)];
        assert_eq!(items_total(&items), -20.0);
    }
}
