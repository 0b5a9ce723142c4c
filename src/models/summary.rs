use serde::{Deserialize, Serialize};

/// Read-only list projection: bill fields joined with the count of its
/// items, without the item bodies.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub total: f64,
    pub due_date: Option<chrono::NaiveDate>,
    pub paid: bool,
    pub item_count: i64,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}
