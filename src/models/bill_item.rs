use serde::{Deserialize, Serialize};

/// A line item owned by a bill, contributing `amount * quantity` to the
/// bill's total.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct BillItem {
    pub id: i64,
    pub bill_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub amount: f64,
    pub quantity: i32,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Client-submitted fields for creating or updating a bill item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillItemInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub quantity: i32,
}
