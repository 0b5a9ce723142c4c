use serde::{Deserialize, Serialize};

use super::{BillItem, BillItemInput};

/// A persisted bill with its items attached. `total` is derived from the
/// items and never taken from a client directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub total: f64,
    pub due_date: Option<chrono::NaiveDate>,
    pub paid: bool,
    pub items: Vec<BillItem>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Client-submitted fields for creating or updating a bill. Carries no id,
/// timestamps, or total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// ISO date (YYYY-MM-DD); empty or absent means no due date.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub items: Vec<BillItemInput>,
}
