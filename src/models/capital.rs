use serde::Serialize;
use chrono::{DateTime, NaiveDate, Utc};

/// Manual capital injection ledger row. Carries no derived fields; it only
/// feeds the profit/loss aggregation.
#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct CapitalRecord {
    pub id: i64,
    pub store_id: Option<i64>,
    pub user_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
