use serde::Serialize;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Serialize, Clone)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub owner_id: Option<i64>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}
