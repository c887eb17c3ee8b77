use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Theatre {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub total_seats: i32,
    pub created_at: DateTime<Utc>,
}
