use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled screening of a movie at a theatre. Immutable once seats
/// exist against it, so the price seen at lock time is the price billed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub movie_id: i64,
    pub theatre_id: i64,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}
