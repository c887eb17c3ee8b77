use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `pending -> completed | failed | refunded`, all three terminal. A
/// `completed` payment is the sole trigger for booking confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

/// One settlement attempt against a booking. A booking may accumulate
/// several attempts; `transaction_id` is unique per attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    /// `None` only for the mock-mode fail-open result that never reached
    /// storage.
    pub id: Option<i64>,
    pub booking_id: i64,
    pub amount: f64,
    pub payment_method: String,
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
