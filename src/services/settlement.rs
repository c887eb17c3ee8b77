//! Payment settlement adapter. In this deployment settlement is simulated,
//! but the state machine is the contract a real gateway integration must
//! honor: a completed payment is the only trigger for booking confirmation,
//! and a failed or refunded one voids the booking.
//!
//! `mock_mode` reproduces the demo compromise exactly, and only there: fail
//! open for UX (storage errors during initiation return a synthesized
//! payment) and coerce every confirmation to `completed`. With the flag off
//! the adapter fails closed and honors the requested status.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::error::AppError;
use crate::models::{BookingStatus, Payment, PaymentStatus};

pub fn new_transaction_id() -> String {
    format!("txn_{}", Uuid::new_v4().simple())
}

/// Booking transition triggered by a payment reaching `status`, if any.
pub fn booking_transition(status: PaymentStatus) -> Option<BookingStatus> {
    match status {
        PaymentStatus::Completed => Some(BookingStatus::Confirmed),
        PaymentStatus::Failed | PaymentStatus::Refunded => Some(BookingStatus::Cancelled),
        PaymentStatus::Pending => None,
    }
}

/// Error for a confirmation whose guarded update matched nothing: either the
/// transaction id is unknown, or the payment already left `pending` and must
/// not be rewritten.
fn already_finalized_error(current: Option<PaymentStatus>) -> AppError {
    match current {
        Some(status) => {
            AppError::Settlement(format!("payment is already {}", status.as_str()))
        }
        None => AppError::NotFound("payment"),
    }
}

#[derive(Clone)]
pub struct SettlementAdapter {
    db: Database,
    mock_mode: bool,
}

impl SettlementAdapter {
    pub fn new(db: Database, mock_mode: bool) -> Self {
        Self { db, mock_mode }
    }

    pub fn resolve_status(&self, requested: PaymentStatus) -> PaymentStatus {
        if self.mock_mode {
            PaymentStatus::Completed
        } else {
            requested
        }
    }

    /// Records a `pending` payment attempt with a fresh transaction id. The
    /// booking must exist, belong to the caller and still be pending. A
    /// booking may accumulate several attempts if retried.
    pub async fn initiate_payment(
        &self,
        booking_id: i64,
        user_id: i64,
        amount: f64,
        payment_method: &str,
    ) -> Result<Payment, AppError> {
        let status: BookingStatus =
            sqlx::query_scalar("SELECT status FROM bookings WHERE id = $1 AND user_id = $2")
                .bind(booking_id)
                .bind(user_id)
                .fetch_optional(&self.db.pool)
                .await?
                .ok_or(AppError::NotFound("booking"))?;

        if status != BookingStatus::Pending {
            return Err(AppError::Validation(format!(
                "booking is {}, not pending",
                status.as_str()
            )));
        }

        let transaction_id = new_transaction_id();

        let inserted = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (booking_id, amount, payment_method, transaction_id, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(amount)
        .bind(payment_method)
        .bind(&transaction_id)
        .fetch_one(&self.db.pool)
        .await;

        match inserted {
            Ok(payment) => {
                info!(
                    "payment {} initiated for booking {} ({})",
                    payment.transaction_id, booking_id, amount
                );
                Ok(payment)
            }
            Err(e) if self.mock_mode => {
                warn!(
                    "mock mode: payment insert failed for booking {}, returning synthesized attempt: {:?}",
                    booking_id, e
                );
                Ok(Payment {
                    id: None,
                    booking_id,
                    amount,
                    payment_method: payment_method.to_string(),
                    transaction_id,
                    status: PaymentStatus::Pending,
                    created_at: Utc::now(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Finalizes a payment attempt and, in the same transaction, the owning
    /// booking: completed confirms it, failed or refunded cancels it and
    /// returns its seats to open. Completed, failed and refunded are
    /// terminal on both sides: the conditional updates only match `pending`
    /// rows, so a payment already finalized by an earlier confirmation is
    /// rejected instead of overwritten.
    pub async fn confirm_payment(
        &self,
        transaction_id: &str,
        requested: PaymentStatus,
    ) -> Result<Payment, AppError> {
        let status = self.resolve_status(requested);
        if self.mock_mode && requested != status {
            warn!(
                "mock mode: coercing requested payment status {} to {}",
                requested.as_str(),
                status.as_str()
            );
        }

        let mut tx = self.db.pool.begin().await?;

        let payment: Option<Payment> = sqlx::query_as(
            r#"
            UPDATE payments SET status = $1
            WHERE transaction_id = $2 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let payment = match payment {
            Some(payment) => payment,
            None => {
                let current: Option<PaymentStatus> =
                    sqlx::query_scalar("SELECT status FROM payments WHERE transaction_id = $1")
                        .bind(transaction_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                tx.rollback().await?;
                return Err(already_finalized_error(current));
            }
        };

        if let Some(next) = booking_transition(status) {
            let transitioned = sqlx::query(
                r#"
                UPDATE bookings SET status = $1, payment_id = $2
                WHERE id = $3 AND status = 'pending'
                "#,
            )
            .bind(next)
            .bind(transaction_id)
            .bind(payment.booking_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if transitioned > 0 && next == BookingStatus::Cancelled {
                sqlx::query(
                    r#"
                    UPDATE seats SET is_booked = FALSE
                    WHERE id IN (SELECT seat_id FROM booking_seats WHERE booking_id = $1)
                    "#,
                )
                .bind(payment.booking_id)
                .execute(&mut *tx)
                .await?;
            }

            if transitioned > 0 {
                info!(
                    "payment {} {}: booking {} -> {}",
                    transaction_id,
                    status.as_str(),
                    payment.booking_id,
                    next.as_str()
                );
            }
        }

        tx.commit().await?;
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(mock_mode: bool) -> SettlementAdapter {
        // The resolution rule is pure; the handle is never touched here.
        SettlementAdapter {
            db: Database {
                pool: sqlx::postgres::PgPoolOptions::new().connect_lazy("postgres://localhost/unused").unwrap(),
            },
            mock_mode,
        }
    }

    #[tokio::test]
    async fn mock_mode_coerces_everything_to_completed() {
        let mock = adapter(true);
        assert_eq!(mock.resolve_status(PaymentStatus::Failed), PaymentStatus::Completed);
        assert_eq!(mock.resolve_status(PaymentStatus::Refunded), PaymentStatus::Completed);
        assert_eq!(mock.resolve_status(PaymentStatus::Completed), PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn live_mode_honors_the_requested_status() {
        let live = adapter(false);
        assert_eq!(live.resolve_status(PaymentStatus::Failed), PaymentStatus::Failed);
        assert_eq!(live.resolve_status(PaymentStatus::Refunded), PaymentStatus::Refunded);
        assert_eq!(live.resolve_status(PaymentStatus::Completed), PaymentStatus::Completed);
    }

    #[test]
    fn completed_confirms_and_failures_cancel() {
        assert_eq!(
            booking_transition(PaymentStatus::Completed),
            Some(BookingStatus::Confirmed)
        );
        assert_eq!(
            booking_transition(PaymentStatus::Failed),
            Some(BookingStatus::Cancelled)
        );
        assert_eq!(
            booking_transition(PaymentStatus::Refunded),
            Some(BookingStatus::Cancelled)
        );
        assert_eq!(booking_transition(PaymentStatus::Pending), None);
    }

    #[test]
    fn finalized_payment_is_rejected_not_rewritten() {
        // completed -> failed must never happen; the second confirmation of
        // an already-settled transaction surfaces as a settlement error
        for settled in [
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            match already_finalized_error(Some(settled)) {
                AppError::Settlement(msg) => assert!(msg.contains(settled.as_str())),
                other => panic!("expected settlement error, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_transaction_is_not_found() {
        assert!(matches!(
            already_finalized_error(None),
            AppError::NotFound("payment")
        ));
    }

    #[test]
    fn transaction_ids_are_prefixed_and_unique() {
        let a = new_transaction_id();
        let b = new_transaction_id();
        assert!(a.starts_with("txn_"));
        assert_ne!(a, b);
    }
}
