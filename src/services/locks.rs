//! Short-lived exclusive holds over seat sets. Each lock is a conditional
//! update on the seat row, so a losing concurrent request affects zero rows
//! for an already-taken seat instead of silently double-locking it.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::database::Database;
use crate::error::AppError;

/// Contract TTL for a seat hold. A session that needs more time must
/// re-lock before expiry; there is no heartbeat.
pub const LOCK_TTL_MINUTES: i64 = 5;

pub fn lock_ttl() -> Duration {
    Duration::minutes(LOCK_TTL_MINUTES)
}

/// Per-seat outcome of a lock request. Partial success is observable; a
/// caller that wants all-or-nothing checks `all_locked` and releases the
/// partial hold itself.
#[derive(Debug, Clone, Serialize)]
pub struct LockOutcome {
    pub locked: Vec<i64>,
    pub rejected: Vec<i64>,
    pub expires_at: DateTime<Utc>,
}

impl LockOutcome {
    pub fn all_locked(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Requested ids with duplicates dropped, first occurrence kept. A request
/// naming a seat twice is one hold on one seat, not two; without this the
/// granted count can never match the requested count.
pub fn unique_ids(ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

/// Requested seats that did not make it into the granted set.
pub fn rejected_ids(requested: &[i64], granted: &[i64]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !granted.contains(id))
        .collect()
}

#[derive(Clone)]
pub struct LockManager {
    db: Database,
}

impl LockManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Attempts to lock each named seat for `session_token` until
    /// now + TTL. A seat transitions only if it is not booked and not
    /// validly held by another session; an expired lock does not block, and
    /// a session touching its own held seats refreshes their expiry.
    pub async fn lock_seats(
        &self,
        show_id: i64,
        seat_ids: &[i64],
        session_token: &str,
    ) -> Result<LockOutcome, AppError> {
        if seat_ids.is_empty() {
            return Err(AppError::Validation("seat_ids must not be empty".into()));
        }
        let seat_ids = unique_ids(seat_ids);

        let expires_at = Utc::now() + lock_ttl();

        let locked: Vec<i64> = sqlx::query_scalar(
            r#"
            UPDATE seats
            SET is_locked = TRUE, locked_until = $1, locked_by = $2
            WHERE id = ANY($3)
              AND show_id = $4
              AND is_booked = FALSE
              AND (is_locked = FALSE OR locked_until <= NOW() OR locked_by = $2)
            RETURNING id
            "#,
        )
        .bind(expires_at)
        .bind(session_token)
        .bind(&seat_ids)
        .bind(show_id)
        .fetch_all(&self.db.pool)
        .await?;

        let rejected = rejected_ids(&seat_ids, &locked);
        debug!(
            "lock request for show {}: {} locked, {} rejected",
            show_id,
            locked.len(),
            rejected.len()
        );

        Ok(LockOutcome {
            locked,
            rejected,
            expires_at,
        })
    }

    /// Voluntarily releases locks held by `session_token`, e.g. after a
    /// partial lock the caller does not want to keep. Seats held by other
    /// sessions or already booked are untouched.
    pub async fn release_seats(
        &self,
        show_id: i64,
        seat_ids: &[i64],
        session_token: &str,
    ) -> Result<Vec<i64>, AppError> {
        if seat_ids.is_empty() {
            return Err(AppError::Validation("seat_ids must not be empty".into()));
        }

        let released: Vec<i64> = sqlx::query_scalar(
            r#"
            UPDATE seats
            SET is_locked = FALSE, locked_until = NULL, locked_by = NULL
            WHERE id = ANY($1)
              AND show_id = $2
              AND is_booked = FALSE
              AND is_locked = TRUE
              AND locked_by = $3
            RETURNING id
            "#,
        )
        .bind(seat_ids)
        .bind(show_id)
        .bind(session_token)
        .fetch_all(&self.db.pool)
        .await?;

        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_five_minutes() {
        assert_eq!(lock_ttl(), Duration::minutes(5));
    }

    #[test]
    fn duplicate_ids_collapse_to_one_hold() {
        // [1, 1, 2] asks for two seats; granting [1, 2] must read as a
        // full grant, not a one-seat shortfall with nothing rejected
        let ids = unique_ids(&[1, 1, 2]);
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(rejected_ids(&ids, &[1, 2]), Vec::<i64>::new());
    }

    #[test]
    fn rejected_is_the_difference() {
        // User Y asks for [A1, A2] while A1 is held by someone else: the
        // conditional update grants only A2.
        assert_eq!(rejected_ids(&[1, 2], &[2]), vec![1]);
        assert_eq!(rejected_ids(&[1, 2], &[1, 2]), Vec::<i64>::new());
        assert_eq!(rejected_ids(&[5], &[]), vec![5]);
    }

    #[test]
    fn all_locked_only_without_rejections() {
        let full = LockOutcome {
            locked: vec![1, 2],
            rejected: vec![],
            expires_at: Utc::now(),
        };
        let partial = LockOutcome {
            locked: vec![2],
            rejected: vec![1],
            expires_at: Utc::now(),
        };
        assert!(full.all_locked());
        assert!(!partial.all_locked());
    }
}
