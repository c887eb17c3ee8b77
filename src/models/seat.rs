use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One physical seat of one show. The (`is_booked`, `is_locked`,
/// `locked_until`) triple is the unit of contention for the whole engine;
/// nothing outside the lock manager and the booking committer writes it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub show_id: i64,
    pub row_letter: String,
    pub seat_number: i32,
    pub is_booked: bool,
    pub is_locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing, default)]
    pub locked_by: Option<String>,
}

impl Seat {
    /// A lock counts only while `now < locked_until`. Readers must treat an
    /// expired lock as released even before a sweep resets the flag.
    pub fn lock_active(&self, now: DateTime<Utc>) -> bool {
        self.is_locked && self.locked_until.is_some_and(|until| until > now)
    }

    /// Drops a lapsed lock from this row's in-memory view, so a reader never
    /// sees a hold the sweep has not reclaimed yet.
    pub fn clear_expired_lock(&mut self, now: DateTime<Utc>) {
        if self.is_locked && !self.lock_active(now) {
            self.is_locked = false;
            self.locked_until = None;
            self.locked_by = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seat(is_booked: bool, is_locked: bool, locked_until: Option<DateTime<Utc>>) -> Seat {
        Seat {
            id: 1,
            show_id: 1,
            row_letter: "A".to_string(),
            seat_number: 1,
            is_booked,
            is_locked,
            locked_until,
            locked_by: None,
        }
    }

    #[test]
    fn expired_lock_is_not_active_and_gets_cleared() {
        let now = Utc::now();
        let mut s = seat(false, true, Some(now - Duration::seconds(1)));
        assert!(!s.lock_active(now));

        s.clear_expired_lock(now);
        assert!(!s.is_locked);
        assert!(s.locked_until.is_none());
    }

    #[test]
    fn live_lock_survives_the_clear() {
        let now = Utc::now();
        let until = now + Duration::minutes(5);
        let mut s = seat(false, true, Some(until));
        assert!(s.lock_active(now));

        s.clear_expired_lock(now);
        assert!(s.is_locked);
        assert_eq!(s.locked_until, Some(until));
    }

    #[test]
    fn booked_seat_is_untouched() {
        let now = Utc::now();
        let mut s = seat(true, false, None);
        assert!(!s.lock_active(now));

        s.clear_expired_lock(now);
        assert!(s.is_booked);
        assert!(!s.is_locked);
    }
}
