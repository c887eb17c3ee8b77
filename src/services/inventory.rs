//! Durable seat state per show, with lazy materialization of the seating
//! chart on first access.

use chrono::Utc;
use tracing::{debug, info};

use crate::database::Database;
use crate::error::AppError;
use crate::models::Seat;

pub const SEAT_ROWS: [&str; 5] = ["A", "B", "C", "D", "E"];
pub const SEATS_PER_ROW: i32 = 20;

/// The full seating chart as (row letter, seat number) pairs, in the order
/// the seats are presented: row by row, seat numbers ascending.
pub fn seat_grid() -> Vec<(&'static str, i32)> {
    let mut grid = Vec::with_capacity(SEAT_ROWS.len() * SEATS_PER_ROW as usize);
    for row in SEAT_ROWS {
        for number in 1..=SEATS_PER_ROW {
            grid.push((row, number));
        }
    }
    grid
}

#[derive(Clone)]
pub struct SeatInventory {
    db: Database,
}

impl SeatInventory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Materializes the seat grid for a show if it does not exist yet.
    /// Idempotent: the read-before-write check skips the insert entirely for
    /// an existing grid, and the single conflict-free insert statement means
    /// a concurrent duplicate call can never produce a second grid or leave
    /// a partial one behind.
    pub async fn ensure_seats_exist(&self, show_id: i64) -> Result<(), AppError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM seats WHERE show_id = $1")
            .bind(show_id)
            .fetch_one(&self.db.pool)
            .await?;

        if existing > 0 {
            debug!("seats already exist for show {}: {}", show_id, existing);
            return Ok(());
        }

        let show_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shows WHERE id = $1)")
            .bind(show_id)
            .fetch_one(&self.db.pool)
            .await?;
        if !show_exists {
            return Err(AppError::NotFound("show"));
        }

        let (rows, numbers): (Vec<String>, Vec<i32>) = seat_grid()
            .into_iter()
            .map(|(row, number)| (row.to_string(), number))
            .unzip();

        let inserted = sqlx::query(
            r#"
            INSERT INTO seats (show_id, row_letter, seat_number)
            SELECT $1, t.row_letter, t.seat_number
            FROM UNNEST($2::text[], $3::int[]) AS t(row_letter, seat_number)
            ON CONFLICT (show_id, row_letter, seat_number) DO NOTHING
            "#,
        )
        .bind(show_id)
        .bind(&rows)
        .bind(&numbers)
        .execute(&self.db.pool)
        .await?
        .rows_affected();

        info!("materialized {} seats for show {}", inserted, show_id);
        Ok(())
    }

    /// Seat list for a show, sorted by row then seat number. Expired locks
    /// are swept first, and a lock that lapses between the sweep and the
    /// read is still dropped from the returned rows.
    pub async fn get_seats(&self, show_id: i64) -> Result<Vec<Seat>, AppError> {
        self.release_expired_locks().await?;

        let mut seats = sqlx::query_as::<_, Seat>(
            "SELECT * FROM seats WHERE show_id = $1 ORDER BY row_letter, seat_number",
        )
        .bind(show_id)
        .fetch_all(&self.db.pool)
        .await?;

        let now = Utc::now();
        for seat in &mut seats {
            seat.clear_expired_lock(now);
        }

        Ok(seats)
    }

    /// Resets every lock whose expiry has passed. Also driven periodically
    /// by the background reaper.
    pub async fn release_expired_locks(&self) -> Result<u64, AppError> {
        let released = sqlx::query(
            r#"
            UPDATE seats
            SET is_locked = FALSE, locked_until = NULL, locked_by = NULL
            WHERE is_locked = TRUE AND locked_until <= NOW()
            "#,
        )
        .execute(&self.db.pool)
        .await?
        .rows_affected();

        if released > 0 {
            debug!("released {} expired seat locks", released);
        }
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn grid_covers_every_row_and_number_once() {
        let grid = seat_grid();
        assert_eq!(grid.len(), 100);
        let unique: HashSet<_> = grid.iter().collect();
        assert_eq!(unique.len(), grid.len());
    }

    #[test]
    fn grid_is_ordered_row_major() {
        let grid = seat_grid();
        assert_eq!(grid.first(), Some(&("A", 1)));
        assert_eq!(grid[19], ("A", 20));
        assert_eq!(grid[20], ("B", 1));
        assert_eq!(grid.last(), Some(&("E", 20)));
    }
}
