//! The booking committer: the only path that turns held capacity into a
//! durable sale. Every commit runs in one database transaction, so a
//! booking can never exist pointing at seats that are still open to other
//! buyers.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::info;

use crate::database::Database;
use crate::error::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::locks::{rejected_ids, unique_ids};

/// Enforced price floor per seat, in rupees.
pub const MINIMUM_PRICE: f64 = 199.0;

pub fn per_seat_price(base_price: f64) -> f64 {
    base_price.max(MINIMUM_PRICE)
}

pub fn total_amount(base_price: f64, seat_count: usize) -> f64 {
    per_seat_price(base_price) * seat_count as f64
}

/// Booking augmented with the effective per-seat price that was billed.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    #[serde(flatten)]
    pub booking: Booking,
    pub per_seat_price: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShowSummary {
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub price: f64,
    pub movie_title: String,
    pub theatre_name: String,
    pub theatre_city: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookedSeat {
    pub seat_id: i64,
    pub row_letter: String,
    pub seat_number: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub id: i64,
    pub show_id: i64,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub show: ShowSummary,
    pub seats: Vec<BookedSeat>,
}

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    show_id: i64,
    total_amount: f64,
    status: BookingStatus,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
    show_date: NaiveDate,
    show_time: NaiveTime,
    price: f64,
    movie_title: String,
    theatre_name: String,
    theatre_city: String,
}

#[derive(FromRow)]
struct BookedSeatRow {
    booking_id: i64,
    seat_id: i64,
    row_letter: String,
    seat_number: i32,
}

#[derive(Clone)]
pub struct BookingService {
    db: Database,
}

impl BookingService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Books the named seats for `user_id` in a single transaction:
    /// price lookup, pending booking insert, conditional seat transition,
    /// booking_seats insert. The seat transition accepts a seat only when it
    /// is not booked and not validly locked by another session, so two
    /// overlapping commits are linearized by the row update and exactly one
    /// wins. Any shortfall rolls the whole transaction back.
    pub async fn create_booking(
        &self,
        user_id: i64,
        show_id: i64,
        seat_ids: &[i64],
        session_token: &str,
    ) -> Result<BookingConfirmation, AppError> {
        if seat_ids.is_empty() {
            return Err(AppError::Validation("seat_ids must not be empty".into()));
        }
        // A duplicated id is one seat: collapse it so the granted count can
        // match the request and the total bills each seat once
        let seat_ids = unique_ids(seat_ids);

        let mut tx = self.db.pool.begin().await?;

        let base_price: f64 = sqlx::query_scalar("SELECT price FROM shows WHERE id = $1")
            .bind(show_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("show"))?;

        let per_seat = per_seat_price(base_price);
        let total = total_amount(base_price, seat_ids.len());

        let booking: Booking = sqlx::query_as(
            r#"
            INSERT INTO bookings (user_id, show_id, total_amount, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(show_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let booked: Vec<i64> = sqlx::query_scalar(
            r#"
            UPDATE seats
            SET is_booked = TRUE, is_locked = FALSE, locked_until = NULL, locked_by = NULL
            WHERE id = ANY($1)
              AND show_id = $2
              AND is_booked = FALSE
              AND (is_locked = FALSE OR locked_until <= NOW() OR locked_by = $3)
            RETURNING id
            "#,
        )
        .bind(&seat_ids)
        .bind(show_id)
        .bind(session_token)
        .fetch_all(&mut *tx)
        .await?;

        if booked.len() != seat_ids.len() {
            let rejected = rejected_ids(&seat_ids, &booked);
            tx.rollback().await?;
            return Err(AppError::SeatsUnavailable { rejected });
        }

        sqlx::query(
            r#"
            INSERT INTO booking_seats (booking_id, seat_id)
            SELECT $1, t.seat_id FROM UNNEST($2::bigint[]) AS t(seat_id)
            "#,
        )
        .bind(booking.id)
        .bind(&booked)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "booking {} created: user {}, show {}, {} seats, total {}",
            booking.id,
            user_id,
            show_id,
            booked.len(),
            total
        );

        Ok(BookingConfirmation {
            booking,
            per_seat_price: per_seat,
        })
    }

    /// All bookings for a user with show, movie, theatre and seat details,
    /// newest first.
    pub async fn get_user_bookings(&self, user_id: i64) -> Result<Vec<BookingDetails>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.show_id, b.total_amount, b.status, b.payment_id, b.created_at,
                   s.show_date, s.show_time, s.price,
                   m.title AS movie_title, t.name AS theatre_name, t.city AS theatre_city
            FROM bookings b
            JOIN shows s ON s.id = b.show_id
            JOIN movies m ON m.id = s.movie_id
            JOIN theatres t ON t.id = s.theatre_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let seats = self.seats_for_bookings(&ids).await?;

        Ok(assemble_details(rows, seats))
    }

    /// One booking with its details, visible only to its owner.
    pub async fn get_booking(
        &self,
        booking_id: i64,
        user_id: i64,
    ) -> Result<BookingDetails, AppError> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT b.id, b.show_id, b.total_amount, b.status, b.payment_id, b.created_at,
                   s.show_date, s.show_time, s.price,
                   m.title AS movie_title, t.name AS theatre_name, t.city AS theatre_city
            FROM bookings b
            JOIN shows s ON s.id = b.show_id
            JOIN movies m ON m.id = s.movie_id
            JOIN theatres t ON t.id = s.theatre_id
            WHERE b.id = $1 AND b.user_id = $2
            "#,
        )
        .bind(booking_id)
        .bind(user_id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

        let seats = self.seats_for_bookings(&[row.id]).await?;

        assemble_details(vec![row], seats)
            .into_iter()
            .next()
            .ok_or(AppError::NotFound("booking"))
    }

    async fn seats_for_bookings(
        &self,
        booking_ids: &[i64],
    ) -> Result<Vec<BookedSeatRow>, AppError> {
        if booking_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, BookedSeatRow>(
            r#"
            SELECT bs.booking_id, bs.seat_id, st.row_letter, st.seat_number
            FROM booking_seats bs
            JOIN seats st ON st.id = bs.seat_id
            WHERE bs.booking_id = ANY($1)
            ORDER BY st.row_letter, st.seat_number
            "#,
        )
        .bind(booking_ids)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rows)
    }
}

fn assemble_details(rows: Vec<BookingRow>, seats: Vec<BookedSeatRow>) -> Vec<BookingDetails> {
    let mut by_booking: HashMap<i64, Vec<BookedSeat>> = HashMap::new();
    for seat in seats {
        by_booking.entry(seat.booking_id).or_default().push(BookedSeat {
            seat_id: seat.seat_id,
            row_letter: seat.row_letter,
            seat_number: seat.seat_number,
        });
    }

    rows.into_iter()
        .map(|row| {
            let seats = by_booking.remove(&row.id).unwrap_or_default();
            BookingDetails {
                id: row.id,
                show_id: row.show_id,
                total_amount: row.total_amount,
                status: row.status,
                payment_id: row.payment_id,
                created_at: row.created_at,
                show: ShowSummary {
                    show_date: row.show_date,
                    show_time: row.show_time,
                    price: row.price,
                    movie_title: row.movie_title,
                    theatre_name: row.theatre_name,
                    theatre_city: row.theatre_city,
                },
                seats,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base_price_above_floor_is_kept() {
        // base 200, floor 199, two seats -> 400
        assert_eq!(per_seat_price(200.0), 200.0);
        assert_eq!(total_amount(200.0, 2), 400.0);
    }

    #[test]
    fn floor_applies_when_base_is_lower() {
        // base 100 -> billed at 199, two seats -> 398
        assert_eq!(per_seat_price(100.0), 199.0);
        assert_eq!(total_amount(100.0, 2), 398.0);
    }

    #[test]
    fn duplicate_seat_ids_bill_one_seat() {
        let ids = unique_ids(&[7, 7]);
        assert_eq!(ids, vec![7]);
        assert_eq!(total_amount(250.0, ids.len()), 250.0);
    }

    proptest! {
        #[test]
        fn per_seat_price_never_undercuts_floor_or_base(base in 0.0f64..10_000.0) {
            let price = per_seat_price(base);
            prop_assert!(price >= MINIMUM_PRICE);
            prop_assert!(price >= base);
        }

        #[test]
        fn total_scales_linearly_with_seat_count(
            base in 0.0f64..10_000.0,
            count in 1usize..10,
        ) {
            prop_assert_eq!(total_amount(base, count), per_seat_price(base) * count as f64);
        }
    }
}
