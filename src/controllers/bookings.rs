use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::booking::{BookingConfirmation, BookingDetails};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking).get(get_user_bookings))
        .route("/bookings/{id}", get(get_booking))
}

#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    show_id: i64,
    seat_ids: Vec<i64>,
    session_token: String,
}

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingConfirmation>), AppError> {
    if req.show_id <= 0 {
        return Err(AppError::Validation("show_id must be > 0".into()));
    }

    let confirmation = state
        .bookings
        .create_booking(user.id, req.show_id, &req.seat_ids, &req.session_token)
        .await?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

// GET /api/bookings
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let bookings = state.bookings.get_user_bookings(user.id).await?;
    Ok(Json(bookings))
}

// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = state.bookings.get_booking(booking_id, user.id).await?;
    Ok(Json(booking))
}
