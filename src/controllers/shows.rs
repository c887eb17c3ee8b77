use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::Seat;
use crate::services::catalog::ShowDetails;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows/{id}", get(get_show))
        .route("/shows/{id}/seats", get(get_show_seats))
        .route("/shows/{id}/seats/lock", post(lock_seats))
        .route("/shows/{id}/seats/release", post(release_seats))
}

// GET /api/shows/{id}
async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i64>,
) -> Result<Json<ShowDetails>, AppError> {
    let show = state.catalog.show(show_id).await?;
    Ok(Json(show))
}

// GET /api/shows/{id}/seats
//
// First access materializes the grid; the returned list always reflects
// effective lock state.
async fn get_show_seats(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i64>,
) -> Result<Json<Vec<Seat>>, AppError> {
    state.inventory.ensure_seats_exist(show_id).await?;
    let seats = state.inventory.get_seats(show_id).await?;
    Ok(Json(seats))
}

#[derive(Debug, Deserialize)]
struct LockSeatsRequest {
    seat_ids: Vec<i64>,
    session_token: String,
}

#[derive(Debug, Serialize)]
struct SeatLockResponse {
    success: bool,
    locked_seats: Vec<i64>,
    rejected_seats: Vec<i64>,
    expires_at: DateTime<Utc>,
    message: String,
}

// POST /api/shows/{id}/seats/lock
async fn lock_seats(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i64>,
    Json(req): Json<LockSeatsRequest>,
) -> Result<Json<SeatLockResponse>, AppError> {
    if req.session_token.is_empty() {
        return Err(AppError::Validation("session_token must not be empty".into()));
    }

    let outcome = state
        .locks
        .lock_seats(show_id, &req.seat_ids, &req.session_token)
        .await?;

    let success = outcome.all_locked();
    let message = if success {
        "Seats locked successfully".to_string()
    } else {
        "Some seats are not available".to_string()
    };

    Ok(Json(SeatLockResponse {
        success,
        locked_seats: outcome.locked,
        rejected_seats: outcome.rejected,
        expires_at: outcome.expires_at,
        message,
    }))
}

#[derive(Debug, Deserialize)]
struct ReleaseSeatsRequest {
    seat_ids: Vec<i64>,
    session_token: String,
}

#[derive(Debug, Serialize)]
struct ReleaseSeatsResponse {
    released_seats: Vec<i64>,
}

// POST /api/shows/{id}/seats/release
async fn release_seats(
    State(state): State<Arc<AppState>>,
    Path(show_id): Path<i64>,
    Json(req): Json<ReleaseSeatsRequest>,
) -> Result<Json<ReleaseSeatsResponse>, AppError> {
    if req.session_token.is_empty() {
        return Err(AppError::Validation("session_token must not be empty".into()));
    }

    let released = state
        .locks
        .release_seats(show_id, &req.seat_ids, &req.session_token)
        .await?;

    Ok(Json(ReleaseSeatsResponse {
        released_seats: released,
    }))
}
