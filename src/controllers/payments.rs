use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::{Payment, PaymentStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/initiate", post(initiate_payment))
        .route("/payments/confirm", post(confirm_payment))
}

fn default_payment_method() -> String {
    "card".to_string()
}

#[derive(Debug, Deserialize)]
struct InitiatePaymentRequest {
    booking_id: i64,
    amount: f64,
    #[serde(default = "default_payment_method")]
    payment_method: String,
}

// POST /api/payments/initiate
async fn initiate_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<InitiatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    if req.booking_id <= 0 {
        return Err(AppError::Validation("booking_id must be > 0".into()));
    }
    if req.amount <= 0.0 {
        return Err(AppError::Validation("amount must be > 0".into()));
    }

    let payment = state
        .settlement
        .initiate_payment(req.booking_id, user.id, req.amount, &req.payment_method)
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

#[derive(Debug, Deserialize)]
struct ConfirmPaymentRequest {
    transaction_id: String,
    status: PaymentStatus,
}

// POST /api/payments/confirm
async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<Payment>, AppError> {
    if req.transaction_id.is_empty() {
        return Err(AppError::Validation("transaction_id must not be empty".into()));
    }

    let payment = state
        .settlement
        .confirm_payment(&req.transaction_id, req.status)
        .await?;

    Ok(Json(payment))
}
