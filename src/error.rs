use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error taxonomy for the reservation and booking engine. Conflicts carry
/// the losing seat ids so callers can tell the user exactly what was taken.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("not authenticated")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("seats unavailable")]
    SeatsUnavailable { rejected: Vec<i64> },

    #[error("settlement failed: {0}")]
    Settlement(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": self.to_string() }),
            ),
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": self.to_string() }),
            ),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": self.to_string() }),
            ),
            AppError::SeatsUnavailable { rejected } => (
                StatusCode::CONFLICT,
                json!({
                    "success": false,
                    "message": "Some seats are not available",
                    "rejected_seats": rejected,
                }),
            ),
            AppError::Settlement(_) => (
                StatusCode::BAD_GATEWAY,
                json!({ "success": false, "message": self.to_string() }),
            ),
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "message": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn conflict_maps_to_409() {
        let resp = AppError::SeatsUnavailable { rejected: vec![3] }.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn settlement_failures_map_to_502() {
        let resp = AppError::Settlement("payment is already completed".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let resp = AppError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
