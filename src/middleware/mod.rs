use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;

/// Identity resolved for the current request. Booking and payment
/// operations trust this for `user_id`; its absence is a hard failure.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

// Basic Auth extractor
impl FromRequestParts<Arc<crate::AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let encoded = auth_header
            .strip_prefix("Basic ")
            .ok_or(AppError::Unauthorized)?;

        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| AppError::Unauthorized)?;

        let credentials = String::from_utf8(decoded).map_err(|_| AppError::Unauthorized)?;

        let mut parts = credentials.splitn(2, ':');
        let email = parts.next().ok_or(AppError::Unauthorized)?;
        let password = parts.next().ok_or(AppError::Unauthorized)?;

        let user = User::find_by_email(email, &state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.verify_password(password) {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        })
    }
}
