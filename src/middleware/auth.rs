use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

/// Verified token payload attached to protected handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // Bearer header first, then the legacy x-auth-token header.
        let token = match parts.headers.get(header::AUTHORIZATION) {
            Some(value) => {
                let auth_str = value
                    .to_str()
                    .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;
                if !auth_str.starts_with("Bearer ") {
                    return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
                }
                auth_str.trim_start_matches("Bearer ").trim().to_string()
            }
            None => parts
                .headers
                .get("x-auth-token")
                .and_then(|value| value.to_str().ok())
                .map(|s| s.trim().to_string())
                .ok_or_else(|| {
                    AppError::Unauthorized("No token, authorization denied".into())
                })?,
        };

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            email: decoded.claims.email.clone(),
        })
    }
}
