//! API handlers for BookShare REST endpoints

pub mod auth;
pub mod books;
pub mod borrows;
pub mod health;
pub mod openapi;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Name of the session cookie carrying the signed token
pub const SESSION_COOKIE: &str = "token";

/// Simple message response body
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Extractor for the authenticated user.
///
/// The session credential is an opaque signed token, carried in the `token`
/// cookie set at login; an `Authorization: Bearer` header is accepted as a
/// fallback for non-browser clients. Validation fails closed.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get(AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(|token| token.to_string())
            })
            .ok_or_else(|| AppError::Authentication("Missing session credential".to_string()))?;

        let claims = UserClaims::from_token(&token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}
