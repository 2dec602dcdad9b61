//! Admin dashboard statistics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Count of books per genre
#[derive(Serialize, ToSchema)]
pub struct GenreCount {
    pub genre: String,
    pub count: i64,
}

/// Marketplace statistics, computed on read
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_books: i64,
    pub total_transactions: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub new_users_this_month: i64,
    pub new_books_this_month: i64,
    pub popular_genres: Vec<GenreCount>,
}

/// Get marketplace statistics (admin)
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Marketplace statistics", body = StatsResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_admin()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
