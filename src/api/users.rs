//! User administration endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{UpdateUserStatus, User, UserQuery},
};

use super::{
    books::{PaginatedResponse, PaginatedUsers},
    AuthenticatedUser,
};

/// List users (admin)
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    security(("cookie_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "User list", body = PaginatedUsers),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    claims.require_admin()?;

    let (users, total) = state.services.users.search(&query).await?;

    Ok(Json(PaginatedResponse {
        items: users,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get a user by ID (admin)
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "admin",
    security(("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User", body = User),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Moderate a user account: activate, block or soft-delete (admin)
#[utoipa::path(
    put,
    path = "/admin/users/{id}/status",
    tag = "admin",
    security(("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserStatus,
    responses(
        (status = 200, description = "Status updated", body = User),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserStatus>,
) -> AppResult<Json<User>> {
    claims.require_admin()?;

    let user = state.services.users.set_status(id, request.status).await?;
    Ok(Json(user))
}
