//! Lending lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::transaction::{BorrowDetails, BorrowTransaction, CreateBorrow},
};

use super::AuthenticatedUser;

/// Response for a completed return
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub transaction: BorrowTransaction,
}

/// Borrow an available book
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("cookie_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Borrow recorded, book marked borrowed", body = BorrowTransaction),
        (status = 400, description = "Return date not in the future"),
        (status = 403, description = "Cannot borrow your own book"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is not available for borrowing")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<BorrowTransaction>)> {
    let transaction = state.services.lending.borrow(&claims, request).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("cookie_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow transaction ID")
    ),
    responses(
        (status = 200, description = "Book returned, available again", body = ReturnResponse),
        (status = 403, description = "Caller is neither borrower, owner nor admin"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Book already returned")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let transaction = state.services.lending.return_borrow(&claims, id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        transaction,
    }))
}

/// List the authenticated user's borrows, newest first
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Borrow history with overdue flags", body = Vec<BorrowDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    let borrows = state.services.lending.my_borrows(claims.user_id).await?;
    Ok(Json(borrows))
}
