//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, stats, users, SESSION_COOKIE};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookShare API",
        version = "1.0.0",
        description = "Community Book Lending Marketplace REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::verify_otp,
        auth::resend_otp,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        auth::forgot_password,
        auth::verify_reset_token,
        auth::reset_password,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::my_books,
        // Borrows
        borrows::create_borrow,
        borrows::return_borrow,
        borrows::my_borrows,
        // Admin
        users::list_users,
        users::get_user,
        users::update_user_status,
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::SignupRequest,
            auth::SignupResponse,
            auth::VerifyOtpRequest,
            auth::ResendOtpRequest,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::ForgotPasswordRequest,
            auth::VerifyResetTokenRequest,
            auth::ResetPasswordRequest,
            // Users
            crate::models::user::User,
            crate::models::user::UserSummary,
            crate::models::user::Role,
            crate::models::user::UserStatus,
            crate::models::user::UpdateProfile,
            crate::models::user::UpdateUserStatus,
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::BookSummary,
            crate::models::book::Condition,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::PaginatedBooks,
            books::PaginatedUsers,
            // Borrows
            crate::models::transaction::BorrowTransaction,
            crate::models::transaction::BorrowDetails,
            crate::models::transaction::TransactionStatus,
            crate::models::transaction::CreateBorrow,
            borrows::ReturnResponse,
            // Stats
            stats::StatsResponse,
            stats::GenreCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            // Misc
            crate::api::MessageResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication and account endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "borrows", description = "Book lending lifecycle"),
        (name = "admin", description = "Administration endpoints")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
