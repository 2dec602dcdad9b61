//! Authentication and account endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{Role, UpdateProfile, User, UserStatus},
    services::auth::Signup,
};

use super::{AuthenticatedUser, MessageResponse, SESSION_COOKIE};

/// Signup request
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub phone: Option<String>,
}

/// Signup response: verification still pending
#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub email: String,
}

/// OTP verification request
#[derive(Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

/// Resend OTP request
#[derive(Deserialize, ToSchema)]
pub struct ResendOtpRequest {
    pub email: String,
}

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response with session token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: UserInfo,
}

/// Sanitized user representation for API responses
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            city: user.city,
            state: user.state,
            zip_code: user.zip_code,
            role: user.role,
            status: user.status,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Forgot password request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Reset token verification request
#[derive(Deserialize, ToSchema)]
pub struct VerifyResetTokenRequest {
    pub token: String,
}

/// Password reset request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Build the session cookie carrying the signed token
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(30))
        .build()
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Registration initiated, verification code sent", body = SignupResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    request.validate()?;

    let user = state
        .services
        .auth
        .signup(Signup {
            name: request.name,
            email: request.email,
            password: request.password,
            phone: request.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Registration initiated. Please check your email for the verification code."
                .to_string(),
            email: user.email,
        }),
    ))
}

/// Verify the emailed one-time code and log in
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Account verified", body = LoginResponse),
        (status = 400, description = "Invalid or expired code"),
        (status = 409, description = "Already verified")
    )
)]
pub async fn verify_otp(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<VerifyOtpRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (token, user) = state
        .services
        .auth
        .verify_otp(&request.email, &request.code)
        .await?;

    let jar = jar.add(session_cookie(token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            user: user.into(),
        }),
    ))
}

/// Request a fresh verification code
#[utoipa::path(
    post,
    path = "/auth/resend-otp",
    tag = "auth",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Verification code sent", body = MessageResponse),
        (status = 404, description = "No such account"),
        (status = 409, description = "Already verified")
    )
)]
pub async fn resend_otp(
    State(state): State<crate::AppState>,
    Json(request): Json<ResendOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.auth.resend_otp(&request.email).await?;

    Ok(Json(MessageResponse {
        message: "Verification code sent. Please check your email.".to_string(),
    }))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials, blocked or unverified account")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (token, user) = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    let jar = jar.add(session_cookie(token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            user: user.into(),
        }),
    ))
}

/// Log out, clearing the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));

    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let user = state.services.auth.current_user(claims.user_id).await?;
    Ok(Json(user.into()))
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("cookie_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated or wrong current password")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Json<UserInfo>> {
    request.validate()?;

    let user = state
        .services
        .auth
        .update_profile(claims.user_id, request)
        .await?;

    Ok(Json(user.into()))
}

/// Start a password reset
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = MessageResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    request.validate()?;

    state.services.auth.forgot_password(&request.email).await?;

    Ok(Json(MessageResponse {
        message: "If an account exists with this email, a reset link has been sent.".to_string(),
    }))
}

/// Check a reset token before showing the reset form
#[utoipa::path(
    post,
    path = "/auth/verify-reset-token",
    tag = "auth",
    request_body = VerifyResetTokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn verify_reset_token(
    State(state): State<crate::AppState>,
    Json(request): Json<VerifyResetTokenRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .auth
        .verify_reset_token(&request.token)
        .await?;

    Ok(Json(MessageResponse {
        message: "Token is valid".to_string(),
    }))
}

/// Complete a password reset
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    request.validate()?;

    state
        .services
        .auth
        .reset_password(&request.token, &request.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset. You can now log in.".to_string(),
    }))
}
