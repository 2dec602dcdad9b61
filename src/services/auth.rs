//! Authentication service: signup, verification, login, password reset

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::{
    config::{AuthConfig, ServerConfig},
    error::{AppError, AppResult},
    models::user::{UpdateProfile, User, UserClaims, UserStatus},
    repository::{users::NewUser, Repository},
    services::email::EmailService,
};

/// Lifetime of an email verification code
const OTP_TTL_MINUTES: i64 = 10;
/// Lifetime of a password reset token
const RESET_TTL_HOURS: i64 = 1;

/// Attributes collected at signup
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    email: EmailService,
    base_url: String,
}

impl AuthService {
    pub fn new(
        repository: Repository,
        config: AuthConfig,
        email: EmailService,
        server: &ServerConfig,
    ) -> Self {
        Self {
            repository,
            config,
            email,
            base_url: server.base_url.clone(),
        }
    }

    /// Register a new account and send the verification code.
    /// The account stays unverified until the code is confirmed.
    pub async fn signup(&self, signup: Signup) -> AppResult<User> {
        let email = signup.email.trim().to_lowercase();

        if self.repository.users.email_exists(&email).await? {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password = Self::hash_password(&signup.password)?;
        let code = Self::generate_otp();
        let expires = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let user = self
            .repository
            .users
            .create(&NewUser {
                name: signup.name,
                email: email.clone(),
                password,
                phone: signup.phone,
                verification_code: code.clone(),
                verification_expires: expires,
            })
            .await?;

        self.email.send_verification_code(&email, &code).await?;

        Ok(user)
    }

    /// Verify the one-time code, mark the account verified and log it in
    pub async fn verify_otp(&self, email: &str, code: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired code".to_string()))?;

        if user.is_verified {
            return Err(AppError::Conflict("Account is already verified".to_string()));
        }

        let (stored, expires) = match (&user.verification_code, user.verification_expires) {
            (Some(c), Some(e)) => (c, e),
            _ => return Err(AppError::Validation("Invalid or expired code".to_string())),
        };

        // Lazy expiry: consume the code on the way out
        if expires < Utc::now() {
            self.repository.users.clear_verification_code(user.id).await?;
            return Err(AppError::Validation(
                "Code has expired. Please request a new one.".to_string(),
            ));
        }

        if stored != code {
            return Err(AppError::Validation("Invalid or expired code".to_string()));
        }

        let user = self.repository.users.mark_verified(user.id).await?;
        let token = self.create_token(&user)?;

        Ok((token, user))
    }

    /// Issue a fresh verification code for an unverified account
    pub async fn resend_otp(&self, email: &str) -> AppResult<()> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account found with this email".to_string()))?;

        if user.is_verified {
            return Err(AppError::Conflict("Account is already verified".to_string()));
        }

        let code = Self::generate_otp();
        let expires = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
        self.repository
            .users
            .set_verification_code(user.id, &code, expires)
            .await?;

        self.email.send_verification_code(&user.email, &code).await?;

        Ok(())
    }

    /// Authenticate by email and password, returning a session token.
    /// Failure messages stay generic to avoid leaking which check failed.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        match user.status {
            UserStatus::Blocked => {
                return Err(AppError::Authentication(
                    "Account is blocked, contact support".to_string(),
                ));
            }
            UserStatus::Deleted => {
                return Err(AppError::Authentication(
                    "Invalid email or password".to_string(),
                ));
            }
            UserStatus::Active => {}
        }

        if !Self::verify_password(&user.password, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        if !user.is_verified {
            return Err(AppError::Authentication(
                "Account is not verified. Please verify your email first.".to_string(),
            ));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Get the authenticated user's record
    pub async fn current_user(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Update the authenticated user's profile; a password change requires
    /// the current password
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        if let Some(ref new_password) = profile.new_password {
            let current = profile.current_password.as_deref().ok_or_else(|| {
                AppError::Validation("Current password is required to change password".to_string())
            })?;

            let user = self.repository.users.get_by_id(user_id).await?;
            if !Self::verify_password(&user.password, current)? {
                return Err(AppError::Authentication(
                    "Current password is incorrect".to_string(),
                ));
            }

            let hash = Self::hash_password(new_password)?;
            self.repository.users.update_password(user_id, &hash).await?;
        }

        self.repository.users.update_profile(user_id, &profile).await
    }

    /// Start a password reset. Always succeeds from the caller's point of
    /// view so account existence is not disclosed.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        let user = match self.repository.users.get_by_email(email).await? {
            Some(user) => user,
            None => return Ok(()),
        };

        let token = Uuid::new_v4().to_string();
        let expires = Utc::now() + Duration::hours(RESET_TTL_HOURS);
        self.repository
            .users
            .set_reset_token(user.id, &token, expires)
            .await?;

        let link = format!("{}/reset-password?token={}", self.base_url, token);
        self.email.send_password_reset(&user.email, &link).await?;

        Ok(())
    }

    /// Check a reset token without consuming it
    pub async fn verify_reset_token(&self, token: &str) -> AppResult<()> {
        self.get_user_by_valid_reset_token(token).await.map(|_| ())
    }

    /// Complete a password reset, consuming the token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        let user = self.get_user_by_valid_reset_token(token).await?;

        let hash = Self::hash_password(new_password)?;
        self.repository.users.update_password(user.id, &hash).await?;

        Ok(())
    }

    async fn get_user_by_valid_reset_token(&self, token: &str) -> AppResult<User> {
        let user = self
            .repository
            .users
            .get_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired reset token".to_string()))?;

        // Lazy expiry
        match user.reset_expires {
            Some(expires) if expires >= Utc::now() => Ok(user),
            _ => {
                self.repository.users.clear_reset_token(user.id).await?;
                Err(AppError::Validation(
                    "Reset token has expired. Please request a new one.".to_string(),
                ))
            }
        }
    }

    /// Create a session token for a user (30 days by default)
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_days as i64 * 86400);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Hash a password with argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against its argon2 hash
    pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Six-digit one-time code
    fn generate_otp() -> String {
        rand::thread_rng().gen_range(100_000..1_000_000).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = AuthService::hash_password("hunter2hunter2").unwrap();
        assert_ne!(hash, "hunter2hunter2");
        assert!(AuthService::verify_password(&hash, "hunter2hunter2").unwrap());
        assert!(!AuthService::verify_password(&hash, "wrong-password").unwrap());
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let otp = AuthService::generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
