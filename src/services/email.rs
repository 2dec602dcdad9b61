//! Email service for verification codes, password resets and return notices

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send an account verification code
    pub async fn send_verification_code(&self, to: &str, code: &str) -> AppResult<()> {
        let subject = "Verify Your Account - BookShare";
        let body = format!(
            r#"
Welcome to BookShare!

Your verification code is: {code}

This code will expire in 10 minutes.

If you didn't create an account with BookShare, please ignore this email.
"#,
            code = code
        );

        self.send_email(to, subject, &body).await
    }

    /// Send a password reset link
    pub async fn send_password_reset(&self, to: &str, reset_link: &str) -> AppResult<()> {
        let subject = "Reset Your Password - BookShare";
        let body = format!(
            r#"
We received a request to reset your BookShare password.

Open this link to choose a new password: {link}

This link will expire in 1 hour.

If you didn't request a password reset, please ignore this email. Your
password will remain unchanged.
"#,
            link = reset_link
        );

        self.send_email(to, subject, &body).await
    }

    /// Tell a book owner their book came back
    pub async fn send_return_notice(
        &self,
        to: &str,
        book_title: &str,
        borrower_name: &str,
    ) -> AppResult<()> {
        let subject = "Your Book Was Returned - BookShare";
        let body = format!(
            r#"
Good news! "{title}" was returned by {borrower} and is available for
lending again.
"#,
            title = book_title,
            borrower = borrower_name
        );

        self.send_email(to, subject, &body).await
    }

    /// Confirm a return to the borrower
    pub async fn send_return_confirmation(&self, to: &str, book_title: &str) -> AppResult<()> {
        let subject = "Return Confirmed - BookShare";
        let body = format!(
            r#"
Your return of "{title}" is confirmed. Thanks for sharing!
"#,
            title = book_title
        );

        self.send_email(to, subject, &body).await
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("BookShare");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            // Use STARTTLS for secure connection
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
