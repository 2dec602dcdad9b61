//! Business logic services

pub mod auth;
pub mod catalog;
pub mod email;
pub mod lending;
pub mod stats;
pub mod users;

use crate::{
    config::{AuthConfig, EmailConfig, ServerConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub email: email::EmailService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        server_config: &ServerConfig,
    ) -> AppResult<Self> {
        let email = email::EmailService::new(email_config);

        Ok(Self {
            auth: auth::AuthService::new(
                repository.clone(),
                auth_config,
                email.clone(),
                server_config,
            ),
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone(), email.clone()),
            stats: stats::StatsService::new(repository),
            email,
        })
    }
}
