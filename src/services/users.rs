//! User administration service

use crate::{
    error::AppResult,
    models::user::{User, UserQuery, UserStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a user by id
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List users with optional name search
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Moderate an account: activate, block, or soft-delete.
    /// Accounts are never hard-removed.
    pub async fn set_status(&self, id: i32, status: UserStatus) -> AppResult<User> {
        self.repository.users.set_status(id, status).await
    }
}
