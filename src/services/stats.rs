//! Statistics service for the admin dashboard

use chrono::{Datelike, TimeZone, Utc};

use crate::{
    api::stats::{GenreCount, StatsResponse},
    error::{AppError, AppResult},
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Marketplace totals, computed on read with SQL aggregates
    pub async fn get_stats(&self) -> AppResult<StatsResponse> {
        let now = Utc::now();
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::Internal("Failed to compute month start".to_string()))?;

        let total_users = self.repository.users.count().await?;
        let total_books = self.repository.books.count().await?;
        let total_transactions = self.repository.transactions.count().await?;
        let active_loans = self.repository.transactions.count_active().await?;
        let overdue_loans = self.repository.transactions.count_overdue().await?;
        let new_users_this_month = self.repository.users.count_since(month_start).await?;
        let new_books_this_month = self.repository.books.count_since(month_start).await?;

        let popular_genres = self
            .repository
            .books
            .popular_genres(10)
            .await?
            .into_iter()
            .map(|(genre, count)| GenreCount { genre, count })
            .collect();

        Ok(StatsResponse {
            total_users,
            total_books,
            total_transactions,
            active_loans,
            overdue_loans,
            new_users_this_month,
            new_books_this_month,
            popular_genres,
        })
    }
}
