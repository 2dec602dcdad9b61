//! Borrow transactions repository: owns the borrow/return state machine.
//!
//! Both transitions run as a single database transaction with a conditional
//! update on the guarded status column. The rows-affected check turns a lost
//! race into a Conflict instead of a silent overwrite.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        transaction::{BorrowDetails, BorrowTransaction},
        user::UserSummary,
    },
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get transaction by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowTransaction> {
        sqlx::query_as::<_, BorrowTransaction>("SELECT * FROM borrow_transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction with id {} not found", id)))
    }

    /// Borrow a book: flip the book to `borrowed` and record the transaction.
    ///
    /// The book update is conditional on `status = 'available'`; of two racing
    /// borrow requests exactly one sees a row change, the other gets Conflict.
    pub async fn borrow(
        &self,
        book_id: i32,
        borrower_id: i32,
        owner_id: i32,
        due_date: DateTime<Utc>,
    ) -> AppResult<BorrowTransaction> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE books SET status = 'borrowed', updated_at = NOW() WHERE id = $1 AND status = 'available'",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;

            return Err(if exists {
                AppError::Conflict("Book is not available for borrowing".to_string())
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let transaction = sqlx::query_as::<_, BorrowTransaction>(
            r#"
            INSERT INTO borrow_transactions (
                book_id, borrower_id, owner_id, borrow_date, due_date, status
            ) VALUES ($1, $2, $3, NOW(), $4, 'borrowed')
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(borrower_id)
        .bind(owner_id)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(transaction)
    }

    /// Return a borrowed book: close the transaction and flip the book back
    /// to `available`.
    ///
    /// The transaction update is conditional on `status = 'borrowed'`, so a
    /// retried or racing return gets Conflict and changes nothing.
    pub async fn return_transaction(&self, id: i32) -> AppResult<BorrowTransaction> {
        let mut tx = self.pool.begin().await?;

        let returned = sqlx::query_as::<_, BorrowTransaction>(
            r#"
            UPDATE borrow_transactions
            SET status = 'returned', returned_date = NOW(), updated_at = NOW()
            WHERE id = $1 AND status = 'borrowed'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match returned {
            Some(t) => t,
            None => {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM borrow_transactions WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

                return Err(if exists {
                    AppError::Conflict("Book already returned".to_string())
                } else {
                    AppError::NotFound(format!("Transaction with id {} not found", id))
                });
            }
        };

        sqlx::query("UPDATE books SET status = 'available', updated_at = NOW() WHERE id = $1")
            .bind(transaction.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(transaction)
    }

    /// Get all transactions where the user is the borrower, most recent
    /// first, populated with book and owner summaries.
    pub async fn get_for_borrower(&self, borrower_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.borrow_date, t.due_date, t.returned_date, t.status,
                   b.id as book_id, b.title, b.author, b.genre, b.condition,
                   b.address, b.status as book_status,
                   u.id as owner_id, u.name as owner_name, u.city as owner_city,
                   u.state as owner_state
            FROM borrow_transactions t
            JOIN books b ON b.id = t.book_id
            JOIN users u ON u.id = t.owner_id
            WHERE t.borrower_id = $1
            ORDER BY t.borrow_date DESC
            "#,
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let status: crate::models::TransactionStatus = row.try_get("status")?;
            let due_date: DateTime<Utc> = row.try_get("due_date")?;

            result.push(BorrowDetails {
                id: row.try_get("id")?,
                book: BookSummary {
                    id: row.try_get("book_id")?,
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    genre: row.try_get("genre")?,
                    condition: row.try_get("condition")?,
                    address: row.try_get("address")?,
                    status: row.try_get("book_status")?,
                },
                owner: UserSummary {
                    id: row.try_get("owner_id")?,
                    name: row.try_get("owner_name")?,
                    city: row.try_get("owner_city")?,
                    state: row.try_get("owner_state")?,
                },
                borrow_date: row.try_get("borrow_date")?,
                due_date,
                returned_date: row.try_get("returned_date")?,
                status,
                is_overdue: status == crate::models::TransactionStatus::Borrowed && due_date < now,
            });
        }

        Ok(result)
    }

    /// Count transactions
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrow_transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count open transactions
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_transactions WHERE status = 'borrowed'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count open transactions past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_transactions WHERE status = 'borrowed' AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
