//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
        user::UserSummary,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book with owner summary
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.get_by_id(id).await?;

        let owner = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, city, state FROM users WHERE id = $1",
        )
        .bind(book.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(BookDetails { book, owner })
    }

    /// Create a new book listing. Status is always `available` at creation.
    pub async fn create(&self, owner_id: i32, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                owner_id, title, author, genre, description,
                condition, isbn, image, address, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'available')
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(book.condition)
        .bind(&book.isbn)
        .bind(&book.image)
        .bind(&book.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Search books with case-insensitive substring matching across
    /// title, author, genre and ISBN. An empty query returns the full catalog.
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let pattern = query
            .q
            .as_ref()
            .map(|q| format!("%{}%", q))
            .unwrap_or_else(|| "%".to_string());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE title ILIKE $1 OR author ILIKE $1 OR genre ILIKE $1 OR isbn ILIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT b.*, u.id as u_id, u.name as u_name, u.city as u_city, u.state as u_state
            FROM books b
            JOIN users u ON u.id = b.owner_id
            WHERE b.title ILIKE $1 OR b.author ILIKE $1 OR b.genre ILIKE $1 OR b.isbn ILIKE $1
            ORDER BY b.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            books.push(BookDetails {
                book: Book {
                    id: row.try_get("id")?,
                    owner_id: row.try_get("owner_id")?,
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    genre: row.try_get("genre")?,
                    description: row.try_get("description")?,
                    condition: row.try_get("condition")?,
                    isbn: row.try_get("isbn")?,
                    image: row.try_get("image")?,
                    address: row.try_get("address")?,
                    status: row.try_get("status")?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                },
                owner: UserSummary {
                    id: row.try_get("u_id")?,
                    name: row.try_get("u_name")?,
                    city: row.try_get("u_city")?,
                    state: row.try_get("u_state")?,
                },
            });
        }

        Ok((books, total))
    }

    /// Get all books owned by a user
    pub async fn get_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Update book attributes. Never touches status or ownership.
    pub async fn update(&self, id: i32, patch: &UpdateBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($1, title),
                author = COALESCE($2, author),
                genre = COALESCE($3, genre),
                description = COALESCE($4, description),
                condition = COALESCE($5, condition),
                isbn = COALESCE($6, isbn),
                image = COALESCE($7, image),
                address = COALESCE($8, address),
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&patch.title)
        .bind(&patch.author)
        .bind(&patch.genre)
        .bind(&patch.description)
        .bind(patch.condition)
        .bind(&patch.isbn)
        .bind(&patch.image)
        .bind(&patch.address)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(book)
    }

    /// Delete a book listing. The delete is conditional on the book being
    /// `available`; a borrow committing concurrently makes it miss, and the
    /// probe turns that into Conflict instead of removing a borrowed book.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1 AND status = 'available'")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

            return Err(if exists {
                AppError::Conflict(
                    "Book is currently borrowed and cannot be deleted".to_string(),
                )
            } else {
                AppError::NotFound(format!("Book with id {} not found", id))
            });
        }

        Ok(())
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books created since the given instant
    pub async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Genres ranked by number of listings
    pub async fn popular_genres(&self, limit: i64) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT genre, COUNT(*) as count
            FROM books
            GROUP BY genre
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut genres = Vec::with_capacity(rows.len());
        for row in rows {
            genres.push((row.try_get("genre")?, row.try_get("count")?));
        }
        Ok(genres)
    }
}
