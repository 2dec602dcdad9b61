//! Book catalog service: CRUD and search over book listings

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetails, BookQuery, CreateBook, UpdateBook},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List a new book. Always created `available`.
    pub async fn create_book(&self, owner_id: i32, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(owner_id, &book).await
    }

    /// Get a book with its owner summary
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    /// Search the catalog
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<BookDetails>, i64)> {
        self.repository.books.search(query).await
    }

    /// Books owned by the caller
    pub async fn my_books(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        self.repository.books.get_by_owner(owner_id).await
    }

    /// Update a book. Only the owner or an admin may edit; the availability
    /// flag is never editable here.
    pub async fn update_book(
        &self,
        id: i32,
        claims: &UserClaims,
        patch: UpdateBook,
    ) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;
        claims.require_owner_or_admin(book.owner_id)?;

        self.repository.books.update(id, &patch).await
    }

    /// Delete a book. Only the owner or an admin; a borrowed book must come
    /// back before its listing can go away. The availability check lives in
    /// the repository's conditional delete, so a borrow racing this call
    /// cannot slip between a status read and the removal.
    pub async fn delete_book(&self, id: i32, claims: &UserClaims) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;
        claims.require_owner_or_admin(book.owner_id)?;

        self.repository.books.delete(id).await
    }
}
