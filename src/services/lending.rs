//! Lending service: the borrow/return lifecycle and its notifications

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        transaction::{BorrowDetails, BorrowTransaction, CreateBorrow},
        user::UserClaims,
    },
    repository::Repository,
    services::email::EmailService,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    email: EmailService,
}

impl LendingService {
    pub fn new(repository: Repository, email: EmailService) -> Self {
        Self { repository, email }
    }

    /// Borrow a book for the authenticated caller.
    ///
    /// Owners cannot borrow their own books, and the requested return date
    /// must lie in the future. Availability itself is enforced atomically by
    /// the repository; a racing duplicate request gets Conflict.
    pub async fn borrow(
        &self,
        claims: &UserClaims,
        request: CreateBorrow,
    ) -> AppResult<BorrowTransaction> {
        if request.due_date <= Utc::now() {
            return Err(AppError::Validation(
                "Return date must be in the future".to_string(),
            ));
        }

        let book = self.repository.books.get_by_id(request.book_id).await?;

        if book.owner_id == claims.user_id {
            return Err(AppError::Authorization(
                "You cannot borrow your own book".to_string(),
            ));
        }

        self.repository
            .transactions
            .borrow(book.id, claims.user_id, book.owner_id, request.due_date)
            .await
    }

    /// Return a borrowed book.
    ///
    /// Only the borrower, the book owner or an admin may close a transaction.
    /// Notifications go out after the state transition has committed; a
    /// failed send is logged and never undoes the return.
    pub async fn return_borrow(
        &self,
        claims: &UserClaims,
        transaction_id: i32,
    ) -> AppResult<BorrowTransaction> {
        let transaction = self.repository.transactions.get_by_id(transaction_id).await?;

        if claims.user_id != transaction.borrower_id
            && claims.user_id != transaction.owner_id
            && !claims.is_admin()
        {
            return Err(AppError::Authorization(
                "Only the borrower or the book owner can return this book".to_string(),
            ));
        }

        let transaction = self
            .repository
            .transactions
            .return_transaction(transaction_id)
            .await?;

        self.notify_return(&transaction).await;

        Ok(transaction)
    }

    /// Transactions where the caller is the borrower
    pub async fn my_borrows(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        self.repository
            .transactions
            .get_for_borrower(user_id)
            .await
    }

    /// Best-effort return notifications to the owner and the borrower
    async fn notify_return(&self, transaction: &BorrowTransaction) {
        let (book, owner, borrower) = match tokio::try_join!(
            self.repository.books.get_by_id(transaction.book_id),
            self.repository.users.get_by_id(transaction.owner_id),
            self.repository.users.get_by_id(transaction.borrower_id),
        ) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(
                    transaction_id = transaction.id,
                    error = %e,
                    "Could not load details for return notifications"
                );
                return;
            }
        };

        if let Err(e) = self
            .email
            .send_return_notice(&owner.email, &book.title, &borrower.name)
            .await
        {
            tracing::warn!(
                transaction_id = transaction.id,
                recipient = %owner.email,
                error = %e,
                "Failed to notify owner of return"
            );
        }

        if let Err(e) = self
            .email
            .send_return_confirmation(&borrower.email, &book.title)
            .await
        {
            tracing::warn!(
                transaction_id = transaction.id,
                recipient = %borrower.email,
                error = %e,
                "Failed to send return confirmation to borrower"
            );
        }
    }
}
