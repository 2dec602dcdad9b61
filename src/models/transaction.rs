//! Borrow transaction model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

use super::{book::BookSummary, user::UserSummary};

/// Status of a borrow transaction. The only transition is
/// `borrowed -> returned`; a returned transaction is immutable. Overdue is
/// not stored, it is computed on read from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Borrowed,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Borrowed => "borrowed",
            TransactionStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for TransactionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for TransactionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for TransactionStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Borrow transaction model from database. Transactions are an audit trail:
/// never deleted, new borrow cycles create new records.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowTransaction {
    pub id: i32,
    pub book_id: i32,
    pub borrower_id: i32,
    /// Book owner at the time of borrowing (denormalized for queries)
    pub owner_id: i32,
    pub borrow_date: DateTime<Utc>,
    /// Return date requested by the borrower
    pub due_date: DateTime<Utc>,
    /// Set exactly once, on the return transition
    pub returned_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowTransaction {
    /// An open transaction is overdue once its due date has passed.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TransactionStatus::Borrowed && self.due_date < now
    }
}

/// Borrow transaction with book and owner summaries for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowDetails {
    pub id: i32,
    pub book: BookSummary,
    pub owner: UserSummary,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub is_overdue: bool,
}

/// Create borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub book_id: i32,
    /// Requested return date, must be in the future
    pub due_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn transaction(status: TransactionStatus, due_offset: Duration) -> BorrowTransaction {
        let now = Utc::now();
        BorrowTransaction {
            id: 1,
            book_id: 1,
            borrower_id: 2,
            owner_id: 3,
            borrow_date: now - Duration::days(7),
            due_date: now + due_offset,
            returned_date: None,
            status,
            created_at: now - Duration::days(7),
            updated_at: now - Duration::days(7),
        }
    }

    #[test]
    fn status_parsing() {
        assert_eq!(
            "borrowed".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Borrowed
        );
        assert_eq!(
            "Returned".parse::<TransactionStatus>().unwrap(),
            TransactionStatus::Returned
        );
        assert!("overdue".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn open_transaction_past_due_is_overdue() {
        let t = transaction(TransactionStatus::Borrowed, Duration::days(-1));
        assert!(t.is_overdue_at(Utc::now()));
    }

    #[test]
    fn open_transaction_before_due_is_not_overdue() {
        let t = transaction(TransactionStatus::Borrowed, Duration::days(14));
        assert!(!t.is_overdue_at(Utc::now()));
    }

    #[test]
    fn returned_transaction_is_never_overdue() {
        let t = transaction(TransactionStatus::Returned, Duration::days(-30));
        assert!(!t.is_overdue_at(Utc::now()));
    }
}
