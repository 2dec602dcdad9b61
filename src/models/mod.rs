//! Data models for BookShare

pub mod book;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookStatus, BookSummary};
pub use transaction::{BorrowDetails, BorrowTransaction, TransactionStatus};
pub use user::{User, UserSummary};
