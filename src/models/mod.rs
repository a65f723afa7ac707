//! Data models for Nalanda

pub mod book;
pub mod borrow;
pub mod identity;
pub mod report;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookPage, BookQuery, BookSummary, CreateBook, UpdateBook};
pub use borrow::{BorrowHistoryEntry, BorrowRecord};
pub use identity::Identity;
pub use report::{ActiveMember, BookAvailability, MostBorrowedBook};
pub use user::{AuthPayload, Role, User};
