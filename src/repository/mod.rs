//! Repository layer for persistence.
//!
//! Each store is an async trait so services can run against PostgreSQL in
//! production and against the in-memory store in tests.

pub mod books;
pub mod borrows;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookFilter, CreateBook, UpdateBook},
        borrow::{BorrowHistoryEntry, BorrowRecord},
        report::{ActiveMember, MostBorrowedBook},
        user::{NewUser, User},
    },
};

/// Book catalog persistence
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    /// Returns None when the book does not exist
    async fn update(&self, id: Uuid, changes: &UpdateBook) -> AppResult<Option<Book>>;

    /// Returns false when the book does not exist
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// One page of matching books plus the total number of matches
    async fn list(&self, filter: &BookFilter, offset: i64, limit: i64) -> AppResult<(Vec<Book>, i64)>;

    async fn count(&self) -> AppResult<i64>;
}

/// User account persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Case-insensitive lookup
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Outcome of trying to take a copy off the shelf
#[derive(Debug)]
pub enum LoanOpening {
    Opened(BorrowRecord),
    NoCopies,
    NoSuchBook,
}

/// Borrow ledger persistence.
///
/// `open` and `close_latest` touch both the ledger and the book's copy count
/// and must do so atomically.
#[async_trait]
pub trait BorrowLedger: Send + Sync {
    /// Decrement the book's copies if any are left and record the loan.
    /// Writes nothing when the book is missing or has no copy left.
    async fn open(&self, user_id: Uuid, book_id: Uuid) -> AppResult<LoanOpening>;

    /// Close the most recent open loan of (user, book) and put the copy back.
    /// Returns None when there is no open loan.
    async fn close_latest(&self, user_id: Uuid, book_id: Uuid) -> AppResult<Option<BorrowRecord>>;

    /// Every loan of a user, most recent first
    async fn history(&self, user_id: Uuid) -> AppResult<Vec<BorrowHistoryEntry>>;

    async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<MostBorrowedBook>>;

    async fn most_active_members(&self, limit: i64) -> AppResult<Vec<ActiveMember>>;

    async fn count_open(&self) -> AppResult<i64>;
}

/// Storage handles injected into the services
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
    pub borrows: Arc<dyn BorrowLedger>,
}

impl Repository {
    /// PostgreSQL-backed repository
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            borrows: Arc::new(borrows::BorrowsRepository::new(pool)),
        }
    }

    /// Volatile repository sharing one in-process store
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            books: store.clone(),
            users: store.clone(),
            borrows: store,
        }
    }
}
