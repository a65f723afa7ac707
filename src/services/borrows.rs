//! Borrow / return service.
//!
//! Every borrow takes one copy off the book and every return puts it back, so
//! a book's `copies` always equals its initial stock minus its open loans.
//! The check-and-mutate itself happens atomically inside the ledger.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowHistoryEntry, BorrowRecord},
        Identity,
    },
    repository::{LoanOpening, Repository},
};

const NO_COPIES: &str = "No copies available";

#[derive(Clone)]
pub struct BorrowService {
    repository: Repository,
}

impl BorrowService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow one copy of a book for the caller
    pub async fn borrow(&self, identity: &Identity, book_id: Uuid) -> AppResult<BorrowRecord> {
        let user_id = identity.require_user()?;

        let record = match self.repository.borrows.open(user_id, book_id).await? {
            LoanOpening::Opened(record) => record,
            LoanOpening::NoCopies => {
                tracing::info!(%user_id, %book_id, "No copy left to borrow");
                return Err(AppError::InvalidState(NO_COPIES.to_string()));
            }
            LoanOpening::NoSuchBook => return Err(AppError::NotFound("Book not found".to_string())),
        };

        tracing::info!(%user_id, %book_id, borrow_id = %record.id, "Book borrowed");

        Ok(record)
    }

    /// Return the caller's most recent open loan of a book
    pub async fn return_book(&self, identity: &Identity, book_id: Uuid) -> AppResult<BorrowRecord> {
        let user_id = identity.require_user()?;

        let record = self
            .repository
            .borrows
            .close_latest(user_id, book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))?;

        tracing::info!(%user_id, %book_id, borrow_id = %record.id, "Book returned");

        Ok(record)
    }

    /// The caller's loans, most recent first
    pub async fn history(&self, identity: &Identity) -> AppResult<Vec<BorrowHistoryEntry>> {
        let user_id = identity.require_user()?;
        self.repository.borrows.history(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::user::Role, services::test_support};

    async fn copies(repository: &Repository, book_id: Uuid) -> i32 {
        repository.books.get_by_id(book_id).await.unwrap().unwrap().copies
    }

    #[tokio::test]
    async fn test_borrow_then_return_restores_copies() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 2).await;

        let record = services.borrows.borrow(&alice, book.id).await.unwrap();
        assert!(record.is_open());
        assert_eq!(copies(&repository, book.id).await, 1);

        let returned = services.borrows.return_book(&alice, book.id).await.unwrap();
        assert_eq!(returned.id, record.id);
        assert!(returned.returned_at.is_some());
        assert_eq!(copies(&repository, book.id).await, 2);
    }

    #[tokio::test]
    async fn test_borrow_without_copies_creates_no_record() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 0).await;

        let result = services.borrows.borrow(&alice, book.id).await;
        assert!(matches!(result, Err(AppError::InvalidState(ref m)) if m == NO_COPIES));
        assert_eq!(copies(&repository, book.id).await, 0);
        assert!(services.borrows.history(&alice).await.unwrap().is_empty());
        assert_eq!(repository.borrows.count_open().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_borrow_unknown_book_is_not_found() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;

        assert!(matches!(
            services.borrows.borrow(&alice, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_borrow_deleted_book_is_not_found() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 3).await;
        repository.books.delete(book.id).await.unwrap();

        let result = services.borrows.borrow(&alice, book.id).await;
        assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == "Book not found"));
        assert_eq!(repository.borrows.count_open().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_return_without_open_loan_is_not_found() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let bob = test_support::user(&repository, "Bob", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 1).await;

        assert!(matches!(
            services.borrows.return_book(&alice, book.id).await,
            Err(AppError::NotFound(_))
        ));

        // Someone else's loan does not count
        services.borrows.borrow(&bob, book.id).await.unwrap();
        assert!(matches!(
            services.borrows.return_book(&alice, book.id).await,
            Err(AppError::NotFound(_))
        ));

        // Nor does an already returned one
        services.borrows.return_book(&bob, book.id).await.unwrap();
        assert!(matches!(
            services.borrows.return_book(&bob, book.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(copies(&repository, book.id).await, 1);
    }

    #[tokio::test]
    async fn test_return_closes_most_recent_loan_first() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 2).await;

        let first = services.borrows.borrow(&alice, book.id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = services.borrows.borrow(&alice, book.id).await.unwrap();

        let returned = services.borrows.return_book(&alice, book.id).await.unwrap();
        assert_eq!(returned.id, second.id);

        let history = services.borrows.history(&alice).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert!(history[0].returned_at.is_some());
        assert_eq!(history[1].id, first.id);
        assert!(history[1].returned_at.is_none());
        assert_eq!(history[1].book.as_ref().unwrap().title, "Dune");
    }

    #[tokio::test]
    async fn test_scenario_last_copy() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let carol = test_support::user(&repository, "Carol", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 1).await;

        services.borrows.borrow(&alice, book.id).await.unwrap();
        assert_eq!(copies(&repository, book.id).await, 0);

        assert!(matches!(
            services.borrows.borrow(&carol, book.id).await,
            Err(AppError::InvalidState(_))
        ));

        services.borrows.return_book(&alice, book.id).await.unwrap();
        assert_eq!(copies(&repository, book.id).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_borrows_of_last_copy() {
        let (services, repository) = test_support::services();
        let book_id = test_support::book(&repository, "Dune", 1).await.id;

        let mut handles = Vec::new();
        for i in 0..16 {
            let identity = test_support::user(&repository, &format!("Reader{}", i), Role::Member).await;
            let services = services.clone();
            handles.push(tokio::spawn(async move { services.borrows.borrow(&identity, book_id).await }));
        }

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, AppError::InvalidState(_))),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(copies(&repository, book_id).await, 0);
        assert_eq!(repository.borrows.count_open().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_history_keeps_loans_of_deleted_books() {
        let (services, repository) = test_support::services();
        let alice = test_support::user(&repository, "Alice", Role::Member).await;
        let book = test_support::book(&repository, "Dune", 1).await;

        services.borrows.borrow(&alice, book.id).await.unwrap();
        repository.books.delete(book.id).await.unwrap();

        let history = services.borrows.history(&alice).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].book.is_none());

        // Returning still closes the record
        let returned = services.borrows.return_book(&alice, book.id).await.unwrap();
        assert!(returned.returned_at.is_some());
    }

    #[tokio::test]
    async fn test_anonymous_cannot_borrow() {
        let (services, repository) = test_support::services();
        let book = test_support::book(&repository, "Dune", 1).await;

        assert!(matches!(
            services.borrows.borrow(&Identity::Anonymous, book.id).await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            services.borrows.history(&Identity::Anonymous).await,
            Err(AppError::Authentication(_))
        ));
    }
}
