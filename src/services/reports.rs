//! Admin reports service

use crate::{
    error::AppResult,
    models::{
        report::{ActiveMember, BookAvailability, MostBorrowedBook, REPORT_TOP_N},
        Identity,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReportService {
    repository: Repository,
}

impl ReportService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Top books by number of borrow records, returned or not
    pub async fn most_borrowed_books(&self, identity: &Identity) -> AppResult<Vec<MostBorrowedBook>> {
        identity.require_admin()?;
        self.repository.borrows.most_borrowed(REPORT_TOP_N).await
    }

    /// Top users by number of borrow records
    pub async fn active_members(&self, identity: &Identity) -> AppResult<Vec<ActiveMember>> {
        identity.require_admin()?;
        self.repository.borrows.most_active_members(REPORT_TOP_N).await
    }

    pub async fn book_availability(&self, identity: &Identity) -> AppResult<BookAvailability> {
        identity.require_admin()?;
        let total_books = self.repository.books.count().await?;
        let total_borrowed = self.repository.borrows.count_open().await?;
        Ok(BookAvailability::new(total_books, total_borrowed))
    }
}
