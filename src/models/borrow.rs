//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::BookSummary;

/// Borrow record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    /// Absent while the loan is open
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn open(user_id: Uuid, book_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            borrowed_at: Utc::now(),
            returned_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Borrow record joined with its book, for history listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowHistoryEntry {
    pub id: Uuid,
    pub book_id: Uuid,
    /// None when the book has been deleted since
    pub book: Option<BookSummary>,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Borrow / return request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: Option<Uuid>,
}
