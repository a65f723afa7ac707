//! Report rows

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Number of rows in the ranking reports
pub const REPORT_TOP_N: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema, async_graphql::SimpleObject)]
pub struct MostBorrowedBook {
    pub title: String,
    pub author: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema, async_graphql::SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMember {
    pub name: String,
    pub email: String,
    pub total_borrows: i64,
}

/// Inventory summary.
///
/// `available_books` is the book count minus the open loan count, i.e. copies
/// outstanding rather than distinct unavailable titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, async_graphql::SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(name = "BookAvailabilitySummary")]
pub struct BookAvailability {
    pub total_books: i64,
    pub total_borrowed: i64,
    pub available_books: i64,
}

impl BookAvailability {
    pub fn new(total_books: i64, total_borrowed: i64) -> Self {
        Self {
            total_books,
            total_borrowed,
            available_books: total_books - total_borrowed,
        }
    }
}
