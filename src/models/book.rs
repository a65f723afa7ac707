//! Book (catalog entry) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

pub const DEFAULT_COPIES: i32 = 1;
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, async_graphql::SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(rename = "ISBN")]
    #[graphql(name = "ISBN")]
    pub isbn: String,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    /// Copies currently on the shelf
    pub copies: i32,
    pub created_at: DateTime<Utc>,
}

/// Title and author only, attached to history entries
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[serde(rename = "ISBN")]
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: Option<i32>,
}

/// Partial update; absent fields are left untouched.
///
/// `publicationDate` and `genre` are nullable: an explicit `null` clears them.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    #[serde(rename = "ISBN")]
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>, nullable)]
    pub publication_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub genre: Option<Option<String>>,
    #[validate(range(min = 0, message = "Copies cannot be negative"))]
    pub copies: Option<i32>,
}

impl UpdateBook {
    /// Merge the present fields into `book`
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(ref title) = self.title {
            book.title = title.clone();
        }
        if let Some(ref author) = self.author {
            book.author = author.clone();
        }
        if let Some(ref isbn) = self.isbn {
            book.isbn = isbn.clone();
        }
        if let Some(publication_date) = self.publication_date {
            book.publication_date = publication_date;
        }
        if let Some(ref genre) = self.genre {
            book.genre = genre.clone();
        }
        if let Some(copies) = self.copies {
            book.copies = copies;
        }
    }
}

/// Book list query parameters
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// 1-based page number (default: 1)
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<i64>,
    /// Books per page (default: 10)
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,
    /// Exact author match
    pub author: Option<String>,
    /// Exact genre match
    pub genre: Option<String>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Rows to skip, rejecting pages too far out to address
    pub fn offset(&self) -> AppResult<i64> {
        self.page()
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(self.limit()))
            .ok_or_else(|| AppError::Validation("Page out of range".to_string()))
    }
}

/// Equality filters for listing
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        self.author.as_ref().map_or(true, |a| &book.author == a)
            && self
                .genre
                .as_ref()
                .map_or(true, |g| book.genre.as_ref() == Some(g))
    }
}

impl From<&BookQuery> for BookFilter {
    fn from(query: &BookQuery) -> Self {
        Self {
            author: query.author.clone(),
            genre: query.genre.clone(),
        }
    }
}

/// One page of books
#[derive(Debug, Clone, Serialize, ToSchema, async_graphql::SimpleObject)]
#[graphql(name = "BookList")]
pub struct BookPage {
    pub total: i64,
    pub page: i64,
    pub books: Vec<Book>,
}
