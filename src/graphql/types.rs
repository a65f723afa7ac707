//! Object types whose fields resolve related records

use async_graphql::{Context, Object, Result, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{BorrowHistoryEntry, BorrowRecord},
        User,
    },
};

use super::{identity, services, IntoGraphQL};

/// Missing related records resolve to null
fn optional<T>(result: AppResult<T>) -> AppResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AppError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn lookup_book(ctx: &Context<'_>, book_id: Uuid) -> Result<Option<Book>> {
    let result = services(ctx)?.catalog.get_book(identity(ctx), book_id).await;
    optional(result).into_gql()
}

pub struct BorrowRecordNode(pub BorrowRecord);

#[Object(name = "BorrowRecord")]
impl BorrowRecordNode {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn user_id(&self) -> Uuid {
        self.0.user_id
    }

    async fn book_id(&self) -> Uuid {
        self.0.book_id
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let result = services(ctx)?.auth.get_user(identity(ctx), self.0.user_id).await;
        optional(result).into_gql()
    }

    /// Null once the book has been deleted
    async fn book(&self, ctx: &Context<'_>) -> Result<Option<Book>> {
        lookup_book(ctx, self.0.book_id).await
    }

    async fn borrowed_at(&self) -> DateTime<Utc> {
        self.0.borrowed_at
    }

    async fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.0.returned_at
    }
}

pub struct BorrowHistory(pub BorrowHistoryEntry);

#[Object]
impl BorrowHistory {
    async fn id(&self) -> ID {
        ID(self.0.id.to_string())
    }

    async fn book_id(&self) -> Uuid {
        self.0.book_id
    }

    async fn book(&self, ctx: &Context<'_>) -> Result<Option<Book>> {
        if self.0.book.is_none() {
            return Ok(None);
        }
        lookup_book(ctx, self.0.book_id).await
    }

    async fn borrowed_at(&self) -> DateTime<Utc> {
        self.0.borrowed_at
    }

    async fn returned_at(&self) -> Option<DateTime<Utc>> {
        self.0.returned_at
    }
}
