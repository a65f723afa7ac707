use async_graphql::{Context, Object, Result};

use crate::models::{
    book::{BookPage, BookQuery},
    report::{ActiveMember, BookAvailability, MostBorrowedBook},
    User,
};

use super::{identity, services, BorrowHistory, IntoGraphQL};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated caller
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        services(ctx)?.auth.me(identity(ctx)).await.into_gql()
    }

    async fn list_books(
        &self,
        ctx: &Context<'_>,
        page: Option<i64>,
        limit: Option<i64>,
        author: Option<String>,
        genre: Option<String>,
    ) -> Result<BookPage> {
        let query = BookQuery {
            page,
            limit,
            author,
            genre,
        };
        services(ctx)?
            .catalog
            .list_books(identity(ctx), &query)
            .await
            .into_gql()
    }

    /// The caller's loans, most recent first
    async fn borrow_history(&self, ctx: &Context<'_>) -> Result<Vec<BorrowHistory>> {
        let entries = services(ctx)?.borrows.history(identity(ctx)).await.into_gql()?;
        Ok(entries.into_iter().map(BorrowHistory).collect())
    }

    async fn most_borrowed_books(&self, ctx: &Context<'_>) -> Result<Vec<MostBorrowedBook>> {
        services(ctx)?
            .reports
            .most_borrowed_books(identity(ctx))
            .await
            .into_gql()
    }

    async fn active_members(&self, ctx: &Context<'_>) -> Result<Vec<ActiveMember>> {
        services(ctx)?.reports.active_members(identity(ctx)).await.into_gql()
    }

    async fn book_availability(&self, ctx: &Context<'_>) -> Result<BookAvailability> {
        services(ctx)?.reports.book_availability(identity(ctx)).await.into_gql()
    }
}
