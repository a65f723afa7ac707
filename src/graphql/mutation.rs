use async_graphql::{Context, MaybeUndefined, Object, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    book::{Book, CreateBook, UpdateBook},
    user::{AuthPayload, LoginUser, RegisterUser, Role},
};

use super::{identity, services, BorrowRecordNode, IntoGraphQL};

pub struct MutationRoot;

fn nullable<T>(value: MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(None),
        MaybeUndefined::Value(v) => Some(Some(v)),
    }
}

#[Object]
impl MutationRoot {
    async fn register_user(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        password: String,
        role: Option<Role>,
    ) -> Result<AuthPayload> {
        let request = RegisterUser {
            name,
            email,
            password,
            role,
        };
        services(ctx)?.auth.register(identity(ctx), request).await.into_gql()
    }

    async fn login_user(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AuthPayload> {
        services(ctx)?
            .auth
            .login(LoginUser { email, password })
            .await
            .into_gql()
    }

    /// Admin only
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        #[graphql(name = "ISBN")] isbn: String,
        publication_date: Option<NaiveDate>,
        genre: Option<String>,
        copies: Option<i32>,
    ) -> Result<Book> {
        let book = CreateBook {
            title,
            author,
            isbn,
            publication_date,
            genre,
            copies,
        };
        services(ctx)?.catalog.add_book(identity(ctx), book).await.into_gql()
    }

    /// Admin only; omitted arguments are left untouched, an explicit null
    /// clears `publicationDate` or `genre`
    async fn update_book(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        title: Option<String>,
        author: Option<String>,
        #[graphql(name = "ISBN")] isbn: Option<String>,
        publication_date: MaybeUndefined<NaiveDate>,
        genre: MaybeUndefined<String>,
        copies: Option<i32>,
    ) -> Result<Book> {
        let changes = UpdateBook {
            title,
            author,
            isbn,
            publication_date: nullable(publication_date),
            genre: nullable(genre),
            copies,
        };
        services(ctx)?
            .catalog
            .update_book(identity(ctx), id, changes)
            .await
            .into_gql()
    }

    /// Admin only
    async fn delete_book(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        services(ctx)?.catalog.delete_book(identity(ctx), id).await.into_gql()?;
        Ok("Book deleted successfully".to_string())
    }

    async fn borrow_book(&self, ctx: &Context<'_>, book_id: Uuid) -> Result<BorrowRecordNode> {
        let record = services(ctx)?.borrows.borrow(identity(ctx), book_id).await.into_gql()?;
        Ok(BorrowRecordNode(record))
    }

    async fn return_book(&self, ctx: &Context<'_>, book_id: Uuid) -> Result<BorrowRecordNode> {
        let record = services(ctx)?
            .borrows
            .return_book(identity(ctx), book_id)
            .await
            .into_gql()?;
        Ok(BorrowRecordNode(record))
    }
}
