//! Book catalog endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, BookPage, BookQuery, CreateBook, UpdateBook},
    AppState,
};

use super::{
    extract::{AppJson, AppPath, AppQuery},
    AdminUser, AuthenticatedUser,
};

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List books with optional author/genre filters
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "One page of books", body = BookPage),
        (status = 400, description = "Invalid pagination", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppQuery(query): AppQuery<BookQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.catalog.list_books(&identity, &query).await?;
    Ok(Json(page))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(&identity, id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
    AppJson(book): AppJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.catalog.add_book(&identity, book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(changes): AppJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let updated = state.services.catalog.update_book(&identity, id, changes).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog.delete_book(&identity, id).await?;
    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}
