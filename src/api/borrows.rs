//! Borrow and return endpoints

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrow::{BorrowHistoryEntry, BorrowRecord, BorrowRequest},
    AppState,
};

use super::{extract::AppJson, AuthenticatedUser};

fn required_book_id(request: &BorrowRequest) -> AppResult<Uuid> {
    request
        .book_id
        .ok_or_else(|| AppError::Validation("Book ID is required".to_string()))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Missing book ID or no copies available", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(request): AppJson<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let book_id = required_book_id(&request)?;
    let record = state.services.borrows.borrow(&identity, book_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrow/return",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 400, description = "Missing book ID", body = crate::error::ErrorResponse),
        (status = 404, description = "No open loan for this book", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    AppJson(request): AppJson<BorrowRequest>,
) -> AppResult<Json<BorrowRecord>> {
    let book_id = required_book_id(&request)?;
    let record = state.services.borrows.return_book(&identity, book_id).await?;
    Ok(Json(record))
}

/// The caller's borrow history, most recent first
#[utoipa::path(
    get,
    path = "/borrow/history",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow history", body = Vec<BorrowHistoryEntry>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn history(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowHistoryEntry>>> {
    let entries = state.services.borrows.history(&identity).await?;
    Ok(Json(entries))
}
