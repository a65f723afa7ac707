//! Admin report endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::report::{ActiveMember, BookAvailability, MostBorrowedBook},
    AppState,
};

use super::AdminUser;

#[derive(Serialize, ToSchema)]
pub struct MostBorrowedResponse {
    pub message: String,
    pub data: Vec<MostBorrowedBook>,
}

#[derive(Serialize, ToSchema)]
pub struct ActiveMembersResponse {
    pub message: String,
    pub data: Vec<ActiveMember>,
}

#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub message: String,
    pub summary: BookAvailability,
}

/// Top five books by number of loans
#[utoipa::path(
    get,
    path = "/reports/most-borrowed",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most borrowed books", body = MostBorrowedResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn most_borrowed(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
) -> AppResult<Json<MostBorrowedResponse>> {
    let data = state.services.reports.most_borrowed_books(&identity).await?;
    Ok(Json(MostBorrowedResponse {
        message: "Most Borrowed Books".to_string(),
        data,
    }))
}

/// Top five members by number of loans
#[utoipa::path(
    get,
    path = "/reports/active-members",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most active members", body = ActiveMembersResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn active_members(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
) -> AppResult<Json<ActiveMembersResponse>> {
    let data = state.services.reports.active_members(&identity).await?;
    Ok(Json(ActiveMembersResponse {
        message: "Most Active Members".to_string(),
        data,
    }))
}

/// Book count against open loans
#[utoipa::path(
    get,
    path = "/reports/availability",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Availability summary", body = AvailabilityResponse),
        (status = 403, description = "Admin access required", body = crate::error::ErrorResponse)
    )
)]
pub async fn availability(
    State(state): State<AppState>,
    AdminUser(identity): AdminUser,
) -> AppResult<Json<AvailabilityResponse>> {
    let summary = state.services.reports.book_availability(&identity).await?;
    Ok(Json(AvailabilityResponse {
        message: "Book Availability Summary".to_string(),
        summary,
    }))
}
