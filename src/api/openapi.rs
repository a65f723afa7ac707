//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, reports};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nalanda API",
        version = "1.0.0",
        description = "Library management REST API"
    ),
    servers(
        (url = "/api", description = "REST API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrowing
        borrows::borrow_book,
        borrows::return_book,
        borrows::history,
        // Reports
        reports::most_borrowed,
        reports::active_members,
        reports::availability,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::RegisterUser,
            crate::models::user::LoginUser,
            crate::models::user::AuthPayload,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookPage,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::MessageResponse,
            // Borrowing
            crate::models::borrow::BorrowRecord,
            crate::models::borrow::BorrowHistoryEntry,
            crate::models::borrow::BorrowRequest,
            // Reports
            crate::models::report::MostBorrowedBook,
            crate::models::report::ActiveMember,
            crate::models::report::BookAvailability,
            reports::MostBorrowedResponse,
            reports::ActiveMembersResponse,
            reports::AvailabilityResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "books", description = "Book catalog"),
        (name = "borrow", description = "Borrowing and returning"),
        (name = "reports", description = "Admin reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/auth/register",
            "/books",
            "/books/{id}",
            "/borrow",
            "/borrow/return",
            "/borrow/history",
            "/reports/availability",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
