//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library App API",
        version = "0.1.0",
        description = "Book inventory and loan tracking REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::save_book,
        books::loan_book,
        books::return_book,
        books::count_loaned_book,
        books::get_book_statistics,
        // Users
        users::save_user,
        users::get_users,
        users::update_user_name,
        users::delete_user,
        users::get_user_loan_histories,
    ),
    components(
        schemas(
            // Books
            crate::models::Book,
            crate::models::BookRequest,
            crate::models::BookLoanRequest,
            crate::models::BookStat,
            crate::models::BookType,
            // Users
            crate::models::User,
            crate::models::UserCreateRequest,
            crate::models::UserUpdateRequest,
            crate::models::UserLoanHistoryView,
            crate::models::BookHistoryView,
            crate::models::UserLoanStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog, loans and statistics"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
