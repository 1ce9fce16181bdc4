//! API handlers for the library REST endpoints

pub mod books;
pub mod health;
pub mod openapi;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/book", post(books::save_book))
        .route("/book/loan", post(books::loan_book).get(books::count_loaned_book))
        .route("/book/return", put(books::return_book))
        .route("/book/stat", get(books::get_book_statistics))
        // Users
        .route(
            "/user",
            post(users::save_user)
                .get(users::get_users)
                .put(users::update_user_name)
                .delete(users::delete_user),
        )
        .route("/user/loan", get(users::get_user_loan_histories))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
