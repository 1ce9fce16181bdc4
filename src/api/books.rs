//! Book and loan endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Book, BookLoanRequest, BookRequest, BookStat},
    AppState,
};

/// Register a book
#[utoipa::path(
    post,
    path = "/book",
    tag = "books",
    request_body = BookRequest,
    responses(
        (status = 201, description = "Book registered", body = Book),
        (status = 400, description = "Empty name or unknown type", body = crate::error::ErrorResponse)
    )
)]
pub async fn save_book(
    State(state): State<AppState>,
    Json(request): Json<BookRequest>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.save_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Loan a book to a user
#[utoipa::path(
    post,
    path = "/book/loan",
    tag = "books",
    request_body = BookLoanRequest,
    responses(
        (status = 200, description = "Book loaned"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book or user not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn loan_book(
    State(state): State<AppState>,
    Json(request): Json<BookLoanRequest>,
) -> AppResult<StatusCode> {
    state.services.books.loan_book(request).await?;
    Ok(StatusCode::OK)
}

/// Return a loaned book
#[utoipa::path(
    put,
    path = "/book/return",
    tag = "books",
    request_body = BookLoanRequest,
    responses(
        (status = 200, description = "Book returned"),
        (status = 404, description = "User or active loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    Json(request): Json<BookLoanRequest>,
) -> AppResult<StatusCode> {
    state.services.books.return_book(request).await?;
    Ok(StatusCode::OK)
}

/// Number of books currently on loan
#[utoipa::path(
    get,
    path = "/book/loan",
    tag = "books",
    responses(
        (status = 200, description = "Active loan count", body = i64)
    )
)]
pub async fn count_loaned_book(State(state): State<AppState>) -> AppResult<Json<i64>> {
    Ok(Json(state.services.books.count_loaned_book().await?))
}

/// Number of books per type
#[utoipa::path(
    get,
    path = "/book/stat",
    tag = "books",
    responses(
        (status = 200, description = "Book counts per type", body = Vec<BookStat>)
    )
)]
pub async fn get_book_statistics(State(state): State<AppState>) -> AppResult<Json<Vec<BookStat>>> {
    Ok(Json(state.services.books.get_book_statistics().await?))
}
