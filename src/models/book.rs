//! Book (catalog entry) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::BookType;
use crate::error::{AppError, AppResult};

/// Registered book. Several books may share a name (copies of one title).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub book_type: BookType,
}

/// Book not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub book_type: BookType,
}

impl NewBook {
    pub fn new(name: impl Into<String>, book_type: BookType) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation("Book name must not be empty".to_string()));
        }
        Ok(Self { name, book_type })
    }
}

/// Register book request. `type` is checked against the known book types.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookRequest {
    #[validate(length(min = 1, message = "Book name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "COMPUTER")]
    pub book_type: String,
}

/// Loan or return request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookLoanRequest {
    #[validate(length(min = 1, message = "User name is required"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "Book name is required"))]
    pub book_name: String,
}

impl BookLoanRequest {
    pub fn new(user_name: impl Into<String>, book_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            book_name: book_name.into(),
        }
    }
}

/// Number of books registered in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookStat {
    #[serde(rename = "type")]
    pub book_type: BookType,
    pub count: i64,
}
