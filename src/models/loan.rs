//! Loan history model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::UserLoanStatus;
use crate::error::{AppError, AppResult};

/// One loan of a book by a user.
///
/// Loans reference books by name rather than by id: a loan does not pin a
/// specific physical copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLoanHistory {
    pub id: i32,
    pub user_id: i32,
    pub book_name: String,
    pub status: UserLoanStatus,
}

impl UserLoanHistory {
    pub fn is_loaned(&self) -> bool {
        self.status == UserLoanStatus::Loaned
    }

    /// Mark the loan as returned. Only an active loan can be returned.
    pub fn do_return(&mut self) -> AppResult<()> {
        match self.status {
            UserLoanStatus::Loaned => {
                self.status = UserLoanStatus::Returned;
                Ok(())
            }
            UserLoanStatus::Returned => Err(AppError::Conflict(format!(
                "Loan {} of '{}' is already returned",
                self.id, self.book_name
            ))),
        }
    }
}

/// Loan record not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoanHistory {
    pub user_id: i32,
    pub book_name: String,
    pub status: UserLoanStatus,
}

impl NewLoanHistory {
    /// A fresh active loan
    pub fn loaned(user_id: i32, book_name: impl Into<String>) -> Self {
        Self {
            user_id,
            book_name: book_name.into(),
            status: UserLoanStatus::Loaned,
        }
    }

    /// Used when importing historical records
    pub fn with_status(mut self, status: UserLoanStatus) -> Self {
        self.status = status;
        self
    }
}

/// Book entry in a user's loan history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookHistoryView {
    pub name: String,
    pub is_return: bool,
}

/// A user with every book they have borrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserLoanHistoryView {
    pub name: String,
    pub books: Vec<BookHistoryView>,
}

impl From<&UserLoanHistory> for BookHistoryView {
    fn from(history: &UserLoanHistory) -> Self {
        Self {
            name: history.book_name.clone(),
            is_return: history.status == UserLoanStatus::Returned,
        }
    }
}
