//! Data models for the library

pub mod book;
pub mod enums;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookLoanRequest, BookRequest, BookStat, NewBook};
pub use enums::{BookType, UserLoanStatus};
pub use loan::{BookHistoryView, NewLoanHistory, UserLoanHistory, UserLoanHistoryView};
pub use user::{NewUser, User, UserCreateRequest, UserDeleteQuery, UserUpdateRequest};
