//! Repository layer: store interfaces and their implementations.
//!
//! Services only see the traits below. Two backends implement them:
//! PostgreSQL (`books`, `users`, `loans`) and an in-process store (`memory`).

pub mod books;
pub mod loans;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Book, BookStat, NewBook, NewLoanHistory, NewUser, User, UserLoanHistory, UserLoanStatus,
    },
    services::stats,
};

/// Catalog store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All books, in no guaranteed order
    async fn find_all(&self) -> AppResult<Vec<Book>>;

    async fn save(&self, book: NewBook) -> AppResult<Book>;

    async fn save_all(&self, books: Vec<NewBook>) -> AppResult<Vec<Book>>;

    async fn delete_all(&self) -> AppResult<()>;

    /// Book counts grouped by type. Stores able to aggregate natively should override this.
    async fn count_by_type(&self) -> AppResult<Vec<BookStat>> {
        let books = self.find_all().await?;
        Ok(stats::group_by_type(&books))
    }
}

/// User store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// First user registered under `name`
    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>>;

    async fn save(&self, user: NewUser) -> AppResult<User>;

    /// Returns `None` when no user has this id
    async fn update_name(&self, id: i32, name: &str) -> AppResult<Option<User>>;

    /// Deletes the user and its loan history. Returns false when nothing was deleted.
    async fn delete(&self, id: i32) -> AppResult<bool>;

    async fn delete_all(&self) -> AppResult<()>;
}

/// Loan ledger store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanHistoryRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<UserLoanHistory>>;

    async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<UserLoanHistory>>;

    /// Fails with a conflict when saving a second active loan for the same book name
    async fn save(&self, history: NewLoanHistory) -> AppResult<UserLoanHistory>;

    async fn save_all(&self, histories: Vec<NewLoanHistory>) -> AppResult<Vec<UserLoanHistory>>;

    async fn delete_all(&self) -> AppResult<()>;

    async fn count_by_status(&self, status: UserLoanStatus) -> AppResult<i64> {
        let histories = self.find_all().await?;
        Ok(stats::count_with_status(&histories, status))
    }

    /// Open a unit of work for a loan or return
    async fn begin(&self) -> AppResult<Box<dyn LoanUnitOfWork>>;
}

/// Atomic read-modify-write scope over books, users and the ledger.
///
/// Nothing is visible to other callers until `commit`. Dropping the unit of
/// work without committing discards its writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoanUnitOfWork: Send {
    async fn book_exists(&mut self, name: &str) -> AppResult<bool>;

    async fn find_user_by_name(&mut self, name: &str) -> AppResult<Option<User>>;

    async fn exists_by_book_name_and_status(
        &mut self,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<bool>;

    async fn find_by_user_and_book_name_and_status(
        &mut self,
        user_id: i32,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<Vec<UserLoanHistory>>;

    async fn insert(&mut self, history: NewLoanHistory) -> AppResult<UserLoanHistory>;

    async fn update_status(&mut self, id: i32, status: UserLoanStatus) -> AppResult<()>;

    async fn commit(&mut self) -> AppResult<()>;
}

/// Store handles shared by all services
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
    pub users: Arc<dyn UserRepository>,
    pub loans: Arc<dyn LoanHistoryRepository>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBookRepository::new(pool.clone())),
            users: Arc::new(users::PgUserRepository::new(pool.clone())),
            loans: Arc::new(loans::PgLoanHistoryRepository::new(pool)),
        }
    }

    /// Create a repository kept entirely in process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::new();
        Self {
            books: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            loans: Arc::new(store),
        }
    }
}
