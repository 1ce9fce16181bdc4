//! In-process store implementing every repository trait.
//!
//! All data lives behind one async mutex. A unit of work holds the lock for
//! its whole lifetime, so loans and returns are serialized; it edits a copy
//! of the state and publishes the copy on commit.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{BookRepository, LoanHistoryRepository, LoanUnitOfWork, UserRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook, NewLoanHistory, NewUser, User, UserLoanHistory, UserLoanStatus},
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    books: Vec<Book>,
    users: Vec<User>,
    histories: Vec<UserLoanHistory>,
    last_book_id: i32,
    last_user_id: i32,
    last_history_id: i32,
}

impl MemoryState {
    fn insert_book(&mut self, book: NewBook) -> Book {
        self.last_book_id += 1;
        let book = Book {
            id: self.last_book_id,
            name: book.name,
            book_type: book.book_type,
        };
        self.books.push(book.clone());
        book
    }

    fn user_by_name(&self, name: &str) -> Option<User> {
        self.users.iter().find(|u| u.name == name).cloned()
    }

    fn has_active_loan(&self, book_name: &str) -> bool {
        self.histories
            .iter()
            .any(|h| h.book_name == book_name && h.is_loaned())
    }

    fn insert_history(&mut self, history: NewLoanHistory) -> AppResult<UserLoanHistory> {
        if !self.users.iter().any(|u| u.id == history.user_id) {
            return Err(AppError::UserNotFound(format!(
                "User with id {} not found",
                history.user_id
            )));
        }
        if history.status == UserLoanStatus::Loaned && self.has_active_loan(&history.book_name) {
            return Err(AppError::book_already_loaned());
        }

        self.last_history_id += 1;
        let saved = UserLoanHistory {
            id: self.last_history_id,
            user_id: history.user_id,
            book_name: history.book_name,
            status: history.status,
        };
        self.histories.push(saved.clone());
        Ok(saved)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        Ok(self.state.lock().await.books.clone())
    }

    async fn save(&self, book: NewBook) -> AppResult<Book> {
        Ok(self.state.lock().await.insert_book(book))
    }

    async fn save_all(&self, books: Vec<NewBook>) -> AppResult<Vec<Book>> {
        let mut state = self.state.lock().await;
        Ok(books.into_iter().map(|b| state.insert_book(b)).collect())
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.state.lock().await.books.clear();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.state.lock().await.users.clone())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.user_by_name(name))
    }

    async fn save(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            name: user.name,
            age: user.age,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update_name(&self, id: i32, name: &str) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = name.to_string();
            u.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Ok(false);
        }
        state.histories.retain(|h| h.user_id != id);
        Ok(true)
    }

    async fn delete_all(&self) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.users.clear();
        state.histories.clear();
        Ok(())
    }
}

#[async_trait]
impl LoanHistoryRepository for MemoryStore {
    async fn find_all(&self) -> AppResult<Vec<UserLoanHistory>> {
        Ok(self.state.lock().await.histories.clone())
    }

    async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<UserLoanHistory>> {
        let state = self.state.lock().await;
        Ok(state
            .histories
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn save(&self, history: NewLoanHistory) -> AppResult<UserLoanHistory> {
        self.state.lock().await.insert_history(history)
    }

    async fn save_all(&self, histories: Vec<NewLoanHistory>) -> AppResult<Vec<UserLoanHistory>> {
        // all or nothing
        let mut state = self.state.lock().await;
        let mut working = state.clone();
        let saved = histories
            .into_iter()
            .map(|h| working.insert_history(h))
            .collect::<AppResult<Vec<_>>>()?;
        *state = working;
        Ok(saved)
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.state.lock().await.histories.clear();
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn LoanUnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            committed: false,
        }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    committed: bool,
}

impl MemoryUnitOfWork {
    fn ensure_open(&self) -> AppResult<()> {
        if self.committed {
            return Err(AppError::Internal("Unit of work already committed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LoanUnitOfWork for MemoryUnitOfWork {
    async fn book_exists(&mut self, name: &str) -> AppResult<bool> {
        self.ensure_open()?;
        Ok(self.working.books.iter().any(|b| b.name == name))
    }

    async fn find_user_by_name(&mut self, name: &str) -> AppResult<Option<User>> {
        self.ensure_open()?;
        Ok(self.working.user_by_name(name))
    }

    async fn exists_by_book_name_and_status(
        &mut self,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<bool> {
        self.ensure_open()?;
        Ok(self
            .working
            .histories
            .iter()
            .any(|h| h.book_name == book_name && h.status == status))
    }

    async fn find_by_user_and_book_name_and_status(
        &mut self,
        user_id: i32,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<Vec<UserLoanHistory>> {
        self.ensure_open()?;
        Ok(self
            .working
            .histories
            .iter()
            .filter(|h| h.user_id == user_id && h.book_name == book_name && h.status == status)
            .cloned()
            .collect())
    }

    async fn insert(&mut self, history: NewLoanHistory) -> AppResult<UserLoanHistory> {
        self.ensure_open()?;
        self.working.insert_history(history)
    }

    async fn update_status(&mut self, id: i32, status: UserLoanStatus) -> AppResult<()> {
        self.ensure_open()?;
        let history = self
            .working
            .histories
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Loan history with id {} not found", id)))?;
        history.status = status;
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.ensure_open()?;
        *self.guard = std::mem::take(&mut self.working);
        self.committed = true;
        Ok(())
    }
}
