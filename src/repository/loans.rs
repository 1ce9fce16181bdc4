//! Loan history repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use super::{LoanHistoryRepository, LoanUnitOfWork};
use crate::{
    error::{AppError, AppResult},
    models::{NewLoanHistory, User, UserLoanHistory, UserLoanStatus},
};

const INSERT_HISTORY: &str = r#"
    INSERT INTO user_loan_histories (user_id, book_name, status)
    VALUES ($1, $2, $3)
    RETURNING id, user_id, book_name, status
"#;

#[derive(Clone)]
pub struct PgLoanHistoryRepository {
    pool: Pool<Postgres>,
}

impl PgLoanHistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanHistoryRepository for PgLoanHistoryRepository {
    async fn find_all(&self) -> AppResult<Vec<UserLoanHistory>> {
        let histories = sqlx::query_as::<_, UserLoanHistory>(
            "SELECT id, user_id, book_name, status FROM user_loan_histories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(histories)
    }

    async fn find_by_user(&self, user_id: i32) -> AppResult<Vec<UserLoanHistory>> {
        let histories = sqlx::query_as::<_, UserLoanHistory>(
            r#"
            SELECT id, user_id, book_name, status
            FROM user_loan_histories
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(histories)
    }

    async fn save(&self, history: NewLoanHistory) -> AppResult<UserLoanHistory> {
        sqlx::query_as::<_, UserLoanHistory>(INSERT_HISTORY)
            .bind(history.user_id)
            .bind(&history.book_name)
            .bind(history.status)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from_loan_insert)
    }

    async fn save_all(&self, histories: Vec<NewLoanHistory>) -> AppResult<Vec<UserLoanHistory>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(histories.len());
        for history in histories {
            let row = sqlx::query_as::<_, UserLoanHistory>(INSERT_HISTORY)
                .bind(history.user_id)
                .bind(&history.book_name)
                .bind(history.status)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::from_loan_insert)?;
            saved.push(row);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_all(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM user_loan_histories")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_by_status(&self, status: UserLoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_loan_histories WHERE status = $1",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn begin(&self) -> AppResult<Box<dyn LoanUnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLoanUnitOfWork { tx: Some(tx) }))
    }
}

/// Unit of work backed by a database transaction.
///
/// Two concurrent loans of the same book name cannot both commit: the partial
/// unique index on active loans rejects the second insert, which surfaces as
/// the usual "already on loan" conflict.
pub struct PgLoanUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgLoanUnitOfWork {
    fn tx(&mut self) -> AppResult<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::Internal("Unit of work already committed".to_string()))
    }
}

#[async_trait]
impl LoanUnitOfWork for PgLoanUnitOfWork {
    async fn book_exists(&mut self, name: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut **self.tx()?)
            .await?;
        Ok(exists)
    }

    async fn find_user_by_name(&mut self, name: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, age FROM users WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut **self.tx()?)
        .await?;
        Ok(user)
    }

    async fn exists_by_book_name_and_status(
        &mut self,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_loan_histories WHERE book_name = $1 AND status = $2)",
        )
        .bind(book_name)
        .bind(status)
        .fetch_one(&mut **self.tx()?)
        .await?;
        Ok(exists)
    }

    async fn find_by_user_and_book_name_and_status(
        &mut self,
        user_id: i32,
        book_name: &str,
        status: UserLoanStatus,
    ) -> AppResult<Vec<UserLoanHistory>> {
        // Row locks keep a concurrent return from flipping the same record
        let histories = sqlx::query_as::<_, UserLoanHistory>(
            r#"
            SELECT id, user_id, book_name, status
            FROM user_loan_histories
            WHERE user_id = $1 AND book_name = $2 AND status = $3
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(book_name)
        .bind(status)
        .fetch_all(&mut **self.tx()?)
        .await?;
        Ok(histories)
    }

    async fn insert(&mut self, history: NewLoanHistory) -> AppResult<UserLoanHistory> {
        sqlx::query_as::<_, UserLoanHistory>(INSERT_HISTORY)
            .bind(history.user_id)
            .bind(&history.book_name)
            .bind(history.status)
            .fetch_one(&mut **self.tx()?)
            .await
            .map_err(AppError::from_loan_insert)
    }

    async fn update_status(&mut self, id: i32, status: UserLoanStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE user_loan_histories SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&mut **self.tx()?)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loan history with id {} not found", id)));
        }
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(AppError::Internal("Unit of work already committed".to_string())),
        }
    }
}
