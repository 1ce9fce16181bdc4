//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BookRepository;
use crate::{
    error::AppResult,
    models::{Book, BookStat, BookType, NewBook},
};

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn find_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT id, name, type FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    async fn save(&self, book: NewBook) -> AppResult<Book> {
        let saved = sqlx::query_as::<_, Book>(
            "INSERT INTO books (name, type) VALUES ($1, $2) RETURNING id, name, type",
        )
        .bind(&book.name)
        .bind(book.book_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn save_all(&self, books: Vec<NewBook>) -> AppResult<Vec<Book>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(books.len());
        for book in books {
            let row = sqlx::query_as::<_, Book>(
                "INSERT INTO books (name, type) VALUES ($1, $2) RETURNING id, name, type",
            )
            .bind(&book.name)
            .bind(book.book_type)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_all(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM books").execute(&self.pool).await?;
        Ok(())
    }

    async fn count_by_type(&self) -> AppResult<Vec<BookStat>> {
        let rows = sqlx::query_as::<_, (BookType, i64)>(
            "SELECT type, COUNT(*) FROM books GROUP BY type",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats: Vec<BookStat> = rows
            .into_iter()
            .map(|(book_type, count)| BookStat { book_type, count })
            .collect();
        stats.sort_by_key(|s| s.book_type);
        Ok(stats)
    }
}
