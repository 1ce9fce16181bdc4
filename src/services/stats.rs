//! Statistics service: read-only aggregation over the catalog and the ledger

use std::collections::BTreeMap;

use crate::{
    error::AppResult,
    models::{Book, BookStat, BookType, UserLoanHistory, UserLoanStatus},
    repository::Repository,
};

/// Count books per type. Types without books are omitted; output is ordered by type.
pub fn group_by_type(books: &[Book]) -> Vec<BookStat> {
    let mut counts: BTreeMap<BookType, i64> = BTreeMap::new();
    for book in books {
        *counts.entry(book.book_type).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(book_type, count)| BookStat { book_type, count })
        .collect()
}

pub fn count_with_status(histories: &[UserLoanHistory], status: UserLoanStatus) -> i64 {
    histories.iter().filter(|h| h.status == status).count() as i64
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Number of loans not yet returned
    pub async fn count_loaned_book(&self) -> AppResult<i64> {
        let count = self
            .repository
            .loans
            .count_by_status(UserLoanStatus::Loaned)
            .await?;
        tracing::debug!(count, "Counted active loans");
        Ok(count)
    }

    /// Book counts per type, one entry for every type with at least one book
    pub async fn book_statistics(&self) -> AppResult<Vec<BookStat>> {
        let stats = self.repository.books.count_by_type().await?;
        tracing::debug!(groups = stats.len(), "Computed book statistics");
        Ok(stats)
    }
}
