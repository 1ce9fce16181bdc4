//! Book service: catalog registration and the loan lifecycle

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookLoanRequest, BookRequest, BookStat, BookType, NewBook, NewLoanHistory, UserLoanStatus},
    repository::Repository,
};

use super::stats::StatsService;

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
    stats: StatsService,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self {
            stats: StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Register a new book in the catalog
    pub async fn save_book(&self, request: BookRequest) -> AppResult<Book> {
        request.validate()?;
        let book_type: BookType = request.book_type.parse()?;
        let book = self
            .repository
            .books
            .save(NewBook::new(request.name, book_type)?)
            .await?;

        tracing::info!(book_id = book.id, name = %book.name, book_type = %book.book_type, "Book registered");
        Ok(book)
    }

    /// Loan a book to a user.
    ///
    /// The book must be registered, the user must exist and no other loan of
    /// a book with the same name may be active.
    pub async fn loan_book(&self, request: BookLoanRequest) -> AppResult<()> {
        request.validate()?;

        let mut uow = self.repository.loans.begin().await?;

        if !uow.book_exists(&request.book_name).await? {
            return Err(AppError::NotFound(format!("Book '{}' not found", request.book_name)));
        }

        let user = uow
            .find_user_by_name(&request.user_name)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User '{}' not found", request.user_name)))?;

        if uow
            .exists_by_book_name_and_status(&request.book_name, UserLoanStatus::Loaned)
            .await?
        {
            return Err(AppError::book_already_loaned());
        }

        let history = uow
            .insert(NewLoanHistory::loaned(user.id, &request.book_name))
            .await?;
        uow.commit().await?;

        tracing::info!(
            loan_id = history.id,
            user_id = user.id,
            book_name = %history.book_name,
            "Book loaned"
        );
        Ok(())
    }

    /// Return the book the user currently has on loan
    pub async fn return_book(&self, request: BookLoanRequest) -> AppResult<()> {
        request.validate()?;

        let mut uow = self.repository.loans.begin().await?;

        let user = uow
            .find_user_by_name(&request.user_name)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User '{}' not found", request.user_name)))?;

        let mut active = uow
            .find_by_user_and_book_name_and_status(user.id, &request.book_name, UserLoanStatus::Loaned)
            .await?;

        let mut history = match active.len() {
            0 => {
                return Err(AppError::NotFound(format!(
                    "No active loan of '{}' for user '{}'",
                    request.book_name, request.user_name
                )))
            }
            1 => active.remove(0),
            n => {
                return Err(AppError::Conflict(format!(
                    "{} active loans of '{}' for user '{}'",
                    n, request.book_name, request.user_name
                )))
            }
        };

        history.do_return()?;
        uow.update_status(history.id, history.status).await?;
        uow.commit().await?;

        tracing::info!(
            loan_id = history.id,
            user_id = user.id,
            book_name = %history.book_name,
            "Book returned"
        );
        Ok(())
    }

    /// Number of books currently on loan
    pub async fn count_loaned_book(&self) -> AppResult<i64> {
        self.stats.count_loaned_book().await
    }

    /// Number of registered books per type
    pub async fn get_book_statistics(&self) -> AppResult<Vec<BookStat>> {
        self.stats.book_statistics().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;

    use super::*;
    use crate::{
        models::{User, UserLoanHistory},
        repository::{
            LoanUnitOfWork, MockBookRepository, MockLoanHistoryRepository, MockLoanUnitOfWork,
            MockUserRepository,
        },
    };

    fn jin() -> User {
        User {
            id: 7,
            name: "김진호".to_string(),
            age: Some(26),
        }
    }

    fn service(books: MockBookRepository, loans: MockLoanHistoryRepository) -> BookService {
        BookService::new(Repository {
            books: Arc::new(books),
            users: Arc::new(MockUserRepository::new()),
            loans: Arc::new(loans),
        })
    }

    fn loans_with(uow: MockLoanUnitOfWork) -> MockLoanHistoryRepository {
        let mut loans = MockLoanHistoryRepository::new();
        let mut uow = Some(uow);
        loans.expect_begin().times(1).returning(move || {
            let uow: Box<dyn LoanUnitOfWork> = Box::new(uow.take().expect("begin called once"));
            Ok(uow)
        });
        loans
    }

    #[tokio::test]
    async fn test_save_book_rejects_unknown_type() {
        let mut books = MockBookRepository::new();
        books.expect_save().never();
        let service = service(books, MockLoanHistoryRepository::new());

        let err = service
            .save_book(BookRequest {
                name: "이상한 나라의 엘리스".to_string(),
                book_type: "POETRY".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_book_rejects_empty_name() {
        let mut books = MockBookRepository::new();
        books.expect_save().never();
        let service = service(books, MockLoanHistoryRepository::new());

        let err = service
            .save_book(BookRequest {
                name: String::new(),
                book_type: "COMPUTER".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_loan_book_conflict_does_not_insert() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_book_exists().returning(|_| Ok(true));
        uow.expect_find_user_by_name().returning(|_| Ok(Some(jin())));
        uow.expect_exists_by_book_name_and_status()
            .withf(|name, status| name == "X" && *status == UserLoanStatus::Loaned)
            .returning(|_, _| Ok(true));
        uow.expect_insert().never();
        uow.expect_commit().never();

        let service = service(MockBookRepository::new(), loans_with(uow));
        let err = service
            .loan_book(BookLoanRequest::new("김진호", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == crate::error::BOOK_ALREADY_LOANED));
    }

    #[tokio::test]
    async fn test_loan_book_unknown_user() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_book_exists().returning(|_| Ok(true));
        uow.expect_find_user_by_name().returning(|_| Ok(None));
        uow.expect_insert().never();

        let service = service(MockBookRepository::new(), loans_with(uow));
        let err = service
            .loan_book(BookLoanRequest::new("nobody", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_loan_book_inserts_and_commits() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_book_exists().returning(|_| Ok(true));
        uow.expect_find_user_by_name().returning(|_| Ok(Some(jin())));
        uow.expect_exists_by_book_name_and_status().returning(|_, _| Ok(false));
        uow.expect_insert()
            .withf(|h| h.user_id == 7 && h.book_name == "X" && h.status == UserLoanStatus::Loaned)
            .times(1)
            .returning(|h| {
                Ok(UserLoanHistory {
                    id: 1,
                    user_id: h.user_id,
                    book_name: h.book_name,
                    status: h.status,
                })
            });
        uow.expect_commit().times(1).returning(|| Ok(()));

        let service = service(MockBookRepository::new(), loans_with(uow));
        service.loan_book(BookLoanRequest::new("김진호", "X")).await.unwrap();
    }

    #[tokio::test]
    async fn test_loan_book_propagates_storage_error() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_book_exists().returning(|_| Ok(true));
        uow.expect_find_user_by_name().returning(|_| Ok(Some(jin())));
        uow.expect_exists_by_book_name_and_status().returning(|_, _| Ok(false));
        uow.expect_insert()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        uow.expect_commit().never();

        let service = service(MockBookRepository::new(), loans_with(uow));
        let err = service
            .loan_book(BookLoanRequest::new("김진호", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));
    }

    #[tokio::test]
    async fn test_return_book_refuses_to_guess_between_active_loans() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_find_user_by_name().returning(|_| Ok(Some(jin())));
        uow.expect_find_by_user_and_book_name_and_status().returning(|user_id, name, status| {
            Ok((1..=2)
                .map(|id| UserLoanHistory {
                    id,
                    user_id,
                    book_name: name.to_string(),
                    status,
                })
                .collect())
        });
        uow.expect_update_status().never();
        uow.expect_commit().never();

        let service = service(MockBookRepository::new(), loans_with(uow));
        let err = service
            .return_book(BookLoanRequest::new("김진호", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_return_book_without_active_loan() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_find_user_by_name().returning(|_| Ok(Some(jin())));
        uow.expect_find_by_user_and_book_name_and_status()
            .returning(|_, _, _| Ok(Vec::new()));
        uow.expect_update_status().never();

        let service = service(MockBookRepository::new(), loans_with(uow));
        let err = service
            .return_book(BookLoanRequest::new("김진호", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_return_book_updates_status() {
        let mut uow = MockLoanUnitOfWork::new();
        uow.expect_find_user_by_name().returning(|_| Ok(Some(jin())));
        uow.expect_find_by_user_and_book_name_and_status().returning(|user_id, name, status| {
            Ok(vec![UserLoanHistory {
                id: 3,
                user_id,
                book_name: name.to_string(),
                status,
            }])
        });
        uow.expect_update_status()
            .with(eq(3), eq(UserLoanStatus::Returned))
            .times(1)
            .returning(|_, _| Ok(()));
        uow.expect_commit().times(1).returning(|| Ok(()));

        let service = service(MockBookRepository::new(), loans_with(uow));
        service.return_book(BookLoanRequest::new("김진호", "X")).await.unwrap();
    }

    #[tokio::test]
    async fn test_statistics_go_through_aggregation_seam() {
        let mut books = MockBookRepository::new();
        books.expect_count_by_type().times(1).returning(|| {
            Ok(vec![BookStat {
                book_type: BookType::Computer,
                count: 2,
            }])
        });
        books.expect_find_all().never();

        let service = service(books, MockLoanHistoryRepository::new());
        let stats = service.get_book_statistics().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 2);
    }
}
