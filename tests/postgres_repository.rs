//! PostgreSQL store tests
//!
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use libraryapp_server::{
    error::AppError,
    models::{BookLoanRequest, BookType, NewBook, NewLoanHistory, NewUser, UserLoanStatus},
    repository::Repository,
    services::Services,
};
use sqlx::postgres::PgPoolOptions;

async fn setup() -> (Repository, Services) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let repository = Repository::new(pool);
    repository.loans.delete_all().await.unwrap();
    repository.users.delete_all().await.unwrap();
    repository.books.delete_all().await.unwrap();

    let services = Services::new(repository.clone());
    (repository, services)
}

// One sequential scenario: the tests would otherwise race on the shared tables
#[tokio::test]
#[ignore]
async fn test_postgres_store() {
    let (repository, services) = setup().await;

    // active-loan index rejects a second LOANED row
    let user = repository.users.save(NewUser::new("김진호", Some(26)).unwrap()).await.unwrap();
    repository.loans.save(NewLoanHistory::loaned(user.id, "X")).await.unwrap();
    let err = repository
        .loans
        .save(NewLoanHistory::loaned(user.id, "X"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // native aggregation
    repository
        .books
        .save_all(vec![
            NewBook::new("A", BookType::Science).unwrap(),
            NewBook::new("B", BookType::Computer).unwrap(),
            NewBook::new("C", BookType::Computer).unwrap(),
        ])
        .await
        .unwrap();
    let stats = services.books.get_book_statistics().await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].book_type, BookType::Computer);
    assert_eq!(stats[0].count, 2);

    // return through a transaction
    services
        .books
        .return_book(BookLoanRequest::new("김진호", "X"))
        .await
        .unwrap();
    let histories = repository.loans.find_by_user(user.id).await.unwrap();
    assert_eq!(histories.len(), 1);
    assert_eq!(histories[0].status, UserLoanStatus::Returned);
    assert_eq!(
        repository.loans.count_by_status(UserLoanStatus::Loaned).await.unwrap(),
        0
    );

    // concurrent loans of the same book: one winner
    repository.books.save(NewBook::new("Race", BookType::History).unwrap()).await.unwrap();
    for i in 0..6 {
        repository
            .users
            .save(NewUser::new(format!("racer-{}", i), None).unwrap())
            .await
            .unwrap();
    }
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let books = services.books.clone();
            tokio::spawn(async move {
                books
                    .loan_book(BookLoanRequest::new(format!("racer-{}", i), "Race"))
                    .await
            })
        })
        .collect();
    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(err) => assert!(matches!(err, AppError::Conflict(_))),
        }
    }
    assert_eq!(successes, 1);
}
