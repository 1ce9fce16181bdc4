//! User management service

use std::collections::HashMap;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        BookHistoryView, NewUser, User, UserCreateRequest, UserLoanHistoryView, UserUpdateRequest,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UserService {
    repository: Repository,
}

impl UserService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn save_user(&self, request: UserCreateRequest) -> AppResult<User> {
        request.validate()?;
        let user = self
            .repository
            .users
            .save(NewUser::new(request.name, request.age)?)
            .await?;
        tracing::info!(user_id = user.id, name = %user.name, "User created");
        Ok(user)
    }

    pub async fn get_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.find_all().await
    }

    pub async fn update_user_name(&self, request: UserUpdateRequest) -> AppResult<User> {
        request.validate()?;
        self.repository
            .users
            .update_name(request.id, &request.name)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", request.id)))
    }

    /// Delete the user registered under `name`, together with its loan history
    pub async fn delete_user(&self, name: &str) -> AppResult<()> {
        let user = self
            .repository
            .users
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User '{}' not found", name)))?;

        if !self.repository.users.delete(user.id).await? {
            return Err(AppError::UserNotFound(format!("User '{}' not found", name)));
        }
        tracing::info!(user_id = user.id, name = %user.name, "User deleted");
        Ok(())
    }

    /// Every user with the books they borrowed, in loan order
    pub async fn get_user_loan_histories(&self) -> AppResult<Vec<UserLoanHistoryView>> {
        let users = self.repository.users.find_all().await?;
        let mut histories = self.repository.loans.find_all().await?;
        histories.sort_by_key(|h| h.id);

        let mut by_user: HashMap<i32, Vec<BookHistoryView>> = HashMap::new();
        for history in &histories {
            by_user
                .entry(history.user_id)
                .or_default()
                .push(BookHistoryView::from(history));
        }

        Ok(users
            .into_iter()
            .map(|user| UserLoanHistoryView {
                books: by_user.remove(&user.id).unwrap_or_default(),
                name: user.name,
            })
            .collect())
    }
}
