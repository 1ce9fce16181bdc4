//! User model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Library user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
}

/// User not yet persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: Option<i32>,
}

impl NewUser {
    pub fn new(name: impl Into<String>, age: Option<i32>) -> AppResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AppError::Validation("User name must not be empty".to_string()));
        }
        if matches!(age, Some(a) if a < 0) {
            return Err(AppError::Validation("Age must not be negative".to_string()));
        }
        Ok(Self { name, age })
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserCreateRequest {
    #[validate(length(min = 1, message = "User name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "Age must not be negative"))]
    pub age: Option<i32>,
}

/// Rename user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserUpdateRequest {
    pub id: i32,
    #[validate(length(min = 1, message = "User name is required"))]
    pub name: String,
}

/// Delete user query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserDeleteQuery {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_validation() {
        assert!(NewUser::new("김진호", Some(26)).is_ok());
        assert!(NewUser::new("내캉", None).is_ok());
        assert!(matches!(NewUser::new("", None), Err(AppError::Validation(_))));
        assert!(matches!(NewUser::new("Jin", Some(-1)), Err(AppError::Validation(_))));
    }
}
