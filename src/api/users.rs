//! User management endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{User, UserCreateRequest, UserDeleteQuery, UserLoanHistoryView, UserUpdateRequest},
    AppState,
};

/// Create a user
#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn save_user(
    State(state): State<AppState>,
    Json(request): Json<UserCreateRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.save_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users
#[utoipa::path(
    get,
    path = "/user",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<User>)
    )
)]
pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.services.users.get_users().await?))
}

/// Rename a user
#[utoipa::path(
    put,
    path = "/user",
    tag = "users",
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User renamed", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_user_name(
    State(state): State<AppState>,
    Json(request): Json<UserUpdateRequest>,
) -> AppResult<Json<User>> {
    Ok(Json(state.services.users.update_user_name(request).await?))
}

/// Delete a user by name
#[utoipa::path(
    delete,
    path = "/user",
    tag = "users",
    params(UserDeleteQuery),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<UserDeleteQuery>,
) -> AppResult<StatusCode> {
    state.services.users.delete_user(&query.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Users with their loan history
#[utoipa::path(
    get,
    path = "/user/loan",
    tag = "users",
    responses(
        (status = 200, description = "Loan history per user", body = Vec<UserLoanHistoryView>)
    )
)]
pub async fn get_user_loan_histories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserLoanHistoryView>>> {
    Ok(Json(state.services.users.get_user_loan_histories().await?))
}
