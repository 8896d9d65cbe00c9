// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile routes.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{owner::require_owner, EntityKind};
use crate::models::UserResponse;
use crate::routes::auth::hash_password;
use crate::routes::MessageResponse;
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users))
        .route("/user/{id}", get(get_user))
}

/// Routes restricted to the addressed user themselves.
pub fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/{id}", patch(update_user).delete(delete_user))
        .route_layer(middleware::from_fn_with_state(
            (state, EntityKind::User),
            require_owner,
        ))
}

/// List all user profiles.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get one user profile.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    Ok(Json(user.into()))
}

/// Payload for updating an account. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    pub bio: Option<String>,
}

/// Update the caller's own account.
///
/// Username and email changes re-run the uniqueness checks.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    payload.validate()?;

    let mut user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    if let Some(username) = payload.username {
        if username != user.username {
            if state
                .db
                .find_user_by_username(&username)
                .await?
                .is_some()
            {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            user.username = username;
        }
    }

    if let Some(email) = payload.email {
        if email != user.email {
            if state.db.find_user_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            user.email = email;
        }
    }

    if let Some(password) = payload.password {
        user.password_hash = hash_password(password).await?;
    }

    if let Some(bio) = payload.bio {
        user.bio = Some(bio);
    }

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User updated");

    Ok(Json(user.into()))
}

/// Delete the caller's own account.
///
/// Places and comments the user created stay in place; only the account
/// document is removed.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.db.delete_user(&user_id).await?;

    tracing::info!(user_id = %user_id, "User deleted");

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}
