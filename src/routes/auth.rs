// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{User, UserResponse};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Payload for creating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub bio: Option<String>,
}

/// Create a new account.
///
/// Username and email are both unique; a duplicate of either is a conflict
/// and no second record is written.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    payload.validate()?;

    if state
        .db
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    if state
        .db
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password(payload.password).await?;

    let user = User::new(payload.username, payload.email, password_hash, payload.bio);
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Log in with username and password.
///
/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    payload.validate()?;

    let user = state
        .db
        .find_user_by_username(&payload.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let password_ok = verify_password(payload.password, user.password_hash.clone()).await?;
    if !password_ok {
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// bcrypt the password on a blocking thread.
pub(crate) async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_password_round_trip() {
        let hash = hash_password("correct horse".to_string()).await.unwrap();

        assert!(verify_password("correct horse".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong horse".to_string(), hash)
            .await
            .unwrap());
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "explorer".to_string(),
            email: "explorer@example.com".to_string(),
            password: "secret123".to_string(),
            bio: None,
        };
        assert!(valid.validate().is_ok());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());

        let bad_email = RegisterRequest {
            username: "explorer".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
            bio: None,
        };
        assert!(bad_email.validate().is_err());
    }
}
