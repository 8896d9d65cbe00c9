// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource ownership middleware.
//!
//! Mutation routes are wrapped with [`require_owner`] parameterized by an
//! [`EntityKind`]: the middleware resolves the entity named by the `{id}`
//! path segment and rejects callers that do not own it. The kinds form a
//! closed enum, so every ownable entity and its owner lookup is declared in
//! this one file; adding a kind means adding a variant and a loader arm.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::sync::Arc;

/// Message returned on every ownership denial.
pub const DENY_MESSAGE: &str = "You are not authorized to modify this resource";

/// Entity kinds subject to ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Place,
}

impl EntityKind {
    fn name(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Place => "Place",
        }
    }
}

/// Outcome of an ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerDecision {
    Allow,
    Deny(String),
    NotFound,
}

/// Resolve whether `caller_id` owns the entity `(kind, entity_id)`.
///
/// A user owns itself; a place is owned by its creator. Store failures
/// propagate as errors, never as decisions.
pub async fn authorize(
    db: &FirestoreDb,
    kind: EntityKind,
    entity_id: &str,
    caller_id: &str,
) -> Result<OwnerDecision, AppError> {
    let owner = match kind {
        EntityKind::User => db.get_user(entity_id).await?.map(|user| user.id),
        EntityKind::Place => db.get_place(entity_id).await?.map(|place| place.owner),
    };

    Ok(decide(owner, caller_id))
}

fn decide(owner: Option<String>, caller_id: &str) -> OwnerDecision {
    match owner {
        None => OwnerDecision::NotFound,
        Some(owner) if owner == caller_id => OwnerDecision::Allow,
        Some(_) => OwnerDecision::Deny(DENY_MESSAGE.to_string()),
    }
}

/// Middleware that restricts a route to the owner of the addressed entity.
///
/// Must be applied inside `require_auth` (it reads the `AuthUser`
/// extension). Performs no mutation itself.
pub async fn require_owner(
    State((state, kind)): State<(Arc<AppState>, EntityKind)>,
    Path(entity_id): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authorize(&state.db, kind, &entity_id, &auth_user.user_id).await? {
        OwnerDecision::Allow => Ok(next.run(request).await),
        OwnerDecision::Deny(reason) => {
            tracing::debug!(
                kind = kind.name(),
                entity_id = %entity_id,
                caller_id = %auth_user.user_id,
                "Ownership denied"
            );
            Err(AppError::Forbidden(reason))
        }
        OwnerDecision::NotFound => Err(AppError::NotFound(format!(
            "{} {} not found",
            kind.name(),
            entity_id
        ))),
    }
}
