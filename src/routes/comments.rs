// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Comment routes.
//!
//! Comments live inside their place document, so every route here turns
//! into one atomic mutation of the parent place. Ownership of an existing
//! comment is checked inside that mutation, against the same read the
//! write is based on.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::owner::DENY_MESSAGE;
use crate::models::{Comment, ImageRef, Place};
use crate::routes::places::{bad_multipart, text_value};
use crate::services::UploadStore;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/comment/{id}",
        post(create_comment)
            .patch(update_comment)
            .delete(delete_comment),
    )
}

/// Parsed multipart body of a comment request.
#[derive(Default)]
struct CommentForm {
    text: Option<String>,
    place_id: Option<String>,
    images: Vec<ImageRef>,
}

/// Post a comment on a place. The path id is the PLACE id.
///
/// Any authenticated user may comment; only existence of the place is
/// checked.
async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(place_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Place>)> {
    let form = parse_comment_form(&state.uploads, &mut multipart).await?;

    let Some(text) = form.text.filter(|t| !t.trim().is_empty()) else {
        state.uploads.remove_all(&form.images).await;
        return Err(AppError::Validation("comment is required".to_string()));
    };

    let comment = Comment::new(auth_user.user_id, text, form.images.clone());
    let comment_id = comment.id.clone();

    let result = state
        .db
        .update_place_atomic(&place_id, move |place| {
            place.add_comment(comment);
            Ok(())
        })
        .await;

    match result {
        Ok(place) => {
            tracing::info!(place_id = %place_id, comment_id = %comment_id, "Comment created");
            Ok((StatusCode::CREATED, Json(place)))
        }
        Err(err) => {
            state.uploads.remove_all(&form.images).await;
            Err(err)
        }
    }
}

/// Edit a comment. The path id is the COMMENT id; the place is named by
/// the `placeId` field. Only the comment's author may edit it, and only
/// the provided fields are overwritten.
async fn update_comment(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Place>> {
    let form = parse_comment_form(&state.uploads, &mut multipart).await?;

    let Some(place_id) = form.place_id.clone() else {
        state.uploads.remove_all(&form.images).await;
        return Err(AppError::Validation("placeId is required".to_string()));
    };

    let caller_id = auth_user.user_id;
    let text = form.text.clone();
    let new_images = form.images.clone();
    let comment_id_for_closure = comment_id.clone();

    let result = state
        .db
        .update_place_atomic(&place_id, move |place| {
            let Some(comment) = place.find_comment_mut(&comment_id_for_closure) else {
                return Err(AppError::NotFound(format!(
                    "Comment {} not found",
                    comment_id_for_closure
                )));
            };
            if comment.owner != caller_id {
                return Err(AppError::Forbidden(DENY_MESSAGE.to_string()));
            }
            if let Some(text) = text {
                comment.text = text;
            }
            if !new_images.is_empty() {
                comment.images = new_images;
            }
            Ok(())
        })
        .await;

    match result {
        Ok(place) => {
            tracing::info!(place_id = %place_id, comment_id = %comment_id, "Comment updated");
            Ok(Json(place))
        }
        Err(err) => {
            state.uploads.remove_all(&form.images).await;
            Err(err)
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCommentRequest {
    #[serde(rename = "placeId")]
    #[validate(length(min = 1, message = "placeId is required"))]
    pub place_id: String,
}

/// Delete a comment. The path id is the COMMENT id; the place comes from
/// the JSON body. Only the comment's author may delete it.
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(comment_id): Path<String>,
    Json(payload): Json<DeleteCommentRequest>,
) -> Result<Json<Place>> {
    payload.validate()?;

    let caller_id = auth_user.user_id;
    let comment_id_for_closure = comment_id.clone();

    let place = state
        .db
        .update_place_atomic(&payload.place_id, move |place| {
            let Some(comment) = place.find_comment_mut(&comment_id_for_closure) else {
                return Err(AppError::NotFound(format!(
                    "Comment {} not found",
                    comment_id_for_closure
                )));
            };
            if comment.owner != caller_id {
                return Err(AppError::Forbidden(DENY_MESSAGE.to_string()));
            }
            place.remove_comment(&comment_id_for_closure);
            Ok(())
        })
        .await?;

    tracing::info!(place_id = %payload.place_id, comment_id = %comment_id, "Comment deleted");

    Ok(Json(place))
}

// ─── Multipart Parsing ───────────────────────────────────────

async fn parse_comment_form(
    uploads: &UploadStore,
    multipart: &mut Multipart,
) -> Result<CommentForm> {
    let mut form = CommentForm::default();
    if let Err(err) = fill_comment_form(uploads, multipart, &mut form).await {
        uploads.remove_all(&form.images).await;
        return Err(err);
    }
    Ok(form)
}

async fn fill_comment_form(
    uploads: &UploadStore,
    multipart: &mut Multipart,
    form: &mut CommentForm,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "comment" => form.text = Some(text_value(field).await?),
            "placeId" => form.place_id = Some(text_value(field).await?),
            "images" => {
                let file_name = field.file_name().map(|s| s.to_string()).ok_or_else(|| {
                    AppError::Validation("image part is missing a file name".to_string())
                })?;
                let data = field.bytes().await.map_err(bad_multipart)?;
                form.images.push(uploads.save(&file_name, &data).await?);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }
    Ok(())
}
