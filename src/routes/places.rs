// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Place routes: browsing, creation, owner-only mutation, likes.

use axum::{
    extract::{multipart::Field, multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::{owner::require_owner, EntityKind};
use crate::models::{Accessibility, ImageRef, Place, UserResponse};
use crate::routes::MessageResponse;
use crate::services::UploadStore;
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_places))
        .route("/place/{id}", get(get_place))
}

pub fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let owner_routes = Router::new()
        .route("/place/{id}", axum::routing::patch(update_place).delete(delete_place))
        .route_layer(middleware::from_fn_with_state(
            (state, EntityKind::Place),
            require_owner,
        ));

    Router::new()
        .route("/place", post(create_place))
        .route("/place/{id}/like", post(like_place))
        .route("/place/{id}/unlike", post(unlike_place))
        .merge(owner_routes)
}

// ─── Browsing ────────────────────────────────────────────────

/// List visible places, newest first.
async fn list_places(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Place>>> {
    let places = state.db.list_active_places().await?;
    Ok(Json(places))
}

/// Get one place with its comments and images.
async fn get_place(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
) -> Result<Json<Place>> {
    let place = state
        .db
        .get_place(&place_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place {} not found", place_id)))?;

    Ok(Json(place))
}

// ─── Creation ────────────────────────────────────────────────

/// Image already hosted somewhere, referenced by url.
#[derive(Debug, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "history is required"))]
    pub history: String,
    #[validate(length(min = 1, message = "town is required"))]
    pub town: String,
    pub category: Option<String>,
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Image urls to attach on creation
    #[serde(default)]
    pub images: Vec<ImageUrl>,
}

/// Create a place owned by the caller.
async fn create_place(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreatePlaceRequest>,
) -> Result<(StatusCode, Json<Place>)> {
    payload.validate()?;

    let images = payload
        .images
        .into_iter()
        .map(|image| ImageRef::new(image.url))
        .collect();

    let place = Place::new(
        auth_user.user_id,
        payload.title,
        payload.description,
        payload.history,
        payload.town,
        payload.category,
        payload.accessibility,
        images,
    );
    state.db.upsert_place(&place).await?;

    tracing::info!(place_id = %place.id, owner = %place.owner, "Place created");

    Ok((StatusCode::CREATED, Json(place)))
}

// ─── Owner-only Mutation ─────────────────────────────────────

/// Parsed multipart body of a place update.
#[derive(Default)]
struct PlacePatch {
    title: Option<String>,
    description: Option<String>,
    history: Option<String>,
    town: Option<String>,
    category: Option<String>,
    accessibility: Option<Accessibility>,
    is_active: Option<bool>,
    /// ids of image entries to drop
    remove_images: Vec<String>,
    /// freshly stored uploads to append
    new_images: Vec<ImageRef>,
}

/// Update a place: field patch plus image reconciliation.
///
/// Multipart body: any of the text fields, repeated `remove_images` ids and
/// `images` file parts. Absent fields are left unchanged. The document is
/// persisted first; files of dropped entries are deleted best-effort
/// afterwards, so a failed file deletion never undoes the metadata update.
async fn update_place(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Place>> {
    let patch = parse_place_patch(&state.uploads, &mut multipart).await?;
    let appended = patch.new_images.clone();

    let place = match state.db.get_place(&place_id).await {
        Ok(Some(place)) => place,
        Ok(None) => {
            state.uploads.remove_all(&appended).await;
            return Err(AppError::NotFound(format!("Place {} not found", place_id)));
        }
        Err(err) => {
            state.uploads.remove_all(&appended).await;
            return Err(err);
        }
    };

    let (place, removed) = apply_place_patch(place, patch);

    if let Err(err) = state.db.upsert_place(&place).await {
        // The new files are unreferenced if the document write failed
        state.uploads.remove_all(&appended).await;
        return Err(err);
    }

    state.uploads.remove_all(&removed).await;

    tracing::info!(
        place_id = %place.id,
        removed_images = removed.len(),
        added_images = appended.len(),
        "Place updated"
    );

    Ok(Json(place))
}

fn apply_place_patch(mut place: Place, patch: PlacePatch) -> (Place, Vec<ImageRef>) {
    let PlacePatch {
        title,
        description,
        history,
        town,
        category,
        accessibility,
        is_active,
        remove_images,
        new_images,
    } = patch;

    if let Some(title) = title {
        place.title = title;
    }
    if let Some(description) = description {
        place.description = description;
    }
    if let Some(history) = history {
        place.history = history;
    }
    if let Some(town) = town {
        place.town = town;
    }
    if let Some(category) = category {
        // An empty value clears the category
        place.category = if category.is_empty() {
            None
        } else {
            Some(category)
        };
    }
    if let Some(accessibility) = accessibility {
        place.accessibility = accessibility;
    }
    if let Some(is_active) = is_active {
        place.is_active = is_active;
    }

    let removed = place.reconcile_images(&remove_images, new_images);
    (place, removed)
}

/// Delete a place, its document first, stored files best-effort after.
async fn delete_place(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let place = state
        .db
        .get_place(&place_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place {} not found", place_id)))?;

    state.db.delete_place(&place_id).await?;

    let mut files = place.images;
    for comment in &place.comments {
        files.extend(comment.images.iter().cloned());
    }
    state.uploads.remove_all(&files).await;

    tracing::info!(place_id = %place_id, "Place deleted");

    Ok(Json(MessageResponse {
        message: "Place deleted successfully".to_string(),
    }))
}

// ─── Likes ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LikeResponse {
    pub place: Place,
    pub user: UserResponse,
}

/// Like a place: bump its counter and record it in the caller's favorites.
///
/// The two writes go to different documents with no shared transaction;
/// the conflict check runs before either write so a duplicate like
/// changes nothing.
async fn like_place(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(place_id): Path<String>,
) -> Result<Json<LikeResponse>> {
    let mut user = state
        .db
        .get_user(&auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth_user.user_id)))?;

    if !user.add_favorite(&place_id) {
        return Err(AppError::Conflict(
            "You already liked this place".to_string(),
        ));
    }

    let mut place = state
        .db
        .get_place(&place_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place {} not found", place_id)))?;

    place.likes += 1;
    state.db.upsert_place(&place).await?;
    state.db.upsert_user(&user).await?;

    tracing::debug!(place_id = %place_id, user_id = %user.id, likes = place.likes, "Place liked");

    Ok(Json(LikeResponse {
        place,
        user: user.into(),
    }))
}

/// Undo a like. The counter is decremented without a floor; keeping it
/// non-negative relies on the favorites ledger staying in step.
async fn unlike_place(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(place_id): Path<String>,
) -> Result<Json<LikeResponse>> {
    let mut user = state
        .db
        .get_user(&auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth_user.user_id)))?;

    if !user.remove_favorite(&place_id) {
        return Err(AppError::Conflict(
            "You have not liked this place".to_string(),
        ));
    }

    let mut place = state
        .db
        .get_place(&place_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Place {} not found", place_id)))?;

    place.likes -= 1;
    state.db.upsert_place(&place).await?;
    state.db.upsert_user(&user).await?;

    tracing::debug!(place_id = %place_id, user_id = %user.id, likes = place.likes, "Place unliked");

    Ok(Json(LikeResponse {
        place,
        user: user.into(),
    }))
}

// ─── Multipart Parsing ───────────────────────────────────────

async fn parse_place_patch(
    uploads: &UploadStore,
    multipart: &mut Multipart,
) -> Result<PlacePatch> {
    let mut patch = PlacePatch::default();
    if let Err(err) = fill_place_patch(uploads, multipart, &mut patch).await {
        // Drop anything stored before the request went bad
        uploads.remove_all(&patch.new_images).await;
        return Err(err);
    }
    Ok(patch)
}

async fn fill_place_patch(
    uploads: &UploadStore,
    multipart: &mut Multipart,
    patch: &mut PlacePatch,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => patch.title = Some(non_empty_text(&name, field).await?),
            "description" => patch.description = Some(non_empty_text(&name, field).await?),
            "history" => patch.history = Some(non_empty_text(&name, field).await?),
            "town" => patch.town = Some(non_empty_text(&name, field).await?),
            "category" => patch.category = Some(text_value(field).await?),
            "accessibility" => {
                let raw = text_value(field).await?;
                patch.accessibility = Some(raw.parse().map_err(AppError::Validation)?);
            }
            "is_active" => {
                let raw = text_value(field).await?;
                patch.is_active = Some(raw.parse().map_err(|_| {
                    AppError::Validation("is_active must be true or false".to_string())
                })?);
            }
            "remove_images" => patch.remove_images.push(text_value(field).await?),
            "images" => {
                let file_name = field.file_name().map(|s| s.to_string()).ok_or_else(|| {
                    AppError::Validation("image part is missing a file name".to_string())
                })?;
                let data = field.bytes().await.map_err(bad_multipart)?;
                patch.new_images.push(uploads.save(&file_name, &data).await?);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }
    Ok(())
}

pub(crate) async fn text_value(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(bad_multipart)
}

async fn non_empty_text(name: &str, field: Field<'_>) -> Result<String> {
    let value = text_value(field).await?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", name)));
    }
    Ok(value)
}

pub(crate) fn bad_multipart(err: MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart request: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_place() -> Place {
        Place::new(
            "user-1".to_string(),
            "Sanatorium".to_string(),
            "Hilltop sanatorium".to_string(),
            "Closed in 1993".to_string(),
            "Spa".to_string(),
            Some("medical".to_string()),
            Accessibility::Medium,
            vec![ImageRef::new("/uploads/1-old.jpg".to_string())],
        )
    }

    #[test]
    fn test_apply_place_patch_fields() {
        let place = sample_place();
        let patch = PlacePatch {
            title: Some("Sanatorium X".to_string()),
            category: Some(String::new()),
            is_active: Some(false),
            ..PlacePatch::default()
        };

        let (place, removed) = apply_place_patch(place, patch);

        assert_eq!(place.title, "Sanatorium X");
        assert_eq!(place.category, None);
        assert!(!place.is_active);
        // Untouched fields survive
        assert_eq!(place.town, "Spa");
        assert!(removed.is_empty());
    }

    #[test]
    fn test_apply_place_patch_reconciles_images() {
        let place = sample_place();
        let old_id = place.images[0].id.clone();
        let new_image = ImageRef::new("/uploads/2-new.jpg".to_string());
        let patch = PlacePatch {
            remove_images: vec![old_id.clone()],
            new_images: vec![new_image.clone()],
            ..PlacePatch::default()
        };

        let (place, removed) = apply_place_patch(place, patch);

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, old_id);
        assert_eq!(place.images, vec![new_image]);
    }
}
