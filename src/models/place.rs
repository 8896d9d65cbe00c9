// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Place aggregate: the document stored per location, with its embedded
//! comments and image references.
//!
//! Comments and images are arrays inside the place document, so every
//! comment or image mutation is expressed as a mutation of the whole
//! aggregate and persisted as one document write.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

fn default_true() -> bool {
    true
}

/// How hard a location is to reach and move around in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl FromStr for Accessibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Accessibility::Easy),
            "medium" => Ok(Accessibility::Medium),
            "hard" => Ok(Accessibility::Hard),
            other => Err(format!(
                "accessibility must be one of easy, medium, hard (got {:?})",
                other
            )),
        }
    }
}

/// Reference to one stored image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Entry ID (uuid v4), used to select images for removal
    pub id: String,
    /// Public URL path, e.g. `/uploads/1755849600000-ruin.jpg`
    pub url: String,
}

impl ImageRef {
    pub fn new(url: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url,
        }
    }
}

/// Comment embedded in a place document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// ID unique within the parent place (uuid v4)
    pub id: String,
    /// Comment body
    pub text: String,
    /// User id of the author
    pub owner: String,
    /// Images attached to the comment
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// When the comment was written (RFC 3339)
    pub created_at: String,
}

impl Comment {
    pub fn new(owner: String, text: String, images: Vec<ImageRef>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            owner,
            images,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Urbex location stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    /// Document ID (uuid v4)
    pub id: String,
    pub title: String,
    pub description: String,
    /// Background story of the location
    pub history: String,
    pub town: String,
    /// Free-form category label
    pub category: Option<String>,
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Inactive places are hidden from the public listing
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Like counter; kept in step with each liker's favorites list
    #[serde(default)]
    pub likes: i64,
    /// User id of the creator
    pub owner: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// When the place was created (RFC 3339)
    pub created_at: String,
}

impl Place {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: String,
        title: String,
        description: String,
        history: String,
        town: String,
        category: Option<String>,
        accessibility: Accessibility,
        images: Vec<ImageRef>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            history,
            town,
            category,
            accessibility,
            is_active: true,
            likes: 0,
            owner,
            images,
            comments: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Append a comment at the end of the list.
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn find_comment_mut(&mut self, comment_id: &str) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id == comment_id)
    }

    /// Remove a comment by id, returning it if it was present.
    pub fn remove_comment(&mut self, comment_id: &str) -> Option<Comment> {
        let index = self.comments.iter().position(|c| c.id == comment_id)?;
        Some(self.comments.remove(index))
    }

    /// Apply an image update: drop entries whose id is in `remove_ids`,
    /// then append `new_images` at the end. Survivors keep their relative
    /// order. Returns the dropped entries so the caller can delete the
    /// underlying files.
    pub fn reconcile_images(
        &mut self,
        remove_ids: &[String],
        new_images: Vec<ImageRef>,
    ) -> Vec<ImageRef> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.images.len());
        for image in self.images.drain(..) {
            if remove_ids.iter().any(|id| *id == image.id) {
                removed.push(image);
            } else {
                kept.push(image);
            }
        }
        self.images = kept;
        self.images.extend(new_images);
        removed
    }
}
