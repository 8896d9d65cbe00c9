// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts and favorites)
//! - Places (location documents with embedded comments and images)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Place, User};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by their unique username.
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let username = username.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("username").eq(username.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Look up a user by their unique email address.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("email").eq(email.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// List all users.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a user document.
    pub async fn delete_user(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Place Operations ────────────────────────────────────────

    /// Get a place by document ID.
    pub async fn get_place(&self, place_id: &str) -> Result<Option<Place>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PLACES)
            .obj()
            .one(place_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List visible places, newest first.
    pub async fn list_active_places(&self) -> Result<Vec<Place>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PLACES)
            .filter(|q| q.field("is_active").eq(true))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a place document.
    pub async fn upsert_place(&self, place: &Place) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PLACES)
            .document_id(&place.id)
            .object(place)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a place document.
    pub async fn delete_place(&self, place_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PLACES)
            .document_id(place_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Place Mutation ───────────────────────────────────

    /// Atomically read-modify-write a place document.
    ///
    /// Runs inside a Firestore transaction so two concurrent mutations of the
    /// same place (for example two comments posted at once) cannot overwrite
    /// each other: the read registers the document for conflict detection and
    /// the whole-document write commits atomically.
    ///
    /// The `mutate` closure applies the in-memory change. If it returns an
    /// error (comment not found, wrong owner) the transaction is rolled back
    /// and the error is surfaced untouched, so no partial write escapes.
    ///
    /// Returns the place as persisted.
    pub async fn update_place_atomic<F>(&self, place_id: &str, mutate: F) -> Result<Place, AppError>
    where
        F: FnOnce(&mut Place) -> Result<(), AppError>,
    {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Read the place within the transaction.
        // This registers the document for conflict detection.
        let place: Option<Place> = client
            .fluent()
            .select()
            .by_id_in(collections::PLACES)
            .obj()
            .one(place_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read place in transaction: {}", e))
            })?;

        let Some(mut place) = place else {
            let _ = transaction.rollback().await;
            return Err(AppError::NotFound(format!("Place {} not found", place_id)));
        };

        if let Err(err) = mutate(&mut place) {
            // Precondition failed, nothing must be written
            let _ = transaction.rollback().await;
            return Err(err);
        }

        client
            .fluent()
            .update()
            .in_col(collections::PLACES)
            .document_id(&place.id)
            .object(&place)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add place to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(place)
    }
}
