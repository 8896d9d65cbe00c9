// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use urbex_api::config::Config;
use urbex_api::db::FirestoreDb;
use urbex_api::routes::create_router;
use urbex_api::services::UploadStore;
use urbex_api::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Uploads store in a directory unique to this test process.
#[allow(dead_code)]
pub fn test_uploads() -> UploadStore {
    let dir = std::env::temp_dir().join(format!("urbex-test-uploads-{}", uuid::Uuid::new_v4()));
    UploadStore::new(dir)
}

/// Create a test app with an offline mock database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db_offline();
    let uploads = test_uploads();

    let state = Arc::new(AppState {
        config,
        db,
        uploads,
    });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = test_db().await;
    let uploads = test_uploads();
    uploads
        .ensure_dir()
        .await
        .expect("Failed to create uploads directory");

    let state = Arc::new(AppState {
        config,
        db,
        uploads,
    });

    (create_router(state.clone()), state)
}

/// Mint a valid JWT for `user_id` with the test signing key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str) -> String {
    let config = Config::default();
    urbex_api::middleware::auth::create_jwt(user_id, &config.jwt_signing_key)
        .expect("Failed to create test JWT")
}
