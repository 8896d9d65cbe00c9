// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Urbex API: location sharing for urban explorers
//!
//! This crate provides the backend API for posting abandoned places with
//! photos, commenting on them, and keeping per-user favorites in step
//! with each place's like counter.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::UploadStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub uploads: UploadStore,
}
