// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, ownership, security).

pub mod auth;
pub mod owner;
pub mod security;

pub use auth::require_auth;
pub use owner::{require_owner, EntityKind};
