// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod place;
pub mod user;

pub use place::{Accessibility, Comment, ImageRef, Place};
pub use user::{User, UserResponse};
