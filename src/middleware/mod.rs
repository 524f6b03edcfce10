// SPDX-License-Identifier: MIT

//! Middleware modules (authentication).

pub mod auth;

pub use auth::{require_admin, require_auth, AdminUser, AuthUser};
