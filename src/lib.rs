// SPDX-License-Identifier: MIT

//! Testprep API: backend for an online test-preparation platform.
//!
//! Covers OTP-verified registration, login and Google sign-in, JWT
//! access/refresh sessions, test taking and scoring, the admin panel,
//! and the bundle storefront.

pub mod attempt;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Db;
use services::{EmailSender, GoogleIdentityVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub mailer: EmailSender,
    pub google_verifier: Arc<GoogleIdentityVerifier>,
}
