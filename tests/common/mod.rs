// SPDX-License-Identifier: MIT

use std::sync::Arc;
use testprep_api::config::Config;
use testprep_api::db::Db;
use testprep_api::routes::create_router;
use testprep_api::services::{EmailSender, GoogleIdentityVerifier};
use testprep_api::AppState;

/// Check if a test database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Skip test with message if no test database is available.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: TEST_DATABASE_URL not set");
            return;
        }
    };
}

/// Create a test database connection from TEST_DATABASE_URL.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    Db::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> Db {
    Db::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let mailer = EmailSender::Log;
    let google_verifier = Arc::new(
        GoogleIdentityVerifier::new(&config.google_client_id)
            .expect("Failed to build verifier"),
    );

    let state = Arc::new(AppState {
        config,
        db,
        mailer,
        google_verifier,
    });

    (create_router(state.clone()), state)
}
