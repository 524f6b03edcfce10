// SPDX-License-Identifier: MIT

//! Testprep API Server
//!
//! Serves registration with OTP verification, login and Google sign-in,
//! JWT access/refresh sessions, test taking with scoring, the admin
//! panel, and the product-bundle storefront.

use std::sync::Arc;
use testprep_api::{
    config::Config,
    db::Db,
    services::{EmailSender, GoogleIdentityVerifier},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Testprep API");

    // Connect to Postgres and bring the schema up to date
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");
    db.run_migrations()
        .await
        .expect("Failed to apply schema migrations");

    // OTP delivery channel
    let mailer = EmailSender::from_config(&config).expect("Failed to initialize email sender");

    // Google sign-in verifier
    let google_verifier = Arc::new(
        GoogleIdentityVerifier::new(&config.google_client_id)
            .expect("Failed to initialize Google identity verifier"),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        mailer,
        google_verifier,
    });

    // Build router
    let app = testprep_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("testprep_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
