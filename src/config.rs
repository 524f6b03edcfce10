// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see an
//! immutable `Config` inside the shared state.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Postgres connection string
    pub database_url: String,
    /// Frontend URL for CORS and email links
    pub frontend_url: String,
    /// Google OAuth client ID (public, used as the expected `aud` claim)
    pub google_client_id: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Signing secret for short-lived access tokens
    pub access_secret: Vec<u8>,
    /// Signing secret for refresh tokens (cookie-only)
    pub refresh_secret: Vec<u8>,
    /// Signing secret for admin tokens
    pub jwt_secret: Vec<u8>,
    /// Admin username; admin login fails closed when absent
    pub admin_username: Option<String>,
    /// Hex-encoded SHA-256 of the admin password; fails closed when absent
    pub admin_password_hash: Option<String>,

    // --- Email delivery ---
    /// Sender address handed to the mail relay
    pub email_user: Option<String>,
    /// Credential for the mail relay
    pub email_pass: Option<String>,
    /// HTTP mail relay endpoint; OTP emails are logged when unset
    pub email_api_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            access_secret: env::var("ACCESS_SECRET")
                .map_err(|_| ConfigError::Missing("ACCESS_SECRET"))?
                .into_bytes(),
            refresh_secret: env::var("REFRESH_SECRET")
                .map_err(|_| ConfigError::Missing("REFRESH_SECRET"))?
                .into_bytes(),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            admin_username: env::var("ADMIN_USERNAME").ok().map(|v| v.trim().to_string()),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH")
                .ok()
                .map(|v| v.trim().to_lowercase()),

            email_user: env::var("EMAIL_USER").ok(),
            email_pass: env::var("EMAIL_PASS").ok(),
            email_api_url: env::var("EMAIL_API_URL").ok(),
        })
    }

    /// Fixed config for tests; secrets are well-known throwaway values.
    pub fn test_default() -> Self {
        Self {
            database_url: "postgres://localhost/testprep_test".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            port: 8080,
            access_secret: b"test_access_secret_32_bytes_min!".to_vec(),
            refresh_secret: b"test_refresh_secret_32_bytes_ok!".to_vec(),
            jwt_secret: b"test_admin_secret_32_bytes_long!".to_vec(),
            admin_username: Some("admin".to_string()),
            // sha256("test-admin-password")
            admin_password_hash: Some(
                "f7a03f48c0e2aa2d5e55ca186c20032ddbf53b7f5f93fce387d65c3f83433e8d".to_string(),
            ),
            email_user: None,
            email_pass: None,
            email_api_url: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Process environment is shared; tests that mutate it take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();

        env::set_var("DATABASE_URL", "postgres://localhost/testprep");
        env::set_var("GOOGLE_CLIENT_ID", "cid.apps.googleusercontent.com");
        env::set_var("ACCESS_SECRET", "access_secret_32_bytes_minimum!!");
        env::set_var("REFRESH_SECRET", "refresh_secret_32_bytes_minimum!");
        env::set_var("JWT_SECRET", "admin_secret_32_bytes_minimum!!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.database_url, "postgres://localhost/testprep");
        assert_eq!(config.google_client_id, "cid.apps.googleusercontent.com");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_admin_hash_is_normalized() {
        let _guard = ENV_LOCK.lock().unwrap();

        env::set_var("DATABASE_URL", "postgres://localhost/testprep");
        env::set_var("GOOGLE_CLIENT_ID", "cid");
        env::set_var("ACCESS_SECRET", "a");
        env::set_var("REFRESH_SECRET", "r");
        env::set_var("JWT_SECRET", "j");
        env::set_var("ADMIN_PASSWORD_HASH", " ABCDEF0123 ");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.admin_password_hash.as_deref(), Some("abcdef0123"));
    }
}
