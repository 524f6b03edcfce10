// SPDX-License-Identifier: MIT

//! Session credential minting and verification.
//!
//! Three signed credentials, each with its own secret:
//! - access token: 15 minutes, returned in response bodies, sent as a bearer
//! - refresh token: 7 days, delivered only via the HTTP-only cookie
//! - admin token: 8 hours, role claim, structurally unrelated to the others
//!
//! Access and refresh tokens share one claim shape (`sub` = user id, `email`)
//! on every path that mints them.

use crate::config::Config;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

pub const ACCESS_TTL_SECS: usize = 15 * 60;
pub const REFRESH_TTL_SECS: usize = 7 * 24 * 60 * 60;
pub const ADMIN_TTL_SECS: usize = 8 * 60 * 60;

/// Claims carried by user access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// User id as a string
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Claims carried by the admin token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

fn now_unix_secs() -> anyhow::Result<usize> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize)
}

fn mint(user_id: i32, email: &str, ttl_secs: usize, secret: &[u8]) -> anyhow::Result<String> {
    let now = now_unix_secs()?;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Mint a 15-minute access token.
pub fn mint_access_token(user_id: i32, email: &str, secret: &[u8]) -> anyhow::Result<String> {
    mint(user_id, email, ACCESS_TTL_SECS, secret)
}

/// Mint a 7-day refresh token (cookie-only).
pub fn mint_refresh_token(user_id: i32, email: &str, secret: &[u8]) -> anyhow::Result<String> {
    mint(user_id, email, REFRESH_TTL_SECS, secret)
}

fn verify(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    let key = DecodingKey::from_secret(secret);
    let validation = Validation::new(Algorithm::HS256);
    decode::<SessionClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Verify a bearer access token; None on any failure.
pub fn verify_access_token(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    verify(token, secret)
}

/// Verify a refresh token taken from the cookie; None on any failure.
pub fn verify_refresh_token(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    verify(token, secret)
}

/// Mint an 8-hour admin token with an embedded role claim.
pub fn mint_admin_token(username: &str, secret: &[u8]) -> anyhow::Result<String> {
    let now = now_unix_secs()?;
    let claims = AdminClaims {
        sub: username.to_string(),
        role: "admin".to_string(),
        iat: now,
        exp: now + ADMIN_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Verify an admin token, requiring the admin role claim.
pub fn verify_admin_token(token: &str, secret: &[u8]) -> Option<AdminClaims> {
    let key = DecodingKey::from_secret(secret);
    let validation = Validation::new(Algorithm::HS256);
    let claims = decode::<AdminClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)?;

    if claims.role != "admin" {
        return None;
    }

    Some(claims)
}

/// Exchange admin credentials for a token.
///
/// Fails closed with `ServerConfiguration` when the admin username or
/// password hash is absent from the environment, rather than allowing a
/// blank-credential bypass. The password is compared as SHA-256 digests
/// in constant time.
pub fn admin_login(config: &Config, username: &str, password: &str) -> Result<String, AppError> {
    let expected_username = config
        .admin_username
        .as_deref()
        .ok_or_else(|| AppError::ServerConfiguration("ADMIN_USERNAME is not set".to_string()))?;
    let expected_hash_hex = config.admin_password_hash.as_deref().ok_or_else(|| {
        AppError::ServerConfiguration("ADMIN_PASSWORD_HASH is not set".to_string())
    })?;

    let expected_hash = hex::decode(expected_hash_hex).map_err(|_| {
        AppError::ServerConfiguration("ADMIN_PASSWORD_HASH is not valid hex".to_string())
    })?;

    let submitted_hash = Sha256::digest(password.as_bytes());

    let username_ok = username.as_bytes().ct_eq(expected_username.as_bytes());
    let password_ok = submitted_hash.as_slice().ct_eq(&expected_hash);

    if !bool::from(username_ok & password_ok) {
        return Err(AppError::Unauthenticated);
    }

    mint_admin_token(username, &config.jwt_secret).map_err(AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_access_token_round_trip() {
        let token = mint_access_token(42, "user@x.com", SECRET).unwrap();
        let claims = verify_access_token(&token, SECRET).expect("token should verify");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "user@x.com");
        assert_eq!(claims.exp - claims.iat, ACCESS_TTL_SECS);
    }

    #[test]
    fn test_refresh_token_not_valid_as_access_token() {
        let access_secret = b"access_secret_32_bytes_minimum!!";
        let refresh_secret = b"refresh_secret_32_bytes_minimum!";

        let refresh = mint_refresh_token(7, "u@x.com", refresh_secret).unwrap();
        assert!(verify_access_token(&refresh, access_secret).is_none());
        assert!(verify_refresh_token(&refresh, refresh_secret).is_some());
    }

    #[test]
    fn test_admin_token_carries_role_and_ttl() {
        let token = mint_admin_token("admin", SECRET).unwrap();
        let claims = verify_admin_token(&token, SECRET).expect("token should verify");

        assert_eq!(claims.role, "admin");
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, ADMIN_TTL_SECS);
    }

    #[test]
    fn test_admin_token_rejects_session_claims() {
        // A user token must never pass the admin check, even with the
        // admin secret.
        let token = mint_access_token(1, "user@x.com", SECRET).unwrap();
        assert!(verify_admin_token(&token, SECRET).is_none());
    }

    #[test]
    fn test_admin_login_wrong_password() {
        let config = Config::test_default();
        let err = admin_login(&config, "admin", "wrong-password").unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[test]
    fn test_admin_login_correct_credentials() {
        let config = Config::test_default();
        let token = admin_login(&config, "admin", "test-admin-password").unwrap();
        let claims = verify_admin_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_admin_login_fails_closed_without_config() {
        let mut config = Config::test_default();
        config.admin_password_hash = None;

        let err = admin_login(&config, "admin", "").unwrap_err();
        assert!(matches!(err, AppError::ServerConfiguration(_)));
    }
}
