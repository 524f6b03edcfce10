// SPDX-License-Identifier: MIT

//! Bearer-token authentication middleware.
//!
//! Two unrelated guards: `require_auth` validates user access tokens,
//! `require_admin` validates the admin token (separate secret, separate
//! claim shape, role check).

use crate::services::session;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated user extracted from an access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
}

/// Authenticated admin extracted from an admin token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Middleware that requires a valid user access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = session::verify_access_token(token, &state.config.access_secret)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id: i32 = claims.sub.parse().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let auth_user = AuthUser {
        user_id,
        email: claims.email,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that requires a valid admin token with the admin role claim.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = session::verify_admin_token(token, &state.config.jwt_secret)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let admin = AdminUser {
        username: claims.sub,
    };
    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}
