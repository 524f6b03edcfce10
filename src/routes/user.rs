// SPDX-License-Identifier: MIT

//! Routes for authenticated users: profile, test assignment, catalog.

use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Bundle, ProfileUpdate, Test, User};
use crate::AppState;

/// User routes (require authentication via access token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user", get(get_profile))
        .route("/api/user/details", post(update_details))
        .route("/api/user/all", get(list_users))
        .route("/api/user/assigntest", post(assign_test))
        .route("/api/user/mytests", get(my_tests))
        .route("/api/test_bundles", get(list_bundles))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get current user's profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    let profile = state
        .db
        .get_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(profile))
}

#[derive(Deserialize, Validate)]
pub struct UpdateDetailsRequest {
    #[validate(length(min = 1, message = "full name must not be empty"))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, message = "school must not be empty"))]
    pub school: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    #[validate(length(min = 7, max = 15, message = "mobile number looks wrong"))]
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Update own profile; absent fields keep their current values. The
/// updated row is returned so the frontend can re-render from it.
async fn update_details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateDetailsRequest>,
) -> Result<Json<User>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let update = ProfileUpdate {
        full_name: payload.full_name,
        school: payload.school,
        date_of_birth: payload.date_of_birth,
        gender: payload.gender,
        mobile: payload.mobile,
        city: payload.city,
        state: payload.state,
        country: payload.country,
    };

    let updated = state
        .db
        .update_profile(user.user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(updated))
}

// ─── User Listing / Assignment ───────────────────────────────

/// List all users (admin panel listing; the panel holds a user session
/// for this surface, test CRUD sits behind the admin token).
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.db.list_users().await?))
}

#[derive(Deserialize)]
pub struct AssignTestRequest {
    pub user_id: Option<i32>,
    pub test_id: Option<i32>,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Serialize)]
pub struct AssignTestResponse {
    pub id: i32,
    pub full_name: String,
    pub is_paid: bool,
    pub assigned_testid: Option<i32>,
}

/// Point a user at a test and set the paid flag. Idempotent: repeating
/// the same assignment yields the same projection.
async fn assign_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssignTestRequest>,
) -> Result<Json<AssignTestResponse>> {
    let (Some(user_id), Some(test_id)) = (payload.user_id, payload.test_id) else {
        return Err(AppError::BadRequest(
            "user_id and test_id are required".to_string(),
        ));
    };

    let user = state
        .db
        .assign_test(user_id, test_id, payload.is_paid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    tracing::info!(user_id, test_id, is_paid = payload.is_paid, "Test assigned");

    Ok(Json(AssignTestResponse {
        id: user.id,
        full_name: user.full_name,
        is_paid: user.is_paid,
        assigned_testid: user.assigned_testid,
    }))
}

/// Fetch the caller's assigned, paid-for test.
///
/// An unpaid or unassigned user gets an empty list, not an error; a
/// dangling assignment (test deleted since) is a 404.
async fn my_tests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Test>>> {
    let profile = state
        .db
        .get_user_by_id(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    let Some(test_id) = profile.assigned_testid else {
        return Ok(Json(vec![]));
    };
    if !profile.is_paid {
        return Ok(Json(vec![]));
    }

    let test = state
        .db
        .get_test(test_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Test {} not found", test_id)))?;

    Ok(Json(vec![test]))
}

// ─── Storefront ──────────────────────────────────────────────

/// List the product bundle catalog.
async fn list_bundles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Bundle>>> {
    Ok(Json(state.db.list_bundles().await?))
}
