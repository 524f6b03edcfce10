// SPDX-License-Identifier: MIT

//! Admin panel routes: credential exchange and test/question CRUD.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{NewQuestion, NewTest, Question, Test};
use crate::services::session;
use crate::AppState;

/// Public admin routes (credential exchange only).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/login", post(admin_login))
}

/// Admin CRUD routes; the admin-token middleware is applied in
/// routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/tests", get(list_tests).post(create_test))
        .route("/api/admin/tests/{id}", delete(delete_test))
        .route("/api/admin/tests/{id}/questions", get(list_questions))
        .route("/api/admin/questions", post(create_question))
        .route(
            "/api/admin/questions/{id}",
            put(update_question).delete(delete_question),
        )
}

// ─── Credential Exchange ─────────────────────────────────────

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

/// Exchange configured admin credentials for an 8-hour admin token.
async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>> {
    let token = session::admin_login(&state.config, &payload.username, &payload.password)?;

    tracing::info!(username = %payload.username, "Admin logged in");

    Ok(Json(AdminLoginResponse { token }))
}

// ─── Test CRUD ───────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, message = "test name is required"))]
    pub name: String,
    pub no_of_questions: i32,
    #[validate(range(min = 1, message = "duration must be positive"))]
    pub duration_minutes: i32,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub category: String,
    pub scheduled_date: Option<chrono::NaiveDate>,
}

async fn create_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<Json<Test>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let test = state
        .db
        .insert_test(&NewTest {
            name: payload.name,
            no_of_questions: payload.no_of_questions,
            duration_minutes: payload.duration_minutes,
            subject: payload.subject,
            topic: payload.topic,
            instructions: payload.instructions,
            category: payload.category,
            scheduled_date: payload.scheduled_date,
        })
        .await?;

    tracing::info!(test_id = test.id, name = %test.name, "Test created");

    Ok(Json(test))
}

async fn list_tests(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Test>>> {
    Ok(Json(state.db.list_tests().await?))
}

/// Delete a test. Questions cascade; user assignments are nulled.
async fn delete_test(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    if !state.db.delete_test(id).await? {
        return Err(AppError::NotFound(format!("Test {} not found", id)));
    }

    tracing::info!(test_id = id, "Test deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}

// ─── Question CRUD ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct QuestionRequest {
    pub test_id: i32,
    #[validate(length(min = 1, message = "question text is required"))]
    pub question_text: String,
    #[validate(length(min = 2, message = "at least two options are required"))]
    pub options: Vec<String>,
    #[validate(length(min = 1, message = "correct option is required"))]
    pub correct_option: String,
    #[validate(range(min = 1, message = "marks must be positive"))]
    pub marks: i32,
    pub image_url: Option<String>,
}

impl QuestionRequest {
    fn into_new_question(self) -> NewQuestion {
        NewQuestion {
            test_id: self.test_id,
            question_text: self.question_text,
            options: self.options,
            correct_option: self.correct_option,
            marks: self.marks,
            image_url: self.image_url,
        }
    }
}

async fn create_question(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<Question>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // Every question must reference a live test.
    if state.db.get_test(payload.test_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Test {} not found",
            payload.test_id
        )));
    }

    let question = state
        .db
        .insert_question(&payload.into_new_question())
        .await?;

    Ok(Json(question))
}

async fn update_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<QuestionRequest>,
) -> Result<Json<Question>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let question = state
        .db
        .update_question(id, &payload.into_new_question())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;

    Ok(Json(question))
}

async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    if !state.db.delete_question(id).await? {
        return Err(AppError::NotFound(format!("Question {} not found", id)));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

async fn list_questions(
    State(state): State<Arc<AppState>>,
    Path(test_id): Path<i32>,
) -> Result<Json<Vec<Question>>> {
    Ok(Json(state.db.list_questions(test_id).await?))
}
