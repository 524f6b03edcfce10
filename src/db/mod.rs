// SPDX-License-Identifier: MIT

//! Database layer (Postgres via sqlx) with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts, profiles, test assignment)
//! - OTPs (pending email verification codes)
//! - Tests and Questions (admin-managed content)
//! - Results (scored submissions)
//! - Bundles (read-only storefront catalog)
//!
//! All statements are parameterized; no multi-statement transactions are
//! used (read-then-write sequences are an accepted consistency gap at
//! current volumes).

pub mod migrations;

use crate::error::AppError;
use crate::models::{
    Bundle, NewQuestion, NewTest, OtpRecord, ProfileUpdate, Question, Test, TestResult, User,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

const MAX_CONNECTIONS: u32 = 5;

/// Postgres database client.
#[derive(Clone)]
pub struct Db {
    pool: Option<PgPool>,
}

impl Db {
    /// Connect to Postgres and return a pooled client.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Postgres: {}", e)))?;

        tracing::info!("Connected to Postgres");

        Ok(Self { pool: Some(pool) })
    }

    /// Wrap an existing pool (used by integration tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { pool: None }
    }

    /// Helper to get the pool or return an error if offline.
    fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Apply the forward migration in order.
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        let pool = self.pool()?;
        for statement in migrations::MIGRATIONS_UP {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        }
        tracing::info!(
            statements = migrations::MIGRATIONS_UP.len(),
            "Schema migrations applied"
        );
        Ok(())
    }

    /// Drop all tables in reverse creation order.
    pub async fn drop_schema(&self) -> Result<(), AppError> {
        let pool = self.pool()?;
        for statement in migrations::MIGRATIONS_DOWN {
            sqlx::query(statement)
                .execute(pool)
                .await
                .map_err(|e| AppError::Database(format!("Drop migration failed: {}", e)))?;
        }
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    /// Get a user by id.
    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    /// Create a user row after a verified registration or first Google sign-in.
    pub async fn insert_user(
        &self,
        full_name: &str,
        email: &str,
        school: &str,
    ) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (full_name, email, school) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(full_name)
        .bind(email)
        .bind(school)
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateAccount,
            _ => AppError::Database(e.to_string()),
        })?;

        Ok(user_from_row(&row))
    }

    /// Update a user's profile fields; each None leaves the column untouched.
    pub async fn update_profile(
        &self,
        id: i32,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            r"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                school = COALESCE($3, school),
                date_of_birth = COALESCE($4, date_of_birth),
                gender = COALESCE($5, gender),
                mobile = COALESCE($6, mobile),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                country = COALESCE($9, country)
            WHERE id = $1
            RETURNING {}
            ",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.full_name.as_deref())
        .bind(update.school.as_deref())
        .bind(update.date_of_birth)
        .bind(update.gender.as_deref())
        .bind(update.mobile.as_deref())
        .bind(update.city.as_deref())
        .bind(update.state.as_deref())
        .bind(update.country.as_deref())
        .fetch_optional(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    /// List all users (admin panel listing).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Set a user's assigned test and paid flag; returns None if no such user.
    pub async fn assign_test(
        &self,
        user_id: i32,
        test_id: i32,
        is_paid: bool,
    ) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET assigned_testid = $2, is_paid = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(test_id)
        .bind(is_paid)
        .fetch_optional(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| user_from_row(&r)))
    }

    // ─── OTP Operations ──────────────────────────────────────────

    /// Store a code for an email, replacing any prior one and refreshing
    /// the timestamp.
    pub async fn upsert_otp(&self, email: &str, code: &str) -> Result<(), AppError> {
        sqlx::query(
            r"
            INSERT INTO otps (email, code, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (email)
            DO UPDATE SET code = EXCLUDED.code, created_at = NOW()
            ",
        )
        .bind(email)
        .bind(code)
        .execute(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch the pending code for an email, if any.
    pub async fn get_otp(&self, email: &str) -> Result<Option<OtpRecord>, AppError> {
        let row = sqlx::query("SELECT email, code, created_at FROM otps WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| OtpRecord {
            email: r.get("email"),
            code: r.get("code"),
            created_at: r.get("created_at"),
        }))
    }

    /// Remove the pending code for an email.
    pub async fn delete_otp(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM otps WHERE email = $1")
            .bind(email)
            .execute(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Test Operations ─────────────────────────────────────────

    pub async fn insert_test(&self, new: &NewTest) -> Result<Test, AppError> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO tests
                (name, no_of_questions, duration_minutes, subject, topic,
                 instructions, category, scheduled_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            ",
            TEST_COLUMNS
        ))
        .bind(&new.name)
        .bind(new.no_of_questions)
        .bind(new.duration_minutes)
        .bind(&new.subject)
        .bind(&new.topic)
        .bind(&new.instructions)
        .bind(&new.category)
        .bind(new.scheduled_date)
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(test_from_row(&row))
    }

    pub async fn get_test(&self, id: i32) -> Result<Option<Test>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM tests WHERE id = $1", TEST_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| test_from_row(&r)))
    }

    pub async fn list_tests(&self) -> Result<Vec<Test>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM tests ORDER BY id", TEST_COLUMNS))
            .fetch_all(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.iter().map(test_from_row).collect())
    }

    /// Delete a test; questions cascade and user assignments are nulled
    /// by the schema's foreign keys.
    pub async fn delete_test(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tests WHERE id = $1")
            .bind(id)
            .execute(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Question Operations ─────────────────────────────────────

    pub async fn insert_question(&self, new: &NewQuestion) -> Result<Question, AppError> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO questions
                (test_id, question_text, options, correct_option, marks, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            ",
            QUESTION_COLUMNS
        ))
        .bind(new.test_id)
        .bind(&new.question_text)
        .bind(&new.options)
        .bind(&new.correct_option)
        .bind(new.marks)
        .bind(new.image_url.as_deref())
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(question_from_row(&row))
    }

    pub async fn update_question(
        &self,
        id: i32,
        new: &NewQuestion,
    ) -> Result<Option<Question>, AppError> {
        let row = sqlx::query(&format!(
            r"
            UPDATE questions SET
                question_text = $2,
                options = $3,
                correct_option = $4,
                marks = $5,
                image_url = $6
            WHERE id = $1
            RETURNING {}
            ",
            QUESTION_COLUMNS
        ))
        .bind(id)
        .bind(&new.question_text)
        .bind(&new.options)
        .bind(&new.correct_option)
        .bind(new.marks)
        .bind(new.image_url.as_deref())
        .fetch_optional(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|r| question_from_row(&r)))
    }

    pub async fn delete_question(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(self.pool()?)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_questions(&self, test_id: i32) -> Result<Vec<Question>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM questions WHERE test_id = $1 ORDER BY id",
            QUESTION_COLUMNS
        ))
        .bind(test_id)
        .fetch_all(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.iter().map(question_from_row).collect())
    }

    // ─── Result Operations ───────────────────────────────────────

    /// Best score across prior submissions for this user and test.
    pub async fn best_score(&self, user_id: i32, test_id: i32) -> Result<Option<i32>, AppError> {
        let row =
            sqlx::query("SELECT MAX(score) AS best FROM results WHERE user_id = $1 AND test_id = $2")
                .bind(user_id)
                .bind(test_id)
                .fetch_one(self.pool()?)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.get("best"))
    }

    pub async fn insert_result(
        &self,
        user_id: i32,
        test_id: i32,
        score: i32,
        highest_score: i32,
    ) -> Result<TestResult, AppError> {
        let row = sqlx::query(
            r"
            INSERT INTO results (user_id, test_id, score, highest_score, submitted_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, test_id, score, highest_score, submitted_at
            ",
        )
        .bind(user_id)
        .bind(test_id)
        .bind(score)
        .bind(highest_score)
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result_from_row(&row))
    }

    pub async fn list_results(&self, user_id: i32) -> Result<Vec<TestResult>, AppError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, test_id, score, highest_score, submitted_at
            FROM results
            WHERE user_id = $1
            ORDER BY submitted_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows.iter().map(result_from_row).collect())
    }

    // ─── Bundle Operations ───────────────────────────────────────

    pub async fn list_bundles(&self) -> Result<Vec<Bundle>, AppError> {
        let rows = sqlx::query(
            r"
            SELECT id, slug, name, description, price, features, image_url, category
            FROM test_bundles
            ORDER BY id
            ",
        )
        .fetch_all(self.pool()?)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|r| Bundle {
                id: r.get("id"),
                slug: r.get("slug"),
                name: r.get("name"),
                description: r.get("description"),
                price: r.get("price"),
                features: r.get("features"),
                image_url: r.get("image_url"),
                category: r.get("category"),
            })
            .collect())
    }
}

const USER_COLUMNS: &str = "id, full_name, email, school, date_of_birth, gender, mobile, \
                            city, state, country, is_paid, assigned_testid";

const TEST_COLUMNS: &str = "id, name, no_of_questions, duration_minutes, subject, topic, \
                            instructions, category, scheduled_date";

const QUESTION_COLUMNS: &str =
    "id, test_id, question_text, options, correct_option, marks, image_url";

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        full_name: row.get("full_name"),
        email: row.get("email"),
        school: row.get("school"),
        date_of_birth: row.get("date_of_birth"),
        gender: row.get("gender"),
        mobile: row.get("mobile"),
        city: row.get("city"),
        state: row.get("state"),
        country: row.get("country"),
        is_paid: row.get("is_paid"),
        assigned_testid: row.get("assigned_testid"),
    }
}

fn test_from_row(row: &PgRow) -> Test {
    Test {
        id: row.get("id"),
        name: row.get("name"),
        no_of_questions: row.get("no_of_questions"),
        duration_minutes: row.get("duration_minutes"),
        subject: row.get("subject"),
        topic: row.get("topic"),
        instructions: row.get("instructions"),
        category: row.get("category"),
        scheduled_date: row.get("scheduled_date"),
    }
}

fn question_from_row(row: &PgRow) -> Question {
    Question {
        id: row.get("id"),
        test_id: row.get("test_id"),
        question_text: row.get("question_text"),
        options: row.get("options"),
        correct_option: row.get("correct_option"),
        marks: row.get("marks"),
        image_url: row.get("image_url"),
    }
}

fn result_from_row(row: &PgRow) -> TestResult {
    TestResult {
        id: row.get("id"),
        user_id: row.get("user_id"),
        test_id: row.get("test_id"),
        score: row.get("score"),
        highest_score: row.get("highest_score"),
        submitted_at: row.get("submitted_at"),
    }
}
