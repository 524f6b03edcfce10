// SPDX-License-Identifier: MIT

//! End-to-end persistence tests against a real Postgres instance.
//!
//! Each test is gated on TEST_DATABASE_URL and skips when it is unset, so
//! the suite stays green on machines without a database.
//!
//! Tests use unique email addresses per run to stay independent of prior
//! state, and the schema is created idempotently on first use.

use chrono::NaiveDate;
use testprep_api::db::Db;
use testprep_api::error::AppError;
use testprep_api::models::{NewQuestion, NewTest, ProfileUpdate};
use testprep_api::services::{otp, EmailSender};

mod common;

async fn migrated_db() -> Db {
    let db = common::test_db().await;
    db.run_migrations().await.expect("migrations must apply");
    db
}

fn unique_email(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}-{}-{}@example.com", tag, std::process::id(), nanos)
}

fn sample_test() -> NewTest {
    NewTest {
        name: "Algebra Mock 1".to_string(),
        no_of_questions: 2,
        duration_minutes: 30,
        subject: "Maths".to_string(),
        topic: "Algebra".to_string(),
        instructions: "Answer all questions.".to_string(),
        category: "mock".to_string(),
        scheduled_date: None,
    }
}

#[tokio::test]
async fn test_otp_register_flow() {
    require_database!();
    let db = migrated_db().await;
    let email = unique_email("otp-flow");

    otp::request_otp(&db, &EmailSender::Log, &email)
        .await
        .expect("request_otp should succeed for a new email");

    let record = db
        .get_otp(&email)
        .await
        .unwrap()
        .expect("a code must have been stored");
    assert_eq!(record.code.len(), 6);

    // Wrong code is rejected without consuming the stored one.
    let wrong = if record.code == "000000" { "000001" } else { "000000" };
    assert!(matches!(
        otp::verify_otp(&db, &email, wrong).await,
        Err(AppError::OtpMismatch)
    ));

    otp::verify_otp(&db, &email, &record.code)
        .await
        .expect("the stored code must verify");

    let user = db
        .insert_user("Flow User", &email, "Flow School")
        .await
        .unwrap();
    db.delete_otp(&email).await.unwrap();

    assert_eq!(user.email, email);
    assert!(!user.is_paid);
    assert!(user.assigned_testid.is_none());

    // Once deleted the code cannot be replayed.
    assert!(matches!(
        otp::verify_otp(&db, &email, &record.code).await,
        Err(AppError::NotFound(_))
    ));

    // A second registration for the same email hits the unique constraint.
    assert!(matches!(
        db.insert_user("Flow User", &email, "Flow School").await,
        Err(AppError::DuplicateAccount)
    ));
}

#[tokio::test]
async fn test_otp_expiry_via_backdated_row() {
    require_database!();
    let db = migrated_db().await;
    let email = unique_email("otp-expiry");

    db.upsert_otp(&email, "123456").await.unwrap();

    // Backdate past the ten minute window through a side connection.
    let url = std::env::var("TEST_DATABASE_URL").unwrap();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .unwrap();
    sqlx::query("UPDATE otps SET created_at = NOW() - INTERVAL '11 minutes' WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();

    assert!(matches!(
        otp::verify_otp(&db, &email, "123456").await,
        Err(AppError::OtpExpired)
    ));

    db.delete_otp(&email).await.unwrap();
}

#[tokio::test]
async fn test_assign_test_and_my_tests_gating() {
    require_database!();
    let db = migrated_db().await;
    let email = unique_email("assign");

    let user = db.insert_user("Assignee", &email, "School").await.unwrap();
    let test = db.insert_test(&sample_test()).await.unwrap();

    // Unassigned and unpaid to start.
    assert!(user.assigned_testid.is_none());
    assert!(!user.is_paid);

    let updated = db
        .assign_test(user.id, test.id, true)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(updated.assigned_testid, Some(test.id));
    assert!(updated.is_paid);

    // Reassignment is idempotent.
    let again = db.assign_test(user.id, test.id, true).await.unwrap().unwrap();
    assert_eq!(again.assigned_testid, Some(test.id));

    // Unknown user yields no row rather than an error.
    assert!(db.assign_test(-1, test.id, true).await.unwrap().is_none());

    // Deleting the assigned test nulls the reference instead of orphaning it.
    assert!(db.delete_test(test.id).await.unwrap());
    let after = db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert!(after.assigned_testid.is_none());
}

#[tokio::test]
async fn test_question_crud_and_cascade() {
    require_database!();
    let db = migrated_db().await;

    let test = db.insert_test(&sample_test()).await.unwrap();

    let q1 = db
        .insert_question(&NewQuestion {
            test_id: test.id,
            question_text: "2 + 2 = ?".to_string(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct_option: "4".to_string(),
            marks: 4,
            image_url: None,
        })
        .await
        .unwrap();

    let questions = db.list_questions(test.id).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].correct_option, "4");

    let edited = db
        .update_question(
            q1.id,
            &NewQuestion {
                test_id: test.id,
                question_text: "2 + 3 = ?".to_string(),
                options: vec!["4".into(), "5".into(), "6".into(), "7".into()],
                correct_option: "5".to_string(),
                marks: 4,
                image_url: None,
            },
        )
        .await
        .unwrap()
        .expect("question exists");
    assert_eq!(edited.question_text, "2 + 3 = ?");
    assert_eq!(edited.correct_option, "5");

    // Deleting the parent test removes its questions.
    assert!(db.delete_test(test.id).await.unwrap());
    assert!(db.list_questions(test.id).await.unwrap().is_empty());
    assert!(!db.delete_question(q1.id).await.unwrap());
}

#[tokio::test]
async fn test_results_track_highest_score() {
    require_database!();
    let db = migrated_db().await;
    let email = unique_email("results");

    let user = db.insert_user("Scorer", &email, "School").await.unwrap();
    let test = db.insert_test(&sample_test()).await.unwrap();

    assert_eq!(db.best_score(user.id, test.id).await.unwrap(), None);

    let first = db.insert_result(user.id, test.id, 8, 8).await.unwrap();
    assert_eq!(first.score, 8);
    assert_eq!(first.highest_score, Some(8));

    // A lower second attempt keeps the earlier best.
    let best = db.best_score(user.id, test.id).await.unwrap().unwrap();
    let second = db
        .insert_result(user.id, test.id, 4, best.max(4))
        .await
        .unwrap();
    assert_eq!(second.score, 4);
    assert_eq!(second.highest_score, Some(8));

    let history = db.list_results(user.id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_profile_update_round_trip() {
    require_database!();
    let db = migrated_db().await;
    let email = unique_email("profile");

    let user = db.insert_user("Profile User", &email, "Old School").await.unwrap();

    let updated = db
        .update_profile(
            user.id,
            &ProfileUpdate {
                full_name: None,
                school: Some("New School".to_string()),
                date_of_birth: NaiveDate::from_ymd_opt(2008, 4, 15),
                gender: Some("female".to_string()),
                mobile: Some("9876543210".to_string()),
                city: Some("Pune".to_string()),
                state: None,
                country: Some("India".to_string()),
            },
        )
        .await
        .unwrap()
        .expect("user exists");

    // Untouched fields survive the partial update.
    assert_eq!(updated.full_name, "Profile User");
    assert_eq!(updated.school, "New School");
    assert_eq!(updated.date_of_birth, NaiveDate::from_ymd_opt(2008, 4, 15));
    assert_eq!(updated.city.as_deref(), Some("Pune"));
    assert!(updated.state.is_none());

    let reloaded = db.get_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.school, "New School");
    assert_eq!(reloaded.country.as_deref(), Some("India"));
}
