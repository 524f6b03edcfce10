// SPDX-License-Identifier: MIT

//! OTP issuance and verification.
//!
//! Codes are 6 decimal digits stored as text so leading zeros survive,
//! keyed uniquely by email, and valid for 10 minutes from issuance.

use crate::db::Db;
use crate::error::AppError;
use crate::services::email::EmailSender;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Validity window checked at verification time (no background sweep).
pub const OTP_TTL_MINUTES: i64 = 10;

/// Generate a uniformly random 6-digit code, leading zeros preserved.
pub fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", n)
}

fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at) > Duration::minutes(OTP_TTL_MINUTES)
}

/// Issue a code for `email` and dispatch it.
///
/// Fails with `DuplicateAccount` if a user already holds this email.
/// The OTP row is written before the send, so a failed delivery leaves
/// the code in place for a resend.
pub async fn request_otp(db: &Db, mailer: &EmailSender, email: &str) -> Result<(), AppError> {
    if db.get_user_by_email(email).await?.is_some() {
        return Err(AppError::DuplicateAccount);
    }

    let code = generate_code();
    db.upsert_otp(email, &code).await?;

    mailer.send_otp(email, &code).await?;

    tracing::info!(email = %email, "OTP issued");
    Ok(())
}

/// Check a submitted code against the stored record.
///
/// The caller must delete the record after a successful registration.
pub async fn verify_otp(db: &Db, email: &str, code: &str) -> Result<(), AppError> {
    let record = db
        .get_otp(email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No pending verification for {}", email)))?;

    if record.code != code {
        return Err(AppError::OtpMismatch);
    }

    if is_expired(record.created_at, Utc::now()) {
        return Err(AppError::OtpExpired);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_leading_zeros_preserved() {
        // The formatting path, independent of the RNG draw.
        assert_eq!(format!("{:06}", 7u32), "000007");
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        assert!(!is_expired(now - Duration::minutes(9), now));
        assert!(!is_expired(now - Duration::minutes(10), now));
        assert!(is_expired(now - Duration::minutes(10) - Duration::seconds(1), now));
    }
}
