// SPDX-License-Identifier: MIT

//! One-time password records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pending email verification code, keyed uniquely by email.
///
/// Upserted on every request (the latest code replaces any prior one) and
/// deleted once registration succeeds. Expiry is checked at verification
/// time; there is no background sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    pub email: String,
    /// 6-digit decimal code stored as text so leading zeros survive
    pub code: String,
    pub created_at: DateTime<Utc>,
}
