// SPDX-License-Identifier: MIT

//! Scored test results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scored submission; cascade-deleted with its user or test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i32,
    pub user_id: i32,
    pub test_id: i32,
    pub score: i32,
    /// Best score across this user's submissions for the test
    pub highest_score: Option<i32>,
    pub submitted_at: DateTime<Utc>,
}
