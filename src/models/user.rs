// SPDX-License-Identifier: MIT

//! User model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// User row as stored in Postgres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    /// Unique email (or phone, for accounts registered that way)
    pub email: String,
    pub school: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// Whether the assigned test has been paid for
    pub is_paid: bool,
    /// Currently assigned test, nulled when that test is deleted
    pub assigned_testid: Option<i32>,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub school: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Minimal projection returned by login / refresh responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProjection {
    pub id: i32,
    pub full_name: String,
}

impl From<&User> for UserProjection {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
        }
    }
}
