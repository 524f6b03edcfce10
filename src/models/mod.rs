// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod bundle;
pub mod otp;
pub mod result;
pub mod user;

pub use bundle::Bundle;
pub use otp::OtpRecord;
pub use result::TestResult;
pub use test::{NewQuestion, NewTest, Question, QuestionPublic, Test};
pub use user::{ProfileUpdate, User, UserProjection};
