// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod email;
pub mod google_identity;
pub mod otp;
pub mod session;

pub use email::EmailSender;
pub use google_identity::{GoogleAuthError, GoogleIdentityVerifier, GoogleUser};
