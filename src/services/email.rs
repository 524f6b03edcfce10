// SPDX-License-Identifier: MIT

//! Email delivery for OTP codes.
//!
//! The sender decides how to deliver. `Http` posts to a mail relay API
//! configured via `EMAIL_API_URL`; `Log` is the local-dev fallback that
//! logs the code and reports success.

use crate::config::Config;
use crate::error::AppError;
use serde::Serialize;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// OTP delivery channel, chosen once at startup.
#[derive(Clone)]
pub enum EmailSender {
    /// Log the message instead of sending (local development).
    Log,
    /// Deliver through an HTTP mail relay.
    Http {
        client: reqwest::Client,
        api_url: String,
        from: String,
        credential: Option<String>,
    },
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
}

impl EmailSender {
    /// Build a sender from config; falls back to `Log` when no relay is set.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let (Some(api_url), Some(from)) = (&config.email_api_url, &config.email_user) else {
            tracing::warn!("EMAIL_API_URL/EMAIL_USER not set; OTP emails will be logged only");
            return Ok(Self::Log);
        };

        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::Delivery(format!("failed building mail client: {}", e)))?;

        Ok(Self::Http {
            client,
            api_url: api_url.clone(),
            from: from.clone(),
            credential: config.email_pass.clone(),
        })
    }

    /// Send a one-time code to `to`. Fails with `Delivery` if the relay
    /// rejects the message; the caller's stored OTP row persists regardless.
    pub async fn send_otp(&self, to: &str, code: &str) -> Result<(), AppError> {
        match self {
            Self::Log => {
                tracing::info!(to = %to, code = %code, "OTP email send stub");
                Ok(())
            }
            Self::Http {
                client,
                api_url,
                from,
                credential,
            } => {
                let message = RelayMessage {
                    from,
                    to,
                    subject: "Your verification code",
                    text: format!(
                        "Your verification code is {}. It expires in 10 minutes.",
                        code
                    ),
                };

                let mut request = client.post(api_url).json(&message);
                if let Some(pass) = credential {
                    request = request.basic_auth(from, Some(pass));
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| AppError::Delivery(format!("mail relay request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(AppError::Delivery(format!(
                        "mail relay returned status {}",
                        response.status()
                    )));
                }

                tracing::info!(to = %to, "OTP email dispatched");
                Ok(())
            }
        }
    }
}
