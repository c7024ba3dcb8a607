// src/error.rs
//! Error types for each collaborator the run talks to.
//!
//! The split follows the blast radius of a failure: an `UpstreamError` on
//! the initial order fetch ends the run, every other error is confined to
//! the order being processed, and a `NotifyError` is only ever logged.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::types::ValidationError;
use thiserror::Error;

/// Invalid or incomplete process configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration: {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{key}: {source}")]
    Validation {
        key: &'static str,
        #[source]
        source: ValidationError,
    },
}

/// The commerce webservice could not serve a request.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Commerce API unreachable at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Commerce API returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// The templating service could not produce an email.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template API unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Template API returned HTTP {0}")]
    Status(u16),

    #[error("Template API returned malformed content: {0}")]
    MalformedContent(String),
}

/// SMTP delivery failed.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// An operator notification channel failed. Logged, never propagated.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Webhook(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {status}: {body}")]
    WebhookStatus { status: u16, body: String },

    #[error("Notification email failed: {0}")]
    Email(#[from] MailError),

    #[error("Notification template render error: {0}")]
    Render(String),
}

impl From<handlebars::RenderError> for NotifyError {
    fn from(err: handlebars::RenderError) -> Self {
        NotifyError::Render(err.to_string())
    }
}

impl From<handlebars::TemplateError> for NotifyError {
    fn from(err: handlebars::TemplateError) -> Self {
        NotifyError::Render(err.to_string())
    }
}

/// Shortens a response body for log output.
pub fn preview_body(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_message_names_endpoint() {
        let err = UpstreamError::Status {
            endpoint: "orders".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "Commerce API returned HTTP 503 for orders");
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::Missing("ORDERS_SENDER_EMAIL").to_string(),
            "Missing configuration: ORDERS_SENDER_EMAIL is not set"
        );
        let err = ConfigError::Invalid {
            key: "SMTP_PORT",
            reason: "not a number".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for SMTP_PORT: not a number");
    }

    #[test]
    fn mail_error_wraps_address_error() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = MailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn preview_body_truncates_long_bodies() {
        let long = "x".repeat(ERROR_BODY_PREVIEW_LENGTH + 10);
        let preview = preview_body(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), ERROR_BODY_PREVIEW_LENGTH + 3);
        assert_eq!(preview_body("short"), "short");
    }
}
