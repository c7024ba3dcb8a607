// src/config.rs
//! Process configuration, resolved once at startup and injected into each
//! component at construction.
//!
//! Every value comes from the environment (optionally seeded from a `.env`
//! file). Resolution goes through a lookup function so tests can feed a
//! plain map instead of mutating the process environment.

use crate::constants::*;
use crate::error::ConfigError;
use crate::types::{EmailAddress, RunMode, Secret, ValidatedUrl};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Command-line surface. A single invocation performs one full run;
/// everything else is configured through the environment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {}

/// Where log output goes and how much of it.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub file: PathBuf,
}

impl LoggingConfig {
    /// Resolves logging settings. Unknown levels fall back to `Info` so a typo
    /// never prevents the run from starting.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = non_empty(&lookup, "LOG_LEVEL")
            .and_then(|raw| parse_level(&raw))
            .unwrap_or(LevelFilter::Info);
        let file = non_empty(&lookup, "LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        Self { level, file }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Maps both Rust and Python-style level names (`WARNING`, `CRITICAL`).
fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "WARNING" => Some(LevelFilter::Warn),
        "CRITICAL" | "FATAL" => Some(LevelFilter::Error),
        other => LevelFilter::from_str(other).ok(),
    }
}

/// Commerce webservice access.
#[derive(Debug, Clone)]
pub struct CommerceApiConfig {
    pub base_url: ValidatedUrl,
    pub username: String,
    pub password: Secret,
    pub employee_id: u32,
    pub timeout: Duration,
}

/// Templating service that renders the customer email.
#[derive(Debug, Clone)]
pub struct TemplateApiConfig {
    pub url: ValidatedUrl,
    pub timeout: Duration,
}

/// One authenticated SMTP submission account.
#[derive(Debug, Clone)]
pub struct SmtpAccount {
    pub server: String,
    pub port: u16,
    pub sender: EmailAddress,
    pub password: Secret,
}

/// Who actually receives a customer email.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryMode {
    /// Every customer email goes to one test mailbox instead.
    Development { test_mailbox: EmailAddress },
    /// Customers receive their email; an administrative copy is blind-copied.
    Production { bcc: Option<EmailAddress> },
}

/// Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: ValidatedUrl,
    pub channel: String,
    pub username: String,
    pub timeout: Duration,
}

/// Administrative distribution list reached over the notifications account.
#[derive(Debug, Clone)]
pub struct AlertEmailConfig {
    pub account: SmtpAccount,
    pub recipients: Vec<EmailAddress>,
}

/// Operator notification channels. A `None` channel is disabled.
#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    pub slack: Option<SlackConfig>,
    pub email: Option<AlertEmailConfig>,
    pub notify_empty_runs: bool,
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: RunMode,
    pub commerce: CommerceApiConfig,
    pub template: TemplateApiConfig,
    pub orders_smtp: SmtpAccount,
    pub delivery: DeliveryMode,
    pub notifier: NotifierConfig,
}

impl RunConfig {
    /// Resolves the run configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the run configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match non_empty(&lookup, "ENVIRONMENT") {
            Some(raw) => raw
                .parse::<RunMode>()
                .map_err(|source| ConfigError::Validation {
                    key: "ENVIRONMENT",
                    source,
                })?,
            None => RunMode::Production,
        };

        let timeout = Duration::from_secs(parse_or(
            &lookup,
            "HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        let commerce = CommerceApiConfig {
            base_url: url_or(&lookup, "PRESTASHOP_API_URL", DEFAULT_COMMERCE_API_URL)?,
            username: required(&lookup, "PRESTASHOP_API_USERNAME")?,
            password: Secret::new(
                non_empty(&lookup, "PRESTASHOP_API_PASSWORD").unwrap_or_default(),
            ),
            employee_id: parse_or(&lookup, "PRESTASHOP_EMPLOYEE_ID", DEFAULT_EMPLOYEE_ID)?,
            timeout,
        };

        let template = TemplateApiConfig {
            url: url_or(&lookup, "EMAIL_TEMPLATE_API_URL", DEFAULT_TEMPLATE_API_URL)?,
            timeout,
        };

        let orders_smtp = SmtpAccount {
            server: non_empty(&lookup, "ORDERS_SMTP_SERVER")
                .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            port: parse_or(&lookup, "ORDERS_SMTP_PORT", DEFAULT_SMTP_PORT)?,
            sender: email(&lookup, "ORDERS_SENDER_EMAIL")?,
            password: Secret::new(required(&lookup, "ORDERS_SENDER_PASSWORD")?),
        };

        let delivery = match mode {
            RunMode::Development => DeliveryMode::Development {
                test_mailbox: email(&lookup, "DEV_TEST_EMAIL")?,
            },
            RunMode::Production => DeliveryMode::Production {
                bcc: optional_email(&lookup, "BCC_EMAIL")?,
            },
        };

        let notifier = NotifierConfig {
            slack: slack_channel(&lookup, timeout)?,
            email: email_channel(&lookup)?,
            notify_empty_runs: flag(&lookup, "NOTIFY_EMPTY_RUNS", false),
        };

        Ok(RunConfig {
            mode,
            commerce,
            template,
            orders_smtp,
            delivery,
            notifier,
        })
    }
}

/// Resolves the Slack channel; enabled but without a webhook means disabled.
fn slack_channel<F>(lookup: &F, timeout: Duration) -> Result<Option<SlackConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !flag(lookup, "SLACK_NOTIFICATIONS_ENABLED", true) {
        log::info!("Slack notifications are disabled");
        return Ok(None);
    }
    let Some(raw_url) = non_empty(lookup, "SLACK_WEBHOOK_URL") else {
        log::warn!(
            "Slack notifications enabled but webhook URL missing. Disabling Slack notifications."
        );
        return Ok(None);
    };
    let webhook_url = match ValidatedUrl::parse(&raw_url) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("SLACK_WEBHOOK_URL is invalid ({}). Disabling Slack notifications.", e);
            return Ok(None);
        }
    };
    Ok(Some(SlackConfig {
        webhook_url,
        channel: non_empty(lookup, "SLACK_CHANNEL")
            .unwrap_or_else(|| DEFAULT_SLACK_CHANNEL.to_string()),
        username: non_empty(lookup, "SLACK_USERNAME")
            .unwrap_or_else(|| DEFAULT_SLACK_USERNAME.to_string()),
        timeout,
    }))
}

/// Resolves the operator email channel; incomplete settings disable it.
fn email_channel<F>(lookup: &F) -> Result<Option<AlertEmailConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !flag(lookup, "EMAIL_NOTIFICATIONS_ENABLED", true) {
        log::info!("Email notifications are disabled");
        return Ok(None);
    }

    let sender = non_empty(lookup, "SENDER_EMAIL");
    let password = non_empty(lookup, "SENDER_PASSWORD");
    let recipients =
        match parse_email_list(&non_empty(lookup, "NOTIFICATION_EMAILS").unwrap_or_default()) {
            Ok(recipients) => recipients,
            Err(e) => {
                log::warn!(
                    "NOTIFICATION_EMAILS is invalid ({}). Disabling email notifications.",
                    e
                );
                return Ok(None);
            }
        };

    let (Some(sender), Some(password)) = (sender, password) else {
        log::warn!(
            "Email notifications enabled but missing configuration. Disabling email notifications."
        );
        return Ok(None);
    };
    if recipients.is_empty() {
        log::warn!(
            "Email notifications enabled but missing configuration. Disabling email notifications."
        );
        return Ok(None);
    }

    let sender = match EmailAddress::parse(&sender) {
        Ok(sender) => sender,
        Err(e) => {
            log::warn!("SENDER_EMAIL is invalid ({}). Disabling email notifications.", e);
            return Ok(None);
        }
    };

    Ok(Some(AlertEmailConfig {
        account: SmtpAccount {
            server: non_empty(lookup, "SMTP_SERVER")
                .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            port: parse_or(lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            sender,
            password: Secret::new(password),
        },
        recipients,
    }))
}

/// Parses a comma-separated list of addresses, ignoring blank entries.
pub fn parse_email_list(raw: &str) -> Result<Vec<EmailAddress>, crate::types::ValidationError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(EmailAddress::parse)
        .collect()
}

// --- lookup helpers ---

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or(ConfigError::Missing(key))
}

fn email<F>(lookup: &F, key: &'static str) -> Result<EmailAddress, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = required(lookup, key)?;
    EmailAddress::parse(&raw).map_err(|source| ConfigError::Validation { key, source })
}

fn optional_email<F>(lookup: &F, key: &'static str) -> Result<Option<EmailAddress>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .map(|raw| EmailAddress::parse(&raw))
        .transpose()
        .map_err(|source| ConfigError::Validation { key, source })
}

fn url_or<F>(lookup: &F, key: &'static str, default: &str) -> Result<ValidatedUrl, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = non_empty(lookup, key).unwrap_or_else(|| default.to_string());
    ValidatedUrl::parse(&raw).map_err(|source| ConfigError::Validation { key, source })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .map(|raw| raw.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
