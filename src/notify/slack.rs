// src/notify/slack.rs
//! Slack incoming-webhook channel using Block Kit messages.

use super::{report_details, NotificationChannel};
use crate::config::SlackConfig;
use crate::constants::SLACK_DETAILS_MAX_CHARS;
use crate::error::{preview_body, NotifyError};
use crate::run::{RunReport, Severity};
use chrono::{DateTime, Local};
use reqwest::Client;
use serde_json::{json, Value};

/// Slack ignores a channel override naming the default channel.
const SLACK_DEFAULT_CHANNEL: &str = "#general";

fn header(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Success => ("✅", "SUCCESS"),
        Severity::Warning => ("⚠️", "WARNING"),
        Severity::Critical => ("🚨", "CRITICAL ERROR"),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

/// Builds the webhook document for a report.
pub fn build_slack_payload(
    report: &RunReport,
    config: &SlackConfig,
    now: DateTime<Local>,
) -> Value {
    let (emoji, label) = header(report.severity);

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("{} {}: {}", emoji, label, report.title()),
                "emoji": true,
            }
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Description:*\n{}", report.summary_text()),
            }
        }),
    ];

    let details = report_details(report);
    if !details.is_empty() {
        let rendered = details
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Technical details:*\n```{}```",
                    truncate_chars(&rendered, SLACK_DETAILS_MAX_CHARS)
                ),
            }
        }));
    }

    if report.severity == Severity::Critical {
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": "*Recommended action:* Immediate intervention required",
            }
        }));
    }

    blocks.push(json!({ "type": "divider" }));
    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!(
                "Shipment Confirmation - Automated System | `{}`",
                now.format("%Y-%m-%d %H:%M:%S")
            ),
        }]
    }));

    let mut payload = json!({
        "username": config.username,
        "text": format!("{} {}: {}", emoji, label, report.title()),
        "blocks": blocks,
    });
    if config.channel != SLACK_DEFAULT_CHANNEL {
        payload["channel"] = json!(config.channel);
    }
    payload
}

/// Posts run reports to a Slack incoming webhook.
pub struct SlackWebhookChannel {
    client: Client,
    config: SlackConfig,
}

impl SlackWebhookChannel {
    pub fn new(config: SlackConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait::async_trait]
impl NotificationChannel for SlackWebhookChannel {
    fn name(&self) -> &'static str {
        "Slack"
    }

    async fn deliver(&self, report: &RunReport) -> Result<(), NotifyError> {
        let payload = build_slack_payload(report, &self.config, Local::now());
        let response = self
            .client
            .post(self.config.webhook_url.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::WebhookStatus {
                status: status.as_u16(),
                body: preview_body(&body),
            });
        }
        Ok(())
    }
}
