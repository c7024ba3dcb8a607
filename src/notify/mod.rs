// src/notify/mod.rs
//! Operator notifications: chat first, email as the redundant or fallback
//! channel.
//!
//! Channel selection:
//! - every severity goes to chat;
//! - warning and critical also go to email;
//! - when chat is disabled or its delivery fails, email is sent instead.
//!
//! Nothing here returns an error to the run. Failures are logged and
//! recorded in the `NotificationReceipt`.

mod email;
mod slack;

pub use email::{render_alert_email, AlertEmail, EmailAlertChannel};
pub use slack::{build_slack_payload, SlackWebhookChannel};

use crate::constants::SUMMARY_MAX_FAILURES;
use crate::error::NotifyError;
use crate::pipeline::RunNotifier;
use crate::run::{RunReport, Severity};
use std::sync::Arc;

/// One way of reaching operators.
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, report: &RunReport) -> Result<(), NotifyError>;
}

/// What happened on one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelResult {
    /// The channel is not configured.
    Disabled,
    /// Selection rules did not call for this channel.
    NotAttempted,
    Delivered,
    Failed(String),
}

impl ChannelResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Per-channel record of one `notify` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReceipt {
    /// Set when an empty run was deliberately not reported.
    pub skipped: bool,
    pub chat: ChannelResult,
    pub email: ChannelResult,
}

impl NotificationReceipt {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            chat: ChannelResult::NotAttempted,
            email: ChannelResult::NotAttempted,
        }
    }

    pub fn any_delivered(&self) -> bool {
        self.chat.is_delivered() || self.email.is_delivered()
    }
}

/// Routes run reports to the configured channels.
pub struct InternalNotifier {
    chat: Option<Arc<dyn NotificationChannel>>,
    email: Option<Arc<dyn NotificationChannel>>,
    notify_empty_runs: bool,
}

impl InternalNotifier {
    pub fn new(
        chat: Option<Arc<dyn NotificationChannel>>,
        email: Option<Arc<dyn NotificationChannel>>,
        notify_empty_runs: bool,
    ) -> Self {
        Self {
            chat,
            email,
            notify_empty_runs,
        }
    }
}

async fn deliver_to(
    channel: &Option<Arc<dyn NotificationChannel>>,
    report: &RunReport,
) -> ChannelResult {
    let Some(channel) = channel else {
        return ChannelResult::Disabled;
    };
    match channel.deliver(report).await {
        Ok(()) => {
            log::info!("{} notification sent", channel.name());
            ChannelResult::Delivered
        }
        Err(e) => {
            log::error!("Failed to send {} notification: {}", channel.name(), e);
            ChannelResult::Failed(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl RunNotifier for InternalNotifier {
    async fn notify(&self, report: &RunReport) -> NotificationReceipt {
        if report.is_empty() && !self.notify_empty_runs {
            log::info!("Nothing processed; skipping operator notification");
            return NotificationReceipt::skipped();
        }

        log::info!("Sending {} notification: {}", report.severity, report.title());

        let chat = deliver_to(&self.chat, report).await;

        let wants_email = report.severity >= Severity::Warning || !chat.is_delivered();
        let email = if wants_email {
            deliver_to(&self.email, report).await
        } else {
            ChannelResult::NotAttempted
        };

        let receipt = NotificationReceipt {
            skipped: false,
            chat,
            email,
        };
        if !receipt.any_delivered() {
            log::error!("All notification channels failed or are disabled");
        }
        receipt
    }
}

/// Key/value technical details attached to warning and critical notifications.
pub fn report_details(report: &RunReport) -> Vec<(String, String)> {
    let mut details = Vec::new();

    if let Some(cause) = &report.fatal_cause {
        details.push((
            "Timestamp".to_string(),
            report.finished_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        ));
        details.push(("Error".to_string(), cause.clone()));
        details.push(("Run Id".to_string(), report.run_id.to_string()));
        return details;
    }

    if report.severity == Severity::Success {
        return details;
    }

    details.push(("Total Orders".to_string(), report.total_candidates.to_string()));
    details.push(("Successful".to_string(), report.succeeded.to_string()));
    details.push(("Failed".to_string(), report.failed.to_string()));

    let mut errors: Vec<String> = report
        .failures
        .iter()
        .take(SUMMARY_MAX_FAILURES)
        .map(|failure| failure.to_string())
        .collect();
    if report.failures.len() > SUMMARY_MAX_FAILURES {
        errors.push(format!(
            "... and {} more (see log)",
            report.failures.len() - SUMMARY_MAX_FAILURES
        ));
    }
    details.push(("Errors".to_string(), errors.join("\n")));
    details.push(("Run Id".to_string(), report.run_id.to_string()));
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{OrderFailure, OrderOutcome, ProcessingStep};
    use crate::types::OrderId;
    use chrono::Local;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct RecordingChannel {
        name: &'static str,
        fail: bool,
        calls: Mutex<Vec<Severity>>,
    }

    impl RecordingChannel {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Severity> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl NotificationChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn deliver(&self, report: &RunReport) -> Result<(), NotifyError> {
            self.calls.lock().unwrap().push(report.severity);
            if self.fail {
                Err(NotifyError::WebhookStatus {
                    status: 500,
                    body: "down".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn report_with(outcomes: Vec<OrderOutcome>) -> RunReport {
        RunReport::from_outcomes(Uuid::new_v4(), Local::now(), outcomes)
    }

    fn shipped(id: u64) -> OrderOutcome {
        OrderOutcome::Shipped {
            order_id: OrderId::new(id).unwrap(),
            reference: format!("REF{}", id),
        }
    }

    fn failed(id: u64) -> OrderOutcome {
        OrderOutcome::Failed(OrderFailure {
            order_id: OrderId::new(id).unwrap(),
            reference: format!("REF{}", id),
            step: ProcessingStep::SendEmail,
            message: "550 mailbox unavailable".to_string(),
        })
    }

    fn notifier(
        chat: &Arc<RecordingChannel>,
        email: &Arc<RecordingChannel>,
    ) -> InternalNotifier {
        let chat: Arc<dyn NotificationChannel> = chat.clone();
        let email: Arc<dyn NotificationChannel> = email.clone();
        InternalNotifier::new(Some(chat), Some(email), false)
    }

    #[tokio::test]
    async fn success_goes_to_chat_only() {
        let chat = RecordingChannel::new("Slack", false);
        let email = RecordingChannel::new("Email", false);
        let receipt = notifier(&chat, &email).notify(&report_with(vec![shipped(1)])).await;

        assert_eq!(receipt.chat, ChannelResult::Delivered);
        assert_eq!(receipt.email, ChannelResult::NotAttempted);
        assert_eq!(chat.calls(), vec![Severity::Success]);
        assert!(email.calls().is_empty());
    }

    #[tokio::test]
    async fn warning_goes_to_both_channels() {
        let chat = RecordingChannel::new("Slack", false);
        let email = RecordingChannel::new("Email", false);
        let receipt = notifier(&chat, &email)
            .notify(&report_with(vec![shipped(1), failed(2)]))
            .await;

        assert_eq!(receipt.chat, ChannelResult::Delivered);
        assert_eq!(receipt.email, ChannelResult::Delivered);
        assert_eq!(email.calls(), vec![Severity::Warning]);
    }

    #[tokio::test]
    async fn critical_goes_to_both_channels() {
        let chat = RecordingChannel::new("Slack", false);
        let email = RecordingChannel::new("Email", false);
        let report = RunReport::fatal(Uuid::new_v4(), Local::now(), "connection refused");
        let receipt = notifier(&chat, &email).notify(&report).await;

        assert_eq!(chat.calls(), vec![Severity::Critical]);
        assert_eq!(email.calls(), vec![Severity::Critical]);
        assert!(receipt.any_delivered());
    }

    #[tokio::test]
    async fn chat_failure_falls_back_to_email() {
        let chat = RecordingChannel::new("Slack", true);
        let email = RecordingChannel::new("Email", false);
        let receipt = notifier(&chat, &email).notify(&report_with(vec![shipped(1)])).await;

        assert!(matches!(receipt.chat, ChannelResult::Failed(_)));
        assert_eq!(receipt.email, ChannelResult::Delivered);
    }

    #[tokio::test]
    async fn disabled_chat_falls_back_to_email() {
        let email = RecordingChannel::new("Email", false);
        let email_channel: Arc<dyn NotificationChannel> = email.clone();
        let notifier = InternalNotifier::new(None, Some(email_channel), false);
        let receipt = notifier.notify(&report_with(vec![shipped(1)])).await;

        assert_eq!(receipt.chat, ChannelResult::Disabled);
        assert_eq!(receipt.email, ChannelResult::Delivered);
    }

    #[tokio::test]
    async fn all_channels_failing_is_absorbed() {
        let chat = RecordingChannel::new("Slack", true);
        let email = RecordingChannel::new("Email", true);
        let receipt = notifier(&chat, &email)
            .notify(&report_with(vec![failed(1)]))
            .await;
        assert!(!receipt.any_delivered());
        assert!(!receipt.skipped);
    }

    #[tokio::test]
    async fn empty_run_is_quiet_unless_requested() {
        let chat = RecordingChannel::new("Slack", false);
        let email = RecordingChannel::new("Email", false);
        let receipt = notifier(&chat, &email).notify(&report_with(Vec::new())).await;
        assert!(receipt.skipped);
        assert!(chat.calls().is_empty());

        let chat_channel: Arc<dyn NotificationChannel> = chat.clone();
        let loud = InternalNotifier::new(Some(chat_channel), None, true);
        let receipt = loud.notify(&report_with(Vec::new())).await;
        assert_eq!(receipt.chat, ChannelResult::Delivered);
    }

    #[test]
    fn details_cap_the_failure_list() {
        let outcomes = (1..=7).map(failed).collect();
        let details = report_details(&report_with(outcomes));
        let errors = details
            .iter()
            .find(|(key, _)| key == "Errors")
            .map(|(_, value)| value.clone())
            .unwrap();
        assert_eq!(errors.lines().count(), SUMMARY_MAX_FAILURES + 1);
        assert!(errors.ends_with("... and 2 more (see log)"));
    }

    #[test]
    fn success_has_no_details() {
        assert!(report_details(&report_with(vec![shipped(1)])).is_empty());
    }
}
