// src/notify/email.rs
//! Operator alert emails, rendered with Handlebars into plain and HTML parts.

use super::{report_details, NotificationChannel};
use crate::config::AlertEmailConfig;
use crate::error::NotifyError;
use crate::mailer::{build_alternative_message, SmtpSender};
use crate::run::{RunReport, Severity};
use chrono::{DateTime, Local};
use handlebars::Handlebars;
use lettre::message::Mailbox;
use serde_json::json;

const HTML_TEMPLATE: &str = "alert_html";
const PLAIN_TEMPLATE: &str = "alert_plain";

const HTML_SOURCE: &str = r#"<html>
<body style="font-family: Arial, sans-serif;">
  <div style="border-left: 6px solid {{color}}; padding: 12px;">
    <h2 style="color: {{color}};">{{label}}: {{title}}</h2>
    <p style="white-space: pre-line;">{{summary}}</p>
    {{#if details}}
    <h3>Technical details</h3>
    <table style="border-collapse: collapse;">
      {{#each details}}
      <tr>
        <td style="padding: 4px 8px; font-weight: bold; vertical-align: top;">{{this.key}}</td>
        <td style="padding: 4px 8px; white-space: pre-line;">{{this.value}}</td>
      </tr>
      {{/each}}
    </table>
    {{/if}}
    {{#if critical}}
    <p style="color: {{color}}; font-weight: bold;">Immediate intervention required.</p>
    {{/if}}
    <hr>
    <p style="color: #777777; font-size: 12px;">Shipment Confirmation - Automated System | {{timestamp}}</p>
  </div>
</body>
</html>
"#;

const PLAIN_SOURCE: &str = r#"{{{label}}}: {{{title}}}

{{{summary}}}
{{#if details}}

Technical details:
{{#each details}}
- {{{this.key}}}: {{{this.value}}}
{{/each}}
{{/if}}
{{#if critical}}

Immediate intervention required.
{{/if}}

--
Shipment Confirmation - Automated System | {{{timestamp}}}
"#;

/// A rendered operator alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEmail {
    pub subject: String,
    pub plain: String,
    pub html: String,
}

fn subject_prefix(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[CRITICAL]",
        Severity::Warning => "[WARNING]",
        Severity::Success => "[OK]",
    }
}

fn accent_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "#2e7d32",
        Severity::Warning => "#f9a825",
        Severity::Critical => "#c62828",
    }
}

fn alert_templates() -> Result<Handlebars<'static>, NotifyError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string(HTML_TEMPLATE, HTML_SOURCE)?;
    handlebars.register_template_string(PLAIN_TEMPLATE, PLAIN_SOURCE)?;
    Ok(handlebars)
}

/// Renders the alert for a report with the given templates.
pub fn render_alert_email(
    handlebars: &Handlebars<'_>,
    report: &RunReport,
    now: DateTime<Local>,
) -> Result<AlertEmail, NotifyError> {
    let details: Vec<_> = report_details(report)
        .into_iter()
        .map(|(key, value)| json!({ "key": key, "value": value }))
        .collect();

    let data = json!({
        "label": report.severity.label(),
        "title": report.title(),
        "summary": report.summary_text(),
        "details": details,
        "critical": report.severity == Severity::Critical,
        "color": accent_color(report.severity),
        "timestamp": now.format("%Y-%m-%d %H:%M:%S").to_string(),
    });

    Ok(AlertEmail {
        subject: format!(
            "{} - Shipment Confirmation: {}",
            subject_prefix(report.severity),
            report.title()
        ),
        plain: handlebars.render(PLAIN_TEMPLATE, &data)?,
        html: handlebars.render(HTML_TEMPLATE, &data)?,
    })
}

/// Sends run reports to the operator distribution list.
pub struct EmailAlertChannel {
    sender: SmtpSender,
    recipients: Vec<Mailbox>,
    templates: Handlebars<'static>,
}

impl EmailAlertChannel {
    pub fn new(config: &AlertEmailConfig) -> Result<Self, NotifyError> {
        let recipients = config
            .recipients
            .iter()
            .map(|address| Mailbox::new(None, address.as_address().clone()))
            .collect();
        Ok(Self {
            sender: SmtpSender::new(&config.account)?,
            recipients,
            templates: alert_templates()?,
        })
    }
}

#[async_trait::async_trait]
impl NotificationChannel for EmailAlertChannel {
    fn name(&self) -> &'static str {
        "Email"
    }

    async fn deliver(&self, report: &RunReport) -> Result<(), NotifyError> {
        let alert = render_alert_email(&self.templates, report, Local::now())?;
        let message = build_alternative_message(
            self.sender.from(),
            &self.recipients,
            &alert.subject,
            alert.plain,
            alert.html,
        )?;
        self.sender.send(message).await?;
        log::debug!("Alert email sent to {} recipient(s)", self.recipients.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{OrderFailure, OrderOutcome, ProcessingStep};
    use crate::types::OrderId;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn render(report: &RunReport) -> AlertEmail {
        let templates = alert_templates().unwrap();
        render_alert_email(&templates, report, Local::now()).unwrap()
    }

    #[test]
    fn critical_alert() {
        let report = RunReport::fatal(Uuid::new_v4(), Local::now(), "HTTP 503 <gateway>");
        let alert = render(&report);

        assert_eq!(
            alert.subject,
            "[CRITICAL] - Shipment Confirmation: Failed to query the commerce API"
        );
        assert!(alert.plain.contains("HTTP 503 <gateway>"));
        assert!(alert.plain.contains("Immediate intervention required."));
        assert!(alert.html.contains("HTTP 503 &lt;gateway&gt;"));
        assert!(alert.html.contains("#c62828"));
    }

    #[test]
    fn warning_alert_lists_failures() {
        let report = RunReport::from_outcomes(
            Uuid::new_v4(),
            Local::now(),
            vec![
                OrderOutcome::Shipped {
                    order_id: OrderId::new(1).unwrap(),
                    reference: "AAA".to_string(),
                },
                OrderOutcome::Failed(OrderFailure {
                    order_id: OrderId::new(2).unwrap(),
                    reference: "BBB".to_string(),
                    step: ProcessingStep::SendEmail,
                    message: "550 rejected".to_string(),
                }),
            ],
        );
        let alert = render(&report);

        assert!(alert.subject.starts_with("[WARNING]"));
        assert!(alert
            .plain
            .contains("order 2 (BBB) failed at send email: 550 rejected"));
        assert!(alert.plain.contains("Success rate: 50.0%"));
        assert!(!alert.plain.contains("Immediate intervention"));
    }

    #[test]
    fn success_alert_has_no_details() {
        let report = RunReport::from_outcomes(
            Uuid::new_v4(),
            Local::now(),
            vec![OrderOutcome::Shipped {
                order_id: OrderId::new(1).unwrap(),
                reference: "AAA".to_string(),
            }],
        );
        let alert = render(&report);
        assert!(alert.subject.starts_with("[OK]"));
        assert!(!alert.plain.contains("Technical details"));
        assert!(!alert.html.contains("<table"));
    }
}
