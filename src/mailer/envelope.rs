// src/mailer/envelope.rs
//! Decides who receives a customer email. Pure; no I/O.

use crate::config::DeliveryMode;
use crate::types::EmailAddress;

/// Recipients of one customer email.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub to: EmailAddress,
    pub bcc: Option<EmailAddress>,
    /// The customer address that was replaced, in development mode.
    pub redirected_from: Option<EmailAddress>,
}

impl Envelope {
    /// Every address that will actually receive the message.
    pub fn recipients(&self) -> Vec<&EmailAddress> {
        std::iter::once(&self.to).chain(self.bcc.as_ref()).collect()
    }

    /// Log line that keeps the intended recipient traceable.
    pub fn describe(&self, subject: &str) -> String {
        match &self.redirected_from {
            Some(customer) => format!(
                "[DEVELOPMENT] Email '{}' addressed to customer {} redirected to {}",
                subject, customer, self.to
            ),
            None => match &self.bcc {
                Some(bcc) => format!(
                    "[PRODUCTION] Sending email '{}' to {} (bcc {})",
                    subject, self.to, bcc
                ),
                None => format!(
                    "[PRODUCTION] Sending email '{}' to {}",
                    subject, self.to
                ),
            },
        }
    }
}

/// Resolves the envelope for a customer address under the given mode.
pub fn plan_delivery(mode: &DeliveryMode, customer_email: &EmailAddress) -> Envelope {
    match mode {
        DeliveryMode::Development { test_mailbox } => Envelope {
            to: test_mailbox.clone(),
            bcc: None,
            redirected_from: Some(customer_email.clone()),
        },
        DeliveryMode::Production { bcc } => Envelope {
            to: customer_email.clone(),
            bcc: bcc.clone(),
            redirected_from: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    #[test]
    fn development_redirects_to_test_mailbox_and_logs_customer() {
        let mode = DeliveryMode::Development {
            test_mailbox: addr("test@toolstock.dev"),
        };
        let envelope = plan_delivery(&mode, &addr("real@customer.com"));

        let recipients: Vec<&str> = envelope.recipients().iter().map(|a| a.as_str()).collect();
        assert_eq!(recipients, vec!["test@toolstock.dev"]);
        assert!(envelope.describe("XKB").contains("real@customer.com"));
    }

    #[test]
    fn production_sends_to_customer_with_admin_copy() {
        let mode = DeliveryMode::Production {
            bcc: Some(addr("admin@toolstock.info")),
        };
        let envelope = plan_delivery(&mode, &addr("real@customer.com"));

        let recipients: Vec<&str> = envelope.recipients().iter().map(|a| a.as_str()).collect();
        assert_eq!(recipients, vec!["real@customer.com", "admin@toolstock.info"]);
        assert_eq!(envelope.redirected_from, None);
    }

    #[test]
    fn production_without_bcc_has_single_recipient() {
        let mode = DeliveryMode::Production { bcc: None };
        let envelope = plan_delivery(&mode, &addr("real@customer.com"));
        assert_eq!(envelope.recipients().len(), 1);
        assert!(!envelope.describe("XKB").contains("bcc"));
    }
}
