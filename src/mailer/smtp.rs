// src/mailer/smtp.rs
//! SMTP delivery over lettre's async transport.
//!
//! Both mail accounts (customer-facing orders mail and internal
//! notifications) go through `SmtpSender`; only the message differs.

use super::envelope::{plan_delivery, Envelope};
use crate::config::{DeliveryMode, SmtpAccount};
use crate::error::MailError;
use crate::model::{Customer, RenderedEmail};
use crate::pipeline::CustomerMailer;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// An authenticated STARTTLS connection factory for one account.
pub struct SmtpSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpSender {
    pub fn new(account: &SmtpAccount) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&account.server)?
            .port(account.port)
            .credentials(Credentials::new(
                account.sender.to_string(),
                account.password.expose().to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(None, account.sender.as_address().clone()),
        })
    }

    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    pub async fn send(&self, message: Message) -> Result<(), MailError> {
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Assembles the customer's shipment message for a planned envelope.
pub fn build_shipment_message(
    from: &Mailbox,
    envelope: &Envelope,
    email: &RenderedEmail,
) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(from.clone())
        .to(Mailbox::new(None, envelope.to.as_address().clone()))
        .subject(email.subject.clone());

    if let Some(bcc) = &envelope.bcc {
        builder = builder.bcc(Mailbox::new(None, bcc.as_address().clone()));
    }

    builder
        .header(ContentType::TEXT_HTML)
        .body(email.html_body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Assembles a message with plain-text and HTML alternatives.
pub fn build_alternative_message(
    from: &Mailbox,
    to: &[Mailbox],
    subject: &str,
    plain: String,
    html: String,
) -> Result<Message, MailError> {
    let mut builder = Message::builder().from(from.clone()).subject(subject);
    for recipient in to {
        builder = builder.to(recipient.clone());
    }
    builder
        .multipart(MultiPart::alternative_plain_html(plain, html))
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Sends shipment emails from the orders account.
pub struct SmtpCustomerMailer {
    sender: SmtpSender,
    mode: DeliveryMode,
}

impl SmtpCustomerMailer {
    pub fn new(account: &SmtpAccount, mode: DeliveryMode) -> Result<Self, MailError> {
        match &mode {
            DeliveryMode::Development { test_mailbox } => log::info!(
                "Customer mailer in DEVELOPMENT mode - emails will be sent to {}",
                test_mailbox
            ),
            DeliveryMode::Production { .. } => {
                log::info!("Customer mailer in PRODUCTION mode - emails will be sent to customers")
            }
        }
        Ok(Self {
            sender: SmtpSender::new(account)?,
            mode,
        })
    }
}

#[async_trait::async_trait]
impl CustomerMailer for SmtpCustomerMailer {
    async fn send_shipment_email(
        &self,
        customer: &Customer,
        email: &RenderedEmail,
    ) -> Result<(), MailError> {
        let envelope = plan_delivery(&self.mode, &customer.email);
        log::info!("{}", envelope.describe(&email.subject));

        let message = build_shipment_message(self.sender.from(), &envelope, email)?;
        self.sender.send(message).await?;

        log::info!("Shipment email sent from {}", self.sender.from());
        Ok(())
    }
}
