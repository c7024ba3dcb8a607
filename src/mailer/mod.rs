// src/mailer/mod.rs
//! Outgoing mail, with recipient planning separated from SMTP delivery.

mod envelope;
mod smtp;

pub use envelope::{plan_delivery, Envelope};
pub use smtp::{build_alternative_message, build_shipment_message, SmtpCustomerMailer, SmtpSender};
