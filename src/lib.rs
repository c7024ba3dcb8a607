// src/lib.rs
//! shipconfirm library: confirms shipped orders to customers and reports
//! each run to operators.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `ConfigError`, `UpstreamError`, `MailError`, etc.
//! - **Configuration**: `RunConfig`, `LoggingConfig`
//! - **Domain model**: `Order`, `CandidateOrder`, `Customer`, `Address`
//! - **Domain types**: `OrderId`, `TrackingNumber`, `EmailAddress`, etc.
//! - **Adapters**: `CommerceHttpClient`, `HttpTemplateRenderer`, `SmtpCustomerMailer`
//! - **Run**: `RunOrchestrator`, `RunReport`, `InternalNotifier`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod mailer;
pub mod model;
pub mod notify;
pub mod pipeline;
pub mod rendering;
pub mod run;
pub mod types;

// --- Error Handling ---
pub use crate::error::{ConfigError, MailError, NotifyError, TemplateError, UpstreamError};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{
    AlertEmailConfig, CommandLineInput, CommerceApiConfig, DeliveryMode, LoggingConfig,
    NotifierConfig, RunConfig, SlackConfig, SmtpAccount, TemplateApiConfig,
};

// --- Domain Model ---
pub use crate::model::{
    Address, CandidateOrder, Customer, Ineligibility, Order, OrderListing, RenderedEmail,
    UnreadableOrder,
};

// --- Domain Types ---
pub use crate::types::{
    AddressId, CustomerId, EmailAddress, OrderId, PaymentMethod, RunMode, Secret,
    TrackingNumber, ValidatedUrl,
};

// --- Adapters ---
pub use crate::api::{ApiResponse, CommerceHttpClient};
pub use crate::mailer::{plan_delivery, Envelope, SmtpCustomerMailer};
pub use crate::rendering::HttpTemplateRenderer;

// --- Pipeline Traits ---
pub use crate::pipeline::{CustomerMailer, EmailComposer, OrderSource, RunNotifier};

// --- Run & Notification ---
pub use crate::notify::{
    ChannelResult, EmailAlertChannel, InternalNotifier, NotificationChannel, NotificationReceipt,
    SlackWebhookChannel,
};
pub use crate::run::{
    OrderFailure, OrderOutcome, ProcessingStep, RunOrchestrator, RunOutcome, RunReport, RunState,
    Severity,
};
