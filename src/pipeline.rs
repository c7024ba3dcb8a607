// src/pipeline.rs
//! Capability traits for the collaborators of a run.
//!
//! Each trait describes a single capability, so the orchestrator can be
//! exercised with in-memory doubles and each HTTP or SMTP adapter can be
//! tested on its own.

use crate::error::{MailError, TemplateError, UpstreamError};
use crate::model::{Address, CandidateOrder, Customer, OrderListing, RenderedEmail};
use crate::notify::NotificationReceipt;
use crate::run::RunReport;
use crate::types::{AddressId, CustomerId, OrderId, TrackingNumber};

/// Reads and advances orders in the commerce webservice.
#[async_trait::async_trait]
pub trait OrderSource: Send + Sync {
    /// Orders ready to ship, in the order the webservice listed them, plus
    /// listed orders that could not be read.
    async fn fetch_shippable_orders(&self) -> Result<OrderListing, UpstreamError>;
    async fn fetch_customer(&self, id: CustomerId) -> Result<Customer, UpstreamError>;
    async fn fetch_address(&self, id: AddressId) -> Result<Address, UpstreamError>;
    /// Moves the order from "preparing" to "shipped".
    async fn advance_order_status(&self, id: OrderId) -> Result<(), UpstreamError>;
}

/// Produces the personalised shipment email.
#[async_trait::async_trait]
pub trait EmailComposer: Send + Sync {
    async fn render(
        &self,
        order: &CandidateOrder,
        customer: &Customer,
        address: &Address,
        tracking_number: &TrackingNumber,
    ) -> Result<RenderedEmail, TemplateError>;
}

/// Delivers the shipment email to the customer (or its development stand-in).
#[async_trait::async_trait]
pub trait CustomerMailer: Send + Sync {
    async fn send_shipment_email(
        &self,
        customer: &Customer,
        email: &RenderedEmail,
    ) -> Result<(), MailError>;
}

/// Tells operators how a run went. Delivery problems are absorbed and
/// reported in the receipt; they never reach the caller as errors.
#[async_trait::async_trait]
pub trait RunNotifier: Send + Sync {
    async fn notify(&self, report: &RunReport) -> NotificationReceipt;
}
