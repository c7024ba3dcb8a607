// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Order lifecycle
// ---------------------------------------------------------------------------

/// Order state "Preparación en curso": packed, waiting for the carrier.
pub const ORDER_STATE_PREPARING: u32 = 3;

/// Order state "Enviado": handed to the carrier and confirmed to the customer.
pub const ORDER_STATE_SHIPPED: u32 = 4;

/// Back-office employee recorded as author of automated state changes.
pub const DEFAULT_EMPLOYEE_ID: u32 = 5;

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Per-request timeout for every HTTP collaborator, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Submission port with STARTTLS.
pub const DEFAULT_SMTP_PORT: u16 = 587;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.office365.com";

pub const DEFAULT_COMMERCE_API_URL: &str = "https://www.toolstock.info/api";

pub const DEFAULT_TEMPLATE_API_URL: &str = "https://postlyapi.vercel.app/api/confirmationShip";

// ---------------------------------------------------------------------------
// Customer mail
// ---------------------------------------------------------------------------

/// Subject used when the template service does not supply one.
pub const SHIPMENT_SUBJECT_PREFIX: &str = "Confirmación de envío de tu pedido";

// ---------------------------------------------------------------------------
// Operator notifications
// ---------------------------------------------------------------------------

pub const DEFAULT_SLACK_CHANNEL: &str = "#confirmation-shipment";

pub const DEFAULT_SLACK_USERNAME: &str = "ConfirmationShipment-Bot";

/// Slack rejects section text above 3000 characters; details stay well under.
pub const SLACK_DETAILS_MAX_CHARS: usize = 2000;

/// How many individual failures an operator summary spells out.
pub const SUMMARY_MAX_FAILURES: usize = 5;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

pub const DEFAULT_LOG_FILE: &str = "logs/confirmation_shipment.log";

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
