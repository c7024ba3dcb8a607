// src/rendering/mod.rs
//! Email content: the customer's shipment email, produced by an external
//! templating service.

pub mod template_api;

pub use template_api::HttpTemplateRenderer;
