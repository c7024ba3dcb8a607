// src/api/mod.rs
//! Commerce webservice interaction: reading orders, customers and
//! addresses, and recording shipment state changes.
//!
//! I/O lives in `client`, wire shapes in `responses`, and the mapping from
//! one to the other in `parser`.

pub mod client;
pub mod parser;
mod responses;

pub use client::{ApiResponse, CommerceHttpClient};
