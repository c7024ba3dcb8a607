// src/model/mod.rs
//! Flat records fetched from the commerce webservice.

mod customer;
mod order;

pub use customer::{Address, Customer};
pub use order::{
    select_candidates, CandidateOrder, Ineligibility, Order, OrderListing, UnreadableOrder,
};

/// Personalised shipment email for one order. Lives only for one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
}
