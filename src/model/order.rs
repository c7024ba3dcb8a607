// src/model/order.rs
use crate::constants::ORDER_STATE_PREPARING;
use crate::types::{AddressId, CustomerId, OrderId, PaymentMethod, TrackingNumber};
use serde::Serialize;
use std::fmt;

/// An order as the webservice reports it, before eligibility is checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub reference: String,
    pub current_state: u32,
    pub tracking_number: Option<TrackingNumber>,
    pub payment: PaymentMethod,
    pub customer_id: CustomerId,
    pub address_id: AddressId,
}

/// Why an order is not a shipment-confirmation candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    NotPreparing { state: u32 },
    MissingTrackingNumber,
    PaymentNotAllowed { payment: String },
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPreparing { state } => write!(f, "order state is {}", state),
            Self::MissingTrackingNumber => write!(f, "no tracking number"),
            Self::PaymentNotAllowed { payment } => {
                write!(f, "payment method '{}' is not handled", payment)
            }
        }
    }
}

impl Order {
    /// Checks the candidate invariant and, when it holds, yields an order
    /// whose tracking number is guaranteed present.
    pub fn into_candidate(self) -> Result<CandidateOrder, (Self, Ineligibility)> {
        if self.current_state != ORDER_STATE_PREPARING {
            let state = self.current_state;
            return Err((self, Ineligibility::NotPreparing { state }));
        }
        if !self.payment.is_allowed() {
            let payment = self.payment.to_string();
            return Err((self, Ineligibility::PaymentNotAllowed { payment }));
        }
        match self.tracking_number.clone() {
            Some(tracking_number) => Ok(CandidateOrder {
                order: self,
                tracking_number,
            }),
            None => Err((self, Ineligibility::MissingTrackingNumber)),
        }
    }
}

/// An order eligible for shipment confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOrder {
    pub order: Order,
    pub tracking_number: TrackingNumber,
}

impl CandidateOrder {
    pub fn id(&self) -> OrderId {
        self.order.id
    }

    pub fn reference(&self) -> &str {
        &self.order.reference
    }
}

/// A listed order that looks eligible but whose record could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableOrder {
    pub id: OrderId,
    pub reference: String,
    pub reason: String,
}

/// Everything one order listing yields for the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderListing {
    pub candidates: Vec<CandidateOrder>,
    pub unreadable: Vec<UnreadableOrder>,
}

impl OrderListing {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.unreadable.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len() + self.unreadable.len()
    }
}

/// Keeps only candidates, preserving the order the webservice returned them in.
pub fn select_candidates(orders: Vec<Order>) -> Vec<CandidateOrder> {
    orders
        .into_iter()
        .filter_map(|order| match order.into_candidate() {
            Ok(candidate) => {
                log::debug!(
                    "Order {} has tracking number {}",
                    candidate.id(),
                    candidate.tracking_number
                );
                Some(candidate)
            }
            Err((order, reason)) => {
                log::debug!("Skipping order {}: {}", order.id, reason);
                None
            }
        })
        .collect()
}
