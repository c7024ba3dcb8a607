// src/model/customer.rs
use crate::types::{AddressId, CustomerId, EmailAddress};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: CustomerId,
    pub firstname: String,
    pub lastname: String,
    pub email: EmailAddress,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname.trim(), self.lastname.trim())
            .trim()
            .to_string()
    }
}

/// Delivery address of an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub customer_id: Option<CustomerId>,
    pub address1: String,
    pub address2: Option<String>,
    pub postcode: String,
    pub city: String,
    pub country_id: Option<u64>,
}
