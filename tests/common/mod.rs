//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use shipconfirm::{
    Address, AddressId, CandidateOrder, Customer, CustomerId, EmailAddress, Order, OrderId,
    PaymentMethod, TrackingNumber,
};

pub fn order(id: u64, state: u32, tracking: Option<&str>, payment: &str) -> Order {
    Order {
        id: OrderId::new(id).unwrap(),
        reference: format!("REF{:04}", id),
        current_state: state,
        tracking_number: TrackingNumber::from_raw(tracking),
        payment: PaymentMethod::new(payment),
        customer_id: CustomerId::new(100 + id).unwrap(),
        address_id: AddressId::new(200 + id).unwrap(),
    }
}

pub fn candidate(id: u64, tracking: &str) -> CandidateOrder {
    order(id, 3, Some(tracking), "PayPal")
        .into_candidate()
        .map_err(|(_, reason)| reason)
        .unwrap()
}

pub fn customer(id: u64) -> Customer {
    Customer {
        id: CustomerId::new(id).unwrap(),
        firstname: "Ana".to_string(),
        lastname: "García".to_string(),
        email: EmailAddress::parse(&format!("customer{}@example.com", id)).unwrap(),
    }
}

pub fn address(id: u64) -> Address {
    Address {
        id: AddressId::new(id).unwrap(),
        customer_id: None,
        address1: "Calle Mayor 1".to_string(),
        address2: None,
        postcode: "28013".to_string(),
        city: "Madrid".to_string(),
        country_id: Some(6),
    }
}
