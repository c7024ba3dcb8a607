// src/api/responses.rs
//! Wire shapes of the commerce webservice's JSON output.
//!
//! The webservice renders most scalars as strings (`"current_state": "3"`)
//! but record ids as numbers, and omits or blanks optional fields freely.
//! These structs accept all of that and leave validation to `into_domain`.

use crate::constants::ORDER_STATE_PREPARING;
use crate::model::{Address, Customer, Order, UnreadableOrder};
use crate::types::{
    AddressId, CustomerId, EmailAddress, OrderId, PaymentMethod, TrackingNumber, ValidationError,
};
use serde::{Deserialize, Deserializer};

/// Deserializes any JSON scalar (string, number, bool, null) into an optional string.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

fn require<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::EmptyField(field))
}

/// `GET /orders?display=full`. An empty listing comes back as a bare `[]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrdersResponse {
    Listing {
        #[serde(default)]
        orders: Vec<RawOrder>,
    },
    Empty(Vec<serde::de::IgnoredAny>),
}

impl OrdersResponse {
    pub fn into_orders(self) -> Vec<RawOrder> {
        match self {
            Self::Listing { orders } => orders,
            Self::Empty(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawOrder {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub current_state: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub payment: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub shipping_number: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub id_customer: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub id_address_delivery: Option<String>,
}

impl RawOrder {
    pub fn to_domain(&self) -> Result<Order, ValidationError> {
        let id = OrderId::parse(require(&self.id, "order.id")?)?;
        let current_state = require(&self.current_state, "order.current_state")?
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidId(format!("order {} state", id)))?;
        Ok(Order {
            id,
            reference: self.reference(),
            current_state,
            tracking_number: TrackingNumber::from_raw(self.shipping_number.as_deref()),
            payment: PaymentMethod::new(self.payment.clone().unwrap_or_default()),
            customer_id: CustomerId::parse(require(&self.id_customer, "order.id_customer")?)?,
            address_id: AddressId::parse(require(
                &self.id_address_delivery,
                "order.id_address_delivery",
            )?)?,
        })
    }

    /// Keeps a row that failed `to_domain` when it is identifiable and
    /// otherwise looks like a candidate, so the run can report it.
    pub fn into_unreadable(self, error: ValidationError) -> Option<UnreadableOrder> {
        let id = OrderId::parse(self.id.as_deref()?).ok()?;
        TrackingNumber::from_raw(self.shipping_number.as_deref())?;
        if !PaymentMethod::new(self.payment.clone().unwrap_or_default()).is_allowed() {
            return None;
        }
        let other_state = self
            .current_state
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .is_some_and(|state| state != ORDER_STATE_PREPARING);
        if other_state {
            return None;
        }
        Some(UnreadableOrder {
            id,
            reference: self.reference(),
            reason: error.to_string(),
        })
    }

    fn reference(&self) -> String {
        self.reference.as_deref().unwrap_or_default().trim().to_string()
    }
}

/// `GET /customers/{id}`.
#[derive(Debug, Deserialize)]
pub struct CustomerResponse {
    pub customer: RawCustomer,
}

#[derive(Debug, Deserialize)]
pub struct RawCustomer {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub firstname: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub email: Option<String>,
}

impl RawCustomer {
    pub fn into_domain(self) -> Result<Customer, ValidationError> {
        Ok(Customer {
            id: CustomerId::parse(require(&self.id, "customer.id")?)?,
            firstname: self.firstname.unwrap_or_default(),
            lastname: self.lastname.unwrap_or_default(),
            email: EmailAddress::parse(require(&self.email, "customer.email")?)?,
        })
    }
}

/// `GET /addresses/{id}`.
#[derive(Debug, Deserialize)]
pub struct AddressResponse {
    pub address: RawAddress,
}

#[derive(Debug, Deserialize)]
pub struct RawAddress {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub id_customer: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub address1: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub address2: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub postcode: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub id_country: Option<String>,
}

impl RawAddress {
    pub fn into_domain(self) -> Result<Address, ValidationError> {
        // A zero customer id marks addresses that belong to a manufacturer or supplier.
        let customer_id = self
            .id_customer
            .as_deref()
            .and_then(|raw| CustomerId::parse(raw).ok());
        let country_id = self
            .id_country
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok());
        Ok(Address {
            id: AddressId::parse(require(&self.id, "address.id")?)?,
            customer_id,
            address1: self.address1.unwrap_or_default(),
            address2: self.address2.filter(|line| !line.trim().is_empty()),
            postcode: self.postcode.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            country_id,
        })
    }
}
