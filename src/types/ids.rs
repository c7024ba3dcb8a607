// src/types/ids.rs
use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for webservice record IDs with phantom types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: u64,
    _phantom: PhantomData<T>,
}

/// Marker types for different record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomerMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressMarker;

/// Type aliases for specific ID types
pub type OrderId = Id<OrderMarker>;
pub type CustomerId = Id<CustomerMarker>;
pub type AddressId = Id<AddressMarker>;

impl<T> Id<T> {
    /// Creates an ID from a raw numeric value. Zero is not a valid record id.
    pub fn new(value: u64) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::InvalidId("0".to_string()));
        }
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }

    /// Parses an ID as the webservice renders it (`"42"`, `" 42 "`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let value = trimmed
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidId(input.to_string()))?;
        Self::new(value)
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u64 {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // The webservice emits ids as numbers for the record itself and as
        // strings for foreign keys.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Id::new(n).map_err(serde::de::Error::custom),
            Raw::Text(s) => Id::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}
