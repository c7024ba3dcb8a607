// src/types/mod.rs
use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid email address: {address} - {reason}")]
    InvalidEmail { address: String, reason: String },

    #[error("Unknown run mode: {0} (expected 'development' or 'production')")]
    UnknownRunMode(String),
}
