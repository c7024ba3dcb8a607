// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A credential that must never end up in a log line.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the raw value for the one place that needs it (auth headers, SMTP login).
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Syntactically valid mailbox address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(lettre::Address);

impl EmailAddress {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("email"));
        }
        lettre::Address::from_str(trimmed)
            .map(Self)
            .map_err(|e| ValidationError::InvalidEmail {
                address: trimmed.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        AsRef::<str>::as_ref(&self.0)
    }

    pub fn as_address(&self) -> &lettre::Address {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Validated URL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    /// Create a new validated URL
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url.trim()) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Joins a resource path onto this URL treating it as a directory,
    /// so `https://shop/api` + `orders` gives `https://shop/api/orders`.
    pub fn join_path(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Carrier tracking number. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Returns `None` for absent or whitespace-only values.
    pub fn from_raw(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment module label as the shop records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Labels of payment modules whose orders get a shipment confirmation.
    pub const ALLOWED: [&'static str; 4] = [
        "PayPal",
        "Redsys",
        "PayPal with fee",
        "Pagos por transferencia bancaria",
    ];

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_allowed(&self) -> bool {
        let label = self.0.trim();
        Self::ALLOWED.iter().any(|allowed| *allowed == label)
    }

    /// The `filter[payment]` value understood by the webservice.
    pub fn allowlist_filter() -> String {
        format!("[{}]", Self::ALLOWED.join("|"))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployment mode; decides who actually receives customer mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl FromStr for RunMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ValidationError::UnknownRunMode(other.to_string())),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{}", secret), "***");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::parse("real@customer.com").is_ok());
        assert_eq!(
            EmailAddress::parse("  ops@toolstock.info ").unwrap().as_str(),
            "ops@toolstock.info"
        );
        assert!(EmailAddress::parse("").is_err());
        assert!(EmailAddress::parse("not-an-email").is_err());
    }

    #[test]
    fn test_url_validation() {
        assert!(ValidatedUrl::parse("https://www.toolstock.info/api").is_ok());
        assert!(ValidatedUrl::parse("http://localhost:8080").is_ok());
        assert!(ValidatedUrl::parse("ftp://example.com").is_err());
        assert!(ValidatedUrl::parse("not a url").is_err());
    }

    #[test]
    fn test_join_path() {
        let base = ValidatedUrl::parse("https://shop.example/api").unwrap();
        assert_eq!(base.join_path("orders"), "https://shop.example/api/orders");
        let base = ValidatedUrl::parse("https://shop.example/api/").unwrap();
        assert_eq!(
            base.join_path("/customers/7"),
            "https://shop.example/api/customers/7"
        );
    }

    #[test]
    fn test_tracking_number_rejects_blank() {
        assert!(TrackingNumber::from_raw(None).is_none());
        assert!(TrackingNumber::from_raw(Some("")).is_none());
        assert!(TrackingNumber::from_raw(Some("   ")).is_none());
        assert_eq!(
            TrackingNumber::from_raw(Some(" TRK1 ")).unwrap().as_str(),
            "TRK1"
        );
    }

    #[test]
    fn test_payment_allowlist() {
        assert!(PaymentMethod::new("Redsys").is_allowed());
        assert!(PaymentMethod::new("PayPal with fee").is_allowed());
        assert!(PaymentMethod::new("Pagos por transferencia bancaria").is_allowed());
        assert!(!PaymentMethod::new("Cash on delivery").is_allowed());
        assert!(!PaymentMethod::new("paypal").is_allowed());
        assert_eq!(
            PaymentMethod::allowlist_filter(),
            "[PayPal|Redsys|PayPal with fee|Pagos por transferencia bancaria]"
        );
    }

    #[test]
    fn test_run_mode_parsing() {
        assert_eq!("development".parse::<RunMode>().unwrap(), RunMode::Development);
        assert_eq!("PRODUCTION".parse::<RunMode>().unwrap(), RunMode::Production);
        assert!("staging".parse::<RunMode>().is_err());
    }
}
