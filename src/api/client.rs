// src/api/client.rs
//! Thin HTTP client for the commerce webservice.
//!
//! Handles authentication, endpoint construction and transport errors.
//! Parsing lives in `parser`, eligibility in `model`.

use crate::config::CommerceApiConfig;
use crate::constants::{ORDER_STATE_PREPARING, ORDER_STATE_SHIPPED};
use crate::error::UpstreamError;
use crate::model::{select_candidates, Address, Customer, OrderListing};
use crate::pipeline::OrderSource;
use crate::types::{AddressId, CustomerId, OrderId, PaymentMethod};
use reqwest::{header, Client, Response};

/// Query parameters every read request carries.
const JSON_OUTPUT: (&str, &str) = ("output_format", "JSON");

/// HTTP client bound to one webservice and one set of credentials.
#[derive(Clone)]
pub struct CommerceHttpClient {
    client: Client,
    config: CommerceApiConfig,
}

impl CommerceHttpClient {
    pub fn new(config: CommerceApiConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| UpstreamError::Unreachable {
                endpoint: config.base_url.to_string(),
                source,
            })?;
        Ok(Self { client, config })
    }

    /// Makes an authenticated GET request to `endpoint` relative to the API root.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<String>, UpstreamError> {
        let url = self.config.base_url.join_path(endpoint);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(self.config.password.expose()))
            .query(query)
            .query(&[JSON_OUTPUT])
            .send()
            .await
            .map_err(|source| UpstreamError::Unreachable {
                endpoint: url.clone(),
                source,
            })?;

        extract_response_text(response, &url).await
    }

    /// Makes an authenticated POST request with an XML document body.
    pub async fn post_xml(
        &self,
        endpoint: &str,
        body: String,
    ) -> Result<ApiResponse<String>, UpstreamError> {
        let url = self.config.base_url.join_path(endpoint);
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.username, Some(self.config.password.expose()))
            .header(header::CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await
            .map_err(|source| UpstreamError::Unreachable {
                endpoint: url.clone(),
                source,
            })?;

        extract_response_text(response, &url).await
    }
}

/// Builds the `order_history` document that records a state change.
pub fn order_history_document(order_id: OrderId, employee_id: u32, new_state: u32) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<prestashop xmlns:xlink="http://www.w3.org/1999/xlink">
    <order_history>
        <id_order>{}</id_order>
        <id_employee>{}</id_employee>
        <id_order_state>{}</id_order_state>
    </order_history>
</prestashop>"#,
        order_id, employee_id, new_state
    )
}

#[async_trait::async_trait]
impl OrderSource for CommerceHttpClient {
    async fn fetch_shippable_orders(&self) -> Result<OrderListing, UpstreamError> {
        let query = [
            ("filter[payment]", PaymentMethod::allowlist_filter()),
            (
                "filter[current_state]",
                format!("[{}]", ORDER_STATE_PREPARING),
            ),
            ("display", "full".to_string()),
        ];
        log::info!("Querying orders pending shipment confirmation");

        let response = self.get("orders", &query).await?;
        let (orders, unreadable) = super::parser::parse_orders_response(response)?;
        let listed = orders.len();
        let candidates = select_candidates(orders);

        log::info!(
            "Found {} orders in state {}, {} with tracking number",
            listed,
            ORDER_STATE_PREPARING,
            candidates.len()
        );
        if !unreadable.is_empty() {
            log::warn!("{} listed orders could not be read", unreadable.len());
        }
        Ok(OrderListing {
            candidates,
            unreadable,
        })
    }

    async fn fetch_customer(&self, id: CustomerId) -> Result<Customer, UpstreamError> {
        let response = self.get(&format!("customers/{}", id), &[]).await?;
        super::parser::parse_customer_response(response)
    }

    async fn fetch_address(&self, id: AddressId) -> Result<Address, UpstreamError> {
        let response = self.get(&format!("addresses/{}", id), &[]).await?;
        super::parser::parse_address_response(response)
    }

    async fn advance_order_status(&self, id: OrderId) -> Result<(), UpstreamError> {
        log::info!("Updating order {} to state {}", id, ORDER_STATE_SHIPPED);
        let document = order_history_document(id, self.config.employee_id, ORDER_STATE_SHIPPED);
        let response = self.post_xml("order_histories", document).await?;
        super::parser::ensure_success(&response)?;
        log::info!("Order {} state updated", id);
        Ok(())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(
    response: Response,
    endpoint: &str,
) -> Result<ApiResponse<String>, UpstreamError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response
        .text()
        .await
        .map_err(|source| UpstreamError::Unreachable {
            endpoint: endpoint.to_string(),
            source,
        })?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_history_document_targets_shipped_state() {
        let document = order_history_document(OrderId::new(42).unwrap(), 5, ORDER_STATE_SHIPPED);
        assert!(document.contains("<id_order>42</id_order>"));
        assert!(document.contains("<id_employee>5</id_employee>"));
        assert!(document.contains("<id_order_state>4</id_order_state>"));
    }
}
