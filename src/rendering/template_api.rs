// src/rendering/template_api.rs
//! Client for the external templating service that renders the customer's
//! shipment email.

use crate::config::TemplateApiConfig;
use crate::constants::SHIPMENT_SUBJECT_PREFIX;
use crate::error::{preview_body, TemplateError};
use crate::model::{Address, CandidateOrder, Customer, RenderedEmail};
use crate::pipeline::EmailComposer;
use crate::types::TrackingNumber;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct TemplateResponse {
    body: Option<TemplateBody>,
}

#[derive(Debug, Deserialize)]
struct TemplateBody {
    html: Option<String>,
    subject: Option<String>,
}

/// Renders shipment emails through the templating service.
#[derive(Clone)]
pub struct HttpTemplateRenderer {
    client: Client,
    config: TemplateApiConfig,
}

impl HttpTemplateRenderer {
    pub fn new(config: TemplateApiConfig) -> Result<Self, TemplateError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

/// Builds the request document. Field names follow the webservice's own
/// naming, which is what the templates were written against.
pub fn template_payload(
    order: &CandidateOrder,
    customer: &Customer,
    address: &Address,
    tracking_number: &TrackingNumber,
) -> Value {
    json!({
        "order": {
            "id": order.order.id,
            "reference": order.order.reference,
            "current_state": order.order.current_state,
            "payment": order.order.payment,
            "shipping_number": tracking_number,
            "id_customer": order.order.customer_id,
            "id_address_delivery": order.order.address_id,
        },
        "customer": {
            "id": customer.id,
            "firstname": customer.firstname,
            "lastname": customer.lastname,
            "email": customer.email,
        },
        "address": {
            "id": address.id,
            "id_customer": address.customer_id,
            "address1": address.address1,
            "address2": address.address2,
            "postcode": address.postcode,
            "city": address.city,
            "id_country": address.country_id,
        },
        "tracking_number": tracking_number,
    })
}

/// Extracts the email from a template response body.
pub fn parse_template_response(
    body: &str,
    reference: &str,
) -> Result<RenderedEmail, TemplateError> {
    let response: TemplateResponse = serde_json::from_str(body).map_err(|e| {
        log::debug!("Template response: {}", preview_body(body));
        TemplateError::MalformedContent(e.to_string())
    })?;

    let body = response
        .body
        .ok_or_else(|| TemplateError::MalformedContent("missing 'body'".to_string()))?;

    let html_body = body
        .html
        .filter(|html| !html.trim().is_empty())
        .ok_or_else(|| TemplateError::MalformedContent("no HTML content returned".to_string()))?;

    let subject = body
        .subject
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("{} {}", SHIPMENT_SUBJECT_PREFIX, reference));

    Ok(RenderedEmail { subject, html_body })
}

#[async_trait::async_trait]
impl EmailComposer for HttpTemplateRenderer {
    async fn render(
        &self,
        order: &CandidateOrder,
        customer: &Customer,
        address: &Address,
        tracking_number: &TrackingNumber,
    ) -> Result<RenderedEmail, TemplateError> {
        log::debug!("Rendering email template for order {}", order.id());

        let payload = template_payload(order, customer, address, tracking_number);
        let response = self
            .client
            .post(self.config.url.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            log::debug!("Template API error body: {}", preview_body(&text));
            return Err(TemplateError::Status(status.as_u16()));
        }

        parse_template_response(&text, order.reference())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn uses_returned_subject_when_present() {
        let email = parse_template_response(
            r#"{"body":{"html":"<p>Hola</p>","subject":"Tu pedido va de camino"}}"#,
            "XKB",
        )
        .unwrap();
        assert_eq!(email.subject, "Tu pedido va de camino");
        assert_eq!(email.html_body, "<p>Hola</p>");
    }

    #[test]
    fn falls_back_to_reference_subject() {
        let email = parse_template_response(r#"{"body":{"html":"<p>Hola</p>"}}"#, "XKB").unwrap();
        assert_eq!(email.subject, "Confirmación de envío de tu pedido XKB");
    }

    #[test]
    fn rejects_missing_or_blank_html() {
        for body in [
            r#"{"body":{"html":"   "}}"#,
            r#"{"body":{}}"#,
            r#"{"status":"ok"}"#,
            "not json",
        ] {
            let err = parse_template_response(body, "XKB").unwrap_err();
            assert!(
                matches!(err, TemplateError::MalformedContent(_)),
                "unexpected error for {}: {:?}",
                body,
                err
            );
        }
    }
}
