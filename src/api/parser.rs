// src/api/parser.rs
//! Turns raw webservice responses into domain records.

use super::client::ApiResponse;
use super::responses::{AddressResponse, CustomerResponse, OrdersResponse};
use crate::error::{preview_body, UpstreamError};
use crate::model::{Address, Customer, Order, UnreadableOrder};

/// Checks the status and deserializes the body of any webservice response.
pub fn parse_api_response<T>(result: &ApiResponse<String>) -> Result<T, UpstreamError>
where
    T: serde::de::DeserializeOwned,
{
    ensure_success(result)?;
    serde_json::from_str(&result.data).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", result.url, e);
        log::debug!("Response body: {}", preview_body(&result.data));
        UpstreamError::Malformed {
            endpoint: result.url.clone(),
            reason: e.to_string(),
        }
    })
}

/// Fails with `UpstreamError::Status` on any non-2xx response.
pub fn ensure_success<T>(result: &ApiResponse<T>) -> Result<(), UpstreamError>
where
    T: AsRef<str>,
{
    if result.status.is_success() {
        return Ok(());
    }
    log::error!("HTTP status {} from {}", result.status.as_u16(), result.url);
    log::debug!("Server response: {}", preview_body(result.data.as_ref()));
    Err(UpstreamError::Status {
        endpoint: result.url.clone(),
        status: result.status.as_u16(),
    })
}

/// Parses an order listing into readable orders and the eligible-looking
/// rows that failed validation. Other unreadable rows are dropped with a
/// warning.
pub fn parse_orders_response(
    result: ApiResponse<String>,
) -> Result<(Vec<Order>, Vec<UnreadableOrder>), UpstreamError> {
    if result.status.is_success() && result.data.trim().is_empty() {
        log::warn!("The API returned an empty response");
        return Ok((Vec::new(), Vec::new()));
    }

    let response: OrdersResponse = parse_api_response(&result)?;
    let mut orders = Vec::new();
    let mut unreadable = Vec::new();
    for raw in response.into_orders() {
        match raw.to_domain() {
            Ok(order) => orders.push(order),
            Err(e) => match raw.into_unreadable(e.clone()) {
                Some(row) => {
                    log::error!("Order {} could not be read: {}", row.id, e);
                    unreadable.push(row);
                }
                None => log::warn!("Ignoring unreadable order record: {}", e),
            },
        }
    }
    Ok((orders, unreadable))
}

pub fn parse_customer_response(result: ApiResponse<String>) -> Result<Customer, UpstreamError> {
    let response: CustomerResponse = parse_api_response(&result)?;
    response
        .customer
        .into_domain()
        .map_err(|e| UpstreamError::Malformed {
            endpoint: result.url,
            reason: e.to_string(),
        })
}

pub fn parse_address_response(result: ApiResponse<String>) -> Result<Address, UpstreamError> {
    let response: AddressResponse = parse_api_response(&result)?;
    response
        .address
        .into_domain()
        .map_err(|e| UpstreamError::Malformed {
            endpoint: result.url,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn ok(body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status: StatusCode::OK,
            url: "https://shop.example/api/orders".to_string(),
        }
    }

    #[test]
    fn parses_order_listing_with_string_scalars() {
        let body = r#"{"orders":[
            {"id":12,"reference":"XKBKNABJK","current_state":"3","payment":"Redsys",
             "shipping_number":"TRK1","id_customer":"2","id_address_delivery":"5"},
            {"id":13,"reference":"OHSATSERP","current_state":"3","payment":"PayPal",
             "shipping_number":"","id_customer":"3","id_address_delivery":"6"}
        ]}"#;
        let (orders, unreadable) = parse_orders_response(ok(body)).unwrap();
        assert_eq!(orders.len(), 2);
        assert!(unreadable.is_empty());
        assert_eq!(orders[0].id.value(), 12);
        assert_eq!(orders[0].current_state, 3);
        assert_eq!(orders[0].tracking_number.as_ref().unwrap().as_str(), "TRK1");
        assert_eq!(orders[0].customer_id.value(), 2);
        assert_eq!(orders[0].address_id.value(), 5);
        assert!(orders[1].tracking_number.is_none());
    }

    #[test]
    fn empty_listing_forms_yield_no_orders() {
        for body in ["[]", "", "{}"] {
            let (orders, unreadable) = parse_orders_response(ok(body)).unwrap();
            assert!(orders.is_empty());
            assert!(unreadable.is_empty());
        }
    }

    #[test]
    fn eligible_unreadable_rows_are_kept_for_reporting() {
        let body = r#"{"orders":[
            {"id":12,"reference":"BROKEN","current_state":"3","payment":"Redsys",
             "shipping_number":"T","id_customer":"0","id_address_delivery":"5"},
            {"id":14,"current_state":"3","payment":"Redsys","shipping_number":"T",
             "id_customer":"4","id_address_delivery":"7"},
            {"id":15,"current_state":"3","payment":"Redsys","shipping_number":"",
             "id_customer":"0","id_address_delivery":"7"},
            {"current_state":"3","payment":"Redsys","shipping_number":"T",
             "id_customer":"4","id_address_delivery":"7"}
        ]}"#;
        let (orders, unreadable) = parse_orders_response(ok(body)).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id.value(), 14);

        assert_eq!(unreadable.len(), 1);
        assert_eq!(unreadable[0].id.value(), 12);
        assert_eq!(unreadable[0].reference, "BROKEN");
        assert!(unreadable[0].reason.contains("0"));
    }

    #[test]
    fn non_success_status_is_upstream_error() {
        let mut response = ok("<html>maintenance</html>");
        response.status = StatusCode::SERVICE_UNAVAILABLE;
        let err = parse_orders_response(response).unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 503, .. }));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let err = parse_orders_response(ok("<?xml version=\"1.0\"?><prestashop/>")).unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { .. }));
    }

    #[test]
    fn parses_customer_and_address() {
        let customer = parse_customer_response(ok(r#"{"customer":{
                "id":2,"firstname":"Ana","lastname":"Ruiz","email":"ana@example.com"}}"#))
        .unwrap();
        assert_eq!(customer.full_name(), "Ana Ruiz");
        assert_eq!(customer.email.as_str(), "ana@example.com");

        let address = parse_address_response(ok(
            r#"{"address":{"id":5,"id_customer":"2","address1":"Calle Mayor 1","address2":"",
                "postcode":"28013","city":"Madrid","id_country":"6"}}"#,
        ))
        .unwrap();
        assert_eq!(address.city, "Madrid");
        assert_eq!(address.address2, None);
        assert_eq!(address.country_id, Some(6));
        assert_eq!(address.customer_id.map(|id| id.value()), Some(2));
    }

    #[test]
    fn customer_without_email_is_malformed() {
        let err = parse_customer_response(ok(r#"{"customer":{"id":2,"email":""}}"#)).unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed { .. }));
    }
}
