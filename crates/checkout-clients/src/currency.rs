//! # Currency Conversion Client

use crate::transport::HttpTransport;
use async_trait::async_trait;
use checkout_core::{CurrencyService, Money, ServiceError, ServiceResult};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct ConvertRequest<'a> {
    from: &'a Money,
    to_code: &'a str,
}

/// Currency conversion over HTTP
pub struct HttpCurrencyClient {
    transport: HttpTransport,
}

impl HttpCurrencyClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl CurrencyService for HttpCurrencyClient {
    #[instrument(skip(self, from), fields(from = %from))]
    async fn convert(&self, from: &Money, to_code: &str) -> ServiceResult<Money> {
        self.transport
            .post_json_rejecting(
                "/v1/convert",
                &ConvertRequest { from, to_code },
                |_| ServiceError::UnsupportedCurrency {
                    currency: to_code.to_string(),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_transport;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_convert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/convert"))
            .and(body_json(json!({
                "from": {"currency_code": "USD", "units": 10, "nanos": 0},
                "to_code": "EUR"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "currency_code": "EUR", "units": 9, "nanos": 120000000
            })))
            .mount(&server)
            .await;

        let client = HttpCurrencyClient::new(test_transport(&server.uri(), "currency"));
        let converted = client
            .convert(&Money::from_units("USD", 10), "EUR")
            .await
            .unwrap();

        assert_eq!(converted, Money::new("EUR", 9, 120_000_000).unwrap());
    }

    #[tokio::test]
    async fn test_unsupported_currency() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/convert"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "unknown code XTS"})),
            )
            .mount(&server)
            .await;

        let client = HttpCurrencyClient::new(test_transport(&server.uri(), "currency"));
        let err = client
            .convert(&Money::from_units("USD", 10), "XTS")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ServiceError::UnsupportedCurrency {
                currency: "XTS".into()
            }
        );
    }
}
