//! # JSON Transport
//!
//! Shared request plumbing for every service client: JSON bodies, bounded
//! request time, and mapping of HTTP failures onto [`ServiceError`].

use crate::config::ConfigError;
use checkout_core::{ServiceError, ServiceResult};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Build the HTTP client shared by all service clients.
///
/// `timeout` bounds each request end to end, on top of the orchestrator's own
/// per-call timeout.
pub fn build_http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Error body returned by downstream services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// A base URL plus the client used to reach it
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    service: &'static str,
    timeout: Duration,
}

impl HttpTransport {
    /// `timeout` must match the one `client` was built with
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        service: &'static str,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            service,
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}{collection}/{id}` with `id` escaped as a single path segment.
    ///
    /// `.`, `..` and empty ids are refused: they would address the
    /// collection itself or its parent.
    fn resource_url(&self, collection: &str, id: &str) -> ServiceResult<Url> {
        if id.is_empty() || id == "." || id == ".." {
            return Err(ServiceError::NotFound {
                what: format!("{} resource {:?}", self.service, id),
            });
        }

        let mut url = Url::parse(&self.url(collection)).map_err(|e| {
            ServiceError::Network(format!("invalid {} service url: {}", self.service, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ServiceError::Network(format!("{} service url cannot take a path", self.service))
            })?
            .push(id);
        Ok(url)
    }

    /// GET `{collection}/{id}`
    pub async fn get_json<T: DeserializeOwned>(&self, collection: &str, id: &str) -> ServiceResult<T> {
        let url = self.resource_url(collection, id)?;
        let body = self
            .send(self.client.get(url), ServiceError::Unavailable)
            .await?;
        self.decode(&body)
    }

    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_json_rejecting(path, payload, ServiceError::Unavailable)
            .await
    }

    /// POST where a 400/422 answer means the service rejected the request
    /// content; `rejected` turns the service's message into the error.
    pub async fn post_json_rejecting<B, T>(
        &self,
        path: &str,
        payload: &B,
        rejected: impl FnOnce(String) -> ServiceError,
    ) -> ServiceResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .send(self.client.post(self.url(path)).json(payload), rejected)
            .await?;
        self.decode(&body)
    }

    /// POST where only the status matters
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> ServiceResult<()> {
        self.send(
            self.client.post(self.url(path)).json(payload),
            ServiceError::Unavailable,
        )
        .await
        .map(|_| ())
    }

    /// DELETE `{collection}/{id}`
    pub async fn delete(&self, collection: &str, id: &str) -> ServiceResult<()> {
        let url = self.resource_url(collection, id)?;
        self.send(self.client.delete(url), ServiceError::Unavailable)
            .await
            .map(|_| ())
    }

    /// Send the request and return the body of a successful response
    async fn send(
        &self,
        request: RequestBuilder,
        rejected: impl FnOnce(String) -> ServiceError,
    ) -> ServiceResult<String> {
        let response = request.send().await.map_err(|e| self.send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.send_error(e))?;

        if !status.is_success() {
            error!(
                "{} service error: status={}, body={}",
                self.service, status, body
            );
            return Err(status_error(status, &body, rejected));
        }

        debug!("{} service responded: status={}", self.service, status);
        Ok(body)
    }

    fn send_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ServiceError::Network(e.to_string())
        }
    }

    fn decode<T: DeserializeOwned>(&self, body: &str) -> ServiceResult<T> {
        serde_json::from_str(body).map_err(|e| {
            ServiceError::InvalidResponse(format!(
                "failed to parse {} response: {}",
                self.service, e
            ))
        })
    }
}

/// Map a non-success status onto the service error taxonomy
fn status_error(
    status: StatusCode,
    body: &str,
    rejected: impl FnOnce(String) -> ServiceError,
) -> ServiceError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound { what: message },
        StatusCode::PAYMENT_REQUIRED => ServiceError::Declined { reason: message },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => rejected(message),
        _ => ServiceError::Unavailable(message),
    }
}


#[cfg(test)]
pub(crate) fn test_transport(base_url: &str, service: &'static str) -> HttpTransport {
    let timeout = Duration::from_millis(500);
    let client = build_http_client(timeout).expect("client builds");
    HttpTransport::new(client, base_url, service, timeout)
}
