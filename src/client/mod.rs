//! Crawl service request layer.
//!
//! One operation per REST endpoint. Every call issues exactly one request and
//! returns a [`Cancelable`] future resolving to either:
//! - `Ok(ApiResponse::Success(_))` for a 2xx response with a well-formed body,
//! - `Ok(ApiResponse::Failure(_))` for any non-success status,
//! - `Err(ClientError)` for transport failures, malformed success bodies, and
//!   cancellation.
//!
//! There is no caching, deduplication, retry or timeout in this layer.

pub mod cancel;
pub mod endpoints;

use std::fmt;
use std::time::Instant;

use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, debug_span, warn, Instrument};
use url::Url;

use crate::config::Config;
use crate::error::ClientError;
use crate::metrics;
use crate::models::{Crawl, ErrorPayload, Instance, Page, DEFAULT_PAGE, DEFAULT_PER_PAGE};

pub use cancel::{CancelHandle, Cancelable};

/// Pagination parameters sent as `page` and `per_page`.
///
/// Forwarded to the service verbatim; the service decides what to do with
/// out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub per_page: u32,
}

impl PageParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Same page size, another page number.
    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// A non-success response from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    /// HTTP status code.
    pub status: u16,
    /// Decoded error body.
    pub payload: ErrorPayload,
}

impl ServiceError {
    /// Best available human-readable message.
    pub fn message(&self) -> String {
        if let Some(message) = &self.payload.message {
            return message.clone();
        }
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("unexpected error")
            .to_string()
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service returned HTTP {}: {}", self.status, self.message())
    }
}

/// Result of a call that reached the service.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// Expected payload.
    Success(T),
    /// Service-defined error.
    Failure(ServiceError),
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, ServiceError> {
        match self {
            ApiResponse::Success(value) => Ok(value),
            ApiResponse::Failure(error) => Err(error),
        }
    }

    /// The payload, if the call succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            ApiResponse::Success(value) => Some(value),
            ApiResponse::Failure(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success(value) => ApiResponse::Success(f(value)),
            ApiResponse::Failure(error) => ApiResponse::Failure(error),
        }
    }
}

/// Crawl service API client.
#[derive(Debug, Clone)]
pub struct FediClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL every endpoint is appended to.
    base_url: Url,
}

impl FediClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Self::with_base_url(config.api_base_url()?)
    }

    /// Create a client for an explicit base URL.
    pub fn with_base_url(base_url: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .tcp_nodelay(true)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// List instances, optionally filtered by software name.
    pub fn list_instances(
        &self,
        software: Option<&str>,
        paging: PageParams,
    ) -> Cancelable<ApiResponse<Page<Instance>>> {
        let url = endpoints::build_list_instances_url(&self.base_url, software, paging);
        let span = debug_span!(
            "list_instances",
            software = software.unwrap_or(""),
            page = paging.page,
            per_page = paging.per_page
        );
        self.execute("list_instances", url, span)
    }

    /// Fetch one instance by identifier.
    pub fn get_instance_by_id(&self, id: &str) -> Cancelable<ApiResponse<Instance>> {
        let url = endpoints::build_instance_url(&self.base_url, id);
        let span = debug_span!("get_instance_by_id", id = %id);
        self.execute("get_instance_by_id", url, span)
    }

    /// List the crawl history of one instance.
    pub fn list_crawls_for_instance(
        &self,
        id: &str,
        paging: PageParams,
    ) -> Cancelable<ApiResponse<Page<Crawl>>> {
        let url = endpoints::build_crawls_url(&self.base_url, id, paging);
        let span = debug_span!(
            "list_crawls_for_instance",
            id = %id,
            page = paging.page,
            per_page = paging.per_page
        );
        self.execute("list_crawls_for_instance", url, span)
    }

    fn execute<T>(
        &self,
        endpoint: &'static str,
        url: Result<Url, ClientError>,
        span: tracing::Span,
    ) -> Cancelable<ApiResponse<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let http = self.http.clone();

        let request = async move {
            let url = match url {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "Request not sent");
                    metrics::inc_request_outcome(endpoint, metrics::OUTCOME_INVALID_REQUEST);
                    return Err(e);
                }
            };
            let start = Instant::now();
            let result = send::<T>(&http, endpoint, url).await;
            metrics::record_api_latency(start, endpoint);

            let outcome = match &result {
                Ok(ApiResponse::Success(_)) => metrics::OUTCOME_SUCCESS,
                Ok(ApiResponse::Failure(error)) => {
                    debug!(status = error.status, "Service returned an error");
                    metrics::OUTCOME_SERVICE_ERROR
                }
                Err(e) => {
                    warn!(error = %e, "Request failed");
                    metrics::OUTCOME_TRANSPORT_ERROR
                }
            };
            metrics::inc_request_outcome(endpoint, outcome);

            result
        };

        Cancelable::new(endpoint, request.instrument(span))
    }
}

async fn send<T: DeserializeOwned>(
    http: &reqwest::Client,
    endpoint: &'static str,
    url: Url,
) -> Result<ApiResponse<T>, ClientError> {
    debug!(url = %url, "Sending request");

    let response = http
        .get(url)
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Ok(ApiResponse::Failure(ServiceError {
            status: status.as_u16(),
            payload: ErrorPayload::from_body(&body),
        }));
    }

    let value = serde_json::from_slice(&body)
        .map_err(|source| ClientError::Decode { endpoint, source })?;

    debug!(status = status.as_u16(), bytes = body.len(), "Request completed");

    Ok(ApiResponse::Success(value))
}
