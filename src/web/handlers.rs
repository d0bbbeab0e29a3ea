//! Page server handlers.

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::client::{ApiResponse, FediClient, PageParams, ServiceError};
use crate::error::ClientError;
use crate::metrics;
use crate::models::DEFAULT_PAGE;

use super::render;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Crawl service client.
    pub client: FediClient,
    /// Prometheus handle, when a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(client: FediClient) -> Self {
        Self {
            client,
            prometheus: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Query string of the list pages.
///
/// `page` is kept as text so a malformed value falls back to the first page
/// instead of rejecting the request. A query string that does not fit this
/// shape at all (such as a repeated key) is treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub software: Option<String>,
}

impl ListQuery {
    /// Requested page number, defaulting to the first page.
    pub fn page_number(&self) -> u32 {
        parse_page(self.page.as_deref())
    }

    /// Software filter, ignoring blank values.
    pub fn software_filter(&self) -> Option<&str> {
        self.software
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Parse a page number from a query string value.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(DEFAULT_PAGE)
}

fn list_query(query: Option<Query<ListQuery>>) -> ListQuery {
    query.map(|Query(query)| query).unwrap_or_default()
}

fn page_response(route: &'static str, status: StatusCode, html: String) -> Response {
    metrics::inc_pages_rendered(route, status.as_u16());
    (status, Html(html)).into_response()
}

fn service_error_response(route: &'static str, error: &ServiceError) -> Response {
    let status = StatusCode::from_u16(error.status).unwrap_or(StatusCode::BAD_GATEWAY);
    page_response(route, status, render::error_page(status.as_u16(), &error.message()))
}

fn client_error_response(route: &'static str, error: &ClientError) -> Response {
    warn!(route, error = %error, "Crawl service unavailable");
    let status = match error {
        ClientError::InvalidPathSegment(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    page_response(route, status, render::error_page(status.as_u16(), &error.to_string()))
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus exposition, or 404 when no recorder is installed.
pub async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Home page: paginated instance list.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    query: Option<Query<ListQuery>>,
) -> Response {
    let query = list_query(query);
    let paging = PageParams::default().with_page(query.page_number());
    let software = query.software_filter();

    match state.client.list_instances(software, paging).await {
        Ok(ApiResponse::Success(page)) => page_response(
            "home",
            StatusCode::OK,
            render::instance_list(&page, software),
        ),
        Ok(ApiResponse::Failure(error)) => service_error_response("home", &error),
        Err(error) => client_error_response("home", &error),
    }
}

/// Instance detail page with its crawl history.
#[instrument(skip(state))]
pub async fn instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Option<Query<ListQuery>>,
) -> Response {
    let query = list_query(query);
    let paging = PageParams::default().with_page(query.page_number());

    let (instance, crawls) = tokio::join!(
        state.client.get_instance_by_id(&id),
        state.client.list_crawls_for_instance(&id, paging),
    );

    let instance = match instance {
        Ok(ApiResponse::Success(instance)) => instance,
        Ok(ApiResponse::Failure(error)) => return service_error_response("instance", &error),
        Err(error) => return client_error_response("instance", &error),
    };

    let html = match crawls {
        Ok(ApiResponse::Success(page)) => render::instance_detail(&instance, Ok(&page)),
        Ok(ApiResponse::Failure(error)) => render::instance_detail(&instance, Err(&error)),
        Err(error) => return client_error_response("instance", &error),
    };

    page_response("instance", StatusCode::OK, html)
}

/// Static about page.
pub async fn about() -> Response {
    page_response("about", StatusCode::OK, render::about())
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> Response {
    page_response("not_found", StatusCode::NOT_FOUND, render::not_found(uri.path()))
}
