//! Browser for fediverse instance crawl data.
//!
//! A crawl service tracks federated-network instances and periodically probes
//! them. This library provides a typed client for its REST API and a small
//! page server that renders instances and their crawl history.
//!
//! # Result channels
//!
//! Every client call resolves to one of:
//!
//! ```text
//! Ok(ApiResponse::Success(T))       2xx with the expected payload
//! Ok(ApiResponse::Failure(err))     any non-success status (modeled error)
//! Err(ClientError::...)             transport, malformed body, cancelled
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`models`]: Instance, Crawl, paginated envelope and error payload
//! - [`client`]: Request layer, one operation per endpoint
//! - [`web`]: Page server for browsing the data
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod utils;
pub mod web;

pub use client::{ApiResponse, CancelHandle, Cancelable, FediClient, PageParams, ServiceError};
pub use config::Config;
pub use error::{AppError, ClientError};
