//! Typed data contract of the crawl service.
//!
//! This module handles:
//! - Instance records and their status
//! - Crawl history records
//! - The paginated list envelope
//! - The service error payload

pub mod crawl;
pub mod error;
pub mod instance;
pub mod page;

pub use crawl::{Crawl, CrawlStatus};
pub use error::ErrorPayload;
pub use instance::{Instance, InstanceStatus};
pub use page::{Page, DEFAULT_PAGE, DEFAULT_PER_PAGE};
