//! Integration tests for the crawl service client and page server.
//!
//! Each test starts an in-process mock crawl service on 127.0.0.1 and points
//! the client at it, so no external network access is needed.

mod client;
mod pages;
