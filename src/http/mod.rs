//! HTTP verb layer
//!
//! Issues GET/POST/PUT/DELETE/HEAD against `base_url + path` with bearer
//! auth, JSON request bodies and JSON-decoded responses, and classifies
//! the resulting status codes into typed errors.
//!
//! # Features
//!
//! - **One round trip per call**: no retries, no backoff, no rate limiting
//! - **Authentication**: bearer token from the auth module on every request
//! - **Error Classification**: pure status-code-to-error mapping per verb

mod classify;
mod client;

pub use classify::{classify, error_message, DELETED_STATUS};
pub use client::{ApiResponse, HttpClient, RequestConfig};

#[cfg(test)]
mod tests;
