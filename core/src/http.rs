//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The API
//! client builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; a `Transport` performs the round-trip in between.
//! Keeping the two apart lets tests feed canned responses straight into the
//! parser and swap the transport for a fake.

/// A `GET` request described as plain data.
///
/// Built by `TodoClient::build_*` methods and handed to a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` (or constructed by hand in tests), then passed to
/// `TodoClient::parse_*` methods for status checking and decoding.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
