//! HTTP transport adapter.
//!
//! # Design
//! `HttpRequest` describes a request as plain data; `Transport` performs one
//! round trip and drains the response body. `TaskClient` is generic over the
//! transport so tests can swap in a double that records requests and hands
//! back canned responses without touching the network.
//!
//! `read_body` takes the body stream by value: the stream is dropped (and the
//! underlying connection released) when it returns, on success or failure.

use std::io::Read;
use std::time::Duration;

use crate::error::ApiError;

/// Default per-request timeout used by `UreqTransport`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Unread response body.
pub type ResponseBody = Box<dyn Read>;

/// Status line plus the still-unread body of a response.
pub struct RawResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl RawResponse {
    /// Response whose body is an in-memory byte buffer.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: Box::new(std::io::Cursor::new(body.into())),
        }
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse").field("status", &self.status).finish_non_exhaustive()
    }
}

/// One HTTP round trip.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Send `request` and return the status with the unread body.
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ApiError>;

    /// Drain `body` completely. The stream is closed when this returns.
    fn read_body(&self, body: ResponseBody) -> Result<Vec<u8>, ApiError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// Non-2xx statuses are returned as data so `TaskClient` can interpret them.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<RawResponse, ApiError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(url), headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(url), headers).send(body.as_bytes()),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
        };

        let response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.into_body().into_reader();
        Ok(RawResponse {
            status,
            body: Box::new(body),
        })
    }

    fn read_body(&self, mut body: ResponseBody) -> Result<Vec<u8>, ApiError> {
        let mut buf = Vec::new();
        body.read_to_end(&mut buf).map_err(|e| ApiError::BodyRead(e.to_string()))?;
        Ok(buf)
    }
}
