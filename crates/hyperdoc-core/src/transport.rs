//! HTTP transport
//!
//! Documents talk to the server through the [`HttpClient`] trait so the
//! request/response layer can be swapped out (tests use an in-process
//! recorder). [`ReqwestClient`] is the production implementation.
//!
//! ## Protocol
//!
//! - GET with `Content-Type: application/json` and
//!   `Authorization: Bearer <token>`; only `200` with a non-empty JSON object
//!   body counts as a document.
//! - PUT with the same headers and a JSON body; only `202` counts as saved.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::document::DocumentFields;
use crate::error::TransportError;
use crate::links::Relations;

/// Status a GET must return to yield a document
pub const STATUS_OK: u16 = 200;

/// Status a PUT must return to count as saved
pub const STATUS_ACCEPTED: u16 = 202;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("hyperdoc/", env!("CARGO_PKG_VERSION"));

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

/// An outgoing request
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Build a request carrying the JSON content type and bearer token
    pub fn authorized(method: Method, url: &str, access_token: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Bearer {}", access_token)),
            ],
            body: None,
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Keeps the bearer token out of logs
impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case("authorization") {
                    (key.as_str(), "<redacted>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(String::len))
            .finish()
    }
}

/// A received response: status code plus raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// A blocking request/response client
pub trait HttpClient: Send + Sync {
    /// Send a request and return the status and raw body
    ///
    /// Non-success statuses are normal responses, not errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpClient`] backed by `reqwest::blocking`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Create a client with the default timeout and user agent
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        Self::with_settings(Duration::from_secs(config.timeout_secs), user_agent)
    }

    /// Create a client with an explicit timeout and user agent
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Put => self.client.put(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(HttpResponse { status, body })
    }
}

/// Body sent on save: only these fields are ever persisted
#[derive(Debug, Serialize)]
pub struct SaveBody<'a> {
    pub version: Option<&'a Value>,
    pub data: Option<&'a Value>,
    pub links: Option<&'a Relations>,
}

/// Fetch a document
///
/// Returns `None` unless the server answers `200` with a non-empty body that
/// decodes as a JSON object. Transport failures are logged, never returned.
pub fn get_document(
    client: &dyn HttpClient,
    url: &str,
    access_token: &str,
) -> Option<DocumentFields> {
    let request = HttpRequest::authorized(Method::Get, url, access_token);
    debug!("Fetching document: {}", url);

    let response = match client.execute(&request) {
        Ok(response) => response,
        Err(e) => {
            warn!("GET {} failed: {}", url, e);
            return None;
        }
    };

    if response.status != STATUS_OK {
        warn!("GET {} returned status {}", url, response.status);
        return None;
    }
    if response.body.trim().is_empty() {
        warn!("GET {} returned an empty body", url);
        return None;
    }

    match serde_json::from_str::<DocumentFields>(&response.body) {
        Ok(fields) => {
            debug!("Loaded document from {} ({} bytes)", url, response.body.len());
            Some(fields)
        }
        Err(e) => {
            warn!("GET {} returned an undecodable document: {}", url, e);
            None
        }
    }
}

/// Store a document
///
/// Returns `true` only when the server answers `202 Accepted`.
pub fn put_document(
    client: &dyn HttpClient,
    url: &str,
    access_token: &str,
    body: &SaveBody<'_>,
) -> bool {
    let encoded = match encode_body(body) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!("Could not encode document for {}: {}", url, e);
            return false;
        }
    };

    let request = HttpRequest::authorized(Method::Put, url, access_token).with_body(encoded);
    debug!("Saving document: {}", url);

    match client.execute(&request) {
        Ok(response) if response.status == STATUS_ACCEPTED => {
            debug!("Saved document to {}", url);
            true
        }
        Ok(response) => {
            warn!("PUT {} returned status {}", url, response.status);
            false
        }
        Err(e) => {
            warn!("PUT {} failed: {}", url, e);
            false
        }
    }
}

fn encode_body(body: &SaveBody<'_>) -> Result<String, TransportError> {
    Ok(serde_json::to_string(body)?)
}
