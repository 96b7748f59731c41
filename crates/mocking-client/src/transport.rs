//! HTTP transport seam
//!
//! `ApiClient` builds `HttpRequest`s and hands them to a `Transport`.
//! `ReqwestTransport` talks to the real server; `FakeTransport` (see
//! `crate::fake`) records requests and replays scripted responses.

use async_trait::async_trait;
use mocking_api::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use tracing::{debug, error};

pub use reqwest::Method;

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Token of the `Authorization: Bearer` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("Authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase of the status line, e.g. `Not Found`.
    pub reason: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL requests are resolved against.
    fn base_url(&self) -> &str;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Helper to create better error messages from reqwest errors
    fn format_reqwest_error(e: reqwest::Error, url: &str) -> String {
        if e.is_timeout() {
            format!(
                "request to {} timed out (check network or increase timeout)",
                url
            )
        } else if e.is_connect() {
            format!(
                "could not connect to {}: check that the server is running and reachable. Error: {}",
                url, e
            )
        } else if e.is_request() {
            format!("invalid request to {}: {}", url, e)
        } else {
            format!("request to {} failed: {}", url, e)
        }
    }

    fn build_headers(request: &HttpRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => debug!("[ReqwestTransport] Skipping malformed header {}", name),
            }
        }

        // Inject trace context into HTTP headers for distributed tracing
        use opentelemetry::Context;
        use opentelemetry::global;

        struct HeaderInjector<'a> {
            headers: &'a mut HeaderMap,
        }
        impl opentelemetry::propagation::Injector for HeaderInjector<'_> {
            fn set(&mut self, key: &str, value: String) {
                if let Ok(header_name) = HeaderName::from_bytes(key.as_bytes()) {
                    if let Ok(header_value) = HeaderValue::from_str(&value) {
                        self.headers.insert(header_name, header_value);
                    }
                }
            }
        }

        let mut injector = HeaderInjector {
            headers: &mut headers,
        };
        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&Context::current(), &mut injector);
        });

        headers
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(Self::build_headers(&request));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_string(body)?);
        }

        let response = builder.send().await.map_err(|e| {
            let message = Self::format_reqwest_error(e, &url);
            error!("[ReqwestTransport] {} {} failed: {}", request.method, url, message);
            ApiError::network(message)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ApiError::network(format!("Failed to read response body from {}: {}", url, e))
        })?;

        debug!(
            "[ReqwestTransport] {} {} -> {} ({} bytes)",
            request.method,
            url,
            status.as_u16(),
            body.len()
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_lookup_is_case_insensitive() {
        let mut request = HttpRequest::new(Method::GET, "/projects");
        request
            .headers
            .push(("authorization".to_string(), "Bearer abc".to_string()));
        assert_eq!(request.bearer_token(), Some("abc"));
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer abc"));
    }

    #[test]
    fn test_base_url_drops_trailing_slash() {
        let transport =
            ReqwestTransport::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_build_headers_keeps_valid_headers() {
        let mut request = HttpRequest::new(Method::POST, "/projects");
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        request
            .headers
            .push(("bad header".to_string(), "x".to_string()));
        let headers = ReqwestTransport::build_headers(&request);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.len(), 1);
    }
}
