//! Fake transport for tests and offline mode
//!
//! FakeTransport implements Transport without a network:
//! - Every request is recorded and can be inspected afterwards
//! - Responses are scripted per (method, path); the last scripted response repeats
//! - Unscripted routes answer 404 the way the backend does

use async_trait::async_trait;
use mocking_api::Result;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

type Route = (Method, String);

pub struct FakeTransport {
    base_url: String,
    routes: Mutex<HashMap<Route, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::with_base_url("http://fake.mockingcode.test")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a JSON response for `method path`.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(
            method,
            path,
            HttpResponse {
                status,
                reason: None,
                body: body.to_string(),
            },
        )
    }

    /// Queue a body-less response, e.g. `204 No Content`.
    pub fn respond_empty(&self, method: Method, path: &str, status: u16) -> &Self {
        self.push(
            method,
            path,
            HttpResponse {
                status,
                reason: None,
                body: String::new(),
            },
        )
    }

    /// Queue a raw response, for bodies that are not JSON.
    pub fn push(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// All requests sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn next_response(&self, method: &Method, path: &str) -> HttpResponse {
        let mut routes = lock(&self.routes);
        match routes.get_mut(&(method.clone(), path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.next_response(&request.method, &request.path);
        lock(&self.requests).push(request);
        Ok(response)
    }
}

fn not_found() -> HttpResponse {
    HttpResponse {
        status: 404,
        reason: Some("Not Found".to_string()),
        body: serde_json::json!({"message": "Endpoint not found"}).to_string(),
    }
}

// A panicking test must not poison the fake for the rest of the suite.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
