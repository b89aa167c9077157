//! HTTP client wrapper - executes requests and normalizes responses

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::error::PreflightError;
use crate::models::{HttpMethod, ResponseRecord};
use crate::network::builder::BuiltRequest;

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::GET => Method::GET,
        HttpMethod::POST => Method::POST,
        HttpMethod::PUT => Method::PUT,
        HttpMethod::DELETE => Method::DELETE,
    }
}

/// Execute a built request and classify the outcome.
///
/// Any status the target answers with is an `Http` record, 4xx and 5xx
/// included. A request that gets no answer is a `Transport` record with
/// status 0. The call never fails.
pub async fn execute_request(client: &reqwest::Client, request: &BuiltRequest) -> ResponseRecord {
    let start = Instant::now();

    let mut req_builder = client.request(to_reqwest_method(request.method), &request.url);
    for (key, value) in &request.headers {
        req_builder = req_builder.header(key, value);
    }
    if let Some(body) = &request.body {
        req_builder = req_builder.json(body);
    }

    let result = req_builder.send().await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(resp) => {
            let status = resp.status().as_u16();
            let headers = collect_headers(resp.headers());
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => format!("Error reading body: {}", e),
            };
            ResponseRecord::http(status, &body, headers, start.elapsed().as_millis() as u64)
        }
        Err(e) if e.is_builder() => {
            tracing::warn!(url = %request.url, error = %e, "Request rejected by client");
            ResponseRecord::preflight_failure(&PreflightError::Rejected(e.to_string()))
        }
        Err(e) => {
            if e.is_timeout() {
                tracing::warn!(url = %request.url, elapsed, "Request timed out");
            } else if e.is_connect() {
                tracing::warn!(url = %request.url, error = %e, "Connection failed");
            } else {
                tracing::warn!(url = %request.url, error = %e, "Request failed");
            }
            ResponseRecord::transport_failure(elapsed)
        }
    }
}

/// Response headers in received order; repeated names are joined
fn collect_headers(map: &HeaderMap) -> IndexMap<String, String> {
    let mut headers: IndexMap<String, String> = IndexMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match headers.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                headers.insert(name.as_str().to_string(), value);
            }
        }
    }
    headers
}

/// Create an HTTP client with default configuration
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
