//! Request builder - turns the selected endpoint, the active environment and
//! the operator's edits into a concrete request

use indexmap::IndexMap;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde_json::Value;

use crate::constants::{API_KEY_KEY, BASE_URL_KEY};
use crate::environment::EnvironmentVariableSet;
use crate::error::PreflightError;
use crate::models::{EndpointDescriptor, Header, HttpMethod, NetworkId};

/// A request ready to go on the wire
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltRequest {
    pub network: NetworkId,
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<Value>,
}

/// Build the request for `endpoint` against `env`.
///
/// The URL is `BASE_URL + path` with no slash normalization. Extra headers
/// are laid over the defaults and the later entry wins on a repeated name
/// (names compare case-insensitively). GET never carries a body.
pub fn build_request(
    network: NetworkId,
    endpoint: &EndpointDescriptor,
    env: &EnvironmentVariableSet,
    body_text: &str,
    extra_headers: &[Header],
) -> Result<BuiltRequest, PreflightError> {
    let base_url = env.get(BASE_URL_KEY).map(String::as_str).unwrap_or("");
    let api_key = env.get(API_KEY_KEY).map(String::as_str).unwrap_or("");

    let url = format!("{}{}", base_url, endpoint.path);
    if let Err(e) = Url::parse(&url) {
        return Err(PreflightError::InvalidUrl {
            url,
            reason: e.to_string(),
        });
    }

    let mut headers = IndexMap::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Authorization".to_string(), format!("Bearer {}", api_key));

    for header in extra_headers.iter().filter(|h| h.enabled && !h.key.is_empty()) {
        validate_header(header)?;
        headers.retain(|k: &String, _| !k.eq_ignore_ascii_case(&header.key));
        headers.insert(header.key.clone(), header.value.clone());
    }

    let body = if endpoint.method.has_body() {
        let parsed = serde_json::from_str::<Value>(body_text)
            .map_err(|e| PreflightError::InvalidBody(e.to_string()))?;
        Some(parsed)
    } else {
        None
    };

    Ok(BuiltRequest {
        network,
        method: endpoint.method,
        url,
        headers,
        body,
    })
}

fn validate_header(header: &Header) -> Result<(), PreflightError> {
    HeaderName::from_bytes(header.key.as_bytes()).map_err(|e| PreflightError::InvalidHeader {
        name: header.key.clone(),
        reason: e.to_string(),
    })?;
    HeaderValue::from_str(&header.value).map_err(|e| PreflightError::InvalidHeader {
        name: header.key.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(base: &str) -> EnvironmentVariableSet {
        let mut set = EnvironmentVariableSet::new();
        set.insert("BASE_URL".into(), base.into());
        set.insert("API_KEY".into(), "secret".into());
        set
    }

    #[test]
    fn test_get_has_no_body_and_literal_url() {
        let ep = EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping");
        let req = build_request(NetworkId::Testnet, &ep, &env("https://x/testnet"), "not json", &[]).unwrap();
        assert_eq!(req.url, "https://x/testnet/ping");
        assert_eq!(req.body, None);
        assert_eq!(req.headers.get("Authorization").map(String::as_str), Some("Bearer secret"));
        assert_eq!(req.headers.get("Content-Type").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn test_duplicate_slashes_are_kept() {
        let ep = EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping");
        let req = build_request(NetworkId::Testnet, &ep, &env("https://x/testnet/"), "{}", &[]).unwrap();
        assert_eq!(req.url, "https://x/testnet//ping");
    }

    #[test]
    fn test_extra_headers_override_last_one_wins() {
        let ep = EndpointDescriptor::new(HttpMethod::POST, "/fund", "Fund");
        let extra = vec![
            Header::new("authorization", "Bearer first"),
            Header::new("X-Trace", "1"),
            Header::new("Authorization", "Bearer second"),
            Header::new("", "ignored"),
        ];
        let req = build_request(NetworkId::Public, &ep, &env("https://x"), "{\"a\":1}", &extra).unwrap();
        let auth: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(auth[0].1, "Bearer second");
        assert_eq!(req.headers.get("X-Trace").map(String::as_str), Some("1"));
        assert_eq!(req.body, Some(json!({"a": 1})));
    }

    #[test]
    fn test_disabled_headers_are_skipped() {
        let ep = EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping");
        let mut off = Header::new("X-Off", "1");
        off.enabled = false;
        let req = build_request(NetworkId::Testnet, &ep, &env("https://x"), "", &[off]).unwrap();
        assert!(!req.headers.contains_key("X-Off"));
    }

    #[test]
    fn test_invalid_json_body_is_preflight_error() {
        let ep = EndpointDescriptor::new(HttpMethod::PUT, "/users/1", "Update");
        let err = build_request(NetworkId::Testnet, &ep, &env("https://x"), "{ nope", &[]).unwrap_err();
        assert!(matches!(err, PreflightError::InvalidBody(_)));
    }

    #[test]
    fn test_missing_base_url_is_preflight_error() {
        let ep = EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping");
        let err = build_request(NetworkId::Kipaji, &ep, &EnvironmentVariableSet::new(), "", &[]).unwrap_err();
        assert!(matches!(err, PreflightError::InvalidUrl { .. }));
    }
}
