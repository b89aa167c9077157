use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    EMPTY_BODY, NO_RESPONSE_MESSAGE, PREFLIGHT_FAILURE_STATUS, TRANSPORT_FAILURE_STATUS,
};
use crate::error::PreflightError;

/// Deployment target selecting the active environment and registry slice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    #[default]
    Testnet,
    Public,
    Kipaji,
}

impl NetworkId {
    pub const ALL: [NetworkId; 3] = [NetworkId::Testnet, NetworkId::Public, NetworkId::Kipaji];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Testnet => "testnet",
            NetworkId::Public => "public",
            NetworkId::Kipaji => "kipaji",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NetworkId::Testnet => "Testnet",
            NetworkId::Public => "Public Net",
            NetworkId::Kipaji => "Kipaji",
        }
    }

    pub fn next(&self) -> NetworkId {
        match self {
            NetworkId::Testnet => NetworkId::Public,
            NetworkId::Public => NetworkId::Kipaji,
            NetworkId::Kipaji => NetworkId::Testnet,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(NetworkId::Testnet),
            "public" => Ok(NetworkId::Public),
            "kipaji" => Ok(NetworkId::Kipaji),
            other => Err(format!("unknown network `{}`", other)),
        }
    }
}

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::GET,
        }
    }

    pub fn prev(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::DELETE,
            HttpMethod::POST => HttpMethod::GET,
            HttpMethod::PUT => HttpMethod::POST,
            HttpMethod::DELETE => HttpMethod::PUT,
        }
    }

    /// Every method except GET sends the body buffer
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::GET)
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            other => Err(format!("unsupported method `{}`", other)),
        }
    }
}

/// Identity of an endpoint inside one collection
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointIdentity {
    pub method: HttpMethod,
    pub path: String,
}

/// Reusable request template stored in the registry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
}

impl EndpointDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>, description: impl Into<String>) -> Self {
        EndpointDescriptor {
            method,
            path: path.into(),
            description: description.into(),
            request_body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn identity(&self) -> EndpointIdentity {
        EndpointIdentity {
            method: self.method,
            path: self.path.clone(),
        }
    }

    pub fn matches(&self, method: HttpMethod, path: &str) -> bool {
        self.method == method && self.path == path
    }

    /// Text placed in the body editor when this endpoint gets selected
    pub fn seed_body(&self) -> String {
        if !self.method.has_body() {
            return EMPTY_BODY.to_string();
        }
        match &self.request_body {
            Some(body) => {
                serde_json::to_string_pretty(body).unwrap_or_else(|_| EMPTY_BODY.to_string())
            }
            None => EMPTY_BODY.to_string(),
        }
    }
}

/// Collection name -> ordered endpoints, for one network
pub type CollectionRegistry = IndexMap<String, Vec<EndpointDescriptor>>;

/// What happens when a write targets a key that already exists
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Last write wins, the previous value is replaced silently
    #[default]
    OverwriteOnCollision,
    /// The write is refused before anything changes
    Reject,
}

/// HTTP Header
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Header {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }
}

/// Headers shown in the editor for a fresh selection
pub fn default_extra_headers() -> Vec<Header> {
    vec![Header::new("Content-Type", "application/json")]
}

/// The endpoint being worked on and its unsent edits
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRequest {
    pub group: String,
    pub endpoint: EndpointDescriptor,
    pub body: String,
    pub headers: Vec<Header>,
}

impl PendingRequest {
    pub fn for_endpoint(group: impl Into<String>, endpoint: EndpointDescriptor) -> Self {
        let body = endpoint.seed_body();
        PendingRequest {
            group: group.into(),
            endpoint,
            body,
            headers: default_extra_headers(),
        }
    }
}

/// How a send attempt ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangeKind {
    /// The target answered, whatever the status
    Http,
    /// Nothing came back
    Transport,
    /// The request never left the console
    Preflight,
}

impl ExchangeKind {
    /// Http and Transport outcomes both reached the network
    pub fn is_exchange(&self) -> bool {
        !matches!(self, ExchangeKind::Preflight)
    }
}

/// Response body or a description of what went wrong
#[derive(Clone, Debug, PartialEq)]
pub enum ResponsePayload {
    Body(Value),
    Error(String),
}

impl ResponsePayload {
    /// Parse a raw body as JSON, keeping non-JSON text as a JSON string
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(json) => ResponsePayload::Body(json),
            Err(_) => ResponsePayload::Body(Value::String(text.to_string())),
        }
    }

    pub fn pretty(&self) -> String {
        match self {
            ResponsePayload::Body(Value::String(text)) => text.clone(),
            ResponsePayload::Body(json) => {
                serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
            }
            ResponsePayload::Error(message) => message.clone(),
        }
    }

    pub fn raw(&self) -> String {
        match self {
            ResponsePayload::Body(json) => json.to_string(),
            ResponsePayload::Error(message) => message.clone(),
        }
    }
}

/// Normalized outcome of the last executed request
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseRecord {
    pub status: u16,
    pub payload: ResponsePayload,
    pub headers: IndexMap<String, String>,
    pub kind: ExchangeKind,
    pub elapsed_ms: u64,
}

impl ResponseRecord {
    pub fn http(status: u16, body: &str, headers: IndexMap<String, String>, elapsed_ms: u64) -> Self {
        ResponseRecord {
            status,
            payload: ResponsePayload::from_text(body),
            headers,
            kind: ExchangeKind::Http,
            elapsed_ms,
        }
    }

    pub fn transport_failure(elapsed_ms: u64) -> Self {
        ResponseRecord {
            status: TRANSPORT_FAILURE_STATUS,
            payload: ResponsePayload::Error(NO_RESPONSE_MESSAGE.to_string()),
            headers: IndexMap::new(),
            kind: ExchangeKind::Transport,
            elapsed_ms,
        }
    }

    pub fn preflight_failure(error: &PreflightError) -> Self {
        ResponseRecord {
            status: PREFLIGHT_FAILURE_STATUS,
            payload: ResponsePayload::Error(error.to_string()),
            headers: IndexMap::new(),
            kind: ExchangeKind::Preflight,
            elapsed_ms: 0,
        }
    }

    pub fn headers_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.headers).unwrap_or_default()
    }
}

/// Snapshot of a sent request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub method: HttpMethod,
    pub path: String,
    #[serde(rename = "bodyText")]
    pub body_text: String,
    pub network: NetworkId,
}

impl HistoryEntry {
    pub fn new(method: HttpMethod, path: impl Into<String>, body_text: impl Into<String>, network: NetworkId) -> Self {
        HistoryEntry {
            timestamp: Utc::now(),
            method,
            path: path.into(),
            body_text: body_text.into(),
            network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_body_pretty_prints_sample() {
        let ep = EndpointDescriptor::new(HttpMethod::POST, "/fund-account", "Fund")
            .with_body(json!({"account": "GABC"}));
        assert_eq!(ep.seed_body(), "{\n  \"account\": \"GABC\"\n}");
    }

    #[test]
    fn test_seed_body_defaults_to_empty_object() {
        let post = EndpointDescriptor::new(HttpMethod::POST, "/trustline", "Trustline");
        assert_eq!(post.seed_body(), "{}");

        let get = EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping")
            .with_body(json!({"ignored": true}));
        assert_eq!(get.seed_body(), "{}");
    }

    #[test]
    fn test_descriptor_wire_format() {
        let raw = r#"{"method":"POST","path":"/swap-usdc","description":"Swap","requestBody":{"amount":1}}"#;
        let ep: EndpointDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(ep.method, HttpMethod::POST);
        assert_eq!(ep.request_body, Some(json!({"amount": 1})));

        let no_body = EndpointDescriptor::new(HttpMethod::GET, "/ping", "Ping");
        let encoded = serde_json::to_value(&no_body).unwrap();
        assert!(encoded.get("requestBody").is_none());
    }

    #[test]
    fn test_network_parsing_is_case_insensitive() {
        assert_eq!("Public".parse::<NetworkId>().unwrap(), NetworkId::Public);
        assert!("mainnet".parse::<NetworkId>().is_err());
        assert_eq!(NetworkId::Kipaji.next(), NetworkId::Testnet);
    }

    #[test]
    fn test_non_json_body_is_kept_as_text() {
        let payload = ResponsePayload::from_text("<html>oops</html>");
        assert_eq!(payload.pretty(), "<html>oops</html>");
        assert_eq!(payload.raw(), "\"<html>oops</html>\"");
    }

    #[test]
    fn test_failure_records_use_sentinels() {
        let transport = ResponseRecord::transport_failure(12);
        assert_eq!(transport.status, 0);
        assert_eq!(transport.payload, ResponsePayload::Error("No response received from server".into()));
        assert!(transport.headers.is_empty());
        assert!(transport.kind.is_exchange());

        let preflight = ResponseRecord::preflight_failure(&PreflightError::InvalidBody("eof".into()));
        assert_eq!(preflight.status, 500);
        assert!(!preflight.kind.is_exchange());
    }
}
